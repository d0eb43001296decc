//! Kanto Pokedex - a tui-dispatch app over a cache-aside PokeAPI layer
//!
//! The library exposes the modules for the binary and the integration tests.

pub mod action;
pub mod api;
pub mod effect;
pub mod ids;
pub mod loader;
pub mod projection;
pub mod reducer;
pub mod resolver;
pub mod state;
pub mod store;
pub mod ui;
