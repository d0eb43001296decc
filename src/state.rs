//! Application state - selection, per-kind resolvers and the cache handle

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::ids;
use crate::resolver::{RequestState, Resolver};
use crate::store::CacheStore;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntityRecord {
    pub name: String,
    pub id: u16,
    pub height: u16,
    pub types: Vec<String>,
    pub stats: Vec<StatEntry>,
    pub moves: Vec<MoveRef>,
    #[serde(default)]
    pub sprites: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatEntry {
    pub name: String,
    pub value: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MoveRef {
    pub name: String,
    pub url: String,
}

/// Projection of a move payload down to the one description shown in the overlay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MoveRecord {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    /// Catalog index of the entity whose card is shown.
    pub selected_index: usize,
    pub entity: Resolver<usize, EntityRecord>,
    pub moves: Resolver<String, MoveRecord>,
    /// Label of the move overlay, if one is open.
    pub open_move: Option<String>,

    pub search: SearchState,
    pub filtered: Vec<usize>,
    /// Position of the list cursor inside `filtered`.
    pub cursor: usize,
    pub move_cursor: usize,
    pub show_side_menu: bool,

    #[serde(skip)]
    pub cache: CacheStore,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(CacheStore::default())
    }
}

impl AppState {
    pub fn new(cache: CacheStore) -> Self {
        Self {
            terminal_size: (80, 24),
            selected_index: 0,
            entity: Resolver::default(),
            moves: Resolver::default(),
            open_move: None,
            search: SearchState::default(),
            filtered: ids::filter_catalog(""),
            cursor: 0,
            move_cursor: 0,
            show_side_menu: true,
            cache,
        }
    }

    pub fn with_selection(mut self, index: usize) -> Self {
        if ids::is_valid_index(index) {
            self.selected_index = index;
            self.cursor = index;
        }
        self
    }

    pub fn entity_state(&self) -> RequestState {
        self.entity.state()
    }

    /// The record for the current selection, once resolved.
    pub fn entity_record(&self) -> Option<&EntityRecord> {
        self.entity.record()
    }

    pub fn entity_error(&self) -> Option<&str> {
        self.entity.error()
    }

    pub fn move_state(&self) -> RequestState {
        self.moves.state()
    }

    pub fn move_record(&self) -> Option<&MoveRecord> {
        self.open_move.as_ref()?;
        self.moves.record()
    }

    pub fn move_error(&self) -> Option<&str> {
        self.open_move.as_ref()?;
        self.moves.error()
    }

    pub fn cursor_index(&self) -> Option<usize> {
        self.filtered.get(self.cursor).copied()
    }

    /// List row to highlight: only the row of the displayed entity.
    pub fn list_highlight(&self) -> Option<usize> {
        (self.cursor_index() == Some(self.selected_index)).then_some(self.cursor)
    }

    /// Clear request displays that no running fetch backs, after a snapshot restore.
    pub fn settle_restored(&mut self) {
        if !ids::is_valid_index(self.selected_index) {
            self.selected_index = 0;
        }
        self.rebuild_filtered();
        self.entity.settle();
        self.moves.settle();
    }

    pub fn rebuild_filtered(&mut self) {
        self.filtered = ids::filter_catalog(&self.search.query);
        self.cursor = self
            .filtered
            .iter()
            .position(|index| *index == self.selected_index)
            .unwrap_or(0);
    }

    pub fn move_under_cursor(&self) -> Option<&MoveRef> {
        self.entity_record()?.moves.get(self.move_cursor)
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("Selection")
                .entry("index", ron_string(&self.selected_index))
                .entry("code", ron_string(&ids::to_display_code(self.selected_index)))
                .entry("open_move", ron_string(&self.open_move))
                .entry("cursor", ron_string(&self.cursor))
                .entry("move_cursor", ron_string(&self.move_cursor)),
            DebugSection::new("Requests")
                .entry("entity", ron_string(&self.entity.state()))
                .entry("entity_key", ron_string(&self.entity.key()))
                .entry("entity_in_flight", ron_string(&self.entity.in_flight()))
                .entry("move", ron_string(&self.moves.state()))
                .entry("move_key", ron_string(&self.moves.key()))
                .entry("move_in_flight", ron_string(&self.moves.in_flight())),
            DebugSection::new("Filters")
                .entry("search", ron_string(&self.search.query))
                .entry("search_active", ron_string(&self.search.active))
                .entry("filtered", ron_string(&self.filtered.len()))
                .entry("side_menu", ron_string(&self.show_side_menu)),
        ]
    }
}
