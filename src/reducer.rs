//! Reducer - the selection/detail controller
//!
//! Cache reads and writes happen here, synchronously; only network fetches are
//! deferred to effects.

use tracing::{debug, info, warn};
use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::ids;
use crate::resolver::{Completion, Request};
use crate::state::AppState;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            let index = state.selected_index;
            select_entity(state, index)
        }

        Action::EntitySelect(index) => select_entity(state, index),

        Action::EntityDidLoad { index, record } => {
            state.cache.write_entity(index, &record);
            match state.entity.complete(&index, Ok(record)) {
                Completion::Stale => {
                    debug!(index, "dropping stale entity completion");
                    DispatchResult::unchanged()
                }
                _ => {
                    info!(index, "entity ready");
                    state.move_cursor = 0;
                    DispatchResult::changed()
                }
            }
        }

        Action::EntityDidError { index, error } => {
            match state.entity.complete(&index, Err(error.clone())) {
                Completion::Stale => {
                    debug!(index, %error, "dropping stale entity failure");
                    DispatchResult::unchanged()
                }
                _ => {
                    info!(index, "entity failed");
                    DispatchResult::changed()
                }
            }
        }

        Action::MoveOpen { label, url } => open_move(state, label, url),

        Action::MoveConfirm => {
            let Some(move_ref) = state.move_under_cursor().cloned() else {
                return DispatchResult::unchanged();
            };
            open_move(state, move_ref.name, move_ref.url)
        }

        Action::MoveClose => {
            if close_move(state) {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::MoveDidLoad { label, record } => {
            state.cache.write_move(&label, &record);
            match state.moves.complete(&label, Ok(record)) {
                Completion::Stale => DispatchResult::unchanged(),
                _ => DispatchResult::changed(),
            }
        }

        Action::MoveDidError { label, error } => {
            match state.moves.complete(&label, Err(error)) {
                Completion::Stale => DispatchResult::unchanged(),
                _ => DispatchResult::changed(),
            }
        }

        Action::MoveCursor(delta) => {
            let len = state.entity_record().map(|record| record.moves.len()).unwrap_or(0);
            let next = clamp_index(state.move_cursor, len, delta);
            if next == state.move_cursor {
                return DispatchResult::unchanged();
            }
            state.move_cursor = next;
            DispatchResult::changed()
        }

        Action::NavMove(delta) => {
            let len = state.filtered.len();
            let synced = state.list_highlight().is_some();
            // No highlighted row while the selection is filtered out; the first
            // step lands on the first row.
            let next = if synced {
                clamp_index(state.cursor, len, delta)
            } else {
                clamp_index(0, len, delta - delta.signum())
            };
            if len == 0 || (synced && next == state.cursor) {
                return DispatchResult::unchanged();
            }
            state.cursor = next;
            select_under_cursor(state)
        }

        Action::NavSelect(position) => {
            if position >= state.filtered.len() {
                return DispatchResult::unchanged();
            }
            state.cursor = position;
            select_under_cursor(state)
        }

        Action::MenuToggle => {
            state.show_side_menu = !state.show_side_menu;
            DispatchResult::changed()
        }

        Action::MenuClose => {
            if !state.show_side_menu {
                return DispatchResult::unchanged();
            }
            state.show_side_menu = false;
            DispatchResult::changed()
        }

        Action::SearchStart => {
            state.search.active = true;
            state.show_side_menu = true;
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            state.search.query.push(ch);
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::SearchBackspace => {
            if state.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            if !state.search.active && state.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            state.search.query.clear();
            state.rebuild_filtered();
            DispatchResult::changed()
        }

        Action::SearchSubmit => {
            state.search.active = false;
            if state.filtered.contains(&state.selected_index) {
                return DispatchResult::changed();
            }
            state.cursor = 0;
            select_under_cursor(state)
        }

        Action::UiTerminalResize(width, height) => {
            state.terminal_size = (width, height);
            DispatchResult::changed()
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Point the entity resolver at `index`, serving from the cache when possible.
fn select_entity(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    if !ids::is_valid_index(index) {
        warn!(index, "ignoring selection outside the catalog");
        return DispatchResult::unchanged();
    }

    state.selected_index = index;
    if let Some(position) = state.filtered.iter().position(|entry| *entry == index) {
        state.cursor = position;
    }
    close_move(state);

    if state.entity.is_ready_for(&index) {
        return DispatchResult::changed();
    }

    let cache = state.cache.clone();
    state.move_cursor = 0;
    match state.entity.request(index, |index| cache.read_entity(*index)) {
        Request::Cached => {
            debug!(index, "entity served from cache");
            DispatchResult::changed()
        }
        Request::Pending => {
            debug!(index, "entity fetch already in flight");
            DispatchResult::changed()
        }
        Request::Fetch => {
            info!(index, api_id = ids::to_api_id(index), "entity cache miss");
            DispatchResult::changed_with(Effect::FetchEntity { index })
        }
    }
}

/// Only one move may be resolving at a time; anything else is dropped.
fn open_move(state: &mut AppState, label: String, url: String) -> DispatchResult<Effect> {
    if state.moves.is_loading() && state.moves.has_in_flight() {
        debug!(%label, "move request already loading; dropping");
        return DispatchResult::unchanged();
    }
    if state.moves.has_in_flight() && !state.moves.is_in_flight(&label) {
        debug!(%label, "another move fetch still outstanding; dropping");
        return DispatchResult::unchanged();
    }

    state.open_move = Some(label.clone());
    let cache = state.cache.clone();
    match state.moves.request(label.clone(), |label| cache.read_move(label)) {
        Request::Cached | Request::Pending => DispatchResult::changed(),
        Request::Fetch => {
            info!(%label, "move cache miss");
            DispatchResult::changed_with(Effect::FetchMove { label, url })
        }
    }
}

fn close_move(state: &mut AppState) -> bool {
    if state.open_move.is_none() {
        return false;
    }
    state.open_move = None;
    state.moves.clear();
    true
}

fn select_under_cursor(state: &mut AppState) -> DispatchResult<Effect> {
    match state.cursor_index() {
        Some(index) => select_entity(state, index),
        None => DispatchResult::changed(),
    }
}

fn clamp_index(current: usize, len: usize, delta: i16) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as i64 + delta as i64;
    next.clamp(0, len as i64 - 1) as usize
}
