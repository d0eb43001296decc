//! Actions: user intents and async fetch results

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::{EntityRecord, MoveRecord};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    Init,

    // ===== Entity selection =====
    /// Select the catalog entry at this ordinal index (0..=150)
    EntitySelect(usize),
    EntityDidLoad { index: usize, record: EntityRecord },
    EntityDidError { index: usize, error: String },

    // ===== Move detail =====
    /// Open the description overlay for a move of the selected entity
    MoveOpen { label: String, url: String },
    MoveClose,
    MoveDidLoad { label: String, record: MoveRecord },
    MoveDidError { label: String, error: String },
    MoveCursor(i16),
    MoveConfirm,

    // ===== Side navigation =====
    NavMove(i16),
    NavSelect(usize),
    MenuToggle,
    MenuClose,

    SearchStart,
    SearchInput(char),
    SearchBackspace,
    SearchCancel,
    SearchSubmit,

    UiTerminalResize(u16, u16),
    Quit,
}
