//! Raw payload -> cached record projections

use crate::api::{MovePayload, PokemonPayload};
use crate::state::{EntityRecord, MoveRecord, MoveRef, StatEntry};

/// Version group whose flavor text becomes a move's description.
pub const DESCRIPTION_VERSION_GROUP: &str = "firered-leafgreen";

pub fn entity_record(api_id: u16, payload: PokemonPayload) -> EntityRecord {
    let sprites = payload
        .sprites
        .into_iter()
        .filter_map(|(slot, value)| match value {
            serde_json::Value::String(url) => Some((slot, url)),
            _ => None,
        })
        .collect();

    EntityRecord {
        name: payload.name,
        id: payload.id.unwrap_or(api_id),
        height: payload.height,
        types: payload
            .types
            .into_iter()
            .map(|slot| slot.type_info.name)
            .collect(),
        stats: payload
            .stats
            .into_iter()
            .map(|slot| StatEntry {
                name: slot.stat.name,
                value: slot.base_stat,
            })
            .collect(),
        moves: payload
            .moves
            .into_iter()
            .map(|slot| MoveRef {
                name: slot.move_info.name,
                url: slot.move_info.url,
            })
            .collect(),
        sprites,
    }
}

/// A payload with no matching version group still projects, with no description.
pub fn move_record(label: &str, payload: MovePayload) -> MoveRecord {
    let description = payload
        .flavor_text_entries
        .into_iter()
        .find(|entry| entry.version_group.name == DESCRIPTION_VERSION_GROUP)
        .map(|entry| entry.flavor_text);

    MoveRecord {
        name: label.to_string(),
        description,
    }
}

/// Flavor text carries hard line breaks and form feeds from the game cartridges.
pub fn display_text(text: &str) -> String {
    text.replace(['\n', '\u{000C}'], " ")
}
