//! Effect handling: turns fetch effects into background tasks
//!
//! Each task fetches one payload, projects it and reports back with a
//! `*DidLoad` / `*DidError` action. Cache writes happen in the reducer.

use std::sync::Arc;

use tracing::{info, warn};
use tui_dispatch::{EffectContext, TaskKey};

use crate::action::Action;
use crate::api::RemoteSource;
use crate::effect::Effect;
use crate::{ids, projection};

pub fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, source: Arc<dyn RemoteSource>) {
    match effect {
        Effect::FetchEntity { index } => {
            ctx.tasks()
                .spawn(TaskKey::new(entity_task_key(index)), async move {
                    load_entity(source.as_ref(), index).await
                });
        }
        Effect::FetchMove { label, url } => {
            ctx.tasks()
                .spawn(TaskKey::new(move_task_key(&label)), async move {
                    load_move(source.as_ref(), label, url).await
                });
        }
    }
}

pub fn entity_task_key(index: usize) -> String {
    format!("entity_{index}")
}

pub fn move_task_key(label: &str) -> String {
    format!("move_{label}")
}

pub async fn load_entity(source: &dyn RemoteSource, index: usize) -> Action {
    let api_id = ids::to_api_id(index);
    match source.fetch_entity(api_id).await {
        Ok(payload) => {
            let record = projection::entity_record(api_id, payload);
            info!(index, name = %record.name, "entity fetched");
            Action::EntityDidLoad { index, record }
        }
        Err(err) => {
            warn!(index, api_id, error = %err, "entity fetch failed");
            Action::EntityDidError {
                index,
                error: err.to_string(),
            }
        }
    }
}

pub async fn load_move(source: &dyn RemoteSource, label: String, url: String) -> Action {
    match source.fetch_move(&url).await {
        Ok(payload) => {
            let record = projection::move_record(&label, payload);
            info!(%label, described = record.description.is_some(), "move fetched");
            Action::MoveDidLoad { label, record }
        }
        Err(err) => {
            warn!(%label, %url, error = %err, "move fetch failed");
            Action::MoveDidError {
                label,
                error: err.to_string(),
            }
        }
    }
}
