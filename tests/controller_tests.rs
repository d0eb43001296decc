//! Controller behaviour driven through the store and the effect harness
//!
//! Network completions are simulated by dispatching the `*DidLoad` /
//! `*DidError` actions the loader would produce.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tui_dispatch::testing::*;
use tui_dispatch::EffectStore;

use pokedex::action::Action;
use pokedex::effect::Effect;
use pokedex::reducer::reducer;
use pokedex::resolver::RequestState;
use pokedex::state::{AppState, EntityRecord, MoveRecord, MoveRef, StatEntry};
use pokedex::store::{CacheStore, MemoryBackend, ENTITY_NAMESPACE, MOVE_NAMESPACE};

fn entity(index: usize, name: &str) -> EntityRecord {
    EntityRecord {
        name: name.to_string(),
        id: index as u16 + 1,
        height: 7,
        types: vec!["grass".to_string(), "poison".to_string()],
        stats: vec![StatEntry {
            name: "hp".to_string(),
            value: 45,
        }],
        moves: vec![
            MoveRef {
                name: "tackle".to_string(),
                url: "https://pokeapi.co/api/v2/move/33/".to_string(),
            },
            MoveRef {
                name: "growl".to_string(),
                url: "https://pokeapi.co/api/v2/move/45/".to_string(),
            },
        ],
        sprites: Default::default(),
    }
}

fn tackle() -> MoveRecord {
    MoveRecord {
        name: "tackle".to_string(),
        description: Some("A physical attack in which the user charges.".to_string()),
    }
}

fn open(label: &str) -> Action {
    Action::MoveOpen {
        label: label.to_string(),
        url: format!("https://pokeapi.co/api/v2/move/{label}/"),
    }
}

fn fetch_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::FetchEntity { .. }))
        .count()
}

// ============================================================================
// Entity resolution
// ============================================================================

#[test]
fn cache_miss_issues_one_fetch_and_completes() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::EntitySelect(0));
    harness.assert_state(|s| s.entity_state() == RequestState::Loading);

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| matches!(e, Effect::FetchEntity { index: 0 }));

    harness.complete_action(Action::EntityDidLoad {
        index: 0,
        record: entity(0, "bulbasaur"),
    });
    let (changed, total) = harness.process_emitted();
    assert_eq!((changed, total), (1, 1));

    harness.assert_state(|s| s.entity_state() == RequestState::Ready);
    harness.assert_state(|s| s.entity_record().map(|r| r.name.as_str()) == Some("bulbasaur"));
}

#[test]
fn selecting_twice_issues_at_most_one_fetch() {
    let mut store = EffectStore::new(AppState::default(), reducer);

    let first = store.dispatch(Action::EntitySelect(4));
    let second = store.dispatch(Action::EntitySelect(4));
    assert_eq!(fetch_count(&first.effects) + fetch_count(&second.effects), 1);

    store.dispatch(Action::EntityDidLoad {
        index: 4,
        record: entity(4, "charmander"),
    });
    let third = store.dispatch(Action::EntitySelect(4));
    assert_eq!(fetch_count(&third.effects), 0);
    assert_eq!(store.state().entity_state(), RequestState::Ready);
}

#[test]
fn cache_hit_is_ready_without_fetch() {
    let state = AppState::default();
    state.cache.write_entity(6, &entity(6, "squirtle"));
    let mut store = EffectStore::new(state, reducer);

    let result = store.dispatch(Action::EntitySelect(6));

    assert!(result.changed);
    assert!(result.effects.is_empty());
    assert_eq!(store.state().entity_state(), RequestState::Ready);
    assert_eq!(store.state().entity_record(), Some(&entity(6, "squirtle")));
}

#[test]
fn restart_with_same_storage_reaches_ready_offline() {
    let backend = Arc::new(MemoryBackend::new());

    let mut first_run = EffectStore::new(AppState::new(CacheStore::new(backend.clone())), reducer);
    for (index, name) in [(0, "bulbasaur"), (24, "pikachu"), (150, "mew")] {
        first_run.dispatch(Action::EntitySelect(index));
        first_run.dispatch(Action::EntityDidLoad {
            index,
            record: entity(index, name),
        });
    }
    drop(first_run);

    let mut second_run = EffectStore::new(AppState::new(CacheStore::new(backend)), reducer);
    for index in [0, 24, 150] {
        let result = second_run.dispatch(Action::EntitySelect(index));
        assert!(result.effects.is_empty(), "index {index} went to the network");
        assert_eq!(second_run.state().entity_state(), RequestState::Ready);
    }
    assert_eq!(
        second_run.state().entity_record().map(|r| r.name.as_str()),
        Some("mew")
    );
}

fn restore(state: &AppState) -> AppState {
    let json = serde_json::to_string(state).unwrap();
    let mut restored: AppState = serde_json::from_str(&json).unwrap();
    restored.settle_restored();
    restored
}

#[test]
fn snapshot_taken_while_loading_fetches_again_on_init() {
    let mut first_run = EffectStore::new(AppState::default(), reducer);
    first_run.dispatch(Action::EntitySelect(5));
    assert_eq!(first_run.state().entity_state(), RequestState::Loading);

    let restored = restore(first_run.state());
    assert_eq!(restored.entity_state(), RequestState::Idle);

    let mut second_run = EffectStore::new(restored, reducer);
    let result = second_run.dispatch(Action::Init);
    assert_eq!(result.effects, vec![Effect::FetchEntity { index: 5 }]);
    assert_eq!(second_run.state().entity_state(), RequestState::Loading);

    second_run.dispatch(Action::EntityDidLoad {
        index: 5,
        record: entity(5, "charmeleon"),
    });
    assert_eq!(second_run.state().entity_state(), RequestState::Ready);
}

#[test]
fn stale_completion_does_not_overwrite_new_selection() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::EntitySelect(0));
    harness.dispatch_collect(Action::EntitySelect(1));
    let effects = harness.drain_effects();
    effects.effects_count(2);

    harness.complete_action(Action::EntityDidLoad {
        index: 0,
        record: entity(0, "bulbasaur"),
    });
    let (changed, _) = harness.process_emitted();
    assert_eq!(changed, 0);
    harness.assert_state(|s| s.selected_index == 1);
    harness.assert_state(|s| s.entity_state() == RequestState::Loading);
    harness.assert_state(|s| s.entity_record().is_none());

    harness.complete_action(Action::EntityDidLoad {
        index: 1,
        record: entity(1, "ivysaur"),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.entity_record().map(|r| r.name.as_str()) == Some("ivysaur"));
}

#[test]
fn stale_completion_is_still_cached_for_its_own_index() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::EntitySelect(0));
    store.dispatch(Action::EntitySelect(1));
    store.dispatch(Action::EntityDidLoad {
        index: 0,
        record: entity(0, "bulbasaur"),
    });

    let back = store.dispatch(Action::EntitySelect(0));
    assert!(back.effects.is_empty());
    assert_eq!(
        store.state().entity_record().map(|r| r.name.as_str()),
        Some("bulbasaur")
    );
}

#[test]
fn stale_failure_does_not_mark_new_selection_failed() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::EntitySelect(0));
    store.dispatch(Action::EntitySelect(1));

    let result = store.dispatch(Action::EntityDidError {
        index: 0,
        error: "connection reset".to_string(),
    });

    assert!(!result.changed);
    assert_eq!(store.state().entity_state(), RequestState::Loading);
    assert_eq!(store.state().entity_error(), None);
}

#[test]
fn failure_is_shown_and_reselect_retries() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::EntitySelect(9));
    harness.drain_effects();
    harness.complete_action(Action::EntityDidError {
        index: 9,
        error: "https://pokeapi.co/api/v2/pokemon/10 responded with status 503".to_string(),
    });
    harness.process_emitted();

    harness.assert_state(|s| s.entity_state() == RequestState::Failed);
    harness.assert_state(|s| s.entity_error().is_some_and(|e| e.contains("503")));
    harness.assert_state(|s| s.cache.read_entity(9).is_none());

    harness.dispatch_collect(Action::EntitySelect(9));
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_all_match(|e| matches!(e, Effect::FetchEntity { index: 9 }));
}

#[test]
fn corrupt_entity_namespace_is_a_plain_miss() {
    let backend = Arc::new(MemoryBackend::new());
    backend.put_raw(ENTITY_NAMESPACE, "{\"0\": {\"name\": \"bulba");
    let mut store = EffectStore::new(AppState::new(CacheStore::new(backend.clone())), reducer);

    let result = store.dispatch(Action::EntitySelect(0));
    assert_eq!(result.effects, vec![Effect::FetchEntity { index: 0 }]);

    store.dispatch(Action::EntityDidLoad {
        index: 0,
        record: entity(0, "bulbasaur"),
    });
    assert_eq!(store.state().entity_state(), RequestState::Ready);
    assert!(backend.get_raw(ENTITY_NAMESPACE).is_some_and(|raw| raw.contains("bulbasaur")));
}

// ============================================================================
// Move resolution
// ============================================================================

#[test]
fn open_move_fetches_then_shows_description() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(open("tackle"));
    harness.assert_state(|s| s.open_move.as_deref() == Some("tackle"));
    harness.assert_state(|s| s.move_state() == RequestState::Loading);
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| matches!(e, Effect::FetchMove { label, .. } if label == "tackle"));

    harness.complete_action(Action::MoveDidLoad {
        label: "tackle".to_string(),
        record: tackle(),
    });
    harness.process_emitted();

    harness.assert_state(|s| s.move_record() == Some(&tackle()));
    harness.assert_state(|s| s.cache.read_move("tackle") == Some(tackle()));
}

#[test]
fn snapshot_taken_while_move_loading_does_not_block_moves() {
    let mut first_run = EffectStore::new(AppState::default(), reducer);
    first_run.dispatch(open("tackle"));
    assert_eq!(first_run.state().move_state(), RequestState::Loading);

    let mut second_run = EffectStore::new(restore(first_run.state()), reducer);
    second_run.dispatch(Action::MoveClose);
    let result = second_run.dispatch(open("growl"));

    assert_eq!(result.effects.len(), 1);
    assert!(matches!(&result.effects[0], Effect::FetchMove { label, .. } if label == "growl"));
    assert_eq!(second_run.state().open_move.as_deref(), Some("growl"));
}

#[test]
fn second_move_while_loading_is_dropped() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(open("tackle"));
    harness.dispatch_collect(open("growl"));

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_none_match(|e| matches!(e, Effect::FetchMove { label, .. } if label == "growl"));
    harness.assert_state(|s| s.open_move.as_deref() == Some("tackle"));
}

#[test]
fn move_without_firered_leafgreen_text_is_ready_not_failed() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(open("hyperspace-fury"));
    store.dispatch(Action::MoveDidLoad {
        label: "hyperspace-fury".to_string(),
        record: MoveRecord {
            name: "hyperspace-fury".to_string(),
            description: None,
        },
    });

    assert_eq!(store.state().move_state(), RequestState::Ready);
    assert_eq!(
        store.state().move_record().map(|r| r.description.clone()),
        Some(None)
    );
}

#[test]
fn cached_move_opens_without_fetch() {
    let state = AppState::default();
    state.cache.write_move("tackle", &tackle());
    let mut store = EffectStore::new(state, reducer);

    let result = store.dispatch(open("tackle"));

    assert!(result.effects.is_empty());
    assert_eq!(store.state().move_record(), Some(&tackle()));
}

#[test]
fn close_move_keeps_cache_and_drops_late_result() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(open("tackle"));
    store.dispatch(Action::MoveClose);

    assert_eq!(store.state().open_move, None);
    assert_eq!(store.state().move_state(), RequestState::Idle);

    store.dispatch(Action::MoveDidLoad {
        label: "tackle".to_string(),
        record: tackle(),
    });
    assert_eq!(store.state().move_record(), None);
    assert_eq!(store.state().cache.read_move("tackle"), Some(tackle()));

    let reopened = store.dispatch(open("tackle"));
    assert!(reopened.effects.is_empty());
    assert_eq!(store.state().move_record(), Some(&tackle()));
}

#[test]
fn other_move_waits_for_outstanding_fetch_after_close() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(open("tackle"));
    store.dispatch(Action::MoveClose);

    let dropped = store.dispatch(open("growl"));
    assert!(!dropped.changed);
    assert!(dropped.effects.is_empty());

    let adopted = store.dispatch(open("tackle"));
    assert!(adopted.effects.is_empty());
    assert_eq!(store.state().move_state(), RequestState::Loading);

    store.dispatch(Action::MoveDidLoad {
        label: "tackle".to_string(),
        record: tackle(),
    });
    store.dispatch(Action::MoveClose);
    let next = store.dispatch(open("growl"));
    assert_eq!(next.effects.len(), 1);
}

#[test]
fn move_failure_leaves_cache_untouched() {
    let backend = Arc::new(MemoryBackend::new());
    let mut store = EffectStore::new(AppState::new(CacheStore::new(backend.clone())), reducer);
    store.dispatch(open("tackle"));
    store.dispatch(Action::MoveDidError {
        label: "tackle".to_string(),
        error: "request failed: timed out".to_string(),
    });

    assert_eq!(store.state().move_state(), RequestState::Failed);
    assert_eq!(store.state().move_error(), Some("request failed: timed out"));
    assert_eq!(backend.get_raw(MOVE_NAMESPACE), None);
}

#[test]
fn selecting_entity_dismisses_open_move() {
    let state = AppState::default();
    state.cache.write_entity(0, &entity(0, "bulbasaur"));
    state.cache.write_entity(3, &entity(3, "charmander"));
    state.cache.write_move("tackle", &tackle());
    let mut store = EffectStore::new(state, reducer);

    store.dispatch(Action::EntitySelect(0));
    store.dispatch(open("tackle"));
    assert_eq!(store.state().open_move.as_deref(), Some("tackle"));

    store.dispatch(Action::EntitySelect(3));
    assert_eq!(store.state().open_move, None);
    assert_eq!(store.state().move_record(), None);
    assert_eq!(store.state().selected_index, 3);
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn init_resolves_start_index() {
    let mut harness = EffectStoreTestHarness::new(AppState::default().with_selection(150), reducer);

    harness.dispatch_collect(Action::Init);
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| matches!(e, Effect::FetchEntity { index: 150 }));
    harness.assert_state(|s| s.cursor == 150);
}

#[test]
fn search_then_navigate_selects_filtered_entries() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::SearchStart);
    for ch in "saur".chars() {
        store.dispatch(Action::SearchInput(ch));
    }
    assert_eq!(store.state().filtered, vec![0, 1, 2]);

    store.dispatch(Action::SearchSubmit);
    assert_eq!(store.state().selected_index, 0);

    let result = store.dispatch(Action::NavMove(1));
    assert_eq!(store.state().selected_index, 1);
    assert_eq!(result.effects, vec![Effect::FetchEntity { index: 1 }]);

    store.dispatch(Action::NavMove(5));
    assert_eq!(store.state().selected_index, 2);
}

#[test]
fn search_by_display_code() {
    let mut store = EffectStore::new(AppState::default(), reducer);
    store.dispatch(Action::SearchStart);
    for ch in "150".chars() {
        store.dispatch(Action::SearchInput(ch));
    }
    assert_eq!(store.state().filtered, vec![149]);
}
