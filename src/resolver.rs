//! Per-kind request state machine: Idle -> Loading -> Ready | Failed
//!
//! A `Resolver` tracks which key is currently wanted, which keys have a fetch
//! outstanding, and the `DataResource` shown for the wanted key. It never talks
//! to storage or the network itself; callers hand it a cache lookup and it
//! answers whether a fetch has to be issued.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RequestState {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Outcome of pointing a resolver at a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    /// Served from the cache; now Ready.
    Cached,
    /// Cache miss; now Loading and the caller must issue the fetch.
    Fetch,
    /// A fetch for this key is already outstanding; now Loading, nothing to issue.
    Pending,
}

/// Outcome of feeding a finished fetch back in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Ready,
    Failed,
    /// The key is no longer wanted (or was already resolved); display untouched.
    Stale,
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct Resolver<K, R> {
    key: Option<K>,
    /// Fetches belong to the running process; a restored snapshot has none.
    #[serde(skip)]
    in_flight: Vec<K>,
    resource: DataResource<R>,
}

impl<K, R> Default for Resolver<K, R> {
    fn default() -> Self {
        Self {
            key: None,
            in_flight: Vec::new(),
            resource: DataResource::Empty,
        }
    }
}

impl<K: Clone + PartialEq, R> Resolver<K, R> {
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn in_flight(&self) -> &[K] {
        &self.in_flight
    }

    pub fn resource(&self) -> &DataResource<R> {
        &self.resource
    }

    pub fn state(&self) -> RequestState {
        match &self.resource {
            DataResource::Empty => RequestState::Idle,
            DataResource::Loading => RequestState::Loading,
            DataResource::Loaded(_) => RequestState::Ready,
            DataResource::Failed(_) => RequestState::Failed,
        }
    }

    pub fn record(&self) -> Option<&R> {
        match &self.resource {
            DataResource::Loaded(record) => Some(record),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.resource {
            DataResource::Failed(error) => Some(error.as_str()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.resource, DataResource::Loading)
    }

    pub fn is_ready_for(&self, key: &K) -> bool {
        self.key.as_ref() == Some(key) && matches!(self.resource, DataResource::Loaded(_))
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        self.in_flight.contains(key)
    }

    pub fn has_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Point the resolver at `key`.
    ///
    /// The in-flight marker is recorded here, before the caller gets the chance
    /// to start the fetch, so a second trigger for the same key sees it.
    pub fn request(&mut self, key: K, lookup: impl FnOnce(&K) -> Option<R>) -> Request {
        if self.in_flight.contains(&key) {
            self.key = Some(key);
            self.resource = DataResource::Loading;
            return Request::Pending;
        }

        let cached = lookup(&key);
        self.key = Some(key.clone());
        match cached {
            Some(record) => {
                self.resource = DataResource::Loaded(record);
                Request::Cached
            }
            None => {
                self.in_flight.push(key);
                self.resource = DataResource::Loading;
                Request::Fetch
            }
        }
    }

    /// Feed back the result of the fetch issued for `key`.
    pub fn complete(&mut self, key: &K, outcome: Result<R, String>) -> Completion {
        self.in_flight.retain(|pending| pending != key);

        if self.key.as_ref() != Some(key) || !self.is_loading() {
            return Completion::Stale;
        }

        match outcome {
            Ok(record) => {
                self.resource = DataResource::Loaded(record);
                Completion::Ready
            }
            Err(error) => {
                self.resource = DataResource::Failed(error);
                Completion::Failed
            }
        }
    }

    /// Drop a Loading display that no fetch will ever complete, as after a
    /// state snapshot is restored. The key is kept so it can be re-requested.
    pub fn settle(&mut self) {
        if self.is_loading() && !self.key.as_ref().is_some_and(|key| self.in_flight.contains(key)) {
            self.resource = DataResource::Empty;
        }
    }

    /// Forget the current key. Outstanding fetches stay tracked and will
    /// complete as stale.
    pub fn clear(&mut self) {
        self.key = None;
        self.resource = DataResource::Empty;
    }
}
