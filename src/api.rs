//! PokeAPI remote data source

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PokemonPayload {
    #[serde(default)]
    pub id: Option<u16>,
    pub name: String,
    pub height: u16,
    pub types: Vec<PokemonTypeSlot>,
    pub stats: Vec<PokemonStatSlot>,
    pub moves: Vec<PokemonMoveSlot>,
    #[serde(default)]
    pub sprites: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PokemonTypeSlot {
    #[serde(rename = "type")]
    pub type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PokemonStatSlot {
    pub base_stat: u16,
    pub stat: NamedResource,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PokemonMoveSlot {
    #[serde(rename = "move")]
    pub move_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MovePayload {
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorTextEntry>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub version_group: NamedResource,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
    #[error("response parse error: {0}")]
    Parse(String),
}

/// Where entity and move payloads come from. One round trip per call, no retry.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_entity(&self, api_id: u16) -> Result<PokemonPayload, ApiError>;
    async fn fetch_move(&self, url: &str) -> Result<MovePayload, ApiError>;
}

pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn entity_url(&self, api_id: u16) -> String {
        format!("{}/pokemon/{api_id}", self.base_url.trim_end_matches('/'))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        info!(url, "fetching");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| ApiError::Request(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ApiError::Request(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| ApiError::Parse(err.to_string()))
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn fetch_entity(&self, api_id: u16) -> Result<PokemonPayload, ApiError> {
        let url = self.entity_url(api_id);
        self.get_json(&url).await
    }

    async fn fetch_move(&self, url: &str) -> Result<MovePayload, ApiError> {
        self.get_json(url).await
    }
}
