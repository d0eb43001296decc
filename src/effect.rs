//! Effects - remote fetches requested by the reducer

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Cache miss for an entity; fetch `pokemon/{index + 1}`
    FetchEntity { index: usize },
    /// Cache miss for a move; fetch its resource URL
    FetchMove { label: String, url: String },
}
