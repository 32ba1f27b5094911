use serde::{Deserialize, Serialize};

/// One episode of the show, as listed by the remote catalog.
///
/// The remote source sends many more fields than these; unknown fields
/// are ignored on decode. Values are never mutated after decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: i64,
    pub name: String,
    pub season: u32,
    pub number: u32,
}
