use serde::Deserialize;

use crate::normalization;

/// The body of a name search. The term is normalized like the names it
/// is matched against.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    #[serde(deserialize_with = "normalization::deserialize")]
    pub search_term: String,
}
