use serde::{Deserialize, Serialize};

/// A player's persisted best score.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    pub high_score: i64,
}

impl PlayerRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, high_score: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            high_score,
        }
    }
}
