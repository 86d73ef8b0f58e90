use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Free-text groomer note about a dog's behavior during a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetBehaviorLog {
    pub id: String,
    pub dog_id: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    pub timestamp: NaiveDateTime,
    pub note: String,
}

impl PetBehaviorLog {
    pub fn new(
        id: impl Into<String>,
        dog_id: impl Into<String>,
        timestamp: NaiveDateTime,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            dog_id: dog_id.into(),
            owner_id: None,
            timestamp,
            note: note.into(),
        }
    }
}
