use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A customer. Appointment history is joined by `owner_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DogOwner {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<NaiveDate>,
}

impl DogOwner {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at: None,
        }
    }
}
