use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A billed amount, usually tied to one appointment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    pub id: String,
    /// Appointment this charge pays for (None for retail / walk-in sales)
    #[serde(default)]
    pub appointment_id: Option<String>,
    pub owner_id: String,
    pub date: NaiveDateTime,
    pub amount: f64,
    #[serde(default)]
    pub note: Option<String>,
}

impl Charge {
    pub fn new(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        date: NaiveDateTime,
        amount: f64,
    ) -> Self {
        Self {
            id: id.into(),
            appointment_id: None,
            owner_id: owner_id.into(),
            date,
            amount,
            note: None,
        }
    }

    pub fn for_appointment(mut self, appointment_id: impl Into<String>) -> Self {
        self.appointment_id = Some(appointment_id.into());
        self
    }
}
