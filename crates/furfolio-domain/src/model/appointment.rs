//! Appointment records and their service / status vocabularies

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Grooming service category
///
/// Serialized as its display label so JSON reports read naturally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceType {
    FullGroom,
    BasicBath,
    NailTrim,
    Teeth,
    Deshedding,
    Custom(String),
}

impl ServiceType {
    /// Parse a service label leniently.
    ///
    /// Case, spaces, underscores and hyphens are ignored when matching the
    /// built-in services; any other non-empty label becomes `Custom`.
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }
        let key: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        let service = match key.as_str() {
            "fullgroom" | "full" | "groom" => ServiceType::FullGroom,
            "basicbath" | "bath" => ServiceType::BasicBath,
            "nailtrim" | "nails" | "nail" => ServiceType::NailTrim,
            "teeth" | "teethcleaning" | "dental" => ServiceType::Teeth,
            "deshedding" | "deshed" => ServiceType::Deshedding,
            _ => ServiceType::Custom(trimmed.to_string()),
        };
        Some(service)
    }

    pub fn label(&self) -> &str {
        match self {
            ServiceType::FullGroom => "Full Groom",
            ServiceType::BasicBath => "Basic Bath",
            ServiceType::NailTrim => "Nail Trim",
            ServiceType::Teeth => "Teeth Cleaning",
            ServiceType::Deshedding => "De-shedding",
            ServiceType::Custom(label) => label,
        }
    }
}

impl From<String> for ServiceType {
    fn from(label: String) -> Self {
        ServiceType::parse(&label).unwrap_or(ServiceType::Custom(label))
    }
}

impl From<ServiceType> for String {
    fn from(service: ServiceType) -> Self {
        service.label().to_string()
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle state of an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn parse(label: &str) -> Option<Self> {
        let key: String = label
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "scheduled" | "booked" | "confirmed" => Some(AppointmentStatus::Scheduled),
            "completed" | "complete" | "done" => Some(AppointmentStatus::Completed),
            "cancelled" | "canceled" => Some(AppointmentStatus::Cancelled),
            "noshow" | "missed" => Some(AppointmentStatus::NoShow),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub owner_id: String,
    #[serde(default)]
    pub dog_id: Option<String>,
    pub date: NaiveDateTime,
    pub service_type: ServiceType,
    /// Length of the session, when it was recorded
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    pub status: AppointmentStatus,
}

impl Appointment {
    /// A completed appointment with no recorded duration
    pub fn new(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        date: NaiveDateTime,
        service_type: ServiceType,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            dog_id: None,
            date,
            service_type,
            duration_minutes: None,
            status: AppointmentStatus::Completed,
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_dog(mut self, dog_id: impl Into<String>) -> Self {
        self.dog_id = Some(dog_id.into());
        self
    }

    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    /// Completed appointments are the only ones that count as visits
    pub fn is_visit(&self) -> bool {
        self.status == AppointmentStatus::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == AppointmentStatus::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_parse_lenient() {
        assert_eq!(ServiceType::parse("Full Groom"), Some(ServiceType::FullGroom));
        assert_eq!(ServiceType::parse("full_groom"), Some(ServiceType::FullGroom));
        assert_eq!(ServiceType::parse("NAIL-TRIM"), Some(ServiceType::NailTrim));
        assert_eq!(ServiceType::parse("bath"), Some(ServiceType::BasicBath));
        assert_eq!(ServiceType::parse("  "), None);
        assert_eq!(
            ServiceType::parse("Blueberry Facial"),
            Some(ServiceType::Custom("Blueberry Facial".to_string()))
        );
    }

    #[test]
    fn test_service_serializes_as_label() {
        let json = serde_json::to_string(&ServiceType::Teeth).unwrap();
        assert_eq!(json, "\"Teeth Cleaning\"");
        let back: ServiceType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ServiceType::Teeth);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(AppointmentStatus::parse("No-Show"), Some(AppointmentStatus::NoShow));
        assert_eq!(AppointmentStatus::parse("canceled"), Some(AppointmentStatus::Cancelled));
        assert_eq!(AppointmentStatus::parse("Done"), Some(AppointmentStatus::Completed));
        assert_eq!(AppointmentStatus::parse("pending review"), None);
    }
}
