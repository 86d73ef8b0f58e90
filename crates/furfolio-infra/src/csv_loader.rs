//! CSV loaders for grooming record exports
//!
//! Files are UTF-8, with or without a byte-order mark. Columns are located
//! by header name (case-insensitive), so column order does not matter and
//! extra columns are ignored.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use encoding_rs::UTF_8;
use furfolio_domain::model::{
    Appointment, AppointmentStatus, Charge, DogOwner, PetBehaviorLog, ServiceType,
};
use furfolio_types::Error;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum CsvLoaderError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid date format in row {row}, column {column}: {value}")]
    InvalidDate {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Invalid number format in row {row}, column {column}: {value}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Invalid value in row {row}, column {column}: {value}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Empty required field in row {row}, column {column}")]
    EmptyField { row: usize, column: String },
}

impl From<CsvLoaderError> for Error {
    fn from(err: CsvLoaderError) -> Self {
        Error::CsvLoader(err.to_string())
    }
}

/// Column positions resolved from a header row
struct Columns {
    headers: Vec<String>,
}

impl Columns {
    fn new(headers: &csv::StringRecord) -> Self {
        Self {
            headers: headers.iter().map(|h| h.trim().to_lowercase()).collect(),
        }
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require(&self, name: &str) -> Result<usize, CsvLoaderError> {
        self.index(name)
            .ok_or_else(|| CsvLoaderError::MissingColumn(name.to_string()))
    }
}

/// One data row plus its 1-based line number (header is row 1)
struct Row<'a> {
    record: &'a csv::StringRecord,
    row: usize,
}

impl Row<'_> {
    fn optional(&self, index: Option<usize>) -> Option<&str> {
        index
            .and_then(|i| self.record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn required(&self, index: usize, column: &str) -> Result<&str, CsvLoaderError> {
        self.optional(Some(index))
            .ok_or_else(|| CsvLoaderError::EmptyField {
                row: self.row,
                column: column.to_string(),
            })
    }

    fn datetime(&self, index: usize, column: &str) -> Result<NaiveDateTime, CsvLoaderError> {
        let value = self.required(index, column)?;
        parse_datetime(value).ok_or_else(|| CsvLoaderError::InvalidDate {
            row: self.row,
            column: column.to_string(),
            value: value.to_string(),
        })
    }
}

/// Read a file into CSV records, stripping a UTF-8 BOM if present
fn read_records(path: &Path) -> Result<(Columns, Vec<csv::StringRecord>), CsvLoaderError> {
    let bytes = std::fs::read(path)?;
    let (decoded, had_errors) = UTF_8.decode_with_bom_removal(&bytes);
    if had_errors {
        warn!(path = %path.display(), "invalid UTF-8 sequences replaced while reading CSV");
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(decoded.as_bytes());

    let columns = Columns::new(reader.headers()?);
    let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    debug!(path = %path.display(), rows = records.len(), "read CSV");
    Ok((columns, records))
}

/// Parse a timestamp or a bare date (taken as midnight)
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let formats = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s.trim(), fmt) {
            return Some(date);
        }
    }
    None
}

/// Load customers. Required columns: `id`, `name`; optional `created_at`.
pub fn load_owners<P: AsRef<Path>>(path: P) -> Result<Vec<DogOwner>, CsvLoaderError> {
    let (columns, records) = read_records(path.as_ref())?;
    let id = columns.require("id")?;
    let name = columns.require("name")?;
    let created_col = columns.index("created_at");

    let mut owners = Vec::with_capacity(records.len());
    for (row_idx, record) in records.iter().enumerate() {
        let row = Row {
            record,
            row: row_idx + 2,
        };
        let created_at = match row.optional(created_col) {
            Some(value) => Some(parse_date(value).ok_or_else(|| CsvLoaderError::InvalidDate {
                row: row.row,
                column: "created_at".to_string(),
                value: value.to_string(),
            })?),
            None => None,
        };
        owners.push(DogOwner {
            id: row.required(id, "id")?.to_string(),
            name: row.optional(Some(name)).unwrap_or_default().to_string(),
            created_at,
        });
    }
    Ok(owners)
}

/// Load appointments.
///
/// Required columns: `id`, `owner_id`, `date`, `service_type`; optional
/// `dog_id`, `duration_minutes`, `status` (missing status means completed).
pub fn load_appointments<P: AsRef<Path>>(path: P) -> Result<Vec<Appointment>, CsvLoaderError> {
    let (columns, records) = read_records(path.as_ref())?;
    let id = columns.require("id")?;
    let owner_id = columns.require("owner_id")?;
    let date = columns.require("date")?;
    let service_type = columns.require("service_type")?;
    let dog_id = columns.index("dog_id");
    let duration = columns.index("duration_minutes");
    let status_col = columns.index("status");

    let mut appointments = Vec::with_capacity(records.len());
    for (row_idx, record) in records.iter().enumerate() {
        let row = Row {
            record,
            row: row_idx + 2,
        };
        let service_label = row.required(service_type, "service_type")?;
        let service = ServiceType::parse(service_label).ok_or_else(|| {
            CsvLoaderError::InvalidValue {
                row: row.row,
                column: "service_type".to_string(),
                value: service_label.to_string(),
            }
        })?;
        let duration_minutes = row
            .optional(duration)
            .map(|value| {
                value.parse::<u32>().map_err(|_| CsvLoaderError::InvalidNumber {
                    row: row.row,
                    column: "duration_minutes".to_string(),
                    value: value.to_string(),
                })
            })
            .transpose()?;
        let status = match row.optional(status_col) {
            Some(value) => AppointmentStatus::parse(value).ok_or_else(|| {
                CsvLoaderError::InvalidValue {
                    row: row.row,
                    column: "status".to_string(),
                    value: value.to_string(),
                }
            })?,
            None => AppointmentStatus::Completed,
        };

        appointments.push(Appointment {
            id: row.required(id, "id")?.to_string(),
            owner_id: row.required(owner_id, "owner_id")?.to_string(),
            dog_id: row.optional(dog_id).map(str::to_string),
            date: row.datetime(date, "date")?,
            service_type: service,
            duration_minutes,
            status,
        });
    }
    Ok(appointments)
}

/// Load charges.
///
/// Required columns: `id`, `owner_id`, `date`, `amount`; optional
/// `appointment_id`, `note`. A leading `$` on amounts is accepted.
pub fn load_charges<P: AsRef<Path>>(path: P) -> Result<Vec<Charge>, CsvLoaderError> {
    let (columns, records) = read_records(path.as_ref())?;
    let id = columns.require("id")?;
    let owner_id = columns.require("owner_id")?;
    let date = columns.require("date")?;
    let amount = columns.require("amount")?;
    let appointment_id = columns.index("appointment_id");
    let note = columns.index("note");

    let mut charges = Vec::with_capacity(records.len());
    for (row_idx, record) in records.iter().enumerate() {
        let row = Row {
            record,
            row: row_idx + 2,
        };
        let amount_str = row.required(amount, "amount")?;
        let value = parse_amount(amount_str).ok_or_else(|| CsvLoaderError::InvalidNumber {
            row: row.row,
            column: "amount".to_string(),
            value: amount_str.to_string(),
        })?;
        if value < 0.0 {
            warn!(row = row.row, amount = value, "negative charge amount (refund?)");
        }

        charges.push(Charge {
            id: row.required(id, "id")?.to_string(),
            appointment_id: row.optional(appointment_id).map(str::to_string),
            owner_id: row.required(owner_id, "owner_id")?.to_string(),
            date: row.datetime(date, "date")?,
            amount: value,
            note: row.optional(note).map(str::to_string),
        });
    }
    Ok(charges)
}

fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| !matches!(c, '$' | ',' | ' ')).collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Load behavior notes.
///
/// Required columns: `id`, `dog_id`, `timestamp`, `note`; optional `owner_id`.
pub fn load_behavior_logs<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<PetBehaviorLog>, CsvLoaderError> {
    let (columns, records) = read_records(path.as_ref())?;
    let id = columns.require("id")?;
    let dog_id = columns.require("dog_id")?;
    let timestamp = columns.require("timestamp")?;
    let note = columns.require("note")?;
    let owner_id = columns.index("owner_id");

    let mut logs = Vec::with_capacity(records.len());
    for (row_idx, record) in records.iter().enumerate() {
        let row = Row {
            record,
            row: row_idx + 2,
        };
        logs.push(PetBehaviorLog {
            id: row.required(id, "id")?.to_string(),
            dog_id: row.required(dog_id, "dog_id")?.to_string(),
            owner_id: row.optional(owner_id).map(str::to_string),
            timestamp: row.datetime(timestamp, "timestamp")?,
            note: row.optional(Some(note)).unwrap_or_default().to_string(),
        });
    }
    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert!(parse_datetime("2024-01-15").is_some());
        assert!(parse_datetime("2024/01/15").is_some());
        assert!(parse_datetime("2024-01-15 09:30").is_some());
        assert!(parse_datetime("2024-01-15T09:30:15").is_some());
        assert!(parse_datetime("15.01.2024").is_none());
        let dt = parse_datetime("2024-01-15").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "00:00");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,250.50"), Some(1250.5));
        assert_eq!(parse_amount("-12"), Some(-12.0));
        assert_eq!(parse_amount("twelve"), None);
    }

    #[test]
    fn test_load_appointments_with_bom_and_reordered_columns() {
        let file = write_csv(
            "\u{feff}service_type,id,date,owner_id,duration_minutes,status\n\
             Full Groom,a1,2024-02-01 10:00,o1,90,completed\n\
             nail trim,a2,2024-02-02,o2,,no-show\n\
             Blueberry Facial,a3,2024/02/03,o1,20,\n"
                .as_bytes(),
        );
        let appts = load_appointments(file.path()).unwrap();
        assert_eq!(appts.len(), 3);
        assert_eq!(appts[0].service_type, ServiceType::FullGroom);
        assert_eq!(appts[0].duration_minutes, Some(90));
        assert_eq!(appts[1].status, AppointmentStatus::NoShow);
        assert_eq!(appts[1].duration_minutes, None);
        assert_eq!(
            appts[2].service_type,
            ServiceType::Custom("Blueberry Facial".to_string())
        );
        assert_eq!(appts[2].status, AppointmentStatus::Completed);
    }

    #[test]
    fn test_missing_column() {
        let file = write_csv(b"id,owner_id,service_type\na1,o1,bath\n");
        let err = load_appointments(file.path()).unwrap_err();
        assert!(matches!(err, CsvLoaderError::MissingColumn(ref c) if c == "date"));
    }

    #[test]
    fn test_invalid_number_reports_row() {
        let file = write_csv(
            b"id,owner_id,date,service_type,duration_minutes\n\
              a1,o1,2024-01-01,bath,30\n\
              a2,o1,2024-01-02,bath,half an hour\n",
        );
        let err = load_appointments(file.path()).unwrap_err();
        match err {
            CsvLoaderError::InvalidNumber { row, column, .. } => {
                assert_eq!(row, 3);
                assert_eq!(column, "duration_minutes");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_invalid_date() {
        let file = write_csv(b"id,owner_id,date,amount\nc1,o1,yesterday,10\n");
        let err = load_charges(file.path()).unwrap_err();
        assert!(matches!(err, CsvLoaderError::InvalidDate { row: 2, .. }));
        assert_eq!(
            err.to_string(),
            "Invalid date format in row 2, column date: yesterday"
        );
    }

    #[test]
    fn test_bad_created_at_names_column() {
        let file = write_csv(b"id,name,created_at\no1,Avery,someday\n");
        match load_owners(file.path()).unwrap_err() {
            CsvLoaderError::InvalidDate { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "created_at");
                assert_eq!(value, "someday");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_load_charges_and_owners() {
        let charges = write_csv(
            b"id,appointment_id,owner_id,date,amount,note\n\
              c1,a1,o1,2024-02-01,$80.00,\"tip, included\"\n\
              c2,,o2,2024-02-05,15,shampoo\n",
        );
        let charges = load_charges(charges.path()).unwrap();
        assert_eq!(charges.len(), 2);
        assert_eq!(charges[0].appointment_id.as_deref(), Some("a1"));
        assert_eq!(charges[0].note.as_deref(), Some("tip, included"));
        assert_eq!(charges[1].appointment_id, None);
        assert!((charges[1].amount - 15.0).abs() < 1e-9);

        let owners = write_csv(b"id,name,created_at\no1,Avery,2023-05-01\no2,Blake,\n");
        let owners = load_owners(owners.path()).unwrap();
        assert_eq!(owners.len(), 2);
        assert!(owners[0].created_at.is_some());
        assert!(owners[1].created_at.is_none());
    }

    #[test]
    fn test_load_behavior_logs() {
        let file = write_csv(
            b"id,dog_id,timestamp,note\n\
              b1,rex,2024-03-01T10:00,Growled at the dryer\n",
        );
        let logs = load_behavior_logs(file.path()).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].dog_id, "rex");
        assert_eq!(logs[0].note, "Growled at the dryer");
    }
}
