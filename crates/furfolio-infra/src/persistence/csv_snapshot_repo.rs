//! CSV directory implementation of GroomingDataRepository

use std::path::{Path, PathBuf};

use furfolio_domain::model::{Appointment, Charge, DogOwner, PetBehaviorLog};
use furfolio_domain::repository::GroomingDataRepository;
use furfolio_types::{Error, Result};
use tracing::{debug, info};

use crate::csv_loader::{load_appointments, load_behavior_logs, load_charges, load_owners};

pub const OWNERS_FILE: &str = "owners.csv";
pub const APPOINTMENTS_FILE: &str = "appointments.csv";
pub const CHARGES_FILE: &str = "charges.csv";
pub const BEHAVIOR_LOGS_FILE: &str = "behavior_logs.csv";

/// Export directory holding one CSV per record type.
///
/// `appointments.csv` is required; the other files are optional and read as
/// empty when absent. Records are loaded once on open and on `reload`.
pub struct CsvSnapshotRepository {
    dir: PathBuf,
    owners: Vec<DogOwner>,
    appointments: Vec<Appointment>,
    charges: Vec<Charge>,
    behavior_logs: Vec<PetBehaviorLog>,
}

impl CsvSnapshotRepository {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let mut repo = Self {
            dir: dir.into(),
            owners: Vec::new(),
            appointments: Vec::new(),
            charges: Vec::new(),
            behavior_logs: Vec::new(),
        };
        repo.reload()?;
        Ok(repo)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Re-read every CSV from disk
    pub fn reload(&mut self) -> Result<()> {
        if !self.dir.is_dir() {
            return Err(Error::DataDirNotFound(self.dir.display().to_string()));
        }
        let appointments_path = self.dir.join(APPOINTMENTS_FILE);
        if !appointments_path.is_file() {
            return Err(Error::CsvLoader(format!(
                "{} not found in {}",
                APPOINTMENTS_FILE,
                self.dir.display()
            )));
        }

        // Nothing is replaced unless every file loads
        let appointments = load_appointments(&appointments_path)?;
        let owners = self.load_optional(OWNERS_FILE, |p| load_owners(p))?;
        let charges = self.load_optional(CHARGES_FILE, |p| load_charges(p))?;
        let behavior_logs = self.load_optional(BEHAVIOR_LOGS_FILE, |p| load_behavior_logs(p))?;

        self.appointments = appointments;
        self.owners = owners;
        self.charges = charges;
        self.behavior_logs = behavior_logs;

        info!(
            dir = %self.dir.display(),
            owners = self.owners.len(),
            appointments = self.appointments.len(),
            charges = self.charges.len(),
            behavior_logs = self.behavior_logs.len(),
            "loaded CSV snapshot"
        );
        Ok(())
    }

    fn load_optional<T, F>(&self, file_name: &str, load: F) -> Result<Vec<T>>
    where
        F: FnOnce(&Path) -> std::result::Result<Vec<T>, crate::csv_loader::CsvLoaderError>,
    {
        let path = self.dir.join(file_name);
        if !path.is_file() {
            debug!(file = file_name, "optional CSV absent, using empty list");
            return Ok(Vec::new());
        }
        load(&path).map_err(|e| Error::CsvLoader(format!("{}: {}", file_name, e)))
    }
}

impl GroomingDataRepository for CsvSnapshotRepository {
    fn find_owners(&self) -> Result<Vec<DogOwner>> {
        Ok(self.owners.clone())
    }

    fn find_appointments(&self) -> Result<Vec<Appointment>> {
        Ok(self.appointments.clone())
    }

    fn find_charges(&self) -> Result<Vec<Charge>> {
        Ok(self.charges.clone())
    }

    fn find_behavior_logs(&self) -> Result<Vec<PetBehaviorLog>> {
        Ok(self.behavior_logs.clone())
    }

    fn find_appointments_for_owner(&self, owner_id: &str) -> Result<Vec<Appointment>> {
        Ok(self
            .appointments
            .iter()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect())
    }
}
