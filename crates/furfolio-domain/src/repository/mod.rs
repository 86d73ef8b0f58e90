//! Repository trait definitions for record snapshots

use crate::model::{Appointment, Charge, DogOwner, PetBehaviorLog};
use furfolio_types::Error;

/// Source of grooming business records
///
/// Implementations hand out owned snapshots; the analytics engines never
/// write back through this trait.
pub trait GroomingDataRepository {
    /// Load all customers
    fn find_owners(&self) -> Result<Vec<DogOwner>, Error>;

    /// Load all appointments, in any status
    fn find_appointments(&self) -> Result<Vec<Appointment>, Error>;

    /// Load all charges
    fn find_charges(&self) -> Result<Vec<Charge>, Error>;

    /// Load all behavior notes
    fn find_behavior_logs(&self) -> Result<Vec<PetBehaviorLog>, Error>;

    /// Appointment history of one owner
    fn find_appointments_for_owner(&self, owner_id: &str) -> Result<Vec<Appointment>, Error> {
        Ok(self
            .find_appointments()?
            .into_iter()
            .filter(|a| a.owner_id == owner_id)
            .collect())
    }
}
