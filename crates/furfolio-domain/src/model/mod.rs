//! Domain model types

pub mod appointment;
pub mod behavior_log;
pub mod charge;
pub mod owner;

pub use appointment::{Appointment, AppointmentStatus, ServiceType};
pub use behavior_log::PetBehaviorLog;
pub use charge::Charge;
pub use owner::DogOwner;
