//! Service layer for business logic and orchestration.
//!
//! This module contains the service layer that sits between the record store
//! and the application surface. Services orchestrate store calls and
//! implement load fallbacks, save pipelines, and background persistence.

pub mod autosave;
pub mod availability;
pub mod editor;
pub mod profile;


pub use autosave::{AutosaveOptions, Autosaver, SaveState};
pub use availability::{
    AvailabilityService, LoadSource, LoadWarning, LoadedAvailability, SaveReceipt, SaveWarning,
    ServiceError,
};
pub use editor::AvailabilityEditor;
pub use profile::{ProfileSaveReceipt, ProfileSaveWarning, ProfileService};
