//! # bt-models
//!
//! Domain models for BuildTrack.
//!
//! Entities for construction project tracking: users and their roles,
//! projects, worker profiles, work logs, materials with their stock
//! movements, suppliers, and material requests with their lifecycle.
//! `fixtures` holds the demo dataset loaded into empty stores.

pub use bt_core::traits::{Authored, Id, Identifiable, ProjectScoped};

pub mod role;
pub mod user;
pub mod project;
pub mod worker;
pub mod work_log;
pub mod material;
pub mod material_request;
pub mod supplier;
pub mod fixtures;

pub use role::Role;
pub use user::{User, UserPreferences};
pub use project::{Project, ProjectStatus};
pub use worker::{Worker, DEFAULT_RATE_PER_SQUARE_METER, SPECIALIZATIONS};
pub use work_log::WorkLog;
pub use material::{Material, MaterialMovement, MovementKind, UNITS};
pub use material_request::{MaterialRequest, RequestStatus, RequestTransition, Urgency};
pub use supplier::Supplier;
