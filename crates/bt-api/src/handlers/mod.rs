//! API handlers
//!
//! Organized by resource.

pub mod auth;
pub mod dashboard;
pub mod directory;
pub mod material_requests;
pub mod materials;
pub mod photos;
pub mod projects;
pub mod users;
pub mod work_logs;
