//! # bt-contracts
//!
//! Contract validation for BuildTrack.
//!
//! Contracts decide what a user may see and what a submitted entry must
//! satisfy before it is written:
//!
//! - `visibility`: role-scoped filters over projects, work logs and
//!   material requests
//! - `work_logs`, `material_logs`, `material_requests`: entry validators
//!   and the role gates that guard each write
//! - `projects`, `signup`, `password`: aggregated field validation for
//!   forms

pub mod base;
pub mod visibility;
pub mod work_logs;
pub mod material_logs;
pub mod material_requests;
pub mod projects;
pub mod signup;
pub mod password;

pub use base::*;
