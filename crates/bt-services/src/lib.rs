//! # bt-services
//!
//! Business logic services for BuildTrack.
//!
//! A service runs one operation for one user: it checks the role gate,
//! validates the entry, and hands a single atomic write to the store.
//! Results come back as a [`ServiceResult`].
//!
//! ## Example
//!
//! ```ignore
//! let ctx = ServiceContext::new(&store, &current_user);
//! let log = LogWorkService::new(ctx).call(input).await.into_result()?;
//! ```

pub mod accounts;
pub mod base;
pub mod directory;
pub mod material_requests;
pub mod materials;
pub mod projects;
pub mod queries;
pub mod result;
pub mod work_logs;

pub use accounts::{
    ForgotPasswordService, LoginOutcome, LoginParams, LoginService, ResetPasswordService,
    SignupService, UpdatePreferencesService,
};
pub use base::{ServiceContext, MAX_WRITE_ATTEMPTS};
pub use directory::{DirectoryService, WorkerSummary};
pub use material_requests::{SubmitMaterialRequestService, TransitionMaterialRequestService};
pub use materials::{LogMaterialService, MaterialLogOutcome};
pub use projects::{CreateProjectService, ProjectParams, UpdateProjectService};
pub use queries::QueryService;
pub use result::ServiceResult;
pub use work_logs::LogWorkService;
