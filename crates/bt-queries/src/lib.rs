//! # bt-queries
//!
//! Read-side computations for BuildTrack.
//!
//! ## Structure
//!
//! - `metrics` - Pure reductions: progress, budget use, stock health, earnings
//! - `filters` - Search and status filters behind the list endpoints
//! - `dashboard` - Per-role dashboard figures
//! - `views` - Project detail and material stock views
//!
//! ## Example
//!
//! ```
//! use bt_models::fixtures;
//! use bt_queries::metrics::{progress_percentage, stock_level, StockLevel};
//!
//! let project = &fixtures::projects()[0];
//! assert_eq!(progress_percentage(project), 65.0);
//!
//! let paint = &fixtures::materials()[3];
//! assert_eq!(stock_level(paint), StockLevel::WellStocked);
//! ```

pub mod metrics;
pub mod filters;
pub mod dashboard;
pub mod views;

pub use metrics::{RequestCounts, StockLevel};
pub use filters::{project_counts, MaterialFilter, ProjectCounts, ProjectFilter, RequestFilter, WorkLogFilter};
pub use dashboard::{dashboard_for, Dashboard, DashboardSource};
pub use views::{material_counts, project_detail, MaterialCounts, MaterialView, ProjectDetail, TeamMember};
