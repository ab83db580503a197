//! Project contract
//!
//! Employers create and edit projects. `completed_area <= total_area` is
//! enforced here; spending over budget is allowed.

use bt_core::error::{TrackerError, ValidationErrors};
use bt_models::{Project, Role};
use chrono::NaiveDate;

use crate::base::{Contract, UserContext, ValidationResult};

/// Project data for validation
pub trait ProjectData: Send + Sync {
    fn name(&self) -> &str;
    fn total_area(&self) -> f64;
    fn completed_area(&self) -> f64;
    fn budget(&self) -> f64;
    fn spent_amount(&self) -> f64;
    fn start_date(&self) -> NaiveDate;
    fn end_date(&self) -> NaiveDate;
}

impl ProjectData for Project {
    fn name(&self) -> &str { &self.name }
    fn total_area(&self) -> f64 { self.total_area }
    fn completed_area(&self) -> f64 { self.completed_area }
    fn budget(&self) -> f64 { self.budget }
    fn spent_amount(&self) -> f64 { self.spent_amount }
    fn start_date(&self) -> NaiveDate { self.start_date }
    fn end_date(&self) -> NaiveDate { self.end_date }
}

pub struct ProjectContract<'a, U: UserContext + ?Sized> {
    user: &'a U,
}

impl<'a, U: UserContext + ?Sized> ProjectContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    /// Only employers manage projects
    pub fn authorize(&self) -> Result<(), TrackerError> {
        if self.user.has_role(Role::Employer) {
            Ok(())
        } else {
            Err(TrackerError::access_denied("manage projects"))
        }
    }

    fn validate_name(&self, name: &str, errors: &mut ValidationErrors) {
        if name.trim().is_empty() {
            errors.add("name", "can't be blank");
        } else if name.len() > 255 {
            errors.add("name", "is too long (maximum is 255 characters)");
        }
    }

    fn validate_amount(&self, field: &str, value: f64, errors: &mut ValidationErrors) {
        if !value.is_finite() || value < 0.0 {
            errors.add(field, "must be greater than or equal to 0");
        }
    }

    fn validate_areas(&self, total: f64, completed: f64, errors: &mut ValidationErrors) {
        self.validate_amount("total_area", total, errors);
        self.validate_amount("completed_area", completed, errors);
        if completed > total {
            errors.add("completed_area", "must be less than or equal to total area");
        }
    }

    fn validate_dates(&self, start: NaiveDate, end: NaiveDate, errors: &mut ValidationErrors) {
        if end < start {
            errors.add("end_date", "must be on or after the start date");
        }
    }
}

impl<'a, U: UserContext + ?Sized, T: ProjectData> Contract<T> for ProjectContract<'a, U> {
    fn validate(&self, entity: &T) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        self.validate_name(entity.name(), &mut errors);
        self.validate_areas(entity.total_area(), entity.completed_area(), &mut errors);
        self.validate_amount("budget", entity.budget(), &mut errors);
        self.validate_amount("spent_amount", entity.spent_amount(), &mut errors);
        self.validate_dates(entity.start_date(), entity.end_date(), &mut errors);

        errors.into_result()
    }
}
