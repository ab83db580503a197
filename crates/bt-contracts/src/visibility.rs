//! Role-scoped visibility
//!
//! | role     | projects          | work logs | material requests | stock movements |
//! |----------|-------------------|-----------|-------------------|-----------------|
//! | employer | all               | all       | all               | all             |
//! | worker   | assigned to them  | their own | their own         | their own       |
//! | supplier | active            | none      | all               | all             |
//!
//! A user without a recognized role sees nothing.

use bt_models::{Authored, MaterialMovement, MaterialRequest, Project, ProjectStatus, Role, WorkLog};

use crate::base::UserContext;

/// Whether `user` recorded `item`
pub fn is_author<T: Authored + ?Sized, U: UserContext + ?Sized>(item: &T, user: &U) -> bool {
    item.author_id() == user.id()
}

pub fn can_see_project<U: UserContext + ?Sized>(project: &Project, user: &U) -> bool {
    match user.role() {
        Some(Role::Employer) => true,
        Some(Role::Worker) => project.has_worker(user.id()),
        Some(Role::Supplier) => project.status == ProjectStatus::Active,
        None => false,
    }
}

pub fn can_see_work_log<U: UserContext + ?Sized>(log: &WorkLog, user: &U) -> bool {
    match user.role() {
        Some(Role::Employer) => true,
        Some(Role::Worker) => is_author(log, user),
        Some(Role::Supplier) | None => false,
    }
}

pub fn can_see_material_request<U: UserContext + ?Sized>(request: &MaterialRequest, user: &U) -> bool {
    match user.role() {
        Some(Role::Employer) | Some(Role::Supplier) => true,
        Some(Role::Worker) => is_author(request, user),
        None => false,
    }
}

pub fn can_see_movement<U: UserContext + ?Sized>(movement: &MaterialMovement, user: &U) -> bool {
    match user.role() {
        Some(Role::Employer) | Some(Role::Supplier) => true,
        Some(Role::Worker) => is_author(movement, user),
        None => false,
    }
}

/// Whether `user` may record work or material entries against `project`.
///
/// Workers log against the projects they are assigned to, whatever their
/// status; everyone else logs against active sites only.
pub fn can_log_against<U: UserContext + ?Sized>(project: &Project, user: &U) -> bool {
    match user.role() {
        Some(Role::Worker) => project.has_worker(user.id()),
        Some(Role::Employer) | Some(Role::Supplier) => project.is_active(),
        None => false,
    }
}

pub fn visible_projects<U: UserContext + ?Sized>(all: &[Project], user: &U) -> Vec<Project> {
    all.iter()
        .filter(|p| can_see_project(p, user))
        .cloned()
        .collect()
}

pub fn visible_work_logs<U: UserContext + ?Sized>(all: &[WorkLog], user: &U) -> Vec<WorkLog> {
    all.iter()
        .filter(|l| can_see_work_log(l, user))
        .cloned()
        .collect()
}

pub fn visible_material_requests<U: UserContext + ?Sized>(
    all: &[MaterialRequest],
    user: &U,
) -> Vec<MaterialRequest> {
    all.iter()
        .filter(|r| can_see_material_request(r, user))
        .cloned()
        .collect()
}

pub fn visible_movements<U: UserContext + ?Sized>(
    all: &[MaterialMovement],
    user: &U,
) -> Vec<MaterialMovement> {
    all.iter()
        .filter(|m| can_see_movement(m, user))
        .cloned()
        .collect()
}

/// Projects offered in the entry forms
pub fn loggable_projects<U: UserContext + ?Sized>(all: &[Project], user: &U) -> Vec<Project> {
    all.iter()
        .filter(|p| can_log_against(p, user))
        .cloned()
        .collect()
}
