//! Material request contracts
//!
//! Workers submit requests for projects they are assigned to; employers
//! and suppliers triage them.

use bt_core::error::{TrackerError, ValidationErrors};
use bt_core::traits::Id;
use bt_models::{
    MaterialRequest, Project, RequestStatus, RequestTransition, Role, Urgency,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::base::{present, UserContext};

/// Unit used when neither the form nor the catalogue names one
pub const DEFAULT_UNIT: &str = "pcs";

/// Material request form as submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequestInput {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub material_name: Option<String>,
    #[serde(default)]
    pub requested_quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// An accepted request, not yet stored. Always `pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRequestDraft {
    pub project_id: Id,
    pub material_name: String,
    pub requested_quantity: f64,
    pub unit: Option<String>,
    pub urgency: Urgency,
    pub reason: String,
    pub notes: Option<String>,
    pub status: RequestStatus,
}

impl MaterialRequestDraft {
    /// `catalog_unit` is the unit of the catalogued material with the same
    /// name, used when the form left the unit blank.
    pub fn into_request<U: UserContext + ?Sized>(
        self,
        id: Id,
        requester: &U,
        project: &Project,
        catalog_unit: Option<&str>,
        on: NaiveDate,
    ) -> MaterialRequest {
        let unit = self
            .unit
            .or_else(|| catalog_unit.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_UNIT.to_string());

        MaterialRequest {
            id,
            worker_id: requester.id().to_string(),
            worker_name: requester.name().to_string(),
            project_id: self.project_id,
            project_name: project.name.clone(),
            material_name: self.material_name,
            requested_quantity: self.requested_quantity,
            unit,
            urgency: self.urgency,
            reason: self.reason,
            notes: self.notes,
            status: self.status,
            request_date: on,
            approved_by: None,
            approved_by_id: None,
            approved_date: None,
            fulfilled_date: None,
            rejection_reason: None,
        }
    }
}

/// Validate a material request form.
///
/// Required, in order: project, material name, quantity, urgency, reason.
pub fn validate_material_request(input: &MaterialRequestInput) -> Result<MaterialRequestDraft, TrackerError> {
    let project_id = present(input.project_id.as_ref()).ok_or_else(|| TrackerError::missing("project"))?;
    let material_name =
        present(input.material_name.as_ref()).ok_or_else(|| TrackerError::missing("material_name"))?;
    let quantity = input
        .requested_quantity
        .ok_or_else(|| TrackerError::missing("requested_quantity"))?;
    let urgency = present(input.urgency.as_ref()).ok_or_else(|| TrackerError::missing("urgency"))?;
    let reason = present(input.reason.as_ref()).ok_or_else(|| TrackerError::missing("reason"))?;

    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(TrackerError::invalid_quantity("requested_quantity", quantity));
    }

    let urgency = Urgency::parse(urgency).ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.add("urgency", "is not included in the list");
        TrackerError::Validation(errors)
    })?;

    Ok(MaterialRequestDraft {
        project_id: project_id.to_string(),
        material_name: material_name.to_string(),
        requested_quantity: quantity,
        unit: present(input.unit.as_ref()).map(str::to_string),
        urgency,
        reason: reason.to_string(),
        notes: present(input.notes.as_ref()).map(str::to_string),
        status: RequestStatus::Pending,
    })
}

/// Role gate for material requests
pub struct MaterialRequestPolicy<'a, U: UserContext + ?Sized> {
    user: &'a U,
}

impl<'a, U: UserContext + ?Sized> MaterialRequestPolicy<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    /// Only workers submit, and only for projects they are assigned to
    pub fn check_submit(&self, project: &Project) -> Result<(), TrackerError> {
        if !self.user.has_role(Role::Worker) {
            return Err(TrackerError::access_denied("submit material requests"));
        }
        if !project.has_worker(self.user.id()) {
            return Err(TrackerError::access_denied(format!(
                "request materials for project {}",
                project.id
            )));
        }
        Ok(())
    }

    /// Approve, reject and fulfill belong to employers and suppliers
    pub fn check_transition(&self, transition: &RequestTransition) -> Result<(), TrackerError> {
        match self.user.role() {
            Some(Role::Employer) | Some(Role::Supplier) => Ok(()),
            Some(Role::Worker) | None => Err(TrackerError::access_denied(format!(
                "{} material requests",
                transition.verb()
            ))),
        }
    }

    /// Role check followed by the state machine. `request` is untouched on
    /// failure.
    pub fn apply(
        &self,
        request: &mut MaterialRequest,
        transition: RequestTransition,
        on: NaiveDate,
    ) -> Result<(), TrackerError> {
        self.check_transition(&transition)?;
        request.transition(transition, self.user.id(), self.user.name(), on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_models::fixtures;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 25).unwrap()
    }

    fn user(id: &str) -> bt_models::User {
        fixtures::users().into_iter().find(|u| u.id == id).unwrap()
    }

    fn input() -> MaterialRequestInput {
        MaterialRequestInput {
            project_id: Some("proj-1".into()),
            material_name: Some("Cement".into()),
            requested_quantity: Some(250.0),
            unit: None,
            urgency: Some("high".into()),
            reason: Some("Foundation pour next week".into()),
            notes: Some("  ".into()),
        }
    }

    fn pending() -> MaterialRequest {
        fixtures::material_requests()
            .into_iter()
            .find(|r| r.status == RequestStatus::Pending)
            .unwrap()
    }

    #[test]
    fn test_valid_request_starts_pending() {
        let draft = validate_material_request(&input()).unwrap();
        assert_eq!(draft.status, RequestStatus::Pending);
        assert_eq!(draft.urgency, Urgency::High);
        assert_eq!(draft.notes, None);

        let farid = user("worker-1");
        let project = fixtures::projects().remove(0);
        let request = draft.into_request("req-9".into(), &farid, &project, Some("kg"), today());
        assert_eq!(request.unit, "kg");
        assert_eq!(request.worker_name, "Farid Nazarov");
        assert_eq!(request.project_name, "Residential Complex A");
        assert_eq!(request.status, RequestStatus::Pending);
    }

    #[test]
    fn test_unit_falls_back_to_pcs() {
        let farid = user("worker-1");
        let project = fixtures::projects().remove(0);
        let request = validate_material_request(&input())
            .unwrap()
            .into_request("req-9".into(), &farid, &project, None, today());
        assert_eq!(request.unit, DEFAULT_UNIT);
    }

    #[test]
    fn test_missing_fields_in_order() {
        let cases: Vec<(fn(&mut MaterialRequestInput), &str)> = vec![
            (|i| i.project_id = None, "project"),
            (|i| i.material_name = Some(" ".into()), "material_name"),
            (|i| i.requested_quantity = None, "requested_quantity"),
            (|i| i.urgency = None, "urgency"),
            (|i| i.reason = Some(String::new()), "reason"),
        ];
        for (clear, expected) in cases {
            let mut form = input();
            clear(&mut form);
            let err = validate_material_request(&form).unwrap_err();
            assert!(
                matches!(err, TrackerError::MissingField { field } if field == expected),
                "{}",
                expected
            );
        }
    }

    #[test]
    fn test_quantity_must_be_positive() {
        for quantity in [0.0, -3.0] {
            let mut form = input();
            form.requested_quantity = Some(quantity);
            let err = validate_material_request(&form).unwrap_err();
            assert!(matches!(err, TrackerError::InvalidQuantity { .. }));
        }
    }

    #[test]
    fn test_unknown_urgency() {
        let mut form = input();
        form.urgency = Some("critical".into());
        let err = validate_material_request(&form).unwrap_err();
        match err {
            TrackerError::Validation(errors) => assert!(errors.has_error("urgency")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_only_assigned_workers_submit() {
        let projects = fixtures::projects();
        let farid = user("worker-1");
        assert!(MaterialRequestPolicy::new(&farid).check_submit(&projects[0]).is_ok());
        assert!(MaterialRequestPolicy::new(&farid).check_submit(&projects[1]).is_err());

        let employer = user("employer-1");
        let err = MaterialRequestPolicy::new(&employer)
            .check_submit(&projects[0])
            .unwrap_err();
        assert!(matches!(err, TrackerError::AccessDenied { .. }));
    }

    #[test]
    fn test_worker_cannot_approve() {
        let farid = user("worker-1");
        let mut request = pending();
        let before = request.clone();
        let err = MaterialRequestPolicy::new(&farid)
            .apply(&mut request, RequestTransition::Approve, today())
            .unwrap_err();
        assert!(matches!(err, TrackerError::AccessDenied { .. }));
        assert_eq!(request, before);
    }

    #[test]
    fn test_employer_and_supplier_triage() {
        let employer = user("employer-1");
        let supplier = user("supplier-1");

        let mut request = pending();
        MaterialRequestPolicy::new(&employer)
            .apply(&mut request, RequestTransition::Approve, today())
            .unwrap();
        assert_eq!(request.approved_by_id.as_deref(), Some("employer-1"));

        MaterialRequestPolicy::new(&supplier)
            .apply(&mut request, RequestTransition::Fulfill, today())
            .unwrap();
        assert_eq!(request.status, RequestStatus::Fulfilled);
    }

    #[test]
    fn test_reject_without_reason_fails() {
        let supplier = user("supplier-1");
        let mut request = pending();
        let err = MaterialRequestPolicy::new(&supplier)
            .apply(&mut request, RequestTransition::Reject { reason: String::new() }, today())
            .unwrap_err();
        assert!(matches!(err, TrackerError::MissingRejectionReason));
        assert_eq!(request.status, RequestStatus::Pending);
    }
}
