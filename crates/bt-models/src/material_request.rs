//! Material request model and its lifecycle
//!
//! Table: material_requests
//!
//! ```text
//! pending ──approve──> approved ──fulfill──> fulfilled
//!    └─────reject────> rejected
//! ```
//! `fulfilled` and `rejected` are terminal.

use bt_core::error::TrackerError;
use bt_core::traits::{Authored, Id, Identifiable, ProjectScoped};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Fulfilled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::Fulfilled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Fulfilled => "fulfilled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "fulfilled" => Some(Self::Fulfilled),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Approved, Self::Fulfilled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Fulfilled)
    }

    /// Still awaiting action from an employer or supplier
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency chosen by the requesting worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// A requested change of status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTransition {
    Approve,
    Reject { reason: String },
    Fulfill,
}

impl RequestTransition {
    pub fn target(&self) -> RequestStatus {
        match self {
            Self::Approve => RequestStatus::Approved,
            Self::Reject { .. } => RequestStatus::Rejected,
            Self::Fulfill => RequestStatus::Fulfilled,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject { .. } => "reject",
            Self::Fulfill => "fulfill",
        }
    }
}

/// Material request entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequest {
    pub id: Id,
    pub worker_id: Id,
    pub worker_name: String,
    pub project_id: Id,
    pub project_name: String,
    /// Free-text name; may not match a catalogued material
    pub material_name: String,
    pub requested_quantity: f64,
    pub unit: String,
    pub urgency: Urgency,
    pub reason: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: RequestStatus,
    pub request_date: NaiveDate,
    /// Who approved or rejected the request
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub approved_by_id: Option<Id>,
    #[serde(default)]
    pub approved_date: Option<NaiveDate>,
    #[serde(default)]
    pub fulfilled_date: Option<NaiveDate>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

impl MaterialRequest {
    /// Apply a status change on behalf of `actor`.
    ///
    /// A rejection without a reason fails with `MissingRejectionReason`
    /// whatever the current status; the state machine is checked after.
    /// Nothing is modified when the change is not allowed.
    pub fn transition(
        &mut self,
        transition: RequestTransition,
        actor_id: &str,
        actor_name: &str,
        on: NaiveDate,
    ) -> Result<(), TrackerError> {
        if let RequestTransition::Reject { reason } = &transition {
            if reason.trim().is_empty() {
                return Err(TrackerError::MissingRejectionReason);
            }
        }

        let target = transition.target();
        if !self.status.can_transition_to(target) {
            return Err(TrackerError::InvalidStateTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }

        match transition {
            RequestTransition::Reject { reason } => {
                self.rejection_reason = Some(reason.trim().to_string());
                self.record_resolution(actor_id, actor_name, on);
            }
            RequestTransition::Approve => self.record_resolution(actor_id, actor_name, on),
            RequestTransition::Fulfill => self.fulfilled_date = Some(on),
        }

        self.status = target;
        Ok(())
    }

    fn record_resolution(&mut self, actor_id: &str, actor_name: &str, on: NaiveDate) {
        self.approved_by = Some(actor_name.to_string());
        self.approved_by_id = Some(actor_id.to_string());
        self.approved_date = Some(on);
    }
}

impl Identifiable for MaterialRequest {
    fn id(&self) -> &str {
        &self.id
    }
}

impl ProjectScoped for MaterialRequest {
    fn project_id(&self) -> &str {
        &self.project_id
    }
}

impl Authored for MaterialRequest {
    fn author_id(&self) -> &str {
        &self.worker_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 25).unwrap()
    }

    fn pending_request() -> MaterialRequest {
        fixtures::material_requests()
            .into_iter()
            .find(|r| r.status == RequestStatus::Pending)
            .unwrap()
    }

    #[test]
    fn test_allowed_transitions() {
        use RequestStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Fulfilled));

        assert!(!Pending.can_transition_to(Fulfilled));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Pending));
        for next in RequestStatus::ALL {
            assert!(!Fulfilled.can_transition_to(next));
            assert!(!Rejected.can_transition_to(next));
        }
    }

    #[test]
    fn test_approve_then_fulfill() {
        let mut request = pending_request();
        request
            .transition(RequestTransition::Approve, "employer-1", "Ahmad Rahimi", today())
            .unwrap();
        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(request.approved_by.as_deref(), Some("Ahmad Rahimi"));
        assert_eq!(request.approved_date, Some(today()));

        request
            .transition(RequestTransition::Fulfill, "supplier-1", "Gulnora Supply Co.", today())
            .unwrap();
        assert_eq!(request.status, RequestStatus::Fulfilled);
        assert_eq!(request.fulfilled_date, Some(today()));
        assert!(request.status.is_terminal());
    }

    #[test]
    fn test_reject_requires_reason() {
        let mut request = pending_request();
        let before = request.clone();

        let err = request
            .transition(
                RequestTransition::Reject { reason: "   ".into() },
                "employer-1",
                "Ahmad Rahimi",
                today(),
            )
            .unwrap_err();
        assert!(matches!(err, TrackerError::MissingRejectionReason));
        assert_eq!(request, before);

        request
            .transition(
                RequestTransition::Reject { reason: " Over budget ".into() },
                "employer-1",
                "Ahmad Rahimi",
                today(),
            )
            .unwrap();
        assert_eq!(request.status, RequestStatus::Rejected);
        assert_eq!(request.rejection_reason.as_deref(), Some("Over budget"));
    }

    #[test]
    fn test_blank_reason_fails_in_every_status() {
        for status in RequestStatus::ALL {
            let mut request = pending_request();
            request.status = status;
            let err = request
                .transition(
                    RequestTransition::Reject { reason: String::new() },
                    "employer-1",
                    "Ahmad Rahimi",
                    today(),
                )
                .unwrap_err();
            assert!(matches!(err, TrackerError::MissingRejectionReason), "{}", status);
            assert_eq!(request.status, status);
        }

        let mut approved = pending_request();
        approved.status = RequestStatus::Approved;
        let err = approved
            .transition(
                RequestTransition::Reject { reason: "Too late".into() },
                "employer-1",
                "Ahmad Rahimi",
                today(),
            )
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidStateTransition { .. }));
    }

    #[test]
    fn test_no_transition_out_of_terminal_states() {
        let mut request = pending_request();
        request
            .transition(RequestTransition::Approve, "employer-1", "Ahmad Rahimi", today())
            .unwrap();
        request
            .transition(RequestTransition::Fulfill, "employer-1", "Ahmad Rahimi", today())
            .unwrap();

        let err = request
            .transition(RequestTransition::Approve, "employer-1", "Ahmad Rahimi", today())
            .unwrap_err();
        assert!(matches!(
            err,
            TrackerError::InvalidStateTransition { ref from, ref to } if from == "fulfilled" && to == "approved"
        ));
    }

    #[test]
    fn test_fulfill_requires_approval() {
        let mut request = pending_request();
        let err = request
            .transition(RequestTransition::Fulfill, "supplier-1", "Gulnora Supply Co.", today())
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidStateTransition { .. }));
        assert_eq!(request.status, RequestStatus::Pending);
    }
}
