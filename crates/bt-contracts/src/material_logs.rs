//! Material usage and delivery entry contract
//!
//! Workers and employers log usage, which draws stock down. Suppliers log
//! deliveries, which add stock.

use bt_core::error::TrackerError;
use bt_core::traits::Id;
use bt_models::{Material, MaterialMovement, MovementKind, Project, Role};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::base::{present, UserContext};
use crate::visibility::can_log_against;

/// Material log form as submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLogInput {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub material_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// An accepted stock movement, not yet applied
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialLogDraft {
    pub project_id: Id,
    pub material_id: Id,
    pub material_name: String,
    pub unit: String,
    pub kind: MovementKind,
    pub quantity: f64,
    pub date: NaiveDate,
    pub notes: Option<String>,
    /// quantity x price per unit; shown to the user, never charged
    pub cost_preview: f64,
}

impl MaterialLogDraft {
    pub fn into_movement<U: UserContext + ?Sized>(
        self,
        id: Id,
        actor: &U,
        created_at: DateTime<Utc>,
    ) -> MaterialMovement {
        MaterialMovement {
            id,
            material_id: self.material_id,
            material_name: self.material_name,
            project_id: self.project_id,
            actor_id: actor.id().to_string(),
            actor_name: actor.name().to_string(),
            kind: self.kind,
            quantity: self.quantity,
            date: self.date,
            notes: self.notes,
            cost: self.cost_preview,
            created_at,
        }
    }
}

/// Movement kind a role records, `None` when the role may not log materials
pub fn movement_kind_for(role: Option<Role>) -> Option<MovementKind> {
    match role {
        Some(Role::Worker) | Some(Role::Employer) => Some(MovementKind::Usage),
        Some(Role::Supplier) => Some(MovementKind::Delivery),
        None => None,
    }
}

/// Validate a material log form against the current stock record.
///
/// A usage of exactly the remaining quantity is accepted.
pub fn validate_material_log_entry(
    input: &MaterialLogInput,
    material: Option<&Material>,
    kind: MovementKind,
    today: NaiveDate,
) -> Result<MaterialLogDraft, TrackerError> {
    let project_id = present(input.project_id.as_ref()).ok_or_else(|| TrackerError::missing("project"))?;

    let material = match (present(input.material_id.as_ref()), material) {
        (Some(_), Some(material)) => material,
        _ => return Err(TrackerError::missing("material")),
    };

    let quantity = input
        .quantity
        .ok_or_else(|| TrackerError::missing("quantity"))?;
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(TrackerError::invalid_quantity("quantity", quantity));
    }

    if kind == MovementKind::Usage && quantity > material.remaining_quantity {
        return Err(TrackerError::InsufficientStock {
            material: material.name.clone(),
            requested: quantity,
            remaining: material.remaining_quantity,
        });
    }

    Ok(MaterialLogDraft {
        project_id: project_id.to_string(),
        material_id: material.id.clone(),
        material_name: material.name.clone(),
        unit: material.unit.clone(),
        kind,
        quantity,
        date: input.date.unwrap_or(today),
        notes: present(input.notes.as_ref()).map(str::to_string),
        cost_preview: quantity * material.price_per_unit,
    })
}

/// Who may log materials where
pub struct MaterialLogPolicy<'a, U: UserContext + ?Sized> {
    user: &'a U,
}

impl<'a, U: UserContext + ?Sized> MaterialLogPolicy<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    /// Returns the movement kind the user records on `project`
    pub fn check(&self, project: &Project) -> Result<MovementKind, TrackerError> {
        let kind = movement_kind_for(self.user.role())
            .ok_or_else(|| TrackerError::access_denied("log materials"))?;

        if !can_log_against(project, self.user) {
            return Err(TrackerError::access_denied(format!(
                "log materials on project {}",
                project.id
            )));
        }
        Ok(kind)
    }
}
