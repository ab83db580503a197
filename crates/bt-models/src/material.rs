//! Material and stock movement models
//!
//! Tables: materials, material_movements

use bt_core::error::TrackerError;
use bt_core::traits::{Authored, Id, Identifiable, ProjectScoped};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Units offered when cataloguing a material
pub const UNITS: &[&str] = &["kg", "m²", "L", "pcs", "m³", "m"];

/// Material stock record.
///
/// Invariant: `remaining_quantity == total_quantity - used_quantity`.
/// Every mutation goes through [`Material::apply_usage`] or
/// [`Material::apply_delivery`], which bump `lock_version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Id,
    pub name: String,
    pub unit: String,
    pub total_quantity: f64,
    pub used_quantity: f64,
    pub remaining_quantity: f64,
    pub price_per_unit: f64,
    pub supplier: String,
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub lock_version: i32,
}

impl Material {
    pub fn new(
        id: impl Into<Id>,
        name: impl Into<String>,
        unit: impl Into<String>,
        total_quantity: f64,
        price_per_unit: f64,
        supplier: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit: unit.into(),
            total_quantity,
            used_quantity: 0.0,
            remaining_quantity: total_quantity,
            price_per_unit,
            supplier: supplier.into(),
            delivery_date: None,
            lock_version: 0,
        }
    }

    /// Consume stock. Fails without touching the record when the
    /// quantity exceeds what remains.
    pub fn apply_usage(&mut self, quantity: f64) -> Result<(), TrackerError> {
        if quantity > self.remaining_quantity {
            return Err(TrackerError::InsufficientStock {
                material: self.name.clone(),
                requested: quantity,
                remaining: self.remaining_quantity,
            });
        }
        self.used_quantity += quantity;
        self.remaining_quantity = self.total_quantity - self.used_quantity;
        self.lock_version += 1;
        Ok(())
    }

    /// Receive stock from a supplier
    pub fn apply_delivery(&mut self, quantity: f64, date: NaiveDate) {
        self.total_quantity += quantity;
        self.remaining_quantity = self.total_quantity - self.used_quantity;
        self.delivery_date = Some(date);
        self.lock_version += 1;
    }

    pub fn is_consistent(&self) -> bool {
        (self.remaining_quantity - (self.total_quantity - self.used_quantity)).abs() < 1e-9
    }
}

impl Identifiable for Material {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Consumed on site
    Usage,
    /// Received from a supplier
    Delivery,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Usage => "usage",
            MovementKind::Delivery => "delivery",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "usage" => Some(MovementKind::Usage),
            "delivery" => Some(MovementKind::Delivery),
            _ => None,
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logged stock movement against a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialMovement {
    pub id: Id,
    pub material_id: Id,
    pub material_name: String,
    pub project_id: Id,
    pub actor_id: Id,
    pub actor_name: String,
    pub kind: MovementKind,
    pub quantity: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    /// quantity x price per unit at the time of logging
    pub cost: f64,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for MaterialMovement {
    fn id(&self) -> &str {
        &self.id
    }
}

impl ProjectScoped for MaterialMovement {
    fn project_id(&self) -> &str {
        &self.project_id
    }
}

impl Authored for MaterialMovement {
    fn author_id(&self) -> &str {
        &self.actor_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cement() -> Material {
        let mut m = Material::new("mat-1", "Cement", "kg", 5000.0, 0.8, "Gulnora Supply Co.");
        m.apply_usage(3200.0).unwrap();
        m
    }

    #[test]
    fn test_usage_keeps_invariant() {
        let mut m = cement();
        assert_eq!(m.remaining_quantity, 1800.0);
        m.apply_usage(1800.0).unwrap();
        assert_eq!(m.remaining_quantity, 0.0);
        assert_eq!(m.used_quantity, 5000.0);
        assert!(m.is_consistent());
    }

    #[test]
    fn test_usage_beyond_stock_leaves_record_untouched() {
        let mut m = cement();
        let before = m.clone();
        let err = m.apply_usage(1800.1).unwrap_err();
        assert!(matches!(err, TrackerError::InsufficientStock { .. }));
        assert_eq!(m, before);
    }

    #[test]
    fn test_delivery_adds_stock() {
        let mut m = cement();
        let version = m.lock_version;
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        m.apply_delivery(500.0, date);
        assert_eq!(m.total_quantity, 5500.0);
        assert_eq!(m.remaining_quantity, 2300.0);
        assert_eq!(m.delivery_date, Some(date));
        assert_eq!(m.lock_version, version + 1);
        assert!(m.is_consistent());
    }
}
