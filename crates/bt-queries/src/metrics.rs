//! Derived metrics
//!
//! Pure reductions over collections that have already been narrowed by the
//! visibility rules. Every ratio is guarded against a zero denominator.

use bt_models::{Material, MaterialRequest, Project, RequestStatus, WorkLog};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Below this share of total stock a material is low
pub const LOW_STOCK_RATIO: f64 = 0.2;
/// At or above this share a material is well stocked
pub const WELL_STOCKED_RATIO: f64 = 0.8;

/// completed / total x 100; 0 for a project without area
pub fn progress_percentage(project: &Project) -> f64 {
    if project.total_area == 0.0 {
        return 0.0;
    }
    project.completed_area / project.total_area * 100.0
}

/// spent / budget x 100; 0 for a project without budget. Exceeds 100 when
/// the project is over budget.
pub fn budget_used_percentage(project: &Project) -> f64 {
    if project.budget == 0.0 {
        return 0.0;
    }
    project.spent_amount / project.budget * 100.0
}

/// remaining / total; 0 for a material never stocked
pub fn stock_ratio(material: &Material) -> f64 {
    if material.total_quantity == 0.0 {
        return 0.0;
    }
    material.remaining_quantity / material.total_quantity
}

/// used / total x 100
pub fn used_percentage(material: &Material) -> f64 {
    if material.total_quantity == 0.0 {
        return 0.0;
    }
    material.used_quantity / material.total_quantity * 100.0
}

/// Stock health classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockLevel {
    #[serde(rename = "low-stock")]
    Low,
    #[serde(rename = "medium-stock")]
    Medium,
    #[serde(rename = "well-stocked")]
    WellStocked,
}

impl StockLevel {
    pub fn classify(ratio: f64) -> Self {
        if ratio < LOW_STOCK_RATIO {
            StockLevel::Low
        } else if ratio < WELL_STOCKED_RATIO {
            StockLevel::Medium
        } else {
            StockLevel::WellStocked
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockLevel::Low => "low-stock",
            StockLevel::Medium => "medium-stock",
            StockLevel::WellStocked => "well-stocked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "low-stock" | "low" => Some(StockLevel::Low),
            "medium-stock" | "medium" => Some(StockLevel::Medium),
            "well-stocked" => Some(StockLevel::WellStocked),
            _ => None,
        }
    }
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn stock_level(material: &Material) -> StockLevel {
    StockLevel::classify(stock_ratio(material))
}

pub fn worker_earnings_total(worker_id: &str, logs: &[WorkLog]) -> f64 {
    logs.iter()
        .filter(|l| l.worker_id == worker_id)
        .map(|l| l.earnings)
        .sum()
}

pub fn worker_area_total(worker_id: &str, logs: &[WorkLog]) -> f64 {
    logs.iter()
        .filter(|l| l.worker_id == worker_id)
        .map(|l| l.area_completed)
        .sum()
}

/// Value of stock consumed so far: sum of used x price
pub fn delivered_value(materials: &[Material]) -> f64 {
    materials
        .iter()
        .map(|m| m.used_quantity * m.price_per_unit)
        .sum()
}

/// Number of requests in each status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub fulfilled: usize,
}

impl RequestCounts {
    pub fn get(&self, status: RequestStatus) -> usize {
        match status {
            RequestStatus::Pending => self.pending,
            RequestStatus::Approved => self.approved,
            RequestStatus::Rejected => self.rejected,
            RequestStatus::Fulfilled => self.fulfilled,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.approved + self.rejected + self.fulfilled
    }

    /// Pending and approved: still need action
    pub fn open(&self) -> usize {
        self.pending + self.approved
    }
}

pub fn request_counts(requests: &[MaterialRequest]) -> RequestCounts {
    requests
        .iter()
        .fold(RequestCounts::default(), |mut counts, request| {
            match request.status {
                RequestStatus::Pending => counts.pending += 1,
                RequestStatus::Approved => counts.approved += 1,
                RequestStatus::Rejected => counts.rejected += 1,
                RequestStatus::Fulfilled => counts.fulfilled += 1,
            }
            counts
        })
}
