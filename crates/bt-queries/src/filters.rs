//! List filters
//!
//! Filters are applied after visibility, so they can only narrow what a
//! user already sees.

use bt_models::{
    Authored, Material, MaterialRequest, Project, ProjectScoped, ProjectStatus, RequestStatus, WorkLog,
};
use serde::{Deserialize, Serialize};

use crate::metrics::{stock_level, StockLevel};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn normalized(search: &Option<String>) -> Option<String> {
    search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// Whether `item` belongs to `project_id`; no project means any
fn in_project<T: ProjectScoped + ?Sized>(item: &T, project_id: Option<&str>) -> bool {
    project_id.map_or(true, |p| item.belongs_to(p))
}

/// Items recorded against one project, in their original order
pub fn for_project<T: ProjectScoped + Clone>(items: &[T], project_id: &str) -> Vec<T> {
    items.iter().filter(|i| i.belongs_to(project_id)).cloned().collect()
}

/// Project search over name, description and location, plus status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
}

impl ProjectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn status(mut self, status: ProjectStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, project: &Project) -> bool {
        if let Some(status) = self.status {
            if project.status != status {
                return false;
            }
        }
        match normalized(&self.search) {
            Some(term) => {
                contains_ci(&project.name, &term)
                    || contains_ci(&project.description, &term)
                    || contains_ci(&project.location, &term)
            }
            None => true,
        }
    }

    pub fn apply(&self, projects: &[Project]) -> Vec<Project> {
        projects.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

/// Material search over name and supplier, plus stock level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub stock_level: Option<StockLevel>,
}

impl MaterialFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn stock_level(mut self, level: StockLevel) -> Self {
        self.stock_level = Some(level);
        self
    }

    pub fn matches(&self, material: &Material) -> bool {
        if let Some(level) = self.stock_level {
            if stock_level(material) != level {
                return false;
            }
        }
        match normalized(&self.search) {
            Some(term) => contains_ci(&material.name, &term) || contains_ci(&material.supplier, &term),
            None => true,
        }
    }

    pub fn apply(&self, materials: &[Material]) -> Vec<Material> {
        materials.iter().filter(|m| self.matches(m)).cloned().collect()
    }
}

/// Request status filter; no status means all
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestFilter {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl RequestFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: RequestStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn matches(&self, request: &MaterialRequest) -> bool {
        self.status.map_or(true, |s| request.status == s)
            && in_project(request, self.project_id.as_deref())
    }

    pub fn apply(&self, requests: &[MaterialRequest]) -> Vec<MaterialRequest> {
        requests.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Work log filter by project and worker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkLogFilter {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub worker_id: Option<String>,
}

impl WorkLogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn worker(mut self, worker_id: impl Into<String>) -> Self {
        self.worker_id = Some(worker_id.into());
        self
    }

    pub fn matches(&self, log: &WorkLog) -> bool {
        in_project(log, self.project_id.as_deref())
            && self.worker_id.as_deref().map_or(true, |w| log.author_id() == w)
    }

    pub fn apply(&self, logs: &[WorkLog]) -> Vec<WorkLog> {
        logs.iter().filter(|l| self.matches(l)).cloned().collect()
    }
}

/// Number of projects per status, as shown on the status tabs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCounts {
    pub all: usize,
    pub planning: usize,
    pub active: usize,
    pub paused: usize,
    pub completed: usize,
}

pub fn project_counts(projects: &[Project]) -> ProjectCounts {
    projects.iter().fold(ProjectCounts::default(), |mut counts, p| {
        counts.all += 1;
        match p.status {
            ProjectStatus::Planning => counts.planning += 1,
            ProjectStatus::Active => counts.active += 1,
            ProjectStatus::Paused => counts.paused += 1,
            ProjectStatus::Completed => counts.completed += 1,
        }
        counts
    })
}

/// Number of materials per stock level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StockLevelCounts {
    pub low_stock: usize,
    pub medium_stock: usize,
    pub well_stocked: usize,
}

pub fn stock_level_counts(materials: &[Material]) -> StockLevelCounts {
    materials
        .iter()
        .fold(StockLevelCounts::default(), |mut counts, m| {
            match stock_level(m) {
                StockLevel::Low => counts.low_stock += 1,
                StockLevel::Medium => counts.medium_stock += 1,
                StockLevel::WellStocked => counts.well_stocked += 1,
            }
            counts
        })
}
