//! Production-tracking collaborator.
//!
//! Ingest needs a read-only snapshot of the project and its assets. The
//! tracker that supplies it is injected by the caller; [`CatalogTracker`]
//! serves it from a JSON snapshot exported by the tracking system.

use serde::{Deserialize, Serialize};
use shotforged_common::{Error, Result};
use std::path::Path;
use tracing::debug;

/// A shot or asset known to the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub name: String,
    /// Task names set up on the asset.
    #[serde(default)]
    pub tasks: Vec<String>,
}

impl AssetRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub name: String,
    /// Short show code, as found in `/proj/{code}` paths.
    pub code: String,
    #[serde(default)]
    pub assets: Vec<AssetRecord>,
}

/// Read-only queries ingest makes against the tracking system.
pub trait ProductionTracker: Send + Sync {
    /// Project whose show code matches `code`, ignoring case.
    fn project_by_code(&self, code: &str) -> Option<ProjectRecord>;

    /// Every asset of `project_name`, in tracker order.
    fn assets(&self, project_name: &str) -> Vec<AssetRecord>;
}

#[derive(Debug, Default, Deserialize)]
struct Catalog {
    #[serde(default)]
    projects: Vec<ProjectRecord>,
}

/// Tracker backed by an in-memory snapshot.
#[derive(Debug, Clone, Default)]
pub struct CatalogTracker {
    projects: Vec<ProjectRecord>,
}

impl CatalogTracker {
    pub fn new(projects: Vec<ProjectRecord>) -> Self {
        Self { projects }
    }

    /// Parse a `{"projects": [...]}` snapshot.
    pub fn from_json(content: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(content)?;
        Ok(Self::new(catalog.projects))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::not_found(format!("catalog {}", path.display())));
        }
        let content = std::fs::read_to_string(path)?;
        let tracker = Self::from_json(&content)?;
        debug!(
            "Loaded {} projects from catalog {:?}",
            tracker.projects.len(),
            path
        );
        Ok(tracker)
    }
}

impl ProductionTracker for CatalogTracker {
    fn project_by_code(&self, code: &str) -> Option<ProjectRecord> {
        self.projects
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code))
            .cloned()
    }

    fn assets(&self, project_name: &str) -> Vec<AssetRecord> {
        self.projects
            .iter()
            .find(|p| p.name == project_name)
            .map(|p| p.assets.clone())
            .unwrap_or_default()
    }
}
