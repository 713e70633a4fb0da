//! Structured report items shared by ingest, publish and delivery flows.

use serde::Serialize;
use std::fmt;

/// One report heading and the messages filed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportCategory {
    pub name: String,
    pub messages: Vec<String>,
}

/// Human-readable messages grouped by category, in the order categories were
/// first reported.
///
/// ```
/// use shotforged::report::ReportItems;
///
/// let mut report = ReportItems::new();
/// report.push("Unassigned files", "/pkg/notes.pdf");
/// report.push("Unassigned files", "/pkg/readme.txt");
/// assert_eq!(report.get("Unassigned files").len(), 2);
/// assert!(report.get("Missing").is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReportItems {
    categories: Vec<ReportCategory>,
}

impl ReportItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: &str, message: impl Into<String>) {
        let message = message.into();
        match self.categories.iter_mut().find(|c| c.name == category) {
            Some(existing) => existing.messages.push(message),
            None => self.categories.push(ReportCategory {
                name: category.to_string(),
                messages: vec![message],
            }),
        }
    }

    /// Append every message of `other`, keeping category order.
    pub fn extend(&mut self, other: ReportItems) {
        for category in other.categories {
            for message in category.messages {
                self.push(&category.name, message);
            }
        }
    }

    pub fn get(&self, category: &str) -> &[String] {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReportCategory> {
        self.categories.iter()
    }
}

impl fmt::Display for ReportItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for category in &self.categories {
            writeln!(f, "{}:", category.name)?;
            for message in &category.messages {
                writeln!(f, "  - {}", message)?;
            }
        }
        Ok(())
    }
}
