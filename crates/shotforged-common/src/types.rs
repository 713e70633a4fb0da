//! Core type definitions for products, tasks, and delivery overrides.
//!
//! This module defines enums used throughout shotforged for classifying
//! ingested products and for walking the delivery override hierarchy. All
//! enums are serialized in snake_case, which is also how the production
//! tracker spells them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse content-type classification of a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Rendered image sequences.
    Render,
    /// Alembic geometry caches.
    Pointcache,
    /// Camera exports.
    Camera,
    /// Reference movies.
    Reference,
    /// DCC work files (Nuke, Maya, Houdini, ...).
    Workfile,
    /// Lens distortion data.
    Distortion,
    /// CDL color corrections.
    ColorGrade,
    /// No family could be inferred.
    Unknown,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Render => "render",
            Self::Pointcache => "pointcache",
            Self::Camera => "camera",
            Self::Reference => "reference",
            Self::Workfile => "workfile",
            Self::Distortion => "distortion",
            Self::ColorGrade => "color_grade",
            Self::Unknown => "unknown",
        }
    }

    /// Whether a family was actually inferred.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Family {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "render" => Ok(Self::Render),
            "pointcache" => Ok(Self::Pointcache),
            "camera" => Ok(Self::Camera),
            "reference" => Ok(Self::Reference),
            "workfile" => Ok(Self::Workfile),
            "distortion" => Ok(Self::Distortion),
            "color_grade" => Ok(Self::ColorGrade),
            "unknown" => Ok(Self::Unknown),
            other => Err(crate::Error::invalid_input(format!(
                "unknown family '{other}'"
            ))),
        }
    }
}

/// Task types supported for outsourced work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutsourceTask {
    Roto,
    Paint,
    Comp,
    Track,
    Edit,
}

impl OutsourceTask {
    /// All outsource tasks in keyword-scan order.
    pub const ALL: [OutsourceTask; 5] = [
        OutsourceTask::Roto,
        OutsourceTask::Paint,
        OutsourceTask::Comp,
        OutsourceTask::Track,
        OutsourceTask::Edit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roto => "roto",
            Self::Paint => "paint",
            Self::Comp => "comp",
            Self::Track => "track",
            Self::Edit => "edit",
        }
    }

    /// Default task names as owned strings, in keyword-scan order.
    pub fn default_names() -> Vec<String> {
        Self::ALL.iter().map(|t| t.as_str().to_string()).collect()
    }
}

impl fmt::Display for OutsourceTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One level of the delivery override hierarchy.
///
/// Variants are declared from most to least specific, so the derived ordering
/// sorts a hierarchy specific-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityLevel {
    Shot,
    Sequence,
    Episode,
    Project,
}

impl EntityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shot => "Shot",
            Self::Sequence => "Sequence",
            Self::Episode => "Episode",
            Self::Project => "Project",
        }
    }
}

impl fmt::Display for EntityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-facing output pipeline a representation feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    Review,
    Final,
}

impl DeliveryType {
    pub const ALL: [DeliveryType; 2] = [DeliveryType::Review, DeliveryType::Final];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Final => "final",
        }
    }

    /// Tracker field holding the output types for this delivery type.
    pub fn output_type_field(&self) -> String {
        format!("sg_{}_output_type", self.as_str())
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "review" => Ok(Self::Review),
            "final" => Ok(Self::Final),
            other => Err(crate::Error::invalid_input(format!(
                "unknown delivery type '{other}'"
            ))),
        }
    }
}
