//! Shotforged-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across shotforged:
//!
//! - **Core Types**: Enums for product families, outsource tasks, override
//!   levels and delivery types
//! - **Extension Tables**: Extension to family / representation lookups and the
//!   single-file extension list used by delivery
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use shotforged_common::{Family, EntityLevel, Error, Result};
//! use shotforged_common::paths::{family_for_extension, representation_name};
//!
//! assert_eq!(family_for_extension(".exr"), Some(Family::Render));
//! assert_eq!(representation_name(".nk"), "nuke");
//! assert!(EntityLevel::Shot < EntityLevel::Project);
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("project"))
//! }
//! ```

pub mod error;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
