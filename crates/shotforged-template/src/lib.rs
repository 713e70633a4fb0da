//! Anatomy data and path templates for shotforged.
//!
//! Delivery paths and filenames are built from string templates rendered
//! against [`AnatomyData`], a nested token dictionary. Templates support
//! nested keys (`{task[short]}`), format specs (`{version:0>4}`) and optional
//! `<...>` segments that vanish when any of their tokens is unresolved.
//!
//! # Quick Start
//!
//! ```
//! use serde_json::json;
//! use shotforged_template::{format_template, format_template_strict, AnatomyData};
//!
//! let data = AnatomyData::from_value(json!({
//!     "package_name": "uni_AX_20260305",
//!     "output": "mov_review",
//!     "filename": "PG_0455_cmp_v0003_AX",
//!     "ext": "mov",
//! }))
//! .unwrap();
//!
//! let path = format_template_strict(
//!     "{package_name}/{output}/<{is_sequence}<{filename}/>>{filename}<.{frame:0>4}>.{ext}",
//!     &data,
//! )
//! .unwrap();
//! assert_eq!(path, "uni_AX_20260305/mov_review/PG_0455_cmp_v0003_AX.mov");
//!
//! // Lenient rendering keeps what it cannot resolve.
//! assert_eq!(format_template("{output}_{suffix}", &data).unwrap(), "mov_review_{suffix}");
//! ```

pub mod anatomy;
pub mod datetime;
pub mod error;
pub mod template;

pub use anatomy::{AnatomyData, Lookup};
pub use datetime::datetime_data;
pub use error::{Result, TemplateError};
pub use template::{format_template, format_template_strict, StringTemplate, TemplateResult};
