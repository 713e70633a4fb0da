//! # shotforged-parser
//!
//! Frame-sequence collection and vendor filename matching.
//!
//! Vendors deliver files named however they like. This crate groups a file
//! listing into frame sequences, then pulls a shot code, subset, task,
//! variant and delivery version out of each name with an ordered cascade of
//! match strategies, reporting how much each result can be trusted.
//!
//! ## Quick Start
//!
//! ```
//! use shotforged_parser::{classify, Confidence, FilenameMatcher};
//! use shotforged_common::Family;
//!
//! let matcher = FilenameMatcher::builder()
//!     .entity_codes(["uni_pg_0455", "uni_pg_0460"])
//!     .build();
//!
//! let result = matcher.match_filename("uni_pg_0455_plt_01_roto_output-01_v001.1001.exr");
//! assert_eq!(result.confidence, Confidence::Strict);
//! assert_eq!(result.delivery_version, Some(1));
//!
//! let fields = classify(&result, matcher.tasks());
//! assert_eq!(fields.family, Family::Render);
//! assert_eq!(fields.representation_name, "exr");
//! ```
//!
//! ## Sequences
//!
//! ```
//! use shotforged_parser::SequenceCollector;
//!
//! let groups = SequenceCollector::new().collect(&[
//!     "/pkg/plate.1002.exr",
//!     "/pkg/plate.1001.exr",
//!     "/pkg/edit.mov",
//! ]);
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups[1].format_pattern(), "/pkg/plate.%04d.exr");
//! assert_eq!(groups[1].frame_range(), Some((1001, 1002)));
//! ```

pub mod classify;
pub mod frames;
pub mod matcher;
pub mod model;
pub mod sequence;
pub mod version;

pub use classify::{classify, Classification};
pub use matcher::{match_filename, FilenameMatcher, FilenameMatcherBuilder, MatchStrategy};
pub use model::{Confidence, MatchResult};
pub use sequence::{SequenceCollector, SequenceGroup};

/// Group a flat file listing into sequences and single files.
///
/// Shorthand for [`SequenceCollector::collect`] with default settings.
pub fn collect_sequences<S: AsRef<str>>(files: &[S]) -> Vec<SequenceGroup> {
    SequenceCollector::new().collect(files)
}
