//! Vendor package ingestion.
//!
//! A package scan walks the delivered folder, groups each directory's files
//! into sequences, and runs every item through matching, entity resolution
//! and assembly. Per-item work is independent and may run on a rayon pool;
//! merging happens afterwards on one thread over path-sorted records so the
//! same package always yields the same products and conflicts.

pub mod assembler;
pub mod publish;
pub mod resolver;

use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use shotforged_parser::{FilenameMatcher, MatchResult, SequenceCollector};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::report::ReportItems;
use crate::tracking::AssetRecord;
use assembler::{merge_records, Assembler, Conflict, Product, PublishRecord};
use resolver::EntityResolver;

pub const UNASSIGNED: &str = "Unable to find enough information to publish";
pub const NEEDS_REVIEW: &str = "Matched with low confidence or missing fields";
pub const CONFLICTS: &str = "Duplicated representation in product";

/// Errors that stop a package scan.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Package folder not found: {0}")]
    FolderNotFound(PathBuf),

    #[error("No project code found in path '{0}'")]
    MissingProjectCode(String),

    #[error("No project found with code '{0}'")]
    ProjectNotFound(String),
}

/// Show code from a package path, e.g. `uni` in `/proj/uni/io/...`.
///
/// `pattern` must have a `show` group; the first group is used otherwise.
///
/// ```
/// use regex::Regex;
/// use shotforged::ingest::project_code_from_path;
///
/// let pattern = Regex::new(r"/proj/(?P<show>\w+)").unwrap();
/// assert_eq!(project_code_from_path("/proj/uni/io/From_axv/pkg", &pattern).as_deref(), Some("uni"));
/// assert_eq!(project_code_from_path("/tmp/pkg", &pattern), None);
/// ```
pub fn project_code_from_path(path: &str, pattern: &Regex) -> Option<String> {
    let caps = pattern.captures(path)?;
    caps.name("show")
        .or_else(|| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Vendor code from a package folder name such as `From_axv`.
pub fn vendor_code_from_path(path: &str, pattern: &Regex) -> Option<String> {
    pattern
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// One candidate product: a single file, or a sequence formatted with its
/// padding token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageItem {
    pub path: String,
    pub frame_range: Option<(i64, i64)>,
}

/// Every file and sequence under `root`, sorted by path.
pub fn package_items(root: &Path) -> Result<Vec<PackageItem>, IngestError> {
    if !root.is_dir() {
        return Err(IngestError::FolderNotFound(root.to_path_buf()));
    }

    let mut by_directory: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            continue;
        };
        by_directory
            .entry(parent.to_path_buf())
            .or_default()
            .push(name.to_string_lossy().into_owned());
    }

    let collector = SequenceCollector::new();
    let mut items = Vec::new();
    for (directory, files) in by_directory {
        for group in collector.collect(&files) {
            let name = if group.is_sequence() {
                group.format_pattern()
            } else {
                group.head.clone()
            };
            items.push(PackageItem {
                path: directory.join(name).to_string_lossy().into_owned(),
                frame_range: group.frame_range(),
            });
        }
    }
    items.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Found {} candidate products under {:?}", items.len(), root);
    Ok(items)
}

/// Everything a scan needs to know about the target project.
#[derive(Debug, Clone)]
pub struct IngestContext {
    pub project_name: String,
    pub project_code: String,
    pub assets: Vec<AssetRecord>,
    pub tasks: Vec<String>,
    pub fallback_task: Option<String>,
    /// Match items on the rayon pool.
    pub parallel: bool,
}

impl IngestContext {
    pub fn new(
        project_name: impl Into<String>,
        project_code: impl Into<String>,
        assets: Vec<AssetRecord>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            project_code: project_code.into(),
            assets,
            tasks: shotforged_common::OutsourceTask::default_names(),
            fallback_task: Some("edit".to_string()),
            parallel: false,
        }
    }
}

/// Outcome of a package scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Every record, sorted by source path.
    pub records: Vec<PublishRecord>,
    /// Products merged from complete, confidently matched records.
    pub products: Vec<Product>,
    /// Records with an asset that still need a human look.
    pub needs_review: Vec<PublishRecord>,
    /// Source paths with no resolved asset.
    pub unassigned: Vec<String>,
    pub conflicts: Vec<Conflict>,
    pub report: ReportItems,
}

impl IngestReport {
    /// Records safe to publish without review.
    pub fn publishable(&self) -> Vec<PublishRecord> {
        self.records
            .iter()
            .filter(|r| !r.needs_review())
            .cloned()
            .collect()
    }

    /// Complete records, low-confidence ones included.
    pub fn complete(&self) -> Vec<PublishRecord> {
        self.records
            .iter()
            .filter(|r| r.is_complete())
            .cloned()
            .collect()
    }
}

/// Builds records for package items of one project.
pub struct PackageScanner {
    matcher: FilenameMatcher,
    resolver: EntityResolver,
    assembler: Assembler,
    parallel: bool,
}

impl PackageScanner {
    pub fn new(ctx: &IngestContext) -> Self {
        let resolver = EntityResolver::new(ctx.assets.clone(), ctx.project_code.clone());
        let matcher = FilenameMatcher::builder()
            .entity_codes(resolver.asset_names())
            .tasks(ctx.tasks.clone())
            .project_code(ctx.project_code.clone())
            .fallback_task(ctx.fallback_task.clone())
            .build();
        let assembler = Assembler::new(ctx.project_name.clone(), ctx.tasks.clone())
            .fallback_task(ctx.fallback_task.clone());
        Self {
            matcher,
            resolver,
            assembler,
            parallel: ctx.parallel,
        }
    }

    /// Match, resolve and assemble one item.
    pub fn record(&self, item: &PackageItem) -> PublishRecord {
        self.inspect(item).1
    }

    /// Like [`record`](Self::record), also returning the raw match.
    pub fn inspect(&self, item: &PackageItem) -> (MatchResult, PublishRecord) {
        let result = self.matcher.match_filename(&item.path);
        let entity = self.resolver.resolve(&result);
        let record = self
            .assembler
            .assemble(&result, entity.as_ref(), item.frame_range);
        (result, record)
    }

    /// Records for `items`, sorted by source path.
    pub fn records(&self, items: &[PackageItem]) -> Vec<PublishRecord> {
        let mut records: Vec<PublishRecord> = if self.parallel {
            items.par_iter().map(|item| self.record(item)).collect()
        } else {
            items.iter().map(|item| self.record(item)).collect()
        };
        records.sort_by(|a, b| a.source_path.cmp(&b.source_path));
        records
    }
}

/// Scan a vendor package folder.
pub fn scan_package(root: &Path, ctx: &IngestContext) -> Result<IngestReport, IngestError> {
    info!("Scanning package: {:?}", root);
    let items = package_items(root)?;
    let records = PackageScanner::new(ctx).records(&items);
    Ok(build_report(records))
}

/// Sort records into products, review and unassigned buckets.
pub fn build_report(records: Vec<PublishRecord>) -> IngestReport {
    let mut report = IngestReport::default();

    for record in &records {
        if record.is_unassigned() {
            report.unassigned.push(record.source_path.clone());
            report.report.push(UNASSIGNED, record.source_path.clone());
        } else if record.needs_review() {
            let reason = match record.missing_fields() {
                missing if missing.is_empty() => format!("{} match", record.confidence),
                missing => format!("missing {}", missing.join(", ")),
            };
            report
                .report
                .push(NEEDS_REVIEW, format!("{} ({})", record.source_path, reason));
            report.needs_review.push(record.clone());
        }
    }

    let outcome = merge_records(records.iter().filter(|r| !r.needs_review()));
    for conflict in &outcome.conflicts {
        report.report.push(CONFLICTS, conflict.to_string());
    }
    if !report.unassigned.is_empty() {
        warn!(
            "{} files could not be assigned to an asset",
            report.unassigned.len()
        );
    }
    info!(
        "Scan complete: {} products, {} to review, {} unassigned",
        outcome.products.len(),
        report.needs_review.len(),
        report.unassigned.len()
    );

    report.products = outcome.products;
    report.conflicts = outcome.conflicts;
    report.records = records;
    report
}
