//! Publish-data assembly and product merging.
//!
//! Every matched file or sequence becomes one [`PublishRecord`]. Records that
//! target the same `(asset, task, family, subset)` are then folded into a
//! single [`Product`] carrying one path per representation.

use serde::Serialize;
use shotforged_common::Family;
use shotforged_parser::{classify, Confidence, MatchResult};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

use super::resolver::{EntityMatch, ResolveTier};

/// Fields a record needs before it can be published.
pub const MUST_HAVE_FIELDS: [&str; 5] = [
    "asset_name",
    "task_name",
    "family_name",
    "subset_name",
    "representation_name",
];

/// Normalized publish intent for one source file or sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishRecord {
    pub project_name: String,
    pub asset_name: Option<String>,
    pub task_name: Option<String>,
    /// `None` when no family could be inferred.
    pub family_name: Option<Family>,
    pub subset_name: Option<String>,
    pub representation_name: Option<String>,
    pub version: Option<u32>,
    pub frame_start: Option<i64>,
    pub frame_end: Option<i64>,
    pub source_path: String,
    pub confidence: Confidence,
}

impl PublishRecord {
    /// Names of the required fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let present = [
            self.asset_name.is_some(),
            self.task_name.is_some(),
            self.family_name.is_some(),
            self.subset_name.is_some(),
            self.representation_name.is_some(),
        ];
        MUST_HAVE_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, present)| !present)
            .map(|(field, _)| *field)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn is_unassigned(&self) -> bool {
        self.asset_name.is_none()
    }

    /// Incomplete, or produced by a low-confidence matcher tier.
    pub fn needs_review(&self) -> bool {
        !self.is_complete() || self.confidence.needs_review()
    }

    /// Merge key, when every part of it is present.
    pub fn product_key(&self) -> Option<ProductKey> {
        Some(ProductKey {
            asset: self.asset_name.clone()?,
            task: self.task_name.clone()?,
            family: self.family_name?,
            subset: self.subset_name.clone()?,
        })
    }
}

/// Builds records for one project.
#[derive(Debug, Clone)]
pub struct Assembler {
    project_name: String,
    tasks: Vec<String>,
    fallback_task: Option<String>,
}

impl Assembler {
    pub fn new(project_name: impl Into<String>, tasks: Vec<String>) -> Self {
        Self {
            project_name: project_name.into(),
            tasks,
            fallback_task: None,
        }
    }

    /// Task given to files whose asset was only found by searching the path.
    pub fn fallback_task(mut self, task: Option<String>) -> Self {
        self.fallback_task = task;
        self
    }

    /// Combine a match, its resolved entity and a frame range into a record.
    ///
    /// Never fails: a record missing required fields is returned as is and
    /// routed to review by the caller.
    pub fn assemble(
        &self,
        result: &MatchResult,
        entity: Option<&EntityMatch<'_>>,
        frame_range: Option<(i64, i64)>,
    ) -> PublishRecord {
        let mut result = result.clone();
        if let Some(found) = entity.filter(|found| found.tier != ResolveTier::Exact) {
            if result.task.is_none() {
                result.task = self.fallback_task.clone();
            }
            // An asset guessed from the path is never trusted for auto-publish.
            if result.confidence != Confidence::Substring {
                debug!(
                    "Asset '{}' found by {:?} search, {} match downgraded to {}",
                    found.asset.name,
                    found.tier,
                    result.confidence,
                    Confidence::Substring
                );
                result.confidence = Confidence::Substring;
            }
        }

        let fields = classify(&result, &self.tasks);
        let record = PublishRecord {
            project_name: self.project_name.clone(),
            asset_name: entity.map(|found| found.asset.name.clone()),
            task_name: fields.task,
            family_name: fields.family.is_known().then_some(fields.family),
            subset_name: fields.subset,
            representation_name: Some(fields.representation_name).filter(|name| !name.is_empty()),
            version: result.delivery_version,
            frame_start: frame_range.map(|(start, _)| start),
            frame_end: frame_range.map(|(_, end)| end),
            source_path: result.path.clone(),
            confidence: result.confidence,
        };

        let missing = record.missing_fields();
        if !missing.is_empty() {
            warn!(
                "Missing fields {:?} in publish data for '{}'",
                missing, record.source_path
            );
        }
        debug!("Publish data for '{}': {:?}", record.source_path, record);
        record
    }
}

/// Target of a publish: one subset of one task on one asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProductKey {
    pub asset: String,
    pub task: String,
    pub family: Family,
    pub subset: String,
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} - {}",
            self.asset, self.task, self.family, self.subset
        )
    }
}

/// Records merged under one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    #[serde(flatten)]
    pub key: ProductKey,
    /// Representation name to source path.
    pub representations: BTreeMap<String, String>,
    /// Version of the first record merged in.
    pub version: Option<u32>,
    pub frame_start: Option<i64>,
    pub frame_end: Option<i64>,
    /// Any merged record came from a low-confidence tier.
    pub needs_review: bool,
}

/// A second file mapped onto an existing representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub key: ProductKey,
    pub representation: String,
    /// Path that stays in the product.
    pub kept: String,
    /// Path that was dropped.
    pub dropped: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}: kept '{}', dropped '{}'",
            self.key, self.representation, self.kept, self.dropped
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// Products ordered by key.
    pub products: Vec<Product>,
    pub conflicts: Vec<Conflict>,
    /// Source paths of records without a full key.
    pub skipped: Vec<String>,
}

/// Fold records into products, first occurrence winning.
///
/// Runs single threaded over records in the given order, so callers sort
/// the records first to get the same conflicts on every run.
pub fn merge_records<'a, I>(records: I) -> MergeOutcome
where
    I: IntoIterator<Item = &'a PublishRecord>,
{
    let mut products: BTreeMap<ProductKey, Product> = BTreeMap::new();
    let mut outcome = MergeOutcome::default();

    for record in records {
        let (Some(key), Some(representation)) =
            (record.product_key(), record.representation_name.clone())
        else {
            debug!(
                "Skipping '{}' as it doesn't have all required fields to publish",
                record.source_path
            );
            outcome.skipped.push(record.source_path.clone());
            continue;
        };

        match products.get_mut(&key) {
            Some(product) => {
                if let Some(kept) = product.representations.get(&representation) {
                    warn!(
                        "Duplicated representation '{}' in product {}: '{}' dropped",
                        representation, key, record.source_path
                    );
                    outcome.conflicts.push(Conflict {
                        key: key.clone(),
                        representation,
                        kept: kept.clone(),
                        dropped: record.source_path.clone(),
                    });
                    continue;
                }
                product
                    .representations
                    .insert(representation, record.source_path.clone());
                product.needs_review |= record.confidence.needs_review();
            }
            None => {
                let mut representations = BTreeMap::new();
                representations.insert(representation, record.source_path.clone());
                products.insert(
                    key.clone(),
                    Product {
                        key,
                        representations,
                        version: record.version,
                        frame_start: record.frame_start,
                        frame_end: record.frame_end,
                        needs_review: record.confidence.needs_review(),
                    },
                );
            }
        }
    }

    outcome.products = products.into_values().collect();
    outcome
}
