//! Vendor filename matching.
//!
//! A [`FilenameMatcher`] runs an ordered list of [`MatchStrategy`] tiers
//! against a file name and keeps the first hit:
//!
//! 1. [`StructuralStrategy::strict`]: known entity code and known task.
//! 2. [`StructuralStrategy::generic`]: same shape, nothing validated.
//! 3. [`SubstringStrategy`]: a known code anywhere in the full path.
//!
//! When every tier misses, the result has no shot code and carries whatever
//! the fallback pattern could pull out of the name.
//!
//! ```
//! use shotforged_parser::{Confidence, FilenameMatcher};
//!
//! let matcher = FilenameMatcher::builder()
//!     .entity_codes(["uni_pg_0455"])
//!     .build();
//!
//! let result = matcher.match_filename("uni_pg_0455_plt_01_roto_output-01_v001.1001.exr");
//! assert_eq!(result.shot_code.as_deref(), Some("uni_pg_0455"));
//! assert_eq!(result.task.as_deref(), Some("roto"));
//! assert_eq!(result.confidence, Confidence::Strict);
//! ```

mod patterns;
mod structural;
mod substring;

pub use structural::StructuralStrategy;
pub use substring::{find_containing, ContainedName, SubstringStrategy};

use shotforged_common::OutsourceTask;
use tracing::{debug, error};

use crate::model::{Confidence, MatchResult};

/// One tier of the filename cascade.
pub trait MatchStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Confidence assigned to results of this tier.
    fn confidence(&self) -> Confidence;

    /// Try to match `filename`, the last component of `path`.
    fn try_match(&self, path: &str, filename: &str) -> Option<MatchResult>;
}

/// Ordered cascade of strategies plus task normalisation.
pub struct FilenameMatcher {
    strategies: Vec<Box<dyn MatchStrategy>>,
    tasks: Vec<String>,
    fallback_task: Option<String>,
}

impl Default for FilenameMatcher {
    fn default() -> Self {
        FilenameMatcherBuilder::default().build()
    }
}

impl std::fmt::Debug for FilenameMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("FilenameMatcher")
            .field("strategies", &names)
            .field("tasks", &self.tasks)
            .field("fallback_task", &self.fallback_task)
            .finish()
    }
}

impl FilenameMatcher {
    pub fn builder() -> FilenameMatcherBuilder {
        FilenameMatcherBuilder::default()
    }

    /// Matcher for the given codes and tasks with default settings.
    pub fn new<C: AsRef<str>, T: AsRef<str>>(codes: &[C], tasks: &[T]) -> Self {
        Self::builder()
            .entity_codes(codes.iter().map(|code| code.as_ref().to_string()))
            .tasks(tasks.iter().map(|task| task.as_ref().to_string()))
            .build()
    }

    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    /// Known task name equal to `task` ignoring case.
    pub fn known_task(&self, task: &str) -> Option<&str> {
        known_task(&self.tasks, task)
    }

    /// Match a file by path; only the file name is matched structurally.
    pub fn match_filename(&self, path: &str) -> MatchResult {
        let filename = path.rsplit(['/', '\\']).next().unwrap_or(path);

        let mut result = self
            .strategies
            .iter()
            .find_map(|strategy| {
                let result = strategy.try_match(path, filename);
                if result.is_some() {
                    debug!("Strategy '{}' matched '{}'", strategy.name(), filename);
                }
                result
            })
            .unwrap_or_else(|| {
                debug!("No strategy matched '{}', using best effort fields", filename);
                let mut result = MatchResult::new(path);
                substring::apply_fallback(&mut result, filename);
                result
            });

        self.finish_task(&mut result);
        result
    }

    fn finish_task(&self, result: &mut MatchResult) {
        // A task token we don't support was really part of the subset.
        if let Some(task) = result.task.take() {
            match self.known_task(&task) {
                Some(known) => result.task = Some(known.to_string()),
                None => {
                    debug!("Task '{}' is not supported, using it as subset", task);
                    result.subset = Some(task);
                }
            }
        }

        if let Some(keyword) = task_keyword(&result.path, &self.tasks) {
            if result.task.as_deref() != Some(keyword) {
                debug!(
                    "Found '{}' in path '{}', assuming it's a '{}' task",
                    keyword, result.path, keyword
                );
            }
            result.task = Some(keyword.to_string());
        }

        if result.task.is_none() && result.confidence == Confidence::Substring {
            result.task = self.fallback_task.clone();
        }

        if result.task.is_none() && !result.is_unassigned() {
            error!(
                "No supported task found in '{}', supported tasks are {:?}",
                result.path, self.tasks
            );
        }
    }
}

/// First task (in list order) named in `path` as a whole path segment or as
/// an underscore-delimited token.
///
/// ```
/// use shotforged_parser::matcher::task_keyword;
///
/// let tasks = ["roto", "paint", "comp"];
/// assert_eq!(task_keyword("/pkg/paint/sh010_v001.exr", &tasks), Some("paint"));
/// assert_eq!(task_keyword("/pkg/sh010_comp_v001.exr", &tasks), Some("comp"));
/// assert_eq!(task_keyword("/pkg/sh010_compositing.exr", &tasks), None);
/// ```
pub fn task_keyword<'a, S: AsRef<str>>(path: &str, tasks: &'a [S]) -> Option<&'a str> {
    let lower = path.to_lowercase();
    let segments: Vec<&str> = lower.split(['/', '\\']).collect();

    tasks.iter().map(|task| task.as_ref()).find(|task| {
        let task_lower = task.to_lowercase();
        segments.contains(&task_lower.as_str()) || lower.contains(&format!("_{task_lower}_"))
    })
}

fn known_task<'a>(tasks: &'a [String], task: &str) -> Option<&'a str> {
    tasks
        .iter()
        .find(|known| known.eq_ignore_ascii_case(task))
        .map(String::as_str)
}

/// Builder for [`FilenameMatcher`].
#[derive(Debug, Clone)]
pub struct FilenameMatcherBuilder {
    codes: Vec<String>,
    tasks: Vec<String>,
    project_code: Option<String>,
    fallback_task: Option<String>,
}

impl Default for FilenameMatcherBuilder {
    fn default() -> Self {
        Self {
            codes: Vec::new(),
            tasks: OutsourceTask::default_names(),
            project_code: None,
            fallback_task: Some(OutsourceTask::Edit.as_str().to_string()),
        }
    }
}

impl FilenameMatcherBuilder {
    /// Known shot/asset codes, in tracker order.
    pub fn entity_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Supported task names, in keyword-scan order.
    pub fn tasks<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tasks = tasks.into_iter().map(Into::into).collect();
        self
    }

    /// Project code stripped from codes when searching paths.
    pub fn project_code(mut self, code: impl Into<String>) -> Self {
        self.project_code = Some(code.into());
        self
    }

    /// Task used for substring matches with no task of their own.
    ///
    /// Ignored unless it is one of the supported tasks.
    pub fn fallback_task(mut self, task: Option<String>) -> Self {
        self.fallback_task = task;
        self
    }

    pub fn build(self) -> FilenameMatcher {
        let mut strategies: Vec<Box<dyn MatchStrategy>> = Vec::new();
        if let Some(strict) = StructuralStrategy::strict(&self.codes, &self.tasks) {
            strategies.push(Box::new(strict));
        }
        strategies.push(Box::new(StructuralStrategy::generic()));
        strategies.push(Box::new(SubstringStrategy::new(
            &self.codes,
            self.project_code.as_deref(),
        )));

        let fallback_task = self
            .fallback_task
            .and_then(|task| known_task(&self.tasks, &task).map(str::to_string));

        FilenameMatcher {
            strategies,
            tasks: self.tasks,
            fallback_task,
        }
    }
}

/// Match one file against known codes and tasks with default settings.
pub fn match_filename<C: AsRef<str>, T: AsRef<str>>(
    path: &str,
    codes: &[C],
    tasks: &[T],
) -> MatchResult {
    FilenameMatcher::new(codes, tasks).match_filename(path)
}
