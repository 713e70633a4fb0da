use serde::{Deserialize, Serialize};
use shotforged_common::paths::single_file_extensions;
use shotforged_common::OutsourceTask;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub delivery: DeliveryConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Outsource task names, in keyword priority order
    #[serde(default = "default_tasks")]
    pub tasks: Vec<String>,

    /// Task given to records resolved by path containment (default: "edit")
    #[serde(default = "default_fallback_task")]
    pub fallback_task: Option<String>,

    /// Regex extracting the show code from a package path; needs a `show` group
    #[serde(default = "default_project_root_pattern")]
    pub project_root_pattern: String,

    /// Regex extracting the vendor code from a package path
    #[serde(default = "default_vendor_package_pattern")]
    pub vendor_package_pattern: String,

    /// Match files on a rayon pool
    #[serde(default)]
    pub parallel: bool,
}

fn default_tasks() -> Vec<String> {
    OutsourceTask::default_names()
}

fn default_fallback_task() -> Option<String> {
    Some(OutsourceTask::Edit.as_str().to_string())
}

fn default_project_root_pattern() -> String {
    r"/proj/(?P<show>\w+)".to_string()
}

fn default_vendor_package_pattern() -> String {
    r"From_(\w+)".to_string()
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            tasks: default_tasks(),
            fallback_task: default_fallback_task(),
            project_root_pattern: default_project_root_pattern(),
            vendor_package_pattern: default_vendor_package_pattern(),
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
    /// Root the delivery package is staged under
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,

    /// Output path, relative to the staging dir
    #[serde(default = "default_path_template")]
    pub path_template: String,

    /// Used when neither the context nor an override sets `filename`
    #[serde(default = "default_filename_template")]
    pub filename_template: String,

    /// Extensions rendered as one file, never a frame sequence
    #[serde(default = "default_single_file_extensions")]
    pub single_file_extensions: Vec<String>,

    /// Script handed to the transcode job
    #[serde(default = "default_template_script")]
    pub template_script: String,

    /// Fold overrides from every entity level instead of using the most
    /// specific level that sets any
    #[serde(default)]
    pub merge_override_levels: bool,
}

fn default_staging_dir() -> String {
    "/proj/{project[code]}/io/delivery/ready_to_deliver/{yyyy}{mm}{dd}".to_string()
}

fn default_path_template() -> String {
    "{package_name}/{output}/<{is_sequence}<{filename}/>>{filename}<.{frame:0>4}>.{ext}"
        .to_string()
}

fn default_filename_template() -> String {
    "{SEQ}_{shotnum}_{task[short]}_v{version:0>4}_{vendor}<_{suffix}>".to_string()
}

fn default_single_file_extensions() -> Vec<String> {
    single_file_extensions()
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_template_script() -> String {
    "/pipe/nuke/templates/delivery_template.nk".to_string()
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            staging_dir: default_staging_dir(),
            path_template: default_path_template(),
            filename_template: default_filename_template(),
            single_file_extensions: default_single_file_extensions(),
            template_script: default_template_script(),
            merge_override_levels: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrackingConfig {
    /// JSON snapshot of projects and their assets
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}
