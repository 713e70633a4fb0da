//! Delivery planning for one reviewed version.
//!
//! A plan names everything the transcode collaborator needs: the staging
//! package, the hash-padded source read path, one destination path and
//! environment per output, and the manifest rows. Outputs whose destination
//! template cannot be filled are reported and skipped; the rest still plan.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shotforged_common::DeliveryType;
use shotforged_parser::frames::replace_frame_digits_with_hashes;
use shotforged_template::{format_template, format_template_strict, AnatomyData};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::manifest::ManifestRow;
use super::output::{get_output_anatomy_data_with, render_destination};
use super::overrides::OverrideHierarchy;
use super::{DeliveryError, Result};
use crate::config::DeliveryConfig;
use crate::report::ReportItems;

pub const ENV_READ_PATH: &str = "_AX_DELIVERY_READPATH";
pub const ENV_FRAMES: &str = "_AX_DELIVERY_FRAMES";
pub const ENV_COMMENT: &str = "_AX_DELIVERY_COMMENT";
pub const ENV_ARTIST: &str = "_AX_DELIVERY_ARTIST";
pub const ENV_SCRIPT: &str = "_AX_DELIVERY_NUKESCRIPT";
pub const ENV_THUMBNAIL_PATH: &str = "_AX_DELIVERY_THUMBNAIL_PATH";
pub const ENV_OUTPUT_NAME: &str = "_AX_DELIVERY_OUTPUT_NAME";
pub const ENV_FILENAME: &str = "_AX_DELIVERY_FILENAME";
pub const ENV_WRITE_PATH: &str = "_AX_DELIVERY_WRITEPATH";

pub const PLANNED: &str = "Planned delivery outputs";
pub const DESTINATION_FAILED: &str = "Failed to resolve destination path";

/// A reviewed version as recorded by the production tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryVersion {
    pub code: String,
    /// Publish id the version was created from; `-` counts as missing.
    #[serde(default)]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub submit_for: String,
    #[serde(default)]
    pub submission_notes: String,
    pub frame_start: i64,
    pub frame_end: i64,
    #[serde(default)]
    pub handle_start: i64,
    #[serde(default)]
    pub handle_end: i64,
    /// Path of the exr representation the media is generated from.
    pub source_path: String,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
    #[serde(default)]
    pub media_generated: bool,
    #[serde(default)]
    pub media_path: Option<String>,
}

impl DeliveryVersion {
    /// Frame range including handles.
    pub fn frame_range(&self) -> (i64, i64) {
        (
            self.frame_start - self.handle_start,
            self.frame_end + self.handle_end,
        )
    }
}

/// One output to generate, e.g. `mov_review` as `mov`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    pub extension: String,
}

impl OutputSpec {
    pub fn new(name: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extension: extension.into(),
        }
    }

    /// Output named by a representation name: `mov_review` renders as `mov`.
    pub fn from_representation_name(name: &str) -> Self {
        let extension = name.split('_').next().unwrap_or(name);
        Self::new(name, extension)
    }
}

/// Everything needed to plan the delivery of one version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub project_name: String,
    pub version: DeliveryVersion,
    /// Publish context of the source representation.
    #[serde(default)]
    pub anatomy: AnatomyData,
    #[serde(default)]
    pub overrides: OverrideHierarchy,
    /// Fold every hierarchy level; falls back to the config setting.
    #[serde(default)]
    pub merge_levels: Option<bool>,
    /// Request-level overrides, applied over the hierarchy.
    #[serde(default)]
    pub delivery_data: Map<String, Value>,
    /// Outputs to generate; taken from the hierarchy's output types when empty.
    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
    /// Plan again even if media was already generated.
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub staging_dir: Option<String>,
    #[serde(default)]
    pub template_script: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedOutput {
    pub output_name: String,
    pub extension: String,
    pub filename: String,
    /// Destination path, hash-padded for sequences.
    pub dest_path: String,
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryPlan {
    pub package_path: String,
    pub package_name: String,
    pub media_path: PathBuf,
    pub manifest_path: PathBuf,
    pub read_path: String,
    pub frame_range: (i64, i64),
    pub outputs: Vec<PlannedOutput>,
    pub manifest: Vec<ManifestRow>,
    /// Outputs that could not be planned, with the reason.
    pub failed: Vec<(String, String)>,
    pub report: ReportItems,
}

impl DeliveryPlan {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Plan the delivery media of `request.version`.
///
/// `datetime` supplies the date tokens used by the staging directory.
pub fn plan_delivery(
    request: &DeliveryRequest,
    config: &DeliveryConfig,
    datetime: &AnatomyData,
) -> Result<DeliveryPlan> {
    let version = &request.version;

    match version.instance_id.as_deref() {
        None | Some("") | Some("-") => {
            return Err(DeliveryError::MissingInstanceId(version.code.clone()));
        }
        Some(_) => {}
    }

    if version.media_generated && !request.force {
        return Err(DeliveryError::AlreadyGenerated {
            code: version.code.clone(),
            path: version.media_path.clone().unwrap_or_default(),
        });
    }

    let frame_range = version.frame_range();
    debug!("Frame range with handles: {:?}", frame_range);

    let read_path = replace_frame_digits_with_hashes(&version.source_path);

    let mut anatomy = request.anatomy.clone();
    anatomy.update(datetime);
    if let Some(description) = &version.description {
        anatomy.insert("comment", description.as_str());
    }
    debug!("Base anatomy data: {:?}", anatomy);

    let staging_dir = request.staging_dir.as_deref().unwrap_or(&config.staging_dir);
    let package_path = format_template(staging_dir, &anatomy)?;

    let merge_levels = request
        .merge_levels
        .unwrap_or(config.merge_override_levels);
    let mut delivery_data = request.overrides.delivery_data(merge_levels);
    for (key, value) in &request.delivery_data {
        delivery_data.insert(key.clone(), value.clone());
    }

    let mut base_env = BTreeMap::new();
    base_env.insert(ENV_READ_PATH.to_string(), read_path.clone());
    base_env.insert(
        ENV_FRAMES.to_string(),
        format!("{}_{}", frame_range.0, frame_range.1),
    );
    let comment = delivery_data
        .get("comment_override")
        .and_then(Value::as_str)
        .filter(|comment| !comment.is_empty())
        .map(str::to_string)
        .or_else(|| anatomy.get_str(&["comment"]));
    if let Some(comment) = comment {
        base_env.insert(ENV_COMMENT.to_string(), comment);
    }
    if let Some(artist) = version.artist.clone().or_else(|| anatomy.get_str(&["user"])) {
        base_env.insert(ENV_ARTIST.to_string(), artist);
    }
    base_env.insert(
        ENV_SCRIPT.to_string(),
        request
            .template_script
            .clone()
            .unwrap_or_else(|| config.template_script.clone()),
    );
    if let Some(thumbnail) = &version.thumbnail_path {
        base_env.insert(ENV_THUMBNAIL_PATH.to_string(), thumbnail.clone());
    }

    let outputs = if request.outputs.is_empty() {
        let (names, level) = request
            .overrides
            .get_representation_names(&DeliveryType::ALL);
        debug!("Outputs from {:?} level: {:?}", level, names);
        names
            .iter()
            .map(|name| OutputSpec::from_representation_name(name))
            .collect()
    } else {
        request.outputs.clone()
    };
    if outputs.is_empty() {
        warn!("No outputs selected for version '{}'", version.code);
    }

    let path_template = format!(
        "{}/{}",
        package_path.trim_end_matches('/'),
        config.path_template
    );

    let mut plan = DeliveryPlan {
        package_path: package_path.clone(),
        package_name: String::new(),
        media_path: PathBuf::new(),
        manifest_path: PathBuf::new(),
        read_path,
        frame_range,
        outputs: Vec::new(),
        manifest: Vec::new(),
        failed: Vec::new(),
        report: ReportItems::new(),
    };

    for output in &outputs {
        match plan_output(
            output,
            &anatomy,
            &delivery_data,
            config,
            &path_template,
            frame_range,
        ) {
            Ok((planned, package_name)) => {
                info!("Planned {} -> {}", output.name, planned.dest_path);
                plan.report.push(PLANNED, format!("{} - {}", version.code, output.name));

                let mut planned = planned;
                let mut env = base_env.clone();
                env.append(&mut planned.env);
                planned.env = env;

                plan.manifest.push(ManifestRow {
                    filename: manifest_filename(&planned, frame_range),
                    submitted_for: version.submit_for.clone(),
                    notes: version.submission_notes.clone(),
                });
                plan.package_name = package_name;
                plan.outputs.push(planned);
            }
            Err(err) => {
                warn!("{}", err);
                plan.report.push(DESTINATION_FAILED, err.to_string());
                plan.failed.push((output.name.clone(), err.to_string()));
            }
        }
    }

    plan.media_path = PathBuf::from(&package_path).join(&plan.package_name);
    plan.manifest_path = plan.media_path.join(format!("{}.csv", plan.package_name));

    Ok(plan)
}

fn plan_output(
    output: &OutputSpec,
    anatomy: &AnatomyData,
    delivery_data: &Map<String, Value>,
    config: &DeliveryConfig,
    path_template: &str,
    frame_range: (i64, i64),
) -> Result<(PlannedOutput, String)> {
    let mut data = get_output_anatomy_data_with(
        anatomy,
        delivery_data,
        &output.name,
        &output.extension,
        &config.single_file_extensions,
    )?;

    let filename = match data.get_str(&["filename"]) {
        Some(filename) => filename,
        None => {
            let filename = format_template_strict(&config.filename_template, &data).map_err(
                |source| DeliveryError::DestinationPath {
                    output: output.name.clone(),
                    source,
                },
            )?;
            data.insert("filename", filename.as_str());
            filename
        }
    };

    let mut dest_path = render_destination(&data, &output.name, path_template)?;
    let is_sequence = data
        .get_str(&["frame"])
        .is_some_and(|frame| !frame.is_empty());
    if is_sequence {
        dest_path = replace_frame_digits_with_hashes(&dest_path);
    }
    debug!(
        "Output '{}' frames {:?} sequence: {}",
        output.name, frame_range, is_sequence
    );

    let mut env = BTreeMap::new();
    env.insert(ENV_OUTPUT_NAME.to_string(), output.name.clone());
    env.insert(ENV_FILENAME.to_string(), filename.clone());
    env.insert(ENV_WRITE_PATH.to_string(), dest_path.clone());

    let package_name = data.get_str(&["package_name"]).unwrap_or_default();

    Ok((
        PlannedOutput {
            output_name: output.name.clone(),
            extension: output.extension.clone(),
            filename,
            dest_path,
            env,
        },
        package_name,
    ))
}

fn manifest_filename(output: &PlannedOutput, frame_range: (i64, i64)) -> String {
    let ext = output.extension.trim_start_matches('.');
    if output.dest_path.contains('#') {
        format!(
            "{}.[{}-{}].{}",
            output.filename, frame_range.0, frame_range.1, ext
        )
    } else {
        format!("{}.{}", output.filename, ext)
    }
}
