//! Delivery: resolving client-facing output paths and planning the media
//! generated for a delivered version.

pub mod manifest;
pub mod media;
pub mod output;
pub mod overrides;

use shotforged_template::TemplateError;
use thiserror::Error;

pub use manifest::{write_manifest, ManifestRow};
pub use media::{plan_delivery, DeliveryPlan, DeliveryRequest, DeliveryVersion, OutputSpec};
pub use output::{get_output_anatomy_data, resolve_output_path};
pub use overrides::{OverrideEntity, OverrideHierarchy, USE_SOURCE_VALUE};

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The destination template of one output could not be filled.
    #[error("Failed to resolve destination path for output '{output}': {source}")]
    DestinationPath {
        output: String,
        #[source]
        source: TemplateError,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Missing instance id on version '{0}'")]
    MissingInstanceId(String),

    #[error("Delivery media already exists for version '{code}' at '{path}'")]
    AlreadyGenerated { code: String, path: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeliveryError>;
