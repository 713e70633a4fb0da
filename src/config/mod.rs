mod types;

pub use types::*;

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    prepare_paths(&mut config);

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./shotforged.toml",
        "~/.config/shotforged/config.toml",
        "/etc/shotforged/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

fn prepare_paths(config: &mut Config) {
    if let Some(catalog) = &config.tracking.catalog {
        let expanded = shellexpand::tilde(&catalog.to_string_lossy()).into_owned();
        config.tracking.catalog = Some(expanded.into());
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let ingest = &config.ingest;

    if ingest.tasks.is_empty() {
        anyhow::bail!("Ingest task list cannot be empty");
    }

    if let Some(fallback) = &ingest.fallback_task {
        if !ingest.tasks.iter().any(|task| task == fallback) {
            anyhow::bail!("Fallback task '{}' is not in the task list", fallback);
        }
    }

    let project_root = Regex::new(&ingest.project_root_pattern).with_context(|| {
        format!(
            "Invalid project root pattern: {}",
            ingest.project_root_pattern
        )
    })?;
    if !project_root.capture_names().flatten().any(|name| name == "show") {
        anyhow::bail!(
            "Project root pattern '{}' has no 'show' group",
            ingest.project_root_pattern
        );
    }

    Regex::new(&ingest.vendor_package_pattern).with_context(|| {
        format!(
            "Invalid vendor package pattern: {}",
            ingest.vendor_package_pattern
        )
    })?;

    // Validate delivery templates parse
    for (name, template) in [
        ("staging_dir", &config.delivery.staging_dir),
        ("path_template", &config.delivery.path_template),
        ("filename_template", &config.delivery.filename_template),
    ] {
        shotforged_template::StringTemplate::parse(template)
            .with_context(|| format!("Invalid delivery {}: {}", name, template))?;
    }

    if let Some(catalog) = &config.tracking.catalog {
        if !Path::new(shellexpand::tilde(&catalog.to_string_lossy()).as_ref()).exists() {
            tracing::warn!("Tracking catalog does not exist: {:?}", catalog);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(
            config.ingest.tasks,
            ["roto", "paint", "comp", "track", "edit"]
        );
        assert_eq!(config.ingest.fallback_task.as_deref(), Some("edit"));
        assert!(config.delivery.single_file_extensions.contains(&"mov".to_string()));
        assert!(!config.delivery.merge_override_levels);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_partial_config() {
        let file = write_config(
            r#"
[ingest]
tasks = ["roto", "comp"]
fallback_task = "comp"
parallel = true

[delivery]
staging_dir = "/deliveries/{project[code]}"
merge_override_levels = true
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.ingest.tasks, ["roto", "comp"]);
        assert!(config.ingest.parallel);
        assert!(config.delivery.merge_override_levels);
        assert_eq!(config.delivery.staging_dir, "/deliveries/{project[code]}");
        assert_eq!(
            config.delivery.path_template,
            Config::default().delivery.path_template
        );
    }

    #[test]
    fn test_rejects_unknown_fallback() {
        let file = write_config(
            r#"
[ingest]
tasks = ["roto"]
fallback_task = "edit"
"#,
        );
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Fallback task 'edit'"));
    }

    #[test]
    fn test_rejects_empty_tasks() {
        let mut config = Config::default();
        config.ingest.tasks.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_pattern_without_show_group() {
        let mut config = Config::default();
        config.ingest.project_root_pattern = r"/proj/(\w+)".to_string();
        assert!(validate_config(&config).is_err());

        config.ingest.project_root_pattern = r"/proj/(?P<show>\w+".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_unbalanced_template() {
        let mut config = Config::default();
        config.delivery.path_template = "{package_name}/<{is_sequence}".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_config(Path::new("/nonexistent/shotforged.toml")).is_err());
    }
}
