mod cli;

use shotforged::{
    config,
    delivery::{self, DeliveryRequest},
    ingest::{
        self,
        publish::{self, DryRunSubmitter},
        IngestContext, IngestError, PackageItem, PackageScanner,
    },
    tracking::{CatalogTracker, ProductionTracker, ProjectRecord},
};
use shotforged_template::datetime_data;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use regex::Regex;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "shotforged=trace,shotforged_parser=trace,shotforged_template=debug,shotforged_common=debug".to_string()
        } else {
            "shotforged=info,shotforged_parser=info,shotforged_template=warn".to_string()
        }
    });

    // Logs go to stderr so JSON on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ingest {
            folder,
            catalog,
            project_code,
            yes,
            include_review,
            overwrite,
            json,
        } => ingest_package(
            &folder,
            cli.config.as_deref(),
            IngestOptions {
                catalog,
                project_code,
                yes,
                include_review,
                overwrite,
                json,
            },
        ),
        Commands::Match {
            filename,
            catalog,
            project_code,
        } => match_file(&filename, cli.config.as_deref(), catalog, project_code),
        Commands::Deliver {
            request,
            write_manifest,
        } => deliver(&request, cli.config.as_deref(), write_manifest),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("shotforged {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

struct IngestOptions {
    catalog: Option<PathBuf>,
    project_code: Option<String>,
    yes: bool,
    include_review: bool,
    overwrite: bool,
    json: Option<PathBuf>,
}

/// Project for `code` from the catalog, or a bare project with no assets
/// when no catalog is configured.
fn resolve_project(
    config: &config::Config,
    catalog: Option<PathBuf>,
    code: &str,
) -> Result<ProjectRecord> {
    let Some(catalog) = catalog.or_else(|| config.tracking.catalog.clone()) else {
        tracing::warn!("No tracking catalog configured, every file will be unassigned");
        return Ok(ProjectRecord {
            name: code.to_string(),
            code: code.to_string(),
            assets: Vec::new(),
        });
    };

    let tracker = CatalogTracker::load(&catalog)
        .with_context(|| format!("Failed to load tracking catalog: {:?}", catalog))?;
    let mut project = tracker
        .project_by_code(code)
        .ok_or_else(|| IngestError::ProjectNotFound(code.to_string()))?;
    project.assets = tracker.assets(&project.name);
    tracing::debug!(
        "Project '{}' has {} assets",
        project.name,
        project.assets.len()
    );
    Ok(project)
}

fn ingest_context(config: &config::Config, project: &ProjectRecord) -> IngestContext {
    let mut ctx = IngestContext::new(&project.name, &project.code, project.assets.clone());
    ctx.tasks = config.ingest.tasks.clone();
    ctx.fallback_task = config.ingest.fallback_task.clone();
    ctx.parallel = config.ingest.parallel;
    ctx
}

fn project_code(config: &config::Config, path: &str, explicit: Option<String>) -> Result<String> {
    if let Some(code) = explicit {
        return Ok(code);
    }
    let pattern = Regex::new(&config.ingest.project_root_pattern)
        .context("Invalid project root pattern")?;
    let code = ingest::project_code_from_path(path, &pattern)
        .ok_or_else(|| IngestError::MissingProjectCode(path.to_string()))?;
    Ok(code)
}

fn ingest_package(
    folder: &Path,
    config_path: Option<&Path>,
    options: IngestOptions,
) -> Result<()> {
    // Load config
    let config = config::load_config_or_default(config_path)?;

    if !folder.is_dir() {
        return Err(IngestError::FolderNotFound(folder.to_path_buf()).into());
    }
    let folder_str = folder.to_string_lossy();

    let code = project_code(&config, &folder_str, options.project_code)?;
    let project = resolve_project(&config, options.catalog, &code)?;

    if let Ok(pattern) = Regex::new(&config.ingest.vendor_package_pattern) {
        if let Some(vendor) = ingest::vendor_code_from_path(&folder_str, &pattern) {
            tracing::info!("Vendor: {}", vendor);
        }
    }

    let ctx = ingest_context(&config, &project);
    let report = ingest::scan_package(folder, &ctx)?;

    println!("Project: {} ({})", project.name, project.code);
    println!("\nProducts: {}", report.products.len());
    for product in &report.products {
        let reps: Vec<&str> = product.representations.keys().map(String::as_str).collect();
        println!("  {} [{}]", product.key, reps.join(", "));
    }

    println!("\nNeeds review: {}", report.needs_review.len());
    for record in &report.needs_review {
        println!("  {} ({})", record.source_path, record.confidence);
    }

    println!("\nUnassigned: {}", report.unassigned.len());
    for path in &report.unassigned {
        println!("  {}", path);
    }

    if !report.conflicts.is_empty() {
        println!("\nConflicts: {}", report.conflicts.len());
        for conflict in &report.conflicts {
            println!("  {}", conflict);
        }
    }

    if let Some(json_path) = &options.json {
        let content = serde_json::to_string_pretty(&report)?;
        std::fs::write(json_path, content)
            .with_context(|| format!("Failed to write report: {:?}", json_path))?;
        tracing::info!("Wrote scan report to {:?}", json_path);
    }

    let records = if options.include_review {
        report.complete()
    } else {
        report.publishable()
    };
    if records.is_empty() {
        println!("\nNothing to publish.");
        return Ok(());
    }

    if !options.yes && !confirm("\nPublish? [Y/n]: ")? {
        println!("Publish cancelled.");
        return Ok(());
    }

    let mut submitter = DryRunSubmitter::default();
    let (items, success) =
        publish::publish_products(&project.name, &records, &mut submitter, options.overwrite);
    print!("\n{}", items);

    if !success {
        anyhow::bail!("Publishing failed for some products");
    }
    Ok(())
}

/// Empty answers count as yes.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer.is_empty() || answer == "y" || answer == "yes")
}

fn match_file(
    filename: &str,
    config_path: Option<&Path>,
    catalog: Option<PathBuf>,
    project_code_arg: Option<String>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let project = match project_code(&config, filename, project_code_arg) {
        Ok(code) => resolve_project(&config, catalog, &code)?,
        Err(e) => {
            tracing::warn!("{}", e);
            ProjectRecord {
                name: String::new(),
                code: String::new(),
                assets: Vec::new(),
            }
        }
    };

    let scanner = PackageScanner::new(&ingest_context(&config, &project));
    let (result, record) = scanner.inspect(&PackageItem {
        path: filename.to_string(),
        frame_range: None,
    });

    let output = serde_json::json!({
        "match": result,
        "record": record,
        "needs_review": record.needs_review(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn deliver(request_path: &Path, config_path: Option<&Path>, write_manifest: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let content = std::fs::read_to_string(request_path)
        .with_context(|| format!("Failed to read delivery request: {:?}", request_path))?;
    let request: DeliveryRequest = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse delivery request: {:?}", request_path))?;

    let datetime = datetime_data(&chrono::Local::now());
    let plan = delivery::plan_delivery(&request, &config.delivery, &datetime)?;

    println!("{}", serde_json::to_string_pretty(&plan)?);

    if write_manifest && !plan.manifest.is_empty() {
        delivery::write_manifest(&plan.manifest_path, &plan.manifest)?;
        tracing::info!("Wrote manifest to {:?}", plan.manifest_path);
    }

    if !plan.is_complete() {
        anyhow::bail!(
            "{} of {} outputs could not be planned",
            plan.failed.len(),
            plan.failed.len() + plan.outputs.len()
        );
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Tasks: {}", config.ingest.tasks.join(", "));
            println!(
                "  Fallback task: {}",
                config.ingest.fallback_task.as_deref().unwrap_or("none")
            );
            println!("  Parallel matching: {}", config.ingest.parallel);
            println!("  Staging dir: {}", config.delivery.staging_dir);
            println!("  Path template: {}", config.delivery.path_template);
            println!(
                "  Merge override levels: {}",
                config.delivery.merge_override_levels
            );
            match &config.tracking.catalog {
                Some(catalog) => println!("  Catalog: {}", catalog.display()),
                None => println!("  Catalog: none"),
            }
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Tasks: {}", config.ingest.tasks.join(", "));
            println!("  Staging dir: {}", config.delivery.staging_dir);
        }
    }

    Ok(())
}
