//! Hand-off of merged products to the publish-submission collaborator.

use tracing::{debug, info};

use super::assembler::{merge_records, Product, PublishRecord};
use crate::report::ReportItems;

pub const SUBMITTED: &str = "Successfully submitted products to publish";
pub const FAILED: &str = "Failed submission for products";
pub const DUPLICATED: &str = "Duplicated representation in product";
pub const NO_PROJECT: &str = "Project not selected";

/// Receives finished products; the farm job itself is built elsewhere.
pub trait PublishSubmitter {
    /// Submit one product; the message ends up in the report either way.
    fn submit(
        &mut self,
        project_name: &str,
        product: &Product,
        overwrite_version: bool,
    ) -> Result<String, String>;
}

/// Logs and records products instead of submitting them.
#[derive(Debug, Default)]
pub struct DryRunSubmitter {
    pub submitted: Vec<Product>,
}

impl PublishSubmitter for DryRunSubmitter {
    fn submit(
        &mut self,
        project_name: &str,
        product: &Product,
        overwrite_version: bool,
    ) -> Result<String, String> {
        info!(
            "[DRY RUN] Would publish {} to '{}' (overwrite: {})",
            product.key, project_name, overwrite_version
        );
        self.submitted.push(product.clone());
        Ok(format!("{} ({} representations)", product.key, product.representations.len()))
    }
}

/// Merge `records` into products and submit each one.
///
/// Returns the report and whether every submission went through.
pub fn publish_products<S: PublishSubmitter + ?Sized>(
    project_name: &str,
    records: &[PublishRecord],
    submitter: &mut S,
    overwrite_version: bool,
) -> (ReportItems, bool) {
    let mut report = ReportItems::new();

    if project_name.is_empty() {
        report.push(NO_PROJECT, "Select project before publishing!");
        return (report, false);
    }

    let outcome = merge_records(records);
    for conflict in &outcome.conflicts {
        report.push(DUPLICATED, conflict.to_string());
    }
    debug!("Flattened products: {:?}", outcome.products);

    let mut success = true;
    for product in &outcome.products {
        match submitter.submit(project_name, product, overwrite_version) {
            Ok(msg) => report.push(SUBMITTED, msg),
            Err(msg) => {
                success = false;
                report.push(FAILED, msg);
            }
        }
    }

    (report, success)
}
