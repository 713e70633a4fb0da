//! Output-specific anatomy data and destination path resolution.

use regex::Regex;
use serde_json::{Map, Value};
use shotforged_common::paths::{is_single_file_extension, normalize_extension};
use shotforged_template::{format_template, format_template_strict, AnatomyData, TemplateError};
use std::sync::LazyLock;
use tracing::debug;

use super::overrides::{
    is_override, is_set, OverrideHierarchy, CUSTOM_TOKENS_KEY, OVERRIDE_SUFFIX,
};
use super::DeliveryError;

/// `outer[inner]` token keys.
static RE_NESTED_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\[(\w+)\]$").expect("nested token pattern is valid"));

/// Anatomy data for one output, with the default single-file extensions.
///
/// ```
/// use serde_json::{json, Map};
/// use shotforged::delivery::get_output_anatomy_data;
/// use shotforged_template::AnatomyData;
///
/// let base = AnatomyData::from_value(json!({"frame": "1001", "asset": "uni_pg_0455"})).unwrap();
///
/// let mov = get_output_anatomy_data(&base, &Map::new(), "mov_review", "mov").unwrap();
/// assert!(!mov.contains_key("frame"));
/// assert!(!mov.contains_key("is_sequence"));
/// assert_eq!(mov.get_str(&["delivery_type"]).as_deref(), Some("review"));
///
/// let exr = get_output_anatomy_data(&base, &Map::new(), "exr_final", "exr").unwrap();
/// assert!(exr.contains_key("is_sequence"));
/// ```
pub fn get_output_anatomy_data(
    base: &AnatomyData,
    delivery_data: &Map<String, Value>,
    output_name: &str,
    output_ext: &str,
) -> Result<AnatomyData, TemplateError> {
    output_anatomy_data(
        base,
        delivery_data,
        output_name,
        output_ext,
        is_single_file_extension(output_ext),
    )
}

/// Anatomy data for one output.
///
/// `delivery_data` keys are applied in order: `*_override` keys set the token
/// named by the key without its suffix (`task[short]_override` sets
/// `task.short`), `custom_tokens` sets the entries prefixed with
/// `"{output_name}:"`. String values are rendered against the data resolved so
/// far, so overrides may reference earlier tokens.
pub fn get_output_anatomy_data_with<S: AsRef<str>>(
    base: &AnatomyData,
    delivery_data: &Map<String, Value>,
    output_name: &str,
    output_ext: &str,
    single_file_extensions: &[S],
) -> Result<AnatomyData, TemplateError> {
    let ext = normalize_extension(output_ext);
    let single_file = single_file_extensions
        .iter()
        .any(|single| normalize_extension(single.as_ref()) == ext);
    output_anatomy_data(base, delivery_data, output_name, output_ext, single_file)
}

fn output_anatomy_data(
    base: &AnatomyData,
    delivery_data: &Map<String, Value>,
    output_name: &str,
    output_ext: &str,
    single_file: bool,
) -> Result<AnatomyData, TemplateError> {
    let mut data = base.clone();
    data.insert("output", output_name);
    data.insert("ext", output_ext);

    if single_file {
        data.remove("frame");
    } else {
        data.insert("is_sequence", "");
    }

    let delivery_type = output_name.rsplit('_').next().unwrap_or(output_name);
    data.insert("delivery_type", delivery_type);

    for (key, value) in delivery_data {
        if key == CUSTOM_TOKENS_KEY {
            apply_custom_tokens(&mut data, value, output_name)?;
            continue;
        }
        if !is_override(key, value) {
            continue;
        }
        let Some(token) = key.strip_suffix(OVERRIDE_SUFFIX) else {
            continue;
        };
        let value = resolve_value(value, &data)?;
        debug!("Override '{}' = {}", token, value);
        set_token(&mut data, token, value);
    }

    Ok(data)
}

fn apply_custom_tokens(
    data: &mut AnatomyData,
    tokens: &Value,
    output_name: &str,
) -> Result<(), TemplateError> {
    let Value::Object(tokens) = tokens else {
        return Ok(());
    };
    let prefix = format!("{output_name}:");
    for (key, value) in tokens {
        let Some(token) = key.strip_prefix(&prefix) else {
            continue;
        };
        if !is_set(value) {
            continue;
        }
        let value = resolve_value(value, data)?;
        debug!("Custom token '{}' = {}", token, value);
        set_token(data, token, value);
    }
    Ok(())
}

fn resolve_value(value: &Value, data: &AnatomyData) -> Result<Value, TemplateError> {
    match value {
        Value::String(template) => Ok(Value::String(format_template(template, data)?)),
        other => Ok(other.clone()),
    }
}

fn set_token(data: &mut AnatomyData, token: &str, value: Value) {
    if let Some(caps) = RE_NESTED_TOKEN.captures(token) {
        data.set_nested(&caps[1], &caps[2], value);
    } else {
        data.insert(token, value);
    }
}

/// Resolve the destination path of one output.
///
/// Overrides come from the most specific level defining any, see
/// [`OverrideHierarchy::effective`]. `template` is rendered strictly; any required token left unresolved fails
/// this output with [`DeliveryError::DestinationPath`].
pub fn resolve_output_path(
    base: &AnatomyData,
    overrides: &OverrideHierarchy,
    output_name: &str,
    output_ext: &str,
    template: &str,
) -> Result<String, DeliveryError> {
    let data = get_output_anatomy_data(base, &overrides.effective(), output_name, output_ext)?;
    render_destination(&data, output_name, template)
}

pub(crate) fn render_destination(
    data: &AnatomyData,
    output_name: &str,
    template: &str,
) -> Result<String, DeliveryError> {
    format_template_strict(template, data).map_err(|source| DeliveryError::DestinationPath {
        output: output_name.to_string(),
        source,
    })
}
