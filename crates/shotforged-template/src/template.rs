//! Path templates with nested keys, format specs and optional segments.
//!
//! Syntax:
//!
//! - `{key}` substitutes a top-level token.
//! - `{key[sub]}` reads `sub` inside the `key` object (any depth).
//! - `{key:spec}` applies a format spec: `[[fill]align][0][width][.precision][type]`
//!   with align one of `<`, `>`, `^` and type one of `s`, `d`, `f`.
//! - `<...>` is an optional segment, emitted only when every token inside it
//!   resolves. Segments nest. A token set to an empty string still counts as
//!   resolved, so `<{is_sequence}<{filename}/>>` turns on the inner folder by
//!   the mere presence of `is_sequence`.

use serde_json::Value;
use std::fmt;
use tracing::trace;

use crate::anatomy::{scalar_to_string, AnatomyData, Lookup};
use crate::error::{Result, TemplateError};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    raw: String,
    path: Vec<String>,
    spec: Option<String>,
}

impl Token {
    fn key(&self) -> String {
        let mut key = self.path[0].clone();
        for sub in &self.path[1..] {
            key.push('[');
            key.push_str(sub);
            key.push(']');
        }
        key
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text(String),
    Token(Token),
    Optional(Vec<Part>),
}

/// Outcome of rendering a template against anatomy data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateResult {
    /// Rendered text; unresolved required tokens are left as written.
    pub output: String,
    /// Required tokens with no value, in template order.
    pub missing_keys: Vec<String>,
    /// Required tokens that resolved to objects or lists.
    pub invalid_types: Vec<String>,
}

impl TemplateResult {
    /// Every required token resolved.
    pub fn solved(&self) -> bool {
        self.missing_keys.is_empty() && self.invalid_types.is_empty()
    }
}

impl fmt::Display for TemplateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output)
    }
}

/// A parsed template string.
///
/// ```
/// use serde_json::json;
/// use shotforged_template::{AnatomyData, StringTemplate};
///
/// let template = StringTemplate::parse(
///     "{SEQ}_{shotnum}_{task[short]}_v{version:0>4}_{vendor}<_{suffix}>",
/// )
/// .unwrap();
/// let data = AnatomyData::from_value(json!({
///     "SEQ": "PG", "shotnum": "0455", "task": {"short": "cmp"},
///     "version": 3, "vendor": "AX",
/// }))
/// .unwrap();
///
/// assert_eq!(template.format_strict(&data).unwrap(), "PG_0455_cmp_v0003_AX");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTemplate {
    raw: String,
    parts: Vec<Part>,
}

impl StringTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let mut parser = Parser {
            template,
            chars: template.char_indices().peekable(),
        };
        let parts = parser.parse_parts(0)?;
        Ok(Self {
            raw: template.to_string(),
            parts,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Render, collecting unresolved tokens instead of failing.
    pub fn format(&self, data: &AnatomyData) -> Result<TemplateResult> {
        let mut result = TemplateResult::default();
        render_parts(&self.parts, data, &mut result)?;
        trace!("Rendered '{}' to '{}'", self.raw, result.output);
        Ok(result)
    }

    /// Render, failing when any required token is unresolved.
    pub fn format_strict(&self, data: &AnatomyData) -> Result<String> {
        let result = self.format(data)?;
        if !result.missing_keys.is_empty() {
            return Err(TemplateError::MissingKeys {
                template: self.raw.clone(),
                keys: result.missing_keys,
            });
        }
        if !result.invalid_types.is_empty() {
            return Err(TemplateError::InvalidTypes {
                template: self.raw.clone(),
                keys: result.invalid_types,
            });
        }
        Ok(result.output)
    }
}

impl fmt::Display for StringTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse and render `template` leniently; unresolved tokens stay literal.
///
/// Used to pre-resolve values that may reference tokens not known yet.
pub fn format_template(template: &str, data: &AnatomyData) -> Result<String> {
    Ok(StringTemplate::parse(template)?.format(data)?.output)
}

/// Parse and render `template`, failing on any unresolved token.
pub fn format_template_strict(template: &str, data: &AnatomyData) -> Result<String> {
    StringTemplate::parse(template)?.format_strict(data)
}

struct Parser<'a> {
    template: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl Parser<'_> {
    fn parse_parts(&mut self, depth: usize) -> Result<Vec<Part>> {
        let mut parts = Vec::new();
        let mut text = String::new();

        while let Some((_, c)) = self.chars.next() {
            match c {
                '{' => {
                    if !text.is_empty() {
                        parts.push(Part::Text(std::mem::take(&mut text)));
                    }
                    parts.push(Part::Token(self.parse_token()?));
                }
                '<' => {
                    if !text.is_empty() {
                        parts.push(Part::Text(std::mem::take(&mut text)));
                    }
                    parts.push(Part::Optional(self.parse_parts(depth + 1)?));
                }
                '>' if depth > 0 => {
                    if !text.is_empty() {
                        parts.push(Part::Text(text));
                    }
                    return Ok(parts);
                }
                _ => text.push(c),
            }
        }

        if depth > 0 {
            return Err(TemplateError::Unbalanced(self.template.to_string()));
        }
        if !text.is_empty() {
            parts.push(Part::Text(text));
        }
        Ok(parts)
    }

    fn parse_token(&mut self) -> Result<Token> {
        let mut body = String::new();
        loop {
            match self.chars.next() {
                Some((_, '}')) => break,
                Some((_, c)) => body.push(c),
                None => return Err(TemplateError::UnclosedToken(self.template.to_string())),
            }
        }

        let (key, spec) = match body.split_once(':') {
            Some((key, spec)) => (key, Some(spec.to_string())),
            None => (body.as_str(), None),
        };

        let mut path = Vec::new();
        let (name, mut rest) = match key.find('[') {
            Some(idx) => (&key[..idx], &key[idx..]),
            None => (key, ""),
        };
        path.push(name.trim().to_string());
        while let Some(stripped) = rest.strip_prefix('[') {
            let Some(end) = stripped.find(']') else {
                break;
            };
            path.push(stripped[..end].to_string());
            rest = &stripped[end + 1..];
        }

        Ok(Token {
            raw: format!("{{{body}}}"),
            path,
            spec,
        })
    }
}

fn render_parts(parts: &[Part], data: &AnatomyData, result: &mut TemplateResult) -> Result<()> {
    for part in parts {
        match part {
            Part::Text(text) => result.output.push_str(text),
            Part::Token(token) => {
                let path: Vec<&str> = token.path.iter().map(String::as_str).collect();
                match data.lookup(&path) {
                    Lookup::Found(value) => {
                        let rendered = apply_spec(&token.key(), value, token.spec.as_deref())?;
                        result.output.push_str(&rendered);
                    }
                    Lookup::Missing => {
                        push_unique(&mut result.missing_keys, token.key());
                        result.output.push_str(&token.raw);
                    }
                    Lookup::InvalidType => {
                        push_unique(&mut result.invalid_types, token.key());
                        result.output.push_str(&token.raw);
                    }
                }
            }
            Part::Optional(inner) => {
                let mut local = TemplateResult::default();
                render_parts(inner, data, &mut local)?;
                if local.solved() {
                    result.output.push_str(&local.output);
                }
            }
        }
    }
    Ok(())
}

fn push_unique(keys: &mut Vec<String>, key: String) {
    if !keys.contains(&key) {
        keys.push(key);
    }
}

#[derive(Debug, Default)]
struct FormatSpec {
    fill: Option<char>,
    align: Option<char>,
    zero: bool,
    width: usize,
    precision: Option<usize>,
    kind: Option<char>,
}

fn parse_spec(key: &str, spec: &str) -> Result<FormatSpec> {
    let invalid = || TemplateError::InvalidFormat {
        key: key.to_string(),
        spec: spec.to_string(),
    };
    let chars: Vec<char> = spec.chars().collect();
    let mut parsed = FormatSpec::default();
    let mut i = 0;

    let is_align = |c: char| matches!(c, '<' | '>' | '^');
    if chars.len() >= 2 && is_align(chars[1]) {
        parsed.fill = Some(chars[0]);
        parsed.align = Some(chars[1]);
        i = 2;
    } else if !chars.is_empty() && is_align(chars[0]) {
        parsed.align = Some(chars[0]);
        i = 1;
    }

    if i < chars.len() && chars[i] == '0' {
        parsed.zero = true;
        i += 1;
    }

    let start = i;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i > start {
        parsed.width = chars[start..i]
            .iter()
            .collect::<String>()
            .parse()
            .map_err(|_| invalid())?;
    }

    if i < chars.len() && chars[i] == '.' {
        i += 1;
        let start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        if i == start {
            return Err(invalid());
        }
        parsed.precision = Some(
            chars[start..i]
                .iter()
                .collect::<String>()
                .parse()
                .map_err(|_| invalid())?,
        );
    }

    if i < chars.len() {
        if !matches!(chars[i], 's' | 'd' | 'f') {
            return Err(invalid());
        }
        parsed.kind = Some(chars[i]);
        i += 1;
    }

    if i != chars.len() {
        return Err(invalid());
    }
    Ok(parsed)
}

fn apply_spec(key: &str, value: &Value, spec: Option<&str>) -> Result<String> {
    let Some(spec) = spec.filter(|s| !s.is_empty()) else {
        return Ok(scalar_to_string(value));
    };
    let parsed = parse_spec(key, spec)?;
    let invalid = || TemplateError::InvalidFormat {
        key: key.to_string(),
        spec: spec.to_string(),
    };

    let text = match parsed.kind {
        Some('d') => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
            Value::String(s) if s.trim().parse::<i64>().is_ok() => s.trim().to_string(),
            _ => return Err(invalid()),
        },
        Some('f') => {
            let number = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .ok_or_else(invalid)?;
            format!("{:.*}", parsed.precision.unwrap_or(6), number)
        }
        _ => {
            let text = scalar_to_string(value);
            match parsed.precision {
                Some(precision) if matches!(value, Value::String(_)) => {
                    text.chars().take(precision).collect()
                }
                _ => text,
            }
        }
    };

    Ok(pad(&text, &parsed))
}

fn pad(text: &str, spec: &FormatSpec) -> String {
    let len = text.chars().count();
    if len >= spec.width {
        return text.to_string();
    }
    let count = spec.width - len;

    // `0` without an explicit alignment pads after the sign.
    if spec.zero && spec.align.is_none() {
        let (sign, digits) = match text.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", text),
        };
        return format!("{sign}{}{digits}", "0".repeat(count));
    }

    let fill = spec.fill.unwrap_or(if spec.zero { '0' } else { ' ' });
    let filler = |n: usize| fill.to_string().repeat(n);
    match spec.align {
        Some('<') => format!("{text}{}", filler(count)),
        Some('^') => {
            let left = count / 2;
            format!("{}{text}{}", filler(left), filler(count - left))
        }
        _ => format!("{}{text}", filler(count)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> AnatomyData {
        AnatomyData::from_value(value).unwrap()
    }

    fn render(template: &str, value: Value) -> Result<String> {
        format_template_strict(template, &data(value))
    }

    #[test]
    fn test_plain_tokens() {
        assert_eq!(
            render("{a}/{b}.{ext}", json!({"a": "x", "b": 2, "ext": "exr"})).unwrap(),
            "x/2.exr"
        );
    }

    #[test]
    fn test_nested_tokens() {
        let out = render(
            "/proj/{project[code]}/{task[meta][short]}",
            json!({"project": {"code": "uni"}, "task": {"meta": {"short": "cmp"}}}),
        )
        .unwrap();
        assert_eq!(out, "/proj/uni/cmp");
    }

    #[test]
    fn test_format_specs() {
        let values = json!({"v": 7, "s": "12", "name": "ab", "neg": -5, "f": 1.5});
        assert_eq!(render("{v:0>4}", values.clone()).unwrap(), "0007");
        assert_eq!(render("{s:0>4}", values.clone()).unwrap(), "0012");
        assert_eq!(render("{v:03d}", values.clone()).unwrap(), "007");
        assert_eq!(render("{neg:04d}", values.clone()).unwrap(), "-005");
        assert_eq!(render("{name:<4}|", values.clone()).unwrap(), "ab  |");
        assert_eq!(render("{name:*^6}", values.clone()).unwrap(), "**ab**");
        assert_eq!(render("{name:.1}", values.clone()).unwrap(), "a");
        assert_eq!(render("{f:.2f}", values.clone()).unwrap(), "1.50");
        assert_eq!(render("{v:2}", values).unwrap(), " 7");
    }

    #[test]
    fn test_invalid_format_spec() {
        let err = render("{name:d}", json!({"name": "ab"})).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidFormat { .. }));
        let err = render("{name:q}", json!({"name": "ab"})).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidFormat { .. }));
    }

    #[test]
    fn test_missing_keys_fail_strict() {
        let err = render("{a}/{b}/{a}", json!({})).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingKeys {
                template: "{a}/{b}/{a}".to_string(),
                keys: vec!["a".to_string(), "b".to_string()],
            }
        );
    }

    #[test]
    fn test_invalid_types_fail_strict() {
        let err = render("{task}", json!({"task": {"name": "comp"}})).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidTypes { .. }));
    }

    #[test]
    fn test_lenient_keeps_unresolved_tokens() {
        let out = format_template("{shot}_{task[short]}_v{version:0>3}", &data(json!({"shot": "sh010"}))).unwrap();
        assert_eq!(out, "sh010_{task[short]}_v{version:0>3}");
    }

    #[test]
    fn test_optional_segment() {
        assert_eq!(render("a<_{suffix}>.mov", json!({})).unwrap(), "a.mov");
        assert_eq!(render("a<_{suffix}>.mov", json!({"suffix": "x"})).unwrap(), "a_x.mov");
        assert_eq!(render("a<_{suffix}>.mov", json!({"suffix": null})).unwrap(), "a.mov");
    }

    #[test]
    fn test_nested_optional_on_presence() {
        let template = "{package_name}/{output}/<{is_sequence}<{filename}/>>{filename}<.{frame:0>4}>.{ext}";
        let sequence = json!({
            "package_name": "pkg", "output": "exr_final", "is_sequence": "",
            "filename": "PG_0455", "frame": 1001, "ext": "exr",
        });
        assert_eq!(
            render(template, sequence).unwrap(),
            "pkg/exr_final/PG_0455/PG_0455.1001.exr"
        );

        let single = json!({
            "package_name": "pkg", "output": "mov_review",
            "filename": "PG_0455", "ext": "mov",
        });
        assert_eq!(render(template, single).unwrap(), "pkg/mov_review/PG_0455.mov");
    }

    #[test]
    fn test_optional_inner_missing_drops_whole_block() {
        let out = render("x<{a}<{b}/>>y", json!({"a": "1"})).unwrap();
        assert_eq!(out, "x1y");
        let out = render("x<{a}<{b}/>>y", json!({"b": "2"})).unwrap();
        assert_eq!(out, "xy");
    }

    #[test]
    fn test_unbalanced_and_unclosed() {
        assert!(matches!(
            StringTemplate::parse("a<{b}"),
            Err(TemplateError::Unbalanced(_))
        ));
        assert!(matches!(
            StringTemplate::parse("a{b"),
            Err(TemplateError::UnclosedToken(_))
        ));
        // A stray closing bracket outside a segment is plain text.
        assert_eq!(render("a>b", json!({})).unwrap(), "a>b");
    }

    #[test]
    fn test_result_reports_missing() {
        let template = StringTemplate::parse("{a}/{b[c]}").unwrap();
        let result = template.format(&data(json!({"a": 1}))).unwrap();
        assert!(!result.solved());
        assert_eq!(result.missing_keys, vec!["b[c]"]);
        assert_eq!(result.to_string(), "1/{b[c]}");
    }
}
