//! Regular expressions behind the filename cascade.
//!
//! All patterns expect a bare file name. The frame group accepts literal
//! digits as well as the `*`, `%0Nd` and `#` placeholders.
//!
//! Example names each pattern is built for:
//!
//! - strict: `uni_pg_0455_plt_01_roto_output-01_v001.1001.exr`
//! - generic: `abc_sq01_0010_plate_comp_v002.mov`
//! - fallback: `MP01_V0001_CC.%04d.exr`

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

const FRAME: &str = r"(?P<frame>\.(?:\*|%0?\d*d|#|\d)+)?";
const EXTENSION: &str = r"(?P<extension>\.[a-zA-Z]+)$";

/// Structural pattern with unvalidated shot code and task.
pub(crate) static GENERIC_FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"^(?P<shot_code>[a-zA-Z0-9]+_[a-zA-Z0-9]+_\d+)_(?P<subset>[a-zA-Z0-9_]+)_(?P<task>[a-zA-Z0-9]+)_(?P<variant>[a-zA-Z0-9_\-]*_)?(?P<delivery_version>v\d+){FRAME}{EXTENSION}"
    );
    case_insensitive(&pattern).expect("generic filename pattern is valid")
});

/// Last resort: `{subset}_{version}_{suffix?}{frame?}{ext}`.
pub(crate) static FALLBACK_FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"^(?P<subset>\w+)_(?P<delivery_version>v\d+)_?(?P<suffix>[a-zA-Z0-9_\-]*){FRAME}{EXTENSION}"
    );
    case_insensitive(&pattern).expect("fallback filename pattern is valid")
});

/// Strict pattern constrained to `codes` and `tasks`.
///
/// Returns `None` when either list is empty, since an empty alternation
/// would match nothing useful.
pub(crate) fn strict_filename_re<S: AsRef<str>>(codes: &[S], tasks: &[S]) -> Option<Regex> {
    let codes = alternation(codes)?;
    let tasks = alternation(tasks)?;
    let pattern = format!(
        r"^(?P<shot_code>{codes})_(?P<subset>[a-zA-Z0-9_]+)_(?P<task>{tasks})_(?P<variant>[a-zA-Z0-9_\-]*_)?(?P<delivery_version>v\d+){FRAME}{EXTENSION}"
    );
    case_insensitive(&pattern).ok()
}

fn alternation<S: AsRef<str>>(items: &[S]) -> Option<String> {
    let escaped: Vec<String> = items
        .iter()
        .map(|item| item.as_ref().trim())
        .filter(|item| !item.is_empty())
        .map(regex::escape)
        .collect();
    if escaped.is_empty() {
        None
    } else {
        Some(format!("(?:{})", escaped.join("|")))
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        // Large entity lists make big alternations.
        .size_limit(64 * (1 << 20))
        .build()
}

/// Parse `v001` / `V0001` into its number.
pub(crate) fn parse_version(token: &str) -> Option<u32> {
    token.trim_start_matches(['v', 'V']).parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_pattern() {
        let re = strict_filename_re(&["uni_pg_0455"], &["roto", "paint"]).unwrap();
        let caps = re
            .captures("uni_pg_0455_plt_01_roto_output-01_v001.1001.exr")
            .unwrap();
        assert_eq!(&caps["shot_code"], "uni_pg_0455");
        assert_eq!(&caps["subset"], "plt_01");
        assert_eq!(&caps["task"], "roto");
        assert_eq!(&caps["variant"], "output-01_");
        assert_eq!(&caps["delivery_version"], "v001");
        assert_eq!(&caps["frame"], ".1001");
        assert_eq!(&caps["extension"], ".exr");
    }

    #[test]
    fn test_strict_pattern_escapes_codes() {
        let re = strict_filename_re(&["a.b"], &["roto"]).unwrap();
        assert!(re.is_match("a.b_plate_roto_v001.exr"));
        assert!(!re.is_match("axb_plate_roto_v001.exr"));
    }

    #[test]
    fn test_strict_pattern_needs_codes() {
        let empty: [&str; 0] = [];
        assert!(strict_filename_re(&empty, &empty).is_none());
        assert!(strict_filename_re(&["sh010"], &[" "]).is_none());
    }

    #[test]
    fn test_generic_pattern() {
        let caps = GENERIC_FILENAME_RE
            .captures("abc_sq01_0010_plate_Comp_v002.%04d.exr")
            .unwrap();
        assert_eq!(&caps["shot_code"], "abc_sq01_0010");
        assert_eq!(&caps["subset"], "plate");
        assert_eq!(&caps["task"], "Comp");
        assert!(caps.name("variant").is_none());
        assert_eq!(&caps["frame"], ".%04d");
    }

    #[test]
    fn test_fallback_pattern() {
        let caps = FALLBACK_FILENAME_RE.captures("MP01_V0001_CC.%04d.exr").unwrap();
        assert_eq!(&caps["subset"], "MP01");
        assert_eq!(&caps["delivery_version"], "V0001");
        assert_eq!(&caps["suffix"], "CC");
        assert_eq!(&caps["extension"], ".exr");
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("v001"), Some(1));
        assert_eq!(parse_version("V0012"), Some(12));
        assert_eq!(parse_version("vx"), None);
    }
}
