//! CSV manifest shipped inside a delivery package.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::Result;

/// One delivered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRow {
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "Submitted For")]
    pub submitted_for: String,
    #[serde(rename = "Notes")]
    pub notes: String,
}

/// Write `rows` to `path` with a `Filename,Submitted For,Notes` header,
/// creating parent directories as needed.
pub fn write_manifest(path: &Path, rows: &[ManifestRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        writer.write_record(["Filename", "Submitted For", "Notes"])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    debug!("Written CSV data at {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_manifest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("uni_pkg/uni_pkg.csv");
        let rows = vec![
            ManifestRow {
                filename: "uni_pg_0455_cmp_v003.[1001-1010].exr".to_string(),
                submitted_for: "Final".to_string(),
                notes: "Comp, with grade".to_string(),
            },
            ManifestRow {
                filename: "uni_pg_0455_cmp_v003.mov".to_string(),
                submitted_for: "Final".to_string(),
                notes: String::new(),
            },
        ];

        write_manifest(&path, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Filename,Submitted For,Notes\n\
             uni_pg_0455_cmp_v003.[1001-1010].exr,Final,\"Comp, with grade\"\n\
             uni_pg_0455_cmp_v003.mov,Final,\n"
        );
    }

    #[test]
    fn test_empty_manifest_has_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        write_manifest(&path, &[]).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Filename,Submitted For,Notes\n"
        );
    }
}
