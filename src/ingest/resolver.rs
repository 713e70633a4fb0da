//! Entity resolution: map a matched code or a raw path to a tracker asset.
//!
//! Three tiers, first hit wins:
//!
//! 1. exact name, ignoring case
//! 2. an asset name contained anywhere in the candidate, first in list order
//! 3. the same, with the `{project_code}_` prefix removed from asset names
//!
//! Containment has no word-boundary check, so `ab_01` is found inside
//! `ab_010`. Callers that care keep longer names earlier in the list.

use serde::Serialize;
use shotforged_parser::matcher::find_containing;
use shotforged_parser::MatchResult;
use tracing::{debug, warn};

use crate::tracking::AssetRecord;

/// Which tier resolved an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveTier {
    Exact,
    Contained,
    ProjectStripped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMatch<'a> {
    pub asset: &'a AssetRecord,
    /// Lowercased text that matched the candidate.
    pub matched: String,
    pub tier: ResolveTier,
}

/// Resolve `code_or_path` against `known_assets`.
///
/// ```
/// use shotforged::ingest::resolver::{resolve_entity, ResolveTier};
/// use shotforged::tracking::AssetRecord;
///
/// let assets = vec![AssetRecord::new("uni_pg_0455"), AssetRecord::new("uni_pg_0460")];
///
/// let hit = resolve_entity("UNI_PG_0460", &assets, "uni").unwrap();
/// assert_eq!(hit.asset.name, "uni_pg_0460");
/// assert_eq!(hit.tier, ResolveTier::Exact);
///
/// let hit = resolve_entity("/io/From_ax/pg_0455_plate_v001.mov", &assets, "uni").unwrap();
/// assert_eq!(hit.asset.name, "uni_pg_0455");
/// assert_eq!(hit.tier, ResolveTier::ProjectStripped);
///
/// assert!(resolve_entity("/io/From_ax/notes.pdf", &assets, "uni").is_none());
/// ```
pub fn resolve_entity<'a>(
    code_or_path: &str,
    known_assets: &'a [AssetRecord],
    project_code: &str,
) -> Option<EntityMatch<'a>> {
    if let Some(found) = resolve_exact(code_or_path, known_assets) {
        return Some(found);
    }
    resolve_contained(code_or_path, known_assets, project_code)
}

fn resolve_exact<'a>(code: &str, known_assets: &'a [AssetRecord]) -> Option<EntityMatch<'a>> {
    let mut hits = known_assets
        .iter()
        .filter(|asset| asset.name.eq_ignore_ascii_case(code));
    let asset = hits.next()?;
    if hits.next().is_some() {
        warn!("Too many records found for '{}', using first", code);
    }
    Some(EntityMatch {
        asset,
        matched: code.to_lowercase(),
        tier: ResolveTier::Exact,
    })
}

fn resolve_contained<'a>(
    candidate: &str,
    known_assets: &'a [AssetRecord],
    project_code: &str,
) -> Option<EntityMatch<'a>> {
    let names: Vec<&str> = known_assets.iter().map(|a| a.name.as_str()).collect();
    let found = find_containing(candidate, &names, Some(project_code))?;
    Some(EntityMatch {
        asset: &known_assets[found.index],
        matched: found.matched,
        tier: if found.stripped {
            ResolveTier::ProjectStripped
        } else {
            ResolveTier::Contained
        },
    })
}

/// Resolver bound to one project's asset snapshot.
///
/// Path containment only considers names with an underscore; short names
/// like `uni` would match nearly every path of the show.
#[derive(Debug, Clone)]
pub struct EntityResolver {
    assets: Vec<AssetRecord>,
    searchable: Vec<AssetRecord>,
    project_code: String,
}

impl EntityResolver {
    pub fn new(assets: Vec<AssetRecord>, project_code: impl Into<String>) -> Self {
        let searchable = assets
            .iter()
            .filter(|asset| asset.name.contains('_'))
            .cloned()
            .collect();
        Self {
            assets,
            searchable,
            project_code: project_code.into(),
        }
    }

    pub fn assets(&self) -> &[AssetRecord] {
        &self.assets
    }

    pub fn asset_names(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.name.clone()).collect()
    }

    pub fn project_code(&self) -> &str {
        &self.project_code
    }

    /// Resolve a matcher result: its shot code by exact name first, then the
    /// full path by containment.
    pub fn resolve(&self, result: &MatchResult) -> Option<EntityMatch<'_>> {
        if let Some(code) = result.shot_code.as_deref() {
            if let Some(found) = resolve_exact(code, &self.assets) {
                return Some(found);
            }
            debug!("Shot code '{}' is not a known asset", code);
        }

        debug!(
            "Asset not found yet, doing string comparison in path '{}'",
            result.path
        );
        let found = resolve_contained(&result.path, &self.searchable, &self.project_code);
        if found.is_none() {
            warn!("Couldn't find asset in file '{}'", result.path);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets(names: &[&str]) -> Vec<AssetRecord> {
        names.iter().map(|n| AssetRecord::new(*n)).collect()
    }

    #[test]
    fn test_exact_beats_containment() {
        let assets = assets(&["ab_01", "ab_010"]);
        let hit = resolve_entity("AB_010", &assets, "ab").unwrap();
        assert_eq!(hit.asset.name, "ab_010");
        assert_eq!(hit.tier, ResolveTier::Exact);
    }

    #[test]
    fn test_containment_is_first_in_list() {
        // No boundary check: the shorter code wins when listed first.
        let listed = assets(&["ab_01", "ab_010"]);
        let hit = resolve_entity("/pkg/ab_010_plate_v001.exr", &listed, "ab").unwrap();
        assert_eq!(hit.asset.name, "ab_01");
        assert_eq!(hit.tier, ResolveTier::Contained);

        let reordered = assets(&["ab_010", "ab_01"]);
        let hit = resolve_entity("/pkg/ab_010_plate_v001.exr", &reordered, "ab").unwrap();
        assert_eq!(hit.asset.name, "ab_010");
    }

    #[test]
    fn test_project_stripped_tier() {
        let assets = assets(&["uni_pg_0455"]);
        let hit = resolve_entity("/pkg/PG_0455/comp.nk", &assets, "uni").unwrap();
        assert_eq!(hit.tier, ResolveTier::ProjectStripped);
        assert_eq!(hit.matched, "pg_0455");
    }

    #[test]
    fn test_unresolved_is_none() {
        let assets = assets(&["uni_pg_0455"]);
        assert!(resolve_entity("/pkg/MP01_V0001_CC.%04d.exr", &assets, "uni").is_none());
        assert!(resolve_entity("anything", &[], "uni").is_none());
    }

    #[test]
    fn test_resolver_skips_short_names_in_paths() {
        let resolver = EntityResolver::new(assets(&["uni", "uni_pg_0455"]), "uni");
        let mut result = MatchResult::new("/proj/uni/io/From_ax/readme.txt");
        assert!(resolver.resolve(&result).is_none());

        result.shot_code = Some("UNI".to_string());
        let hit = resolver.resolve(&result).unwrap();
        assert_eq!(hit.asset.name, "uni");
    }
}
