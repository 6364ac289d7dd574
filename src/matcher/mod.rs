//! Version compatibility matching
//!
//! Selects the single best release of a project for a target
//! game-version/loader pair, with an optional fallback floor for targets the
//! project has not caught up to yet.

use std::fmt;
use std::str::FromStr;

use crate::catalog::types::ProjectVersion;
use crate::core::RinthError;

/// Loader tags that declare compatibility with every loader
const UNIVERSAL_LOADERS: &[&str] = &["minecraft", "datapack"];

/// A dotted numeric game version ("1.21.4")
///
/// Ordering is lexicographic over the numeric components, so 1.21 < 1.21.4
/// < 1.22. Tags without a numeric dotted form (snapshot names) do not parse.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GameVersion(Vec<u32>);

impl FromStr for GameVersion {
    type Err = RinthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<u32> = s
            .trim()
            .split('.')
            .map_while(|part| part.parse().ok())
            .collect();

        if parts.is_empty() {
            return Err(RinthError::InvalidGameVersion(s.to_string()));
        }

        Ok(GameVersion(parts))
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// The run's matching target, immutable for the run's lifetime
#[derive(Debug, Clone)]
pub struct MatchTarget {
    /// Game version being synced for
    pub game_version: GameVersion,

    /// Loader being synced for
    pub loader: String,

    /// Lowest game version acceptable as a substitute, if any
    pub fallback_floor: Option<GameVersion>,
}

/// Result of matching a project's versions against a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult<'a> {
    /// A release supporting the target game version exactly
    Exact(&'a ProjectVersion),

    /// A release inside [fallback_floor, target]; needs confirmation
    Fallback(&'a ProjectVersion),

    /// Nothing compatible
    NoMatch,
}

/// Select the best release for the target.
///
/// Exact matches win over fallback candidates; within each tier the most
/// recently published release wins, with ties broken by the API-returned
/// order. A release with no usable file is never selectable.
pub fn select<'a>(versions: &'a [ProjectVersion], target: &MatchTarget) -> MatchResult<'a> {
    let exact = most_recent(versions.iter().filter(|v| {
        selectable(v) && loader_matches(v, &target.loader) && supports_exactly(v, target)
    }));
    if let Some(version) = exact {
        return MatchResult::Exact(version);
    }

    if let Some(ref floor) = target.fallback_floor {
        let fallback = most_recent(versions.iter().filter(|v| {
            selectable(v)
                && loader_matches(v, &target.loader)
                && supports_in_range(v, floor, &target.game_version)
        }));
        if let Some(version) = fallback {
            return MatchResult::Fallback(version);
        }
    }

    MatchResult::NoMatch
}

/// Highest parseable game-version tag at or below the target, across all
/// releases. Used for "closest version" reporting when nothing matches.
pub fn highest_supported(versions: &[ProjectVersion], target: &GameVersion) -> Option<GameVersion> {
    versions
        .iter()
        .flat_map(|v| v.game_versions.iter())
        .filter_map(|tag| tag.parse::<GameVersion>().ok())
        .filter(|gv| gv <= target)
        .max()
}

fn selectable(version: &ProjectVersion) -> bool {
    version.primary_file().is_some()
}

fn loader_matches(version: &ProjectVersion, loader: &str) -> bool {
    version
        .loaders
        .iter()
        .any(|l| l == loader || UNIVERSAL_LOADERS.contains(&l.as_str()))
}

fn supports_exactly(version: &ProjectVersion, target: &MatchTarget) -> bool {
    version
        .game_versions
        .iter()
        .filter_map(|tag| tag.parse::<GameVersion>().ok())
        .any(|gv| gv == target.game_version)
}

fn supports_in_range(version: &ProjectVersion, floor: &GameVersion, ceiling: &GameVersion) -> bool {
    version
        .game_versions
        .iter()
        .filter_map(|tag| tag.parse::<GameVersion>().ok())
        .any(|gv| &gv >= floor && &gv <= ceiling)
}

/// Most recently published version; ties keep the earliest in input order
fn most_recent<'a, I>(versions: I) -> Option<&'a ProjectVersion>
where
    I: Iterator<Item = &'a ProjectVersion>,
{
    let mut best: Option<&ProjectVersion> = None;
    for version in versions {
        match best {
            Some(current) if version.date_published <= current.date_published => {}
            _ => best = Some(version),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{FileHashes, VersionFile};
    use chrono::{TimeZone, Utc};

    fn gv(s: &str) -> GameVersion {
        s.parse().unwrap()
    }

    fn target(game: &str, loader: &str, floor: Option<&str>) -> MatchTarget {
        MatchTarget {
            game_version: gv(game),
            loader: loader.to_string(),
            fallback_floor: floor.map(gv),
        }
    }

    fn release(id: &str, games: &[&str], loaders: &[&str], day: u32) -> ProjectVersion {
        ProjectVersion {
            id: id.to_string(),
            project_id: "sodium".to_string(),
            name: id.to_string(),
            version_number: id.to_string(),
            game_versions: games.iter().map(|s| s.to_string()).collect(),
            loaders: loaders.iter().map(|s| s.to_string()).collect(),
            date_published: Utc.with_ymd_and_hms(2025, 6, day, 0, 0, 0).unwrap(),
            files: vec![VersionFile {
                url: format!("https://cdn.example/{}.jar", id),
                filename: format!("{}.jar", id),
                primary: true,
                size: 0,
                hashes: FileHashes::default(),
            }],
            dependencies: vec![],
        }
    }

    #[test]
    fn test_game_version_ordering() {
        assert!(gv("1.21") < gv("1.21.4"));
        assert!(gv("1.21.4") < gv("1.21.8"));
        assert!(gv("1.21.8") < gv("1.22"));
        assert_eq!(gv("1.21.4").to_string(), "1.21.4");
    }

    #[test]
    fn test_game_version_parse_rejects_snapshots() {
        assert!("25w14a".parse::<GameVersion>().is_err());
        assert!("".parse::<GameVersion>().is_err());
        // Trailing non-numeric components are dropped
        assert_eq!(gv("1.21.4-rc1"), gv("1.21"));
    }

    #[test]
    fn test_exact_match_picks_target_version() {
        let versions = vec![
            release("v1", &["1.21.4"], &["fabric"], 1),
            release("v2", &["1.21.8"], &["fabric"], 2),
        ];

        let result = select(&versions, &target("1.21.8", "fabric", None));
        assert!(matches!(result, MatchResult::Exact(v) if v.id == "v2"));
    }

    #[test]
    fn test_exact_match_prefers_most_recent() {
        let versions = vec![
            release("old", &["1.21.8"], &["fabric"], 1),
            release("new", &["1.21.8"], &["fabric"], 9),
        ];

        let result = select(&versions, &target("1.21.8", "fabric", None));
        assert!(matches!(result, MatchResult::Exact(v) if v.id == "new"));
    }

    #[test]
    fn test_timestamp_tie_keeps_api_order() {
        let versions = vec![
            release("first", &["1.21.8"], &["fabric"], 5),
            release("second", &["1.21.8"], &["fabric"], 5),
        ];

        let result = select(&versions, &target("1.21.8", "fabric", None));
        assert!(matches!(result, MatchResult::Exact(v) if v.id == "first"));
    }

    #[test]
    fn test_fallback_within_floor() {
        let versions = vec![
            release("v1", &["1.21.4"], &["fabric"], 1),
            release("v2", &["1.21.8"], &["fabric"], 2),
        ];

        // No 1.21.9 release exists; 1.21.8 sits inside [1.21.6, 1.21.9]
        let result = select(&versions, &target("1.21.9", "fabric", Some("1.21.6")));
        assert!(matches!(result, MatchResult::Fallback(v) if v.id == "v2"));
    }

    #[test]
    fn test_fallback_outside_floor_is_no_match() {
        let versions = vec![release("v1", &["1.21.4"], &["fabric"], 1)];

        let result = select(&versions, &target("1.21.9", "fabric", Some("1.21.6")));
        assert_eq!(result, MatchResult::NoMatch);
    }

    #[test]
    fn test_no_floor_means_no_fallback() {
        let versions = vec![release("v2", &["1.21.8"], &["fabric"], 2)];

        let result = select(&versions, &target("1.21.9", "fabric", None));
        assert_eq!(result, MatchResult::NoMatch);
    }

    #[test]
    fn test_loader_must_match() {
        let versions = vec![release("v2", &["1.21.8"], &["forge"], 2)];

        let result = select(&versions, &target("1.21.8", "fabric", None));
        assert_eq!(result, MatchResult::NoMatch);
    }

    #[test]
    fn test_universal_loader_tags_match_any_target() {
        let versions = vec![release("pack", &["1.21.8"], &["minecraft"], 2)];

        let result = select(&versions, &target("1.21.8", "fabric", None));
        assert!(matches!(result, MatchResult::Exact(v) if v.id == "pack"));
    }

    #[test]
    fn test_version_without_usable_file_is_skipped() {
        let mut broken = release("broken", &["1.21.8"], &["fabric"], 9);
        broken.files = vec![];
        let versions = vec![broken, release("ok", &["1.21.8"], &["fabric"], 1)];

        let result = select(&versions, &target("1.21.8", "fabric", None));
        assert!(matches!(result, MatchResult::Exact(v) if v.id == "ok"));
    }

    #[test]
    fn test_multi_file_no_primary_is_skipped() {
        let mut broken = release("broken", &["1.21.8"], &["fabric"], 9);
        broken.files = vec![
            VersionFile {
                url: "https://cdn.example/a.jar".to_string(),
                filename: "a.jar".to_string(),
                primary: false,
                size: 0,
                hashes: FileHashes::default(),
            },
            VersionFile {
                url: "https://cdn.example/b.jar".to_string(),
                filename: "b.jar".to_string(),
                primary: false,
                size: 0,
                hashes: FileHashes::default(),
            },
        ];

        let candidates = [broken];
        let result = select(&candidates, &target("1.21.8", "fabric", None));
        assert_eq!(result, MatchResult::NoMatch);
    }

    #[test]
    fn test_highest_supported() {
        let versions = vec![
            release("v1", &["1.20.1", "25w14a"], &["fabric"], 1),
            release("v2", &["1.21.4"], &["fabric"], 2),
        ];

        assert_eq!(
            highest_supported(&versions, &gv("1.21.8")),
            Some(gv("1.21.4"))
        );
        assert_eq!(highest_supported(&versions, &gv("1.19")), None);
    }
}
