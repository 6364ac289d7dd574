//! Modrinth API response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A curated collection: an ordered list of project identifiers
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Collection {
    /// Collection identifier
    pub id: String,

    /// Collection display name
    #[serde(default)]
    pub name: String,

    /// Ordered project identifiers
    #[serde(default)]
    pub projects: Vec<String>,
}

/// Project metadata
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Project {
    /// Project identifier
    pub id: String,

    /// URL slug
    #[serde(default)]
    pub slug: String,

    /// Display title
    #[serde(default)]
    pub title: String,

    /// Kind of content this project distributes
    #[serde(default)]
    pub project_type: ProjectType,
}

impl Project {
    /// Display title, falling back to the identifier
    pub fn display_name(&self) -> &str {
        if self.title.is_empty() {
            &self.id
        } else {
            &self.title
        }
    }
}

/// Kind of content a project distributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    #[default]
    Mod,
    Datapack,
    Resourcepack,
    Shader,
    #[serde(other)]
    Other,
}

/// One published release of a project
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProjectVersion {
    /// Version identifier
    pub id: String,

    /// Owning project identifier
    pub project_id: String,

    /// Human-readable version label
    #[serde(default)]
    pub name: String,

    /// Version number string
    #[serde(default)]
    pub version_number: String,

    /// Compatible game-version tags, as published
    #[serde(default)]
    pub game_versions: Vec<String>,

    /// Compatible loader tags
    #[serde(default)]
    pub loaders: Vec<String>,

    /// Publication timestamp, used for recency ordering
    pub date_published: DateTime<Utc>,

    /// Downloadable file entries
    #[serde(default)]
    pub files: Vec<VersionFile>,

    /// Declared dependencies on other projects
    #[serde(default)]
    pub dependencies: Vec<VersionDependency>,
}

impl ProjectVersion {
    /// The single usable file of this version: the only file when exactly
    /// one exists, otherwise the one marked primary. A multi-file version
    /// with no primary flag has no usable file and is never selectable.
    pub fn primary_file(&self) -> Option<&VersionFile> {
        match self.files.as_slice() {
            [only] => Some(only),
            files => files.iter().find(|f| f.primary),
        }
    }

    /// Project identifiers of required dependencies
    pub fn required_dependencies(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .filter(|d| d.dependency_type == DependencyKind::Required)
            .filter_map(|d| d.project_id.as_deref())
    }

    /// Whether this release publishes under a datapack loader
    pub fn is_datapack(&self) -> bool {
        self.loaders.iter().any(|l| l == "datapack")
    }
}

/// One downloadable file of a version
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VersionFile {
    /// Download URL
    pub url: String,

    /// Published filename
    pub filename: String,

    /// Whether this is the version's primary file
    #[serde(default)]
    pub primary: bool,

    /// File size in bytes
    #[serde(default)]
    pub size: u64,

    /// Published content hashes
    #[serde(default)]
    pub hashes: FileHashes,
}

/// Content hashes published alongside a file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileHashes {
    #[serde(default)]
    pub sha1: Option<String>,

    #[serde(default)]
    pub sha512: Option<String>,
}

/// A declared dependency edge of a version
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VersionDependency {
    /// Depended-on project, absent for file-only dependencies
    #[serde(default)]
    pub project_id: Option<String>,

    /// Specific depended-on version, if pinned
    #[serde(default)]
    pub version_id: Option<String>,

    /// How the dependency relates to this version
    pub dependency_type: DependencyKind,
}

/// Dependency relation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Required,
    Optional,
    Incompatible,
    Embedded,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(filename: &str, primary: bool) -> VersionFile {
        VersionFile {
            url: format!("https://cdn.example/{}", filename),
            filename: filename.to_string(),
            primary,
            size: 0,
            hashes: FileHashes::default(),
        }
    }

    fn version(files: Vec<VersionFile>) -> ProjectVersion {
        ProjectVersion {
            id: "v1".to_string(),
            project_id: "proj".to_string(),
            name: String::new(),
            version_number: String::new(),
            game_versions: vec![],
            loaders: vec![],
            date_published: Utc::now(),
            files,
            dependencies: vec![],
        }
    }

    #[test]
    fn test_single_file_is_primary() {
        let v = version(vec![file("a.jar", false)]);
        assert_eq!(v.primary_file().unwrap().filename, "a.jar");
    }

    #[test]
    fn test_primary_flag_wins_among_many() {
        let v = version(vec![file("a.jar", false), file("b.jar", true)]);
        assert_eq!(v.primary_file().unwrap().filename, "b.jar");
    }

    #[test]
    fn test_many_files_none_primary_is_unusable() {
        let v = version(vec![file("a.jar", false), file("b.jar", false)]);
        assert!(v.primary_file().is_none());

        let empty = version(vec![]);
        assert!(empty.primary_file().is_none());
    }

    #[test]
    fn test_required_dependencies_filter() {
        let mut v = version(vec![file("a.jar", true)]);
        v.dependencies = vec![
            VersionDependency {
                project_id: Some("lib-a".to_string()),
                version_id: None,
                dependency_type: DependencyKind::Required,
            },
            VersionDependency {
                project_id: Some("lib-b".to_string()),
                version_id: None,
                dependency_type: DependencyKind::Optional,
            },
            VersionDependency {
                project_id: None,
                version_id: Some("vx".to_string()),
                dependency_type: DependencyKind::Required,
            },
        ];

        let required: Vec<&str> = v.required_dependencies().collect();
        assert_eq!(required, vec!["lib-a"]);
    }

    #[test]
    fn test_deserialize_version() {
        let json = r#"{
            "id": "abcdef",
            "project_id": "AANobbMI",
            "name": "Sodium 0.6.0",
            "version_number": "0.6.0",
            "game_versions": ["1.21.4"],
            "loaders": ["fabric"],
            "date_published": "2025-01-10T12:00:00Z",
            "files": [{
                "url": "https://cdn.modrinth.com/data/AANobbMI/sodium.jar",
                "filename": "sodium-fabric-0.6.0+mc1.21.4.jar",
                "primary": true,
                "size": 1024,
                "hashes": {"sha512": "00ff"}
            }],
            "dependencies": [
                {"project_id": "P7dR8mSH", "dependency_type": "required"}
            ]
        }"#;

        let v: ProjectVersion = serde_json::from_str(json).unwrap();
        assert_eq!(v.game_versions, vec!["1.21.4"]);
        assert_eq!(v.primary_file().unwrap().hashes.sha512.as_deref(), Some("00ff"));
        assert_eq!(v.required_dependencies().collect::<Vec<_>>(), vec!["P7dR8mSH"]);
    }

    #[test]
    fn test_deserialize_project_type() {
        let p: Project =
            serde_json::from_str(r#"{"id": "x", "title": "X", "project_type": "shader"}"#).unwrap();
        assert_eq!(p.project_type, ProjectType::Shader);

        let p: Project =
            serde_json::from_str(r#"{"id": "x", "title": "X", "project_type": "modpack"}"#).unwrap();
        assert_eq!(p.project_type, ProjectType::Other);
    }
}
