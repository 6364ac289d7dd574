//! Local artifact index
//!
//! Tracks which project artifacts are already present under the sync root.
//! Each content category keeps a JSON index file (filename -> project id)
//! under the state directory; files on disk that the index does not know are
//! picked up with a best-effort identifier inferred from the filename, or as
//! manual entries that only count for presence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;

use crate::catalog::types::ProjectType;
use crate::core::RinthResult;

/// Directory holding index files and run logs, relative to the sync root
pub const STATE_DIR: &str = ".rinth";

/// Artifact extensions considered during a scan
const ARTIFACT_EXTENSIONS: &[&str] = &["jar", "zip"];

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\-+.]").unwrap());

/// Content categories, each mapping to one destination directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Mod,
    Datapack,
    Resourcepack,
    Shaderpack,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Mod,
        ContentKind::Datapack,
        ContentKind::Resourcepack,
        ContentKind::Shaderpack,
    ];

    /// Destination directory name under the sync root
    pub fn dir_name(self) -> &'static str {
        match self {
            ContentKind::Mod => "mods",
            ContentKind::Datapack => "datapacks",
            ContentKind::Resourcepack => "resourcepacks",
            ContentKind::Shaderpack => "shaderpacks",
        }
    }

    /// Index file name under the state directory
    pub fn index_file(self) -> &'static str {
        match self {
            ContentKind::Mod => "mods_index.json",
            ContentKind::Datapack => "datapacks_index.json",
            ContentKind::Resourcepack => "resourcepacks_index.json",
            ContentKind::Shaderpack => "shaderpacks_index.json",
        }
    }

    /// Category for a project's declared type. `is_datapack` overrides the
    /// declared type when the matched release publishes under a datapack
    /// loader.
    pub fn classify(project_type: ProjectType, is_datapack: bool) -> Option<ContentKind> {
        if is_datapack {
            return Some(ContentKind::Datapack);
        }
        match project_type {
            ProjectType::Mod => Some(ContentKind::Mod),
            ProjectType::Datapack => Some(ContentKind::Datapack),
            ProjectType::Resourcepack => Some(ContentKind::Resourcepack),
            ProjectType::Shader => Some(ContentKind::Shaderpack),
            ProjectType::Other => None,
        }
    }
}

/// A filesystem-discovered artifact
#[derive(Debug, Clone)]
pub struct LocalEntry {
    /// Filename within its category directory
    pub filename: String,

    /// Project identifier, if known or inferred
    pub project_id: Option<String>,

    /// Category the file lives in
    pub kind: ContentKind,
}

#[derive(Default)]
struct Inner {
    /// Identifier-addressable entries (indexed or inferred)
    by_id: HashMap<String, LocalEntry>,

    /// Presence-only entries per (kind, filename); includes every entry in
    /// `by_id` plus files whose identifier could not be determined
    files: HashMap<(ContentKind, String), LocalEntry>,
}

/// Index of artifacts already present under the sync root
pub struct LocalIndex {
    root: PathBuf,
    state_dir: PathBuf,
    inner: Mutex<Inner>,
}

impl LocalIndex {
    /// Scan the destination directories under `root`, creating them as
    /// needed, and build the presence index. Index rows whose file no
    /// longer exists are dropped and the cleaned index persisted.
    pub fn scan(root: &Path) -> RinthResult<Self> {
        let state_dir = root.join(STATE_DIR);
        std::fs::create_dir_all(&state_dir)?;

        let mut inner = Inner::default();

        for kind in ContentKind::ALL {
            let dir = root.join(kind.dir_name());
            std::fs::create_dir_all(&dir)?;

            let mut persisted = load_index_file(&state_dir.join(kind.index_file()))?;
            let listed = list_artifacts(&dir)?;

            let stale: Vec<String> = persisted
                .keys()
                .filter(|name| !listed.contains(*name))
                .cloned()
                .collect();
            for name in &stale {
                tracing::debug!(file = %name, "dropping stale index row");
                persisted.remove(name);
            }

            for filename in &listed {
                let project_id = persisted
                    .get(filename)
                    .cloned()
                    .or_else(|| infer_project_id(filename));
                let entry = LocalEntry {
                    filename: filename.clone(),
                    project_id: project_id.clone(),
                    kind,
                };
                if let Some(id) = project_id {
                    inner.by_id.insert(id, entry.clone());
                }
                inner.files.insert((kind, filename.clone()), entry);
            }

            if !stale.is_empty() {
                save_index_file(&state_dir.join(kind.index_file()), &persisted)?;
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            state_dir,
            inner: Mutex::new(inner),
        })
    }

    /// Directory a category's artifacts live in
    pub fn dir_of(&self, kind: ContentKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Full path of an artifact within its category
    pub fn artifact_path(&self, kind: ContentKind, filename: &str) -> PathBuf {
        self.dir_of(kind).join(filename)
    }

    /// Directory holding index files and run logs
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Entry for the first of the given identifiers that is present
    pub fn find(&self, ids: &[&str]) -> Option<LocalEntry> {
        let inner = self.inner.lock();
        ids.iter().find_map(|id| inner.by_id.get(*id).cloned())
    }

    /// Whether any entry, identified or manual, occupies this filename
    pub fn has_file(&self, kind: ContentKind, filename: &str) -> bool {
        self.inner
            .lock()
            .files
            .contains_key(&(kind, filename.to_string()))
    }

    /// Record a freshly downloaded artifact and persist the category index.
    /// Called after every successful download so later already-exists checks
    /// within the same run observe it.
    pub fn record(&self, project_id: &str, kind: ContentKind, filename: &str) -> RinthResult<()> {
        let mut inner = self.inner.lock();
        let entry = LocalEntry {
            filename: filename.to_string(),
            project_id: Some(project_id.to_string()),
            kind,
        };
        inner.by_id.insert(project_id.to_string(), entry.clone());
        inner.files.insert((kind, filename.to_string()), entry);
        self.persist_kind(&inner, kind)
    }

    /// Drop a superseded artifact's index row and persist. The in-memory
    /// identifier entry is left pointing at its replacement (recorded by the
    /// caller), never removed.
    pub fn remove_file(&self, kind: ContentKind, filename: &str) -> RinthResult<()> {
        let mut inner = self.inner.lock();
        inner.files.remove(&(kind, filename.to_string()));
        self.persist_kind(&inner, kind)
    }

    /// Files on disk with no identifier mapping, for interactive indexing
    pub fn unidentified(&self) -> Vec<LocalEntry> {
        let inner = self.inner.lock();
        let mut entries: Vec<LocalEntry> = inner
            .files
            .values()
            .filter(|e| e.project_id.is_none())
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        entries
    }

    /// Attach a project identifier to a previously unidentified file
    pub fn assign(&self, kind: ContentKind, filename: &str, project_id: &str) -> RinthResult<()> {
        self.record(project_id, kind, filename)
    }

    fn persist_kind(&self, inner: &Inner, kind: ContentKind) -> RinthResult<()> {
        let map: HashMap<String, String> = inner
            .files
            .values()
            .filter(|e| e.kind == kind)
            .filter_map(|e| e.project_id.clone().map(|id| (e.filename.clone(), id)))
            .collect();
        save_index_file(&self.state_dir.join(kind.index_file()), &map)
    }
}

fn load_index_file(path: &Path) -> RinthResult<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_index_file(path: &Path, map: &HashMap<String, String>) -> RinthResult<()> {
    let content = serde_json::to_string_pretty(map)?;
    std::fs::write(path, content)?;
    Ok(())
}

fn list_artifacts(dir: &Path) -> RinthResult<Vec<String>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let ext = name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
        if ARTIFACT_EXTENSIONS.contains(&ext.as_str()) {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}

/// Replace characters unsafe for local filenames, keeping word characters,
/// dots, dashes and pluses
pub fn normalize_filename(name: &str) -> String {
    UNSAFE_CHARS.replace_all(name, "_").into_owned()
}

/// Best-effort project identifier from a filename: the leading dash- or
/// underscore-separated segments before the version-bearing part, lowercased.
/// "Sodium-Fabric-0.6.0+mc1.21.4.jar" infers "sodium-fabric".
fn infer_project_id(filename: &str) -> Option<String> {
    let stem = filename.rsplit_once('.').map(|(s, _)| s).unwrap_or(filename);
    let segments: Vec<&str> = stem
        .split(['-', '_', '+', ' '])
        .take_while(|seg| {
            seg.chars()
                .next()
                .map_or(false, |c| !c.is_ascii_digit())
        })
        .collect();

    if segments.is_empty() {
        return None;
    }
    Some(segments.join("-").to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_creates_layout() {
        let tmp = TempDir::new().unwrap();
        let index = LocalIndex::scan(tmp.path()).unwrap();

        for kind in ContentKind::ALL {
            assert!(index.dir_of(kind).is_dir());
        }
        assert!(index.state_dir().is_dir());
    }

    #[test]
    fn test_record_survives_rescan() {
        let tmp = TempDir::new().unwrap();
        let index = LocalIndex::scan(tmp.path()).unwrap();

        let path = index.artifact_path(ContentKind::Mod, "sodium-v2.jar");
        std::fs::write(&path, b"jar").unwrap();
        index.record("sodium", ContentKind::Mod, "sodium-v2.jar").unwrap();

        let reloaded = LocalIndex::scan(tmp.path()).unwrap();
        let entry = reloaded.find(&["sodium"]).unwrap();
        assert_eq!(entry.filename, "sodium-v2.jar");
        assert!(reloaded.has_file(ContentKind::Mod, "sodium-v2.jar"));
    }

    #[test]
    fn test_stale_rows_dropped_on_scan() {
        let tmp = TempDir::new().unwrap();
        {
            let index = LocalIndex::scan(tmp.path()).unwrap();
            index.record("gone", ContentKind::Mod, "gone-1.0.jar").unwrap();
            // File never written to disk
        }

        let reloaded = LocalIndex::scan(tmp.path()).unwrap();
        assert!(reloaded.find(&["gone"]).is_none());
    }

    #[test]
    fn test_inference_for_unindexed_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("mods")).unwrap();
        std::fs::write(
            tmp.path().join("mods").join("Sodium-Fabric-0.6.0+mc1.21.4.jar"),
            b"jar",
        )
        .unwrap();

        let index = LocalIndex::scan(tmp.path()).unwrap();
        let entry = index.find(&["sodium-fabric"]).unwrap();
        assert_eq!(entry.filename, "Sodium-Fabric-0.6.0+mc1.21.4.jar");
    }

    #[test]
    fn test_uninferable_files_count_for_presence_only() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("resourcepacks")).unwrap();
        std::fs::write(tmp.path().join("resourcepacks").join("1.21-pack.zip"), b"zip").unwrap();

        let index = LocalIndex::scan(tmp.path()).unwrap();
        assert!(index.has_file(ContentKind::Resourcepack, "1.21-pack.zip"));
        assert_eq!(index.unidentified().len(), 1);
    }

    #[test]
    fn test_non_artifacts_ignored() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("mods")).unwrap();
        std::fs::write(tmp.path().join("mods").join("notes.txt"), b"x").unwrap();

        let index = LocalIndex::scan(tmp.path()).unwrap();
        assert!(!index.has_file(ContentKind::Mod, "notes.txt"));
    }

    #[test]
    fn test_normalize_filename() {
        assert_eq!(normalize_filename("a b?.jar"), "a_b_.jar");
        assert_eq!(
            normalize_filename("sodium-fabric-0.6.0+mc1.21.4.jar"),
            "sodium-fabric-0.6.0+mc1.21.4.jar"
        );
    }

    #[test]
    fn test_remove_file_clears_presence() {
        let tmp = TempDir::new().unwrap();
        let index = LocalIndex::scan(tmp.path()).unwrap();
        index.record("sodium", ContentKind::Mod, "sodium-v1.jar").unwrap();

        index.remove_file(ContentKind::Mod, "sodium-v1.jar").unwrap();
        assert!(!index.has_file(ContentKind::Mod, "sodium-v1.jar"));
    }
}
