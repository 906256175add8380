//! Scene file persistence
//!
//! One JSON file per scene, named `<scene>.json`. Entries are written
//! sorted by tag with four-space indentation and non-ASCII text kept
//! literal, so the files diff cleanly under version control.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::model::{TranslationEntry, TranslationMap, TranslationScene};

const SCENE_EXTENSION: &str = "json";

/// Borrowed view of a scene in persisted order
#[derive(Serialize)]
struct SortedScene<'a> {
    bundle: &'a str,
    scene: &'a str,
    entries: Vec<&'a TranslationEntry>,
}

/// Parse a single scene file
///
/// # Errors
/// - `Error::Io` if the file cannot be read
/// - `Error::Format` if a required field is absent or has the wrong type
pub fn load(path: &Path) -> Result<TranslationScene> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| Error::format(path.display().to_string(), e.to_string()))
}

/// Render a scene the way it is stored on disk
pub fn to_json(scene: &TranslationScene) -> Result<String> {
    let sorted = SortedScene {
        bundle: &scene.bundle,
        scene: &scene.scene,
        entries: scene.sorted_entries(),
    };

    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    sorted.serialize(&mut serializer)?;

    String::from_utf8(buf).map_err(|e| Error::format(&scene.scene, e.to_string()))
}

/// Write `scene` into `dir` as `<scene>.json`, returning the file path
pub fn save(scene: &TranslationScene, dir: &Path) -> Result<PathBuf> {
    debug!(scene = %scene.scene, "scene dump");
    let path = dir.join(format!("{}.{}", scene.scene, SCENE_EXTENSION));
    let json = to_json(scene)?;
    fs::write(&path, json).map_err(|e| Error::io(&path, e))?;
    Ok(path)
}

/// Load every `*.json` file in `dir`, keyed by file stem
///
/// Other files and subdirectories are skipped silently.
pub fn load_map(dir: &Path) -> Result<TranslationMap> {
    info!(dir = %dir.display(), "loading translation scenes");
    if !dir.is_dir() {
        return Err(Error::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let mut map = TranslationMap::new();
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();

        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(SCENE_EXTENSION) {
            continue;
        }
        let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };

        let scene = load(&path)?;
        map.insert(key.to_string(), scene);
    }

    if map.is_empty() {
        warn!(dir = %dir.display(), "no scene files found");
    }
    info!(scenes = map.len(), "loading scenes done");
    Ok(map)
}

/// Like [`load_map`], but a directory without scene files is an error
///
/// Used before writing translations back into game text, where an empty
/// dataset would silently leave every asset in English.
pub fn load_required_map(dir: &Path) -> Result<TranslationMap> {
    let map = load_map(dir)?;
    if map.is_empty() {
        error!(dir = %dir.display(), "no scene files; nothing to resolve against");
        return Err(Error::EmptyDataset {
            path: dir.to_path_buf(),
        });
    }
    Ok(map)
}

/// Remove `dir` if it exists and create it empty
pub fn recreate_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        info!(dir = %dir.display(), "directory exists; cleanup");
        fs::remove_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
}

/// Write the whole map into a freshly recreated `dir`
///
/// Any previous contents of `dir` are deleted first.
pub fn save_map(map: &TranslationMap, dir: &Path) -> Result<()> {
    info!(dir = %dir.display(), scenes = map.len(), "saving translation map");
    recreate_dir(dir)?;
    for scene in map.values() {
        save(scene, dir)?;
    }
    info!("saving done");
    Ok(())
}
