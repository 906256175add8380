//! Extracted game text
//!
//! The asset-bundle tool dumps every text MonoBehaviour of a bundle as
//! JSON. This module reads such dumps, writes resolved translations back
//! into them, and flattens them into the tab-separated text table the
//! exported-dialect ingestor reads.
//!
//! Fields this crate does not use are carried through untouched so a
//! patched dump can be handed back to the bundle tool as is.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::ingest::EXPORTED_HEADER;
use crate::model::TranslationMap;
use crate::resolve::resolve;
use crate::store::recreate_dir;

/// File name of the flattened table inside its output directory
pub const TEXT_TABLE_FILE: &str = "text_table.csv";

/// Asset name suffixes rewritten on repack; not every `_Text` has an `_en` twin
const PATCH_SUFFIXES: [&str; 2] = ["_Text", "_Text_en"];

/// Asset name suffixes collected into the text table
const TABLE_SUFFIXES: [&str; 4] = ["_Text", "_Text_uk", "_Text_en", "_Text_ru"];

const PATCH_LANGUAGE: &str = "en";

/// Dump of one asset bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedBundle {
    /// Bundle file stem, e.g. `loc_packages_assets_`
    pub bundle: String,
    pub assets: Vec<TextAsset>,
}

/// One text MonoBehaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAsset {
    #[serde(rename = "m_Name")]
    pub name: String,
    #[serde(rename = "_ietfTag")]
    pub language: String,
    /// Scene id the asset's entries belong to
    #[serde(rename = "_code")]
    pub code: String,
    #[serde(rename = "_database")]
    pub database: TextDatabase,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDatabase {
    #[serde(rename = "_entries")]
    pub entries: Vec<TextEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntry {
    #[serde(rename = "_entryName")]
    pub entry_name: String,
    #[serde(rename = "_localization")]
    pub localization: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextAsset {
    fn name_ends_with_any(&self, suffixes: &[&str]) -> bool {
        suffixes.iter().any(|s| self.name.ends_with(s))
    }
}

/// Read a bundle dump
pub fn load_bundle(path: &Path) -> Result<ExtractedBundle> {
    info!(file = %path.display(), "loading extracted bundle");
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| Error::format(path.display().to_string(), e.to_string()))
}

/// Write a bundle dump, creating parent directories as needed
pub fn save_bundle(bundle: &ExtractedBundle, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(bundle)?;
    fs::write(path, json).map_err(|e| Error::io(path, e))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub assets_patched: usize,
    pub entries_patched: usize,
    /// Assets whose scene has no translation file
    pub scenes_missing: usize,
}

/// Replace the English text of every eligible asset with its resolved translation
///
/// # Errors
/// `Error::MissingData` when an asset's scene exists in `map` but lacks one
/// of the asset's tags. The bundle may be partially patched at that point
/// and should be discarded.
pub fn patch_bundle(bundle: &mut ExtractedBundle, map: &TranslationMap) -> Result<PatchReport> {
    info!(bundle = %bundle.bundle, assets = bundle.assets.len(), "patching bundle");
    let mut report = PatchReport::default();

    for asset in bundle.assets.iter_mut() {
        if !asset.name_ends_with_any(&PATCH_SUFFIXES) || asset.language != PATCH_LANGUAGE {
            continue;
        }
        debug!(asset = %asset.name, "rewrite text");

        let Some(scene) = map.get(&asset.code) else {
            if !asset.database.entries.is_empty() {
                error!(scene = %asset.code, asset = %asset.name, "no translation file for scene");
            }
            report.scenes_missing += 1;
            continue;
        };

        for entry in asset.database.entries.iter_mut() {
            entry.localization = resolve(&entry.entry_name, scene)?;
            report.entries_patched += 1;
        }
        report.assets_patched += 1;
    }

    info!(
        assets = report.assets_patched,
        entries = report.entries_patched,
        "patching done"
    );
    Ok(report)
}

/// One tag's text in every tracked language
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRow {
    pub bundle: String,
    pub en: Option<String>,
    pub ru: Option<String>,
    pub uk: Option<String>,
}

impl TextRow {
    fn slot_mut(&mut self, language: &str) -> Option<&mut Option<String>> {
        match language {
            "en" => Some(&mut self.en),
            "ru" => Some(&mut self.ru),
            "uk" => Some(&mut self.uk),
            _ => None,
        }
    }
}

/// Tag-ordered table of game text across languages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextTable {
    rows: BTreeMap<String, TextRow>,
}

impl TextTable {
    pub fn get(&self, tag: &str) -> Option<&TextRow> {
        self.rows.get(tag)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in tag order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TextRow)> {
        self.rows.iter()
    }

    fn add_asset(&mut self, bundle: &str, asset: &TextAsset) {
        debug!(asset = %asset.name, "fill");
        if !tracked_language(&asset.language) {
            return;
        }
        for entry in &asset.database.entries {
            let row = self.rows.entry(entry.entry_name.clone()).or_default();
            let Some(slot) = row.slot_mut(&asset.language) else {
                continue;
            };
            if slot.as_deref().is_some_and(|text| !text.is_empty()) {
                warn!(tag = %entry.entry_name, language = %asset.language, "text already exists; replaced");
            }
            *slot = Some(entry.localization.clone());
            row.bundle = bundle.to_string();
        }
    }
}

fn tracked_language(language: &str) -> bool {
    matches!(language, "en" | "ru" | "uk")
}

/// Flatten bundle dumps into one row per tag
///
/// Later bundles win when the same tag and language appear twice.
pub fn build_text_table(bundles: &[ExtractedBundle]) -> TextTable {
    let mut table = TextTable::default();
    for bundle in bundles {
        info!(bundle = %bundle.bundle, "collecting text");
        for asset in &bundle.assets {
            if !asset.name_ends_with_any(&TABLE_SUFFIXES) {
                continue;
            }
            if !tracked_language(&asset.language) {
                debug!(asset = %asset.name, language = %asset.language, "useless language; skipped");
                continue;
            }
            table.add_asset(&bundle.bundle, asset);
        }
    }
    info!(tags = table.len(), "text table built");
    table
}

/// Write `text_table.csv` into a freshly recreated `dir`
///
/// The file uses the exported dialect; languages missing for a tag are
/// empty cells.
pub fn write_text_table(table: &TextTable, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(TEXT_TABLE_FILE);
    info!(file = %path.display(), "writing text table");
    recreate_dir(dir)?;

    let mut writer = WriterBuilder::new().delimiter(b'\t').from_path(&path)?;
    writer.write_record(EXPORTED_HEADER)?;
    for (tag, row) in table.iter() {
        writer.write_record([
            tag.as_str(),
            row.bundle.as_str(),
            row.en.as_deref().unwrap_or_default(),
            row.ru.as_deref().unwrap_or_default(),
            row.uk.as_deref().unwrap_or_default(),
        ])?;
    }
    writer.flush().map_err(|e| Error::io(&path, e))?;

    info!("writing done");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{CsvDialect, read_file};
    use crate::model::{TranslationEntry, TranslationScene};
    use serde_json::json;
    use tempfile::TempDir;

    fn asset(name: &str, language: &str, code: &str, entries: &[(&str, &str)]) -> TextAsset {
        TextAsset {
            name: name.to_string(),
            language: language.to_string(),
            code: code.to_string(),
            database: TextDatabase {
                entries: entries
                    .iter()
                    .map(|(tag, text)| TextEntry {
                        entry_name: tag.to_string(),
                        localization: text.to_string(),
                        extra: Map::new(),
                    })
                    .collect(),
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    fn scene_map() -> TranslationMap {
        let mut scene = TranslationScene::new("loc_packages_assets_", "A1S1.ENTLIG");
        let mut fin = TranslationEntry::new("A1S1.ENTLIG_RILEY_0000", "Hi");
        fin.ru_final = "Привет".to_string();
        let mut machine = TranslationEntry::new("A1S1.ENTLIG_RILEY_0001", "Bye");
        machine.ru_machine = "{D} Пока".to_string();
        scene.entries = vec![fin, machine];

        let mut map = TranslationMap::new();
        map.insert(scene.scene.clone(), scene);
        map
    }

    // ========== Serde Tests ==========

    #[test]
    fn test_parse_dump_keeps_unknown_fields() {
        let raw = json!({
            "bundle": "loc_packages_assets_",
            "assets": [{
                "m_Name": "A1S1.ENTLIG_Text_en",
                "_ietfTag": "en",
                "_code": "A1S1.ENTLIG",
                "m_Enabled": 1,
                "_database": {
                    "_entries": [{"_entryName": "A1S1.ENTLIG_RILEY_0000", "_localization": "Hi", "_id": 7}]
                }
            }]
        });
        let bundle: ExtractedBundle = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(bundle.assets[0].name, "A1S1.ENTLIG_Text_en");
        assert_eq!(bundle.assets[0].database.entries[0].entry_name, "A1S1.ENTLIG_RILEY_0000");

        let back = serde_json::to_value(&bundle).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_load_bundle_rejects_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"bundle": "x", "assets": [{"m_Name": "a_Text"}]}"#).unwrap();
        assert!(matches!(load_bundle(&path), Err(Error::Format { .. })));
    }

    #[test]
    fn test_save_and_load_bundle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("loc.json");
        let bundle = ExtractedBundle {
            bundle: "loc_packages_assets_".to_string(),
            assets: vec![asset("S_Text", "en", "S", &[("S_1", "Ёлка")])],
        };
        save_bundle(&bundle, &path).unwrap();
        assert_eq!(load_bundle(&path).unwrap(), bundle);
    }

    // ========== Patch Tests ==========

    #[test]
    fn test_patch_uses_resolution_order() {
        let mut bundle = ExtractedBundle {
            bundle: "loc_packages_assets_".to_string(),
            assets: vec![asset(
                "A1S1.ENTLIG_Text",
                "en",
                "A1S1.ENTLIG",
                &[("A1S1.ENTLIG_RILEY_0000", "Hi"), ("A1S1.ENTLIG_RILEY_0001", "Bye")],
            )],
        };
        let report = patch_bundle(&mut bundle, &scene_map()).unwrap();

        let entries = &bundle.assets[0].database.entries;
        assert_eq!(entries[0].localization, "Привет");
        assert_eq!(entries[1].localization, "{D} Пока");
        assert_eq!(report.assets_patched, 1);
        assert_eq!(report.entries_patched, 2);
    }

    #[test]
    fn test_patch_skips_other_languages_and_names() {
        let mut bundle = ExtractedBundle {
            bundle: "loc_packages_assets_".to_string(),
            assets: vec![
                asset("A1S1.ENTLIG_Text_ru", "ru", "A1S1.ENTLIG", &[("A1S1.ENTLIG_RILEY_0000", "Здравствуй")]),
                asset("A1S1.ENTLIG_Text", "de", "A1S1.ENTLIG", &[("A1S1.ENTLIG_RILEY_0000", "Hallo")]),
                asset("A1S1.ENTLIG_Names", "en", "A1S1.ENTLIG", &[("A1S1.ENTLIG_RILEY_0000", "Riley")]),
            ],
        };
        let before = bundle.clone();
        let report = patch_bundle(&mut bundle, &scene_map()).unwrap();
        assert_eq!(bundle, before);
        assert_eq!(report.assets_patched, 0);
    }

    #[test]
    fn test_patch_missing_scene_is_skipped() {
        let mut bundle = ExtractedBundle {
            bundle: "loc_packages_assets_".to_string(),
            assets: vec![asset("A9S9.NOWHERE_Text", "en", "A9S9.NOWHERE", &[("A9S9.NOWHERE_X_0", "Hey")])],
        };
        let report = patch_bundle(&mut bundle, &scene_map()).unwrap();
        assert_eq!(bundle.assets[0].database.entries[0].localization, "Hey");
        assert_eq!(report.scenes_missing, 1);
    }

    #[test]
    fn test_patch_missing_tag_is_fatal() {
        let mut bundle = ExtractedBundle {
            bundle: "loc_packages_assets_".to_string(),
            assets: vec![asset("A1S1.ENTLIG_Text_en", "en", "A1S1.ENTLIG", &[("A1S1.ENTLIG_ALEX_0042", "Huh")])],
        };
        match patch_bundle(&mut bundle, &scene_map()) {
            Err(Error::MissingData { tag, scene }) => {
                assert_eq!(tag, "A1S1.ENTLIG_ALEX_0042");
                assert_eq!(scene, "A1S1.ENTLIG");
            }
            other => panic!("Expected MissingData, got {:?}", other),
        }
    }

    // ========== Text Table Tests ==========

    #[test]
    fn test_build_text_table_joins_languages() {
        let bundles = vec![ExtractedBundle {
            bundle: "loc_packages_assets_".to_string(),
            assets: vec![
                asset("S_Text", "en", "S", &[("S_1", "Hi")]),
                asset("S_Text_ru", "ru", "S", &[("S_1", "Привет")]),
                asset("S_Text_uk", "uk", "S", &[("S_1", "Привіт")]),
                asset("S_Text_de", "de", "S", &[("S_1", "Hallo")]),
                asset("S_Text", "fr", "S", &[("S_1", "Salut")]),
            ],
        }];
        let table = build_text_table(&bundles);
        assert_eq!(table.len(), 1);
        let row = table.get("S_1").unwrap();
        assert_eq!(row.bundle, "loc_packages_assets_");
        assert_eq!(row.en.as_deref(), Some("Hi"));
        assert_eq!(row.ru.as_deref(), Some("Привет"));
        assert_eq!(row.uk.as_deref(), Some("Привіт"));
    }

    #[test]
    fn test_build_text_table_later_bundle_wins() {
        let bundles = vec![
            ExtractedBundle {
                bundle: "loc_packages_assets_".to_string(),
                assets: vec![asset("S_Text", "en", "S", &[("S_1", "old")])],
            },
            ExtractedBundle {
                bundle: "dialogue_packages_assets_all".to_string(),
                assets: vec![asset("S_Text", "en", "S", &[("S_1", "new")])],
            },
        ];
        let row = build_text_table(&bundles).get("S_1").cloned().unwrap();
        assert_eq!(row.en.as_deref(), Some("new"));
        assert_eq!(row.bundle, "dialogue_packages_assets_all");
    }

    #[test]
    fn test_text_table_reads_back_as_exported_csv() {
        let bundles = vec![ExtractedBundle {
            bundle: "loc_packages_assets_".to_string(),
            assets: vec![
                asset("B_Text", "en", "B", &[("B_2", "Second"), ("B_1", "First")]),
                asset("B_Text_ru", "ru", "B", &[("B_1", "Первый")]),
            ],
        }];
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("table");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("stale.txt"), "old").unwrap();

        let path = write_text_table(&build_text_table(&bundles), &out).unwrap();
        assert!(!out.join("stale.txt").exists());

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "tag\tbundle\ten\tru\tuk");
        assert!(lines[1].starts_with("B_1\t"));
        assert!(lines[2].starts_with("B_2\t"));

        let set = read_file(&path, CsvDialect::Exported).unwrap();
        assert_eq!(set.len(), 2);
        let first = set.get("B_1").unwrap();
        assert_eq!(first.bundle, "loc_packages_assets_");
        assert_eq!(first.entry.ru_native, "Первый");
        assert_eq!(set.get("B_2").unwrap().entry.ru_native, "");
    }
}
