use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::{Instrument, info, info_span};
use tracing_subscriber::EnvFilter;

use oxen_l10n::extracted::{build_text_table, load_bundle, patch_bundle, save_bundle, write_text_table};
use oxen_l10n::grouping::group_entries;
use oxen_l10n::ingest::{self, CsvDialect, SourceKind};
use oxen_l10n::merge::{self, MergeOptions, UnmatchedPolicy};
use oxen_l10n::mt::{
    DeeplProvider, FillerConfig, GoogleTranslateProvider, MachineTranslationFiller,
    MachineTranslator, MockMode, MockTranslator,
};
use oxen_l10n::stats::{DatasetStats, percent, untranslated_tags};
use oxen_l10n::{EntrySet, TranslationMap, store};

#[derive(Debug, Parser)]
#[command(
    name = "oxen-l10n",
    version,
    about = "Translation dataset tools for game dialogue and UI text"
)]
struct Cli {
    /// Print more logs
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Dialect {
    /// `tag bundle en ru uk` table written by `text-table`
    Exported,
    /// Translators' spreadsheet export with two statistics lines on top
    Spreadsheet,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Source {
    Loc,
    Dialogue,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Unmatched {
    Drop,
    Insert,
    Warn,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Provider {
    Deepl,
    Google,
    Mock,
}

#[derive(Debug, Args)]
struct CsvInput {
    /// CSV files to ingest; later files win on duplicate tags
    #[arg(long = "csv", required = true, num_args = 1..)]
    files: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = Dialect::Exported)]
    dialect: Dialect,

    /// Which asset bundle a spreadsheet belongs to
    #[arg(long, value_enum, required_if_eq("dialect", "spreadsheet"))]
    source: Option<Source>,
}

impl CsvInput {
    fn csv_dialect(&self) -> Result<CsvDialect> {
        match (self.dialect, self.source) {
            (Dialect::Exported, _) => Ok(CsvDialect::Exported),
            (Dialect::Spreadsheet, Some(Source::Loc)) => Ok(CsvDialect::Spreadsheet(SourceKind::Localization)),
            (Dialect::Spreadsheet, Some(Source::Dialogue)) => Ok(CsvDialect::Spreadsheet(SourceKind::Dialogue)),
            (Dialect::Spreadsheet, None) => bail!("--source is required for spreadsheet input"),
        }
    }

    fn read(&self) -> Result<EntrySet> {
        let dialect = self.csv_dialect()?;
        ingest::read_files(&self.files, dialect).context("failed to ingest csv input")
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build scene files from CSV input
    Prepare {
        #[command(flatten)]
        input: CsvInput,
        /// Directory to write scene files to; recreated on every run
        #[arg(long)]
        output_dir: PathBuf,
    },
    /// Fold updated translations from CSV into existing scene files
    Merge {
        /// Directory with the current scene files
        #[arg(long)]
        translations_dir: PathBuf,
        #[command(flatten)]
        input: CsvInput,
        /// Overwrite ru_final even when the new text is already known
        #[arg(long)]
        force: bool,
        /// What to do with CSV tags the scene files do not have
        #[arg(long, value_enum, default_value_t = Unmatched::Drop)]
        unmatched: Unmatched,
        #[arg(long)]
        output_dir: PathBuf,
    },
    /// Fill missing Russian text with machine translation
    Autotranslate {
        #[arg(long)]
        translations_dir: PathBuf,
        #[arg(long)]
        output_dir: PathBuf,
        #[arg(long, value_enum, default_value_t = Provider::Deepl)]
        provider: Provider,
        /// Leave scenes of this bundle untouched; repeatable
        #[arg(long = "skip-bundle")]
        skip_bundles: Vec<String>,
    },
    /// Gather stats on scene files
    Analyze {
        #[arg(long)]
        translations_dir: PathBuf,
        /// Print tags that have no final Russian text
        #[arg(long)]
        list_untranslated: bool,
        /// Print the numbers as JSON instead of the text report
        #[arg(long)]
        json: bool,
    },
    /// Flatten extracted bundle dumps into text_table.csv
    TextTable {
        #[arg(long, required = true, num_args = 1..)]
        extracted: Vec<PathBuf>,
        #[arg(long)]
        output_dir: PathBuf,
    },
    /// Write resolved translations into an extracted bundle dump
    Patch {
        #[arg(long)]
        extracted: PathBuf,
        #[arg(long)]
        translations_dir: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Prepare { .. } => "prepare",
            Command::Merge { .. } => "merge",
            Command::Autotranslate { .. } => "autotranslate",
            Command::Analyze { .. } => "analyze",
            Command::TextTable { .. } => "text-table",
            Command::Patch { .. } => "patch",
        }
    }
}

/// Install the fmt subscriber; `RUST_LOG` replaces the default directives
fn init_tracing(debug: bool) -> Result<()> {
    let level = if debug { "debug" } else { "info" };
    let directives = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => format!("{level},reqwest=info,hyper=info,hyper_util=info"),
    };
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid log filter {:?}", directives))?;

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn load_scenes(dir: &Path) -> Result<TranslationMap> {
    store::load_map(dir).with_context(|| format!("failed to load scenes from {}", dir.display()))
}

fn save_scenes(map: &TranslationMap, dir: &Path) -> Result<()> {
    store::save_map(map, dir).with_context(|| format!("failed to save scenes to {}", dir.display()))
}

fn make_translator(provider: Provider) -> Result<Box<dyn MachineTranslator>> {
    let translator: Box<dyn MachineTranslator> = match provider {
        Provider::Deepl => Box::new(DeeplProvider::from_env().context("DeepL provider unavailable")?),
        Provider::Google => Box::new(
            GoogleTranslateProvider::from_env().context("Google Translate provider unavailable")?,
        ),
        Provider::Mock => Box::new(MockTranslator::new(MockMode::Suffix)),
    };
    info!(provider = translator.provider_name(), "translator ready");
    Ok(translator)
}

fn print_stats(map: &TranslationMap, list_untranslated: bool, as_json: bool) {
    let s = DatasetStats::collect(map);
    let untranslated = s.untranslated();

    if as_json {
        let report = json!({
            "total": s.total,
            "untranslated": untranslated,
            "en": s.with_en,
            "uk": s.with_uk,
            "ru_native": s.with_ru_native,
            "ru_machine": s.with_ru_machine,
            "verified": s.verified,
            "untranslated_tags": if list_untranslated { json!(untranslated_tags(map)) } else { json!(null) },
        });
        println!("{}", report);
        return;
    }

    println!("Всего строк: {}", s.total);
    println!("Непереведённых строк: {}, {}%", untranslated, percent(untranslated, s.total));
    println!("Оригинальных англ. строк: {}, {}%", s.with_en, percent(s.with_en, s.total));
    println!("Оригинальных укр. строк: {}, {}%", s.with_uk, percent(s.with_uk, s.total));
    println!("Оригинальных рус. строк: {}, {}%", s.with_ru_native, percent(s.with_ru_native, s.total));
    println!("Машинных рус. строк: {}, {}%", s.with_ru_machine, s.machine_percent());
    println!("Подтверждённых рус. строк: {}, {}%", s.verified, percent(s.verified, s.total));

    if list_untranslated {
        for tag in untranslated_tags(map) {
            println!("{}", tag);
        }
    }
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Prepare { input, output_dir } => {
            let entries = input.read()?;
            let map = group_entries(entries).context("failed to group entries into scenes")?;
            save_scenes(&map, &output_dir)?;
        }
        Command::Merge {
            translations_dir,
            input,
            force,
            unmatched,
            output_dir,
        } => {
            let map = load_scenes(&translations_dir)?;
            let delta = input.read()?;
            let unmatched = match unmatched {
                Unmatched::Drop => UnmatchedPolicy::Drop,
                Unmatched::Insert => UnmatchedPolicy::Insert,
                Unmatched::Warn => UnmatchedPolicy::Warn,
            };
            let outcome = merge::merge(&map, &delta, MergeOptions { force, unmatched });
            info!(report = ?outcome.report, "merge finished");
            save_scenes(&outcome.map, &output_dir)?;
        }
        Command::Autotranslate {
            translations_dir,
            output_dir,
            provider,
            skip_bundles,
        } => {
            let map = load_scenes(&translations_dir)?;
            let translator = make_translator(provider)?;
            let config = FillerConfig {
                skip_bundles,
                ..Default::default()
            };
            let outcome = MachineTranslationFiller::new(translator.as_ref(), config)
                .fill(&map)
                .await
                .context("machine translation aborted")?;
            info!(report = ?outcome.report, "autotranslate finished");
            save_scenes(&outcome.map, &output_dir)?;
        }
        Command::Analyze {
            translations_dir,
            list_untranslated,
            json,
        } => {
            let map = load_scenes(&translations_dir)?;
            print_stats(&map, list_untranslated, json);
        }
        Command::TextTable { extracted, output_dir } => {
            let bundles = extracted
                .iter()
                .map(|path| load_bundle(path).with_context(|| format!("failed to read {}", path.display())))
                .collect::<Result<Vec<_>>>()?;
            let path = write_text_table(&build_text_table(&bundles), &output_dir)
                .context("failed to write text table")?;
            info!(file = %path.display(), "text table ready");
        }
        Command::Patch {
            extracted,
            translations_dir,
            output,
        } => {
            let mut bundle =
                load_bundle(&extracted).with_context(|| format!("failed to read {}", extracted.display()))?;
            let map = store::load_required_map(&translations_dir)
                .with_context(|| format!("failed to load scenes from {}", translations_dir.display()))?;
            let report = patch_bundle(&mut bundle, &map)
                .with_context(|| format!("failed to patch {}", extracted.display()))?;
            info!(report = ?report, "patching finished");
            save_bundle(&bundle, &output).with_context(|| format!("failed to write {}", output.display()))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    let span = info_span!("run", command = cli.command.name());
    run(cli.command).instrument(span).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_spreadsheet_requires_source() {
        let parsed = Cli::try_parse_from([
            "oxen-l10n",
            "prepare",
            "--csv",
            "a.csv",
            "--dialect",
            "spreadsheet",
            "--output-dir",
            "out",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_prepare_spreadsheet_dialect() {
        let cli = Cli::try_parse_from([
            "oxen-l10n",
            "prepare",
            "--csv",
            "a.csv",
            "b.csv",
            "--dialect",
            "spreadsheet",
            "--source",
            "dialogue",
            "--output-dir",
            "out",
        ])
        .unwrap();
        match cli.command {
            Command::Prepare { input, .. } => {
                assert_eq!(input.files.len(), 2);
                assert_eq!(
                    input.csv_dialect().unwrap(),
                    CsvDialect::Spreadsheet(SourceKind::Dialogue)
                );
            }
            other => panic!("Expected prepare, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_defaults() {
        let cli = Cli::try_parse_from([
            "oxen-l10n",
            "merge",
            "--translations-dir",
            "in",
            "--csv",
            "a.csv",
            "--output-dir",
            "out",
            "--debug",
        ])
        .unwrap();
        assert!(cli.debug);
        match cli.command {
            Command::Merge { force, unmatched, input, .. } => {
                assert!(!force);
                assert!(matches!(unmatched, Unmatched::Drop));
                assert_eq!(input.csv_dialect().unwrap(), CsvDialect::Exported);
            }
            other => panic!("Expected merge, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_patch_refuses_empty_translations_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let extracted = dir.path().join("loc.json");
        std::fs::write(
            &extracted,
            r#"{"bundle": "loc_packages_assets_", "assets": [{"m_Name": "S_Text", "_ietfTag": "en",
                "_code": "S", "_database": {"_entries": [{"_entryName": "S_1", "_localization": "Hi"}]}}]}"#,
        )
        .unwrap();
        let scenes = dir.path().join("translations");
        std::fs::create_dir(&scenes).unwrap();
        let output = dir.path().join("patched.json");

        let result = run(Command::Patch {
            extracted,
            translations_dir: scenes,
            output: output.clone(),
        })
        .await;

        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_autotranslate_skip_bundles() {
        let cli = Cli::try_parse_from([
            "oxen-l10n",
            "autotranslate",
            "--translations-dir",
            "in",
            "--output-dir",
            "out",
            "--provider",
            "mock",
            "--skip-bundle",
            "dialogue_packages_assets_all",
        ])
        .unwrap();
        assert_eq!(cli.command.name(), "autotranslate");
        match cli.command {
            Command::Autotranslate { provider, skip_bundles, .. } => {
                assert!(matches!(provider, Provider::Mock));
                assert_eq!(skip_bundles, vec!["dialogue_packages_assets_all"]);
            }
            other => panic!("Expected autotranslate, got {:?}", other),
        }
    }
}
