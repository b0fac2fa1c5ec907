use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand};

use kira_abid::input::load_raw_table;
use kira_abid::logging::init_logging;
use kira_abid::model::{AnalysisMode, AnalysisSnapshot};
use kira_abid::panels::{CatalogConfig, load_catalog_config};
use kira_abid::pipeline::stage1_normalize::normalize;
use kira_abid::pipeline::stage4_select::SelectionOp;
use kira_abid::pipeline::stage5_report::write_snapshot_reports;
use kira_abid::store::{DirStore, SnapshotId, SnapshotStore};
use kira_abid::workflow::{Request, Stage, WorkflowState};

#[derive(Debug, Parser)]
#[command(name = "kira-abid", version)]
#[command(about = "Antigen exclusion and antibody identification from red-cell panels")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalize a panel, grade it and write reports
    Analyze {
        /// Panel table (CSV/TSV, optionally .gz)
        #[arg(long)]
        panel: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Antigen catalog (TOML); built-in catalog when omitted
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Skip the exclusion rules and keep every antigen open
        #[arg(long)]
        manual: bool,
        #[arg(long)]
        lot: Option<String>,
        /// Explicit user selection, comma separated
        #[arg(long, value_delimiter = ',')]
        select: Option<Vec<String>>,
        /// Snapshot directory; the analysis is saved when given
        #[arg(long)]
        store: Option<PathBuf>,
        /// RFC 3339 timestamp recorded in the snapshot
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Render reports of a stored snapshot as saved
    Show {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        id: SnapshotId,
        #[arg(long)]
        out: PathBuf,
    },
    /// Re-derive a stored snapshot from its panel and save the result
    Rerun {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        id: SnapshotId,
        #[arg(long)]
        catalog: Option<PathBuf>,
        #[arg(long)]
        manual: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List stored snapshots
    List {
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        subject: Option<String>,
    },
    /// Print the effective antigen catalog
    Catalog {
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(err) = run(cli.command) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Analyze {
            panel,
            out,
            catalog,
            manual,
            lot,
            select,
            store,
            timestamp,
        } => {
            let config = load_config(catalog.as_deref())?;
            let timestamp = parse_timestamp(timestamp.as_deref())?;
            let raw = load_raw_table(&panel).map_err(|e| e.to_string())?;
            let normalized = normalize(&raw, &config.aliases).map_err(|e| e.to_string())?;
            println!(
                "Imported {} rows, {} antigen columns (confidence {:.2})",
                normalized.table.len(),
                normalized.table.antigens.len(),
                normalized.report.import_confidence
            );

            let state = grade_panel(
                &config,
                normalized.table,
                lot,
                mode_for(manual, AnalysisMode::Automatic),
                select,
            )?;
            let snapshot = state.to_snapshot(timestamp).map_err(|e| e.to_string())?;
            if let Some(dir) = store {
                let id = save_snapshot(&dir, &snapshot)?;
                println!("Saved snapshot {id}");
            }
            write_snapshot_reports(&snapshot, &out).map_err(|e| e.to_string())?;
            println!("Reports written to {}", out.display());
            Ok(())
        }
        Command::Show { store, id, out } => {
            let store = DirStore::open(&store).map_err(|e| e.to_string())?;
            let snapshot = store.load(id).map_err(|e| e.to_string())?;
            write_snapshot_reports(&snapshot, &out).map_err(|e| e.to_string())?;
            println!("Reports for snapshot {id} written to {}", out.display());
            Ok(())
        }
        Command::Rerun {
            store,
            id,
            catalog,
            manual,
            out,
        } => {
            let config = load_config(catalog.as_deref())?;
            let mut store = DirStore::open(&store).map_err(|e| e.to_string())?;
            let previous = store.load(id).map_err(|e| e.to_string())?;
            let kept: Vec<String> = previous
                .user_selections
                .iter()
                .filter(|a| config.catalog.contains(a))
                .cloned()
                .collect();
            let state = grade_panel(
                &config,
                previous.panel_table(),
                previous.lot_number.clone(),
                mode_for(manual, previous.mode),
                Some(kept),
            )?;
            let snapshot = state.to_snapshot(Utc::now()).map_err(|e| e.to_string())?;
            let new_id = store.save(&snapshot).map_err(|e| e.to_string())?;
            println!("Snapshot {id} re-derived as {new_id}");
            if let Some(out) = out {
                write_snapshot_reports(&snapshot, &out).map_err(|e| e.to_string())?;
            }
            Ok(())
        }
        Command::List { store, subject } => {
            let store = DirStore::open(&store).map_err(|e| e.to_string())?;
            let entries = store.list(subject.as_deref()).map_err(|e| e.to_string())?;
            println!("id\tsubject\tlot\ttimestamp\trule_version");
            for e in entries {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    e.id,
                    e.subject_key,
                    e.lot_number.as_deref().unwrap_or("-"),
                    e.timestamp.to_rfc3339(),
                    e.rule_version.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        Command::Catalog { catalog } => {
            let config = load_config(catalog.as_deref())?;
            print!("{}", render_catalog(&config));
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<CatalogConfig, String> {
    match path {
        Some(p) => {
            let config = load_catalog_config(p).map_err(|e| e.to_string())?;
            kira_abid::info!("catalog loaded from {} ({} antigens)", p.display(), config.catalog.len());
            Ok(config)
        }
        None => Ok(CatalogConfig::default()),
    }
}

fn mode_for(manual: bool, fallback: AnalysisMode) -> AnalysisMode {
    if manual { AnalysisMode::Manual } else { fallback }
}

fn parse_timestamp(value: Option<&str>) -> Result<DateTime<Utc>, String> {
    match value {
        Some(v) => DateTime::parse_from_rfc3339(v)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| format!("invalid --timestamp '{v}': {e}")),
        None => Ok(Utc::now()),
    }
}

/// Drives a session from import through review and, when the selection
/// allows it, on to the report stage.
fn grade_panel(
    config: &CatalogConfig,
    panel: kira_abid::model::PanelTable,
    lot_number: Option<String>,
    mode: AnalysisMode,
    select: Option<Vec<String>>,
) -> Result<WorkflowState, String> {
    let catalog = &config.catalog;
    let mut requests = vec![
        Request::Start,
        Request::LoadPanel { panel, lot_number },
        Request::SetMode(mode),
        Request::Advance,
        Request::Grade,
        Request::Advance,
    ];
    if let Some(list) = select {
        requests.push(Request::Select(SelectionOp::SetExplicit(list)));
    }

    let mut state = WorkflowState::new();
    for request in requests {
        state = state.apply(catalog, request).map_err(|e| e.to_string())?;
    }
    while state.stage < Stage::Report {
        match state.apply(catalog, Request::Advance) {
            Ok(next) => state = next,
            Err(e) => {
                kira_abid::warn!("session stops at {}: {}", state.stage, e);
                break;
            }
        }
    }
    Ok(state)
}

fn save_snapshot(dir: &Path, snapshot: &AnalysisSnapshot) -> Result<SnapshotId, String> {
    let mut store = DirStore::open(dir).map_err(|e| e.to_string())?;
    store.save(snapshot).map_err(|e| e.to_string())
}

fn render_catalog(config: &CatalogConfig) -> String {
    let catalog = &config.catalog;
    let mut out = String::new();
    out.push_str(&format!("antigens: {}\n", catalog.antigens().join(" ")));
    let pairs: Vec<String> = catalog.pairs().iter().map(|p| p.to_string()).collect();
    out.push_str(&format!("pairs: {}\n", pairs.join(" ")));
    let allowed: Vec<&str> = catalog
        .allowed_heterozygous()
        .iter()
        .map(|s| s.as_str())
        .collect();
    out.push_str(&format!("allowed_heterozygous: {}\n", allowed.join(" ")));
    out.push_str(&format!("column_aliases: {}\n", config.aliases.len()));
    out
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
