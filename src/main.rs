use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use psem_tables::logging::{init_logger_with_level, log_warn};
use psem_tables::tables::{lookup, CATALOG};
use psem_tables::util::pretty_hex;
use psem_tables::{CaptureFile, TableKey};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "psem-tables")]
#[command(about = "Decode C12.19 tables captured from a meter")]
struct Cli {
    /// Log fetches, cache hits and skipped sections
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode captured tables
    Decode {
        capture: PathBuf,
        /// Only this table, e.g. ST23, MT70 or MT100@128
        #[arg(short, long)]
        table: Option<TableKey>,
        /// Print JSON instead of debug output
        #[arg(long)]
        json: bool,
    },
    /// List captured tables and their sizes
    Info {
        capture: PathBuf,
        /// Also dump each buffer in hex
        #[arg(long)]
        dump: bool,
    },
}

fn load(path: &Path) -> Result<CaptureFile> {
    CaptureFile::from_json_file(path).with_context(|| format!("loading capture {}", path.display()))
}

fn decode(path: &Path, only: Option<TableKey>, json: bool) -> Result<()> {
    let capture = load(path)?;
    let keys: Vec<TableKey> = match only {
        Some(key) => {
            if lookup(key).is_none() {
                bail!("no decoder for {key}");
            }
            if capture.get(key).is_none() {
                bail!("{key} is not in {}", path.display());
            }
            vec![key]
        }
        None => capture.tables.iter().map(|t| t.key()).collect(),
    };

    let session = capture.into_session();
    let mut decoded = serde_json::Map::new();
    for key in keys {
        let Some(entry) = lookup(key) else {
            log_warn(&format!("skipping {key}: no decoder"));
            continue;
        };
        let table = entry.decode(&session).with_context(|| format!("decoding {key}"))?;
        if json {
            decoded.insert(key.to_string(), table.json);
        } else {
            println!("{key} {}\n{}\n", table.name, table.debug);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
    }
    Ok(())
}

fn info(path: &Path, dump: bool) -> Result<()> {
    let capture = load(path)?;
    println!(
        "firmware {}  phases {}  dialect {:?}",
        capture.profile.firmware,
        capture.profile.phases.phase_count(),
        capture.profile.dialect
    );
    for table in &capture.tables {
        let key = table.key();
        let name = CATALOG.get(&key).map_or("(unknown)", |entry| entry.name);
        println!("{:<12} {:>5} bytes  {name}", key.to_string(), table.data.len());
        if dump {
            println!("{}\n", pretty_hex(&table.data, 16));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    init_logger_with_level(level);

    match cli.command {
        Commands::Decode {
            capture,
            table,
            json,
        } => decode(&capture, table, json),
        Commands::Info { capture, dump } => info(&capture, dump),
    }
}
