use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use place_pages::config::{ReportOptions, DEFAULT_CONFIG, DEFAULT_DB, DEFAULT_OUTPUT_DIR};
use place_pages::utils::osc8_file_link;
use place_pages::{build_index_list, import, pages, resolve_row_letter, store, Collation};

const SAMPLE_CONFIG: &str = "\
; Report options for place-pages
title = Places
locale = en
coordinates = false
place_map_pages = false
include_media = true
media_dir = .
";

#[derive(Parser)]
#[command(name = "place-pages")]
#[command(about = "Static HTML pages for genealogy places, indexed by letter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the place store and a sample report.conl
    Init {
        /// SQLite place store
        #[arg(long, default_value = DEFAULT_DB)]
        db: PathBuf,
    },
    /// Import places from a CSV file into the store
    Import {
        /// CSV file with Place, Name/Title, Type, ... columns
        csv: PathBuf,
        #[arg(long, default_value = DEFAULT_DB)]
        db: PathBuf,
    },
    /// Generate the place index and place pages
    Generate {
        #[arg(long, default_value = DEFAULT_DB)]
        db: PathBuf,
        /// Report options (CONL)
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
        /// Output directory, overrides output_dir from the config
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the index letters for some names under a locale
    Letters {
        /// Locale tag, e.g. "sv" or "cs_CZ"
        locale: String,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Remove the generated site
    Clean {
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,
    },
}

fn run_init(db: &Path) -> Result<()> {
    store::open(db)?;
    println!("Created place store {}", db.display());

    let config = Path::new(DEFAULT_CONFIG);
    if !config.exists() {
        fs::write(config, SAMPLE_CONFIG)?;
        println!("Wrote sample {}", DEFAULT_CONFIG);
    }
    Ok(())
}

fn run_letters(locale: &str, names: &[String]) -> Result<()> {
    let collation = Collation::for_locale(locale)?;
    let index_list = build_index_list(names, &collation);

    let letters: Vec<&str> = index_list.letters().collect();
    println!("{} ({}): {}", locale, collation.tag(), letters.join(" "));

    let mut rows: Vec<&String> = names.iter().collect();
    rows.sort_by(|a, b| collation.compare(a.trim(), b.trim()));
    for name in rows {
        let letter = resolve_row_letter(name, &index_list, &collation)?;
        println!("  {:>4}  {}", letter.as_str().unwrap_or("-"), name);
    }
    Ok(())
}

fn run_clean(output: &Path) -> Result<()> {
    println!("Cleaning generated files...");

    if output.exists() {
        fs::remove_dir_all(output)?;
        println!("  Removed {}/", output.display());
    }

    println!("Clean complete!");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("place_pages=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db } => run_init(&db),
        Commands::Import { csv, db } => {
            let conn = store::open(&db)?;
            let count = import::run_import(&csv, &conn)?;
            println!("Imported {} places into {}", count, db.display());
            Ok(())
        }
        Commands::Generate { db, config, output } => {
            let mut options = ReportOptions::load_or_default(&config)?;
            if let Some(output) = output {
                options.output_dir = output;
            }
            pages::run_generate(&db, &options)?;
            let index = options.output_dir.join("places").join("index.html");
            println!("Open {}", osc8_file_link(&index, &index.display().to_string()));
            Ok(())
        }
        Commands::Letters { locale, names } => run_letters(&locale, &names),
        Commands::Clean { output } => run_clean(&output),
    }
}
