//! reada CLI: scan header streams and compare read strategies.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reada_cli::compare::{self, open_reader, Mode};
use reada_cli::rpm::scan;
use reada_core::config::ReadaConfig;

#[derive(Parser)]
#[command(name = "reada")]
#[command(about = "Readahead with peek: header-stream scanner and read-strategy benchmark", long_about = None)]
struct Cli {
    /// JSON config file (overrides READA_* environment variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Buffer capacity in bytes (overrides config)
    #[arg(long, global = true)]
    capacity: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan files with one read strategy and report totals and timing
    Bench {
        /// Read strategy
        #[arg(short, long, value_enum, default_value = "reada")]
        mode: Mode,

        /// After every record, peek at the next header (reada mode only)
        #[arg(long)]
        peek: bool,

        /// Header-stream files; `-` reads the stdin descriptor unbuffered
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print offset, il and dl for every header in a file
    List {
        /// Header-stream file; `-` reads stdin
        file: PathBuf,
    },

    /// Print the effective configuration as JSON
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = match load_config(cli.config.as_ref(), cli.capacity) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Bench { mode, peek, files } => bench(&files, mode, &cfg, peek),
        Commands::List { file } => list(&file, &cfg),
        Commands::Config => cfg
            .to_json_pretty()
            .map(|json| println!("{json}"))
            .map_err(Into::into),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&PathBuf>,
    capacity: Option<usize>,
) -> Result<ReadaConfig, Box<dyn std::error::Error>> {
    let mut cfg = match path {
        Some(p) => ReadaConfig::from_json(&fs::read_to_string(p)?)?,
        None => ReadaConfig::from_env(),
    };
    if let Some(cap) = capacity {
        cfg.capacity = cap;
    }
    cfg.validate()?;
    tracing::debug!(capacity = cfg.capacity, page_size = cfg.page_size, "config loaded");
    Ok(cfg)
}

fn bench(
    files: &[PathBuf],
    mode: Mode,
    cfg: &ReadaConfig,
    peek: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if peek && mode != Mode::Reada {
        tracing::warn!(?mode, "--peek only applies to reada mode; ignoring");
    }
    let report = compare::run(files, mode, cfg, peek && mode == Mode::Reada)?;

    println!("Mode: {:?}", mode);
    println!("  Files:   {}", report.files);
    println!("  Headers: {}", report.headers);
    println!("  Bytes:   {}", report.bytes);
    println!("  Elapsed: {:.3}s", report.elapsed.as_secs_f64());
    if let Some(stats) = report.stats {
        println!(
            "  Syscalls: {} (read {}, readv {}, seek {}, interrupted {})",
            stats.syscalls(),
            stats.reads,
            stats.vectored_reads,
            stats.seeks,
            stats.interrupted
        );
    }
    Ok(())
}

fn list(file: &PathBuf, cfg: &ReadaConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = open_reader(file, Mode::Reada, cfg, false)?;
    println!("{:>12} {:>8} {:>8}", "offset", "il", "dl");
    let summary = scan(reader.as_mut(), |h| {
        println!("{:>12} {:>8} {:>8}", h.offset, h.il, h.dl);
    })?;
    println!("{} headers, {} bytes", summary.headers, summary.bytes);
    Ok(())
}
