use clap::{Parser, Subcommand};
use dnafile::archive::Dna;
use dnafile::config::{Config, DEFAULT_ERROR_LOG};
use dnafile::errlog::ErrorLog;
use dnafile::geometry::Geometry;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "dna", about = "The DNA fixed-width unit container CLI")]
struct Cli {
    /// JSON config file (default: ./config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a file into a .dna container
    Pack {
        input: PathBuf,
        #[arg(default_value = "output.dna")]
        output: PathBuf,
    },
    /// Restore the original file; into OUTPUT if it is a directory, as OUTPUT otherwise
    Unpack {
        input: PathBuf,
        #[arg(default_value = ".")]
        output: PathBuf,
    },
    /// Jump to one unit and print it as a geometry record
    Read {
        input: PathBuf,
        index: u64,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show container header and layout
    Info {
        input: PathBuf,
    },
}

#[derive(Serialize)]
struct UnitJson {
    index:    u64,
    bytes:    String,
    #[serde(flatten)]
    geometry: Geometry,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match Config::resolve(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            ErrorLog::new(DEFAULT_ERROR_LOG).record(&format!("Config Error: {e}"));
            return ExitCode::FAILURE;
        }
    };
    let errors = ErrorLog::new(&config.error_log);
    let dna = match Dna::new(config) {
        Ok(d) => d,
        Err(e) => {
            errors.record(&format!("Config Error: {e}"));
            return ExitCode::FAILURE;
        }
    };

    let (context, result) = match cli.command {

        // ── Pack ─────────────────────────────────────────────────────────────
        Commands::Pack { input, output } => ("Pack Error", dna.pack(&input, &output).map(|r| {
            if !r.space_ok {
                eprintln!("Warning: Disk space might be low.");
            }
            println!(
                "Packed {} -> {} ({} bytes, {} units of {}, {} padding)",
                input.display(), r.output.display(), r.summary.original_size,
                r.summary.unit_count, dna.config().unit_size, r.summary.padding,
            );
        })),

        // ── Unpack ───────────────────────────────────────────────────────────
        Commands::Unpack { input, output } => ("Unpack Error", dna.unpack(&input, &output).map(|r| {
            println!("Unpacked {} -> {} ({} bytes)", input.display(), r.output.display(), r.original_size);
        })),

        // ── Read ─────────────────────────────────────────────────────────────
        Commands::Read { input, index, json } => ("Read Error", dna.read_raw_unit(&input, index)
            .and_then(|raw| Ok((Geometry::decode(&raw)?, raw)))
            .and_then(|(geometry, raw)| {
                if json {
                    let out = UnitJson { index, bytes: hex::encode(&raw), geometry };
                    let text = serde_json::to_string(&out)
                        .map_err(|e| dnafile::DnaError::Value(e.to_string()))?;
                    println!("{text}");
                } else {
                    println!("Unit {index}: {geometry}");
                    println!("  bytes  {}", hex::encode(&raw));
                }
                Ok(())
            })),

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input } => ("Info Error", dna.inspect(&input).map(|info| {
            println!("── DNA container ─────────────────────────────────────────");
            println!("  Path           {}", input.display());
            println!("  Name           {}", info.header.name());
            println!("  Original size  {} B", info.header.original_size());
            println!("  Header size    {} B", info.header.size());
            println!("  Unit size      {} B", info.unit_size);
            println!("  Units          {}", info.unit_count);
            println!("  Padding        {} B", info.padding);
            println!("  Body size      {} B (expected {} B)", info.body_size, info.expected_body_size());
        })),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            errors.record(&format!("{context}: {e}"));
            ExitCode::FAILURE
        }
    }
}
