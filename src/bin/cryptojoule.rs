#![forbid(unsafe_code)]
//! Command-line front end for CryptoJoule derivations

use clap::{Parser, Subcommand};
use colored::*;
use comfy_table::Table;
use cryptojoule::analysis::BlockAnalysis;
use cryptojoule::block::BlockData;
use cryptojoule::config::{load_config, load_config_from, Config};
use cryptojoule::crypto::encode_byte;
use cryptojoule::hash_chain::{chain_hex, HashChain};
use cryptojoule::modality::{ByteModalities, Modality, ModalityValue};
use cryptojoule::soul::SoulSignature;
use cryptojoule::tri_quanta::TriQuanta;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyzes a block from getblock JSON ("-" reads stdin)
    Analyze {
        input: PathBuf,
        /// Only show joules for this parcel
        #[arg(long)]
        parcel: Option<usize>,
    },
    /// Derives the block soul signature
    Soul {
        #[arg(long)]
        hash: String,
        #[arg(long)]
        merkle_root: String,
        #[arg(long)]
        time: u64,
    },
    /// Reduces a soul signature to its forces
    Forces { soul_signature: String },
    /// Shows the ten modalities of a merkle-root byte
    Modalities {
        #[arg(long)]
        hash: String,
        #[arg(long)]
        merkle_root: String,
        #[arg(long)]
        time: u64,
        #[arg(long)]
        index: usize,
        /// Start depth of the composed chain (0 = direct values)
        #[arg(long, default_value_t = 0)]
        depth: usize,
    },
    /// Applies the ten modalities to a byte pair
    Byte {
        #[arg(long)]
        index: usize,
        #[arg(long, value_parser = parse_hex_byte)]
        value: u8,
        #[arg(long, value_parser = parse_hex_byte)]
        soul_byte: u8,
    },
    /// Prints links of a hash chain
    Chain {
        #[arg(long)]
        seed: String,
        /// Chain one step from this link instead of listing from the seed
        #[arg(long)]
        previous: Option<String>,
        #[arg(long, default_value_t = 8)]
        count: usize,
    },
}

fn parse_hex_byte(s: &str) -> Result<u8, String> {
    let digits = s.trim_start_matches("0x");
    u8::from_str_radix(digits, 16).map_err(|e| format!("invalid hex byte {:?}: {}", s, e))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if !config.output.color {
        colored::control::set_override(false);
    }
    debug!("Using configuration {:?}", config);

    match &cli.command {
        Commands::Analyze { input, parcel } => analyze(&cli, &config, input, *parcel)?,
        Commands::Soul {
            hash,
            merkle_root,
            time,
        } => {
            let soul = SoulSignature::for_block(hash, merkle_root, *time)?;
            if cli.json {
                print_json(&config, &soul)?;
            } else {
                println!("{} {}", "Soul signature:".bright_cyan(), soul.to_string().bright_white());
            }
        }
        Commands::Forces { soul_signature } => {
            let tri_quanta = TriQuanta::from_soul_signature(&soul_signature.parse()?);
            if cli.json {
                print_json(&config, &tri_quanta)?;
            } else {
                print_tri_quanta(&tri_quanta);
            }
        }
        Commands::Modalities {
            hash,
            merkle_root,
            time,
            index,
            depth,
        } => {
            let modalities = ByteModalities::new(merkle_root, hash, *time)?;
            let values: Vec<ModalityValue> = Modality::ALL
                .into_iter()
                .map(|name| ModalityValue {
                    name,
                    value: modalities.modality(name, *index, *depth, config.analysis.modality_depth),
                })
                .collect();
            if cli.json {
                print_json(&config, &values)?;
            } else {
                println!(
                    "{} byte {} = {}, soul byte = {}",
                    "Merkle root".bright_cyan(),
                    index,
                    encode_byte(modalities.subject_byte(*index)).bright_white(),
                    encode_byte(modalities.soul_byte(*index)).bright_white()
                );
                print_modalities(&values);
            }
        }
        Commands::Byte {
            index,
            value,
            soul_byte,
        } => {
            let values = ByteModalities::modalities_for_byte(*index, *value, *soul_byte);
            if cli.json {
                print_json(&config, &values)?;
            } else {
                print_modalities(&values);
            }
        }
        Commands::Chain {
            seed,
            previous,
            count,
        } => {
            let links: Vec<String> = match previous {
                Some(previous) => vec![chain_hex(seed, Some(previous))?],
                None => {
                    let seed_bytes = cryptojoule::crypto::decode_hex("hash chain seed", seed)?;
                    HashChain::new(seed_bytes).take(*count).map(hex::encode).collect()
                }
            };
            if cli.json {
                print_json(&config, &links)?;
            } else {
                for (n, link) in links.iter().enumerate() {
                    println!("{:>4}  {}", n.to_string().bright_black(), link);
                }
            }
        }
    }

    Ok(())
}

fn analyze(
    cli: &Cli,
    config: &Config,
    input: &Path,
    parcel: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let block = if input.as_os_str() == "-" {
        BlockData::from_reader(io::stdin().lock())?
    } else {
        BlockData::from_reader(BufReader::new(File::open(input)?))?
    };
    let analysis = BlockAnalysis::analyze(&block, &config.analysis)?;

    if cli.json {
        let mut report = analysis.report();
        if let Some(parcel) = parcel {
            report.crypto_joules.retain(|j| j.parcel == parcel);
        }
        return print_json(config, &report);
    }

    println!("{}", "CryptoJoule Block Analysis".bright_cyan().bold());
    println!("{}", "--------------------------".bright_cyan());
    println!("Block hash:     {}", analysis.identity().block_hash.bright_white());
    println!("Merkle root:    {}", analysis.identity().merkle_root);
    println!("Block time:     {}", analysis.identity().block_time);
    println!("Soul signature: {}", analysis.soul_signature().to_string().bright_yellow());
    println!();
    print_tri_quanta(analysis.tri_quanta());
    println!();

    let joules = match parcel {
        Some(parcel) => analysis.joules_for_parcel(parcel),
        None => analysis.crypto_joules(),
    };
    println!(
        "{} {} across {} of {} transactions",
        "Crypto joules:".bright_green().underline(),
        joules.len(),
        analysis.located_parcels().len(),
        analysis.transaction_count()
    );

    let mut table = Table::new();
    table.set_header(vec!["Parcel", "Index", "Byte", "Quanta", "Dominant"]);
    for joule in joules {
        table.add_row(vec![
            joule.parcel.to_string(),
            joule.index.to_string(),
            encode_byte(joule.byte),
            joule.tri_quanta.quanta_hex(),
            format!(
                "{} ({})",
                joule.tri_quanta.dominant_force_hex(),
                joule.tri_quanta.dominant_force_name()
            ),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn print_tri_quanta(tri_quanta: &TriQuanta) {
    let forces = tri_quanta.forces();
    println!(
        "{} genesis {}  stasis {}  metamorphosis {}",
        "Forces:".bright_cyan(),
        encode_byte(forces.genesis).bright_white(),
        encode_byte(forces.stasis).bright_white(),
        encode_byte(forces.metamorphosis).bright_white()
    );

    let ranking = tri_quanta.ranking();
    let names = tri_quanta.ranked_names();
    let mut table = Table::new();
    table.set_header(vec!["Rank", "Value", "Force"]);
    for (rank, value, name) in [
        ("dominant", ranking.dominant, names.dominant),
        ("subdominant", ranking.subdominant, names.subdominant),
        ("tertiary", ranking.tertiary, names.tertiary),
    ] {
        table.add_row(vec![rank.to_string(), encode_byte(value), name.to_string()]);
    }
    println!("{table}");
}

fn print_modalities(values: &[ModalityValue]) {
    let mut table = Table::new();
    table.set_header(vec!["Modality", "Value", "Hex", "Formula"]);
    for value in values {
        table.add_row(vec![
            value.name.to_string(),
            value.value.to_string(),
            encode_byte(value.value),
            value.name.formula().to_string(),
        ]);
    }
    println!("{table}");
}

fn print_json<T: Serialize>(config: &Config, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let out = if config.output.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}
