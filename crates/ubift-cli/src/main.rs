//! `ubift`: command-line dispatch over the `ubift` facade crate's query
//! surface. Each subcommand calls exactly one `UbiftImage` method and
//! renders the result as a table or, with `--json`, as JSON.

mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ubift::UbiftImage;

/// Parses a byte offset or size given as decimal or `0x`-prefixed hex.
fn parse_num(raw: &str) -> Result<usize, String> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).map_err(|e| e.to_string())
    } else {
        raw.parse::<usize>().map_err(|e| e.to_string())
    }
}

#[derive(Debug, Parser)]
#[command(name = "ubift", about = "Forensic analysis of UBI/UBIFS flash dumps")]
struct Cli {
    /// Raw flash image to analyze.
    image: PathBuf,

    /// Raise tracing verbosity (stacks: -v, -vv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit machine-readable JSON instead of a table.
    #[arg(long, global = true)]
    json: bool,

    /// Explicit PEB size, bypassing partition auto-detection.
    #[arg(long, global = true, value_parser = parse_num)]
    peb_size: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the partitions detected in the image.
    Mtdls,
    /// Dump one partition's raw bytes.
    Mtdcat { partition_index: usize },
    /// Dump one PEB's raw bytes.
    Pebcat { partition_index: usize, peb_index: usize },
    /// List the UBI volumes of the instance at `offset`.
    Ubils {
        #[arg(value_parser = parse_num)]
        offset: usize,
    },
    /// Dump a whole UBI volume's bytes.
    Ubicat {
        #[arg(value_parser = parse_num)]
        offset: usize,
        volume: String,
    },
    /// List the LEBs of a volume and their backing PEB.
    Lebls {
        #[arg(value_parser = parse_num)]
        offset: usize,
        volume: String,
    },
    /// Dump one LEB's bytes.
    Lebcat {
        #[arg(value_parser = parse_num)]
        offset: usize,
        volume: String,
        lnum: u32,
    },
    /// UBIFS superblock and master summary.
    Fsstat {
        #[arg(value_parser = parse_num)]
        offset: usize,
        volume: String,
    },
    /// List a directory's entries.
    Fls {
        #[arg(value_parser = parse_num)]
        offset: usize,
        volume: String,
        inode: Option<u64>,
        #[arg(long)]
        deleted: bool,
    },
    /// List every inode's metadata.
    Ils {
        #[arg(value_parser = parse_num)]
        offset: usize,
        volume: String,
        #[arg(long)]
        deleted: bool,
    },
    /// One inode's metadata.
    Istat {
        #[arg(value_parser = parse_num)]
        offset: usize,
        volume: String,
        inode: u64,
    },
    /// A file's contents.
    Icat {
        #[arg(value_parser = parse_num)]
        offset: usize,
        volume: String,
        inode: u64,
        #[arg(long)]
        deleted: bool,
    },
    /// Every dentry pointing at an inode.
    Ffind {
        #[arg(value_parser = parse_num)]
        offset: usize,
        volume: String,
        inode: u64,
    },
    /// Every journal (bud) node, in sequence order.
    Jls {
        #[arg(value_parser = parse_num)]
        offset: usize,
        volume: String,
    },
    /// Write the recoverable file tree(s) to an output directory.
    UbiftRecover {
        output: PathBuf,
        #[arg(long)]
        deleted: bool,
    },
    /// Aggregate recoverability statistics across the whole image.
    UbiftInfo,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let image = UbiftImage::open(&cli.image)
        .with_context(|| format!("failed to open image {}", cli.image.display()))?;

    match cli.command {
        Command::Mtdls => output::print_rows(&image.mtdls(), cli.json),
        Command::Mtdcat { partition_index } => {
            output::write_bytes(&image.mtdcat(partition_index)?)?
        }
        Command::Pebcat { partition_index, peb_index } => {
            output::write_bytes(&image.pebcat(partition_index, peb_index)?)?
        }
        Command::Ubils { offset } => {
            output::print_rows(&image.ubils(offset, cli.peb_size)?, cli.json)
        }
        Command::Ubicat { offset, volume } => {
            output::write_bytes(&image.ubicat(offset, cli.peb_size, &volume)?)?
        }
        Command::Lebls { offset, volume } => {
            output::print_rows(&image.lebls(offset, cli.peb_size, &volume)?, cli.json)
        }
        Command::Lebcat { offset, volume, lnum } => {
            output::write_bytes(&image.lebcat(offset, cli.peb_size, &volume, lnum)?)?
        }
        Command::Fsstat { offset, volume } => {
            output::print_row(&image.fsstat(offset, cli.peb_size, &volume)?, cli.json)
        }
        Command::Fls { offset, volume, inode, deleted } => output::print_rows(
            &image.fls(offset, cli.peb_size, &volume, inode, deleted)?,
            cli.json,
        ),
        Command::Ils { offset, volume, deleted } => {
            output::print_rows(&image.ils(offset, cli.peb_size, &volume, deleted)?, cli.json)
        }
        Command::Istat { offset, volume, inode } => {
            output::print_row(&image.istat(offset, cli.peb_size, &volume, inode)?, cli.json)
        }
        Command::Icat { offset, volume, inode, deleted } => {
            output::write_bytes(&image.icat(offset, cli.peb_size, &volume, inode, deleted)?)?
        }
        Command::Ffind { offset, volume, inode } => output::print_rows(
            &image.ffind(offset, cli.peb_size, &volume, inode)?,
            cli.json,
        ),
        Command::Jls { offset, volume } => {
            output::print_rows(&image.jls(offset, cli.peb_size, &volume)?, cli.json)
        }
        Command::UbiftRecover { output: output_dir, deleted } => {
            output::print_rows(&image.ubift_recover(output_dir, deleted)?, cli.json)
        }
        Command::UbiftInfo => output::print_rows(&image.ubift_info()?, cli.json),
    }
    Ok(())
}
