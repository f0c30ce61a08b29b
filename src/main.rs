//! hexpager - Entry Point

use clap::Parser;
use hexpager::config::CliOverrides;
use hexpager::model::ByteRange;
use hexpager::source::TargetInfo;
use hexpager::sparse::SparseIndex;
use hexpager::view::{ColorConfig, HexStyles, Session};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Terminal pager for binary files and raw block devices
#[derive(Parser, Debug)]
#[command(name = "hexpager")]
#[command(version)]
#[command(about = "Page through binary files and block devices in hex, binary, or text")]
pub struct Args {
    /// File or block device to view
    pub file: PathBuf,

    /// Starting offset in hex (an optional 0x prefix is accepted)
    #[arg(value_parser = parse_hex_offset)]
    pub offset: Option<u64>,

    /// Bytes to advance on page down (0 pages by screen)
    #[arg(long)]
    pub page_size: Option<u64>,

    /// Bytes per row (0 fits the screen)
    #[arg(long)]
    pub cols: Option<u64>,

    /// Show every row instead of collapsing repeats
    #[arg(long)]
    pub no_dedup: bool,

    /// Show the binary column
    #[arg(short = 'B', long)]
    pub binary: bool,

    /// Hide the hex column
    #[arg(long)]
    pub no_hex: bool,

    /// Hide the ASCII column
    #[arg(long)]
    pub no_ascii: bool,

    /// Allow the patch command to modify the target
    #[arg(short, long)]
    pub write: bool,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print what is known about the target and exit
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Flags that override configured values; unset flags leave them alone.
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            columns: self.cols,
            page_size: self.page_size,
            dedup: self.no_dedup.then_some(false),
            show_binary: self.binary.then_some(true),
            show_hex: self.no_hex.then_some(false),
            show_ascii: self.no_ascii.then_some(false),
            allow_write: self.write.then_some(true),
        }
    }
}

fn parse_hex_offset(text: &str) -> Result<u64, String> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid hex offset {text:?}: {e}"))
}

/// Target facts and the hole map, one line each.
fn debug_report(info: &TargetInfo, holes: &[ByteRange]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[d] size: {}", info.size);
    let _ = writeln!(out, "[d] isBlockDevice: {}", info.is_block_device);
    let _ = writeln!(out, "[d] align: {}", info.alignment);
    if !holes.is_empty() {
        out.push_str("[d] sparse map:\n");
        for (i, hole) in holes.iter().enumerate() {
            let _ = writeln!(out, "{i:2x}: {:12x} {:12x}", hole.start, hole.end);
        }
    }
    out
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration with full precedence chain:
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = hexpager::config::load_config_with_precedence(args.config.clone())?;
        let merged = hexpager::config::merge_config(config_file);
        let with_env = hexpager::config::apply_env_overrides(merged);
        hexpager::config::apply_cli_overrides(with_env, &args.overrides())
    };

    hexpager::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    let target = hexpager::source::open_target(&args.file)?;
    info!(target = ?target.info, "Target opened");

    let sparse = Arc::new(SparseIndex::new());
    let builder = match target.source.file().map(std::fs::File::try_clone) {
        Some(Ok(file)) => sparse.spawn_build(file, target.info.size),
        Some(Err(e)) => {
            warn!(error = %e, "Could not share descriptor with sparse index");
            None
        }
        None => None,
    };

    if args.debug {
        if let Some(handle) = builder {
            let _ = handle.join();
        }
        let holes = sparse.holes().unwrap_or_default();
        print!("{}", debug_report(&target.info, holes));
        return Ok(());
    }

    let session = Session {
        source: target.source,
        info: target.info,
        view: hexpager::state::ViewConfig::from_config(&config),
        start_offset: args.offset.unwrap_or(0),
        sparse,
        command_history: hexpager::history::command_history(&config.history_dir),
        search_history: hexpager::history::search_history(&config.history_dir),
        styles: HexStyles::with_color_config(ColorConfig::from_env_and_args(args.no_color)),
    };

    if let Some(error) = hexpager::view::run_session(session)? {
        eprintln!("{error}");
    }

    Ok(())
}
