//! qrscan - Headless runner for the QR scanner control
//!
//! Replays the images in a directory as camera preview frames and scans them
//! until a QR code decodes. The decoded text is printed on stdout; logs go to
//! the rolling file in `--log-dir` and to stderr.
//!
//! # Usage
//!
//! ```text
//! qrscan [--config-dir DIR] [--log-dir DIR] [--debug] [--max-attempts N] FRAME_DIR
//! ```
//!
//! # Execution Flow
//!
//! 1. Initialize logging → <log-dir>/qrscan.<date>
//! 2. Load `qrscan.yaml` + `QRSCAN_*` overrides from the config directory
//! 3. Create a current-thread tokio runtime
//! 4. Attach a logging preview surface, which opens the still-image camera
//! 5. Run controller turns until `ScanComplete` or `Error`
//! 6. Log the scan metrics summary
//!
//! Exits non-zero on camera or decode faults, and when `--max-attempts` runs
//! out before a code is found.

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use qrscan::services::{RqrrDecoderFactory, StillImageCameraProvider, TracingSurface};
use qrscan::ui::scan_to_completion;
use qrscan::{APP_NAME, ConfigManager, ScanLoopController, VERSION};

const USAGE: &str = "\
Usage: qrscan [OPTIONS] FRAME_DIR

Scan the images in FRAME_DIR (png, jpg, bmp; in file name order, cycling)
until a QR code decodes, then print its text.

Options:
  --config-dir DIR    Directory holding qrscan.yaml [default: qrscan]
  --log-dir DIR       Directory for rolling log files [default: logs]
  --debug             Log at debug level
  --max-attempts N    Give up after N scan attempts
  -h, --help          Print this help
";

#[derive(Debug)]
struct Args {
    config_dir: Utf8PathBuf,
    log_dir: Utf8PathBuf,
    debug: bool,
    max_attempts: Option<u64>,
    frame_dir: Utf8PathBuf,
}

fn parse_args() -> Result<Option<Args>> {
    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let parsed = Args {
        config_dir: args
            .opt_value_from_str("--config-dir")?
            .unwrap_or_else(|| Utf8PathBuf::from("qrscan")),
        log_dir: args
            .opt_value_from_str("--log-dir")?
            .unwrap_or_else(|| Utf8PathBuf::from("logs")),
        debug: args.contains("--debug"),
        max_attempts: args.opt_value_from_str("--max-attempts")?,
        frame_dir: args
            .opt_free_from_str()?
            .context("Missing FRAME_DIR argument")?,
    };

    let remaining = args.finish();
    if !remaining.is_empty() {
        bail!("Unexpected arguments: {:?}", remaining);
    }

    Ok(Some(parsed))
}

fn main() -> Result<()> {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            print!("{}", USAGE);
            return Ok(());
        }
        Err(e) => {
            eprint!("{}", USAGE);
            return Err(e);
        }
    };

    let _guard = qrscan::logging::setup_logging_with_console(
        args.log_dir.as_str(),
        APP_NAME,
        args.debug,
        true,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::new(&args.config_dir)?;
    let config = config_manager.load()?;

    // The controller is single-threaded; one thread drives every turn
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let mut controller = ScanLoopController::new(
        config,
        StillImageCameraProvider::new(args.frame_dir.clone()),
        RqrrDecoderFactory,
    );
    let metrics = controller.metrics();

    let result = runtime.block_on(scan_to_completion(
        &mut controller,
        Box::new(TracingSurface::default()),
        args.max_attempts,
    ));

    metrics.log_summary();

    let text = result?;
    println!("{}", text);
    tracing::info!("Shutdown complete");
    Ok(())
}
