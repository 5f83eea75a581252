//! Application module
//!
//! Wires configuration, sources, the acquisition loop and the viewer
//! together for each command.
//!
//! When a viewer is shown, eframe has to own the main thread. Source and sink
//! are opened first on the main thread so a missing port or unwritable log
//! aborts before any window appears; the opened loop is then moved onto an
//! acquisition thread that talks to the window through a
//! [`ChannelRenderer`](crate::frontend::ChannelRenderer).

use crate::backend::{source_for_port, ReplaySource, SampleSource};
use crate::buffer::SlidingBuffer;
use crate::cli::{AcquireArgs, Cli, Command, ExploreArgs, InitArgs};
use crate::config::{Config, GuiConfig};
use crate::error::{AvesError, Result, ResultExt};
use crate::frontend::{run_viewer, Renderer, ViewerBridge};
use crate::session::{AcquisitionLoop, LogSink, RunSummary, StopReason};
use crate::template;
use crate::types::BatchSize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Folder the explorer file dialog starts in
pub const DATA_DIR: &str = "data";

/// Run the command selected on the command line
pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Acquire(args) => run_acquire(args).map(|_| ()),
        Command::Explore(args) => run_explore(args).map(|_| ()),
        Command::Init(args) => run_init(args).map(|_| ()),
    }
}

// ==================== Acquire ====================

/// Acquire until a stop condition holds
pub fn run_acquire(args: &AcquireArgs) -> Result<RunSummary> {
    let config = Config::load(&args.config)?;
    let source = source_for_port(&args.port, &config)?;
    let sink = match config.output_columns() {
        Some(columns) => LogSink::new(args.destination(), columns.to_vec()),
        None => LogSink::disabled(),
    };
    let gui = if args.headless { None } else { config.gui };
    let settings = args.settings(gui.as_ref().map(|g| g.x_column.clone()));

    let mut acquisition = AcquisitionLoop::new(source, sink, settings);
    acquisition
        .open()
        .with_context(|| format!("Opening {}", args.port))?;

    match gui {
        None => acquisition.run(),
        Some(gui) => run_with_viewer(acquisition, gui),
    }
}

fn run_with_viewer(acquisition: AcquisitionLoop, gui: GuiConfig) -> Result<RunSummary> {
    let (bridge, renderer) = ViewerBridge::new(gui.refresh_interval());
    let notifier = renderer.notifier();
    let mut acquisition = acquisition.with_renderer(Box::new(renderer));

    let handle = std::thread::Builder::new()
        .name("acquisition".into())
        .spawn(move || {
            let result = acquisition.run();
            match &result {
                Ok(summary) => notifier.finished(summary.reason, summary.samples),
                Err(e) => notifier.failed(e),
            }
            result
        })?;

    let viewer = run_viewer(gui, bridge);
    debug!("Viewer closed, waiting for acquisition thread");
    let result = handle
        .join()
        .map_err(|_| AvesError::Viewer("acquisition thread panicked".to_string()))?;
    let summary = result?;
    viewer?;
    Ok(summary)
}

// ==================== Explore ====================

/// Count and range of one buffered column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub range: Option<(f64, f64)>,
}

/// Per-column summary of a buffer
pub fn summarize(buffer: &SlidingBuffer) -> Vec<ColumnSummary> {
    buffer
        .field_names()
        .map(|name| ColumnSummary {
            name: name.to_string(),
            count: buffer.field(name).map_or(0, |series| series.len()),
            range: buffer.numeric_range(name),
        })
        .collect()
}

/// Load a whole log file and show it
pub fn run_explore(args: &ExploreArgs) -> Result<SlidingBuffer> {
    let config = Config::load(&args.config)?;
    let filename = match &args.filename {
        Some(path) => path.clone(),
        None => pick_log_file()?,
    };
    let buffer = load_log(&config, &filename)?;

    match config.gui {
        Some(gui) if !args.headless => show_buffer(&buffer, gui)?,
        _ => {
            for column in summarize(&buffer) {
                match column.range {
                    Some((min, max)) => info!(
                        "{}: {} values, min {}, max {}",
                        column.name, column.count, min, max
                    ),
                    None => info!("{}: {} values (not numeric)", column.name, column.count),
                }
            }
        }
    }
    Ok(buffer)
}

/// Read every sample of a log into a buffer sized to fit them all
pub fn load_log(config: &Config, filename: &std::path::Path) -> Result<SlidingBuffer> {
    let columns = config
        .output_columns()
        .ok_or_else(|| {
            AvesError::Config("exploring a log requires an 'output' section".to_string())
        })?
        .to_vec();

    let mut source = ReplaySource::from_path(filename, columns);
    source.open()?;
    let samples = source
        .read_samples(BatchSize::Unbounded)
        .with_context(|| format!("Reading {}", filename.display()))?;
    source.close()?;

    let mut buffer = SlidingBuffer::new(Some(samples.len()));
    buffer.extend(&samples);
    info!("Loaded {} samples from {}", samples.len(), filename.display());
    Ok(buffer)
}

fn show_buffer(buffer: &SlidingBuffer, gui: GuiConfig) -> Result<()> {
    let (bridge, mut renderer) = ViewerBridge::new(Duration::ZERO);
    if !buffer.is_empty() {
        renderer.set_data(buffer);
        renderer.set_xlim(buffer.numeric_range(&gui.x_column));
        renderer.refresh();
    }
    renderer
        .notifier()
        .finished(StopReason::SourceExhausted, buffer.len() as u64);
    run_viewer(gui, bridge)
}

fn pick_log_file() -> Result<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open acquisition log")
        .set_directory(DATA_DIR)
        .add_filter("Acquisition log", &["txt"])
        .pick_file()
        .ok_or_else(|| AvesError::Config("No filename selected".to_string()))
}

// ==================== Init ====================

/// Copy a template into a directory
pub fn run_init(args: &InitArgs) -> Result<Vec<PathBuf>> {
    let template = template::find(&args.template)?;
    let destdir = match &args.destdir {
        Some(dir) => dir.clone(),
        None => rfd::FileDialog::new()
            .set_title("Choose project folder")
            .set_directory(".")
            .pick_folder()
            .ok_or_else(|| AvesError::Template("No destination folder selected".to_string()))?,
    };
    let written = template.install(&destdir)?;
    info!("All files were copied");
    Ok(written)
}
