//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod info;
mod render;
mod replay;
mod validate;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, GridpaintConfig};
use crate::editor::EditorOptions;
use crate::map_file::{aux_path_for, load_map, LoadedMap, MapFileError};
use crate::registry::CellRegistry;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// gridpaint - Edit, check and render JSON tile maps
#[derive(Parser)]
#[command(name = "gridpaint")]
#[command(about = "gridpaint - Edit, check and render JSON tile maps")]
#[command(version)]
pub struct Cli {
    /// Path to gridpaint.toml (default: search upward from the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a map to PNG
    Render {
        /// Input map file (.json)
        input: PathBuf,

        /// Output file or directory (default: {input}.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Aux data file (default: {input}.aux.json if present)
        #[arg(long)]
        aux: Option<PathBuf>,

        /// Cell edge length in pixels (overrides config)
        #[arg(long)]
        cell_size: Option<u32>,
    },
    /// Check a map and report everything loading had to fix
    Validate {
        /// Input map file (.json)
        input: PathBuf,

        /// Aux data file (default: {input}.aux.json if present)
        #[arg(long)]
        aux: Option<PathBuf>,

        /// Strict mode: treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
    /// Rewrite a map in normalized form
    Normalize {
        /// Input map file (.json)
        input: PathBuf,

        /// Output file (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Aux data file (default: {input}.aux.json if present)
        #[arg(long)]
        aux: Option<PathBuf>,
    },
    /// Create an empty map
    New {
        /// Output map file (.json)
        output: PathBuf,

        /// Width in cells (default: from config)
        #[arg(long)]
        width: Option<usize>,

        /// Height in cells (default: from config)
        #[arg(long)]
        height: Option<usize>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Apply recorded input events (JSON lines) to a map
    Replay {
        /// Input map file (.json)
        input: PathBuf,

        /// Event file, one JSON event per line
        events: PathBuf,

        /// Where save events write the map (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Aux data file (default: {input}.aux.json if present)
        #[arg(long)]
        aux: Option<PathBuf>,

        /// Also write the final canvas to this PNG
        #[arg(long)]
        png: Option<PathBuf>,
    },
    /// List the cell types and key bindings in use
    Cells,
}

/// Config and registry shared by every command.
pub(crate) struct Session {
    pub config: GridpaintConfig,
    pub registry: CellRegistry,
}

impl Session {
    fn load(path: Option<&Path>, overrides: &CliOverrides) -> Result<Self, String> {
        let mut config = load_config(path).map_err(|e| e.to_string())?;
        merge_cli_overrides(&mut config, overrides).map_err(|e| e.to_string())?;
        let registry = CellRegistry::from_config(&config.cells).map_err(|e| e.to_string())?;
        Ok(Self { config, registry })
    }

    /// Load a map, with its aux companion if one was given or sits next to it.
    pub fn load_map(&self, input: &Path, aux: Option<&Path>) -> Result<LoadedMap, MapFileError> {
        let aux = aux.map(Path::to_path_buf).or_else(|| {
            let companion = aux_path_for(input);
            companion.exists().then_some(companion)
        });
        load_map(input, aux.as_deref(), &self.registry, self.config.editor.max_extent)
    }

    pub fn options(&self) -> EditorOptions {
        EditorOptions::from_config(&self.config, &self.registry)
    }
}

/// Install the stderr tracing subscriber.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let overrides = match &cli.command {
        Commands::Render { cell_size, .. } => {
            CliOverrides { cell_size: *cell_size, ..Default::default() }
        }
        _ => CliOverrides::default(),
    };
    let session = match Session::load(cli.config.as_deref(), &overrides) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match cli.command {
        Commands::Render { input, output, aux, .. } => {
            render::run_render(&session, &input, output.as_deref(), aux.as_deref())
        }
        Commands::Validate { input, aux, strict } => {
            validate::run_validate(&session, &input, aux.as_deref(), strict)
        }
        Commands::Normalize { input, output, aux } => {
            validate::run_normalize(&session, &input, output.as_deref(), aux.as_deref())
        }
        Commands::New { output, width, height, force } => {
            info::run_new(&session, &output, width, height, force)
        }
        Commands::Replay { input, events, output, aux, png } => replay::run_replay(
            &session,
            &input,
            &events,
            output.as_deref(),
            aux.as_deref(),
            png.as_deref(),
        ),
        Commands::Cells => info::run_cells(&session),
    }
}

/// Print load warnings the way every command reports them.
pub(crate) fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
}
