//! Command-line interface for tdl
//!
//! This module defines the CLI structure using clap derive macros. Task
//! commands live in `task`, the interactive viewer in `crate::ui`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::{default_config_path, Config};
use crate::error::Result;
use crate::session::Session;
use crate::storage::TaskStorage;
use crate::store::FileStore;
use crate::task::Filter;

mod task;

/// tdl - a persistent to-do list
///
/// Add, complete, edit, filter, and delete short tasks from the command line
/// or the interactive viewer (`tdl ui`).
#[derive(Parser, Debug)]
#[command(name = "tdl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the task data
    #[arg(long, global = true, env = "TDL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to tdl.toml (defaults to the platform config directory)
    #[arg(long, global = true, env = "TDL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a task (newest first)
    Add {
        /// Task title; multiple words are joined with spaces
        #[arg(required = true)]
        title: Vec<String>,
    },

    /// List tasks
    #[command(visible_alias = "ls")]
    List {
        /// Which tasks to show (defaults to ui.default_filter)
        #[arg(short, long, value_enum)]
        filter: Option<Filter>,
    },

    /// Flip a task between active and completed
    #[command(visible_alias = "done")]
    Toggle {
        /// Task id or unique id prefix
        id: String,
    },

    /// Rename a task; an empty title deletes it
    Edit {
        /// Task id or unique id prefix
        id: String,

        /// New title; multiple words are joined with spaces
        title: Vec<String>,
    },

    /// Delete a task
    Rm {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete every completed task
    ClearCompleted,

    /// Show active/completed/total counts
    Stats,

    /// Open the interactive task viewer
    Ui {
        /// Filter selected on start (defaults to ui.default_filter)
        #[arg(short, long, value_enum)]
        filter: Option<Filter>,
    },
}

/// Everything a command needs: configuration and an opened session.
pub(crate) struct Context {
    pub config: Config,
    pub session: Session<FileStore>,
}

impl Context {
    pub(crate) fn load(data_dir: Option<&Path>, config_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .or_else(default_config_path);
        let config = Config::load_or_default(config_path.as_deref())?;
        let dir = config.resolve_data_dir(data_dir);
        tracing::debug!(data_dir = %dir.display(), key = %config.storage.key, "opening task store");

        let storage = TaskStorage::with_key(FileStore::new(dir), config.storage.key.clone());
        let session = Session::open(storage).with_filter(config.ui.default_filter);
        Ok(Self { config, session })
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let options = crate::output::OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let ctx = Context::load(self.data_dir.as_deref(), self.config.as_deref())?;

        match self.command {
            Commands::Add { title } => task::run_add(ctx, options, &title.join(" ")),
            Commands::List { filter } => task::run_list(ctx, options, filter),
            Commands::Toggle { id } => task::run_toggle(ctx, options, &id),
            Commands::Edit { id, title } => task::run_edit(ctx, options, &id, &title.join(" ")),
            Commands::Rm { id } => task::run_rm(ctx, options, &id),
            Commands::ClearCompleted => task::run_clear_completed(ctx, options),
            Commands::Stats => task::run_stats(ctx, options),
            Commands::Ui { filter } => {
                let filter = filter.unwrap_or(ctx.config.ui.default_filter);
                let session = ctx.session.with_filter(filter);
                crate::ui::run(session, ctx.config.ui)
            }
        }
    }
}
