//! Launchpad CLI
//!
//! Entry point for the `launchpad` command-line tool. Every invocation runs
//! as an [`App`]: `before` loads the config store (skipped by `config path`),
//! `run` executes the subcommand, `after` reports completion.

use clap::{Parser, Subcommand};
use launchpad::{
    App, AppContext, ConfigLayout, ConfigSource, ConfigStore, Outcome, Phase, PhaseResult,
};
use serde_json::Value;
use std::path::PathBuf;
use std::process;
use std::sync::{Arc, Mutex};

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(about = "Inspect and edit JSON application config", version)]
struct Cli {
    /// Config file, or a directory ending in a separator (default: ./config.json)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Config store commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Print the merged config as JSON
    Show,

    /// Print one value by dotted key
    Get {
        /// Dotted key, e.g. `server.port`
        key: String,
    },

    /// Set one value by dotted key and write the file back
    Set {
        /// Dotted key, e.g. `server.port`
        key: String,

        /// JSON value; anything that does not parse is stored as a string
        value: String,
    },

    /// Print the resolved config file path
    Path,
}

impl Commands {
    /// Whether the command reads the config file
    fn needs_store(&self) -> bool {
        match self {
            Self::Config { action } => !matches!(action, ConfigCommands::Path),
        }
    }
}

type SharedStore = Arc<Mutex<Option<ConfigStore>>>;

fn main() {
    let cli = Cli::parse();
    let store: SharedStore = Arc::new(Mutex::new(None));

    let mut builder = App::builder().debugging(cli.debug);
    if cli.command.needs_store() {
        builder = builder.before(load_phase(cli.config.clone(), Arc::clone(&store)));
    }

    let started = builder
        .run(command_phase(cli.command, cli.config, Arc::clone(&store)))
        .after(Phase::plain(|ctx| {
            launchpad::debug!(ctx, "done");
            Ok(())
        }))
        .start();

    let handle = match started {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error starting application: {}", e);
            process::exit(1);
        }
    };

    if handle.join() != Outcome::Completed {
        process::exit(1);
    }
}

fn load_phase(config: Option<PathBuf>, store: SharedStore) -> Phase {
    Phase::plain(move |ctx| {
        let source = match config {
            Some(path) => ConfigSource::Path(path),
            None => ConfigSource::Default,
        };
        let loaded = ConfigLayout::default().load(source)?;
        launchpad::debug!(ctx, "loaded config from", loaded.origin().map(|p| p.display().to_string()));
        launchpad::debug!(ctx, loaded.as_map());
        put(&store, loaded);
        Ok(())
    })
}

fn command_phase(command: Commands, config: Option<PathBuf>, store: SharedStore) -> Phase {
    Phase::plain(move |ctx| {
        let Commands::Config { action } = command;
        match action {
            ConfigCommands::Show => with_store(&store, |s| {
                println!("{}", s.to_json()?);
                Ok(())
            }),
            ConfigCommands::Get { key } => with_store(&store, |s| match s.get(&key) {
                Some(Value::String(text)) => {
                    println!("{}", text);
                    Ok(())
                }
                Some(value) => {
                    println!("{}", serde_json::to_string_pretty(value)?);
                    Ok(())
                }
                None => Err(format!("no value at `{}`", key).into()),
            }),
            ConfigCommands::Set { key, value } => {
                let parsed = serde_json::from_str(&value).unwrap_or(Value::String(value));
                set_and_write(ctx, &store, config.as_deref(), &key, parsed)
            }
            ConfigCommands::Path => {
                let path = ConfigLayout::default().resolve_path(config.as_deref())?;
                println!("{}", path.display());
                Ok(())
            }
        }
    })
}

fn set_and_write(
    ctx: &AppContext,
    store: &SharedStore,
    config: Option<&std::path::Path>,
    key: &str,
    value: Value,
) -> PhaseResult {
    let target = ConfigLayout::default().resolve_path(config)?;
    with_store(store, |s| {
        s.set_path(key, value);
        let written = s.write(Some(s.origin().unwrap_or(target.as_path())))?;
        launchpad::log!(ctx, "wrote", written.display().to_string());
        Ok(())
    })
}

fn put(store: &SharedStore, loaded: ConfigStore) {
    if let Ok(mut slot) = store.lock() {
        *slot = Some(loaded);
    }
}

fn with_store<F>(store: &SharedStore, f: F) -> PhaseResult
where
    F: FnOnce(&mut ConfigStore) -> PhaseResult,
{
    let mut slot = store.lock().map_err(|_| "config store lock poisoned")?;
    match slot.as_mut() {
        Some(s) => f(s),
        None => Err("config store was not loaded".into()),
    }
}
