use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tablet_snap::{
    capture::Orientation,
    insert::{Coordinator, Cursor, EditorTarget, NoteFileEditor},
    settings::{PluginSettings, SettingsStore},
    vault::{validate_destination, DestinationStatus, FsVault},
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "tablet-snap",
    about = "Captures drawings from a reMarkable-style tablet into a note vault",
    version,
    author
)]
struct Cli {
    /// Settings file location (default: ~/.tablet-snap/settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a drawing and insert its reference into a note
    Snap {
        /// Vault root directory
        #[arg(short, long, default_value = ".")]
        vault: PathBuf,

        /// Capture in landscape orientation
        #[arg(short, long)]
        landscape: bool,

        /// Note to insert the reference into (omitted: print to stdout)
        #[arg(short, long)]
        note: Option<PathBuf>,
    },

    /// Validate the configured destination folder
    Check {
        /// Vault root directory
        #[arg(short, long, default_value = ".")]
        vault: PathBuf,
    },

    /// Inspect or edit persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current settings
    Show,

    /// Set one settings field and persist immediately
    Set {
        /// One of: capturePath, credentialRef, deviceAddress, outputPath,
        /// postprocessor, invertImages
        key: String,
        value: String,

        /// Vault root, to validate outputPath edits right away
        #[arg(short, long)]
        vault: Option<PathBuf>,
    },

    /// Print the settings file path
    Path,
}

/// Editor target for shell pipelines: prints the reference, always has an
/// active cursor.
struct StdoutEditor;

impl EditorTarget for StdoutEditor {
    fn active_cursor(&self) -> Option<Cursor> {
        Some(Cursor { line: 0, column: 0 })
    }

    fn insert_at_cursor(&mut self, _cursor: Cursor, text: &str) -> std::io::Result<()> {
        println!("{text}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tablet_snap=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let store = match cli.settings {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::default_location(),
    };

    match cli.command {
        Commands::Snap {
            vault,
            landscape,
            note,
        } => {
            let settings = store.load().context("failed to load settings")?;
            let orientation = if landscape {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            };

            let vault = FsVault::new(vault);
            let coordinator = Coordinator::new(settings);

            let result = match note {
                Some(path) => {
                    let mut editor = NoteFileEditor::new(path);
                    coordinator.run(&vault, &mut editor, orientation).await
                }
                None => {
                    let mut editor = StdoutEditor;
                    coordinator.run(&vault, &mut editor, orientation).await
                }
            };

            match result {
                Ok(insertion) => {
                    info!("Drawing staged as {}", insertion.final_path.display());
                }
                Err(e) => {
                    // Full cause goes to the log; the user gets one
                    // actionable line.
                    error!(stage = %e.stage(), "Insert failed: {}", e);
                    eprintln!(
                        "Could not insert your drawing! Is your tablet connected \
                         and reachable at the configured address?"
                    );
                    std::process::exit(1);
                }
            }
        }

        Commands::Check { vault } => {
            let settings = store.load().context("failed to load settings")?;
            let vault = FsVault::new(vault);

            match validate_destination(&vault, &settings.output_path) {
                DestinationStatus::Valid(path) => {
                    println!("ok: {}", path.display());
                }
                DestinationStatus::Invalid(reason) => {
                    eprintln!("invalid: {reason}");
                    std::process::exit(1);
                }
                DestinationStatus::Pending => {
                    println!("checking output folder...");
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let settings = store.load().context("failed to load settings")?;
                println!("{}", serde_json::to_string_pretty(&settings)?);
            }

            ConfigAction::Set { key, value, vault } => {
                let mut settings = store.load().context("failed to load settings")?;
                apply_field(&mut settings, &key, &value)?;
                store.save(&settings).context("failed to save settings")?;
                info!("Saved {} to {}", key, store.path().display());

                // The settings form validates the destination on every edit;
                // do the same here when we know the vault root.
                if key == "outputPath" {
                    if let Some(root) = vault {
                        match validate_destination(&FsVault::new(root), &settings.output_path) {
                            DestinationStatus::Valid(path) => {
                                println!("ok: {}", path.display());
                            }
                            DestinationStatus::Invalid(reason) => {
                                eprintln!("warning: {reason}");
                            }
                            DestinationStatus::Pending => {}
                        }
                    }
                }
            }

            ConfigAction::Path => {
                println!("{}", store.path().display());
            }
        },
    }

    Ok(())
}

fn apply_field(settings: &mut PluginSettings, key: &str, value: &str) -> anyhow::Result<()> {
    match key {
        "capturePath" => settings.capture_path = value.to_string(),
        "credentialRef" => settings.credential_ref = value.to_string(),
        "deviceAddress" => settings.device_address = value.to_string(),
        "outputPath" => settings.output_path = value.to_string(),
        "postprocessor" => settings.postprocessor = value.to_string(),
        "invertImages" => {
            settings.invert_images = value
                .parse()
                .with_context(|| format!("invertImages expects true/false, got {value:?}"))?;
        }
        _ => bail!("unknown settings key: {key}"),
    }
    Ok(())
}
