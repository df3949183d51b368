// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, LevelFilter};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use snowmap_core::discovery::{InputSource, DEFAULT_FOLDER};
use snowmap_core::publish::{self, PublishConfig};
use snowmap_core::render::{MapOptions, DEFAULT_OUTPUT};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser)]
#[command(author, version, about = "Interactive snow conditions map from SNOWPACK .smet files", long_about = None)]
struct Cli {
    /// More log output (debug)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// List of paths to .smet files (takes precedence over --folder)
    #[arg(long, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Folder searched recursively for .smet files [default: data]
    #[arg(long, env = "SNOWMAP_FOLDER")]
    folder: Option<PathBuf>,
}

impl InputArgs {
    fn source(&self) -> InputSource {
        if !self.files.is_empty() {
            return InputSource::Files(self.files.clone());
        }
        let folder = self
            .folder
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FOLDER));
        InputSource::Folder(folder)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the HTML map, optionally publishing it
    Render {
        #[command(flatten)]
        input: InputArgs,

        /// Path to write the output HTML map
        #[arg(long, env = "SNOWMAP_OUTPUT", default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Copy the map to the remote host after rendering
        #[arg(long)]
        publish: bool,

        /// Env file with the publishing settings (default: .env)
        #[arg(long, env = "SNOWMAP_ENV_FILE")]
        env_file: Option<PathBuf>,
    },
    /// Print the derived conditions for each station
    List {
        #[command(flatten)]
        input: InputArgs,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Copy an existing map to the remote host
    Publish {
        /// Map file to upload
        #[arg(default_value = DEFAULT_OUTPUT)]
        file: PathBuf,

        /// Env file with the publishing settings (default: .env)
        #[arg(long, env = "SNOWMAP_ENV_FILE")]
        env_file: Option<PathBuf>,
    },
}

fn init_logging(cli: &Cli) {
    let level = std::env::var("SNOWMAP_LOG")
        .ok()
        .and_then(|v| LevelFilter::from_str(&v).ok())
        .unwrap_or(if cli.verbose {
            LevelFilter::Debug
        } else if cli.quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        });

    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();

    // Ignore an already installed logger
    let _ = TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto);
}

fn publish_map(file: &Path, env_file: Option<&Path>) -> Result<()> {
    publish::load_env_file(env_file).context("Could not load publishing settings")?;
    let config = PublishConfig::from_env().context("Incomplete publishing settings")?;
    publish::publish_file(file, &config)
        .with_context(|| format!("Transfer of {} failed", file.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match &cli.command {
        Commands::Render {
            input,
            output,
            publish,
            env_file,
        } => {
            let summary = snowmap_core::generate_map(&input.source(), output, &MapOptions::default())
                .context("Map generation failed")?;
            println!(
                "Map saved to {} ({} of {} files mapped)",
                summary.output.display(),
                summary.stations,
                summary.files_found
            );

            if *publish {
                publish_map(output, env_file.as_deref())?;
                println!("Published {}", output.display());
            }
        }
        Commands::List { input, json } => {
            let stations = snowmap_core::load_stations(&input.source())?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&stations)?);
            } else {
                println!(
                    "{:<12} {:<24} {:>6} {:>7} {:>6} {:>6} {:>5} {:>4}  {}",
                    "ID", "NAME", "ELEV", "HS", "HN24", "HN72", "VW", "DW", "RAIN"
                );
                for s in &stations {
                    println!(
                        "{:<12} {:<24} {:>6.0} {:>7.1} {:>6.1} {:>6.1} {:>5.1} {:>4.0}  {}",
                        s.id,
                        s.name,
                        s.altitude.trunc(),
                        s.hs,
                        s.hn24,
                        s.hn72,
                        s.vw,
                        s.dw,
                        if s.is_raining { "YES" } else { "no" }
                    );
                }
            }
            info!("Listed stations — count={}", stations.len());
        }
        Commands::Publish { file, env_file } => {
            publish_map(file, env_file.as_deref())?;
            println!("Published {}", file.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::sync::Mutex;

    // Serializes tests that read or write SNOWMAP_FOLDER
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("SNOWMAP_FOLDER");
        let cli = Cli::try_parse_from(["snowmap", "render"]).unwrap();
        match cli.command {
            Commands::Render {
                input,
                output,
                publish,
                ..
            } => {
                assert_eq!(input.source(), InputSource::Folder(PathBuf::from("data")));
                assert_eq!(output, PathBuf::from("snow_conditions_map.html"));
                assert!(!publish);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_render_with_files() {
        let cli = Cli::try_parse_from([
            "snowmap", "-v", "render", "--files", "a.smet", "b.smet", "--output", "out.html",
            "--publish",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Render {
                input,
                output,
                publish,
                ..
            } => {
                assert_eq!(
                    input.source(),
                    InputSource::Files(vec![PathBuf::from("a.smet"), PathBuf::from("b.smet")])
                );
                assert_eq!(output, PathBuf::from("out.html"));
                assert!(publish);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_files_take_precedence_over_folder() {
        let cli = Cli::try_parse_from([
            "snowmap", "list", "--files", "a.smet", "--folder", "data",
        ])
        .unwrap();
        match cli.command {
            Commands::List { input, .. } => {
                assert_eq!(input.source(), InputSource::Files(vec![PathBuf::from("a.smet")]));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_folder_env_var() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("SNOWMAP_FOLDER", "/srv/snowpack");

        // Files given on the command line still win over the env folder
        let with_files = Cli::try_parse_from(["snowmap", "render", "--files", "a.smet"]);
        let folder_only = Cli::try_parse_from(["snowmap", "list"]);
        std::env::remove_var("SNOWMAP_FOLDER");

        match with_files.unwrap().command {
            Commands::Render { input, .. } => {
                assert_eq!(input.source(), InputSource::Files(vec![PathBuf::from("a.smet")]));
            }
            _ => panic!("expected render"),
        }
        match folder_only.unwrap().command {
            Commands::List { input, .. } => {
                assert_eq!(input.source(), InputSource::Folder(PathBuf::from("/srv/snowpack")));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_publish_default_file() {
        let cli = Cli::try_parse_from(["snowmap", "publish"]).unwrap();
        match cli.command {
            Commands::Publish { file, env_file } => {
                assert_eq!(file, PathBuf::from("snow_conditions_map.html"));
                assert!(env_file.is_none());
            }
            _ => panic!("expected publish"),
        }
    }
}
