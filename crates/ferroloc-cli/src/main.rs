use anyhow::Context;
use clap::{Parser, Subcommand};
use ferroloc_core::config::DEFAULT_CONFIG_FILE;
use ferroloc_core::{extract, pipeline, Config, Error};
use ferroloc_syntax::{LocationMapper, MarkerKind};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ferroloc")]
#[command(about = "Extract and reinject localization markers in LaTeX sources", long_about = None)]
struct Cli {
    /// Project config (defaults to ./ferroloc.json when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Root document, relative to the source directory
    #[arg(long, global = true, value_name = "FILE")]
    root: Option<String>,

    /// Directory holding the LaTeX sources
    #[arg(long, global = true, value_name = "DIR")]
    source: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the include graph in visiting order
    Graph,
    /// Extract all markers into the source store
    Rebase,
    /// Build the translated tree of each language
    Update {
        /// Languages to build (defaults to the configured ones)
        #[arg(value_name = "LANG")]
        languages: Vec<String>,
    },
    /// Validate the sources, or every .tex file under a directory
    Check {
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Print the markers of one file
    Extract {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Graph => {
            let graph = pipeline::collect_graph(&config)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&graph)?);
            } else {
                for file in &graph.files {
                    println!("{}", file.display());
                }
            }
        }
        Commands::Rebase => {
            let report = pipeline::rebase(&config)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                log::info!(
                    "{} entries from {} files written to {}",
                    report.entries,
                    report.files,
                    report.store_path.display()
                );
            }
        }
        Commands::Update { languages } => {
            let reports = pipeline::update_all(&config, languages)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    log::info!(
                        "{}: {} units replaced, {} unknown keys, {} stale files",
                        report.language,
                        report.replaced_units,
                        report.unknown_keys,
                        report.stale_files
                    );
                }
            }
        }
        Commands::Check { dir } => {
            let report = match dir {
                Some(dir) => pipeline::check_tree(dir)?,
                None => pipeline::check_sources(&config)?,
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                log::info!(
                    "{} files checked, {} units, {} key warnings",
                    report.files,
                    report.units,
                    report.key_warnings
                );
            }
        }
        Commands::Extract { path } => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let extraction = extract(&text).map_err(|e| Error::syntax(path, &text, e))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&extraction)?);
            } else {
                let mapper = LocationMapper::new(&text);
                for diagnostic in &extraction.warnings {
                    log::warn!(
                        "{}:{}: {}",
                        path.display(),
                        mapper.locate(diagnostic.offset),
                        diagnostic.message()
                    );
                }
                for unit in &extraction.units {
                    let kind = match unit.kind {
                        MarkerKind::Title => "title",
                        MarkerKind::Block => "block",
                    };
                    println!(
                        "{} {} {}: {:?}",
                        mapper.locate(unit.marker_start),
                        kind,
                        unit.key,
                        unit.raw_text
                    );
                }
            }
        }
    }
    Ok(())
}

/// The explicit config, else `./ferroloc.json` if present, else defaults.
/// Command line flags win over the file.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            Config::load(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => Config::default(),
    };
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(source) = &cli.source {
        config.source_dir = source.clone();
    }
    log::debug!("Using {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ferroloc", "update", "de", "fr", "--source", "manual", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.source, Some(PathBuf::from("manual")));
        match cli.command {
            Commands::Update { languages } => assert_eq!(languages, vec!["de", "fr"]),
            _ => panic!("Expected update"),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "ferroloc",
            "--config",
            "missing-config-for-test.json",
            "graph",
        ])
        .unwrap();
        assert!(load_config(&cli).is_err());

        let cli = Cli::try_parse_from(["ferroloc", "--root", "book.tex", "--source", "src", "check"])
            .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.root, "book.tex");
        assert_eq!(config.source_dir, PathBuf::from("src"));
    }
}
