//! XML Metadata CLI
//!
//! Checks override manifests and inspects the bundles they resolve to.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use xml_metadata::{settings, MetadataConfig, OverrideManifest};

#[derive(Parser)]
#[command(name = "xml-metadata")]
#[command(about = "Check and inspect XML serialization overrides")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the override registry from a manifest and report conflicts
    Check {
        /// Manifest file (.toml or .json)
        manifest: PathBuf,
    },

    /// Print the bundle registered for a type or member
    Lookup {
        /// Manifest file (.toml or .json)
        manifest: PathBuf,
        /// Type name
        #[arg(short = 't', long = "type")]
        type_name: String,
        /// Member name; omit for the type-level bundle
        #[arg(short, long)]
        member: Option<String>,
    },

    /// Print the effective configuration.
    ///
    /// The process-wide legacy generation setting is always read from the
    /// default locations, so `--config` does not change that line.
    Config {
        /// Configuration file layered over the default locations
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Check { manifest } => {
            let loaded = OverrideManifest::load(&manifest)
                .with_context(|| format!("failed to load {}", manifest.display()))?;
            let registry = loaded.build_registry()?;
            println!(
                "✅ {}: {} bundles across {} types",
                manifest.display(),
                registry.len(),
                registry.types().count()
            );
        }

        Commands::Lookup {
            manifest,
            type_name,
            member,
        } => {
            let loaded = OverrideManifest::load(&manifest)
                .with_context(|| format!("failed to load {}", manifest.display()))?;
            let registry = loaded.build_registry()?;
            let bundle = match &member {
                Some(member) => registry.lookup(&type_name, member),
                None => registry.lookup_type(&type_name),
            };
            let target = match &member {
                Some(member) => format!("{}.{}", type_name, member),
                None => type_name.clone(),
            };
            match bundle {
                Some(bundle) => println!("{}", serde_json::to_string_pretty(bundle)?),
                None => println!("No override registered for {}", target),
            }
        }

        Commands::Config { config } => {
            let config = MetadataConfig::load_from(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&config)?);
            match settings::legacy_generation() {
                Some(flag) => println!("# legacy generation (process setting): {}", flag),
                None => println!("# legacy generation (process setting): unset"),
            }
        }
    }

    Ok(())
}
