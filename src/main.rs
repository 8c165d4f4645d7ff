use anyhow::{Context, bail};
use catalog_json::config::{self, CatalogConfig};
use catalog_json::{export, logging, source};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "catalog-json")]
#[command(about = "Astronomical catalog to JSON Lines exporter", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one or more configured catalogs to <name>.json.
    Export {
        #[arg(long)]
        config: PathBuf,

        /// Catalog to export (repeatable).
        #[arg(long = "catalog")]
        catalogs: Vec<String>,

        /// Export every catalog in the config.
        #[arg(long, conflicts_with = "catalogs")]
        all: bool,

        /// Source file to read instead of the configured url (single catalog only).
        #[arg(long)]
        input: Option<PathBuf>,

        /// tdat header to read instead of the configured headerUrl (single catalog only).
        #[arg(long)]
        header: Option<PathBuf>,

        /// Directory holding downloaded sources and headers.
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,

        #[arg(short = 'o', long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// List catalogs defined in the config.
    List {
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    match cli.cmd {
        Commands::Export {
            config,
            catalogs,
            all,
            input,
            header,
            data_dir,
            out_dir,
        } => {
            let loaded = config::load_catalogs(&config)
                .with_context(|| format!("load catalog file {}", config.display()))?;
            let selected = select_catalogs(loaded, &catalogs, all)?;

            if (input.is_some() || header.is_some()) && selected.len() != 1 {
                bail!("--input and --header need exactly one --catalog");
            }

            for catalog in selected {
                let name = catalog.name().to_string();
                let catalog = export::attach_header(catalog, header.as_deref(), |url| {
                    source::resolve_source(url, &data_dir)
                })
                .with_context(|| format!("read header for catalog {}", name))?;

                let src = input
                    .clone()
                    .unwrap_or_else(|| source::resolve_source(catalog.url(), &data_dir));
                let (summary, out) = export::export_catalog(&catalog, &src, &out_dir)
                    .with_context(|| format!("export catalog {} from {}", name, src.display()))?;

                println!(
                    "Wrote {} ({} records, {} skipped, {} malformed)",
                    out.display(),
                    summary.records_written,
                    summary.lines_skipped,
                    summary.malformed
                );
            }
        }
        Commands::List { config } => {
            let loaded = config::load_catalogs(&config)
                .with_context(|| format!("load catalog file {}", config.display()))?;
            for catalog in &loaded {
                println!(
                    "{}\t{}\t{}",
                    catalog.name(),
                    catalog.format().token(),
                    catalog.url()
                );
            }
        }
    }

    Ok(())
}

/// Pick the requested catalogs, preserving document order.
fn select_catalogs(
    loaded: Vec<CatalogConfig>,
    names: &[String],
    all: bool,
) -> Result<Vec<CatalogConfig>> {
    if all {
        return Ok(loaded);
    }
    if names.is_empty() {
        bail!("nothing to export: pass --catalog <name> or --all");
    }
    for name in names {
        if !loaded.iter().any(|c| c.name() == name) {
            bail!("unknown catalog: {}", name);
        }
    }
    Ok(loaded
        .into_iter()
        .filter(|c| names.iter().any(|n| n == c.name()))
        .collect())
}
