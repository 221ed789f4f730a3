//! Kubeform CLI - typed manifests for Kubernetes custom resources

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod error;
mod exit_codes;
mod util;

use error::Result;

#[derive(Parser)]
#[command(name = "kubeform")]
#[command(author = "Kubeform Contributors")]
#[command(version)]
#[command(about = "Validate and render Kubernetes custom resources from typed configuration", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Additional kind catalog file or directory (repeatable)
    #[arg(long, global = true, env = "KUBEFORM_CATALOG", value_delimiter = ',')]
    catalog: Vec<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered resource kinds
    Kinds {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the schema of a resource kind
    Describe {
        /// Resource name, e.g. redis_database
        resource: String,

        /// Field path within the kind, e.g. spec.tags[0].key
        path: Option<String>,
    },

    /// Check configuration against a kind, reporting every error at once
    Validate {
        /// Resource name, e.g. redis_database
        resource: String,

        /// Configuration file(s) to merge, YAML or JSON
        #[arg(short = 'f', long = "values")]
        values: Vec<PathBuf>,

        /// Set values on command line (key=value)
        #[arg(long = "set")]
        set: Vec<String>,

        /// Output validation results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the manifest for a configuration
    Render {
        /// Resource name, e.g. redis_database
        resource: String,

        /// Configuration file(s) to merge, YAML or JSON
        #[arg(short = 'f', long = "values")]
        values: Vec<PathBuf>,

        /// Set values on command line (key=value)
        #[arg(long = "set")]
        set: Vec<String>,

        /// Stamp an identifier and print it to stderr
        #[arg(long)]
        stamp: bool,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let registry = util::load_registry(&cli.catalog)?;

    match cli.command {
        Commands::Kinds { json } => commands::kinds::run(&registry, json),

        Commands::Describe { resource, path } => {
            commands::describe::run(&registry, &resource, path.as_deref())
        }

        Commands::Validate {
            resource,
            values,
            set,
            json,
        } => commands::validate::run(&registry, &resource, &values, &set, json),

        Commands::Render {
            resource,
            values,
            set,
            stamp,
        } => commands::render::run(Arc::new(registry), &resource, &values, &set, stamp),
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
