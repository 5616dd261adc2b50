//! crdform CLI - drive Kubernetes custom resources through typed adapters

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod display;
mod error;
mod exit_codes;
mod util;

use commands::Settings;
use error::Result;

#[derive(Parser)]
#[command(name = "crdform")]
#[command(version)]
#[command(about = "Manage Kubernetes custom resources through typed, schema-checked adapters", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args)]
struct GlobalArgs {
    /// Provider configuration file (default: ~/.config/crdform/provider.yaml)
    #[arg(long, global = true, env = "CRDFORM_CONFIG")]
    config: Option<PathBuf>,

    /// Kubeconfig file to use
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    context: Option<String>,

    /// Never contact a cluster
    #[arg(long, global = true)]
    offline: bool,

    /// Server-side apply field manager
    #[arg(long, global = true)]
    field_manager: Option<String>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List resource and data source types
    Types {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the schema of a type
    Schema {
        /// Resource or data source type name, or `provider`
        type_name: String,

        /// Print an example configuration instead
        #[arg(long)]
        example: bool,
    },

    /// Validate a configuration block
    Validate {
        /// Resource or data source type name
        type_name: String,

        /// Configuration file (YAML or JSON)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// Output validation results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a configuration block as a manifest, without a cluster
    Manifest {
        /// Type name, with or without the `_manifest` suffix
        type_name: String,

        /// Configuration file (YAML or JSON)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// Write the manifest here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show what apply would change
    Plan {
        /// Resource type name
        type_name: String,

        /// Configuration file (YAML or JSON)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// Prior state file
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Create or update a resource
    Apply {
        /// Resource type name
        type_name: String,

        /// Configuration file (YAML or JSON)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// State file, read as prior state and rewritten after apply
        #[arg(long)]
        state: Option<PathBuf>,

        /// Allow deleting and recreating the object when the name or
        /// namespace changes
        #[arg(long)]
        replace: bool,
    },

    /// Read an object by ID ('namespace/name' or 'name')
    Read {
        /// Resource or data source type name
        type_name: String,

        #[arg(long)]
        id: String,
    },

    /// Import an existing object into state
    Import {
        /// Resource type name
        type_name: String,

        #[arg(long)]
        id: String,

        /// Write state here instead of stdout
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Delete a resource
    Destroy {
        /// Resource type name
        type_name: String,

        #[arg(long, required_unless_present = "state")]
        id: Option<String>,

        /// State file of the resource; removed after deletion
        #[arg(long)]
        state: Option<PathBuf>,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings {
        config: cli.global.config,
        kubeconfig: cli.global.kubeconfig,
        context: cli.global.context,
        offline: cli.global.offline,
        field_manager: cli.global.field_manager,
    };

    match cli.command {
        Commands::Types { json } => commands::types::run(json),

        Commands::Schema { type_name, example } => commands::schema::run(&type_name, example),

        Commands::Validate {
            type_name,
            file,
            json,
        } => commands::validate::run(&type_name, &file, json),

        Commands::Manifest {
            type_name,
            file,
            output,
        } => commands::manifest::run(&type_name, &file, output.as_deref()).await,

        Commands::Plan {
            type_name,
            file,
            state,
        } => commands::plan::run(&settings, &type_name, &file, state.as_deref()).await,

        Commands::Apply {
            type_name,
            file,
            state,
            replace,
        } => {
            commands::apply::run(&settings, &type_name, &file, state.as_deref(), replace).await
        }

        Commands::Read { type_name, id } => commands::read::run(&settings, &type_name, &id).await,

        Commands::Import {
            type_name,
            id,
            state,
        } => commands::import::run(&settings, &type_name, &id, state.as_deref()).await,

        Commands::Destroy {
            type_name,
            id,
            state,
        } => {
            commands::destroy::run(&settings, &type_name, id.as_deref(), state.as_deref()).await
        }
    }
}

#[tokio::main]
async fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.global.debug);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
