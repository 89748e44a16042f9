use alchemy::generate::{Generator, InitOptions};
use alchemy::{config, output, selector};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Called once at startup.
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "alchemy=warn".into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[derive(Parser)]
#[command(name = "alchemy")]
#[command(about = "Scaffold working features into Go projects")]
#[command(long_about = "\
Scaffold working features into Go projects

Components are rendered from annotated Go templates, formatted, and recorded
in alchemy.yaml so later components can extend what is already there.

Project layout after `alchemy init` and `alchemy add Authentication`:

  my-api/
  ├── go.mod                       # Module path used for generated imports
  ├── alchemy.yaml                 # Manifest: ORM and installed components
  ├── alchemy.toml                 # Optional engine config (gen-config)
  ├── docker-compose.yaml          # With --provision-database
  ├── services/
  │   ├── authentication.go        # Login / Register
  │   ├── jwt.go
  │   └── utils.go
  ├── dao/user.go                  # Data access for the User model
  └── prisma/schema.prisma         # Prisma only

Templates are fetched from ALCHEMY_TMPL_DIR if set, otherwise from the
configured template_base, otherwise from the default remote repository.

Run 'alchemy gen-config' to generate a documented alchemy.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Go project directory
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a fresh alchemy.yaml for the project
    Init {
        /// ORM used by generated data access code (Prisma or Gorm)
        #[arg(long)]
        orm: String,
        /// Database provider supported by the ORM (e.g. PostgreSQL)
        #[arg(long)]
        database_provider: String,
        /// Directory, relative to the project, that generated code lives in
        #[arg(long)]
        root: Option<String>,
        /// Also write a docker-compose.yaml for the database
        #[arg(long)]
        provision_database: bool,
    },
    /// Add a component, e.g. `Authentication` or `Authentication.Login`
    Add {
        /// Component reference: Category or Category.Component
        component: String,
    },
    /// Print a stock alchemy.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Init {
            orm,
            database_provider,
            root,
            provision_database,
        } => {
            let engine_config = config::load_config(&cli.project)?;
            let generator = Generator::from_config(&cli.project, &engine_config)?;
            let report = generator.init(&InitOptions {
                root,
                orm,
                database_provider,
                provision_database,
            })?;
            output::print_init_output(&report, generator.project_dir());
        }
        Command::Add { component } => {
            let request = selector::parse_component_ref(&component)?;
            let engine_config = config::load_config(&cli.project)?;
            let generator = Generator::from_config(&cli.project, &engine_config)?;
            tracing::debug!(base = %generator.template_base(), %request, "adding component");
            let report = generator.add(&request)?;
            output::print_generation_report(&report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
