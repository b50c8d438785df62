//! forgeboot command line entry point
//!
//! Inspects the configuration a forgeboot service would bind and exercises
//! the request identifier rules offline.

use clap::{Parser, Subcommand};
use forgeboot_cli::commands::{self, config::OutputFormat};
use forgeboot_cli::{Settings, DEFAULT_ENV_PREFIX};
use forgeboot_core::ConfigDocument;
use forgeboot_trace::{logging, LoggingProperties, RequestContext, TraceProperties, TraceSettings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "forgeboot")]
#[command(about = "Inspect forgeboot configuration and request identifiers")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "FORGEBOOT_CONFIG")]
    config: Option<PathBuf>,

    /// Prefix of environment variables overriding options (`<PREFIX>__TRACE__...`)
    #[arg(long, global = true, default_value = DEFAULT_ENV_PREFIX)]
    env_prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the bound configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate or validate request identifiers
    RequestId {
        #[command(subcommand)]
        action: RequestIdAction,
    },

    /// Evaluate the trace ignore filter
    Trace {
        #[command(subcommand)]
        action: TraceAction,
    },

    /// Compose versioned API paths
    Version {
        #[command(subcommand)]
        action: VersionAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings
    Show {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Bind and validate every option group
    Check,
}

#[derive(Subcommand)]
enum RequestIdAction {
    /// Print fresh identifiers, one per line
    Generate {
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Check a value against the inbound header rules
    Validate {
        value: String,

        /// Override forgeboot.trace.max_request_id_length
        #[arg(long)]
        max_len: Option<usize>,
    },
}

#[derive(Subcommand)]
enum TraceAction {
    /// Report whether a request bypasses request-id handling
    Skip {
        #[arg(short, long)]
        method: String,

        #[arg(short, long)]
        path: String,
    },
}

#[derive(Subcommand)]
enum VersionAction {
    /// Print the mount path of a route for each version
    Path {
        #[arg(short, long = "version", required = true, num_args = 1..)]
        versions: Vec<String>,

        #[arg(short, long)]
        route: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let doc = Settings::load_document(cli.config.as_deref(), &cli.env_prefix)?;

    init_logging(&doc);

    // The invocation itself is one request; its log lines carry the id.
    let ok = RequestContext::generate().run(run(cli.command, &doc)).await?;
    if !ok {
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Commands, doc: &ConfigDocument) -> anyhow::Result<bool> {
    tracing::debug!("Running command");

    match command {
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                let settings = Settings::bind(doc)?;
                print!("{}", commands::config::show(&settings, format)?);
            }
            ConfigAction::Check => {
                let errors = Settings::check(doc);
                for e in &errors {
                    tracing::warn!(prefix = e.prefix, error = %e.error, "Invalid configuration");
                }
                println!("{}", commands::config::check_report(&errors));
                return Ok(errors.is_empty());
            }
        },

        Commands::RequestId { action } => match action {
            RequestIdAction::Generate { count } => {
                for id in commands::request_id::generate(count) {
                    println!("{}", id);
                }
            }
            RequestIdAction::Validate { value, max_len } => {
                let max_len = match max_len {
                    Some(n) => n,
                    None => Settings::bind(doc)?.trace.max_request_id_length,
                };
                match commands::request_id::validate(&value, max_len) {
                    Ok(id) => println!("{}", id),
                    Err(e) => {
                        eprintln!("{}", e);
                        return Ok(false);
                    }
                }
            }
        },

        Commands::Trace { action } => match action {
            TraceAction::Skip { method, path } => {
                let trace = Settings::bind(doc)?.trace_settings()?;
                println!("{}", commands::trace::skip(&trace, &method, &path)?);
            }
        },

        Commands::Version { action } => match action {
            VersionAction::Path { versions, route } => {
                let settings = Settings::bind(doc)?;
                for path in commands::version::paths(&settings.version, &versions, &route) {
                    println!("{}", path);
                }
            }
        },
    }

    Ok(true)
}

// Falls back to defaults so `config check` can still report a broken logging section.
fn init_logging(doc: &ConfigDocument) {
    let props = doc.bind::<LoggingProperties>().unwrap_or_default();
    let settings = doc
        .bind::<TraceProperties>()
        .and_then(|p| TraceSettings::from_properties(&p))
        .or_else(|_| TraceSettings::from_properties(&TraceProperties::default()));

    let installed = settings
        .map_err(forgeboot_trace::TraceError::from)
        .and_then(|settings| logging::init(&props, &settings));
    if let Err(e) = installed {
        eprintln!("failed to initialize logging: {}", e);
    }
}
