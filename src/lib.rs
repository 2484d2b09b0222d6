pub mod backend;
pub mod cli;
pub mod config;
pub mod display;
pub mod filter;
pub mod schema;
pub mod service;

pub use backend::{BackendError, ExecutionBackend, MemoryBackend};
pub use cli::{Cli, Commands, OutputFormat, cli_parse};
pub use filter::{CompiledFilter, FilterEngine, FilterError, Predicate, SortSpec};
pub use schema::{EntitySchema, FieldType, SchemaProvider, SchemaRegistry};
pub use service::{FilterService, ServiceError};

use anyhow::Context;
use tracing::Level;

fn init_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();
    init_logging(cli.verbose, cli.quiet);

    let registry = config::load_schema(&cli.schema)?;
    tracing::info!(
        schema = %cli.schema.display(),
        entities = registry.entities().len(),
        "loaded schema"
    );

    match &cli.command {
        Commands::Query {
            data,
            entity,
            filter,
        } => {
            let backend = config::load_data(data)?;
            let service = FilterService::new(registry, backend);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .context("Failed to start runtime")?;
            let docs = runtime.block_on(service.filter_entities(filter, entity))?;

            let output = match cli.format {
                OutputFormat::Text => {
                    let schema = service
                        .schema()
                        .entity(entity)
                        .context("entity disappeared from schema")?;
                    display::format_results_text(schema, &docs)
                }
                OutputFormat::Json => display::format_results_json(entity, &docs),
            };
            println!("{}", output.trim_end());
        }
        Commands::Explain { entity, filter } => {
            let engine = FilterEngine::new(&registry);
            let (compiled, sort) = engine.compile(entity, filter)?;
            let output = match cli.format {
                OutputFormat::Text => display::format_explain_text(&compiled, sort.as_ref()),
                OutputFormat::Json => display::format_explain_json(&compiled, sort.as_ref()),
            };
            println!("{}", output.trim_end());
        }
        Commands::Schema => {
            let output = match cli.format {
                OutputFormat::Text => display::format_schema_text(&registry),
                OutputFormat::Json => display::format_schema_json(&registry),
            };
            println!("{}", output.trim_end());
        }
    }

    Ok(())
}
