mod render;
mod session;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use form_schema_core::{
    Delayed, FieldCollection, MemoryGateway, PersistenceGateway, Schema, SchemaLibrary,
    validate_input,
};
use form_schema_db::{
    BuilderConfig, FileGateway, StorageBackend, read_schema_file, write_schema_file,
};
use form_schema_sqlite::{Migration, SqliteGateway};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Table,
}

/// Storage backend selectable on the command line.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliBackend {
    File,
    Sqlite,
    Memory,
}

impl From<CliBackend> for StorageBackend {
    fn from(backend: CliBackend) -> Self {
        match backend {
            CliBackend::File => Self::File,
            CliBackend::Sqlite => Self::Sqlite,
            CliBackend::Memory => Self::Memory,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "form-schema", version)]
#[command(about = "Build, validate and store form field schemas")]
struct Cli {
    #[command(flatten)]
    store: StoreOptions,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct StoreOptions {
    /// Configuration file (YAML). A missing file means default settings.
    #[arg(long, global = true, default_value = "form-schema.yml")]
    config: PathBuf,
    /// Storage directory or database file, overriding the configuration.
    #[arg(long = "store", global = true)]
    path: Option<PathBuf>,
    /// Storage backend, overriding the configuration.
    #[arg(long, global = true)]
    backend: Option<CliBackend>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive builder session reading commands from stdin.
    Session,
    /// List saved schemas.
    Schemas,
    /// Print a saved schema.
    Show(ShowArgs),
    /// Delete every saved schema with a given name.
    Delete(NameArgs),
    /// Import a schema (or a bare field array) from a JSON file.
    Import(ImportArgs),
    /// Export a saved schema to a JSON file.
    Export(ExportArgs),
    /// Validate a value against a field of a saved schema.
    Check(CheckArgs),
    /// SQLite database migration operations.
    Migrate(MigrateArgs),
}

#[derive(Debug, Args)]
struct NameArgs {
    /// Schema name.
    name: String,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Schema name.
    name: String,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// Name to save the schema under.
    name: String,
    /// JSON file holding a schema object or an array of fields.
    #[arg(long)]
    input: PathBuf,
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Schema name.
    name: String,
    /// Output JSON path.
    #[arg(long)]
    output: PathBuf,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema name.
    name: String,
    /// Field position (1-based) or id.
    #[arg(long)]
    field: String,
    /// Value to validate.
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    value: String,
}

#[derive(Debug, Args)]
struct MigrateArgs {
    #[command(subcommand)]
    operation: MigrateOperation,
}

#[derive(Debug, Subcommand)]
enum MigrateOperation {
    /// Create the store table in the database.
    Up(MigrateDbArgs),
    /// Drop the store table and everything saved in it.
    Down(MigrateDbArgs),
    /// Show migration and table status.
    Status(MigrateDbArgs),
}

#[derive(Debug, Args)]
struct MigrateDbArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
    /// Table prefix.
    #[arg(long, default_value = "form_")]
    prefix: String,
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Migrate(args) => run_migrate(args),
        Command::Session => {
            let (config, library) = open_store(&cli.store).await?;
            session::run(library, config.validation_options()).await
        }
        Command::Schemas => {
            let (_, library) = open_store(&cli.store).await?;
            run_schemas(&library)
        }
        Command::Show(args) => {
            let (_, library) = open_store(&cli.store).await?;
            run_show(&library, args)
        }
        Command::Delete(args) => {
            let (_, mut library) = open_store(&cli.store).await?;
            run_delete(&mut library, args).await
        }
        Command::Import(args) => {
            let (config, mut library) = open_store(&cli.store).await?;
            run_import(&mut library, &config, args).await
        }
        Command::Export(args) => {
            let (_, library) = open_store(&cli.store).await?;
            run_export(&library, args)
        }
        Command::Check(args) => {
            let (_, library) = open_store(&cli.store).await?;
            run_check(&library, args)
        }
    }
}

fn load_config(options: &StoreOptions) -> Result<BuilderConfig, String> {
    let mut config = BuilderConfig::load_or_default(&options.config)
        .map_err(|e| format!("Failed to load config '{}': {e}", options.config.display()))?;
    if let Some(backend) = options.backend {
        config.storage.backend = backend.into();
    }
    if let Some(path) = &options.path {
        config.storage.path = Some(path.clone());
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

async fn open_store(options: &StoreOptions) -> Result<(BuilderConfig, SchemaLibrary), String> {
    let config = load_config(options)?;
    let library = open_library(&config).await?;
    Ok((config, library))
}

fn with_latency<G>(gateway: G, latency: Option<Duration>) -> Arc<dyn PersistenceGateway>
where
    G: PersistenceGateway + 'static,
{
    match latency {
        Some(latency) => Arc::new(Delayed::new(gateway, latency)),
        None => Arc::new(gateway),
    }
}

fn open_gateway(config: &BuilderConfig) -> Result<Arc<dyn PersistenceGateway>, String> {
    let storage = &config.storage;
    let path = storage.resolved_path();
    let latency = storage.latency();
    info!(backend = %storage.backend, path = %path.display(), "opening store");

    let gateway = match storage.backend {
        StorageBackend::File => with_latency(FileGateway::new(path), latency),
        StorageBackend::Sqlite => {
            let gateway = SqliteGateway::open(&path, storage.prefix.as_str())
                .map_err(|e| format!("Failed to open database '{}': {e}", path.display()))?;
            with_latency(gateway, latency)
        }
        StorageBackend::Memory => with_latency(MemoryGateway::new(), latency),
    };
    Ok(gateway)
}

async fn open_library(config: &BuilderConfig) -> Result<SchemaLibrary, String> {
    let gateway = open_gateway(config)?;
    SchemaLibrary::open_with(
        gateway,
        config.library.key.clone(),
        config.library.duplicate_names,
    )
    .await
    .map_err(|e| format!("Failed to load saved schemas: {e}"))
}

fn find<'a>(library: &'a SchemaLibrary, name: &str) -> Result<&'a Schema, String> {
    library
        .get(name)
        .ok_or_else(|| format!("no saved schema named '{}'", name.trim()))
}

fn run_schemas(library: &SchemaLibrary) -> Result<(), String> {
    if library.is_empty() {
        println!("No saved schemas.");
        return Ok(());
    }
    for schema in library.schemas() {
        println!("{} ({} fields)", schema.name, schema.field_count());
    }
    Ok(())
}

fn run_show(library: &SchemaLibrary, args: ShowArgs) -> Result<(), String> {
    let schema = find(library, &args.name)?;
    let rendered = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(schema)
            .map(|json| json + "\n")
            .map_err(|e| format!("Failed to serialize schema: {e}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(schema)
            .map_err(|e| format!("Failed to serialize schema: {e}"))?,
        CliOutputFormat::Table => render::schema_table(schema),
    };
    print!("{rendered}");
    Ok(())
}

async fn run_delete(library: &mut SchemaLibrary, args: NameArgs) -> Result<(), String> {
    let removed = library
        .delete(&args.name)
        .await
        .map_err(|e| e.to_string())?;
    println!(
        "Deleted {removed} schema(s) named '{}'.",
        args.name.trim()
    );
    Ok(())
}

async fn run_import(
    library: &mut SchemaLibrary,
    config: &BuilderConfig,
    args: ImportArgs,
) -> Result<(), String> {
    let mut schema = read_schema_file(&args.input, &args.name)
        .map_err(|e| format!("Failed to read '{}': {e}", args.input.display()))?;
    schema.name = args.name.trim().to_string();

    FieldCollection::from_fields(schema.fields.clone(), config.validation_options())
        .map_err(|e| format!("Invalid schema in '{}': {e}", args.input.display()))?;

    let count = schema.field_count();
    library
        .save(schema)
        .await
        .map_err(|e| format!("Failed to save schema: {e}"))?;
    println!("Imported '{}' with {count} fields.", args.name.trim());
    Ok(())
}

fn run_export(library: &SchemaLibrary, args: ExportArgs) -> Result<(), String> {
    let schema = find(library, &args.name)?;
    write_schema_file(&args.output, schema)
        .map_err(|e| format!("Failed to write '{}': {e}", args.output.display()))?;
    println!(
        "Exported '{}' to {}.",
        schema.name,
        args.output.display()
    );
    Ok(())
}

fn run_check(library: &SchemaLibrary, args: CheckArgs) -> Result<(), String> {
    let schema = find(library, &args.name)?;
    let id = render::resolve_field(&schema.fields, &args.field)?;
    let field = schema
        .fields
        .iter()
        .find(|field| field.id == id)
        .ok_or_else(|| format!("field not found: {id}"))?;

    println!("{}", session::check_line(field, &args.value));
    if validate_input(field, &args.value).is_valid() {
        Ok(())
    } else {
        Err(format!("value rejected by field '{}'", field.title))
    }
}

fn run_migrate(args: MigrateArgs) -> Result<(), String> {
    match args.operation {
        MigrateOperation::Up(a) => run_migrate_up(a),
        MigrateOperation::Down(a) => run_migrate_down(a),
        MigrateOperation::Status(a) => run_migrate_status(a),
    }
}

fn open_migration(args: &MigrateDbArgs) -> Result<Migration, String> {
    let conn = rusqlite::Connection::open(&args.db)
        .map_err(|e| format!("Failed to open database '{}': {e}", args.db.display()))?;
    Migration::new(conn, &args.prefix).map_err(|e| format!("Failed to initialize migration: {e}"))
}

fn run_migrate_up(args: MigrateDbArgs) -> Result<(), String> {
    let mut migration = open_migration(&args)?;
    migration
        .up()
        .map_err(|e| format!("Migration up failed: {e}"))?;
    println!(
        "Migration up complete. Tables created with prefix '{}' in '{}'.",
        args.prefix,
        args.db.display()
    );
    Ok(())
}

fn run_migrate_down(args: MigrateDbArgs) -> Result<(), String> {
    let mut migration = open_migration(&args)?;
    migration
        .down()
        .map_err(|e| format!("Migration down failed: {e}"))?;
    println!(
        "Migration down complete. Tables with prefix '{}' dropped from '{}'.",
        args.prefix,
        args.db.display()
    );
    Ok(())
}

fn run_migrate_status(args: MigrateDbArgs) -> Result<(), String> {
    let migration = open_migration(&args)?;
    let status = migration
        .status()
        .map_err(|e| format!("Failed to get migration status: {e}"))?;
    println!("Migration Status:");
    println!(
        "  Tables exist: {}",
        if status.tables_exist { "yes" } else { "no" }
    );
    println!("  Entry count: {}", status.entry_count);
    Ok(())
}
