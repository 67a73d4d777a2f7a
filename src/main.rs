//! Autodoc - documentation task preparation for automation scenarios.
//!
//! Prepares one task bundle per scenario, schedules what to document next
//! and tracks completion in a small ledger.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use clap::{ArgGroup, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use autodoc::core::Config;
use autodoc::report::{self, StatusReport};
use autodoc::schema::{dump_schema, DumpOutcome, SchemaIndex};
use autodoc::task::{BatchOutcome, BatchReport, TaskBuilder, TaskFilter, TaskStore};
use autodoc::{CompletionEvidence, Manifest, ProgressStore};

/// Prepare and track documentation tasks for automation scenarios
#[derive(Parser)]
#[command(name = "autodoc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (defaults to .autodoc.toml, then the user config dir)
    #[arg(long, global = true, env = "AUTODOC_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full setup: create directories, dump the schema and prepare every task
    Setup,

    /// Export the database schema (placeholder without a database URL)
    SchemaDump,

    /// Prepare documentation tasks
    #[command(group(ArgGroup::new("target").required(true)))]
    Prepare {
        /// Prepare a single scenario
        #[arg(long, group = "target")]
        id: Option<u64>,

        /// Prepare every scenario
        #[arg(long, group = "target")]
        all: bool,

        /// Prepare active scenarios only
        #[arg(long, group = "target")]
        active_only: bool,
    },

    /// Show the next scenario(s) to document
    Next {
        /// How many scenarios to show
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },

    /// Mark a scenario as documented
    Complete {
        /// Scenario ID
        #[arg(long)]
        id: u64,

        /// Don't ask for confirmation when no document is found
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show documentation progress
    Status {
        /// Break progress down by category
        #[arg(short, long)]
        verbose: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Regenerate the markdown indexes of docs and findings
    Index,

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Output format for `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.debug { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Commands::Completions { shell } = command {
        cmd_completions(shell);
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;

    match command {
        Commands::Setup => cmd_setup(&config)?,
        Commands::SchemaDump => {
            cmd_schema_dump(&config)?;
        }
        Commands::Prepare { id, all: _, active_only } => {
            let filter = match id {
                Some(id) => TaskFilter::ById(id),
                None if active_only => TaskFilter::ActiveOnly,
                None => TaskFilter::All,
            };
            cmd_prepare(&config, filter)?;
        }
        Commands::Next { count } => cmd_next(&config, count)?,
        Commands::Complete { id, yes } => cmd_complete(&config, id, yes)?,
        Commands::Status { verbose, format } => cmd_status(&config, verbose, format)?,
        Commands::Index => cmd_index(&config)?,
        Commands::Config { path } => cmd_config(&config, path)?,
        Commands::Completions { .. } => unreachable!("handled before config loading"),
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_with(path),
        None => Config::load(),
    }
}

/// Load the schema index, degrading to "no schema" on any problem.
fn load_schema(config: &Config) -> Option<SchemaIndex> {
    match SchemaIndex::load_optional(&config.paths.schema_file) {
        Ok(schema) => schema,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "Ignoring unreadable schema file");
            None
        }
    }
}

/// Full setup.
fn cmd_setup(config: &Config) -> Result<()> {
    println!("Autodoc setup");
    println!("{}", "=".repeat(50));

    let manifest = Manifest::load(&config.manifest_path())?;
    println!("\nSnapshot: {}", config.paths.snapshot_dir.display());
    println!("   {} scenarios", manifest.scenario_count());

    for dir in [&config.paths.tasks_dir, &config.paths.docs_dir, &config.paths.findings_dir] {
        std::fs::create_dir_all(dir)?;
        println!("Directory: {}/", dir.display());
    }

    println!("\n--- Database schema ---");
    cmd_schema_dump(config)?;

    println!("\n--- Preparing tasks ---");
    cmd_prepare(config, TaskFilter::All)?;

    let task_count = TaskStore::new(&config.paths.tasks_dir).count();
    println!("\n--- Done ---");
    println!("\n  {} tasks prepared for {} scenarios", task_count, manifest.scenario_count());
    println!("\n  Next steps:");
    println!("    1. Run: autodoc next");
    println!("    2. Document the scenario from its task file");
    println!("    3. Run: autodoc complete --id <ID>");

    Ok(())
}

/// Export the database schema.
fn cmd_schema_dump(config: &Config) -> Result<DumpOutcome> {
    if let Some(host) = config.redacted_database_url() {
        println!("Connecting to {host}...");
    }

    let outcome = dump_schema(config, None)?;
    let index = outcome.index();

    match &outcome {
        DumpOutcome::Placeholder(_) => {
            println!("WARN: No database URL configured. Wrote an empty schema.");
            println!("      Set database.url or AUTODOC_DB_URL to enrich tasks with table details.");
        }
        DumpOutcome::Extracted(_) => {
            println!(
                "  {} tables, {} functions, {} enums",
                index.tables.len(),
                index.functions.len(),
                index.enums.len()
            );
        }
    }
    println!("  Schema saved to {}", config.paths.schema_file.display());

    Ok(outcome)
}

/// Prepare tasks for the selected scenarios.
fn cmd_prepare(config: &Config, filter: TaskFilter) -> Result<BatchReport> {
    let manifest = Manifest::load(&config.manifest_path())?;

    if let TaskFilter::ById(id) = filter {
        if manifest.get(id).is_none() {
            anyhow::bail!("Scenario {id} not found in manifest");
        }
    }

    let selected = filter.select(&manifest.scenarios).len();
    if selected == 0 {
        println!("No scenarios match those filters.");
        return Ok(BatchReport::default());
    }

    let schema = load_schema(config);
    println!("Preparing {selected} tasks...");
    if schema.as_ref().map_or(true, SchemaIndex::is_empty) {
        println!("WARN: No database schema. Run 'autodoc schema-dump' first.");
    }

    let builder = TaskBuilder::from_config(config);
    let report = builder.build_batch(&manifest.scenarios, filter, schema.as_ref(), |item| {
        println!(
            "  [{}/{}] {} {}... {}",
            item.index,
            item.total,
            item.entry.id,
            item.entry.short_name(50),
            item.outcome.label()
        );
        if let BatchOutcome::Skipped(reason) | BatchOutcome::Failed(reason) = item.outcome {
            println!("      {reason}");
        }
    });

    let (succeeded, failed) = report.counts();
    println!("\nPrepared: {succeeded} | Errors: {failed}");
    println!("Tasks in: {}/", config.paths.tasks_dir.display());

    if let (TaskFilter::ById(id), Some(failure)) = (filter, report.failures.first()) {
        anyhow::bail!("Could not prepare scenario {id}: {}", failure.reason);
    }

    Ok(report)
}

/// Show the next scenarios to document.
fn cmd_next(config: &Config, count: usize) -> Result<()> {
    let manifest = Manifest::load(&config.manifest_path())?;
    let ledger = ProgressStore::new(&config.paths.progress_file).load()?;
    let tasks = TaskStore::new(&config.paths.tasks_dir);

    let batch = report::next(&ledger, &manifest, count);
    if batch.is_empty() {
        println!("All scenarios are documented!");
        return Ok(());
    }

    println!("Next {} scenario(s) to document:\n", batch.len());
    for scenario in &batch {
        let state = if scenario.is_active { "ACTIVE" } else { "INACTIVE" };
        let task = if tasks.exists(scenario.id) { "ready" } else { "missing" };
        println!("  [{}] {}", scenario.id, scenario.name);
        println!("    Category: {} | State: {} | Task: {}", scenario.category, state, task);
    }

    if let [only] = batch.as_slice() {
        let path = tasks.path(only.id);
        if tasks.exists(only.id) {
            println!("\n  To document it, hand over the task file:");
            println!("    {}", path.display());
        } else {
            println!("\n  Prepare the task first:");
            println!("    autodoc prepare --id {}", only.id);
        }
    }

    Ok(())
}

/// Mark a scenario as documented.
fn cmd_complete(config: &Config, id: u64, skip_confirm: bool) -> Result<()> {
    let manifest = Manifest::load(&config.manifest_path())?;
    if manifest.get(id).is_none() {
        anyhow::bail!("Scenario {id} not found in manifest");
    }

    let store = ProgressStore::new(&config.paths.progress_file);
    let mut ledger = store.load()?;

    let evidence = CompletionEvidence::find(&config.paths.docs_dir, &config.paths.findings_dir, id);
    if !evidence.has_document() {
        println!("WARN: No documentation found at {}/{id}_*.md", config.paths.docs_dir.display());

        if !skip_confirm && !confirm("Mark as complete anyway? [y/N] ")? {
            println!("Cancelled");
            return Ok(());
        }
    }

    ledger.mark_complete(id, evidence, Local::now().naive_local());
    let ledger = store.save(ledger)?;

    let report = StatusReport::build(&ledger, &manifest, false);
    println!("Scenario {id} marked as documented.");
    println!("   Progress: {}/{} ({}%)", report.done, report.total, report.percent());

    Ok(())
}

/// Show documentation progress.
fn cmd_status(config: &Config, verbose: bool, format: OutputFormat) -> Result<()> {
    let manifest = Manifest::load(&config.manifest_path())?;
    let ledger = ProgressStore::new(&config.paths.progress_file).load()?;
    let status = StatusReport::build(&ledger, &manifest, verbose);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&status)?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{status}"),
    }

    Ok(())
}

/// Regenerate the markdown indexes.
fn cmd_index(config: &Config) -> Result<()> {
    let manifest = Manifest::load(&config.manifest_path())?;
    let ledger = ProgressStore::new(&config.paths.progress_file).load()?;

    let paths = report::write_indexes(config, &ledger, &manifest, Local::now().naive_local())?;
    println!("Index written: {}", paths.docs_index.display());
    if let Some(findings) = paths.findings_index {
        println!("Findings index: {}", findings.display());
    }

    Ok(())
}

/// Show configuration.
fn cmd_config(config: &Config, show_path: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Config::config_path() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let mut shown = config.clone();
    shown.database.url = config.redacted_database_url();
    let toml = toml::to_string_pretty(&shown)?;
    println!("{toml}");

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "autodoc", &mut io::stdout());
}

/// Ask a yes/no question on stdin. Anything but "y"/"yes" is a no.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let answer = input.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
