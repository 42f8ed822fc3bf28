//! symdex CLI: build and query a TypeScript symbol index.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use symdex::{
    check_freshness, normalize_path, version, IndexQueryAgent, Indexer, IndexerConfig,
    RecordKind, RecordStore, SqliteStore,
};

#[derive(Parser, Debug)]
#[command(name = "symdex", version, about = "Incremental symbol index for TypeScript")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Index database file.
    #[arg(long, global = true, default_value = "symdex.db")]
    db: PathBuf,

    /// Log level for tracing output. RUST_LOG takes precedence.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Index the workspace, skipping files unchanged since the last build.
    Build(BuildArgs),
    /// Discard the whole index.
    Reset,
    /// Look up a class or interface and everything implementing it.
    Class { name: String },
    /// Look up a function.
    Function { name: String },
    /// Look up an indexed file.
    File { path: PathBuf },
    /// Look up a member identifier such as `method#render`.
    Member { identifier: String },
    /// Show record counts and index freshness.
    Status,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Workspace root.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Only index files under this path (relative to root).
    #[arg(long)]
    sub_path: Option<PathBuf>,

    /// Only index files matching this glob. Repeatable.
    #[arg(long)]
    include: Vec<String>,

    /// Skip files matching this glob. Repeatable.
    #[arg(long)]
    exclude: Vec<String>,

    /// Do not honour .gitignore and .ignore.
    #[arg(long)]
    no_gitignore: bool,

    /// Reset the index before building.
    #[arg(long)]
    reset: bool,

    /// Parse files on all cores.
    #[arg(long)]
    parallel: bool,

    /// Re-index files even if unchanged.
    #[arg(long)]
    force: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn open_store(db: &Path) -> Result<Arc<dyn RecordStore>> {
    let store = SqliteStore::open(db)
        .with_context(|| format!("failed to open index database {}", db.display()))?;
    Ok(Arc::new(store))
}

fn execute(cli: Cli) -> Result<ExitCode> {
    let global = &cli.global;
    match cli.command {
        Command::Build(args) => execute_build(global, args),
        Command::Reset => {
            let store = open_store(&global.db)?;
            store.reset().context("failed to reset index")?;
            println!("Index reset: {}", global.db.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Class { name } => execute_class(global, &name),
        Command::Function { name } => {
            let agent = IndexQueryAgent::new(open_store(&global.db)?);
            print_lookup(global, agent.function(&name)?)
        }
        Command::File { path } => {
            let agent = IndexQueryAgent::new(open_store(&global.db)?);
            let key = normalize_path(&path);
            print_lookup(global, agent.file(&key.to_string_lossy())?)
        }
        Command::Member { identifier } => {
            let agent = IndexQueryAgent::new(open_store(&global.db)?);
            print_lookup(global, agent.member(&identifier)?)
        }
        Command::Status => execute_status(global),
    }
}

/// Install a SIGINT/SIGTERM handler that raises `flag`.
fn install_cancel_handler(flag: Arc<AtomicBool>) -> Result<()> {
    #[cfg(unix)]
    {
        use signal_hook::consts::signal;
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([signal::SIGTERM, signal::SIGINT])
            .context("failed to register signal handlers")?;
        std::thread::spawn(move || {
            if signals.forever().next().is_some() {
                flag.store(true, Ordering::SeqCst);
            }
        });
    }
    #[cfg(not(unix))]
    let _ = flag;
    Ok(())
}

fn execute_build(global: &GlobalArgs, args: BuildArgs) -> Result<ExitCode> {
    let store = open_store(&global.db)?;

    let config = IndexerConfig {
        root: args.root,
        include: args.include,
        exclude: args.exclude,
        respect_gitignore: !args.no_gitignore,
        parallel: args.parallel,
        force: args.force || args.reset,
        ..IndexerConfig::default()
    };

    let mut indexer = Indexer::from_config(store, &config);
    if args.reset {
        indexer.reset().context("failed to reset index")?;
    }

    let cancel = Arc::new(AtomicBool::new(false));
    install_cancel_handler(Arc::clone(&cancel))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {pos} files  {wide_msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));

    let report = indexer
        .get_job(args.sub_path.as_deref())?
        .with_cancel_flag(Arc::clone(&cancel))
        .with_progress(|path| {
            spinner.inc(1);
            spinner.set_message(path.display().to_string());
        })
        .run()?;
    spinner.finish_and_clear();

    if global.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for diagnostic in &report.diagnostics {
            eprintln!("{}", diagnostic);
        }
        println!(
            "Indexed {} files ({} declarations), skipped {}",
            report.indexed, report.declarations, report.skipped
        );
        if !report.completed {
            println!("Cancelled: index timestamp not updated");
        }
    }

    Ok(if report.completed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(130)
    })
}

#[derive(Serialize)]
struct ClassLookup {
    record: symdex::ClassRecord,
    all_implementations: Vec<String>,
}

fn execute_class(global: &GlobalArgs, name: &str) -> Result<ExitCode> {
    let agent = IndexQueryAgent::new(open_store(&global.db)?);
    let classes = agent.class();

    let Some(record) = classes.get(name)? else {
        return print_lookup::<symdex::ClassRecord>(global, None);
    };
    let lookup = ClassLookup {
        all_implementations: classes.all_implementations(name)?,
        record,
    };

    if global.json {
        println!("{}", serde_json::to_string_pretty(&lookup)?);
        return Ok(ExitCode::SUCCESS);
    }

    let record = &lookup.record;
    match record.kind() {
        Some(kind) => println!("{} {}", kind, record.fqn()),
        None => println!("{} (referenced, not declared)", record.fqn()),
    }
    if let (Some(path), Some(start)) = (record.file_path(), record.start()) {
        println!("  declared at {}:{}", path, start);
    }
    if !record.implements().is_empty() {
        println!("  implements: {}", record.implements().join(", "));
    }
    if !lookup.all_implementations.is_empty() {
        println!("  implemented by: {}", lookup.all_implementations.join(", "));
    }
    Ok(ExitCode::SUCCESS)
}

fn print_lookup<T: Serialize + std::fmt::Debug>(global: &GlobalArgs, found: Option<T>) -> Result<ExitCode> {
    match found {
        Some(record) if global.json => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(ExitCode::SUCCESS)
        }
        Some(record) => {
            println!("{:#?}", record);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            if global.json {
                println!("null");
            } else {
                eprintln!("Not found");
            }
            Ok(ExitCode::from(1))
        }
    }
}

#[derive(Serialize)]
struct StatusReport {
    version: String,
    database: String,
    classes: usize,
    functions: usize,
    members: usize,
    files: usize,
    last_update: Option<i64>,
    stale: bool,
}

fn execute_status(global: &GlobalArgs) -> Result<ExitCode> {
    let store = open_store(&global.db)?;
    let freshness = check_freshness(store.as_ref())?;

    let status = StatusReport {
        version: version(),
        database: global.db.display().to_string(),
        classes: store.count(RecordKind::Class)?,
        functions: store.count(RecordKind::Function)?,
        members: store.count(RecordKind::Member)?,
        files: store.count(RecordKind::File)?,
        last_update: store.last_update()?,
        stale: freshness.is_stale(),
    };

    if global.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("{}", status.version);
        println!("database:  {}", status.database);
        println!("files:     {}", status.files);
        println!("classes:   {}", status.classes);
        println!("functions: {}", status.functions);
        println!("members:   {}", status.members);
        match status.last_update {
            Some(ts) => println!("updated:   {}", format_timestamp(ts)),
            None => println!("updated:   never"),
        }
        if let Some(warning) = freshness.warning_message() {
            eprintln!("{}", warning);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}
