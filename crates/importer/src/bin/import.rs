use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use gp_importer::{
    ClassReport, Config, GpClass, Pipeline, RecordSink,
    archive::FsArchive,
    sinks::{DiscardSink, JsonFileSink, PostgresSink, read_batch},
    sources::PulseliveClient,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "gp-import")]
#[command(about = "MotoGP rider and calendar importer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Validate and log, but persist nothing
    #[arg(long, global = true)]
    dry_run: bool,

    /// Write batches as JSON under this directory instead of the database
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[arg(long, env = "GP_ARCHIVE_DIR", default_value = "./archive", global = true)]
    archive_dir: PathBuf,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args)]
struct ClassArgs {
    /// GP classes to process (default: all)
    #[arg(short, long = "class", value_delimiter = ',')]
    classes: Vec<GpClass>,
}

impl ClassArgs {
    fn selected(&self) -> Vec<GpClass> {
        if self.classes.is_empty() {
            GpClass::all().to_vec()
        } else {
            self.classes.clone()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape rider pages and persist them
    Riders {
        #[command(flatten)]
        classes: ClassArgs,
    },
    /// Scrape the season calendar and persist it
    Calendar,
    /// Fetch rider pages into the archive without parsing them
    Extract {
        #[command(flatten)]
        classes: ClassArgs,

        /// Logical run date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Parse, validate and persist rider pages archived by `extract`
    Load {
        #[command(flatten)]
        classes: ClassArgs,

        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Load a season's events from the results API
    ApiEvents {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Load current riders from the results API
    ApiRiders {
        #[command(flatten)]
        classes: ClassArgs,
    },
    /// Print a current rider's career history from the results API as JSON
    RiderHistory {
        /// Full name, e.g. "Pedro Acosta"
        name: String,
    },
    /// Persist a batch previously written with `--output`
    Import {
        file: PathBuf,

        #[arg(long)]
        validate_only: bool,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("gp_import={},gp_importer={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &cli.command {
        Commands::Riders { classes } => {
            let pipeline = build_pipeline(&cli, true).await?;
            summarize(&pipeline.run_riders(&classes.selected()).await)
        }
        Commands::Calendar => {
            let pipeline = build_pipeline(&cli, true).await?;
            summarize(&[pipeline.run_calendar().await])
        }
        Commands::Extract { classes, date } => {
            let pipeline = build_pipeline(&cli, false).await?;
            let date = date.unwrap_or_else(today);
            summarize(&pipeline.extract_riders(&classes.selected(), date).await)
        }
        Commands::Load { classes, date } => {
            let pipeline = build_pipeline(&cli, true).await?;
            let date = date.unwrap_or_else(today);
            summarize(&pipeline.load_riders(&classes.selected(), date).await)
        }
        Commands::ApiEvents { year } => {
            let pipeline = build_pipeline(&cli, true).await?;
            let year = year.unwrap_or(pipeline.season());
            summarize(&[pipeline.run_api_events(year).await])
        }
        Commands::ApiRiders { classes } => {
            let pipeline = build_pipeline(&cli, true).await?;
            summarize(&pipeline.run_api_riders(&classes.selected()).await)
        }
        Commands::RiderHistory { name } => {
            let config = Config::from_env()?;
            let api = PulseliveClient::new(&config.site.api_url, config.fetch.timeout)?;
            let profile = api.rider_history(name).await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
            Ok(())
        }
        Commands::Import {
            file,
            validate_only,
        } => handle_import(file, *validate_only, cli.database_url.as_deref()).await,
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Loads configuration first so a missing credential fails before any I/O.
async fn build_pipeline(cli: &Cli, persist: bool) -> CliResult<Pipeline> {
    let config = Config::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let sink: Arc<dyn RecordSink> = if persist {
        build_sink(cli).await?
    } else {
        Arc::new(DiscardSink)
    };
    tracing::info!(sink = sink.name(), season = config.season, "pipeline ready");

    let archive = Arc::new(FsArchive::new(&cli.archive_dir));
    Ok(Pipeline::new(&config, sink)?.with_archive(archive))
}

async fn build_sink(cli: &Cli) -> CliResult<Arc<dyn RecordSink>> {
    if cli.dry_run {
        return Ok(Arc::new(DiscardSink));
    }
    if let Some(dir) = &cli.output {
        return Ok(Arc::new(JsonFileSink::new(dir)));
    }
    Ok(Arc::new(PostgresSink::new(connect(cli.database_url.as_deref()).await?)))
}

async fn connect(database_url: Option<&str>) -> CliResult<sqlx::PgPool> {
    let database_url = database_url
        .ok_or("DATABASE_URL is required unless --dry-run or --output is given")?;

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    Ok(pool)
}

fn summarize(reports: &[ClassReport]) -> CliResult<()> {
    let failed = reports.iter().filter(|r| !r.succeeded()).count();

    for report in reports {
        if report.succeeded() {
            tracing::info!(
                label = %report.label,
                records = report.records,
                written = report.written,
                missing = report.missing_urls.len(),
                "✓ {}",
                report.label
            );
        } else {
            tracing::error!(
                label = %report.label,
                failed_at = ?report.failed_at,
                "✗ {}: {}",
                report.label,
                report.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    tracing::info!(
        "Summary: {} succeeded, {} failed",
        reports.len() - failed,
        failed
    );

    if failed > 0 {
        return Err(format!("{} of {} class(es) failed", failed, reports.len()).into());
    }
    Ok(())
}

async fn handle_import(
    file: &Path,
    validate_only: bool,
    database_url: Option<&str>,
) -> CliResult<()> {
    tracing::info!("Loading batch from: {}", file.display());
    let batch = read_batch(file).await?;

    batch.records.validate()?;
    tracing::info!("✓ {} {} record(s) valid", batch.len(), batch.table);

    if validate_only {
        return Ok(());
    }

    let sink = PostgresSink::new(connect(database_url).await?);
    let written = sink.persist(&batch).await?;
    tracing::info!("✓ Imported {} row(s) into {}", written, batch.table);
    Ok(())
}
