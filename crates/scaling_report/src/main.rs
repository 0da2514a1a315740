use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use scaling_report::errors::ReportResult;
use scaling_report::raw_table::RawTable;
use scaling_report::sink::{ArtifactSink, FileArtifactSink};
use scaling_report::summary::ReportSummary;
use scaling_report::trace_util::{configure_tracing, DEFAULT_LEVEL};
use scaling_report::{run_pipeline, BenchmarkShape, MetricSchema};
use scaling_report_config::{ConfigOverrides, ReportConfig};
use tracing::level_filters::LevelFilter;
use tracing::{error, info};

/// Aggregates scaling benchmark runs and renders charts.
#[derive(Debug, Parser)]
#[clap(name = "scaling-report", version)]
struct CliArgs {
    #[clap(flatten)]
    global_options: GlobalOptions,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum OutputFormat {
    /// A short summary table.
    Table,
    /// The full report.
    Json,
}

#[derive(Debug, Args)]
struct GlobalOptions {
    /// Default log level; `RUST_LOG` takes precedence.
    #[clap(long, global = true, default_value_t = DEFAULT_LEVEL)]
    log_level: LevelFilter,
    /// What to print on stdout once the artifacts are written.
    #[clap(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct ReportArgs {
    /// Benchmark summary CSV, one row per run.
    #[clap(short, long)]
    input: PathBuf,
    /// Directory receiving the charts and the aggregated table.
    #[clap(short, long)]
    outdir: Option<PathBuf>,
    /// Base title of the charts.
    #[clap(long)]
    title: Option<String>,
    #[clap(long)]
    dpi: Option<u32>,
    /// Logarithmic scale for elapsed time and latency axes.
    #[clap(long)]
    logy: bool,
    /// JSON file with report settings. Explicit flags override its values.
    #[clap(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report on index build runs grouped by thread count.
    Build(ReportArgs),
    /// Report on search load runs grouped by client count.
    Search(ReportArgs),
}

fn run(shape: BenchmarkShape, args: ReportArgs, format: OutputFormat) -> ReportResult<()> {
    let ReportArgs { input, outdir, title, dpi, logy, config } = args;
    let config = ReportConfig::load(
        config.as_deref(),
        ConfigOverrides { output_dir: outdir, title, dpi, log_scale: logy },
    )?;

    let table = RawTable::from_path(&input)?;
    let report = run_pipeline(&table, &MetricSchema::for_shape(shape))?;
    let artifacts = FileArtifactSink::new(config).consume(&report)?;
    info!("Produced {} artifacts.", artifacts.len());

    match format {
        OutputFormat::Table => print!("{}", ReportSummary(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    configure_tracing(args.global_options.log_level);
    info!("Starting scaling report with args: {:?}", args);

    let (shape, report_args) = match args.command {
        Command::Build(report_args) => (BenchmarkShape::Build, report_args),
        Command::Search(report_args) => (BenchmarkShape::Search, report_args),
    };
    match run(shape, report_args, args.global_options.format) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
