mod cli;

use clap::Parser;
use cli::Args;
use owo_colors::OwoColorize;
use std::path::Path;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vuln_impact::adapters::outbound::console::StderrProgressReporter;
use vuln_impact::adapters::outbound::filesystem::{
    FileSystemRecordsReader, FileSystemWriter, StdoutPresenter,
};
use vuln_impact::adapters::outbound::memory::{InMemoryGraphStore, TimeoutGraphStore};
use vuln_impact::application::dto::{AnalysisReport, AnalysisRequest};
use vuln_impact::application::use_cases::{AnalyzeScanUseCase, CancellationSignal};
use vuln_impact::config::{self, ConfigFile, EngineConfig};
use vuln_impact::ports::outbound::ReportPresenter;
use vuln_impact::shared::error::ExitCode;
use vuln_impact::shared::Result;

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::InvalidArguments
            } else {
                ExitCode::Success
            };
            let _ = e.print();
            process::exit(code.as_i32());
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(code) => process::exit(code.as_i32()),
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }

            eprintln!();
            process::exit(ExitCode::ApplicationError.as_i32());
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config_file = load_config(&args)?;
    let engine = EngineConfig::from_file(config_file.as_ref())?
        .with_overrides(args.max_depth, args.fail_on);
    tracing::debug!(?engine, "Resolved engine configuration");

    // Create adapters (Dependency Injection)
    let store = Arc::new(TimeoutGraphStore::new(
        InMemoryGraphStore::new(),
        engine.store_timeout,
    ));
    let cancellation = CancellationSignal::new();
    spawn_interrupt_handler(cancellation.clone());

    let use_case = AnalyzeScanUseCase::new(
        FileSystemRecordsReader::new(),
        StderrProgressReporter::new(),
        store,
    )
    .with_cancellation(cancellation);

    let request = AnalysisRequest::new(args.input.clone())
        .with_seeds(args.seeds())
        .with_max_depth(engine.max_depth)
        .with_fail_on_severity(engine.fail_on_severity)
        .with_breadth_weight(engine.breadth_weight)
        .with_max_concurrency(engine.max_concurrency);

    let report = use_case.execute(request).await?;

    let presenter: Box<dyn ReportPresenter> = match args.output {
        Some(ref output_path) => Box::new(FileSystemWriter::new(output_path.clone())),
        None => Box::new(StdoutPresenter::new()),
    };
    presenter.present(&report)?;

    print_summary(&report);

    Ok(if report.exceeds_threshold() {
        ExitCode::VulnerabilitiesDetected
    } else {
        ExitCode::Success
    })
}

fn load_config(args: &Args) -> Result<Option<ConfigFile>> {
    if let Some(ref path) = args.config {
        return config::load_config_from_path(path).map(Some);
    }

    let dir = args
        .input
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    config::discover_config(dir)
}

/// Ctrl-C stops the running traversal at the next level boundary
fn spawn_interrupt_handler(cancellation: CancellationSignal) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping traversal at the next level");
            cancellation.cancel();
        }
    });
}

fn print_summary(report: &AnalysisReport) {
    let files: usize = report.impacts.iter().map(|i| i.files.len()).sum();
    eprintln!();
    eprintln!(
        "📊 {} vulnerable package(s), {} impacted file reference(s), {} unresolved seed(s)",
        report.risks.len(),
        files,
        report.unresolved_seeds.len()
    );

    if report.annotation.total_rejected() > 0 || report.annotation.total_unparseable() > 0 {
        eprintln!(
            "{}",
            format!(
                "⚠️  {} rejected record(s), {} unparseable version(s)",
                report.annotation.total_rejected(),
                report.annotation.total_unparseable()
            )
            .yellow()
        );
    }
    if report.truncated_impacts() > 0 {
        eprintln!(
            "{}",
            format!("⚠️  {} impact set(s) truncated", report.truncated_impacts()).yellow()
        );
    }

    let failing = report.failing_vulnerability_count();
    if failing > 0 {
        eprintln!(
            "{}",
            format!(
                "❌ {} vulnerability(ies) at or above {}",
                failing, report.fail_on_severity
            )
            .red()
            .bold()
        );
    } else {
        eprintln!(
            "{}",
            format!("✅ Nothing at or above {}", report.fail_on_severity).green()
        );
    }
}
