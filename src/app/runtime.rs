use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use datfetch_core::archive::{build_remote_index, select_catalog, select_collection};
use datfetch_core::catalog::DEFAULT_POSTFIXES;
use datfetch_core::{
    ArchiveBrowser, Console, HttpClient, ResumableDownloader, RunContext, RunCoordinator,
    Severity, TransferReporter, load_manifest,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ProcessExit;
use crate::app::{config, exit_handler, output, settings, terminal};
use crate::cli::Args;

pub(crate) async fn run_datfetch() -> Result<ProcessExit> {
    let args = Args::parse();
    let file_config = config::load_default_file_config()?;
    let settings = settings::resolve_settings(args, file_config.as_ref())?;

    let no_color = terminal::is_no_color_requested(settings.no_color);
    terminal::init_tracing(
        settings::resolve_default_log_level(settings.verbose, settings.quiet),
        no_color,
    );
    debug!(?settings, "settings resolved");
    info!("datfetch starting");

    validate_inputs(&settings.input, &settings.output_dir, settings.list_only)?;

    let reporter = Arc::new(
        TransferReporter::new(!no_color, terminal::progress_enabled(settings.quiet))
            .with_lines_to_stderr(settings.json),
    );
    let console: Arc<dyn Console> = reporter.clone();

    console.report("Opening input DAT file...", Severity::Info, false);
    let manifest = load_manifest(&settings.input, DEFAULT_POSTFIXES)
        .with_context(|| format!("Failed to load DAT file '{}'", settings.input.display()))?;
    match &manifest.catalog {
        Some(catalog) => console.report(
            &format!("Processing {catalog}: {}...", manifest.system),
            Severity::Info,
            false,
        ),
        None => console.report(
            &format!("Processing {}...", manifest.system),
            Severity::Info,
            false,
        ),
    }

    let client = HttpClient::with_timeouts(settings.connect_timeout, settings.read_timeout)?;
    let browser = ArchiveBrowser::new(client.clone(), &settings.base_url)?;

    let root = browser.list(&[]).await?;
    let catalog = select_catalog(
        console.as_ref(),
        &root,
        manifest.catalog.as_deref(),
        settings.choose_catalog,
    )?
    .clone();
    console.report(&format!("Catalog: {}", catalog.title), Severity::Info, false);

    let catalog_listing = browser.list(&[catalog.href.as_str()]).await?;
    let collection = select_collection(
        console.as_ref(),
        &catalog_listing,
        &manifest.system,
        settings.choose_system,
    )?
    .clone();
    console.report(&format!("Collection: {}", collection.title), Severity::Info, false);

    let segments = [catalog.href.as_str(), collection.href.as_str()];
    let listing = browser.list(&segments).await?;
    let index = build_remote_index(browser.base_url(), &segments, &listing);

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone(), Arc::clone(&console));

    let ctx = RunContext::new(&settings.output_dir)
        .with_list_only(settings.list_only)
        .with_cancel_token(cancel);
    let downloader =
        ResumableDownloader::new(client, settings.retry.clone()).with_reporter(reporter);
    let coordinator = RunCoordinator::new(downloader, Arc::clone(&console));

    let matched = coordinator.reconcile(&manifest.wanted, &index);
    let mut summary = coordinator.execute(&ctx, &matched).await;
    summary.system = manifest.system;
    summary.catalog = Some(catalog.title);
    summary.collection = Some(collection.title);

    output::report_completion(console.as_ref(), &summary);
    if settings.json {
        output::print_summary_json(&summary)?;
    }

    if summary.interrupted {
        warn!(
            completed = summary.completed(),
            found = summary.found,
            "Interrupted. Run again to resume."
        );
    }
    Ok(exit_handler::exit_for_summary(&summary))
}

fn validate_inputs(input: &Path, output_dir: &Path, list_only: bool) -> Result<()> {
    if !input.is_file() {
        bail!("Invalid input DAT file: '{}' is not a file", input.display());
    }
    if !list_only && !output_dir.is_dir() {
        bail!(
            "Invalid output directory: '{}' does not exist or is not a directory",
            output_dir.display()
        );
    }
    Ok(())
}

/// Cancels the run on the first Ctrl-C; a second one exits immediately.
fn spawn_interrupt_handler(cancel: CancellationToken, console: Arc<dyn Console>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        console.report(
            "Interrupt received, stopping after the current chunk",
            Severity::Error,
            false,
        );
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(ProcessExit::Failure.code().into());
        }
    });
}
