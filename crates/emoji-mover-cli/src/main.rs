use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use emoji_mover_cli::Config;
use emoji_mover_client::{HttpBrowser, HttpImageSource, SlackApiClient};
use emoji_mover_core::session::{scan_existing, sign_in};
use emoji_mover_core::{
    load_exclusions, load_settings, reconcile, upload_all, AppError, ImageFetcher, MigrationStats,
    Pacer, SLACK_UI,
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::parse();

    if let Err(e) = init_logging(&config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&config).await {
        error!("{:#}", e);
        match e.downcast_ref::<AppError>() {
            Some(app_err) => eprintln!("Error: {}", app_err.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

/// Sends all log output to the append-only log file.
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("Could not open log file {}", config.log_file.display()))?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;
    Ok(())
}

/// Runs the whole migration: settings, inventory, sign-in and scan,
/// reconciliation, downloads, uploads.
async fn run(config: &Config) -> anyhow::Result<()> {
    info!("Reading {}...", config.config.display());
    let settings = load_settings(&config.config)?;

    info!("Reading {}...", config.exclusions.display());
    let exclusions = load_exclusions(&config.exclusions)?;
    info!("{} default emoji excluded", exclusions.len());

    let api = SlackApiClient::new(&config.api_base)?;
    let inventory = api.fetch_inventory(&settings.api_token).await?;

    let ui = SLACK_UI;
    let mut browser = HttpBrowser::new()?;
    sign_in(
        &mut browser,
        &ui,
        &settings.workspace_url,
        &settings.email,
        &settings.password,
    )
    .await?;
    let existing = scan_existing(
        &mut browser,
        &ui,
        &settings.workspace_url,
        config.scan_mode(),
    )
    .await?;

    let (work, summary) = reconcile(&inventory, &exclusions, &existing);
    info!(
        "{} emoji to migrate ({} default, {} already present, {} alias or empty skipped)",
        work.len(),
        summary.excluded,
        summary.existing,
        summary.unmigratable
    );

    if config.dry_run {
        let mut names: Vec<&str> = work.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        for name in &names {
            info!("Would migrate {}", name);
            println!("{}", name);
        }
        println!("\n{} emoji would be migrated (dry run)", names.len());
        return Ok(());
    }

    let pacing = config.pacing();

    std::fs::create_dir_all(&config.download_dir).with_context(|| {
        format!(
            "Could not create download directory {}",
            config.download_dir.display()
        )
    })?;
    info!("Downloading emoji images...");
    let fetcher = ImageFetcher::new(HttpImageSource::new()?, &config.download_dir);
    let downloads = fetcher
        .download_all(&work, &Pacer::new(pacing.download_delay))
        .await;

    let uploads = upload_all(
        &mut browser,
        &ui,
        &settings.workspace_url,
        &downloads.downloaded,
        &Pacer::new(pacing.upload_delay),
    )
    .await?;

    let stats = MigrationStats {
        uploaded: uploads.stats.uploaded,
        upload_failed: uploads.stats.upload_failed,
        ..downloads.stats
    };
    info!(
        "Migration complete: {} uploaded, {} failed out of {} emoji",
        stats.uploaded,
        stats.failed(),
        work.len()
    );
    print_summary(&stats, work.len());

    Ok(())
}

fn print_summary(stats: &MigrationStats, total: usize) {
    println!("\nEmoji migration summary\n");
    println!("  To migrate:            {}", total);
    println!("  Already downloaded:    {}", stats.already_present);
    println!("  Newly downloaded:      {}", stats.downloaded);
    println!("  Download failures:     {}", stats.download_failed);
    println!("  Uploaded:              {}", stats.uploaded);
    println!("  Upload failures:       {}", stats.upload_failed);
    println!();
}
