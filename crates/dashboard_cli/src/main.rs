//! Dashboard command-line front end.
//!
//! # Responsibility
//! - Load `CoreConfig`, start logging and open the configured database.
//! - Expose list/export/import over the core service.

mod cli;

use chrono::Local;
use clap::Parser;
use cli::{Cli, Commands};
use dashboard_core::{
    group_links, init_logging_from_config, partition_groups, CoreConfig, DashboardRepository,
    DashboardService, ImportFormat, MergeMode, Settings,
};
use log::{error, info};
use std::collections::HashSet;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let mut config = match &cli.config {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    init_logging_from_config(&config)?;

    // The database is opened by the first store call, so `ping` never touches it.
    let service = DashboardService::new(DashboardRepository::open(&config.db_path));
    match cli.command {
        Commands::Ping => {
            println!("dashboard_core ping={}", dashboard_core::ping());
            println!("dashboard_core version={}", dashboard_core::core_version());
            Ok(())
        }
        Commands::List { collapsed } => list(&service, collapsed).await,
        Commands::Export { out_dir } => export(&service, &config, &out_dir).await,
        Commands::Import { file, format, mode } => import(&service, &file, format, mode).await,
    }
}

async fn list(service: &DashboardService, collapsed: Vec<String>) -> CliResult<()> {
    let snapshot = service.load_all().await?;
    let collapsed: HashSet<String> = collapsed.into_iter().collect();
    let partition = partition_groups(
        group_links(&snapshot.links, &snapshot.categories),
        &collapsed,
    );

    for group in &partition.expanded {
        println!("[{}] ({})", group.name, group.links.len());
        for link in &group.links {
            println!("  {}  {}", link.title, link.url);
        }
    }
    for group in &partition.collapsed {
        println!("[{}] ({}, collapsed)", group.name, group.links.len());
    }

    if !snapshot.notes.is_empty() {
        println!("notes:");
        for note in &snapshot.notes {
            println!("  {}", note.title);
        }
    }

    let upcoming = service.upcoming_events(Local::now().date_naive()).await?;
    if !upcoming.is_empty() {
        println!("upcoming:");
        for event in &upcoming {
            let time = event
                .time
                .map(|time| time.format(" %H:%M").to_string())
                .unwrap_or_default();
            println!("  {}{}  {}", event.date, time, event.title);
        }
    }
    Ok(())
}

async fn export(service: &DashboardService, config: &CoreConfig, out_dir: &Path) -> CliResult<()> {
    let document = service.export_snapshot(None).await?;
    let path: PathBuf = out_dir.join(config.backup_file_name(Local::now().date_naive()));
    std::fs::create_dir_all(out_dir)?;
    std::fs::write(&path, document.to_json_pretty()?)?;

    info!("event=cli_export module=cli status=ok");
    println!("exported {}", path.display());
    Ok(())
}

async fn import(
    service: &DashboardService,
    file: &Path,
    format: ImportFormat,
    mode: MergeMode,
) -> CliResult<()> {
    let raw = std::fs::read_to_string(file)?;
    let report = service
        .importer()
        .import_document(&raw, format, mode, &Settings::default())
        .await?;

    println!(
        "imported links={} notes={} events={} categories={} skipped={}",
        report.links, report.notes, report.events, report.categories, report.skipped
    );
    if let Some(settings) = report.settings {
        println!(
            "settings: accent={:?} background={:?} search={}",
            settings.accent_color, settings.background_name, settings.show_search
        );
    }
    Ok(())
}
