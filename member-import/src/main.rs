//! member-import binary
//!
//! Reconciles a legacy member CSV export against the remote directory.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use dotenv::dotenv;

use directory_client::{Directory, DirectoryClient};
use member_import::{Config, DirectorySnapshot, Importer, conflict, ingest, logger, sanitize, validate};
use shared::NormalizedMember;

#[derive(Parser, Debug)]
#[command(about = "Import legacy member records into the member directory")]
struct Args {
    /// Path to the legacy CSV export
    csv: PathBuf,

    /// Run the full decision logic without issuing any remote mutation
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    logger::init_logger();

    let args = Args::parse();
    let config = Config::from_env()?;

    if args.dry_run {
        tracing::info!("Dry run: no remote mutations will be issued");
    }

    let rows = ingest::read_rows(&args.csv)?;
    let today = Utc::now().date_naive();
    let mut members: Vec<NormalizedMember> = rows
        .iter()
        .map(|row| NormalizedMember::from_row(row, today))
        .collect();

    sanitize::sanitize_members(&mut members);
    conflict::resolve_email_conflicts(&mut members);
    validate::validate_members(&members);

    let client = DirectoryClient::new(
        config.endpoint.clone(),
        config.token,
        config.register_password,
    )?;

    tracing::info!(endpoint = %config.endpoint, "Fetching directory snapshot");
    let users = client.fetch_all_users().await?;
    let breeders = client.fetch_all_breeders().await?;
    let snapshot = DirectorySnapshot::new(users, breeders);
    tracing::info!(
        users = snapshot.user_count(),
        breeders = snapshot.breeder_count(),
        "Snapshot loaded"
    );

    let summary = Importer::new(&client, snapshot, args.dry_run)
        .run(&members)
        .await;

    tracing::info!(
        total = summary.total,
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        rejected = summary.rejected,
        failed = summary.failed,
        conflicts_blocked = summary.conflicts_blocked,
        breeders_created = summary.breeders_created,
        breeders_updated = summary.breeders_updated,
        "Import finished"
    );

    Ok(())
}
