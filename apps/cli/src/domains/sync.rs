use mybar_core::{config::AppConfig, sync::SyncActor, Session};

use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use tracing::info;

use super::print_notifications;
use crate::OutputFormat;

#[derive(Subcommand, Debug)]
pub enum SyncCmd {
	/// Send every pending action once
	Push,
	/// Fetch the catalog and reconcile the local cache
	Fetch,
	/// Keep syncing in the background until interrupted
	Run,
}

pub async fn run(
	session: &Arc<Session>,
	config: &AppConfig,
	format: OutputFormat,
	cmd: SyncCmd,
) -> Result<()> {
	match cmd {
		SyncCmd::Push => {
			let report = session.sync_all().await;

			match format {
				OutputFormat::Human => {
					println!("Sent {} actions, skipped {}", report.sent(), report.skipped());
					for (kind, e) in report.failures() {
						println!("  {kind} failed: {e}");
					}
				}
				OutputFormat::Json => {
					let failures = report
						.failures()
						.map(|(kind, e)| (kind, e.to_string()))
						.collect::<Vec<_>>();
					println!(
						"{}",
						serde_json::to_string_pretty(&serde_json::json!({
							"sent": report.sent(),
							"skipped": report.skipped(),
							"failures": failures,
						}))?
					);
				}
			}

			if !report.is_success() {
				anyhow::bail!("some pending actions could not be sent");
			}
		}
		SyncCmd::Fetch => {
			let summary = session.fetch_catalog().await?;

			match format {
				OutputFormat::Human => println!(
					"{} added, {} updated, {} removed, {} hidden",
					summary.added.len(),
					summary.updated,
					summary.removed.len(),
					summary.suppressed
				),
				OutputFormat::Json => println!(
					"{}",
					serde_json::to_string_pretty(&serde_json::json!({
						"added": summary.added,
						"removed": summary.removed,
						"updated": summary.updated,
						"suppressed": summary.suppressed,
					}))?
				),
			}

			print_notifications(session).await;
		}
		SyncCmd::Run => {
			let actor = SyncActor::new(Arc::clone(session), config.sync_interval());
			let cancel = actor.cancellation_token();
			let handle = actor.spawn();

			let mut notifications = session.notifier().subscribe();
			let printer = tokio::spawn(async move {
				while let Ok(notification) = notifications.recv().await {
					eprintln!("[{:?}] {}", notification.kind, notification.message);
				}
			});

			tokio::signal::ctrl_c().await?;
			info!("Interrupted, stopping;");

			cancel.cancel();
			handle.await?;
			printer.abort();
		}
	}

	Ok(())
}
