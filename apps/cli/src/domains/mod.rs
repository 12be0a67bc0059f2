pub mod bar;
pub mod cocktail;
pub mod sync;

use mybar_core::{notifications::Notification, Session};

use anyhow::Result;
use serde_json::json;

use crate::OutputFormat;

pub async fn status(session: &Session, format: OutputFormat) -> Result<()> {
	let bar = session.current_bar().await?;
	let counts = session.pending_counts().await?;

	match format {
		OutputFormat::Human => {
			match bar.owner {
				Some(user_id) => println!("Bar {} of user {user_id}", bar.id),
				None => println!("Guest bar {}", bar.id),
			}
			println!(
				"  {} items, {} favorites, {} hidden cocktails",
				bar.items.len(),
				bar.favorites.len(),
				bar.removed.len()
			);

			let total = counts.values().sum::<usize>();
			if total == 0 {
				println!("No pending actions");
			} else {
				println!("{total} pending actions:");
				for (kind, count) in counts.iter().filter(|(_, count)| **count > 0) {
					println!("  {kind}: {count}");
				}
			}
		}
		OutputFormat::Json => println!(
			"{}",
			serde_json::to_string_pretty(&json!({
				"bar": bar,
				"pending": counts,
			}))?
		),
	}

	Ok(())
}

/// Prints whatever the session queued for the user during the command.
pub async fn print_notifications(session: &Session) {
	for Notification { kind, message, .. } in session.notifier().get_notifications().await {
		eprintln!("[{kind:?}] {message}");
	}
}
