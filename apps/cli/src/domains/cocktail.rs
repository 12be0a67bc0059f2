use mybar_core::Session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use super::print_notifications;
use crate::OutputFormat;

#[derive(Subcommand, Debug)]
pub enum CocktailCmd {
	/// List cached cocktails, hidden ones excluded
	List,
	/// Delete a cocktail from the catalog
	Delete { cocktail_id: Uuid },
	/// Write the cached image of a cocktail to a file
	Image { cocktail_id: Uuid, output: PathBuf },
}

pub async fn run(session: &Session, format: OutputFormat, cmd: CocktailCmd) -> Result<()> {
	match cmd {
		CocktailCmd::List => {
			let cocktails = session.cocktails().await?;
			match format {
				OutputFormat::Human => {
					if cocktails.is_empty() {
						println!("No cocktails cached, run `mybar sync fetch` first");
					}
					for cocktail in &cocktails {
						println!(
							"- {} {} by {} [{}, {}]",
							cocktail.id, cocktail.name, cocktail.creator, cocktail.style,
							cocktail.category
						);
					}
				}
				OutputFormat::Json => {
					// image bytes are left out
					let listed = cocktails
						.iter()
						.map(|cocktail| {
							json!({
								"id": cocktail.id,
								"name": cocktail.name,
								"creator": cocktail.creator,
								"style": cocktail.style,
								"category": cocktail.category,
								"ingredients": cocktail.ingredients,
								"hasImage": cocktail.has_image,
							})
						})
						.collect::<Vec<_>>();
					println!("{}", serde_json::to_string_pretty(&listed)?);
				}
			}
		}
		CocktailCmd::Delete { cocktail_id } => {
			session.delete_cocktail(cocktail_id).await?;
			println!("Deleted {cocktail_id}");
		}
		CocktailCmd::Image {
			cocktail_id,
			output,
		} => {
			let Some(bytes) = session.cocktail_image(cocktail_id).await? else {
				anyhow::bail!("no cached image for {cocktail_id}");
			};

			std::fs::write(&output, &bytes)
				.with_context(|| format!("failed to write {}", output.display()))?;
			println!("Wrote {} bytes to {}", bytes.len(), output.display());
		}
	}

	print_notifications(session).await;

	Ok(())
}
