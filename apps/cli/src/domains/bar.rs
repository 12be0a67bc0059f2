use mybar_core::{
	domain::{BarItemCategory, RemovedCocktail},
	Session,
};

use anyhow::Result;
use clap::Subcommand;

use super::print_notifications;
use crate::OutputFormat;

#[derive(Subcommand, Debug)]
pub enum BarCmd {
	/// List bar items
	List,
	/// Add an item, the category is guessed from the name when omitted
	Add {
		name: String,
		#[arg(long)]
		category: Option<BarItemCategory>,
	},
	/// Remove an item
	Remove { name: String },
	/// Mark a cocktail as favorite
	Favorite { cocktail_id: String },
	/// Unmark a favorite cocktail
	Unfavorite { cocktail_id: String },
	/// Hide a cocktail from the catalog
	Hide {
		cocktail_id: String,
		#[arg(long, default_value = "")]
		name: String,
		#[arg(long, default_value = "")]
		creator: String,
	},
	/// Make a hidden cocktail visible again
	Restore { cocktail_id: String },
}

pub async fn run(session: &Session, format: OutputFormat, cmd: BarCmd) -> Result<()> {
	match cmd {
		BarCmd::List => {
			let bar = session.current_bar().await?;
			match format {
				OutputFormat::Human => {
					if bar.items.is_empty() {
						println!("Bar is empty");
					}
					for item in &bar.items {
						println!("- {} ({})", item.name, item.category);
					}
				}
				OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&bar.items)?),
			}
		}
		BarCmd::Add { name, category } => {
			let item = session.add_bar_item(name, category).await?;
			println!("Added {} ({})", item.name, item.category);
		}
		BarCmd::Remove { name } => {
			session.delete_bar_item(&name).await?;
			println!("Removed {name}");
		}
		BarCmd::Favorite { cocktail_id } => {
			session.add_favorite(&cocktail_id).await?;
			println!("Added {cocktail_id} to favorites");
		}
		BarCmd::Unfavorite { cocktail_id } => {
			session.delete_favorite(&cocktail_id).await?;
			println!("Removed {cocktail_id} from favorites");
		}
		BarCmd::Hide {
			cocktail_id,
			name,
			creator,
		} => {
			session
				.hide_cocktail(RemovedCocktail::now(cocktail_id.clone(), name, creator))
				.await?;
			println!("Hid {cocktail_id}");
		}
		BarCmd::Restore { cocktail_id } => {
			session.restore_cocktail(&cocktail_id).await?;
			println!("Restored {cocktail_id}");
		}
	}

	print_notifications(session).await;

	Ok(())
}
