use mybar_remote_api::{BarItemDto, MyBarDto, RemovedCocktailDto};

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use super::categorize::categorize;

/// A user's inventory, favorites and hidden cocktails.
///
/// There is one bar per signed in user plus a single guest bar (`owner == None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalBar {
	pub id: Uuid,
	pub owner: Option<Uuid>,
	pub items: Vec<BarItem>,
	/// String encoded cocktail ids, kept free of duplicates
	pub favorites: Vec<String>,
	/// Tombstones of cocktails this user chose to hide
	pub removed: Vec<RemovedCocktail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarItem {
	pub name: String,
	pub category: BarItemCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedCocktail {
	pub id: String,
	pub name: String,
	pub creator: String,
	pub removed_at: DateTime<Utc>,
}

#[derive(
	Debug,
	Default,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	Serialize,
	Deserialize,
	Display,
	EnumString,
	AsRefStr,
	EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BarItemCategory {
	Liquor,
	Juice,
	Bitter,
	Mixer,
	Sweetener,
	#[default]
	Other,
}

impl BarItemCategory {
	#[must_use]
	pub const fn priority(self) -> u8 {
		match self {
			Self::Liquor => 5,
			Self::Juice | Self::Sweetener => 3,
			Self::Bitter => 2,
			Self::Mixer => 1,
			Self::Other => 0,
		}
	}
}

/// Compares cocktail ids the way the server does, ignoring the case differences between
/// uuid renderings.
fn same_cocktail_id(a: &str, b: &str) -> bool {
	match (Uuid::parse_str(a), Uuid::parse_str(b)) {
		(Ok(a), Ok(b)) => a == b,
		_ => a == b,
	}
}

fn is_known(id: &str, known: &HashSet<Uuid>) -> bool {
	Uuid::parse_str(id).is_ok_and(|id| known.contains(&id))
}

impl PersonalBar {
	#[must_use]
	pub fn guest() -> Self {
		Self::with_owner(None)
	}

	#[must_use]
	pub fn for_user(user_id: Uuid) -> Self {
		Self::with_owner(Some(user_id))
	}

	fn with_owner(owner: Option<Uuid>) -> Self {
		Self {
			id: Uuid::new_v4(),
			owner,
			items: vec![],
			favorites: vec![],
			removed: vec![],
		}
	}

	#[must_use]
	pub const fn is_guest(&self) -> bool {
		self.owner.is_none()
	}

	pub fn add_item(&mut self, item: BarItem) {
		self.items.push(item);
	}

	/// Removes the first item with this name, returns whether anything was removed.
	///
	/// Duplicates are allowed, so a single delete only takes one of them out.
	pub fn remove_item(&mut self, name: &str) -> bool {
		self.items
			.iter()
			.position(|item| item.name == name)
			.map(|idx| self.items.remove(idx))
			.is_some()
	}

	/// Returns `false` if the cocktail was already a favorite.
	pub fn add_favorite(&mut self, cocktail_id: &str) -> bool {
		if self.is_favorite(cocktail_id) {
			return false;
		}

		self.favorites.push(cocktail_id.to_string());
		true
	}

	pub fn remove_favorite(&mut self, cocktail_id: &str) -> bool {
		let before = self.favorites.len();
		self.favorites
			.retain(|favorite| !same_cocktail_id(favorite, cocktail_id));
		before != self.favorites.len()
	}

	#[must_use]
	pub fn is_favorite(&self, cocktail_id: &str) -> bool {
		self.favorites
			.iter()
			.any(|favorite| same_cocktail_id(favorite, cocktail_id))
	}

	/// Records a tombstone, replacing an older one for the same cocktail.
	pub fn add_removed(&mut self, removed: RemovedCocktail) {
		self.restore(&removed.id);
		self.removed.push(removed);
	}

	/// Drops the tombstone for a cocktail, making it visible again.
	pub fn restore(&mut self, cocktail_id: &str) -> Option<RemovedCocktail> {
		let index = self
			.removed
			.iter()
			.position(|removed| same_cocktail_id(&removed.id, cocktail_id))?;

		Some(self.removed.remove(index))
	}

	#[must_use]
	pub fn is_removed(&self, cocktail_id: Uuid) -> bool {
		self.removed
			.iter()
			.any(|removed| Uuid::parse_str(&removed.id).is_ok_and(|id| id == cocktail_id))
	}

	/// Drops favorites and tombstones that reference cocktails outside `known`.
	///
	/// Returns whether anything was pruned.
	pub fn prune_missing(&mut self, known: &HashSet<Uuid>) -> bool {
		let before = (self.favorites.len(), self.removed.len());

		self.favorites.retain(|favorite| is_known(favorite, known));
		self.removed.retain(|removed| is_known(&removed.id, known));

		before != (self.favorites.len(), self.removed.len())
	}

	/// Replaces the contents with the server's copy, keeping local identity.
	pub fn apply_remote(&mut self, dto: &MyBarDto) {
		self.owner = Some(dto.user_id);
		self.items = dto.bar_items.iter().map(BarItem::from).collect();
		self.favorites.clear();
		for favorite in &dto.favorite_cocktails {
			self.add_favorite(favorite);
		}
		self.removed = dto.deleted_cocktails.iter().map(RemovedCocktail::from).collect();
	}
}

impl BarItem {
	/// Builds an item, guessing the category from the name when none is given.
	pub fn new(name: impl Into<String>, category: Option<BarItemCategory>) -> Self {
		let name = name.into();
		let category = category.unwrap_or_else(|| categorize(&name));

		Self { name, category }
	}
}

impl RemovedCocktail {
	pub fn now(id: impl Into<String>, name: impl Into<String>, creator: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			creator: creator.into(),
			removed_at: Utc::now(),
		}
	}
}

impl From<&BarItemDto> for BarItem {
	fn from(dto: &BarItemDto) -> Self {
		Self {
			name: dto.name.clone(),
			category: dto.category.parse().unwrap_or_default(),
		}
	}
}

impl From<&BarItem> for BarItemDto {
	fn from(item: &BarItem) -> Self {
		Self {
			name: item.name.clone(),
			category: item.category.to_string(),
		}
	}
}

impl From<&RemovedCocktailDto> for RemovedCocktail {
	fn from(dto: &RemovedCocktailDto) -> Self {
		Self {
			id: dto.id.clone(),
			name: dto.name.clone(),
			creator: dto.creator.clone(),
			removed_at: dto.date,
		}
	}
}

impl From<&RemovedCocktail> for RemovedCocktailDto {
	fn from(removed: &RemovedCocktail) -> Self {
		Self {
			id: removed.id.clone(),
			name: removed.name.clone(),
			creator: removed.creator.clone(),
			date: removed.removed_at,
		}
	}
}
