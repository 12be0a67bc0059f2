//! Merging the server's catalog into the local cache.

use crate::{
	actions::{ActionPayload, PendingActionKind},
	domain::Cocktail,
	notifications::Notifier,
	queue::ActionQueueService,
	services::CurrentBar,
	store::{Change, ChangeSet, ImageCache, LocalStore},
	Error,
};

use mybar_remote_api::{CocktailDto, RemoteApi};

use std::{
	collections::{HashMap, HashSet},
	sync::Arc,
};

use tracing::{debug, info, warn};
use uuid::Uuid;

/// What a reconciliation pass changed, for user feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
	/// Display names of newly cached cocktails
	pub added: Vec<String>,
	/// Display names of cocktails dropped because the server no longer has them
	pub removed: Vec<String>,
	pub updated: usize,
	/// Cocktails hidden by a tombstone in the current bar
	pub suppressed: usize,
}

impl ReconcileSummary {
	#[must_use]
	pub fn added_message(&self) -> Option<String> {
		(!self.added.is_empty()).then(|| format!("Cocktails added: {}", self.added.join(", ")))
	}

	#[must_use]
	pub fn removed_message(&self) -> Option<String> {
		(!self.removed.is_empty())
			.then(|| format!("Cocktails removed: {}", self.removed.join(", ")))
	}

	/// Toast text for the pass, `None` when nothing was added or removed.
	#[must_use]
	pub fn message(&self) -> Option<String> {
		match (self.removed_message(), self.added_message()) {
			(Some(removed), Some(added)) => Some(format!("{removed}\n{added}")),
			(removed, added) => removed.or(added),
		}
	}
}

/// Capitalises the first letter of every word and lowercases the rest.
#[must_use]
pub fn capitalize_words(name: &str) -> String {
	let mut at_word_start = true;

	name.chars()
		.flat_map(|c| {
			let mapped = if at_word_start {
				c.to_uppercase().collect::<Vec<_>>()
			} else {
				c.to_lowercase().collect::<Vec<_>>()
			};
			at_word_start = !c.is_alphanumeric();
			mapped
		})
		.collect()
}

/// Cocktail ids the pending action log still has an opinion about.
#[derive(Default)]
struct PendingCatalog {
	created: HashSet<Uuid>,
	edited: HashSet<Uuid>,
	deleted: HashSet<Uuid>,
}

#[derive(Clone)]
pub struct ReconciliationEngine {
	store: Arc<dyn LocalStore>,
	queue: ActionQueueService,
	remote: Arc<dyn RemoteApi>,
	images: ImageCache,
	current_bar: CurrentBar,
	notifier: Arc<Notifier>,
}

impl ReconciliationEngine {
	pub fn new(
		store: Arc<dyn LocalStore>,
		queue: ActionQueueService,
		remote: Arc<dyn RemoteApi>,
		images: ImageCache,
		current_bar: CurrentBar,
		notifier: Arc<Notifier>,
	) -> Self {
		Self {
			store,
			queue,
			remote,
			images,
			current_bar,
			notifier,
		}
	}

	/// Fetches `GET /cocktails` and reconciles the cache against it.
	pub async fn fetch_catalog(&self) -> Result<ReconcileSummary, Error> {
		let catalog = self.remote.fetch_cocktails().await?;

		debug!(count = catalog.len(), "Fetched cocktail catalog;");

		self.reconcile(&catalog).await
	}

	/// Merges an authoritative catalog snapshot into the cache in a single commit.
	///
	/// Stale favorites and tombstones of the current bar are pruned before anything else, so the
	/// tombstone check below only sees ids the server still knows about.
	pub async fn reconcile(&self, catalog: &[CocktailDto]) -> Result<ReconcileSummary, Error> {
		let authoritative = catalog.iter().map(|dto| dto.id).collect::<HashSet<_>>();

		let mut changes = ChangeSet::new();
		let mut summary = ReconcileSummary::default();

		let tombstones = match self.current_bar.load(&*self.store).await? {
			Some(mut bar) => {
				if bar.prune_missing(&authoritative) {
					debug!(bar_id = %bar.id, "Pruned stale favorites and tombstones;");
					changes.push(Change::PutBar(bar.clone()));
				}

				bar.removed
					.iter()
					.filter_map(|removed| Uuid::parse_str(&removed.id).ok())
					.collect::<HashSet<_>>()
			}
			None => HashSet::new(),
		};

		let pending = self.pending_catalog().await?;

		let local = self
			.store
			.fetch_cocktails(&|_: &Cocktail| true)
			.await?
			.into_iter()
			.map(|cocktail| (cocktail.id, cocktail))
			.collect::<HashMap<_, _>>();

		let mut gone = local
			.values()
			.filter(|cocktail| !authoritative.contains(&cocktail.id))
			.filter(|cocktail| !pending.created.contains(&cocktail.id))
			.collect::<Vec<_>>();
		gone.sort_by(|a, b| a.name.cmp(&b.name));

		for cocktail in gone {
			changes.push(Change::DeleteCocktail(cocktail.id));
			summary.removed.push(capitalize_words(&cocktail.name));
		}

		for dto in catalog {
			if tombstones.contains(&dto.id) {
				if local.contains_key(&dto.id) {
					changes.push(Change::DeleteCocktail(dto.id));
				}
				summary.suppressed += 1;
				continue;
			}

			if pending.deleted.contains(&dto.id) {
				continue;
			}

			match local.get(&dto.id) {
				Some(_) if pending.edited.contains(&dto.id) => {}
				Some(existing) => {
					let mut updated = existing.clone();
					updated.apply_remote(dto);
					self.resolve_image(&mut updated, dto).await;

					if updated != *existing {
						changes.push(Change::PutCocktail(updated));
						summary.updated += 1;
					}
				}
				None => {
					let mut cocktail = Cocktail::from(dto);
					self.resolve_image(&mut cocktail, dto).await;

					summary.added.push(capitalize_words(&cocktail.name));
					changes.push(Change::PutCocktail(cocktail));
				}
			}
		}

		self.store.commit(changes).await?;

		info!(
			added = summary.added.len(),
			updated = summary.updated,
			removed = summary.removed.len(),
			suppressed = summary.suppressed,
			"Reconciled cocktail catalog;",
		);

		if let Some(message) = summary.removed_message() {
			self.notifier.info(message).await;
		}
		if let Some(message) = summary.added_message() {
			self.notifier.info(message).await;
		}

		Ok(summary)
	}

	async fn pending_catalog(&self) -> Result<PendingCatalog, Error> {
		let mut pending = PendingCatalog::default();

		for action in self.queue.fetch_all().await? {
			let set = match action.kind {
				PendingActionKind::AddCocktail => &mut pending.created,
				PendingActionKind::EditCocktail => &mut pending.edited,
				PendingActionKind::DeleteCocktail => &mut pending.deleted,
				_ => continue,
			};

			match action.decode() {
				Ok(ActionPayload::AddCocktail(dto) | ActionPayload::EditCocktail(dto)) => {
					set.insert(dto.id);
				}
				Ok(ActionPayload::DeleteCocktail(id)) => {
					set.insert(id);
				}
				// poison entries are reported when drained
				_ => {}
			}
		}

		Ok(pending)
	}

	/// Downloads a changed image reference into the image cache, otherwise falls back to
	/// whatever the disk cache already holds.
	///
	/// Download and cache write failures keep the previous image and are retried on the next
	/// pass. Image bytes never enter the store.
	async fn resolve_image(&self, cocktail: &mut Cocktail, dto: &CocktailDto) {
		let Some(reference) = dto.image_url.as_deref() else {
			cocktail.has_image = match self.images.contains(cocktail.id).await {
				Ok(cached) => cached,
				Err(e) => {
					warn!(cocktail_id = %cocktail.id, ?e, "Failed to read cached image;");
					false
				}
			};
			cocktail.image_url = None;
			return;
		};

		if cocktail.image_url.as_deref() == Some(reference) {
			return;
		}

		match self.remote.fetch_image(reference).await {
			Ok(bytes) => match self.images.store(cocktail.id, &bytes).await {
				Ok(()) => {
					cocktail.has_image = true;
					cocktail.image_url = Some(reference.to_string());
				}
				Err(e) => {
					warn!(cocktail_id = %cocktail.id, ?e, "Failed to cache image on disk;");
				}
			},
			Err(e) => {
				warn!(
					cocktail_id = %cocktail.id,
					%reference,
					?e,
					"Failed to download cocktail image;",
				);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn names_are_capitalized_word_by_word() {
		assert_eq!(capitalize_words("paper plane"), "Paper Plane");
		assert_eq!(capitalize_words("NEGRONI sbagliato"), "Negroni Sbagliato");
		assert_eq!(capitalize_words("mai-tai"), "Mai-Tai");
		assert_eq!(capitalize_words(""), "");
	}

	#[test]
	fn summary_message_lists_removals_then_additions() {
		let mut summary = ReconcileSummary::default();
		assert_eq!(summary.message(), None);

		summary.added = vec!["Daiquiri".into(), "Negroni".into()];
		assert_eq!(
			summary.message().as_deref(),
			Some("Cocktails added: Daiquiri, Negroni")
		);

		summary.removed = vec!["Zombie".into()];
		assert_eq!(
			summary.message().as_deref(),
			Some("Cocktails removed: Zombie\nCocktails added: Daiquiri, Negroni")
		);
	}
}
