//! Persistent local state: pending actions, cached cocktails and personal bars.

mod file;
mod images;

pub use file::FileStore;
pub use images::ImageCache;

use crate::{
	actions::PendingAction,
	domain::{Cocktail, PersonalBar},
};

use mybar_utils::error::FileIOError;

use async_trait::async_trait;
use uuid::Uuid;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
	#[error(transparent)]
	FileIO(#[from] FileIOError),
	#[error("failed to serialize store: {0}")]
	Serialization(#[from] rmp_serde::encode::Error),
	#[error("failed to deserialize store: {0}")]
	Deserialization(#[from] rmp_serde::decode::Error),
	#[error("store was written by a newer version (v{found}, expected at most v{supported})")]
	UnsupportedVersion { found: u32, supported: u32 },
}

pub type Predicate<'a, T> = &'a (dyn Fn(&T) -> bool + Send + Sync);

/// A single mutation of the local store. Deleting a record that does not exist is a no-op.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
	InsertAction(PendingAction),
	DeleteAction(Uuid),
	PutCocktail(Cocktail),
	DeleteCocktail(Uuid),
	PutBar(PersonalBar),
	DeleteBar(Uuid),
}

/// An ordered batch of changes committed all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet(Vec<Change>);

impl ChangeSet {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, change: Change) {
		self.0.push(change);
	}

	#[must_use]
	pub fn with(mut self, change: Change) -> Self {
		self.push(change);
		self
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}
}

impl From<Change> for ChangeSet {
	fn from(change: Change) -> Self {
		Self(vec![change])
	}
}

impl Extend<Change> for ChangeSet {
	fn extend<I: IntoIterator<Item = Change>>(&mut self, iter: I) {
		self.0.extend(iter);
	}
}

impl IntoIterator for ChangeSet {
	type Item = Change;
	type IntoIter = std::vec::IntoIter<Change>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

/// The object store the sync core persists into.
///
/// Fetches return owned snapshots, pending actions come back in insertion order.
/// [`LocalStore::commit`] must be atomic from the point of view of concurrent readers and must
/// leave the store untouched when persisting fails.
#[async_trait]
pub trait LocalStore: Send + Sync + 'static {
	async fn fetch_actions(
		&self,
		predicate: Predicate<'_, PendingAction>,
	) -> Result<Vec<PendingAction>, StoreError>;

	async fn fetch_cocktails(
		&self,
		predicate: Predicate<'_, Cocktail>,
	) -> Result<Vec<Cocktail>, StoreError>;

	async fn fetch_bars(
		&self,
		predicate: Predicate<'_, PersonalBar>,
	) -> Result<Vec<PersonalBar>, StoreError>;

	async fn commit(&self, changes: ChangeSet) -> Result<(), StoreError>;
}
