use crate::{
	actions::PendingAction,
	domain::{Cocktail, PersonalBar},
};

use mybar_utils::{error::FileIOError, read_if_exists, write_atomically};

use std::{
	collections::BTreeMap,
	path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::RwLock};
use tracing::{debug, info, trace};
use uuid::Uuid;

use super::{Change, ChangeSet, LocalStore, Predicate, StoreError};

const STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoreState {
	version: u32,
	/// Insertion ordered
	actions: Vec<PendingAction>,
	cocktails: BTreeMap<Uuid, Cocktail>,
	bars: BTreeMap<Uuid, PersonalBar>,
}

impl Default for StoreState {
	fn default() -> Self {
		Self {
			version: STORE_VERSION,
			actions: vec![],
			cocktails: BTreeMap::new(),
			bars: BTreeMap::new(),
		}
	}
}

impl StoreState {
	fn apply(&mut self, change: Change) {
		match change {
			Change::InsertAction(action) => {
				if let Some(existing) = self.actions.iter_mut().find(|a| a.id == action.id) {
					*existing = action;
				} else {
					self.actions.push(action);
				}
			}
			Change::DeleteAction(id) => self.actions.retain(|action| action.id != id),
			Change::PutCocktail(cocktail) => {
				self.cocktails.insert(cocktail.id, cocktail);
			}
			Change::DeleteCocktail(id) => {
				self.cocktails.remove(&id);
			}
			Change::PutBar(bar) => {
				self.bars.insert(bar.id, bar);
			}
			Change::DeleteBar(id) => {
				self.bars.remove(&id);
			}
		}
	}
}

/// [`LocalStore`] keeping the whole object graph in memory and persisting it as a single
/// MessagePack file.
///
/// Commits build the next state on a copy, write it through [`write_atomically`] and only then
/// swap it in, so a failed write leaves both the file and the in-memory state as they were.
/// Maps are ordered, the same logical state always produces the same bytes.
#[derive(Debug)]
pub struct FileStore {
	path: PathBuf,
	state: RwLock<StoreState>,
}

impl FileStore {
	pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
		let path = path.as_ref().to_path_buf();

		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| FileIOError::from((parent, e, "failed to create store directory")))?;
		}

		let state = match read_if_exists(&path).await? {
			Some(bytes) => {
				let state = rmp_serde::from_slice::<StoreState>(&bytes)?;

				if state.version > STORE_VERSION {
					return Err(StoreError::UnsupportedVersion {
						found: state.version,
						supported: STORE_VERSION,
					});
				}

				info!(
					path = %path.display(),
					actions = state.actions.len(),
					cocktails = state.cocktails.len(),
					bars = state.bars.len(),
					"Opened local store;",
				);

				state
			}
			None => {
				debug!(path = %path.display(), "No local store found, starting empty;");
				StoreState::default()
			}
		};

		Ok(Self {
			path,
			state: RwLock::new(state),
		})
	}

	#[must_use]
	pub fn path(&self) -> &Path {
		&self.path
	}
}

#[async_trait]
impl LocalStore for FileStore {
	async fn fetch_actions(
		&self,
		predicate: Predicate<'_, PendingAction>,
	) -> Result<Vec<PendingAction>, StoreError> {
		Ok(self
			.state
			.read()
			.await
			.actions
			.iter()
			.filter(|action| predicate(action))
			.cloned()
			.collect())
	}

	async fn fetch_cocktails(
		&self,
		predicate: Predicate<'_, Cocktail>,
	) -> Result<Vec<Cocktail>, StoreError> {
		Ok(self
			.state
			.read()
			.await
			.cocktails
			.values()
			.filter(|cocktail| predicate(cocktail))
			.cloned()
			.collect())
	}

	async fn fetch_bars(
		&self,
		predicate: Predicate<'_, PersonalBar>,
	) -> Result<Vec<PersonalBar>, StoreError> {
		Ok(self
			.state
			.read()
			.await
			.bars
			.values()
			.filter(|bar| predicate(bar))
			.cloned()
			.collect())
	}

	async fn commit(&self, changes: ChangeSet) -> Result<(), StoreError> {
		if changes.is_empty() {
			return Ok(());
		}

		let mut state = self.state.write().await;

		let count = changes.len();
		let mut next = state.clone();
		for change in changes {
			next.apply(change);
		}

		if next == *state {
			trace!(count, "Commit left the store unchanged;");
			return Ok(());
		}

		let bytes = rmp_serde::to_vec_named(&next)?;
		write_atomically(&self.path, &bytes).await?;

		*state = next;

		trace!(count, size = bytes.len(), "Committed changes to local store;");

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::actions::PendingActionKind;

	use tempfile::tempdir;

	fn action(kind: PendingActionKind) -> PendingAction {
		PendingAction::new(kind, b"\"x\"".to_vec())
	}

	#[tokio::test]
	async fn commits_survive_reopen() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("store.mbstore");

		let first = action(PendingActionKind::AddFavorite);
		let second = action(PendingActionKind::AddBarItem);
		let bar = PersonalBar::guest();

		let store = FileStore::open(&path).await.unwrap();
		store
			.commit(
				ChangeSet::new()
					.with(Change::InsertAction(first.clone()))
					.with(Change::InsertAction(second.clone()))
					.with(Change::PutBar(bar.clone())),
			)
			.await
			.unwrap();
		drop(store);

		let reopened = FileStore::open(&path).await.unwrap();
		assert_eq!(
			reopened.fetch_actions(&|_| true).await.unwrap(),
			vec![first, second]
		);
		assert_eq!(reopened.fetch_bars(&|_| true).await.unwrap(), vec![bar]);
	}

	#[tokio::test]
	async fn failed_write_leaves_state_untouched() {
		let dir = tempdir().unwrap();
		let store_dir = dir.path().join("nested");
		let store = FileStore::open(store_dir.join("store.mbstore")).await.unwrap();

		std::fs::remove_dir_all(&store_dir).unwrap();

		let res = store
			.commit(Change::InsertAction(action(PendingActionKind::AddRemoved)).into())
			.await;

		assert!(matches!(res, Err(StoreError::FileIO(_))));
		assert!(store.fetch_actions(&|_| true).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn deleting_missing_records_is_a_no_op() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("store.mbstore");
		let store = FileStore::open(&path).await.unwrap();

		store
			.commit(
				ChangeSet::new()
					.with(Change::DeleteAction(Uuid::new_v4()))
					.with(Change::DeleteCocktail(Uuid::new_v4()))
					.with(Change::DeleteBar(Uuid::new_v4())),
			)
			.await
			.unwrap();

		// nothing changed so nothing was written
		assert!(!path.exists());
	}

	#[tokio::test]
	async fn newer_store_versions_are_rejected() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("store.mbstore");

		let future = StoreState {
			version: STORE_VERSION + 1,
			..StoreState::default()
		};
		std::fs::write(&path, rmp_serde::to_vec_named(&future).unwrap()).unwrap();

		assert!(matches!(
			FileStore::open(&path).await,
			Err(StoreError::UnsupportedVersion { .. })
		));
	}
}
