//! The only reader and writer of the pending action log.

use crate::{
	actions::{encode_value, ActionPayload, PendingAction, PendingActionKind},
	store::{Change, ChangeSet, LocalStore},
	Error,
};

use std::{collections::BTreeMap, sync::Arc};

use serde::Serialize;
use strum::IntoEnumIterator;
use tokio::sync::Notify;
use tracing::{debug, info};

#[derive(Clone)]
pub struct ActionQueueService {
	store: Arc<dyn LocalStore>,
	changes: Arc<Notify>,
}

impl ActionQueueService {
	pub fn new(store: Arc<dyn LocalStore>) -> Self {
		Self {
			store,
			changes: Arc::new(Notify::new()),
		}
	}

	/// Woken every time an action is appended, lets the sync actor react to local mutations.
	#[must_use]
	pub fn changes(&self) -> Arc<Notify> {
		Arc::clone(&self.changes)
	}

	/// Encodes a payload into a new action without persisting it.
	pub fn prepare(payload: &ActionPayload) -> Result<PendingAction, Error> {
		Ok(PendingAction::new(payload.kind(), payload.encode()?))
	}

	pub async fn enqueue(&self, payload: ActionPayload) -> Result<PendingAction, Error> {
		self.commit_with(&payload, ChangeSet::new()).await
	}

	/// Enqueues any serializable value under `kind`.
	///
	/// The value is not checked against the shape `kind` expects, a mismatch shows up as a
	/// poison entry when the action is drained.
	pub async fn enqueue_raw<T>(
		&self,
		kind: PendingActionKind,
		value: &T,
	) -> Result<PendingAction, Error>
	where
		T: Serialize + Sync + ?Sized,
	{
		let action = PendingAction::new(kind, encode_value(kind, value)?);

		self.append(action, ChangeSet::new()).await
	}

	/// Applies `changes` and appends the action for `payload` in one commit.
	pub async fn commit_with(
		&self,
		payload: &ActionPayload,
		changes: ChangeSet,
	) -> Result<PendingAction, Error> {
		self.append(Self::prepare(payload)?, changes).await
	}

	async fn append(
		&self,
		action: PendingAction,
		mut changes: ChangeSet,
	) -> Result<PendingAction, Error> {
		changes.push(Change::InsertAction(action.clone()));

		self.store.commit(changes).await?;

		debug!(kind = %action.kind, action_id = %action.id, "Enqueued pending action;");

		self.changes.notify_one();

		Ok(action)
	}

	/// Pending actions of one kind, oldest first.
	pub async fn fetch_actions(&self, kind: PendingActionKind) -> Result<Vec<PendingAction>, Error> {
		self.store
			.fetch_actions(&|action: &PendingAction| action.kind == kind)
			.await
			.map_err(Into::into)
	}

	pub async fn fetch_all(&self) -> Result<Vec<PendingAction>, Error> {
		self.store
			.fetch_actions(&|_: &PendingAction| true)
			.await
			.map_err(Into::into)
	}

	/// Removing an action that is already gone is not an error.
	pub async fn remove(&self, action: &PendingAction) -> Result<(), Error> {
		self.complete_with(action, ChangeSet::new()).await
	}

	/// Removes a confirmed action together with the local changes its confirmation implies.
	pub async fn complete_with(
		&self,
		action: &PendingAction,
		mut changes: ChangeSet,
	) -> Result<(), Error> {
		changes.push(Change::DeleteAction(action.id));

		self.store.commit(changes).await?;

		debug!(kind = %action.kind, action_id = %action.id, "Removed pending action;");

		Ok(())
	}

	/// Empties the log, meant for controlled resets only.
	pub async fn clear_all(&self) -> Result<usize, Error> {
		let actions = self.fetch_all().await?;
		let count = actions.len();

		let mut changes = ChangeSet::new();
		changes.extend(
			actions
				.into_iter()
				.map(|action| Change::DeleteAction(action.id)),
		);

		self.store.commit(changes).await?;

		info!(count, "Cleared pending action log;");

		Ok(count)
	}

	pub async fn pending_counts(&self) -> Result<BTreeMap<PendingActionKind, usize>, Error> {
		let mut counts = PendingActionKind::iter()
			.map(|kind| (kind, 0))
			.collect::<BTreeMap<_, _>>();

		for action in self.fetch_all().await? {
			*counts.entry(action.kind).or_default() += 1;
		}

		Ok(counts)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::store::FileStore;

	use tempfile::tempdir;

	#[tokio::test]
	async fn fetch_keeps_enqueue_order_per_kind() {
		let dir = tempdir().unwrap();
		let store = Arc::new(FileStore::open(dir.path().join("store")).await.unwrap());
		let queue = ActionQueueService::new(store);

		let a = queue
			.enqueue(ActionPayload::AddFavorite("a".into()))
			.await
			.unwrap();
		queue
			.enqueue(ActionPayload::DeleteFavorite("x".into()))
			.await
			.unwrap();
		let b = queue
			.enqueue(ActionPayload::AddFavorite("b".into()))
			.await
			.unwrap();

		assert_eq!(
			queue
				.fetch_actions(PendingActionKind::AddFavorite)
				.await
				.unwrap(),
			vec![a, b]
		);

		let counts = queue.pending_counts().await.unwrap();
		assert_eq!(counts[&PendingActionKind::AddFavorite], 2);
		assert_eq!(counts[&PendingActionKind::DeleteFavorite], 1);
		assert_eq!(counts[&PendingActionKind::AddBarItem], 0);
	}

	#[tokio::test]
	async fn remove_is_idempotent_and_clear_empties() {
		let dir = tempdir().unwrap();
		let store = Arc::new(FileStore::open(dir.path().join("store")).await.unwrap());
		let queue = ActionQueueService::new(store);

		let action = queue
			.enqueue(ActionPayload::AddFavorite("a".into()))
			.await
			.unwrap();
		queue
			.enqueue_raw(PendingActionKind::AddBarItem, "not a bar item")
			.await
			.unwrap();

		queue.remove(&action).await.unwrap();
		queue.remove(&action).await.unwrap();
		assert_eq!(queue.fetch_all().await.unwrap().len(), 1);

		assert_eq!(queue.clear_all().await.unwrap(), 1);
		assert!(queue.fetch_all().await.unwrap().is_empty());
	}
}
