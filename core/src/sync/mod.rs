//! Draining the pending action log against the server.
//!
//! Each kind is drained on its own, oldest action first. An action leaves the log only once the
//! server accepted it; the first failure stops that kind and leaves the rest queued, other kinds
//! are not affected. Actions whose payload can't be decoded are skipped and stay in the log.

mod actor;

pub use actor::SyncActor;

use crate::{
	actions::{ActionPayload, PendingAction, PendingActionKind},
	credentials::CredentialProvider,
	queue::ActionQueueService,
	services::CurrentBar,
	store::{Change, ChangeSet, ImageCache, LocalStore},
	Error,
};

use mybar_remote_api::{AuthToken, RemoteApi};
use mybar_utils::error::report_error;

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

/// Order in which [`SyncCoordinator::drain_all`] visits the kinds, catalog kinds first.
pub const DRAIN_ORDER: [PendingActionKind; 9] = [
	PendingActionKind::AddCocktail,
	PendingActionKind::EditCocktail,
	PendingActionKind::DeleteCocktail,
	PendingActionKind::AddBarItem,
	PendingActionKind::DeleteBarItem,
	PendingActionKind::AddFavorite,
	PendingActionKind::DeleteFavorite,
	PendingActionKind::AddRemoved,
	PendingActionKind::DeleteRemoved,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainOutcome {
	/// Actions accepted by the server and removed from the log
	pub sent: usize,
	/// Poison entries left in the log
	pub skipped: usize,
	/// Nothing was attempted because the kind needs a signed in user
	pub unauthenticated: bool,
}

#[derive(Debug)]
pub struct KindReport {
	pub kind: PendingActionKind,
	pub outcome: DrainOutcome,
	pub error: Option<Error>,
}

/// Result of draining every kind once.
#[derive(Debug, Default)]
pub struct SyncReport {
	pub kinds: Vec<KindReport>,
}

impl SyncReport {
	#[must_use]
	pub fn sent(&self) -> usize {
		self.kinds.iter().map(|report| report.outcome.sent).sum()
	}

	#[must_use]
	pub fn skipped(&self) -> usize {
		self.kinds.iter().map(|report| report.outcome.skipped).sum()
	}

	pub fn failures(&self) -> impl Iterator<Item = (PendingActionKind, &Error)> {
		self.kinds
			.iter()
			.filter_map(|report| report.error.as_ref().map(|e| (report.kind, e)))
	}

	#[must_use]
	pub fn is_success(&self) -> bool {
		self.failures().next().is_none()
	}

	#[must_use]
	pub fn get(&self, kind: PendingActionKind) -> Option<&KindReport> {
		self.kinds.iter().find(|report| report.kind == kind)
	}
}

#[derive(Clone)]
pub struct SyncCoordinator {
	store: Arc<dyn LocalStore>,
	queue: ActionQueueService,
	remote: Arc<dyn RemoteApi>,
	credentials: Arc<dyn CredentialProvider>,
	current_bar: CurrentBar,
	images: ImageCache,
}

impl SyncCoordinator {
	pub fn new(
		store: Arc<dyn LocalStore>,
		queue: ActionQueueService,
		remote: Arc<dyn RemoteApi>,
		credentials: Arc<dyn CredentialProvider>,
		current_bar: CurrentBar,
		images: ImageCache,
	) -> Self {
		Self {
			store,
			queue,
			remote,
			credentials,
			current_bar,
			images,
		}
	}

	/// `HEAD /cocktails`; transport failures just mean unreachable.
	pub async fn is_reachable(&self) -> bool {
		self.remote.is_reachable().await
	}

	pub async fn sync_add_bar_item(&self) -> Result<DrainOutcome, Error> {
		self.drain(PendingActionKind::AddBarItem).await
	}

	pub async fn sync_delete_bar_item(&self) -> Result<DrainOutcome, Error> {
		self.drain(PendingActionKind::DeleteBarItem).await
	}

	pub async fn sync_add_favorites(&self) -> Result<DrainOutcome, Error> {
		self.drain(PendingActionKind::AddFavorite).await
	}

	pub async fn sync_delete_favorites(&self) -> Result<DrainOutcome, Error> {
		self.drain(PendingActionKind::DeleteFavorite).await
	}

	pub async fn sync_add_removes(&self) -> Result<DrainOutcome, Error> {
		self.drain(PendingActionKind::AddRemoved).await
	}

	pub async fn sync_delete_removes(&self) -> Result<DrainOutcome, Error> {
		self.drain(PendingActionKind::DeleteRemoved).await
	}

	pub async fn sync_add_cocktails(&self) -> Result<DrainOutcome, Error> {
		self.drain(PendingActionKind::AddCocktail).await
	}

	pub async fn sync_edit_cocktails(&self) -> Result<DrainOutcome, Error> {
		self.drain(PendingActionKind::EditCocktail).await
	}

	pub async fn sync_delete_cocktails(&self) -> Result<DrainOutcome, Error> {
		self.drain(PendingActionKind::DeleteCocktail).await
	}

	/// Drains a single kind, stopping at the first failure.
	pub async fn drain(&self, kind: PendingActionKind) -> Result<DrainOutcome, Error> {
		let mut outcome = DrainOutcome::default();

		self.drain_into(kind, &mut outcome).await.map(|()| outcome)
	}

	/// Drains every kind independently, a failing kind never blocks the others.
	pub async fn drain_all(&self) -> SyncReport {
		let mut report = SyncReport::default();

		for kind in DRAIN_ORDER {
			let mut outcome = DrainOutcome::default();
			let error = self.drain_into(kind, &mut outcome).await.err();

			report.kinds.push(KindReport {
				kind,
				outcome,
				error,
			});
		}

		info!(
			sent = report.sent(),
			skipped = report.skipped(),
			failed = report.failures().count(),
			"Finished draining pending actions;",
		);

		report
	}

	async fn drain_into(
		&self,
		kind: PendingActionKind,
		outcome: &mut DrainOutcome,
	) -> Result<(), Error> {
		let token = self.credentials.token().await;

		if token.is_none() && kind.requires_credential() {
			debug!(%kind, "Not signed in, skipping drain;");
			outcome.unauthenticated = true;
			return Ok(());
		}

		for action in self.queue.fetch_actions(kind).await? {
			let payload = match action.decode() {
				Ok(payload) => payload,
				Err(e) => {
					warn!(%kind, action_id = %action.id, ?e, "Skipping undecodable pending action;");
					outcome.skipped += 1;
					continue;
				}
			};

			if let Err(e) = self.send(&action, payload, token.as_ref()).await {
				warn!(
					%kind,
					action_id = %action.id,
					sent = outcome.sent,
					?e,
					"Stopped draining after a failed action;",
				);
				return Err(e);
			}

			debug!(%kind, action_id = %action.id, "Pending action accepted by server;");
			outcome.sent += 1;
		}

		Ok(())
	}

	/// Issues the remote call for one action and removes it once accepted.
	async fn send(
		&self,
		action: &PendingAction,
		payload: ActionPayload,
		token: Option<&AuthToken>,
	) -> Result<(), Error> {
		let bar_token = || token.ok_or(Error::MissingCredential);

		let res = match &payload {
			ActionPayload::AddBarItem(item) => self.remote.add_bar_item(bar_token()?, item).await,
			ActionPayload::DeleteBarItem(item) => {
				self.remote.delete_bar_item(bar_token()?, &item.name).await
			}
			ActionPayload::AddFavorite(id) => self.remote.add_favorite(bar_token()?, id).await,
			ActionPayload::DeleteFavorite(id) => {
				self.remote.delete_favorite(bar_token()?, id).await
			}
			ActionPayload::AddRemoved(removed) => {
				self.remote.add_removed(bar_token()?, removed).await
			}
			ActionPayload::DeleteRemoved(removed) => {
				self.remote.delete_removed(bar_token()?, &removed.id).await
			}
			ActionPayload::AddCocktail(cocktail) => {
				self.remote.create_cocktail(token, cocktail).await
			}
			ActionPayload::EditCocktail(cocktail) => {
				self.remote.update_cocktail(token, cocktail).await
			}
			ActionPayload::DeleteCocktail(id) => self.remote.delete_cocktail(token, *id).await,
		};

		match (res, &payload) {
			(Ok(()), _) => self.queue.remove(action).await,
			(Err(mybar_remote_api::Error::NotFound), ActionPayload::EditCocktail(cocktail)) => {
				self.forget_cocktail(action, cocktail.id).await
			}
			(Err(e), _) => Err(e.into()),
		}
	}

	/// The edited cocktail no longer exists on the server: drop the action, every reference the
	/// current bar holds to it and the cached copy, all in one commit.
	async fn forget_cocktail(&self, action: &PendingAction, id: Uuid) -> Result<(), Error> {
		let mut changes = ChangeSet::new().with(Change::DeleteCocktail(id));

		if let Some(mut bar) = self.current_bar.load(&*self.store).await? {
			let id = id.to_string();
			let unfavorited = bar.remove_favorite(&id);
			let restored = bar.restore(&id).is_some();

			if unfavorited || restored {
				changes.push(Change::PutBar(bar));
			}
		}

		self.queue.complete_with(action, changes).await?;

		info!(cocktail_id = %id, "Edited cocktail is gone from the server, dropped local copy;");

		report_error(
			&self.images.remove(id).await,
			"Failed to remove cached image of a cocktail deleted on the server",
		);

		Ok(())
	}
}
