//! Everything a signed in (or guest) user interacts with, wired together explicitly.

use crate::{
	actions::{PendingAction, PendingActionKind},
	config::AppConfig,
	credentials::CredentialProvider,
	domain::{BarItem, BarItemCategory, Cocktail, PersonalBar, RemovedCocktail},
	notifications::Notifier,
	queue::ActionQueueService,
	reconcile::{ReconcileSummary, ReconciliationEngine},
	services::{BarService, CatalogService, CurrentBar},
	store::{FileStore, ImageCache, LocalStore},
	sync::{DrainOutcome, SyncCoordinator, SyncReport},
	Error,
};

use mybar_remote_api::{HttpRemoteApi, RemoteApi};

use std::{collections::BTreeMap, sync::Arc};

use tokio::sync::{Mutex, Notify};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Facade over the queue, services, coordinator and reconciler of one user session.
///
/// Every mutation, drain and reconciliation goes through a single lock, so they never run
/// concurrently against the same store.
pub struct Session {
	queue: ActionQueueService,
	bar: BarService,
	catalog: CatalogService,
	coordinator: SyncCoordinator,
	reconciler: ReconciliationEngine,
	notifier: Arc<Notifier>,
	lock: Mutex<()>,
}

impl Session {
	/// Opens the on-disk store and HTTP client described by `config`.
	pub async fn open(
		config: &AppConfig,
		credentials: Arc<dyn CredentialProvider>,
		user_id: Option<Uuid>,
	) -> Result<Arc<Self>, Error> {
		let store = Arc::new(FileStore::open(config.store_path()).await?);
		let remote = Arc::new(HttpRemoteApi::new(
			&config.server_url,
			config.request_timeout(),
		)?);

		info!(
			server_url = %remote.api_url(),
			data_dir = %config.data_dir.display(),
			"Opening session;",
		);

		Self::with_parts(
			store,
			remote,
			credentials,
			ImageCache::new(config.image_cache_dir()),
			user_id,
		)
		.await
	}

	pub async fn with_parts(
		store: Arc<dyn LocalStore>,
		remote: Arc<dyn RemoteApi>,
		credentials: Arc<dyn CredentialProvider>,
		images: ImageCache,
		user_id: Option<Uuid>,
	) -> Result<Arc<Self>, Error> {
		let queue = ActionQueueService::new(Arc::clone(&store));
		let notifier = Notifier::new();

		let bar = BarService::new(
			Arc::clone(&store),
			queue.clone(),
			Arc::clone(&remote),
			Arc::clone(&credentials),
			CurrentBar::default(),
		);
		let current_bar = bar.current_bar().clone();

		let catalog = CatalogService::new(Arc::clone(&store), queue.clone(), images.clone());

		let coordinator = SyncCoordinator::new(
			Arc::clone(&store),
			queue.clone(),
			Arc::clone(&remote),
			credentials,
			current_bar.clone(),
			images.clone(),
		);

		let reconciler = ReconciliationEngine::new(
			store,
			queue.clone(),
			remote,
			images,
			current_bar,
			Arc::clone(&notifier),
		);

		bar.ensure_guest_bar().await?;
		if let Some(user_id) = user_id {
			bar.switch_to_user(user_id).await?;
		}

		Ok(Arc::new(Self {
			queue,
			bar,
			catalog,
			coordinator,
			reconciler,
			notifier,
			lock: Mutex::new(()),
		}))
	}

	#[must_use]
	pub fn notifier(&self) -> &Arc<Notifier> {
		&self.notifier
	}

	/// Woken whenever a pending action is queued.
	#[must_use]
	pub fn changes(&self) -> Arc<Notify> {
		self.queue.changes()
	}

	pub async fn pending_counts(&self) -> Result<BTreeMap<PendingActionKind, usize>, Error> {
		let _guard = self.lock.lock().await;
		self.queue.pending_counts().await
	}

	pub async fn pending_actions(
		&self,
		kind: PendingActionKind,
	) -> Result<Vec<PendingAction>, Error> {
		let _guard = self.lock.lock().await;
		self.queue.fetch_actions(kind).await
	}

	pub async fn current_bar(&self) -> Result<PersonalBar, Error> {
		let _guard = self.lock.lock().await;
		self.bar.current().await
	}

	/// Cached cocktails not hidden by the current bar, sorted by name.
	pub async fn cocktails(&self) -> Result<Vec<Cocktail>, Error> {
		let _guard = self.lock.lock().await;
		let bar = self.bar.current().await?;

		Ok(self
			.catalog
			.cocktails()
			.await?
			.into_iter()
			.filter(|cocktail| !bar.is_removed(cocktail.id))
			.collect())
	}

	pub async fn cocktail_image(&self, id: Uuid) -> Result<Option<Vec<u8>>, Error> {
		self.catalog.image(id).await
	}

	pub async fn is_reachable(&self) -> bool {
		self.coordinator.is_reachable().await
	}

	pub async fn sync_kind(&self, kind: PendingActionKind) -> Result<DrainOutcome, Error> {
		let _guard = self.lock.lock().await;
		self.coordinator.drain(kind).await
	}

	pub async fn sync_all(&self) -> SyncReport {
		let _guard = self.lock.lock().await;
		self.coordinator.drain_all().await
	}

	pub async fn fetch_catalog(&self) -> Result<ReconcileSummary, Error> {
		let _guard = self.lock.lock().await;
		self.reconciler.fetch_catalog().await
	}

	/// One background round: probe, drain every kind, then refresh the catalog.
	///
	/// Failures are logged and forwarded to the notifier, never returned. Returns `None` when
	/// the server was unreachable.
	pub async fn run_sync_pass(&self) -> Option<SyncReport> {
		if !self.is_reachable().await {
			debug!("Server unreachable, skipping sync pass;");
			return None;
		}

		let _guard = self.lock.lock().await;

		let report = self.coordinator.drain_all().await;
		for (kind, e) in report.failures() {
			warn!(%kind, ?e, "Background drain failed;");
		}
		if let Some((kind, e)) = report.failures().next() {
			self.notifier
				.error(format!("Failed to sync {kind}: {e}"))
				.await;
		}

		if let Err(e) = self.reconciler.fetch_catalog().await {
			warn!(?e, "Background catalog refresh failed;");
			self.notifier
				.error(format!("Failed to refresh cocktails: {e}"))
				.await;
		}

		Some(report)
	}

	/// Right after a mutation, try to push that kind straight away.
	async fn push(&self, kind: PendingActionKind) {
		if let Err(e) = self.coordinator.drain(kind).await {
			warn!(%kind, ?e, "Immediate sync failed, action stays queued;");
			if !e.is_network() {
				self.notifier
					.error(format!("Failed to sync {kind}: {e}"))
					.await;
			}
		}
	}

	pub async fn add_bar_item(
		&self,
		name: impl Into<String> + Send,
		category: Option<BarItemCategory>,
	) -> Result<BarItem, Error> {
		let _guard = self.lock.lock().await;
		let item = self.bar.add_bar_item(name, category).await?;
		self.push(PendingActionKind::AddBarItem).await;
		Ok(item)
	}

	pub async fn delete_bar_item(&self, name: &str) -> Result<(), Error> {
		let _guard = self.lock.lock().await;
		self.bar.delete_bar_item(name).await?;
		self.push(PendingActionKind::DeleteBarItem).await;
		Ok(())
	}

	pub async fn add_favorite(&self, cocktail_id: &str) -> Result<(), Error> {
		let _guard = self.lock.lock().await;
		self.bar.add_favorite(cocktail_id).await?;
		self.push(PendingActionKind::AddFavorite).await;
		Ok(())
	}

	pub async fn delete_favorite(&self, cocktail_id: &str) -> Result<(), Error> {
		let _guard = self.lock.lock().await;
		self.bar.delete_favorite(cocktail_id).await?;
		self.push(PendingActionKind::DeleteFavorite).await;
		Ok(())
	}

	/// Hides a cocktail for the current user.
	pub async fn hide_cocktail(&self, removed: RemovedCocktail) -> Result<(), Error> {
		let _guard = self.lock.lock().await;
		self.bar.add_removed(removed).await?;
		self.push(PendingActionKind::AddRemoved).await;
		Ok(())
	}

	pub async fn restore_cocktail(&self, cocktail_id: &str) -> Result<(), Error> {
		let _guard = self.lock.lock().await;
		self.bar.delete_removed(cocktail_id).await?;
		self.push(PendingActionKind::DeleteRemoved).await;
		Ok(())
	}

	pub async fn create_cocktail(&self, cocktail: Cocktail) -> Result<(), Error> {
		let _guard = self.lock.lock().await;
		self.catalog.create_cocktail(cocktail).await?;
		self.push(PendingActionKind::AddCocktail).await;
		Ok(())
	}

	pub async fn update_cocktail(&self, cocktail: Cocktail) -> Result<(), Error> {
		let _guard = self.lock.lock().await;
		self.catalog.update_cocktail(cocktail).await?;
		self.push(PendingActionKind::EditCocktail).await;
		Ok(())
	}

	pub async fn delete_cocktail(&self, id: Uuid) -> Result<(), Error> {
		let _guard = self.lock.lock().await;
		self.catalog.delete_cocktail(id).await?;
		self.push(PendingActionKind::DeleteCocktail).await;
		Ok(())
	}

	/// Switches to the user's bar after login, then pulls the server copy of it.
	///
	/// Pending bar actions are drained first so the server copy already contains them.
	pub async fn sign_in(&self, user_id: Uuid) -> Result<PersonalBar, Error> {
		let _guard = self.lock.lock().await;
		self.bar.switch_to_user(user_id).await?;

		let report = self.coordinator.drain_all().await;
		if let Some((kind, e)) = report.failures().next() {
			warn!(%kind, ?e, "Keeping local bar, pending actions could not be sent;");
			return self.bar.current().await;
		}

		self.bar.load_remote_bar().await
	}

	pub async fn sign_out(&self) -> Result<PersonalBar, Error> {
		let _guard = self.lock.lock().await;
		self.bar.switch_to_guest().await
	}

	pub async fn delete_user_bar(&self, user_id: Uuid) -> Result<(), Error> {
		let _guard = self.lock.lock().await;
		self.bar.delete_user_bar(user_id).await
	}
}
