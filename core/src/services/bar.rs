use crate::{
	actions::{ActionPayload, PendingAction},
	credentials::CredentialProvider,
	domain::{BarItem, BarItemCategory, PersonalBar, RemovedCocktail},
	queue::ActionQueueService,
	store::{Change, LocalStore},
	Error,
};

use mybar_remote_api::{BarItemDto, RemoteApi};

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Which personal bar is current, `None` being the guest bar.
///
/// Shared by everything that needs to read or prune the current bar, only [`BarService`]
/// switches it.
#[derive(Debug, Clone, Default)]
pub struct CurrentBar {
	owner: Arc<RwLock<Option<Uuid>>>,
}

impl CurrentBar {
	#[must_use]
	pub fn new(owner: Option<Uuid>) -> Self {
		Self {
			owner: Arc::new(RwLock::new(owner)),
		}
	}

	pub async fn owner(&self) -> Option<Uuid> {
		*self.owner.read().await
	}

	async fn set(&self, owner: Option<Uuid>) {
		*self.owner.write().await = owner;
	}

	pub async fn load(&self, store: &dyn LocalStore) -> Result<Option<PersonalBar>, Error> {
		let owner = self.owner().await;

		find_bar(store, owner).await
	}
}

async fn find_bar(
	store: &dyn LocalStore,
	owner: Option<Uuid>,
) -> Result<Option<PersonalBar>, Error> {
	Ok(store
		.fetch_bars(&move |bar: &PersonalBar| bar.owner == owner)
		.await?
		.into_iter()
		.next())
}

/// Owns every mutation of personal bars.
///
/// Each mutation updates the current bar and appends the matching pending action in a single
/// commit.
#[derive(Clone)]
pub struct BarService {
	store: Arc<dyn LocalStore>,
	queue: ActionQueueService,
	remote: Arc<dyn RemoteApi>,
	credentials: Arc<dyn CredentialProvider>,
	current: CurrentBar,
}

impl BarService {
	pub fn new(
		store: Arc<dyn LocalStore>,
		queue: ActionQueueService,
		remote: Arc<dyn RemoteApi>,
		credentials: Arc<dyn CredentialProvider>,
		current: CurrentBar,
	) -> Self {
		Self {
			store,
			queue,
			remote,
			credentials,
			current,
		}
	}

	#[must_use]
	pub fn current_bar(&self) -> &CurrentBar {
		&self.current
	}

	pub async fn current(&self) -> Result<PersonalBar, Error> {
		match self.current.load(&*self.store).await? {
			Some(bar) => Ok(bar),
			None => Err(Error::BarNotFound(self.current.owner().await)),
		}
	}

	async fn get_or_create(&self, owner: Option<Uuid>) -> Result<PersonalBar, Error> {
		if let Some(bar) = find_bar(&*self.store, owner).await? {
			return Ok(bar);
		}

		let bar = owner.map_or_else(PersonalBar::guest, PersonalBar::for_user);
		self.store.commit(Change::PutBar(bar.clone()).into()).await?;

		info!(bar_id = %bar.id, ?owner, "Created personal bar;");

		Ok(bar)
	}

	pub async fn ensure_guest_bar(&self) -> Result<PersonalBar, Error> {
		self.get_or_create(None).await
	}

	/// Makes the user's bar current, creating it if needed. The previous bar is left untouched.
	pub async fn switch_to_user(&self, user_id: Uuid) -> Result<PersonalBar, Error> {
		let bar = self.get_or_create(Some(user_id)).await?;
		self.current.set(Some(user_id)).await;

		debug!(%user_id, "Switched to user bar;");

		Ok(bar)
	}

	pub async fn switch_to_guest(&self) -> Result<PersonalBar, Error> {
		let bar = self.get_or_create(None).await?;
		self.current.set(None).await;

		debug!("Switched to guest bar;");

		Ok(bar)
	}

	async fn mutate(
		&self,
		payload: ActionPayload,
		apply: impl FnOnce(&mut PersonalBar) + Send,
	) -> Result<PendingAction, Error> {
		let mut bar = self.current().await?;
		apply(&mut bar);

		self.queue
			.commit_with(&payload, Change::PutBar(bar).into())
			.await
	}

	/// Adds an item, guessing its category from the name when none is given.
	pub async fn add_bar_item(
		&self,
		name: impl Into<String> + Send,
		category: Option<BarItemCategory>,
	) -> Result<BarItem, Error> {
		let item = BarItem::new(name, category);

		self.mutate(ActionPayload::AddBarItem(BarItemDto::from(&item)), |bar| {
			bar.add_item(item.clone());
		})
		.await?;

		Ok(item)
	}

	/// Removes an item by name. The delete is queued even if the item is not known locally.
	pub async fn delete_bar_item(&self, name: &str) -> Result<(), Error> {
		let bar = self.current().await?;
		let dto = bar
			.items
			.iter()
			.find(|item| item.name == name)
			.map_or_else(|| BarItemDto::from(&BarItem::new(name, None)), BarItemDto::from);

		self.mutate(ActionPayload::DeleteBarItem(dto), |bar| {
			bar.remove_item(name);
		})
		.await
		.map(|_| ())
	}

	pub async fn add_favorite(&self, cocktail_id: &str) -> Result<(), Error> {
		self.mutate(ActionPayload::AddFavorite(cocktail_id.to_string()), |bar| {
			bar.add_favorite(cocktail_id);
		})
		.await
		.map(|_| ())
	}

	pub async fn delete_favorite(&self, cocktail_id: &str) -> Result<(), Error> {
		self.mutate(ActionPayload::DeleteFavorite(cocktail_id.to_string()), |bar| {
			bar.remove_favorite(cocktail_id);
		})
		.await
		.map(|_| ())
	}

	/// Hides a cocktail for this user by recording a tombstone.
	pub async fn add_removed(&self, removed: RemovedCocktail) -> Result<(), Error> {
		self.mutate(ActionPayload::AddRemoved((&removed).into()), |bar| {
			bar.add_removed(removed.clone());
		})
		.await
		.map(|_| ())
	}

	/// Drops a tombstone, the delete is queued even if no tombstone is known locally.
	pub async fn delete_removed(&self, cocktail_id: &str) -> Result<(), Error> {
		let mut bar = self.current().await?;
		let removed = bar
			.restore(cocktail_id)
			.unwrap_or_else(|| RemovedCocktail::now(cocktail_id, "", ""));

		self.queue
			.commit_with(
				&ActionPayload::DeleteRemoved((&removed).into()),
				Change::PutBar(bar).into(),
			)
			.await
			.map(|_| ())
	}

	/// Replaces the signed in user's bar with the server copy and makes it current.
	pub async fn load_remote_bar(&self) -> Result<PersonalBar, Error> {
		let token = self
			.credentials
			.token()
			.await
			.ok_or(Error::MissingCredential)?;

		let dto = self.remote.fetch_my_bar(&token).await?;

		let mut bar = find_bar(&*self.store, Some(dto.user_id))
			.await?
			.unwrap_or_else(|| PersonalBar::for_user(dto.user_id));
		bar.apply_remote(&dto);

		self.store.commit(Change::PutBar(bar.clone()).into()).await?;
		self.current.set(Some(dto.user_id)).await;

		info!(
			user_id = %dto.user_id,
			items = bar.items.len(),
			favorites = bar.favorites.len(),
			removed = bar.removed.len(),
			"Loaded personal bar from server;",
		);

		Ok(bar)
	}

	/// Drops a user's bar, falling back to the guest bar if it was current.
	pub async fn delete_user_bar(&self, user_id: Uuid) -> Result<(), Error> {
		let bar = find_bar(&*self.store, Some(user_id))
			.await?
			.ok_or(Error::BarNotFound(Some(user_id)))?;

		self.store.commit(Change::DeleteBar(bar.id).into()).await?;

		info!(%user_id, bar_id = %bar.id, "Deleted user bar;");

		if self.current.owner().await == Some(user_id) {
			self.switch_to_guest().await?;
		}

		Ok(())
	}
}
