#![allow(dead_code)]

use mybar_core::{
	credentials::StaticCredentials,
	notifications::Notifier,
	queue::ActionQueueService,
	reconcile::ReconciliationEngine,
	remote::{
		AuthToken, BarItemDto, CocktailDto, Error as RemoteError, IngredientDto, MyBarDto,
		RemoteApi, RemovedCocktailDto,
	},
	services::{BarService, CatalogService, CurrentBar},
	store::{FileStore, ImageCache},
	sync::SyncCoordinator,
	Session,
};

use std::{
	collections::HashMap,
	path::PathBuf,
	sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tempfile::{tempdir, TempDir};
use uuid::Uuid;

pub const TOKEN: &str = "test-token";

/// A remote call as seen by [`MockRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
	FetchCocktails,
	FetchImage(String),
	CreateCocktail(Uuid),
	UpdateCocktail(Uuid),
	DeleteCocktail(Uuid),
	FetchMyBar,
	AddBarItem(String),
	DeleteBarItem(String),
	AddFavorite(String),
	DeleteFavorite(String),
	AddRemoved(String),
	DeleteRemoved(String),
}

#[derive(Default)]
struct MockState {
	calls: Vec<Call>,
	failures: Vec<(Call, RemoteError)>,
	catalog: Vec<CocktailDto>,
	images: HashMap<String, Vec<u8>>,
	my_bar: Option<MyBarDto>,
	unreachable: bool,
}

/// In-memory server recording every call it receives.
#[derive(Default)]
pub struct MockRemote {
	state: Mutex<MockState>,
}

impl MockRemote {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn calls(&self) -> Vec<Call> {
		self.state.lock().unwrap().calls.clone()
	}

	pub fn clear_calls(&self) {
		self.state.lock().unwrap().calls.clear();
	}

	/// Every future `call` fails with `error` until [`MockRemote::clear_failures`].
	pub fn fail_on(&self, call: Call, error: RemoteError) {
		self.state.lock().unwrap().failures.push((call, error));
	}

	pub fn clear_failures(&self) {
		self.state.lock().unwrap().failures.clear();
	}

	pub fn set_catalog(&self, catalog: Vec<CocktailDto>) {
		self.state.lock().unwrap().catalog = catalog;
	}

	pub fn set_image(&self, reference: &str, bytes: &[u8]) {
		self.state
			.lock()
			.unwrap()
			.images
			.insert(reference.to_string(), bytes.to_vec());
	}

	pub fn set_my_bar(&self, my_bar: MyBarDto) {
		self.state.lock().unwrap().my_bar = Some(my_bar);
	}

	pub fn set_reachable(&self, reachable: bool) {
		self.state.lock().unwrap().unreachable = !reachable;
	}

	fn record(&self, call: Call) -> Result<(), RemoteError> {
		let mut state = self.state.lock().unwrap();

		let failure = state
			.failures
			.iter()
			.find(|(failing, _)| *failing == call)
			.map(|(_, e)| e.clone());

		state.calls.push(call);

		failure.map_or(Ok(()), Err)
	}
}

#[async_trait]
impl RemoteApi for MockRemote {
	async fn fetch_cocktails(&self) -> Result<Vec<CocktailDto>, RemoteError> {
		self.record(Call::FetchCocktails)?;
		Ok(self.state.lock().unwrap().catalog.clone())
	}

	async fn is_reachable(&self) -> bool {
		!self.state.lock().unwrap().unreachable
	}

	async fn fetch_image(&self, reference: &str) -> Result<Vec<u8>, RemoteError> {
		self.record(Call::FetchImage(reference.to_string()))?;
		self.state
			.lock()
			.unwrap()
			.images
			.get(reference)
			.cloned()
			.ok_or(RemoteError::NotFound)
	}

	async fn create_cocktail(
		&self,
		_token: Option<&AuthToken>,
		cocktail: &CocktailDto,
	) -> Result<(), RemoteError> {
		self.record(Call::CreateCocktail(cocktail.id))
	}

	async fn update_cocktail(
		&self,
		_token: Option<&AuthToken>,
		cocktail: &CocktailDto,
	) -> Result<(), RemoteError> {
		self.record(Call::UpdateCocktail(cocktail.id))
	}

	async fn delete_cocktail(
		&self,
		_token: Option<&AuthToken>,
		id: Uuid,
	) -> Result<(), RemoteError> {
		self.record(Call::DeleteCocktail(id))
	}

	async fn fetch_my_bar(&self, _token: &AuthToken) -> Result<MyBarDto, RemoteError> {
		self.record(Call::FetchMyBar)?;
		self.state
			.lock()
			.unwrap()
			.my_bar
			.clone()
			.ok_or(RemoteError::NotFound)
	}

	async fn add_bar_item(&self, _token: &AuthToken, item: &BarItemDto) -> Result<(), RemoteError> {
		self.record(Call::AddBarItem(item.name.clone()))
	}

	async fn delete_bar_item(&self, _token: &AuthToken, name: &str) -> Result<(), RemoteError> {
		self.record(Call::DeleteBarItem(name.to_string()))
	}

	async fn add_favorite(&self, _token: &AuthToken, cocktail_id: &str) -> Result<(), RemoteError> {
		self.record(Call::AddFavorite(cocktail_id.to_string()))
	}

	async fn delete_favorite(
		&self,
		_token: &AuthToken,
		cocktail_id: &str,
	) -> Result<(), RemoteError> {
		self.record(Call::DeleteFavorite(cocktail_id.to_string()))
	}

	async fn add_removed(
		&self,
		_token: &AuthToken,
		removed: &RemovedCocktailDto,
	) -> Result<(), RemoteError> {
		self.record(Call::AddRemoved(removed.id.clone()))
	}

	async fn delete_removed(
		&self,
		_token: &AuthToken,
		cocktail_id: &str,
	) -> Result<(), RemoteError> {
		self.record(Call::DeleteRemoved(cocktail_id.to_string()))
	}
}

pub fn server_error() -> RemoteError {
	RemoteError::Server {
		status: 500,
		reason: None,
	}
}

pub fn offline() -> RemoteError {
	RemoteError::Network("connection refused".to_string())
}

pub fn cocktail_dto(name: &str) -> CocktailDto {
	CocktailDto {
		id: Uuid::new_v4(),
		name: name.to_string(),
		creator: "house".to_string(),
		style: "Shaken".to_string(),
		comment: String::new(),
		cocktail_category: "Sour".to_string(),
		image_url: None,
		ingredients: vec![IngredientDto {
			id: Uuid::new_v4(),
			volume: 45.0,
			unit: "ml".to_string(),
			name: "Gin".to_string(),
			tag: Some("gin".to_string()),
			order_index: 0,
		}],
	}
}

pub fn bar_item(name: &str) -> BarItemDto {
	BarItemDto {
		name: name.to_string(),
		category: "liquor".to_string(),
	}
}

/// Every component wired by hand over a temporary store, without a [`Session`] in front.
pub struct Harness {
	pub dir: TempDir,
	pub user_id: Option<Uuid>,
	pub store: Arc<FileStore>,
	pub remote: Arc<MockRemote>,
	pub credentials: Arc<StaticCredentials>,
	pub images: ImageCache,
	pub notifier: Arc<Notifier>,
	pub queue: ActionQueueService,
	pub bar: BarService,
	pub catalog: CatalogService,
	pub coordinator: SyncCoordinator,
	pub reconciler: ReconciliationEngine,
}

impl Harness {
	pub async fn signed_in() -> Self {
		Self::new(Some(Uuid::new_v4())).await
	}

	pub async fn guest() -> Self {
		Self::new(None).await
	}

	async fn new(user_id: Option<Uuid>) -> Self {
		let dir = tempdir().unwrap();
		let store = Arc::new(FileStore::open(dir.path().join("store.mbstore")).await.unwrap());
		let remote = MockRemote::new();
		let credentials = Arc::new(
			user_id.map_or_else(StaticCredentials::default, |user_id| {
				StaticCredentials::signed_in(user_id, AuthToken::new(TOKEN))
			}),
		);
		let images = ImageCache::new(dir.path().join("images"));
		let notifier = Notifier::new();
		let queue = ActionQueueService::new(store.clone());
		let current_bar = CurrentBar::default();

		let bar = BarService::new(
			store.clone(),
			queue.clone(),
			remote.clone(),
			credentials.clone(),
			current_bar.clone(),
		);
		bar.ensure_guest_bar().await.unwrap();
		if let Some(user_id) = user_id {
			bar.switch_to_user(user_id).await.unwrap();
		}

		let catalog = CatalogService::new(store.clone(), queue.clone(), images.clone());

		let coordinator = SyncCoordinator::new(
			store.clone(),
			queue.clone(),
			remote.clone(),
			credentials.clone(),
			current_bar.clone(),
			images.clone(),
		);

		let reconciler = ReconciliationEngine::new(
			store.clone(),
			queue.clone(),
			remote.clone(),
			images.clone(),
			current_bar,
			notifier.clone(),
		);

		Self {
			dir,
			user_id,
			store,
			remote,
			credentials,
			images,
			notifier,
			queue,
			bar,
			catalog,
			coordinator,
			reconciler,
		}
	}

	pub fn store_path(&self) -> PathBuf {
		self.store.path().to_path_buf()
	}
}

pub struct SessionHarness {
	pub dir: TempDir,
	pub user_id: Uuid,
	pub remote: Arc<MockRemote>,
	pub credentials: Arc<StaticCredentials>,
	pub session: Arc<Session>,
}

/// A [`Session`] for a signed in user over a temporary store.
pub async fn session() -> SessionHarness {
	let dir = tempdir().unwrap();
	let user_id = Uuid::new_v4();
	let remote = MockRemote::new();
	let credentials = Arc::new(StaticCredentials::signed_in(user_id, AuthToken::new(TOKEN)));

	let session = Session::with_parts(
		Arc::new(FileStore::open(dir.path().join("store.mbstore")).await.unwrap()),
		remote.clone(),
		credentials.clone(),
		ImageCache::new(dir.path().join("images")),
		Some(user_id),
	)
	.await
	.unwrap();

	SessionHarness {
		dir,
		user_id,
		remote,
		credentials,
		session,
	}
}
