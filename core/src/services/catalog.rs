use crate::{
	actions::ActionPayload,
	domain::Cocktail,
	queue::ActionQueueService,
	store::{Change, ImageCache, LocalStore},
	Error,
};

use mybar_remote_api::CocktailDto;
use mybar_utils::error::report_error;

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

/// Local create, edit and delete of catalog entries.
///
/// The cache is updated and the upload queued in one commit, the server copy is reconciled
/// back on the next catalog fetch.
#[derive(Clone)]
pub struct CatalogService {
	store: Arc<dyn LocalStore>,
	queue: ActionQueueService,
	images: ImageCache,
}

impl CatalogService {
	pub fn new(store: Arc<dyn LocalStore>, queue: ActionQueueService, images: ImageCache) -> Self {
		Self {
			store,
			queue,
			images,
		}
	}

	/// Every cached cocktail, sorted by name.
	pub async fn cocktails(&self) -> Result<Vec<Cocktail>, Error> {
		let mut cocktails = self
			.store
			.fetch_cocktails(&|_: &Cocktail| true)
			.await?;

		cocktails.sort_by_key(|cocktail| cocktail.name.to_lowercase());

		Ok(cocktails)
	}

	pub async fn get(&self, id: Uuid) -> Result<Option<Cocktail>, Error> {
		Ok(self
			.store
			.fetch_cocktails(&move |cocktail: &Cocktail| cocktail.id == id)
			.await?
			.into_iter()
			.next())
	}

	/// Image bytes of a cached cocktail, read from the image cache on demand.
	pub async fn image(&self, id: Uuid) -> Result<Option<Vec<u8>>, Error> {
		Ok(self.images.load(id).await?)
	}

	pub async fn create_cocktail(&self, cocktail: Cocktail) -> Result<(), Error> {
		let payload = ActionPayload::AddCocktail(CocktailDto::from(&cocktail));

		debug!(cocktail_id = %cocktail.id, "Creating cocktail locally;");

		self.queue
			.commit_with(&payload, Change::PutCocktail(cocktail).into())
			.await
			.map(|_| ())
	}

	pub async fn update_cocktail(&self, cocktail: Cocktail) -> Result<(), Error> {
		if self.get(cocktail.id).await?.is_none() {
			return Err(Error::CocktailNotFound(cocktail.id));
		}

		let payload = ActionPayload::EditCocktail(CocktailDto::from(&cocktail));

		self.queue
			.commit_with(&payload, Change::PutCocktail(cocktail).into())
			.await
			.map(|_| ())
	}

	pub async fn delete_cocktail(&self, id: Uuid) -> Result<Cocktail, Error> {
		let cocktail = self.get(id).await?.ok_or(Error::CocktailNotFound(id))?;

		self.queue
			.commit_with(
				&ActionPayload::DeleteCocktail(id),
				Change::DeleteCocktail(id).into(),
			)
			.await?;

		report_error(
			&self.images.remove(id).await,
			"Failed to remove cached image of deleted cocktail",
		);

		Ok(cocktail)
	}
}
