use crate::{actions::PayloadError, store::StoreError};

use mybar_utils::error::FileIOError;

use uuid::Uuid;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error(transparent)]
	Remote(#[from] mybar_remote_api::Error),
	#[error(transparent)]
	Store(#[from] StoreError),
	#[error(transparent)]
	Payload(#[from] PayloadError),
	#[error(transparent)]
	ImageCache(#[from] FileIOError),
	#[error("no bar found for {}", .0.map_or_else(|| "guest".to_string(), |id| format!("user <id='{id}'>")))]
	BarNotFound(Option<Uuid>),
	#[error("cocktail <id='{0}'> is not cached locally")]
	CocktailNotFound(Uuid),
	#[error("a signed in user is required")]
	MissingCredential,
}

impl Error {
	/// Whether the failure is worth retrying once connectivity is back.
	#[must_use]
	pub fn is_network(&self) -> bool {
		matches!(self, Self::Remote(e) if e.is_network())
	}
}
