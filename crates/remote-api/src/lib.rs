//! Client for the cocktail server's HTTP/JSON API.
//!
//! Every endpoint lives in its own module exposing an `exec` function that takes a
//! [`RequestConfig`]. [`HttpRemoteApi`] bundles them behind the [`RemoteApi`] trait, which is the
//! seam the sync core depends on.

pub mod dto;
mod error;

use std::{fmt, time::Duration};

use async_trait::async_trait;
pub use reqwest::Url;
use uuid::Uuid;

pub use dto::{BarItemDto, CocktailDto, IngredientDto, MyBarDto, RemovedCocktailDto};
pub use error::Error;

use error::check;

pub const COCKTAILS: &str = "cocktails";
pub const MY_BAR: &str = "mybar";

/// Bearer credential of a signed in user.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
	pub fn new(token: impl Into<String>) -> Self {
		Self(token.into())
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for AuthToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("AuthToken(<redacted>)")
	}
}

pub struct RequestConfig {
	pub client: reqwest::Client,
	pub api_url: Url,
	pub auth_token: Option<AuthToken>,
}

impl RequestConfig {
	fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
		endpoint(&self.api_url, segments)
	}

	fn require_auth(&self) -> Result<&AuthToken, Error> {
		self.auth_token.as_ref().ok_or(Error::Unauthorized)
	}
}

/// Appends path segments to `base`, percent-encoding each one.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, Error> {
	let mut url = base.clone();

	url.path_segments_mut()
		.map_err(|()| Error::InvalidUrl(base.to_string()))?
		.pop_if_empty()
		.extend(segments);

	Ok(url)
}

/// Resolves an image reference found on a cocktail.
///
/// Absolute `http(s)` references are used as is, server relative `/Images/...` paths are
/// resolved against `base` and anything else must parse as a URL on its own.
pub fn resolve_image_url(base: &Url, reference: &str) -> Result<Url, Error> {
	if reference.starts_with("http://") || reference.starts_with("https://") {
		Url::parse(reference).map_err(|_| Error::InvalidUrl(reference.to_string()))
	} else if let Some(relative) = reference.strip_prefix('/').filter(|r| r.starts_with("Images/")) {
		endpoint(base, &relative.split('/').collect::<Vec<_>>())
	} else {
		Url::parse(reference).map_err(|_| Error::InvalidUrl(reference.to_string()))
	}
}

trait WithAuth {
	fn with_auth(self, token: &AuthToken) -> Self;
	fn with_optional_auth(self, token: Option<&AuthToken>) -> Self;
}

impl WithAuth for reqwest::RequestBuilder {
	fn with_auth(self, token: &AuthToken) -> Self {
		self.bearer_auth(token.as_str())
	}

	fn with_optional_auth(self, token: Option<&AuthToken>) -> Self {
		match token {
			Some(token) => self.with_auth(token),
			None => self,
		}
	}
}

pub mod cocktails {
	use super::*;

	pub use list::exec as list;
	pub mod list {
		use super::*;

		pub async fn exec(config: RequestConfig) -> Result<Response, Error> {
			let response = config
				.client
				.get(config.endpoint(&[COCKTAILS])?)
				.send()
				.await?;

			check(response).await?.json().await.map_err(Into::into)
		}

		pub type Response = Vec<CocktailDto>;
	}

	pub use probe::exec as probe;
	pub mod probe {
		use super::*;

		/// `HEAD /cocktails`, any 2xx means the server is reachable.
		pub async fn exec(config: RequestConfig) -> Result<bool, Error> {
			let response = config
				.client
				.head(config.endpoint(&[COCKTAILS])?)
				.send()
				.await?;

			Ok(response.status().is_success())
		}
	}

	pub use create::exec as create;
	pub mod create {
		use super::*;

		pub async fn exec(config: RequestConfig, cocktail: &CocktailDto) -> Result<(), Error> {
			let response = config
				.client
				.post(config.endpoint(&[COCKTAILS])?)
				.with_optional_auth(config.auth_token.as_ref())
				.json(cocktail)
				.send()
				.await?;

			check(response).await.map(|_| ())
		}
	}

	pub use update::exec as update;
	pub mod update {
		use super::*;

		pub async fn exec(config: RequestConfig, cocktail: &CocktailDto) -> Result<(), Error> {
			let response = config
				.client
				.put(config.endpoint(&[COCKTAILS, &cocktail.id.to_string()])?)
				.with_optional_auth(config.auth_token.as_ref())
				.json(cocktail)
				.send()
				.await?;

			check(response).await.map(|_| ())
		}
	}

	pub use delete::exec as delete;
	pub mod delete {
		use super::*;

		pub async fn exec(config: RequestConfig, id: Uuid) -> Result<(), Error> {
			let response = config
				.client
				.delete(config.endpoint(&[COCKTAILS, &id.to_string()])?)
				.with_optional_auth(config.auth_token.as_ref())
				.send()
				.await?;

			check(response).await.map(|_| ())
		}
	}
}

pub mod images {
	use super::*;

	pub use fetch::exec as fetch;
	pub mod fetch {
		use super::*;

		pub async fn exec(config: RequestConfig, reference: &str) -> Result<Vec<u8>, Error> {
			let url = resolve_image_url(&config.api_url, reference)?;

			let response = config.client.get(url).send().await?;

			Ok(check(response).await?.bytes().await?.to_vec())
		}
	}
}

pub mod my_bar {
	use super::*;

	pub use get::exec as get;
	pub mod get {
		use super::*;

		pub async fn exec(config: RequestConfig) -> Result<MyBarDto, Error> {
			let response = config
				.client
				.get(config.endpoint(&[MY_BAR])?)
				.with_auth(config.require_auth()?)
				.send()
				.await?;

			check(response).await?.json().await.map_err(Into::into)
		}
	}

	pub mod items {
		use super::*;

		pub async fn add(config: RequestConfig, item: &BarItemDto) -> Result<(), Error> {
			let response = config
				.client
				.post(config.endpoint(&[MY_BAR, "items"])?)
				.with_auth(config.require_auth()?)
				.json(item)
				.send()
				.await?;

			check(response).await.map(|_| ())
		}

		pub async fn remove(config: RequestConfig, name: &str) -> Result<(), Error> {
			let response = config
				.client
				.delete(config.endpoint(&[MY_BAR, "items", name])?)
				.with_auth(config.require_auth()?)
				.send()
				.await?;

			check(response).await.map(|_| ())
		}
	}

	pub mod favorites {
		use super::*;

		pub async fn add(config: RequestConfig, cocktail_id: &str) -> Result<(), Error> {
			let response = config
				.client
				.post(config.endpoint(&[MY_BAR, "favorites", cocktail_id])?)
				.with_auth(config.require_auth()?)
				.send()
				.await?;

			check(response).await.map(|_| ())
		}

		pub async fn remove(config: RequestConfig, cocktail_id: &str) -> Result<(), Error> {
			let response = config
				.client
				.delete(config.endpoint(&[MY_BAR, "favorites", cocktail_id])?)
				.with_auth(config.require_auth()?)
				.send()
				.await?;

			check(response).await.map(|_| ())
		}
	}

	pub mod removed {
		use super::*;

		pub async fn add(config: RequestConfig, removed: &RemovedCocktailDto) -> Result<(), Error> {
			let response = config
				.client
				.post(config.endpoint(&[MY_BAR, "removed"])?)
				.with_auth(config.require_auth()?)
				.json(removed)
				.send()
				.await?;

			check(response).await.map(|_| ())
		}

		pub async fn remove(config: RequestConfig, cocktail_id: &str) -> Result<(), Error> {
			let response = config
				.client
				.delete(config.endpoint(&[MY_BAR, "removed", cocktail_id])?)
				.with_auth(config.require_auth()?)
				.send()
				.await?;

			check(response).await.map(|_| ())
		}
	}
}

/// Everything the sync core needs from the server.
///
/// Bar endpoints always take a credential, catalog writes attach one when available.
#[async_trait]
pub trait RemoteApi: Send + Sync {
	async fn fetch_cocktails(&self) -> Result<Vec<CocktailDto>, Error>;

	/// Liveness probe, transport failures count as unreachable.
	async fn is_reachable(&self) -> bool;

	async fn fetch_image(&self, reference: &str) -> Result<Vec<u8>, Error>;

	async fn create_cocktail(
		&self,
		token: Option<&AuthToken>,
		cocktail: &CocktailDto,
	) -> Result<(), Error>;

	async fn update_cocktail(
		&self,
		token: Option<&AuthToken>,
		cocktail: &CocktailDto,
	) -> Result<(), Error>;

	async fn delete_cocktail(&self, token: Option<&AuthToken>, id: Uuid) -> Result<(), Error>;

	async fn fetch_my_bar(&self, token: &AuthToken) -> Result<MyBarDto, Error>;

	async fn add_bar_item(&self, token: &AuthToken, item: &BarItemDto) -> Result<(), Error>;

	async fn delete_bar_item(&self, token: &AuthToken, name: &str) -> Result<(), Error>;

	async fn add_favorite(&self, token: &AuthToken, cocktail_id: &str) -> Result<(), Error>;

	async fn delete_favorite(&self, token: &AuthToken, cocktail_id: &str) -> Result<(), Error>;

	async fn add_removed(&self, token: &AuthToken, removed: &RemovedCocktailDto)
		-> Result<(), Error>;

	async fn delete_removed(&self, token: &AuthToken, cocktail_id: &str) -> Result<(), Error>;
}

/// [`RemoteApi`] over HTTP.
#[derive(Clone)]
pub struct HttpRemoteApi {
	client: reqwest::Client,
	api_url: Url,
}

impl fmt::Debug for HttpRemoteApi {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HttpRemoteApi")
			.field("api_url", &self.api_url.as_str())
			.finish_non_exhaustive()
	}
}

impl HttpRemoteApi {
	/// Builds a client whose every request gives up after `timeout`.
	pub fn new(api_url: &str, timeout: Duration) -> Result<Self, Error> {
		let api_url = Url::parse(api_url).map_err(|_| Error::InvalidUrl(api_url.to_string()))?;

		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| Error::Network(e.to_string()))?;

		Ok(Self { client, api_url })
	}

	#[must_use]
	pub fn api_url(&self) -> &Url {
		&self.api_url
	}

	fn config(&self, auth_token: Option<&AuthToken>) -> RequestConfig {
		RequestConfig {
			client: self.client.clone(),
			api_url: self.api_url.clone(),
			auth_token: auth_token.cloned(),
		}
	}
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
	async fn fetch_cocktails(&self) -> Result<Vec<CocktailDto>, Error> {
		cocktails::list(self.config(None)).await
	}

	async fn is_reachable(&self) -> bool {
		cocktails::probe(self.config(None)).await.unwrap_or(false)
	}

	async fn fetch_image(&self, reference: &str) -> Result<Vec<u8>, Error> {
		images::fetch(self.config(None), reference).await
	}

	async fn create_cocktail(
		&self,
		token: Option<&AuthToken>,
		cocktail: &CocktailDto,
	) -> Result<(), Error> {
		cocktails::create(self.config(token), cocktail).await
	}

	async fn update_cocktail(
		&self,
		token: Option<&AuthToken>,
		cocktail: &CocktailDto,
	) -> Result<(), Error> {
		cocktails::update(self.config(token), cocktail).await
	}

	async fn delete_cocktail(&self, token: Option<&AuthToken>, id: Uuid) -> Result<(), Error> {
		cocktails::delete(self.config(token), id).await
	}

	async fn fetch_my_bar(&self, token: &AuthToken) -> Result<MyBarDto, Error> {
		my_bar::get(self.config(Some(token))).await
	}

	async fn add_bar_item(&self, token: &AuthToken, item: &BarItemDto) -> Result<(), Error> {
		my_bar::items::add(self.config(Some(token)), item).await
	}

	async fn delete_bar_item(&self, token: &AuthToken, name: &str) -> Result<(), Error> {
		my_bar::items::remove(self.config(Some(token)), name).await
	}

	async fn add_favorite(&self, token: &AuthToken, cocktail_id: &str) -> Result<(), Error> {
		my_bar::favorites::add(self.config(Some(token)), cocktail_id).await
	}

	async fn delete_favorite(&self, token: &AuthToken, cocktail_id: &str) -> Result<(), Error> {
		my_bar::favorites::remove(self.config(Some(token)), cocktail_id).await
	}

	async fn add_removed(
		&self,
		token: &AuthToken,
		removed: &RemovedCocktailDto,
	) -> Result<(), Error> {
		my_bar::removed::add(self.config(Some(token)), removed).await
	}

	async fn delete_removed(&self, token: &AuthToken, cocktail_id: &str) -> Result<(), Error> {
		my_bar::removed::remove(self.config(Some(token)), cocktail_id).await
	}
}
