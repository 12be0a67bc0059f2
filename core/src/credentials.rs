//! Access to the signed in user's credential.
//!
//! Signing in and out is handled elsewhere, the sync core only asks whether a credential is
//! currently available.

use mybar_remote_api::AuthToken;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait CredentialProvider: Send + Sync {
	async fn token(&self) -> Option<AuthToken>;
}

#[derive(Debug, Clone)]
pub struct Credential {
	pub user_id: Uuid,
	pub token: AuthToken,
}

/// In-memory credential, updated by the auth flow on login and logout.
#[derive(Debug, Default)]
pub struct StaticCredentials {
	current: RwLock<Option<Credential>>,
}

impl StaticCredentials {
	#[must_use]
	pub fn signed_in(user_id: Uuid, token: AuthToken) -> Self {
		Self {
			current: RwLock::new(Some(Credential { user_id, token })),
		}
	}

	pub async fn sign_in(&self, user_id: Uuid, token: AuthToken) {
		*self.current.write().await = Some(Credential { user_id, token });
	}

	pub async fn sign_out(&self) {
		self.current.write().await.take();
	}

	pub async fn user_id(&self) -> Option<Uuid> {
		self.current.read().await.as_ref().map(|c| c.user_id)
	}
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
	async fn token(&self) -> Option<AuthToken> {
		self.current.read().await.as_ref().map(|c| c.token.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn sign_in_and_out() {
		let credentials = StaticCredentials::default();
		assert!(credentials.token().await.is_none());

		let user_id = Uuid::new_v4();
		credentials.sign_in(user_id, AuthToken::new("secret")).await;
		assert_eq!(credentials.token().await, Some(AuthToken::new("secret")));
		assert_eq!(credentials.user_id().await, Some(user_id));

		credentials.sign_out().await;
		assert!(credentials.token().await.is_none());
	}
}
