//! The durable log of local mutations the server has not confirmed yet.

mod payload;

pub use payload::{ActionPayload, PayloadError};

pub(crate) use payload::encode_value;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	PartialOrd,
	Ord,
	Serialize,
	Deserialize,
	Display,
	EnumString,
	AsRefStr,
	EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum PendingActionKind {
	AddBarItem,
	DeleteBarItem,
	AddFavorite,
	DeleteFavorite,
	AddRemoved,
	DeleteRemoved,
	AddCocktail,
	EditCocktail,
	DeleteCocktail,
}

impl PendingActionKind {
	/// Bar kinds only make sense for a signed in user, draining them without a credential is a
	/// no-op. Catalog kinds attach a credential when one is available.
	#[must_use]
	pub const fn requires_credential(self) -> bool {
		!matches!(
			self,
			Self::AddCocktail | Self::EditCocktail | Self::DeleteCocktail
		)
	}
}

/// A queued mutation. The payload is opaque to the log and only interpreted through
/// [`ActionPayload::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
	pub id: Uuid,
	pub kind: PendingActionKind,
	pub payload: Vec<u8>,
	pub created_at: DateTime<Utc>,
}

impl PendingAction {
	#[must_use]
	pub fn new(kind: PendingActionKind, payload: Vec<u8>) -> Self {
		Self {
			id: Uuid::new_v4(),
			kind,
			payload,
			created_at: Utc::now(),
		}
	}

	pub fn decode(&self) -> Result<ActionPayload, PayloadError> {
		ActionPayload::decode(self.kind, &self.payload)
	}
}
