use mybar_remote_api::{BarItemDto, CocktailDto, RemovedCocktailDto};

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use super::PendingActionKind;

#[derive(thiserror::Error, Debug)]
pub enum PayloadError {
	#[error("failed to encode {kind} payload: {source}")]
	Encode {
		kind: PendingActionKind,
		source: serde_json::Error,
	},
	#[error("failed to decode {kind} payload: {source}")]
	Decode {
		kind: PendingActionKind,
		source: serde_json::Error,
	},
}

/// Typed payload of a pending action, one variant per [`PendingActionKind`].
///
/// On disk each variant is stored as the plain JSON of its inner value, the kind stored next
/// to it selects the shape on the way back.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionPayload {
	AddBarItem(BarItemDto),
	DeleteBarItem(BarItemDto),
	AddFavorite(String),
	DeleteFavorite(String),
	AddRemoved(RemovedCocktailDto),
	DeleteRemoved(RemovedCocktailDto),
	AddCocktail(CocktailDto),
	EditCocktail(CocktailDto),
	DeleteCocktail(Uuid),
}

impl ActionPayload {
	#[must_use]
	pub const fn kind(&self) -> PendingActionKind {
		match self {
			Self::AddBarItem(_) => PendingActionKind::AddBarItem,
			Self::DeleteBarItem(_) => PendingActionKind::DeleteBarItem,
			Self::AddFavorite(_) => PendingActionKind::AddFavorite,
			Self::DeleteFavorite(_) => PendingActionKind::DeleteFavorite,
			Self::AddRemoved(_) => PendingActionKind::AddRemoved,
			Self::DeleteRemoved(_) => PendingActionKind::DeleteRemoved,
			Self::AddCocktail(_) => PendingActionKind::AddCocktail,
			Self::EditCocktail(_) => PendingActionKind::EditCocktail,
			Self::DeleteCocktail(_) => PendingActionKind::DeleteCocktail,
		}
	}

	pub fn encode(&self) -> Result<Vec<u8>, PayloadError> {
		match self {
			Self::AddBarItem(item) | Self::DeleteBarItem(item) => encode_value(self.kind(), item),
			Self::AddFavorite(id) | Self::DeleteFavorite(id) => encode_value(self.kind(), id),
			Self::AddRemoved(removed) | Self::DeleteRemoved(removed) => {
				encode_value(self.kind(), removed)
			}
			Self::AddCocktail(cocktail) | Self::EditCocktail(cocktail) => {
				encode_value(self.kind(), cocktail)
			}
			Self::DeleteCocktail(id) => encode_value(self.kind(), id),
		}
	}

	/// The one place where stored payload bytes are interpreted.
	pub fn decode(kind: PendingActionKind, bytes: &[u8]) -> Result<Self, PayloadError> {
		use PendingActionKind as Kind;

		Ok(match kind {
			Kind::AddBarItem => Self::AddBarItem(decode_value(kind, bytes)?),
			Kind::DeleteBarItem => Self::DeleteBarItem(decode_value(kind, bytes)?),
			Kind::AddFavorite => Self::AddFavorite(decode_value(kind, bytes)?),
			Kind::DeleteFavorite => Self::DeleteFavorite(decode_value(kind, bytes)?),
			Kind::AddRemoved => Self::AddRemoved(decode_value(kind, bytes)?),
			Kind::DeleteRemoved => Self::DeleteRemoved(decode_value(kind, bytes)?),
			Kind::AddCocktail => Self::AddCocktail(decode_value(kind, bytes)?),
			Kind::EditCocktail => Self::EditCocktail(decode_value(kind, bytes)?),
			Kind::DeleteCocktail => Self::DeleteCocktail(decode_value(kind, bytes)?),
		})
	}
}

pub(crate) fn encode_value(
	kind: PendingActionKind,
	value: &(impl Serialize + ?Sized),
) -> Result<Vec<u8>, PayloadError> {
	serde_json::to_vec(value).map_err(|source| PayloadError::Encode { kind, source })
}

fn decode_value<T: DeserializeOwned>(
	kind: PendingActionKind,
	bytes: &[u8],
) -> Result<T, PayloadError> {
	serde_json::from_slice(bytes).map_err(|source| PayloadError::Decode { kind, source })
}
