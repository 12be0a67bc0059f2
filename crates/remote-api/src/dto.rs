//! Wire representations exchanged with the cocktail server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CocktailDto {
	pub id: Uuid,
	pub name: String,
	pub creator: String,
	pub style: String,
	pub comment: String,
	pub cocktail_category: String,
	#[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
	pub image_url: Option<String>,
	#[serde(default)]
	pub ingredients: Vec<IngredientDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDto {
	pub id: Uuid,
	pub volume: f64,
	pub unit: String,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tag: Option<String>,
	pub order_index: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MyBarDto {
	pub id: Uuid,
	pub user_id: Uuid,
	#[serde(default)]
	pub bar_items: Vec<BarItemDto>,
	#[serde(default)]
	pub favorite_cocktails: Vec<String>,
	#[serde(default)]
	pub deleted_cocktails: Vec<RemovedCocktailDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BarItemDto {
	pub name: String,
	/// String form of the bar item category, e.g. `liquor`
	pub category: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RemovedCocktailDto {
	pub id: String,
	pub name: String,
	pub creator: String,
	#[serde(with = "reference_date")]
	pub date: DateTime<Utc>,
}

/// Dates on the wire are seconds since 2001-01-01T00:00:00Z as a floating point number, the
/// default `Date` encoding of the iOS client.
pub mod reference_date {
	use chrono::{DateTime, Utc};
	use serde::{de, Deserialize, Deserializer, Serializer};

	/// 2001-01-01T00:00:00Z as a unix timestamp
	pub const REFERENCE_UNIX_SECS: i64 = 978_307_200;

	const MICROS_PER_SEC: f64 = 1_000_000.0;

	#[must_use]
	pub fn to_seconds(date: &DateTime<Utc>) -> f64 {
		(date.timestamp_micros() - REFERENCE_UNIX_SECS * 1_000_000) as f64 / MICROS_PER_SEC
	}

	#[must_use]
	pub fn from_seconds(seconds: f64) -> Option<DateTime<Utc>> {
		if !seconds.is_finite() {
			return None;
		}

		let micros = ((seconds * MICROS_PER_SEC).round() as i64)
			.checked_add(REFERENCE_UNIX_SECS * 1_000_000)?;

		DateTime::from_timestamp(
			micros.div_euclid(1_000_000),
			(micros.rem_euclid(1_000_000) * 1_000) as u32,
		)
	}

	pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_f64(to_seconds(date))
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
		let seconds = f64::deserialize(deserializer)?;

		from_seconds(seconds).ok_or_else(|| {
			de::Error::custom(format!("date out of range: {seconds} seconds since 2001-01-01"))
		})
	}
}
