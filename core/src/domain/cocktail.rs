//! Locally cached catalog entries.

use mybar_remote_api::{CocktailDto, IngredientDto};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

/// A cocktail as cached on this device.
///
/// The id is the server's stable identifier, everything else is mutable and overwritten on
/// each catalog refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cocktail {
	pub id: Uuid,
	pub name: String,
	pub creator: String,
	pub style: Style,
	pub ingredients: Vec<Ingredient>,
	pub comment: String,
	pub category: CocktailCategory,
	/// Whether the image cache holds a file for this cocktail, the bytes are only kept there
	pub has_image: bool,
	/// The server image reference the cached image was downloaded from
	pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
	pub id: Uuid,
	pub volume: f64,
	pub unit: Unit,
	pub name: String,
	pub tag: Option<IngredientTag>,
	pub order_index: i32,
}

#[derive(
	Debug,
	Default,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	Serialize,
	Deserialize,
	Display,
	EnumString,
	AsRefStr,
	EnumIter,
)]
pub enum Style {
	#[default]
	Shaken,
	Stirred,
	Blended,
	#[strum(serialize = "Flash blended")]
	#[serde(rename = "Flash blended")]
	Flash,
	#[strum(serialize = "Whip shaken")]
	#[serde(rename = "Whip shaken")]
	Whip,
	Mixed,
}

#[derive(
	Debug,
	Default,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	Serialize,
	Deserialize,
	Display,
	EnumString,
	AsRefStr,
	EnumIter,
)]
pub enum CocktailCategory {
	Sour,
	#[strum(serialize = "Highballs and Fizzes")]
	#[serde(rename = "Highballs and Fizzes")]
	Highball,
	#[strum(serialize = "Spirit-Forward")]
	#[serde(rename = "Spirit-Forward")]
	SpiritForward,
	#[strum(serialize = "Mocktails")]
	#[serde(rename = "Mocktails")]
	Mocktail,
	#[strum(serialize = "Tiki Cocktails")]
	#[serde(rename = "Tiki Cocktails")]
	Tiki,
	Duos,
	#[strum(serialize = "Champagne Cocktails")]
	#[serde(rename = "Champagne Cocktails")]
	Champagne,
	#[strum(serialize = "Juleps and Smashes")]
	#[serde(rename = "Juleps and Smashes")]
	Juleps,
	#[strum(serialize = "Dessert Cocktails")]
	#[serde(rename = "Dessert Cocktails")]
	Dessert,
	#[default]
	Other,
}

#[derive(
	Debug,
	Default,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	Serialize,
	Deserialize,
	Display,
	EnumString,
	AsRefStr,
	EnumIter,
)]
pub enum Unit {
	#[default]
	#[strum(serialize = "mL")]
	#[serde(rename = "mL")]
	Ml,
	#[strum(serialize = "cL")]
	#[serde(rename = "cL")]
	Cl,
	#[strum(serialize = "oz")]
	#[serde(rename = "oz")]
	Oz,
	#[strum(serialize = "tsp")]
	#[serde(rename = "tsp")]
	Tsp,
	#[strum(serialize = "dash")]
	#[serde(rename = "dash")]
	Dash,
	#[strum(serialize = "drop")]
	#[serde(rename = "drop")]
	Drop,
	#[strum(serialize = "leaves")]
	#[serde(rename = "leaves")]
	Leaves,
	#[strum(serialize = "piece")]
	#[serde(rename = "piece")]
	Piece,
}

#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	Serialize,
	Deserialize,
	Display,
	EnumString,
	AsRefStr,
	EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IngredientTag {
	Whiskey,
	Rum,
	Gin,
	Brandy,
	Vodka,
	Tequila,
}

impl Style {
	/// Unknown styles coming from the server fall back to the default.
	#[must_use]
	pub fn from_raw(raw: &str) -> Self {
		raw.parse().unwrap_or_default()
	}
}

impl CocktailCategory {
	#[must_use]
	pub fn from_raw(raw: &str) -> Self {
		raw.parse().unwrap_or_default()
	}
}

impl Unit {
	#[must_use]
	pub fn from_raw(raw: &str) -> Self {
		raw.parse().unwrap_or_default()
	}
}

impl Cocktail {
	/// Overwrites the mutable fields with the server's version.
	///
	/// Ingredients are replaced wholesale. Image fields are left alone, they are resolved
	/// separately since that may involve a download.
	pub fn apply_remote(&mut self, dto: &CocktailDto) {
		self.name.clone_from(&dto.name);
		self.creator.clone_from(&dto.creator);
		self.style = Style::from_raw(&dto.style);
		self.comment.clone_from(&dto.comment);
		self.category = CocktailCategory::from_raw(&dto.cocktail_category);
		self.ingredients = dto.ingredients.iter().map(Ingredient::from).collect();
	}
}

impl From<&CocktailDto> for Cocktail {
	fn from(dto: &CocktailDto) -> Self {
		let mut cocktail = Self {
			id: dto.id,
			name: String::new(),
			creator: String::new(),
			style: Style::default(),
			ingredients: vec![],
			comment: String::new(),
			category: CocktailCategory::default(),
			has_image: false,
			image_url: None,
		};

		cocktail.apply_remote(dto);

		cocktail
	}
}

impl From<&Cocktail> for CocktailDto {
	fn from(cocktail: &Cocktail) -> Self {
		Self {
			id: cocktail.id,
			name: cocktail.name.clone(),
			creator: cocktail.creator.clone(),
			style: cocktail.style.to_string(),
			comment: cocktail.comment.clone(),
			cocktail_category: cocktail.category.to_string(),
			image_url: cocktail.image_url.clone(),
			ingredients: cocktail.ingredients.iter().map(IngredientDto::from).collect(),
		}
	}
}

impl From<&IngredientDto> for Ingredient {
	fn from(dto: &IngredientDto) -> Self {
		Self {
			id: dto.id,
			volume: dto.volume,
			unit: Unit::from_raw(&dto.unit),
			name: dto.name.clone(),
			tag: dto.tag.as_deref().and_then(|tag| tag.parse().ok()),
			order_index: dto.order_index,
		}
	}
}

impl From<&Ingredient> for IngredientDto {
	fn from(ingredient: &Ingredient) -> Self {
		Self {
			id: ingredient.id,
			volume: ingredient.volume,
			unit: ingredient.unit.to_string(),
			name: ingredient.name.clone(),
			tag: ingredient.tag.map(|tag| tag.to_string()),
			order_index: ingredient.order_index,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn dto() -> CocktailDto {
		CocktailDto {
			id: Uuid::new_v4(),
			name: "Paper Plane".to_string(),
			creator: "Sam Ross".to_string(),
			style: "Shaken".to_string(),
			comment: "Equal parts".to_string(),
			cocktail_category: "Sour".to_string(),
			image_url: Some("/Images/plane.jpg".to_string()),
			ingredients: vec![IngredientDto {
				id: Uuid::new_v4(),
				volume: 22.5,
				unit: "mL".to_string(),
				name: "Bourbon".to_string(),
				tag: Some("whiskey".to_string()),
				order_index: 0,
			}],
		}
	}

	#[test]
	fn raw_names_round_trip_through_strum() {
		assert_eq!(Style::from_raw("Flash blended"), Style::Flash);
		assert_eq!(Style::Whip.to_string(), "Whip shaken");
		assert_eq!(
			CocktailCategory::from_raw("Highballs and Fizzes"),
			CocktailCategory::Highball
		);
		assert_eq!(Unit::from_raw("cL"), Unit::Cl);
	}

	#[test]
	fn unknown_raw_values_fall_back_to_defaults() {
		assert_eq!(Style::from_raw("Thrown"), Style::Shaken);
		assert_eq!(CocktailCategory::from_raw("Flips"), CocktailCategory::Other);
		assert_eq!(Unit::from_raw("barspoon"), Unit::Ml);
	}

	#[test]
	fn cached_copy_starts_without_image() {
		let dto = dto();
		let cocktail = Cocktail::from(&dto);

		assert_eq!(cocktail.id, dto.id);
		assert_eq!(cocktail.style, Style::Shaken);
		assert_eq!(cocktail.ingredients[0].tag, Some(IngredientTag::Whiskey));
		assert!(!cocktail.has_image);
		assert!(cocktail.image_url.is_none());
	}

	#[test]
	fn apply_remote_replaces_ingredients_and_keeps_image() {
		let dto = dto();
		let mut cocktail = Cocktail::from(&dto);
		cocktail.has_image = true;
		cocktail.image_url = Some("/Images/plane.jpg".to_string());
		cocktail.ingredients.push(Ingredient {
			id: Uuid::new_v4(),
			volume: 1.0,
			unit: Unit::Dash,
			name: "Angostura".to_string(),
			tag: None,
			order_index: 1,
		});

		let mut changed = dto.clone();
		changed.name = "Paper Airplane".to_string();
		changed.cocktail_category = "Other".to_string();

		cocktail.apply_remote(&changed);

		assert_eq!(cocktail.name, "Paper Airplane");
		assert_eq!(cocktail.category, CocktailCategory::Other);
		assert_eq!(cocktail.ingredients.len(), 1);
		assert!(cocktail.has_image);
		assert_eq!(cocktail.image_url.as_deref(), Some("/Images/plane.jpg"));
	}
}
