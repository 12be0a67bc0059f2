//! Guesses a [`BarItemCategory`] from a free text bar item name.

use super::BarItemCategory;

const KEYWORDS: &[(BarItemCategory, &[&str])] = &[
	(
		BarItemCategory::Liquor,
		&[
			"gin",
			"vodka",
			"rum",
			"rhum",
			"whiskey",
			"whisky",
			"bourbon",
			"rye",
			"scotch",
			"tequila",
			"mezcal",
			"brandy",
			"cognac",
			"armagnac",
			"calvados",
			"pisco",
			"cachaca",
			"absinthe",
			"vermouth",
			"campari",
			"aperol",
			"chartreuse",
			"amaretto",
			"liqueur",
			"triple sec",
			"cointreau",
			"curacao",
			"maraschino",
			"sherry",
			"port",
			"champagne",
			"prosecco",
			"wine",
		],
	),
	(
		BarItemCategory::Juice,
		&[
			"juice",
			"lime",
			"lemon",
			"orange",
			"grapefruit",
			"pineapple",
			"cranberry",
			"apple",
			"passion fruit",
			"tomato",
		],
	),
	(
		BarItemCategory::Sweetener,
		&[
			"syrup",
			"sugar",
			"honey",
			"agave",
			"grenadine",
			"orgeat",
			"falernum",
			"demerara",
			"maple",
			"cordial",
		],
	),
	(
		BarItemCategory::Bitter,
		&["bitters", "bitter", "angostura", "peychaud's", "peychauds"],
	),
	(
		BarItemCategory::Mixer,
		&[
			"soda",
			"tonic",
			"cola",
			"ginger beer",
			"ginger ale",
			"water",
			"lemonade",
			"espresso",
			"coffee",
			"cream",
			"milk",
			"egg",
		],
	),
];

/// Categorises a bar item by whole word keyword matching on its name.
///
/// Matching ignores case and common Latin diacritics. When several categories match, the one
/// with the highest priority wins; equal priorities resolve in declaration order.
#[must_use]
pub fn categorize(name: &str) -> BarItemCategory {
	let name_words = words(name);

	KEYWORDS
		.iter()
		.filter(|(_, keywords)| {
			keywords
				.iter()
				.any(|keyword| contains_phrase(&name_words, &words(keyword)))
		})
		.map(|(category, _)| *category)
		.fold(BarItemCategory::Other, |best, category| {
			if category.priority() > best.priority() {
				category
			} else {
				best
			}
		})
}

fn words(text: &str) -> Vec<String> {
	fold_diacritics(&text.to_lowercase())
		.split(|c: char| !(c.is_alphanumeric() || c == '\''))
		.filter(|word| !word.is_empty())
		.map(ToString::to_string)
		.collect()
}

fn contains_phrase(words: &[String], phrase: &[String]) -> bool {
	!phrase.is_empty() && words.windows(phrase.len()).any(|window| window == phrase)
}

fn fold_diacritics(text: &str) -> String {
	text.chars()
		.map(|c| match c {
			'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
			'ç' => 'c',
			'è' | 'é' | 'ê' | 'ë' => 'e',
			'ì' | 'í' | 'î' | 'ï' => 'i',
			'ñ' => 'n',
			'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
			'ù' | 'ú' | 'û' | 'ü' => 'u',
			'ý' | 'ÿ' => 'y',
			'’' => '\'',
			c => c,
		})
		.collect()
}
