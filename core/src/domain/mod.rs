//! Records cached on this device: catalog cocktails and personal bars.

mod bar;
mod categorize;
mod cocktail;

pub use bar::{BarItem, BarItemCategory, PersonalBar, RemovedCocktail};
pub use categorize::categorize;
pub use cocktail::{Cocktail, CocktailCategory, Ingredient, IngredientTag, Style, Unit};

