//! Local mutations that update cached state and queue their sync in one commit.

mod bar;
mod catalog;

pub use bar::{BarService, CurrentBar};
pub use catalog::CatalogService;
