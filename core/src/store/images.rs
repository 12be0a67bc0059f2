use mybar_utils::{error::FileIOError, read_if_exists, write_atomically};

use std::{
	io,
	path::{Path, PathBuf},
};

use tokio::fs;
use uuid::Uuid;

/// Disk cache of downloaded cocktail images, one file per cocktail.
#[derive(Debug, Clone)]
pub struct ImageCache {
	dir: PathBuf,
}

impl ImageCache {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	#[must_use]
	pub fn dir(&self) -> &Path {
		&self.dir
	}

	#[must_use]
	pub fn path_for(&self, cocktail_id: Uuid) -> PathBuf {
		self.dir.join(format!("cocktail_image_{cocktail_id}.jpg"))
	}

	pub async fn store(&self, cocktail_id: Uuid, bytes: &[u8]) -> Result<(), FileIOError> {
		fs::create_dir_all(&self.dir)
			.await
			.map_err(|e| FileIOError::from((&self.dir, e, "failed to create image cache")))?;

		write_atomically(self.path_for(cocktail_id), bytes).await
	}

	pub async fn contains(&self, cocktail_id: Uuid) -> Result<bool, FileIOError> {
		let path = self.path_for(cocktail_id);

		fs::try_exists(&path)
			.await
			.map_err(|e| FileIOError::from((path, e)))
	}

	pub async fn load(&self, cocktail_id: Uuid) -> Result<Option<Vec<u8>>, FileIOError> {
		read_if_exists(self.path_for(cocktail_id)).await
	}

	pub async fn remove(&self, cocktail_id: Uuid) -> Result<(), FileIOError> {
		let path = self.path_for(cocktail_id);

		match fs::remove_file(&path).await {
			Err(e) if e.kind() != io::ErrorKind::NotFound => Err(FileIOError::from((path, e))),
			_ => Ok(()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use tempfile::tempdir;

	#[tokio::test]
	async fn stores_loads_and_removes() {
		let dir = tempdir().unwrap();
		let cache = ImageCache::new(dir.path().join("images"));
		let id = Uuid::new_v4();

		assert!(cache.load(id).await.unwrap().is_none());
		assert!(!cache.contains(id).await.unwrap());

		cache.store(id, b"jpeg").await.unwrap();
		assert!(cache.contains(id).await.unwrap());
		assert_eq!(cache.load(id).await.unwrap().as_deref(), Some(&b"jpeg"[..]));
		assert!(cache
			.path_for(id)
			.ends_with(format!("cocktail_image_{id}.jpg")));

		cache.remove(id).await.unwrap();
		cache.remove(id).await.unwrap();
		assert!(cache.load(id).await.unwrap().is_none());
		assert!(!cache.contains(id).await.unwrap());
	}
}
