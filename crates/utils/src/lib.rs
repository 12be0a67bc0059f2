pub mod error;

use std::path::Path;

use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use error::FileIOError;

/// Replaces the file at `path` with `contents` without ever exposing a partially written file.
///
/// The bytes land in a sibling temporary file first, are flushed to disk and then renamed
/// over the destination, so a crash leaves either the old or the new contents behind.
pub async fn write_atomically(path: impl AsRef<Path>, contents: &[u8]) -> Result<(), FileIOError> {
	let path = path.as_ref();

	let tmp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));

	let mut file = fs::File::create(&tmp_path)
		.await
		.map_err(|e| FileIOError::from((&tmp_path, e, "failed to create temporary file")))?;

	let write_res = async {
		file.write_all(contents).await?;
		file.sync_all().await
	}
	.await;

	if let Err(e) = write_res {
		drop(file);
		fs::remove_file(&tmp_path).await.ok();
		return Err(FileIOError::from((&tmp_path, e, "failed to write temporary file")));
	}

	drop(file);

	if let Err(e) = fs::rename(&tmp_path, path).await {
		fs::remove_file(&tmp_path).await.ok();
		return Err(FileIOError::from((path, e, "failed to replace file")));
	}

	Ok(())
}

/// Reads a whole file, mapping "not found" to `None`.
pub async fn read_if_exists(path: impl AsRef<Path>) -> Result<Option<Vec<u8>>, FileIOError> {
	let path = path.as_ref();

	match fs::read(path).await {
		Ok(bytes) => Ok(Some(bytes)),
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
		Err(e) => Err(FileIOError::from((path, e))),
	}
}
