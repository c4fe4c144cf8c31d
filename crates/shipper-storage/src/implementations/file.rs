//! File-based storage backend.
//!
//! A `namespace:id` key lives at `<base>/<namespace>/<id>.json`, so the
//! session record ends up as `session/auth.json`: readable, editable by hand
//! and easy to delete to force a new wallet sign-in. Records carry the user's
//! wallet identity and are created owner-only on unix.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const DEFAULT_STORAGE_PATH: &str = "./data/session";
const RECORD_EXTENSION: &str = "json";

/// Stores one JSON record per key under a base directory.
pub struct FileStorage {
	base_path: PathBuf,
	/// Distinguishes temp files of concurrent writers in this process.
	write_seq: AtomicU64,
}

impl FileStorage {
	/// Creates a backend rooted at `base_path`. Directories are created on
	/// first write.
	pub fn new(base_path: PathBuf) -> Self {
		Self {
			base_path,
			write_seq: AtomicU64::new(0),
		}
	}

	/// Directory holding the records.
	pub fn base_path(&self) -> &Path {
		&self.base_path
	}

	/// Maps a key to its record path. Each `:`-separated segment becomes a
	/// path component and must be a plain name.
	fn record_path(&self, key: &str) -> Result<PathBuf, StorageError> {
		let segments: Vec<&str> = key.split(':').collect();
		let valid = segments.iter().all(|segment| {
			!segment.is_empty()
				&& *segment != "."
				&& *segment != ".."
				&& !segment.contains(['/', '\\'])
		});
		if !valid {
			return Err(StorageError::Backend(format!(
				"Invalid storage key '{}'",
				key
			)));
		}

		let (file, dirs) = match segments.split_last() {
			Some(split) => split,
			None => return Err(StorageError::Backend("Empty storage key".to_string())),
		};
		let mut path = self.base_path.clone();
		path.extend(dirs);
		path.push(format!("{}.{}", file, RECORD_EXTENSION));
		Ok(path)
	}

	fn temp_path(&self, path: &Path) -> PathBuf {
		let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
		let name = path
			.file_name()
			.map(|n| n.to_string_lossy().into_owned())
			.unwrap_or_default();
		path.with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), seq))
	}
}

fn backend_error(path: &Path, e: std::io::Error) -> StorageError {
	StorageError::Backend(format!("{}: {}", path.display(), e))
}

async fn write_record(path: &Path, value: &[u8]) -> std::io::Result<()> {
	let mut options = fs::OpenOptions::new();
	options.write(true).create_new(true);
	#[cfg(unix)]
	options.mode(0o600);

	let mut file = options.open(path).await?;
	file.write_all(value).await?;
	file.sync_all().await
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.record_path(key)?;

		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(backend_error(&path, e)),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.record_path(key)?;
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| backend_error(parent, e))?;
		}

		// Readers see either the old record or the new one, never a partial write.
		let temp_path = self.temp_path(&path);
		let written = match write_record(&temp_path, &value).await {
			Ok(()) => fs::rename(&temp_path, &path).await,
			Err(e) => Err(e),
		};
		if let Err(e) = written {
			let _ = fs::remove_file(&temp_path).await;
			return Err(backend_error(&path, e));
		}
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.record_path(key)?;

		match fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(backend_error(&path, e)),
		}
	}
}

/// Creates a file storage backend from the `[session]` table.
///
/// Configuration parameters:
/// - `storage_path`: base directory for records (default: `"./data/session"`)
pub fn create_storage(config: &toml::Value) -> Box<dyn StorageInterface> {
	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_STORAGE_PATH);

	Box::new(FileStorage::new(PathBuf::from(storage_path)))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_round_trip_and_delete() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		assert!(matches!(
			storage.get_bytes("session:auth").await,
			Err(StorageError::NotFound)
		));

		storage
			.set_bytes("session:auth", b"{\"verified\":true}".to_vec())
			.await
			.unwrap();
		assert!(dir.path().join("session").join("auth.json").exists());
		assert_eq!(
			storage.get_bytes("session:auth").await.unwrap(),
			b"{\"verified\":true}".to_vec()
		);

		storage.delete("session:auth").await.unwrap();
		// deleting twice is fine
		storage.delete("session:auth").await.unwrap();
		assert!(matches!(
			storage.get_bytes("session:auth").await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_overwrite_leaves_no_temp_files() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path().join("nested"));
		storage.set_bytes("session:auth", b"1".to_vec()).await.unwrap();
		storage.set_bytes("session:auth", b"22".to_vec()).await.unwrap();

		assert_eq!(storage.get_bytes("session:auth").await.unwrap(), b"22".to_vec());
		let names: Vec<_> = std::fs::read_dir(dir.path().join("nested").join("session"))
			.unwrap()
			.map(|entry| entry.unwrap().file_name())
			.collect();
		assert_eq!(names, vec![std::ffi::OsString::from("auth.json")]);
	}

	#[tokio::test]
	async fn test_rejects_keys_escaping_base() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path().join("base"));
		for key in ["", "session:", "..:auth", "session:../auth", "a/b", "a\\b"] {
			assert!(
				matches!(
					storage.set_bytes(key, b"x".to_vec()).await,
					Err(StorageError::Backend(_))
				),
				"key {:?} accepted",
				key
			);
		}
		assert!(!dir.path().join("base").exists());
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn test_records_are_owner_only() {
		use std::os::unix::fs::PermissionsExt;

		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());
		storage.set_bytes("session:auth", b"{}".to_vec()).await.unwrap();

		let mode = std::fs::metadata(dir.path().join("session").join("auth.json"))
			.unwrap()
			.permissions()
			.mode();
		assert_eq!(mode & 0o777, 0o600);
	}

	#[tokio::test]
	async fn test_factory_uses_storage_path() {
		let dir = tempfile::tempdir().unwrap();
		let mut table = toml::Table::new();
		table.insert(
			"storage_path".to_string(),
			toml::Value::String(dir.path().display().to_string()),
		);

		let storage = create_storage(&toml::Value::Table(table));
		storage.set_bytes("session:auth", b"{}".to_vec()).await.unwrap();
		assert!(dir.path().join("session").join("auth.json").exists());

		let file = FileStorage::new(dir.path().to_path_buf());
		assert_eq!(file.base_path(), dir.path());
	}
}
