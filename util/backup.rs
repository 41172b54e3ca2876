use crate::datetime::datetime_compact;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Move an existing file aside into a `backup` directory next to it, suffixing the file name with the current UTC datetime. Does nothing when the file does not exist. Returns the path the file was moved to, if any.
pub fn backup_file(path: &Path) -> Result<Option<PathBuf>> {
	if !path.is_file() {
		return Ok(None);
	}
	let parent = path.parent().unwrap_or_else(|| Path::new("."));
	let backup_dir = parent.join("backup");
	std::fs::create_dir_all(&backup_dir)?;
	let stem = path
		.file_stem()
		.map(|stem| stem.to_string_lossy().into_owned())
		.unwrap_or_default();
	let extension = path
		.extension()
		.map(|extension| format!(".{}", extension.to_string_lossy()))
		.unwrap_or_default();
	let backup_path = backup_dir.join(format!("{}_{}{}", stem, datetime_compact(), extension));
	std::fs::rename(path, &backup_path)?;
	Ok(Some(backup_path))
}
