use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use ignore::gitignore::Gitignore;

use crate::MdxError;
use crate::MdxResult;
use crate::naming::is_hidden_name;

/// Replace `path` with `contents` in one step.
///
/// The content goes to a sibling temporary file which is then renamed over
/// the target, so readers never observe a partially written file.
pub fn write_atomic(path: &Path, contents: &str) -> MdxResult<()> {
	let file_name = path
		.file_name()
		.map_or_else(String::new, |name| name.to_string_lossy().into_owned());
	let temp_path = path.with_file_name(format!(
		".{file_name}.tmp-{}-{}",
		std::process::id(),
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map_or(0, |duration| duration.as_nanos())
	));

	std::fs::write(&temp_path, contents).map_err(|e| MdxError::write(path, e))?;

	if let Err(e) = std::fs::rename(&temp_path, path) {
		let _ = std::fs::remove_file(&temp_path);
		return Err(MdxError::write(path, e));
	}

	Ok(())
}

/// The visible children of one directory, each list sorted by name.
#[derive(Debug, Default)]
pub struct DirListing {
	pub dirs: Vec<PathBuf>,
	pub files: Vec<PathBuf>,
}

/// Decides which entries a walk may visit.
#[derive(Debug, Clone)]
pub struct WalkFilter {
	exclude: Gitignore,
}

impl Default for WalkFilter {
	fn default() -> Self {
		Self {
			exclude: Gitignore::empty(),
		}
	}
}

impl WalkFilter {
	pub fn new(exclude: Gitignore) -> Self {
		Self { exclude }
	}

	pub fn allows(&self, path: &Path, is_dir: bool) -> bool {
		let hidden = path
			.file_name()
			.and_then(|name| name.to_str())
			.is_some_and(is_hidden_name);

		!hidden && !self.exclude.matched(path, is_dir).is_ignore()
	}

	/// List the visible entries of `dir`.
	pub fn list(&self, dir: &Path) -> MdxResult<DirListing> {
		let mut listing = DirListing::default();
		let entries = std::fs::read_dir(dir).map_err(|e| MdxError::read(dir, e))?;

		for entry in entries {
			let path = entry.map_err(|e| MdxError::read(dir, e))?.path();
			let is_dir = path.is_dir();
			if !self.allows(&path, is_dir) {
				continue;
			}

			if is_dir {
				listing.dirs.push(path);
			} else if path.is_file() {
				listing.files.push(path);
			}
		}

		listing.dirs.sort();
		listing.files.sort();
		Ok(listing)
	}

	/// Every visible directory under `root`, `root` first, parents before
	/// children. Directories reached twice through symlinks are visited once.
	pub fn directories(&self, root: &Path) -> MdxResult<Vec<PathBuf>> {
		let mut dirs = Vec::new();
		let mut visited = HashSet::new();
		self.collect_directories(root, &mut dirs, &mut visited)?;
		Ok(dirs)
	}

	fn collect_directories(
		&self,
		dir: &Path,
		dirs: &mut Vec<PathBuf>,
		visited: &mut HashSet<PathBuf>,
	) -> MdxResult<()> {
		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
		if !visited.insert(canonical) {
			tracing::warn!(path = %dir.display(), "skipping directory already visited");
			return Ok(());
		}

		dirs.push(dir.to_path_buf());
		for child in self.list(dir)?.dirs {
			self.collect_directories(&child, dirs, visited)?;
		}

		Ok(())
	}

	/// Every visible file under `root`, sorted by path.
	pub fn files(&self, root: &Path) -> MdxResult<Vec<PathBuf>> {
		let mut files = Vec::new();
		for dir in self.directories(root)? {
			files.extend(self.list(&dir)?.files);
		}
		files.sort();
		Ok(files)
	}
}

/// Fail unless `root` is an existing directory.
pub fn ensure_directory(root: &Path) -> MdxResult<()> {
	if root.is_dir() {
		Ok(())
	} else {
		Err(MdxError::NotADirectory(root.display().to_string()))
	}
}
