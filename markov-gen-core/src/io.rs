use std::path::{Component, Path, PathBuf};
use std::{fs, io};

/// Path of the binary cache kept next to a model source.
///
/// `data/sherlock.json` → `data/sherlock.bin`
pub fn cache_path(source: &Path) -> PathBuf {
	source.with_extension("bin")
}

/// Model name derived from its source file: `data/sherlock.json` → `sherlock`.
pub fn model_name(source: &Path) -> io::Result<String> {
	match source.file_stem() {
		Some(stem) => Ok(stem.to_string_lossy().into_owned()),
		None => Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("{} does not name a model file", source.display()),
		)),
	}
}

/// True when `source` was modified after `derived`.
pub fn modified_after(source: &Path, derived: &Path) -> io::Result<bool> {
	let source = fs::metadata(source)?.modified()?;
	let derived = fs::metadata(derived)?.modified()?;
	Ok(source > derived)
}

/// Lists the files of a directory, optionally filtered by extension.
///
/// Returns file names only (no paths), sorted.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: Option<&str>) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if !path.is_file() {
			continue;
		}
		if let Some(extension) = extension {
			if path.extension() != Some(std::ffi::OsStr::new(extension)) {
				continue;
			}
		}
		if let Some(name) = path.file_name() {
			files.push(name.to_string_lossy().to_string());
		}
	}

	files.sort();
	Ok(files)
}

/// True if `name` is a single, plain path component.
///
/// Rejects empty names, separators, `.` and `..`, so that a user-supplied
/// name cannot escape the directory it is joined to.
pub fn is_plain_file_name(name: &str) -> bool {
	let mut components = Path::new(name).components();
	matches!(
		(components.next(), components.next()),
		(Some(Component::Normal(_)), None)
	) && !name.contains(['/', '\\'])
}
