use std::path::{Path, PathBuf};

use log::debug;

use crate::error::CorpusError;
use crate::io::{is_plain_file_name, list_files};

/// Read-only view over a directory of corpus chapters (plain text files).
///
/// Unrelated to generation: it lets a host display the text a model was
/// trained from.
#[derive(Debug, Clone)]
pub struct Corpus {
	root: PathBuf,
}

impl Corpus {
	/// Opens a corpus directory.
	///
	/// The directory is not required to exist yet; listing it will fail
	/// until it does.
	pub fn new<P: AsRef<Path>>(root: P) -> Self {
		Self {
			root: root.as_ref().to_path_buf(),
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Lists chapter file names, sorted.
	pub fn list_chapters(&self) -> Result<Vec<String>, CorpusError> {
		Ok(list_files(&self.root, None)?)
	}

	/// Returns the raw text of one chapter.
	///
	/// # Errors
	/// - `InvalidName` if `name` is not a plain file name.
	/// - `NotFound` if no such chapter exists.
	pub fn read_chapter(&self, name: &str) -> Result<String, CorpusError> {
		if !is_plain_file_name(name) {
			return Err(CorpusError::InvalidName(name.to_owned()));
		}
		let path = self.root.join(name);
		if !path.is_file() {
			return Err(CorpusError::NotFound(name.to_owned()));
		}
		debug!("Reading chapter {}", path.display());
		Ok(std::fs::read_to_string(path)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lists_and_reads_chapters() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("2_red_headed_league.txt"), "Mr. Jabez Wilson").unwrap();
		std::fs::write(dir.path().join("1_scandal_in_bohemia.txt"), "To Sherlock Holmes").unwrap();

		let corpus = Corpus::new(dir.path());
		assert_eq!(
			corpus.list_chapters().unwrap(),
			vec!["1_scandal_in_bohemia.txt", "2_red_headed_league.txt"]
		);
		assert_eq!(corpus.read_chapter("1_scandal_in_bohemia.txt").unwrap(), "To Sherlock Holmes");
	}

	#[test]
	fn rejects_escaping_names() {
		let dir = tempfile::tempdir().unwrap();
		let corpus = Corpus::new(dir.path().join("chapters"));
		assert!(matches!(corpus.read_chapter("../model.json"), Err(CorpusError::InvalidName(_))));
		assert!(matches!(corpus.read_chapter("missing.txt"), Err(CorpusError::NotFound(_))));
	}

	#[test]
	fn missing_directory_is_an_io_error() {
		let dir = tempfile::tempdir().unwrap();
		let corpus = Corpus::new(dir.path().join("nope"));
		assert!(matches!(corpus.list_chapters(), Err(CorpusError::Io(_))));
	}
}
