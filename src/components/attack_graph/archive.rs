//! Collector archives: a zip of `.json` documents, as the collector writes
//! them.

use std::io::{Cursor, Read};

use log::debug;
use zip::ZipArchive;

use super::error::IngestError;

fn read_error(file: &str, reason: impl ToString) -> IngestError {
	IngestError::ArchiveRead {
		file: file.to_string(),
		reason: reason.to_string(),
	}
}

/// Extracts the `.json` entries of a zip archive as `(entry name, text)`
/// pairs, in archive order. Directories and other entries are skipped.
///
/// The entry name becomes the category hint of the records decoded from it.
pub fn unpack_archive(file_name: &str, bytes: &[u8]) -> Result<Vec<(String, String)>, IngestError> {
	let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| read_error(file_name, e))?;
	let mut documents = Vec::new();
	for i in 0..archive.len() {
		let mut entry = archive.by_index(i).map_err(|e| read_error(file_name, e))?;
		if entry.is_dir() || !entry.name().to_lowercase().ends_with(".json") {
			continue;
		}
		let name = entry.name().to_string();
		let mut text = String::new();
		entry
			.read_to_string(&mut text)
			.map_err(|e| read_error(&format!("{file_name}/{name}"), e))?;
		documents.push((name, text));
	}
	debug!("{file_name}: {} json entries", documents.len());
	Ok(documents)
}

/// Whether a selected file should be opened as an archive.
pub fn is_archive(file_name: &str) -> bool {
	file_name.to_lowercase().ends_with(".zip")
}
