//! Lazy iteration over directories of export files, matching on
//! file-name suffixes the way the exports are named.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

fn matches_suffix(path : &Path, suffixes : &[String]) -> bool {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => return false,
    };
    suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

/// Walks `root` recursively, yielding every file whose name
/// ends with any of `suffixes`. Unreadable entries are logged
/// and skipped.
pub fn files_recursively<'a>(
    root : &Path,
    suffixes : &'a [String],
    ) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(move |path| matches_suffix(path, suffixes))
}

/// Yields the files directly under `dir` whose names end with
/// any of `suffixes`, without recursing.
pub fn files_non_recursively<'a>(
    dir : &Path,
    suffixes : &'a [String],
    ) -> Result<impl Iterator<Item = PathBuf> + 'a, std::io::Error> {
    let entries = std::fs::read_dir(dir)?;
    Ok(entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(move |path| matches_suffix(path, suffixes)))
}
