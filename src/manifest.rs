//! Builds the manifest consumed by the client renderer: a JSON array of note
//! file names, newest first.
//!
//! Note files are expected to start with a sortable date (e.g.
//! `2024-03-01-hello.md`), so sorting the names in descending order puts the
//! most recent notes first. The notes themselves aren't parsed.

use crate::config::Config;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// The extension of note source files.
pub const NOTE_EXTENSION: &str = ".md";

/// Lists the note files directly inside `dir`, sorted by file name in
/// descending order.
pub fn note_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for result in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) if name.ends_with(NOTE_EXTENSION) => files.push(name.to_owned()),
            Some(_) => {}
            None => warn!(path = %entry.path().display(), "skipping non-UTF-8 file name"),
        }
    }
    files.sort_by(|a, b| b.cmp(a));
    Ok(files)
}

/// Writes `files` to `w` as a JSON array.
pub fn write_json<W: Write>(files: &[String], w: W) -> Result<()> {
    serde_json::to_writer_pretty(w, files)?;
    Ok(())
}

/// Lists the notes in the configured notes directory and writes the
/// manifest file. Returns the number of notes listed.
pub fn write_manifest(config: &Config) -> Result<usize> {
    let files = note_files(&config.notes_directory)?;
    let path = &config.manifest_file;
    let file = File::create(path).map_err(|err| Error::Create {
        path: path.to_owned(),
        err,
    })?;
    let mut w = BufWriter::new(file);
    write_json(&files, &mut w)?;
    w.write_all(b"\n")?;
    w.flush()?;
    info!(notes = files.len(), path = %path.display(), "wrote manifest");
    Ok(files.len())
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem listing notes or writing the manifest.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors walking the notes directory.
    WalkDir(walkdir::Error),

    /// Returned when the manifest file can't be created.
    Create { path: PathBuf, err: std::io::Error },

    /// Returned when serializing the manifest fails.
    Json(serde_json::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::WalkDir(err) => write!(f, "Listing notes: {}", err),
            Error::Create { path, err } => {
                write!(f, "Creating manifest '{}': {}", path.display(), err)
            }
            Error::Json(err) => write!(f, "Writing manifest: {}", err),
            Error::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::WalkDir(err) => Some(err),
            Error::Create { path: _, err } => Some(err),
            Error::Json(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator while walking the notes directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_note_files_sorted_descending() -> Result<()> {
        let dir = tempfile::tempdir()?;
        for name in &["2024-01-01.md", "2024-03-01.md", "2023-12-31-late.md", "notes.txt"] {
            fs::write(dir.path().join(name), "# x")?;
        }
        fs::create_dir(dir.path().join("2025-01-01.md"))?;
        fs::create_dir(dir.path().join("drafts"))?;
        fs::write(dir.path().join("drafts").join("2026-01-01.md"), "# nested")?;

        assert_eq!(
            note_files(dir.path())?,
            vec!["2024-03-01.md", "2024-01-01.md", "2023-12-31-late.md"]
        );
        Ok(())
    }

    #[test]
    fn test_missing_directory() {
        assert!(matches!(
            note_files(Path::new("./testdata/no-such-dir")),
            Err(Error::WalkDir(_))
        ));
    }

    #[test]
    fn test_write_manifest() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::with_root(dir.path());
        fs::create_dir(&config.notes_directory)?;
        fs::write(config.notes_directory.join("2024-01-01.md"), "# a")?;
        fs::write(config.notes_directory.join("2024-03-01.md"), "# b")?;

        assert_eq!(write_manifest(&config)?, 2);
        let written: Vec<String> =
            serde_json::from_str(&fs::read_to_string(&config.manifest_file)?)?;
        assert_eq!(written, vec!["2024-03-01.md", "2024-01-01.md"]);
        Ok(())
    }

    #[test]
    fn test_empty_manifest() -> Result<()> {
        let mut out = Vec::new();
        write_json(&[], &mut out)?;
        assert_eq!(String::from_utf8(out).unwrap(), "[]");
        Ok(())
    }
}
