//! Exports the orchestration functions which stitch the pieces together:
//! [`insert_note`] parses a single note ([`crate::note`]), renders it
//! ([`crate::render`]) and inserts it into the host document
//! ([`crate::section`]); [`rebuild_section`] regenerates a whole section from
//! every note on disk. Both read the host document once and write it at most
//! once, so a failed validation never leaves a partial update behind.

use crate::config::Config;
use crate::manifest::{self, Error as ManifestError};
use crate::note::{Note, ParseOptions};
use crate::render;
use crate::section::{self, Insertion};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The result of a successful [`insert_note`].
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The note was inserted into these sections, in order.
    Inserted { sections: Vec<String> },

    /// An entry with the same title already exists in the host document, so
    /// nothing was written.
    Duplicate,
}

/// Inserts the note `note_name` into the section `category` and, unless
/// `category` is the catch-all section, into the catch-all section too.
///
/// `note_name` is resolved against the notes directory first; if there is no
/// such file there, it's used as a path as-is.
pub fn insert_note(config: &Config, note_name: &str, category: &str) -> Result<Outcome> {
    if !config.is_section(category) {
        return Err(Error::UnknownCategory {
            category: category.to_owned(),
            allowed: config.sections.clone(),
        });
    }

    let path = resolve_note(config, note_name)?;
    let note = Note::parse(&read(&path)?, &ParseOptions::build());
    if !note.has_title() {
        return Err(Error::MissingTitle(path));
    }

    let document = read(&config.index_file)?;
    if section::contains_title(&document, &note.title) {
        info!(title = %note.title, "note already published; skipping");
        return Ok(Outcome::Duplicate);
    }

    let mut targets = vec![category];
    if category != config.catch_all {
        targets.push(&config.catch_all);
    }

    let fragment = render::fragment(&note);
    let mut updated = document;
    let mut sections = Vec::with_capacity(targets.len());
    for section_id in targets {
        match section::insert(&updated, section_id, &config.list_class, &fragment, &note.title) {
            Insertion::Inserted(document) => {
                debug!(section = section_id, title = %note.title, "inserted entry");
                updated = document;
                sections.push(section_id.to_owned());
            }
            Insertion::Duplicate => {
                info!(section = section_id, title = %note.title, "section already has entry; skipping");
            }
            Insertion::SectionMissing => {
                return Err(Error::SectionMissing {
                    section: section_id.to_owned(),
                    path: config.index_file.clone(),
                })
            }
        }
    }

    write(&config.index_file, &updated)?;
    info!(
        title = %note.title,
        sections = ?sections,
        path = %config.index_file.display(),
        "published note"
    );
    Ok(Outcome::Inserted { sections })
}

/// Replaces the entries of `section_id` (the catch-all section if `None`) with
/// every note in the notes directory, newest file name first. Returns the
/// number of entries written.
pub fn rebuild_section(config: &Config, section_id: Option<&str>) -> Result<usize> {
    let section_id = section_id.unwrap_or(&config.catch_all);
    if !config.is_section(section_id) {
        return Err(Error::UnknownCategory {
            category: section_id.to_owned(),
            allowed: config.sections.clone(),
        });
    }

    let mut fragments = Vec::new();
    for file_name in manifest::note_files(&config.notes_directory)? {
        let path = config.notes_directory.join(&file_name);
        let note = Note::parse(&read(&path)?, &ParseOptions::build());
        if !note.has_title() {
            return Err(Error::MissingTitle(path));
        }
        debug!(file = %file_name, title = %note.title, "rendered note");
        fragments.push(render::fragment(&note));
    }

    let document = read(&config.index_file)?;
    let updated = section::replace(&document, section_id, &config.list_class, &fragments)
        .ok_or_else(|| Error::SectionMissing {
            section: section_id.to_owned(),
            path: config.index_file.clone(),
        })?;
    write(&config.index_file, &updated)?;
    info!(
        section = section_id,
        entries = fragments.len(),
        path = %config.index_file.display(),
        "rebuilt section"
    );
    Ok(fragments.len())
}

fn resolve_note(config: &Config, note_name: &str) -> Result<PathBuf> {
    let in_notes = config.notes_directory.join(note_name);
    if in_notes.is_file() {
        return Ok(in_notes);
    }
    let as_given = PathBuf::from(note_name);
    if as_given.is_file() {
        return Ok(as_given);
    }
    Err(Error::NoteNotFound(in_notes))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| Error::Read {
        path: path.to_owned(),
        err,
    })
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|err| Error::Write {
        path: path.to_owned(),
        err,
    })
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for the build operations. Everything except I/O problems
/// is a validation failure detected before anything is written.
#[derive(Debug)]
pub enum Error {
    /// Returned when the category isn't one of the configured sections.
    UnknownCategory {
        category: String,
        allowed: Vec<String>,
    },

    /// Returned when the note file doesn't exist.
    NoteNotFound(PathBuf),

    /// Returned when a note has no `# ` title line.
    MissingTitle(PathBuf),

    /// Returned when the host document has no section (or no entry list)
    /// for a section id.
    SectionMissing { section: String, path: PathBuf },

    /// Returned when a file can't be read.
    Read { path: PathBuf, err: std::io::Error },

    /// Returned when the host document can't be written.
    Write { path: PathBuf, err: std::io::Error },

    /// Returned when the notes directory can't be listed.
    Manifest(ManifestError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnknownCategory { category, allowed } => write!(
                f,
                "Unknown category '{}' (expected one of: {})",
                category,
                allowed.join(", ")
            ),
            Error::NoteNotFound(path) => write!(f, "Note file '{}' not found", path.display()),
            Error::MissingTitle(path) => write!(
                f,
                "Note '{}' has no title (expected a line starting with '# ')",
                path.display()
            ),
            Error::SectionMissing { section, path } => write!(
                f,
                "Section '{}' or its entry list not found in '{}'",
                section,
                path.display()
            ),
            Error::Read { path, err } => write!(f, "Reading '{}': {}", path.display(), err),
            Error::Write { path, err } => write!(f, "Writing '{}': {}", path.display(), err),
            Error::Manifest(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
            Error::Write { path: _, err } => Some(err),
            Error::Manifest(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ManifestError> for Error {
    /// Converts [`ManifestError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: ManifestError) -> Error {
        Error::Manifest(err)
    }
}
