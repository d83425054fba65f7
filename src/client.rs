//! The client-side rendering path. The page fetches the manifest, then each
//! note in manifest order, and appends one entry per note to an entry list.
//! [`render`] performs the same steps against a [`NoteSource`], which lets the
//! page be pre-rendered from the files on disk ([`FsSource`]).
//!
//! Notes are parsed with [`ParseOptions::client`], so bodies are flowed into
//! a single paragraph. They go through the same escaping renderer as the
//! build paths.

use crate::config::Config;
use crate::dom::Document;
use crate::note::{Note, ParseOptions};
use crate::render::fragment;
use crate::section;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the client renderer gets its manifest and notes from.
pub trait NoteSource {
    /// Returns the note file names in display order.
    fn manifest(&self) -> Result<Vec<String>>;

    /// Returns the source text of the note `name`.
    fn note(&self, name: &str) -> Result<String>;
}

/// A [`NoteSource`] reading a manifest file and a notes directory.
pub struct FsSource<'a> {
    pub manifest_file: &'a Path,
    pub notes_directory: &'a Path,
}

impl<'a> FsSource<'a> {
    pub fn new(config: &'a Config) -> Self {
        FsSource {
            manifest_file: &config.manifest_file,
            notes_directory: &config.notes_directory,
        }
    }
}

impl NoteSource for FsSource<'_> {
    fn manifest(&self) -> Result<Vec<String>> {
        let contents = read(self.manifest_file)?;
        serde_json::from_str(&contents).map_err(|err| Error::Manifest {
            path: self.manifest_file.to_owned(),
            err,
        })
    }

    fn note(&self, name: &str) -> Result<String> {
        read(&self.notes_directory.join(name))
    }
}

/// Appends an entry for every note listed by `source` to the entry list of
/// `section_id`, in manifest order. The first note that can't be fetched
/// stops the rendering with an error.
pub fn render<S: NoteSource>(
    source: &S,
    document: &str,
    section_id: &str,
    list_class: &str,
) -> Result<String> {
    // Locate the list up front so a missing section fails before any fetch.
    if section::find_list(&Document::parse(document), section_id, list_class).is_none() {
        return Err(Error::SectionMissing(section_id.to_owned()));
    }

    let mut document = document.to_owned();
    for name in source.manifest()? {
        let note = Note::parse(&source.note(&name)?, &ParseOptions::client());
        debug!(file = %name, title = %note.title, "appending note");
        document = section::append(&document, section_id, list_class, &fragment(&note))
            .ok_or_else(|| Error::SectionMissing(section_id.to_owned()))?;
    }
    Ok(document)
}

/// Renders the catch-all section of the configured host document from the
/// manifest and notes on disk. The host document itself isn't modified.
pub fn render_page(config: &Config) -> Result<String> {
    let document = read(&config.index_file)?;
    render(
        &FsSource::new(config),
        &document,
        &config.catch_all,
        &config.list_class,
    )
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| Error::Fetch {
        path: path.to_owned(),
        err,
    })
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure while rendering on the client path.
#[derive(Debug)]
pub enum Error {
    /// Returned when the manifest or a note can't be fetched.
    Fetch { path: PathBuf, err: std::io::Error },

    /// Returned when the manifest isn't a JSON array of strings.
    Manifest {
        path: PathBuf,
        err: serde_json::Error,
    },

    /// Returned when the target entry list doesn't exist.
    SectionMissing(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Fetch { path, err } => write!(f, "Fetching '{}': {}", path.display(), err),
            Error::Manifest { path, err } => {
                write!(f, "Malformed manifest '{}': {}", path.display(), err)
            }
            Error::SectionMissing(id) => write!(f, "Entry list for section '{}' not found", id),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Fetch { path: _, err } => Some(err),
            Error::Manifest { path: _, err } => Some(err),
            Error::SectionMissing(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    const PAGE: &str = "<ul id=\"latest-entry-list\" class=\"entry-list\">\n</ul>\n";

    struct MemorySource {
        manifest: Vec<&'static str>,
        notes: HashMap<&'static str, &'static str>,
    }

    impl NoteSource for MemorySource {
        fn manifest(&self) -> Result<Vec<String>> {
            Ok(self.manifest.iter().map(|s| s.to_string()).collect())
        }

        fn note(&self, name: &str) -> Result<String> {
            match self.notes.get(name) {
                Some(text) => Ok(text.to_string()),
                None => Err(Error::Fetch {
                    path: PathBuf::from(name),
                    err: std::io::Error::new(std::io::ErrorKind::NotFound, "404"),
                }),
            }
        }
    }

    fn source(manifest: Vec<&'static str>) -> MemorySource {
        let mut notes = HashMap::new();
        notes.insert("b.md", "# B\ntags: t\n  first line \n\n second line\n");
        notes.insert("a.md", "# A\n<script>x</script>");
        MemorySource { manifest, notes }
    }

    #[test]
    fn test_render_appends_in_manifest_order() {
        let html = render(&source(vec!["b.md", "a.md"]), PAGE, "latest-entry-list", "entry-list")
            .unwrap();
        assert!(html.find("<h3>B</h3>").unwrap() < html.find("<h3>A</h3>").unwrap());
        assert!(html.contains("<p>first line second line</p>"));
        assert!(!html.contains("<script>"));
        assert!(html.ends_with("</li>\n</ul>\n"));
    }

    #[test]
    fn test_failed_fetch_stops_rendering() {
        let result = render(
            &source(vec!["b.md", "gone.md", "a.md"]),
            PAGE,
            "latest-entry-list",
            "entry-list",
        );
        assert!(matches!(result, Err(Error::Fetch { .. })));
    }

    #[test]
    fn test_missing_list() {
        let result = render(&source(vec!["a.md"]), PAGE, "latest", "entry-list");
        assert!(matches!(result, Err(Error::SectionMissing(_))));
    }

    #[test]
    fn test_render_page_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_root(dir.path());
        fs::create_dir(&config.notes_directory).unwrap();
        fs::write(config.notes_directory.join("2024-01-01.md"), "# On disk\nhello").unwrap();
        fs::write(&config.manifest_file, r#"["2024-01-01.md"]"#).unwrap();
        fs::write(
            &config.index_file,
            "<section id=\"latest\"><ul class=\"entry-list\"></ul></section>",
        )
        .unwrap();

        let html = render_page(&config).unwrap();
        assert!(html.contains("<h3>On disk</h3>"));
        // The host document is left alone.
        assert!(!fs::read_to_string(&config.index_file).unwrap().contains("<h3>"));
    }

    #[test]
    fn test_malformed_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_root(dir.path());
        fs::write(&config.manifest_file, r#"{"not": "a list"}"#).unwrap();
        assert!(matches!(
            FsSource::new(&config).manifest(),
            Err(Error::Manifest { .. })
        ));
    }
}
