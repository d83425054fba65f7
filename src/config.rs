//! Loads the project configuration from a `notehouse.yaml` file. The file is
//! looked up in the starting directory and then in each of its parents. All
//! of its fields are optional:
//!
//! ```yaml
//! notes_directory: notes
//! index_file: index.html
//! manifest_file: notes_index.json
//! list_class: entry-list
//! catch_all: latest
//! sections: [latest, tech, life, books, travel]
//! ```
//!
//! Relative paths are resolved against the directory holding the project
//! file.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The name of the project file.
pub const PROJECT_FILE: &str = "notehouse.yaml";

/// The section every note is inserted into, whatever its category.
pub const DEFAULT_CATCH_ALL: &str = "latest";

/// The allowed categories when the project file doesn't list any.
pub const DEFAULT_SECTIONS: [&str; 5] = [DEFAULT_CATCH_ALL, "tech", "life", "books", "travel"];

pub const DEFAULT_LIST_CLASS: &str = "entry-list";

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Project {
    notes_directory: PathBuf,
    index_file: PathBuf,
    manifest_file: PathBuf,
    list_class: String,
    catch_all: String,
    sections: Vec<String>,
}

impl Default for Project {
    fn default() -> Self {
        Project {
            notes_directory: PathBuf::from("notes"),
            index_file: PathBuf::from("index.html"),
            manifest_file: PathBuf::from("notes_index.json"),
            list_class: DEFAULT_LIST_CLASS.to_owned(),
            catch_all: DEFAULT_CATCH_ALL.to_owned(),
            sections: DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The resolved configuration for a build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The directory holding the note source files.
    pub notes_directory: PathBuf,

    /// The host HTML document which notes are inserted into.
    pub index_file: PathBuf,

    /// Where the manifest for the client renderer is written.
    pub manifest_file: PathBuf,

    /// The class identifying a section's entry list.
    pub list_class: String,

    /// The section which receives every note. Always one of `sections`.
    pub catch_all: String,

    /// The allowed category identifiers.
    pub sections: Vec<String>,
}

impl Config {
    /// Returns the default configuration rooted at `root`.
    pub fn with_root(root: &Path) -> Config {
        Project::default().resolve(root)
    }

    /// Searches `dir` and its ancestors for a [`PROJECT_FILE`] and loads the
    /// first one found. Falls back to [`Config::with_root`] for `dir` if
    /// there is none. A relative `dir` is taken relative to the current
    /// directory, so `.` searches the current directory's parents too.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let dir = std::env::current_dir().map_err(Error::CurrentDir)?.join(dir);
        for ancestor in dir.ancestors() {
            let path = ancestor.join(PROJECT_FILE);
            if path.is_file() {
                debug!(path = %path.display(), "loading project file");
                return Config::from_project_file(&path);
            }
        }
        debug!(root = %dir.display(), "no project file found; using defaults");
        Ok(Config::with_root(&dir))
    }

    /// Loads the configuration from a specific project file.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = std::fs::File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        let config = project.resolve(root);
        config.validate()?;
        Ok(config)
    }

    /// Reports whether `category` is one of the configured sections.
    pub fn is_section(&self, category: &str) -> bool {
        self.sections.iter().any(|s| s == category)
    }

    fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            return Err(Error::Invalid("`sections` must not be empty".to_owned()));
        }
        if !self.is_section(&self.catch_all) {
            return Err(Error::Invalid(format!(
                "`catch_all` section `{}` is not one of `sections`",
                self.catch_all
            )));
        }
        Ok(())
    }
}

impl Project {
    fn resolve(self, root: &Path) -> Config {
        Config {
            notes_directory: root.join(self.notes_directory),
            index_file: root.join(self.index_file),
            manifest_file: root.join(self.manifest_file),
            list_class: self.list_class,
            catch_all: self.catch_all,
            sections: self.sections,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when the project file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid YAML or has unknown fields.
    Parse {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned when the values don't make sense together.
    Invalid(String),

    /// Returned when a relative start directory can't be resolved because
    /// the current directory is unavailable.
    CurrentDir(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening project file '{}': {}", path.display(), err)
            }
            Error::Parse { path, err } => {
                write!(f, "Parsing project file '{}': {}", path.display(), err)
            }
            Error::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::CurrentDir(err) => write!(f, "Resolving current directory: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Parse { path: _, err } => Some(err),
            Error::Invalid(_) => None,
            Error::CurrentDir(err) => Some(err),
        }
    }
}
