use std::path::{Path, PathBuf};

use fstask::{Catalog, load_definition};
use walkdir::WalkDir;

use crate::error::{CliError, ExitStatus};
use crate::util::Verbosity;

const DEFINITION_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

pub struct CliSession {
    pub catalog: Catalog,
    pub catalog_dir: Option<PathBuf>,
    pub verbosity: Verbosity,
}

impl CliSession {
    /// Starts from the built-in tasks and layers every definition found under
    /// `catalog_dir` on top, in file name order.
    pub fn bootstrap(catalog_dir: Option<PathBuf>, verbosity: Verbosity) -> Result<Self, CliError> {
        let mut catalog = Catalog::builtin()?.clone();

        if let Some(dir) = &catalog_dir {
            if !dir.is_dir() {
                return Err(CliError::new(
                    format!("catalog directory '{}' does not exist", dir.display()),
                    ExitStatus::Config,
                ));
            }
            for path in definition_files(dir)? {
                let schema = load_definition(&path)
                    .map_err(|err| CliError::new(err.to_string(), ExitStatus::Config))?;
                tracing::debug!(task = schema.name(), path = %path.display(), "registered task definition");
                catalog.insert(schema);
            }
        }

        Ok(Self {
            catalog,
            catalog_dir,
            verbosity,
        })
    }

    pub fn catalog_source(&self) -> String {
        match &self.catalog_dir {
            Some(dir) => format!("built-in + {}", dir.display()),
            None => "built-in".to_string(),
        }
    }
}

fn definition_files(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|err| CliError::new(err.to_string(), ExitStatus::Io))?;
        if entry.file_type().is_file() && is_definition(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_definition(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DEFINITION_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
