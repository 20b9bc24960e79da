//! Input classification and expansion

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use url::Url;
use walkdir::WalkDir;

/// One thing to probe, as typed on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// http or https URI
    Http(String),
    /// Any other absolute URI, handed to the driver's protocol layer
    Uri(String),
    /// Standard input, read forward only
    Stdin,
    Path(PathBuf),
}

impl Input {
    pub fn classify(raw: &str) -> Self {
        if raw == "-" {
            return Input::Stdin;
        }
        match Url::parse(raw) {
            // Single-letter schemes are Windows drive letters
            Ok(url) if url.scheme().len() > 1 => match url.scheme() {
                "http" | "https" => Input::Http(raw.to_string()),
                _ => Input::Uri(raw.to_string()),
            },
            _ => Input::Path(PathBuf::from(raw)),
        }
    }

    /// Display form used in reports
    pub fn label(&self) -> String {
        match self {
            Input::Http(uri) | Input::Uri(uri) => uri.clone(),
            Input::Stdin => "-".to_string(),
            Input::Path(path) => path.display().to_string(),
        }
    }
}

/// Classify raw arguments, expanding directories when `recursive` is set.
///
/// Directory contents are sorted so output order is stable.
pub fn expand(raw: &[String], recursive: bool) -> Result<Vec<Input>> {
    let mut inputs = Vec::new();
    let mut stdin_seen = false;

    for arg in raw {
        match Input::classify(arg) {
            Input::Path(path) if path.is_dir() => {
                if !recursive {
                    bail!("'{}' is a directory (use --recursive)", path.display());
                }
                inputs.extend(walk(&path).into_iter().map(Input::Path));
            }
            Input::Stdin => {
                if stdin_seen {
                    bail!("standard input can only be probed once");
                }
                stdin_seen = true;
                inputs.push(Input::Stdin);
            }
            input => inputs.push(input),
        }
    }

    Ok(inputs)
}

fn walk(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}
