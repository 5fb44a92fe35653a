//! Suggested workspace layout
//!
//! The README proposes six top-level folders. This module gives them a
//! closed type, checks which ones exist under a workspace root, flags large
//! files committed under `datasets/`, and can scaffold the missing folders.

use crate::error::WorkspaceError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Contributor-facing folder convention from the Document Index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Subfolder {
    Notebooks,
    Implementations,
    Papers,
    Datasets,
    Slides,
    Resources,
}

impl Subfolder {
    /// All folders in README order.
    pub const ALL: [Subfolder; 6] = [
        Subfolder::Notebooks,
        Subfolder::Implementations,
        Subfolder::Papers,
        Subfolder::Datasets,
        Subfolder::Slides,
        Subfolder::Resources,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            Subfolder::Notebooks => "notebooks",
            Subfolder::Implementations => "implementations",
            Subfolder::Papers => "papers",
            Subfolder::Datasets => "datasets",
            Subfolder::Slides => "slides",
            Subfolder::Resources => "resources",
        }
    }

    pub fn intended_content(self) -> &'static str {
        match self {
            Subfolder::Notebooks => "interactive experiment files",
            Subfolder::Implementations => "reference code/demos",
            Subfolder::Papers => "reference PDFs and notes",
            Subfolder::Datasets => "data-preparation scripts (no large data committed)",
            Subfolder::Slides => "presentation material",
            Subfolder::Resources => "curated links",
        }
    }

    /// Accepts the bare name or the name with a trailing slash.
    pub fn from_dir_name(name: &str) -> Option<Subfolder> {
        let name = name.trim().trim_end_matches('/');
        Subfolder::ALL.into_iter().find(|f| f.dir_name() == name)
    }
}

/// File under `datasets/` that exceeds the configured size limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OversizedFile {
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LayoutReport {
    pub present: Vec<Subfolder>,
    pub missing: Vec<Subfolder>,
    pub oversized: Vec<OversizedFile>,
}

impl LayoutReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Inspect `root` against the folder convention.
pub fn inspect(root: &Path, max_dataset_file_bytes: u64) -> Result<LayoutReport, WorkspaceError> {
    if !root.is_dir() {
        return Err(WorkspaceError::NotADirectory(root.to_path_buf()));
    }

    let mut report = LayoutReport::default();
    for folder in Subfolder::ALL {
        if root.join(folder.dir_name()).is_dir() {
            report.present.push(folder);
        } else {
            report.missing.push(folder);
        }
    }

    let datasets = root.join(Subfolder::Datasets.dir_name());
    if datasets.is_dir() {
        collect_oversized(&datasets, max_dataset_file_bytes, &mut report.oversized)?;
        report.oversized.sort_by(|a, b| a.path.cmp(&b.path));
    }

    tracing::debug!(
        "Layout at {}: {} present, {} missing, {} oversized dataset files",
        root.display(),
        report.present.len(),
        report.missing.len(),
        report.oversized.len()
    );

    Ok(report)
}

fn collect_oversized(
    dir: &Path,
    limit: u64,
    out: &mut Vec<OversizedFile>,
) -> Result<(), WorkspaceError> {
    let entries = fs::read_dir(dir).map_err(|e| WorkspaceError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| WorkspaceError::io(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| WorkspaceError::io(&path, e))?;
        if meta.is_dir() {
            collect_oversized(&path, limit, out)?;
        } else if meta.len() > limit {
            out.push(OversizedFile {
                path,
                bytes: meta.len(),
            });
        }
    }
    Ok(())
}

/// Create every missing folder with an empty `.gitkeep`.
///
/// Returns the folders that were created; existing folders are left untouched.
pub fn scaffold(root: &Path) -> Result<Vec<Subfolder>, WorkspaceError> {
    if !root.is_dir() {
        return Err(WorkspaceError::NotADirectory(root.to_path_buf()));
    }

    let mut created = Vec::new();
    for folder in Subfolder::ALL {
        let dir = root.join(folder.dir_name());
        if dir.is_dir() {
            continue;
        }
        fs::create_dir_all(&dir).map_err(|e| WorkspaceError::io(&dir, e))?;
        let keep = dir.join(".gitkeep");
        fs::write(&keep, b"").map_err(|e| WorkspaceError::io(&keep, e))?;
        tracing::info!("Created {}/", folder.dir_name());
        created.push(folder);
    }
    Ok(created)
}
