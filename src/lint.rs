//! README lint suite
//!
//! Presentation-format checks over the Document Index:
//! 1. All six suggested subfolders are named
//! 2. Every heading has text
//! 3. Headings and code fences are well formed

use crate::error::WorkspaceError;
use crate::index::DocumentIndex;
use crate::layout::{LayoutReport, Subfolder};
use serde::Serialize;
use std::path::Path;

pub const CHECK_SUBFOLDERS: &str = "suggested-subfolders";
pub const CHECK_HEADINGS: &str = "non-empty-headings";
pub const CHECK_STRUCTURE: &str = "well-formed-structure";
pub const CHECK_LAYOUT: &str = "workspace-layout";
pub const CHECK_DATASETS: &str = "no-large-dataset-files";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
}

impl CheckResult {
    fn pass(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message,
        }
    }

    fn fail(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    pub results: Vec<CheckResult>,
}

impl LintReport {
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    pub fn get(&self, name: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn summary(&self) -> String {
        let passed = self.results.iter().filter(|r| r.passed).count();
        let failed = self.results.len() - passed;
        format!("{} passed, {} failed", passed, failed)
    }

    pub fn extend(&mut self, other: LintReport) {
        self.results.extend(other.results);
    }
}

pub fn lint_readme(markdown: &str) -> LintReport {
    let index = DocumentIndex::parse(markdown);
    LintReport {
        results: vec![
            check_subfolders(&index),
            check_headings(&index),
            check_structure(&index),
        ],
    }
}

pub fn lint_file(path: &Path) -> Result<LintReport, WorkspaceError> {
    let markdown = std::fs::read_to_string(path).map_err(|e| WorkspaceError::io(path, e))?;
    tracing::debug!("Linting {} ({} bytes)", path.display(), markdown.len());
    Ok(lint_readme(&markdown))
}

fn check_subfolders(index: &DocumentIndex) -> CheckResult {
    let missing: Vec<&str> = Subfolder::ALL
        .into_iter()
        .filter(|f| !index.mentions_folder(*f))
        .map(|f| f.dir_name())
        .collect();

    if missing.is_empty() {
        CheckResult::pass(CHECK_SUBFOLDERS, "All 6 suggested subfolders are listed".to_string())
    } else {
        CheckResult::fail(
            CHECK_SUBFOLDERS,
            format!("Missing subfolders: {}", missing.join(", ")),
        )
    }
}

fn check_headings(index: &DocumentIndex) -> CheckResult {
    let empty: Vec<String> = index
        .sections
        .iter()
        .enumerate()
        .filter(|(_, s)| s.title.trim().is_empty())
        .map(|(i, _)| i.to_string())
        .collect();

    if empty.is_empty() {
        CheckResult::pass(
            CHECK_HEADINGS,
            format!("{} headings, none empty", index.sections.len()),
        )
    } else {
        CheckResult::fail(
            CHECK_HEADINGS,
            format!("Empty headings at positions: {}", empty.join(", ")),
        )
    }
}

fn check_structure(index: &DocumentIndex) -> CheckResult {
    let mut problems = Vec::new();

    match index.sections.first() {
        None => problems.push("no headings".to_string()),
        Some(first) if first.level != 1 => {
            problems.push(format!("first heading is level {}, expected 1", first.level))
        }
        Some(_) => {}
    }

    for (i, pair) in index.sections.windows(2).enumerate() {
        if pair[1].level > pair[0].level + 1 {
            problems.push(format!(
                "heading at position {} jumps from level {} to {}",
                i + 1,
                pair[0].level,
                pair[1].level
            ));
        }
    }

    match index.unclosed_fences() {
        0 => {}
        1 => problems.push("unbalanced code fence".to_string()),
        n => problems.push(format!("{} unbalanced code fences", n)),
    }

    if problems.is_empty() {
        CheckResult::pass(CHECK_STRUCTURE, "Headings and fences are well formed".to_string())
    } else {
        CheckResult::fail(CHECK_STRUCTURE, problems.join("; "))
    }
}

/// Turn a layout inspection into lint results.
pub fn layout_checks(report: &LayoutReport) -> LintReport {
    let layout = if report.missing.is_empty() {
        CheckResult::pass(CHECK_LAYOUT, "All suggested subfolders exist".to_string())
    } else {
        let names: Vec<&str> = report.missing.iter().map(|f| f.dir_name()).collect();
        CheckResult::fail(CHECK_LAYOUT, format!("Missing directories: {}", names.join(", ")))
    };

    let datasets = if report.oversized.is_empty() {
        CheckResult::pass(CHECK_DATASETS, "No oversized files under datasets/".to_string())
    } else {
        let files: Vec<String> = report
            .oversized
            .iter()
            .map(|f| format!("{} ({} bytes)", f.path.display(), f.bytes))
            .collect();
        CheckResult::fail(CHECK_DATASETS, format!("Large files committed: {}", files.join(", ")))
    };

    LintReport {
        results: vec![layout, datasets],
    }
}
