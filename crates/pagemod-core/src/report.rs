use std::fmt;
use std::path::PathBuf;

use crate::eligibility::Eligibility;

/// What happened to one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Rewritten on disk
    Modified,
    /// Would be rewritten; carries the unified diff (check and diff modes)
    WouldModify { diff: String },
    /// Eligible, but no codemod had anything to do
    Unchanged,
    /// Not eligible, left untouched
    Ineligible(Eligibility),
    /// Reading, transforming or writing the page failed
    Failed(String),
}

impl FileOutcome {
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            FileOutcome::Unchanged | FileOutcome::Ineligible(_) | FileOutcome::Failed(_)
        )
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Modified => write!(f, "modified"),
            FileOutcome::WouldModify { .. } => write!(f, "needs migration"),
            FileOutcome::Unchanged => write!(f, "unchanged"),
            FileOutcome::Ineligible(reason) => write!(f, "skipped ({reason})"),
            FileOutcome::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

/// Tally of a run. Every visited page counts as exactly one of modified,
/// pending or skipped; failures are skipped pages that also errored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub modified: usize,
    /// Pages a check or diff run would have modified
    pub pending: usize,
    pub skipped: usize,
    /// Subset of `skipped`
    pub failed: usize,
    pub files: Vec<(PathBuf, FileOutcome)>,
}

impl RunSummary {
    pub fn record(&mut self, path: PathBuf, outcome: FileOutcome) {
        match &outcome {
            FileOutcome::Modified => self.modified += 1,
            FileOutcome::WouldModify { .. } => self.pending += 1,
            FileOutcome::Unchanged | FileOutcome::Ineligible(_) => self.skipped += 1,
            FileOutcome::Failed(_) => {
                self.skipped += 1;
                self.failed += 1;
            }
        }
        self.files.push((path, outcome));
    }

    pub fn visited(&self) -> usize {
        self.files.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &str)> {
        self.files.iter().filter_map(|(path, outcome)| match outcome {
            FileOutcome::Failed(msg) => Some((path, msg.as_str())),
            _ => None,
        })
    }

    /// Fold another app's run into this one
    pub fn merge(&mut self, other: RunSummary) {
        self.modified += other.modified;
        self.pending += other.pending;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.files.extend(other.files);
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total modified: {}", self.modified)?;
        write!(f, "Total skipped: {}", self.skipped)?;
        if self.pending > 0 {
            write!(f, "\nTotal pending: {}", self.pending)?;
        }
        if self.failed > 0 {
            write!(f, "\nTotal failed: {}", self.failed)?;
        }
        Ok(())
    }
}
