//! In-session analysis history and Markdown export

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use pmi_core::report::{render_markdown, report_file_name};
use pmi_core::{AnalysisOutcome, Error, Result};

/// Number of analyses kept per session
pub const HISTORY_CAPACITY: usize = 20;

/// One completed analysis
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub product: String,
    pub timestamp: DateTime<Local>,
    pub outcome: AnalysisOutcome,
}

/// Analyses run during this session, most recent first. Never persisted.
#[derive(Debug)]
pub struct AnalysisHistory {
    entries: Vec<HistoryEntry>,
    capacity: usize,
}

impl Default for AnalysisHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl AnalysisHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record an analysis. Re-analyzing a product replaces its old entry.
    pub fn record(&mut self, outcome: AnalysisOutcome, timestamp: DateTime<Local>) -> &HistoryEntry {
        let product = outcome.product().to_string();
        self.entries
            .retain(|entry| !entry.product.eq_ignore_ascii_case(&product));

        self.entries.insert(
            0,
            HistoryEntry {
                product,
                timestamp,
                outcome,
            },
        );
        self.entries.truncate(self.capacity);
        &self.entries[0]
    }

    /// Entry by 1-based position, as listed by `history`
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        index.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    /// Exact product match, ignoring ASCII case
    pub fn find(&self, product: &str) -> Option<&HistoryEntry> {
        let product = product.trim();
        self.entries
            .iter()
            .find(|entry| entry.product.eq_ignore_ascii_case(product))
    }

    /// Resolve a `show` argument: a list number or a product name
    pub fn lookup(&self, key: &str) -> Option<&HistoryEntry> {
        match key.trim().parse::<usize>() {
            Ok(index) => self.get(index),
            Err(_) => self.find(key).or_else(|| self.find_similar(key, 0.5).into_iter().next()),
        }
    }

    /// Entries whose product shares enough words with `query`, best first
    pub fn find_similar(&self, query: &str, threshold: f32) -> Vec<&HistoryEntry> {
        let query_lower = query.to_lowercase();
        let mut results: Vec<(&HistoryEntry, f32)> = self
            .entries
            .iter()
            .map(|entry| (entry, word_overlap(&query_lower, &entry.product.to_lowercase())))
            .filter(|(_, score)| *score >= threshold)
            .collect();

        results.sort_by(|a, b| b.1.total_cmp(&a.1));
        results.into_iter().map(|(entry, _)| entry).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn word_overlap(query: &str, candidate: &str) -> f32 {
    let words1: Vec<&str> = query.split_whitespace().collect();
    let words2: Vec<&str> = candidate.split_whitespace().collect();

    if words1.is_empty() {
        return 0.0;
    }

    let matches = words1.iter().filter(|word| words2.contains(word)).count();
    matches as f32 / words1.len() as f32
}

/// Where a report for `product` should be written.
///
/// No target means the current directory. An existing directory gets a
/// generated file name; anything else is taken as the file path.
pub fn export_path(target: Option<&Path>, product: &str, generated_at: &DateTime<Local>) -> PathBuf {
    let file_name = report_file_name(product, generated_at);
    match target {
        None => PathBuf::from(file_name),
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
    }
}

/// Write the Markdown report for an analysis and return the path written
pub async fn export_report(
    outcome: &AnalysisOutcome,
    target: Option<&Path>,
    generated_at: DateTime<Local>,
) -> Result<PathBuf> {
    let path = export_path(target, outcome.product(), &generated_at);
    let markdown = render_markdown(outcome.product(), &outcome.response, &generated_at);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            return Err(Error::InvalidInput(format!(
                "Export directory does not exist: {}",
                parent.display()
            )));
        }
    }

    fs::write(&path, markdown).await?;
    tracing::info!(path = %path.display(), "exported report");

    Ok(path)
}
