use std::path::Path;

/// A record the target database refused.
#[derive(Debug, Clone)]
pub struct RecordFailure {
    pub record_id: String,
    pub message: String,
    /// The outgoing property document, as JSON
    pub payload: String,
}

/// What happened to one source database.
#[derive(Debug, Clone, Default)]
pub struct SourceReport {
    pub index: usize,
    pub database_id: String,
    pub fetched: usize,
    pub inserted: usize,
    /// Records with nothing left to send after reshaping
    pub skipped_empty: usize,
    pub options_added: usize,
    pub failures: Vec<RecordFailure>,
}

impl SourceReport {
    pub fn new(index: usize, database_id: &str) -> Self {
        Self {
            index,
            database_id: database_id.to_string(),
            ..Default::default()
        }
    }
}

/// Renamed property: `(merged name, original name, source index)`.
pub type Rename = (String, String, usize);

/// Outcome of a whole merge.
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub target_id: String,
    pub title: String,
    pub properties: usize,
    pub renamed: Vec<Rename>,
    pub sources: Vec<SourceReport>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub fetched: usize,
    pub inserted: usize,
    pub skipped_empty: usize,
    pub failed: usize,
    pub options_added: usize,
}

impl MergeReport {
    pub fn summary(&self) -> MergeSummary {
        self.sources
            .iter()
            .fold(MergeSummary::default(), |mut acc, source| {
                acc.fetched += source.fetched;
                acc.inserted += source.inserted;
                acc.skipped_empty += source.skipped_empty;
                acc.failed += source.failures.len();
                acc.options_added += source.options_added;
                acc
            })
    }

    pub fn has_failures(&self) -> bool {
        self.sources.iter().any(|s| !s.failures.is_empty())
    }

    /// Write the report as plain text.
    pub fn write_to_file(&self, path: &Path) -> std::io::Result<()> {
        use std::io::Write;

        let mut file = std::fs::File::create(path)?;
        let summary = self.summary();

        writeln!(file, "=== Merge Report ===")?;
        writeln!(
            file,
            "Date: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(file, "Target: {} ({})", self.title, self.target_id)?;
        writeln!(file, "Properties: {}", self.properties)?;
        writeln!(file)?;
        writeln!(file, "--- Summary ---")?;
        writeln!(file, "Records fetched: {}", summary.fetched)?;
        writeln!(file, "Inserted: {}", summary.inserted)?;
        writeln!(file, "Skipped (empty): {}", summary.skipped_empty)?;
        writeln!(file, "Failed: {}", summary.failed)?;
        writeln!(file, "Options added: {}", summary.options_added)?;

        if !self.renamed.is_empty() {
            writeln!(file)?;
            writeln!(file, "--- Renamed properties ---")?;
            for (merged, original, index) in &self.renamed {
                writeln!(file, "{} <- \"{}\" (source {})", merged, original, index + 1)?;
            }
        }

        writeln!(file)?;
        writeln!(file, "--- Sources ---")?;
        for source in &self.sources {
            writeln!(file)?;
            writeln!(
                file,
                "[{}] {}: {} fetched, {} inserted, {} skipped, {} failed",
                source.index + 1,
                source.database_id,
                source.fetched,
                source.inserted,
                source.skipped_empty,
                source.failures.len()
            )?;
            for failure in &source.failures {
                writeln!(file, "[FAILED] {}: {}", failure.record_id, failure.message)?;
                writeln!(file, "     Payload: {}", failure.payload)?;
            }
        }

        Ok(())
    }
}
