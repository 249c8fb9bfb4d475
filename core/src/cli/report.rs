use crate::migrate::RunSummary;
use std::fmt;

/// Text report for a completed migration run
pub struct RunReport<'a> {
    summary: &'a RunSummary,
}

impl<'a> RunReport<'a> {
    /// Creates a new run report
    pub fn new(summary: &'a RunSummary) -> Self {
        Self { summary }
    }
}

impl<'a> fmt::Display for RunReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Migration Summary")?;
        writeln!(f, "=================")?;
        writeln!(f)?;
        writeln!(f, "Relocated: {}", self.summary.relocated)?;
        writeln!(f, "Skipped:   {}", self.summary.skipped)?;
        writeln!(f, "Failures:  {}", self.summary.failures)?;
        match &self.summary.failure_log {
            Some(path) => writeln!(f, "Failure log: {}", path.display())?,
            None => writeln!(f, "Failure log: none")?,
        }
        Ok(())
    }
}
