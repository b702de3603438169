// ============================================================
// Layer 6 - Loss Logger
// ============================================================
// Appends every reported loss to a CSV file so learning curves
// can be plotted after (or during) a run.
//
// Output file: <checkpoint-dir>/<name>_loss.csv
//
//   step,epoch,loss
//   100,0,5.123400
//   200,0,4.870100
//
// Skip-gram rows carry the global step and the corpus pass;
// translation rows carry the batch index and the epoch.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossRecord {
    pub step:  usize,
    pub epoch: usize,
    pub loss:  f64,
}

impl LossRecord {
    pub fn new(step: usize, epoch: usize, loss: f64) -> Self {
        Self { step, epoch, loss }
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Appends to an existing file so resumed runs keep one history.
    pub fn new(dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join(format!("{name}_loss.csv"));
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "step,epoch,loss")?;
            tracing::debug!("Created loss CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, record: &LossRecord) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;
        writeln!(f, "{},{},{:.6}", record.step, record.epoch, record.loss)?;
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_appended_across_loggers() {
        let dir = tempfile::tempdir().unwrap();

        let logger = MetricsLogger::new(dir.path(), "skipgram").unwrap();
        logger.log(&LossRecord::new(100, 0, 5.1234)).unwrap();

        let reopened = MetricsLogger::new(dir.path(), "skipgram").unwrap();
        reopened.log(&LossRecord::new(200, 1, 4.5)).unwrap();

        let text = fs::read_to_string(reopened.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["step,epoch,loss", "100,0,5.123400", "200,1,4.500000"]);
    }
}
