//! Append-only evaluation results file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Best result of one checkpoint epoch
#[derive(Debug, Clone, PartialEq)]
pub struct EvalRecord {
    pub epoch_id: u64,
    pub best_mean: f64,
    pub best_std: f64,
    /// File name of the model that produced `best_mean`
    pub selected_model: String,
}

impl EvalRecord {
    /// `epoch_id,best_mean,best_std,selected_model_filename`
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{}",
            self.epoch_id, self.best_mean, self.best_std, self.selected_model
        )
    }
}

/// Appends one line per evaluated epoch.
#[derive(Debug, Clone)]
pub struct EvalLog {
    path: PathBuf,
}

impl EvalLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record, opening the file only for this write.
    pub fn append(&self, record: &EvalRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", record.to_line())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_line_format() {
        let record = EvalRecord {
            epoch_id: 20_000,
            best_mean: 6.0,
            best_std: 3.0,
            selected_model: "model_20000.json".to_string(),
        };
        assert_eq!(record.to_line(), "20000,6,3,model_20000.json");
    }

    #[test]
    fn test_append() {
        let tmp = tempdir().unwrap();
        let log = EvalLog::new(tmp.path().join("eval.csv"));
        for epoch_id in [1, 2] {
            log.append(&EvalRecord {
                epoch_id,
                best_mean: 1.5,
                best_std: 0.5,
                selected_model: format!("model_{epoch_id}.json"),
            })
            .unwrap();
        }

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(text, "1,1.5,0.5,model_1.json\n2,1.5,0.5,model_2.json\n");
    }
}
