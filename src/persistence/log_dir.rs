//! Layout of a training run directory.
//!
//! ```text
//! <root>/
//!   <step>/model_<step>.json       one directory per checkpoint epoch
//!   <step>/optimizer_<step>.json
//!   summaries.jsonl
//!   eval.csv
//!   args.toml
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

const MODEL_PREFIX: &str = "model_";
const OPTIMIZER_PREFIX: &str = "optimizer_";
const CHECKPOINT_EXT: &str = "json";

/// Paths inside one run's log directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDir {
    root: PathBuf,
}

impl LogDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root directory if needed
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let dir = Self::new(root);
        fs::create_dir_all(&dir.root)?;
        Ok(dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn epoch_dir(&self, step: u64) -> PathBuf {
        self.root.join(step.to_string())
    }

    pub fn model_path(&self, step: u64) -> PathBuf {
        self.epoch_dir(step)
            .join(format!("{MODEL_PREFIX}{step}.{CHECKPOINT_EXT}"))
    }

    pub fn optimizer_path(&self, step: u64) -> PathBuf {
        self.epoch_dir(step)
            .join(format!("{OPTIMIZER_PREFIX}{step}.{CHECKPOINT_EXT}"))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join("summaries.jsonl")
    }

    pub fn eval_path(&self) -> PathBuf {
        self.root.join("eval.csv")
    }

    /// Settings the run was trained with
    pub fn args_path(&self) -> PathBuf {
        self.root.join("args.toml")
    }

    /// Checkpoint epochs (numeric subdirectories), ascending
    pub fn epochs(&self) -> Result<Vec<u64>> {
        let mut epochs: Vec<u64> = fs::read_dir(&self.root)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str()?.parse().ok())
            .collect();
        epochs.sort_unstable();
        Ok(epochs)
    }

    /// Most recent checkpoint epoch, if any
    pub fn latest_epoch(&self) -> Result<Option<u64>> {
        if !self.root.exists() {
            return Ok(None);
        }
        Ok(self.epochs()?.last().copied())
    }

    /// Model files saved in one epoch directory, sorted by file name
    pub fn network_paths_at_epoch(&self, epoch: u64) -> Result<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(self.epoch_dir(epoch))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| is_model_file(p))
            .collect();
        paths.sort();
        Ok(paths)
    }
}

fn is_model_file(path: &Path) -> bool {
    let stem_ok = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with(MODEL_PREFIX))
        .unwrap_or(false);
    let ext_ok = path.extension().and_then(|e| e.to_str()) == Some(CHECKPOINT_EXT);
    stem_ok && ext_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths() {
        let dir = LogDir::new("/runs/cartpole");
        assert_eq!(
            dir.model_path(2000),
            PathBuf::from("/runs/cartpole/2000/model_2000.json")
        );
        assert_eq!(
            dir.optimizer_path(2000),
            PathBuf::from("/runs/cartpole/2000/optimizer_2000.json")
        );
        assert_eq!(dir.eval_path(), PathBuf::from("/runs/cartpole/eval.csv"));
    }

    #[test]
    fn test_epochs_sorted_numerically() {
        let tmp = tempdir().unwrap();
        let dir = LogDir::create(tmp.path()).unwrap();
        for step in [10_000u64, 2_000, 500] {
            fs::create_dir_all(dir.epoch_dir(step)).unwrap();
        }
        fs::create_dir_all(tmp.path().join("not_an_epoch")).unwrap();
        fs::write(tmp.path().join("eval.csv"), "").unwrap();

        assert_eq!(dir.epochs().unwrap(), vec![500, 2_000, 10_000]);
        assert_eq!(dir.latest_epoch().unwrap(), Some(10_000));
    }

    #[test]
    fn test_latest_epoch_missing_root() {
        let tmp = tempdir().unwrap();
        let dir = LogDir::new(tmp.path().join("missing"));
        assert_eq!(dir.latest_epoch().unwrap(), None);
    }

    #[test]
    fn test_network_paths_filter_models() {
        let tmp = tempdir().unwrap();
        let dir = LogDir::create(tmp.path()).unwrap();
        fs::create_dir_all(dir.epoch_dir(100)).unwrap();
        fs::write(dir.model_path(100), "{}").unwrap();
        fs::write(dir.optimizer_path(100), "{}").unwrap();
        fs::write(dir.epoch_dir(100).join("model_100_alt.json"), "{}").unwrap();

        let paths = dir.network_paths_at_epoch(100).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["model_100.json", "model_100_alt.json"]);
    }
}
