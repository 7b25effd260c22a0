//! Summary sinks for scalar and image metrics.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;

/// Image tensor in channel-height-width layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// `[channels, height, width]`
    pub shape: [usize; 3],
    pub data: Vec<f32>,
}

/// A named training metric
#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    /// Written to the scalar sink
    Scalar(f64),
    /// Routed to the image sink
    Image(Image),
}

/// Backend that records summaries keyed by name and step.
#[cfg_attr(test, mockall::automock)]
pub trait SummaryWriter {
    fn add_scalar(&mut self, name: &str, value: f64, step: u64) -> Result<()>;

    fn add_image(&mut self, name: &str, image: &Image, step: u64) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One line of the JSONL summary file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryRecord {
    Scalar {
        name: String,
        value: f64,
        step: u64,
        wall_time: String,
    },
    Image {
        name: String,
        image: Image,
        step: u64,
        wall_time: String,
    },
}

/// Appends every summary as a JSON object on its own line.
pub struct JsonlSummaryWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonlSummaryWriter {
    /// Open (or create) the file in append mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Writing summaries to {:?}", path);
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record(&mut self, record: &SummaryRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl SummaryWriter for JsonlSummaryWriter {
    fn add_scalar(&mut self, name: &str, value: f64, step: u64) -> Result<()> {
        self.write_record(&SummaryRecord::Scalar {
            name: name.to_string(),
            value,
            step,
            wall_time: Utc::now().to_rfc3339(),
        })
    }

    fn add_image(&mut self, name: &str, image: &Image, step: u64) -> Result<()> {
        self.write_record(&SummaryRecord::Image {
            name: name.to_string(),
            image: image.clone(),
            step,
            wall_time: Utc::now().to_rfc3339(),
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for JsonlSummaryWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Read back every record of a JSONL summary file
pub fn read_summaries(path: impl AsRef<Path>) -> Result<Vec<SummaryRecord>> {
    let text = std::fs::read_to_string(path)?;
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).map_err(Into::into))
        .collect()
}
