//! Dated CSV event log.
//!
//! One file per calendar day, `<dir>/<YYYY-MM-DD>.csv`, appended to for
//! every accepted detection.  The day is taken from the record's own
//! timestamp so all rows of one tick land in the same file.  The header
//! row is written once, by whichever write creates the file.
//!
//! The file is reopened for every row.  A log that was moved or deleted
//! between detections (rotation, manual cleanup) is recreated with a
//! fresh header instead of being written through a stale handle.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::app::events::{AppEvent, DetectionRecord};
use crate::app::ports::EventSink;

/// Header row, as produced from [`DetectionRecord`]'s serde field names.
pub const CSV_HEADER: &str = "timestamp,antenna,eid,device";

pub struct CsvLogSink {
    dir: PathBuf,
}

impl CsvLogSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the log for `date` (`YYYY-MM-DD`).
    pub fn path_for(&self, date: &str) -> PathBuf {
        self.dir.join(format!("{date}.csv"))
    }

    /// Append one row, creating the day's file (with header) if needed.
    pub fn append(&self, record: &DetectionRecord) -> csv::Result<()> {
        let (file, created) = open_day(&self.path_for(record.date()))?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(created)
            .from_writer(file);
        wtr.serialize(record)?;
        wtr.flush()?;
        Ok(())
    }
}

impl EventSink for CsvLogSink {
    fn emit(&mut self, event: &AppEvent) {
        if let AppEvent::Detection { record, .. } = event {
            if let Err(e) = self.append(record) {
                warn!("CSV log write to {} failed: {}", self.dir.display(), e);
            }
        }
    }
}

/// Open the day's file for appending.  The flag is true when this call
/// created it.
fn open_day(path: &Path) -> io::Result<(File, bool)> {
    match OpenOptions::new().append(true).create_new(true).open(path) {
        Ok(file) => {
            debug!("Created {}", path.display());
            Ok((file, true))
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            OpenOptions::new().append(true).open(path).map(|f| (f, false))
        }
        Err(e) => Err(e),
    }
}
