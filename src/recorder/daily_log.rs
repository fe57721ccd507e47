//! Day-bucketed append-only record log.
//!
//! Layout: `<dir>/<YYYY-MM-DD>.log`, one line per entry, appended in
//! chronological order. The log is the only writer of these files.

use super::{RecordEntry, RecordError};
use crate::types::Counters;
use chrono::NaiveDate;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub const LOG_EXTENSION: &str = "log";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct DailyLog {
    dir: PathBuf,
    /// Serializes manual and scheduled appends
    write_lock: Mutex<()>,
}

impl DailyLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(date: NaiveDate) -> String {
        format!("{}.{}", date.format(DATE_FORMAT), LOG_EXTENSION)
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(Self::file_name(date))
    }

    /// Append one entry to its day's file, creating directory and file as needed.
    /// The line goes out in a single write so concurrent readers never see half of it.
    pub async fn append(&self, entry: &RecordEntry) -> Result<PathBuf, RecordError> {
        let _guard = self.write_lock.lock().await;
        self.write_entry(entry).await
    }

    /// Stamp `counters` with the current local time and append them. Stamping
    /// happens under the write lock, so lines land in timestamp order.
    pub async fn append_now(
        &self,
        counters: &Counters,
    ) -> (RecordEntry, Result<PathBuf, RecordError>) {
        let _guard = self.write_lock.lock().await;
        let entry = RecordEntry::capture(counters, chrono::Local::now().naive_local());
        let result = self.write_entry(&entry).await;
        (entry, result)
    }

    async fn write_entry(&self, entry: &RecordEntry) -> Result<PathBuf, RecordError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(entry.date());
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(entry.to_log_line().as_bytes()).await?;
        file.flush().await?;

        Ok(path)
    }

    /// Raw content of one day's log, `None` if nothing was recorded that day
    pub async fn read_day(&self, date: NaiveDate) -> Result<Option<String>, RecordError> {
        match tokio::fs::read_to_string(self.path_for(date)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Dates that have a log file, oldest first
    pub async fn days(&self) -> Result<Vec<NaiveDate>, RecordError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut days = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(LOG_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Ok(date) = NaiveDate::parse_from_str(stem, DATE_FORMAT) {
                days.push(date);
            }
        }

        days.sort();
        Ok(days)
    }

    /// Zip (deflate) of every day log, named `YYYY-MM-DD.log` inside the archive
    pub async fn archive(&self) -> Result<Vec<u8>, RecordError> {
        let mut files = Vec::new();
        for day in self.days().await? {
            let bytes = tokio::fs::read(self.path_for(day)).await?;
            files.push((Self::file_name(day), bytes));
        }

        Ok(build_zip(files)?)
    }
}

fn build_zip(files: Vec<(String, Vec<u8>)>) -> zip::result::ZipResult<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, bytes) in files {
        writer.start_file(name, options)?;
        writer.write_all(&bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}
