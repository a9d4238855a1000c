// src/recording/event_log.rs
//! Binary spike log
//!
//! File layout: repeating 8-byte records `[i32 time_ms][i32 neuron_id]` in native byte
//! order, with no header or footer. The record count is `file_len / RECORD_SIZE`.
//!
//! The writer only ever appends. Opening an existing file keeps its contents, so a log
//! accumulates across monitor lifetimes as well as across recording windows.

use crate::observability::{EVENTS_LOGGED, LOG_BYTES_WRITTEN};
use crate::recording::event::{SpikeEvent, RECORD_SIZE};
use crate::utils::errors::{MonitorError, Result};
use bytes::{BufMut, BytesMut};
use memmap2::{Mmap, MmapOptions};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Append-only spike log writer
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    file: File,
    records_written: u64,
    bytes_written: u64,
}

impl EventLog {
    /// Open `path` for appending, creating it if needed
    ///
    /// Fails immediately if the file cannot be opened (e.g. its directory is missing).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|source| {
                error!("Failed to open spike log {:?}: {}", path, source);
                MonitorError::LogOpen {
                    path: path.clone(),
                    source,
                }
            })?;

        debug!("Opened spike log {:?}", path);

        Ok(Self {
            path,
            file,
            records_written: 0,
            bytes_written: 0,
        })
    }

    /// Append `events` as consecutive records and flush them to the OS
    ///
    /// Returns the number of bytes written.
    pub fn append(&mut self, events: &[SpikeEvent]) -> Result<usize> {
        if events.is_empty() {
            return Ok(0);
        }

        let mut buf = BytesMut::with_capacity(events.len() * RECORD_SIZE);
        for event in events {
            buf.put_slice(&event.to_ne_bytes());
        }

        self.file
            .write_all(&buf)
            .and_then(|_| self.file.flush())
            .map_err(|source| {
                error!("Failed to append to spike log {:?}: {}", self.path, source);
                MonitorError::LogWrite {
                    path: self.path.clone(),
                    source,
                }
            })?;

        self.records_written += events.len() as u64;
        self.bytes_written += buf.len() as u64;
        metrics::counter!(EVENTS_LOGGED).increment(events.len() as u64);
        metrics::counter!(LOG_BYTES_WRITTEN).increment(buf.len() as u64);

        debug!(
            "Appended {} records ({} bytes) to {:?}",
            events.len(),
            buf.len(),
            self.path
        );

        Ok(buf.len())
    }

    /// Location of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended through this handle
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Bytes appended through this handle
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

/// Read-only, memory-mapped view of a spike log
pub struct EventLogReader {
    path: PathBuf,
    mmap: Option<Mmap>,
}

impl EventLogReader {
    /// Map an existing spike log
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let read_err = |source: std::io::Error| MonitorError::LogRead {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(read_err)?;
        let len = file.metadata().map_err(read_err)?.len();

        if len % RECORD_SIZE as u64 != 0 {
            return Err(MonitorError::LogCorrupt {
                path: path.clone(),
                len,
            });
        }

        // Zero-length files cannot be mapped
        let mmap = if len == 0 {
            None
        } else {
            // SAFETY: the map is read-only and only lives as long as this reader; the
            // recorder never rewrites existing bytes of a log.
            let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(read_err)?;
            Some(mmap)
        };

        debug!("Mapped spike log {:?} ({} bytes)", path, len);

        Ok(Self { path, mmap })
    }

    fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Number of records in the log
    pub fn len(&self) -> usize {
        self.bytes().len() / RECORD_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate records in file order
    pub fn iter(&self) -> impl Iterator<Item = SpikeEvent> + '_ {
        self.bytes().chunks_exact(RECORD_SIZE).map(|chunk| {
            let mut record = [0u8; RECORD_SIZE];
            record.copy_from_slice(chunk);
            SpikeEvent::from_ne_bytes(record)
        })
    }

    /// All records in file order
    pub fn events(&self) -> Vec<SpikeEvent> {
        self.iter().collect()
    }

    /// Spike count per neuron for a group of `group_size` neurons
    pub fn neuron_spike_counts(&self, group_size: usize) -> Result<Vec<u32>> {
        let mut counts = vec![0u32; group_size];
        for event in self.iter() {
            let slot = usize::try_from(event.neuron_id)
                .ok()
                .and_then(|idx| counts.get_mut(idx))
                .ok_or_else(|| MonitorError::LogCorrupt {
                    path: self.path.clone(),
                    len: self.bytes().len() as u64,
                })?;
            *slot += 1;
        }
        Ok(counts)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read a whole spike log into memory
pub fn read_event_log<P: AsRef<Path>>(path: P) -> Result<Vec<SpikeEvent>> {
    Ok(EventLogReader::open(path)?.events())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn events(n: i32) -> Vec<SpikeEvent> {
        (0..n).map(|i| SpikeEvent::new(i * 10, i % 3)).collect()
    }

    #[test]
    fn test_open_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spikes.dat");

        let log = EventLog::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(log.records_written(), 0);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absentDirectory").join("spikes.dat");

        let result = EventLog::open(&path);
        assert!(matches!(result, Err(MonitorError::LogOpen { .. })));
    }

    #[test]
    fn test_append_writes_fixed_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spikes.dat");
        let mut log = EventLog::open(&path).unwrap();

        let written = log.append(&events(5)).unwrap();
        assert_eq!(written, 5 * RECORD_SIZE);
        assert_eq!(log.records_written(), 5);
        assert_eq!(log.bytes_written(), 40);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 40);

        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[8..12], &10i32.to_ne_bytes());
        assert_eq!(&raw[12..16], &1i32.to_ne_bytes());
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spikes.dat");

        {
            let mut log = EventLog::open(&path).unwrap();
            log.append(&events(3)).unwrap();
        }
        let mut log = EventLog::open(&path).unwrap();
        log.append(&[SpikeEvent::new(999, 2)]).unwrap();

        let read = read_event_log(&path).unwrap();
        assert_eq!(read.len(), 4);
        assert_eq!(read[..3], events(3)[..]);
        assert_eq!(read[3], SpikeEvent::new(999, 2));
    }

    #[test]
    fn test_append_empty_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spikes.dat");
        let mut log = EventLog::open(&path).unwrap();

        assert_eq!(log.append(&[]).unwrap(), 0);
        assert_eq!(log.records_written(), 0);
    }

    #[test]
    fn test_reader_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spikes.dat");
        EventLog::open(&path).unwrap();

        let reader = EventLogReader::open(&path).unwrap();
        assert!(reader.is_empty());
        assert_eq!(reader.neuron_spike_counts(3).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_reader_rejects_torn_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spikes.dat");
        std::fs::write(&path, [0u8; 12]).unwrap();

        let result = EventLogReader::open(&path);
        assert!(matches!(result, Err(MonitorError::LogCorrupt { len: 12, .. })));
    }

    #[test]
    fn test_reader_spike_counts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spikes.dat");
        let mut log = EventLog::open(&path).unwrap();
        log.append(&events(7)).unwrap();

        let reader = EventLogReader::open(&path).unwrap();
        assert_eq!(reader.len(), 7);
        // neuron ids cycle 0,1,2,0,1,2,0
        assert_eq!(reader.neuron_spike_counts(3).unwrap(), vec![3, 2, 2]);
        assert!(reader.neuron_spike_counts(2).is_err());
    }
}
