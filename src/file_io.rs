//! Streaming G-code files into an estimation pass
//!
//! Files are read line by line through a buffered reader so large programs
//! never need to sit in memory. Invalid UTF-8 is replaced rather than
//! rejected; such lines then fail to parse and are counted as invalid.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Result};
use gcodemeter_estimator::{EstimateResult, Processor, ProcessorOptions, Progress};

/// Buffer size for reading large files (256 KB)
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// File read statistics
#[derive(Debug, Clone, PartialEq)]
pub struct FileReadStats {
    /// Total bytes read, line terminators included
    pub bytes_read: u64,
    pub lines_read: u64,
    /// File size in bytes
    pub file_size: u64,
    /// Time taken to read (milliseconds)
    pub read_time_ms: u64,
}

impl FileReadStats {
    /// Get progress percentage
    pub fn progress_percent(&self) -> f64 {
        if self.file_size == 0 {
            0.0
        } else {
            (self.bytes_read as f64 / self.file_size as f64) * 100.0
        }
    }
}

/// G-code file reader with streaming support
#[derive(Debug, Clone)]
pub struct GcodeFileReader {
    path: PathBuf,
    file_size: u64,
}

impl GcodeFileReader {
    /// Create a reader for an existing file
    ///
    /// # Errors
    /// Returns error if the path does not exist or is not a file
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(anyhow!("File does not exist: {}", path.display()));
        }

        if !path.is_file() {
            return Err(anyhow!("Path is not a file: {}", path.display()));
        }

        let file_size = fs::metadata(&path)?.len();

        Ok(Self { path, file_size })
    }

    /// Get file size in bytes
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Get file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Call `callback` for each line, without its `\n` or `\r\n` terminator
    ///
    /// # Errors
    /// Returns error if the file cannot be read or the callback fails
    pub fn read_lines<F>(&self, mut callback: F) -> Result<FileReadStats>
    where
        F: FnMut(&str) -> Result<()>,
    {
        let start = Instant::now();
        let file = File::open(&self.path)?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let mut buf = Vec::new();
        let mut lines_read = 0u64;
        let mut bytes_read = 0u64;

        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf)?;
            if n == 0 {
                break;
            }
            bytes_read += n as u64;

            let mut end = buf.len();
            if buf[..end].ends_with(b"\n") {
                end -= 1;
            }
            if buf[..end].ends_with(b"\r") {
                end -= 1;
            }
            let text = String::from_utf8_lossy(&buf[..end]);

            callback(&text)?;
            lines_read += 1;
        }

        Ok(FileReadStats {
            bytes_read,
            lines_read,
            file_size: self.file_size,
            read_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Run an estimation pass over the file
    pub fn estimate(&self, options: &ProcessorOptions) -> Result<EstimateResult> {
        self.estimate_with_progress(options, |_| {})
    }

    /// Run an estimation pass, reporting progress every `progress_interval` lines
    pub fn estimate_with_progress(
        &self,
        options: &ProcessorOptions,
        mut on_progress: impl FnMut(Progress),
    ) -> Result<EstimateResult> {
        options.validate()?;

        let mut processor = Processor::new(options.clone());
        let interval = options.progress_interval;

        let stats = self.read_lines(|text| {
            processor.process_line(text);
            if interval > 0 && processor.lines_processed() % interval == 0 {
                on_progress(processor.progress());
            }
            Ok(())
        })?;

        tracing::info!(
            "Read {} lines ({} bytes) from {} in {}ms",
            stats.lines_read,
            stats.bytes_read,
            self.path.display(),
            stats.read_time_ms
        );

        Ok(processor.finish())
    }
}
