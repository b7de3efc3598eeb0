//! Atomic output publishing.
//!
//! Output is written to a sibling temporary file (`<output>.tmp`), synced,
//! and renamed over the destination. Until [`StagedFile::commit`] succeeds
//! the destination is untouched; dropping an uncommitted staged file removes
//! the temporary.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temporary path used while writing `final_path`.
pub fn temp_path_for(final_path: &Path) -> PathBuf {
    let mut name = OsString::from(final_path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// A file being written next to its final destination.
#[derive(Debug)]
pub struct StagedFile {
    temp_path: PathBuf,
    final_path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl StagedFile {
    /// Create (or truncate) the temporary file for `final_path`.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = temp_path_for(final_path);
        let file = File::create(&temp_path)?;
        Ok(Self {
            temp_path,
            final_path: final_path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
        })
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush, sync and rename into place. Returns the published size.
    pub fn commit(mut self) -> io::Result<u64> {
        let published = self.publish();
        if published.is_err() {
            let _ = fs::remove_file(&self.temp_path);
        }
        published
    }

    fn publish(&mut self) -> io::Result<u64> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        fs::rename(&self.temp_path, &self.final_path)?;
        Ok(fs::metadata(&self.final_path)?.len())
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.writer.as_mut() {
            Some(writer) => writer.write(buf),
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "staged file already committed",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        // only uncommitted files still hold a writer
        if self.writer.take().is_some() {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}
