//! File backing for the history store

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use super::{HistoryEntry, HistoryError, HistoryFormat, HistoryResult};

/// Default upper bound on how much of the history file is read
pub const DEFAULT_MAX_FILE_LEN: usize = 65536;

/// An open history file together with its format
pub struct HistoryFile {
    file: File,
    path: PathBuf,
    format: Box<dyn HistoryFormat>,
    max_len: usize,
}

impl fmt::Debug for HistoryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryFile")
            .field("path", &self.path)
            .field("max_len", &self.max_len)
            .finish_non_exhaustive()
    }
}

impl HistoryFile {
    /// Open (creating if needed) a history file readable only by the user
    pub fn open(path: impl AsRef<Path>, format: Box<dyn HistoryFormat>) -> HistoryResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .mode(0o600)
            .open(&path)
            .map_err(|source| HistoryError::Open {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            file,
            path,
            format,
            max_len: DEFAULT_MAX_FILE_LEN,
        })
    }

    /// Bound the number of bytes read at initialization
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file (up to the maximum length) and parse it
    pub(super) fn load(&mut self) -> HistoryResult<Vec<Vec<u8>>> {
        let mut data = Vec::new();
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(HistoryError::Read)?;
        (&self.file)
            .take(self.max_len as u64)
            .read_to_end(&mut data)
            .map_err(HistoryError::Read)?;
        self.format.parse(&data)
    }

    /// Serialize the entries and replace the file contents with them
    pub(super) fn store(&mut self, entries: &[HistoryEntry]) -> HistoryResult<usize> {
        let data = self.format.serialize(entries);
        self.file.set_len(0).map_err(HistoryError::Write)?;
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(HistoryError::Write)?;
        self.file.write_all(&data).map_err(HistoryError::Write)?;
        self.file.flush().map_err(HistoryError::Write)?;
        Ok(data.len())
    }
}
