//! History file formats

use super::{HistoryEntry, HistoryResult};

/// Converts between a history file's bytes and its entries
pub trait HistoryFormat {
    /// Parse the full file contents into entry texts, oldest first.
    ///
    /// Called once when the history is initialized.
    fn parse(&mut self, data: &[u8]) -> HistoryResult<Vec<Vec<u8>>>;

    /// Serialize all entries, oldest first. Called at shutdown.
    fn serialize(&mut self, entries: &[HistoryEntry]) -> Vec<u8>;
}

/// One entry per line, `\n` separated
///
/// Blank lines are skipped when parsing and a trailing `\r` is dropped, so
/// files edited on other platforms still load.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineFormat;

impl HistoryFormat for LineFormat {
    fn parse(&mut self, data: &[u8]) -> HistoryResult<Vec<Vec<u8>>> {
        Ok(data
            .split(|&b| b == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .filter(|line| !line.is_empty())
            .map(<[u8]>::to_vec)
            .collect())
    }

    fn serialize(&mut self, entries: &[HistoryEntry]) -> Vec<u8> {
        let size = entries.iter().map(|e| e.len() + 1).sum();
        let mut out = Vec::with_capacity(size);
        for entry in entries {
            out.extend_from_slice(entry.text());
            out.push(b'\n');
        }
        out
    }
}
