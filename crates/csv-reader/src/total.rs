//! Raw line counting.
//!
//! The count is an approximation of the number of rows: it counts physical
//! lines separated by a byte token and knows nothing about CSV quoting, so a
//! quoted field with embedded line breaks adds one line per embedded break.

use memchr::memmem;
use std::io::{self, ErrorKind, Read};

/// Result of scanning a byte stream for a line-break token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LineScan {
    /// Non-overlapping occurrences of the token.
    pub breaks: u64,
    /// Whether the stream ends with bytes after its last token.
    pub unterminated_tail: bool,
}

impl LineScan {
    /// Physical line count, never less than one (the header line).
    pub fn lines(&self) -> u64 {
        let lines = self.breaks + u64::from(self.unterminated_tail);
        lines.max(1)
    }
}

/// Scan `reader` in chunks of `chunk_size` bytes, counting `token`.
///
/// Occurrences split across chunk boundaries are counted once. An empty
/// token matches nothing and the stream is not read.
pub(crate) fn scan_line_breaks<R: Read>(
    mut reader: R,
    token: &[u8],
    chunk_size: usize,
) -> io::Result<LineScan> {
    let mut scan = LineScan::default();
    if token.is_empty() {
        return Ok(scan);
    }
    let chunk_size = chunk_size.max(1);
    let finder = memmem::Finder::new(token);

    let mut chunk = vec![0u8; chunk_size];
    let mut window: Vec<u8> = Vec::with_capacity(chunk_size + token.len());

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        window.extend_from_slice(&chunk[..n]);

        let mut last_end = 0;
        for pos in finder.find_iter(&window) {
            scan.breaks += 1;
            last_end = pos + token.len();
        }

        scan.unterminated_tail = last_end < window.len();

        // Keep only the bytes that could still begin a token.
        let keep_from = last_end.max(window.len().saturating_sub(token.len() - 1));
        window.drain(..keep_from);
    }

    Ok(scan)
}
