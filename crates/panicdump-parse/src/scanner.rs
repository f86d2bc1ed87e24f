//! Line tokenizer feeding the dump parser.
//!
//! Unlike [`std::io::BufRead::lines`], tokens keep their `\n` (and any `\r`)
//! so pass-through output is byte identical to the input, and a line longer
//! than [`MAX_TOKEN_SIZE`] is returned in chunks instead of failing.

use std::io::{self, BufRead};

/// Longest token returned before a line is cut into chunks
pub const MAX_TOKEN_SIZE: usize = 64 * 1024;

/// Iterator over raw line tokens of a reader
#[derive(Debug)]
pub struct LineScanner<R> {
    reader: R,
    max_token_size: usize,
    done: bool,
}

impl<R: BufRead> LineScanner<R> {
    pub fn new(reader: R) -> Self {
        Self::with_max_token_size(reader, MAX_TOKEN_SIZE)
    }

    /// Use a custom chunk limit. A zero limit is treated as one byte.
    pub fn with_max_token_size(reader: R, max_token_size: usize) -> Self {
        Self {
            reader,
            max_token_size: max_token_size.max(1),
            done: false,
        }
    }

    fn next_token(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut token = Vec::new();
        loop {
            let (consumed, complete) = {
                let available = match self.reader.fill_buf() {
                    Ok(buf) => buf,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if available.is_empty() {
                    // End of input: whatever is left is the final token.
                    return Ok((!token.is_empty()).then_some(token));
                }

                let room = self.max_token_size - token.len();
                let window = &available[..available.len().min(room)];
                match window.iter().position(|&b| b == b'\n') {
                    Some(i) => {
                        token.extend_from_slice(&window[..=i]);
                        (i + 1, true)
                    }
                    None => {
                        token.extend_from_slice(window);
                        (window.len(), token.len() >= self.max_token_size)
                    }
                }
            };
            self.reader.consume(consumed);
            if complete {
                return Ok(Some(token));
            }
        }
    }
}

impl<R: BufRead> Iterator for LineScanner<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
