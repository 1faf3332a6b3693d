/// Incremental UTF-8 decoder.
///
/// Serial chunks can split a multi-byte sequence anywhere, so per-chunk
/// independent decoding would corrupt text at chunk boundaries. This decoder
/// carries an incomplete trailing sequence (at most 3 bytes) between calls
/// and substitutes U+FFFD for genuinely invalid sequences.
pub struct Utf8Stream {
    partial: Vec<u8>,
}

impl Utf8Stream {
    pub fn new() -> Self {
        Self {
            partial: Vec::new(),
        }
    }

    /// Decode `bytes`, returning all text that is complete so far.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        let carried = std::mem::take(&mut self.partial);
        let combined;
        let mut data: &[u8] = if carried.is_empty() {
            bytes
        } else {
            combined = [carried.as_slice(), bytes].concat();
            &combined
        };

        let mut out = String::with_capacity(data.len());
        loop {
            match std::str::from_utf8(data) {
                Ok(s) => {
                    out.push_str(s);
                    break;
                }
                Err(e) => {
                    let (valid, rest) = data.split_at(e.valid_up_to());
                    if let Ok(s) = std::str::from_utf8(valid) {
                        out.push_str(s);
                    }
                    match e.error_len() {
                        Some(len) => {
                            out.push('\u{FFFD}');
                            data = rest.get(len..).unwrap_or(&[]);
                        }
                        None => {
                            // Incomplete sequence at the end of input; keep
                            // it for the next chunk.
                            self.partial = rest.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Drop any buffered partial sequence. Invoked on every fresh open.
    pub fn reset(&mut self) {
        self.partial.clear();
    }
}

impl Default for Utf8Stream {
    fn default() -> Self {
        Self::new()
    }
}
