/// End-of-line pattern used by [`LineSplitter`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Eol {
    /// `\n`, with one immediately preceding `\r` stripped from the line.
    /// Handles LF and CRLF streams, including a CRLF split across chunks.
    Newline,
    /// Exact-match delimiter. Must be non-empty; an empty delimiter never
    /// matches and the splitter just accumulates.
    Delimiter(String),
}

impl Default for Eol {
    fn default() -> Self {
        Eol::Newline
    }
}

/// Buffers decoded text and emits a line whenever the end-of-line pattern
/// is encountered. The delimiter itself is excluded from emitted lines;
/// unmatched trailing text stays buffered for the next call.
pub struct LineSplitter {
    buffer: String,
    eol: Eol,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::with_eol(Eol::default())
    }

    pub fn with_eol(eol: Eol) -> Self {
        Self {
            buffer: String::new(),
            eol,
        }
    }

    /// Append `text` and return every line completed by it, in order.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);
        let mut lines = Vec::new();

        match &self.eol {
            Eol::Newline => {
                while let Some(idx) = self.buffer.find('\n') {
                    let rest = self.buffer.split_off(idx + 1);
                    self.buffer.pop(); // the '\n'
                    if self.buffer.ends_with('\r') {
                        self.buffer.pop();
                    }
                    lines.push(std::mem::replace(&mut self.buffer, rest));
                }
            }
            Eol::Delimiter(delim) => {
                if delim.is_empty() {
                    return lines;
                }
                while let Some(idx) = self.buffer.find(delim.as_str()) {
                    let rest = self.buffer.split_off(idx + delim.len());
                    self.buffer.truncate(idx);
                    lines.push(std::mem::replace(&mut self.buffer, rest));
                }
            }
        }

        lines
    }

    /// Clear the accumulator. Invoked on every fresh open.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Not-yet-terminated trailing text.
    pub fn pending(&self) -> &str {
        &self.buffer
    }
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lines_simple() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.push("Hello\nWorld\n");
        assert_eq!(lines, vec!["Hello", "World"]);
        assert_eq!(splitter.pending(), "");
    }

    #[test]
    fn test_lines_split_across_chunks() {
        let mut splitter = LineSplitter::new();
        assert!(splitter.push("He").is_empty());
        let lines = splitter.push("llo\n");
        assert_eq!(lines, vec!["Hello"]);
        assert_eq!(splitter.pending(), "");
    }

    #[test]
    fn test_crlf_stripped() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.push("Test\r\nNext");
        assert_eq!(lines, vec!["Test"]);
        assert_eq!(splitter.pending(), "Next");
    }

    #[test]
    fn test_crlf_split_across_chunks() {
        let mut splitter = LineSplitter::new();
        assert!(splitter.push("Test\r").is_empty());
        let lines = splitter.push("\n");
        assert_eq!(lines, vec!["Test"]);
    }

    #[test]
    fn test_lone_cr_preserved() {
        // A '\r' not followed by '\n' is ordinary line content.
        let mut splitter = LineSplitter::new();
        let lines = splitter.push("a\rb\n");
        assert_eq!(lines, vec!["a\rb"]);
    }

    #[test]
    fn test_custom_delimiter() {
        let mut splitter = LineSplitter::with_eol(Eol::Delimiter(";;".into()));
        let lines = splitter.push("one;;two;;thr");
        assert_eq!(lines, vec!["one", "two"]);
        assert_eq!(splitter.pending(), "thr");
    }

    #[test]
    fn test_delimiter_split_across_chunks() {
        let mut splitter = LineSplitter::with_eol(Eol::Delimiter(";;".into()));
        assert!(splitter.push("one;").is_empty());
        let lines = splitter.push(";two");
        assert_eq!(lines, vec!["one"]);
        assert_eq!(splitter.pending(), "two");
    }

    #[test]
    fn test_reset_clears_accumulator() {
        let mut splitter = LineSplitter::new();
        splitter.push("partial");
        splitter.reset();
        assert_eq!(splitter.pending(), "");
        let lines = splitter.push("fresh\n");
        assert_eq!(lines, vec!["fresh"]);
    }

    #[test]
    fn test_empty_lines() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.push("\n\na\n");
        assert_eq!(lines, vec!["", "", "a"]);
    }

    proptest! {
        /// Framing correctness: for any input and any chunking, rejoining
        /// the emitted lines with the delimiter plus the pending remainder
        /// reconstructs the input exactly.
        #[test]
        fn prop_delimiter_roundtrip(
            input in "[a-z;\\n]{0,64}",
            cuts in proptest::collection::vec(0usize..64, 0..8),
        ) {
            let mut splitter = LineSplitter::with_eol(Eol::Delimiter(";".into()));
            let mut emitted = Vec::new();

            let mut boundaries: Vec<usize> =
                cuts.into_iter().map(|c| c.min(input.len())).collect();
            boundaries.push(input.len());
            boundaries.sort_unstable();

            let mut start = 0;
            for end in boundaries {
                emitted.extend(splitter.push(&input[start..end]));
                start = end;
            }

            let mut rebuilt = emitted.join(";");
            if !emitted.is_empty() {
                rebuilt.push(';');
            }
            rebuilt.push_str(splitter.pending());
            prop_assert_eq!(rebuilt, input);
        }

        /// Newline mode: reconstruction holds modulo CRLF -> LF
        /// normalization, regardless of where the stream is chunked.
        #[test]
        fn prop_newline_roundtrip_normalized(
            input in "[ab\\r\\n]{0,64}",
            cut in 0usize..64,
        ) {
            // All generated chars are single-byte, so any cut is a char
            // boundary.
            let cut = cut.min(input.len());
            let mut splitter = LineSplitter::new();
            let mut emitted = splitter.push(&input[..cut]);
            emitted.extend(splitter.push(&input[cut..]));

            let mut rebuilt = emitted.join("\n");
            if !emitted.is_empty() {
                rebuilt.push('\n');
            }
            rebuilt.push_str(splitter.pending());
            prop_assert_eq!(rebuilt, input.replace("\r\n", "\n"));
        }
    }
}
