//! Line framing for the command transport
//!
//! Bytes arrive one at a time from a serial-like stream. CR or LF ends a
//! line; empty lines are ignored. The buffer keeps at most
//! `COMMAND_LINE_CAPACITY - 1` bytes per line and silently drops the rest
//! until the terminator, matching a fixed C-style line buffer.

use heapless::String;

use crate::constants::sampling::COMMAND_LINE_CAPACITY;

/// One framed command line
pub type CommandLine = String<COMMAND_LINE_CAPACITY>;

/// Accumulates bytes into command lines
#[derive(Debug, Default, Clone)]
pub struct LineAssembler {
    buf: CommandLine,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self { buf: String::new() }
    }

    /// Feed one byte; returns a line when a terminator completes a non-empty one
    ///
    /// Non-ASCII bytes are dropped so the line stays valid UTF-8.
    pub fn push(&mut self, byte: u8) -> Option<CommandLine> {
        match byte {
            b'\r' | b'\n' => {
                if self.buf.is_empty() {
                    None
                } else {
                    Some(core::mem::take(&mut self.buf))
                }
            }
            b if b.is_ascii() && self.buf.len() < COMMAND_LINE_CAPACITY - 1 => {
                // Cannot fail: length checked above
                let _ = self.buf.push(char::from(b));
                None
            }
            _ => None,
        }
    }

    /// Bytes buffered for the line in progress
    pub fn pending(&self) -> &str {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(assembler: &mut LineAssembler, input: &[u8]) -> std::vec::Vec<std::string::String> {
        input
            .iter()
            .filter_map(|&b| assembler.push(b))
            .map(|line| std::string::String::from(line.as_str()))
            .collect()
    }

    #[test]
    fn splits_on_cr_and_lf() {
        let mut assembler = LineAssembler::new();
        let lines = feed(&mut assembler, b"READ\r\nLOGLAST 3\nHELP\r");
        assert_eq!(lines, ["READ", "LOGLAST 3", "HELP"]);
        assert!(assembler.pending().is_empty());
    }

    #[test]
    fn ignores_empty_lines() {
        let mut assembler = LineAssembler::new();
        assert!(feed(&mut assembler, b"\r\n\n\r").is_empty());
    }

    #[test]
    fn overlong_line_is_truncated() {
        let mut assembler = LineAssembler::new();
        let mut input = [b'A'; 100].to_vec();
        input.push(b'\n');
        let lines = feed(&mut assembler, &input);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), COMMAND_LINE_CAPACITY - 1);
    }

    #[test]
    fn keeps_partial_line_between_feeds() {
        let mut assembler = LineAssembler::new();
        assert!(feed(&mut assembler, b"SETC").is_empty());
        assert_eq!(assembler.pending(), "SETC");
        assert_eq!(feed(&mut assembler, b"AL 1.1\n"), ["SETCAL 1.1"]);
    }
}
