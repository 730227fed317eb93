//! Line scanner and renderer.
//!
//! Bytes are scanned one at a time. Everything up to a newline is buffered
//! so the line can be classified as blank or not before anything is written:
//! squeezing and non-blank numbering both depend on the whole line.

use crate::config::{CatConfig, Numbering};
use crate::error::alloc_failure;
use crate::escape::escape;
use std::io::{self, BufRead, Write};

/// Initial line buffer capacity; grows by doubling
const INITIAL_LINE_CAPACITY: usize = 80;

/// Width of the right-justified line number column
const NUMBER_WIDTH: usize = 6;

/// `isspace` in the C locale
#[inline]
pub fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// Bytes of the current line accumulated since the last newline
#[derive(Debug)]
pub struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_LINE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Append one byte, doubling the backing storage when full.
    ///
    /// Allocation failure terminates the process.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        if self.bytes.len() == self.bytes.capacity() {
            let additional = self.bytes.capacity().max(INITIAL_LINE_CAPACITY);
            if let Err(err) = self.bytes.try_reserve_exact(additional) {
                alloc_failure(err);
            }
        }
        self.bytes.push(byte);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters gathered over one source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub bytes_read: u64,
    pub lines_read: u64,
    pub lines_written: u64,
    pub lines_squeezed: u64,
    /// Longest line written, in input bytes
    pub longest_line: usize,
}

/// Scanner state; lives for exactly one source
#[derive(Debug)]
struct RenderState {
    line: LineBuffer,
    counter: u64,
    /// Current line holds only whitespace so far
    blank: bool,
    /// Previous emitted line was blank
    prev_blank: bool,
    stats: RenderStats,
}

impl RenderState {
    fn new() -> Self {
        Self {
            line: LineBuffer::new(),
            counter: 1,
            blank: true,
            prev_blank: false,
            stats: RenderStats::default(),
        }
    }
}

/// Renders one source into a sink according to a [`CatConfig`]
pub struct StreamRenderer<'a, W: Write> {
    config: &'a CatConfig,
    numbering: Numbering,
    sink: W,
    state: RenderState,
}

impl<'a, W: Write> StreamRenderer<'a, W> {
    pub fn new(config: &'a CatConfig, sink: W) -> Self {
        Self {
            config,
            numbering: config.numbering(),
            sink,
            state: RenderState::new(),
        }
    }

    /// Scan a chunk of input; lines may span chunk boundaries
    pub fn feed(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.state.stats.bytes_read += chunk.len() as u64;

        for &byte in chunk {
            if byte == b'\n' {
                self.end_line()?;
            } else {
                if !is_space(byte) {
                    self.state.blank = false;
                    self.state.prev_blank = false;
                }
                self.state.line.push(byte);
            }
        }
        Ok(())
    }

    /// Flush an unterminated last line and return the counters.
    ///
    /// The partial line is squeezed, numbered and rendered like any other,
    /// but gets neither `$` nor a newline since the input had none.
    pub fn finish(mut self) -> io::Result<RenderStats> {
        if !self.state.line.is_empty() {
            self.state.stats.lines_read += 1;
            let blank = self.state.blank;
            if !self.squeeze(blank) {
                self.write_line(blank)?;
                self.state.stats.lines_written += 1;
            }
        }
        Ok(self.state.stats)
    }

    /// Drop a blank line that continues a blank run; true if it was dropped
    fn squeeze(&mut self, blank: bool) -> bool {
        if self.config.squeeze_blank && blank && self.state.prev_blank {
            self.state.line.clear();
            self.state.stats.lines_squeezed += 1;
            true
        } else {
            false
        }
    }

    fn end_line(&mut self) -> io::Result<()> {
        let blank = self.state.blank;
        self.state.stats.lines_read += 1;

        if self.squeeze(blank) {
            return Ok(());
        }

        self.state.prev_blank = blank;
        self.state.blank = true;

        self.write_line(blank)?;
        if self.config.show_ends {
            self.sink.write_all(b"$\n")?;
        } else {
            self.sink.write_all(b"\n")?;
        }
        self.state.stats.lines_written += 1;
        Ok(())
    }

    /// Number prefix plus rendered content, no terminator
    fn write_line(&mut self, blank: bool) -> io::Result<()> {
        let numbered = match self.numbering {
            Numbering::None => false,
            Numbering::All => true,
            Numbering::NonBlank => !blank,
        };
        if numbered {
            write!(self.sink, "{:>width$}  ", self.state.counter, width = NUMBER_WIDTH)?;
            self.state.counter += 1;
        }

        self.state.stats.longest_line = self.state.stats.longest_line.max(self.state.line.len());
        let line = self.state.line.as_slice();
        if self.config.show_nonprinting {
            for &byte in line {
                self.sink.write_all(&escape(byte, self.config.show_tabs))?;
            }
        } else {
            self.sink.write_all(line)?;
        }
        self.state.line.clear();
        Ok(())
    }
}

/// Render all of `reader` into `sink`
pub fn render<R: BufRead, W: Write>(
    mut reader: R,
    config: &CatConfig,
    sink: W,
) -> io::Result<RenderStats> {
    let mut renderer = StreamRenderer::new(config, sink);
    loop {
        let chunk = match reader.fill_buf() {
            Ok(chunk) => chunk,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if chunk.is_empty() {
            break;
        }
        let consumed = chunk.len();
        renderer.feed(chunk)?;
        reader.consume(consumed);
    }
    renderer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatConfigBuilder;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn run(input: &[u8], config: &CatConfig) -> Vec<u8> {
        let mut out = Vec::new();
        render(input, config, &mut out).expect("Failed to render test input");
        out
    }

    fn run_str(input: &str, config: &CatConfig) -> String {
        String::from_utf8(run(input.as_bytes(), config)).expect("Rendered output not UTF-8")
    }

    fn random_input(rng: &mut StdRng) -> Vec<u8> {
        let len = rng.gen_range(0..512);
        (0..len)
            .map(|_| match rng.gen_range(0..4) {
                0 => b'\n',
                1 => b' ',
                _ => rng.gen(),
            })
            .collect()
    }

    #[test]
    fn test_identity_without_flags() {
        let config = CatConfig::default();
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let input = random_input(&mut rng);
            assert_eq!(run(&input, &config), input);
        }
    }

    #[test]
    fn test_identity_keeps_unterminated_tail() {
        let config = CatConfig::default();
        assert_eq!(run(b"abc\ndef", &config), b"abc\ndef");
        assert_eq!(run(b" \t\n  ", &config), b" \t\n  ");
        assert_eq!(run(b"", &config), b"");
    }

    #[test]
    fn test_show_ends_marks_every_newline() {
        let config = CatConfigBuilder::new()
            .show_ends()
            .build()
            .expect("Failed to build test config");
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let input = random_input(&mut rng);
            let mut expected = Vec::new();
            for &byte in &input {
                if byte == b'\n' {
                    expected.push(b'$');
                }
                expected.push(byte);
            }
            assert_eq!(run(&input, &config), expected);
        }
    }

    #[test]
    fn test_squeeze_blank_scenario() {
        let config = CatConfigBuilder::new()
            .squeeze_blank()
            .build()
            .expect("Failed to build test config");
        assert_eq!(run_str("foo\n\n\nbar\n", &config), "foo\n\nbar\n");
    }

    #[test]
    fn test_squeeze_collapses_any_run_length() {
        let config = CatConfigBuilder::new()
            .squeeze_blank()
            .build()
            .expect("Failed to build test config");
        for n in 1..10 {
            let input = format!("a{}b\n", "\n".repeat(n + 1));
            assert_eq!(run_str(&input, &config), "a\n\nb\n", "run of {n} blanks");
        }
        // Leading blanks collapse too, single blanks survive
        assert_eq!(run_str("\n\n\nx\n\ny\n", &config), "\nx\n\ny\n");
    }

    #[test]
    fn test_squeeze_treats_whitespace_lines_as_blank() {
        let config = CatConfigBuilder::new()
            .squeeze_blank()
            .build()
            .expect("Failed to build test config");
        assert_eq!(run_str("a\n \n\t\n\nb\n", &config), "a\n \nb\n");
        // Squeezed whitespace must not leak into the next line
        assert_eq!(run_str("a\n\n   \nb\n", &config), "a\n\nb\n");
    }

    #[test]
    fn test_squeeze_property() {
        let config = CatConfigBuilder::new()
            .squeeze_blank()
            .build()
            .expect("Failed to build test config");
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let lines: Vec<&str> = (0..rng.gen_range(0..40))
                .map(|_| if rng.gen_bool(0.6) { "" } else { "text" })
                .collect();
            let input: String = lines.iter().map(|l| format!("{l}\n")).collect();

            let mut expected = String::new();
            let mut prev_blank = false;
            for line in &lines {
                let blank = line.is_empty();
                if blank && prev_blank {
                    continue;
                }
                prev_blank = blank;
                expected.push_str(line);
                expected.push('\n');
            }
            assert_eq!(run_str(&input, &config), expected);
        }
    }

    #[test]
    fn test_squeeze_applies_to_unterminated_tail() {
        let numbered = CatConfigBuilder::new()
            .squeeze_blank()
            .number()
            .build()
            .expect("Failed to build test config");
        assert_eq!(run_str("a\n\n\n  ", &numbered), "     1  a\n     2  \n");

        let ends = CatConfigBuilder::new()
            .squeeze_blank()
            .show_ends()
            .build()
            .expect("Failed to build test config");
        assert_eq!(run_str("a\n\n\t", &ends), "a$\n$\n");
        // A single blank tail is not part of a run
        assert_eq!(run_str("a\n\t", &ends), "a$\n\t");
    }

    #[test]
    fn test_number_all_lines() {
        let config = CatConfigBuilder::new()
            .number()
            .build()
            .expect("Failed to build test config");
        assert_eq!(
            run_str("a\n\nb\n", &config),
            "     1  a\n     2  \n     3  b\n"
        );
    }

    #[test]
    fn test_number_nonblank() {
        let config = CatConfigBuilder::new()
            .number_nonblank()
            .build()
            .expect("Failed to build test config");
        assert_eq!(
            run_str("a\n\n  \nb\n", &config),
            "     1  a\n\n  \n     2  b\n"
        );
    }

    #[test]
    fn test_nonblank_numbering_wins() {
        let config = CatConfigBuilder::new()
            .number()
            .number_nonblank()
            .build()
            .expect("Failed to build test config");
        assert_eq!(run_str("a\n\nb\n", &config), "     1  a\n\n     2  b\n");
    }

    #[test]
    fn test_number_counts_strictly_increasing() {
        let config = CatConfigBuilder::new()
            .number()
            .build()
            .expect("Failed to build test config");
        let input = "x\n".repeat(1_000_005);
        let output = run_str(&input, &config);
        for (i, line) in output.lines().enumerate() {
            assert_eq!(line, format!("{:>6}  x", i + 1));
        }
        assert!(output.ends_with("1000005  x\n"));
    }

    #[test]
    fn test_squeezed_lines_are_not_numbered() {
        let config = CatConfigBuilder::new()
            .number()
            .squeeze_blank()
            .build()
            .expect("Failed to build test config");
        assert_eq!(
            run_str("a\n\n\n\nb\n", &config),
            "     1  a\n     2  \n     3  b\n"
        );
    }

    #[test]
    fn test_tabs_with_nonprinting() {
        let tabs = CatConfigBuilder::new()
            .show_nonprinting()
            .show_tabs()
            .build()
            .expect("Failed to build test config");
        assert_eq!(run_str("a\tb\n", &tabs), "a^Ib\n");

        let all = CatConfigBuilder::new()
            .show_all()
            .build()
            .expect("Failed to build test config");
        assert_eq!(run_str("a\tb\n", &all), "a^Ib$\n");

        let v = CatConfigBuilder::new()
            .show_nonprinting()
            .build()
            .expect("Failed to build test config");
        assert_eq!(run_str("a\tb\n", &v), "a\tb\n");
    }

    #[test]
    fn test_show_tabs_alone_keeps_tabs() {
        let config = CatConfigBuilder::new()
            .show_tabs()
            .build()
            .expect("Failed to build test config");
        assert_eq!(run_str("a\tb\n", &config), "a\tb\n");
    }

    #[test]
    fn test_nonprinting_bytes() {
        let config = CatConfigBuilder::new()
            .show_nonprinting()
            .build()
            .expect("Failed to build test config");
        assert_eq!(run(b"\x01\xc1\xff\x7f\r\n", &config), b"^AM-AM-^?^?^M\n");
    }

    #[test]
    fn test_whitespace_line_content_is_rendered() {
        let config = CatConfigBuilder::new()
            .show_all()
            .build()
            .expect("Failed to build test config");
        assert_eq!(run_str(" \t\n", &config), " ^I$\n");
    }

    #[test]
    fn test_unterminated_tail_is_numbered_without_end_marker() {
        let config = CatConfigBuilder::new()
            .number()
            .show_ends()
            .build()
            .expect("Failed to build test config");
        assert_eq!(run_str("a\nb", &config), "     1  a$\n     2  b");
    }

    #[test]
    fn test_lines_span_chunks() -> io::Result<()> {
        let config = CatConfigBuilder::new()
            .number()
            .build()
            .expect("Failed to build test config");
        let reader = io::BufReader::with_capacity(2, &b"hello\nworld\n"[..]);
        let mut out = Vec::new();
        let stats = render(reader, &config, &mut out)?;
        assert_eq!(out, b"     1  hello\n     2  world\n");
        assert_eq!(stats.lines_read, 2);
        assert_eq!(stats.bytes_read, 12);
        Ok(())
    }

    #[test]
    fn test_stats() -> io::Result<()> {
        let config = CatConfigBuilder::new()
            .squeeze_blank()
            .build()
            .expect("Failed to build test config");
        let mut out = Vec::new();
        let stats = render(&b"a\n\n\n\nb"[..], &config, &mut out)?;
        assert_eq!(
            stats,
            RenderStats {
                bytes_read: 6,
                lines_read: 5,
                lines_written: 3,
                lines_squeezed: 2,
                longest_line: 1,
            }
        );
        Ok(())
    }

    #[test]
    fn test_line_buffer_doubles() {
        let mut line = LineBuffer::new();
        for byte in 0..=INITIAL_LINE_CAPACITY {
            line.push(byte as u8);
        }
        assert_eq!(line.len(), INITIAL_LINE_CAPACITY + 1);
        assert_eq!(line.as_slice()[INITIAL_LINE_CAPACITY], INITIAL_LINE_CAPACITY as u8);
        line.clear();
        assert!(line.is_empty());
    }

    #[test]
    fn test_is_space_matches_c_locale() {
        for byte in [b' ', b'\t', b'\n', 0x0B, 0x0C, b'\r'] {
            assert!(is_space(byte));
        }
        assert!(!is_space(b'a'));
        assert!(!is_space(0x00));
        assert!(!is_space(0xA0));
    }
}
