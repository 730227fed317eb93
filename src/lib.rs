//! cat implementation in Rust
//!
//! Concatenates sources to a sink, optionally numbering lines, squeezing
//! blank runs, marking line ends and rendering non-printing bytes in `^X`
//! and `M-` notation.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

pub mod error;
pub mod config;
pub mod args;
pub mod escape;
pub mod render;
pub mod source;

use std::io::{self, BufRead, Write};

// Re-export commonly used types
pub use error::{CatError, CatResult};
pub use config::{CatConfig, CatConfigBuilder, Numbering, Source};
pub use render::{render, RenderStats, StreamRenderer};

/// Exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_CONFIG_ERROR: i32 = 1;
pub const EXIT_SOURCE_ERROR: i32 = 2;
pub const EXIT_ALLOC_FAILURE: i32 = 3;

/// Write every source in `config` to `sink`, in order.
///
/// The first source that cannot be opened or read stops the run; output
/// already produced for earlier sources has been flushed to `sink`.
pub fn cat<W: Write>(config: &CatConfig, sink: &mut W) -> CatResult<()> {
    config.validate()?;
    for source in &config.sources {
        cat_source(source, config, sink)?;
    }
    Ok(())
}

fn cat_source<W: Write>(source: &Source, config: &CatConfig, sink: &mut W) -> CatResult<()> {
    let name = source.to_string();
    let input = source.open()?;
    log::debug!("{name}: opened ({})", input.kind());

    if config.is_passthrough() {
        let copied = pump(input, &name, |chunk| sink.write_all(chunk))?;
        log::debug!("{name}: copied {copied} bytes");
    } else {
        let mut renderer = StreamRenderer::new(config, &mut *sink);
        pump(input, &name, |chunk| renderer.feed(chunk))?;
        let stats = renderer.finish()?;
        log::debug!(
            "{name}: {} bytes, {} lines read, {} written, {} squeezed, longest {}",
            stats.bytes_read,
            stats.lines_read,
            stats.lines_written,
            stats.lines_squeezed,
            stats.longest_line
        );
    }

    sink.flush()?;
    log::trace!("{name}: closed");
    Ok(())
}

/// Feed every chunk of `input` to `consume`; read failures are charged to `name`
fn pump<R, F>(mut input: R, name: &str, mut consume: F) -> CatResult<u64>
where
    R: BufRead,
    F: FnMut(&[u8]) -> io::Result<()>,
{
    let mut total = 0u64;
    loop {
        let chunk = match input.fill_buf() {
            Ok(chunk) => chunk,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CatError::read_failed(name, e)),
        };
        if chunk.is_empty() {
            return Ok(total);
        }
        let len = chunk.len();
        consume(chunk)?;
        input.consume(len);
        total += len as u64;
    }
}
