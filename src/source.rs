//! Opening sources for sequential reading

use crate::config::Source;
use crate::error::{CatContext, CatError, CatResult};
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, StdinLock};
use std::path::Path;

/// Read buffer size for files that are not memory mapped
pub const BUFFER_SIZE: usize = 64 * 1024;

/// Memory-mapped regular file read front to back
pub struct MappedFile {
    mmap: Mmap,
    pos: usize,
}

impl MappedFile {
    /// Map `file`, which must be a non-empty regular file
    pub fn new(file: &File) -> io::Result<Self> {
        // SAFETY: the map is read-only and dropped before the next source
        // is opened; truncation by another process while we read is not
        // guarded against, same as any mmap reader.
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self { mmap, pos: 0 })
    }
}

impl Read for MappedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = (&self.mmap[self.pos..]).read(buf)?;
        self.pos += n;
        Ok(n)
    }
}

impl BufRead for MappedFile {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(&self.mmap[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.mmap.len());
    }
}

/// An opened source; released when dropped
pub enum Input {
    Stdin(StdinLock<'static>),
    Mapped(MappedFile),
    Buffered(BufReader<File>),
}

impl Input {
    /// Short label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Input::Stdin(_) => "stdin",
            Input::Mapped(_) => "mmap",
            Input::Buffered(_) => "buffered",
        }
    }
}

impl Read for Input {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Input::Stdin(r) => r.read(buf),
            Input::Mapped(r) => r.read(buf),
            Input::Buffered(r) => r.read(buf),
        }
    }
}

impl BufRead for Input {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            Input::Stdin(r) => r.fill_buf(),
            Input::Mapped(r) => r.fill_buf(),
            Input::Buffered(r) => r.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            Input::Stdin(r) => r.consume(amt),
            Input::Mapped(r) => r.consume(amt),
            Input::Buffered(r) => r.consume(amt),
        }
    }
}

impl Source {
    /// Open this source for reading.
    ///
    /// Standard input is locked for the lifetime of the returned handle.
    pub fn open(&self) -> CatResult<Input> {
        match self {
            Source::Stdin => Ok(Input::Stdin(io::stdin().lock())),
            Source::Path(path) => open_path(path),
        }
    }
}

fn open_path(path: &Path) -> CatResult<Input> {
    let name = path.display().to_string();
    let file = File::open(path).with_file_context(&name)?;
    let metadata = file.metadata().with_file_context(&name)?;

    if metadata.is_dir() {
        return Err(CatError::is_directory(&name));
    }

    // Empty files cannot be mapped; pipes and devices have no fixed length
    if metadata.is_file() && metadata.len() > 0 {
        match MappedFile::new(&file) {
            Ok(mapped) => return Ok(Input::Mapped(mapped)),
            Err(e) => log::debug!("{name}: mmap failed ({e}), reading buffered"),
        }
    }

    Ok(Input::Buffered(BufReader::with_capacity(BUFFER_SIZE, file)))
}
