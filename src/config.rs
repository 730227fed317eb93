//! Configuration management for cat operations

use crate::error::{CatError, CatResult};
use std::fmt;
use std::path::{Path, PathBuf};

/// Maximum number of sources accepted on one command line
pub const MAX_SOURCES: usize = 100;

/// One input byte stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Standard input, requested as `-` or by giving no files
    Stdin,
    /// A named path
    Path(PathBuf),
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        if path.as_os_str() == "-" {
            Source::Stdin
        } else {
            Source::Path(path)
        }
    }
}

impl From<&str> for Source {
    fn from(name: &str) -> Self {
        Source::from(PathBuf::from(name))
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::from(path.to_path_buf())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Stdin => write!(f, "-"),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Resolved line numbering policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numbering {
    /// No line numbers
    None,
    /// Number every output line
    All,
    /// Number only lines with non-whitespace content
    NonBlank,
}

/// Main configuration structure for cat operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatConfig {
    /// Prefix every output line with its number
    pub number: bool,
    /// Prefix non-blank output lines with their number; overrides `number`
    pub number_nonblank: bool,
    /// Collapse runs of blank lines into one
    pub squeeze_blank: bool,
    /// Use ^ and M- notation for control and high-bit bytes
    pub show_nonprinting: bool,
    /// Print `$` before each newline
    pub show_ends: bool,
    /// Print TAB as ^I (only together with `show_nonprinting`)
    pub show_tabs: bool,
    /// Sources in the order they are concatenated
    pub sources: Vec<Source>,
}

impl Default for CatConfig {
    fn default() -> Self {
        Self {
            number: false,
            number_nonblank: false,
            squeeze_blank: false,
            show_nonprinting: false,
            show_ends: false,
            show_tabs: false,
            sources: vec![Source::Stdin],
        }
    }
}

impl CatConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable numbering of every line
    pub fn with_number(mut self, number: bool) -> Self {
        self.number = number;
        self
    }

    /// Enable numbering of non-blank lines
    pub fn with_number_nonblank(mut self, number_nonblank: bool) -> Self {
        self.number_nonblank = number_nonblank;
        self
    }

    /// Enable blank-line squeezing
    pub fn with_squeeze_blank(mut self, squeeze_blank: bool) -> Self {
        self.squeeze_blank = squeeze_blank;
        self
    }

    /// Enable ^ and M- notation
    pub fn with_show_nonprinting(mut self, show_nonprinting: bool) -> Self {
        self.show_nonprinting = show_nonprinting;
        self
    }

    /// Enable `$` line ends
    pub fn with_show_ends(mut self, show_ends: bool) -> Self {
        self.show_ends = show_ends;
        self
    }

    /// Enable ^I tabs
    pub fn with_show_tabs(mut self, show_tabs: bool) -> Self {
        self.show_tabs = show_tabs;
        self
    }

    /// Replace the source list; an empty list means standard input
    pub fn with_sources(mut self, sources: Vec<Source>) -> Self {
        self.sources = sources;
        self.fill_default_source();
        self
    }

    /// The numbering policy in effect; non-blank numbering wins over plain numbering
    pub fn numbering(&self) -> Numbering {
        if self.number_nonblank {
            Numbering::NonBlank
        } else if self.number {
            Numbering::All
        } else {
            Numbering::None
        }
    }

    /// True when output must equal input byte for byte
    pub fn is_passthrough(&self) -> bool {
        self.numbering() == Numbering::None
            && !self.squeeze_blank
            && !self.show_nonprinting
            && !self.show_ends
    }

    /// Validate configuration for consistency
    pub fn validate(&self) -> CatResult<()> {
        if self.sources.len() > MAX_SOURCES {
            return Err(CatError::too_many_files(MAX_SOURCES));
        }
        Ok(())
    }

    fn fill_default_source(&mut self) {
        if self.sources.is_empty() {
            self.sources.push(Source::Stdin);
        }
    }
}

/// Builder pattern for creating configurations
pub struct CatConfigBuilder {
    config: CatConfig,
}

impl CatConfigBuilder {
    /// Start building a new configuration with no sources yet
    pub fn new() -> Self {
        Self {
            config: CatConfig {
                sources: Vec::new(),
                ..CatConfig::default()
            },
        }
    }

    /// `-n`
    pub fn number(mut self) -> Self {
        self.config.number = true;
        self
    }

    /// `-b`
    pub fn number_nonblank(mut self) -> Self {
        self.config.number_nonblank = true;
        self
    }

    /// `-s`
    pub fn squeeze_blank(mut self) -> Self {
        self.config.squeeze_blank = true;
        self
    }

    /// `-v`
    pub fn show_nonprinting(mut self) -> Self {
        self.config.show_nonprinting = true;
        self
    }

    /// `-E`
    pub fn show_ends(mut self) -> Self {
        self.config.show_ends = true;
        self
    }

    /// `-T`
    pub fn show_tabs(mut self) -> Self {
        self.config.show_tabs = true;
        self
    }

    /// `-A`, same as `-vET`
    pub fn show_all(self) -> Self {
        self.show_nonprinting().show_ends().show_tabs()
    }

    /// Append a source
    pub fn source(mut self, source: impl Into<Source>) -> Self {
        self.config.sources.push(source.into());
        self
    }

    /// Build the final configuration
    pub fn build(mut self) -> CatResult<CatConfig> {
        self.config.validate()?;
        self.config.fill_default_source();
        Ok(self.config)
    }
}

impl Default for CatConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
