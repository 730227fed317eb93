//! Error handling for the cat utility

use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// Custom error type for cat operations
#[derive(Error, Debug)]
pub enum CatError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unknown option: `{option}'")]
    UnknownOption { option: String },

    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("too many files")]
    TooManyFiles { limit: usize },

    #[error("not open file: {file}: Permission denied")]
    PermissionDenied { file: String },

    #[error("not open file: {file}: No such file or directory")]
    FileNotFound { file: String },

    #[error("not open file: {file}: Is a directory")]
    IsDirectory { file: String },

    #[error("not open file: {file}: {source}")]
    OpenFailed { file: String, source: io::Error },

    #[error("{file}: read error: {source}")]
    ReadFailed { file: String, source: io::Error },

    #[error("memory allocate error")]
    OutOfMemory,

    #[error("help requested")]
    HelpRequested,

    #[error("version requested")]
    VersionRequested,
}

impl CatError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CatError::HelpRequested | CatError::VersionRequested => crate::EXIT_SUCCESS,

            CatError::UnknownOption { .. }
            | CatError::InvalidArguments { .. }
            | CatError::TooManyFiles { .. } => crate::EXIT_CONFIG_ERROR,

            CatError::PermissionDenied { .. }
            | CatError::FileNotFound { .. }
            | CatError::IsDirectory { .. }
            | CatError::OpenFailed { .. }
            | CatError::ReadFailed { .. }
            | CatError::Io(_) => crate::EXIT_SOURCE_ERROR,

            CatError::OutOfMemory => crate::EXIT_ALLOC_FAILURE,
        }
    }

    /// True for the configuration errors that stop a run before any source is read
    pub fn is_configuration_error(&self) -> bool {
        self.exit_code() == crate::EXIT_CONFIG_ERROR
    }

    /// Create an unknown option error
    pub fn unknown_option(option: &str) -> Self {
        CatError::UnknownOption {
            option: option.to_string(),
        }
    }

    /// Create an invalid arguments error
    pub fn invalid_arguments(message: &str) -> Self {
        CatError::InvalidArguments {
            message: message.to_string(),
        }
    }

    /// Create a too many files error
    pub fn too_many_files(limit: usize) -> Self {
        CatError::TooManyFiles { limit }
    }

    /// Create a permission denied error
    pub fn permission_denied(file: &str) -> Self {
        CatError::PermissionDenied {
            file: file.to_string(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(file: &str) -> Self {
        CatError::FileNotFound {
            file: file.to_string(),
        }
    }

    /// Create an is directory error
    pub fn is_directory(file: &str) -> Self {
        CatError::IsDirectory {
            file: file.to_string(),
        }
    }

    /// Create a read error for an already opened source
    pub fn read_failed(file: &str, source: io::Error) -> Self {
        // EISDIR surfaces on the first read, open(2) succeeds on directories
        if source.raw_os_error() == Some(libc::EISDIR) {
            return CatError::is_directory(file);
        }
        CatError::ReadFailed {
            file: file.to_string(),
            source,
        }
    }
}

/// Result type for cat operations
pub type CatResult<T> = Result<T, CatError>;

/// Context trait for attaching the offending source to I/O failures
pub trait CatContext<T> {
    /// Map a failure to open `filename`
    fn with_file_context(self, filename: &str) -> CatResult<T>;
}

impl<T> CatContext<T> for Result<T, io::Error> {
    fn with_file_context(self, filename: &str) -> CatResult<T> {
        self.map_err(|io_err| match io_err.kind() {
            io::ErrorKind::PermissionDenied => CatError::permission_denied(filename),
            io::ErrorKind::NotFound => CatError::file_not_found(filename),
            _ => CatError::OpenFailed {
                file: filename.to_string(),
                source: io_err,
            },
        })
    }
}

/// Terminate the process after a failed line-buffer allocation.
///
/// Running out of memory mid-line leaves nothing sensible to emit, so this
/// never returns control to the caller.
#[cold]
pub fn alloc_failure(err: TryReserveError) -> ! {
    log::error!("line buffer reservation failed: {err}");
    eprintln!("{}", CatError::OutOfMemory);
    std::process::exit(CatError::OutOfMemory.exit_code())
}
