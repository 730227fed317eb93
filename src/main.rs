//! cat implementation in Rust
//!
//! Concatenate files and print on the standard output.

use std::io::{self, BufWriter, Write};
use std::process;

use rcat::{
    args::{parse_args, USAGE},
    cat,
    error::{CatError, CatResult},
    EXIT_SUCCESS,
};

fn main() {
    init_logging();
    restore_sigpipe();
    process::exit(report(run()));
}

fn run() -> CatResult<()> {
    let config = parse_args(std::env::args_os())?;

    let stdout = io::stdout();
    let mut sink = BufWriter::new(stdout.lock());
    cat(&config, &mut sink)?;
    sink.flush()?;
    Ok(())
}

/// Print whatever the outcome calls for and return the exit code
fn report(result: CatResult<()>) -> i32 {
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(CatError::HelpRequested) => {
            let _ = io::stdout().write_all(USAGE.as_bytes());
            EXIT_SUCCESS
        }
        Err(CatError::VersionRequested) => {
            let _ = writeln!(io::stdout(), "cat {}", env!("CARGO_PKG_VERSION"));
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("cat: {}", e);
            e.exit_code()
        }
    }
}

/// Diagnostics go to stderr, filtered by `RCAT_LOG`
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("RCAT_LOG", "warn"))
        .format_timestamp(None)
        .init();
}

/// Die quietly on a closed pipe instead of reporting EPIPE
#[cfg(unix)]
fn restore_sigpipe() {
    // SAFETY: runs before any other thread exists; SIG_DFL is always valid
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn restore_sigpipe() {}
