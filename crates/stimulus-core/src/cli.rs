//! CLI-specific types shared between the engine and the binary.
//!
//! # Examples
//!
//! ```
//! use stimulus_core::cli::{ExitCode, OutputTarget};
//!
//! let code = ExitCode::UNKNOWN_LANGUAGE;
//! assert_eq!(code.as_i32(), 6);
//!
//! let target: OutputTarget = "-".parse().unwrap();
//! assert!(target.is_stdout());
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// CLI exit code with semantic meaning.
///
/// Every failure category detected at the command-line boundary has its own
/// exit status so that build systems can tell them apart.
///
/// # Examples
///
/// ```
/// use stimulus_core::cli::ExitCode;
///
/// assert!(ExitCode::SUCCESS.is_success());
/// assert!(!ExitCode::UNREADABLE_FILE.is_success());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Successful execution (exit code 0).
    pub const SUCCESS: Self = Self(0);

    /// A generation job aborted (exit code 1).
    pub const ERROR: Self = Self(1);

    /// Invalid command-line usage (exit code 2).
    pub const INVALID_INPUT: Self = Self(2);

    /// Jobs completed but produced per-function diagnostics and the
    /// configuration asks to fail on them (exit code 3).
    pub const DIAGNOSTICS: Self = Self(3);

    /// Number of `-l` and `-o` flags differ (exit code 4).
    pub const COUNT_MISMATCH: Self = Self(4);

    /// A function, type or input file cannot be read (exit code 5).
    pub const UNREADABLE_FILE: Self = Self(5);

    /// Unknown target language (exit code 6).
    pub const UNKNOWN_LANGUAGE: Self = Self(6);

    /// Creates an exit code from an integer value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        Self(code)
    }

    /// Returns the exit code as an integer.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Checks if the exit code represents success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.0 == 0
    }
}

impl Default for ExitCode {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Destination of one generation job.
///
/// The sentinel `-` selects standard output.
///
/// # Examples
///
/// ```
/// use stimulus_core::cli::OutputTarget;
/// use std::path::Path;
///
/// let target: OutputTarget = "out/rinterface.c".parse().unwrap();
/// assert_eq!(target.path(), Some(Path::new("out/rinterface.c")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutputTarget {
    /// Write to standard output
    Stdout,
    /// Write to the given file, replacing it only on success
    File(PathBuf),
}

impl OutputTarget {
    /// Sentinel accepted on the command line for standard output.
    pub const STDOUT_SENTINEL: &'static str = "-";

    /// Returns `true` if the target is standard output.
    #[must_use]
    pub const fn is_stdout(&self) -> bool {
        matches!(self, Self::Stdout)
    }

    /// Returns the file path, or `None` for standard output.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdout => None,
            Self::File(path) => Some(path),
        }
    }
}

impl FromStr for OutputTarget {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(crate::Error::InvalidArgument(
                "output destination cannot be empty".to_string(),
            )),
            Self::STDOUT_SENTINEL => Ok(Self::Stdout),
            path => Ok(Self::File(PathBuf::from(path))),
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str(Self::STDOUT_SENTINEL),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}
