use thiserror::Error;

/// All errors that can occur while working with a vault.
///
/// Every variant carries a free-form message; the variant itself decides
/// the process exit code (see [`VaultError::exit_code`]).
#[derive(Debug, Error)]
pub enum VaultError {
    /// Bad CLI arguments, missing required values, out-of-range options.
    #[error("{0}")]
    Usage(String),

    /// Filesystem open/read/write/seek/rename failure, missing input
    /// paths, collisions on add, no-op delete/stealth.
    #[error("{0}")]
    Io(String),

    /// Runtime-detected misuse of a cryptographic primitive.
    #[error("{0}")]
    Crypto(String),

    /// Magic mismatch, size invariant violation, truncation, MAC
    /// mismatch, index decode underrun/overrun.
    #[error("{0}")]
    Integrity(String),

    /// A command that exists but has no implementation yet.
    #[error("{0}: not implemented")]
    NotImplemented(String),

    /// Unreachable-state fallback.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for VaultError {
    fn from(e: std::io::Error) -> Self {
        VaultError::Io(e.to_string())
    }
}

/// Process exit codes, one per error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Ok = 0,
    Usage = 2,
    IoError = 10,
    CryptoError = 20,
    IntegrityError = 30,
    NotImplemented = 90,
    InternalError = 99,
}

impl VaultError {
    /// Map this error to the exit code the process should return.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            VaultError::Usage(_) => ExitCode::Usage,
            VaultError::Io(_) => ExitCode::IoError,
            VaultError::Crypto(_) => ExitCode::CryptoError,
            VaultError::Integrity(_) => ExitCode::IntegrityError,
            VaultError::NotImplemented(_) => ExitCode::NotImplemented,
            VaultError::Internal(_) => ExitCode::InternalError,
        }
    }
}

/// Convenience type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VaultError>;
