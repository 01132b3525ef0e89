//! Process-level errors.
//!
//! Every variant is fatal: `main` prints it to stderr and exits non-zero.
//! Per-request failures never become a `ServerError`; they are answered with
//! an HTTP status inside the connection handler.

use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ServerError {
    DirectoryNotFound(PathBuf),
    NotADirectory(PathBuf),
    NoDefaultDirectory,
    Bind { addr: String, source: io::Error },
    Io(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::DirectoryNotFound(p) => {
                write!(f, "cannot find the directory: {}", p.display())
            }
            ServerError::NotADirectory(p) => write!(f, "not a directory: {}", p.display()),
            ServerError::NoDefaultDirectory => write!(f, "cannot find any directories to serve"),
            ServerError::Bind { addr, source } => {
                write!(f, "failed to listen on {}: {}", addr, source)
            }
            ServerError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Bind { source, .. } => Some(source),
            ServerError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::Io(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let missing = ServerError::DirectoryNotFound(PathBuf::from("nope"));
        assert_eq!(missing.to_string(), "cannot find the directory: nope");
        assert_eq!(
            ServerError::NoDefaultDirectory.to_string(),
            "cannot find any directories to serve"
        );
    }

    #[test]
    fn bind_error_keeps_its_cause() {
        let err = ServerError::Bind {
            addr: "0.0.0.0:80".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().starts_with("failed to listen on 0.0.0.0:80"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
