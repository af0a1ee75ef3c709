// Copyright 2025 Stairwell, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures from creating entries inside a [`DisappearingDir`](crate::DisappearingDir).
///
/// Deletion failures are a separate type, [`DeleteError`], since the cleanup path never
/// surfaces them unless asked to via [`close`](crate::DisappearingDir::close).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid path {path:?}: {reason}")]
    Path { path: PathBuf, reason: &'static str },

    #[error("{} already exists", path.display())]
    AlreadyExists { path: PathBuf },

    /// The configured retry ceiling was hit while looking for an unused name.
    #[error("no unused name found after {attempts} attempts (last tried {})", last.display())]
    NameCollisionExhausted { attempts: usize, last: PathBuf },

    #[error("failed to {op} {}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("conflicting name options: {0}")]
    Options(&'static str),

    #[error("invalid search pattern")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{} was already disposed", path.display())]
    Disposed { path: PathBuf },
}

impl Error {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
#[error("failed to delete {}", path.display())]
pub struct DeleteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_operation_and_path() {
        let err = Error::io(
            "create file",
            "/nope/a.txt",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert_eq!(err.to_string(), "failed to create file /nope/a.txt");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn exhausted_reports_last_candidate() {
        let err = Error::NameCollisionExhausted {
            attempts: 3,
            last: PathBuf::from("/tmp/x"),
        };
        assert_eq!(
            err.to_string(),
            "no unused name found after 3 attempts (last tried /tmp/x)"
        );
    }
}
