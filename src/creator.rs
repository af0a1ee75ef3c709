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

//! Exclusive creation of new entries, retrying on name collisions.

use std::{
    fs::{self, OpenOptions},
    io::{self, ErrorKind},
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// A kind of filesystem entry that can be created exclusively.
///
/// `create_exclusive` must fail with [`ErrorKind::AlreadyExists`] when anything is already at
/// `path`, and must not check for existence separately from creating.
pub trait EntryKind {
    /// Used in error messages and logs, e.g. "create file".
    const OP: &'static str;

    fn create_exclusive(path: &Path) -> io::Result<()>;
}

/// An empty regular file.
pub enum File {}

/// An empty directory. Its parent must already exist.
pub enum Directory {}

impl EntryKind for File {
    const OP: &'static str = "create file";

    fn create_exclusive(path: &Path) -> io::Result<()> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map(drop)
    }
}

impl EntryKind for Directory {
    const OP: &'static str = "create directory";

    fn create_exclusive(path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }
}

/// Creates entries at candidate paths until one does not collide.
///
/// By default there is no ceiling on attempts; with 128-bit names a collision is already
/// vanishingly rare. [`max_attempts`](Creator::max_attempts) bounds the loop for callers whose
/// candidate factory has less entropy.
#[derive(Clone, Copy, Debug, Default)]
pub struct Creator {
    max_attempts: Option<NonZeroUsize>,
}

impl Creator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_attempts(mut self, attempts: NonZeroUsize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Creates an entry of kind `K` at the first path from `candidate` that is not taken.
    pub fn create_new<K: EntryKind>(
        &self,
        mut candidate: impl FnMut() -> PathBuf,
    ) -> Result<PathBuf> {
        let mut attempts = 0usize;
        loop {
            let path = candidate();
            attempts += 1;
            match K::create_exclusive(&path) {
                Ok(()) => {
                    tracing::debug!("{} {}", K::OP, path.display());
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::trace!("{} exists, trying another name", path.display());
                    if let Some(max) = self.max_attempts {
                        if attempts >= max.get() {
                            tracing::debug!("giving up after {} attempts", attempts);
                            return Err(Error::NameCollisionExhausted {
                                attempts,
                                last: path,
                            });
                        }
                    }
                }
                Err(e) => return Err(Error::io(K::OP, path, e)),
            }
        }
    }

    /// Creates an entry of kind `K` at exactly `path`. A collision is an error, not a retry.
    pub fn create_exact<K: EntryKind>(&self, path: PathBuf) -> Result<PathBuf> {
        match K::create_exclusive(&path) {
            Ok(()) => {
                tracing::debug!("{} {}", K::OP, path.display());
                Ok(path)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(Error::AlreadyExists { path }),
            Err(e) => Err(Error::io(K::OP, path, e)),
        }
    }
}
