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

//! Recursive deletion that tolerates read-only entries and transient contention.

use std::{
    fs,
    io::{self, ErrorKind},
    path::Path,
    thread,
    time::Duration,
};

use walkdir::WalkDir;

use crate::error::DeleteError;

/// Removes a directory tree.
///
/// Implementations should keep trying for as long as removal might still succeed and only
/// return an error once it is conclusively impossible. A path that does not exist counts as
/// deleted.
pub trait RobustDeleter: Send + Sync {
    fn delete_recursively(&self, path: &Path) -> Result<(), DeleteError>;
}

impl<F> RobustDeleter for F
where
    F: Fn(&Path) -> Result<(), DeleteError> + Send + Sync,
{
    fn delete_recursively(&self, path: &Path) -> Result<(), DeleteError> {
        self(path)
    }
}

/// The default deleter.
///
/// Each failed attempt clears read-only bits across whatever is left of the tree, then sleeps
/// before trying again, doubling the delay each time.
#[derive(Clone, Debug)]
pub struct ForceDeleter {
    attempts: usize,
    initial_backoff: Duration,
}

impl Default for ForceDeleter {
    fn default() -> Self {
        ForceDeleter {
            attempts: 5,
            initial_backoff: Duration::from_millis(10),
        }
    }
}

impl ForceDeleter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total tries, including the first. Clamped to at least one.
    pub fn attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }
}

impl RobustDeleter for ForceDeleter {
    fn delete_recursively(&self, path: &Path) -> Result<(), DeleteError> {
        let mut backoff = self.initial_backoff;
        let mut attempt = 1;
        loop {
            let err = match remove_tree(path) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
                Err(e) => e,
            };
            if attempt >= self.attempts {
                return Err(DeleteError {
                    path: path.into(),
                    source: err,
                });
            }
            tracing::debug!(
                "delete {} failed (attempt {}/{}): {}",
                path.display(),
                attempt,
                self.attempts,
                err
            );
            make_writable(path);
            thread::sleep(backoff);
            backoff = backoff.saturating_mul(2);
            attempt += 1;
        }
    }
}

fn remove_tree(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

// Directories that cannot be read yet are skipped here; the next attempt reaches them once
// their parent is fixed.
fn make_writable(root: &Path) {
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if entry.path_is_symlink() {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        let mut perms = meta.permissions();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = perms.mode();
            let wanted = if meta.is_dir() { mode | 0o700 } else { mode | 0o200 };
            if wanted == mode {
                continue;
            }
            perms.set_mode(wanted);
        }
        #[cfg(not(unix))]
        {
            if !perms.readonly() {
                continue;
            }
            perms.set_readonly(false);
        }
        if let Err(e) = fs::set_permissions(entry.path(), perms) {
            tracing::trace!("chmod {}: {}", entry.path().display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn quick() -> ForceDeleter {
        ForceDeleter::new()
            .attempts(3)
            .initial_backoff(Duration::from_millis(1))
    }

    #[test]
    fn removes_nested_tree() {
        let base = tempfile::tempdir().unwrap();
        let root = base.path().join("root");
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::write(root.join("a/b/c/file"), "x").unwrap();
        fs::write(root.join("top"), "y").unwrap();

        quick().delete_recursively(&root).unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn missing_path_is_deleted() {
        let base = tempfile::tempdir().unwrap();
        quick()
            .delete_recursively(&base.path().join("never-was"))
            .unwrap();
    }

    #[test]
    fn plain_file_is_removed() {
        let base = tempfile::tempdir().unwrap();
        let file = base.path().join("f");
        fs::write(&file, "x").unwrap();
        quick().delete_recursively(&file).unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn read_only_entries_do_not_block_removal() {
        let base = tempfile::tempdir().unwrap();
        let root = base.path().join("root");
        let locked = root.join("locked");
        fs::create_dir_all(&locked).unwrap();
        let file = locked.join("ro.txt");
        fs::write(&file, "x").unwrap();

        let mut perms = fs::metadata(&file).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&file, perms).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
        }

        quick().delete_recursively(&root).unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn closures_are_deleters() {
        let calls = AtomicUsize::new(0);
        let deleter = |_: &Path| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<(), DeleteError>(())
        };
        deleter.delete_recursively(Path::new("/whatever")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
