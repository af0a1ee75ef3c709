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

mod options;
mod search;
mod write;

use std::{
    fmt,
    fs,
    num::NonZeroUsize,
    path::{Component, Path, PathBuf, MAIN_SEPARATOR},
    sync::atomic::{AtomicBool, Ordering},
};

pub use options::NameOptions;
pub use search::Search;

use crate::{
    creator::{Creator, Directory, EntryKind, File},
    deleter::{ForceDeleter, RobustDeleter},
    error::{DeleteError, Error, Result},
    name::{generate_random_string, normalize_extension},
};
use options::Naming;
use search::Listing;

const DEFAULT_FILE_SUFFIX: &str = ".tmp";
const DEFAULT_SUBDIRECTORY_PREFIX: &str = "dir.";

/// A directory that is removed, with everything in it, when this value is dropped.
///
/// It is also the factory for what goes inside: files and subdirectories created through it get
/// collision-free names unless the caller picks one.
/// ```no_run
/// # fn main() -> disappearing_dir::Result<()> {
/// use disappearing_dir::{DisappearingDir, NameOptions};
///
/// let dir = DisappearingDir::create_in_temp(Some("job."))?;
/// let out = dir.write_to_new_file("hello", &NameOptions::named("out.txt"))?;
/// assert!(out.starts_with(dir.path()));
/// drop(dir); // out.txt and the directory are gone
/// # Ok(())
/// # }
/// ```
/// Removal goes through a [`RobustDeleter`] exactly once, from [`dispose`](Self::dispose),
/// [`close`](Self::close), or `drop`, whichever comes first. `dispose` and `drop` swallow
/// deletion errors, so cleanup never replaces an error that is already propagating.
pub struct DisappearingDir {
    path: PathBuf,
    disposed: AtomicBool,
    creator: Creator,
    deleter: Box<dyn RobustDeleter>,
}

/// Configures how a [`DisappearingDir`] is created and torn down.
pub struct Builder {
    prefix: Option<String>,
    creator: Creator,
    deleter: Option<Box<dyn RobustDeleter>>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            prefix: None,
            creator: Creator::new(),
            deleter: None,
        }
    }

    /// Prefix for the generated directory name.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Caps name-collision retries, both for the directory itself and for entries created in it.
    pub fn max_attempts(mut self, attempts: NonZeroUsize) -> Self {
        self.creator = self.creator.max_attempts(attempts);
        self
    }

    /// Replaces the default [`ForceDeleter`].
    pub fn deleter(mut self, deleter: impl RobustDeleter + 'static) -> Self {
        self.deleter = Some(Box::new(deleter));
        self
    }

    /// Creates a fresh directory directly under `base`.
    ///
    /// An existing `base` is canonicalized first, so if it is a symlink the new directory lands
    /// under the link's target and its [`path`](DisappearingDir::path) names the target.
    pub fn create_in(self, base: impl AsRef<Path>) -> Result<DisappearingDir> {
        let base = resolve(base.as_ref())?;
        let prefix = self.prefix.as_deref();
        let path = self
            .creator
            .create_new::<Directory>(|| base.join(generate_random_string(prefix, None)))?;
        Ok(self.finish(path))
    }

    /// Creates a fresh directory under [`std::env::temp_dir`].
    pub fn create_in_temp(self) -> Result<DisappearingDir> {
        self.create_in(std::env::temp_dir())
    }

    /// Takes ownership of `path` without creating it. It is removed like any other.
    ///
    /// An existing `path` is canonicalized, so a symlink is resolved and disposal removes the
    /// target tree, not the link.
    pub fn open(self, path: impl AsRef<Path>) -> Result<DisappearingDir> {
        let path = resolve(path.as_ref())?;
        Ok(self.finish(path))
    }

    fn finish(self, path: PathBuf) -> DisappearingDir {
        let deleter: Box<dyn RobustDeleter> = match self.deleter {
            Some(deleter) => deleter,
            None => Box::new(ForceDeleter::default()),
        };
        DisappearingDir {
            path,
            disposed: AtomicBool::new(false),
            creator: self.creator,
            deleter,
        }
    }
}

impl DisappearingDir {
    /// A fresh directory in the system temp dir, with no name prefix.
    pub fn new() -> Result<Self> {
        Builder::new().create_in_temp()
    }

    /// Wraps an existing directory. See [`Builder::open`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Builder::new().open(path)
    }

    /// Creates a fresh directory under `base`. Symlinks in `base` are resolved, see
    /// [`Builder::create_in`].
    pub fn create_in(base: impl AsRef<Path>, prefix: Option<&str>) -> Result<Self> {
        let mut builder = Builder::new();
        if let Some(prefix) = prefix {
            builder = builder.prefix(prefix);
        }
        builder.create_in(base)
    }

    pub fn create_in_temp(prefix: Option<&str>) -> Result<Self> {
        Self::create_in(std::env::temp_dir(), prefix)
    }

    pub fn builder() -> Builder {
        Builder::new()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Joins `relative` onto this directory.
    ///
    /// Both `/` and `\` are taken as separators, and `.` and `..` are resolved lexically. An
    /// absolute `relative` replaces the base, as with [`Path::join`].
    pub fn full_path(&self, relative: &str) -> PathBuf {
        let relative: String = relative
            .chars()
            .map(|c| if c == '/' || c == '\\' { MAIN_SEPARATOR } else { c })
            .collect();
        normalize(&self.path.join(relative))
    }

    /// A candidate path `prefix + token + suffix` in this directory. Nothing is created.
    pub fn generate_random_name(&self, prefix: Option<&str>, suffix: Option<&str>) -> PathBuf {
        self.full_path(&generate_random_string(prefix, suffix))
    }

    pub fn generate_random_name_with_extension(&self, extension: &str) -> PathBuf {
        self.generate_random_name(None, Some(&normalize_extension(extension)))
    }

    /// Creates an empty file. A fixed name that is taken fails with [`Error::AlreadyExists`].
    pub fn create_new_file(&self, options: &NameOptions) -> Result<PathBuf> {
        self.create::<File>(options, None, Some(DEFAULT_FILE_SUFFIX))
    }

    /// An empty `<token>.tmp` file.
    pub fn create_file(&self) -> Result<PathBuf> {
        self.create_new_file(&NameOptions::new())
    }

    pub fn create_named_file(&self, name: &str) -> Result<PathBuf> {
        self.create_new_file(&NameOptions::named(name))
    }

    /// Creates an empty subdirectory. A fixed name that is taken fails with
    /// [`Error::AlreadyExists`].
    pub fn create_new_subdirectory(&self, options: &NameOptions) -> Result<PathBuf> {
        self.create::<Directory>(options, Some(DEFAULT_SUBDIRECTORY_PREFIX), None)
    }

    /// An empty `dir.<token>` subdirectory.
    pub fn create_subdirectory(&self) -> Result<PathBuf> {
        self.create_new_subdirectory(&NameOptions::new())
    }

    pub fn create_named_subdirectory(&self, name: &str) -> Result<PathBuf> {
        self.create_new_subdirectory(&NameOptions::named(name))
    }

    /// Files currently on disk that match `search`, sorted by path.
    pub fn files(&self, search: &Search) -> Result<Vec<PathBuf>> {
        self.ensure_active()?;
        search::list(&self.path, search, Listing::Files)
    }

    /// Directories currently on disk that match `search`, sorted by path.
    pub fn directories(&self, search: &Search) -> Result<Vec<PathBuf>> {
        self.ensure_active()?;
        search::list(&self.path, search, Listing::Directories)
    }

    /// Removes the directory tree. Only the first call does anything, and failures are logged
    /// and dropped.
    pub fn dispose(&self) {
        if !self.mark_disposed() {
            return;
        }
        match self.deleter.delete_recursively(&self.path) {
            Ok(()) => tracing::debug!("removed {}", self.path.display()),
            Err(e) => tracing::warn!(error = %e.source, "leaving {} behind", self.path.display()),
        }
    }

    /// Like [`dispose`](Self::dispose), but reports the deletion error.
    pub fn close(self) -> Result<(), DeleteError> {
        if !self.mark_disposed() {
            return Ok(());
        }
        self.deleter.delete_recursively(&self.path)
    }

    /// Gives up ownership of the directory, leaving it on disk.
    pub fn keep(mut self) -> PathBuf {
        self.disposed.store(true, Ordering::Release);
        std::mem::take(&mut self.path)
    }

    fn create<K: EntryKind>(
        &self,
        options: &NameOptions,
        default_prefix: Option<&str>,
        default_suffix: Option<&str>,
    ) -> Result<PathBuf> {
        self.ensure_active()?;
        match options.resolve()? {
            Naming::Exact(name) => self.creator.create_exact::<K>(self.full_path(name)),
            Naming::Random { prefix, suffix } => self
                .creator
                .create_new::<K>(|| self.generate_random_name(prefix, suffix.as_deref())),
            Naming::Default => self
                .creator
                .create_new::<K>(|| self.generate_random_name(default_prefix, default_suffix)),
        }
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_disposed() {
            return Err(Error::Disposed {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    /// True for the one caller that moves the directory out of the active state.
    fn mark_disposed(&self) -> bool {
        self.disposed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl AsRef<Path> for DisappearingDir {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for DisappearingDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisappearingDir")
            .field("path", &self.path)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl Drop for DisappearingDir {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn resolve(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(Error::Path {
            path: path.into(),
            reason: "path is empty",
        });
    }
    if path.as_os_str().as_encoded_bytes().contains(&0) {
        return Err(Error::Path {
            path: path.into(),
            reason: "path contains a NUL byte",
        });
    }
    if let Ok(canonical) = fs::canonicalize(path) {
        return Ok(canonical);
    }
    std::path::absolute(path)
        .map(|p| normalize(&p))
        .map_err(|e| Error::io("resolve", path, e))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
