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

use std::borrow::Cow;

use crate::{
    error::{Error, Result},
    name::normalize_extension,
};

/// How to name a new file or subdirectory.
///
/// Either a fixed [`name`](NameOptions::name), created as-is with no retry, or any mix of
/// [`prefix`](NameOptions::prefix) with one of [`suffix`](NameOptions::suffix) or
/// [`extension`](NameOptions::extension) around a random token. Leaving everything unset picks
/// the default for the entry kind: `<token>.tmp` for files, `dir.<token>` for directories.
///
/// ```
/// use disappearing_dir::NameOptions;
///
/// let logs = NameOptions::new().prefix("run-").extension("log");
/// let config = NameOptions::named("config.toml");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameOptions {
    name: Option<String>,
    prefix: Option<String>,
    suffix: Option<String>,
    extension: Option<String>,
}

impl NameOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new().name(name)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// An extension with or without its leading `.`.
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub(crate) fn resolve(&self) -> Result<Naming<'_>> {
        if let Some(name) = &self.name {
            if self.prefix.is_some() || self.suffix.is_some() || self.extension.is_some() {
                return Err(Error::Options("a fixed name cannot have a prefix or suffix"));
            }
            if name.is_empty() {
                return Err(Error::Options("name is empty"));
            }
            return Ok(Naming::Exact(name));
        }
        let suffix = match (&self.suffix, &self.extension) {
            (Some(_), Some(_)) => {
                return Err(Error::Options("suffix and extension are mutually exclusive"))
            }
            (Some(suffix), None) => Some(Cow::Borrowed(suffix.as_str())),
            (None, Some(extension)) => Some(normalize_extension(extension)),
            (None, None) => None,
        };
        if self.prefix.is_none() && suffix.is_none() {
            return Ok(Naming::Default);
        }
        Ok(Naming::Random {
            prefix: self.prefix.as_deref(),
            suffix,
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Naming<'a> {
    Exact(&'a str),
    Random {
        prefix: Option<&'a str>,
        suffix: Option<Cow<'a, str>>,
    },
    Default,
}
