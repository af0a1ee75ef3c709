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

use std::{
    io,
    path::{Path, PathBuf},
};

use regex::{Regex, RegexBuilder};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Which entries [`files`](crate::DisappearingDir::files) and
/// [`directories`](crate::DisappearingDir::directories) return.
///
/// Patterns use `*` (any run of characters) and `?` (exactly one) and are matched against
/// the entry's file name only. Matching ignores case on Windows.
#[derive(Clone, Debug, Default)]
pub struct Search {
    pattern: Option<String>,
    recursive: bool,
}

impl Search {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Descend into subdirectories instead of listing only direct children.
    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Listing {
    Files,
    Directories,
}

pub(crate) fn list(root: &Path, search: &Search, listing: Listing) -> Result<Vec<PathBuf>> {
    let matcher = search.pattern.as_deref().map(glob_regex).transpose()?;
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(if search.recursive { usize::MAX } else { 1 });

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            Error::io("list", path, io::Error::from(e))
        })?;
        let file_type = entry.file_type();
        let wanted = match listing {
            Listing::Files => file_type.is_file(),
            Listing::Directories => file_type.is_dir(),
        };
        if !wanted {
            continue;
        }
        if let Some(re) = &matcher {
            if !re.is_match(&entry.file_name().to_string_lossy()) {
                continue;
            }
        }
        found.push(entry.into_path());
    }
    found.sort();
    Ok(found)
}

fn glob_regex(pattern: &str) -> Result<Regex> {
    let mut re = String::with_capacity(pattern.len() + 2);
    re.push('^');
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c => re.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    re.push('$');
    RegexBuilder::new(&re)
        .case_insensitive(cfg!(windows))
        .dot_matches_new_line(true)
        .build()
        .map_err(|source| Error::Pattern {
            pattern: pattern.into(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn glob_translation() {
        let re = glob_regex("*.txt").unwrap();
        assert!(re.is_match("a.txt"));
        assert!(re.is_match(".txt"));
        assert!(!re.is_match("a.txt.bak"));
        assert!(!re.is_match("atxt"));

        let re = glob_regex("log-?.[1]").unwrap();
        assert!(re.is_match("log-a.[1]"));
        assert!(!re.is_match("log-ab.[1]"));
        assert!(!re.is_match("log-a.1"));
    }

    #[test]
    fn oversized_pattern_is_a_pattern_error() {
        let pattern = "?".repeat(1 << 20);
        let err = glob_regex(&pattern).unwrap_err();
        assert_eq!(err.to_string(), "invalid search pattern");
        assert!(matches!(err, Error::Pattern { pattern: ref p, .. } if *p == pattern));
    }

    #[test]
    fn lists_by_kind_and_depth() {
        let base = tempfile::tempdir().unwrap();
        let root = base.path();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("a.txt"), "").unwrap();
        fs::write(root.join("b.log"), "").unwrap();
        fs::write(root.join("sub/c.txt"), "").unwrap();

        let files = list(root, &Search::new(), Listing::Files).unwrap();
        assert_eq!(files, vec![root.join("a.txt"), root.join("b.log")]);

        let txt = list(root, &Search::new().pattern("*.txt").recursive(), Listing::Files).unwrap();
        assert_eq!(txt, vec![root.join("a.txt"), root.join("sub/c.txt")]);

        let dirs = list(root, &Search::new(), Listing::Directories).unwrap();
        assert_eq!(dirs, vec![root.join("sub")]);

        let dirs = list(root, &Search::new().recursive(), Listing::Directories).unwrap();
        assert_eq!(dirs, vec![root.join("sub"), root.join("sub/deeper")]);
    }
}
