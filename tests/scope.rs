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

use std::{fs, path::Path};

use disappearing_dir::{Builder, DeleteError, DisappearingDir, Error, NameOptions, Search};

#[test]
fn job_directory_lifecycle() {
    let base = tempfile::tempdir().unwrap();
    let base_path = fs::canonicalize(base.path()).unwrap();

    let dir = DisappearingDir::create_in(&base_path, Some("job.")).unwrap();
    let root = dir.path().to_path_buf();
    assert_eq!(root.parent().unwrap(), base_path);
    assert!(root
        .file_name()
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("job."));

    let out = dir
        .write_to_new_file(b"\x01\x02\x03", &NameOptions::named("out.txt"))
        .unwrap();
    assert_eq!(out, root.join("out.txt"));
    assert_eq!(fs::read(&out).unwrap(), b"\x01\x02\x03");

    let nested = dir.create_subdirectory().unwrap();
    fs::write(nested.join("deep.txt"), "deep").unwrap();
    assert_eq!(
        dir.files(&Search::new().pattern("*.txt").recursive())
            .unwrap()
            .len(),
        2
    );

    dir.dispose();
    assert!(!root.exists());
    dir.dispose();
}

#[test]
fn cleanup_runs_during_unwind() {
    let base = tempfile::tempdir().unwrap();
    let mut seen = None;

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let dir = DisappearingDir::create_in(base.path(), None).unwrap();
        dir.create_file().unwrap();
        seen = Some(dir.path().to_path_buf());
        panic!("job failed");
    }));

    assert!(result.is_err());
    assert!(!seen.unwrap().exists());
}

#[test]
fn failed_cleanup_does_not_replace_original_error() {
    let base = tempfile::tempdir().unwrap();

    let run = || -> Result<(), Error> {
        let dir = Builder::new()
            .deleter(|path: &Path| -> Result<(), DeleteError> {
                Err(DeleteError {
                    path: path.into(),
                    source: std::io::Error::other("locked"),
                })
            })
            .create_in(base.path())
            .unwrap();
        dir.create_named_file("x")?;
        dir.create_named_file("x")?;
        Ok(())
    };

    assert!(matches!(run(), Err(Error::AlreadyExists { .. })));
}
