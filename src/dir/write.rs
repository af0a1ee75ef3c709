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

//! Create-then-fill helpers.
//!
//! The file is created exclusively first and only then opened for writing, so a write that
//! fails partway leaves the (possibly truncated) file in place. It is removed with the rest of
//! the directory.

use std::{
    fs::{self, OpenOptions},
    io::{self, Read},
    path::{Path, PathBuf},
};

use smol::io::{AsyncRead, AsyncWriteExt};

use super::{DisappearingDir, NameOptions};
use crate::error::{Error, Result};

impl DisappearingDir {
    /// Creates a file named per `options` holding `contents`. Text is written as UTF-8.
    pub fn write_to_new_file(
        &self,
        contents: impl AsRef<[u8]>,
        options: &NameOptions,
    ) -> Result<PathBuf> {
        let path = self.create_new_file(options)?;
        fs::write(&path, contents).map_err(|e| Error::io("write", &path, e))?;
        Ok(path)
    }

    /// Drains `reader` into a new file. The reader is consumed whether or not this succeeds.
    pub fn copy_to_new_file(&self, mut reader: impl Read, options: &NameOptions) -> Result<PathBuf> {
        let path = self.create_new_file(options)?;
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Error::io("open", &path, e))?;
        io::copy(&mut reader, &mut file).map_err(|e| Error::io("write", &path, e))?;
        Ok(path)
    }

    pub async fn write_to_new_file_async(
        &self,
        contents: impl AsRef<[u8]>,
        options: &NameOptions,
    ) -> Result<PathBuf> {
        let path = self.create_new_file(options)?;
        let mut file = open_async(&path).await?;
        file.write_all(contents.as_ref())
            .await
            .map_err(|e| Error::io("write", &path, e))?;
        file.flush().await.map_err(|e| Error::io("write", &path, e))?;
        Ok(path)
    }

    pub async fn copy_to_new_file_async(
        &self,
        reader: impl AsyncRead,
        options: &NameOptions,
    ) -> Result<PathBuf> {
        let path = self.create_new_file(options)?;
        let mut file = open_async(&path).await?;
        smol::io::copy(reader, &mut file)
            .await
            .map_err(|e| Error::io("write", &path, e))?;
        // smol buffers writes; the data is only on disk after a flush.
        file.flush().await.map_err(|e| Error::io("write", &path, e))?;
        Ok(path)
    }
}

async fn open_async(path: &Path) -> Result<smol::fs::File> {
    smol::fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|e| Error::io("open", path, e))
}
