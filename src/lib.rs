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

//! Temporary directories that clean up after themselves.
//!
//! A [`DisappearingDir`] owns one directory and removes it, recursively and at most once, when
//! it goes out of scope. Removal goes through a [`RobustDeleter`] that copes with read-only
//! entries and briefly locked files, and a failed removal is logged rather than raised, so a
//! scope guard never masks the error that caused the unwind.
//!
//! Files and subdirectories made through the handle get random 128-bit names and are created
//! exclusively, retrying on the rare collision (see [`Creator`]).

pub mod creator;
pub mod deleter;
mod dir;
pub mod error;
pub mod name;

pub use creator::Creator;
pub use deleter::{ForceDeleter, RobustDeleter};
pub use dir::{Builder, DisappearingDir, NameOptions, Search};
pub use error::{DeleteError, Error, Result};
