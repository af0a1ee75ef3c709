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

//! Random, filesystem-safe names.

use std::borrow::Cow;

/// Returns 128 random bits as 32 lowercase hex digits.
///
/// Lowercase keeps two tokens from colliding on case-insensitive filesystems when they would
/// differ only by case.
pub fn random_token() -> String {
    format!("{:032x}", rand::random::<u128>())
}

/// Builds `prefix + token + suffix`. Either side may be absent or empty.
pub fn generate_random_string(prefix: Option<&str>, suffix: Option<&str>) -> String {
    let prefix = prefix.unwrap_or_default();
    let suffix = suffix.unwrap_or_default();
    let mut name = String::with_capacity(prefix.len() + 32 + suffix.len());
    name.push_str(prefix);
    name.push_str(&random_token());
    name.push_str(suffix);
    name
}

/// Prepends the `.` separator to an extension that lacks one.
pub fn normalize_extension(extension: &str) -> Cow<'_, str> {
    if extension.is_empty() || extension.starts_with('.') {
        Cow::Borrowed(extension)
    } else {
        Cow::Owned(format!(".{extension}"))
    }
}
