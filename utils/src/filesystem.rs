/*
 * Copyright (c):
 * 2025 zephyrj
 * zephyrj@protonmail.com
 *
 * This file is part of speedy.
 *
 * speedy is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * speedy is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with speedy. If not, see <https://www.gnu.org/licenses/>.
 */

use std::{fs, io};
use std::path::{Path, PathBuf};

/// List every regular file in `path` with the given extension
pub fn get_filetypes_in_path(path: &Path, file_type: &str) -> io::Result<Vec<PathBuf>> {
    let dir_entries = fs::read_dir(path)?;
    let mut files: Vec<PathBuf> = dir_entries.filter_map(|e| {
        let entry_path = e.ok()?.path();
        if !entry_path.is_file() {
            return None;
        }
        match entry_path.extension() {
            Some(ext) if ext == file_type => Some(entry_path),
            _ => None
        }
    }).collect();
    files.sort();
    Ok(files)
}

/// Turns a user supplied name into a filename that is safe to use within `path`.
///
/// Characters that are illegal in a filesystem path are stripped and spaces are
/// replaced with underscores. Unlike a unique filename the same name always maps
/// to the same path so that saving a dataset twice overwrites it.
pub fn safe_filename_in_path(path: &Path, name: &str, extension: &str) -> PathBuf {
    let sanitized_name = sanitize_filename::sanitize(name).replace(' ', "_");
    path.join(format!("{}.{}", sanitized_name, extension))
}
