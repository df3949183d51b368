// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::conditions::StationConditions;
use crate::smet::SmetFile;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const SMET_EXTENSION: &str = "smet";
pub const DEFAULT_FOLDER: &str = "data";

/// Where the SMET files for a run come from.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    /// Searched recursively for `*.smet`.
    Folder(PathBuf),
    Files(Vec<PathBuf>),
}

impl Default for InputSource {
    fn default() -> Self {
        InputSource::Folder(PathBuf::from(DEFAULT_FOLDER))
    }
}

fn is_smet(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(SMET_EXTENSION))
        .unwrap_or(false)
}

/// Collects the input files. Problems are logged and yield fewer (or no) paths.
pub fn gather_smet_files(source: &InputSource) -> Vec<PathBuf> {
    match source {
        InputSource::Folder(folder) => {
            if !folder.is_dir() {
                error!(
                    "Folder does not exist or is not a directory — folder={}",
                    folder.display()
                );
                return Vec::new();
            }

            let mut files: Vec<PathBuf> = WalkDir::new(folder)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_smet(e.path()))
                .map(|e| e.into_path())
                .collect();
            files.sort();

            if files.is_empty() {
                warn!("No .smet files found — folder={}", folder.display());
            }
            files
        }
        InputSource::Files(list) => list
            .iter()
            .filter(|p| {
                let ok = p.is_file();
                if !ok {
                    warn!("Input file not found or invalid — path={}", p.display());
                }
                ok
            })
            .cloned()
            .collect(),
    }
}

/// Parses each file and derives its conditions. Files that fail are logged
/// and skipped.
pub fn process_files(paths: &[PathBuf]) -> Vec<StationConditions> {
    let mut stations = Vec::with_capacity(paths.len());

    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match SmetFile::parse_file(path) {
            Ok(smet) => match StationConditions::from_smet(&smet) {
                Some(conditions) => {
                    info!(
                        "Processed — file={} station={} time={}",
                        name,
                        conditions.id,
                        conditions.time_label()
                    );
                    stations.push(conditions);
                }
                None => warn!("No data rows; skipping — file={}", name),
            },
            Err(e) => error!("Failed to process — file={} error={}", name, e),
        }
    }

    stations
}
