// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod colormap;
pub mod conditions;
pub mod discovery;
pub mod publish;
pub mod render;
pub mod smet;

use conditions::StationConditions;
use discovery::InputSource;
use log::info;
use render::MapOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnowmapError {
    #[error("no valid SMET files to process")]
    NoInputFiles,
    #[error("no station data could be extracted")]
    NoStations,
    #[error(transparent)]
    Render(#[from] render::RenderError),
    #[error(transparent)]
    Publish(#[from] publish::PublishError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub files_found: usize,
    pub stations: usize,
    pub output: PathBuf,
}

/// Gathers and processes the input files into station conditions.
pub fn load_stations(source: &InputSource) -> Result<Vec<StationConditions>, SnowmapError> {
    let files = discovery::gather_smet_files(source);
    stations_from_files(&files)
}

fn stations_from_files(files: &[PathBuf]) -> Result<Vec<StationConditions>, SnowmapError> {
    if files.is_empty() {
        return Err(SnowmapError::NoInputFiles);
    }
    info!("Found files to process — count={}", files.len());

    let stations = discovery::process_files(files);
    if stations.is_empty() {
        return Err(SnowmapError::NoStations);
    }
    Ok(stations)
}

/// Runs the whole batch: gather, process, render to `output`.
pub fn generate_map(
    source: &InputSource,
    output: &Path,
    opts: &MapOptions,
) -> Result<RunSummary, SnowmapError> {
    let files = discovery::gather_smet_files(source);
    let stations = stations_from_files(&files)?;
    render::write_map(&stations, output, opts)?;

    Ok(RunSummary {
        files_found: files.len(),
        stations: stations.len(),
        output: output.to_path_buf(),
    })
}
