// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod assets;
pub mod markers;

use crate::conditions::StationConditions;
use log::{debug, info};
use markers::{LayerScales, StationMarkers};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_OUTPUT: &str = "snow_conditions_map.html";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no station data to map")]
    NoStations,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct MapOptions {
    pub title: String,
    pub zoom_start: u8,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            title: "Snow Conditions Map".to_string(),
            zoom_start: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct BaseLayer {
    name: &'static str,
    url: &'static str,
    attribution: &'static str,
    max_zoom: u8,
}

/// The first entry is the default base map.
static BASE_LAYERS: [BaseLayer; 4] = [
    BaseLayer {
        name: "CartoDB positron",
        url: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
        attribution: "&copy; OpenStreetMap contributors &copy; CARTO",
        max_zoom: 20,
    },
    BaseLayer {
        name: "OpenStreetMap",
        url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
        attribution: "&copy; OpenStreetMap contributors",
        max_zoom: 19,
    },
    BaseLayer {
        name: "Topographic",
        url: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
        attribution: "Map data &copy; OpenStreetMap contributors, SRTM | Map style &copy; OpenTopoMap (CC-BY-SA)",
        max_zoom: 17,
    },
    BaseLayer {
        name: "Satellite",
        url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
        attribution: "Esri",
        max_zoom: 19,
    },
];

#[derive(Debug, Clone, Serialize)]
struct OverlayLayer {
    key: &'static str,
    name: &'static str,
    show: bool,
    colorbar_id: Option<&'static str>,
}

pub const HS_LAYER: &str = "Total Snow Height (HS)";
pub const HN24_LAYER: &str = "New Snow 24h";
pub const HN72_LAYER: &str = "New Snow 72h";
pub const WIND_LAYER: &str = "Wind Direction";

static OVERLAYS: [OverlayLayer; 4] = [
    OverlayLayer {
        key: "hs",
        name: HS_LAYER,
        show: true,
        colorbar_id: Some("colorbar-hs"),
    },
    OverlayLayer {
        key: "hn24",
        name: HN24_LAYER,
        show: false,
        colorbar_id: Some("colorbar-hn24"),
    },
    OverlayLayer {
        key: "hn72",
        name: HN72_LAYER,
        show: false,
        colorbar_id: Some("colorbar-hn72"),
    },
    OverlayLayer {
        key: "wind",
        name: WIND_LAYER,
        show: false,
        colorbar_id: None,
    },
];

#[derive(Serialize)]
struct PageConfig<'a> {
    center: [f64; 2],
    zoom: u8,
    base_layers: &'a [BaseLayer],
    layers: &'a [OverlayLayer],
    stations: Vec<StationMarkers>,
}

/// Renders the full HTML page for the given stations.
pub fn render_map(stations: &[StationConditions], opts: &MapOptions) -> Result<String, RenderError> {
    let first = stations.first().ok_or(RenderError::NoStations)?;
    let scales = LayerScales::from_stations(stations);

    let config = PageConfig {
        center: [first.lat, first.lon],
        zoom: opts.zoom_start,
        base_layers: &BASE_LAYERS,
        layers: &OVERLAYS,
        stations: stations
            .iter()
            .map(|s| StationMarkers::build(s, &scales))
            .collect(),
    };
    let config_json = script_safe(&serde_json::to_string(&config)?);

    let latest = latest_station(stations).unwrap_or(first);
    let title = html_escape::encode_text(&opts.title);

    let mut html = String::with_capacity(16 * 1024 + config_json.len());
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("    <meta charset=\"utf-8\"/>\n");
    html.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\"/>\n");
    let _ = writeln!(html, "    <title>{title}</title>");
    html.push_str(assets::HEAD_LINKS);
    html.push_str(assets::PAGE_CSS);
    html.push_str("</head>\n<body>\n");
    html.push_str("<div id=\"map\"></div>\n");

    let _ = writeln!(
        html,
        "<div class=\"map-title\">{title}<br><span>Last Updated: {} {}</span></div>",
        latest.time.format("%Y-%m-%d %H:%M"),
        tz_label(latest.tz)
    );

    for (layer, cmap) in [
        (&OVERLAYS[0], &scales.hs),
        (&OVERLAYS[1], &scales.hn24),
        (&OVERLAYS[2], &scales.hn72),
    ] {
        let id = layer.colorbar_id.unwrap_or(layer.key);
        let display = if layer.show { "block" } else { "none" };
        let _ = writeln!(
            html,
            "<div id=\"{id}\" class=\"colorbar-container\" style=\"display: {display};\">{}</div>",
            cmap.legend_svg(id)
        );
    }

    html.push_str("<script>\nvar SNOWMAP_CONFIG = ");
    html.push_str(&config_json);
    html.push_str(";\n");
    html.push_str(assets::MAP_SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");

    debug!(
        "Rendered map page — stations={} bytes={}",
        stations.len(),
        html.len()
    );
    Ok(html)
}

/// Renders the page and writes it to `path`, replacing any existing file.
pub fn write_map<P: AsRef<Path>>(
    stations: &[StationConditions],
    path: P,
    opts: &MapOptions,
) -> Result<(), RenderError> {
    let html = render_map(stations, opts)?;
    fs::write(path.as_ref(), html)?;
    info!(
        "Map saved — path={} stations={}",
        path.as_ref().display(),
        stations.len()
    );
    Ok(())
}

fn latest_station(stations: &[StationConditions]) -> Option<&StationConditions> {
    stations.iter().max_by_key(|s| s.time)
}

/// `UTC` or `UTC+hh:mm` for a SMET `tz` offset in hours.
pub fn tz_label(tz: Option<f64>) -> String {
    match tz {
        Some(hours) if hours != 0.0 => {
            let minutes = (hours * 60.0).round() as i64;
            let sign = if minutes < 0 { '-' } else { '+' };
            let minutes = minutes.abs();
            format!("UTC{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
        }
        _ => "UTC".to_string(),
    }
}

/// Keeps embedded JSON from closing the surrounding script element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
