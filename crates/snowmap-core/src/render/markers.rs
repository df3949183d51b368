// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::colormap::{marker_radius, LinearColormap};
use crate::conditions::StationConditions;
use html_escape::encode_text;
use serde::Serialize;

pub const HN24_SCALE_MAX: f64 = 100.0;
pub const HN72_SCALE_MAX: f64 = 150.0;

const RAIN_COLOR: &str = "red";
const DRY_COLOR: &str = "green";

/// Colormaps and radius normalisation for the three snow layers.
#[derive(Debug, Clone)]
pub struct LayerScales {
    pub max_hs: f64,
    pub max_hn24: f64,
    pub max_hn72: f64,
    pub hs: LinearColormap,
    pub hn24: LinearColormap,
    pub hn72: LinearColormap,
}

impl LayerScales {
    /// Maxima are floored at 1.0 so radius scaling never divides by zero.
    pub fn from_stations(stations: &[StationConditions]) -> Self {
        let max_hs = layer_max(stations, |s| s.hs);
        let max_hn24 = layer_max(stations, |s| s.hn24);
        let max_hn72 = layer_max(stations, |s| s.hn72);

        Self {
            max_hs,
            max_hn24,
            max_hn72,
            hs: LinearColormap::snow_scale(0.0, max_hs, "Total Snow (HS) [cm]"),
            hn24: LinearColormap::snow_scale(0.0, HN24_SCALE_MAX, "New Snow 24h [cm]"),
            hn72: LinearColormap::snow_scale(0.0, HN72_SCALE_MAX, "New Snow 72h [cm]"),
        }
    }
}

fn layer_max(stations: &[StationConditions], metric: impl Fn(&StationConditions) -> f64) -> f64 {
    stations.iter().map(metric).fold(0.0_f64, f64::max).max(1.0)
}

#[derive(Debug, Clone, Serialize)]
pub struct CircleMarker {
    pub radius: f64,
    pub fill_color: String,
    pub tooltip: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindMarker {
    pub icon_html: String,
    pub tooltip: String,
}

/// Everything the page script needs to draw one station.
#[derive(Debug, Clone, Serialize)]
pub struct StationMarkers {
    pub lat: f64,
    pub lon: f64,
    pub color: &'static str,
    pub popup: String,
    pub hs: CircleMarker,
    pub hn24: CircleMarker,
    pub hn72: CircleMarker,
    pub wind: WindMarker,
}

impl StationMarkers {
    pub fn build(s: &StationConditions, scales: &LayerScales) -> Self {
        let elevation = s.altitude.trunc() as i64;

        Self {
            lat: s.lat,
            lon: s.lon,
            color: border_color(s),
            popup: popup_html(s),
            hs: CircleMarker {
                radius: marker_radius(s.hs, scales.max_hs),
                fill_color: scales.hs.color_at(s.hs).to_hex(),
                tooltip: format!("Elevation: {} m<br>HS: {:.0}cm", elevation, s.hs),
            },
            hn24: CircleMarker {
                radius: marker_radius(s.hn24, scales.max_hn24),
                fill_color: scales.hn24.color_at(s.hn24).to_hex(),
                tooltip: format!("HN24: {:.0}cm", s.hn24),
            },
            hn72: CircleMarker {
                radius: marker_radius(s.hn72, scales.max_hn72),
                fill_color: scales.hn72.color_at(s.hn72).to_hex(),
                tooltip: format!("HN72: {:.0}cm", s.hn72),
            },
            wind: WindMarker {
                icon_html: wind_arrow_html(s.dw, s.vw),
                tooltip: format!("Wind: {:.1} m/s", s.vw),
            },
        }
    }
}

fn border_color(s: &StationConditions) -> &'static str {
    if s.is_raining {
        RAIN_COLOR
    } else {
        DRY_COLOR
    }
}

pub fn popup_html(s: &StationConditions) -> String {
    let color = border_color(s);
    let rain = if s.is_raining {
        format!("YES.<br>Est. 24 hrs. rain: {:.2} mm", s.delta_swe)
    } else {
        "No".to_string()
    };

    format!(
        r#"<div style="font-family: sans-serif; width: 180px;">
    <b>{name}</b> <span style="color: gray;">({id})</span><br>
    <b>Elevation: {elevation} m</b><br>
    <span style="color: gray; font-size: 0.9em;">{time}</span><hr>
    <b>HS:</b> {hs:.1} cm<br>
    <b>HN24:</b> {hn24:.1} cm<br>
    <b>HN72:</b> {hn72:.1} cm<br>
    <b>Rain (24h):</b> <span style="color:{color}; font-weight:bold;">{rain}</span><br>
    <b>Wind:</b> {vw:.1} m/s @ {dw:.0}&deg;
</div>"#,
        name = encode_text(&s.name),
        id = encode_text(&s.id),
        elevation = s.altitude.trunc() as i64,
        time = s.time_label(),
        hs = s.hs,
        hn24 = s.hn24,
        hn72 = s.hn72,
        vw = s.vw,
        dw = s.dw,
    )
}

/// Arrow icon rotated to the wind direction, labelled with the speed.
pub fn wind_arrow_html(angle: f64, speed: f64) -> String {
    format!(
        r#"<div style="transform: rotate({angle}deg); width: 30px; height: 30px; display: flex; align-items: center; justify-content: center;">
    <svg viewBox="0 0 24 24" width="30" height="30" fill="black" stroke="white" stroke-width="1">
        <path d="M12 2L4.5 20.29L5.21 21L12 18L18.79 21L19.5 20.29L12 2Z" />
    </svg>
    <span style="position:absolute; bottom:-15px; font-weight:bold; background:white; padding:0 2px; border-radius:3px; font-size:10px; white-space: nowrap;">{speed:.1} m/s</span>
</div>"#
    )
}
