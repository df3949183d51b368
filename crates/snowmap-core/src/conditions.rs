// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::smet::SmetFile;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// SWE gain over 24h (mm water) above which a station can be flagged as raining.
pub const RAIN_SWE_THRESHOLD_MM: f64 = 5.0;

const HS_COLUMNS: [&str; 3] = ["HS_mod", "HS_mean", "HS_meas"];

/// Latest snow conditions for one station, as shown on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationConditions {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
    /// Total snow height [cm]
    pub hs: f64,
    /// New snow 24h [cm]
    pub hn24: f64,
    /// New snow 72h [cm]
    pub hn72: f64,
    /// Wind speed [m/s]
    pub vw: f64,
    /// Wind direction [deg]
    pub dw: f64,
    pub is_raining: bool,
    /// SWE change over the last 24h [mm]
    pub delta_swe: f64,
    /// Precipitation water over the last 24h [mm]
    pub hnw24: f64,
    pub time: NaiveDateTime,
    /// Offset from UTC in hours, from the SMET `tz` header.
    pub tz: Option<f64>,
}

impl StationConditions {
    /// Derives the station conditions from the most recent row.
    /// Returns `None` when the file holds no data rows.
    pub fn from_smet(smet: &SmetFile) -> Option<Self> {
        let last = smet.rows.len().checked_sub(1)?;
        let time = smet.rows[last].timestamp;
        let latest = |name: &str| smet.value(last, name).unwrap_or(0.0);

        let hs = HS_COLUMNS
            .iter()
            .find_map(|c| smet.value(last, c))
            .unwrap_or(0.0);

        let swe_now = latest("SWE");
        let swe_prev = smet
            .nearest_row(time - Duration::hours(24))
            .and_then(|idx| smet.value(idx, "SWE"))
            .unwrap_or(0.0);
        let delta_swe = swe_now - swe_prev;
        let hnw24 = latest("HNW24");

        let header = &smet.header;
        Some(Self {
            id: header.station_id().to_string(),
            name: header.station_name().to_string(),
            lat: header.latitude(),
            lon: header.longitude(),
            altitude: header.altitude(),
            hs,
            hn24: latest("HN24"),
            hn72: latest("HN72_24"),
            vw: latest("VW"),
            dw: latest("DW"),
            is_raining: is_rain_on_snow(hnw24, delta_swe),
            delta_swe,
            hnw24,
            time,
            tz: header.tz(),
        })
    }

    pub fn time_label(&self) -> String {
        self.time.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Rain is assumed when precipitation fell and the snowpack gained more water
/// than was reported as precipitation.
pub fn is_rain_on_snow(hnw24: f64, delta_swe: f64) -> bool {
    hnw24 > 0.0 && delta_swe > RAIN_SWE_THRESHOLD_MM && delta_swe > hnw24
}
