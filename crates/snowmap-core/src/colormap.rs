// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use std::fmt::Write;

const LEGEND_WIDTH: f64 = 450.0;
const LEGEND_MARGIN: f64 = 20.0;
const LEGEND_TICKS: usize = 6;

/// Smallest and largest marker radius, in metres.
pub const MIN_RADIUS_M: f64 = 1000.0;
pub const RADIUS_SPAN_M: f64 = 2000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const GREEN: Rgb = Rgb::new(0, 128, 0);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const ORANGE: Rgb = Rgb::new(255, 165, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// Continuous color scale with evenly spaced stops between `vmin` and `vmax`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearColormap {
    stops: Vec<Rgb>,
    pub vmin: f64,
    pub vmax: f64,
    pub caption: String,
}

impl LinearColormap {
    /// `stops` must hold at least one color; an empty list falls back to black.
    pub fn new(stops: Vec<Rgb>, vmin: f64, vmax: f64, caption: impl Into<String>) -> Self {
        let stops = if stops.is_empty() {
            vec![Rgb::BLACK]
        } else {
            stops
        };
        Self {
            stops,
            vmin,
            vmax,
            caption: caption.into(),
        }
    }

    /// Green through black, used for all snow layers.
    pub fn snow_scale(vmin: f64, vmax: f64, caption: impl Into<String>) -> Self {
        Self::new(
            vec![Rgb::GREEN, Rgb::YELLOW, Rgb::ORANGE, Rgb::RED, Rgb::BLACK],
            vmin,
            vmax,
            caption,
        )
    }

    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }

    pub fn color_at(&self, value: f64) -> Rgb {
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if value.is_nan() || self.stops.len() == 1 {
            return first;
        }
        if self.vmax <= self.vmin {
            return if value < self.vmin { first } else { last };
        }

        let pos = ((value - self.vmin) / (self.vmax - self.vmin)).clamp(0.0, 1.0);
        let scaled = pos * (self.stops.len() - 1) as f64;
        let idx = (scaled.floor() as usize).min(self.stops.len() - 2);
        self.stops[idx].lerp(self.stops[idx + 1], scaled - idx as f64)
    }

    pub fn ticks(&self, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![self.vmin],
            _ => {
                let step = (self.vmax - self.vmin) / (n - 1) as f64;
                (0..n).map(|i| self.vmin + step * i as f64).collect()
            }
        }
    }

    /// Horizontal SVG color bar with tick labels and caption.
    pub fn legend_svg(&self, id: &str) -> String {
        let height = 50.0;
        let bar_y = 20.0;
        let bar_h = 10.0;
        let gradient_id = format!("{id}-gradient");

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg height="{height}" width="{w}" xmlns="http://www.w3.org/2000/svg">"#,
            w = LEGEND_WIDTH + 2.0 * LEGEND_MARGIN
        );
        let _ = write!(
            svg,
            r#"<defs><linearGradient id="{gradient_id}" x1="0%" y1="0%" x2="100%" y2="0%">"#
        );
        let last = (self.stops.len().max(2) - 1) as f64;
        for (i, stop) in self.stops.iter().enumerate() {
            let _ = write!(
                svg,
                r#"<stop offset="{:.1}%" stop-color="{}"/>"#,
                i as f64 / last * 100.0,
                stop.to_hex()
            );
        }
        svg.push_str("</linearGradient></defs>");
        let _ = write!(
            svg,
            r#"<rect x="{LEGEND_MARGIN}" y="{bar_y}" width="{LEGEND_WIDTH}" height="{bar_h}" fill="url(#{gradient_id})"/>"#
        );

        let span = self.vmax - self.vmin;
        for tick in self.ticks(LEGEND_TICKS) {
            let frac = if span > 0.0 {
                (tick - self.vmin) / span
            } else {
                0.0
            };
            let x = LEGEND_MARGIN + frac * LEGEND_WIDTH;
            let _ = write!(
                svg,
                r#"<g class="tick" transform="translate({x:.1},{y})"><line y2="4" stroke="black"/><text y="16" text-anchor="middle">{label}</text></g>"#,
                y = bar_y + bar_h,
                label = format_tick(tick)
            );
        }

        let _ = write!(
            svg,
            r#"<text class="caption" x="{LEGEND_MARGIN}" y="14">{}</text></svg>"#,
            html_escape::encode_text(&self.caption)
        );
        svg
    }
}

fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-6 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Circle radius in metres, scaled by `value` against the largest value of
/// the layer.
pub fn marker_radius(value: f64, max_value: f64) -> f64 {
    if max_value <= 0.0 {
        return MIN_RADIUS_M;
    }
    MIN_RADIUS_M + (value / max_value) * RADIUS_SPAN_M
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(Rgb::GREEN.to_hex(), "#008000");
        assert_eq!(Rgb::ORANGE.to_hex(), "#ffa500");
    }

    #[test]
    fn test_color_at_stops_and_clamping() {
        let cmap = LinearColormap::snow_scale(0.0, 100.0, "HS");
        assert_eq!(
            cmap.stops(),
            &[Rgb::GREEN, Rgb::YELLOW, Rgb::ORANGE, Rgb::RED, Rgb::BLACK]
        );
        assert_eq!(cmap.color_at(0.0), Rgb::GREEN);
        assert_eq!(cmap.color_at(25.0), Rgb::YELLOW);
        assert_eq!(cmap.color_at(50.0), Rgb::ORANGE);
        assert_eq!(cmap.color_at(75.0), Rgb::RED);
        assert_eq!(cmap.color_at(100.0), Rgb::BLACK);
        assert_eq!(cmap.color_at(-20.0), Rgb::GREEN);
        assert_eq!(cmap.color_at(500.0), Rgb::BLACK);
        assert_eq!(cmap.color_at(f64::NAN), Rgb::GREEN);
    }

    #[test]
    fn test_color_at_interpolates() {
        let cmap = LinearColormap::new(vec![Rgb::BLACK, Rgb::new(200, 100, 50)], 0.0, 10.0, "");
        assert_eq!(cmap.color_at(5.0), Rgb::new(100, 50, 25));
    }

    #[test]
    fn test_degenerate_range() {
        let cmap = LinearColormap::snow_scale(10.0, 10.0, "flat");
        assert_eq!(cmap.color_at(5.0), Rgb::GREEN);
        assert_eq!(cmap.color_at(10.0), Rgb::BLACK);

        let single = LinearColormap::new(Vec::new(), 0.0, 1.0, "");
        assert_eq!(single.stops(), &[Rgb::BLACK]);
        assert_eq!(single.color_at(0.5), Rgb::BLACK);
    }

    #[test]
    fn test_ticks() {
        let cmap = LinearColormap::snow_scale(0.0, 150.0, "HN24");
        assert_eq!(cmap.ticks(4), vec![0.0, 50.0, 100.0, 150.0]);
        assert_eq!(cmap.ticks(1), vec![0.0]);
        assert!(cmap.ticks(0).is_empty());
    }

    #[test]
    fn test_legend_svg() {
        let cmap = LinearColormap::snow_scale(0.0, 100.0, "New Snow <24h> [cm]");
        let svg = cmap.legend_svg("colorbar-hn24");
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"id="colorbar-hn24-gradient""#));
        assert!(svg.contains(r##"stop-color="#ffa500""##));
        assert!(svg.contains(r#"class="caption""#));
        assert!(svg.contains("New Snow &lt;24h&gt; [cm]"));
        assert!(svg.contains(">100</text>"));
        assert_eq!(svg.matches(r#"class="tick""#).count(), LEGEND_TICKS);
    }

    #[test]
    fn test_marker_radius() {
        assert_eq!(marker_radius(0.0, 100.0), 1000.0);
        assert_eq!(marker_radius(50.0, 100.0), 2000.0);
        assert_eq!(marker_radius(100.0, 100.0), 3000.0);
        assert_eq!(marker_radius(10.0, 0.0), 1000.0);
        assert_eq!(marker_radius(10.0, -5.0), 1000.0);
    }
}
