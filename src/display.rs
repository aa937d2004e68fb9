//! The light-ring seam.
//!
//! The physical LED driver lives outside this crate; everything it needs
//! is behind [`RingDisplay`]: a fixed angle per light position and a
//! color pair per position per repaint. This module also owns the
//! bucket-to-brightness mapping and ships two software rings, a console
//! ring for demos and a null ring for embedding without output.

use crate::energy::{EnergyMap, ENERGY_COUNT, MAX_VALUE};
use log::debug;

/// Brightest channel value the ring is driven at.
pub const MAX_BRIGHTNESS: i32 = 50;

/// Scaled channel values below this render dark.
pub const MIN_THRESHOLD: i32 = 10;

/// Light angles for the 35-light ring variant, clockwise, degrees.
pub const CREATOR_ANGLES: [f64; 35] = [
    170.0, 159.0, 149.0, 139.0, 129.0, 118.0, 108.0, 98.0, 87.0, 77.0, 67.0, 57.0, 46.0, 36.0,
    26.0, 15.0, 5.0, 355.0, 345.0, 334.0, 324.0, 314.0, 303.0, 293.0, 283.0, 273.0, 262.0, 252.0,
    242.0, 231.0, 221.0, 211.0, 201.0, 190.0, 180.0,
];

/// Light angles for the 18-light ring variant, clockwise, degrees.
pub const VOICE_ANGLES: [f64; 18] = [
    170.0, 150.0, 130.0, 110.0, 90.0, 70.0, 50.0, 30.0, 10.0, 350.0, 330.0, 310.0, 290.0, 270.0,
    250.0, 230.0, 210.0, 190.0,
];

/// One light's color pair: the azimuth channel and the elevation channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedColor {
    /// Brightness driven by the azimuth histogram.
    pub azimuth: u8,
    /// Brightness driven by the elevation histogram.
    pub elevation: u8,
}

/// A radial display with one fixed angle per light.
pub trait RingDisplay {
    /// The angle each light sits at, in degrees.
    fn angles(&self) -> &[f64];

    /// Push one color pair per light, in `angles()` order.
    fn render(&mut self, colors: &[LedColor]);
}

/// Scale one bucket level into a channel brightness, dark below the
/// threshold.
fn channel_color(level: i32) -> u8 {
    let scaled = level * MAX_BRIGHTNESS / MAX_VALUE;
    if scaled < MIN_THRESHOLD {
        0
    } else {
        scaled as u8
    }
}

/// Repaint a ring from the current histogram levels: each light reads the
/// bucket its angle falls in.
pub fn paint(display: &mut impl RingDisplay, energy: &EnergyMap) {
    let colors: Vec<LedColor> = display
        .angles()
        .iter()
        .map(|&angle| {
            let bucket = angle as usize * ENERGY_COUNT / 360;
            LedColor {
                azimuth: channel_color(energy.azimuth_levels()[bucket]),
                elevation: channel_color(energy.elevation_levels()[bucket]),
            }
        })
        .collect();
    display.render(&colors);
}

/// Renders the ring as a debug-log bar, one glyph per light.
#[derive(Debug)]
pub struct ConsoleRing {
    angles: &'static [f64],
}

impl ConsoleRing {
    /// A console ring with the 35-light angle layout.
    pub fn creator() -> Self {
        Self {
            angles: &CREATOR_ANGLES,
        }
    }

    /// A console ring with the 18-light angle layout.
    pub fn voice() -> Self {
        Self {
            angles: &VOICE_ANGLES,
        }
    }
}

fn glyph(value: u8) -> char {
    match value {
        0 => '.',
        1..=19 => 'o',
        20..=39 => 'O',
        _ => '@',
    }
}

impl RingDisplay for ConsoleRing {
    fn angles(&self) -> &[f64] {
        self.angles
    }

    fn render(&mut self, colors: &[LedColor]) {
        let azimuth: String = colors.iter().map(|c| glyph(c.azimuth)).collect();
        let elevation: String = colors.iter().map(|c| glyph(c.elevation)).collect();
        debug!("ring azimuth   [{}]", azimuth);
        debug!("ring elevation [{}]", elevation);
    }
}

/// Swallows repaints. For running headless or under test.
#[derive(Debug)]
pub struct NullRing {
    angles: &'static [f64],
}

impl NullRing {
    /// A null ring over the given angle layout.
    pub fn new(angles: &'static [f64]) -> Self {
        Self { angles }
    }
}

impl RingDisplay for NullRing {
    fn angles(&self) -> &[f64] {
        self.angles
    }

    fn render(&mut self, _colors: &[LedColor]) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::SslSource;

    struct CaptureRing {
        angles: &'static [f64],
        last: Vec<LedColor>,
    }

    impl RingDisplay for CaptureRing {
        fn angles(&self) -> &[f64] {
            self.angles
        }
        fn render(&mut self, colors: &[LedColor]) {
            self.last = colors.to_vec();
        }
    }

    #[test]
    fn test_channel_color_scaling_and_threshold() {
        assert_eq!(channel_color(MAX_VALUE), MAX_BRIGHTNESS as u8);
        assert_eq!(channel_color(0), 0);
        // 40 * 50 / 200 == 10, right at the threshold: kept.
        assert_eq!(channel_color(40), 10);
        // 39 * 50 / 200 == 9: below the threshold, dark.
        assert_eq!(channel_color(39), 0);
        // A bucket sitting below zero renders dark, not wrapped.
        assert_eq!(channel_color(-14), 0);
    }

    #[test]
    fn test_angle_tables_stay_within_buckets() {
        for &angle in CREATOR_ANGLES.iter().chain(VOICE_ANGLES.iter()) {
            let bucket = angle as usize * ENERGY_COUNT / 360;
            assert!(bucket < ENERGY_COUNT, "angle {} escapes the ring", angle);
        }
    }

    #[test]
    fn test_paint_lights_the_matching_position() {
        // Saturate bucket 0, then paint a two-light ring with one light
        // in bucket 0 (5°) and one in bucket 17 (170°).
        let mut energy = EnergyMap::new();
        for _ in 0..30 {
            energy.accumulate(&SslSource {
                x: 1.0,
                y: 0.0,
                z: 0.0,
                energy: 1.0,
            });
        }

        static TWO_LIGHTS: [f64; 2] = [5.0, 170.0];
        let mut ring = CaptureRing {
            angles: &TWO_LIGHTS,
            last: Vec::new(),
        };
        paint(&mut ring, &energy);

        assert_eq!(ring.last.len(), 2);
        assert_eq!(ring.last[0].azimuth, MAX_BRIGHTNESS as u8);
        assert_eq!(ring.last[0].elevation, 0);
        assert_eq!(ring.last[1], LedColor::default());
    }
}
