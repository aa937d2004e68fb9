//! The directional energy model: two ring-indexed histograms that
//! accumulate recent sound energy by azimuth and elevation and decay over
//! time. This is the state behind the light ring. Localization frames
//! pour energy in, the per-element decay bleeds it out, and the display
//! reads the bucket levels back.

use crate::frames::{SslFrame, SslSource};

/// Number of angular buckets per histogram. 360° / 36 = one bucket per 10°
/// of azimuth.
pub const ENERGY_COUNT: usize = 36;

/// Bucket ceiling. Controls smoothness.
pub const MAX_VALUE: i32 = 200;

/// Per-source energy gain. Controls sensitivity.
pub const INCREMENT: i32 = 20;

/// Per-decay-step falloff. Controls how slowly the ring dims.
pub const DECREMENT: i32 = 1;

/// Azimuth of a direction vector, degrees in `[0, 360)`.
pub fn azimuth_degrees(x: f64, y: f64) -> f64 {
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Elevation of a direction vector, degrees in `(-90, 90]`. Derived from
/// the polar angle between the horizontal projection and z.
pub fn elevation_degrees(x: f64, y: f64, z: f64) -> f64 {
    90.0 - ((x.hypot(y).atan2(z).to_degrees() + 180.0) % 180.0)
}

/// Bucket index for an azimuth angle in degrees. Periodic: `a` and
/// `a + 360` land in the same bucket.
pub fn azimuth_bucket(angle: f64) -> usize {
    let raw = (angle / 360.0 * ENERGY_COUNT as f64).floor() as i64;
    raw.rem_euclid(ENERGY_COUNT as i64) as usize
}

/// Bucket index for an elevation angle in degrees. Negative elevations
/// wrap ring-fashion.
pub fn elevation_bucket(angle: f64) -> usize {
    let raw = (angle / 180.0 * ENERGY_COUNT as f64).floor() as i64;
    raw.rem_euclid(ENERGY_COUNT as i64) as usize
}

/// The two decaying per-direction energy histograms. The only state that
/// persists across frames.
#[derive(Debug, Clone)]
pub struct EnergyMap {
    azimuth: [i32; ENERGY_COUNT],
    elevation: [i32; ENERGY_COUNT],
}

impl Default for EnergyMap {
    fn default() -> Self {
        Self::new()
    }
}

impl EnergyMap {
    /// A dark ring: every bucket at zero.
    pub fn new() -> Self {
        Self {
            azimuth: [0; ENERGY_COUNT],
            elevation: [0; ENERGY_COUNT],
        }
    }

    /// One decay step: every positive bucket in both histograms loses
    /// [`DECREMENT`], floored at zero. Buckets at or below zero are left
    /// untouched.
    pub fn decay(&mut self) {
        for bucket in self.azimuth.iter_mut().chain(self.elevation.iter_mut()) {
            if *bucket > 0 {
                *bucket -= DECREMENT;
            }
        }
    }

    /// Fold one source's energy into the histograms, saturating at
    /// [`MAX_VALUE`].
    ///
    /// The elevation increment lands at the azimuth-derived index; only
    /// the ceiling clamp tracks the elevation-derived index. Both paths
    /// are pinned by tests; unifying them changes how the elevation ring
    /// charges and drains.
    pub fn accumulate(&mut self, src: &SslSource) {
        let angle_fi = azimuth_degrees(src.x, src.y);
        let angle_theta = elevation_degrees(src.x, src.y, src.z);
        let i_fi = azimuth_bucket(angle_fi);
        let i_theta = elevation_bucket(angle_theta);

        let theta = angle_theta.to_radians();
        let gain = f64::from(INCREMENT) * src.energy;
        self.azimuth[i_fi] = (f64::from(self.azimuth[i_fi]) + gain * theta.cos()) as i32;
        self.elevation[i_fi] = (f64::from(self.elevation[i_fi]) + gain * theta.sin()) as i32;

        self.azimuth[i_fi] = self.azimuth[i_fi].min(MAX_VALUE);
        self.elevation[i_theta] = self.elevation[i_theta].min(MAX_VALUE);
    }

    /// Process one decoded source element: one decay pass over both
    /// histograms, then one accumulation. Kept as a single operation so
    /// the decay-before-accumulate ordering has exactly one home.
    pub fn fold_source(&mut self, src: &SslSource) {
        self.decay();
        self.accumulate(src);
    }

    /// Fold a whole localization frame, element by element in array order.
    pub fn fold_frame(&mut self, frame: &SslFrame) {
        for src in &frame.sources {
            self.fold_source(src);
        }
    }

    /// Current azimuth bucket levels.
    pub fn azimuth_levels(&self) -> &[i32; ENERGY_COUNT] {
        &self.azimuth
    }

    /// Current elevation bucket levels.
    pub fn elevation_levels(&self) -> &[i32; ENERGY_COUNT] {
        &self.elevation
    }
}
