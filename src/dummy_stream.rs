//! Synthetic wire frames for driving a receiver without a real
//! localizer: one sound source orbiting the listener on the unit sphere,
//! with a little measurement jitter.

use crate::frames::{SslFrame, SslSource, SstFrame, SstSource, MAX_SOURCES};
use rand::prelude::*;

/// Degrees the synthetic source advances per frame.
const DEFAULT_STEP: f64 = 6.0;

/// Jitter applied to the emitted angles, degrees.
const NOISE: f64 = 1.5;

/// Generates a deterministic-ish orbit of SSL/SST frames.
#[derive(Debug)]
pub struct DummyStream {
    azimuth: f64,
    step: f64,
    timestamp: u64,
}

impl Default for DummyStream {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyStream {
    /// An orbit advancing [`DEFAULT_STEP`] degrees per frame.
    pub fn new() -> Self {
        Self::with_step(DEFAULT_STEP)
    }

    /// An orbit advancing `step` degrees per frame.
    pub fn with_step(step: f64) -> Self {
        Self {
            azimuth: 0.0,
            step,
            timestamp: 0,
        }
    }

    fn direction(&self) -> (f64, f64, f64) {
        let mut rng = thread_rng();
        let azimuth = (self.azimuth + rng.gen_range(-NOISE..NOISE)).to_radians();
        // The source bobs above and below the horizon as it orbits.
        let elevation = (20.0 * azimuth.sin()).to_radians();
        (
            elevation.cos() * azimuth.cos(),
            elevation.cos() * azimuth.sin(),
            elevation.sin(),
        )
    }

    /// Advance the orbit and produce the next localization frame: one
    /// active source padded with silent slots up to [`MAX_SOURCES`].
    pub fn next_ssl(&mut self) -> SslFrame {
        self.timestamp += 1;
        self.azimuth = (self.azimuth + self.step) % 360.0;

        let (x, y, z) = self.direction();
        let mut sources = vec![SslSource {
            x,
            y,
            z,
            energy: 0.25 + thread_rng().gen_range(0.0..0.15),
        }];
        sources.resize(MAX_SOURCES, SslSource::default());

        SslFrame {
            timestamp: self.timestamp,
            sources,
        }
    }

    /// The tracking frame matching the current orbit position.
    pub fn next_sst(&mut self) -> SstFrame {
        let (x, y, z) = self.direction();
        let mut sources = vec![SstSource {
            id: 100,
            tag: "dynamic".to_owned(),
            x,
            y,
            z,
            activity: 0.5 + thread_rng().gen_range(0.0..0.5),
        }];
        sources.resize(MAX_SOURCES, SstSource::default());

        SstFrame {
            timestamp: self.timestamp,
            sources,
        }
    }

    /// The next localization frame as wire JSON.
    pub fn ssl_json(&mut self) -> String {
        serde_json::to_string(&self.next_ssl()).expect("SSL frame serializes")
    }

    /// The matching tracking frame as wire JSON.
    pub fn sst_json(&mut self) -> String {
        serde_json::to_string(&self.next_sst()).expect("SST frame serializes")
    }
}
