//! Typed records for the two direction-of-arrival streams, SSL (sound
//! source localization) and SST (sound source tracking). One frame is one
//! wire message; each new frame wholly replaces the previous snapshot, so
//! nothing in here retains history.

use serde::Serialize;
use std::fmt;

/// Upper bound on sources per frame. Must match the `nPots` setting of the
/// upstream localizer configuration.
pub const MAX_SOURCES: usize = 4;

/// Maximum stored length of an SST tag, in bytes.
pub const TAG_BYTES: usize = 20;

/// The two logical streams, in the fixed per-tick polling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Instantaneous per-source direction and energy estimates.
    Ssl,
    /// Persistent tracked source identities with activity confidence.
    Sst,
}

impl StreamKind {
    /// Both kinds, in polling order: SSL is always processed first.
    pub const ALL: [StreamKind; 2] = [StreamKind::Ssl, StreamKind::Sst];

    /// Default TCP port for this stream.
    pub fn default_port(&self) -> u16 {
        match self {
            StreamKind::Ssl => 9001,
            StreamKind::Sst => 9000,
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Ssl => write!(f, "SSL"),
            StreamKind::Sst => write!(f, "SST"),
        }
    }
}

/// One localized sound source: a unit-ish direction vector plus an energy
/// estimate. Energy is non-negative for any sane upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SslSource {
    /// X component of the direction vector.
    pub x: f64,
    /// Y component of the direction vector.
    pub y: f64,
    /// Z component of the direction vector.
    pub z: f64,
    /// Sound energy estimate.
    #[serde(rename = "E")]
    pub energy: f64,
}

/// One decoded SSL message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SslFrame {
    /// Monotonically increasing frame timestamp from the localizer.
    #[serde(rename = "timeStamp")]
    pub timestamp: u64,
    /// Up to [`MAX_SOURCES`] localized sources.
    #[serde(rename = "src")]
    pub sources: Vec<SslSource>,
}

/// One tracked sound source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SstSource {
    /// Tracker-assigned source id, 0 when the slot is unused.
    pub id: u32,
    /// Short tracker label, at most [`TAG_BYTES`] bytes.
    pub tag: String,
    /// X component of the tracked direction.
    pub x: f64,
    /// Y component of the tracked direction.
    pub y: f64,
    /// Z component of the tracked direction.
    pub z: f64,
    /// Activity confidence in `[0, 1]`.
    pub activity: f64,
}

/// One decoded SST message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SstFrame {
    /// Monotonically increasing frame timestamp from the tracker.
    #[serde(rename = "timeStamp")]
    pub timestamp: u64,
    /// Up to [`MAX_SOURCES`] tracked sources.
    #[serde(rename = "src")]
    pub sources: Vec<SstSource>,
}

impl fmt::Display for SslFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SSL frame, timestamp {}", self.timestamp)?;
        for (i, s) in self.sources.iter().enumerate() {
            writeln!(
                f,
                "\tsrc[{}]\tx={:.3}\ty={:.3}\tz={:.3}\tE={:.3}",
                i, s.x, s.y, s.z, s.energy
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for SstFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SST frame, timestamp {}", self.timestamp)?;
        for (i, s) in self.sources.iter().enumerate() {
            writeln!(
                f,
                "\tsrc[{}]\tid={}\ttag={}\tx={:.3}\ty={:.3}\tz={:.3}\tactivity={:.3}",
                i, s.id, s.tag, s.x, s.y, s.z, s.activity
            )?;
        }
        Ok(())
    }
}
