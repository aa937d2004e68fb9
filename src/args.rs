// Commandline argument parser using clap for the soundring receiver

use crate::frames::StreamKind;
use clap::{Parser, ValueEnum};

/// Arguments for the receiver binary. Defaults mirror the stock upstream
/// localizer configuration, so a bare `soundring` works against it.
#[derive(Debug, Parser, Clone)]
#[clap(version, about)]
pub struct RingArgs {
    /// TCP port the sound source localization stream is received on
    #[arg(long = "ssl-port", default_value_t = StreamKind::Ssl.default_port())]
    pub ssl_port: u16,

    /// TCP port the sound source tracking stream is received on
    #[arg(long = "sst-port", default_value_t = StreamKind::Sst.default_port())]
    pub sst_port: u16,

    /// Which light ring variant to drive
    #[arg(short = 'r', long = "ring", value_enum, default_value_t = RingVariant::Creator)]
    pub ring: RingVariant,
}

/// The two supported ring layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RingVariant {
    /// The 35-light ring
    Creator,
    /// The 18-light ring
    Voice,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports_match_the_streams() {
        let args = RingArgs::parse_from(["soundring"]);
        assert_eq!(args.ssl_port, 9001);
        assert_eq!(args.sst_port, 9000);
        assert_eq!(args.ring, RingVariant::Creator);
    }

    #[test]
    fn test_port_overrides() {
        let args = RingArgs::parse_from([
            "soundring",
            "--ssl-port",
            "7001",
            "--sst-port",
            "7000",
            "--ring",
            "voice",
        ]);
        assert_eq!(args.ssl_port, 7001);
        assert_eq!(args.sst_port, 7000);
        assert_eq!(args.ring, RingVariant::Voice);
    }
}
