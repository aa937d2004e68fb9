//! soundring turns live sound direction-of-arrival data into a radial
//! light display. An upstream acoustic localizer pushes two streams of
//! JSON messages over TCP, SSL (instantaneous sound source localization)
//! and SST (tracked source identities). This crate receives both on
//! non-blocking sockets, decodes them into bounded records, and folds
//! every localization event into a pair of decaying per-direction energy
//! histograms. A ring of lights reads the
//! histograms back: each light sits at a fixed angle and glows with the
//! recent sound energy from that direction.
//!
//! The receiving binary is `soundring`; `replay` feeds a receiver with a
//! synthetic orbiting source when no real localizer is around.

#![warn(missing_docs)]
pub mod args;
pub mod display;
pub mod dummy_stream;
pub mod energy;
pub mod frame_decoder;
pub mod frames;
pub mod liveness;
pub mod session;
pub mod stream_reader;
