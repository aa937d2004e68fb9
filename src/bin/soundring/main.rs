//! The receiver process: listen on both stream ports, wait for the
//! localizer to connect, then run the ingestion loop until the streams
//! go away.
//!
//! ```text
//! RUST_LOG=debug cargo run --bin soundring -- --ring voice
//! ```

use clap::Parser;
use log::info;
use soundring::args::{RingArgs, RingVariant};
use soundring::display::ConsoleRing;
use soundring::frames::StreamKind;
use soundring::session::Session;
use soundring::stream_reader::StreamReader;

fn main() {
    env_logger::init();
    let args = RingArgs::parse();

    let reader = StreamReader::bind(Some(args.ssl_port), Some(args.sst_port))
        .expect("Failed to bind the stream ports");
    info!(
        "waiting for producers: SSL on {:?}, SST on {:?}",
        reader.local_addr(StreamKind::Ssl),
        reader.local_addr(StreamKind::Sst)
    );

    let display = match args.ring {
        RingVariant::Creator => ConsoleRing::creator(),
        RingVariant::Voice => ConsoleRing::voice(),
    };

    let mut session = Session::new(reader, display);
    session.run().expect("Failed to accept stream connections");
    info!("session terminated, shutting down");
}
