//! Feeds a running receiver with synthetic frames: one sound source
//! orbiting the listener. Each frame goes out as a single write so the
//! receiver sees one JSON object per read.
//!
//! ```text
//! cargo run --bin replay -- --rate 8 --seconds 20
//! ```

use clap::Parser;
use log::info;
use soundring::dummy_stream::DummyStream;
use soundring::frames::StreamKind;
use std::io::Write;
use std::net::TcpStream;
use std::time::Duration;

#[derive(Debug, Parser)]
#[clap(version, about)]
struct ReplayArgs {
    /// Host the receiver runs on
    #[arg(long = "host", default_value = "127.0.0.1")]
    host: String,

    /// Receiver port for the localization stream
    #[arg(long = "ssl-port", default_value_t = StreamKind::Ssl.default_port())]
    ssl_port: u16,

    /// Receiver port for the tracking stream
    #[arg(long = "sst-port", default_value_t = StreamKind::Sst.default_port())]
    sst_port: u16,

    /// Frames per second on each stream
    #[arg(long = "rate", default_value_t = 8.0)]
    rate: f64,

    /// How long to stream before hanging up
    #[arg(long = "seconds", default_value_t = 30.0)]
    seconds: f64,
}

fn main() {
    env_logger::init();
    let args = ReplayArgs::parse();

    let mut ssl = TcpStream::connect((args.host.as_str(), args.ssl_port))
        .expect("Failed to connect to the SSL port");
    let mut sst = TcpStream::connect((args.host.as_str(), args.sst_port))
        .expect("Failed to connect to the SST port");
    info!(
        "streaming to {}:{} and {}:{}",
        args.host, args.ssl_port, args.host, args.sst_port
    );

    let mut stream = DummyStream::new();
    let period = Duration::from_secs_f64(1.0 / args.rate);
    let frames = (args.seconds * args.rate).max(1.0) as u64;

    for _ in 0..frames {
        ssl.write_all(stream.ssl_json().as_bytes())
            .expect("Receiver went away on the SSL stream");
        sst.write_all(stream.sst_json().as_bytes())
            .expect("Receiver went away on the SST stream");
        spin_sleep::sleep(period);
    }
    info!("replay finished after {} frames", frames);
}
