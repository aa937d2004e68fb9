//! The ingestion loop: one logical thread polling both streams, decoding
//! whatever arrived, folding localization frames into the energy map, and
//! repainting the ring. The loop runs until the liveness tracker calls
//! the session over.

use crate::display::{paint, RingDisplay};
use crate::energy::EnergyMap;
use crate::frame_decoder::{decode_ssl, decode_sst};
use crate::frames::{SslFrame, SstFrame, StreamKind};
use crate::liveness::{LivenessTracker, SessionState};
use crate::stream_reader::{ReceiveOutcome, StreamReader};
use log::{debug, info, warn};
use std::io;
use std::time::Duration;

/// Pause after a tick in which neither stream produced data. Keeps the
/// polling loop from spinning the CPU while the producers are between
/// frames.
pub const TICK_PAUSE: Duration = Duration::from_millis(10);

/// One receiver session: two stream channels in, one light ring out.
pub struct Session<D: RingDisplay> {
    reader: StreamReader,
    display: D,
    energy: EnergyMap,
    liveness: LivenessTracker,
    current_ssl: SslFrame,
    current_sst: SstFrame,
    tick_pause: Duration,
}

impl<D: RingDisplay> Session<D> {
    /// A session over an already-bound reader and a ring to drive.
    pub fn new(reader: StreamReader, display: D) -> Self {
        Self {
            reader,
            display,
            energy: EnergyMap::new(),
            liveness: LivenessTracker::new(),
            current_ssl: SslFrame::default(),
            current_sst: SstFrame::default(),
            tick_pause: TICK_PAUSE,
        }
    }

    /// Override the idle-tick pause. Tests run with zero.
    pub fn with_tick_pause(mut self, pause: Duration) -> Self {
        self.tick_pause = pause;
        self
    }

    /// Accept both producers, then poll until the session terminates.
    pub fn run(&mut self) -> io::Result<()> {
        self.reader.accept_all()?;
        info!("receiving data");

        let mut ticks: u64 = 0;
        while self.tick() == SessionState::Active {
            ticks += 1;
        }
        info!("reception finished after {} ticks", ticks);
        Ok(())
    }

    /// One polling tick: one receive attempt per stream in order, decode
    /// and fold anything that arrived, and feed every outcome to the
    /// liveness tracker.
    pub fn tick(&mut self) -> SessionState {
        let outcomes = self.reader.poll();

        let mut saw_data = false;
        for (kind, outcome) in &outcomes {
            if let ReceiveOutcome::Payload(bytes) = outcome {
                saw_data = true;
                self.handle_payload(*kind, bytes);
            }
            self.liveness.observe(outcome);
        }

        let state = self.liveness.state();
        if state == SessionState::Active && !saw_data && !self.tick_pause.is_zero() {
            spin_sleep::sleep(self.tick_pause);
        }
        state
    }

    fn handle_payload(&mut self, kind: StreamKind, bytes: &[u8]) {
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!("{}: discarding non-UTF-8 payload: {}", kind, e);
                return;
            }
        };

        match kind {
            StreamKind::Ssl => match decode_ssl(text) {
                Ok(frame) => {
                    debug!("{}", frame);
                    self.energy.fold_frame(&frame);
                    paint(&mut self.display, &self.energy);
                    self.current_ssl = frame;
                }
                Err(e) => warn!("{}: discarding message: {}", kind, e),
            },
            StreamKind::Sst => match decode_sst(text) {
                Ok(frame) => {
                    debug!("{}", frame);
                    self.current_sst = frame;
                }
                Err(e) => warn!("{}: discarding message: {}", kind, e),
            },
        }
    }

    /// The energy histograms as of the last tick.
    pub fn energy(&self) -> &EnergyMap {
        &self.energy
    }

    /// The ring this session drives.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Latest localization snapshot.
    pub fn current_ssl(&self) -> &SslFrame {
        &self.current_ssl
    }

    /// Latest tracking snapshot.
    pub fn current_sst(&self) -> &SstFrame {
        &self.current_sst
    }

    /// Bound address of one stream channel, for producers that need to
    /// find an ephemeral port.
    pub fn local_addr(&self, kind: StreamKind) -> Option<std::net::SocketAddr> {
        self.reader.local_addr(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{LedColor, VOICE_ANGLES};
    use std::io::Write;
    use std::net::TcpStream;
    use std::thread;

    struct CaptureRing {
        paints: usize,
        last: Vec<LedColor>,
    }

    impl CaptureRing {
        fn new() -> Self {
            Self {
                paints: 0,
                last: Vec::new(),
            }
        }
    }

    impl RingDisplay for CaptureRing {
        fn angles(&self) -> &[f64] {
            &VOICE_ANGLES
        }
        fn render(&mut self, colors: &[LedColor]) {
            self.paints += 1;
            self.last = colors.to_vec();
        }
    }

    #[test]
    fn test_end_to_end_frame_ingestion() {
        let reader = StreamReader::bind(Some(0), Some(0)).unwrap();
        let ssl_addr = reader.local_addr(StreamKind::Ssl).unwrap();
        let sst_addr = reader.local_addr(StreamKind::Sst).unwrap();

        let producers = thread::spawn(move || {
            let mut ssl = TcpStream::connect(ssl_addr).unwrap();
            let mut sst = TcpStream::connect(sst_addr).unwrap();
            ssl.write_all(br#"{"timeStamp":100,"src":[{"x":1,"y":0,"z":0,"E":1.0}]}"#)
                .unwrap();
            sst.write_all(
                br#"{"timeStamp":99,"src":[{"id":7,"tag":"dynamic","x":0,"y":1,"z":0,"activity":0.8}]}"#,
            )
            .unwrap();
            // Give the session time to drain both messages, then hang up
            // so the loop terminates.
            thread::sleep(Duration::from_millis(100));
        });

        let mut session = Session::new(reader, CaptureRing::new())
            .with_tick_pause(Duration::from_millis(1));
        session.run().unwrap();
        producers.join().unwrap();

        assert_eq!(session.current_ssl().timestamp, 100);
        assert_eq!(session.current_ssl().sources.len(), 1);
        assert_eq!(session.current_sst().sources[0].id, 7);
        assert_eq!(session.current_sst().sources[0].tag, "dynamic");

        // x=1, y=0, z=0, E=1 charges azimuth bucket 0 by exactly 20.
        assert_eq!(session.energy().azimuth_levels()[0], 20);
        assert!(session.display().paints >= 1);
    }

    #[test]
    fn test_malformed_payloads_change_nothing() {
        let reader = StreamReader::bind(Some(0), Some(0)).unwrap();
        let ssl_addr = reader.local_addr(StreamKind::Ssl).unwrap();
        let sst_addr = reader.local_addr(StreamKind::Sst).unwrap();

        let producers = thread::spawn(move || {
            let mut ssl = TcpStream::connect(ssl_addr).unwrap();
            let mut sst = TcpStream::connect(sst_addr).unwrap();
            ssl.write_all(b"not json").unwrap();
            sst.write_all(b"\"also\" not an object").unwrap();
            thread::sleep(Duration::from_millis(100));
        });

        let mut session = Session::new(reader, CaptureRing::new())
            .with_tick_pause(Duration::from_millis(1));
        session.run().unwrap();
        producers.join().unwrap();

        assert!(session.energy().azimuth_levels().iter().all(|&v| v == 0));
        assert!(session.energy().elevation_levels().iter().all(|&v| v == 0));
        assert_eq!(*session.current_ssl(), SslFrame::default());
        assert_eq!(*session.current_sst(), SstFrame::default());
        assert_eq!(session.display().paints, 0);
    }

    #[test]
    fn test_quiet_producers_time_out() {
        let reader = StreamReader::bind(Some(0), Some(0)).unwrap();
        let ssl_addr = reader.local_addr(StreamKind::Ssl).unwrap();
        let sst_addr = reader.local_addr(StreamKind::Sst).unwrap();

        // Producers connect, never write, and never hang up: the only way
        // out is the empty-receive budget.
        let _ssl = TcpStream::connect(ssl_addr).unwrap();
        let _sst = TcpStream::connect(sst_addr).unwrap();

        let mut session =
            Session::new(reader, CaptureRing::new()).with_tick_pause(Duration::ZERO);
        session.run().unwrap();

        assert_eq!(session.display().paints, 0);
        assert!(session.energy().azimuth_levels().iter().all(|&v| v == 0));
    }
}
