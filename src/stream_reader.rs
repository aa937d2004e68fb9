//! Non-blocking TCP reception for the two wire streams.
//!
//! Each stream kind gets one listening endpoint and at most one accepted
//! producer connection. Reception is strictly best-effort: one
//! non-blocking read per channel per tick, classified as payload, empty,
//! or closed. There is no reassembly of messages split across reads and
//! no splitting of messages coalesced into one read: the producer is
//! expected to deliver one JSON object per read, and the decoder drops
//! whatever violates that.

use crate::frames::StreamKind;
use log::{debug, info, warn};
use std::io::{self, Read};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

/// Receive buffer capacity per channel.
pub const RECV_BYTES: usize = 10240;

/// Pause between acceptance-phase retry rounds.
pub const ACCEPT_RETRY: Duration = Duration::from_millis(500);

/// What one best-effort receive produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Bytes arrived; at most one wire message.
    Payload(Vec<u8>),
    /// Nothing available this tick.
    Empty,
    /// The producer hung up or the connection failed.
    Closed,
}

/// One logical stream endpoint: listener, accepted connection, receive
/// buffer.
#[derive(Debug)]
pub struct StreamChannel {
    kind: StreamKind,
    listener: Option<TcpListener>,
    conn: Option<TcpStream>,
    buf: Box<[u8; RECV_BYTES]>,
}

impl StreamChannel {
    /// Bind a listening socket on the wildcard address, or create a
    /// disabled channel when no port is configured. Port 0 binds an
    /// ephemeral port.
    fn bind(kind: StreamKind, port: Option<u16>) -> io::Result<Self> {
        let listener = match port {
            Some(port) => {
                let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))?;
                listener.set_nonblocking(true)?;
                info!("{}: listening on {}", kind, listener.local_addr()?);
                Some(listener)
            }
            None => None,
        };
        Ok(Self {
            kind,
            listener,
            conn: None,
            buf: Box::new([0; RECV_BYTES]),
        })
    }

    /// The bound address, when this channel is enabled.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// One non-blocking accept attempt. Returns whether this channel
    /// needs no further accepting (connected, or disabled). `WouldBlock`
    /// means the producer has not shown up yet; any other accept error is
    /// fatal and propagates.
    fn try_accept(&mut self) -> io::Result<bool> {
        let Some(listener) = &self.listener else {
            return Ok(true);
        };
        if self.conn.is_some() {
            return Ok(true);
        }
        match listener.accept() {
            Ok((conn, peer)) => {
                conn.set_nonblocking(true)?;
                info!("{}: producer connected from {}", self.kind, peer);
                self.conn = Some(conn);
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                debug!("{}: no producer yet, retrying", self.kind);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// One best-effort receive into the cleared buffer.
    fn receive(&mut self) -> ReceiveOutcome {
        let Some(conn) = &mut self.conn else {
            return ReceiveOutcome::Empty;
        };
        self.buf.fill(0);
        match conn.read(&mut self.buf[..]) {
            Ok(0) => {
                info!("{}: producer closed the connection", self.kind);
                ReceiveOutcome::Closed
            }
            Ok(n) => {
                debug!("{}: received {} bytes", self.kind, n);
                ReceiveOutcome::Payload(self.buf[..n].to_vec())
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => ReceiveOutcome::Empty,
            Err(e) => {
                warn!("{}: receive failed: {}", self.kind, e);
                ReceiveOutcome::Closed
            }
        }
    }
}

/// Owns both stream channels and polls them in the fixed SSL-then-SST
/// order.
#[derive(Debug)]
pub struct StreamReader {
    channels: [StreamChannel; 2],
}

impl StreamReader {
    /// Bind both channels. `None` disables a stream; its receive outcome
    /// is then always [`ReceiveOutcome::Empty`].
    pub fn bind(ssl_port: Option<u16>, sst_port: Option<u16>) -> io::Result<Self> {
        Ok(Self {
            channels: [
                StreamChannel::bind(StreamKind::Ssl, ssl_port)?,
                StreamChannel::bind(StreamKind::Sst, sst_port)?,
            ],
        })
    }

    /// The bound address of one channel, when enabled.
    pub fn local_addr(&self, kind: StreamKind) -> Option<SocketAddr> {
        self.channels
            .iter()
            .find(|c| c.kind == kind)
            .and_then(|c| c.local_addr())
    }

    /// Acceptance phase: retry non-blocking accepts until every enabled
    /// channel has its producer, pausing [`ACCEPT_RETRY`] between rounds.
    /// Polls indefinitely; a fatal accept error propagates.
    pub fn accept_all(&mut self) -> io::Result<()> {
        loop {
            let mut all_connected = true;
            for channel in &mut self.channels {
                if !channel.try_accept()? {
                    all_connected = false;
                }
            }
            if all_connected {
                info!("all stream producers connected");
                return Ok(());
            }
            spin_sleep::sleep(ACCEPT_RETRY);
        }
    }

    /// One tick: one best-effort receive per channel, SSL first.
    pub fn poll(&mut self) -> [(StreamKind, ReceiveOutcome); 2] {
        [
            (self.channels[0].kind, self.channels[0].receive()),
            (self.channels[1].kind, self.channels[1].receive()),
        ]
    }
}
