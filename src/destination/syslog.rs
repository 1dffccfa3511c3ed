//! System log destination.
//!
//! Messages are framed as `<PRI>line\0` with the `user` facility. The
//! local socket (`/dev/log`) is tried first as a datagram socket, then as
//! a stream socket; if neither works, datagrams go over UDP to
//! `localhost:514`.

use std::io::{self, Write};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[cfg(unix)]
use std::os::unix::net::{UnixDatagram, UnixStream};

use crate::config::LogLevel;
use crate::destination::Sink;
use crate::error::DestinationError;
use crate::record::LogRecord;

/// Local syslog socket.
pub const SYSLOG_SOCKET: &str = "/dev/log";

/// Fallback UDP endpoint.
pub const SYSLOG_FALLBACK: (&str, u16) = ("localhost", 514);

/// `user` facility.
pub const FACILITY_USER: u8 = 1;

#[derive(Debug)]
enum Transport {
    #[cfg(unix)]
    UnixDatagram { socket: UnixDatagram, path: PathBuf },
    #[cfg(unix)]
    UnixStream { stream: UnixStream, path: PathBuf },
    Udp(UdpSocket),
}

impl Transport {
    fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            Transport::UnixDatagram { socket, .. } => socket.send(payload).map(|_| ()),
            #[cfg(unix)]
            Transport::UnixStream { stream, .. } => stream.write_all(payload),
            Transport::Udp(socket) => socket.send(payload).map(|_| ()),
        }
    }

    /// Local socket path, `None` for UDP.
    fn socket_path(&self) -> Option<&Path> {
        match self {
            #[cfg(unix)]
            Transport::UnixDatagram { path, .. } | Transport::UnixStream { path, .. } => Some(path),
            Transport::Udp(_) => None,
        }
    }
}

/// Sends each record as one syslog message.
#[derive(Debug)]
pub struct SyslogSink {
    transport: Mutex<Transport>,
    facility: u8,
}

impl SyslogSink {
    /// Connect to the platform syslog, falling back to UDP.
    pub fn connect() -> Result<Self, DestinationError> {
        Self::connect_to(Path::new(SYSLOG_SOCKET), SYSLOG_FALLBACK)
    }

    /// Connect to `socket`, or to `fallback` over UDP if the socket is unusable.
    pub fn connect_to(socket: &Path, fallback: impl ToSocketAddrs) -> Result<Self, DestinationError> {
        #[cfg(unix)]
        {
            match connect_unix(socket) {
                Ok(transport) => return Ok(Self::with_transport(transport)),
                Err(e) => {
                    tracing::debug!(socket = %socket.display(), error = %e, "Syslog socket unavailable, using UDP");
                }
            }
        }
        #[cfg(not(unix))]
        let _ = socket;

        let udp = connect_udp(fallback).map_err(DestinationError::SyslogUnavailable)?;
        Ok(Self::with_transport(Transport::Udp(udp)))
    }

    fn with_transport(transport: Transport) -> Self {
        Self {
            transport: Mutex::new(transport),
            facility: FACILITY_USER,
        }
    }

    /// True when connected to the local socket rather than the UDP fallback.
    pub fn is_local(&self) -> bool {
        match self.transport.lock() {
            Ok(guard) => guard.socket_path().is_some(),
            Err(_) => false,
        }
    }
}

/// Syslog severity for a level.
pub fn severity(level: LogLevel) -> u8 {
    match level {
        LogLevel::Critical => 2,
        LogLevel::Error => 3,
        LogLevel::Warning | LogLevel::NotSet => 4,
        LogLevel::Info => 6,
        LogLevel::Debug => 7,
    }
}

/// Frame a line as `<PRI>line\0`.
pub fn encode(facility: u8, level: LogLevel, line: &str) -> Vec<u8> {
    let priority = u16::from(facility) * 8 + u16::from(severity(level));
    format!("<{priority}>{line}\0").into_bytes()
}

/// Connect to a local socket, as a datagram socket if it accepts one and
/// as a stream socket otherwise.
#[cfg(unix)]
fn connect_unix(path: &Path) -> io::Result<Transport> {
    let datagram = UnixDatagram::unbound().and_then(|socket| {
        socket.connect(path)?;
        Ok(socket)
    });
    match datagram {
        Ok(socket) => Ok(Transport::UnixDatagram {
            socket,
            path: path.to_path_buf(),
        }),
        Err(e) => {
            tracing::debug!(socket = %path.display(), error = %e, "Syslog socket is not a datagram socket, trying stream");
            Ok(Transport::UnixStream {
                stream: UnixStream::connect(path)?,
                path: path.to_path_buf(),
            })
        }
    }
}

fn connect_udp(addr: impl ToSocketAddrs) -> io::Result<UdpSocket> {
    let target = addr
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "syslog address did not resolve"))?;
    let local: SocketAddr = if target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(local)?;
    socket.connect(target)?;
    Ok(socket)
}

impl Sink for SyslogSink {
    fn write_line(&self, line: &str, record: &LogRecord) -> io::Result<()> {
        let payload = encode(self.facility, record.level, line);
        let mut transport = self
            .transport
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "syslog lock poisoned"))?;

        let sent = transport.send(&payload);
        #[cfg(unix)]
        {
            if sent.is_err() {
                if let Some(path) = transport.socket_path().map(Path::to_path_buf) {
                    // The syslog daemon may have restarted; reconnect once.
                    *transport = connect_unix(&path)?;
                    return transport.send(&payload);
                }
            }
        }
        sent
    }
}
