use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

#[cfg(unix)]
use std::os::fd::{AsRawFd, RawFd};

use tracing::{debug, info};

use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};
use crate::traits::PollRead;

/// Bound push endpoint: the producer side of the push/pull pair.
///
/// The producer binds and waits for the one viewer connection, then
/// streams frames over the accepted [`PushStream`]. One sender per
/// receiver; no acknowledgment protocol.
#[derive(Debug)]
pub struct PushListener {
    listener: TcpListener,
    endpoint: Endpoint,
}

impl PushListener {
    /// Bind and listen on the endpoint.
    pub fn bind(endpoint: &Endpoint) -> Result<Self> {
        let listener = TcpListener::bind(endpoint.authority()).map_err(|e| TransportError::Bind {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        info!(%endpoint, "listening for viewer connection");

        Ok(Self {
            listener,
            endpoint: endpoint.clone(),
        })
    }

    /// Accept the viewer connection (blocking).
    pub fn accept(&self) -> Result<PushStream> {
        let (stream, addr) = self.listener.accept().map_err(TransportError::Accept)?;
        stream.set_nodelay(true)?;
        debug!(%addr, "viewer connected");
        Ok(PushStream { inner: stream })
    }

    /// The endpoint this listener was asked to bind.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The actual bound address (resolves port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

/// Outbound frame stream: the accepted producer→viewer connection.
pub struct PushStream {
    inner: TcpStream,
}

impl PushStream {
    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Address of the connected viewer.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.peer_addr()?)
    }
}

impl Write for PushStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl std::fmt::Debug for PushStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushStream")
            .field("peer", &self.inner.peer_addr().ok())
            .finish()
    }
}

/// Connected pull endpoint: the viewer side of the push/pull pair.
///
/// The stream is switched to non-blocking mode at connect time; reads
/// return `WouldBlock` once the kernel buffer is empty. Readiness is
/// queried through [`PollRead`], and the raw descriptor is exposed so a
/// host event loop can register for readability edges.
pub struct PullSocket {
    inner: TcpStream,
    endpoint: Endpoint,
}

impl PullSocket {
    /// Connect to a bound producer (blocking) and enter non-blocking mode.
    pub fn connect(endpoint: &Endpoint) -> Result<Self> {
        let connect_err = |e| TransportError::Connect {
            endpoint: endpoint.clone(),
            source: e,
        };

        let stream = TcpStream::connect(endpoint.authority()).map_err(connect_err)?;
        stream.set_nonblocking(true).map_err(connect_err)?;

        info!(%endpoint, "connected to producer");

        Ok(Self {
            inner: stream,
            endpoint: endpoint.clone(),
        })
    }

    /// The endpoint this socket is connected to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl Read for PullSocket {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

#[cfg(unix)]
impl AsRawFd for PullSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }
}

#[cfg(unix)]
impl PollRead for PullSocket {
    fn poll_readable(&self) -> io::Result<bool> {
        poll_fd(self.inner.as_raw_fd(), 0)
    }

    fn wait_readable(&self, timeout: Option<Duration>) -> io::Result<bool> {
        poll_fd(self.inner.as_raw_fd(), timeout_millis(timeout))
    }
}

impl std::fmt::Debug for PullSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PullSocket")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(unix)]
fn timeout_millis(timeout: Option<Duration>) -> i32 {
    match timeout {
        None => -1,
        Some(d) => d.as_millis().min(i32::MAX as u128) as i32,
    }
}

/// Poll one descriptor for readability.
///
/// `POLLHUP`/`POLLERR` count as readable so the subsequent read surfaces
/// EOF or the pending socket error instead of the condition being lost.
#[cfg(unix)]
fn poll_fd(fd: RawFd, timeout_ms: i32) -> io::Result<bool> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    loop {
        // SAFETY: `pfd` is a valid pollfd for the duration of the call and
        // `fd` is an open descriptor owned by this process.
        let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        return Ok(rc > 0 && pfd.revents & (libc::POLLIN | libc::POLLHUP | libc::POLLERR) != 0);
    }
}
