//! TCP link to the simulation server.
//!
//! Every message in either direction is `[u32 big-endian length][payload]`;
//! payloads are ASCII symbolic expressions. The server drives time: all
//! agents of a team share one process and each must hand in a `(syn)` token
//! every simulation cycle, or the server stalls the whole team. Two
//! consequences shape this module:
//!
//! - **Drain to the latest frame.** The server can emit several sensor
//!   frames between agent cycles. [`ServerLink::receive`] keeps reading
//!   while bytes are pending and hands back only the freshest complete
//!   frame, so the agent never acts on stale state.
//! - **Keep siblings alive.** While one agent blocks waiting for its own
//!   frame (handshakes take several server cycles), its teammates' links
//!   must keep issuing `(syn)` and must be drained before their kernel
//!   buffers fill. [`SharedLink::receive_async`] runs that loop.
//!
//! A link is owned by exactly one agent; teammates touch it only through
//! the [`SiblingRegistry`]'s shared handles, with lock scopes kept to a
//! single socket operation so the keep-alive path cannot deadlock.

use std::io::{IoSlice, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, trace};

use crate::{AgentError, Result};


/// The synchronization token every agent owes the server each cycle.
pub const SYN: &str = "(syn)";

/// Scene description loaded by the handshake; the trailing index selects the
/// heterogeneous robot body type.
const SCENE_RSG: &str = "rsg/agent/nao/nao_hetero.rsg";

/// Receive timeout: a blocked `recv` never waits longer than this.
const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// Pause between connect attempts while the server is still starting.
const CONNECT_RETRY: Duration = Duration::from_millis(500);

/// Yield between keep-alive iterations and send backoffs.
const YIELD: Duration = Duration::from_millis(1);

/// Initial receive buffer size; vision frames fit comfortably.
const READ_BUF_SIZE: usize = 65_536;

/// Robot body type index derived from the uniform number.
///
/// The goalkeeper and each field line get the heterogeneous Nao model the
/// team setup expects.
pub fn body_type_for(unum: u8) -> u8 {
    match unum {
        0..=1 => 0,
        2..=4 => 1,
        5 => 2,
        6..=8 => 3,
        _ => 4,
    }
}

/// Framed TCP client for one agent.
///
/// Created once per agent; dropped at shutdown with a graceful close
/// (write-side FIN, drain, close) so the server never logs a reset.
pub struct ServerLink {
    stream: TcpStream,
    read_buf: Vec<u8>,
    /// Length of the most recent complete frame in `read_buf`.
    frame_len: usize,
    /// Effector fragments committed since the last send.
    outbox: String,
}

impl ServerLink {
    /// Connect to the server's agent endpoint.
    ///
    /// Retries every 500 ms while the server refuses connections (it may
    /// start after the agents do). Any other failure is fatal: an agent
    /// without its link is useless, and there is no reconnection path.
    pub fn connect(addr: &str) -> Result<Self> {
        let stream = loop {
            match TcpStream::connect(addr) {
                Ok(stream) => break stream,
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::TimedOut
                    ) =>
                {
                    trace!("server at {addr} not accepting yet: {e}");
                    std::thread::sleep(CONNECT_RETRY);
                }
                Err(e) => {
                    return Err(AgentError::connection_failed_with_source(
                        format!("connect to {addr}"),
                        Box::new(e),
                    ));
                }
            }
        };

        // Small effector packets must leave immediately; a delayed (syn)
        // stalls the whole team.
        stream
            .set_nodelay(true)
            .map_err(|e| AgentError::io_error("enabling TCP_NODELAY", e))?;
        stream
            .set_read_timeout(Some(RECV_TIMEOUT))
            .map_err(|e| AgentError::io_error("setting receive timeout", e))?;

        debug!("connected to simulation server at {addr}");
        Ok(Self {
            stream,
            read_buf: vec![0; READ_BUF_SIZE],
            frame_len: 0,
            outbox: String::new(),
        })
    }

    /// Whether bytes (or an EOF) are pending, polled with zero timeout.
    pub fn is_readable(&self) -> bool {
        if self.stream.set_nonblocking(true).is_err() {
            return false;
        }
        let mut probe = [0u8; 1];
        let pending = self.stream.peek(&mut probe);
        let _ = self.stream.set_nonblocking(false);
        // Ok(0) is a pending EOF, which a reader must also consume.
        pending.is_ok()
    }

    /// Read frames until the link goes quiet, returning the latest one.
    ///
    /// The returned view borrows the internal buffer and is valid until the
    /// next `receive` on this link. Empty on timeout, EOF, or error; after
    /// startup the agent loop treats an empty frame as the shutdown signal.
    pub fn receive(&mut self) -> &[u8] {
        self.frame_len = 0;

        loop {
            let mut header = [0u8; 4];
            if !recv_all(&mut self.stream, &mut header) {
                break;
            }
            let msg_len = u32::from_be_bytes(header) as usize;

            if self.read_buf.len() < msg_len {
                self.read_buf.resize(msg_len, 0);
            }
            if !recv_all(&mut self.stream, &mut self.read_buf[..msg_len]) {
                break;
            }
            self.frame_len = msg_len;

            // Latest-frame policy: stop as soon as nothing else is pending.
            if !self.is_readable() {
                break;
            }
        }

        &self.read_buf[..self.frame_len]
    }

    /// Queue an effector fragment for the next [`ServerLink::send`].
    pub fn commit(&mut self, fragment: &str) {
        self.outbox.push_str(fragment);
    }

    /// Flush committed fragments as one framed message, appending the
    /// implicit `(syn)` token.
    ///
    /// If the server has bytes pending for us, reading takes priority: the
    /// send is skipped this cycle. The queue is cleared either way so it
    /// cannot grow without bound. Returns whether a message went out.
    pub fn send(&mut self) -> Result<bool> {
        if self.is_readable() {
            self.outbox.clear();
            return Ok(false);
        }

        self.outbox.push_str(SYN);
        let message = std::mem::take(&mut self.outbox);
        self.send_immediate(&message)?;
        Ok(true)
    }

    /// Frame and transmit one message immediately, bypassing the queue.
    ///
    /// Header and body go out through one scatter/gather write; partial
    /// writes resubmit only the remainder. `EINTR` retries at once,
    /// `EAGAIN` yields a millisecond first; anything else is fatal for this
    /// call.
    pub fn send_immediate(&mut self, msg: &str) -> Result<()> {
        if msg.is_empty() {
            return Ok(());
        }

        let header = (msg.len() as u32).to_be_bytes();
        let body = msg.as_bytes();
        let total = header.len() + body.len();
        let mut sent = 0;

        while sent < total {
            let written = if sent < header.len() {
                let parts = [IoSlice::new(&header[sent..]), IoSlice::new(body)];
                self.stream.write_vectored(&parts)
            } else {
                let parts = [IoSlice::new(&body[sent - header.len()..])];
                self.stream.write_vectored(&parts)
            };

            match written {
                Ok(0) => {
                    return Err(AgentError::io_error(
                        "framed send",
                        std::io::Error::new(
                            std::io::ErrorKind::WriteZero,
                            "server stopped accepting bytes",
                        ),
                    ));
                }
                Ok(n) => sent += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) =>
                {
                    std::thread::sleep(YIELD);
                }
                Err(e) => return Err(AgentError::io_error("framed send", e)),
            }
        }
        Ok(())
    }
}

impl Drop for ServerLink {
    /// Graceful close, in order: half-close for writing (FIN), switch to
    /// non-blocking, one best-effort drain of whatever the server buffered,
    /// then close. Skipping the drain makes the OS answer the server's
    /// queued bytes with an RST, which lands in the server's logs.
    fn drop(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Write);
        if self.stream.set_nonblocking(true).is_ok() {
            let mut residue = [0u8; 4096];
            let _ = self.stream.read(&mut residue);
        }
    }
}

/// Read exactly `buf.len()` bytes. False on EOF, timeout, or error; `EINTR`
/// is retried.
fn recv_all(stream: &mut TcpStream, buf: &mut [u8]) -> bool {
    let mut total = 0;
    while total < buf.len() {
        match stream.read(&mut buf[total..]) {
            Ok(0) => return false,
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                return false;
            }
            Err(e) => {
                trace!("recv failed: {e}");
                return false;
            }
        }
    }
    true
}

/// A link handle that can be shared with teammates for keep-alive duty.
///
/// The owning agent and at most one keep-alive peer touch a link at a time;
/// every operation takes the lock for a single socket call, so lock scopes
/// never nest across links.
#[derive(Clone)]
pub struct SharedLink(Arc<Mutex<ServerLink>>);

impl SharedLink {
    /// Wrap a freshly connected link.
    pub fn new(link: ServerLink) -> Self {
        Self(Arc::new(Mutex::new(link)))
    }

    /// Lock the underlying link.
    pub fn lock(&self) -> MutexGuard<'_, ServerLink> {
        self.0.lock().expect("server link mutex poisoned")
    }

    /// Block until this link has produced a frame, keeping `siblings` alive
    /// meanwhile.
    ///
    /// While waiting, every sibling gets a `(syn)` each iteration and is
    /// drained if it has pending input, so the server keeps stepping the
    /// team and no sibling's kernel buffer fills up. The loop yields ~1 ms
    /// per iteration and exits once our own receive has completed.
    pub fn receive_async(&self, siblings: &[SharedLink]) {
        if siblings.is_empty() {
            self.lock().receive();
            return;
        }

        loop {
            {
                let mut own = self.lock();
                if own.is_readable() {
                    own.receive();
                    return;
                }
            }

            for sibling in siblings {
                let mut link = sibling.lock();
                if let Err(e) = link.send_immediate(SYN) {
                    debug!("keep-alive syn failed: {e}");
                }
                if link.is_readable() {
                    link.receive();
                }
            }

            std::thread::sleep(YIELD);
        }
    }

    /// Run the join handshake for this agent.
    ///
    /// 1. `(scene ...)` selects the robot body for `unum`, then wait for the
    ///    server's first reply while keeping siblings alive.
    /// 2. `(init (unum U) (teamname NAME))` claims the uniform number.
    /// 3. Three sync rounds issue `(syn)` on this link and every sibling's,
    ///    draining whoever has input, until the whole team shares one
    ///    simulation tick.
    pub fn initialize_agent(
        &self,
        unum: u8,
        team_name: &str,
        siblings: &[SharedLink],
    ) -> Result<()> {
        let scene = format!("(scene {} {})", SCENE_RSG, body_type_for(unum));
        self.lock().send_immediate(&scene)?;
        self.receive_async(siblings);

        let init = format!("(init (unum {unum}) (teamname {team_name}))");
        self.lock().send_immediate(&init)?;
        self.receive_async(siblings);

        for _ in 0..3 {
            self.lock().send_immediate(SYN)?;

            for sibling in siblings {
                let _ = sibling.lock().send_immediate(SYN);
            }
            for sibling in siblings {
                let mut link = sibling.lock();
                if link.is_readable() {
                    link.receive();
                }
            }

            let mut own = self.lock();
            if own.is_readable() {
                own.receive();
            }
        }

        debug!("agent {unum} handshake complete");
        Ok(())
    }
}

/// Shared list of every teammate link in the process.
///
/// Each agent registers its link after its handshake and hands the registry
/// to the next agent being constructed, replacing the original design's
/// implicit static list: construction order no longer matters for
/// correctness, only for how many peers each handshake keeps alive.
#[derive(Default)]
pub struct SiblingRegistry {
    links: Mutex<Vec<SharedLink>>,
}

impl SiblingRegistry {
    /// Empty registry for a fresh team process.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a link so later agents keep it alive during their
    /// handshakes.
    pub fn register(&self, link: SharedLink) {
        self.links.lock().expect("registry mutex poisoned").push(link);
    }

    /// Snapshot of the currently registered links.
    pub fn snapshot(&self) -> Vec<SharedLink> {
        self.links.lock().expect("registry mutex poisoned").clone()
    }

    /// Number of registered links.
    pub fn len(&self) -> usize {
        self.links.lock().expect("registry mutex poisoned").len()
    }

    /// Whether no link has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
