//! UDP transport for the RoboViz debug visualizer.
//!
//! Drawing commands accumulate in a reused byte buffer and go out as a
//! single datagram on [`DrawTransport::flush`]. The wire protocol is a
//! hybrid of binary command bytes and fixed-width ASCII floats: every float
//! is rendered with six fractional digits and exactly the first six bytes of
//! that rendering are transmitted, no terminator. The width rule is lossy
//! (`100.000000` goes out as `100.00`) but it is what the visualizer's
//! parser expects; do not widen it.
//!
//! Commands target a named drawing layer ("set"); [`DrawTransport::
//! swap_buffers`] makes a layer's accumulated shapes visible and starts an
//! empty one.

use std::fmt::Write as _;
use std::net::UdpSocket;
use std::sync::Mutex;

use tracing::{debug, warn};

/// Largest payload we will hand to a single `send_to`.
const MAX_DATAGRAM: usize = 65_535;

/// Thread-safe datagram builder for the visualizer protocol.
///
/// Constructed once per process and shared by reference; all operations take
/// `&self` and serialize on an internal mutex.
pub struct DrawTransport {
    inner: Mutex<DrawState>,
}

struct DrawState {
    /// `None` when socket creation failed; the transport is then inert.
    socket: Option<UdpSocket>,
    target: String,
    buf: Vec<u8>,
    /// Scratch for float rendering, reused to keep appends allocation-free.
    scratch: String,
}

impl DrawTransport {
    /// Create a transport targeting `addr` (normally `127.0.0.1:32769`).
    ///
    /// Socket creation failure is logged once and leaves the transport
    /// inert: draw calls still accumulate, `flush` reports `false`.
    pub fn new(addr: impl Into<String>) -> Self {
        let socket = match UdpSocket::bind("0.0.0.0:0") {
            Ok(socket) => Some(socket),
            Err(e) => {
                warn!("visualizer socket unavailable, draw commands will be discarded: {e}");
                None
            }
        };
        Self {
            inner: Mutex::new(DrawState {
                socket,
                target: addr.into(),
                buf: Vec::with_capacity(4096),
                scratch: String::with_capacity(16),
            }),
        }
    }

    /// Send the accumulated buffer as one datagram and clear it.
    ///
    /// The buffer is cleared whether or not the send succeeds; a lost
    /// datagram only costs one visualizer frame. Returns whether at least
    /// one byte went out.
    pub fn flush(&self) -> bool {
        let mut state = self.lock();
        if state.buf.is_empty() {
            return false;
        }
        if state.buf.len() > MAX_DATAGRAM {
            debug!("draw buffer over datagram limit ({} bytes), dropping", state.buf.len());
        }

        let sent = match (&state.socket, state.buf.len() > MAX_DATAGRAM) {
            (Some(socket), false) => match socket.send_to(&state.buf, &state.target) {
                Ok(n) => n > 0,
                Err(e) => {
                    debug!("visualizer send failed: {e}");
                    false
                }
            },
            _ => false,
        };

        state.buf.clear();
        sent
    }

    /// Discard the accumulated buffer without transmitting.
    pub fn clear(&self) {
        self.lock().buf.clear();
    }

    /// Make layer `set` visible and start accumulating a fresh one.
    pub fn swap_buffers(&self, set: &str) {
        let mut state = self.lock();
        state.put_byte(0);
        state.put_byte(0);
        state.put_string(set);
    }

    /// Queue a 3D line segment.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_line(
        &self,
        x1: f32,
        y1: f32,
        z1: f32,
        x2: f32,
        y2: f32,
        z2: f32,
        thickness: f32,
        r: f32,
        g: f32,
        b: f32,
        set: &str,
    ) {
        let mut state = self.lock();
        state.put_byte(1);
        state.put_byte(1);
        for v in [x1, y1, z1, x2, y2, z2, thickness] {
            state.put_float(v);
        }
        state.put_color(r, g, b);
        state.put_string(set);
    }

    /// Queue a circle on the field plane.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_circle(
        &self,
        x: f32,
        y: f32,
        radius: f32,
        thickness: f32,
        r: f32,
        g: f32,
        b: f32,
        set: &str,
    ) {
        let mut state = self.lock();
        state.put_byte(1);
        state.put_byte(0);
        for v in [x, y, radius, thickness] {
            state.put_float(v);
        }
        state.put_color(r, g, b);
        state.put_string(set);
    }

    /// Queue a point marker.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_point(&self, x: f32, y: f32, z: f32, size: f32, r: f32, g: f32, b: f32, set: &str) {
        let mut state = self.lock();
        state.put_byte(1);
        state.put_byte(2);
        for v in [x, y, z, size] {
            state.put_float(v);
        }
        state.put_color(r, g, b);
        state.put_string(set);
    }

    /// Queue a sphere.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_sphere(
        &self,
        x: f32,
        y: f32,
        z: f32,
        radius: f32,
        r: f32,
        g: f32,
        b: f32,
        set: &str,
    ) {
        let mut state = self.lock();
        state.put_byte(1);
        state.put_byte(3);
        for v in [x, y, z, radius] {
            state.put_float(v);
        }
        state.put_color(r, g, b);
        state.put_string(set);
    }

    /// Queue a filled polygon. `verts` holds x/y/z triples; a trailing
    /// partial triple is ignored by the vertex count, matching the wire
    /// format's `len / 3` rule.
    pub fn draw_polygon(&self, verts: &[f32], r: f32, g: f32, b: f32, a: f32, set: &str) {
        let mut state = self.lock();
        state.put_byte(1);
        state.put_byte(4);
        state.put_byte((verts.len() / 3) as u8);
        state.put_color_alpha(r, g, b, a);
        for &v in verts {
            state.put_float(v);
        }
        state.put_string(set);
    }

    /// Queue a floating text annotation.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_annotation(
        &self,
        text: &str,
        x: f32,
        y: f32,
        z: f32,
        r: f32,
        g: f32,
        b: f32,
        set: &str,
    ) {
        let mut state = self.lock();
        state.put_byte(2);
        state.put_byte(0);
        for v in [x, y, z] {
            state.put_float(v);
        }
        state.put_color(r, g, b);
        state.put_string(text);
        state.put_string(set);
    }

    /// Current buffer contents, for wire-format assertions in tests.
    #[cfg(test)]
    pub fn buffer_snapshot(&self) -> Vec<u8> {
        self.lock().buf.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DrawState> {
        self.inner.lock().expect("draw transport mutex poisoned")
    }
}

impl DrawState {
    fn put_byte(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Fixed-width ASCII float: the first six bytes of the `%f`-style
    /// rendering. Non-finite values render shorter than six bytes and are
    /// padded; they never occur in practice.
    fn put_float(&mut self, value: f32) {
        self.scratch.clear();
        let _ = write!(self.scratch, "{value:.6}");
        let bytes = self.scratch.as_bytes();
        let take = bytes.len().min(6);
        self.buf.extend_from_slice(&bytes[..take]);
        for _ in take..6 {
            self.buf.push(b' ');
        }
    }

    fn put_color(&mut self, r: f32, g: f32, b: f32) {
        for channel in [r, g, b] {
            self.buf.push((channel.clamp(0.0, 1.0) * 255.0).round() as u8);
        }
    }

    fn put_color_alpha(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.put_color(r, g, b);
        self.buf.push((a.clamp(0.0, 1.0) * 255.0).round() as u8);
    }

    fn put_string(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
    }
}
