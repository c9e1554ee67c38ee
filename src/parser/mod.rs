//! Single-pass decoder for server sensor messages.
//!
//! A sensor frame is a flat sequence of parenthesized groups whose first
//! token names a sensor:
//!
//! ```text
//! (time (now 47.82))(GS (sl 0) (sr 1) (t 12.46) (pm PlayOn))
//! (GYR (n torso) (rt 0.01 0.07 0.46))(ACC (n torso) (a 0.00 -0.05 8.83))
//! (HJ (n laj3) (ax -1.02))(FRP (n lf) (c -0.01 -0.01 -0.02) (f 0.00 0.00 22.67))
//! (See (G2R (pol 17.55 -3.33 4.31)) (B (pol 8.51 -0.21 -0.17)) ...)
//! ```
//!
//! The decoder makes one pass with a borrowed [`Cursor`], dispatching on the
//! first byte of each top-level tag and writing results straight into a
//! [`WorldState`]. Nothing is copied out of the frame except parsed
//! primitives. Known tags have fixed intra-group headers, which the
//! subparsers step over with exact byte counts; unknown tags are reported to
//! the match log and skipped as a balanced group. Malformed input is never
//! fatal: the parser gives up on the current group and resynchronizes on
//! the next `(`.

mod cursor;

pub use cursor::Cursor;

use crate::logger::AsyncLogger;
use crate::world::{FootContact, Landmark, SeenPlayer, WorldState};

/// Decode one sensor frame into `world`.
///
/// The frame is borrowed from the link's receive buffer and is only read;
/// everything stored in `world` is an owned primitive. Unknown or damaged
/// groups produce a warning in the match log (tagged with the agent's
/// uniform number and a context window) and are skipped.
pub fn parse_frame(frame: &[u8], world: &mut WorldState, logger: &AsyncLogger) {
    let mut parser = Parser { cursor: Cursor::new(frame), world, logger };
    parser.run();
}

struct Parser<'a> {
    cursor: Cursor<'a>,
    world: &'a mut WorldState,
    logger: &'a AsyncLogger,
}

impl Parser<'_> {
    fn run(&mut self) {
        loop {
            if !self.cursor.skip_until(b'(') {
                return;
            }
            let tag = self.cursor.take_word();

            match tag.first() {
                // `time`
                Some(b't') => self.parse_time(),
                // `GS` or `GYR`
                Some(b'G') => match tag.get(1) {
                    Some(b'S') => self.parse_gamestate(),
                    Some(b'Y') => self.parse_gyroscope(),
                    _ => self.skip_unknown("top level", tag),
                },
                // `ACC`
                Some(b'A') => match tag.get(1) {
                    Some(b'C') => self.parse_accelerometer(),
                    _ => self.skip_unknown("top level", tag),
                },
                // `See`
                Some(b'S') => match tag.get(1) {
                    Some(b'e') => self.parse_vision(),
                    _ => self.skip_unknown("top level", tag),
                },
                // `HJ`
                Some(b'H') => self.parse_hingejoint(),
                // `FRP`
                Some(b'F') => self.parse_force_resistance(),
                Some(_) => self.skip_unknown("top level", tag),
                None => return,
            }
        }
    }

    /// `(time (now V))`: fixed header, one real.
    fn parse_time(&mut self) {
        // Step over "(now ".
        if !self.cursor.advance(5) {
            return;
        }
        let mut now = self.world.time_server;
        if self.cursor.take_number(&mut now) {
            self.world.time_server = now;
        }
        self.cursor.advance(1);
    }

    /// `(GS (sl S) (sr S) (t T) (pm MODE) ...)`: subtags in any order.
    ///
    /// The server guarantees a `team` subtag arrives before the first `pm`,
    /// so play-mode lookups always have a resolved perspective.
    fn parse_gamestate(&mut self) {
        loop {
            let tag = self.cursor.take_word();
            match tag.first() {
                // `sl` (our score... as the left team) / `sr`.
                Some(b's') => {
                    let mut score = 0u8;
                    if self.cursor.take_number(&mut score) {
                        if tag.get(1) == Some(&b'l') {
                            self.world.goals_scored = score;
                        } else {
                            self.world.goals_conceded = score;
                        }
                    }
                }
                // `pm`: resolve through the play-mode table.
                Some(b'p') => {
                    let event = self.cursor.take_word();
                    if let Ok(event) = std::str::from_utf8(event) {
                        self.world.apply_play_mode(event);
                    }
                }
                // `t` (match clock) or `team`.
                Some(b't') => {
                    if tag.len() == 1 {
                        let mut t = self.world.time_match;
                        if self.cursor.take_number(&mut t) {
                            self.world.time_match = t;
                        }
                    } else if tag.get(1) == Some(&b'e') {
                        let side = self.cursor.take_word();
                        self.world.is_left = side.first() == Some(&b'l');
                    }
                }
                // `u`: our uniform number.
                Some(b'u') => {
                    let mut unum = self.world.unum;
                    if self.cursor.take_number(&mut unum) {
                        self.world.unum = unum;
                    }
                }
                Some(_) => self.warn("GS", tag),
                None => return,
            }

            if self.cursor.peek() == Some(b')') {
                return;
            }
        }
    }

    /// `(GYR (n torso) (rt X Y Z))`.
    fn parse_gyroscope(&mut self) {
        // Step over "(n torso) (rt ".
        if !self.cursor.advance(14) {
            return;
        }
        if let Some(rates) = self.read_vec3() {
            self.world.imu.gyro = rates;
        }
    }

    /// `(ACC (n torso) (a X Y Z))`: three components, like the gyroscope.
    fn parse_accelerometer(&mut self) {
        // Step over "(n torso) (a ".
        if !self.cursor.advance(13) {
            return;
        }
        if let Some(accel) = self.read_vec3() {
            self.world.imu.accel = accel;
        }
    }

    /// `(HJ (n NAME) (ax ANGLE))`.
    ///
    /// The angle is decoded for validation but not stored: joint indexing
    /// belongs to the body model, not the world record.
    fn parse_hingejoint(&mut self) {
        if !self.cursor.advance(3) {
            return;
        }
        let _name = self.cursor.take_word();
        if !self.cursor.advance(5) {
            return;
        }
        let mut angle = 0.0f32;
        self.cursor.take_number(&mut angle);
    }

    /// `(FRP (n lf|rf) (c X Y Z) (f X Y Z))`: foot contact point + force.
    fn parse_force_resistance(&mut self) {
        if !self.cursor.advance(3) {
            return;
        }
        let foot = self.cursor.take_word();
        let is_left_foot = match foot {
            b"lf" => true,
            b"rf" => false,
            _ => {
                self.warn("FRP", foot);
                return;
            }
        };

        if !self.cursor.advance(4) {
            return;
        }
        let Some(point) = self.read_vec3() else { return };
        if !self.cursor.advance(4) {
            return;
        }
        let Some(force) = self.read_vec3() else { return };

        let contact = Some(FootContact { point, force });
        if is_left_foot {
            self.world.foot_contacts.left = contact;
        } else {
            self.world.foot_contacts.right = contact;
        }
    }

    /// `(See ...)`: nested observations covering players, ball, landmarks,
    /// and lines.
    ///
    /// The enclosing group ends where two consecutive `)` meet the cursor.
    fn parse_vision(&mut self) {
        self.world.vision.begin_cycle();

        loop {
            let tag = self.cursor.take_word();
            match tag.first() {
                Some(b'P') => self.parse_seen_player(),
                // Ball and fixed landmarks carry one spherical 3-vector each.
                Some(b'B') if tag.len() == 1 => {
                    if !self.cursor.advance(5) {
                        return;
                    }
                    self.world.vision.ball = self.read_vec3();
                }
                Some(b'G') | Some(b'F') => {
                    if !self.cursor.advance(5) {
                        return;
                    }
                    let Some(pos) = self.read_vec3() else { return };
                    if let Some(landmark) =
                        std::str::from_utf8(tag).ok().and_then(Landmark::from_tag)
                    {
                        self.world.vision.set_landmark(landmark, pos);
                    }
                }
                Some(b'L') => {
                    if !self.cursor.advance(5) {
                        return;
                    }
                    let Some(start) = self.read_vec3() else { return };
                    if !self.cursor.advance(6) {
                        return;
                    }
                    let Some(end) = self.read_vec3() else { return };
                    self.world.vision.lines.push(crate::world::SeenLine { start, end });
                }
                Some(_) => self.warn("See", tag),
                None => return,
            }

            if self.cursor.peek() == Some(b')') {
                self.cursor.advance(1);
                if self.cursor.peek() == Some(b')') {
                    return;
                }
            }
        }
    }

    /// `(P (team T) (id N) (head (pol ...)) (rlowerarm (pol ...)) ...)`.
    fn parse_seen_player(&mut self) {
        let mut player = SeenPlayer::default();

        loop {
            let tag = self.cursor.take_word();
            match tag.first() {
                Some(b't') => {
                    let team = self.cursor.take_word();
                    player.teammate = team == self.world.team_name.as_bytes();
                }
                Some(b'i') => {
                    let mut unum = 0u8;
                    if self.cursor.take_number(&mut unum) {
                        player.unum = unum;
                    }
                }
                // Body parts: head, r/l lower arm, r/l foot. Each is a
                // spherical 3-vector behind a "(pol " header.
                Some(b'h') | Some(b'r') | Some(b'l') => {
                    if !self.cursor.advance(5) {
                        return;
                    }
                    let Some(pos) = self.read_vec3() else { return };
                    match (tag.first(), tag.get(1)) {
                        (Some(b'h'), _) => player.head = Some(pos),
                        (Some(b'r'), Some(b'l')) => player.right_arm = Some(pos),
                        (Some(b'r'), Some(b'f')) => player.right_foot = Some(pos),
                        (Some(b'l'), Some(b'l')) => player.left_arm = Some(pos),
                        (Some(b'l'), Some(b'f')) => player.left_foot = Some(pos),
                        _ => self.warn("See:P", tag),
                    }
                }
                Some(_) => self.warn("See:P", tag),
                None => return,
            }

            if self.cursor.peek() == Some(b')') {
                self.cursor.advance(1);
                if self.cursor.peek() == Some(b')') {
                    break;
                }
            }
        }

        self.world.vision.players.push(player);
    }

    /// Three consecutive reals. `None` (with a warning) if any fails.
    fn read_vec3(&mut self) -> Option<[f32; 3]> {
        let mut out = [0.0f32; 3];
        for slot in &mut out {
            if !self.cursor.take_number(slot) {
                self.warn_context("malformed 3-vector");
                return None;
            }
        }
        Some(out)
    }

    fn warn(&self, where_: &str, tag: &[u8]) {
        self.logger.warn(format!(
            "[{}] unknown tag '{}' in {}; context: {}",
            self.world.unum,
            String::from_utf8_lossy(tag),
            where_,
            self.cursor.context(),
        ));
    }

    fn warn_context(&self, what: &str) {
        self.logger.warn(format!(
            "[{}] {}; context: {}",
            self.world.unum,
            what,
            self.cursor.context(),
        ));
    }

    fn skip_unknown(&mut self, where_: &str, tag: &[u8]) {
        self.warn(where_, tag);
        self.cursor.skip_unknown_group();
    }
}
