//! Game-state record populated by the message parser.
//!
//! [`WorldState`] is a plain owned record: the parser borrows frame bytes,
//! but everything stored here is copied out as primitives, so nothing in the
//! world outlives the receive buffer it was decoded from. Perception buffers
//! (seen players, lines) are reused across cycles; after warm-up the parser
//! performs no allocation on the hot path.

mod play_mode;

pub use play_mode::{PlayMode, PlayModeGroup};

/// Torso inertial readings from the `GYR` and `ACC` sensor tags.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Imu {
    /// Angular velocity in deg/s, axes x/y/z.
    pub gyro: [f32; 3],
    /// Linear acceleration in m/s², axes x/y/z.
    pub accel: [f32; 3],
}

/// One foot's force-resistance sensor reading from an `FRP` tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootContact {
    /// Contact point relative to the foot center, meters.
    pub point: [f32; 3],
    /// Total force at the contact point.
    pub force: [f32; 3],
}

/// Per-foot contact readings. `None` means the foot reported no contact this
/// cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct FootContacts {
    pub left: Option<FootContact>,
    pub right: Option<FootContact>,
}

/// The eight fixed vision landmarks: four corner flags and four goalposts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Landmark {
    FlagLeftNear = 0,
    FlagLeftFar = 1,
    FlagRightNear = 2,
    FlagRightFar = 3,
    GoalLeftNear = 4,
    GoalLeftFar = 5,
    GoalRightNear = 6,
    GoalRightFar = 7,
}

impl Landmark {
    /// Map a vision tag (`F1L`, `G2R`, ...) to the landmark it names.
    pub fn from_tag(tag: &str) -> Option<Landmark> {
        Some(match tag {
            "F1L" => Landmark::FlagLeftNear,
            "F2L" => Landmark::FlagLeftFar,
            "F1R" => Landmark::FlagRightNear,
            "F2R" => Landmark::FlagRightFar,
            "G1L" => Landmark::GoalLeftNear,
            "G2L" => Landmark::GoalLeftFar,
            "G1R" => Landmark::GoalRightNear,
            "G2R" => Landmark::GoalRightFar,
            _ => return None,
        })
    }
}

/// A field line seen by the camera: two endpoints in spherical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeenLine {
    pub start: [f32; 3],
    pub end: [f32; 3],
}

/// Another robot seen by the camera.
///
/// Body-part positions are filled only for the parts the server reported
/// this cycle; all positions are spherical (distance, azimuth, elevation).
#[derive(Debug, Clone, Default)]
pub struct SeenPlayer {
    /// Whether the reported team name matches ours.
    pub teammate: bool,
    /// Uniform number, 0 until the `id` sub-entry is decoded.
    pub unum: u8,
    pub head: Option<[f32; 3]>,
    pub right_arm: Option<[f32; 3]>,
    pub left_arm: Option<[f32; 3]>,
    pub right_foot: Option<[f32; 3]>,
    pub left_foot: Option<[f32; 3]>,
}

/// Everything decoded from the latest `See` tag.
///
/// All positions are spherical coordinates relative to the camera. Contents
/// are valid for the cycle they were parsed in; [`Vision::begin_cycle`]
/// resets them while keeping buffer capacity.
#[derive(Debug, Default)]
pub struct Vision {
    pub ball: Option<[f32; 3]>,
    landmarks: [Option<[f32; 3]>; 8],
    pub lines: Vec<SeenLine>,
    pub players: Vec<SeenPlayer>,
}

impl Vision {
    /// Clear per-cycle contents, retaining allocation capacity.
    pub fn begin_cycle(&mut self) {
        self.ball = None;
        self.landmarks = [None; 8];
        self.lines.clear();
        self.players.clear();
    }

    /// Position of a fixed landmark, if seen this cycle.
    pub fn landmark(&self, which: Landmark) -> Option<[f32; 3]> {
        self.landmarks[which as usize]
    }

    /// Record a landmark observation.
    pub fn set_landmark(&mut self, which: Landmark, pos: [f32; 3]) {
        self.landmarks[which as usize] = Some(pos);
    }
}

/// The agent's view of the match, updated in place once per sensor frame.
#[derive(Debug)]
pub struct WorldState {
    /// Server wall-clock, used only for inter-agent synchronization.
    pub time_server: f32,
    /// Game clock.
    pub time_match: f32,
    /// Goals our team has scored.
    pub goals_scored: u8,
    /// Goals our team has conceded.
    pub goals_conceded: u8,
    /// Our uniform number, 1..=11.
    pub unum: u8,
    /// True iff our team plays the left half.
    ///
    /// The server emits team identity before the first play-mode event, so
    /// this is always resolved before it is consulted.
    pub is_left: bool,
    /// Current play mode, team-relative.
    pub current_mode: PlayMode,
    /// Our team name, used to classify seen players.
    pub team_name: String,

    pub imu: Imu,
    pub foot_contacts: FootContacts,
    pub vision: Vision,
}

impl WorldState {
    /// Fresh world for an agent about to join the match.
    pub fn new(unum: u8, team_name: impl Into<String>) -> Self {
        debug_assert!((1..=11).contains(&unum), "uniform number out of range: {unum}");
        Self {
            time_server: 0.0,
            time_match: 0.0,
            goals_scored: 0,
            goals_conceded: 0,
            unum,
            is_left: true,
            current_mode: PlayMode::BeforeKickoff,
            team_name: team_name.into(),
            imu: Imu::default(),
            foot_contacts: FootContacts::default(),
            vision: Vision::default(),
        }
    }

    /// Apply a `pm` event from the game-state tag.
    ///
    /// Unknown events leave the current mode untouched; the server can emit
    /// modes (e.g. half-time variants) the decision layer does not consume.
    pub fn apply_play_mode(&mut self, event: &str) -> bool {
        match PlayMode::from_server_event(event, self.is_left) {
            Some(mode) => {
                self.current_mode = mode;
                true
            }
            None => false,
        }
    }

    /// Coarse group of the current play mode.
    pub fn mode_group(&self) -> PlayModeGroup {
        self.current_mode.group()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_world_defaults() {
        let world = WorldState::new(5, "RoboIME");
        assert_eq!(world.unum, 5);
        assert_eq!(world.current_mode, PlayMode::BeforeKickoff);
        assert!(world.is_left);
        assert_eq!(world.goals_scored, 0);
        assert_eq!(world.goals_conceded, 0);
        assert!(world.vision.ball.is_none());
    }

    #[test]
    fn play_mode_respects_side_assignment() {
        let mut world = WorldState::new(3, "RoboIME");

        world.is_left = true;
        assert!(world.apply_play_mode("KickOff_Left"));
        assert_eq!(world.current_mode, PlayMode::OurKickoff);

        world.is_left = false;
        assert!(world.apply_play_mode("KickOff_Left"));
        assert_eq!(world.current_mode, PlayMode::TheirKickoff);
    }

    #[test]
    fn unknown_play_mode_keeps_previous() {
        let mut world = WorldState::new(3, "RoboIME");
        world.apply_play_mode("PlayOn");
        assert!(!world.apply_play_mode("NotARealMode"));
        assert_eq!(world.current_mode, PlayMode::PlayOn);
    }

    #[test]
    fn vision_cycle_reset_keeps_capacity() {
        let mut vision = Vision::default();
        vision.ball = Some([8.5, -0.2, -0.1]);
        vision.set_landmark(Landmark::GoalRightFar, [17.5, -3.3, 4.3]);
        vision.lines.push(SeenLine { start: [1.0; 3], end: [2.0; 3] });
        vision.players.push(SeenPlayer { teammate: true, unum: 7, ..Default::default() });

        let line_cap = vision.lines.capacity();
        vision.begin_cycle();

        assert!(vision.ball.is_none());
        assert!(vision.landmark(Landmark::GoalRightFar).is_none());
        assert!(vision.lines.is_empty());
        assert!(vision.players.is_empty());
        assert!(vision.lines.capacity() >= line_cap);
    }

    #[test]
    fn landmark_tags_resolve() {
        assert_eq!(Landmark::from_tag("F1L"), Some(Landmark::FlagLeftNear));
        assert_eq!(Landmark::from_tag("G2R"), Some(Landmark::GoalRightFar));
        assert_eq!(Landmark::from_tag("B"), None);
        assert_eq!(Landmark::from_tag(""), None);
    }
}
