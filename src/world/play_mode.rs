//! Play modes and the server-event translation table.
//!
//! The server announces referee events in absolute field terms
//! (`KickOff_Left`, `corner_kick_right`, ...). Agents reason in team-relative
//! terms, so every event maps to a pair of modes: the one we see when our
//! team plays the left half, and the one we see when it plays the right half.
//! The pair table is process-wide immutable data; perspective is applied at
//! lookup time with an explicit column index.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Team-relative game mode.
///
/// Variants are partitioned in three blocks: modes in our favor (0..=8),
/// their mirror (9..=17), and side-neutral modes (18..=20).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PlayMode {
    OurKickoff = 0,
    OurKickIn = 1,
    OurCornerKick = 2,
    OurGoalKick = 3,
    OurFreeKick = 4,
    OurPass = 5,
    OurDirFreeKick = 6,
    OurGoal = 7,
    OurOffside = 8,

    TheirKickoff = 9,
    TheirKickIn = 10,
    TheirCornerKick = 11,
    TheirGoalKick = 12,
    TheirFreeKick = 13,
    TheirPass = 14,
    TheirDirFreeKick = 15,
    TheirGoal = 16,
    TheirOffside = 17,

    BeforeKickoff = 18,
    GameOver = 19,
    PlayOn = 20,
}

/// Coarse classification of play modes for decision layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayModeGroup {
    /// A set piece in our favor: we take the kick.
    OurKick,
    /// A set piece in their favor: we hold distance and wait.
    TheirKick,
    /// The beam effector is accepted (initial placement, after goals).
    ActiveBeam,
    /// Running play or terminal states with no set-piece action.
    Other,
}

impl PlayMode {
    /// Resolve a server event string to the team-relative mode.
    ///
    /// Column 0 of the table is the mode when our team plays left, column 1
    /// when it plays right. Returns `None` for event strings the table does
    /// not know; callers keep the previous mode in that case.
    pub fn from_server_event(event: &str, is_left: bool) -> Option<PlayMode> {
        let column = if is_left { 0 } else { 1 };
        PLAY_MODES.get(event).map(|pair| pair[column])
    }

    /// The coarse group this mode belongs to.
    pub fn group(self) -> PlayModeGroup {
        use PlayMode::*;
        match self {
            OurKickoff | OurKickIn | OurCornerKick | OurGoalKick | OurFreeKick | OurPass
            | OurDirFreeKick => PlayModeGroup::OurKick,
            TheirKickoff | TheirKickIn | TheirCornerKick | TheirGoalKick | TheirFreeKick
            | TheirPass | TheirDirFreeKick => PlayModeGroup::TheirKick,
            BeforeKickoff | OurGoal | TheirGoal => PlayModeGroup::ActiveBeam,
            PlayOn | GameOver | OurOffside | TheirOffside => PlayModeGroup::Other,
        }
    }
}

/// Server event string → `[mode when we are left, mode when we are right]`.
///
/// The key casing is the server's, mixed as it is on the wire.
static PLAY_MODES: Lazy<HashMap<&'static str, [PlayMode; 2]>> = Lazy::new(|| {
    use PlayMode::*;
    HashMap::from([
        // Side-neutral events: both perspectives see the same mode.
        ("BeforeKickOff", [BeforeKickoff, BeforeKickoff]),
        ("GameOver", [GameOver, GameOver]),
        ("PlayOn", [PlayOn, PlayOn]),
        // Events awarded to the left team.
        ("KickOff_Left", [OurKickoff, TheirKickoff]),
        ("KickIn_Left", [OurKickIn, TheirKickIn]),
        ("corner_kick_left", [OurCornerKick, TheirCornerKick]),
        ("goal_kick_left", [OurGoalKick, TheirGoalKick]),
        ("free_kick_left", [OurFreeKick, TheirFreeKick]),
        ("pass_left", [OurPass, TheirPass]),
        ("direct_free_kick_left", [OurDirFreeKick, TheirDirFreeKick]),
        ("Goal_Left", [OurGoal, TheirGoal]),
        ("offside_left", [OurOffside, TheirOffside]),
        // Events awarded to the right team.
        ("KickOff_Right", [TheirKickoff, OurKickoff]),
        ("KickIn_Right", [TheirKickIn, OurKickIn]),
        ("corner_kick_right", [TheirCornerKick, OurCornerKick]),
        ("goal_kick_right", [TheirGoalKick, OurGoalKick]),
        ("free_kick_right", [TheirFreeKick, OurFreeKick]),
        ("pass_right", [TheirPass, OurPass]),
        ("direct_free_kick_right", [TheirDirFreeKick, OurDirFreeKick]),
        ("Goal_Right", [TheirGoal, OurGoal]),
        ("offside_right", [TheirOffside, OurOffside]),
    ])
});
