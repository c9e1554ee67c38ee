//! One simulated player: link + world + match log.
//!
//! The decision policy lives outside this crate; an [`Agent`] only runs the
//! mechanical cycle the server expects (flush committed effector fragments,
//! receive the freshest sensor frame, decode it into the world) and exposes
//! the state a policy needs to act.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::config::AgentConfig;
use crate::connection::{ServerLink, SharedLink, SiblingRegistry};
use crate::logger::AsyncLogger;
use crate::parser::parse_frame;
use crate::world::WorldState;
use crate::Result;

/// A member of the team, joined to the server and ready to cycle.
pub struct Agent {
    link: SharedLink,
    world: WorldState,
    logger: Arc<AsyncLogger>,
}

impl Agent {
    /// Connect, run the join handshake, and register with the team.
    ///
    /// Already-registered teammates are kept alive while this agent waits on
    /// the server's handshake replies; once joined, this agent's link is
    /// registered so later teammates extend the same courtesy.
    pub fn join_team(
        config: &AgentConfig,
        unum: u8,
        registry: &SiblingRegistry,
        logger: Arc<AsyncLogger>,
    ) -> Result<Agent> {
        let link = SharedLink::new(ServerLink::connect(&config.server_addr())?);
        let siblings = registry.snapshot();
        link.initialize_agent(unum, &config.team_name, &siblings)?;
        registry.register(link.clone());

        info!(unum, team = %config.team_name, "agent joined");
        logger.info(format!("[{unum}] joined team {}", config.team_name));

        Ok(Self { link, world: WorldState::new(unum, config.team_name.clone()), logger })
    }

    /// The decoded game state as of the last completed cycle.
    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// This agent's link handle, for keep-alive duty or manual I/O.
    pub fn link(&self) -> &SharedLink {
        &self.link
    }

    /// Queue an effector fragment for the next cycle's send.
    pub fn commit(&self, fragment: &str) {
        self.link.lock().commit(fragment);
    }

    /// Queue a positional teleport. Coordinates in meters, rotation in
    /// degrees; where to beam is the formation layer's decision.
    pub fn commit_beam(&self, x: f32, y: f32, rotation: f32) {
        self.commit(&format!("(beam {x} {y} {rotation})"));
    }

    /// Run one simulation cycle: flush the outbox, receive the freshest
    /// frame, decode it.
    ///
    /// Returns `false` when the cycle produced no frame, either a receive
    /// timeout or the server hanging up; the main loop treats that as this
    /// agent's signal to shut down.
    pub fn tick(&mut self) -> bool {
        let mut link = self.link.lock();

        if let Err(e) = link.send() {
            self.logger.error(format!("[{}] effector send failed: {e}", self.world.unum));
            return false;
        }

        let frame = link.receive();
        if frame.is_empty() {
            return false;
        }
        parse_frame(frame, &mut self.world, &self.logger);
        true
    }

    /// Cooperative main loop: decide, then cycle, until `running` drops or
    /// the server stops talking to us.
    ///
    /// `running` is the process-wide shutdown flag (flipped by the host's
    /// SIGINT handling); the loop always finishes the cycle in flight before
    /// exiting, and a blocked receive unblocks on the link's timeout.
    pub fn run(&mut self, running: &AtomicBool, mut behave: impl FnMut(&mut Agent)) {
        while running.load(Ordering::Relaxed) {
            behave(self);
            if !self.tick() {
                self.logger
                    .info(format!("[{}] no frame this cycle, shutting down", self.world.unum));
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Agent-level behavior against a live loopback server is exercised in
    // tests/link.rs; here we only pin the effector fragment formats.

    #[test]
    fn beam_fragment_format() {
        // The beam message is assembled from plain Display formatting; pin
        // the exact shape the server parses.
        let (x, y, rot) = (-10.5f32, 3.0f32, 90.0f32);
        assert_eq!(format!("(beam {x} {y} {rot})"), "(beam -10.5 3 90)");
    }
}
