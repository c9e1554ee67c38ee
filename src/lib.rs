//! Client runtime for RoboCup 3D simulation soccer agents.
//!
//! Touchline is the plumbing a team of simulated humanoid players needs to
//! talk to an rcssserver3d: the framed TCP link with its multi-agent
//! keep-alive dance, the zero-copy sensor-message parser, the team-relative
//! play-mode classifier, the RoboViz drawing transport, and a match logger
//! that never blocks the 50 Hz agent loop. Decision policies, formations,
//! and body kinematics are the caller's business.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//! use touchline::{Agent, AgentConfig, AsyncLogger, SiblingRegistry};
//!
//! fn main() -> touchline::Result<()> {
//!     let config = AgentConfig::default();
//!     let logger = Arc::new(AsyncLogger::new(&config.log_dir));
//!     let registry = SiblingRegistry::new();
//!
//!     // Join sequentially: each handshake keeps the earlier links alive.
//!     let mut agents: Vec<Agent> = (1..=11)
//!         .map(|unum| Agent::join_team(&config, unum, &registry, Arc::clone(&logger)))
//!         .collect::<touchline::Result<_>>()?;
//!
//!     let running = AtomicBool::new(true); // flip from your SIGINT handler
//!     for agent in &mut agents {
//!         agent.commit_beam(-10.0, 0.0, 0.0);
//!     }
//!     while running.load(std::sync::atomic::Ordering::Relaxed) {
//!         for agent in &mut agents {
//!             if !agent.tick() {
//!                 return Ok(());
//!             }
//!             // ... decide and commit effector fragments here ...
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod agent;
mod config;
mod error;

pub mod connection;
pub mod draw;
pub mod logger;
pub mod parser;
pub mod world;

pub use agent::Agent;
pub use config::AgentConfig;
pub use connection::{ServerLink, SharedLink, SiblingRegistry, SYN};
pub use draw::DrawTransport;
pub use error::{AgentError, Result};
pub use logger::AsyncLogger;
pub use parser::parse_frame;
pub use world::{PlayMode, PlayModeGroup, WorldState};
