//! Agent runtime configuration.
//!
//! Every knob has a default matching the standard local simulation setup, so
//! `AgentConfig::default()` is enough to run against an rcssserver3d on the
//! same machine. A YAML file can override any subset of fields:
//!
//! ```yaml
//! host: 10.0.0.7
//! team_name: RoboIME
//! log_dir: /var/log/touchline
//! ```

use crate::{AgentError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration shared by every agent in the process.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Simulation server host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Agent port of the simulation server.
    #[serde(default = "default_agent_port")]
    pub agent_port: u16,

    /// Team name sent in the init handshake message.
    #[serde(default = "default_team_name")]
    pub team_name: String,

    /// UDP endpoint of the RoboViz visualizer.
    #[serde(default = "default_monitor_addr")]
    pub monitor_addr: String,

    /// Directory for match log files. Created on the first log call.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_agent_port() -> u16 {
    3100
}

fn default_team_name() -> String {
    "RoboIME".to_string()
}

fn default_monitor_addr() -> String {
    "127.0.0.1:32769".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            agent_port: default_agent_port(),
            team_name: default_team_name(),
            monitor_addr: default_monitor_addr(),
            log_dir: default_log_dir(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from a YAML file, filling omitted fields with
    /// defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AgentError::ConfigRead { path: path.to_path_buf(), source: e })?;
        serde_yaml_ng::from_str(&raw)
            .map_err(|e| AgentError::ConfigParse { path: path.to_path_buf(), source: e })
    }

    /// `host:port` string for the server's agent endpoint.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.agent_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_simulation_setup() {
        let config = AgentConfig::default();
        assert_eq!(config.server_addr(), "localhost:3100");
        assert_eq!(config.team_name, "RoboIME");
        assert_eq!(config.monitor_addr, "127.0.0.1:32769");
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn partial_yaml_keeps_defaults_for_omitted_fields() {
        let config: AgentConfig =
            serde_yaml_ng::from_str("host: 192.168.0.12\nteam_name: Visitors\n").unwrap();
        assert_eq!(config.host, "192.168.0.12");
        assert_eq!(config.team_name, "Visitors");
        assert_eq!(config.agent_port, 3100);
        assert_eq!(config.monitor_addr, "127.0.0.1:32769");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: std::result::Result<AgentConfig, _> =
            serde_yaml_ng::from_str("hosst: typo.example\n");
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AgentConfig::from_file("/nonexistent/touchline.yaml").unwrap_err();
        assert!(err.to_string().contains("touchline.yaml"));
    }
}
