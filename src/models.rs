use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A monitored endpoint. Identity is the full (label, host, port) tuple:
/// two entries for the same port count as distinct when their labels differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub label: String,
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(label: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            label: label.into(),
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{}:{}", self.host, self.port)
        } else {
            write!(f, "{} - {}:{}", self.label, self.host, self.port)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetState {
    Pending,
    Online,
    Offline,
}

/// Latest known reachability of one target. Never persisted; every process
/// start begins from Pending with no timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub state: TargetState,
    pub last_checked: Option<DateTime<Utc>>,
}

impl StatusEntry {
    pub fn pending() -> Self {
        Self {
            state: TargetState::Pending,
            last_checked: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_label_only_when_present() {
        assert_eq!(Target::new("web", "10.0.0.1", 80).to_string(), "web - 10.0.0.1:80");
        assert_eq!(Target::new("", "10.0.0.1", 80).to_string(), "10.0.0.1:80");
    }
}
