use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::{StatusEntry, Target, TargetState};

#[derive(Debug, Clone)]
struct BoardEntry {
    state: TargetState,
    last_checked: Option<DateTime<Utc>>,
    // Newest cycle that has touched this entry. Probe results are tagged
    // with the cycle that issued them; anything older is discarded, so a
    // slow probe from a superseded cycle can never overwrite newer state.
    cycle: u64,
}

/// Latest reachability state per target. Written by probe completions and
/// cycle announcements arriving in any order; read by the API.
#[derive(Debug, Default)]
pub struct StatusBoard {
    entries: HashMap<Target, BoardEntry>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the Pending / never-checked entry the moment a target is
    /// added.
    pub fn ensure(&mut self, target: &Target) {
        self.entries.entry(target.clone()).or_insert(BoardEntry {
            state: TargetState::Pending,
            last_checked: None,
            cycle: 0,
        });
    }

    pub fn forget(&mut self, target: &Target) {
        self.entries.remove(target);
    }

    /// Announces a new cycle for one target, flipping it back to Pending.
    /// A target removed since the cycle snapshot is left forgotten.
    pub fn set_pending(&mut self, target: &Target, cycle: u64) {
        if let Some(entry) = self.entries.get_mut(target) {
            if cycle >= entry.cycle {
                entry.state = TargetState::Pending;
                entry.cycle = cycle;
            }
        }
    }

    /// Records one probe result. Ignored when a newer cycle has already
    /// touched the entry, or when the target is gone.
    pub fn apply(&mut self, target: &Target, cycle: u64, reachable: bool, at: DateTime<Utc>) {
        if let Some(entry) = self.entries.get_mut(target) {
            if cycle >= entry.cycle {
                entry.state = if reachable {
                    TargetState::Online
                } else {
                    TargetState::Offline
                };
                entry.last_checked = Some(at);
                entry.cycle = cycle;
            }
        }
    }

    pub fn get(&self, target: &Target) -> StatusEntry {
        match self.entries.get(target) {
            Some(entry) => StatusEntry {
                state: entry.state,
                last_checked: entry.last_checked,
            },
            None => StatusEntry::pending(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target::new("web", "10.0.0.1", 80)
    }

    #[test]
    fn unknown_target_reads_as_never_checked() {
        let board = StatusBoard::new();
        let entry = board.get(&target());
        assert_eq!(entry.state, TargetState::Pending);
        assert!(entry.last_checked.is_none());
    }

    #[test]
    fn result_updates_state_and_timestamp() {
        let mut board = StatusBoard::new();
        board.ensure(&target());
        board.set_pending(&target(), 1);

        let at = Utc::now();
        board.apply(&target(), 1, true, at);

        let entry = board.get(&target());
        assert_eq!(entry.state, TargetState::Online);
        assert_eq!(entry.last_checked, Some(at));
    }

    #[test]
    fn failed_probe_reads_as_offline() {
        let mut board = StatusBoard::new();
        board.ensure(&target());
        board.set_pending(&target(), 1);
        board.apply(&target(), 1, false, Utc::now());

        assert_eq!(board.get(&target()).state, TargetState::Offline);
    }

    #[test]
    fn stale_cycle_result_is_discarded() {
        let mut board = StatusBoard::new();
        board.ensure(&target());
        board.set_pending(&target(), 1);
        board.set_pending(&target(), 2);

        // Cycle 1's probe limps in after cycle 2 has been announced.
        board.apply(&target(), 1, true, Utc::now());
        assert_eq!(board.get(&target()).state, TargetState::Pending);

        board.apply(&target(), 2, false, Utc::now());
        assert_eq!(board.get(&target()).state, TargetState::Offline);
    }

    #[test]
    fn newer_cycle_overwrites_previous_terminal_state() {
        let mut board = StatusBoard::new();
        board.ensure(&target());
        board.set_pending(&target(), 1);
        board.apply(&target(), 1, true, Utc::now());

        board.set_pending(&target(), 2);
        assert_eq!(board.get(&target()).state, TargetState::Pending);
    }

    #[test]
    fn stale_announcement_does_not_repend_a_newer_result() {
        let mut board = StatusBoard::new();
        board.ensure(&target());
        board.set_pending(&target(), 2);
        board.apply(&target(), 2, true, Utc::now());

        board.set_pending(&target(), 1);
        assert_eq!(board.get(&target()).state, TargetState::Online);
    }

    #[test]
    fn forgotten_target_result_is_discarded() {
        let mut board = StatusBoard::new();
        board.ensure(&target());
        board.set_pending(&target(), 1);
        board.forget(&target());

        board.apply(&target(), 1, true, Utc::now());
        assert!(board.get(&target()).last_checked.is_none());
    }
}
