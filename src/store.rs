//! Tournament storage: the interface the engine needs and an in-memory implementation.

use crate::models::{Tournament, TournamentSummary};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Tournaments untouched for this many days may be purged.
pub const DEFAULT_RETENTION_DAYS: i64 = 60;

/// Keyed tournament storage. `get` may return None at any time (entries expire).
pub trait TournamentStore {
    fn get(&self, slug: &str) -> Option<Tournament>;
    /// Summaries, most recently updated first.
    fn list(&self) -> Vec<TournamentSummary>;
    /// Store under `tournament.slug`, stamping `updated_at`.
    fn save(&mut self, tournament: &mut Tournament);
    /// Returns whether an entry was removed.
    fn delete(&mut self, slug: &str) -> bool;
}

/// In-memory store with a retention window.
#[derive(Debug)]
pub struct MemoryStore {
    tournaments: HashMap<String, Tournament>,
    retention: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_retention(Duration::days(DEFAULT_RETENTION_DAYS))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: Duration) -> Self {
        Self {
            tournaments: HashMap::new(),
            retention,
        }
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.get(slug).is_some()
    }

    fn is_expired(&self, t: &Tournament, now: DateTime<Utc>) -> bool {
        now - t.updated_at > self.retention
    }

    /// Remove entries not saved within the retention window. Returns how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let retention = self.retention;
        let before = self.tournaments.len();
        self.tournaments.retain(|_, t| now - t.updated_at <= retention);
        let removed = before - self.tournaments.len();
        if removed > 0 {
            log::info!(
                "Purged {removed} tournament(s) untouched for {} days",
                retention.num_days()
            );
        }
        removed
    }
}

impl TournamentStore for MemoryStore {
    fn get(&self, slug: &str) -> Option<Tournament> {
        let now = Utc::now();
        self.tournaments
            .get(slug)
            .filter(|t| !self.is_expired(t, now))
            .cloned()
    }

    fn list(&self) -> Vec<TournamentSummary> {
        let now = Utc::now();
        let mut summaries: Vec<TournamentSummary> = self
            .tournaments
            .values()
            .filter(|t| !self.is_expired(t, now))
            .map(Tournament::summary)
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    fn save(&mut self, tournament: &mut Tournament) {
        tournament.updated_at = Utc::now();
        self.tournaments
            .insert(tournament.slug.clone(), tournament.clone());
    }

    fn delete(&mut self, slug: &str) -> bool {
        self.tournaments.remove(slug).is_some()
    }
}
