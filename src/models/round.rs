//! Round: a numbered sequence of matches.

use crate::models::game::{Match, MatchId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based, contiguous.
    pub number: u32,
    pub matches: Vec<Match>,
}

impl Round {
    pub fn new(number: u32, matches: Vec<Match>) -> Self {
        Self { number, matches }
    }

    /// A round is open while any match with a real opponent lacks a result.
    pub fn is_open(&self) -> bool {
        self.matches.iter().any(Match::is_pending)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    pub fn max_table(&self) -> Option<u32> {
        self.matches.iter().map(|m| m.table).max()
    }
}
