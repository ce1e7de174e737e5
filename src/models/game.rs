//! Match, MatchResult and Side for 1v1 games (best of three).

use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Highest number of game wins a side can record in a match.
pub const MAX_GAME_WINS: u8 = 3;

/// Confirmed outcome of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchResult {
    P1,
    P2,
    Draw,
    Bye,
}

/// Which seat of a match a score belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    P1,
    P2,
}

/// A single match at a numbered table. `p2 == None` is a bye.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    /// Table number, increasing across the whole tournament.
    pub table: u32,
    pub p1: PlayerId,
    pub p2: Option<PlayerId>,
    pub p1_wins: u8,
    pub p2_wins: u8,
    /// None while pending.
    pub result: Option<MatchResult>,
}

impl Match {
    /// A pending match between two players, 0-0.
    pub fn new(table: u32, p1: PlayerId, p2: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            table,
            p1,
            p2: Some(p2),
            p1_wins: 0,
            p2_wins: 0,
            result: None,
        }
    }

    /// An immediately resolved bye, recorded 2-0 for `p1`.
    pub fn bye(table: u32, p1: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            table,
            p1,
            p2: None,
            p1_wins: 2,
            p2_wins: 0,
            result: Some(MatchResult::Bye),
        }
    }

    pub fn is_bye(&self) -> bool {
        self.p2.is_none()
    }

    /// True for a match between two real players that has no confirmed result.
    pub fn is_pending(&self) -> bool {
        self.p2.is_some() && self.result.is_none()
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.p1 == player || self.p2 == Some(player)
    }

    /// True when `a` and `b` sit on opposite sides of this match.
    pub fn pairs(&self, a: PlayerId, b: PlayerId) -> bool {
        (self.p1 == a && self.p2 == Some(b)) || (self.p1 == b && self.p2 == Some(a))
    }

    /// Player who advances from this match, if decided.
    pub fn winner(&self) -> Option<PlayerId> {
        match self.result? {
            MatchResult::P1 | MatchResult::Bye => Some(self.p1),
            MatchResult::P2 => self.p2,
            MatchResult::Draw => None,
        }
    }

    /// Result implied by the raw scores. Equal non-zero scores are a draw; 0-0 stays pending.
    pub fn derived_result(&self) -> Option<MatchResult> {
        if self.p2.is_none() {
            return Some(MatchResult::Bye);
        }
        match self.p1_wins.cmp(&self.p2_wins) {
            std::cmp::Ordering::Greater => Some(MatchResult::P1),
            std::cmp::Ordering::Less => Some(MatchResult::P2),
            std::cmp::Ordering::Equal if self.p1_wins > 0 => Some(MatchResult::Draw),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Store a raw score for one side, clamped into `[0, MAX_GAME_WINS]`.
    pub fn set_score(&mut self, side: Side, value: i32) {
        let clamped = value.clamp(0, i32::from(MAX_GAME_WINS)) as u8;
        match side {
            Side::P1 => self.p1_wins = clamped,
            Side::P2 => self.p2_wins = clamped,
        }
    }
}
