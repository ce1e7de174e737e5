//! Tournament, its configuration block, and TournamentError.

use crate::models::game::{Match, MatchId, MatchResult};
use crate::models::player::{Player, PlayerId};
use crate::models::round::Round;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TournamentError {
    /// Fewer than 2 non-dropped players.
    #[error("Need at least 2 active (non-dropped) players to start a round")]
    NotEnoughActivePlayers,
    /// The current round still has matches without a result.
    #[error("The current round still has matches without a result")]
    RoundInProgress,
    /// Only the last round can be deleted.
    #[error("Only the last round can be deleted (requested {requested})")]
    NotLastRound { requested: u32 },
    #[error("Round {0} not found")]
    RoundNotFound(u32),
    /// Scores can only change while the round is open.
    #[error("Round {0} is closed")]
    RoundClosed(u32),
    #[error("Match not found")]
    MatchNotFound(MatchId),
    /// Some match between two players lacks a result.
    #[error("There are matches without a result")]
    IncompleteResults,
    #[error("Player not found")]
    PlayerNotFound(PlayerId),
    #[error("Player name cannot be empty")]
    EmptyPlayerName,
    /// Names are unique, case-insensitive.
    #[error("A player with this name already exists")]
    DuplicatePlayerName,
    /// Players with recorded matches are dropped, not removed.
    #[error("Player has recorded matches; drop them instead")]
    PlayerHasHistory(PlayerId),
    #[error("Template {0} not found")]
    TemplateNotFound(String),
    /// Built-in templates cannot be changed or deleted.
    #[error("Template {0} is built in and cannot be modified")]
    TemplateReadOnly(String),
    #[error("Invalid tournament data: {0}")]
    MalformedSnapshot(String),
}

/// Points awarded per outcome.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct PointsSystem {
    pub win: i32,
    pub draw: i32,
    pub loss: i32,
    pub bye: i32,
}

impl Default for PointsSystem {
    fn default() -> Self {
        Self {
            win: 3,
            draw: 1,
            loss: 0,
            bye: 3,
        }
    }
}

/// Sort criterion for standings, applied in configured order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tiebreaker {
    Points,
    Omw,
    Wins,
    /// Terminates the chain: anything listed after it never applies.
    Name,
}

impl Tiebreaker {
    pub fn default_chain() -> Vec<Tiebreaker> {
        vec![
            Tiebreaker::Points,
            Tiebreaker::Omw,
            Tiebreaker::Wins,
            Tiebreaker::Name,
        ]
    }
}

/// Pairing discipline.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingSystem {
    #[default]
    Swiss,
    Elimination,
}

/// Tournament configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentMeta {
    pub name: String,
    pub date: NaiveDate,
    /// None means "auto" (derived from the number of active players).
    #[serde(default)]
    pub max_rounds: Option<u32>,
    #[serde(default)]
    pub points_system: PointsSystem,
    #[serde(default = "Tiebreaker::default_chain")]
    pub tiebreakers: Vec<Tiebreaker>,
    #[serde(default)]
    pub system: PairingSystem,
    #[serde(default = "default_draw_allowed")]
    pub draw_allowed: bool,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub template_name: Option<String>,
}

fn default_draw_allowed() -> bool {
    true
}

impl TournamentMeta {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
            max_rounds: Some(5),
            points_system: PointsSystem::default(),
            tiebreakers: Tiebreaker::default_chain(),
            system: PairingSystem::Swiss,
            draw_allowed: true,
            template_id: None,
            template_name: None,
        }
    }
}

/// Full tournament state: configuration, players and the round history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    /// Store key, derived from the name.
    pub slug: String,
    pub meta: TournamentMeta,
    pub players: Vec<Player>,
    pub rounds: Vec<Round>,
    #[serde(default)]
    pub finished: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store listing entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub slug: String,
    pub name: String,
    pub date: NaiveDate,
    pub system: PairingSystem,
    pub players: usize,
    pub rounds: usize,
    pub finished: bool,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    /// Create an empty tournament with default configuration, dated today.
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self::with_meta(slug, TournamentMeta::new(name, now.date_naive()))
    }

    pub fn with_meta(slug: impl Into<String>, meta: TournamentMeta) -> Self {
        let now = Utc::now();
        Self {
            slug: slug.into(),
            meta,
            players: Vec::new(),
            rounds: Vec::new(),
            finished: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> TournamentSummary {
        TournamentSummary {
            slug: self.slug.clone(),
            name: self.meta.name.clone(),
            date: self.meta.date,
            system: self.meta.system,
            players: self.players.len(),
            rounds: self.rounds.len(),
            finished: self.finished,
            updated_at: self.updated_at,
        }
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn is_dropped(&self, id: PlayerId) -> bool {
        self.get_player(id).is_some_and(|p| p.dropped)
    }

    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_active())
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    pub fn get_round_mut(&mut self, number: u32) -> Option<&mut Round> {
        self.rounds.iter_mut().find(|r| r.number == number)
    }

    /// All matches in round order.
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.rounds.iter().flat_map(|r| r.matches.iter())
    }

    /// True if `a` and `b` have been paired in any round.
    pub fn have_met(&self, a: PlayerId, b: PlayerId) -> bool {
        self.matches().any(|m| m.pairs(a, b))
    }

    pub fn has_had_bye(&self, id: PlayerId) -> bool {
        self.matches()
            .any(|m| m.p1 == id && m.result == Some(MatchResult::Bye))
    }

    /// First table number for a new round: one past the highest used, starting at 1.
    pub fn next_table(&self) -> u32 {
        self.rounds
            .iter()
            .filter_map(Round::max_table)
            .max()
            .map_or(1, |t| t + 1)
    }

    /// Configured round count, or ceil(log2(active players)) when set to auto.
    pub fn effective_max_rounds(&self) -> u32 {
        match self.meta.max_rounds {
            Some(n) => n.max(1),
            None => {
                let active = self.active_players().count().max(2) as u32;
                active.next_power_of_two().trailing_zeros().max(1)
            }
        }
    }

    fn validate_name(
        &self,
        name: &str,
        except: Option<PlayerId>,
    ) -> Result<String, TournamentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyPlayerName);
        }
        let is_duplicate = self
            .players
            .iter()
            .filter(|p| Some(p.id) != except)
            .any(|p| p.name.to_lowercase() == name.to_lowercase());
        if is_duplicate {
            return Err(TournamentError::DuplicatePlayerName);
        }
        Ok(name.to_string())
    }

    /// Add a player. Names must be non-empty and unique (case-insensitive).
    pub fn add_player(&mut self, name: &str) -> Result<PlayerId, TournamentError> {
        let name = self.validate_name(name, None)?;
        let player = Player::new(name);
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    pub fn rename_player(&mut self, id: PlayerId, name: &str) -> Result<(), TournamentError> {
        if self.get_player(id).is_none() {
            return Err(TournamentError::PlayerNotFound(id));
        }
        let name = self.validate_name(name, Some(id))?;
        if let Some(p) = self.get_player_mut(id) {
            p.name = name;
        }
        Ok(())
    }

    /// Remove a player who has never been paired. Players with history must be dropped.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<(), TournamentError> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or(TournamentError::PlayerNotFound(id))?;
        if self.matches().any(|m| m.involves(id)) {
            return Err(TournamentError::PlayerHasHistory(id));
        }
        self.players.remove(idx);
        Ok(())
    }

    /// Replace the configuration. A configured round count is kept at least 1.
    pub fn set_meta(&mut self, mut meta: TournamentMeta) {
        meta.max_rounds = meta.max_rounds.map(|n| n.max(1));
        self.meta = meta;
    }
}
