//! Data structures for the tournament: players, matches, rounds, tournament state.

mod game;
mod player;
mod round;
mod tournament;

pub use game::{Match, MatchId, MatchResult, Side, MAX_GAME_WINS};
pub use player::{Player, PlayerId};
pub use round::Round;
pub use tournament::{
    PairingSystem, PointsSystem, Tiebreaker, Tournament, TournamentError, TournamentMeta,
    TournamentSummary,
};
