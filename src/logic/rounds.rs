//! Round lifecycle: creating and deleting rounds, score entry, result confirmation,
//! drops and finishing the tournament.
//!
//! Every operation checks its guards before touching the tournament, so a rejected
//! call leaves it unchanged.

use crate::logic::elimination::pair_elimination_round_with_rng;
use crate::logic::swiss::pair_swiss_round;
use crate::models::{
    MatchId, MatchResult, PairingSystem, PlayerId, Round, Side, Tournament, TournamentError,
};
use rand::Rng;

/// What `start_round` did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundOutcome {
    /// A new round with this number was appended.
    Started(u32),
    /// The bracket has a single winner; the tournament is now finished.
    Decided,
}

/// Start the next round using the configured pairing system.
pub fn start_round(tournament: &mut Tournament) -> Result<RoundOutcome, TournamentError> {
    start_round_with_rng(tournament, &mut rand::thread_rng())
}

/// Start the next round; `rng` seeds the first elimination round.
pub fn start_round_with_rng<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<RoundOutcome, TournamentError> {
    if tournament.active_players().count() < 2 {
        return Err(TournamentError::NotEnoughActivePlayers);
    }
    if tournament.current_round().is_some_and(Round::is_open) {
        return Err(TournamentError::RoundInProgress);
    }

    let matches = match tournament.meta.system {
        PairingSystem::Swiss => pair_swiss_round(tournament),
        PairingSystem::Elimination => {
            let matches = pair_elimination_round_with_rng(tournament, rng);
            if matches.is_empty() {
                tournament.finished = true;
                log::info!("Tournament {} decided; bracket finished", tournament.slug);
                return Ok(RoundOutcome::Decided);
            }
            matches
        }
    };

    let number = tournament.rounds.len() as u32 + 1;
    log::info!(
        "Tournament {}: round {number} started with {} matches",
        tournament.slug,
        matches.len()
    );
    tournament.rounds.push(Round::new(number, matches));
    tournament.finished = false;
    Ok(RoundOutcome::Started(number))
}

/// Delete a round. Only the last one may be removed.
pub fn delete_round(tournament: &mut Tournament, number: u32) -> Result<(), TournamentError> {
    match tournament.current_round() {
        Some(last) if last.number == number => {}
        _ => return Err(TournamentError::NotLastRound { requested: number }),
    }
    tournament.rounds.pop();
    log::info!("Tournament {}: round {number} deleted", tournament.slug);
    Ok(())
}

/// Enter a raw game-win count for one side. Clamped into [0, 3]; the result is untouched.
pub fn update_score(
    tournament: &mut Tournament,
    round: u32,
    match_id: MatchId,
    side: Side,
    value: i32,
) -> Result<(), TournamentError> {
    let r = tournament
        .get_round_mut(round)
        .ok_or(TournamentError::RoundNotFound(round))?;
    if !r.is_open() {
        return Err(TournamentError::RoundClosed(round));
    }
    r.get_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?
        .set_score(side, value);
    Ok(())
}

/// Confirm a match result from its raw scores.
///
/// A dropped player forfeits 0-2; two dropped players are recorded as a 0-0 `DRAW`
/// marker (standings still score it as two losses). Otherwise the higher score wins,
/// equal non-zero scores draw, and 0-0 stays pending. Draws are not rejected when
/// `draw_allowed` is off.
pub fn confirm_result(
    tournament: &mut Tournament,
    round: u32,
    match_id: MatchId,
) -> Result<Option<MatchResult>, TournamentError> {
    let (p1, p2) = tournament
        .rounds
        .iter()
        .find(|r| r.number == round)
        .ok_or(TournamentError::RoundNotFound(round))?
        .matches
        .iter()
        .find(|m| m.id == match_id)
        .map(|m| (m.p1, m.p2))
        .ok_or(TournamentError::MatchNotFound(match_id))?;

    let p1_dropped = tournament.is_dropped(p1);
    let p2_dropped = p2.is_some_and(|id| tournament.is_dropped(id));

    let m = tournament
        .get_round_mut(round)
        .and_then(|r| r.get_match_mut(match_id))
        .ok_or(TournamentError::MatchNotFound(match_id))?;

    match (m.is_bye(), p1_dropped, p2_dropped) {
        (true, _, _) => m.result = Some(MatchResult::Bye),
        (false, true, true) => {
            m.p1_wins = 0;
            m.p2_wins = 0;
            m.result = Some(MatchResult::Draw);
        }
        (false, true, false) => {
            m.p1_wins = 0;
            m.p2_wins = 2;
            m.result = Some(MatchResult::P2);
        }
        (false, false, true) => {
            m.p1_wins = 2;
            m.p2_wins = 0;
            m.result = Some(MatchResult::P1);
        }
        (false, false, false) => m.result = m.derived_result(),
    }
    Ok(m.result)
}

/// Drop or reinstate a player.
///
/// Dropping resolves the player's pending matches in the current round in favour of
/// the opponent. Reinstating does not undo results that were forced earlier.
pub fn set_dropped(
    tournament: &mut Tournament,
    player_id: PlayerId,
    dropped: bool,
) -> Result<(), TournamentError> {
    tournament
        .get_player_mut(player_id)
        .ok_or(TournamentError::PlayerNotFound(player_id))?
        .dropped = dropped;

    if !dropped || tournament.finished {
        return Ok(());
    }
    let Some(round) = tournament.rounds.last_mut() else {
        return Ok(());
    };
    for m in round.matches.iter_mut().filter(|m| m.is_pending()) {
        if m.p1 == player_id {
            m.p1_wins = 0;
            m.p2_wins = 2;
            m.result = Some(MatchResult::P2);
        } else if m.p2 == Some(player_id) {
            m.p1_wins = 2;
            m.p2_wins = 0;
            m.result = Some(MatchResult::P1);
        }
    }
    log::info!("Tournament {}: player {player_id} dropped", tournament.slug);
    Ok(())
}

/// Mark the tournament finished. Every match between two players needs a result.
pub fn finish_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.matches().any(|m| m.is_pending()) {
        return Err(TournamentError::IncompleteResults);
    }
    tournament.finished = true;
    log::info!("Tournament {} finished", tournament.slug);
    Ok(())
}
