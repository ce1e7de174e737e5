//! Swiss pairing: greedy first-fit over the current standings.

use crate::logic::standings::{compare_names, compute_standings};
use crate::models::{Match, PlayerId, Tournament};
use std::collections::HashMap;

/// Produce the next Swiss round's matches.
///
/// 1. Active players, sorted by points (desc) then name (asc).
/// 2. Odd count: the lowest-placed player without a previous bye gets one.
///    If everyone already had a bye, nobody gets one and the pool stays odd.
/// 3. Take the first remaining player and pair them with the first remaining
///    player they have not met; fall back to the next in line (a rematch).
///    The last player of an odd pool is left without a match.
/// 4. Tables continue from the highest table used so far.
pub fn pair_swiss_round(tournament: &Tournament) -> Vec<Match> {
    let standings = compute_standings(tournament);
    let points: HashMap<PlayerId, i32> =
        standings.iter().map(|r| (r.player_id, r.points)).collect();

    let mut ordered: Vec<(PlayerId, i32, &str)> = tournament
        .active_players()
        .map(|p| (p.id, points.get(&p.id).copied().unwrap_or(0), p.name.as_str()))
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| compare_names(a.2, b.2)));
    let mut pool: Vec<PlayerId> = ordered.into_iter().map(|(id, _, _)| id).collect();

    let mut table = tournament.next_table();
    let mut matches = Vec::with_capacity(pool.len() / 2 + 1);

    if pool.len() % 2 == 1 {
        if let Some(idx) = pool.iter().rposition(|&id| !tournament.has_had_bye(id)) {
            let id = pool.remove(idx);
            log::debug!("Swiss bye to {id} at table {table}");
            matches.push(Match::bye(table, id));
            table += 1;
        } else {
            log::warn!("Every active player already had a bye; pairing an odd pool");
        }
    }

    while !pool.is_empty() {
        let a = pool.remove(0);
        if pool.is_empty() {
            break;
        }
        let idx = pool
            .iter()
            .position(|&b| !tournament.have_met(a, b))
            .unwrap_or(0);
        let b = pool.remove(idx);
        matches.push(Match::new(table, a, b));
        table += 1;
    }

    matches
}
