//! Single elimination: random seeding with byes up to a power of two, then winners advance.

use crate::models::{Match, PlayerId, Tournament};
use rand::seq::SliceRandom;
use rand::Rng;

/// Produce the next bracket round with a thread-local RNG. Empty means the bracket is decided.
pub fn pair_elimination_round(tournament: &Tournament) -> Vec<Match> {
    pair_elimination_round_with_rng(tournament, &mut rand::thread_rng())
}

/// Produce the next bracket round.
///
/// First round: shuffle active players, give the first `bracket - players` a bye,
/// pair the rest in order. Later rounds: pair the previous round's winners in order;
/// an odd one out gets a bye. One winner (or none) left means the bracket is decided.
pub fn pair_elimination_round_with_rng<R: Rng + ?Sized>(
    tournament: &Tournament,
    rng: &mut R,
) -> Vec<Match> {
    let mut table = tournament.next_table();
    let mut matches = Vec::new();

    let Some(previous) = tournament.rounds.last() else {
        let mut pool: Vec<PlayerId> = tournament.active_players().map(|p| p.id).collect();
        if pool.len() < 2 {
            return matches;
        }
        let bracket = pool.len().next_power_of_two();
        let byes = bracket - pool.len();
        pool.shuffle(rng);
        log::debug!(
            "Seeding bracket of {bracket} for {} players ({byes} byes)",
            pool.len()
        );

        for &id in &pool[..byes] {
            matches.push(Match::bye(table, id));
            table += 1;
        }
        for pair in pool[byes..].chunks_exact(2) {
            matches.push(Match::new(table, pair[0], pair[1]));
            table += 1;
        }
        return matches;
    };

    let winners: Vec<PlayerId> = previous.matches.iter().filter_map(Match::winner).collect();
    if winners.len() <= 1 {
        return matches;
    }
    for pair in winners.chunks(2) {
        let m = match pair {
            [a, b] => Match::new(table, *a, *b),
            _ => Match::bye(table, pair[0]),
        };
        matches.push(m);
        table += 1;
    }
    matches
}
