//! Integration tests for single-elimination brackets.

use card_tournament_web::{
    confirm_result, pair_elimination_round_with_rng, start_round_with_rng, update_score,
    MatchResult, PairingSystem, PlayerId, RoundOutcome, Side, Tournament,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn bracket_with_players(n: usize) -> (Tournament, Vec<PlayerId>) {
    let mut t = Tournament::new("bracket", "Bracket");
    t.meta.system = PairingSystem::Elimination;
    let ids = (0..n).map(|i| t.add_player(&format!("P{i}")).unwrap()).collect();
    (t, ids)
}

fn p1_wins_all(t: &mut Tournament) {
    let round = t.rounds.last().unwrap();
    let number = round.number;
    let pending: Vec<_> = round.matches.iter().filter(|m| m.is_pending()).map(|m| m.id).collect();
    for id in pending {
        update_score(t, number, id, Side::P1, 2).unwrap();
        confirm_result(t, number, id).unwrap();
    }
}

#[test]
fn three_players_play_two_rounds_then_finish() {
    let (mut t, ids) = bracket_with_players(3);
    let mut rng = StdRng::seed_from_u64(7);

    assert_eq!(start_round_with_rng(&mut t, &mut rng), Ok(RoundOutcome::Started(1)));
    let first = &t.rounds[0].matches;
    assert_eq!(first.len(), 2);
    assert!(first[0].is_bye());
    assert_eq!(first[0].result, Some(MatchResult::Bye));
    assert!(first[1].is_pending());
    let seen: HashSet<_> = first.iter().flat_map(|m| [Some(m.p1), m.p2]).flatten().collect();
    assert_eq!(seen, ids.iter().copied().collect());
    let finalists = [first[0].p1, first[1].p1];

    p1_wins_all(&mut t);
    assert_eq!(start_round_with_rng(&mut t, &mut rng), Ok(RoundOutcome::Started(2)));
    let final_match = &t.rounds[1].matches;
    assert_eq!(final_match.len(), 1);
    assert!(final_match[0].pairs(finalists[0], finalists[1]));
    assert_eq!(final_match[0].table, 3);

    p1_wins_all(&mut t);
    assert!(!t.finished);
    assert_eq!(start_round_with_rng(&mut t, &mut rng), Ok(RoundOutcome::Decided));
    assert!(t.finished);
    assert_eq!(t.rounds.len(), 2);
}

#[test]
fn bracket_is_filled_up_to_a_power_of_two() {
    let (t, _) = bracket_with_players(6);
    let matches = pair_elimination_round_with_rng(&t, &mut StdRng::seed_from_u64(1));
    let byes = matches.iter().filter(|m| m.is_bye()).count();
    assert_eq!(byes, 2);
    assert_eq!(matches.len(), 4);
    assert!(matches[..2].iter().all(|m| m.is_bye()));
}

#[test]
fn odd_winner_count_gets_a_bye() {
    let (mut t, _) = bracket_with_players(6);
    let mut rng = StdRng::seed_from_u64(3);
    start_round_with_rng(&mut t, &mut rng).unwrap();
    // 2 byes and 2 matches; the first match is a 1-1 draw, so nobody advances from it.
    let pending: Vec<_> = t.rounds[0].matches.iter().filter(|m| m.is_pending()).map(|m| m.id).collect();
    assert_eq!(pending.len(), 2);
    update_score(&mut t, 1, pending[0], Side::P1, 1).unwrap();
    update_score(&mut t, 1, pending[0], Side::P2, 1).unwrap();
    assert_eq!(confirm_result(&mut t, 1, pending[0]), Ok(Some(MatchResult::Draw)));
    p1_wins_all(&mut t);

    start_round_with_rng(&mut t, &mut rng).unwrap();
    let second = &t.rounds[1].matches;
    assert_eq!(second.len(), 2);
    assert!(second[0].is_pending());
    assert!(second[1].is_bye());
}

#[test]
fn five_players_reduce_to_a_final() {
    let (mut t, _) = bracket_with_players(5);
    let mut rng = StdRng::seed_from_u64(11);
    start_round_with_rng(&mut t, &mut rng).unwrap();
    // 8-bracket: 3 byes and one match.
    assert_eq!(t.rounds[0].matches.len(), 4);
    p1_wins_all(&mut t);
    start_round_with_rng(&mut t, &mut rng).unwrap();
    assert_eq!(t.rounds[1].matches.len(), 2);
    p1_wins_all(&mut t);
    start_round_with_rng(&mut t, &mut rng).unwrap();
    assert_eq!(t.rounds[2].matches.len(), 1);
    assert!(!t.rounds[2].matches[0].is_bye());
    p1_wins_all(&mut t);
    assert_eq!(start_round_with_rng(&mut t, &mut rng), Ok(RoundOutcome::Decided));
}

#[test]
fn single_active_player_produces_nothing() {
    let (mut t, ids) = bracket_with_players(2);
    t.get_player_mut(ids[0]).unwrap().dropped = true;
    assert!(pair_elimination_round_with_rng(&t, &mut StdRng::seed_from_u64(0)).is_empty());
}
