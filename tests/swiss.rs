//! Integration tests for Swiss pairing.

use card_tournament_web::{
    compute_standings, confirm_result, pair_swiss_round, start_round, update_score, Match,
    MatchResult, PlayerId, Round, RoundOutcome, Side, Tournament,
};

fn tournament_with_players(names: &[&str]) -> (Tournament, Vec<PlayerId>) {
    let mut t = Tournament::new("swiss", "Swiss");
    let ids = names.iter().map(|n| t.add_player(n).unwrap()).collect();
    (t, ids)
}

/// Record a 2-0 for p1 on every pending match of the last round.
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
fn five_players_first_round_byes_the_last_name() {
    let (mut t, ids) = tournament_with_players(&["A", "B", "C", "D", "E"]);
    assert_eq!(start_round(&mut t), Ok(RoundOutcome::Started(1)));

    let matches = &t.rounds[0].matches;
    assert_eq!(matches.len(), 3);
    let bye = &matches[0];
    assert_eq!((bye.p1, bye.p2, bye.result), (ids[4], None, Some(MatchResult::Bye)));
    assert_eq!((bye.p1_wins, bye.p2_wins, bye.table), (2, 0, 1));
    assert_eq!((matches[1].p1, matches[1].p2), (ids[0], Some(ids[1])));
    assert_eq!((matches[2].p1, matches[2].p2), (ids[2], Some(ids[3])));
    assert!(matches[1..].iter().all(|m| m.result.is_none() && m.p1_wins == 0));
    assert_eq!(matches.iter().map(|m| m.table).collect::<Vec<_>>(), [1, 2, 3]);

    let e = compute_standings(&t).into_iter().find(|r| r.player_id == ids[4]).unwrap();
    assert_eq!((e.points, e.wins), (3, 1));

    p1_wins_all(&mut t);
    let rows = compute_standings(&t);
    let top: Vec<_> = rows[..3].iter().map(|r| (r.name.as_str(), r.points)).collect();
    assert_eq!(top, [("A", 3), ("C", 3), ("E", 3)]);
}

#[test]
fn second_round_avoids_rematches_and_repeat_byes() {
    let (mut t, ids) = tournament_with_players(&["A", "B", "C", "D", "E"]);
    start_round(&mut t).unwrap();
    p1_wins_all(&mut t);
    assert_eq!(start_round(&mut t), Ok(RoundOutcome::Started(2)));

    let matches = &t.rounds[1].matches;
    // Order by points then name: A, C, E (3) then B, D (0). D is the lowest without a bye.
    assert_eq!((matches[0].p1, matches[0].p2), (ids[3], None));
    assert_eq!((matches[1].p1, matches[1].p2), (ids[0], Some(ids[2])));
    assert_eq!((matches[2].p1, matches[2].p2), (ids[4], Some(ids[1])));
    assert_eq!(matches.iter().map(|m| m.table).collect::<Vec<_>>(), [4, 5, 6]);
}

#[test]
fn rematch_allowed_when_no_fresh_opponent_remains() {
    let (mut t, ids) = tournament_with_players(&["A", "B"]);
    t.rounds.push(Round::new(1, vec![{
        let mut m = Match::new(1, ids[0], ids[1]);
        m.result = Some(MatchResult::P1);
        m
    }]));
    let matches = pair_swiss_round(&t);
    assert_eq!(matches.len(), 1);
    assert!(matches[0].pairs(ids[0], ids[1]));
    assert_eq!(matches[0].table, 2);
}

#[test]
fn dropped_players_are_not_paired() {
    let (mut t, ids) = tournament_with_players(&["A", "B", "C"]);
    t.get_player_mut(ids[1]).unwrap().dropped = true;
    let matches = pair_swiss_round(&t);
    assert_eq!(matches.len(), 1);
    assert!(matches[0].pairs(ids[0], ids[2]));
}

#[test]
fn odd_pool_without_bye_candidates_leaves_last_player_unpaired() {
    let (mut t, ids) = tournament_with_players(&["A", "B", "C"]);
    t.rounds.push(Round::new(
        1,
        vec![Match::bye(1, ids[0]), Match::bye(2, ids[1]), Match::bye(3, ids[2])],
    ));
    let matches = pair_swiss_round(&t);
    assert_eq!(matches.len(), 1);
    assert!(matches.iter().all(|m| !m.is_bye()));
    assert!(matches[0].pairs(ids[0], ids[1]));
}
