//! Integration tests for the round lifecycle: guards, scoring, confirmation, drops, finishing.

use card_tournament_web::{
    compute_standings, confirm_result, delete_round, finish_tournament, set_dropped, start_round,
    update_score, MatchId, MatchResult, PlayerId, RoundOutcome, Side, Tournament,
    TournamentError,
};

fn tournament_with_players(n: usize) -> (Tournament, Vec<PlayerId>) {
    let mut t = Tournament::new("rounds", "Rounds");
    let ids = (0..n).map(|i| t.add_player(&format!("P{i}")).unwrap()).collect();
    (t, ids)
}

/// Two players, round 1 started: returns the single match id.
fn started_pair() -> (Tournament, Vec<PlayerId>, MatchId) {
    let (mut t, ids) = tournament_with_players(2);
    start_round(&mut t).unwrap();
    let id = t.rounds[0].matches[0].id;
    (t, ids, id)
}

fn score(t: &mut Tournament, id: MatchId, p1: i32, p2: i32) {
    update_score(t, 1, id, Side::P1, p1).unwrap();
    update_score(t, 1, id, Side::P2, p2).unwrap();
}

#[test]
fn start_requires_two_active_players() {
    let (mut t, ids) = tournament_with_players(2);
    set_dropped(&mut t, ids[0], true).unwrap();
    assert_eq!(start_round(&mut t), Err(TournamentError::NotEnoughActivePlayers));
    assert!(t.rounds.is_empty());
}

#[test]
fn start_rejects_while_round_is_open() {
    let (mut t, _, id) = started_pair();
    let before = t.clone();
    assert_eq!(start_round(&mut t), Err(TournamentError::RoundInProgress));
    assert_eq!(t, before);

    score(&mut t, id, 2, 0);
    // Scored but not confirmed is still open.
    assert_eq!(start_round(&mut t), Err(TournamentError::RoundInProgress));
    confirm_result(&mut t, 1, id).unwrap();
    assert_eq!(start_round(&mut t), Ok(RoundOutcome::Started(2)));
}

#[test]
fn scores_are_clamped_and_leave_result_alone() {
    let (mut t, _, id) = started_pair();
    score(&mut t, id, 7, -2);
    let m = &t.rounds[0].matches[0];
    assert_eq!((m.p1_wins, m.p2_wins, m.result), (3, 0, None));
}

#[test]
fn confirmation_derives_result_from_scores() {
    let (mut t, _, id) = started_pair();
    score(&mut t, id, 0, 0);
    assert_eq!(confirm_result(&mut t, 1, id), Ok(None));
    assert!(t.rounds[0].is_open());
    score(&mut t, id, 1, 2);
    assert_eq!(confirm_result(&mut t, 1, id), Ok(Some(MatchResult::P2)));
    assert_eq!(t.rounds[0].matches[0].result, Some(MatchResult::P2));
    assert!(!t.rounds[0].is_open());
}

#[test]
fn draw_is_confirmed_even_when_draws_are_disallowed() {
    let (mut t, _, id) = started_pair();
    t.meta.draw_allowed = false;
    score(&mut t, id, 2, 2);
    assert_eq!(confirm_result(&mut t, 1, id), Ok(Some(MatchResult::Draw)));
}

#[test]
fn confirming_with_dropped_opponent_forces_forfeit() {
    let (mut t, ids, id) = started_pair();
    score(&mut t, id, 3, 0);
    t.get_player_mut(ids[0]).unwrap().dropped = true;
    assert_eq!(confirm_result(&mut t, 1, id), Ok(Some(MatchResult::P2)));
    let m = &t.rounds[0].matches[0];
    assert_eq!((m.p1_wins, m.p2_wins), (0, 2));
}

#[test]
fn confirming_drop_vs_drop_records_zero_zero_draw() {
    let (mut t, ids, id) = started_pair();
    for p in &ids {
        t.get_player_mut(*p).unwrap().dropped = true;
    }
    assert_eq!(confirm_result(&mut t, 1, id), Ok(Some(MatchResult::Draw)));
    let m = &t.rounds[0].matches[0];
    assert_eq!((m.p1_wins, m.p2_wins), (0, 0));
    // Scored as two losses, not a draw.
    assert!(compute_standings(&t).iter().all(|r| r.losses == 1 && r.points == 0));
}

#[test]
fn dropping_resolves_pending_match_for_opponent() {
    let (mut t, ids, _) = started_pair();
    let p1 = t.rounds[0].matches[0].p1;
    let p2 = t.rounds[0].matches[0].p2.unwrap();
    set_dropped(&mut t, p2, true).unwrap();
    let m = &t.rounds[0].matches[0];
    assert_eq!((m.result, m.p1_wins, m.p2_wins), (Some(MatchResult::P1), 2, 0));
    assert!(!t.rounds[0].is_open());

    // Reinstating does not undo the forced result.
    set_dropped(&mut t, p2, false).unwrap();
    assert_eq!(t.rounds[0].matches[0].result, Some(MatchResult::P1));
    assert!(!t.is_dropped(p2));
    assert!(ids.contains(&p1));
}

#[test]
fn dropping_the_first_seat_awards_the_match_to_the_second() {
    let (mut t, _, id) = started_pair();
    score(&mut t, id, 1, 0);
    let p1 = t.rounds[0].matches[0].p1;
    set_dropped(&mut t, p1, true).unwrap();
    let m = &t.rounds[0].matches[0];
    assert_eq!((m.result, m.p1_wins, m.p2_wins), (Some(MatchResult::P2), 0, 2));
    assert!(!t.rounds[0].is_open());
    let loser = compute_standings(&t).into_iter().find(|r| r.player_id == p1).unwrap();
    assert_eq!((loser.losses, loser.points, loser.dropped), (1, 0, true));
}

#[test]
fn dropping_leaves_confirmed_results_alone() {
    let (mut t, _, id) = started_pair();
    score(&mut t, id, 0, 2);
    confirm_result(&mut t, 1, id).unwrap();
    let p1 = t.rounds[0].matches[0].p1;
    set_dropped(&mut t, p1, true).unwrap();
    let m = &t.rounds[0].matches[0];
    assert_eq!((m.result, m.p1_wins, m.p2_wins), (Some(MatchResult::P2), 0, 2));
}

#[test]
fn scores_cannot_change_after_round_closes() {
    let (mut t, _, id) = started_pair();
    score(&mut t, id, 2, 1);
    confirm_result(&mut t, 1, id).unwrap();
    assert_eq!(
        update_score(&mut t, 1, id, Side::P1, 0),
        Err(TournamentError::RoundClosed(1))
    );
    assert_eq!(
        update_score(&mut t, 9, id, Side::P1, 0),
        Err(TournamentError::RoundNotFound(9))
    );
}

#[test]
fn unknown_match_is_rejected() {
    let (mut t, _, _) = started_pair();
    let missing = uuid::Uuid::new_v4();
    assert_eq!(
        confirm_result(&mut t, 1, missing),
        Err(TournamentError::MatchNotFound(missing))
    );
}

#[test]
fn only_the_last_round_can_be_deleted() {
    let (mut t, _, id) = started_pair();
    score(&mut t, id, 2, 0);
    confirm_result(&mut t, 1, id).unwrap();
    start_round(&mut t).unwrap();
    let first = t.rounds[0].clone();

    assert_eq!(delete_round(&mut t, 1), Err(TournamentError::NotLastRound { requested: 1 }));
    assert_eq!(t.rounds.len(), 2);
    delete_round(&mut t, 2).unwrap();
    assert_eq!(t.rounds.len(), 1);
    assert_eq!(t.rounds[0], first);
    delete_round(&mut t, 1).unwrap();
    assert!(t.rounds.is_empty());
    assert_eq!(delete_round(&mut t, 1), Err(TournamentError::NotLastRound { requested: 1 }));
}

#[test]
fn finish_requires_every_result() {
    let (mut t, _, id) = started_pair();
    assert_eq!(finish_tournament(&mut t), Err(TournamentError::IncompleteResults));
    assert!(!t.finished);
    score(&mut t, id, 2, 0);
    confirm_result(&mut t, 1, id).unwrap();
    finish_tournament(&mut t).unwrap();
    assert!(t.finished);
}

#[test]
fn new_round_reopens_a_finished_swiss_tournament() {
    let (mut t, _, id) = started_pair();
    score(&mut t, id, 2, 0);
    confirm_result(&mut t, 1, id).unwrap();
    finish_tournament(&mut t).unwrap();
    start_round(&mut t).unwrap();
    assert!(!t.finished);
}
