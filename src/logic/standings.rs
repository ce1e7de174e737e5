//! Standings: per-player record and rank, derived from the whole match history.
//!
//! Always recomputed from `players` and `rounds`; nothing here is cached on the tournament.

use crate::models::{MatchResult, PlayerId, PointsSystem, Tiebreaker, Tournament};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// One row of the standings table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StandingRow {
    /// 1-based position after sorting.
    pub rank: usize,
    pub player_id: PlayerId,
    pub name: String,
    pub points: i32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub byes: u32,
    /// Match-win fraction in [0, 1].
    pub mw: f64,
    /// Mean match-win fraction of distinct opponents.
    pub omw: f64,
    pub opponents: usize,
    pub dropped: bool,
}

#[derive(Default)]
struct Record {
    points: i32,
    wins: u32,
    draws: u32,
    losses: u32,
    byes: u32,
    opponents: HashSet<PlayerId>,
}

impl Record {
    fn win(&mut self, points: &PointsSystem) {
        self.points += points.win;
        self.wins += 1;
    }

    fn loss(&mut self, points: &PointsSystem) {
        self.points += points.loss;
        self.losses += 1;
    }

    fn draw(&mut self, points: &PointsSystem) {
        self.points += points.draw;
        self.draws += 1;
    }

    fn match_win(&self) -> f64 {
        let played = self.wins + self.draws + self.losses;
        if played == 0 {
            return 0.0;
        }
        (f64::from(self.wins) + 0.5 * f64::from(self.draws)) / f64::from(played)
    }
}

/// Compute the ranked standings for every player, dropped ones included.
///
/// 1. Byes credit `BYE` points and a win, and create no opponent link.
/// 2. Every other match links both players as opponents; unconfirmed matches stop there.
/// 3. A dropped player loses to a non-dropped one whatever the recorded score;
///    two dropped players both take a loss and no points.
/// 4. Rows are ordered by the configured tiebreakers; `name` ends the chain.
pub fn compute_standings(tournament: &Tournament) -> Vec<StandingRow> {
    let points = &tournament.meta.points_system;
    let mut records: HashMap<PlayerId, Record> = tournament
        .players
        .iter()
        .map(|p| (p.id, Record::default()))
        .collect();

    for m in tournament.matches() {
        let Some(p2) = m.p2 else {
            if m.result == Some(MatchResult::Bye) {
                if let Some(a) = records.get_mut(&m.p1) {
                    a.points += points.bye;
                    a.wins += 1;
                    a.byes += 1;
                }
            }
            continue;
        };
        if !records.contains_key(&m.p1) || !records.contains_key(&p2) {
            continue;
        }
        if let Some(a) = records.get_mut(&m.p1) {
            a.opponents.insert(p2);
        }
        if let Some(b) = records.get_mut(&p2) {
            b.opponents.insert(m.p1);
        }
        let Some(result) = m.result else {
            continue;
        };

        let (a_dropped, b_dropped) = (tournament.is_dropped(m.p1), tournament.is_dropped(p2));
        let (winner, loser) = match (a_dropped, b_dropped, result) {
            (true, true, _) => {
                for id in [m.p1, p2] {
                    if let Some(r) = records.get_mut(&id) {
                        r.losses += 1;
                    }
                }
                continue;
            }
            (true, false, _) => (p2, m.p1),
            (false, true, _) => (m.p1, p2),
            (false, false, MatchResult::P1) => (m.p1, p2),
            (false, false, MatchResult::P2) => (p2, m.p1),
            (false, false, MatchResult::Draw) => {
                for id in [m.p1, p2] {
                    if let Some(r) = records.get_mut(&id) {
                        r.draw(points);
                    }
                }
                continue;
            }
            // A bye marker on a two-player match carries no score.
            (false, false, MatchResult::Bye) => continue,
        };
        if let Some(r) = records.get_mut(&winner) {
            r.win(points);
        }
        if let Some(r) = records.get_mut(&loser) {
            r.loss(points);
        }
    }

    let mw: HashMap<PlayerId, f64> = records.iter().map(|(id, r)| (*id, r.match_win())).collect();

    let mut rows: Vec<StandingRow> = tournament
        .players
        .iter()
        .map(|p| {
            let r = &records[&p.id];
            let omw = if r.opponents.is_empty() {
                0.0
            } else {
                r.opponents.iter().map(|o| mw.get(o).copied().unwrap_or(0.0)).sum::<f64>()
                    / r.opponents.len() as f64
            };
            StandingRow {
                rank: 0,
                player_id: p.id,
                name: p.name.clone(),
                points: r.points,
                wins: r.wins,
                draws: r.draws,
                losses: r.losses,
                byes: r.byes,
                mw: mw[&p.id],
                omw,
                opponents: r.opponents.len(),
                dropped: p.dropped,
            }
        })
        .collect();

    let chain = &tournament.meta.tiebreakers;
    rows.sort_by(|a, b| compare_rows(a, b, chain));
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

fn compare_rows(a: &StandingRow, b: &StandingRow, chain: &[Tiebreaker]) -> Ordering {
    for criterion in chain {
        let ord = match criterion {
            Tiebreaker::Points => b.points.cmp(&a.points),
            Tiebreaker::Omw => b.omw.total_cmp(&a.omw),
            Tiebreaker::Wins => b.wins.cmp(&a.wins),
            Tiebreaker::Name => return compare_names(&a.name, &b.name),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Human-order name comparison: accents and case are ignored first, then the raw strings decide.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
