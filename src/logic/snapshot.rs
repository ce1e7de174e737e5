//! Snapshot import/export (JSON) and human-readable reports.

use crate::logic::standings::compute_standings;
use crate::models::{MatchResult, PlayerId, Tournament, TournamentError, MAX_GAME_WINS};
use std::collections::HashSet;
use std::fmt::Write as _;

/// Errors while rendering an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV export failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Full tournament as pretty JSON.
pub fn export_snapshot(tournament: &Tournament) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(tournament)?)
}

/// Parse and validate a snapshot. Nothing is returned unless the whole graph is consistent.
pub fn import_snapshot(json: &str) -> Result<Tournament, TournamentError> {
    let tournament: Tournament = serde_json::from_str(json).map_err(|e| {
        log::warn!("Rejected snapshot: {e}");
        TournamentError::MalformedSnapshot(e.to_string())
    })?;
    validate(&tournament).inspect_err(|e| log::warn!("Rejected snapshot: {e}"))?;
    Ok(tournament)
}

fn malformed(msg: impl Into<String>) -> TournamentError {
    TournamentError::MalformedSnapshot(msg.into())
}

fn validate(tournament: &Tournament) -> Result<(), TournamentError> {
    if tournament.slug.trim().is_empty() {
        return Err(malformed("missing slug"));
    }
    let mut ids: HashSet<PlayerId> = HashSet::new();
    for p in &tournament.players {
        if !ids.insert(p.id) {
            return Err(malformed(format!("duplicate player id {}", p.id)));
        }
    }

    let mut tables = HashSet::new();
    for (i, round) in tournament.rounds.iter().enumerate() {
        if round.number as usize != i + 1 {
            return Err(malformed(format!(
                "round numbers must run 1..n without gaps (found {} at position {})",
                round.number,
                i + 1
            )));
        }
        for m in &round.matches {
            if !ids.contains(&m.p1) {
                return Err(malformed(format!("unknown player {} in round {}", m.p1, round.number)));
            }
            if m.p1_wins > MAX_GAME_WINS || m.p2_wins > MAX_GAME_WINS {
                return Err(malformed(format!("score out of range at table {}", m.table)));
            }
            if !tables.insert(m.table) {
                return Err(malformed(format!("table {} used twice", m.table)));
            }
            match m.p2 {
                None if m.result != Some(MatchResult::Bye) => {
                    return Err(malformed(format!("bye at table {} without BYE result", m.table)));
                }
                Some(p2) if !ids.contains(&p2) => {
                    return Err(malformed(format!("unknown player {p2} in round {}", round.number)));
                }
                Some(p2) if p2 == m.p1 => {
                    return Err(malformed(format!(
                        "player paired with themselves at table {}",
                        m.table
                    )));
                }
                Some(_) if m.result == Some(MatchResult::Bye) => {
                    return Err(malformed(format!(
                        "BYE result with an opponent at table {}",
                        m.table
                    )));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Standings as CSV: rank, name, points, record, byes, OMW% and drop flag.
pub fn standings_csv(tournament: &Tournament) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "rank", "name", "points", "wins", "draws", "losses", "byes", "omw_pct", "dropped",
    ])?;
    for row in compute_standings(tournament) {
        wtr.write_record([
            row.rank.to_string(),
            row.name,
            row.points.to_string(),
            row.wins.to_string(),
            row.draws.to_string(),
            row.losses.to_string(),
            row.byes.to_string(),
            format!("{:.1}", row.omw * 100.0),
            row.dropped.to_string(),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn result_label(result: Option<MatchResult>) -> &'static str {
    match result {
        Some(MatchResult::P1) => "P1",
        Some(MatchResult::P2) => "P2",
        Some(MatchResult::Draw) => "DRAW",
        Some(MatchResult::Bye) => "BYE",
        None => "pending",
    }
}

/// Plain-text report: every round's tables, then the standings.
pub fn rounds_report(tournament: &Tournament) -> String {
    let name_of = |id: PlayerId| {
        tournament.get_player(id).map_or_else(
            || "?".to_string(),
            |p| {
                if p.dropped {
                    format!("{} (Drop)", p.name)
                } else {
                    p.name.clone()
                }
            },
        )
    };

    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", tournament.meta.name, tournament.meta.date);
    let _ = writeln!(
        out,
        "Rounds: {} / {}{}",
        tournament.rounds.len(),
        tournament.effective_max_rounds(),
        if tournament.finished { " - finished" } else { "" }
    );

    for round in &tournament.rounds {
        let _ = writeln!(out, "\nRound {}", round.number);
        for m in &round.matches {
            match m.p2 {
                Some(p2) => {
                    let _ = writeln!(
                        out,
                        "  Table {:>3}: {} vs {}  {}-{}  [{}]",
                        m.table,
                        name_of(m.p1),
                        name_of(p2),
                        m.p1_wins,
                        m.p2_wins,
                        result_label(m.result)
                    );
                }
                None => {
                    let _ = writeln!(out, "  Table {:>3}: {} - BYE", m.table, name_of(m.p1));
                }
            }
        }
    }

    let _ = writeln!(out, "\nStandings");
    for row in compute_standings(tournament) {
        let _ = writeln!(
            out,
            "  {:>3}. {}{}  {} pts  {}-{}-{}  OMW {:.1}%",
            row.rank,
            row.name,
            if row.dropped { " (Drop)" } else { "" },
            row.points,
            row.wins,
            row.draws,
            row.losses,
            row.omw * 100.0
        );
    }
    out
}
