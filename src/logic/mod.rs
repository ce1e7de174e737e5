//! Tournament business logic: standings, pairing engines, round lifecycle, setup and snapshots.

mod elimination;
mod rounds;
mod setup;
mod snapshot;
mod standings;
mod swiss;

pub use elimination::{pair_elimination_round, pair_elimination_round_with_rng};
pub use rounds::{
    confirm_result, delete_round, finish_tournament, set_dropped, start_round,
    start_round_with_rng, update_score, RoundOutcome,
};
pub use setup::{
    add_players_from_text, builtin_templates, create_from_template, slugify, BulkAddReport,
    Template, TemplateConfig, TemplateRegistry,
};
pub use snapshot::{export_snapshot, import_snapshot, rounds_report, standings_csv, ExportError};
pub use standings::{compare_names, compute_standings, StandingRow};
pub use swiss::pair_swiss_round;
