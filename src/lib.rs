//! Card game tournament organizer: library with models, pairing logic and storage.

pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    add_players_from_text, builtin_templates, compute_standings, confirm_result,
    create_from_template, delete_round, export_snapshot, finish_tournament, import_snapshot,
    pair_elimination_round, pair_elimination_round_with_rng, pair_swiss_round, rounds_report,
    set_dropped, slugify, standings_csv, start_round, start_round_with_rng, update_score,
    BulkAddReport, ExportError, RoundOutcome, StandingRow, Template, TemplateConfig,
    TemplateRegistry,
};
pub use models::{
    Match, MatchId, MatchResult, PairingSystem, Player, PlayerId, PointsSystem, Round, Side,
    Tiebreaker, Tournament, TournamentError, TournamentMeta, TournamentSummary,
};
pub use store::{MemoryStore, TournamentStore, DEFAULT_RETENTION_DAYS};
