//! Setup: tournament keys, templates, and bulk player import.

use crate::models::{
    PairingSystem, PointsSystem, Tiebreaker, Tournament, TournamentError, TournamentMeta,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Derive a store key from a display name: lowercase, no diacritics,
/// non-alphanumeric runs collapsed to `-`, no leading or trailing `-`.
/// Names with nothing left after that map to `tournament`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("tournament");
    }
    slug
}

/// Configuration a template applies on top of the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// None is "auto".
    pub max_rounds: Option<u32>,
    pub points_system: PointsSystem,
    pub tiebreakers: Vec<Tiebreaker>,
    pub draw_allowed: bool,
}

/// A named tournament preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub system: PairingSystem,
    /// False for built-in templates.
    #[serde(default)]
    pub editable: bool,
    pub config: TemplateConfig,
}

/// The templates shipped with the application.
pub fn builtin_templates() -> Vec<Template> {
    let swiss = |id: &str, name: &str, description: &str, max_rounds| Template {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        system: PairingSystem::Swiss,
        editable: false,
        config: TemplateConfig {
            max_rounds: Some(max_rounds),
            points_system: PointsSystem::default(),
            tiebreakers: Tiebreaker::default_chain(),
            draw_allowed: true,
        },
    };
    vec![
        swiss(
            "swiss_standard",
            "Swiss Standard",
            "Standard Swiss tournament (3 points per win, 1 per draw)",
            5,
        ),
        swiss(
            "myl_championship",
            "MYL Championship",
            "Official MYL tournament format (3-1-0)",
            6,
        ),
        Template {
            id: "elimination".to_string(),
            name: "Single Elimination".to_string(),
            description: "Single elimination bracket (no draws)".to_string(),
            system: PairingSystem::Elimination,
            editable: false,
            config: TemplateConfig {
                max_rounds: None,
                points_system: PointsSystem {
                    win: 1,
                    draw: 0,
                    loss: 0,
                    bye: 1,
                },
                tiebreakers: vec![Tiebreaker::Wins],
                draw_allowed: false,
            },
        },
    ]
}

/// Built-in templates followed by user-defined ones.
#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    custom: Vec<Template>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Vec<Template> {
        builtin_templates()
            .into_iter()
            .chain(self.custom.iter().cloned())
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Template> {
        self.list().into_iter().find(|t| t.id == id)
    }

    fn is_builtin(id: &str) -> bool {
        builtin_templates().iter().any(|t| t.id == id)
    }

    /// Save a custom template, replacing one with the same id. Missing ids are generated.
    pub fn save(&mut self, mut template: Template) -> Result<Template, TournamentError> {
        if Self::is_builtin(&template.id) {
            return Err(TournamentError::TemplateReadOnly(template.id));
        }
        if template.id.is_empty() {
            template.id = format!("template_{}", uuid::Uuid::new_v4().simple());
        }
        template.editable = true;
        self.custom.retain(|t| t.id != template.id);
        self.custom.push(template.clone());
        Ok(template)
    }

    pub fn delete(&mut self, id: &str) -> Result<(), TournamentError> {
        if Self::is_builtin(id) {
            return Err(TournamentError::TemplateReadOnly(id.to_string()));
        }
        let before = self.custom.len();
        self.custom.retain(|t| t.id != id);
        if self.custom.len() == before {
            return Err(TournamentError::TemplateNotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Create an empty tournament dated today, with the template's configuration if given.
pub fn create_from_template(name: &str, template: Option<&Template>) -> Tournament {
    let name = if name.trim().is_empty() { "Tournament" } else { name.trim() };
    let mut meta = TournamentMeta::new(name, Utc::now().date_naive());
    if let Some(template) = template {
        meta.max_rounds = template.config.max_rounds;
        meta.points_system = template.config.points_system;
        meta.tiebreakers = template.config.tiebreakers.clone();
        meta.draw_allowed = template.config.draw_allowed;
        meta.system = template.system;
        meta.template_id = Some(template.id.clone());
        meta.template_name = Some(template.name.clone());
    }
    Tournament::with_meta(slugify(name), meta)
}

/// Outcome of a bulk player import.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct BulkAddReport {
    pub added: usize,
    pub skipped_duplicates: usize,
}

/// Add players from pasted text or a CSV/TXT file.
///
/// Entries are separated by newlines, commas or semicolons; a trailing ranking number
/// ("Alice 12", "Bob-3") is removed. Names already present are skipped.
pub fn add_players_from_text(tournament: &mut Tournament, text: &str) -> BulkAddReport {
    let mut report = BulkAddReport::default();
    let mut seen: HashSet<String> = tournament
        .players
        .iter()
        .map(|p| p.name.to_lowercase())
        .collect();

    let entries = text
        .split(['\n', ',', ';'])
        .map(|entry| strip_ranking_suffix(&entry.replace('\t', " ")).to_string())
        .filter(|entry| !entry.is_empty());

    for name in entries {
        if !seen.insert(name.to_lowercase()) {
            report.skipped_duplicates += 1;
            continue;
        }
        match tournament.add_player(&name) {
            Ok(_) => report.added += 1,
            Err(_) => report.skipped_duplicates += 1,
        }
    }
    log::info!(
        "Tournament {}: bulk import added {} players, skipped {}",
        tournament.slug,
        report.added,
        report.skipped_duplicates
    );
    report
}

/// "Alice 12" -> "Alice", "Bob-3" -> "Bob"; a bare number is kept.
fn strip_ranking_suffix(entry: &str) -> &str {
    let entry = entry.trim();
    let without_digits = entry.trim_end_matches(|c: char| c.is_ascii_digit());
    if without_digits.len() == entry.len() {
        return entry;
    }
    let stripped = without_digits.trim_end_matches(|c: char| c.is_whitespace() || c == '-');
    if stripped.len() == without_digits.len() || stripped.is_empty() {
        return entry;
    }
    stripped.trim()
}
