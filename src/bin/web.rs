//! Single binary web server: JSON REST API over the tournament engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080), RETENTION_DAYS (e.g. 60).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use card_tournament_web::{
    add_players_from_text, compute_standings, confirm_result, create_from_template, delete_round,
    export_snapshot, finish_tournament, import_snapshot, rounds_report, set_dropped,
    standings_csv, start_round, update_score, MatchId, MemoryStore, PlayerId, RoundOutcome, Side,
    Template, TemplateRegistry, Tournament, TournamentError, TournamentMeta, TournamentStore,
    DEFAULT_RETENTION_DAYS,
};
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;

/// Shared state: tournaments by slug plus the template registry.
struct AppState {
    store: RwLock<MemoryStore>,
    templates: RwLock<TemplateRegistry>,
}

type State = Data<AppState>;

/// How often expired tournaments are purged.
const PURGE_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    template_id: Option<String>,
}

#[derive(Deserialize)]
struct PlayerNameBody {
    name: String,
}

#[derive(Deserialize)]
struct BulkPlayersBody {
    text: String,
}

#[derive(Deserialize)]
struct DroppedBody {
    dropped: bool,
}

#[derive(Deserialize)]
struct ScoreBody {
    side: Side,
    value: i32,
}

/// Path segment: tournament slug (e.g. /api/tournaments/{slug})
#[derive(Deserialize)]
struct TournamentPath {
    slug: String,
}

#[derive(Deserialize)]
struct PlayerPath {
    slug: String,
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct RoundPath {
    slug: String,
    number: u32,
}

#[derive(Deserialize)]
struct MatchPath {
    slug: String,
    number: u32,
    match_id: MatchId,
}

#[derive(Deserialize)]
struct TemplatePath {
    id: String,
}

fn error_json(msg: impl std::fmt::Display) -> serde_json::Value {
    serde_json::json!({ "error": msg.to_string() })
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(error_json("No tournament"))
}

/// Read-modify-write one tournament. `f` works on a copy; the store is only
/// updated when it succeeds, so a rejected operation leaves the saved state alone.
fn mutate<F>(state: &State, slug: &str, f: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament) -> Result<(), TournamentError>,
{
    mutate_with(state, slug, f, |t, ()| HttpResponse::Ok().json(t))
}

/// Like `mutate`, but `render` also sees what the operation returned.
fn mutate_with<T, F, R>(state: &State, slug: &str, f: F, render: R) -> HttpResponse
where
    F: FnOnce(&mut Tournament) -> Result<T, TournamentError>,
    R: FnOnce(&Tournament, T) -> HttpResponse,
{
    let mut store = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let Some(mut t) = store.get(slug) else {
        return not_found();
    };
    match f(&mut t) {
        Ok(value) => {
            store.save(&mut t);
            render(&t, value)
        }
        Err(e) => HttpResponse::BadRequest().json(error_json(e)),
    }
}

/// Read one tournament and render a response from it.
fn view<F>(state: &State, slug: &str, f: F) -> HttpResponse
where
    F: FnOnce(&Tournament) -> HttpResponse,
{
    let store = match state.store.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match store.get(slug) {
        Some(t) => f(&t),
        None => not_found(),
    }
}

/// Insert a new tournament; 409 if its slug is taken.
fn insert_new(state: &State, mut t: Tournament) -> HttpResponse {
    let mut store = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if store.contains(&t.slug) {
        return HttpResponse::Conflict().json(error_json(format!(
            "A tournament with key '{}' already exists",
            t.slug
        )));
    }
    store.save(&mut t);
    log::info!("Created tournament {}", t.slug);
    HttpResponse::Ok().json(&t)
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "card-tournament-web",
    })
}

#[get("/api/templates")]
async fn api_list_templates(state: State) -> HttpResponse {
    match state.templates.read() {
        Ok(g) => HttpResponse::Ok().json(g.list()),
        Err(_) => lock_error(),
    }
}

#[post("/api/templates")]
async fn api_save_template(state: State, body: Json<Template>) -> HttpResponse {
    let mut g = match state.templates.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.save(body.into_inner()) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(error_json(e)),
    }
}

#[delete("/api/templates/{id}")]
async fn api_delete_template(state: State, path: Path<TemplatePath>) -> HttpResponse {
    let mut g = match state.templates.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.delete(&path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => HttpResponse::BadRequest().json(error_json(e)),
    }
}

/// List tournaments, most recently updated first.
#[get("/api/tournaments")]
async fn api_list_tournaments(state: State) -> HttpResponse {
    match state.store.read() {
        Ok(g) => HttpResponse::Ok().json(g.list()),
        Err(_) => lock_error(),
    }
}

/// Create an empty tournament, optionally from a template.
#[post("/api/tournaments")]
async fn api_create_tournament(state: State, body: Json<CreateTournamentBody>) -> HttpResponse {
    let template = match &body.template_id {
        Some(id) => {
            let g = match state.templates.read() {
                Ok(guard) => guard,
                Err(_) => return lock_error(),
            };
            match g.get(id) {
                Some(t) => Some(t),
                None => {
                    return HttpResponse::BadRequest()
                        .json(error_json(TournamentError::TemplateNotFound(id.clone())))
                }
            }
        }
        None => None,
    };
    insert_new(&state, create_from_template(&body.name, template.as_ref()))
}

/// Import a snapshot as a new tournament.
#[post("/api/tournaments/import")]
async fn api_import_tournament(state: State, body: String) -> HttpResponse {
    match import_snapshot(&body) {
        Ok(t) => insert_new(&state, t),
        Err(e) => HttpResponse::BadRequest().json(error_json(e)),
    }
}

#[get("/api/tournaments/{slug}")]
async fn api_get_tournament(state: State, path: Path<TournamentPath>) -> HttpResponse {
    view(&state, &path.slug, |t| HttpResponse::Ok().json(t))
}

#[delete("/api/tournaments/{slug}")]
async fn api_delete_tournament(state: State, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.store.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if g.delete(&path.slug) {
        log::info!("Deleted tournament {}", path.slug);
        HttpResponse::NoContent().finish()
    } else {
        not_found()
    }
}

/// Replace a tournament's state with a snapshot (kept under the same key).
#[put("/api/tournaments/{slug}/snapshot")]
async fn api_replace_snapshot(
    state: State,
    path: Path<TournamentPath>,
    body: String,
) -> HttpResponse {
    let imported = match import_snapshot(&body) {
        Ok(t) => t,
        Err(e) => return HttpResponse::BadRequest().json(error_json(e)),
    };
    mutate(&state, &path.slug, move |t| {
        let slug = std::mem::take(&mut t.slug);
        *t = Tournament { slug, ..imported };
        Ok(())
    })
}

#[get("/api/tournaments/{slug}/export/json")]
async fn api_export_json(state: State, path: Path<TournamentPath>) -> HttpResponse {
    view(&state, &path.slug, |t| match export_snapshot(t) {
        Ok(body) => HttpResponse::Ok()
            .content_type("application/json")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}.json\"", t.slug),
            ))
            .body(body),
        Err(e) => HttpResponse::InternalServerError().json(error_json(e)),
    })
}

#[get("/api/tournaments/{slug}/export/standings.csv")]
async fn api_export_csv(state: State, path: Path<TournamentPath>) -> HttpResponse {
    view(&state, &path.slug, |t| match standings_csv(t) {
        Ok(body) => HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(body),
        Err(e) => HttpResponse::InternalServerError().json(error_json(e)),
    })
}

#[get("/api/tournaments/{slug}/export/report")]
async fn api_export_report(state: State, path: Path<TournamentPath>) -> HttpResponse {
    view(&state, &path.slug, |t| {
        HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(rounds_report(t))
    })
}

#[get("/api/tournaments/{slug}/standings")]
async fn api_standings(state: State, path: Path<TournamentPath>) -> HttpResponse {
    view(&state, &path.slug, |t| HttpResponse::Ok().json(compute_standings(t)))
}

#[put("/api/tournaments/{slug}/meta")]
async fn api_set_meta(
    state: State,
    path: Path<TournamentPath>,
    body: Json<TournamentMeta>,
) -> HttpResponse {
    let meta = body.into_inner();
    mutate(&state, &path.slug, move |t| {
        t.set_meta(meta);
        Ok(())
    })
}

#[post("/api/tournaments/{slug}/players")]
async fn api_add_player(
    state: State,
    path: Path<TournamentPath>,
    body: Json<PlayerNameBody>,
) -> HttpResponse {
    mutate(&state, &path.slug, |t| t.add_player(&body.name).map(|_| ()))
}

/// Bulk add from pasted text or CSV contents; duplicates are skipped.
/// Responds with the tournament and the added/skipped counts.
#[post("/api/tournaments/{slug}/players/bulk")]
async fn api_bulk_add_players(
    state: State,
    path: Path<TournamentPath>,
    body: Json<BulkPlayersBody>,
) -> HttpResponse {
    mutate_with(
        &state,
        &path.slug,
        |t| Ok(add_players_from_text(t, &body.text)),
        |t, report| {
            HttpResponse::Ok().json(serde_json::json!({ "tournament": t, "report": report }))
        },
    )
}

#[put("/api/tournaments/{slug}/players/{player_id}/name")]
async fn api_rename_player(
    state: State,
    path: Path<PlayerPath>,
    body: Json<PlayerNameBody>,
) -> HttpResponse {
    mutate(&state, &path.slug, |t| t.rename_player(path.player_id, &body.name))
}

#[delete("/api/tournaments/{slug}/players/{player_id}")]
async fn api_remove_player(state: State, path: Path<PlayerPath>) -> HttpResponse {
    mutate(&state, &path.slug, |t| t.remove_player(path.player_id))
}

/// Drop or reinstate a player.
#[put("/api/tournaments/{slug}/players/{player_id}/dropped")]
async fn api_set_dropped(
    state: State,
    path: Path<PlayerPath>,
    body: Json<DroppedBody>,
) -> HttpResponse {
    mutate(&state, &path.slug, |t| set_dropped(t, path.player_id, body.dropped))
}

/// Start the next round (or finish an elimination bracket that has a winner).
#[post("/api/tournaments/{slug}/rounds")]
async fn api_start_round(state: State, path: Path<TournamentPath>) -> HttpResponse {
    mutate(&state, &path.slug, |t| {
        if start_round(t)? == RoundOutcome::Decided {
            log::info!("Tournament {} has a winner", t.slug);
        }
        Ok(())
    })
}

#[delete("/api/tournaments/{slug}/rounds/{number}")]
async fn api_delete_round(state: State, path: Path<RoundPath>) -> HttpResponse {
    mutate(&state, &path.slug, |t| delete_round(t, path.number))
}

#[put("/api/tournaments/{slug}/rounds/{number}/matches/{match_id}/score")]
async fn api_update_score(
    state: State,
    path: Path<MatchPath>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    mutate(&state, &path.slug, |t| {
        update_score(t, path.number, path.match_id, body.side, body.value)
    })
}

#[post("/api/tournaments/{slug}/rounds/{number}/matches/{match_id}/confirm")]
async fn api_confirm_result(state: State, path: Path<MatchPath>) -> HttpResponse {
    mutate(&state, &path.slug, |t| {
        confirm_result(t, path.number, path.match_id).map(|_| ())
    })
}

#[post("/api/tournaments/{slug}/finish")]
async fn api_finish(state: State, path: Path<TournamentPath>) -> HttpResponse {
    mutate(&state, &path.slug, finish_tournament)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let retention_days: i64 = std::env::var("RETENTION_DAYS")
        .ok()
        .and_then(|d| d.parse().ok())
        .filter(|d| *d > 0)
        .unwrap_or(DEFAULT_RETENTION_DAYS);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(AppState {
        store: RwLock::new(MemoryStore::with_retention(chrono::Duration::days(retention_days))),
        templates: RwLock::new(TemplateRegistry::new()),
    });

    // Background task: every 30 minutes, remove tournaments past the retention window
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.store.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            g.purge_expired(chrono::Utc::now());
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_list_templates)
            .service(api_save_template)
            .service(api_delete_template)
            .service(api_list_tournaments)
            .service(api_create_tournament)
            .service(api_import_tournament)
            .service(api_get_tournament)
            .service(api_delete_tournament)
            .service(api_replace_snapshot)
            .service(api_export_json)
            .service(api_export_csv)
            .service(api_export_report)
            .service(api_standings)
            .service(api_set_meta)
            .service(api_add_player)
            .service(api_bulk_add_players)
            .service(api_rename_player)
            .service(api_remove_player)
            .service(api_set_dropped)
            .service(api_start_round)
            .service(api_delete_round)
            .service(api_update_score)
            .service(api_confirm_result)
            .service(api_finish)
    })
    .bind(bind)?
    .run()
    .await
}
