//! Single binary web server: fixture generation, standings and login lockout over a JSON API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Lockout policy env: MAX_LOGIN_ATTEMPTS, LOGIN_WINDOW_MINUTES, LOCKOUT_DURATION_MINUTES,
//! UNLOCK_CODE_EXPIRES_MINUTES, SECURITY_LOG_RETENTION_DAYS.

use actix_web::{
    get, post,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use campeonato_web::{
    approved, compute_standings, fixture_csv, generate_group_stage, generate_knockout,
    generate_league, logic::DEFAULT_SCORER_LIMIT, standings_csv, top_scorers, AttemptOutcome,
    GoalEvent, InMemoryLockoutStore, LockoutError, LockoutPolicy, LogNotifier,
    LoginLockoutTracker, MatchResult, ScheduleParameters, ScheduledMatch, Team,
};
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;

type Tracker = LoginLockoutTracker<InMemoryLockoutStore, LogNotifier>;
type AppState = Data<Tracker>;

/// How often old login attempt records are purged.
const PURGE_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct FixtureBody {
    teams: Vec<Team>,
    params: ScheduleParameters,
}

#[derive(Deserialize)]
struct GroupStageBody {
    teams: Vec<Team>,
    params: ScheduleParameters,
    #[serde(default = "default_group_count")]
    group_count: usize,
}

fn default_group_count() -> usize {
    4
}

#[derive(Deserialize)]
struct FixtureCsvBody {
    teams: Vec<Team>,
    matches: Vec<ScheduledMatch>,
}

#[derive(Deserialize)]
struct StandingsBody {
    teams: Vec<Team>,
    results: Vec<MatchResult>,
}

#[derive(Deserialize)]
struct ScorersBody {
    goals: Vec<GoalEvent>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct AttemptBody {
    account: String,
    success: bool,
}

#[derive(Deserialize)]
struct UnlockBody {
    account: String,
    code: String,
}

#[derive(Deserialize)]
struct ResendBody {
    account: String,
}

/// Path segment: account key (e.g. /api/auth/lock-status/{account})
#[derive(Deserialize)]
struct AccountPath {
    account: String,
}

fn bad_request(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn lockout_error_response(e: LockoutError) -> HttpResponse {
    match e {
        LockoutError::AccountLocked {
            locked_until,
            remaining_minutes,
        } => HttpResponse::Locked().json(serde_json::json!({
            "error": e.to_string(),
            "locked_until": locked_until,
            "remaining_minutes": remaining_minutes,
        })),
        LockoutError::InvalidUnlockCode | LockoutError::NotLocked => bad_request(e),
        LockoutError::Store(_) => {
            log::error!("Lockout store failure: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

fn summarize(matches: &[ScheduledMatch]) -> serde_json::Value {
    let total_rounds = matches.iter().map(|m| m.round_number).max().unwrap_or(0);
    serde_json::json!({
        "matches": matches,
        "total_matches": matches.len(),
        "total_rounds": total_rounds,
    })
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "campeonato-web",
    })
}

/// League fixture over the approved teams.
#[post("/api/fixtures/league")]
async fn api_fixture_league(body: Json<FixtureBody>) -> HttpResponse {
    match generate_league(&approved(&body.teams), &body.params) {
        Ok(matches) => HttpResponse::Ok().json(summarize(&matches)),
        Err(e) => bad_request(e),
    }
}

/// Knockout bracket over the approved teams.
#[post("/api/fixtures/knockout")]
async fn api_fixture_knockout(body: Json<FixtureBody>) -> HttpResponse {
    match generate_knockout(&approved(&body.teams), &body.params) {
        Ok(ties) => HttpResponse::Ok().json(serde_json::json!({ "ties": ties })),
        Err(e) => bad_request(e),
    }
}

/// Group stage over the approved teams.
#[post("/api/fixtures/groups")]
async fn api_fixture_groups(body: Json<GroupStageBody>) -> HttpResponse {
    match generate_group_stage(&approved(&body.teams), &body.params, body.group_count) {
        Ok(matches) => HttpResponse::Ok().json(summarize(&matches)),
        Err(e) => bad_request(e),
    }
}

#[post("/api/reports/fixture/csv")]
async fn api_fixture_csv(body: Json<FixtureCsvBody>) -> HttpResponse {
    match fixture_csv(&body.matches, &body.teams) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(csv),
        Err(e) => bad_request(e),
    }
}

#[post("/api/standings")]
async fn api_standings(body: Json<StandingsBody>) -> HttpResponse {
    let table = compute_standings(&approved(&body.teams), &body.results);
    HttpResponse::Ok().json(serde_json::json!({ "standings": table }))
}

#[post("/api/reports/standings/csv")]
async fn api_standings_csv(body: Json<StandingsBody>) -> HttpResponse {
    let table = compute_standings(&approved(&body.teams), &body.results);
    match standings_csv(&table) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(csv),
        Err(e) => bad_request(e),
    }
}

#[post("/api/scorers")]
async fn api_scorers(body: Json<ScorersBody>) -> HttpResponse {
    let table = top_scorers(&body.goals, body.limit.unwrap_or(DEFAULT_SCORER_LIMIT));
    HttpResponse::Ok().json(serde_json::json!({ "scorers": table }))
}

/// Record a login attempt. The unlock code goes to the notifier, never into the response.
#[post("/api/auth/attempts")]
async fn api_record_attempt(state: AppState, body: Json<AttemptBody>) -> HttpResponse {
    match state.record_attempt(body.account.trim(), body.success, Utc::now()) {
        Ok(AttemptOutcome::Locked { locked_until, .. }) => HttpResponse::Locked().json(serde_json::json!({
            "outcome": "locked",
            "locked_until": locked_until,
        })),
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => lockout_error_response(e),
    }
}

#[get("/api/auth/lock-status/{account}")]
async fn api_lock_status(state: AppState, path: Path<AccountPath>) -> HttpResponse {
    match state.is_locked(path.account.trim(), Utc::now()) {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(e) => lockout_error_response(e),
    }
}

#[post("/api/auth/unlock")]
async fn api_unlock(state: AppState, body: Json<UnlockBody>) -> HttpResponse {
    match state.unlock(body.account.trim(), &body.code, Utc::now()) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "unlocked": true })),
        Err(e) => lockout_error_response(e),
    }
}

#[post("/api/auth/resend-unlock-code")]
async fn api_resend_unlock_code(state: AppState, body: Json<ResendBody>) -> HttpResponse {
    match state.resend_unlock_code(body.account.trim(), Utc::now()) {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "sent": true })),
        Err(e) => lockout_error_response(e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn policy_from_env() -> LockoutPolicy {
    let d = LockoutPolicy::default();
    LockoutPolicy {
        max_attempts: env_or("MAX_LOGIN_ATTEMPTS", d.max_attempts),
        window_minutes: env_or("LOGIN_WINDOW_MINUTES", d.window_minutes),
        lockout_minutes: env_or("LOCKOUT_DURATION_MINUTES", d.lockout_minutes),
        unlock_code_minutes: env_or("UNLOCK_CODE_EXPIRES_MINUTES", d.unlock_code_minutes),
        retention_days: env_or("SECURITY_LOG_RETENTION_DAYS", d.retention_days),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = env_or("PORT", default_port());
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let policy = policy_from_env();
    log::info!(
        "Lockout policy: {} attempts in {} min, locked for {} min",
        policy.max_attempts,
        policy.window_minutes,
        policy.lockout_minutes
    );
    let state = Data::new(LoginLockoutTracker::new(
        policy,
        InMemoryLockoutStore::new(),
        LogNotifier,
    ));

    // Background task: every 30 minutes, drop attempt records past retention
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = state_cleanup.purge_old_attempts(Utc::now()) {
                log::warn!("Purging login attempts failed: {}", e);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_fixture_league)
            .service(api_fixture_knockout)
            .service(api_fixture_groups)
            .service(api_fixture_csv)
            .service(api_standings)
            .service(api_standings_csv)
            .service(api_scorers)
            .service(api_record_attempt)
            .service(api_lock_status)
            .service(api_unlock)
            .service(api_resend_unlock_code)
    })
    .bind(bind)?
    .run()
    .await
}
