use std::collections::HashMap;
use std::sync::Mutex;

use actix_files::Files;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::{error, middleware, web, App, HttpResponse, HttpServer, Result};
use csv::Reader;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::display::format_slot_time;
use crate::error::ScheduleError;
use crate::parser::load_shifts_from_reader;
use crate::schedule::{force_regenerate, synchronise, initialise, ReconcileReport, ShiftTask};
use crate::signup::{apply_signup, export_assignments, SignupRequest};
use crate::store::PendingChanges;

// In-memory storage for shifts (in production, back this with a database).
// The single mutex also serializes reconciliation runs within the process.
pub struct AppState {
    pub shifts: Mutex<HashMap<String, ShiftTask>>,
    pub admin_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Serialize)]
pub struct SlotView {
    start: String,
    end: String,
    volunteer: Option<String>,
    is_open: bool,
}

#[derive(Serialize)]
pub struct ShiftView {
    name: String,
    event: String,
    window_start: String,
    window_end: String,
    interval: String,
    slots: Vec<SlotView>,
}

#[derive(Serialize)]
pub struct UploadReport {
    shift: String,
    report: ReconcileReport,
}

fn shift_view(task: &ShiftTask) -> ShiftView {
    ShiftView {
        name: task.name.clone(),
        event: task.event.clone(),
        window_start: format_slot_time(task.window_start),
        window_end: format_slot_time(task.window_end),
        interval: task.interval.to_string(),
        slots: task
            .slots
            .iter()
            .map(|slot| SlotView {
                start: slot.start.to_rfc3339(),
                end: slot.end.to_rfc3339(),
                volunteer: slot.volunteer.as_ref().map(|v| v.name.clone()),
                is_open: !slot.is_assigned(),
            })
            .collect(),
    }
}

fn is_admin(session: &Session) -> bool {
    session.get::<bool>("admin").ok().flatten().unwrap_or(false)
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Unauthorized"}))
}

fn bad_request(err: ScheduleError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({"success": false, "error": err.to_string()}))
}

// Admin login endpoint
async fn admin_login(
    req: web::Json<LoginRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.password == state.admin_password {
        session
            .insert("admin", true)
            .map_err(error::ErrorInternalServerError)?;
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Invalid password"})))
    }
}

// Admin CSV upload endpoint: defines shifts, generating slots for new ones
// and reconciling shifts whose definition changed.
async fn admin_upload(
    body: web::Bytes,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }

    let mut reader = Reader::from_reader(body.as_ref());
    let incoming = match load_shifts_from_reader(&mut reader) {
        Ok(incoming) => incoming,
        Err(err) => return Ok(bad_request(err)),
    };

    let mut shifts = state.shifts.lock().unwrap();
    let mut staged = PendingChanges::new();
    let mut reports = Vec::new();

    for mut task in incoming {
        let report = if let Some(previous) = shifts.remove(&task.name) {
            // The edited definition adopts the previous slots, then the
            // scheduler diffs them against the new window and interval.
            task.slots = previous.slots;
            synchronise(&mut task, &mut staged)
        } else {
            initialise(&mut task, &mut staged)
        };
        reports.push(UploadReport { shift: task.name.clone(), report });
        shifts.insert(task.name.clone(), task);
    }

    info!(
        shifts = reports.len(),
        staged_inserts = staged.inserts.len(),
        staged_removes = staged.removes.len(),
        "processed shift definitions"
    );
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "reports": reports})))
}

// Public listing of shifts open for sign-up
async fn list_shifts(state: web::Data<AppState>) -> Result<HttpResponse> {
    let shifts = state.shifts.lock().unwrap();

    let mut views: Vec<ShiftView> = shifts
        .values()
        .filter(|task| !task.disable_signups)
        .map(shift_view)
        .collect();
    views.sort_by(|a, b| (&a.event, &a.window_start, &a.name).cmp(&(&b.event, &b.window_start, &b.name)));

    Ok(HttpResponse::Ok().json(views))
}

// Re-runs the safety-preserving reconciliation for one shift
async fn synchronise_shift(
    name: web::Path<String>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }

    let mut shifts = state.shifts.lock().unwrap();
    match shifts.get_mut(name.as_str()) {
        Some(task) => {
            let mut staged = PendingChanges::new();
            let report = synchronise(task, &mut staged);
            Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "report": report})))
        }
        None => Ok(HttpResponse::NotFound()
            .json(serde_json::json!({"success": false, "error": "Unknown shift"}))),
    }
}

// Destructive regeneration: throws away every slot, sign-ups included
async fn regenerate_shift(
    name: web::Path<String>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }

    let mut shifts = state.shifts.lock().unwrap();
    match shifts.get_mut(name.as_str()) {
        Some(task) => {
            let mut staged = PendingChanges::new();
            let report = force_regenerate(task, &mut staged);
            Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "report": report})))
        }
        None => Ok(HttpResponse::NotFound()
            .json(serde_json::json!({"success": false, "error": "Unknown shift"}))),
    }
}

// Volunteer sign-up endpoint
async fn signup(req: web::Json<SignupRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut shifts = state.shifts.lock().unwrap();
    match apply_signup(&req, &mut shifts) {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({"success": true}))),
        Err(err) => Ok(bad_request(err)),
    }
}

// Assignment export for the organizers
async fn export_csv(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }

    let shifts = state.shifts.lock().unwrap();
    let mut out = Vec::new();
    if let Err(err) = export_assignments(shifts.values(), &mut out) {
        return Ok(bad_request(err));
    }

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(("Content-Disposition", "attachment; filename=\"assignments.csv\""))
        .body(out))
}

// HTML page handlers
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

async fn admin_page() -> Result<HttpResponse> {
    let html = include_str!("../templates/admin.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub async fn start_server(port: u16, admin_password: String) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        shifts: Mutex::new(HashMap::new()),
        admin_password,
    });

    // Per-process signing key: sessions reset when the server restarts.
    let mut key_bytes = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut key_bytes);
    let session_key = Key::from(&key_bytes);

    info!(port, "starting shift sign-up server");
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                session_key.clone(),
            ))
            .service(Files::new("/static", "static"))
            .route("/", web::get().to(index))
            .route("/admin", web::get().to(admin_page))
            .route("/api/login", web::post().to(admin_login))
            .route("/api/upload", web::post().to(admin_upload))
            .route("/api/shifts", web::get().to(list_shifts))
            .route("/api/signup", web::post().to(signup))
            .route("/api/export", web::get().to(export_csv))
            .service(
                web::resource("/api/shifts/{name}/synchronise")
                    .route(web::post().to(synchronise_shift)),
            )
            .service(
                web::resource("/api/shifts/{name}/regenerate")
                    .route(web::post().to(regenerate_shift)),
            )
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
