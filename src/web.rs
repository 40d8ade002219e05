use actix_web::{http::header, middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use crate::config::AppConfig;
use crate::controller::{Controller, ControllerError, Outcome, SeatRowView};
use crate::error::{ImportError, ReservationError};
use crate::store::{FileStorage, Reservation, ReservationStore};

/// The store is shared behind one lock so each request's read-modify-write runs alone
pub struct AppState {
    pub controller: Mutex<Controller<FileStorage>>,
    pub admin_password: String,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let store = ReservationStore::with_key(FileStorage::new(&config.data_dir), config.storage_key.clone());
        AppState {
            controller: Mutex::new(Controller::new(store, config)),
            admin_password: config.admin_password.clone(),
        }
    }

    fn controller(&self) -> Result<MutexGuard<'_, Controller<FileStorage>>> {
        self.controller
            .lock()
            .map_err(|_| actix_web::error::ErrorInternalServerError("reservation store is unavailable"))
    }
}

#[derive(Deserialize)]
pub struct ReserveRequest {
    #[serde(alias = "asiento")]
    seat: String,
    #[serde(default, alias = "holderName")]
    nombre: Option<String>,
    #[serde(default, alias = "holderId")]
    dni: Option<String>,
}

#[derive(Serialize)]
pub struct SlotSummary {
    slot: String,
    reserved: usize,
    capacity: usize,
}

#[derive(Serialize)]
pub struct SeatMapResponse {
    slot: String,
    rows: Vec<SeatRowView>,
}

#[derive(Serialize)]
pub struct ReservationsResponse {
    slot: String,
    reservations: Vec<Reservation>,
}

fn failure(status: actix_web::http::StatusCode, message: impl ToString) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({"success": false, "error": message.to_string()}))
}

/// Maps controller errors onto statuses; unexpected ones are logged
fn error_response(err: ControllerError) -> HttpResponse {
    use actix_web::http::StatusCode;
    let status = match &err {
        ControllerError::UnknownSeat(_) => StatusCode::BAD_REQUEST,
        ControllerError::Reservation(ReservationError::SeatAlreadyReserved { .. })
        | ControllerError::SeatOccupied(_) => StatusCode::CONFLICT,
        ControllerError::Reservation(ReservationError::SlotNotFound { .. })
        | ControllerError::Reservation(ReservationError::ReservationNotFound { .. })
        | ControllerError::SeatFree(_) => StatusCode::NOT_FOUND,
        ControllerError::Import(ImportError::InvalidFormat)
        | ControllerError::Import(ImportError::Json(_)) => StatusCode::BAD_REQUEST,
        ControllerError::NoSlotSelected | ControllerError::NoSeatSelected => StatusCode::BAD_REQUEST,
        _ => {
            error!("request failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    failure(status, err)
}

// Configured slots with their occupancy
async fn list_slots(state: web::Data<AppState>) -> Result<HttpResponse> {
    let controller = state.controller()?;
    let capacity = controller.grid().seat_count();
    let stored = controller.store().slot_summaries();
    let reserved = |slot: &str| stored.iter().find(|(s, _)| s == slot).map_or(0, |(_, n)| *n);

    let mut slots: Vec<SlotSummary> = controller
        .slots()
        .iter()
        .map(|slot| SlotSummary { slot: slot.clone(), reserved: reserved(slot.as_str()), capacity })
        .collect();
    // Slots that only exist in imported data are still listed
    for (slot, count) in &stored {
        if !controller.slots().contains(slot) {
            slots.push(SlotSummary { slot: slot.clone(), reserved: *count, capacity });
        }
    }
    Ok(HttpResponse::Ok().json(slots))
}

async fn get_seat_map(slot: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let slot = slot.into_inner();
    let rows = state.controller()?.seat_map_for(&slot, None);
    Ok(HttpResponse::Ok().json(SeatMapResponse { slot, rows }))
}

async fn get_reservations(slot: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let slot = slot.into_inner();
    let reservations = state.controller()?.reservations_for(&slot);
    Ok(HttpResponse::Ok().json(ReservationsResponse { slot, reservations }))
}

async fn create_reservation(
    slot: web::Path<String>,
    req: web::Json<ReserveRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let slot = slot.into_inner();
    let result = state.controller()?.reserve_seat(
        &slot,
        req.seat.trim(),
        req.nombre.as_deref().unwrap_or(""),
        req.dni.as_deref().unwrap_or(""),
    );
    match result {
        Ok(reservation) => {
            info!("reserved {} at {}", reservation.seat, slot);
            Ok(HttpResponse::Created().json(serde_json::json!({"success": true, "reservation": reservation})))
        }
        Err(e) => Ok(error_response(e)),
    }
}

async fn get_reservation(path: web::Path<(String, String)>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let (slot, seat) = path.into_inner();
    let result = state.controller()?.inspect_in(&slot, &seat);
    match result {
        Ok(reservation) => Ok(HttpResponse::Ok().json(reservation)),
        Err(e) => Ok(error_response(e)),
    }
}

async fn cancel_reservation(path: web::Path<(String, String)>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let (slot, seat) = path.into_inner();
    // The page asks before sending the request
    let result = state.controller()?.cancel_in(&slot, &seat, &mut |_: &str| true);
    match result {
        Ok(_) => {
            info!("cancelled {} at {}", seat, slot);
            Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
        }
        Err(e) => Ok(error_response(e)),
    }
}

async fn export_reservations(state: web::Data<AppState>) -> Result<HttpResponse> {
    let controller = state.controller()?;
    let file_name = controller.export_file_name();
    Ok(HttpResponse::Ok()
        .content_type("application/json; charset=utf-8")
        .insert_header((header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)))
        .body(controller.export_blob()))
}

async fn import_reservations(body: web::Bytes, state: web::Data<AppState>) -> Result<HttpResponse> {
    let Ok(text) = std::str::from_utf8(&body) else {
        return Ok(failure(actix_web::http::StatusCode::BAD_REQUEST, "import file is not valid UTF-8"));
    };
    let result = state.controller()?.import_str(text);
    match result {
        Ok(changes) => Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "changes": changes}))),
        Err(e) => {
            error!("import rejected: {}", e);
            Ok(error_response(e))
        }
    }
}

// Out-of-band wipe of all data; the admin password stands in for the confirmation
async fn reset_reservations(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    let password = req
        .headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let mut confirm = |_: &str| password == state.admin_password;
    let result = state.controller()?.reset_all(&mut confirm);
    match result {
        Ok(Outcome::Done) => {
            info!("all reservations erased");
            Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
        }
        Ok(Outcome::Declined) => Ok(failure(actix_web::http::StatusCode::UNAUTHORIZED, "Unauthorized")),
        Err(e) => Ok(error_response(e)),
    }
}

async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

/// Registers every route; shared with the integration tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/api/slots", web::get().to(list_slots))
        .route("/api/slots/{slot}/seats", web::get().to(get_seat_map))
        .service(
            web::resource("/api/slots/{slot}/reservations")
                .route(web::get().to(get_reservations))
                .route(web::post().to(create_reservation)),
        )
        .service(
            web::resource("/api/slots/{slot}/reservations/{seat}")
                .route(web::get().to(get_reservation))
                .route(web::delete().to(cancel_reservation)),
        )
        .route("/api/export", web::get().to(export_reservations))
        .route("/api/import", web::post().to(import_reservations))
        .route("/api/reset", web::post().to(reset_reservations));
}

pub async fn start_server(port: u16, config: AppConfig) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(&config));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
