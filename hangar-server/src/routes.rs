//! HTTP handlers for the Hangar server.

use actix_web::{
    HttpRequest, HttpResponse, Responder, delete, error, get, http::StatusCode, post, web,
};
use hangar_core::{
    HangarError, PageParams, Ship, ShipFilter, ShipPayload, ShipQuery, ShipService,
    UpdateOutcome, parse_id,
};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::openapi::ApiDoc;

#[derive(Clone)]
/// Shared application state for handlers.
pub struct AppState {
    /// Ship registry operations.
    pub ships: ShipService,
}

/// Error response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub message: String,
}

/// Register every ship route. `/rest/ships/count` precedes `/rest/ships/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config())
        .service(list_ships)
        .service(count_ships)
        .service(create_ship)
        .service(openapi_json)
        .service(get_ship)
        .service(update_ship)
        .service(delete_ship);
}

/// Query string extraction failures answer 400 with an [`ErrorResponse`].
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req: &HttpRequest| {
        let message = format!("invalid query parameters: {err}");
        log::warn!("{message}");
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(ErrorResponse { message }),
        )
        .into()
    })
}

fn error_response(err: &HangarError) -> HttpResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        log::error!("request failed: {err}");
    } else {
        log::warn!("request rejected: {err}");
    }
    HttpResponse::build(status).json(ErrorResponse {
        message: err.to_string(),
    })
}

async fn run_blocking<T, F>(task: F) -> Result<T, HangarError>
where
    F: FnOnce() -> Result<T, HangarError> + Send + 'static,
    T: Send + 'static,
{
    web::block(task)
        .await
        .unwrap_or_else(|err| Err(HangarError::Store(format!("blocking task failed: {err}"))))
}

/// Decode an optional JSON body. An empty body and a literal `null` both mean "no payload".
fn parse_payload(body: &[u8]) -> Result<Option<ShipPayload>, HangarError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<Option<ShipPayload>>(body)
        .map_err(|err| HangarError::Malformed(err.to_string()))
}

#[utoipa::path(
    get,
    path = "/rest/ships",
    params(ShipFilter, PageParams),
    responses(
        (status = 200, description = "One page of matching ships", body = [Ship]),
        (status = 400, description = "Malformed query parameter", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships")]
/// List ships matching the filters, sorted and paged.
pub async fn list_ships(
    state: web::Data<AppState>,
    filter: web::Query<ShipFilter>,
    page: web::Query<PageParams>,
) -> impl Responder {
    let query = ShipQuery::from_params(&filter, &page);
    log::trace!(
        "listing ships: {} predicates, sort {}, page {}x{}",
        query.predicates.len(),
        query.sort.field_name(),
        query.page.number,
        query.page.size
    );
    let ships = state.ships.clone();
    match run_blocking(move || ships.list(&query)).await {
        Ok(found) => HttpResponse::Ok().json(found),
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    get,
    path = "/rest/ships/count",
    params(ShipFilter),
    responses(
        (status = 200, description = "Number of matching ships", body = i64),
        (status = 400, description = "Malformed query parameter", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships/count")]
/// Count ships matching the filters.
pub async fn count_ships(
    state: web::Data<AppState>,
    filter: web::Query<ShipFilter>,
) -> impl Responder {
    let filter = filter.into_inner();
    log::trace!("counting ships: {filter:?}");
    let ships = state.ships.clone();
    match run_blocking(move || ships.count(&filter)).await {
        Ok(total) => HttpResponse::Ok().json(total),
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    get,
    path = "/rest/ships/{id}",
    params(("id" = String, Path, description = "Ship identifier")),
    responses(
        (status = 200, description = "The ship", body = Ship),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such ship", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships/{id}")]
/// Fetch a single ship.
pub async fn get_ship(state: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    log::trace!("fetching ship {id}");
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    let ships = state.ships.clone();
    match run_blocking(move || ships.get(id)).await {
        Ok(ship) => HttpResponse::Ok().json(ship),
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    post,
    path = "/rest/ships",
    request_body = ShipPayload,
    responses(
        (status = 200, description = "Created ship with its id and rating", body = Ship),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[post("/rest/ships")]
/// Create a ship.
pub async fn create_ship(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    log::trace!("creating ship from {} byte body", body.len());
    let payload = match parse_payload(&body) {
        Ok(payload) => payload.unwrap_or_default(),
        Err(err) => return error_response(&err),
    };
    let ships = state.ships.clone();
    match run_blocking(move || ships.create(&payload)).await {
        Ok(ship) => {
            log::info!("created ship {} ({})", ship.id, ship.name);
            HttpResponse::Ok().json(ship)
        }
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    post,
    path = "/rest/ships/{id}",
    params(("id" = String, Path, description = "Ship identifier")),
    request_body = ShipPayload,
    responses(
        (status = 200, description = "Updated or unchanged ship", body = Ship),
        (status = 400, description = "Malformed id or invalid field", body = ErrorResponse),
        (status = 404, description = "No such ship", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[post("/rest/ships/{id}")]
/// Apply a partial update to a ship.
pub async fn update_ship(
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Bytes,
) -> impl Responder {
    log::trace!("updating ship {id}");
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(err) => return error_response(&err),
    };
    let ships = state.ships.clone();
    match run_blocking(move || ships.update(id, payload.as_ref())).await {
        Ok(UpdateOutcome::Updated(ship)) => {
            log::info!("updated ship {}", ship.id);
            HttpResponse::Ok().json(ship)
        }
        Ok(UpdateOutcome::Unchanged(ship)) => {
            log::debug!("empty update for ship {}", ship.id);
            HttpResponse::Ok().json(ship)
        }
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    delete,
    path = "/rest/ships/{id}",
    params(("id" = String, Path, description = "Ship identifier")),
    responses(
        (status = 200, description = "Ship deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such ship", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[delete("/rest/ships/{id}")]
/// Delete a ship.
pub async fn delete_ship(state: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    log::trace!("deleting ship {id}");
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    let ships = state.ships.clone();
    match run_blocking(move || ships.delete(id)).await {
        Ok(ship) => {
            log::info!("deleted ship {}", ship.id);
            HttpResponse::Ok().finish()
        }
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    get,
    path = "/rest/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document", body = serde_json::Value)
    ),
    tag = "system"
)]
#[get("/rest/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}


#[cfg(test)]
mod payload_tests {
    use super::*;

    #[test]
    fn parse_payload_treats_blank_and_null_as_absent() {
        assert_eq!(parse_payload(b"").expect("empty"), None);
        assert_eq!(parse_payload(b"  \n").expect("blank"), None);
        assert_eq!(parse_payload(b"null").expect("null"), None);
        assert_eq!(
            parse_payload(br#"{"crewSize": 3}"#).expect("payload"),
            Some(ShipPayload {
                crew_size: Some(3),
                ..ShipPayload::default()
            })
        );
        assert!(matches!(
            parse_payload(br#"{"shipType": "YACHT"}"#),
            Err(HangarError::Malformed(_))
        ));
    }
}
