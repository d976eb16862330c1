use actix_web::{web, HttpRequest, HttpResponse, Responder};
use crate::models::{AddressQuery, EmailSentResponse, ErrorResponse, SignupRequest, ValuationQuery};
use crate::routes::spa;
use crate::services::{Mailer, NotificationError, PlacesClient, ValuationClient};
use std::sync::Arc;

/// Application state shared across all handlers
///
/// Built once from the settings at startup; handlers only read it.
#[derive(Clone)]
pub struct AppState {
    pub places: Arc<PlacesClient>,
    pub valuation: Arc<ValuationClient>,
    pub mailer: Arc<Mailer>,
}

/// Configure the `/api` routes
///
/// Each resource falls back to the single-page app for any other method,
/// the same as an unknown path.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/autocomplete/{address}")
            .route(web::get().to(autocomplete))
            .default_service(web::to(spa::serve)),
    )
    .service(
        web::resource("/rent-zestimate")
            .route(web::get().to(rent_zestimate))
            .default_service(web::to(spa::serve)),
    )
    .service(
        web::resource("/send-email")
            .route(web::post().to(send_email))
            .default_service(web::to(spa::serve)),
    );
}

/// Address suggestions
///
/// GET /api/autocomplete/{address}
async fn autocomplete(state: web::Data<AppState>, address: web::Path<String>) -> impl Responder {
    let query = AddressQuery {
        input: address.into_inner(),
    };

    match state.places.autocomplete(&query).await {
        Ok(payload) => HttpResponse::Ok().json(payload),
        Err(e) => {
            tracing::error!("Address autocomplete failed for {:?}: {}", query.input, e);
            internal_error("autocomplete_failed", &e)
        }
    }
}

/// Rent estimate lookup
///
/// GET /api/rent-zestimate?address={address}&cityStateZip={cityStateZip}
async fn rent_zestimate(
    state: web::Data<AppState>,
    query: web::Query<ValuationQuery>,
) -> impl Responder {
    match state.valuation.rent_estimate(&query).await {
        Ok(payload) => HttpResponse::Ok().json(payload),
        Err(e) => {
            tracing::error!("Rent estimate failed for {:?}: {}", query.address, e);
            internal_error("valuation_failed", &e)
        }
    }
}

/// Signup confirmation email
///
/// POST /api/send-email
///
/// Request body:
/// ```json
/// {
///   "firstName": "Jane",
///   "lastName": "Doe",
///   "email": "jane@x.com",
///   "phone": "555-1234",
///   "address": "1 Main St",
///   "range": { "low": 1000, "high": 1200 },
///   "rent": 1100
/// }
/// ```
///
/// Relay credentials are checked before the body is read. Only a body that
/// is not JSON at all is a client error; a JSON body missing fields fails
/// like any other fault before sending.
async fn send_email(
    state: web::Data<AppState>,
    body: web::Bytes,
    http_req: HttpRequest,
) -> impl Responder {
    let credentials = match state.mailer.credentials() {
        Ok(credentials) => credentials,
        Err(e) => return notification_failure(e),
    };

    let signup: SignupRequest = match serde_json::from_slice(&body) {
        Ok(signup) => signup,
        Err(e) if e.is_syntax() || e.is_eof() => {
            tracing::info!("Malformed JSON on {}: {}", http_req.path(), e);
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "invalid_json".to_string(),
                message: format!("Invalid JSON: {}", e),
                status_code: 400,
            });
        }
        Err(e) => {
            tracing::error!("Unusable signup payload: {}", e);
            return internal_error("invalid_signup", &e);
        }
    };

    let notification = signup.into_notification(client_ip(&http_req));

    match state
        .mailer
        .send_signup_confirmation(&credentials, &notification)
        .await
    {
        Ok(message_id) => {
            tracing::info!("Sent signup confirmation {}", message_id);
            HttpResponse::Ok().json(EmailSentResponse {
                message_success: true,
                message_id,
            })
        }
        Err(e) => notification_failure(e),
    }
}

fn notification_failure(e: NotificationError) -> HttpResponse {
    tracing::error!("Failed to send signup confirmation: {}", e);
    let kind = match &e {
        NotificationError::MissingCredentials(_)
        | NotificationError::InvalidPort(_)
        | NotificationError::MissingSender => "configuration_error",
        NotificationError::InvalidAddress(_) | NotificationError::MessageError(_) => {
            "invalid_message"
        }
        NotificationError::DeliveryError(_) => "delivery_failed",
    };
    internal_error(kind, &e)
}

/// Caller address: first the `X-Forwarded-For` header as sent, else the peer IP
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("X-Forwarded-For")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
}

fn internal_error(error: &str, err: &dyn std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: error.to_string(),
        message: err.to_string(),
        status_code: 500,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "198.51.100.4, 10.0.0.1"))
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .to_http_request();

        assert_eq!(client_ip(&req).as_deref(), Some("198.51.100.4, 10.0.0.1"));
    }

    #[test]
    fn test_client_ip_falls_back_to_peer() {
        let req = TestRequest::default()
            .peer_addr("192.0.2.10:51234".parse().unwrap())
            .to_http_request();

        assert_eq!(client_ip(&req).as_deref(), Some("192.0.2.10"));
    }

    #[test]
    fn test_client_ip_none_without_source() {
        let req = TestRequest::default().to_http_request();
        assert!(client_ip(&req).is_none());
    }
}
