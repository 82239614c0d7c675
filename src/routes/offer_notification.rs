use crate::configuration::DispatchSettings;
use crate::document_store::DocumentStore;
use crate::domain::{DispatchOutcome, NotificationPayload, NotificationRequest, OfferNotificationBody};
use crate::fan_out;
use crate::push_client::PushProvider;
use crate::recipients::{resolve_recipients, ResolveError};
use crate::routes::error_chain_fmt;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};

#[derive(thiserror::Error)]
pub enum OfferNotificationError {
    #[error("Parámetros requeridos: negocioId, mensaje, código, fechaInicio, fechaFin.")]
    ValidationError,
    #[error("{0}")]
    NotFoundError(String),
    // The caller only ever sees the generic message: the cause chain stays in our logs.
    #[error("Error interno del servidor.")]
    UnexpectedError(#[source] anyhow::Error),
}

impl std::fmt::Debug for OfferNotificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<ResolveError> for OfferNotificationError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::UnexpectedError(e) => Self::UnexpectedError(e),
            not_found => Self::NotFoundError(not_found.to_string()),
        }
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for OfferNotificationError {
    fn status_code(&self) -> StatusCode {
        match self {
            OfferNotificationError::ValidationError => StatusCode::BAD_REQUEST,
            OfferNotificationError::NotFoundError(_) => StatusCode::NOT_FOUND,
            OfferNotificationError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

/// Turns a body that cannot even be read as a notification request (not JSON, wrong content type,
/// non-string fields) into the same 400 a missing field gets.
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::warn!(error.message = %err, "Rejected a malformed notification request");
    OfferNotificationError::ValidationError.into()
}

#[derive(serde::Serialize)]
struct OfferNotificationResponse {
    mensaje: &'static str,
    resultados: Vec<DispatchOutcome>,
}

/// Notifies every subscriber of a business about a new offer.
///
/// Recipients that cannot be resolved and sends that fail do not fail the request: they are
/// either skipped or reported one by one in `resultados`. The request fails as a whole only when
/// the input is incomplete (400), when there is nobody to notify (404) or when the business itself
/// cannot be fetched (500).
#[tracing::instrument(
    name = "Send an offer notification",
    skip(body, store, push_provider, dispatch_settings),
    fields(business_id = tracing::field::Empty, promo_code = tracing::field::Empty)
)]
pub async fn send_offer_notification(
    body: web::Json<OfferNotificationBody>,
    store: web::Data<dyn DocumentStore>,
    push_provider: web::Data<dyn PushProvider>,
    dispatch_settings: web::Data<DispatchSettings>,
) -> Result<HttpResponse, OfferNotificationError> {
    let request = NotificationRequest::try_from(body.into_inner()).map_err(|missing| {
        tracing::warn!(?missing, "Rejected a notification request with missing fields");
        OfferNotificationError::ValidationError
    })?;
    tracing::Span::current()
        .record("business_id", request.business_id.as_str())
        .record("promo_code", request.promo_code.as_str());

    let max_concurrency = dispatch_settings.max_concurrency;
    let recipients =
        resolve_recipients(store.get_ref(), &request.business_id, max_concurrency).await?;

    let payload = NotificationPayload::for_offer(&recipients.business_name, &request);
    let resultados = fan_out::dispatch(
        push_provider.get_ref(),
        &recipients.delivery_addresses,
        &payload,
        max_concurrency,
    )
    .await;

    Ok(HttpResponse::Ok().json(OfferNotificationResponse {
        mensaje: "Notificación enviada exitosamente.",
        resultados,
    }))
}
