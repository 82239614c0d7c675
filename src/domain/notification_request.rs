/// The JSON body of `POST /enviar-notificacion-oferta`, as sent by the client.
///
/// Every field is optional at this stage: we want to tell a missing field apart from a malformed
/// body, and report missing ones ourselves.
#[derive(serde::Deserialize, Debug, Default)]
pub struct OfferNotificationBody {
    #[serde(rename = "negocioId")]
    pub negocio_id: Option<String>,
    pub mensaje: Option<String>,
    pub codigo: Option<String>,
    #[serde(rename = "fechaInicio")]
    pub fecha_inicio: Option<String>,
    #[serde(rename = "fechaFin")]
    pub fecha_fin: Option<String>,
}

/// A request that carries all the required fields. Only presence is checked: dates and codes are
/// opaque strings to us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub business_id: String,
    pub message: String,
    pub promo_code: String,
    pub starts_on: String,
    pub ends_on: String,
}

impl TryFrom<OfferNotificationBody> for NotificationRequest {
    /// The wire names of the missing fields.
    type Error = Vec<&'static str>;

    fn try_from(body: OfferNotificationBody) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();
        let business_id = required("negocioId", body.negocio_id, &mut missing);
        let message = required("mensaje", body.mensaje, &mut missing);
        let promo_code = required("codigo", body.codigo, &mut missing);
        let starts_on = required("fechaInicio", body.fecha_inicio, &mut missing);
        let ends_on = required("fechaFin", body.fecha_fin, &mut missing);

        match (business_id, message, promo_code, starts_on, ends_on) {
            (Some(business_id), Some(message), Some(promo_code), Some(starts_on), Some(ends_on)) => {
                Ok(Self {
                    business_id,
                    message,
                    promo_code,
                    starts_on,
                    ends_on,
                })
            }
            _ => Err(missing),
        }
    }
}

/// An empty string counts as missing.
fn required(
    name: &'static str,
    value: Option<String>,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            missing.push(name);
            None
        }
    }
}
