use crate::domain::NotificationRequest;

/// What ends up on the user's device. Title and body are passed to the provider as they are.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
}

impl NotificationPayload {
    pub fn for_offer(business_name: &str, request: &NotificationRequest) -> Self {
        Self {
            title: format!(
                "Nueva promoción de {business_name} con el código {}",
                request.promo_code
            ),
            body: request.message.clone(),
        }
    }
}
