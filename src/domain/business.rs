/// Display name used when the business document carries no `nombre`.
pub const UNKNOWN_BUSINESS_NAME: &str = "Negocio desconocido";

/// A business as stored in the `negocios` collection. Owned by another system: we only read it.
#[derive(Debug)]
pub struct Business {
    pub id: String,
    pub name: Option<String>,
    // We keep a `Result` per entry rather than failing the whole document: a malformed subscription
    // still counts as a subscription, but only that entry is skipped when resolving recipients.
    pub subscriptions: Vec<Result<Subscription, anyhow::Error>>,
}

impl Business {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_BUSINESS_NAME)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub user_id: String,
}

/// A user as stored in the `usuarios` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// The push registration token of the user's device, if they ever registered one.
    pub delivery_address: Option<String>,
}
