/// The result of one delivery attempt. Serialized as `{token, response}` or `{token, error}`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum DispatchOutcome {
    Delivered { token: String, response: String },
    Failed { token: String, error: String },
}

impl DispatchOutcome {
    pub fn token(&self) -> &str {
        match self {
            DispatchOutcome::Delivered { token, .. } | DispatchOutcome::Failed { token, .. } => token,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered { .. })
    }
}
