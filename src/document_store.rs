use crate::domain::{Business, Subscription, User};
use anyhow::Context;
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use std::collections::HashMap;

/// Read-only access to the records owned by the rest of the platform.
///
/// `Ok(None)` means the record does not exist; `Err` means we could not find out.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch_business(&self, business_id: &str) -> Result<Option<Business>, anyhow::Error>;

    async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, anyhow::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Businesses,
    Users,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Businesses => "negocios",
            Collection::Users => "usuarios",
        }
    }
}

/// Talks to the Firestore REST API.
pub struct FirestoreClient {
    http_client: Client,
    base_url: Url,
    project_id: String,
    access_token: Secret<String>,
}

impl FirestoreClient {
    pub fn new(
        base_url: String,
        project_id: String,
        access_token: Secret<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, anyhow::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        let base_url = Url::parse(&base_url).context("Invalid document store base url")?;
        Ok(Self {
            http_client,
            base_url,
            project_id,
            access_token,
        })
    }

    fn document_url(&self, collection: Collection, id: &str) -> Result<Url, anyhow::Error> {
        let mut url = self.base_url.clone();
        // `extend` percent-encodes each segment: an identifier can never escape its collection.
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("The document store base url cannot be a base"))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                collection.as_str(),
                id,
            ]);
        Ok(url)
    }

    #[tracing::instrument(name = "Get document", skip(self))]
    pub async fn get_document(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, anyhow::Error> {
        let url = self.document_url(collection, id)?;
        let response = self
            .http_client
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .context("Failed to reach the document store")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document = response
            .error_for_status()
            .context("The document store rejected the lookup")?
            .json::<Document>()
            .await
            .context("Failed to decode the document")?;
        Ok(Some(document))
    }
}

#[async_trait::async_trait]
impl DocumentStore for FirestoreClient {
    async fn fetch_business(&self, business_id: &str) -> Result<Option<Business>, anyhow::Error> {
        let document = self.get_document(Collection::Businesses, business_id).await?;
        Ok(document.map(|d| d.into_business(business_id)))
    }

    async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, anyhow::Error> {
        let document = self.get_document(Collection::Users, user_id).await?;
        Ok(document.map(|d| d.into_user(user_id)))
    }
}

/// A Firestore document. Field values come wrapped in their type (`{"stringValue": "..."}`); we only
/// decode the types our records use and ignore everything else.
#[derive(serde::Deserialize, Debug, Default)]
pub struct Document {
    #[serde(default)]
    fields: HashMap<String, Value>,
}

#[derive(serde::Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct Value {
    string_value: Option<String>,
    array_value: Option<ArrayValue>,
    map_value: Option<MapValue>,
}

#[derive(serde::Deserialize, Debug, Default)]
struct ArrayValue {
    #[serde(default)]
    values: Vec<Value>,
}

#[derive(serde::Deserialize, Debug, Default)]
struct MapValue {
    #[serde(default)]
    fields: HashMap<String, Value>,
}

impl Document {
    /// A non-empty string field. Any other type, or the empty string, reads as absent.
    fn string(&self, name: &str) -> Option<String> {
        non_empty_string(self.fields.get(name))
    }

    fn into_business(self, id: &str) -> Business {
        let name = self.string("nombre");
        let subscriptions = self
            .fields
            .get("suscripciones")
            .and_then(|v| v.array_value.as_ref())
            .map(|array| array.values.iter().map(parse_subscription).collect())
            .unwrap_or_default();
        Business {
            id: id.to_string(),
            name,
            subscriptions,
        }
    }

    fn into_user(self, id: &str) -> User {
        User {
            id: id.to_string(),
            delivery_address: self.string("fcmToken"),
        }
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(|v| v.string_value.clone())
        .filter(|s| !s.is_empty())
}

fn parse_subscription(value: &Value) -> Result<Subscription, anyhow::Error> {
    let fields = &value
        .map_value
        .as_ref()
        .context("The subscription is not a map")?
        .fields;
    let user_id = non_empty_string(fields.get("usuarioId"))
        .context("The subscription does not reference a user")?;
    Ok(Subscription { user_id })
}
