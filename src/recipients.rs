use crate::document_store::DocumentStore;
use crate::domain::Subscription;
use anyhow::Context;
use futures::StreamExt;

/// Who to notify on behalf of a business.
#[derive(Debug)]
pub struct Recipients {
    pub business_name: String,
    pub delivery_addresses: Vec<String>,
}

#[derive(thiserror::Error)]
pub enum ResolveError {
    #[error("Negocio no encontrado.")]
    BusinessNotFound,
    #[error("No se encontraron usuarios suscritos al negocio especificado.")]
    NoSubscribers,
    #[error("No se encontraron tokens FCM válidos para los usuarios suscritos.")]
    NoDeliveryAddresses,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::routes::error_chain_fmt(self, f)
    }
}

/// Looks up the business, then every subscribed user, and returns the delivery addresses found
/// along the way.
///
/// Only the business lookup can fail the whole resolution. Each subscription is resolved on its
/// own: a malformed entry, a missing user, a user without a token or a failed lookup skips that
/// subscription and nothing else. Addresses come back in subscription order, duplicates included.
#[tracing::instrument(name = "Resolve offer recipients", skip(store, max_concurrency))]
pub async fn resolve_recipients(
    store: &dyn DocumentStore,
    business_id: &str,
    max_concurrency: usize,
) -> Result<Recipients, ResolveError> {
    let business = store
        .fetch_business(business_id)
        .await
        .context("Failed to fetch the business.")?
        .ok_or(ResolveError::BusinessNotFound)?;

    if business.subscriptions.is_empty() {
        return Err(ResolveError::NoSubscribers);
    }

    let business_name = business.display_name().to_string();
    let delivery_addresses: Vec<String> = futures::stream::iter(business.subscriptions)
        .map(|subscription| delivery_address_for(store, subscription))
        .buffered(max_concurrency.max(1))
        .collect::<Vec<Option<String>>>()
        .await
        .into_iter()
        .flatten()
        .collect();

    if delivery_addresses.is_empty() {
        return Err(ResolveError::NoDeliveryAddresses);
    }

    tracing::info!(
        recipients = delivery_addresses.len(),
        "Resolved the delivery addresses of the subscribers"
    );
    Ok(Recipients {
        business_name,
        delivery_addresses,
    })
}

async fn delivery_address_for(
    store: &dyn DocumentStore,
    subscription: Result<Subscription, anyhow::Error>,
) -> Option<String> {
    let subscription = match subscription {
        Ok(subscription) => subscription,
        Err(error) => {
            tracing::warn!(
                error.cause_chain = ?error,
                error.message = %error,
                "Skipping a subscription. It does not reference a valid user"
            );
            return None;
        }
    };

    match store.fetch_user(&subscription.user_id).await {
        Ok(Some(user)) => {
            if user.delivery_address.is_none() {
                tracing::warn!(
                    user_id = %user.id,
                    "Skipping a subscriber. They have no registered device"
                );
            }
            user.delivery_address
        }
        Ok(None) => {
            tracing::warn!(
                user_id = %subscription.user_id,
                "Skipping a subscription. The subscribed user does not exist"
            );
            None
        }
        Err(error) => {
            tracing::warn!(
                user_id = %subscription.user_id,
                error.cause_chain = ?error,
                error.message = %error,
                "Skipping a subscription. Failed to fetch the subscribed user"
            );
            None
        }
    }
}
