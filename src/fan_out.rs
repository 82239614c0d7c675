use crate::domain::{DispatchOutcome, NotificationPayload};
use crate::push_client::PushProvider;
use futures::StreamExt;

/// Sends `payload` to every address and reports how each send went.
///
/// There is exactly one outcome per address, in the order the addresses were given. A failed send
/// becomes a `Failed` outcome for that address: it never stops the remaining sends and never fails
/// the dispatch as a whole. Duplicate addresses are sent to once per occurrence.
#[tracing::instrument(
    name = "Fan out notification",
    skip(push_provider, addresses, payload, max_concurrency),
    fields(addresses = addresses.len())
)]
pub async fn dispatch(
    push_provider: &dyn PushProvider,
    addresses: &[String],
    payload: &NotificationPayload,
    max_concurrency: usize,
) -> Vec<DispatchOutcome> {
    let outcomes: Vec<DispatchOutcome> = futures::stream::iter(addresses)
        .map(|address| async move {
            match push_provider.send(address, payload).await {
                Ok(response) => DispatchOutcome::Delivered {
                    token: address.clone(),
                    response,
                },
                Err(error) => {
                    tracing::warn!(
                        token = %address,
                        error.cause_chain = ?error,
                        error.message = %error,
                        "Failed to send the notification to a device"
                    );
                    DispatchOutcome::Failed {
                        token: address.clone(),
                        error: error.to_string(),
                    }
                }
            }
        })
        // `buffered`, unlike `buffer_unordered`, yields results in submission order.
        .buffered(max_concurrency.max(1))
        .collect()
        .await;

    let delivered = outcomes.iter().filter(|o| o.is_delivered()).count();
    tracing::info!(
        delivered,
        failed = outcomes.len() - delivered,
        "Finished sending the notification"
    );
    outcomes
}
