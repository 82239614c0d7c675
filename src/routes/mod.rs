mod health_check;
mod offer_notification;

pub use health_check::*;
pub use offer_notification::*;

/// Prints an error followed by every error in its `source` chain, one per line.
///
/// We use it for the `Debug` representation of our errors: that is what ends up in the logs when a
/// request fails, and the whole chain is what we need to understand why.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
