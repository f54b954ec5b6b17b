//! Cancellation plumbing shared by the pipelines.

use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Fail fast if the token is already cancelled.
pub(crate) fn check(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// Run `future` unless `cancel` fires first.
pub(crate) async fn run<T, E, F>(cancel: &CancellationToken, future: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: Into<Error>,
{
    check(cancel)?;
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = future => result.map_err(Into::into),
    }
}
