//! Panic isolation around plugin operations.

use crate::errors::PluginError;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// Awaits a plugin operation, turning a panic into a [`PluginError`].
pub(crate) async fn guarded<F>(operation: F) -> Result<(), PluginError>
where
    F: Future<Output = Result<(), PluginError>>,
{
    match AssertUnwindSafe(operation).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(PluginError::new(format!(
            "plugin panicked: {}",
            panic_message(panic.as_ref())
        ))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_through_result() {
        assert!(guarded(async { Ok::<(), PluginError>(()) }).await.is_ok());

        let err = guarded(async { Err::<(), _>(PluginError::new("nope")) })
            .await
            .unwrap_err();
        assert_eq!(err.message, "nope");
    }

    #[tokio::test]
    async fn test_panic_becomes_error() {
        let err = guarded(async {
            if true {
                panic!("exploded");
            }
            Ok::<(), PluginError>(())
        })
        .await
        .unwrap_err();
        assert_eq!(err.message, "plugin panicked: exploded");
    }
}
