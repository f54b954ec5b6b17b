use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::RuntimeContextContributor;
use crate::error::Result;
use crate::runtime::{AmbientState, RuntimeContext};

/// Catch-all: claims every item still unhandled and emits
/// `Context: <description>` for each, so no caller-supplied item is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSystemMessageContributor;

#[async_trait]
impl RuntimeContextContributor for DefaultSystemMessageContributor {
    fn name(&self) -> &str {
        "default-system-message"
    }

    async fn contribute(
        &self,
        runtime: &mut RuntimeContext,
        _ambient: &AmbientState,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        let mut lines = Vec::new();
        runtime
            .request_items_mut()
            .handle_unhandled(|item| lines.push(format!("Context: {}", item.description)));

        for line in lines {
            runtime.add_system_message_part(line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RequestContextItem;

    #[tokio::test]
    async fn test_claims_only_unhandled() {
        let mut runtime = RuntimeContext::new(vec![
            RequestContextItem::new("first"),
            RequestContextItem::with_value("second", "{}"),
            RequestContextItem::new("third"),
        ]);
        runtime.request_items_mut().mark_handled(1);

        DefaultSystemMessageContributor
            .contribute(&mut runtime, &AmbientState::new(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            runtime.system_message_parts(),
            ["Context: first", "Context: third"]
        );
        assert_eq!(runtime.request_items().handled_count(), 3);
    }
}
