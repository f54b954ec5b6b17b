use async_trait::async_trait;
use std::fmt::Write as _;
use tokio_util::sync::CancellationToken;

use super::RuntimeContextContributor;
use crate::error::Result;
use crate::runtime::{AmbientState, RuntimeContext, UserIdentity};

/// Describes the current backoffice user.
///
/// Never looks at request items. Contributes nothing for anonymous or
/// system-initiated requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserContextContributor;

impl UserContextContributor {
    fn format(identity: &UserIdentity) -> String {
        let mut out = String::from("## Current User\n");
        let _ = write!(out, "- Key: {}", identity.key);
        if let Some(name) = &identity.name {
            let _ = write!(out, "\n- Name: {}", name);
        }
        if let Some(username) = &identity.username {
            let _ = write!(out, "\n- Username: {}", username);
        }
        if let Some(language) = &identity.language {
            let _ = write!(out, "\n- Language: {}", language);
        }
        if !identity.groups.is_empty() {
            let _ = write!(out, "\n- Groups: {}", identity.groups.join(", "));
        }
        out
    }
}

#[async_trait]
impl RuntimeContextContributor for UserContextContributor {
    fn name(&self) -> &str {
        "user"
    }

    async fn contribute(
        &self,
        runtime: &mut RuntimeContext,
        ambient: &AmbientState,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        if let Some(identity) = &ambient.identity {
            runtime.add_system_message_part(Self::format(identity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RequestContextItem;
    use uuid::Uuid;

    async fn run(ambient: AmbientState) -> RuntimeContext {
        let mut runtime = RuntimeContext::new(vec![RequestContextItem::with_value("Test Item", "test")]);
        UserContextContributor
            .contribute(&mut runtime, &ambient, &CancellationToken::new())
            .await
            .unwrap();
        runtime
    }

    #[tokio::test]
    async fn test_full_identity() {
        let key = Uuid::new_v4();
        let identity = UserIdentity::new(key)
            .with_name("John Smith")
            .with_username("john.smith@example.com")
            .with_language("en-US")
            .with_group("Administrators")
            .with_group("Editors");

        let runtime = run(AmbientState::new().with_identity(identity)).await;
        let parts = runtime.system_message_parts();

        assert_eq!(parts.len(), 1);
        assert!(parts[0].starts_with("## Current User"));
        assert!(parts[0].contains(&format!("- Key: {}", key)));
        assert!(parts[0].contains("- Name: John Smith"));
        assert!(parts[0].contains("- Username: john.smith@example.com"));
        assert!(parts[0].contains("- Language: en-US"));
        assert!(parts[0].contains("- Groups: Administrators, Editors"));
    }

    #[tokio::test]
    async fn test_absent_fields_are_omitted() {
        let runtime = run(AmbientState::new().with_identity(UserIdentity::new(Uuid::nil()))).await;
        let part = &runtime.system_message_parts()[0];

        assert!(!part.contains("- Name:"));
        assert!(!part.contains("- Language:"));
        assert!(!part.contains("- Groups:"));
    }

    #[tokio::test]
    async fn test_no_identity_contributes_nothing() {
        let runtime = run(AmbientState::new()).await;
        assert!(runtime.system_message_parts().is_empty());
    }

    #[tokio::test]
    async fn test_never_claims_items() {
        let identity = UserIdentity::new(Uuid::new_v4()).with_name("Ada");
        let runtime = run(AmbientState::new().with_identity(identity)).await;
        assert_eq!(runtime.request_items().handled_count(), 0);
    }
}
