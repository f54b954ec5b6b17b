use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{ContextResolver, ContextResolverResult};
use crate::cancel;
use crate::error::Result;
use crate::runtime::{keys, RuntimeContext};
use crate::store::{ContextStore, ProfileStore};

/// Resolves contexts attached to the AI profile handling the request.
#[derive(Clone)]
pub struct ProfileContextResolver {
    profiles: Arc<dyn ProfileStore>,
    contexts: Arc<dyn ContextStore>,
}

impl ProfileContextResolver {
    /// Create a resolver over profile and context stores.
    pub fn new(profiles: Arc<dyn ProfileStore>, contexts: Arc<dyn ContextStore>) -> Self {
        Self { profiles, contexts }
    }
}

#[async_trait]
impl ContextResolver for ProfileContextResolver {
    fn name(&self) -> &str {
        "profile"
    }

    async fn resolve(
        &self,
        runtime: &RuntimeContext,
        cancel: &CancellationToken,
    ) -> Result<ContextResolverResult> {
        let Some(profile_id) = runtime.data().get(keys::PROFILE_ID).copied() else {
            return Ok(ContextResolverResult::empty());
        };

        let profile = cancel::run(cancel, self.profiles.get_profile(profile_id)).await?;
        let Some(profile) = profile else {
            tracing::debug!(%profile_id, "profile not found");
            return Ok(ContextResolverResult::empty());
        };

        let mut result = ContextResolverResult::empty();
        for context_id in &profile.context_ids {
            let context = cancel::run(cancel, self.contexts.get_context(*context_id)).await?;

            match context {
                Some(context) => result.push_context(profile.name.clone(), context),
                None => tracing::warn!(%context_id, profile = %profile.alias, "referenced context not found"),
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AiContext, AiProfile, MemoryStore};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_resolves_profile_contexts_in_order() {
        let store = Arc::new(MemoryStore::new());
        let (first, second, profile) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        for (id, name) in [(first, "Tone"), (second, "Glossary")] {
            store.insert_context(AiContext {
                id,
                alias: name.to_lowercase(),
                name: name.into(),
                resources: vec![],
            });
        }
        store.insert_profile(AiProfile {
            id: profile,
            alias: "writer".into(),
            name: "Writer".into(),
            context_ids: vec![first, Uuid::new_v4(), second],
        });

        let mut runtime = RuntimeContext::default();
        runtime.data_mut().set(keys::PROFILE_ID, profile);

        let result = ProfileContextResolver::new(store.clone(), store)
            .resolve(&runtime, &CancellationToken::new())
            .await
            .unwrap();

        let contexts: Vec<_> = result.sources.iter().map(|s| s.context_name.as_str()).collect();
        assert_eq!(contexts, vec!["Tone", "Glossary"]);
        assert!(result.sources.iter().all(|s| s.entity_name == "Writer"));
    }

    #[tokio::test]
    async fn test_without_profile_is_empty() {
        let store = Arc::new(MemoryStore::new());
        let resolver = ProfileContextResolver::new(store.clone(), store);

        let result = resolver
            .resolve(&RuntimeContext::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(result.is_empty());

        let mut runtime = RuntimeContext::default();
        runtime.data_mut().set(keys::PROFILE_ID, Uuid::new_v4());
        let result = resolver
            .resolve(&runtime, &CancellationToken::new())
            .await
            .unwrap();
        assert!(result.is_empty());
    }
}
