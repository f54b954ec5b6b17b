//! Contributor pipeline.
//!
//! Contributors turn caller-supplied request items and ambient state into
//! system-message text, template variables and typed data. They run strictly
//! in registration order. A contributor claims the items it recognizes; a
//! claimed item is invisible to every later contributor. The catch-all
//! [`DefaultSystemMessageContributor`] always runs last and claims whatever is
//! left.
//!
//! # Example
//!
//! ```rust
//! use mosaic_core::contributor::{ContributorPipeline, ContributorRegistry};
//! use mosaic_core::runtime::{AmbientState, RequestContextItem, RuntimeContext};
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let pipeline = ContributorPipeline::new(ContributorRegistry::with_defaults());
//! let mut runtime = RuntimeContext::new(vec![RequestContextItem::new("Selected paragraph")]);
//!
//! pipeline
//!     .contribute(&mut runtime, &AmbientState::new(), &CancellationToken::new())
//!     .await
//!     .unwrap();
//!
//! assert_eq!(runtime.system_message_parts(), ["Context: Selected paragraph"]);
//! # });
//! ```

mod entity;
mod fallback;
mod user;

pub use entity::SerializedEntityContributor;
pub use fallback::DefaultSystemMessageContributor;
pub use user::UserContextContributor;

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::cancel;
use crate::entity::EntityFormatters;
use crate::error::Result;
use crate::runtime::{AmbientState, RuntimeContext};

/// A pipeline stage writing into the [`RuntimeContext`].
///
/// Contributors must not fail because of the shape of request data: an item
/// they do not understand is left unhandled. Errors are for failures of
/// external dependencies and abort the whole request.
#[async_trait]
pub trait RuntimeContextContributor: Send + Sync {
    /// Name used for registration and logging.
    fn name(&self) -> &str;

    /// Contribute to the runtime context.
    ///
    /// Contributors that call out to stores should wrap those calls with the
    /// token, as the resolvers do.
    async fn contribute(
        &self,
        runtime: &mut RuntimeContext,
        ambient: &AmbientState,
        cancel: &CancellationToken,
    ) -> Result<()>;
}

/// Ordered, editable list of contributors.
///
/// The catch-all is not part of the registry; [`ContributorPipeline`] always
/// appends it after every registered contributor.
#[derive(Clone, Default)]
pub struct ContributorRegistry {
    contributors: Vec<Arc<dyn RuntimeContextContributor>>,
}

impl ContributorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// User identity, then serialized entities with the generic formatter.
    pub fn with_defaults() -> Self {
        Self::with_formatters(EntityFormatters::default())
    }

    /// User identity, then serialized entities with the given formatters.
    pub fn with_formatters(formatters: EntityFormatters) -> Self {
        let mut registry = Self::new();
        registry.append(UserContextContributor);
        registry.append(SerializedEntityContributor::new(formatters));
        registry
    }

    /// Append a contributor.
    pub fn append(&mut self, contributor: impl RuntimeContextContributor + 'static) -> &mut Self {
        self.contributors.push(Arc::new(contributor));
        self
    }

    /// Insert a contributor before the one named `before`.
    ///
    /// Returns `false` (and inserts nothing) if no contributor has that name.
    pub fn insert_before(
        &mut self,
        before: &str,
        contributor: impl RuntimeContextContributor + 'static,
    ) -> bool {
        match self.position(before) {
            Some(index) => {
                self.contributors.insert(index, Arc::new(contributor));
                true
            }
            None => false,
        }
    }

    /// Remove the contributor named `name`. Returns `true` if one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.contributors.remove(index);
                true
            }
            None => false,
        }
    }

    /// Registered names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.contributors.iter().map(|c| c.name()).collect()
    }

    /// Number of registered contributors.
    pub fn len(&self) -> usize {
        self.contributors.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.contributors.iter().position(|c| c.name() == name)
    }
}

impl std::fmt::Debug for ContributorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContributorRegistry")
            .field("contributors", &self.names())
            .finish()
    }
}

/// Runs registered contributors in order, then the catch-all.
#[derive(Debug, Clone)]
pub struct ContributorPipeline {
    registry: ContributorRegistry,
    fallback: DefaultSystemMessageContributor,
}

impl ContributorPipeline {
    /// Build a pipeline from a registry.
    pub fn new(registry: ContributorRegistry) -> Self {
        Self {
            registry,
            fallback: DefaultSystemMessageContributor,
        }
    }

    /// Names in execution order, catch-all included.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self.registry.names();
        names.push(self.fallback.name());
        names
    }

    /// Run every contributor against `runtime`.
    ///
    /// Stops at the first error. Cancellation is checked before each step
    /// and while a step is awaiting.
    pub async fn contribute(
        &self,
        runtime: &mut RuntimeContext,
        ambient: &AmbientState,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let steps = self
            .registry
            .contributors
            .iter()
            .map(|c| c.as_ref() as &dyn RuntimeContextContributor)
            .chain(std::iter::once(&self.fallback as &dyn RuntimeContextContributor));

        for contributor in steps {
            let parts_before = runtime.system_message_parts().len();
            let handled_before = runtime.request_items().handled_count();

            cancel::run(cancel, contributor.contribute(runtime, ambient, cancel)).await?;

            tracing::debug!(
                contributor = contributor.name(),
                parts = runtime.system_message_parts().len() - parts_before,
                claimed = runtime.request_items().handled_count() - handled_before,
                "contributor finished"
            );
        }
        Ok(())
    }
}

impl Default for ContributorPipeline {
    fn default() -> Self {
        Self::new(ContributorRegistry::with_defaults())
    }
}
