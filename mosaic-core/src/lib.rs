//! # Mosaic
//!
//! Scope authorization and context assembly for AI features in a
//! content-management backoffice.
//!
//! Before an agent, prompt or tool runs, two decisions are made:
//!
//! - **Is it allowed here?** A [`Scope`](scope::Scope) of allow/deny rules is
//!   evaluated against the caller's current section, entity type, property
//!   editor and so on.
//! - **What context goes with it?** Contributors turn request items and
//!   ambient state into system-message text and template variables;
//!   resolvers discover reusable context resources, walking the content tree
//!   for inherited ones.
//!
//! ## Scope Evaluation
//!
//! ```rust
//! use mosaic_core::scope::{AvailabilityContext, Scope, ScopeEvaluator, ScopeRule};
//!
//! # fn example() -> mosaic_core::Result<()> {
//! let scope = Scope::new()
//!     .allow(ScopeRule::new().sections(["content"]))
//!     .deny(ScopeRule::new().entity_types(["member"]));
//!
//! let evaluator = ScopeEvaluator::new();
//! let here = AvailabilityContext::new()
//!     .with_section("content")
//!     .with_entity_type("document");
//!
//! assert!(evaluator.is_available_for(Some(&scope), &here, "copilot")?);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Context Assembly
//!
//! ```rust
//! use std::sync::Arc;
//! use mosaic_core::runtime::{AmbientState, RequestContextItem, UserIdentity};
//! use mosaic_core::store::MemoryStore;
//! use mosaic_core::ContextAssembler;
//! use tokio_util::sync::CancellationToken;
//! use uuid::Uuid;
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(MemoryStore::new());
//! let assembler = ContextAssembler::with_stores(store.clone(), store.clone(), store);
//!
//! let ambient = AmbientState::new()
//!     .with_identity(UserIdentity::new(Uuid::new_v4()).with_name("Ada"));
//! let runtime = assembler
//!     .assemble(vec![RequestContextItem::new("Rewrite in plain English")], &ambient, &CancellationToken::new())
//!     .await
//!     .unwrap();
//!
//! let message = runtime.system_message().unwrap();
//! assert!(message.contains("- Name: Ada"));
//! assert!(message.ends_with("Context: Rewrite in plain English"));
//! # });
//! ```
//!
//! ## Modules
//!
//! - [`scope`]: rule model, evaluator, calling surfaces
//! - [`runtime`]: per-request accumulator, request items, typed data bag
//! - [`contributor`]: contributor pipeline
//! - [`resolver`]: resolver pipeline and content tree walker
//! - [`entity`]: serialized entity parsing and formatting
//! - [`store`]: lookup traits and in-memory stores
//!
//! ## Feature Flags
//!
//! - `test-utils`: builders and failing/slow stores for tests

mod assembler;
mod cancel;
pub mod contributor;
pub mod entity;
pub mod error;
pub mod resolver;
pub mod runtime;
pub mod scope;
pub mod store;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use assembler::ContextAssembler;
pub use contributor::{ContributorPipeline, ContributorRegistry, RuntimeContextContributor};
pub use error::{Error, Result};
pub use resolver::{
    ContextResolutionService, ContextResolver, ContextResolverResource, ContextResolverResult,
    ContextResolverSource, ResolverRegistry,
};
pub use runtime::{AmbientState, RequestContextItem, RuntimeContext, UserIdentity};
pub use scope::{Availability, AvailabilityContext, Scope, ScopeEvaluator, ScopeRule};
