//! Scope authorization for agents, prompts and tools.
//!
//! A [`Scope`] is a pair of allow/deny rule lists attached to an agent,
//! prompt or tool. Before it runs, the caller asks whether the scope is
//! available in its current [`AvailabilityContext`], evaluating only the
//! dimensions its surface declares as relevant.
//!
//! # Overview
//!
//! - **[`Scope`] / [`ScopeRule`]**: the persisted rule sets
//! - **[`evaluate`] / [`is_available`]**: pure evaluation against explicit dimensions
//! - **[`ScopeEvaluator`]**: evaluation for a named surface via a [`SurfaceRegistry`]
//! - **[`load_surface_config`]**: surfaces from a JSON file
//!
//! # Decision Table
//!
//! | Scope | Deny match | Allow rules | Allow match | Result |
//! |-------|------------|-------------|-------------|--------|
//! | none  | -          | -           | -           | available |
//! | some  | yes        | any         | any         | denied |
//! | some  | no         | empty       | -           | available |
//! | some  | no         | non-empty   | yes         | available |
//! | some  | no         | non-empty   | no          | denied |

pub mod conformance;
mod dimension;
mod evaluator;
mod rule;
mod surface;

pub use conformance::{ConformanceCase, ConformanceOutcome};
pub use dimension::{DimensionSet, ScopeDimension, UnknownDimension};
pub use evaluator::{
    evaluate, is_available, rule_matches, Availability, AvailabilityContext, DenialReason,
    ScopeEvaluator,
};
pub use rule::{Scope, ScopeRule};
pub use surface::{
    load_surface_config, parse_surface_config, SurfaceConfigError, SurfaceConfigFile,
    SurfaceEntry, SurfaceRegistry, COPILOT_SURFACE, PROMPT_SURFACE,
};
