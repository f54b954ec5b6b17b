//! Scope evaluation.
//!
//! Evaluation is a pure function of the scope, the caller's
//! [`AvailabilityContext`] and the caller's declared relevant dimensions:
//!
//! 1. No scope: available.
//! 2. Any matching deny rule: not available.
//! 3. No allow rules: available.
//! 4. Otherwise available iff some allow rule matches.
//!
//! A rule matches when every dimension that is both constrained on the rule
//! and declared relevant by the caller matches the context (AND across
//! dimensions, OR within a dimension's values, case-insensitive).

use serde::{Deserialize, Serialize};

use super::dimension::{DimensionSet, ScopeDimension};
use super::rule::{Scope, ScopeRule};
use super::surface::SurfaceRegistry;
use crate::error::{Error, Result};

/// The caller's current situation, one optional value per dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityContext {
    /// Current section alias.
    #[serde(default, alias = "sectionAlias", skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    /// Current entity type.
    #[serde(default, alias = "entityTypeAlias", skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,

    /// Current workspace alias.
    #[serde(default, alias = "workspaceAlias", skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,

    /// Property alias the request originates from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_alias: Option<String>,

    /// Property editor UI alias of that property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_editor_ui_alias: Option<String>,

    /// Content type alias of the current entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type_alias: Option<String>,
}

impl AvailabilityContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current section.
    pub fn with_section(mut self, value: impl Into<String>) -> Self {
        self.section = Some(value.into());
        self
    }

    /// Set the current entity type.
    pub fn with_entity_type(mut self, value: impl Into<String>) -> Self {
        self.entity_type = Some(value.into());
        self
    }

    /// Set the current workspace.
    pub fn with_workspace(mut self, value: impl Into<String>) -> Self {
        self.workspace = Some(value.into());
        self
    }

    /// Set the current property alias.
    pub fn with_property_alias(mut self, value: impl Into<String>) -> Self {
        self.property_alias = Some(value.into());
        self
    }

    /// Set the current property editor UI alias.
    pub fn with_property_editor_ui_alias(mut self, value: impl Into<String>) -> Self {
        self.property_editor_ui_alias = Some(value.into());
        self
    }

    /// Set the current content type alias.
    pub fn with_content_type_alias(mut self, value: impl Into<String>) -> Self {
        self.content_type_alias = Some(value.into());
        self
    }

    /// Current value for a dimension. Empty strings count as unset.
    pub fn value(&self, dimension: ScopeDimension) -> Option<&str> {
        let value = match dimension {
            ScopeDimension::Section => &self.section,
            ScopeDimension::EntityType => &self.entity_type,
            ScopeDimension::Workspace => &self.workspace,
            ScopeDimension::PropertyAlias => &self.property_alias,
            ScopeDimension::PropertyEditorUiAlias => &self.property_editor_ui_alias,
            ScopeDimension::ContentTypeAlias => &self.content_type_alias,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Why a scope evaluated to "not available".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The deny rule at this index matched.
    DenyRuleMatched(usize),
    /// Allow rules exist but none matched.
    NoAllowRuleMatched,
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialReason::DenyRuleMatched(index) => write!(f, "deny rule #{} matched", index),
            DenialReason::NoAllowRuleMatched => write!(f, "no allow rule matched"),
        }
    }
}

/// Result of a scope evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// No scope, or a scope without allow rules and no matching deny rule.
    Open,
    /// The allow rule at this index matched.
    Allowed {
        /// Index into `allow_rules`.
        rule: usize,
    },
    /// Not available.
    Denied {
        /// Why.
        reason: DenialReason,
    },
}

impl Availability {
    /// Check if the scope permits execution.
    pub fn is_available(&self) -> bool {
        !matches!(self, Availability::Denied { .. })
    }

    /// Check if the scope forbids execution.
    pub fn is_denied(&self) -> bool {
        matches!(self, Availability::Denied { .. })
    }
}

/// Unicode-aware case-insensitive comparison without allocating.
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Check whether a single rule matches the context.
///
/// Dimensions outside `relevant` are ignored even when the rule constrains
/// them. An unset context value never satisfies a constrained dimension.
pub fn rule_matches(
    rule: &ScopeRule,
    context: &AvailabilityContext,
    relevant: &DimensionSet,
) -> bool {
    relevant.iter().all(|dimension| {
        let Some(accepted) = rule.values(dimension) else {
            return true;
        };
        match context.value(dimension) {
            Some(current) => accepted.iter().any(|v| eq_ignore_case(v, current)),
            None => false,
        }
    })
}

/// Evaluate a scope and explain the decision.
pub fn evaluate(
    scope: Option<&Scope>,
    context: &AvailabilityContext,
    relevant: &DimensionSet,
) -> Availability {
    let Some(scope) = scope else {
        return Availability::Open;
    };

    if let Some(index) = scope
        .deny_rules
        .iter()
        .position(|rule| rule_matches(rule, context, relevant))
    {
        return Availability::Denied {
            reason: DenialReason::DenyRuleMatched(index),
        };
    }

    if scope.allow_rules.is_empty() {
        return Availability::Open;
    }

    match scope
        .allow_rules
        .iter()
        .position(|rule| rule_matches(rule, context, relevant))
    {
        Some(rule) => Availability::Allowed { rule },
        None => Availability::Denied {
            reason: DenialReason::NoAllowRuleMatched,
        },
    }
}

/// Boolean projection of [`evaluate`].
///
/// ```rust
/// use mosaic_core::scope::{is_available, AvailabilityContext, DimensionSet, Scope, ScopeDimension, ScopeRule};
///
/// let scope = Scope::new().allow(ScopeRule::new().sections(["content"]));
/// let dims = DimensionSet::from([ScopeDimension::Section, ScopeDimension::EntityType]);
///
/// let here = AvailabilityContext::new().with_section("Content").with_entity_type("document");
/// assert!(is_available(Some(&scope), &here, &dims));
///
/// let elsewhere = AvailabilityContext::new().with_section("media");
/// assert!(!is_available(Some(&scope), &elsewhere, &dims));
/// ```
pub fn is_available(
    scope: Option<&Scope>,
    context: &AvailabilityContext,
    relevant: &DimensionSet,
) -> bool {
    evaluate(scope, context, relevant).is_available()
}

/// Evaluates scopes on behalf of named calling surfaces.
///
/// Each surface declares its relevant dimensions in a [`SurfaceRegistry`].
/// The evaluator is stateless apart from that registry and can be shared
/// freely across threads.
#[derive(Debug, Clone, Default)]
pub struct ScopeEvaluator {
    surfaces: SurfaceRegistry,
}

impl ScopeEvaluator {
    /// Create an evaluator with the built-in surfaces.
    pub fn new() -> Self {
        Self::with_surfaces(SurfaceRegistry::builtin())
    }

    /// Create an evaluator with a custom surface registry.
    pub fn with_surfaces(surfaces: SurfaceRegistry) -> Self {
        Self { surfaces }
    }

    /// The surface registry in use.
    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    /// Evaluate for a named surface.
    ///
    /// Returns [`Error::Config`] if the surface is not registered.
    pub fn evaluate_for(
        &self,
        scope: Option<&Scope>,
        context: &AvailabilityContext,
        surface: &str,
    ) -> Result<Availability> {
        let dimensions = self
            .surfaces
            .dimensions(surface)
            .ok_or_else(|| Error::Config(format!("unknown surface '{}'", surface)))?;

        let decision = evaluate(scope, context, dimensions);
        tracing::debug!(surface, ?decision, "scope evaluated");
        Ok(decision)
    }

    /// Boolean form of [`ScopeEvaluator::evaluate_for`].
    pub fn is_available_for(
        &self,
        scope: Option<&Scope>,
        context: &AvailabilityContext,
        surface: &str,
    ) -> Result<bool> {
        Ok(self.evaluate_for(scope, context, surface)?.is_available())
    }
}
