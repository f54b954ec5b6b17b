//! Command implementations.
//!
//! Each command returns a report value; printing is left to `main` so the
//! commands can be exercised directly in tests.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use mosaic_core::resolver::{ContextResolverResource, ContextResolverSource};
use mosaic_core::runtime::keys;
use mosaic_core::scope::conformance::{parse_cases, run_cases};
use mosaic_core::scope::{
    evaluate, load_surface_config, Availability, ConformanceOutcome, DimensionSet,
    SurfaceRegistry, COPILOT_SURFACE,
};
use mosaic_core::store::{load_world, MemoryStore};
use mosaic_core::{
    AmbientState, AvailabilityContext, ContextAssembler, RequestContextItem, Scope,
    ScopeEvaluator, UserIdentity,
};

use crate::cli::{AssembleArgs, CheckArgs};
use crate::error::CliError;

/// Read a JSON argument given either inline or as a file path.
///
/// Values starting with `{` or `[`, and the literal `null`, are inline JSON.
pub async fn read_json_arg(arg: &str) -> Result<String, CliError> {
    let trimmed = arg.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') || trimmed == "null" {
        return Ok(trimmed.to_string());
    }
    Ok(tokio::fs::read_to_string(trimmed).await?)
}

/// Outcome of `mosaic check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Surface used, if the dimensions came from one.
    pub surface: Option<String>,
    /// The decision.
    pub decision: Availability,
}

impl CheckReport {
    pub fn is_available(&self) -> bool {
        self.decision.is_available()
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.decision {
            Availability::Open => write!(f, "available (open)")?,
            Availability::Allowed { rule } => write!(f, "available (allow rule #{} matched)", rule)?,
            Availability::Denied { reason } => write!(f, "not available ({})", reason)?,
        }
        if let Some(surface) = &self.surface {
            write!(f, " [surface: {}]", surface)?;
        }
        Ok(())
    }
}

/// Evaluate one scope.
pub async fn check(args: &CheckArgs) -> Result<CheckReport, CliError> {
    let scope: Option<Scope> = serde_json::from_str(&read_json_arg(&args.scope).await?)?;
    let context: AvailabilityContext =
        serde_json::from_str(&read_json_arg(&args.context).await?)?;

    if let Some(names) = &args.dimensions {
        let dimensions =
            DimensionSet::parse(names.split(',').map(str::trim).filter(|n| !n.is_empty()))?;
        return Ok(CheckReport {
            surface: None,
            decision: evaluate(scope.as_ref(), &context, &dimensions),
        });
    }

    let surfaces = match &args.surfaces {
        Some(path) => load_surface_config(path).await?,
        None => SurfaceRegistry::builtin(),
    };
    let surface = args.surface.as_deref().unwrap_or(COPILOT_SURFACE);
    let decision = ScopeEvaluator::with_surfaces(surfaces).evaluate_for(scope.as_ref(), &context, surface)?;

    Ok(CheckReport {
        surface: Some(surface.to_string()),
        decision,
    })
}

/// Outcome of `mosaic conformance`.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub outcomes: Vec<ConformanceOutcome>,
}

impl ConformanceReport {
    /// Number of failing cases.
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed()).count()
    }

    /// Error if any case failed.
    pub fn into_result(self) -> Result<Self, CliError> {
        match self.failed() {
            0 => Ok(self),
            failed => Err(CliError::ConformanceFailed {
                failed,
                total: self.outcomes.len(),
            }),
        }
    }
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            if outcome.passed() {
                writeln!(f, "PASS {}", outcome.name)?;
            } else {
                writeln!(
                    f,
                    "FAIL {}: expected {}, got {:?}",
                    outcome.name, outcome.expected, outcome.decision
                )?;
            }
        }
        write!(
            f,
            "{} passed, {} failed",
            self.outcomes.len() - self.failed(),
            self.failed()
        )
    }
}

/// Run a fixture table.
pub async fn conformance(path: &Path) -> Result<ConformanceReport, CliError> {
    let json = tokio::fs::read_to_string(path).await?;
    let cases = parse_cases(&json)?;
    tracing::debug!(path = %path.display(), cases = cases.len(), "running conformance table");
    Ok(ConformanceReport {
        outcomes: run_cases(&cases),
    })
}

/// Outcome of `mosaic assemble`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembleReport {
    pub system_message: Option<String>,
    pub variables: BTreeMap<String, String>,
    pub resources: Vec<ContextResolverResource>,
    pub sources: Vec<ContextResolverSource>,
}

/// Assemble one request against a world file.
pub async fn assemble(
    args: &AssembleArgs,
    cancel: &CancellationToken,
) -> Result<AssembleReport, CliError> {
    let world = load_world(&args.world).await?;
    let store = Arc::new(MemoryStore::from_world(world));

    let items: Vec<RequestContextItem> = match &args.items {
        Some(arg) => serde_json::from_str(&read_json_arg(arg).await?)?,
        None => Vec::new(),
    };

    let mut ambient = AmbientState::new();
    if let Some(arg) = &args.identity {
        let identity: UserIdentity = serde_json::from_str(&read_json_arg(arg).await?)?;
        ambient = ambient.with_identity(identity);
    }
    if let Some(id) = args.entity {
        ambient = ambient.with_entity(id);
    }
    if let Some(id) = args.parent {
        ambient = ambient.with_parent_entity(id);
    }
    if let Some(id) = args.profile {
        ambient = ambient.with_profile(id);
    }

    let assembler = ContextAssembler::with_stores(store.clone(), store.clone(), store);
    let runtime = assembler.assemble(items, &ambient, cancel).await?;
    let resolved = runtime
        .data()
        .get(keys::RESOLVED_CONTEXT)
        .cloned()
        .unwrap_or_default();

    Ok(AssembleReport {
        system_message: runtime.system_message(),
        variables: runtime.variables().clone(),
        resources: resolved.resources,
        sources: resolved.sources,
    })
}
