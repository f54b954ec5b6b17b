//! Golden fixture cases for scope evaluation.
//!
//! Every implementation of the scope algorithm (backend, client, CLI) must
//! agree on the same table of `(scope, context, dimensions) -> expected`
//! cases. This module defines the table format and runs it against
//! [`evaluate`].
//!
//! ```json
//! [
//!   {
//!     "name": "deny wins",
//!     "scope": {"allowRules": [{"sections": ["content"]}], "denyRules": [{"entityTypes": ["member"]}]},
//!     "context": {"section": "content", "entityType": "member"},
//!     "dimensions": ["section", "entityType"],
//!     "expected": false
//!   }
//! ]
//! ```

use serde::{Deserialize, Serialize};

use super::dimension::DimensionSet;
use super::evaluator::{evaluate, Availability, AvailabilityContext};
use super::rule::Scope;

/// One fixture row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConformanceCase {
    /// Case name.
    pub name: String,
    /// Scope under test; `null` means no scope.
    #[serde(default)]
    pub scope: Option<Scope>,
    /// Caller context.
    #[serde(default)]
    pub context: AvailabilityContext,
    /// Relevant dimensions.
    pub dimensions: DimensionSet,
    /// Expected availability.
    pub expected: bool,
}

/// Outcome of running one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformanceOutcome {
    /// Case name.
    pub name: String,
    /// Expected availability.
    pub expected: bool,
    /// Actual decision.
    pub decision: Availability,
}

impl ConformanceOutcome {
    /// True if the decision matches the expectation.
    pub fn passed(&self) -> bool {
        self.decision.is_available() == self.expected
    }
}

impl ConformanceCase {
    /// Evaluate this case.
    pub fn run(&self) -> ConformanceOutcome {
        ConformanceOutcome {
            name: self.name.clone(),
            expected: self.expected,
            decision: evaluate(self.scope.as_ref(), &self.context, &self.dimensions),
        }
    }
}

/// Parse a fixture table.
pub fn parse_cases(json: &str) -> Result<Vec<ConformanceCase>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Run every case in order.
pub fn run_cases(cases: &[ConformanceCase]) -> Vec<ConformanceOutcome> {
    cases.iter().map(ConformanceCase::run).collect()
}
