//! Circuit configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default period of the clock kind.
pub const DEFAULT_CLOCK_PERIOD: Duration = Duration::from_secs(1);

/// Default bound on gate evaluations per propagation cascade.
pub const DEFAULT_MAX_PROPAGATION_STEPS: usize = 10_000;

/// How the graph treats wires that close a directed cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackPolicy {
    /// Connections that would create a feedback loop are rejected.
    #[default]
    Reject,
    /// Feedback loops are allowed. Cascades that do not settle within
    /// [`CircuitConfig::max_propagation_steps`] fail and are rolled back.
    Allow,
}

/// Configuration of a [`CircuitGraph`](crate::CircuitGraph).
#[derive(derive_builder::Builder, Clone, Debug, Deserialize, Serialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct CircuitConfig {
    /// Period between two emissions of a clock gate.
    #[builder(default = "DEFAULT_CLOCK_PERIOD")]
    clock_period: Duration,
    /// Policy for connections closing a feedback loop.
    #[builder(default)]
    feedback: FeedbackPolicy,
    /// Maximum number of gate evaluations a single cascade may perform.
    #[builder(default = "DEFAULT_MAX_PROPAGATION_STEPS")]
    max_propagation_steps: usize,
}

impl CircuitConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.clock_period == Some(Duration::ZERO) {
            return Err("clock_period must be non-zero".to_string());
        }

        if self.max_propagation_steps == Some(0) {
            return Err("max_propagation_steps must be greater than zero".to_string());
        }

        Ok(())
    }
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            clock_period: DEFAULT_CLOCK_PERIOD,
            feedback: FeedbackPolicy::default(),
            max_propagation_steps: DEFAULT_MAX_PROPAGATION_STEPS,
        }
    }
}

impl CircuitConfig {
    /// Creates a new builder for `CircuitConfig`.
    pub fn builder() -> CircuitConfigBuilder {
        CircuitConfigBuilder::default()
    }

    /// Returns the clock period.
    pub fn clock_period(&self) -> Duration {
        self.clock_period
    }

    /// Returns the feedback policy.
    pub fn feedback(&self) -> FeedbackPolicy {
        self.feedback
    }

    /// Returns the maximum number of gate evaluations per cascade.
    pub fn max_propagation_steps(&self) -> usize {
        self.max_propagation_steps
    }
}
