//! Audit trace models.
//!
//! Every salary calculation records the rules it applied, with inputs,
//! outputs and a human-readable explanation, so a payslip can be traced
//! back to attendance and statutory parameters.

use serde::{Deserialize, Serialize};

/// A single step in the audit trace recording a calculation decision.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "working_days".to_string(),
///     rule_name: "Working Days Aggregation".to_string(),
///     input: serde_json::json!({ "present": 22, "half_day": 2 }),
///     output: serde_json::json!({ "working_days": "23" }),
///     reasoning: "22 present + 0.5 x 2 half days = 23".to_string(),
/// };
/// assert_eq!(step.rule_id, "working_days");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// Returns the step recorded for the given rule, if any.
    pub fn step(&self, rule_id: &str) -> Option<&AuditStep> {
        self.steps.iter().find(|s| s.rule_id == rule_id)
    }
}
