//! Aggregate conformance report: one entry per scenario run, serializable
//! as JSON for machine consumption or rendered as plain text for a
//! terminal.

use serde::Serialize;

use crate::scenarios::ScenarioOutcome;
use crate::trace::TraceEvent;

#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub passed: bool,
    pub detail: String,
    pub trace: Vec<TraceEvent>,
}

impl From<ScenarioOutcome> for ScenarioReport {
    fn from(outcome: ScenarioOutcome) -> Self {
        Self {
            name: outcome.name.to_string(),
            passed: outcome.passed,
            detail: outcome.detail,
            trace: outcome.trace,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConformanceReport {
    pub scenarios: Vec<ScenarioReport>,
}

impl ConformanceReport {
    #[must_use]
    pub fn from_outcomes(outcomes: Vec<ScenarioOutcome>) -> Self {
        Self {
            scenarios: outcomes.into_iter().map(ScenarioReport::from).collect(),
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.scenarios.iter().all(|s| s.passed)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for scenario in &self.scenarios {
            let status = if scenario.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!("[{status}] {} - {}\n", scenario.name, scenario.detail));
        }
        let passed = self.scenarios.iter().filter(|s| s.passed).count();
        out.push_str(&format!("{passed}/{} scenarios passed\n", self.scenarios.len()));
        out
    }
}
