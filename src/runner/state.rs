use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Case execution status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CaseStatus {
    Pending,
    Running,
    Passed,
    Failed { error: String },
}

/// State for a single test case execution
#[derive(Debug, Clone)]
pub struct CaseState {
    pub index: usize,
    pub case_name: String,
    pub status: CaseStatus,
    pub message: Option<String>,
    pub snapshot: Option<Value>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub duration_ms: Option<u64>,
    /// Wall-clock time the verdict was recorded
    pub verdict_at: Option<DateTime<Utc>>,
}

impl CaseState {
    pub fn new(index: usize, name: &str) -> Self {
        Self {
            index,
            case_name: name.to_string(),
            status: CaseStatus::Pending,
            message: None,
            snapshot: None,
            started_at: None,
            finished_at: None,
            duration_ms: None,
            verdict_at: None,
        }
    }

    pub fn start(&mut self) {
        self.status = CaseStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn pass(&mut self, message: String, snapshot: Option<Value>) {
        self.message = Some(message);
        self.snapshot = snapshot;
        self.finish(CaseStatus::Passed);
    }

    pub fn fail(&mut self, error: String) {
        self.message = Some(error.clone());
        self.finish(CaseStatus::Failed { error });
    }

    fn finish(&mut self, status: CaseStatus) {
        self.status = status;
        self.finished_at = Some(Instant::now());
        self.verdict_at = Some(Utc::now());
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    /// Serialize state for the result log (without Instant which isn't serializable)
    pub fn to_record(&self) -> CaseRecord {
        CaseRecord {
            name: self.case_name.clone(),
            passed: self.status == CaseStatus::Passed,
            message: self.message.clone().unwrap_or_default(),
            response_snapshot: self.snapshot.clone(),
            timestamp: self
                .verdict_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            duration_ms: self.duration_ms,
        }
    }
}

/// One entry of the ordered result log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub name: String,
    pub passed: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_snapshot: Option<Value>,
    /// ISO-8601 verdict time
    pub timestamp: String,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SuiteStatus {
    Pending,
    Running,
    Passed,
    Failed,
    PartiallyPassed { passed: u32, failed: u32 },
}

/// State for a whole suite execution
#[derive(Debug, Clone)]
pub struct SuiteState {
    pub suite_name: String,
    pub title: String,
    pub status: SuiteStatus,
    pub cases: Vec<CaseState>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub total_duration_ms: Option<u64>,
}

impl SuiteState {
    pub fn new(name: &str, title: &str, cases: Vec<CaseState>) -> Self {
        Self {
            suite_name: name.to_string(),
            title: title.to_string(),
            status: SuiteStatus::Pending,
            cases,
            started_at: None,
            finished_at: None,
            total_duration_ms: None,
        }
    }

    pub fn start(&mut self) {
        self.status = SuiteStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
        if let Some(start) = self.started_at {
            self.total_duration_ms = Some(start.elapsed().as_millis() as u64);
        }

        let (passed, failed) = self
            .cases
            .iter()
            .fold((0, 0), |(p, f), case| match case.status {
                CaseStatus::Passed => (p + 1, f),
                CaseStatus::Failed { .. } => (p, f + 1),
                _ => (p, f),
            });

        self.status = if failed == 0 {
            SuiteStatus::Passed
        } else if passed == 0 {
            SuiteStatus::Failed
        } else {
            SuiteStatus::PartiallyPassed { passed, failed }
        };
    }

    pub fn to_record(&self) -> SuiteRecord {
        SuiteRecord {
            suite_name: self.suite_name.clone(),
            status: self.status.clone(),
            cases: self.cases.iter().map(|c| c.to_record()).collect(),
            total_duration_ms: self.total_duration_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteRecord {
    pub suite_name: String,
    pub status: SuiteStatus,
    pub cases: Vec<CaseRecord>,
    pub total_duration_ms: Option<u64>,
}

/// Global run state across all selected suites
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: String,
    pub suites: Vec<SuiteState>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl SessionState {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            suites: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn add_suite(&mut self, suite: SuiteState) {
        self.suites.push(suite);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn summary(&self) -> TestSummary {
        let mut total_cases = 0;
        let mut passed = 0;
        let mut failed = 0;

        for suite in &self.suites {
            for case in &suite.cases {
                total_cases += 1;
                match case.status {
                    CaseStatus::Passed => passed += 1,
                    CaseStatus::Failed { .. } => failed += 1,
                    _ => {}
                }
            }
        }

        let total_duration_ms = self.started_at.map(|start| {
            self.finished_at
                .unwrap_or_else(Instant::now)
                .duration_since(start)
                .as_millis() as u64
        });

        TestSummary {
            session_id: self.session_id.clone(),
            total_suites: self.suites.len() as u32,
            total_cases,
            passed,
            failed,
            total_duration_ms,
        }
    }

    /// Serialize the whole run for the printed result log
    pub fn to_report(&self) -> SessionReport {
        SessionReport {
            session_id: self.session_id.clone(),
            suites: self.suites.iter().map(|s| s.to_record()).collect(),
            summary: self.summary(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub session_id: String,
    pub total_suites: u32,
    pub total_cases: u32,
    pub passed: u32,
    pub failed: u32,
    pub total_duration_ms: Option<u64>,
}

impl TestSummary {
    /// Pass percentage, guarded against an empty run
    pub fn success_rate(&self) -> f64 {
        let total = self.passed + self.failed;
        if total == 0 {
            0.0
        } else {
            self.passed as f64 / total as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: String,
    pub suites: Vec<SuiteRecord>,
    pub summary: TestSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished_case(index: usize, pass: bool) -> CaseState {
        let mut case = CaseState::new(index, &format!("case-{}", index));
        case.start();
        if pass {
            case.pass("ok".to_string(), None);
        } else {
            case.fail("boom".to_string());
        }
        case
    }

    #[test]
    fn test_counts_add_up() {
        let cases = vec![
            finished_case(0, true),
            finished_case(1, false),
            finished_case(2, true),
        ];
        let mut suite = SuiteState::new("backend", "Backend API", cases);
        suite.start();
        suite.finish();

        let mut session = SessionState::new("s1");
        session.start();
        session.add_suite(suite);
        session.finish();

        let summary = session.summary();
        assert_eq!(summary.passed + summary.failed, summary.total_cases);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_partial_suite_status() {
        let cases = vec![finished_case(0, true), finished_case(1, false)];
        let mut suite = SuiteState::new("edge", "Edge Cases", cases);
        suite.start();
        suite.finish();
        assert_eq!(
            suite.status,
            SuiteStatus::PartiallyPassed {
                passed: 1,
                failed: 1
            }
        );
    }

    #[test]
    fn test_success_rate_zero_guard() {
        let session = SessionState::new("empty");
        let summary = session.summary();
        assert_eq!(summary.success_rate(), 0.0);
    }

    #[test]
    fn test_success_rate() {
        let summary = TestSummary {
            session_id: "s".into(),
            total_suites: 1,
            total_cases: 4,
            passed: 3,
            failed: 1,
            total_duration_ms: None,
        };
        assert!((summary.success_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_case_record_timestamp_is_iso8601() {
        let case = finished_case(0, true);
        let record = case.to_record();
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }
}
