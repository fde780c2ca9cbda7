use anyhow::Result;
use uuid::Uuid;

use super::context::RunContext;
use super::events::{ConsoleEventListener, EventEmitter, TestEvent};
use super::state::{CaseState, SessionState, SuiteState, TestSummary};
use crate::client::ApiClient;
use crate::suites::Suite;

/// Drives suites case by case against one client session.
///
/// A case failure is recorded and the run continues with the next case;
/// nothing short of a panic aborts the sweep.
pub struct SuiteExecutor {
    client: ApiClient,
    context: RunContext,
    session: SessionState,
    emitter: EventEmitter,
    listener: Option<tokio::task::JoinHandle<()>>,
}

impl SuiteExecutor {
    pub fn new(client: ApiClient) -> Self {
        let (emitter, receiver) = EventEmitter::new();

        // Console rendering happens off the execution path; the handle is
        // joined in finish() so the summary always lands before we return
        let listener = tokio::spawn(ConsoleEventListener::listen(receiver));

        Self {
            client,
            context: RunContext::new(),
            session: SessionState::new(&Uuid::new_v4().to_string()),
            emitter,
            listener: Some(listener),
        }
    }

    pub fn start(&mut self, base_url: &str) {
        self.session.start();
        self.emitter.emit(TestEvent::SessionStarted {
            session_id: self.session.session_id.clone(),
            base_url: base_url.to_string(),
        });
    }

    /// Run one suite to completion, recording a verdict per case.
    pub async fn run_suite(&mut self, suite: &Suite) {
        // Fresh capture bag per suite, matching one script per process
        self.context = RunContext::new();

        let case_states: Vec<CaseState> = suite
            .cases
            .iter()
            .enumerate()
            .map(|(i, case)| CaseState::new(i, case.name))
            .collect();
        let mut suite_state = SuiteState::new(suite.name, suite.title, case_states);

        self.emitter.emit(TestEvent::SuiteStarted {
            suite_name: suite.name.to_string(),
            title: suite.title.to_string(),
            case_count: suite.cases.len(),
        });
        suite_state.start();

        for (i, case) in suite.cases.iter().enumerate() {
            let Some(case_state) = suite_state.cases.get_mut(i) else {
                continue;
            };
            case_state.start();

            self.emitter.emit(TestEvent::CaseStarted {
                suite_name: suite.name.to_string(),
                index: i,
                case_name: case.name.to_string(),
            });

            match (case.run)(&self.client, &mut self.context).await {
                Ok(pass) => {
                    case_state.pass(pass.message.clone(), pass.snapshot);
                    let duration = case_state.duration_ms.unwrap_or(0);

                    self.emitter.emit(TestEvent::CasePassed {
                        suite_name: suite.name.to_string(),
                        index: i,
                        message: pass.message,
                        duration_ms: duration,
                    });
                }
                Err(e) => {
                    let error_msg = e.to_string();
                    case_state.fail(error_msg.clone());
                    let duration = case_state.duration_ms.unwrap_or(0);

                    self.emitter.emit(TestEvent::CaseFailed {
                        suite_name: suite.name.to_string(),
                        index: i,
                        error: error_msg,
                        duration_ms: duration,
                    });
                }
            }
        }

        suite_state.finish();

        self.emitter.emit(TestEvent::SuiteFinished {
            suite_name: suite.name.to_string(),
            status: suite_state.status.clone(),
            duration_ms: suite_state.total_duration_ms,
        });

        self.session.add_suite(suite_state);
    }

    /// Close the session, print the optional result log, return the summary.
    pub async fn finish(&mut self, show_results: bool) -> Result<TestSummary> {
        self.session.finish();
        let summary = self.session.summary();

        self.emitter.emit(TestEvent::SessionFinished {
            summary: summary.clone(),
        });

        // The listener exits after printing the summary; wait for it so the
        // result log below cannot interleave with event output
        if let Some(listener) = self.listener.take() {
            let _ = listener.await;
        }

        if show_results {
            let report = self.session.to_report();
            println!("\n{}", serde_json::to_string_pretty(&report)?);
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::runner::state::CaseStatus;
    use crate::suites::{CaseDef, CasePass, CaseResult};

    async fn missing_prereq(_client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
        let _ = ctx.request_id()?;
        Ok(CasePass::new("unreachable"))
    }

    async fn capture_request(_client: &ApiClient, ctx: &mut RunContext) -> CaseResult {
        ctx.request_id = Some("req-1".to_string());
        Ok(CasePass::new("captured"))
    }

    fn wired_suite() -> crate::suites::Suite {
        crate::suites::Suite {
            name: "wired",
            title: "Wired Cases",
            cases: vec![
                CaseDef::new("Missing Prereq", |c, ctx| Box::pin(missing_prereq(c, ctx))),
                CaseDef::new("Capture Request", |c, ctx| {
                    Box::pin(capture_request(c, ctx))
                }),
            ],
        }
    }

    #[tokio::test]
    async fn test_failed_case_does_not_stop_the_suite() {
        let client = ApiClient::new(&Config::default());
        let mut executor = SuiteExecutor::new(client);

        executor.start("http://localhost:0/api");
        executor.run_suite(&wired_suite()).await;
        let summary = executor.finish(false).await.unwrap();

        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.passed + summary.failed, summary.total_cases);

        let cases = &executor.session.suites[0].cases;
        assert!(
            matches!(&cases[0].status, CaseStatus::Failed { error } if error.contains("no data available")),
            "first case should fail on the missing prerequisite"
        );
        assert_eq!(cases[1].status, CaseStatus::Passed);
    }

    #[tokio::test]
    async fn test_fresh_context_per_suite() {
        let client = ApiClient::new(&Config::default());
        let mut executor = SuiteExecutor::new(client);

        executor.start("http://localhost:0/api");
        executor.run_suite(&wired_suite()).await;
        assert_eq!(executor.context.request_id.as_deref(), Some("req-1"));

        // The id captured in the first run must not satisfy the prerequisite
        // check at the start of the second
        executor.run_suite(&wired_suite()).await;
        let summary = executor.finish(false).await.unwrap();
        assert_eq!(summary.failed, 2);
        assert!(matches!(
            executor.session.suites[1].cases[0].status,
            CaseStatus::Failed { .. }
        ));
    }

    async fn transport_failure(client: &ApiClient, _ctx: &mut RunContext) -> CaseResult {
        client.get("/").await?;
        Ok(CasePass::new("unreachable"))
    }

    #[tokio::test]
    async fn test_transport_error_is_recorded_not_raised() {
        // Port 0 is unroutable, so the request itself fails
        let client = ApiClient::new(&Config {
            base_url: "http://localhost:0/api".to_string(),
            timeout_secs: 1,
            ..Config::default()
        });
        let mut executor = SuiteExecutor::new(client);

        executor.start("http://localhost:0/api");
        executor
            .run_suite(&crate::suites::Suite {
                name: "offline",
                title: "Offline",
                cases: vec![CaseDef::new("Root Endpoint", |c, ctx| {
                    Box::pin(transport_failure(c, ctx))
                })],
            })
            .await;
        let summary = executor.finish(false).await.unwrap();

        assert_eq!(summary.failed, 1);
        assert!(matches!(
            executor.session.suites[0].cases[0].status,
            CaseStatus::Failed { .. }
        ));
    }
}

