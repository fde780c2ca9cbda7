use super::state::{SuiteStatus, TestSummary};
use tokio::sync::broadcast;

/// Test execution events for real-time console updates
#[derive(Debug, Clone)]
pub enum TestEvent {
    // Session events
    SessionStarted {
        session_id: String,
        base_url: String,
    },
    SessionFinished {
        summary: TestSummary,
    },

    // Suite events
    SuiteStarted {
        suite_name: String,
        title: String,
        case_count: usize,
    },
    SuiteFinished {
        suite_name: String,
        status: SuiteStatus,
        duration_ms: Option<u64>,
    },

    // Case events
    CaseStarted {
        suite_name: String,
        index: usize,
        case_name: String,
    },
    CasePassed {
        suite_name: String,
        index: usize,
        message: String,
        duration_ms: u64,
    },
    CaseFailed {
        suite_name: String,
        index: usize,
        error: String,
        duration_ms: u64,
    },

    // Log event for coordinated output
    Log {
        message: String,
    },
}

/// Event emitter for broadcasting test events
pub struct EventEmitter {
    sender: broadcast::Sender<TestEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<TestEvent>) {
        let (sender, receiver) = broadcast::channel(100);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: TestEvent) {
        let _ = self.sender.send(event);
    }
}

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration as StdDuration;

/// Console event listener for printing real-time updates
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    pub async fn listen(mut receiver: broadcast::Receiver<TestEvent>) {
        use colored::Colorize;
        use indicatif::ProgressDrawTarget;
        use std::io::IsTerminal;

        // Hidden draw target when piped to avoid terminal escape codes
        let multi = if std::io::stdout().is_terminal() {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let mut spinner: Option<ProgressBar> = None;
        let mut case_text = String::new();

        while let Ok(event) = receiver.recv().await {
            match event {
                TestEvent::SessionStarted {
                    session_id,
                    base_url,
                } => {
                    multi
                        .println(format!(
                            "\n{} Test session started: {}\n  Base URL: {}",
                            "▶".green().bold(),
                            session_id.cyan(),
                            base_url.cyan()
                        ))
                        .ok();
                }

                TestEvent::SessionFinished { summary } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish();
                    }

                    println!("\n{} Test session finished", "■".blue().bold());
                    println!("  Total suites: {}", summary.total_suites);
                    println!("  Total cases: {}", summary.total_cases);
                    println!(
                        "  {} passed, {} failed",
                        summary.passed.to_string().green(),
                        summary.failed.to_string().red()
                    );
                    println!("  Success rate: {:.1}%", summary.success_rate());
                    if let Some(duration) = summary.total_duration_ms {
                        println!("  Duration: {}ms", duration);
                    }

                    // The session is over; exit so the executor can join us
                    // and anything printed afterwards lands below the summary
                    break;
                }

                TestEvent::SuiteStarted {
                    title, case_count, ..
                } => {
                    println!(
                        "\n  {} Suite: {} ({} cases)",
                        "→".blue(),
                        title.white().bold(),
                        case_count
                    );
                }

                TestEvent::SuiteFinished {
                    suite_name,
                    status,
                    duration_ms,
                } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish();
                    }

                    let status_str = match status {
                        SuiteStatus::Passed => "PASSED".green().bold(),
                        SuiteStatus::Failed => "FAILED".red().bold(),
                        SuiteStatus::PartiallyPassed { passed, failed } => {
                            format!("PARTIAL ({}/{} passed)", passed, passed + failed)
                                .yellow()
                                .bold()
                        }
                        _ => "UNKNOWN".white().bold(),
                    };
                    println!("  {} Suite {} [{}]", "←".blue(), suite_name, status_str);
                    if let Some(duration) = duration_ms {
                        println!("    Duration: {}ms", duration);
                    }
                }

                TestEvent::CaseStarted {
                    index, case_name, ..
                } => {
                    let pb = multi.add(ProgressBar::new_spinner());
                    let style = ProgressStyle::default_spinner()
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .template("    {spinner} {msg}")
                        .unwrap();
                    pb.set_style(style);

                    case_text = format!("[{}] {}", index, case_name);
                    pb.set_message(format!("{}... ", case_text.clone().dimmed()));
                    pb.enable_steady_tick(StdDuration::from_millis(100));

                    spinner = Some(pb);
                }

                TestEvent::CasePassed {
                    message,
                    duration_ms,
                    ..
                } => {
                    let done_msg = format!(
                        "    {} {}: {} ({}ms)",
                        "✓".green(),
                        case_text,
                        message,
                        duration_ms
                    );
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
                    }
                    println!("{}", done_msg);
                }

                TestEvent::CaseFailed {
                    error, duration_ms, ..
                } => {
                    let done_msg = format!(
                        "    {} {}: {} ({}ms)",
                        "✗".red(),
                        case_text,
                        error.red(),
                        duration_ms
                    );
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
                    }
                    println!("{}", done_msg);
                }

                TestEvent::Log { message } => {
                    multi.println(format!("      {}", message)).ok();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listener_exits_after_session_finished() {
        let (emitter, receiver) = EventEmitter::new();
        let handle = tokio::spawn(ConsoleEventListener::listen(receiver));

        emitter.emit(TestEvent::SessionFinished {
            summary: TestSummary {
                session_id: "s".into(),
                total_suites: 0,
                total_cases: 0,
                passed: 0,
                failed: 0,
                total_duration_ms: None,
            },
        });

        // Hangs (and times out the test) if the listener never breaks
        handle.await.unwrap();
    }
}

