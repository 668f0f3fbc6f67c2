use super::state::{ProbeRecord, Verdict};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration as StdDuration;
use tokio::sync::broadcast;

/// Harness events for real-time console output
#[derive(Debug, Clone)]
pub enum HarnessEvent {
    // Session events
    SessionStarted {
        session_id: String,
        target_count: usize,
    },
    SessionFinished {
        duration_secs: f64,
    },

    // Target events
    TargetStarted {
        label: String,
        base_url: String,
    },
    TargetNotReady {
        label: String,
        timeout_secs: u64,
    },
    TargetFinished {
        label: String,
        passed: u32,
        failed: u32,
        skipped: u32,
    },

    // Probe events
    ProbeStarted {
        name: String,
        description: String,
    },
    ProbeFinished {
        record: ProbeRecord,
    },
}

/// Event emitter for broadcasting harness events
pub struct EventEmitter {
    sender: broadcast::Sender<HarnessEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<HarnessEvent>) {
        let (sender, receiver) = broadcast::channel(100);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: HarnessEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }
}

/// One console line for a finished probe
pub fn verdict_line(record: &ProbeRecord) -> String {
    use colored::Colorize;

    match record.status {
        Verdict::Passed => format!("✓ {}: {}", record.description, record.message)
            .green()
            .to_string(),
        Verdict::Failed => format!("✗ {}: {}", record.description, record.message)
            .red()
            .to_string(),
        Verdict::Skipped => format!("⊘ {}: {}", record.description, record.message)
            .yellow()
            .to_string(),
    }
}

/// Console event listener for printing real-time updates.
///
/// Runs until every emitter is dropped.
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    pub async fn listen(mut receiver: broadcast::Receiver<HarnessEvent>) {
        use colored::Colorize;
        use std::io::IsTerminal;

        let tty = std::io::stdout().is_terminal();
        let mut spinner: Option<ProgressBar> = None;

        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            };

            match event {
                HarnessEvent::SessionStarted {
                    session_id,
                    target_count,
                } => {
                    println!(
                        "\n{} Registry QA session {} ({} targets)",
                        "▶".green().bold(),
                        session_id.cyan(),
                        target_count
                    );
                }

                HarnessEvent::TargetStarted { label, base_url } => {
                    println!("\n{}", "=".repeat(80));
                    println!(
                        "Running test suite for {}",
                        label.to_uppercase().white().bold()
                    );
                    println!("API URL: {}", base_url.cyan());
                    println!("{}\n", "=".repeat(80));
                }

                HarnessEvent::TargetNotReady {
                    label,
                    timeout_secs,
                } => {
                    println!(
                        "{}",
                        format!(
                            "Service not ready after {}s, skipping tests for {}",
                            timeout_secs, label
                        )
                        .red()
                    );
                }

                HarnessEvent::ProbeStarted { description, .. } => {
                    let pb = if tty {
                        ProgressBar::new_spinner()
                    } else {
                        // Piped output gets no escape codes
                        ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
                    };
                    if let Ok(style) = ProgressStyle::default_spinner()
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .template("  {spinner} {msg}")
                    {
                        pb.set_style(style);
                    }
                    pb.set_message(format!("{}...", description.dimmed()));
                    pb.enable_steady_tick(StdDuration::from_millis(100));
                    spinner = Some(pb);
                }

                HarnessEvent::ProbeFinished { record } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!("  {}", verdict_line(&record));
                }

                HarnessEvent::TargetFinished {
                    label,
                    passed,
                    failed,
                    skipped,
                } => {
                    println!(
                        "\n  {} {}: {} passed, {} failed, {} skipped",
                        "←".blue(),
                        label,
                        passed.to_string().green(),
                        failed.to_string().red(),
                        skipped.to_string().yellow()
                    );
                }

                HarnessEvent::SessionFinished { duration_secs } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!(
                        "\n{} Total test duration: {:.2}s",
                        "■".blue().bold(),
                        duration_secs
                    );
                }
            }
        }
    }
}
