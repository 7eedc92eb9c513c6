//! Alarm and desktop notification delivery through external commands

use anyhow::{bail, Context};
use futures::future::BoxFuture;
use tokio::process::Command;
use tracing::{debug, info};

use super::EffectsSink;
use crate::state::CompletionEvent;

/// Runs an optional alarm command and an optional `notify-send` call per completion
#[derive(Debug, Clone, Default)]
pub struct CommandSink {
    /// Shell-style command line for the audible alarm, e.g. `paplay /usr/share/sounds/alarm.oga`
    pub alarm_command: Option<Vec<String>>,
    /// Post a desktop notification via `notify-send`
    pub notify: bool,
}

impl CommandSink {
    pub fn new(alarm_command: Option<&str>, notify: bool) -> Self {
        let alarm_command = alarm_command
            .map(|cmd| cmd.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|parts| !parts.is_empty());
        Self { alarm_command, notify }
    }

    pub fn is_noop(&self) -> bool {
        self.alarm_command.is_none() && !self.notify
    }
}

impl EffectsSink for CommandSink {
    fn name(&self) -> &str {
        "command"
    }

    fn deliver(&self, event: CompletionEvent) -> BoxFuture<'static, anyhow::Result<()>> {
        let alarm = self.alarm_command.clone();
        let notify = self.notify;

        Box::pin(async move {
            let mut failures = Vec::new();

            if let Some(parts) = alarm {
                if let Err(e) = play_alarm(&parts).await {
                    failures.push(format!("{:#}", e));
                }
            }
            if notify {
                if let Err(e) = send_notification(&event).await {
                    failures.push(format!("{:#}", e));
                }
            }

            if !failures.is_empty() {
                bail!("effects for '{}' failed: {}", event.timer_name, failures.join("; "));
            }
            Ok(())
        })
    }
}

/// Execute the configured alarm command
async fn play_alarm(parts: &[String]) -> anyhow::Result<()> {
    let (program, args) = parts.split_first().context("empty alarm command")?;
    debug!("Playing alarm with {}", program);

    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .with_context(|| format!("Failed to execute {}", program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{} failed: {}", program, stderr);
    }
    Ok(())
}

/// Post a desktop notification for a finished countdown
async fn send_notification(event: &CompletionEvent) -> anyhow::Result<()> {
    let output = Command::new("notify-send")
        .args(["--urgency=critical", "Timer finished", &format!("{} is done", event.timer_name)])
        .output()
        .await
        .context("Failed to execute notify-send")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("notify-send failed: {}", stderr);
    }

    info!("Notification sent for {}", event.timer_name);
    Ok(())
}
