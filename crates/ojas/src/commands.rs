//! Execution of CLI commands against the memory facade.

use crate::{Command, ProfileAction};
use anyhow::{Context, bail};
use log::debug;
use ojas_memory::{ConversationMemory, ProfileRecord, Role, UserProfile};
use std::fs;

/// Run one command, returning text to print, if any.
pub(crate) fn run(
    memory: &ConversationMemory,
    command: Command,
) -> anyhow::Result<Option<String>> {
    debug!("running command: {command:?}");
    match command {
        Command::Say { role, text } => {
            let role: Role = role.parse()?;
            memory.add_message(role, text);
            Ok(None)
        }
        Command::Recent { count } => {
            let messages = memory.recent_messages(count);
            Ok(Some(serde_json::to_string_pretty(&messages)?))
        }
        Command::Context => Ok(Some(memory.context_for_prompt())),
        Command::Info => Ok(Some(serde_json::to_string_pretty(&memory.user_info())?)),
        Command::Update { json } => {
            let fragment: ProfileRecord =
                serde_json::from_str(&json).context("invalid user info JSON")?;
            memory.update_user_info(fragment);
            Ok(None)
        }
        Command::Metrics { entries } => {
            let metrics = entries
                .iter()
                .map(|entry| parse_metric(entry))
                .collect::<anyhow::Result<Vec<_>>>()?;
            memory.report_health_metrics(metrics);
            Ok(None)
        }
        Command::Clear => {
            memory.clear_memory();
            Ok(None)
        }
        Command::Profile { action } => run_profile(memory, action),
    }
}

fn run_profile(
    memory: &ConversationMemory,
    action: ProfileAction,
) -> anyhow::Result<Option<String>> {
    match action {
        ProfileAction::Show => match memory.user_profile() {
            Some(profile) => Ok(Some(serde_json::to_string_pretty(&profile)?)),
            None => Ok(Some("no profile saved".to_string())),
        },
        ProfileAction::Save { path } => {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let profile: UserProfile =
                serde_json::from_str(&contents).context("invalid profile JSON")?;
            memory.save_user_profile(&profile);
            Ok(None)
        }
        ProfileAction::Clear => {
            memory.clear_user_profile();
            Ok(None)
        }
    }
}

/// Parse a `name=value` metric with a finite numeric value.
fn parse_metric(entry: &str) -> anyhow::Result<(String, f64)> {
    let Some((name, value)) = entry.split_once('=') else {
        bail!("metric must look like name=value: {entry}");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("metric name is empty: {entry}");
    }
    let value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("metric value is not a number: {entry}"))?;
    if !value.is_finite() {
        bail!("metric value must be finite: {entry}");
    }
    Ok((name.to_string(), value))
}
