//! Append-only JSONL deployment history.
//!
//! Every apply writes started/completed/failed events under
//! `state/<flow>/events.jsonl`, so past submissions stay auditable without
//! asking the platform.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Deployment lifecycle event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeployEvent {
    ApplyStarted {
        flow: String,
        run_id: String,
        lanzar_version: String,
    },
    ApplyCompleted {
        flow: String,
        run_id: String,
        deployment_id: String,
        fingerprint: String,
        duration_seconds: f64,
    },
    ApplyFailed {
        flow: String,
        run_id: String,
        error: String,
    },
}

/// Timestamped event wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampedEvent {
    pub ts: String,
    #[serde(flatten)]
    pub event: DeployEvent,
}

/// RFC 3339 UTC timestamp.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Generate a run id.
pub fn generate_run_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("d-{:012x}", nanos & 0xFFFF_FFFF_FFFF)
}

/// Derive the event log path for a flow.
pub fn event_log_path(state_dir: &Path, flow: &str) -> PathBuf {
    state_dir.join(flow).join("events.jsonl")
}

/// Append an event to the flow's event log.
pub fn append_event(state_dir: &Path, flow: &str, event: DeployEvent) -> Result<(), String> {
    let path = event_log_path(state_dir, flow);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| format!("cannot create state dir: {}", e))?;
    }

    let timestamped = TimestampedEvent {
        ts: now_rfc3339(),
        event,
    };
    let json =
        serde_json::to_string(&timestamped).map_err(|e| format!("JSON serialize error: {}", e))?;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("cannot open event log {}: {}", path.display(), e))?;

    writeln!(file, "{}", json).map_err(|e| format!("write error: {}", e))?;

    Ok(())
}

/// Read all events logged for a flow, oldest first.
pub fn read_events(state_dir: &Path, flow: &str) -> Result<Vec<TimestampedEvent>, String> {
    let path = event_log_path(state_dir, flow);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path)
        .map_err(|e| format!("cannot read event log {}: {}", path.display(), e))?;

    let mut events = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event: TimestampedEvent = serde_json::from_str(line)
            .map_err(|e| format!("bad event at {}:{}: {}", path.display(), number + 1, e))?;
        events.push(event);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_now_rfc3339() {
        let ts = now_rfc3339();
        assert!(ts.starts_with("20"));
        assert!(ts.ends_with('Z'));
        assert!(ts.contains('T'));
    }

    #[test]
    fn test_history_generate_run_id() {
        let id = generate_run_id();
        assert!(id.starts_with("d-"));
        assert!(id.len() > 4);
    }

    #[test]
    fn test_history_event_log_path() {
        let p = event_log_path(Path::new("/state"), "simple_flow");
        assert_eq!(p, PathBuf::from("/state/simple_flow/events.jsonl"));
    }

    #[test]
    fn test_history_append_and_read() {
        let dir = tempfile::tempdir().unwrap();
        append_event(
            dir.path(),
            "f",
            DeployEvent::ApplyStarted {
                flow: "f".to_string(),
                run_id: "d-abc".to_string(),
                lanzar_version: "0.3.0".to_string(),
            },
        )
        .unwrap();
        append_event(
            dir.path(),
            "f",
            DeployEvent::ApplyCompleted {
                flow: "f".to_string(),
                run_id: "d-abc".to_string(),
                deployment_id: "dep-1".to_string(),
                fingerprint: "blake3:xyz".to_string(),
                duration_seconds: 0.4,
            },
        )
        .unwrap();

        let events = read_events(dir.path(), "f").unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].event, DeployEvent::ApplyStarted { .. }));
        assert!(matches!(
            events[1].event,
            DeployEvent::ApplyCompleted { .. }
        ));
    }

    #[test]
    fn test_history_event_serde_tag() {
        let event = DeployEvent::ApplyFailed {
            flow: "f".to_string(),
            run_id: "d-1".to_string(),
            error: "boom".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"apply_failed\""));
        assert!(json.contains("\"run_id\":\"d-1\""));
    }

    #[test]
    fn test_history_read_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let events = read_events(dir.path(), "never-applied").unwrap();
        assert!(events.is_empty());
    }
}
