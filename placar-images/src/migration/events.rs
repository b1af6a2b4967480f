use serde::Serialize;

use super::MigrationReport;

/// One line of the streaming job's NDJSON output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MigrationEvent {
    Log {
        message: String,
    },
    /// Percentage over the team collection only.
    Progress {
        progress: f64,
        message: String,
    },
    Error {
        message: String,
        fatal: bool,
    },
    Complete {
        message: String,
        result: MigrationReport,
    },
}

impl MigrationEvent {
    pub fn log(message: impl Into<String>) -> Self {
        MigrationEvent::Log {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>, fatal: bool) -> Self {
        MigrationEvent::Error {
            message: message.into(),
            fatal,
        }
    }

    /// `processed / total * 100`, or 100 when there is nothing to process.
    pub fn progress(processed: usize, total: usize, message: impl Into<String>) -> Self {
        let progress = if total == 0 {
            100.0
        } else {
            processed as f64 / total as f64 * 100.0
        };
        MigrationEvent::Progress {
            progress,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn events_are_type_tagged() {
        assert_eq!(
            serde_json::to_value(MigrationEvent::log("hi")).unwrap(),
            json!({"type": "log", "message": "hi"})
        );
        assert_eq!(
            serde_json::to_value(MigrationEvent::error("boom", true)).unwrap(),
            json!({"type": "error", "message": "boom", "fatal": true})
        );
        assert_eq!(
            serde_json::to_value(MigrationEvent::progress(1, 4, "1/4")).unwrap(),
            json!({"type": "progress", "progress": 25.0, "message": "1/4"})
        );
    }

    #[test]
    fn empty_team_collection_is_complete() {
        let MigrationEvent::Progress { progress, .. } = MigrationEvent::progress(0, 0, "") else {
            panic!("expected progress");
        };
        assert_eq!(progress, 100.0);
    }
}
