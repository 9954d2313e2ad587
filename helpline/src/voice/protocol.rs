//! Wire frames between the voice worker and the media platform.

use serde::{Deserialize, Serialize};

/// Frames the worker sends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerFrame {
    /// First frame after connecting.
    Register {
        api_key: String,
        worker_type: String,
        version: String,
    },
    /// Synthesized agent speech for a job.
    AgentSpeech {
        job_id: String,
        text: String,
        allow_interruptions: bool,
    },
}

/// Frames the platform sends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Registration acknowledged.
    Registered { worker_id: String },
    /// A participant joined a room; the worker owns this job now.
    JobAssignment {
        job_id: String,
        room_name: String,
        participant_identity: String,
    },
    /// Transcribed caller speech.
    UserUtterance { job_id: String, text: String },
    /// The room emptied or the job was cancelled.
    JobClosed { job_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_tagging() {
        let frame = WorkerFrame::AgentSpeech {
            job_id: "j1".to_string(),
            text: "hello".to_string(),
            allow_interruptions: true,
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains(r#""type":"agent_speech""#));

        let back: WorkerFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn test_server_frame_roundtrip() {
        let raw = r#"{"type":"job_assignment","job_id":"j1","room_name":"parul-admission","participant_identity":"student-1"}"#;
        let frame: ServerFrame = serde_json::from_str(raw).unwrap();
        assert_eq!(
            frame,
            ServerFrame::JobAssignment {
                job_id: "j1".to_string(),
                room_name: "parul-admission".to_string(),
                participant_identity: "student-1".to_string(),
            }
        );
    }
}
