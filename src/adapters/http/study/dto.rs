//! DTOs for study endpoints.

use serde::{Deserialize, Serialize};

use crate::application::{SendMessageCommand, StartStudyCommand};
use crate::domain::study::{Message, Sender, Stage, StudyConfig, StudySnapshot, StudyStatus};

// ════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/study`.
#[derive(Debug, Clone, Deserialize)]
pub struct StartStudyRequest {
    pub goal: String,
    pub criteria: String,
    #[serde(default = "default_agent_count")]
    pub agent_count: u32,
}

fn default_agent_count() -> u32 {
    3
}

impl From<StartStudyRequest> for StartStudyCommand {
    fn from(req: StartStudyRequest) -> Self {
        StartStudyCommand {
            goal: req.goal,
            criteria: req.criteria,
            agent_count: req.agent_count,
        }
    }
}

/// Body of `POST /api/study/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

impl From<SendMessageRequest> for SendMessageCommand {
    fn from(req: SendMessageRequest) -> Self {
        SendMessageCommand { text: req.text }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════

/// Full study view, returned by every endpoint and pushed over the stream.
#[derive(Debug, Clone, Serialize)]
pub struct StudyResponse {
    pub study_id: String,
    pub status: StudyStatus,
    pub stage: Stage,
    pub stage_index: i8,
    pub stage_labels: Vec<String>,
    pub stage_work: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<StudyConfigResponse>,
    pub messages: Vec<MessageResponse>,
    pub pending_replies: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudyConfigResponse {
    pub goal: String,
    pub criteria: String,
    pub agent_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub sender: Sender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    pub text: String,
    pub created_at: String,
}

impl From<StudySnapshot> for StudyResponse {
    fn from(snapshot: StudySnapshot) -> Self {
        Self {
            study_id: snapshot.study_id.to_string(),
            status: snapshot.status,
            stage: snapshot.stage,
            stage_index: snapshot.stage_index,
            stage_labels: snapshot.stage_labels,
            stage_work: snapshot.stage_work,
            config: snapshot.config.as_ref().map(StudyConfigResponse::from),
            messages: snapshot.messages.iter().map(MessageResponse::from).collect(),
            pending_replies: snapshot.pending_replies,
        }
    }
}

impl From<&StudyConfig> for StudyConfigResponse {
    fn from(config: &StudyConfig) -> Self {
        Self {
            goal: config.goal().to_string(),
            criteria: config.criteria().to_string(),
            agent_count: config.agent_count(),
        }
    }
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id().to_string(),
            sender: message.sender(),
            persona: message.persona().map(|p| p.to_string()),
            text: message.text().to_string(),
            created_at: message.created_at().as_datetime().to_rfc3339(),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self {
            code: "VALIDATION_FAILED".to_string(),
            message: message.into(),
            details: Some(serde_json::json!({ "field": field })),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            code: "CONFLICT".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            code: "SERVICE_UNAVAILABLE".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::study::{PersonaFeedback, StudySetupForm, StudyState};
    use std::sync::Arc;

    #[test]
    fn start_request_defaults_agent_count() {
        let req: StartStudyRequest =
            serde_json::from_str(r#"{"goal":"Cart","criteria":"students"}"#).unwrap();
        assert_eq!(req.agent_count, 3);
    }

    #[test]
    fn study_response_serializes_running_study() {
        let mut state = StudyState::new(Arc::new(PersonaFeedback::builtin()), 150);
        state
            .submit(StudySetupForm {
                goal: "Cart".to_string(),
                criteria: "students".to_string(),
                agent_count: 2,
            })
            .unwrap();

        let json = serde_json::to_value(StudyResponse::from(state.snapshot())).unwrap();

        assert_eq!(json["status"], "running");
        assert_eq!(json["stage"], "creating_agents");
        assert_eq!(json["stage_index"], 0);
        assert_eq!(json["config"]["agent_count"], 2);
        assert_eq!(json["messages"][0]["sender"], "agent");
        assert!(json["messages"][0].get("persona").is_none());
    }

    #[test]
    fn idle_response_omits_config() {
        let state = StudyState::new(Arc::new(PersonaFeedback::builtin()), 150);
        let json = serde_json::to_value(StudyResponse::from(state.snapshot())).unwrap();
        assert_eq!(json["stage_index"], -1);
        assert!(json.get("config").is_none());
    }

    #[test]
    fn validation_error_carries_field() {
        let error = ErrorResponse::validation("goal", "Field 'goal' cannot be empty");
        assert_eq!(error.code, "VALIDATION_FAILED");
        assert_eq!(error.details.unwrap()["field"], "goal");
    }
}
