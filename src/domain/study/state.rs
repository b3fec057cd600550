//! Study state reducer.
//!
//! `StudyState` owns the whole session: setup, stage, transcript and
//! per-stage work text. Every change goes through one of three entry points
//! ([`StudyState::submit`], [`StudyState::send_message`], [`StudyState::apply`])
//! which mutate the state and return the side effects the caller must run.
//! Nothing here performs I/O or sleeps; timers and generation calls are the
//! runtime's job.
//!
//! # Stage transitions
//!
//! | From | Trigger | Appends | Effect |
//! |------|---------|---------|--------|
//! | NotStarted | submit | initial summary (log reset) | - |
//! | CreatingAgents | timer | "creating agents" status | - |
//! | PerformingTasks | timer | "performing tasks" status | - |
//! | Surveying | timer | one excerpt per persona | - |
//! | GeneratingInsights | timer | insight placeholder | `GenerateInsights` |
//! | Done | - | - | - |

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{require_non_blank, StateMachine, StudyId};

use super::config::{StudyConfig, StudySetupForm};
use super::errors::StudyError;
use super::message::Message;
use super::persona::{PersonaFeedback, PersonaId};
use super::prompts;
use super::stage::Stage;

/// Coarse lifecycle of a study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyStatus {
    /// Setup form visible, nothing running.
    Idle,
    /// Stages advancing or insights still pending.
    Running,
    /// Terminal stage reached and insights resolved.
    Completed,
}

/// Result of an external generation call, stripped of transport detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated(String),
    Failed,
}

impl GenerationOutcome {
    pub fn from_result<E>(result: Result<String, E>) -> Self {
        match result {
            Ok(text) => Self::Generated(text),
            Err(_) => Self::Failed,
        }
    }
}

/// Sequence number of a chat reply request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ReplyId(u64);

impl ReplyId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A chat reply the runtime must generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRequest {
    pub id: ReplyId,
    pub persona: Option<PersonaId>,
    pub prompt: String,
}

/// Asynchronous events fed back into the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The timer armed for `stage` elapsed.
    StageTimerFired { stage: Stage },
    /// The insight generation call finished.
    InsightsGenerated(GenerationOutcome),
    /// A chat reply generation call finished.
    ReplyGenerated {
        reply_id: ReplyId,
        outcome: GenerationOutcome,
    },
}

/// Side effects requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    GenerateInsights { prompt: String },
    GenerateReply(ReplyRequest),
}

/// Serializable view of a study, published to observers after every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudySnapshot {
    pub study_id: StudyId,
    pub status: StudyStatus,
    pub stage: Stage,
    pub stage_index: i8,
    pub stage_labels: Vec<String>,
    pub stage_work: Vec<String>,
    pub config: Option<StudyConfig>,
    pub messages: Vec<Message>,
    pub pending_replies: usize,
}

/// Owned state of one study session.
#[derive(Debug, Clone)]
pub struct StudyState {
    study_id: StudyId,
    personas: Arc<PersonaFeedback>,
    reply_word_limit: u32,
    config: Option<StudyConfig>,
    stage: Stage,
    messages: Vec<Message>,
    stage_work: Vec<String>,
    insight_slot: Option<usize>,
    insights_resolved: bool,
    next_reply_id: u64,
    pending_replies: BTreeMap<ReplyId, Option<PersonaId>>,
}

impl StudyState {
    /// Creates an idle study.
    pub fn new(personas: Arc<PersonaFeedback>, reply_word_limit: u32) -> Self {
        Self {
            study_id: StudyId::new(),
            personas,
            reply_word_limit,
            config: None,
            stage: Stage::NotStarted,
            messages: Vec::new(),
            stage_work: Vec::new(),
            insight_slot: None,
            insights_resolved: false,
            next_reply_id: 0,
            pending_replies: BTreeMap::new(),
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Commands
    // ───────────────────────────────────────────────────────────────

    /// Validates the setup form and starts the study.
    ///
    /// # Errors
    ///
    /// - `Validation` if goal or criteria is blank, or agent count is 0
    /// - `AlreadyStarted` if a study is running
    pub fn submit(&mut self, form: StudySetupForm) -> Result<(), StudyError> {
        let config = StudyConfig::try_from(form)?;
        self.start(config)
    }

    /// Starts the study with an already validated setup.
    pub fn start(&mut self, config: StudyConfig) -> Result<(), StudyError> {
        if self.stage != Stage::NotStarted {
            return Err(StudyError::AlreadyStarted);
        }
        let stage = self.stage.transition_to(Stage::CreatingAgents)?;

        self.stage_work = prompts::stage_work(config.agent_count()).to_vec();
        self.messages = vec![Message::agent(prompts::initial_summary(&config))];
        self.config = Some(config);
        self.stage = stage;
        Ok(())
    }

    /// Appends a user chat message and requests a reply.
    ///
    /// # Errors
    ///
    /// - `Validation` if the text is blank
    /// - `NotStarted` if no study is running
    pub fn send_message(&mut self, text: &str) -> Result<Vec<Effect>, StudyError> {
        require_non_blank("text", text)?;
        if self.stage == Stage::NotStarted {
            return Err(StudyError::NotStarted);
        }

        self.messages.push(Message::user(text));

        let (persona, prompt) =
            match prompts::find_mentioned_persona(text, &self.personas) {
                Some(persona) => (
                    Some(persona.id.clone()),
                    prompts::persona_reply_prompt(persona, text, self.reply_word_limit),
                ),
                None => (
                    None,
                    prompts::study_reply_prompt(&self.personas, text, self.reply_word_limit),
                ),
            };

        let id = ReplyId(self.next_reply_id);
        self.next_reply_id += 1;
        self.pending_replies.insert(id, persona.clone());

        Ok(vec![Effect::GenerateReply(ReplyRequest {
            id,
            persona,
            prompt,
        })])
    }

    // ───────────────────────────────────────────────────────────────
    // Events
    // ───────────────────────────────────────────────────────────────

    /// Applies an asynchronous event. Events that no longer match the state
    /// (stale timers, duplicate completions) are ignored.
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::StageTimerFired { stage } => self.advance_stage(stage),
            Event::InsightsGenerated(outcome) => {
                self.resolve_insights(outcome);
                Vec::new()
            }
            Event::ReplyGenerated { reply_id, outcome } => {
                self.resolve_reply(reply_id, outcome);
                Vec::new()
            }
        }
    }

    fn advance_stage(&mut self, fired_for: Stage) -> Vec<Effect> {
        if fired_for != self.stage || !self.stage.awaits_timer() {
            return Vec::new();
        }
        let Some(next) = self.stage.next() else {
            return Vec::new();
        };
        let Ok(next) = self.stage.transition_to(next) else {
            return Vec::new();
        };
        let agent_count = self.agent_count();
        let mut effects = Vec::new();

        match self.stage {
            Stage::CreatingAgents => {
                self.push_agent(prompts::creating_agents(agent_count));
            }
            Stage::PerformingTasks => {
                self.push_agent(prompts::performing_tasks(agent_count));
            }
            Stage::Surveying => {
                self.push_agent(prompts::survey_summary(agent_count, &self.personas));
            }
            Stage::GeneratingInsights => {
                self.insight_slot = Some(self.messages.len());
                self.push_agent(prompts::INSIGHT_PLACEHOLDER);
                effects.push(Effect::GenerateInsights {
                    prompt: prompts::insights_prompt(&self.personas),
                });
            }
            Stage::NotStarted | Stage::Done => {}
        }

        self.stage = next;
        effects
    }

    fn resolve_insights(&mut self, outcome: GenerationOutcome) {
        if self.insights_resolved {
            return;
        }
        let Some(slot) = self.insight_slot else {
            return;
        };

        let text = match outcome {
            GenerationOutcome::Generated(text) => prompts::format_insight(&text),
            GenerationOutcome::Failed => prompts::INSIGHT_APOLOGY.to_string(),
        };

        if let Some(work) = Stage::GeneratingInsights
            .progress_position()
            .and_then(|i| self.stage_work.get_mut(i))
        {
            *work = text.clone();
        }
        if let Some(message) = self.messages.get_mut(slot) {
            message.fill_placeholder(text);
        }
        self.insights_resolved = true;
    }

    fn resolve_reply(&mut self, reply_id: ReplyId, outcome: GenerationOutcome) {
        let Some(persona) = self.pending_replies.remove(&reply_id) else {
            return;
        };

        let message = match (outcome, persona) {
            (GenerationOutcome::Failed, _) => Message::agent(prompts::CHAT_APOLOGY),
            (GenerationOutcome::Generated(text), Some(id)) => match self.personas.get(id.as_str()) {
                Some(persona) => Message::from_persona(id, prompts::format_persona_reply(persona, &text)),
                None => Message::agent(text),
            },
            (GenerationOutcome::Generated(text), None) => Message::agent(text),
        };
        self.messages.push(message);
    }

    fn push_agent(&mut self, text: impl Into<String>) {
        self.messages.push(Message::agent(text));
    }

    fn agent_count(&self) -> u32 {
        self.config.as_ref().map_or(0, StudyConfig::agent_count)
    }

    // ───────────────────────────────────────────────────────────────
    // Queries
    // ───────────────────────────────────────────────────────────────

    /// Stage a timer must currently be armed for, if any.
    pub fn next_timer(&self) -> Option<Stage> {
        self.stage.awaits_timer().then_some(self.stage)
    }

    pub fn status(&self) -> StudyStatus {
        match self.stage {
            Stage::NotStarted => StudyStatus::Idle,
            Stage::Done if self.insights_resolved => StudyStatus::Completed,
            _ => StudyStatus::Running,
        }
    }

    pub fn study_id(&self) -> StudyId {
        self.study_id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> Option<&StudyConfig> {
        self.config.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn stage_work(&self) -> &[String] {
        &self.stage_work
    }

    pub fn personas(&self) -> &PersonaFeedback {
        &self.personas
    }

    pub fn pending_replies(&self) -> usize {
        self.pending_replies.len()
    }

    pub fn snapshot(&self) -> StudySnapshot {
        StudySnapshot {
            study_id: self.study_id,
            status: self.status(),
            stage: self.stage,
            stage_index: self.stage.index(),
            stage_labels: Stage::labels().into_iter().map(String::from).collect(),
            stage_work: self.stage_work.clone(),
            config: self.config.clone(),
            messages: self.messages.clone(),
            pending_replies: self.pending_replies.len(),
        }
    }
}
