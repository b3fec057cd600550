//! StudyRuntime - Actor that owns the study state and executes its effects.
//!
//! The reducer in `domain::study` is pure; this module supplies the time and
//! I/O around it:
//!
//! 1. Commands from callers (submit, chat, reset) arrive over an mpsc channel
//! 2. The stage timer is a spawned sleep task that posts `StageTimerFired`
//! 3. Insight generation runs in its own task
//! 4. Chat replies run through a single reply worker, one at a time, so
//!    replies land in the order their messages were sent
//!
//! Every completion is posted back to the actor, which applies it to the
//! state and publishes a fresh snapshot on a watch channel.
//!
//! ## Teardown
//!
//! Reset and shutdown abort the timer, the insight task and the reply
//! worker. Completions that still race in carry the old study id and are
//! dropped; sends into a stopped runtime fail and are ignored.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::domain::foundation::StudyId;
use crate::domain::study::{
    Effect, Event, GenerationOutcome, PersonaFeedback, ReplyRequest, Stage, StudyError,
    StudySetupForm, StudySnapshot, StudyState,
};
use crate::ports::TextGenerator;

const COMMAND_BUFFER: usize = 32;

/// Runtime tuning.
#[derive(Debug, Clone)]
pub struct StudyRuntimeConfig {
    /// Delay between consecutive stages.
    pub stage_delay: Duration,

    /// Word limit written into chat reply prompts.
    pub reply_word_limit: u32,
}

impl Default for StudyRuntimeConfig {
    fn default() -> Self {
        Self {
            stage_delay: Duration::from_millis(2000),
            reply_word_limit: 150,
        }
    }
}

impl StudyRuntimeConfig {
    pub fn with_stage_delay(mut self, delay: Duration) -> Self {
        self.stage_delay = delay;
        self
    }

    pub fn with_reply_word_limit(mut self, limit: u32) -> Self {
        self.reply_word_limit = limit;
        self
    }
}

enum Command {
    Submit {
        form: StudySetupForm,
        reply: oneshot::Sender<Result<StudySnapshot, StudyError>>,
    },
    SendMessage {
        text: String,
        reply: oneshot::Sender<Result<StudySnapshot, StudyError>>,
    },
    Reset {
        reply: oneshot::Sender<StudySnapshot>,
    },
    Shutdown {
        ack: oneshot::Sender<()>,
    },
}

/// An event tagged with the study it belongs to.
struct Envelope {
    study_id: StudyId,
    event: Event,
}

struct ArmedTimer {
    stage: Stage,
    handle: JoinHandle<()>,
}

struct ReplyWorker {
    requests: mpsc::UnboundedSender<ReplyRequest>,
    handle: JoinHandle<()>,
}

/// Cloneable handle to a running study actor.
#[derive(Clone)]
pub struct StudyHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<StudySnapshot>,
}

impl StudyHandle {
    /// Submits the setup form and starts the study.
    pub async fn submit(&self, form: StudySetupForm) -> Result<StudySnapshot, StudyError> {
        self.request(|reply| Command::Submit { form, reply }).await?
    }

    /// Appends a chat message and queues its reply.
    pub async fn send_message(&self, text: impl Into<String>) -> Result<StudySnapshot, StudyError> {
        let text = text.into();
        self.request(|reply| Command::SendMessage { text, reply })
            .await?
    }

    /// Tears the current study down and returns to idle.
    pub async fn reset(&self) -> Result<StudySnapshot, StudyError> {
        self.request(|reply| Command::Reset { reply }).await
    }

    /// Stops the actor and every task it owns.
    pub async fn shutdown(&self) -> Result<(), StudyError> {
        self.request(|ack| Command::Shutdown { ack }).await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> StudySnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<StudySnapshot> {
        self.snapshots.clone()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, StudyError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| StudyError::RuntimeStopped)?;
        response.await.map_err(|_| StudyError::RuntimeStopped)
    }
}

/// The study actor. Owns the state exclusively; see the module docs.
pub struct StudyRuntime {
    generator: Arc<dyn TextGenerator>,
    personas: Arc<PersonaFeedback>,
    config: StudyRuntimeConfig,
    state: StudyState,
    snapshots: watch::Sender<StudySnapshot>,
    events: mpsc::UnboundedSender<Envelope>,
    timer: Option<ArmedTimer>,
    insights_task: Option<JoinHandle<()>>,
    reply_worker: Option<ReplyWorker>,
}

impl StudyRuntime {
    /// Spawns an idle study actor on the current tokio runtime.
    pub fn spawn(
        generator: Arc<dyn TextGenerator>,
        personas: Arc<PersonaFeedback>,
        config: StudyRuntimeConfig,
    ) -> StudyHandle {
        let state = StudyState::new(personas.clone(), config.reply_word_limit);
        let (snapshots, snapshot_rx) = watch::channel(state.snapshot());
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let info = generator.generator_info();
        info!(
            generator = %info.name,
            model = %info.model,
            personas = personas.len(),
            stage_delay_ms = config.stage_delay.as_millis() as u64,
            "Study runtime started"
        );

        let runtime = Self {
            generator,
            personas,
            config,
            state,
            snapshots,
            events: event_tx,
            timer: None,
            insights_task: None,
            reply_worker: None,
        };
        tokio::spawn(runtime.run(command_rx, event_rx));

        StudyHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut events: mpsc::UnboundedReceiver<Envelope>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown { ack }) => {
                        self.teardown();
                        let _ = ack.send(());
                        break;
                    }
                    Some(command) => self.handle_command(command),
                    None => {
                        self.teardown();
                        break;
                    }
                },
                Some(envelope) = events.recv() => self.handle_event(envelope),
            }
        }
        info!(study_id = %self.state.study_id(), "Study runtime stopped");
    }

    // ───────────────────────────────────────────────────────────────
    // Commands
    // ───────────────────────────────────────────────────────────────

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Submit { form, reply } => {
                let result = self.state.submit(form).map(|()| {
                    info!(
                        study_id = %self.state.study_id(),
                        agent_count = self.state.config().map_or(0, |c| c.agent_count()),
                        "Study started"
                    );
                    self.publish()
                });
                if let Err(e) = &result {
                    debug!(error = %e, "Study submission rejected");
                }
                let _ = reply.send(result);
            }
            Command::SendMessage { text, reply } => {
                let result = self.state.send_message(&text).map(|effects| {
                    self.run_effects(effects);
                    self.publish()
                });
                if let Err(e) = &result {
                    debug!(error = %e, "Chat message rejected");
                }
                let _ = reply.send(result);
            }
            Command::Reset { reply } => {
                self.teardown();
                info!(study_id = %self.state.study_id(), "Study reset");
                self.state = StudyState::new(self.personas.clone(), self.config.reply_word_limit);
                let _ = reply.send(self.publish());
            }
            Command::Shutdown { .. } => {}
        }
    }

    fn handle_event(&mut self, envelope: Envelope) {
        if envelope.study_id != self.state.study_id() {
            debug!(
                study_id = %envelope.study_id,
                "Dropping event for a torn-down study"
            );
            return;
        }

        let before = self.state.stage();
        let effects = self.state.apply(envelope.event);
        if self.state.stage() != before {
            info!(
                study_id = %self.state.study_id(),
                stage = self.state.stage().label(),
                stage_index = self.state.stage().index(),
                "Stage advanced"
            );
        }
        self.run_effects(effects);
        self.publish();
    }

    // ───────────────────────────────────────────────────────────────
    // Effects
    // ───────────────────────────────────────────────────────────────

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::GenerateInsights { prompt } => self.spawn_insights(prompt),
                Effect::GenerateReply(request) => self.queue_reply(request),
            }
        }
    }

    fn spawn_insights(&mut self, prompt: String) {
        let study_id = self.state.study_id();
        let generator = self.generator.clone();
        let events = self.events.clone();

        debug!(study_id = %study_id, "Generating insights");
        let handle = tokio::spawn(async move {
            let result = generator.generate(&prompt).await;
            if let Err(e) = &result {
                warn!(study_id = %study_id, kind = e.kind(), error = %e, "Insight generation failed");
            }
            let event = Event::InsightsGenerated(GenerationOutcome::from_result(result));
            let _ = events.send(Envelope { study_id, event });
        });

        if let Some(previous) = self.insights_task.replace(handle) {
            previous.abort();
        }
    }

    fn queue_reply(&mut self, request: ReplyRequest) {
        let study_id = self.state.study_id();
        debug!(
            study_id = %study_id,
            reply_id = request.id.value(),
            persona = request.persona.as_ref().map(|p| p.as_str()),
            "Queueing chat reply"
        );

        let worker = self.reply_worker.get_or_insert_with(|| {
            spawn_reply_worker(study_id, self.generator.clone(), self.events.clone())
        });

        if let Err(mpsc::error::SendError(request)) = worker.requests.send(request) {
            let event = Event::ReplyGenerated {
                reply_id: request.id,
                outcome: GenerationOutcome::Failed,
            };
            let _ = self.events.send(Envelope { study_id, event });
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Timer
    // ───────────────────────────────────────────────────────────────

    /// Arms a timer for the stage the state is waiting on, unless one is
    /// already armed for that stage.
    fn sync_timer(&mut self) {
        let Some(stage) = self.state.next_timer() else {
            self.cancel_timer();
            return;
        };
        if self.timer.as_ref().is_some_and(|timer| timer.stage == stage) {
            return;
        }
        self.cancel_timer();

        let study_id = self.state.study_id();
        let events = self.events.clone();
        let delay = self.config.stage_delay;
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            let _ = events.send(Envelope {
                study_id,
                event: Event::StageTimerFired { stage },
            });
        });
        self.timer = Some(ArmedTimer { stage, handle });
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
        }
    }

    fn teardown(&mut self) {
        self.cancel_timer();
        if let Some(task) = self.insights_task.take() {
            task.abort();
        }
        if let Some(worker) = self.reply_worker.take() {
            worker.handle.abort();
        }
    }

    /// Re-arms the timer and publishes the current snapshot.
    fn publish(&mut self) -> StudySnapshot {
        self.sync_timer();
        let snapshot = self.state.snapshot();
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }
}

impl Drop for StudyRuntime {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn spawn_reply_worker(
    study_id: StudyId,
    generator: Arc<dyn TextGenerator>,
    events: mpsc::UnboundedSender<Envelope>,
) -> ReplyWorker {
    let (requests, mut pending) = mpsc::unbounded_channel::<ReplyRequest>();

    let handle = tokio::spawn(async move {
        while let Some(request) = pending.recv().await {
            let result = generator.generate(&request.prompt).await;
            if let Err(e) = &result {
                warn!(
                    study_id = %study_id,
                    reply_id = request.id.value(),
                    kind = e.kind(),
                    error = %e,
                    "Chat reply generation failed"
                );
            }
            let event = Event::ReplyGenerated {
                reply_id: request.id,
                outcome: GenerationOutcome::from_result(result),
            };
            if events.send(Envelope { study_id, event }).is_err() {
                break;
            }
        }
    });

    ReplyWorker { requests, handle }
}
