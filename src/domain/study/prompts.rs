//! Message templates, prompt construction and `@persona` routing.
//!
//! Everything here is pure string work; the reducer in `state` decides when
//! each template is used.

use once_cell::sync::Lazy;
use regex::Regex;

use super::config::StudyConfig;
use super::persona::{Persona, PersonaFeedback};

/// Shown in place of insights when generation fails.
pub const INSIGHT_APOLOGY: &str =
    "Sorry, I encountered an error while generating insights. Please try again.";

/// Appended to the transcript when a chat reply cannot be generated.
pub const CHAT_APOLOGY: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

/// Placeholder message held at a fixed transcript index until insights resolve.
pub const INSIGHT_PLACEHOLDER: &str = "Generating insights from the study...";

static MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@([A-Za-z][A-Za-z0-9_-]*)").expect("mention pattern is valid"));

/// Opening agent message summarizing the submitted setup.
pub fn initial_summary(config: &StudyConfig) -> String {
    format!(
        "Understood! You want to run a UX study on:\n\n\"{}\"\n\nCriteria:\n{}\n\nNumber of agents: {}.\nI'll start right away!",
        config.goal(),
        config.criteria(),
        config.agent_count()
    )
}

pub fn creating_agents(agent_count: u32) -> String {
    format!("I'm creating {agent_count} diverse UXUser agents now...")
}

pub fn performing_tasks(agent_count: u32) -> String {
    format!(
        "All {agent_count} agents are performing the tasks. Screen recordings are in progress..."
    )
}

/// Survey message quoting one excerpt per persona.
pub fn survey_summary(agent_count: u32, personas: &PersonaFeedback) -> String {
    let excerpts = personas
        .iter()
        .filter_map(|p| p.excerpt().map(|text| format!("{}: \"{}\"", p.id, text)))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Surveying all {agent_count} UserAgents to gather feedback...\n\nHere's what they said:\n\n{excerpts}"
    )
}

/// Detail text shown for each progress stage, in display order.
pub fn stage_work(agent_count: u32) -> [String; 5] {
    [
        format!("Creating {agent_count} diverse UXUser agents with detailed profiles and behaviors..."),
        format!("All {agent_count} agents are performing tasks, recording screens, and logging interactions..."),
        format!("Surveying {agent_count} UserAgents for detailed feedback on usability and experience..."),
        "Generating actionable insights from the study, analyzing patterns and anomalies...".to_string(),
        "Study completed! All data processed and insights ready for review.".to_string(),
    ]
}

/// Prompt asking for study-wide insights over every transcript.
pub fn insights_prompt(personas: &PersonaFeedback) -> String {
    format!(
        "As a UX expert, analyze this user feedback and provide key insights:\n\n{}",
        personas.combined_transcript()
    )
}

/// Prompt for a question addressed to a single persona.
pub fn persona_reply_prompt(persona: &Persona, question: &str, word_limit: u32) -> String {
    format!(
        "Context - Conversation with {id}:\n{transcript}\n\nUser question: {question}\n\nProvide a detailed response as {id}, maintaining consistency with the previous responses. Keep the reply under {word_limit} words.",
        id = persona.id,
        transcript = persona.transcript_text(),
    )
}

/// Prompt for a question about the study as a whole.
pub fn study_reply_prompt(personas: &PersonaFeedback, question: &str, word_limit: u32) -> String {
    format!(
        "Context - User feedback from a UX study:\n{}\n\nUser question: {question}\n\nProvide a detailed response addressing the user's question based on the feedback data. Keep the reply under {word_limit} words.",
        personas.combined_transcript(),
    )
}

/// First `@mention` in `text` that names a known persona.
pub fn find_mentioned_persona<'a>(text: &str, personas: &'a PersonaFeedback) -> Option<&'a Persona> {
    MENTION
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| personas.get(m.as_str()))
}

pub fn format_insight(text: &str) -> String {
    format!("Key insights from the study:\n\n{}", text.trim())
}

pub fn format_persona_reply(persona: &Persona, text: &str) -> String {
    format!("{} responds: {}", persona.id, text.trim())
}
