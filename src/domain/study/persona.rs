//! Persona feedback transcripts.
//!
//! Each persona is a synthetic study participant with a scripted interview
//! transcript. The set is fixed at process start: either the built-in
//! transcripts or a YAML file supplied through configuration.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a persona, e.g. `UXUser1`. Case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaId(String);

impl PersonaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Speaker of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackRole {
    Interviewer,
    Agent,
}

impl FeedbackRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interviewer => "interviewer",
            Self::Agent => "agent",
        }
    }
}

/// A single turn of an interview transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackTurn {
    pub role: FeedbackRole,
    pub text: String,
}

impl FeedbackTurn {
    pub fn interviewer(text: impl Into<String>) -> Self {
        Self {
            role: FeedbackRole::Interviewer,
            text: text.into(),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            role: FeedbackRole::Agent,
            text: text.into(),
        }
    }
}

/// A persona and its interview transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: PersonaId,
    pub transcript: Vec<FeedbackTurn>,
}

impl Persona {
    /// Transcript rendered as `role: text` lines.
    pub fn transcript_text(&self) -> String {
        self.transcript
            .iter()
            .map(|turn| format!("{}: {}", turn.role.as_str(), turn.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// First answer given by the persona, used in the survey summary.
    pub fn excerpt(&self) -> Option<&str> {
        self.transcript
            .iter()
            .find(|turn| turn.role == FeedbackRole::Agent)
            .map(|turn| turn.text.as_str())
    }
}

/// Errors raised while loading persona transcripts.
#[derive(Debug, Error)]
pub enum PersonaLoadError {
    #[error("failed to read persona file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse persona file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("persona file defines no personas")]
    Empty,

    #[error("persona '{0}' is defined more than once")]
    Duplicate(String),

    #[error("persona '{0}' has an invalid id or an empty transcript")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct PersonaFile {
    personas: Vec<Persona>,
}

/// Ordered, read-only set of persona transcripts.
///
/// Insertion order is preserved; it drives the order of survey excerpts and
/// of the combined transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaFeedback {
    personas: Vec<Persona>,
}

impl PersonaFeedback {
    /// Builds a validated persona set.
    pub fn new(personas: Vec<Persona>) -> Result<Self, PersonaLoadError> {
        if personas.is_empty() {
            return Err(PersonaLoadError::Empty);
        }
        for (i, persona) in personas.iter().enumerate() {
            let id = persona.id.as_str();
            let valid_id = !id.is_empty()
                && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
                && id.starts_with(|c: char| c.is_ascii_alphabetic());
            if !valid_id || persona.transcript.is_empty() {
                return Err(PersonaLoadError::Invalid(id.to_string()));
            }
            if personas[..i].iter().any(|other| other.id == persona.id) {
                return Err(PersonaLoadError::Duplicate(id.to_string()));
            }
        }
        Ok(Self { personas })
    }

    /// Parses a YAML document of the form `personas: [{id, transcript: [{role, text}]}]`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, PersonaLoadError> {
        let file: PersonaFile = serde_yaml::from_str(yaml)?;
        Self::new(file.personas)
    }

    /// Loads a persona YAML file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersonaLoadError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// The three scripted participants of the TrueMeds cart study.
    pub fn builtin() -> Self {
        Self {
            personas: vec![
                Persona {
                    id: PersonaId::new("UXUser1"),
                    transcript: vec![
                        FeedbackTurn::interviewer("How was your experience with the medicine cart process?"),
                        FeedbackTurn::agent("The cart process was quite confusing. I couldn't easily find where to adjust quantities, and the 'Add to Cart' button wasn't very visible on mobile."),
                        FeedbackTurn::interviewer("What specific difficulties did you face?"),
                        FeedbackTurn::agent("The main issues were: 1) The cart icon was too small, 2) Price breakdowns weren't clear, and 3) I wasn't sure if my medicine was actually added to cart due to lack of confirmation."),
                    ],
                },
                Persona {
                    id: PersonaId::new("UXUser2"),
                    transcript: vec![
                        FeedbackTurn::interviewer("Could you walk me through your experience?"),
                        FeedbackTurn::agent("Sure. I found the medicine search easy, but the checkout process was frustrating. The payment options were limited for my region in Rajasthan."),
                        FeedbackTurn::interviewer("What would have made it better?"),
                        FeedbackTurn::agent("Having UPI payment options prominently displayed and supporting local payment methods would help. Also, the delivery time estimates weren't clear for my pin code."),
                    ],
                },
                Persona {
                    id: PersonaId::new("UXUser3"),
                    transcript: vec![
                        FeedbackTurn::interviewer("What was your overall impression of the cart experience?"),
                        FeedbackTurn::agent("The language was a barrier. Everything was in English, and I would have preferred Hindi options. Also, the prescription upload process wasn't intuitive."),
                        FeedbackTurn::interviewer("Any other accessibility concerns?"),
                        FeedbackTurn::agent("Yes, the text size was too small, and the color contrast made it hard to read prices and medicine details."),
                    ],
                },
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id.as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    /// All transcripts, each headed by `<id>'s feedback:`, separated by blank lines.
    pub fn combined_transcript(&self) -> String {
        self.personas
            .iter()
            .map(|p| format!("{}'s feedback:\n{}", p.id, p.transcript_text()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Default for PersonaFeedback {
    fn default() -> Self {
        Self::builtin()
    }
}
