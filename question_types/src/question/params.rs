//! Parameters shared by every question type.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CORRECT_FEEDBACK: &str = "Correct!";
pub const DEFAULT_INCORRECT_FEEDBACK: &str = "Incorrect. Please try again.";

/// Behaviour switches read from `params.behaviour`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Behaviour {
    /// Show the retry action after a check.
    pub enable_retry: bool,
    /// Show the solution action after a check.
    pub enable_solutions_button: bool,
    /// Type specific; not read by the question life cycle.
    pub multiple_drag: bool,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            enable_retry: false,
            enable_solutions_button: true,
            multiple_drag: false,
        }
    }
}

/// Question text, feedback strings and behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionParams {
    pub question: String,
    pub correct_feedback: String,
    pub incorrect_feedback: String,
    pub behaviour: Behaviour,
}

impl Default for QuestionParams {
    fn default() -> Self {
        Self {
            question: String::new(),
            correct_feedback: DEFAULT_CORRECT_FEEDBACK.to_string(),
            incorrect_feedback: DEFAULT_INCORRECT_FEEDBACK.to_string(),
            behaviour: Behaviour::default(),
        }
    }
}

impl QuestionParams {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    pub fn with_behaviour(mut self, behaviour: Behaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    /// Replace empty feedback strings with the defaults. Authoring tools
    /// store untouched fields as `""`.
    pub fn normalized(mut self) -> Self {
        if self.correct_feedback.is_empty() {
            self.correct_feedback = DEFAULT_CORRECT_FEEDBACK.to_string();
        }
        if self.incorrect_feedback.is_empty() {
            self.incorrect_feedback = DEFAULT_INCORRECT_FEEDBACK.to_string();
        }
        self
    }
}
