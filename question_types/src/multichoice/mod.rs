//! Multiple choice - pick one (radio) or several (checkbox) answers.

mod selection;

pub use selection::*;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use content_runtime::{
    Action, Content, ContentId, ContentSettings, DomError, DomSurface, Event, InputBinding,
    LibraryReference, NodeId, ParameterError,
};

use crate::question::{
    response_pattern, statement, Question, QuestionBehaviour, QuestionParams, XapiData,
};

pub const MACHINE_NAME: &str = "H5P.MultiChoice";
pub const STYLES: &[&str] = &["styles/multichoice.css"];

pub const SELECTED_CLASS: &str = "selected";
pub const CORRECT_CLASS: &str = "correct";
pub const INCORRECT_CLASS: &str = "incorrect";
const OPTION_CLASS: &str = "h5p-multiple-choice-option";

/// The library reference this implementation registers under.
pub fn library() -> LibraryReference {
    LibraryReference::new(MACHINE_NAME, 1, 16)
}

/// One answer option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

impl Answer {
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            text: text.into(),
            correct,
        }
    }
}

/// Parameters of a multiple choice content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MultiChoiceParams {
    #[serde(flatten)]
    pub question: QuestionParams,
    /// Exclusive choice instead of multi-select.
    pub single_answer: bool,
    pub answers: Vec<Answer>,
}

/// Multiple choice behaviour for the question engine.
#[derive(Debug, Clone)]
pub struct MultiChoice {
    content_id: ContentId,
    answers: Vec<Answer>,
    single_answer: bool,
    selection: SelectionSet,
    options_container: Option<NodeId>,
    options: Vec<NodeId>,
}

impl MultiChoice {
    pub fn new(content_id: ContentId, answers: Vec<Answer>, single_answer: bool) -> Self {
        Self {
            content_id,
            answers,
            single_answer,
            selection: SelectionSet::new(),
            options_container: None,
            options: Vec::new(),
        }
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn is_single_answer(&self) -> bool {
        self.single_answer
    }

    /// Rendered option elements, by answer index.
    pub fn options(&self) -> &[NodeId] {
        &self.options
    }

    pub fn options_container(&self) -> Option<NodeId> {
        self.options_container
    }

    /// Indices of the correct answers.
    pub fn correct_indices(&self) -> BTreeSet<usize> {
        self.answers
            .iter()
            .enumerate()
            .filter(|(_, answer)| answer.correct)
            .map(|(index, _)| index)
            .collect()
    }

    fn input_name(&self) -> String {
        if self.single_answer {
            format!("mc-answer-{}", self.content_id)
        } else {
            format!("mc-answer-{}[]", self.content_id)
        }
    }

    fn sync_selected(&self, dom: &mut dyn DomSurface) -> Result<(), DomError> {
        for (index, option) in self.options.iter().enumerate() {
            dom.toggle_class(*option, SELECTED_CLASS, self.selection.contains(index))?;
        }
        Ok(())
    }
}

impl QuestionBehaviour for MultiChoice {
    fn render(
        &mut self,
        dom: &mut dyn DomSurface,
        content_area: NodeId,
        owner: ContentId,
    ) -> Result<(), DomError> {
        let container = dom.create_with_classes("div", &["h5p-multichoice-options"])?;
        dom.append_child(content_area, container)?;
        self.options_container = Some(container);
        self.options.clear();

        let input_type = if self.single_answer { "radio" } else { "checkbox" };
        let input_name = self.input_name();
        for (index, answer) in self.answers.iter().enumerate() {
            let option = dom.create_with_classes("div", &[OPTION_CLASS])?;
            dom.set_attribute(option, "data-index", &index.to_string())?;
            dom.bind(option, InputBinding::new(owner, Action::Item(index)))?;

            let input = dom.create_element("input");
            dom.set_attribute(input, "type", input_type)?;
            dom.set_attribute(input, "name", &input_name)?;
            dom.set_attribute(input, "value", &index.to_string())?;
            let label = dom.create_element("span");
            dom.set_text(label, &answer.text)?;

            dom.append_child(option, input)?;
            dom.append_child(option, label)?;
            dom.append_child(container, option)?;
            self.options.push(option);
        }
        Ok(())
    }

    fn handle_input(&mut self, dom: &mut dyn DomSurface, index: usize) -> Option<Value> {
        if index >= self.answers.len() {
            tracing::debug!(content_id = %self.content_id, index, "click on unknown option");
            return None;
        }

        let selected = self.selection.toggle(index, self.single_answer);
        tracing::debug!(content_id = %self.content_id, index, selected, "option toggled");
        if let Err(err) = self.sync_selected(dom) {
            tracing::warn!(
                content_id = %self.content_id,
                error = %err,
                "could not update option markers"
            );
        }

        if self.selection.is_empty() {
            None
        } else {
            Some(json!(self.selection.indices()))
        }
    }

    fn is_answer_correct(&self) -> bool {
        !self.selection.is_empty() && self.selection.as_set() == self.correct_indices()
    }

    fn reset_specific_task(&mut self, dom: &mut dyn DomSurface) -> Result<(), DomError> {
        self.selection.clear();
        for option in &self.options {
            dom.remove_class(*option, SELECTED_CLASS)?;
            dom.remove_class(*option, CORRECT_CLASS)?;
            dom.remove_class(*option, INCORRECT_CLASS)?;
        }
        Ok(())
    }

    fn show_solutions(&mut self, dom: &mut dyn DomSurface) -> Result<(), DomError> {
        for (index, (answer, option)) in self.answers.iter().zip(&self.options).enumerate() {
            if answer.correct {
                dom.add_class(*option, CORRECT_CLASS)?;
            } else if self.selection.contains(index) {
                dom.add_class(*option, INCORRECT_CLASS)?;
            }
        }
        Ok(())
    }

    fn xapi_data(&self, template: Event) -> XapiData {
        let description = template.get("description").cloned().unwrap_or(Value::Null);
        let choices: Vec<Value> = self
            .answers
            .iter()
            .enumerate()
            .map(|(index, answer)| {
                json!({
                    "id": index.to_string(),
                    "description": { "en-US": answer.text },
                })
            })
            .collect();

        let mut statement = statement(
            &template,
            json!({
                "description": { "en-US": description },
                "type": crate::question::INTERACTION_ACTIVITY,
                "interactionType": "choice",
                "choices": choices,
                "correctResponsesPattern": [response_pattern(self.correct_indices())],
            }),
        );
        statement["result"] = json!({
            "response": response_pattern(self.selection.indices().iter().copied()),
        });

        XapiData {
            event: template,
            statement,
        }
    }

    fn detach(&mut self) {
        self.options.clear();
        self.options_container = None;
    }
}

/// A multiple choice question.
pub type MultiChoiceQuestion = Question<MultiChoice>;

/// Library constructor for `H5P.MultiChoice`.
pub fn build(
    params: Value,
    id: ContentId,
    settings: ContentSettings,
    _dom: &mut dyn DomSurface,
) -> Result<Box<dyn Content>, ParameterError> {
    let params: MultiChoiceParams = serde_json::from_value(params)?;
    tracing::debug!(
        content_id = %id,
        answers = params.answers.len(),
        single = params.single_answer,
        "building multiple choice"
    );

    let behaviour = MultiChoice::new(id, params.answers, params.single_answer);
    Ok(Box::new(Question::new(id, params.question, settings.events, behaviour)))
}
