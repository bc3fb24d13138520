//! Question life cycle - the check/retry/solution cycle shared by all
//! question types.
//!
//! A [`Question`] owns the scaffold (question text, content area,
//! feedback, buttons, result) and the state machine:
//!
//! ```text
//! Unanswered -> Answered -> Checked(outcome) -> SolutionShown(outcome)
//!      ^                         |                     |
//!      +------- reset_task ------+---------------------+
//! ```
//!
//! The type-specific parts (rendering, correctness, solutions, xAPI data)
//! come from a [`QuestionBehaviour`].

mod params;
mod xapi;

pub use params::*;
pub use xapi::*;

use std::any::Any;
use std::rc::Rc;

use serde_json::{json, Value};

use content_runtime::{
    Action, Attachment, Content, ContentId, DomError, DomSurface, Event, EventDispatcher,
    EventKind, InputBinding, NodeId,
};

pub const HIDDEN_CLASS: &str = "h5p-hidden";
pub const CORRECT_FEEDBACK_CLASS: &str = "h5p-question-correct";
pub const INCORRECT_FEEDBACK_CLASS: &str = "h5p-question-incorrect";

pub const CHECK_ACTION: &str = "check";
pub const RETRY_ACTION: &str = "retry";
pub const SOLUTION_ACTION: &str = "show-solution";

/// Label used by [`Question::title`] when the question has no text.
pub const DEFAULT_TITLE: &str = "Question";
const TITLE_MAX_CHARS: usize = 60;

/// Result of checking an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

impl Outcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, Outcome::Correct)
    }
}

/// Where a question is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionState {
    #[default]
    Unanswered,
    Answered,
    Checked(Outcome),
    /// Solutions revealed; terminal for the attempt.
    SolutionShown(Outcome),
}

impl QuestionState {
    /// Whether the attempt has been evaluated.
    pub fn is_checked(&self) -> bool {
        matches!(self, QuestionState::Checked(_) | QuestionState::SolutionShown(_))
    }
}

/// Node handles of the rendered scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scaffold {
    pub wrapper: NodeId,
    pub text: NodeId,
    pub content: NodeId,
    pub feedback: NodeId,
    pub buttons: NodeId,
    pub check_button: NodeId,
    pub retry_button: NodeId,
    pub solution_button: NodeId,
    pub result: NodeId,
}

impl Scaffold {
    fn build(
        dom: &mut dyn DomSurface,
        region: NodeId,
        owner: ContentId,
        question: &str,
    ) -> Result<Self, DomError> {
        let wrapper = dom.create_with_classes("div", &["h5p-question"])?;
        dom.append_child(region, wrapper)?;

        let text = dom.create_with_classes("div", &["h5p-question-text"])?;
        dom.set_text(text, question)?;
        let content = dom.create_with_classes("div", &["h5p-question-content"])?;
        let feedback = dom.create_with_classes("div", &["h5p-question-feedback", HIDDEN_CLASS])?;
        let buttons = dom.create_with_classes("div", &["h5p-question-buttons"])?;
        for node in [text, content, feedback, buttons] {
            dom.append_child(wrapper, node)?;
        }

        let mut button = |class: &str, label: &str, action: &str, hidden: bool| {
            let node = dom.create_with_classes("button", &[class])?;
            dom.toggle_class(node, HIDDEN_CLASS, hidden)?;
            dom.set_text(node, label)?;
            dom.bind(node, InputBinding::new(owner, Action::control(action)))?;
            dom.append_child(buttons, node)?;
            Ok::<NodeId, DomError>(node)
        };
        let check_button = button("h5p-question-check-button", "Check", CHECK_ACTION, false)?;
        let retry_button = button("h5p-question-retry-button", "Retry", RETRY_ACTION, true)?;
        let solution_button = button(
            "h5p-question-solution-button",
            "Show Solution",
            SOLUTION_ACTION,
            true,
        )?;

        let result = dom.create_with_classes("div", &["h5p-question-result", HIDDEN_CLASS])?;
        dom.append_child(wrapper, result)?;

        Ok(Self {
            wrapper,
            text,
            content,
            feedback,
            buttons,
            check_button,
            retry_button,
            solution_button,
            result,
        })
    }
}

/// Type-specific extension points of a question.
pub trait QuestionBehaviour: 'static {
    /// Render the type-specific widgets into the scaffold's content area.
    /// Input bindings must name `owner`.
    fn render(
        &mut self,
        dom: &mut dyn DomSurface,
        content_area: NodeId,
        owner: ContentId,
    ) -> Result<(), DomError>;

    /// React to input on item `index`. Returns the user input to record,
    /// or `None` if there is nothing to record.
    fn handle_input(&mut self, dom: &mut dyn DomSurface, index: usize) -> Option<Value>;

    fn is_answer_correct(&self) -> bool;

    /// Clear type-specific state and markers.
    fn reset_specific_task(&mut self, dom: &mut dyn DomSurface) -> Result<(), DomError>;

    /// Reveal correct/incorrect markers.
    fn show_solutions(&mut self, dom: &mut dyn DomSurface) -> Result<(), DomError>;

    /// Interaction data built on the question's event template.
    fn xapi_data(&self, template: Event) -> XapiData;

    /// Forget node handles after the scaffold was removed.
    fn detach(&mut self) {}

    fn max_score(&self) -> u32 {
        1
    }
}

/// The question life-cycle engine wrapped around a behaviour.
pub struct Question<B: QuestionBehaviour> {
    id: ContentId,
    params: QuestionParams,
    events: Rc<EventDispatcher>,
    behaviour: B,
    state: QuestionState,
    user_input: Option<Value>,
    score: u32,
    scaffold: Option<Scaffold>,
}

impl<B: QuestionBehaviour> Question<B> {
    pub fn new(
        id: ContentId,
        params: QuestionParams,
        events: Rc<EventDispatcher>,
        behaviour: B,
    ) -> Self {
        Self {
            id,
            params: params.normalized(),
            events,
            behaviour,
            state: QuestionState::Unanswered,
            user_input: None,
            score: 0,
            scaffold: None,
        }
    }

    pub fn id(&self) -> ContentId {
        self.id
    }

    pub fn params(&self) -> &QuestionParams {
        &self.params
    }

    pub fn behaviour(&self) -> &B {
        &self.behaviour
    }

    pub fn state(&self) -> QuestionState {
        self.state
    }

    pub fn scaffold(&self) -> Option<&Scaffold> {
        self.scaffold.as_ref()
    }

    pub fn user_input(&self) -> Option<&Value> {
        self.user_input.as_ref()
    }

    /// Whether an answer has been recorded in this attempt.
    pub fn has_answered(&self) -> bool {
        self.state != QuestionState::Unanswered
    }

    /// Store the user's input. Input arriving after a check is ignored
    /// until the task is reset.
    pub fn record_user_input(&mut self, input: Value) {
        if self.state.is_checked() {
            tracing::debug!(content_id = %self.id, "input after check ignored");
            return;
        }
        self.user_input = Some(input);
        if self.state == QuestionState::Unanswered {
            tracing::debug!(content_id = %self.id, "question answered");
        }
        self.state = QuestionState::Answered;
    }

    /// Route input on item `index` through the behaviour.
    pub fn select(&mut self, dom: &mut dyn DomSurface, index: usize) {
        if self.state.is_checked() {
            tracing::debug!(content_id = %self.id, index, "input after check ignored");
            return;
        }
        if let Some(input) = self.behaviour.handle_input(dom, index) {
            self.record_user_input(input);
        }
    }

    /// Evaluate the answer. Does nothing unless an answer was recorded and
    /// not yet checked; returns the outcome otherwise.
    pub fn check_answer(&mut self, dom: &mut dyn DomSurface) -> Result<Option<Outcome>, DomError> {
        if self.state != QuestionState::Answered {
            tracing::debug!(content_id = %self.id, state = ?self.state, "check ignored");
            return Ok(None);
        }

        let outcome = if self.behaviour.is_answer_correct() {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        self.score = if outcome.is_correct() { self.max_score() } else { 0 };
        self.state = QuestionState::Checked(outcome);

        if let Some(scaffold) = self.scaffold {
            let (text, class) = match outcome {
                Outcome::Correct => (&self.params.correct_feedback, CORRECT_FEEDBACK_CLASS),
                Outcome::Incorrect => (&self.params.incorrect_feedback, INCORRECT_FEEDBACK_CLASS),
            };
            dom.set_text(scaffold.feedback, text)?;
            dom.remove_class(scaffold.feedback, HIDDEN_CLASS)?;
            dom.add_class(scaffold.feedback, class)?;

            let behaviour = &self.params.behaviour;
            dom.add_class(scaffold.check_button, HIDDEN_CLASS)?;
            dom.toggle_class(scaffold.retry_button, HIDDEN_CLASS, !behaviour.enable_retry)?;
            let hide_solution = !behaviour.enable_solutions_button;
            dom.toggle_class(scaffold.solution_button, HIDDEN_CLASS, hide_solution)?;
        }

        let kind = if outcome.is_correct() {
            EventKind::Completed
        } else {
            EventKind::Failed
        };
        tracing::debug!(
            content_id = %self.id,
            score = self.score,
            max_score = self.max_score(),
            "answer checked"
        );
        let event = self
            .xapi_template(kind)
            .with_extra("score", self.score)
            .with_extra("maxScore", self.max_score())
            .with_extra("success", outcome.is_correct());
        self.events.dispatch(event);

        if let Some(scaffold) = self.scaffold {
            dom.set_text(scaffold.result, &format!("Score: {}/{}", self.score, self.max_score()))?;
            dom.remove_class(scaffold.result, HIDDEN_CLASS)?;
        }
        Ok(Some(outcome))
    }

    /// Return to the unanswered baseline and clear type-specific state.
    pub fn reset_task(&mut self, dom: &mut dyn DomSurface) -> Result<(), DomError> {
        self.state = QuestionState::Unanswered;
        self.user_input = None;
        self.score = 0;

        if let Some(scaffold) = self.scaffold {
            dom.add_class(scaffold.feedback, HIDDEN_CLASS)?;
            dom.remove_class(scaffold.feedback, CORRECT_FEEDBACK_CLASS)?;
            dom.remove_class(scaffold.feedback, INCORRECT_FEEDBACK_CLASS)?;
            dom.remove_class(scaffold.check_button, HIDDEN_CLASS)?;
            dom.add_class(scaffold.retry_button, HIDDEN_CLASS)?;
            dom.add_class(scaffold.solution_button, HIDDEN_CLASS)?;
            dom.add_class(scaffold.result, HIDDEN_CLASS)?;
        }
        self.behaviour.reset_specific_task(dom)
    }

    /// Reveal the solution. Score and outcome are kept.
    pub fn show_solutions(&mut self, dom: &mut dyn DomSurface) -> Result<(), DomError> {
        self.behaviour.show_solutions(dom)?;
        if let QuestionState::Checked(outcome) = self.state {
            self.state = QuestionState::SolutionShown(outcome);
        }
        Ok(())
    }

    /// Event template for xAPI-style notifications about this question.
    pub fn xapi_template(&self, kind: EventKind) -> Event {
        Event::with_data(
            kind,
            json!({
                "interactionType": "compound",
                "description": self.params.question,
            }),
        )
    }

    pub fn xapi_data(&self) -> XapiData {
        let mut template = self.xapi_template(EventKind::Interacted);
        template.target = Some(self.id);
        self.behaviour.xapi_data(template)
    }

    fn run(&mut self, dom: &mut dyn DomSurface, action: &Action) -> Result<(), DomError> {
        match action {
            Action::Item(index) => self.select(dom, *index),
            Action::Control(name) => match name.as_str() {
                CHECK_ACTION => {
                    self.check_answer(dom)?;
                }
                RETRY_ACTION => self.reset_task(dom)?,
                SOLUTION_ACTION => self.show_solutions(dom)?,
                other => tracing::debug!(content_id = %self.id, action = other, "unknown control"),
            },
        }
        Ok(())
    }
}

impl<B: QuestionBehaviour> Content for Question<B> {
    fn attach(&mut self, dom: &mut dyn DomSurface, region: NodeId) -> Result<Attachment, DomError> {
        if self.scaffold.is_some() {
            self.detach(dom);
        }
        let scaffold = Scaffold::build(dom, region, self.id, &self.params.question)?;
        self.scaffold = Some(scaffold);
        self.behaviour.render(dom, scaffold.content, self.id)?;
        self.reset_task(dom)?;
        Ok(Attachment::Rendered)
    }

    fn detach(&mut self, dom: &mut dyn DomSurface) {
        let Some(scaffold) = self.scaffold.take() else {
            return;
        };
        let mut stack = vec![scaffold.wrapper];
        while let Some(node) = stack.pop() {
            dom.unbind(node);
            stack.extend(dom.children(node));
        }
        if let Some(parent) = dom.parent(scaffold.wrapper) {
            if let Err(err) = dom.remove_child(parent, scaffold.wrapper) {
                tracing::warn!(
                    content_id = %self.id,
                    error = %err,
                    "removing question scaffold failed"
                );
            }
        }
        self.behaviour.detach();
    }

    fn handle_input(&mut self, dom: &mut dyn DomSurface, action: &Action) {
        if let Err(err) = self.run(dom, action) {
            tracing::warn!(
                content_id = %self.id,
                action = ?action,
                error = %err,
                "question input failed"
            );
        }
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn max_score(&self) -> u32 {
        self.behaviour.max_score()
    }

    /// The question text without markup, shortened; [`DEFAULT_TITLE`] when empty.
    fn title(&self) -> String {
        title_from(&self.params.question)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn title_from(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => plain.push(c),
            _ => {}
        }
    }
    let plain = plain.split_whitespace().collect::<Vec<_>>().join(" ");

    if plain.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    if plain.chars().count() > TITLE_MAX_CHARS {
        let short: String = plain.chars().take(TITLE_MAX_CHARS - 3).collect();
        return format!("{}...", short.trim_end());
    }
    plain
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_runtime::MemoryDom;
    use std::cell::RefCell;

    /// Yes/no question: item 0 is "yes", the correct answer.
    #[derive(Default)]
    struct YesNo {
        answer: Option<usize>,
        revealed: bool,
    }

    impl QuestionBehaviour for YesNo {
        fn render(
            &mut self,
            dom: &mut dyn DomSurface,
            content_area: NodeId,
            owner: ContentId,
        ) -> Result<(), DomError> {
            for index in 0..2 {
                let option = dom.create_with_classes("div", &["yes-no"])?;
                dom.bind(option, InputBinding::new(owner, Action::Item(index)))?;
                dom.append_child(content_area, option)?;
            }
            Ok(())
        }

        fn handle_input(&mut self, _dom: &mut dyn DomSurface, index: usize) -> Option<Value> {
            self.answer = Some(index);
            Some(json!(index))
        }

        fn is_answer_correct(&self) -> bool {
            self.answer == Some(0)
        }

        fn reset_specific_task(&mut self, _dom: &mut dyn DomSurface) -> Result<(), DomError> {
            self.answer = None;
            self.revealed = false;
            Ok(())
        }

        fn show_solutions(&mut self, _dom: &mut dyn DomSurface) -> Result<(), DomError> {
            self.revealed = true;
            Ok(())
        }

        fn xapi_data(&self, template: Event) -> XapiData {
            let statement = statement(&template, json!({ "interactionType": "true-false" }));
            XapiData {
                event: template,
                statement,
            }
        }
    }

    fn attached(params: QuestionParams) -> (Question<YesNo>, MemoryDom, Rc<RefCell<Vec<Event>>>) {
        let events = Rc::new(EventDispatcher::for_content(ContentId(1)));
        let seen = Rc::new(RefCell::new(Vec::new()));
        for kind in [EventKind::Completed, EventKind::Failed] {
            let seen = Rc::clone(&seen);
            events.subscribe(kind, move |event| seen.borrow_mut().push(event.clone()));
        }

        let mut dom = MemoryDom::new();
        let mut question = Question::new(ContentId(1), params, events, YesNo::default());
        let root = dom.root();
        question.attach(&mut dom, root).unwrap();
        (question, dom, seen)
    }

    fn hidden(dom: &MemoryDom, node: NodeId) -> bool {
        dom.has_class(node, HIDDEN_CLASS)
    }

    #[test]
    fn test_initial_state_after_attach() {
        let (question, dom, _) = attached(QuestionParams::new("Is water wet?"));
        let scaffold = *question.scaffold().unwrap();

        assert_eq!(question.state(), QuestionState::Unanswered);
        assert!(!hidden(&dom, scaffold.check_button));
        assert!(hidden(&dom, scaffold.retry_button));
        assert!(hidden(&dom, scaffold.solution_button));
        assert!(hidden(&dom, scaffold.feedback));
        assert!(hidden(&dom, scaffold.result));
        assert_eq!(dom.text(scaffold.text), Some("Is water wet?"));
        assert_eq!(dom.query_selector_all(scaffold.content, ".yes-no").len(), 2);
    }

    #[test]
    fn test_check_without_answer_is_noop() {
        let (mut question, mut dom, seen) = attached(QuestionParams::new("Is water wet?"));

        assert_eq!(question.check_answer(&mut dom).unwrap(), None);
        assert_eq!(question.state(), QuestionState::Unanswered);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_correct_check() {
        let (mut question, mut dom, seen) = attached(QuestionParams::new("Is water wet?"));
        let scaffold = *question.scaffold().unwrap();

        question.select(&mut dom, 0);
        assert_eq!(question.state(), QuestionState::Answered);
        assert_eq!(question.check_answer(&mut dom).unwrap(), Some(Outcome::Correct));

        assert_eq!(question.score(), 1);
        assert_eq!(dom.text(scaffold.feedback), Some("Correct!"));
        assert!(dom.has_class(scaffold.feedback, CORRECT_FEEDBACK_CLASS));
        assert!(hidden(&dom, scaffold.check_button));
        assert!(hidden(&dom, scaffold.retry_button));
        assert!(!hidden(&dom, scaffold.solution_button));
        assert_eq!(dom.text(scaffold.result), Some("Score: 1/1"));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, EventKind::Completed);
        assert_eq!(seen[0].get("interactionType"), Some(&json!("compound")));
        assert_eq!(seen[0].get("description"), Some(&json!("Is water wet?")));
        assert_eq!(seen[0].target, Some(ContentId(1)));
        assert_eq!(seen[0].get("score"), Some(&json!(1)));
        assert_eq!(seen[0].get("maxScore"), Some(&json!(1)));
        assert_eq!(seen[0].get("success"), Some(&json!(true)));
    }

    #[test]
    fn test_incorrect_check_renders_feedback_with_zero_score() {
        let (mut question, mut dom, seen) = attached(QuestionParams::new("Is water wet?"));
        let scaffold = *question.scaffold().unwrap();

        question.select(&mut dom, 1);
        question.check_answer(&mut dom).unwrap();

        assert_eq!(question.score(), 0);
        assert_eq!(dom.text(scaffold.feedback), Some("Incorrect. Please try again."));
        assert!(!hidden(&dom, scaffold.feedback));
        assert_eq!(dom.text(scaffold.result), Some("Score: 0/1"));
        assert_eq!(seen.borrow()[0].kind, EventKind::Failed);
        assert_eq!(seen.borrow()[0].get("score"), Some(&json!(0)));
        assert_eq!(seen.borrow()[0].get("success"), Some(&json!(false)));

        // A second check is ignored.
        assert_eq!(question.check_answer(&mut dom).unwrap(), None);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_behaviour_switches() {
        let behaviour = Behaviour {
            enable_retry: true,
            enable_solutions_button: false,
            ..Behaviour::default()
        };
        let params = QuestionParams::new("Q").with_behaviour(behaviour);
        let (mut question, mut dom, _) = attached(params);
        let scaffold = *question.scaffold().unwrap();

        question.select(&mut dom, 0);
        question.check_answer(&mut dom).unwrap();

        assert!(!hidden(&dom, scaffold.retry_button));
        assert!(hidden(&dom, scaffold.solution_button));
    }

    #[test]
    fn test_input_after_check_is_ignored() {
        let (mut question, mut dom, _) = attached(QuestionParams::new("Q"));
        question.select(&mut dom, 0);
        question.check_answer(&mut dom).unwrap();

        question.select(&mut dom, 1);
        question.record_user_input(json!(1));

        assert_eq!(question.user_input(), Some(&json!(0)));
        assert_eq!(question.behaviour().answer, Some(0));
        assert_eq!(question.state(), QuestionState::Checked(Outcome::Correct));
    }

    #[test]
    fn test_show_solutions_keeps_score() {
        let (mut question, mut dom, _) = attached(QuestionParams::new("Q"));
        question.select(&mut dom, 0);
        question.check_answer(&mut dom).unwrap();

        question.show_solutions(&mut dom).unwrap();

        assert!(question.behaviour().revealed);
        assert_eq!(question.score(), 1);
        assert_eq!(question.state(), QuestionState::SolutionShown(Outcome::Correct));
    }

    #[test]
    fn test_reset_twice_equals_once() {
        let (mut question, mut dom, _) = attached(QuestionParams::new("Q"));
        question.select(&mut dom, 1);
        question.check_answer(&mut dom).unwrap();

        question.reset_task(&mut dom).unwrap();
        let once = (question.state(), question.score(), dom.to_html(dom.root()));
        question.reset_task(&mut dom).unwrap();
        let twice = (question.state(), question.score(), dom.to_html(dom.root()));

        assert_eq!(once, twice);
        assert_eq!(once.0, QuestionState::Unanswered);
        assert!(question.user_input().is_none());
    }

    #[test]
    fn test_controls_route_through_handle_input() {
        let behaviour = Behaviour {
            enable_retry: true,
            ..Behaviour::default()
        };
        let params = QuestionParams::new("Q").with_behaviour(behaviour);
        let (mut question, mut dom, _) = attached(params);

        question.handle_input(&mut dom, &Action::Item(1));
        question.handle_input(&mut dom, &Action::control(CHECK_ACTION));
        assert_eq!(question.state(), QuestionState::Checked(Outcome::Incorrect));

        question.handle_input(&mut dom, &Action::control(RETRY_ACTION));
        assert_eq!(question.state(), QuestionState::Unanswered);

        question.handle_input(&mut dom, &Action::control("unknown"));
        assert_eq!(question.state(), QuestionState::Unanswered);
    }

    #[test]
    fn test_detach_removes_scaffold_and_bindings() {
        let (mut question, mut dom, _) = attached(QuestionParams::new("Q"));
        let wrapper = question.scaffold().unwrap().wrapper;
        assert_eq!(dom.binding_count(dom.root()), 5);

        question.detach(&mut dom);

        assert!(question.scaffold().is_none());
        assert!(!dom.is_connected(wrapper));
        assert_eq!(dom.binding_count(dom.root()), 0);
        assert_eq!(dom.binding_count(wrapper), 0);
    }

    #[test]
    fn test_headless_life_cycle() {
        let events = Rc::new(EventDispatcher::new());
        let mut dom = MemoryDom::new();
        let mut question =
            Question::new(ContentId(2), QuestionParams::default(), events, YesNo::default());

        question.select(&mut dom, 0);
        assert_eq!(question.check_answer(&mut dom).unwrap(), Some(Outcome::Correct));
        assert_eq!(question.score(), question.max_score());
    }

    #[test]
    fn test_title() {
        assert_eq!(title_from(""), "Question");
        assert_eq!(title_from("<p>What is <b>2 + 2</b>?</p>"), "What is 2 + 2?");
        assert_eq!(title_from("<br/>"), "Question");

        let long = "word ".repeat(30);
        let title = title_from(&long);
        assert!(title.ends_with("..."));
        assert!(title.chars().count() <= 60);
    }

    #[test]
    fn test_xapi_data_carries_target() {
        let (question, _, _) = attached(QuestionParams::new("Q"));
        let data = question.xapi_data();

        assert_eq!(data.event.kind, EventKind::Interacted);
        assert_eq!(data.event.target, Some(ContentId(1)));
        assert_eq!(data.statement["object"]["id"], json!("content:1"));
    }
}
