//! Input field renderer bound to external field state

use html_escape::{encode_double_quoted_attribute, encode_text};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::state::{FieldBinding, FieldState};
use crate::ui::Styles;

/// Class added to the input when its field is invalid and touched
pub const INVALID_CLASS: &str = "is-invalid";

/// Class of the block that carries the error text
pub const FEEDBACK_CLASS: &str = "invalid-feedback";

/// Standard input attributes supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct InputProps {
    pub name: String,
    pub input_type: String,
    pub class_name: Option<String>,
    pub placeholder: Option<String>,
    pub id: Option<String>,
    pub label: Option<String>,
    pub disabled: bool,
}

impl InputProps {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            input_type: "text".to_string(),
            class_name: None,
            placeholder: None,
            id: None,
            label: None,
            disabled: false,
        }
    }

    pub fn with_type(mut self, input_type: &str) -> Self {
        self.input_type = input_type.to_string();
        self
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = Some(class_name.to_string());
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Renders one input whose state lives in a [`FieldBinding`]
#[derive(Debug, Clone)]
pub struct InputField {
    props: InputProps,
}

impl InputField {
    pub fn new(props: InputProps) -> Self {
        Self { props }
    }

    /// Rows needed by `render`: the bordered input plus one feedback line
    pub const HEIGHT: u16 = 4;

    /// True iff the field has a non-empty error and has been touched
    pub fn is_invalid(state: &FieldState) -> bool {
        state.touched && state.error.as_deref().map_or(false, |e| !e.is_empty())
    }

    pub fn shows_feedback(&self, state: &FieldState) -> bool {
        Self::is_invalid(state)
    }

    /// Caller classes, a space, then the invalid marker when it applies
    pub fn class_name(&self, state: &FieldState) -> String {
        let marker = if Self::is_invalid(state) { INVALID_CLASS } else { "" };
        format!("{} {}", self.props.class_name.as_deref().unwrap_or(""), marker)
    }

    pub fn state_from<B: FieldBinding + ?Sized>(&self, binding: &B) -> FieldState {
        binding.field(&self.props.name)
    }

    pub fn on_change<B: FieldBinding + ?Sized>(&self, binding: &mut B, value: String) {
        if !self.props.disabled {
            binding.handle_change(&self.props.name, value);
        }
    }

    pub fn on_blur<B: FieldBinding + ?Sized>(&self, binding: &mut B) {
        binding.handle_blur(&self.props.name);
    }

    /// HTML markup for the input and, when invalid, its feedback block
    pub fn render_html(&self, state: &FieldState) -> String {
        let mut html = String::new();

        if let Some(ref label) = self.props.label {
            let target = self.props.id.as_deref().unwrap_or(&self.props.name);
            html.push_str(&format!(
                r#"<label for="{}">{}</label>"#,
                encode_double_quoted_attribute(target),
                encode_text(label)
            ));
        }

        html.push_str(&format!(
            r#"<input type="{}" name="{}" value="{}" class="{}""#,
            encode_double_quoted_attribute(&self.props.input_type),
            encode_double_quoted_attribute(&self.props.name),
            encode_double_quoted_attribute(&state.value),
            encode_double_quoted_attribute(&self.class_name(state))
        ));
        if let Some(ref id) = self.props.id {
            html.push_str(&format!(r#" id="{}""#, encode_double_quoted_attribute(id)));
        }
        if let Some(ref placeholder) = self.props.placeholder {
            html.push_str(&format!(r#" placeholder="{}""#, encode_double_quoted_attribute(placeholder)));
        }
        if self.props.disabled {
            html.push_str(" disabled");
        }
        html.push_str(" />");

        if self.shows_feedback(state) {
            if let Some(ref error) = state.error {
                html.push_str(&format!(
                    r#"<div class="{}">{}</div>"#,
                    FEEDBACK_CLASS,
                    encode_text(error)
                ));
            }
        }

        html
    }

    fn display_value(&self, state: &FieldState) -> String {
        if self.props.input_type == "password" {
            "*".repeat(state.value.chars().count())
        } else {
            state.value.clone()
        }
    }

    /// Render into a terminal frame; `area` should be `HEIGHT` rows tall
    pub fn render(&self, f: &mut Frame, area: Rect, state: &FieldState, focused: bool) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(1)])
            .split(area);

        let invalid = Self::is_invalid(state);
        let border_style = Styles::field_border(invalid, focused);

        let title = self
            .props
            .label
            .clone()
            .unwrap_or_else(|| self.props.name.clone());

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let placeholder = self.props.placeholder.as_deref().unwrap_or("");
        let (text, text_style) = if state.value.is_empty() && !placeholder.is_empty() {
            (placeholder.to_string(), Styles::muted())
        } else if self.props.disabled {
            (self.display_value(state), Styles::muted())
        } else {
            (self.display_value(state), Styles::value())
        };

        f.render_widget(Paragraph::new(text).style(text_style).block(block), chunks[0]);

        if invalid {
            if let Some(ref error) = state.error {
                f.render_widget(
                    Paragraph::new(error.clone()).style(Styles::invalid()),
                    chunks[1],
                );
            }
        }

        if focused && !self.props.disabled {
            let typed = u16::try_from(state.value.chars().count()).unwrap_or(u16::MAX);
            let cursor_x = chunks[0].x.saturating_add(1).saturating_add(typed);
            let cursor_y = chunks[0].y.saturating_add(1);
            if cursor_x < chunks[0].right().saturating_sub(1) {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }
}
