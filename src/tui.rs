use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use serde_json::Value;
use std::io;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use formfetch::{
    config::Config,
    form::{validators, FormState, InputField, InputProps},
    ui::Styles,
    FetchController, LifecycleState, RequestDescriptor, RequestOutcome,
};

struct FormApp {
    fields: Vec<InputField>,
    form: FormState,
    focus: usize,
    controller: FetchController<Value>,
    updates: watch::Receiver<LifecycleState<Value>>,
    path: String,
    status: Option<String>,
    error: Option<String>,
}

impl FormApp {
    fn new(config: &Config, path: &str, names: &[String], required: &[String]) -> Result<Self> {
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut form = FormState::new(&name_refs);
        for name in required {
            form = form.with_validator(name, validators::required("Required"));
        }

        let fields = names
            .iter()
            .map(|name| {
                let mut props = InputProps::new(name)
                    .with_label(&label_for(name))
                    .with_class("form-control");
                if name.contains("password") {
                    props = props.with_type("password");
                }
                InputField::new(props)
            })
            .collect();

        let controller = FetchController::from_config(path, config)?;
        let updates = controller.subscribe();

        Ok(FormApp {
            fields,
            form,
            focus: 0,
            controller,
            updates,
            path: path.to_string(),
            status: None,
            error: None,
        })
    }

    fn focus_next(&mut self) {
        self.fields[self.focus].on_blur(&mut self.form);
        self.focus = (self.focus + 1) % self.fields.len();
    }

    fn focus_previous(&mut self) {
        self.fields[self.focus].on_blur(&mut self.form);
        self.focus = if self.focus == 0 {
            self.fields.len() - 1
        } else {
            self.focus - 1
        };
    }

    fn type_char(&mut self, c: char) {
        let field = &self.fields[self.focus];
        let mut value = field.state_from(&self.form).value;
        value.push(c);
        field.on_change(&mut self.form, value);
    }

    fn delete_char(&mut self) {
        let field = &self.fields[self.focus];
        let mut value = field.state_from(&self.form).value;
        if value.pop().is_some() {
            field.on_change(&mut self.form, value);
        }
    }

    fn submit(&mut self) {
        if !self.form.validate_all() {
            self.error = Some("Fix the highlighted fields".to_string());
            return;
        }

        self.error = None;
        self.controller
            .trigger(Some(RequestDescriptor::post(self.form.values())));
    }

    /// Pull the latest controller state into the form
    fn sync_with_controller(&mut self) {
        if !self.updates.has_changed().unwrap_or(false) {
            return;
        }
        let state = self.updates.borrow_and_update().clone();

        match state.outcome() {
            Some(RequestOutcome::Pending) => {
                self.status = Some(format!("Submitting to {}...", self.path));
            }
            Some(RequestOutcome::Success(data)) => {
                info!("Form submitted to {}", self.path);
                self.status = Some(format!("Saved: {}", data));
                self.error = None;
            }
            Some(RequestOutcome::Failure(err)) => {
                let rejected = self.form.apply_server_errors(&err);
                self.status = None;
                self.error = Some(if rejected > 0 {
                    format!("{} ({} field(s) rejected)", err, rejected)
                } else {
                    err.to_string()
                });
            }
            None => {}
        }
    }
}

/// "first_name" -> "First name"
fn label_for(name: &str) -> String {
    let spaced = name.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub async fn run_form(config: &Config, path: &str, fields: &[String], required: &[String]) -> Result<()> {
    if fields.is_empty() {
        anyhow::bail!("A form needs at least one field");
    }

    let mut app = FormApp::new(config, path, fields, required)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app.controller.detach();
    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut FormApp) -> Result<()> {
    loop {
        app.sync_with_controller();
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(100))? {
            tokio::task::yield_now().await;
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                KeyCode::Tab | KeyCode::Down => app.focus_next(),
                KeyCode::BackTab | KeyCode::Up => app.focus_previous(),
                KeyCode::Enter => app.submit(),
                KeyCode::Backspace => app.delete_char(),
                KeyCode::Char(c) => app.type_char(c),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &FormApp) {
    let mut constraints = vec![Constraint::Length(3)];
    constraints.extend(app.fields.iter().map(|_| Constraint::Length(InputField::HEIGHT)));
    constraints.push(Constraint::Length(3));
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.size());

    let header = Paragraph::new(format!("POST {}", app.path))
        .style(Styles::title())
        .block(Block::default().borders(Borders::ALL).title("formfetch"));
    f.render_widget(header, chunks[0]);

    for (i, field) in app.fields.iter().enumerate() {
        let state = field.state_from(&app.form);
        field.render(f, chunks[i + 1], &state, i == app.focus);
    }

    render_status(f, app, chunks[app.fields.len() + 1]);

    let help = Paragraph::new("Tab/Shift-Tab: move  Enter: submit  Esc: quit")
        .style(Styles::muted());
    f.render_widget(help, chunks[app.fields.len() + 2]);
}

fn render_status(f: &mut Frame, app: &FormApp, area: Rect) {
    let (text, style) = if let Some(ref error) = app.error {
        (error.clone(), Styles::invalid())
    } else if let Some(ref status) = app.status {
        let style = if app.controller.is_loading() {
            Styles::pending()
        } else {
            Styles::submitted()
        };
        (status.clone(), style)
    } else {
        ("Ready".to_string(), Styles::muted())
    };

    let status = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, area);
}
