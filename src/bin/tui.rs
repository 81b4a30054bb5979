use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal, widgets::{Block, Borders, List, ListItem, Paragraph, ListState}, layout::{Layout, Constraint, Direction}, style::{Style, Modifier, Color}};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

use todo_client::{
    application::{
        due,
        filter::TodoFilterView,
        form::{FormField, TodoForm},
        notifier::{Level, Notification, TracingNotifier},
        todo_controller::{Command, ListSnapshot, TodoListController},
    },
    config::ClientConfig,
    domain::{backend::TodoBackend, todo::TodoId},
    infrastructure::http_backend::HttpTodoBackend,
};

type Controller<B> = TodoListController<B, (TracingNotifier, mpsc::UnboundedSender<Notification>)>;

const NOTICE_TTL: Duration = Duration::from_secs(4);

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = ClientConfig::from_env()?;
    init_logging(&config)?;

    let backend = HttpTodoBackend::new(&config)?;
    tracing::info!(api_url = backend.base_url(), "starting");
    let (notice_tx, notice_rx) = mpsc::unbounded_channel();
    let controller = TodoListController::new(backend, (TracingNotifier, notice_tx));

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, controller, notice_rx, &config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

// The terminal belongs to the UI, so logs only go somewhere when a file is configured.
fn init_logging(config: &ClientConfig) -> Result<()> {
    let Some(path) = &config.log_file else { return Ok(()) };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, Search, Create, Edit(TodoId) }

struct App<B: TodoBackend> {
    controller: Controller<B>,
    snapshot: watch::Receiver<ListSnapshot>,
    notices: mpsc::UnboundedReceiver<Notification>,
    notice: Option<(Notification, Instant)>,
    view: TodoFilterView,
    list_state: ListState,
    mode: Mode,
    form: TodoForm,
}

impl<B: TodoBackend> App<B> {
    /// Picks up a newly applied snapshot and any pending notification.
    fn sync(&mut self) {
        let snap = self.snapshot.borrow_and_update();
        self.view.sync(snap.revision, &snap.todos);
        drop(snap);
        while let Ok(n) = self.notices.try_recv() {
            self.notice = Some((n, Instant::now()));
        }
        if self.notice.as_ref().is_some_and(|(_, at)| at.elapsed() > NOTICE_TTL) {
            self.notice = None;
        }
    }

    async fn submit_form(&mut self) {
        let draft = match self.form.to_draft() {
            Ok(draft) => draft,
            Err(err) => {
                self.notice = Some((Notification::error(err.notice()), Instant::now()));
                return;
            }
        };
        let command = match self.mode {
            Mode::Edit(id) => Command::Update(id, draft),
            _ => Command::Create(draft),
        };
        // keep the form open when the backend refused the change
        if self.controller.dispatch(command).await.is_ok() {
            self.mode = Mode::View;
            self.form = TodoForm::default();
        }
    }
}

async fn run_app<B: TodoBackend>(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, controller: Controller<B>, notices: mpsc::UnboundedReceiver<Notification>, config: &ClientConfig) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let snapshot = controller.subscribe();
    let mut app = App { controller, snapshot, notices, notice: None, view: TodoFilterView::new(), list_state: ListState::default(), mode: Mode::View, form: TodoForm::default() };
    app.view.set_status(config.initial_status, &[]);
    let _ = app.controller.refresh().await;
    let mut last_tick = Instant::now();

    loop {
        app.sync();
        let snap = app.snapshot.borrow().clone();
        let today = Local::now().date_naive();

        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(3),
                ])
                .split(f.size());

            let header = Paragraph::new("Todos (/: search, f: filter, n: new, e: edit, d: delete, r: refresh, q: quit)  |  Form: Tab next field, \u{2190}/\u{2192} category, Enter save, Esc cancel")
                .block(Block::default().borders(Borders::ALL).title("todo-client"));
            f.render_widget(header, chunks[0]);

            let search_title = if app.mode == Mode::Search { "search (typing)" } else { "search" };
            let search = Paragraph::new(format!("{}{}", app.view.search(), if app.mode == Mode::Search { "_" } else { "" }))
                .block(Block::default().borders(Borders::ALL).title(search_title));
            f.render_widget(search, chunks[1]);

            let middle = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[2]);

            let list_items: Vec<ListItem> = app.view.visible(&snap.todos).map(|t| {
                let mark = if t.completed { "[x]" } else { "[ ]" };
                let mut line = format!("{} {}", mark, t.title);
                if let Some(badge) = due::classify(t.due_date, today) { line.push_str(&format!("  ({})", badge.label())); }
                if let Some(c) = &t.category { line.push_str(&format!("  #{}", c.name)); }
                ListItem::new(line)
            }).collect();
            app.list_state.select(app.view.selected_index());
            let list = List::new(list_items)
                .block(Block::default().borders(Borders::ALL).title(format!("items [{}] {}/{}", app.view.status().label(), app.view.len(), snap.todos.len())))
                .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, middle[0], &mut app.list_state);

            let detail = match app.view.selected(&snap.todos) {
                Some(t) => {
                    let desc = if t.description.is_empty() { "(no description)" } else { t.description.as_str() };
                    let category = t.category.as_ref().map_or("-", |c| c.name.as_str());
                    let due_line = t.due_date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
                    format!("Title:\n{}\n\nStatus: {}\nCategory: {}\nDue Date: {}\n\nDescription:\n{}", t.title, t.status_label(), category, due_line, desc)
                }
                None => String::new(),
            };
            let details = Paragraph::new(detail)
                .block(Block::default().borders(Borders::ALL).title("details"));
            f.render_widget(details, middle[1]);

            let footer_text = match app.mode {
                Mode::View | Mode::Search => match &app.notice {
                    Some((n, _)) => n.message.clone(),
                    None => format!("TODO_API_URL={}  |  Filter=[{}]", config.api_url, app.view.status().label()),
                },
                Mode::Create | Mode::Edit(_) => {
                    let value = match app.form.field {
                        FormField::Title => app.form.title.clone(),
                        FormField::Description => app.form.description.clone(),
                        FormField::Category => app.form.category_name(&snap.categories).unwrap_or("(none)").to_string(),
                        FormField::Due => app.form.due_date_text.clone(),
                    };
                    let notice = app.notice.as_ref().map(|(n, _)| format!("  |  {}", n.message)).unwrap_or_default();
                    format!("{}: {}_{}", app.form.field.label(), value, notice)
                }
            };
            let footer_style = match &app.notice {
                Some((n, _)) if n.level == Level::Error => Style::default().fg(Color::Red),
                Some(_) => Style::default().fg(Color::Green),
                None => Style::default(),
            };
            let footer = Paragraph::new(footer_text)
                .style(footer_style)
                .block(Block::default().borders(Borders::ALL).title(match app.mode { Mode::View => "info", Mode::Search => "search", Mode::Create => "create", Mode::Edit(_) => "edit" }));
            f.render_widget(footer, chunks[3]);
        })?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; ignore repeats and releases to prevent duplicate input
                if key.kind != KeyEventKind::Press { continue; }
                match app.mode {
                    Mode::View => match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Up => app.view.select_prev(),
                        KeyCode::Down => app.view.select_next(),
                        KeyCode::Char('/') => app.mode = Mode::Search,
                        KeyCode::Char('f') => app.view.cycle_status(&snap.todos),
                        KeyCode::Char('r') => { let _ = app.controller.dispatch(Command::RefreshRequested).await; }
                        KeyCode::Char('n') => {
                            app.mode = Mode::Create;
                            app.form = TodoForm::default();
                        }
                        KeyCode::Char('e') => {
                            if let Some(todo) = app.view.selected(&snap.todos) {
                                app.mode = Mode::Edit(todo.id);
                                app.form = TodoForm::from_todo(todo);
                            }
                        }
                        KeyCode::Char('d') => {
                            if let Some(todo) = app.view.selected(&snap.todos) {
                                let _ = app.controller.dispatch(Command::Remove(todo.id)).await;
                            }
                        }
                        _ => {}
                    },
                    Mode::Search => match key.code {
                        KeyCode::Esc | KeyCode::Enter => app.mode = Mode::View,
                        KeyCode::Backspace => app.view.pop_search_char(&snap.todos),
                        KeyCode::Char(c) => app.view.push_search_char(c, &snap.todos),
                        _ => {}
                    },
                    Mode::Create | Mode::Edit(_) => match key.code {
                        KeyCode::Esc => { app.mode = Mode::View; app.form = TodoForm::default(); }
                        KeyCode::Enter => app.submit_form().await,
                        KeyCode::Tab => app.form.field = app.form.field.next(),
                        KeyCode::Left if app.form.field == FormField::Category => app.form.cycle_category(&snap.categories, false),
                        KeyCode::Right if app.form.field == FormField::Category => app.form.cycle_category(&snap.categories, true),
                        KeyCode::Backspace => app.form.pop_char(),
                        KeyCode::Char(c) => app.form.push_char(c),
                        _ => {}
                    },
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
    Ok(())
}
