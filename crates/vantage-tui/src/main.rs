//! Vantage TUI - project workspace dashboard
//!
//! A live view of the project collection:
//! - Project list with keyboard navigation
//! - Definition details for the selected project
//! - Role memberships and owner

use std::io;
use std::sync::Arc;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Terminal,
};
use tracing::debug;
use vantage_core::api::{ProjectBackend, RestBackend};
use vantage_core::config::Config;
use vantage_core::store::{ProjectStore, Snapshot};

struct App {
    store: Arc<ProjectStore>,
    snapshot: Snapshot,
    selected: usize,
}

impl App {
    async fn connect() -> anyhow::Result<Self> {
        let config = Config::load()?;
        let mut builder = RestBackend::builder()
            .base_url(&config.api.base_url)
            .timeout_secs(config.api.timeout_secs);
        if let Some(token) = config.api.resolved_token()? {
            builder = builder.token(&token);
        }
        let backend: Arc<dyn ProjectBackend> = Arc::new(builder.build()?);
        let store = Arc::new(ProjectStore::new(backend));
        let snapshot = store.reload().await;
        Ok(Self { store, snapshot, selected: 0 })
    }

    async fn refresh(&mut self) {
        self.snapshot = self.store.reload().await;
        if self.selected >= self.snapshot.len() && !self.snapshot.is_empty() {
            self.selected = self.snapshot.len() - 1;
        }
    }

    fn next(&mut self) {
        if !self.snapshot.is_empty() {
            self.selected = (self.selected + 1) % self.snapshot.len();
        }
    }

    fn previous(&mut self) {
        if !self.snapshot.is_empty() {
            self.selected = (self.selected + self.snapshot.len() - 1) % self.snapshot.len();
        }
    }

    fn details(&self) -> String {
        match self.snapshot.get(self.selected) {
            Some(project) => {
                let mut lines = vec![
                    format!("Name:        {}", project.project_name.as_deref().unwrap_or("-")),
                    format!("System name: {}", project.system_name.as_deref().unwrap_or("-")),
                    format!("ID:          {}", project.id.as_deref().unwrap_or("-")),
                    format!(
                        "Description: {}",
                        project.description.as_deref().unwrap_or("-")
                    ),
                ];
                if let Some(owner) = &project.owner {
                    lines.push(format!(
                        "Owner:       {}",
                        owner.display_name.as_deref().unwrap_or(&owner.system_name)
                    ));
                }
                for membership in &project.role_memberships {
                    lines.push(format!(
                        "Role {:<12} {} users, {} groups",
                        membership.role,
                        membership.users.len(),
                        membership.groups.len()
                    ));
                }
                lines.join("\n")
            }
            None => "No project selected\n\nRun: vantage projects create <name>".to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Log to stderr; stdout belongs to the alternate screen. Reload
    // failures only ever surface as warnings, so without a subscriber
    // they would vanish entirely.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vantage=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut app = App::connect().await?;
    debug!(projects = app.snapshot.len(), "Connected to console");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints([
                    Constraint::Length(3), // Header
                    Constraint::Min(10),   // Main content
                    Constraint::Length(3), // Footer
                ])
                .split(frame.area());

            // Header
            let header = Paragraph::new(format!("{} projects", app.snapshot.len()))
                .style(Style::default().fg(Color::Cyan))
                .block(Block::default().borders(Borders::ALL).title("Vantage"));
            frame.render_widget(header, chunks[0]);

            // Main content - list on the left, details on the right
            let main_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(chunks[1]);

            let items: Vec<ListItem> = app
                .snapshot
                .iter()
                .map(|p| ListItem::new(p.project_name.as_deref().unwrap_or("-").to_string()))
                .collect();
            let mut state = ListState::default();
            if !app.snapshot.is_empty() {
                state.select(Some(app.selected));
            }
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title("Projects"))
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            frame.render_stateful_widget(list, main_chunks[0], &mut state);

            let details = Paragraph::new(app.details())
                .block(Block::default().borders(Borders::ALL).title("Details"));
            frame.render_widget(details, main_chunks[1]);

            // Footer
            let footer = Paragraph::new("q: Quit | r: Reload | j/k or arrows: Navigate")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(footer, chunks[2]);
        })?;

        // Handle input
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char('r') => app.refresh().await,
                        KeyCode::Down | KeyCode::Char('j') => app.next(),
                        KeyCode::Up | KeyCode::Char('k') => app.previous(),
                        _ => {}
                    }
                }
            }
        }
    }
}
