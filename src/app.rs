use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{
    config::Config,
    data::BookSource,
    error::Result,
    export,
    model::Book,
    ui::loading::Spinner,
};

// Module for state helper structs
mod types;

use types::{FetchOutcome, FilterEditor, FilterField, Filters, StatusKind, StatusMessage};

/// Upper bound on review lines the expanded card reserves space for
const DETAIL_REVIEW_LINES: usize = 6;

pub struct App {
    running: bool,
    source: Arc<dyn BookSource>,
    export_dir: PathBuf,

    // Filter epoch state
    filters: Filters,
    books: Vec<Book>,
    selected_index: usize,
    expanded_row: Option<usize>,
    table_state: ratatui::widgets::TableState,

    // Fetch state
    loading: bool,
    spinner_frame: usize,
    fetch_generation: u64,
    fetch_sender: mpsc::Sender<FetchOutcome>,
    fetch_receiver: mpsc::Receiver<FetchOutcome>,

    // UI state
    editor: Option<FilterEditor>,
    status_message: Option<StatusMessage>,
    show_quit_confirm: bool,
    needs_render: bool,
}

impl App {
    pub fn new(config: &Config, source: Arc<dyn BookSource>) -> Self {
        let (fetch_sender, fetch_receiver) = mpsc::channel(8);

        Self {
            running: false,
            source,
            export_dir: config.export_dir.clone(),
            filters: Filters::from_defaults(&config.defaults),
            books: Vec::new(),
            selected_index: 0,
            expanded_row: None,
            table_state: ratatui::widgets::TableState::default(),
            loading: false,
            spinner_frame: 0,
            fetch_generation: 0,
            fetch_sender,
            fetch_receiver,
            editor: None,
            status_message: None,
            show_quit_confirm: false,
            needs_render: true, // Initial render needed
        }
    }

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        self.running = true;

        // The initial load is the first filter epoch
        self.begin_epoch();

        while self.running {
            // Check for completed fetches from background tasks
            self.check_fetch_outcomes();

            // Auto-dismiss notifications after 3 seconds
            if let Some(msg) = &self.status_message {
                if msg.timestamp.elapsed() > Duration::from_secs(3) {
                    self.status_message = None;
                    self.needs_render = true;
                }
            }

            // Keep the spinner moving while a fetch is in flight
            if self.loading {
                self.spinner_frame = Spinner::next_frame(self.spinner_frame);
                self.needs_render = true;
            }

            // Only render if needed (data changed, user input, etc.)
            if self.needs_render {
                // Update table state to match selected_index
                if self.books.is_empty() {
                    self.table_state.select(None);
                } else {
                    self.table_state.select(Some(self.selected_index));
                }

                terminal.draw(|frame| self.render(frame))?;
                self.needs_render = false;
            }

            // Poll for user input with timeout
            if let Ok(true) = event::poll(Duration::from_millis(100)) {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Clear the accumulated list, reset to page 1, and fetch the new epoch's
    /// first page. Called on any seed/region/review-count change.
    fn begin_epoch(&mut self) {
        self.books.clear();
        self.filters.page = 1;
        self.selected_index = 0;
        self.expanded_row = None;
        self.spawn_fetch();
    }

    fn load_more(&mut self) {
        // The pagination control is hidden while a fetch is in flight
        if self.loading {
            return;
        }
        self.filters.page += 1;
        self.spawn_fetch();
    }

    fn spawn_fetch(&mut self) {
        self.loading = true;
        self.fetch_generation += 1;
        let generation = self.fetch_generation;
        let query = self.filters.query();
        let source = Arc::clone(&self.source);
        let sender = self.fetch_sender.clone();
        self.needs_render = true;

        tracing::debug!(?query, generation, "fetching catalog page");
        tokio::spawn(async move {
            let result = source.fetch_page(&query).await;
            // A closed receiver means the app is shutting down
            let _ = sender
                .send(FetchOutcome {
                    generation,
                    page: query.page,
                    result,
                })
                .await;
        });
    }

    fn check_fetch_outcomes(&mut self) {
        // Collect all pending outcomes first
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.fetch_receiver.try_recv() {
            outcomes.push(outcome);
        }

        for outcome in outcomes {
            self.apply_fetch_outcome(outcome);
        }
    }

    fn apply_fetch_outcome(&mut self, outcome: FetchOutcome) {
        // A newer trigger supersedes this response; applying it would corrupt
        // the accumulation order of the current epoch.
        if outcome.generation != self.fetch_generation {
            tracing::debug!(
                generation = outcome.generation,
                current = self.fetch_generation,
                "dropping stale fetch outcome"
            );
            return;
        }

        self.loading = false;
        self.needs_render = true;

        match outcome.result {
            Ok(batch) => {
                tracing::info!(page = outcome.page, count = batch.len(), "page loaded");
                self.books.extend(batch);
            }
            Err(e) => {
                // Swallowed: previously accumulated rows stay displayed
                tracing::error!(page = outcome.page, error = %e, "failed to fetch books");
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Handle quit confirmation dialog
        if self.show_quit_confirm {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.running = false;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.show_quit_confirm = false;
                    self.needs_render = true;
                }
                _ => {}
            }
            return;
        }

        // Handle filter editing mode
        if self.editor.is_some() {
            match key.code {
                KeyCode::Enter => self.commit_filter_edit(),
                KeyCode::Esc => {
                    self.editor = None;
                    self.needs_render = true;
                }
                _ => {
                    if let Some(editor) = &mut self.editor {
                        editor.input.handle_event(&Event::Key(key));
                        self.needs_render = true;
                    }
                }
            }
            return;
        }

        // Clear status message on any key
        if self.status_message.is_some() {
            self.status_message = None;
            self.needs_render = true;
        }

        // Normal key handling
        match key.code {
            KeyCode::Char('q') => {
                self.show_quit_confirm = true;
                self.needs_render = true;
            }
            KeyCode::Esc => {
                if self.expanded_row.is_some() {
                    self.expanded_row = None;
                    self.needs_render = true;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('g') => self.move_top(),
            KeyCode::Char('G') => self.move_bottom(),
            KeyCode::Enter => self.toggle_expand(),
            KeyCode::Char('m') => self.load_more(),
            KeyCode::Char('s') => self.open_editor(FilterField::Seed),
            KeyCode::Char('c') => self.open_editor(FilterField::Reviews),
            KeyCode::Char('l') => self.toggle_region(),
            KeyCode::Char('r') => self.randomize_seed(),
            KeyCode::Char('e') => self.export_csv(),
            _ => {}
        }
    }

    fn open_editor(&mut self, field: FilterField) {
        let current = match field {
            FilterField::Seed => self.filters.seed.to_string(),
            FilterField::Reviews => self.filters.review_count.to_string(),
        };
        self.editor = Some(FilterEditor {
            field,
            input: Input::new(current),
        });
        self.needs_render = true;
    }

    fn commit_filter_edit(&mut self) {
        let Some(editor) = self.editor.take() else {
            return;
        };
        self.needs_render = true;

        let text = editor.input.value().trim().to_string();
        match (editor.field, text.parse::<u64>()) {
            (FilterField::Seed, Ok(value)) => {
                if value != self.filters.seed {
                    self.filters.seed = value;
                    self.begin_epoch();
                }
            }
            (FilterField::Reviews, Ok(value)) => {
                if value != self.filters.review_count {
                    self.filters.review_count = value;
                    self.begin_epoch();
                }
            }
            (field, Err(_)) => {
                tracing::debug!(input = %text, field = field.label(), "ignoring unparseable filter value");
                self.set_status(format!("{} must be a number", field.label()), StatusKind::Error);
            }
        }
    }

    fn toggle_region(&mut self) {
        self.filters.region = self.filters.region.toggled();
        self.begin_epoch();
    }

    fn randomize_seed(&mut self) {
        self.filters.seed = random_seed();
        self.begin_epoch();
    }

    fn toggle_expand(&mut self) {
        if self.books.is_empty() {
            return;
        }
        self.expanded_row = match self.expanded_row {
            Some(idx) if idx == self.selected_index => None,
            _ => Some(self.selected_index),
        };
        self.needs_render = true;
    }

    fn export_csv(&mut self) {
        let path = self.export_dir.join(export::EXPORT_FILE_NAME);
        match export::write_catalog(&path, &self.books) {
            Ok(count) => {
                tracing::info!(count, path = %path.display(), "catalog exported");
                self.set_status(
                    format!("Exported {} books to {}", count, path.display()),
                    StatusKind::Success,
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "CSV export failed");
                self.set_status(format!("Export failed: {}", e), StatusKind::Error);
            }
        }
    }

    fn set_status(&mut self, message: impl Into<String>, kind: StatusKind) {
        self.status_message = Some(StatusMessage {
            message: message.into(),
            kind,
            timestamp: Instant::now(),
        });
        self.needs_render = true;
    }

    fn move_down(&mut self) {
        if self.books.is_empty() {
            return;
        }
        if self.selected_index < self.books.len() - 1 {
            self.selected_index += 1;
            self.needs_render = true;
        }
    }

    fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.needs_render = true;
        }
    }

    fn move_top(&mut self) {
        self.selected_index = 0;
        self.needs_render = true;
    }

    fn move_bottom(&mut self) {
        if !self.books.is_empty() {
            self.selected_index = self.books.len() - 1;
            self.needs_render = true;
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Grow the header while a filter field is being edited
        let header_height = if self.editor.is_some() { 6 } else { 3 };

        let chunks = Layout::vertical([
            Constraint::Length(header_height), // Filter bar
            Constraint::Min(0),                // Content
            Constraint::Length(4),             // Status bar
        ])
        .split(area);

        self.render_header(frame, chunks[0]);
        self.render_content(frame, chunks[1]);
        self.render_statusbar(frame, chunks[2]);

        // Render quit confirmation dialog on top if active
        if self.show_quit_confirm {
            self.render_quit_confirm(frame, area);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        if self.editor.is_some() {
            let header_chunks = Layout::vertical([
                Constraint::Length(3), // Filter bar
                Constraint::Length(3), // Filter input
            ])
            .split(area);

            self.render_filter_bar(frame, header_chunks[0]);
            self.render_filter_input(frame, header_chunks[1]);
        } else {
            self.render_filter_bar(frame, area);
        }
    }

    fn render_filter_bar(&self, frame: &mut Frame, area: Rect) {
        let value_style = Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD);

        let spans = vec![
            Span::styled(
                "bookdeck",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | seed "),
            Span::styled(self.filters.seed.to_string(), value_style),
            Span::raw(" | "),
            Span::styled(self.filters.region.label(), value_style),
            Span::raw(" | reviews "),
            Span::styled(self.filters.review_count.to_string(), value_style),
        ];

        let header =
            Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    fn render_filter_input(&self, frame: &mut Frame, area: Rect) {
        let Some(editor) = &self.editor else {
            return;
        };

        // Only renders during active input
        let input_text = format!("{}_", editor.input.value());
        let title = format!("{} - Enter to apply, Esc to cancel", editor.field.label());

        let input = Paragraph::new(input_text)
            .style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(Color::Yellow)),
            );

        frame.render_widget(input, area);
    }

    fn render_content(&mut self, frame: &mut Frame, area: Rect) {
        match self.expanded_row {
            Some(idx) if idx < self.books.len() => {
                let detail_height = self.detail_height(idx).min(area.height.saturating_sub(5));
                let chunks =
                    Layout::vertical([Constraint::Min(0), Constraint::Length(detail_height)])
                        .split(area);
                self.render_table(frame, chunks[0]);
                self.render_detail(frame, chunks[1], idx);
            }
            _ => self.render_table(frame, area),
        }
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        let title = format!("Books ({})", self.books.len());

        if self.books.is_empty() {
            let text = if self.loading { "Loading..." } else { "No books" };
            let empty =
                Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(empty, area);
            return;
        }

        // Build header
        let header_cells = ["#", "ISBN", "Title", "Author", "Publisher", "Uploaded"]
            .iter()
            .map(|h| {
                Cell::from(*h).style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            });
        let header = Row::new(header_cells).height(1);

        // Build rows
        let rows: Vec<Row> = self
            .books
            .iter()
            .enumerate()
            .map(|(idx, book)| {
                let number = if self.expanded_row == Some(idx) {
                    format!("▾{}", idx + 1)
                } else {
                    (idx + 1).to_string()
                };
                Row::new(vec![
                    Cell::from(number),
                    Cell::from(book.isbn.clone()),
                    Cell::from(truncate_cell(&book.title, 40)),
                    Cell::from(truncate_cell(&book.author, 24)),
                    Cell::from(truncate_cell(&book.publisher, 24)),
                    Cell::from(book.uploaded_date()),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(5),
            Constraint::Length(19),
            Constraint::Min(24),
            Constraint::Length(24),
            Constraint::Length(24),
            Constraint::Length(10),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title))
            .row_highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");

        // Use stateful rendering for efficient highlight updates
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, idx: usize) {
        let Some(book) = self.books.get(idx) else {
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled(
                book.title.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("by {}", book.author),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(vec![
                Span::styled(
                    format!("{} likes", book.likes),
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  |  cover: "),
                Span::styled(book.cover.clone(), Style::default().fg(Color::DarkGray)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Reviews",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
        ];

        if book.reviews.is_empty() {
            lines.push(Line::from(Span::styled(
                "No reviews",
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            for review in &book.reviews {
                lines.push(Line::from(vec![
                    Span::raw(format!("\"{}\" - ", review.text)),
                    Span::styled(
                        review.author.clone(),
                        Style::default().add_modifier(Modifier::ITALIC),
                    ),
                    Span::raw(format!(" ({})", review.company)),
                ]));
            }
        }

        let detail = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Row {}", idx + 1)),
        );
        frame.render_widget(detail, area);
    }

    fn detail_height(&self, idx: usize) -> u16 {
        let review_lines = self
            .books
            .get(idx)
            .map(|b| b.reviews.len().max(1))
            .unwrap_or(1);
        // Title, author, likes/cover, spacer, "Reviews" heading, review lines, borders
        (review_lines.min(DETAIL_REVIEW_LINES) + 7) as u16
    }

    fn render_statusbar(&self, frame: &mut Frame, area: Rect) {
        let shortcuts = if self.books.is_empty() {
            "s: Seed  |  r: Random seed  |  l: Language  |  c: Reviews  |  q: Quit"
        } else {
            "j/k: Move  |  g/G: Top/Bottom  |  Enter: Expand  |  s: Seed  |  r: Random  |  l: Language  |  c: Reviews  |  e: Export  |  q: Quit"
        };

        let row_info = if self.books.is_empty() {
            format!("Page {}", self.filters.page)
        } else {
            format!(
                "Row {}/{} | Page {}",
                self.selected_index + 1,
                self.books.len(),
                self.filters.page
            )
        };

        let nav_line = Line::from(vec![
            Span::styled(
                row_info,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled(shortcuts, Style::default().fg(Color::White)),
        ]);

        // Second line: loading indicator, status message, or the load-more hint
        let action_line = if self.loading {
            let spinner = Spinner::with_frame(self.spinner_frame);
            Line::from(vec![
                Span::styled(
                    format!("{} ", spinner.current_char()),
                    spinner.current_style().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("Loading page {}...", self.filters.page),
                    Style::default().fg(Color::Yellow),
                ),
            ])
        } else if let Some(msg) = &self.status_message {
            let (color, icon) = match msg.kind {
                StatusKind::Success => (Color::Green, "✓"),
                StatusKind::Error => (Color::Red, "✗"),
            };
            Line::from(Span::styled(
                format!("{} {}", icon, msg.message),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    "m",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to load more", Style::default().fg(Color::DarkGray)),
            ])
        };

        let status = Paragraph::new(vec![nav_line, action_line])
            .style(Style::default().fg(Color::White))
            .block(Block::default().borders(Borders::ALL).title("Status"));

        frame.render_widget(status, area);
    }

    fn render_quit_confirm(&self, frame: &mut Frame, area: Rect) {
        use ratatui::layout::Alignment;

        // Create a centered popup
        let popup_width = 50;
        let popup_height = 7;
        let popup_x = (area.width.saturating_sub(popup_width)) / 2;
        let popup_y = (area.height.saturating_sub(popup_height)) / 2;

        let popup_area = Rect {
            x: popup_x,
            y: popup_y,
            width: popup_width,
            height: popup_height,
        };

        // Clear the background area to hide content behind
        frame.render_widget(Clear, popup_area);

        let dialog_text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Quit bookdeck?",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::raw("Press 'y' to quit, 'n' or ESC to cancel")),
            Line::from(""),
        ];

        let dialog = Paragraph::new(dialog_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .style(Style::default().bg(Color::Black))
                    .title("Confirm"),
            )
            .alignment(Alignment::Center);

        frame.render_widget(dialog, popup_area);
    }
}

/// Seed drawn from the subsecond clock, in the generator's 0..100000 range
fn random_seed() -> u64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_nanos()))
        .unwrap_or(0);
    nanos % 100_000
}

/// Clip a cell value to `max_width` terminal columns, ellipsized
fn truncate_cell(text: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }

    let mut width = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            break;
        }
        width += ch_width;
        out.push(ch);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::data::BookQuery;
    use crate::error::BookdeckError;

    /// Book source that replays a scripted sequence of page results
    struct ScriptedSource {
        pages: Mutex<VecDeque<Result<Vec<Book>>>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<Vec<Book>>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
            }
        }
    }

    #[async_trait]
    impl BookSource for ScriptedSource {
        async fn fetch_page(&self, _query: &BookQuery) -> Result<Vec<Book>> {
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn book(title: &str) -> Book {
        Book {
            isbn: "978-0-00-000000-0".to_string(),
            title: title.to_string(),
            author: "Author".to_string(),
            publisher: "Publisher".to_string(),
            uploaded: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            cover: "https://covers.example/0.jpg".to_string(),
            likes: 0,
            reviews: Vec::new(),
        }
    }

    fn titles(app: &App) -> Vec<&str> {
        app.books.iter().map(|b| b.title.as_str()).collect()
    }

    fn scripted_app(pages: Vec<Result<Vec<Book>>>) -> App {
        App::new(&Config::default(), Arc::new(ScriptedSource::new(pages)))
    }

    /// Drain the fetch channel until the in-flight request settles
    async fn settle(app: &mut App) {
        for _ in 0..100 {
            app.check_fetch_outcomes();
            if !app.loading {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("fetch never settled");
    }

    #[tokio::test]
    async fn test_filter_change_resets_epoch() {
        let mut app = scripted_app(vec![Ok(vec![book("fresh")])]);
        app.books = vec![book("stale-1"), book("stale-2")];
        app.filters.page = 3;
        app.selected_index = 1;
        app.expanded_row = Some(1);

        app.open_editor(FilterField::Seed);
        app.editor.as_mut().unwrap().input = Input::new("999".to_string());
        app.commit_filter_edit();

        assert!(app.books.is_empty());
        assert_eq!(app.filters.page, 1);
        assert_eq!(app.filters.seed, 999);
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.expanded_row, None);
        assert!(app.loading);

        settle(&mut app).await;
        assert_eq!(titles(&app), vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_unchanged_filter_commit_does_not_refetch() {
        let mut app = scripted_app(vec![]);
        app.books = vec![book("kept")];

        app.open_editor(FilterField::Seed);
        // Default seed committed back unchanged
        app.commit_filter_edit();

        assert!(!app.loading);
        assert_eq!(titles(&app), vec!["kept"]);
    }

    #[tokio::test]
    async fn test_unparseable_filter_commit_is_rejected() {
        let mut app = scripted_app(vec![]);
        app.books = vec![book("kept")];

        app.open_editor(FilterField::Reviews);
        app.editor.as_mut().unwrap().input = Input::new("many".to_string());
        app.commit_filter_edit();

        assert_eq!(app.filters.review_count, 1);
        assert!(!app.loading);
        assert!(app.status_message.is_some());
    }

    #[tokio::test]
    async fn test_load_more_appends_in_order() {
        let mut app = scripted_app(vec![
            Ok(vec![book("a"), book("b")]),
            Ok(vec![book("c")]),
        ]);

        app.begin_epoch();
        settle(&mut app).await;
        assert_eq!(titles(&app), vec!["a", "b"]);

        app.load_more();
        assert_eq!(app.filters.page, 2);
        settle(&mut app).await;
        assert_eq!(titles(&app), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_load_more_is_ignored_while_loading() {
        let mut app = scripted_app(vec![Ok(vec![book("a")])]);

        app.begin_epoch();
        assert!(app.loading);
        app.load_more();
        assert_eq!(app.filters.page, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_accumulated_rows() {
        let mut app = scripted_app(vec![
            Ok(vec![book("a")]),
            Err(BookdeckError::BookSource("connection reset".to_string())),
        ]);

        app.begin_epoch();
        settle(&mut app).await;
        assert_eq!(titles(&app), vec!["a"]);

        app.load_more();
        settle(&mut app).await;
        // Silent failure: rows unchanged, no status message, loading cleared
        assert_eq!(titles(&app), vec!["a"]);
        assert!(app.status_message.is_none());
        assert!(!app.loading);
    }

    #[tokio::test]
    async fn test_stale_generation_outcome_is_dropped() {
        let mut app = scripted_app(vec![]);
        app.fetch_generation = 2;
        app.loading = true;

        app.apply_fetch_outcome(FetchOutcome {
            generation: 1,
            page: 1,
            result: Ok(vec![book("stale")]),
        });

        assert!(app.books.is_empty());
        assert!(app.loading);

        app.apply_fetch_outcome(FetchOutcome {
            generation: 2,
            page: 1,
            result: Ok(vec![book("current")]),
        });

        assert_eq!(titles(&app), vec!["current"]);
        assert!(!app.loading);
    }

    #[tokio::test]
    async fn test_expand_toggles_single_row() {
        let mut app = scripted_app(vec![]);
        app.books = vec![book("a"), book("b"), book("c")];

        app.selected_index = 1;
        app.toggle_expand();
        assert_eq!(app.expanded_row, Some(1));

        // Same row collapses
        app.toggle_expand();
        assert_eq!(app.expanded_row, None);

        // A different row moves the expansion
        app.toggle_expand();
        app.selected_index = 2;
        app.toggle_expand();
        assert_eq!(app.expanded_row, Some(2));
    }

    #[tokio::test]
    async fn test_region_toggle_starts_new_epoch() {
        let mut app = scripted_app(vec![Ok(vec![book("fr-book")])]);
        app.books = vec![book("en-book")];

        app.toggle_region();
        assert_eq!(app.filters.region, crate::model::Region::Fr);
        assert!(app.books.is_empty());
        assert_eq!(app.filters.page, 1);

        settle(&mut app).await;
        assert_eq!(titles(&app), vec!["fr-book"]);
    }

    #[test]
    fn test_random_seed_range() {
        for _ in 0..32 {
            assert!(random_seed() < 100_000);
        }
    }

    #[test]
    fn test_truncate_cell() {
        assert_eq!(truncate_cell("short", 10), "short");
        assert_eq!(truncate_cell("exactly-te", 10), "exactly-te");
        assert_eq!(truncate_cell("much longer title", 10), "much long…");
    }
}
