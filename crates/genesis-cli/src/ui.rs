//! TUI implementation for genesis

use crossterm::event::EventStream;
use futures::StreamExt;
use genesis_core::{
    ConnectivityProbe, ConversationSnapshot, DerivedViews, Message, MessageDispatcher,
    Reachability, SendOutcome, ViewPolicies,
};
use genesis_tui::{
    Theme,
    input::{Action, event_to_action},
    widgets::{
        ConnectivityBanner, InputBox, MessageList, PipelinePanel, RetrievalPanel, Spinner,
        message_list::calculate_message_height,
    },
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::commands::{CommandResult, execute_command};

/// Topics offered on the welcome screen; Tab cycles through them
pub const SUGGESTIONS: [&str; 4] = [
    "Docker containers",
    "Kubernetes pods",
    "FastAPI routes",
    "Python async",
];

const PAGE: usize = 10;

/// Results of background work, sent back to the UI loop
#[derive(Debug)]
pub enum UiMessage {
    SendFinished(SendOutcome),
    ProbeFinished(Reachability),
}

/// What the loop should do after a key
#[derive(Debug, PartialEq)]
pub enum Control {
    Continue,
    Send(String),
    Command(CommandResult),
    Retry,
    Quit,
}

/// TUI application state
pub struct TuiState {
    snapshot: Arc<ConversationSnapshot>,
    views: DerivedViews,
    policies: ViewPolicies,
    input: InputBox,
    /// Transcript scroll offset; `usize::MAX` follows the bottom
    scroll: usize,
    is_sending: bool,
    unreachable: bool,
    status: String,
    backend_url: String,
    next_suggestion: usize,
    theme: Theme,
    spinner_start: Instant,
}

impl TuiState {
    pub fn new(snapshot: Arc<ConversationSnapshot>, backend_url: impl Into<String>) -> Self {
        let policies = ViewPolicies::default();
        let mut state = Self {
            views: DerivedViews::from_snapshot(&snapshot, &policies),
            snapshot,
            policies,
            input: InputBox::new("Ask about DevOps, Python, APIs..."),
            scroll: usize::MAX,
            is_sending: false,
            unreachable: false,
            status: "Ready".to_string(),
            backend_url: backend_url.into(),
            next_suggestion: 0,
            theme: Theme::dark(),
            spinner_start: Instant::now(),
        };
        state.sync_input();
        state
    }

    /// Swap in a new store snapshot and recompute the panels from it
    pub fn apply_snapshot(&mut self, snapshot: Arc<ConversationSnapshot>) {
        if snapshot.messages.len() != self.snapshot.messages.len() {
            self.scroll = usize::MAX;
        }
        self.views = DerivedViews::from_snapshot(&snapshot, &self.policies);
        self.snapshot = snapshot;
    }

    pub fn set_sending(&mut self, sending: bool) {
        if sending && !self.is_sending {
            self.spinner_start = Instant::now();
        }
        self.is_sending = sending;
        self.sync_input();
    }

    /// Mirror the connectivity flag. Transitions also update the status line,
    /// whichever probe (startup, periodic, retry or a failed send) caused them.
    pub fn set_unreachable(&mut self, unreachable: bool) {
        if unreachable != self.unreachable {
            self.status = if unreachable {
                "Backend not connected".to_string()
            } else {
                "Connected".to_string()
            };
        }
        self.unreachable = unreachable;
        self.sync_input();
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Send is only offered while idle and connected
    pub fn can_send(&self) -> bool {
        !self.is_sending && !self.unreachable
    }

    fn sync_input(&mut self) {
        self.input.set_enabled(self.can_send());
        self.input.set_disabled_placeholder(if self.unreachable {
            "Backend not connected. Press Ctrl+R to retry"
        } else {
            "Waiting for response..."
        });
    }

    /// Handle a keyboard action
    pub fn handle_action(&mut self, action: Action, width: u16) -> Control {
        match action {
            Action::Quit | Action::Interrupt | Action::Escape => Control::Quit,
            Action::Clear => Control::Command(CommandResult::Clear),
            Action::Retry => Control::Retry,
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(PAGE);
                Control::Continue
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(PAGE);
                Control::Continue
            }
            Action::Tab => {
                self.input.set_content(SUGGESTIONS[self.next_suggestion]);
                self.next_suggestion = (self.next_suggestion + 1) % SUGGESTIONS.len();
                Control::Continue
            }
            Action::Submit => self.submit(),
            _ => {
                self.input.handle_action(&action, width);
                Control::Continue
            }
        }
    }

    fn submit(&mut self) -> Control {
        let text = self.input.content().trim().to_string();
        if text.is_empty() {
            return Control::Continue;
        }
        if let Some(result) = execute_command(&text) {
            self.input.take();
            return Control::Command(result);
        }
        if self.unreachable {
            self.status = "Backend not connected. Press Ctrl+R to retry".to_string();
            return Control::Continue;
        }
        if self.is_sending {
            return Control::Continue;
        }
        self.input.take();
        Control::Send(text)
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(if self.unreachable { 1 } else { 0 }),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .split(size);

        if self.unreachable {
            frame.render_widget(ConnectivityBanner::new(&self.backend_url, &self.theme), chunks[0]);
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(chunks[1]);
        self.render_messages(frame, columns[0]);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(13), Constraint::Min(3)])
            .split(columns[1]);
        frame.render_widget(PipelinePanel::new(&self.views.pipeline, &self.theme), side[0]);
        frame.render_widget(RetrievalPanel::new(&self.views.retrieval, &self.theme), side[1]);

        self.render_status(frame, chunks[2]);
        self.input.render(chunks[3], frame.buffer_mut(), &self.theme);
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(Span::styled(" GENESIS AI ", self.theme.accent_bold()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 {
            return;
        }

        if self.snapshot.messages.is_empty() {
            frame.render_widget(Paragraph::new(self.welcome_lines()), inner);
            return;
        }

        let total = calculate_message_height(&self.snapshot.messages, inner.width as usize);
        let max_scroll = total.saturating_sub(inner.height as usize);
        self.scroll = self.scroll.min(max_scroll);

        frame.render_widget(
            MessageList::new(&self.snapshot.messages, &self.theme).scroll(self.scroll),
            inner,
        );
    }

    fn welcome_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled("  Welcome to GENESIS AI", self.theme.accent_bold())),
            Line::from(Span::styled(
                "  Every answer is grounded in retrieved knowledge.",
                self.theme.dim_style(),
            )),
            Line::from(""),
            Line::from(Span::styled("  Try asking about:", self.theme.base_style())),
        ];
        for topic in SUGGESTIONS {
            lines.push(Line::from(Span::styled(
                format!("    • {}", topic),
                self.theme.accent_style(),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Press Tab to fill in a suggestion, Enter to send.",
            self.theme.dim_style(),
        )));
        lines
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.is_sending {
            let spinner = Spinner::new("Agents are working...", &self.theme, self.spinner_start);
            frame.render_widget(spinner, area);
            return;
        }

        let left = format!("{} │ {}", self.backend_url, self.status);
        let right = "Tab: suggest │ Ctrl+R: retry │ Ctrl+L: clear │ Esc: quit";

        let left_width = left.chars().count();
        let right_width = right.chars().count();
        let available = area.width as usize;

        let line = if left_width + right_width + 2 <= available {
            Line::from(vec![
                Span::styled(left, self.theme.dim_style()),
                Span::raw(" ".repeat(available - left_width - right_width)),
                Span::styled(right, self.theme.border_style()),
            ])
        } else {
            Line::from(Span::styled(left, self.theme.dim_style()))
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn spawn_send(dispatcher: &MessageDispatcher, text: String, tx: &mpsc::Sender<UiMessage>) {
    let dispatcher = dispatcher.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = dispatcher.send(&text).await;
        let _ = tx.send(UiMessage::SendFinished(outcome)).await;
    });
}

fn spawn_probe(probe: &ConnectivityProbe, retry: bool, tx: &mpsc::Sender<UiMessage>) {
    let probe = probe.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let reachability = if retry {
            probe.retry().await
        } else {
            probe.check_health().await
        };
        let _ = tx.send(UiMessage::ProbeFinished(reachability)).await;
    });
}

/// Run the TUI application
pub async fn run_tui(
    dispatcher: MessageDispatcher,
    probe: ConnectivityProbe,
    backend_url: String,
    health_interval: Option<Duration>,
) -> anyhow::Result<()> {
    use crossterm::{
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::{Terminal, backend::CrosstermBackend};
    use std::io;

    let store = dispatcher.store().clone();
    let mut snapshots = store.subscribe();

    let mut state = TuiState::new(store.snapshot(), backend_url);

    let (ui_tx, mut ui_rx) = mpsc::channel::<UiMessage>(32);

    // One check at startup; the periodic probe is opt-in
    let cancel = CancellationToken::new();
    match health_interval {
        Some(interval) => {
            probe.spawn_periodic(interval, cancel.clone());
        }
        None => spawn_probe(&probe, false, &ui_tx),
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut event_stream = EventStream::new();

    // Tick interval for animations (80ms for smooth spinner)
    let mut tick_interval = tokio::time::interval(Duration::from_millis(80));

    // Set from spawn until the outcome arrives, which is after the store update
    let mut in_flight = false;

    let result = loop {
        state.set_unreachable(probe.flag().is_unreachable());
        state.set_sending(in_flight);
        if let Err(e) = terminal.draw(|frame| state.render(frame)) {
            break Err(e.into());
        }
        let area_width = terminal.size().map(|size| size.width).unwrap_or(80);

        tokio::select! {
            biased;

            snapshot = snapshots.recv() => match snapshot {
                Ok(snapshot) => state.apply_snapshot(snapshot),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("UI skipped {} snapshots", skipped);
                    state.apply_snapshot(store.snapshot());
                }
                Err(broadcast::error::RecvError::Closed) => break Ok(()),
            },

            msg = ui_rx.recv() => match msg {
                Some(UiMessage::SendFinished(outcome)) => {
                    in_flight = false;
                    match outcome {
                        SendOutcome::Answered(_) => state.set_status("Ready"),
                        SendOutcome::Failed(_) => state.set_status("Last request failed"),
                        SendOutcome::Rejected(reason) => {
                            tracing::debug!("Send rejected: {:?}", reason);
                        }
                    }
                }
                Some(UiMessage::ProbeFinished(Reachability::Reachable)) => state.set_status("Connected"),
                Some(UiMessage::ProbeFinished(Reachability::Unreachable)) => {
                    state.set_status("Backend not connected");
                }
                None => break Ok(()),
            },

            event = event_stream.next() => {
                let action = match event.map(|e| e.map(event_to_action)) {
                    Some(Ok(Some(action))) => action,
                    Some(Ok(None)) => continue,
                    Some(Err(e)) => break Err(anyhow::anyhow!("Event error: {}", e)),
                    None => break Ok(()),
                };

                match state.handle_action(action, area_width) {
                    Control::Continue => {}
                    Control::Quit => break Ok(()),
                    Control::Send(text) => {
                        in_flight = true;
                        state.set_sending(true);
                        state.set_status("Sending...");
                        spawn_send(&dispatcher, text, &ui_tx);
                    }
                    Control::Retry | Control::Command(CommandResult::Retry) => {
                        state.set_status("Checking backend...");
                        spawn_probe(&probe, true, &ui_tx);
                    }
                    Control::Command(CommandResult::Clear) => {
                        store.clear();
                        state.set_status("Cleared");
                    }
                    Control::Command(CommandResult::Message(text)) => {
                        store.add_message(Message::system(text));
                    }
                    Control::Command(CommandResult::Unknown(cmd)) => {
                        store.add_message(Message::system(format!(
                            "Unknown command: /{}\nType /help for available commands.",
                            cmd
                        )));
                    }
                    Control::Command(CommandResult::Exit) => break Ok(()),
                }
            }

            _ = tick_interval.tick() => {}
        }
    };

    cancel.cancel();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use genesis_api::RunState;
    use ratatui::{Terminal, backend::TestBackend};

    fn state() -> TuiState {
        TuiState::new(Arc::new(ConversationSnapshot::default()), "http://localhost:8002")
    }

    fn type_text(state: &mut TuiState, text: &str) {
        for c in text.chars() {
            state.handle_action(Action::Char(c), 80);
        }
    }

    fn screen(state: &mut TuiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 32)).unwrap();
        terminal.draw(|frame| state.render(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_submit_takes_input() {
        let mut state = state();
        type_text(&mut state, "  What is Docker?  ");
        assert_eq!(
            state.handle_action(Action::Submit, 80),
            Control::Send("What is Docker?".into())
        );
        assert_eq!(state.input.content(), "");
    }

    #[test]
    fn test_submit_blank_does_nothing() {
        let mut state = state();
        type_text(&mut state, "   ");
        assert_eq!(state.handle_action(Action::Submit, 80), Control::Continue);
    }

    #[test]
    fn test_submit_guarded_while_unreachable_or_sending() {
        let mut state = state();
        type_text(&mut state, "hello");

        state.set_unreachable(true);
        assert_eq!(state.handle_action(Action::Submit, 80), Control::Continue);
        assert_eq!(state.input.content(), "hello");

        state.set_unreachable(false);
        state.set_sending(true);
        assert_eq!(state.handle_action(Action::Submit, 80), Control::Continue);
        assert_eq!(state.input.content(), "hello");

        state.set_sending(false);
        assert_eq!(state.handle_action(Action::Submit, 80), Control::Send("hello".into()));
    }

    #[test]
    fn test_commands_work_while_unreachable() {
        let mut state = state();
        state.set_unreachable(true);
        type_text(&mut state, "/retry");
        assert_eq!(
            state.handle_action(Action::Submit, 80),
            Control::Command(CommandResult::Retry)
        );
    }

    #[test]
    fn test_status_follows_connectivity_transitions() {
        let mut state = state();
        state.set_status("Ready");

        state.set_unreachable(true);
        assert_eq!(state.status, "Backend not connected");

        state.set_status("Last request failed");
        state.set_unreachable(true);
        assert_eq!(state.status, "Last request failed");

        state.set_unreachable(false);
        assert_eq!(state.status, "Connected");
    }

    #[test]
    fn test_tab_cycles_suggestions() {
        let mut state = state();
        for expected in SUGGESTIONS.iter().chain(SUGGESTIONS.iter().take(1)) {
            state.handle_action(Action::Tab, 80);
            assert_eq!(state.input.content(), *expected);
        }
    }

    #[test]
    fn test_keys_map_to_controls() {
        let mut state = state();
        assert_eq!(state.handle_action(Action::Escape, 80), Control::Quit);
        assert_eq!(state.handle_action(Action::Interrupt, 80), Control::Quit);
        assert_eq!(state.handle_action(Action::Retry, 80), Control::Retry);
        assert_eq!(
            state.handle_action(Action::Clear, 80),
            Control::Command(CommandResult::Clear)
        );
    }

    #[test]
    fn test_welcome_screen_and_banner() {
        let mut state = state();
        let text = screen(&mut state);
        assert!(text.contains("Docker containers"));
        assert!(text.contains("Ready for first query"));
        assert!(text.contains("No context retrieved"));
        assert!(!text.contains("Backend not connected"));

        state.set_unreachable(true);
        let text = screen(&mut state);
        assert!(text.contains("Backend not connected"));
    }

    #[test]
    fn test_snapshot_drives_transcript_and_panels() {
        let mut state = state();
        let store = genesis_core::ConversationStore::new();
        store.add_message(Message::user("What is Docker?"));
        let run = Arc::new(RunState::new("Docker runs containers."));
        store.set_last_run(Arc::clone(&run));
        store.add_message(Message::assistant(run));

        state.apply_snapshot(store.snapshot());
        let text = screen(&mut state);
        assert!(text.contains("What is Docker?"));
        assert!(text.contains("Docker runs containers."));
        assert!(text.contains("Last run completed"));
        assert!(!text.contains("Docker containers"));
    }
}
