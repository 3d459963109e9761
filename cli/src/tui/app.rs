//! The interaction loop.
//!
//! [`Dashboard`] owns the state, the visible-port cache and the renderer.
//! Every event is handled to completion and followed by exactly one render.

use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::KeyEvent;
use portslay_core::{
    current_rank, generate_kill_message, next_rank, KillStats, MessageColor, PortInfo,
    PortScannerPort, PortService, ProcessKillerPort, StatsRepository,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::activity::ActivityLog;
use super::event::{
    action_for_key, closes_overlay, confirm_input, search_input, Action, ConfirmInput, Event,
    SearchInput,
};
use super::filtered::{FilteredPorts, VisiblePort};
use super::input::InputReader;
use super::render::{row_budget, RenderPass, Renderer};
use super::screen::Screen;
use super::sort::apply_sort;
use super::state::{DashboardState, Modal, ModalKind, PendingKill};

/// Copies text to the system clipboard.
pub type Copier = Box<dyn FnMut(&str) -> anyhow::Result<()>>;

fn no_clipboard(_: &str) -> anyhow::Result<()> {
    anyhow::bail!("no clipboard configured")
}

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub refresh_interval: Duration,
    pub toast_duration: Duration,
    pub confirm_kills: bool,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(2000),
            toast_duration: Duration::from_millis(3000),
            confirm_kills: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Dashboard<S, K, T, W>
where
    S: PortScannerPort,
    K: ProcessKillerPort,
    T: StatsRepository,
    W: Screen,
{
    service: PortService<S>,
    killer: K,
    stats: T,
    copier: Copier,
    screen: W,
    state: DashboardState,
    cache: FilteredPorts,
    renderer: Renderer,
    activity: ActivityLog,
    options: DashboardOptions,
    input: Option<InputReader>,
    stopped: bool,
}

impl<S, K, T, W> Dashboard<S, K, T, W>
where
    S: PortScannerPort,
    K: ProcessKillerPort,
    T: StatsRepository,
    W: Screen,
{
    pub fn new(
        service: PortService<S>,
        killer: K,
        stats: T,
        screen: W,
        state: DashboardState,
        options: DashboardOptions,
    ) -> Self {
        Self {
            service,
            killer,
            stats,
            copier: Box::new(no_clipboard),
            screen,
            state,
            cache: FilteredPorts::new(),
            renderer: Renderer::new(),
            activity: ActivityLog::new(),
            options,
            input: None,
            stopped: false,
        }
    }

    pub fn with_copier(mut self, copier: Copier) -> Self {
        self.copier = copier;
        self
    }

    /// Attach the keyboard reader so [`Dashboard::stop`] can shut it down.
    pub fn with_input(mut self, input: InputReader) -> Self {
        self.input = Some(input);
        self
    }

    #[cfg(test)]
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    #[cfg(test)]
    pub fn screen(&self) -> &W {
        &self.screen
    }

    #[cfg(test)]
    pub fn screen_mut(&mut self) -> &mut W {
        &mut self.screen
    }

    fn visible(&mut self) -> Rc<[VisiblePort]> {
        self.cache.compute(&self.state)
    }

    fn clamp_selection(&mut self) {
        let visible = self.visible();
        self.state.clamp_selection(visible.len());
    }

    fn selected(&mut self) -> Option<PortInfo> {
        let visible = self.visible();
        visible
            .get(self.state.selected_index())
            .map(|entry| entry.port.clone())
    }

    pub async fn load_stats(&mut self) {
        match self.stats.load_stats().await {
            Ok(stats) => self.state.kill_stats = stats,
            Err(err) => warn!(error = %err, "failed to load kill stats"),
        }
    }

    /// Rescan ports. A failed scan keeps the last good data on screen.
    pub async fn refresh(&mut self) {
        match self.service.refresh(&self.state.groups).await {
            Ok(processed) => {
                self.state.replace_data(processed);
                apply_sort(&mut self.state.groups, self.state.sort_by);
                self.cache.invalidate();
                self.clamp_selection();
            }
            Err(err) => {
                warn!(error = %err, "port refresh failed");
                self.activity.push(format!("refresh failed: {}", err));
            }
        }
    }

    /// Draw one frame. I/O errors are logged and force the next frame to be
    /// a full repaint.
    pub fn render(&mut self, now: Instant) -> Option<RenderPass> {
        let visible = self.visible();
        match self
            .renderer
            .render(&mut self.screen, &mut self.state, &visible, now)
        {
            Ok(pass) => Some(pass),
            Err(err) => {
                warn!(error = %err, "render failed");
                self.renderer.invalidate();
                None
            }
        }
    }

    pub async fn handle_event(&mut self, event: Event) -> Flow {
        match event {
            Event::Tick => {
                self.refresh().await;
                Flow::Continue
            }
            Event::Resize(width, height) => {
                let size = self.screen.query_size();
                debug!(width, height, ?size, "terminal resized");
                self.renderer.invalidate();
                Flow::Continue
            }
            Event::Key(key) => self.handle_key(key).await,
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Flow {
        match self.state.modal().map(Modal::kind) {
            Some(ModalKind::Confirm) => return self.handle_confirm(&key).await,
            Some(_) => {
                if action_for_key(&key) == Some(Action::ForceQuit) {
                    return Flow::Quit;
                }
                if closes_overlay(&key) {
                    self.state.exit_modal();
                }
                return Flow::Continue;
            }
            None => {}
        }

        if self.state.is_searching() {
            return self.handle_search(&key);
        }

        match action_for_key(&key) {
            Some(action) => self.apply(action).await,
            None => Flow::Continue,
        }
    }

    fn handle_search(&mut self, key: &KeyEvent) -> Flow {
        match search_input(key) {
            SearchInput::Digit(c) => {
                self.state.push_search_char(c);
            }
            SearchInput::Backspace => {
                self.state.pop_search_char();
            }
            SearchInput::Apply => self.state.commit_search(),
            SearchInput::Cancel => self.state.cancel_search(),
            SearchInput::ForceQuit => return Flow::Quit,
            SearchInput::Ignored => return Flow::Continue,
        }
        self.clamp_selection();
        Flow::Continue
    }

    async fn handle_confirm(&mut self, key: &KeyEvent) -> Flow {
        let force_override = match confirm_input(key) {
            ConfirmInput::Accept => false,
            ConfirmInput::AcceptForce => true,
            ConfirmInput::Cancel => {
                self.state.exit_modal();
                return Flow::Continue;
            }
            ConfirmInput::ForceQuit => return Flow::Quit,
            ConfirmInput::Ignored => return Flow::Continue,
        };
        if let Some(Modal::Confirm(pending)) = self.state.exit_modal() {
            self.execute_kill(pending.port, pending.force || force_override)
                .await;
        }
        Flow::Continue
    }

    async fn apply(&mut self, action: Action) -> Flow {
        match action {
            Action::MoveUp => self.move_selection(-1),
            Action::MoveDown => self.move_selection(1),
            Action::PageUp => self.move_selection(-self.page_size()),
            Action::PageDown => self.move_selection(self.page_size()),
            Action::Kill | Action::ForceKill => {
                let force = action == Action::ForceKill;
                if let Some(port) = self.selected() {
                    if self.options.confirm_kills {
                        self.state
                            .enter_modal(Modal::Confirm(PendingKill { port, force }));
                    } else {
                        self.execute_kill(port, force).await;
                    }
                }
            }
            Action::CopyCommand => self.copy_selected(),
            Action::ViewCommand => {
                if let Some(port) = self.selected() {
                    self.state.enter_modal(Modal::Command {
                        title: format!(
                            " {} (pid {}) on port {}",
                            port.process_name, port.pid, port.port
                        ),
                        command: port.command,
                    });
                }
            }
            Action::ViewLogs => self
                .state
                .enter_modal(Modal::Logs(self.activity.modal_lines())),
            Action::ViewStats => self
                .state
                .enter_modal(Modal::Stats(stats_lines(&self.state.kill_stats))),
            Action::ToggleDetails => self.state.show_details = !self.state.show_details,
            Action::Sort(key) => {
                self.state.sort_by = Some(key);
                apply_sort(&mut self.state.groups, Some(key));
                self.cache.invalidate();
                self.clamp_selection();
            }
            Action::ToggleGroup => {
                let visible = self.visible();
                if let Some(id) = self.state.toggle_group_at_selection(&visible) {
                    self.activity.push(format!("toggled group {}", id));
                    self.clamp_selection();
                }
            }
            Action::ExpandAll => {
                let expanded = self.state.expand_all_groups();
                if expanded > 0 {
                    self.activity.push(format!("expanded {} groups", expanded));
                }
            }
            Action::BeginSearch => self.state.begin_search(),
            Action::ClearFilter => {
                if !self.state.filter().is_empty() {
                    self.state.set_filter("");
                    self.clamp_selection();
                }
            }
            Action::Refresh => self.refresh().await,
            Action::Help => self.state.enter_modal(Modal::Help),
            Action::Quit | Action::ForceQuit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn page_size(&self) -> isize {
        let height = self.screen.size().1;
        let rows = row_budget(height, self.state.show_details).max(1);
        isize::try_from(rows).unwrap_or(1)
    }

    fn move_selection(&mut self, delta: isize) {
        let visible = self.visible();
        self.state.move_selection(delta, visible.len());
    }

    fn copy_selected(&mut self) {
        let Some(port) = self.selected() else {
            return;
        };
        let (text, color) = match (self.copier)(&port.command) {
            Ok(()) => {
                debug!(pid = port.pid, "command copied");
                (format!("📋 Copied command of {}", port.process_name), MessageColor::Cyan)
            }
            Err(err) => {
                warn!(error = %err, "clipboard copy failed");
                (format!("Copy failed: {}", err), MessageColor::Yellow)
            }
        };
        self.activity.push(&text);
        self.state
            .record_kill_message(text, color, self.options.toast_duration, Instant::now());
    }

    async fn execute_kill(&mut self, port: PortInfo, force: bool) {
        let success = match self.killer.kill(port.pid, force).await {
            Ok(gone) => gone,
            Err(err) => {
                warn!(pid = port.pid, port = port.port, error = %err, "kill failed");
                self.activity
                    .push(format!("kill pid {} failed: {}", port.pid, err));
                false
            }
        };
        info!(pid = port.pid, port = port.port, force, success, "kill finished");

        match self.stats.record_kill(&port, success, force).await {
            Ok(stats) => self.state.kill_stats = stats,
            Err(err) => {
                warn!(error = %err, "failed to persist kill stats");
                self.state
                    .kill_stats
                    .record(&port, success, force, Utc::now());
            }
        }

        let message = generate_kill_message(&port, success, force);
        let text = message.display_text();
        self.activity.push(&text);
        self.state.record_kill_message(
            text,
            message.color,
            self.options.toast_duration,
            Instant::now(),
        );
        self.refresh().await;
    }

    /// Process events until quit or until the event source closes.
    pub async fn run(&mut self, mut events: UnboundedReceiver<Event>) {
        self.load_stats().await;
        self.refresh().await;
        self.render(Instant::now());

        let mut ticker = tokio::time::interval(self.options.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            let event = tokio::select! {
                _ = ticker.tick() => Event::Tick,
                received = events.recv() => match received {
                    Some(event) => event,
                    None => break,
                },
            };
            if self.handle_event(event).await == Flow::Quit {
                break;
            }
            self.render(Instant::now());
        }

        self.stop();
    }

    /// Stop input and clear the screen. Only the first call does anything;
    /// returns whether this call did the cleanup.
    pub fn stop(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        self.stopped = true;
        if let Some(mut input) = self.input.take() {
            input.stop();
        }
        let cleared = self
            .screen
            .clear_screen()
            .and_then(|_| self.screen.show_cursor())
            .and_then(|_| self.screen.flush());
        if let Err(err) = cleared {
            warn!(error = %err, "failed to clear screen on exit");
        }
        info!("dashboard stopped");
        true
    }
}

/// Lines of the stats modal.
pub fn stats_lines(stats: &KillStats) -> Vec<String> {
    let rank = current_rank(stats.total_kills);
    let mut lines = vec![
        " Kill stats".to_string(),
        String::new(),
        format!(
            "  Rank:            {}{}",
            rank.emoji.map(|e| format!("{} ", e)).unwrap_or_default(),
            rank.name
        ),
    ];
    if let Some(next) = next_rank(stats.total_kills) {
        lines.push(format!(
            "  Next rank:       {} at {} kills ({} to go)",
            next.name,
            next.min_kills,
            next.min_kills - stats.total_kills
        ));
    }
    lines.push(format!("  Total kills:     {}", stats.total_kills));
    lines.push(format!("  Force kills:     {}", stats.force_kills));
    lines.push(format!("  Failed attempts: {}", stats.failed_kills));
    if let Some((name, count)) = stats.favorite_target() {
        lines.push(format!("  Favorite target: {} ({})", name, count));
    }
    if let Some(at) = stats.first_kill_at {
        lines.push(format!("  First kill:      {}", at.format("%Y-%m-%d %H:%M")));
    }
    if let Some(at) = stats.last_kill_at {
        lines.push(format!("  Last kill:       {}", at.format("%Y-%m-%d %H:%M")));
    }
    if !stats.kills_by_process.is_empty() {
        lines.push(String::new());
        lines.push("  By process:".to_string());
        for (name, count) in &stats.kills_by_process {
            lines.push(format!("    {:<20} {}", name, count));
        }
    }
    lines
}
