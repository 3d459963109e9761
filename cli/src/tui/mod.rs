//! Interactive dashboard.

mod activity;
mod app;
mod event;
mod filtered;
mod input;
mod render;
mod screen;
mod session;
pub mod sort;
mod state;

use std::io::{self, BufWriter};

use portslay_core::{PortScanner, PortService, ProcessKiller, StatsStore};
use tokio::sync::mpsc;
use tracing::info;

use crate::clipboard::SystemClipboard;

pub use app::{stats_lines, DashboardOptions};
pub use render::format_lifetime;
pub use state::SortKey;

use app::Dashboard;
use input::InputReader;
use screen::CrosstermScreen;
use session::TerminalSession;
use state::DashboardState;

/// Startup settings, merged from the config file and command line.
#[derive(Debug, Clone)]
pub struct TuiOptions {
    pub dashboard: DashboardOptions,
    /// `None` keeps scan order.
    pub sort: Option<SortKey>,
    pub filter: String,
    pub show_details: bool,
}

/// Run the dashboard until the user quits.
pub async fn run(options: TuiOptions) -> anyhow::Result<()> {
    let stats = StatsStore::new()?;
    info!(?options, "starting dashboard");

    let mut session = TerminalSession::enter()?;
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let input = InputReader::spawn(events_tx);
    let mut clipboard = SystemClipboard::new();

    let state = DashboardState::new(options.sort, options.filter, options.show_details);
    let mut dashboard = Dashboard::new(
        PortService::new(PortScanner::new()),
        ProcessKiller::new(),
        stats,
        CrosstermScreen::new(BufWriter::new(io::stdout())),
        state,
        options.dashboard,
    )
    .with_copier(Box::new(move |text: &str| clipboard.copy(text)))
    .with_input(input);

    dashboard.run(events_rx).await;
    session.restore();
    Ok(())
}
