//! Frame renderer.
//!
//! Each call either draws a modal (always a full repaint, and the main-view
//! snapshot is dropped), or draws the port list. The list is drawn as a
//! delta against the previous frame when the two frames have the same
//! shape, otherwise it is cleared and drawn in full.

mod layout;
mod main_view;
pub mod modal;

use std::io;
use std::rc::Rc;
use std::time::Instant;

use tracing::trace;

use self::layout::viewport_offset;
use self::main_view::row_y;
use super::filtered::VisiblePort;
use super::screen::Screen;
use super::state::{DashboardState, ModalKind, SortKey};

pub use self::layout::{format_lifetime, row_budget};

/// What one render call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderPass {
    Modal(ModalKind),
    Full,
    /// Only these list indices were redrawn (plus header, search line,
    /// footer and details strip).
    Delta { rows: Vec<usize> },
}

/// Everything the main view showed in one frame.
#[derive(Debug, Clone)]
struct Snapshot {
    visible: Rc<[VisiblePort]>,
    selected: usize,
    filter: String,
    sort: Option<SortKey>,
    details: bool,
    offset: usize,
    size: (u16, u16),
}

impl Snapshot {
    fn capture(state: &DashboardState, visible: &Rc<[VisiblePort]>, size: (u16, u16)) -> Self {
        let budget = row_budget(size.1, state.show_details);
        let selected = state.selected_index();
        Self {
            visible: Rc::clone(visible),
            selected,
            filter: state.filter().to_string(),
            sort: state.sort_by,
            details: state.show_details,
            offset: viewport_offset(selected, budget),
            size,
        }
    }

    /// Same list length, filter, sort, details flag, viewport and size.
    fn same_shape(&self, other: &Snapshot) -> bool {
        self.visible.len() == other.visible.len()
            && self.filter == other.filter
            && self.sort == other.sort
            && self.details == other.details
            && self.offset == other.offset
            && self.size == other.size
    }

    fn budget(&self) -> usize {
        row_budget(self.size.1, self.details)
    }

    /// List indices on screen in this frame.
    fn on_screen(&self) -> std::ops::Range<usize> {
        let end = (self.offset + self.budget()).min(self.visible.len());
        self.offset..end.max(self.offset)
    }
}

/// Whether any field shown for a row differs.
fn row_changed(old: &VisiblePort, new: &VisiblePort) -> bool {
    let (a, b) = (&old.port, &new.port);
    a.port != b.port
        || a.pid != b.pid
        || a.process_name != b.process_name
        || a.command != b.command
        || a.lifetime != b.lifetime
        || a.protocol != b.protocol
        || a.user != b.user
        || old.kind != new.kind
}

/// Rows that need redrawing between two frames of the same shape.
fn changed_rows(previous: &Snapshot, current: &Snapshot) -> Vec<usize> {
    let mut rows: Vec<usize> = current
        .on_screen()
        .filter(|&i| row_changed(&previous.visible[i], &current.visible[i]))
        .collect();
    if previous.selected != current.selected {
        rows.push(previous.selected);
        rows.push(current.selected);
    }
    let range = current.on_screen();
    rows.retain(|i| range.contains(i));
    rows.sort_unstable();
    rows.dedup();
    rows
}

#[derive(Debug, Default)]
pub struct Renderer {
    previous: Option<Snapshot>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the next main-view frame to be a full repaint.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    /// Draw one frame and flush it.
    ///
    /// Expires the toast first. The selection is clamped against `visible`
    /// before anything is drawn.
    pub fn render<S: Screen>(
        &mut self,
        screen: &mut S,
        state: &mut DashboardState,
        visible: &Rc<[VisiblePort]>,
        now: Instant,
    ) -> io::Result<RenderPass> {
        let toast_expired = state.expire_toast(now);

        if let Some(overlay) = state.modal() {
            self.previous = None;
            modal::draw(screen, overlay)?;
            screen.flush()?;
            return Ok(RenderPass::Modal(overlay.kind()));
        }

        state.clamp_selection(visible.len());
        let current = Snapshot::capture(state, visible, screen.size());
        let entering_search = state.is_searching() && state.search_buffer().is_empty();

        let delta = match self.previous.as_ref() {
            Some(previous)
                if !toast_expired
                    && state.toast().is_none()
                    && !entering_search
                    && previous.same_shape(&current) =>
            {
                let rows = changed_rows(previous, &current);
                (rows.len() <= current.budget() / 2).then_some(rows)
            }
            _ => None,
        };

        let pass = match delta {
            Some(rows) => {
                draw_delta(screen, state, &current, &rows)?;
                RenderPass::Delta { rows }
            }
            None => {
                draw_full(screen, state, &current)?;
                RenderPass::Full
            }
        };
        screen.flush()?;
        trace!(?pass, "frame rendered");

        self.previous = Some(current);
        Ok(pass)
    }
}

fn draw_selected_details<S: Screen>(screen: &mut S, frame: &Snapshot) -> io::Result<()> {
    match frame.visible.get(frame.selected) {
        Some(entry) if frame.details => main_view::draw_details(screen, entry),
        _ => Ok(()),
    }
}

fn draw_delta<S: Screen>(
    screen: &mut S,
    state: &DashboardState,
    frame: &Snapshot,
    rows: &[usize],
) -> io::Result<()> {
    main_view::draw_header(screen, state, frame.visible.len())?;
    for &index in rows {
        if let Some(y) = row_y(index, frame.offset) {
            main_view::draw_row(screen, y, &frame.visible[index], index == frame.selected)?;
        }
    }
    main_view::draw_search_line(screen, state)?;
    main_view::draw_footer(screen)?;
    draw_selected_details(screen, frame)?;
    if let Some(toast) = state.toast() {
        main_view::draw_toast(screen, toast)?;
    }
    Ok(())
}

fn draw_full<S: Screen>(
    screen: &mut S,
    state: &DashboardState,
    frame: &Snapshot,
) -> io::Result<()> {
    screen.clear_screen()?;
    screen.hide_cursor()?;
    main_view::draw_header(screen, state, frame.visible.len())?;
    main_view::draw_column_titles(screen)?;

    if frame.visible.is_empty() {
        main_view::draw_empty(screen, state)?;
    }
    for index in frame.on_screen() {
        if let Some(y) = row_y(index, frame.offset) {
            main_view::draw_row(screen, y, &frame.visible[index], index == frame.selected)?;
        }
    }

    draw_selected_details(screen, frame)?;
    main_view::draw_search_line(screen, state)?;
    main_view::draw_footer(screen)?;
    if let Some(toast) = state.toast() {
        main_view::draw_toast(screen, toast)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::filtered::FilteredPorts;
    use crate::tui::screen::testing::GridScreen;
    use crate::tui::state::{Modal, PendingKill};
    use portslay_core::{process_ports, MessageColor, PortInfo, Protocol};
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn ports(count: u16) -> Vec<PortInfo> {
        (0..count)
            .map(|i| {
                PortInfo::new(3000 + i, 100 + u32::from(i), "node", "node app.js", "me", Protocol::Tcp)
                    .with_lifetime(Some(60))
            })
            .collect()
    }

    fn loaded(count: u16) -> (DashboardState, FilteredPorts) {
        let mut state = DashboardState::new(Some(SortKey::Port), "", false);
        state.replace_data(process_ports(ports(count), &[]));
        (state, FilteredPorts::new())
    }

    fn touched(screen: &GridScreen) -> BTreeSet<u16> {
        screen.touched.clone()
    }

    #[test]
    fn test_first_frame_is_full() {
        let (mut state, mut cache) = loaded(5);
        let mut screen = GridScreen::new(120, 20);
        let mut renderer = Renderer::new();
        let visible = cache.compute(&state);

        let pass = renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        assert_eq!(pass, RenderPass::Full);
        assert_eq!(screen.screen_clears, 1);
        assert!(!screen.cursor_visible);
        assert!(screen.row(2).starts_with("▶ 3000"));
        assert!(screen.row(6).starts_with("  3004"));
        assert!(screen.row_trimmed(0).contains("5 ports"));
    }

    #[test]
    fn test_one_changed_row_is_a_delta() {
        let (mut state, mut cache) = loaded(5);
        let mut screen = GridScreen::new(120, 20);
        let mut renderer = Renderer::new();
        let visible = cache.compute(&state);
        renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        screen.reset_tracking();

        let mut refreshed = ports(5);
        refreshed[3].command = "node app.js --inspect".to_string();
        state.replace_data(process_ports(refreshed, &state.groups));
        cache.invalidate();
        let visible = cache.compute(&state);

        let pass = renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        assert_eq!(pass, RenderPass::Delta { rows: vec![3] });
        assert_eq!(screen.screen_clears, 0);
        assert_eq!(touched(&screen), BTreeSet::from([0, 5, 18, 19]));
        assert!(screen.row(5).contains("--inspect"));
    }

    #[test]
    fn test_selection_move_redraws_two_rows() {
        let (mut state, mut cache) = loaded(5);
        let mut screen = GridScreen::new(120, 20);
        let mut renderer = Renderer::new();
        let visible = cache.compute(&state);
        renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        screen.reset_tracking();

        state.move_selection(1, visible.len());
        let pass = renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        assert_eq!(pass, RenderPass::Delta { rows: vec![0, 1] });
        assert!(screen.row(2).starts_with("  3000"));
        assert!(screen.row(3).starts_with("▶ 3001"));
    }

    #[test]
    fn test_length_change_is_full() {
        let (mut state, mut cache) = loaded(5);
        let mut screen = GridScreen::new(120, 20);
        let mut renderer = Renderer::new();
        let visible = cache.compute(&state);
        renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();

        state.replace_data(process_ports(ports(4), &state.groups));
        cache.invalidate();
        let visible = cache.compute(&state);
        let pass = renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        assert_eq!(pass, RenderPass::Full);
        assert_eq!(screen.row_trimmed(6), "");
    }

    #[test]
    fn test_many_changed_rows_fall_back_to_full() {
        let (mut state, mut cache) = loaded(10);
        let mut screen = GridScreen::new(120, 14);
        let mut renderer = Renderer::new();
        let visible = cache.compute(&state);
        renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();

        let refreshed: Vec<PortInfo> = ports(10)
            .into_iter()
            .map(|p| p.with_lifetime(Some(62)))
            .collect();
        state.replace_data(process_ports(refreshed, &state.groups));
        cache.invalidate();
        let visible = cache.compute(&state);
        let pass = renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        assert_eq!(pass, RenderPass::Full);
    }

    #[test]
    fn test_modal_drops_snapshot() {
        let (mut state, mut cache) = loaded(3);
        let mut screen = GridScreen::new(120, 20);
        let mut renderer = Renderer::new();
        let visible = cache.compute(&state);
        renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();

        let pending = PendingKill {
            port: visible[0].port.clone(),
            force: false,
        };
        state.enter_modal(Modal::Confirm(pending));
        let pass = renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        assert_eq!(pass, RenderPass::Modal(ModalKind::Confirm));

        state.exit_modal();
        let pass = renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        assert_eq!(pass, RenderPass::Full);
    }

    #[test]
    fn test_toast_lifecycle() {
        let (mut state, mut cache) = loaded(3);
        let mut screen = GridScreen::new(120, 20);
        let mut renderer = Renderer::new();
        let visible = cache.compute(&state);
        let start = Instant::now();

        state.record_kill_message("freed :3000", MessageColor::Green, Duration::from_millis(100), start);
        let pass = renderer.render(&mut screen, &mut state, &visible, start).unwrap();
        assert_eq!(pass, RenderPass::Full);
        assert!(screen.row(17).contains("freed :3000"));

        // Still visible: every frame with a toast is full.
        let pass = renderer
            .render(&mut screen, &mut state, &visible, start + Duration::from_millis(50))
            .unwrap();
        assert_eq!(pass, RenderPass::Full);
        assert!(state.toast().is_some());

        let pass = renderer
            .render(&mut screen, &mut state, &visible, start + Duration::from_millis(150))
            .unwrap();
        assert_eq!(pass, RenderPass::Full);
        assert!(state.toast().is_none());
        assert!(!screen.contains("freed :3000"));
    }

    #[test]
    fn test_entering_search_is_full() {
        let (mut state, mut cache) = loaded(3);
        let mut screen = GridScreen::new(120, 20);
        let mut renderer = Renderer::new();
        let visible = cache.compute(&state);
        renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();

        state.begin_search();
        let pass = renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        assert_eq!(pass, RenderPass::Full);
        assert!(screen.row(18).starts_with(" Search port: _"));
    }

    #[test]
    fn test_scrolls_to_keep_selection_visible() {
        let (mut state, mut cache) = loaded(30);
        let mut screen = GridScreen::new(120, 12);
        let mut renderer = Renderer::new();
        let visible = cache.compute(&state);
        state.move_selection(-1, visible.len());

        let pass = renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        assert_eq!(pass, RenderPass::Full);
        // budget 8: indices 22..30 on rows 2..10
        assert!(screen.row(2).starts_with("  3022"));
        assert!(screen.row(9).starts_with("▶ 3029"));
    }

    #[test]
    fn test_delta_redraws_details_for_new_selection() {
        let (mut state, mut cache) = loaded(5);
        state.show_details = true;
        let mut screen = GridScreen::new(120, 20);
        let mut renderer = Renderer::new();
        let visible = cache.compute(&state);
        renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        assert!(screen.row(16).contains(":3000"));
        screen.reset_tracking();

        state.move_selection(1, visible.len());
        let pass = renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        assert_eq!(pass, RenderPass::Delta { rows: vec![0, 1] });
        assert_eq!(touched(&screen), BTreeSet::from([0, 2, 3, 16, 17, 18, 19]));
        assert!(screen.row(16).contains(":3001  pid 101"));
        assert!(screen.row_trimmed(17).ends_with("node app.js"));
    }

    #[test]
    fn test_details_shrink_the_list() {
        let (mut state, mut cache) = loaded(30);
        state.show_details = true;
        let mut screen = GridScreen::new(120, 12);
        let mut renderer = Renderer::new();
        let visible = cache.compute(&state);
        state.move_selection(-1, visible.len());

        renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        // budget 6: indices 24..30 on rows 2..8, details on rows 8 and 9
        assert!(screen.row(2).starts_with("  3024"));
        assert!(screen.row(7).starts_with("▶ 3029"));
        assert!(screen.row(8).contains(":3029"));
        assert!(!screen.contains("3023"));
    }

    #[test]
    fn test_toggling_details_forces_full() {
        let (mut state, mut cache) = loaded(5);
        let mut screen = GridScreen::new(120, 20);
        let mut renderer = Renderer::new();
        let visible = cache.compute(&state);
        renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        screen.reset_tracking();

        state.show_details = true;
        let pass = renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        assert_eq!(pass, RenderPass::Full);
        assert_eq!(screen.screen_clears, 1);
        assert!(screen.row(16).contains(":3000"));

        state.show_details = false;
        let pass = renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        assert_eq!(pass, RenderPass::Full);
        assert!(!screen.contains("pid 100"));
    }

    #[test]
    fn test_resize_forces_full() {
        let (mut state, mut cache) = loaded(3);
        let mut screen = GridScreen::new(120, 20);
        let mut renderer = Renderer::new();
        let visible = cache.compute(&state);
        renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();

        screen.resize(100, 20);
        let pass = renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        assert_eq!(pass, RenderPass::Full);
    }

    #[test]
    fn test_selection_clamped_before_draw() {
        let (mut state, mut cache) = loaded(5);
        let mut screen = GridScreen::new(120, 20);
        let mut renderer = Renderer::new();
        let visible = cache.compute(&state);
        state.move_selection(-1, visible.len());
        assert_eq!(state.selected_index(), 4);

        state.replace_data(process_ports(ports(2), &state.groups));
        cache.invalidate();
        let visible = cache.compute(&state);
        renderer.render(&mut screen, &mut state, &visible, Instant::now()).unwrap();
        assert_eq!(state.selected_index(), 1);
        assert!(screen.row(3).starts_with("▶ 3001"));
    }
}
