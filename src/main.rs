//! pagestack - continuous-scroll PDF viewer for the terminal
//!
//! Thin presentation shell over the viewer core: draws the page stack as
//! a scrollable column of placeholders, routes scroll/zoom input, and
//! shows the page/zoom indicators in a status bar.

use std::fs::File;
use std::io::{Stdout, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};
use simplelog::{Config, LevelFilter, WriteLogger};

use pagestack::viewer::{
    DEFAULT_WORKERS, MupdfSource, PAGE_SEPARATOR_PX, ScrollDirection, SurfaceState,
    ViewerSession, ViewportTracker,
};

/// Pixels of page content represented by one terminal row
const PX_PER_ROW: u32 = 24;

/// Scroll step for one wheel tick or arrow key, in pixels
const SCROLL_STEP_PX: u32 = 48;

#[derive(Parser)]
#[command(
    name = "pagestack",
    about = "Continuous-scroll PDF viewer for the terminal"
)]
struct Args {
    /// PDF document to open
    document: PathBuf,

    /// Number of render worker threads
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Log file path
    #[arg(long, default_value = "pagestack.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    WriteLogger::init(
        LevelFilter::Info,
        Config::default(),
        File::create(&args.log_file)?,
    )?;
    info!("starting pagestack viewer for {}", args.document.display());

    let source = Arc::new(MupdfSource::new(&args.document));
    let mut session = ViewerSession::with_workers(source, args.workers);
    session.load()?;

    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_viewer(&mut terminal, &mut session);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("viewer error: {err:?}");
        println!("{err:?}");
    }

    info!("shutting down pagestack");
    Ok(())
}

fn run_viewer(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: &mut ViewerSession,
) -> Result<()> {
    let mut tracker = ViewportTracker::new();
    let mut redraw = true;

    loop {
        if session.poll_responses() {
            redraw = true;
        }

        // Extents shift as renders report their dimensions, so visibility
        // is re-derived every tick, not only on scroll.
        let extents = session.layout_extents();
        let viewport_px =
            u32::from(terminal.size()?.height.saturating_sub(1)) * PX_PER_ROW;
        tracker.set_viewport_height(viewport_px);
        let events = tracker.update(&extents, PAGE_SEPARATOR_PX);
        if !events.is_empty() {
            session.apply_visibility(&events);
            redraw = true;
        }

        if redraw {
            terminal.draw(|frame| draw_viewer(frame, session, &tracker))?;
            redraw = false;
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) => {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Up | KeyCode::Char('k') => {
                        tracker.scroll(
                            ScrollDirection::Up,
                            SCROLL_STEP_PX,
                            &extents,
                            PAGE_SEPARATOR_PX,
                        );
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        tracker.scroll(
                            ScrollDirection::Down,
                            SCROLL_STEP_PX,
                            &extents,
                            PAGE_SEPARATOR_PX,
                        );
                    }
                    KeyCode::PageUp => {
                        tracker.scroll(
                            ScrollDirection::Up,
                            viewport_px,
                            &extents,
                            PAGE_SEPARATOR_PX,
                        );
                    }
                    KeyCode::PageDown => {
                        tracker.scroll(
                            ScrollDirection::Down,
                            viewport_px,
                            &extents,
                            PAGE_SEPARATOR_PX,
                        );
                    }
                    KeyCode::Char('g') => tracker.scroll_to_top(),
                    KeyCode::Char('G') => {
                        tracker.scroll_to_bottom(&extents, PAGE_SEPARATOR_PX);
                    }
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        if session.zoom_in() {
                            tracker.reset();
                        }
                    }
                    KeyCode::Char('-') => {
                        if session.zoom_out() {
                            tracker.reset();
                        }
                    }
                    _ => {}
                }
                redraw = true;
            }

            Event::Mouse(mouse) => {
                let ctrl = mouse.modifiers.contains(KeyModifiers::CONTROL);
                match mouse.kind {
                    MouseEventKind::ScrollUp if ctrl => {
                        if session.handle_zoom_wheel(ScrollDirection::Up) {
                            tracker.reset();
                        }
                    }
                    MouseEventKind::ScrollDown if ctrl => {
                        if session.handle_zoom_wheel(ScrollDirection::Down) {
                            tracker.reset();
                        }
                    }
                    MouseEventKind::ScrollUp => {
                        tracker.scroll(
                            ScrollDirection::Up,
                            SCROLL_STEP_PX,
                            &extents,
                            PAGE_SEPARATOR_PX,
                        );
                    }
                    MouseEventKind::ScrollDown => {
                        tracker.scroll(
                            ScrollDirection::Down,
                            SCROLL_STEP_PX,
                            &extents,
                            PAGE_SEPARATOR_PX,
                        );
                    }
                    _ => {}
                }
                redraw = true;
            }

            Event::Resize(..) => redraw = true,
            _ => {}
        }
    }
}

fn draw_viewer(frame: &mut Frame, session: &ViewerSession, tracker: &ViewportTracker) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.area());

    draw_page_stack(frame, chunks[0], session, tracker);
    draw_status_bar(frame, chunks[1], session);
}

fn draw_page_stack(
    frame: &mut Frame,
    area: Rect,
    session: &ViewerSession,
    tracker: &ViewportTracker,
) {
    let offset_rows = tracker.offset_px() / PX_PER_ROW;
    let separator_rows = i64::from((PAGE_SEPARATOR_PX / PX_PER_ROW).max(1));

    let mut top_row = -i64::from(offset_rows);
    for surface in session.surfaces() {
        let height_rows = i64::from((surface.layout_extent() / PX_PER_ROW).max(3));
        let bottom_row = top_row + height_rows;

        if bottom_row > 0 && top_row < i64::from(area.height) {
            let y0 = u16::try_from(top_row.max(0)).unwrap_or(0);
            let y1 = u16::try_from(bottom_row.min(i64::from(area.height))).unwrap_or(0);
            if y1 > y0 {
                let rect = Rect::new(area.x, area.y + y0, area.width, y1 - y0);
                let (label, style) = match &surface.state {
                    SurfaceState::Pending => {
                        ("rendering...".to_string(), Style::default().fg(Color::DarkGray))
                    }
                    SurfaceState::Sized => (
                        format!(
                            "{}x{} rendering...",
                            surface.width_px, surface.height_px
                        ),
                        Style::default().fg(Color::DarkGray),
                    ),
                    SurfaceState::Ready => (
                        format!("{}x{}", surface.width_px, surface.height_px),
                        Style::default().fg(Color::Gray),
                    ),
                    SurfaceState::Failed(detail) => (
                        format!("render failed: {detail}"),
                        Style::default().fg(Color::Red),
                    ),
                };
                let block = Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Page {} ", surface.page))
                    .border_style(style);
                frame.render_widget(Paragraph::new(label).block(block), rect);
            }
        }

        top_row = bottom_row + separator_rows;
    }
}

fn draw_status_bar(frame: &mut Frame, area: Rect, session: &ViewerSession) {
    let status = session.status();

    let text = if status.controls_enabled {
        let active = status
            .active_page
            .map_or_else(|| "-".to_string(), |page| page.to_string());
        let title = session
            .doc_title()
            .map_or_else(String::new, |t| format!("  {t}"));
        format!(
            " Page {active}/{}   Zoom {}{title}",
            status.page_count, status.zoom_percent
        )
    } else {
        " No pages".to_string()
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::Black).bg(Color::Gray)),
        area,
    );
}
