use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::mpsc::Receiver;
use std::time::Duration;
use std::time::Instant;

use crossterm::event;
use crossterm::event::Event;
use crossterm::execute;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use deck_core::config::Config;
use deck_core::focus::Panel;
use deck_core::text::Rgb;
use deck_core::text::StyledLine;
use deck_core::DeckAction;
use deck_core::DeckEffect;
use deck_core::DeckState;
use deck_core::RuntimeAction;
use deck_core::Screen;
use deck_core::UserAction;
use ratatui::backend::Backend;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use ratatui::Terminal;
use tracing::debug;
use tracing::info;

use crate::keymap::map_key;
use crate::worker::Worker;

const INPUT_POLL: Duration = Duration::from_millis(16);

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
    }
}

pub fn run(config: Config, config_path: PathBuf, poll: Duration) -> anyhow::Result<()> {
    let mut state = DeckState::new(&config);
    let (tx, rx) = mpsc::channel();
    let worker = Worker::new(tx, config_path, config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, crossterm::cursor::Hide)?;
    let _guard = TuiGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    run_app(&mut terminal, &mut state, &worker, &rx, poll)
}

/// Feeds effects to the worker. Returns false once the core asks to quit.
fn dispatch(worker: &Worker, effects: Vec<DeckEffect>) -> bool {
    effects.into_iter().all(|effect| worker.dispatch(effect))
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut DeckState,
    worker: &Worker,
    rx: &Receiver<RuntimeAction>,
    poll: Duration,
) -> anyhow::Result<()> {
    let size = terminal.size()?;
    deck_core::reduce(
        state,
        DeckAction::User(UserAction::Resize {
            width: usize::from(size.width),
            height: usize::from(size.height),
        }),
    );
    let mut next_tick = Instant::now();

    loop {
        while let Ok(action) = rx.try_recv() {
            debug!(action = action.name(), "worker result");
            let effects = deck_core::reduce(state, DeckAction::Runtime(action));
            if !dispatch(worker, effects) {
                return Ok(());
            }
        }

        let now = Instant::now();
        if now >= next_tick {
            next_tick = now + poll;
            let effects = deck_core::reduce(state, DeckAction::Runtime(RuntimeAction::Tick { now }));
            if !dispatch(worker, effects) {
                return Ok(());
            }
        }

        terminal.draw(|frame| draw(frame, state))?;

        if event::poll(INPUT_POLL)? {
            let action = match event::read()? {
                Event::Key(key) => map_key(key).map(UserAction::Key),
                Event::Resize(width, height) => Some(UserAction::Resize {
                    width: usize::from(width),
                    height: usize::from(height),
                }),
                _ => None,
            };
            if let Some(action) = action {
                let effects = deck_core::reduce(state, DeckAction::User(action));
                if !dispatch(worker, effects) {
                    info!("quit");
                    return Ok(());
                }
            }
        }
    }
}

fn draw(frame: &mut Frame, state: &DeckState) {
    let area = frame.area();
    let theme = &state.theme;
    frame.render_widget(
        Block::default().style(Style::default().bg(color(theme.bg)).fg(color(theme.fg))),
        area,
    );

    match &state.screen {
        Screen::Diff(view) => {
            render_lines(frame, area, &view.render(theme));
        }
        Screen::Commit(view) => {
            draw_panels(frame, state, area);
            let popup = centered_rect(70, 60, area);
            draw_boxed(frame, state, popup, &view.render(theme));
        }
        Screen::Dashboard => {
            draw_panels(frame, state, area);
        }
    }

    for overlay in state.overlays.iter() {
        let lines = overlay.render(theme);
        draw_boxed(frame, state, overlay_area(&lines, area), &lines);
    }
}

fn draw_panels(frame: &mut Frame, state: &DeckState, area: Rect) {
    let layout = state.router.layout();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let focus = state.router.focus();
    let mut x = rows[0].x;
    for panel in layout.visible_panels() {
        let width = u16::try_from(layout.column(panel)).unwrap_or(u16::MAX);
        let column = Rect::new(x, rows[0].y, width, rows[0].height).intersection(rows[0]);
        x = x.saturating_add(width);

        let lines = match panel {
            Panel::Dashboard => state.dashboard.render(focus.panel() == Panel::Dashboard),
            Panel::Graph => state.graph.render(focus.graph_section()),
            Panel::Conductor => state.conductor.render(focus.conductor_section()),
        };
        let inner = if panel == Panel::Dashboard {
            column
        } else {
            let block = Block::default()
                .borders(Borders::LEFT)
                .border_style(Style::default().fg(color(state.theme.border)));
            let inner = block.inner(column);
            frame.render_widget(block, column);
            inner
        };
        render_lines(frame, inner, &lines);
    }

    render_lines(frame, rows[1], &[state.status_bar()]);
}

fn draw_boxed(frame: &mut Frame, state: &DeckState, area: Rect, lines: &[StyledLine]) {
    let theme = &state.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color(theme.border)))
        .style(Style::default().bg(color(theme.bg)).fg(color(theme.fg)));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);
    render_lines(frame, inner, lines);
}

fn render_lines(frame: &mut Frame, area: Rect, lines: &[StyledLine]) {
    let lines: Vec<Line<'static>> = lines.iter().map(to_line).collect();
    frame.render_widget(Paragraph::new(lines), area);
}

/// Sizes an overlay box around its content, centred in `area`.
fn overlay_area(lines: &[StyledLine], area: Rect) -> Rect {
    let content = lines.iter().map(StyledLine::width).max().unwrap_or(0);
    let width = u16::try_from(content + 4)
        .unwrap_or(u16::MAX)
        .clamp(20.min(area.width), area.width);
    let height = u16::try_from(lines.len() + 2)
        .unwrap_or(u16::MAX)
        .min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

fn to_style(style: deck_core::text::Style) -> Style {
    let mut out = Style::default();
    if let Some(fg) = style.fg {
        out = out.fg(color(fg));
    }
    if let Some(bg) = style.bg {
        out = out.bg(color(bg));
    }
    if style.bold {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.italic {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.dim {
        out = out.add_modifier(Modifier::DIM);
    }
    out
}

fn to_line(line: &StyledLine) -> Line<'static> {
    let spans: Vec<Span<'static>> = line
        .spans
        .iter()
        .map(|span| Span::styled(span.text.clone(), to_style(span.style)))
        .collect();
    let out = Line::from(spans);
    match line.fill {
        Some(bg) => out.style(Style::default().bg(color(bg))),
        None => out,
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
