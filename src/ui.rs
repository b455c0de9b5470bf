//! Terminal stand-in for the LED chain: four stacked 8x8 panels and a status column.

use crate::render::{Frame as LedFrame, PANEL_COUNT, PANEL_ROWS, Panel, Phase, RenderSink, Stats};
use crate::theme::Theme;
use log::warn;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use ratatui::{DefaultTerminal, Frame};

/// We use half-blocks (▀) so one terminal row shows two LED rows.
const LED_GLYPH: &str = "▀▀";
/// Terminal columns per LED.
const LED_WIDTH: u16 = 2;
/// Panel size in terminal cells including its border.
const PANEL_WIDTH: u16 = crate::grid::COLS as u16 * LED_WIDTH + 2;
const PANEL_HEIGHT: u16 = PANEL_ROWS as u16 / 2 + 2;
const SIDEBAR_WIDTH: u16 = 26;

/// Sink that paints every frame it receives straight onto the terminal.
pub struct TerminalSink {
    terminal: DefaultTerminal,
    theme: Theme,
    stats: Option<Stats>,
    source: String,
}

impl TerminalSink {
    /// `source` is a short description of where commands come from, shown in the status column.
    pub fn new(terminal: DefaultTerminal, theme: Theme, source: String) -> Self {
        Self {
            terminal,
            theme,
            stats: None,
            source,
        }
    }
}

impl RenderSink for TerminalSink {
    fn draw(&mut self, frame: &LedFrame) {
        let theme = &self.theme;
        let stats = self.stats;
        let source = self.source.as_str();
        if let Err(e) = self
            .terminal
            .draw(|f| draw(f, frame, theme, stats.as_ref(), source))
        {
            warn!("terminal draw failed: {e}");
        }
    }

    fn report(&mut self, stats: &Stats) {
        self.stats = Some(*stats);
    }
}

pub fn draw(f: &mut Frame, led: &LedFrame, theme: &Theme, stats: Option<&Stats>, source: &str) {
    let area = f.area();
    let total_w = PANEL_WIDTH + SIDEBAR_WIDTH;
    let total_h = PANEL_HEIGHT * PANEL_COUNT as u16;
    let outer = Rect {
        x: area.x + area.width.saturating_sub(total_w) / 2,
        y: area.y + area.height.saturating_sub(total_h) / 2,
        width: total_w.min(area.width),
        height: total_h.min(area.height),
    };
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(PANEL_WIDTH), Constraint::Length(SIDEBAR_WIDTH)])
        .split(outer);

    let clearing = stats.is_some_and(|s| s.phase == Phase::Clearing);
    let lit = if clearing { theme.flash } else { theme.lit };
    let panel_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(PANEL_HEIGHT); PANEL_COUNT])
        .split(columns[0]);
    for (panel, rect) in led.panels().iter().zip(panel_areas.iter()) {
        draw_panel(f, panel, *rect, theme, lit);
    }

    draw_sidebar(f, theme, stats, source, columns[1]);
}

fn draw_panel(f: &mut Frame, panel: &Panel, area: Rect, theme: &Theme, lit: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.bezel));
    let inner = block.inner(area);
    block.render(area, f.buffer_mut());

    let led = |on: bool| if on { lit } else { theme.unlit };
    let lines: Vec<Line> = panel
        .chunks(2)
        .map(|pair| {
            let spans: Vec<Span> = pair[0]
                .iter()
                .zip(pair[1].iter())
                .map(|(&top, &bottom)| {
                    Span::styled(LED_GLYPH, Style::default().fg(led(top)).bg(led(bottom)))
                })
                .collect();
            Line::from(spans)
        })
        .collect();
    Paragraph::new(lines).render(inner, f.buffer_mut());
}

fn draw_sidebar(f: &mut Frame, theme: &Theme, stats: Option<&Stats>, source: &str, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.bezel))
        .title(Span::styled(" ledtris ", title_style));
    let inner = block.inner(area);
    block.render(area, f.buffer_mut());

    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<8}"), title_style),
            Span::styled(value, fg_style),
        ])
    };
    let mut lines = Vec::new();
    if let Some(s) = stats {
        let state = match s.phase {
            Phase::Falling => "falling",
            Phase::Clearing => "clearing",
            Phase::Stopped => "stopped",
        };
        lines.push(field("Score", s.score.to_string()));
        lines.push(field("Lines", s.lines.to_string()));
        lines.push(field("Gravity", format!("{} ms", s.interval.as_millis())));
        lines.push(field("State", state.to_string()));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Controls", title_style)));
    for help in [
        "←/→ h/l  move",
        "↓ j spc  drop",
        "↑ k x    rotate cw",
        "z u      rotate ccw",
        "r        reset",
        "q Esc    quit",
    ] {
        lines.push(Line::from(Span::styled(help, fg_style)));
    }
    lines.push(Line::default());
    lines.push(field("Input", source.to_string()));
    Paragraph::new(lines).render(inner, f.buffer_mut());
}
