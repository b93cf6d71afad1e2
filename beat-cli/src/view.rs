use beat_meter::{
    display::{self, Hsl},
    FrameReport, Readout,
};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Paragraph},
    Frame,
};

const BALLOON: [&str; 4] = [" .-. ", "(   )", " `-' ", "  |  "];
const BALLOON_WIDTH: u16 = 5;
const BALLOON_HEIGHT: u16 = 4;

const VISUALISER_HEIGHT: u16 = 10;
const MAX_HEIGHT: u64 = 100;

/// Decibel range of the visualiser bars.
const MIN_DECIBELS: f32 = -100.;
const MAX_DECIBELS: f32 = -30.;

/// Everything the UI shows.
pub struct View {
    pub report: Option<FrameReport>,
    pub readout: Option<Readout>,
    pub show_visualiser: bool,
}

impl View {
    pub fn new() -> Self {
        Self {
            report: None,
            readout: None,
            // collapsed at startup
            show_visualiser: false,
        }
    }

    pub fn draw(&self, frame: &mut Frame, freq_data: &[f32]) {
        let color = self
            .readout
            .map(|readout| readout.color)
            .unwrap_or(display::color(0.));
        let style = background_style(color);

        frame.render_widget(Block::new().style(style), frame.area());

        let (container, visualiser) = if self.show_visualiser {
            let layout = Layout::vertical([
                Constraint::Min(0),
                Constraint::Length(VISUALISER_HEIGHT),
            ])
            .split(frame.area());

            (layout[0], Some(layout[1]))
        } else {
            (frame.area(), None)
        };

        self.draw_balloon(frame, container, style);
        self.draw_readout(frame, container, style);

        if let Some(area) = visualiser {
            draw_visualiser(frame, area, freq_data);
        }
    }

    fn draw_readout(&self, frame: &mut Frame, area: Rect, style: Style) {
        let (interval, bpm) = match self.readout {
            Some(readout) => (readout.interval.unwrap_or(0.) as u64, readout.bpm),
            None => (0, 0),
        };

        let mut lines = vec![
            Line::from(format!("{} ms.", interval)),
            Line::from(format!("{} bpm.", bpm)),
        ];

        if let Some(report) = self.report {
            if report.level_db.is_finite() {
                lines.push(Line::from(format!("{} frequency", report.level_db.round())));
            } else {
                lines.push(Line::from("silence"));
            }

            if report.hit {
                lines.push(Line::styled(
                    "● hit",
                    Style::new().fg(Color::Red).add_modifier(Modifier::BOLD),
                ));
            }
        }

        lines.push(Line::styled(
            "q: quit, r: reset, v: visualiser",
            style.add_modifier(Modifier::DIM),
        ));

        frame.render_widget(Paragraph::new(lines).style(style), area);
    }

    fn draw_balloon(&self, frame: &mut Frame, area: Rect, style: Style) {
        if area.width < BALLOON_WIDTH || area.height < BALLOON_HEIGHT {
            return;
        }

        let drift = self.report.map(|report| report.drift).unwrap_or(0.);
        let bpm = self.readout.map(|readout| readout.bpm).unwrap_or(0);

        let free_height = area.height - BALLOON_HEIGHT;
        let x = display::horizontal_offset(drift, area.width as f64, BALLOON_WIDTH as f64) as u16;
        let y = (display::vertical_offset(bpm, free_height as f64) as u16).min(free_height);

        let balloon_area = Rect {
            x: area.x + x,
            y: area.y + free_height - y,
            width: BALLOON_WIDTH,
            height: BALLOON_HEIGHT,
        };

        let balloon = Paragraph::new(BALLOON.map(Line::from).to_vec())
            .style(style.add_modifier(Modifier::BOLD));
        frame.render_widget(balloon, balloon_area);
    }
}

fn draw_visualiser(frame: &mut Frame, area: Rect, freq_data: &[f32]) {
    if area.width == 0 || freq_data.is_empty() {
        return;
    }

    let chunk_size = freq_data.len().div_ceil(area.width as usize);
    let bars: Vec<Bar> = freq_data
        .chunks(chunk_size)
        .map(|chunk| {
            let level = chunk.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            Bar::default()
                .text_value(String::new())
                .value(bar_height(level))
        })
        .collect();

    let bar_chart = BarChart::default()
        .block(Block::new().style(Style::new().bg(Color::Black)))
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::new().fg(Color::LightBlue))
        .max(MAX_HEIGHT);

    frame.render_widget(&bar_chart, area);
}

/// Maps decibels to `[0, MAX_HEIGHT]`.
fn bar_height(level_db: f32) -> u64 {
    if !level_db.is_finite() {
        return 0;
    }

    let normalized = (level_db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
    (normalized.clamp(0., 1.) * MAX_HEIGHT as f32) as u64
}

fn background_style(color: Hsl) -> Style {
    let (r, g, b) = color.to_rgb();
    let fg = if color.lightness > 50. {
        Color::Black
    } else {
        Color::White
    };

    Style::new().bg(Color::Rgb(r, g, b)).fg(fg)
}
