use crate::app::App;
use gridwarp::braille::{BrailleCanvas, BrailleTarget};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = if app.is_rotated() { " Rotated Pole " } else { " World Grid " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    app.resize_map(inner.width, inner.height);
    let target = app.paint();

    // Get mouse cursor position for marker
    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    frame.render_widget(MapWidget { target, cursor_pos }, inner);
}

/// Renders the painted braille layers with labels overlaid
struct MapWidget {
    target: BrailleTarget,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(&self, canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (row_idx, row_str) in canvas.rows().enumerate().take(area.height as usize) {
            let y = area.y + row_idx as u16;
            for (col_idx, ch) in row_str.chars().enumerate().take(area.width as usize) {
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Layers in first-painted order, so later passes land on top
        for (color, canvas) in self.target.layers() {
            self.render_layer(canvas, color, area, buf);
        }

        for label in self.target.labels() {
            if label.row >= area.height || label.col >= area.width {
                continue;
            }
            let x = area.x + label.col;
            let y = area.y + label.row;
            let max_len = (area.width - label.col) as usize;
            let style = Style::default().fg(label.color);
            for (i, ch) in label.text.chars().take(max_len.min(24)).enumerate() {
                buf[(x + i as u16, y)].set_char(ch).set_style(style);
            }
        }

        if let Some((cx, cy)) = self.cursor_pos {
            buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
        }
    }
}

fn toggle_span(on: bool, on_text: &'static str, off_text: &'static str) -> Span<'static> {
    Span::styled(
        if on { on_text } else { off_text },
        Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
    )
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.renderer.settings;
    let stats = app.last_stats;
    let dim = Style::default().fg(Color::DarkGray);

    let cursor = match app.cursor_cell() {
        Some((w, (i, j))) => format!(" | ({:.1}, {:.1}) cell {i},{j}", w.x, w.y),
        None => String::new(),
    };

    let status = Line::from(vec![
        Span::styled(" Zoom: ", dim),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(format!(" x{} ", app.period_count()), Style::default().fg(Color::Magenta)),
        toggle_span(settings.show_coastlines, "[C]oast ", "[c]oast "),
        toggle_span(settings.show_graticule, "[G]rat ", "[g]rat "),
        toggle_span(settings.show_mesh, "[M]esh ", "[m]esh "),
        toggle_span(settings.show_labels, "[L]abels ", "[l]abels "),
        toggle_span(settings.preview, "[P]review ", "[p]review "),
        toggle_span(app.is_rotated(), "[O]pole ", "[o]pole "),
        Span::styled("| ", dim),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!(
                " | seg {} drawn {} dead {} nan {}",
                stats.segments, stats.drawn, stats.dead_stops, stats.anomalies
            ),
            Style::default().fg(if stats.anomalies > 0 { Color::Red } else { Color::DarkGray }),
        ),
        Span::styled(cursor, dim),
        Span::styled(" | hjkl:pan +/-:zoom r:reset q:quit", dim),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
