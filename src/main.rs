mod app;
mod ui;

use anyhow::Result;
use app::App;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use gridwarp::data::{self, Layers};
use ratatui::DefaultTerminal;
use std::path::Path;
use std::time::Duration;

fn main() -> Result<()> {
    // Silent unless RUST_LOG is set; anything it prints lands under the TUI
    env_logger::init();

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal);

    // Disable mouse capture and restore terminal
    if let Err(e) = execute!(std::io::stdout(), DisableMouseCapture) {
        log::warn!("disabling mouse capture: {e}");
    }
    ratatui::restore();

    result
}

/// GeoJSON from `data/` if present, else the built-in outlines
fn load_layers() -> Layers {
    let mut layers = Layers::default();
    if let Err(e) = data::load_all_geojson(&mut layers, Path::new("data")) {
        log::warn!("loading map data: {e:#}");
    }
    if layers.coastlines.is_empty() {
        data::generate_simple_world(&mut layers);
    }
    layers
}

/// Handle mouse events for panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel zooms towards the cursor
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize, load_layers())?;

    loop {
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        // ~60fps
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                    // Pan with hjkl or arrow keys
                    KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                    KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                    KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                    KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                    KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                    // Layer and engine toggles
                    KeyCode::Char('c') | KeyCode::Char('C') => app.toggle_coastlines(),
                    KeyCode::Char('g') | KeyCode::Char('G') => app.toggle_graticule(),
                    KeyCode::Char('m') | KeyCode::Char('M') => app.toggle_mesh(),
                    KeyCode::Char('L') => app.toggle_labels(),
                    KeyCode::Char('p') | KeyCode::Char('P') => app.toggle_preview(),
                    KeyCode::Char('o') | KeyCode::Char('O') => app.toggle_rotated_pole()?,

                    KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),
                    _ => {}
                },
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                // Resizes need nothing: the map area is re-measured on every draw
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
