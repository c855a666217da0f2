/// Terminal front end: ASCII rasterizer, keyboard controls, frame loop
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

use clockview_core::{ControlId, ViewerConfig, ViewerState};

pub mod cli;
pub mod loader;
pub mod logging;
pub mod renderer;

pub use loader::AssetLoader;
pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: u32 = 2;

/// Orbit step per key press, in radians
const ORBIT_STEP: f32 = 0.1;

/// Lines reserved at the bottom of the screen for the control panel
const PANEL_HEIGHT: u16 = 2;

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    viewer: ViewerState,
    renderer: AsciiRenderer,
    loader: Option<AssetLoader>,
    selected: ControlId,
    running: bool,
    frame_time: Duration,
    last_fps_sample: Instant,
    frames_since_sample: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: &ViewerConfig, loader: AssetLoader, frame_time: Duration) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(config, Some(loader), frame_time, width, height))
    }

    /// Build the app for a screen of `width` x `height` cells
    pub fn with_size(
        config: &ViewerConfig,
        loader: Option<AssetLoader>,
        frame_time: Duration,
        width: u16,
        height: u16,
    ) -> Self {
        let scene_height = height.saturating_sub(PANEL_HEIGHT);
        Self {
            viewer: ViewerState::new(config, width as u32, scene_height as u32 * CELL_ASPECT),
            renderer: AsciiRenderer::new(width as usize, scene_height as usize),
            loader,
            selected: ControlId::ClockSpeed,
            running: true,
            frame_time,
            last_fps_sample: Instant::now(),
            frames_since_sample: 0,
            fps: 0.0,
        }
    }

    pub fn viewer(&self) -> &ViewerState {
        &self.viewer
    }

    pub fn selected(&self) -> ControlId {
        self.selected
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Handle every pending input event
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            self.poll_loader();
            self.viewer.tick();
            self.render()?;

            // Frame timing
            self.frames_since_sample += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frames_since_sample as f32
                    / (now - self.last_fps_sample).as_secs_f32();
                self.frames_since_sample = 0;
                self.last_fps_sample = now;
            }
        }

        Ok(())
    }

    /// Hand a finished load to the viewer; the loader is dropped afterwards
    pub fn poll_loader(&mut self) {
        let Some(result) = self.loader.as_ref().and_then(AssetLoader::poll) else {
            return;
        };
        self.loader = None;
        self.viewer.finish_load(result);
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        let scene_height = height.saturating_sub(PANEL_HEIGHT);
        self.viewer
            .resize(width as u32, scene_height as u32 * CELL_ASPECT);
        self.renderer.resize(width as usize, scene_height as usize);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Tab => self.selected = self.selected.next(),
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                self.selected = ControlId::ALL[index];
            }
            KeyCode::Left | KeyCode::Char('h') => self.nudge_selected(-1),
            KeyCode::Right | KeyCode::Char('l') => self.nudge_selected(1),
            KeyCode::PageDown => self.nudge_selected(-10),
            KeyCode::PageUp => self.nudge_selected(10),
            KeyCode::Char('a') => self.viewer.orbit.rotate_left(ORBIT_STEP),
            KeyCode::Char('d') => self.viewer.orbit.rotate_left(-ORBIT_STEP),
            KeyCode::Char('w') => self.viewer.orbit.rotate_up(ORBIT_STEP),
            KeyCode::Char('s') => self.viewer.orbit.rotate_up(-ORBIT_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.viewer.orbit.zoom(1.0),
            KeyCode::Char('-') => self.viewer.orbit.zoom(-1.0),
            _ => {}
        }
    }

    fn nudge_selected(&mut self, steps: i32) {
        self.viewer.controls.nudge(self.selected, steps);
        log::debug!(
            "{} -> {}",
            self.selected,
            self.viewer.controls.display_text(self.selected)
        );
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear(self.viewer.background());
        if let Some(model) = self.viewer.model() {
            self.renderer
                .render_scene(model.scene(), &self.viewer.camera, &self.viewer.lighting);
        }

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        // Status line over the scene
        let status = if self.viewer.is_loaded() {
            "clock loaded"
        } else if self.loader.is_some() {
            "loading clock..."
        } else {
            "clock unavailable (see log)"
        };
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "clockview | FPS: {:.1} | {} | Tab/1-5=Select ←/→=Adjust WASD=Orbit +/-=Zoom Q=Quit",
                self.fps, status
            )),
            ResetColor
        )?;

        self.draw_panel(&mut stdout)?;
        stdout.flush()?;
        Ok(())
    }

    fn draw_panel<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let top = self.renderer.height() as u16;
        queue!(
            writer,
            cursor::MoveTo(0, top),
            terminal::Clear(ClearType::FromCursorDown)
        )?;

        for (index, control) in ControlId::ALL.into_iter().enumerate() {
            let text = format!(
                " {}:{} {} ",
                index + 1,
                control,
                self.viewer.controls.display_text(control)
            );
            if control == self.selected {
                queue!(
                    writer,
                    SetAttribute(Attribute::Reverse),
                    Print(text),
                    SetAttribute(Attribute::Reset)
                )?;
            } else {
                queue!(writer, Print(text))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn app() -> TerminalApp {
        TerminalApp::with_size(
            &ViewerConfig::default(),
            None,
            Duration::from_millis(16),
            80,
            26,
        )
    }

    fn press(app: &mut TerminalApp, code: KeyCode) {
        app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    #[test]
    fn test_select_and_adjust_controls() {
        let mut app = app();
        assert_eq!(app.selected(), ControlId::ClockSpeed);

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.selected(), ControlId::RotationX);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::PageUp);
        assert_eq!(app.viewer().controls.rotation_x, 11.0);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.selected(), ControlId::RotationY);
    }

    #[test]
    fn test_background_cycles() {
        let mut app = app();
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Right);
        assert_ne!(app.viewer().background(), clockview_core::Color::BLACK);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert!(app.is_running());
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.is_running());
    }

    #[test]
    fn test_resize_accounts_for_cell_shape() {
        let mut app = app();
        app.handle_event(Event::Resize(100, 27));
        let aspect = app.viewer().camera.aspect;
        assert!((aspect - 100.0 / 50.0).abs() < 1e-6);
        assert_eq!(app.viewer().viewport(), (100, 50));
    }

    #[test]
    fn test_no_loader_means_no_model() {
        let mut app = app();
        app.poll_loader();
        assert!(!app.viewer().is_loaded());
    }
}
