//! TUI module for drumfield
//!
//! Draws the step grid over the particle field and turns keys and mouse
//! events into engine commands. The grid shown is always the engine's, as
//! reported by the latest `StateUpdate`.

mod field;
mod grid;
mod transport;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use rand::rngs::SmallRng;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Clear, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer, PushError};

use drumfield::{
    engine::{Command, StateUpdate},
    kit::Sample,
    particles::{ParticleField, PointerState},
    sequencing::PresetLibrary,
    transport::{MAX_BPM, MIN_BPM},
};

use field::{field_point, field_size, render_field};
use grid::{cell_at, grid_area, render_grid, GridCursor};
use transport::{render_transport, AudioStats};

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

/// Longest simulation step, so a stalled frame does not fling particles
const MAX_FRAME_DT: f32 = 0.05;

const BPM_STEP: f64 = 5.0;

/// Static state handed to the UI once at startup
pub struct UiInit {
    pub sample_rate: u32,
    /// Copy of the engine's library, for names and random picks
    pub library: PresetLibrary,
    /// Teleport the particle field at every new bar
    pub teleport: bool,
}

/// Ring buffer ends the UI holds
pub struct UiChannels {
    pub commands: Producer<Command>,
    pub state_rx: Consumer<StateUpdate>,
    pub audio_rx: Consumer<f32>,
    /// Samples replaced in the engine, freed on this thread
    pub retired_rx: Consumer<Sample>,
}

/// Whether a state update should teleport the field
fn should_teleport(last_bar: u64, bar: u64, enabled: bool) -> bool {
    enabled && bar != last_bar
}

/// Tempo the UI has asked for but not yet seen reported back
///
/// Keeps repeated `+`/`-` presses cumulative between state updates.
#[derive(Debug, Default, Clone, Copy)]
struct BpmNudge {
    pending: Option<f64>,
}

impl BpmNudge {
    /// New target after moving by `delta` from the latest known target
    fn nudge(&mut self, reported_target: f64, delta: f64) -> f64 {
        let target = (self.pending.unwrap_or(reported_target) + delta).clamp(MIN_BPM, MAX_BPM);
        self.pending = Some(target);
        target
    }

    /// Drop the pending target once the engine reports it
    fn settle(&mut self, reported_target: f64) {
        if self.pending == Some(reported_target) {
            self.pending = None;
        }
    }
}

/// Screen regions from the last draw, for mouse hit testing
#[derive(Debug, Default, Clone, Copy)]
struct Areas {
    field: Rect,
    grid: Rect,
}

/// UI application state
pub struct UiApp {
    channels: UiChannels,
    /// Latest engine state
    state: StateUpdate,
    bpm: BpmNudge,
    init: UiInit,
    audio_buffer: Vec<f32>,
    cursor: GridCursor,
    field: ParticleField,
    pointer: PointerState,
    rng: SmallRng,
    last_bar: u64,
    last_frame: Instant,
    areas: Areas,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        channels: UiChannels,
        state: StateUpdate,
        init: UiInit,
        field: ParticleField,
        rng: SmallRng,
    ) -> Self {
        Self {
            channels,
            last_bar: state.bar,
            state,
            bpm: BpmNudge::default(),
            init,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            cursor: GridCursor::default(),
            field,
            pointer: PointerState::default(),
            rng,
            last_frame: Instant::now(),
            areas: Areas::default(),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_state();
            self.step_field();

            terminal.draw(|frame| self.render(frame))?;

            // Handle input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key.code),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Poll for new audio samples from ring buffer
    fn poll_audio(&mut self) {
        // Keep only the last VIS_BUFFER_SIZE samples
        while let Ok(sample) = self.channels.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    /// Keep only the latest state; a new bar teleports the field
    fn poll_state(&mut self) {
        let previous = self.state;
        while let Ok(state) = self.channels.state_rx.pop() {
            self.state = state;
        }
        while let Ok(sample) = self.channels.retired_rx.pop() {
            drop(sample);
        }

        if self.state.rejected > previous.rejected {
            tracing::warn!(
                count = self.state.rejected - previous.rejected,
                total = self.state.rejected,
                "engine rejected commands"
            );
        }
        self.bpm.settle(self.state.target_bpm);

        if should_teleport(self.last_bar, self.state.bar, self.init.teleport) {
            self.field.teleport();
        }
        self.last_bar = self.state.bar;
    }

    fn step_field(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32().min(MAX_FRAME_DT);
        self.last_frame = now;
        self.field.step(dt, &self.pointer);
    }

    fn send(&mut self, command: Command) {
        tracing::debug!(?command, "command");
        if let Err(PushError::Full(command)) = self.channels.commands.push(command) {
            tracing::warn!(?command, "command queue full, dropping");
        }
    }

    fn toggle(&mut self) {
        let (voice, step) = self.cursor.cell();
        self.send(Command::Toggle { voice, step });
    }

    fn load_preset(&mut self, index: usize) {
        let Some(name) = self.init.library.names().nth(index) else {
            return;
        };
        tracing::info!(preset = name, "loading preset");
        self.send(Command::LoadPreset(index));
    }

    fn nudge_bpm(&mut self, delta: f64) {
        let target = self.bpm.nudge(self.state.target_bpm, delta);
        self.send(Command::SetBpm(target));
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                let command = if self.state.playing { Command::Stop } else { Command::Start };
                self.send(command);
            }
            KeyCode::Enter | KeyCode::Char('x') => self.toggle(),
            KeyCode::Up | KeyCode::Char('k') => self.cursor.move_by(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => self.cursor.move_by(1, 0),
            KeyCode::Left | KeyCode::Char('h') => self.cursor.move_by(0, -1),
            KeyCode::Right | KeyCode::Char('l') => self.cursor.move_by(0, 1),
            KeyCode::Char('c') => self.send(Command::Clear),
            KeyCode::Char('n') => {
                let index = self.init.library.random_index(&mut self.rng);
                self.load_preset(index);
            }
            KeyCode::Char(digit @ '1'..='9') => {
                let index = digit as usize - '1' as usize;
                self.load_preset(index);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge_bpm(BPM_STEP),
            KeyCode::Char('-') | KeyCode::Char('_') => self.nudge_bpm(-BPM_STEP),
            KeyCode::Char('t') => {
                self.init.teleport = !self.init.teleport;
                tracing::info!(teleport = self.init.teleport, "bar teleport");
            }
            _ => {}
        }
    }

    /// Clicks on the grid toggle cells; anything on the field drives the pointer
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let Areas { field, grid } = self.areas;
        let (column, row) = (mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some((grid_row, step)) = cell_at(grid, column, row) {
                    self.cursor.set(grid_row, step);
                    self.toggle();
                } else if let Some((x, y)) = field_point(field, column, row) {
                    self.pointer.press(x, y);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                if let Some((x, y)) = field_point(field, column, row) {
                    self.pointer.move_to(x, y);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.pointer.release(),
            _ => {}
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: transport, field with the grid on top, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(9),    // Field + grid
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let preset = self.state.preset.and_then(|index| self.init.library.get(index));
        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_transport(
            frame,
            chunks[0],
            self.init.sample_rate,
            preset.map(|preset| preset.name.as_str()),
            &self.state,
            &stats,
        );

        // The field follows the terminal size
        let (width, height) = field_size(chunks[1]);
        if (width, height) != (self.field.width(), self.field.height()) {
            self.field.resize(width, height);
        }
        render_field(frame, chunks[1], &self.field, self.pointer.pressed);

        let grid = grid_area(chunks[1]);
        frame.render_widget(Clear, grid);
        render_grid(frame, grid, &self.state, &self.cursor);

        self.areas = Areas {
            field: chunks[1],
            grid,
        };

        let help = Paragraph::new(
            " [Q] Quit  [Space] Play/Stop  [Arrows] Move  [Enter] Toggle  [C] Clear  [N] Random  [1-9] Preset  [+/-] BPM  [T] Teleport",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }
}
