//! Step grid widget - one row per voice, playhead column, edit cursor

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use drumfield::{
    engine::StateUpdate,
    sequencing::{Voice, STEPS},
};

const LABEL_WIDTH: u16 = 11;
const CELL_WIDTH: u16 = 3;
/// Borders, labels and cells
const GRID_WIDTH: u16 = 2 + LABEL_WIDTH + STEPS as u16 * CELL_WIDTH;
/// Borders, step numbers and one row per voice
const GRID_HEIGHT: u16 = 3 + Voice::COUNT as u16;

/// Edit cursor, as (row in `Voice::GRID_ORDER`, step)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GridCursor {
    row: usize,
    step: usize,
}

impl GridCursor {
    /// Move with wrap-around on both axes
    pub fn move_by(&mut self, rows: isize, steps: isize) {
        self.row = (self.row as isize + rows).rem_euclid(Voice::COUNT as isize) as usize;
        self.step = (self.step as isize + steps).rem_euclid(STEPS as isize) as usize;
    }

    pub fn set(&mut self, row: usize, step: usize) {
        self.row = row.min(Voice::COUNT - 1);
        self.step = step.min(STEPS - 1);
    }

    pub fn cell(&self) -> (Voice, usize) {
        (Voice::GRID_ORDER[self.row], self.step)
    }
}

fn voice_color(voice: Voice) -> Color {
    match voice {
        Voice::Kick => Color::Red,
        Voice::Snare => Color::Yellow,
        Voice::ClosedHat => Color::Cyan,
        Voice::OpenHat => Color::Blue,
    }
}

/// Centre the grid inside `area`
pub fn grid_area(area: Rect) -> Rect {
    let width = GRID_WIDTH.min(area.width);
    let height = GRID_HEIGHT.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Map a terminal cell to (grid row, step), if it lands on a step cell
pub fn cell_at(grid: Rect, column: u16, row: u16) -> Option<(usize, usize)> {
    if grid.width < GRID_WIDTH || grid.height < GRID_HEIGHT {
        return None;
    }

    let first_column = grid.x + 1 + LABEL_WIDTH;
    let first_row = grid.y + 2;
    if column < first_column || row < first_row {
        return None;
    }

    let grid_row = (row - first_row) as usize;
    let step = ((column - first_column) / CELL_WIDTH) as usize;
    (grid_row < Voice::COUNT && step < STEPS).then_some((grid_row, step))
}

/// Render the grid from the engine's latest state
pub fn render_grid(frame: &mut Frame, area: Rect, state: &StateUpdate, cursor: &GridCursor) {
    let block = Block::default().title(" pattern ").borders(Borders::ALL);

    let mut lines = Vec::with_capacity(Voice::COUNT + 1);

    // Step numbers, playhead highlighted
    let mut header = vec![Span::raw(" ".repeat(LABEL_WIDTH as usize))];
    for step in 0..STEPS {
        let style = if state.step == Some(step) {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        header.push(Span::styled(format!("{:^3}", step + 1), style));
    }
    lines.push(Line::from(header));

    for (row, voice) in Voice::GRID_ORDER.into_iter().enumerate() {
        let color = voice_color(voice);
        let label_style = if state.loaded[voice.index()] {
            Style::default().fg(color)
        } else {
            // Still loading
            Style::default().fg(Color::DarkGray)
        };

        let mut spans = vec![Span::styled(
            format!("{:<width$}", voice.name(), width = LABEL_WIDTH as usize),
            label_style,
        )];

        for step in 0..STEPS {
            let active = state.grid[voice.index()][step];
            let (symbol, mut style) = if active {
                (" ■ ", Style::default().fg(color))
            } else if (step / 4) % 2 == 0 {
                (" · ", Style::default().fg(Color::Gray))
            } else {
                (" · ", Style::default().fg(Color::DarkGray))
            };

            if state.step == Some(step) {
                style = style.bg(Color::Indexed(238));
            }
            if cursor.row == row && cursor.step == step {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(symbol, style));
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
