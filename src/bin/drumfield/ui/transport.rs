//! Transport bar widget - shows BPM, play state, position, preset and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use drumfield::{
    engine::StateUpdate,
    sequencing::{Voice, STEPS},
};

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Render the transport bar
pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    sample_rate: u32,
    preset: Option<&str>,
    state: &StateUpdate,
    audio_stats: &AudioStats,
) {
    let block = Block::default().title(" drumfield ").borders(Borders::ALL);

    let play_symbol = if state.playing { "▶" } else { "⏸" };
    let play_state_str = if state.playing { "Playing" } else { "Stopped" };

    // Show the glide target while the tempo is still moving
    let bpm = if (state.bpm - state.target_bpm).abs() > 0.5 {
        format!(" BPM: {:.0} → {:.0}  ", state.bpm, state.target_bpm)
    } else {
        format!(" BPM: {:.0}  ", state.bpm)
    };

    let step = match state.step {
        Some(step) => format!("Step {:>2}/{}  ", step + 1, STEPS),
        None => format!("Step  -/{}  ", STEPS),
    };

    let loaded = state.loaded.iter().filter(|&&loaded| loaded).count();
    let kit = if loaded == Voice::COUNT {
        "kit ready  ".to_string()
    } else {
        format!("kit {loaded}/{}  ", Voice::COUNT)
    };

    let sample_rate_khz = sample_rate as f32 / 1000.0;

    let line = Line::from(vec![
        Span::styled(bpm, Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("{} {}  ", play_symbol, play_state_str),
            Style::default().fg(if state.playing { Color::Green } else { Color::Yellow }),
        ),
        Span::styled(step, Style::default().fg(Color::White)),
        Span::styled(format!("Bar {}  ", state.bar), Style::default().fg(Color::White)),
        Span::styled(
            format!("[{}]  ", preset.unwrap_or("custom")),
            Style::default().fg(Color::LightBlue),
        ),
        Span::styled(kit, Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{:.1}kHz  ", sample_rate_khz), Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", audio_stats.peak, audio_stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_of_silence() {
        let stats = AudioStats::from_buffer(&[]);
        assert_eq!((stats.peak, stats.rms), (0.0, 0.0));

        let stats = AudioStats::from_buffer(&[0.0; 64]);
        assert_eq!((stats.peak, stats.rms), (0.0, 0.0));
    }

    #[test]
    fn test_stats_of_square_wave() {
        let buffer: Vec<f32> = (0..64).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
        let stats = AudioStats::from_buffer(&buffer);
        assert_eq!(stats.peak, 0.5);
        assert!((stats.rms - 0.5).abs() < 1e-6);
    }
}
