//! StepClock - advances the loop one sixteenth at a time
//!
//! The clock owns no notion of wall-clock time or tempo. Whatever drives it
//! (the `Transport` in this crate) calls `tick` once per sixteenth note and
//! passes the audio-accurate time that step is scheduled for. Triggers carry
//! that time through unchanged.

use super::{PatternStore, Voice, STEPS};

/// Instruction for the player to start a voice's sample at `time`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    pub voice: Voice,
    /// Scheduled start time in seconds (scheduler time, not wall-clock)
    pub time: f64,
}

/// Everything that happened on one clock tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepTick {
    /// Step that was just played (for the grid highlight)
    pub step: usize,
    /// Scheduled time of this step
    pub time: f64,
    /// Which voices fire, indexed by `Voice::index`
    pub active: [bool; Voice::COUNT],
}

impl StepTick {
    /// Triggers for every voice that is on at this step
    pub fn triggers(&self) -> impl Iterator<Item = Trigger> + '_ {
        Voice::ALL
            .into_iter()
            .filter(|voice| self.active[voice.index()])
            .map(|voice| Trigger { voice, time: self.time })
    }

    pub fn is_silent(&self) -> bool {
        self.active.iter().all(|&on| !on)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    #[default]
    Stopped,
    Running,
}

/// Logical step counter with a Stopped/Running state machine
#[derive(Debug, Clone, Default)]
pub struct StepClock {
    state: ClockState,
    current_step: usize,
    /// Step most recently played, if any since the last start
    last_step: Option<usize>,
}

impl StepClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter Running and rewind to step 0
    pub fn start(&mut self) {
        self.state = ClockState::Running;
        self.current_step = 0;
        self.last_step = None;
    }

    /// Enter Stopped; already scheduled triggers are left alone
    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Step the next tick will play
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Step the previous tick played
    pub fn last_step(&self) -> Option<usize> {
        self.last_step
    }

    /// Handle one sixteenth-note callback
    ///
    /// Reads the pattern at the current step, reports it, then advances. Does
    /// nothing while stopped.
    pub fn tick(&mut self, store: &PatternStore, scheduled_time: f64) -> Option<StepTick> {
        if self.state != ClockState::Running {
            return None;
        }

        let step = self.current_step;
        let tick = StepTick {
            step,
            time: scheduled_time,
            active: store.active_at(step),
        };

        self.last_step = Some(step);
        self.current_step = (step + 1) % STEPS;

        Some(tick)
    }
}
