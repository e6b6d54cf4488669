//! Engine - the drum machine as seen from the audio callback
//!
//! Owns the pattern, the step clock, the transport and the player. Everything
//! that mutates the pattern goes through `handle`, so the engine is the single
//! writer no matter how many threads send it commands.
//!
//! # Example
//!
//! ```ignore
//! use drumfield::engine::{Command, Engine};
//!
//! let mut engine = Engine::builder(48_000.0).bpm(120.0).build()?;
//! engine.handle(Command::Start)?;
//! let mut block = [0.0f32; 256];
//! engine.process_block(&mut block);
//! ```

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::kit::{DrumPlayer, Sample};
use crate::sequencing::{
    Grid, PatternStore, PresetLibrary, SequencerError, StepClock, TimeSignature, Voice,
};
use crate::transport::{Transport, TransportEvent, BPM_RAMP_SECONDS, DEFAULT_BPM};

/// Requests sent to the engine (usually from the UI thread)
#[derive(Debug, Clone)]
pub enum Command {
    Start,
    Stop,
    /// Flip one cell
    Toggle { voice: Voice, step: usize },
    /// Turn every cell off
    Clear,
    /// Load a preset from the engine's library by index
    LoadPreset(usize),
    /// Glide to a new tempo
    SetBpm(f64),
    /// A sample finished loading
    InstallSample { voice: Voice, sample: Sample },
}

/// Anything the audio callback can pull commands from
pub trait CommandReceiver {
    fn pop(&mut self) -> Option<Command>;
}

#[cfg(feature = "rtrb")]
impl CommandReceiver for Consumer<Command> {
    fn pop(&mut self) -> Option<Command> {
        Consumer::pop(self).ok()
    }
}

impl CommandReceiver for std::collections::VecDeque<Command> {
    fn pop(&mut self) -> Option<Command> {
        self.pop_front()
    }
}

/// Snapshot of engine state for presentation (allocation-free, Copy)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateUpdate {
    /// Step most recently played (`None` before the first tick after start)
    pub step: Option<usize>,
    pub playing: bool,
    pub bpm: f64,
    pub target_bpm: f64,
    /// Bars started since the engine was created
    pub bar: u64,
    pub grid: Grid,
    /// Library index of the last loaded preset
    pub preset: Option<usize>,
    /// Per-voice loaded flag, indexed by `Voice::index`
    pub loaded: [bool; Voice::COUNT],
    pub active_voices: usize,
    /// Queued commands rejected since the engine was created
    pub rejected: u64,
}

pub struct EngineBuilder {
    sample_rate: f64,
    bpm: f64,
    library: PresetLibrary,
    preset: Option<usize>,
    time_signature: TimeSignature,
}

impl EngineBuilder {
    fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            bpm: DEFAULT_BPM,
            library: PresetLibrary::builtin(),
            preset: Some(0),
            time_signature: TimeSignature::FOUR_FOUR,
        }
    }

    /// Set the starting tempo in beats per minute
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    /// Use a different preset library
    pub fn library(mut self, library: PresetLibrary) -> Self {
        self.library = library;
        self
    }

    /// Preset loaded at startup (`None` starts with an empty grid)
    pub fn preset(mut self, index: Option<usize>) -> Self {
        self.preset = index;
        self
    }

    pub fn time_signature(mut self, time_signature: TimeSignature) -> Self {
        self.time_signature = time_signature;
        self
    }

    pub fn build(self) -> Result<Engine, SequencerError> {
        let mut engine = Engine {
            store: PatternStore::new(),
            clock: StepClock::new(),
            transport: Transport::new(self.sample_rate, self.bpm).with_time_signature(self.time_signature),
            player: DrumPlayer::new(self.sample_rate),
            library: self.library,
            preset: None,
            bars: 0,
            rejected: 0,
            retired: Vec::with_capacity(Voice::COUNT),
        };

        if let Some(index) = self.preset {
            engine.load_preset(index)?;
        }

        tracing::info!(
            sample_rate = self.sample_rate,
            bpm = engine.transport.bpm(),
            presets = engine.library.len(),
            preset = engine.preset_name().unwrap_or("<empty>"),
            "engine ready"
        );
        Ok(engine)
    }
}

pub struct Engine {
    store: PatternStore,
    clock: StepClock,
    transport: Transport,
    player: DrumPlayer,
    library: PresetLibrary,
    preset: Option<usize>,
    bars: u64,
    rejected: u64,
    /// Replaced samples waiting to be freed off the audio thread
    retired: Vec<Sample>,
}

impl Engine {
    pub fn builder(sample_rate: f64) -> EngineBuilder {
        EngineBuilder::new(sample_rate)
    }

    /// Apply one command; a rejected command leaves the engine untouched
    pub fn handle(&mut self, command: Command) -> Result<(), SequencerError> {
        match command {
            Command::Start => {
                self.clock.start();
                self.transport.start();
            }
            Command::Stop => {
                self.clock.stop();
                self.transport.pause();
            }
            Command::Toggle { voice, step } => {
                self.store.toggle(voice, step)?;
            }
            Command::Clear => self.store.clear(),
            Command::LoadPreset(index) => self.load_preset(index)?,
            Command::SetBpm(bpm) => self.transport.ramp_to(bpm, BPM_RAMP_SECONDS),
            Command::InstallSample { voice, sample } => {
                if let Some(old) = self.player.install(voice, sample) {
                    // Past capacity the old sample is dropped here
                    if self.retired.len() < self.retired.capacity() {
                        self.retired.push(old);
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply every pending command, returning how many were rejected
    ///
    /// Meant for the audio thread: rejected commands are counted, not logged.
    /// The running total is reported in `StateUpdate::rejected`.
    pub fn drain(&mut self, rx: &mut impl CommandReceiver) -> usize {
        let mut rejected = 0;
        while let Some(command) = rx.pop() {
            if self.handle(command).is_err() {
                rejected += 1;
            }
        }
        self.rejected += rejected as u64;
        rejected
    }

    /// Take back a sample replaced by `InstallSample`, so it can be freed elsewhere
    pub fn pop_retired(&mut self) -> Option<Sample> {
        self.retired.pop()
    }

    fn load_preset(&mut self, index: usize) -> Result<(), SequencerError> {
        let preset = self
            .library
            .get(index)
            .ok_or_else(|| SequencerError::UnknownPreset(format!("#{index}")))?;
        self.store.load(preset)?;
        self.preset = Some(index);
        Ok(())
    }

    /// Render one block of mono audio
    ///
    /// Drives the transport across the block; every sixteenth ticks the step
    /// clock and the resulting triggers are scheduled at the transport's time.
    pub fn process_block(&mut self, out: &mut [f32]) {
        let Self {
            store,
            clock,
            transport,
            player,
            bars,
            ..
        } = self;

        let block_start = transport.time();
        transport.advance(out.len(), |event| match event {
            TransportEvent::Sixteenth { time, .. } => {
                if let Some(tick) = clock.tick(store, time) {
                    for trigger in tick.triggers() {
                        player.schedule(trigger, block_start);
                    }
                }
            }
            TransportEvent::Bar { .. } => *bars += 1,
        });

        out.fill(0.0);
        player.render(out);
    }

    pub fn state(&self) -> StateUpdate {
        StateUpdate {
            step: self.clock.last_step(),
            playing: self.clock.is_running(),
            bpm: self.transport.bpm(),
            target_bpm: self.transport.target_bpm(),
            bar: self.bars,
            grid: self.store.grid(),
            preset: self.preset,
            loaded: self.player.loaded(),
            active_voices: self.player.active_voices(),
            rejected: self.rejected,
        }
    }

    pub fn store(&self) -> &PatternStore {
        &self.store
    }

    pub fn library(&self) -> &PresetLibrary {
        &self.library
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn preset_name(&self) -> Option<&str> {
        self.preset
            .and_then(|index| self.library.get(index))
            .map(|preset| preset.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kit::DrumKit;
    use crate::sequencing::STEPS;

    const SR: f64 = 48_000.0;
    /// Samples per sixteenth at 120 BPM
    const SIXTEENTH: usize = 6000;

    fn engine() -> Engine {
        Engine::builder(SR).bpm(120.0).build().unwrap()
    }

    fn install_kit(engine: &mut Engine) {
        for (voice, sample) in DrumKit::synthesized(SR as u32).into_samples() {
            engine.handle(Command::InstallSample { voice, sample }).unwrap();
        }
    }

    #[test]
    fn test_builder_loads_first_preset() {
        let engine = engine();
        assert_eq!(engine.preset_name(), Some("groove_one"));
        assert_eq!(engine.state().preset, Some(0));
        assert!(!engine.state().playing);
    }

    #[test]
    fn test_builder_without_preset_starts_empty() {
        let engine = Engine::builder(SR).preset(None).build().unwrap();
        assert_eq!(engine.store().active_count(), 0);
        assert_eq!(engine.preset_name(), None);
    }

    #[test]
    fn test_builder_rejects_unknown_preset() {
        assert!(matches!(
            Engine::builder(SR).preset(Some(99)).build(),
            Err(SequencerError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_stopped_engine_is_silent() {
        let mut engine = engine();
        install_kit(&mut engine);

        let mut out = vec![1.0; 512];
        engine.process_block(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(engine.state().step, None);
    }

    #[test]
    fn test_start_plays_kick_on_first_sample() {
        let mut engine = engine();
        install_kit(&mut engine);
        engine.handle(Command::Start).unwrap();

        let mut out = vec![0.0; 256];
        engine.process_block(&mut out);

        let state = engine.state();
        assert_eq!(state.step, Some(0));
        assert!(state.playing);
        assert_eq!(state.bar, 1);
        assert!(out.iter().any(|&s| s.abs() > 0.0));
    }

    #[test]
    fn test_steps_follow_the_transport() {
        let mut engine = engine();
        engine.handle(Command::Start).unwrap();

        let mut out = vec![0.0; SIXTEENTH];
        for expected in 0..(STEPS + 3) {
            engine.process_block(&mut out);
            assert_eq!(engine.state().step, Some(expected % STEPS));
        }
        assert_eq!(engine.state().bar, 2);
    }

    #[test]
    fn test_stop_freezes_step_and_bars() {
        let mut engine = engine();
        engine.handle(Command::Start).unwrap();
        let mut out = vec![0.0; SIXTEENTH];
        engine.process_block(&mut out);
        engine.process_block(&mut out);
        engine.handle(Command::Stop).unwrap();

        for _ in 0..40 {
            engine.process_block(&mut out);
        }
        let state = engine.state();
        assert!(!state.playing);
        assert_eq!(state.step, Some(1));
        assert_eq!(state.bar, 1);
    }

    #[test]
    fn test_tail_rings_after_stop() {
        let mut engine = engine();
        install_kit(&mut engine);
        engine.handle(Command::Start).unwrap();

        let mut out = vec![0.0; 64];
        engine.process_block(&mut out);
        engine.handle(Command::Stop).unwrap();

        engine.process_block(&mut out);
        assert!(out.iter().any(|&s| s.abs() > 0.0));
    }

    #[test]
    fn test_unloaded_kit_plays_silence() {
        let mut engine = engine();
        engine.handle(Command::Start).unwrap();

        let mut out = vec![0.0; SIXTEENTH * 4];
        engine.process_block(&mut out);

        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(engine.state().step, Some(3));
        assert_eq!(engine.state().loaded, [false; Voice::COUNT]);
    }

    #[test]
    fn test_rejected_commands_leave_state_alone() {
        let mut engine = engine();
        let before = engine.state();

        assert_eq!(
            engine.handle(Command::Toggle { voice: Voice::Kick, step: STEPS }),
            Err(SequencerError::InvalidStep { step: STEPS })
        );
        assert!(engine.handle(Command::LoadPreset(42)).is_err());
        assert_eq!(engine.state(), before);
    }

    #[test]
    fn test_edit_commands() {
        let mut engine = engine();
        let kick0 = engine.store().get(Voice::Kick, 0).unwrap();

        engine.handle(Command::Toggle { voice: Voice::Kick, step: 0 }).unwrap();
        assert_eq!(engine.store().get(Voice::Kick, 0).unwrap(), !kick0);

        engine.handle(Command::Clear).unwrap();
        assert_eq!(engine.store().active_count(), 0);

        engine.handle(Command::LoadPreset(2)).unwrap();
        assert_eq!(engine.preset_name(), Some("dance"));
        assert_eq!(engine.state().grid, engine.library().get(2).unwrap().to_grid().unwrap());
    }

    #[test]
    fn test_drain_counts_rejections() {
        let mut engine = engine();
        let mut queue: std::collections::VecDeque<Command> = [
            Command::Clear,
            Command::Toggle { voice: Voice::Snare, step: 4 },
            Command::Toggle { voice: Voice::Snare, step: 99 },
            Command::Start,
        ]
        .into();

        assert_eq!(engine.drain(&mut queue), 1);
        assert!(queue.is_empty());
        assert_eq!(engine.store().active_count(), 1);
        assert!(engine.state().playing);
        assert_eq!(engine.state().rejected, 1);
    }

    #[test]
    fn test_rejections_accumulate_in_state() {
        let mut engine = engine();
        assert_eq!(engine.state().rejected, 0);

        let mut queue: std::collections::VecDeque<Command> =
            [Command::Toggle { voice: Voice::Kick, step: STEPS }, Command::LoadPreset(42)].into();
        assert_eq!(engine.drain(&mut queue), 2);

        let mut queue: std::collections::VecDeque<Command> = [Command::Clear, Command::LoadPreset(7)].into();
        assert_eq!(engine.drain(&mut queue), 1);

        assert_eq!(engine.state().rejected, 3);
        assert_eq!(engine.store().active_count(), 0);
    }

    #[test]
    fn test_replaced_sample_is_handed_back() {
        let mut engine = engine();
        assert!(engine.pop_retired().is_none());

        let first = Sample::new(vec![1.0; 4], SR as u32);
        let second = Sample::new(vec![0.5; 8], SR as u32);
        engine.handle(Command::InstallSample { voice: Voice::Kick, sample: first.clone() }).unwrap();
        assert!(engine.pop_retired().is_none());

        engine.handle(Command::InstallSample { voice: Voice::Kick, sample: second }).unwrap();
        assert_eq!(engine.pop_retired(), Some(first));
        assert!(engine.pop_retired().is_none());
        assert!(engine.state().loaded[Voice::Kick.index()]);
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn test_drain_from_ring_buffer() {
        let (mut tx, mut rx) = rtrb::RingBuffer::<Command>::new(8);
        tx.push(Command::LoadPreset(1)).unwrap();
        tx.push(Command::SetBpm(90.0)).unwrap();

        let mut engine = engine();
        assert_eq!(engine.drain(&mut rx), 0);
        assert_eq!(engine.preset_name(), Some("groove_two"));
        assert_eq!(engine.state().target_bpm, 90.0);
    }

    #[test]
    fn test_set_bpm_glides() {
        let mut engine = engine();
        engine.handle(Command::SetBpm(180.0)).unwrap();
        assert_eq!(engine.state().target_bpm, 180.0);
        assert_eq!(engine.state().bpm, 120.0);

        let mut out = vec![0.0; 4800];
        engine.process_block(&mut out);
        assert_eq!(engine.state().bpm, 180.0);
    }
}
