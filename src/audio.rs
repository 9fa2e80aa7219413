//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects and menu music - no external files needed!
//! Native builds keep the same API with a silent backend.

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ball hits paddle
    PaddleHit,
    /// A point is scored
    Score,
}

/// Menu loop: (frequency Hz, length in beats)
const MENU_TUNE: [(f32, f64); 8] = [
    (220.00, 1.0),
    (277.18, 1.0),
    (329.63, 1.0),
    (440.00, 1.0),
    (196.00, 1.0),
    (246.94, 1.0),
    (293.66, 1.0),
    (392.00, 1.0),
];
const MENU_BEAT_SECS: f64 = 0.28;
/// How far ahead notes are handed to the audio clock
const SCHEDULE_AHEAD_SECS: f64 = 0.12;

/// A note scheduled on the audio clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub at: f64,
    pub freq: f32,
    pub duration: f64,
}

/// Steps through the menu loop, yielding notes just ahead of the clock
#[derive(Debug, Clone)]
pub struct MusicSequencer {
    step: usize,
    next_at: f64,
}

impl MusicSequencer {
    pub fn new(now: f64) -> Self {
        Self { step: 0, next_at: now }
    }

    /// Notes that start before `now + SCHEDULE_AHEAD_SECS` and were not yet handed out
    pub fn due(&mut self, now: f64) -> Vec<Note> {
        // After a long stall resync instead of flooding the context
        if self.next_at < now - 1.0 {
            self.next_at = now;
        }
        let mut notes = Vec::new();
        while self.next_at < now + SCHEDULE_AHEAD_SECS {
            let (freq, beats) = MENU_TUNE[self.step];
            let duration = beats * MENU_BEAT_SECS;
            notes.push(Note {
                at: self.next_at,
                freq,
                duration,
            });
            self.next_at += duration;
            self.step = (self.step + 1) % MENU_TUNE.len();
        }
        notes
    }
}

/// Audio manager for the game
pub struct AudioManager {
    backend: Backend,
    enabled: bool,
    music: Option<MusicSequencer>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(true)
    }
}

impl AudioManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            backend: Backend::new(),
            enabled,
            music: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turning sound off also stops the music
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.stop_music();
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        self.backend.resume();
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        if !self.enabled {
            return;
        }
        self.backend.play(effect);
    }

    pub fn start_music(&mut self) {
        if !self.enabled || self.music.is_some() {
            return;
        }
        log::debug!("Menu music started");
        self.music = Some(MusicSequencer::new(self.backend.now()));
    }

    pub fn stop_music(&mut self) {
        if self.music.take().is_some() {
            log::debug!("Menu music stopped");
        }
    }

    pub fn is_music_playing(&self) -> bool {
        self.music.is_some()
    }

    /// Feed upcoming music notes to the backend; call once per frame
    pub fn update(&mut self) {
        let Some(music) = &mut self.music else {
            return;
        };
        for note in music.due(self.backend.now()) {
            self.backend.play_note(note);
        }
    }
}

/// Web Audio backend
#[cfg(target_arch = "wasm32")]
struct Backend {
    ctx: Option<AudioContext>,
    volume: f32,
}

#[cfg(target_arch = "wasm32")]
impl Backend {
    fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx, volume: 0.8 }
    }

    fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    fn now(&self) -> f64 {
        self.ctx.as_ref().map(|c| c.current_time()).unwrap_or(0.0)
    }

    /// Context ready to play, resumed if the browser suspended it
    fn live_ctx(&self) -> Option<&AudioContext> {
        let ctx = self.ctx.as_ref()?;
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        Some(ctx)
    }

    fn play(&self, effect: SoundEffect) {
        let Some(ctx) = self.live_ctx() else { return };
        match effect {
            SoundEffect::PaddleHit => self.play_paddle_hit(ctx, self.volume),
            SoundEffect::Score => self.play_score(ctx, self.volume),
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Paddle hit - short square blip
    fn play_paddle_hit(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 660.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.07)
            .ok();
        osc.frequency().set_value_at_time(660.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(440.0, t + 0.07)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.09).ok();
    }

    /// Score - falling two-tone
    fn play_score(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        for (i, freq) in [523.25_f32, 392.0].into_iter().enumerate() {
            let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Triangle) else {
                continue;
            };
            let start = t + i as f64 * 0.12;
            gain.gain().set_value_at_time(0.0, t).ok();
            gain.gain().set_value_at_time(vol * 0.35, start).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, start + 0.2)
                .ok();
            osc.start_with_when(start).ok();
            osc.stop_with_when(start + 0.22).ok();
        }
    }

    fn play_note(&self, note: Note) {
        let Some(ctx) = self.live_ctx() else { return };
        let Some((osc, gain)) = self.create_osc(ctx, note.freq, OscillatorType::Sine) else {
            return;
        };
        gain.gain().set_value_at_time(0.0, note.at).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(self.volume * 0.12, note.at + 0.02)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.005, note.at + note.duration)
            .ok();
        osc.start_with_when(note.at).ok();
        osc.stop_with_when(note.at + note.duration).ok();
    }
}

/// Silent backend for native builds
#[cfg(not(target_arch = "wasm32"))]
struct Backend;

#[cfg(not(target_arch = "wasm32"))]
impl Backend {
    fn new() -> Self {
        Backend
    }

    fn resume(&self) {}

    fn now(&self) -> f64 {
        crate::platform::now_ms() / 1000.0
    }

    fn play(&self, effect: SoundEffect) {
        log::trace!("sound {:?}", effect);
    }

    fn play_note(&self, _note: Note) {}
}
