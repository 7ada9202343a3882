//! Audio system using Web Audio API
//!
//! Procedurally generated cues, a looping music drone and a thruster hum.
//! No external files needed.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::sim::{GameEvent, SoundCue};

/// A continuously running oscillator whose level can be changed
struct Loop {
    osc: OscillatorNode,
    gain: GainNode,
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    sfx_gain: f32,
    music_gain: f32,
    muted: bool,
    bgm: Option<Loop>,
    thruster: Option<Loop>,
    thruster_level: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            sfx_gain: 0.8,
            music_gain: 0.56,
            muted: false,
            bgm: None,
            thruster: None,
            thruster_level: 0.0,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Apply volume preferences
    pub fn apply_settings(&mut self, settings: &crate::Settings) {
        self.sfx_gain = settings.sfx_gain();
        self.music_gain = settings.music_gain();
        self.refresh_loops();
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.refresh_loops();
    }

    fn sfx_level(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.sfx_gain
        }
    }

    fn music_level(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.music_gain
        }
    }

    /// Route a simulation event to the matching sound, ignoring the rest
    pub fn handle(&mut self, event: &GameEvent) {
        match event {
            GameEvent::PlaySound(cue) => self.play(*cue),
            GameEvent::PauseSound(cue) => self.pause(*cue),
            GameEvent::ThrusterVolume(level) => self.set_thruster_volume(*level),
            _ => {}
        }
    }

    /// Play a named cue. Music is a no-op when already playing.
    pub fn play(&mut self, cue: SoundCue) {
        let Some(ctx) = self.ctx.clone() else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        if cue == SoundCue::Bgm {
            if self.bgm.is_none() {
                self.bgm = self.start_loop(&ctx, 55.0, OscillatorType::Triangle, self.music_level() * 0.15);
                log::debug!("Music started");
            }
            return;
        }

        let vol = self.sfx_level();
        if vol <= 0.0 {
            return;
        }
        match cue {
            SoundCue::Shoot => self.play_shoot(&ctx, vol),
            SoundCue::Hit => self.play_hit(&ctx, vol),
            SoundCue::Miss => self.play_miss(&ctx, vol),
            SoundCue::Empty => self.play_empty(&ctx, vol),
            SoundCue::GameOver => self.play_game_over(&ctx, vol),
            SoundCue::Bgm => {}
        }
    }

    /// Stop a looping cue
    pub fn pause(&mut self, cue: SoundCue) {
        if cue == SoundCue::Bgm {
            if let Some(bgm) = self.bgm.take() {
                bgm.osc.stop().ok();
                log::debug!("Music stopped");
            }
        }
    }

    /// Thruster hum level (0 = silent)
    pub fn set_thruster_volume(&mut self, level: f32) {
        self.thruster_level = level.clamp(0.0, 1.0);
        if self.thruster.is_none() && self.thruster_level > 0.0 {
            if let Some(ctx) = self.ctx.clone() {
                self.thruster = self.start_loop(&ctx, 70.0, OscillatorType::Sawtooth, 0.0);
            }
        }
        self.refresh_loops();
    }

    fn refresh_loops(&self) {
        let Some(ctx) = &self.ctx else { return };
        let t = ctx.current_time();
        if let Some(bgm) = &self.bgm {
            bgm.gain.gain().set_target_at_time(self.music_level() * 0.15, t, 0.1).ok();
        }
        if let Some(thruster) = &self.thruster {
            let level = self.thruster_level * self.sfx_level() * 0.2;
            thruster.gain.gain().set_target_at_time(level, t, 0.05).ok();
        }
    }

    // === Sound generators ===

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

    fn start_loop(&self, ctx: &AudioContext, freq: f32, osc_type: OscillatorType, level: f32) -> Option<Loop> {
        let (osc, gain) = self.create_osc(ctx, freq, osc_type)?;
        gain.gain().set_value(level);
        osc.start().ok()?;
        Some(Loop { osc, gain })
    }

    /// Shot - quick descending zap
    fn play_shoot(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.12)
            .ok();
        osc.frequency().set_value_at_time(900.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(200.0, t + 0.12)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Hit - crunchy impact with a bass thump
    fn play_hit(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                .ok();
            osc.frequency().set_value_at_time(120.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(40.0, t + 0.25)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.3).ok();
        }

        if let Some((osc, gain)) = self.create_osc(ctx, 2000.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.12, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.06)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.08).ok();
        }
    }

    /// Miss - soft low blip
    fn play_miss(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();
        osc.frequency().set_value_at_time(220.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(150.0, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.12).ok();
    }

    /// Empty - dry double click
    fn play_empty(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        for offset in [0.0, 0.07] {
            if let Some((osc, gain)) = self.create_osc(ctx, 1200.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain().set_value_at_time(vol * 0.15, t + offset).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + offset + 0.03)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + offset + 0.04).ok();
            }
        }
    }

    /// Game over - sad descending tones
    fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        let notes = [392.0, 349.23, 311.13, 261.63]; // G4, F4, Eb4, C4

        for (i, &freq) in notes.iter().enumerate() {
            if let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Triangle) {
                let start = t + i as f64 * 0.25;
                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain().set_value_at_time(vol * 0.3, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, start + 0.4)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(start + 0.45).ok();
            }
        }
    }
}
