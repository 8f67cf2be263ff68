//! Sine voices with a percussive gain envelope, mixed into interleaved
//! output buffers.

use std::f32::consts::TAU;

use crate::{
    config::EnvelopeConfig,
    timeline::{NoteSchedule, PlaybackClock, ScheduledNote},
    NoteEvent,
};

/// Gain curve of a single note: silent at the start, linear rise to the peak
/// over the attack, then an exponential fall that reaches the floor exactly at
/// the end of the note. The voice is stopped from then on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub peak_gain: f32,
    pub attack_s: f32,
    pub floor_gain: f32,
    pub duration_s: f32,
}

impl Envelope {
    pub fn new(config: &EnvelopeConfig, duration_s: f32) -> Self {
        Self {
            peak_gain: config.peak_gain,
            attack_s: config.attack_s,
            floor_gain: config.floor_gain,
            duration_s,
        }
    }

    /// Gain `t` seconds after the note started.
    pub fn gain_at(&self, t: f32) -> f32 {
        if t <= 0.0 || t >= self.duration_s {
            return 0.0;
        }
        if t < self.attack_s {
            return self.peak_gain * t / self.attack_s;
        }

        let decay = self.duration_s - self.attack_s;
        if decay <= 0.0 {
            return self.floor_gain;
        }
        let progress = (t - self.attack_s) / decay;
        self.peak_gain * (self.floor_gain / self.peak_gain).powf(progress)
    }
}

/// One sounding note.
#[derive(Debug, Clone)]
pub struct Voice {
    frequency_hz: f32,
    sample_rate: f32,
    envelope: Envelope,
    elapsed_frames: u64,
    total_frames: u64,
}

impl Voice {
    pub fn new(note: &NoteEvent, envelope: &EnvelopeConfig, sample_rate: u32) -> Self {
        let sample_rate = sample_rate as f32;
        Self {
            frequency_hz: note.frequency_hz,
            sample_rate,
            envelope: Envelope::new(envelope, note.duration_s),
            elapsed_frames: 0,
            total_frames: (note.duration_s.max(0.0) * sample_rate).round() as u64,
        }
    }

    pub fn frequency_hz(&self) -> f32 {
        self.frequency_hz
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_frames >= self.total_frames
    }

    pub fn next_sample(&mut self) -> f32 {
        if self.is_finished() {
            return 0.0;
        }

        let t = self.elapsed_frames as f32 / self.sample_rate;
        // Phase is derived from the frame count to avoid drift over long notes.
        let cycles = (self.frequency_hz * t).fract();
        self.elapsed_frames += 1;
        (TAU * cycles).sin() * self.envelope.gain_at(t)
    }
}

/// Mixes every scheduled note onto a shared clock.
///
/// Scheduling is relative: a note's `start_s` is measured from the clock
/// position at the moment it is scheduled. Notes already playing or pending
/// are never cancelled, so repeated schedules overlap.
#[derive(Debug)]
pub struct Synthesizer {
    clock: PlaybackClock,
    envelope: EnvelopeConfig,
    schedule: NoteSchedule,
    voices: Vec<Voice>,
}

impl Synthesizer {
    pub fn new(sample_rate: u32, envelope: EnvelopeConfig) -> Self {
        Self {
            clock: PlaybackClock::new(sample_rate),
            envelope,
            schedule: NoteSchedule::new(),
            voices: Vec::new(),
        }
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    pub fn pending(&self) -> usize {
        self.schedule.len()
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn is_idle(&self) -> bool {
        self.schedule.is_empty() && self.voices.is_empty()
    }

    /// Anchors `notes` at the current clock position and queues them.
    pub fn schedule(&mut self, notes: &[NoteEvent]) {
        let anchor = self.clock.frames();
        for note in notes {
            self.schedule.push(ScheduledNote {
                start_frame: anchor + self.clock.frames_for(note.start_s),
                note: note.clone(),
            });
        }
    }

    /// Fills an interleaved buffer with `channels` copies of the mono mix.
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for frame in out.chunks_mut(channels) {
            let now = self.clock.frames();
            while let Some(scheduled) = self.schedule.pop_due(now) {
                self.voices.push(Voice::new(
                    &scheduled.note,
                    &self.envelope,
                    self.clock.sample_rate(),
                ));
            }

            let mix: f32 = self.voices.iter_mut().map(Voice::next_sample).sum();
            frame.fill(mix.clamp(-1.0, 1.0));

            self.clock.advance(1);
            if self.voices.iter().any(Voice::is_finished) {
                self.voices.retain(|voice| !voice.is_finished());
            }
        }
    }
}
