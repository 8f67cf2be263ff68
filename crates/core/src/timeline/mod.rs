use std::collections::VecDeque;

use crate::NoteEvent;

/// Audio clock counted in rendered frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackClock {
    sample_rate: u32,
    frames: u64,
}

impl PlaybackClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            frames: 0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn seconds(&self) -> f64 {
        self.frames as f64 / f64::from(self.sample_rate)
    }

    pub fn advance(&mut self, frames: u64) {
        self.frames += frames;
    }

    /// Converts a non-negative duration into a whole number of frames.
    pub fn frames_for(&self, seconds: f32) -> u64 {
        (f64::from(seconds.max(0.0)) * f64::from(self.sample_rate)).round() as u64
    }
}

/// A note pinned to an absolute position on the audio clock.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledNote {
    pub start_frame: u64,
    pub note: NoteEvent,
}

/// Pending notes ordered by start frame. Notes sharing a start frame keep
/// their insertion order.
#[derive(Debug, Default)]
pub struct NoteSchedule {
    pending: VecDeque<ScheduledNote>,
}

impl NoteSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scheduled: ScheduledNote) {
        let index = self
            .pending
            .partition_point(|existing| existing.start_frame <= scheduled.start_frame);
        self.pending.insert(index, scheduled);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_start(&self) -> Option<u64> {
        self.pending.front().map(|scheduled| scheduled.start_frame)
    }

    /// Removes and returns the next note if it starts at or before `frame`.
    pub fn pop_due(&mut self, frame: u64) -> Option<ScheduledNote> {
        if self.next_start()? <= frame {
            self.pending.pop_front()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(step: usize) -> NoteEvent {
        NoteEvent {
            step,
            frequency_hz: 440.0,
            start_s: 0.0,
            duration_s: 1.0,
        }
    }

    #[test]
    fn keeps_notes_sorted_by_start() {
        let mut schedule = NoteSchedule::new();
        for (start_frame, step) in [(30, 0), (10, 1), (20, 2), (10, 3)] {
            schedule.push(ScheduledNote {
                start_frame,
                note: note(step),
            });
        }

        assert_eq!(schedule.next_start(), Some(10));
        assert!(schedule.pop_due(9).is_none());

        let order: Vec<usize> = std::iter::from_fn(|| schedule.pop_due(u64::MAX))
            .map(|scheduled| scheduled.note.step)
            .collect();
        assert_eq!(order, vec![1, 3, 2, 0]);
        assert!(schedule.is_empty());
    }

    #[test]
    fn clock_converts_seconds_to_frames() {
        let mut clock = PlaybackClock::new(48_000);
        assert_eq!(clock.frames_for(0.125), 6_000);
        assert_eq!(clock.frames_for(-1.0), 0);

        clock.advance(24_000);
        assert!((clock.seconds() - 0.5).abs() < f64::EPSILON);
    }
}
