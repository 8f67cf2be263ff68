use std::sync::{Arc, Mutex, MutexGuard};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, OutputCallbackInfo, StreamConfig, SupportedBufferSize,
};

use crate::{
    config::{AudioConfig, EnvelopeConfig},
    DoodleError, NoteEvent, Result, Synthesizer,
};

/// Synthesizer shared between the UI thread and the audio callback.
pub type SharedSynth = Arc<Mutex<Synthesizer>>;

/// Where rendered samples go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioBackend {
    /// Default output device of the default cpal host.
    Device,
    /// No device; samples are pulled with [`AudioContext::render`].
    Offline { sample_rate: u32 },
}

impl AudioBackend {
    /// Offline backend at the configured offline sample rate.
    pub fn offline(audio: &AudioConfig) -> Self {
        AudioBackend::Offline {
            sample_rate: audio.offline_sample_rate,
        }
    }
}

/// Live audio output: the shared synthesizer plus the stream feeding the
/// device, if any.
pub struct AudioContext {
    synth: SharedSynth,
    sample_rate: u32,
    channels: u16,
    _stream: Option<cpal::Stream>,
}

impl AudioContext {
    fn offline(sample_rate: u32, envelope: &EnvelopeConfig) -> Result<Self> {
        if sample_rate == 0 {
            return Err(DoodleError::audio("offline sample rate must be positive"));
        }
        Ok(Self {
            synth: Arc::new(Mutex::new(Synthesizer::new(sample_rate, envelope.clone()))),
            sample_rate,
            channels: 1,
            _stream: None,
        })
    }

    fn open_device(audio: &AudioConfig, envelope: &EnvelopeConfig) -> Result<Self> {
        let host = cpal::default_host();
        tracing::info!(host = host.id().name(), "opening audio output");
        let device = host
            .default_output_device()
            .ok_or_else(|| DoodleError::audio("no output device"))?;
        if let Ok(name) = device.name() {
            tracing::info!(device = %name, "using audio device");
        }

        let stream_config = choose_config(&device, audio)?;
        let sample_rate = stream_config.sample_rate.0;
        let channels = stream_config.channels;
        tracing::debug!(sample_rate, channels, buffer_size = ?stream_config.buffer_size, "audio stream config");

        let synth: SharedSynth = Arc::new(Mutex::new(Synthesizer::new(
            sample_rate,
            envelope.clone(),
        )));
        let stream = device
            .build_output_stream(
                &stream_config,
                {
                    let synth = Arc::clone(&synth);
                    move |data: &mut [f32], _: &OutputCallbackInfo| match synth.lock() {
                        Ok(mut guard) => guard.render(data, channels as usize),
                        Err(_) => data.fill(0.0),
                    }
                },
                |err| tracing::error!(%err, "audio stream error"),
                None,
            )
            .map_err(DoodleError::audio)?;
        stream.play().map_err(DoodleError::audio)?;

        Ok(Self {
            synth,
            sample_rate,
            channels,
            _stream: Some(stream),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn synth(&self) -> SharedSynth {
        Arc::clone(&self.synth)
    }

    pub fn schedule(&self, notes: &[NoteEvent]) -> Result<()> {
        self.lock()?.schedule(notes);
        Ok(())
    }

    /// Pulls samples from the synthesizer. Only meaningful for offline
    /// contexts; a device context is driven by its own callback.
    pub fn render(&self, out: &mut [f32]) -> Result<()> {
        self.lock()?.render(out, self.channels as usize);
        Ok(())
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Synthesizer>> {
        self.synth
            .lock()
            .map_err(|_| DoodleError::msg("synthesizer has been poisoned"))
    }
}

impl std::fmt::Debug for AudioContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioContext")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("device", &self._stream.is_some())
            .finish()
    }
}

/// Picks the device's default rate and channel count, with a fixed buffer
/// sized for the configured latency when the device reports a range.
fn choose_config(device: &cpal::Device, audio: &AudioConfig) -> Result<StreamConfig> {
    let default_config = device
        .default_output_config()
        .map_err(DoodleError::audio)?;
    let sample_rate = default_config.sample_rate();
    // ALSA rejects buffer sizes that are not a multiple of 4.
    let ideal = ((sample_rate.0 as f32 * audio.target_latency_s) as u32) & !3;
    let buffer_size = match default_config.buffer_size() {
        SupportedBufferSize::Range { min, max } => BufferSize::Fixed(ideal.clamp(*min, *max)),
        SupportedBufferSize::Unknown => BufferSize::Default,
    };
    Ok(StreamConfig {
        channels: default_config.channels(),
        sample_rate,
        buffer_size,
    })
}

enum ContextState {
    NotCreated,
    Ready(AudioContext),
    Unavailable,
}

/// Owns the audio context, creating it on first use.
///
/// The context moves from not-created to either ready or unavailable exactly
/// once and never goes back. When the backend cannot be opened the failure is
/// logged and every later play is a silent no-op.
pub struct AudioEngine {
    backend: AudioBackend,
    audio: AudioConfig,
    envelope: EnvelopeConfig,
    state: ContextState,
}

impl AudioEngine {
    pub fn new(backend: AudioBackend, audio: &AudioConfig, envelope: &EnvelopeConfig) -> Self {
        Self {
            backend,
            audio: audio.clone(),
            envelope: envelope.clone(),
            state: ContextState::NotCreated,
        }
    }

    pub fn backend(&self) -> AudioBackend {
        self.backend
    }

    pub fn is_context_created(&self) -> bool {
        matches!(self.state, ContextState::Ready(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.state, ContextState::Unavailable)
    }

    pub fn context(&self) -> Option<&AudioContext> {
        match &self.state {
            ContextState::Ready(context) => Some(context),
            _ => None,
        }
    }

    /// Schedules `notes` relative to the current audio time and returns how
    /// many were queued. Nothing in flight is cancelled.
    pub fn play(&mut self, notes: &[NoteEvent]) -> Result<usize> {
        if notes.is_empty() {
            return Ok(0);
        }

        match self.ensure_context() {
            Some(context) => {
                context.schedule(notes)?;
                Ok(notes.len())
            }
            None => Ok(0),
        }
    }

    fn ensure_context(&mut self) -> Option<&AudioContext> {
        if let ContextState::NotCreated = self.state {
            let opened = match self.backend {
                AudioBackend::Device => AudioContext::open_device(&self.audio, &self.envelope),
                AudioBackend::Offline { sample_rate } => {
                    AudioContext::offline(sample_rate, &self.envelope)
                }
            };
            self.state = match opened {
                Ok(context) => {
                    tracing::info!(sample_rate = context.sample_rate(), "audio context created");
                    ContextState::Ready(context)
                }
                Err(err) => {
                    tracing::warn!(%err, "audio output unavailable; melodies will be silent");
                    ContextState::Unavailable
                }
            };
        }

        self.context()
    }
}

impl std::fmt::Debug for AudioEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            ContextState::NotCreated => "not created",
            ContextState::Ready(_) => "ready",
            ContextState::Unavailable => "unavailable",
        };
        f.debug_struct("AudioEngine")
            .field("backend", &self.backend)
            .field("state", &state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_engine() -> AudioEngine {
        AudioEngine::new(
            AudioBackend::Offline { sample_rate: 1_000 },
            &AudioConfig::default(),
            &EnvelopeConfig::default(),
        )
    }

    fn note(start_s: f32) -> NoteEvent {
        NoteEvent {
            step: 0,
            frequency_hz: 261.63,
            start_s,
            duration_s: 1.0,
        }
    }

    #[test]
    fn empty_melody_does_not_create_a_context() {
        let mut audio = offline_engine();
        assert_eq!(audio.play(&[]).unwrap(), 0);
        assert!(!audio.is_context_created());
    }

    #[test]
    fn context_is_created_once_and_reused() {
        let mut audio = offline_engine();
        audio.play(&[note(0.0)]).unwrap();
        let first = audio.context().unwrap().synth();

        audio.play(&[note(0.0), note(0.5)]).unwrap();
        let second = audio.context().unwrap().synth();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().unwrap().pending(), 3);
    }

    #[test]
    fn offline_context_renders_scheduled_notes() {
        let mut audio = offline_engine();
        assert_eq!(audio.play(&[note(0.0)]).unwrap(), 1);

        let context = audio.context().unwrap();
        assert_eq!(context.sample_rate(), 1_000);
        assert_eq!(context.channels(), 1);
        let mut out = vec![0.0_f32; 100];
        context.render(&mut out).unwrap();
        assert!(out.iter().any(|s| s.abs() > 0.1));
    }

    #[test]
    fn offline_backend_uses_configured_rate() {
        let mut config = AudioConfig::default();
        config.offline_sample_rate = 22_050;
        let mut audio = AudioEngine::new(
            AudioBackend::offline(&config),
            &config,
            &EnvelopeConfig::default(),
        );
        assert_eq!(audio.backend(), AudioBackend::Offline { sample_rate: 22_050 });

        audio.play(&[note(0.0)]).unwrap();
        assert_eq!(audio.context().unwrap().sample_rate(), 22_050);
    }

    #[test]
    fn failed_backend_is_unavailable_and_never_retried() {
        let mut audio = AudioEngine::new(
            AudioBackend::Offline { sample_rate: 0 },
            &AudioConfig::default(),
            &EnvelopeConfig::default(),
        );

        assert_eq!(audio.play(&[note(0.0)]).unwrap(), 0);
        assert!(audio.is_unavailable());
        assert!(!audio.is_context_created());

        assert_eq!(audio.play(&[note(0.0), note(0.5)]).unwrap(), 0);
        assert!(audio.is_unavailable());
        assert!(audio.context().is_none());
    }
}
