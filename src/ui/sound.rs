/// Sound effects: short procedural cues played through rodio.
///
/// Each cue is synthesized once, at startup, from a list of notes and kept as
/// an in-memory WAV. Playing is fire-and-forget on rodio's mixer thread.
/// Without the `sound` feature `SoundEngine` is an inert stub.

use crate::sim::event::SceneEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    /// Hoof tap on a player stride.
    Stride,
    /// Entering the meadow.
    Start,
    /// Message sent.
    Send,
    /// Conversation opened.
    Select,
}

impl Sfx {
    #[cfg_attr(not(feature = "sound"), allow(dead_code))]
    const ALL: [Sfx; 4] = [Sfx::Stride, Sfx::Start, Sfx::Send, Sfx::Select];

    #[cfg_attr(not(feature = "sound"), allow(dead_code))]
    fn samples(self) -> Vec<f32> {
        use synth::{render, Note, Voice};
        match self {
            Sfx::Stride => render(&[Note { freq: 140.0, secs: 0.03, gain: 0.12, voice: Voice::Thump }]),
            Sfx::Start => render(&[
                Note { freq: 523.0, secs: 0.07, gain: 0.25, voice: Voice::Bright },
                Note { freq: 659.0, secs: 0.07, gain: 0.25, voice: Voice::Bright },
                Note { freq: 784.0, secs: 0.07, gain: 0.25, voice: Voice::Bright },
            ]),
            Sfx::Send => render(&[
                Note { freq: 784.0, secs: 0.06, gain: 0.25, voice: Voice::Sine },
                Note { freq: 1047.0, secs: 0.12, gain: 0.25, voice: Voice::Sine },
            ]),
            Sfx::Select => render(&[Note { freq: 880.0, secs: 0.04, gain: 0.2, voice: Voice::Sine }]),
        }
    }
}

#[cfg(feature = "sound")]
mod backend {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    use super::{synth, Sfx};

    pub struct SoundEngine {
        // Dropping the stream silences everything; keep it alive.
        _stream: OutputStream,
        handle: OutputStreamHandle,
        clips: Vec<(Sfx, Arc<[u8]>)>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::debug!("no audio output: {e}");
                    return None;
                }
            };
            let clips = Sfx::ALL
                .iter()
                .map(|&s| (s, Arc::from(synth::encode_wav(&s.samples()))))
                .collect();
            Some(SoundEngine { _stream: stream, handle, clips })
        }

        pub fn play(&self, sfx: Sfx) {
            let clip = match self.clips.iter().find(|(s, _)| *s == sfx) {
                Some((_, c)) => Arc::clone(c),
                None => return,
            };
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    log::debug!("sink unavailable: {e}");
                    return;
                }
            };
            match Decoder::new(Cursor::new(clip)) {
                Ok(src) => {
                    sink.append(src);
                    sink.detach();
                }
                Err(e) => log::debug!("bad clip {sfx:?}: {e}"),
            }
        }
    }
}

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
mod synth {
    use std::f32::consts::TAU;

    pub const SAMPLE_RATE: u32 = 22050;

    #[derive(Clone, Copy)]
    pub enum Voice {
        Sine,
        /// Sine plus an octave overtone.
        Bright,
        /// Low sine mixed with noise, fast quadratic decay.
        Thump,
    }

    pub struct Note {
        pub freq: f32,
        pub secs: f32,
        pub gain: f32,
        pub voice: Voice,
    }

    /// Notes back to back, each with its own decay envelope.
    pub fn render(notes: &[Note]) -> Vec<f32> {
        let rate = SAMPLE_RATE as f32;
        let mut out = Vec::new();
        let mut noise: u32 = 0x9E37_79B9;
        for note in notes {
            let len = (rate * note.secs) as usize;
            out.extend((0..len).map(|i| {
                let t = i as f32 / rate;
                let progress = i as f32 / len as f32;
                let phase = TAU * note.freq * t;
                let (wave, env) = match note.voice {
                    Voice::Sine => (phase.sin(), 1.0 - progress.sqrt()),
                    Voice::Bright => (0.7 * phase.sin() + 0.3 * (2.0 * phase).sin(), 1.0 - progress.sqrt()),
                    Voice::Thump => {
                        noise ^= noise << 13;
                        noise ^= noise >> 17;
                        noise ^= noise << 5;
                        let n = noise as f32 / u32::MAX as f32 * 2.0 - 1.0;
                        (0.7 * phase.sin() + 0.3 * n, (1.0 - progress).powi(2))
                    }
                };
                (wave * env * note.gain).clamp(-1.0, 1.0)
            }));
        }
        out
    }

    fn chunk(out: &mut Vec<u8>, id: &[u8; 4], body: &[u8]) {
        out.extend_from_slice(id);
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
    }

    /// 16-bit mono PCM WAV.
    pub fn encode_wav(samples: &[f32]) -> Vec<u8> {
        let mut fmt = Vec::with_capacity(16);
        fmt.extend_from_slice(&1u16.to_le_bytes()); // PCM
        fmt.extend_from_slice(&1u16.to_le_bytes()); // mono
        fmt.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        fmt.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes()); // bytes per second
        fmt.extend_from_slice(&2u16.to_le_bytes()); // bytes per frame
        fmt.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

        let pcm: Vec<u8> = samples
            .iter()
            .flat_map(|s| ((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16).to_le_bytes())
            .collect();

        let mut riff = b"WAVE".to_vec();
        chunk(&mut riff, b"fmt ", &fmt);
        chunk(&mut riff, b"data", &pcm);

        let mut out = Vec::with_capacity(riff.len() + 8);
        chunk(&mut out, b"RIFF", &riff);
        out
    }
}

// ── Public API ──

#[cfg(feature = "sound")]
pub use backend::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> {
        Some(SoundEngine)
    }
    pub fn play(&self, _sfx: Sfx) {}
}

/// Cues for the last tick. Only even stride frames tap, otherwise the hooves
/// drown everything out.
pub fn play_scene_events(sound: Option<&SoundEngine>, events: &[SceneEvent]) {
    let Some(sfx) = sound else { return };
    for event in events {
        if let SceneEvent::PlayerStride { frame } = event {
            if frame % 2 == 0 {
                sfx.play(Sfx::Stride);
            }
        }
    }
}
