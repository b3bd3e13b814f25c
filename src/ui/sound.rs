/// Sound engine: procedural chip-style effects via rodio.
///
/// Every effect is synthesized into an in-memory WAV buffer at startup;
/// nothing is loaded from disk. Playback is fire-and-forget through a
/// detached rodio `Sink`, so the frame loop never waits on audio.
///
/// Build without the "sound" feature to get the silent stub engine.

use std::f32::consts::TAU;

const SAMPLE_RATE: u32 = 22050;

/// Base jump pitch; each further character is a whole tone higher.
const JUMP_BASE_HZ: f32 = 392.0;

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::synth;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_jump: Vec<Arc<Vec<u8>>>,
        sfx_spin: Arc<Vec<u8>>,
        sfx_hurt: Arc<Vec<u8>>,
        sfx_pickup: Arc<Vec<u8>>,
        sfx_fanfare: Arc<Vec<u8>>,
        sfx_tie: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        /// `None` when no output device can be opened.
        pub fn new(characters: usize) -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output, playing silently: {e}");
                    return None;
                }
            };

            let wav = |samples: Vec<f32>| Arc::new(synth::make_wav(&samples));
            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_jump: (0..characters).map(|i| wav(synth::jump(super::jump_pitch(i)))).collect(),
                sfx_spin: wav(synth::spin()),
                sfx_hurt: wav(synth::hurt()),
                sfx_pickup: wav(synth::pickup()),
                sfx_fanfare: wav(synth::fanfare()),
                sfx_tie: wav(synth::tie()),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_jump(&self, who: usize) {
            if let Some(buf) = self.sfx_jump.get(who) {
                self.play(buf);
            }
        }
        pub fn play_spin(&self) { self.play(&self.sfx_spin); }
        pub fn play_hurt(&self) { self.play(&self.sfx_hurt); }
        pub fn play_pickup(&self) { self.play(&self.sfx_pickup); }
        pub fn play_fanfare(&self) { self.play(&self.sfx_fanfare); }
        pub fn play_tie(&self) { self.play(&self.sfx_tie); }
    }
}

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn jump_pitch(who: usize) -> f32 {
    JUMP_BASE_HZ * 2f32.powf(who as f32 * 2.0 / 12.0)
}

// ════════════════════════════════════════════════════════════
//  Waveform generators: mono f32 samples in [-1, 1]
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
mod synth {
    use super::{SAMPLE_RATE, TAU};

    fn samples_for(secs: f32) -> usize {
        (SAMPLE_RATE as f32 * secs) as usize
    }

    /// Sine plus a little third harmonic for a squarer edge.
    fn voice(phase: f32) -> f32 {
        phase.sin() * 0.75 + (phase * 3.0).sin() * 0.25
    }

    /// Jump: upward chirp starting at `base` Hz.
    pub fn jump(base: f32) -> Vec<f32> {
        let n = samples_for(0.14);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                phase += (base * (1.0 + t)) * TAU / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.7);
                voice(phase) * env * 0.25
            })
            .collect()
    }

    /// Spin: faster, wobbling rise an octave up.
    pub fn spin() -> Vec<f32> {
        let n = samples_for(0.2);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let wobble = (t * 40.0).sin() * 60.0;
                phase += (700.0 + t * 700.0 + wobble) * TAU / SAMPLE_RATE as f32;
                voice(phase) * (1.0 - t) * 0.2
            })
            .collect()
    }

    /// Hurt: noisy descending thud.
    pub fn hurt() -> Vec<f32> {
        let n = samples_for(0.22);
        let mut lcg: u32 = 0x2545_f491;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                phase += (320.0 - t * 220.0) * TAU / SAMPLE_RATE as f32;
                lcg = lcg.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let noise = (lcg >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0;
                (phase.sin() * 0.6 + noise * 0.4) * (1.0 - t).powf(1.5) * 0.35
            })
            .collect()
    }

    /// Pickup: two quick rising notes.
    pub fn pickup() -> Vec<f32> {
        notes(&[(988.0, 0.05), (1319.0, 0.12)], 0.25)
    }

    /// Round won: rising arpeggio with a held top note.
    pub fn fanfare() -> Vec<f32> {
        notes(&[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.35)], 0.3)
    }

    /// Round tied: the same phrase falling back down.
    pub fn tie() -> Vec<f32> {
        notes(&[(784.0, 0.12), (659.0, 0.12), (523.0, 0.3)], 0.3)
    }

    fn notes(seq: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let mut out = Vec::new();
        for &(freq, secs) in seq {
            let n = samples_for(secs);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5) * 0.8;
                out.push(voice(t * freq * TAU) * env * volume);
            }
        }
        out
    }

    /// 16-bit mono PCM WAV around `samples`.
    pub fn make_wav(samples: &[f32]) -> Vec<u8> {
        let channels: u16 = 1;
        let bits: u16 = 16;
        let block_align = channels * bits / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_size = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new(_characters: usize) -> Option<Self> { Some(SoundEngine) }
    pub fn play_jump(&self, _who: usize) {}
    pub fn play_spin(&self) {}
    pub fn play_hurt(&self) {}
    pub fn play_pickup(&self) {}
    pub fn play_fanfare(&self) {}
    pub fn play_tie(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_header_matches_payload() {
        let samples = synth::pickup();
        let wav = synth::make_wav(&samples);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + samples.len() * 2);
        let riff_size = u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]);
        assert_eq!(riff_size as usize, wav.len() - 8);
    }

    #[test]
    fn effects_stay_in_range() {
        for buf in [synth::jump(440.0), synth::spin(), synth::hurt(), synth::fanfare(), synth::tie()] {
            assert!(!buf.is_empty());
            assert!(buf.iter().all(|s| s.abs() <= 1.0));
        }
    }

    #[test]
    fn each_character_jumps_higher() {
        let pitches: Vec<f32> = (0..4).map(jump_pitch).collect();
        assert!(pitches.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(pitches[0], JUMP_BASE_HZ);
    }
}
