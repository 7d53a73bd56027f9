/// Sound engine: procedural chiptune cues via rodio.
///
/// Every `Cue` gets one in-memory WAV buffer, generated at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::collections::HashMap;
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use pipeland::sim::event::Cue;

    const SAMPLE_RATE: u32 = 22050;

    const ALL_CUES: [Cue; 11] = [
        Cue::Jump,
        Cue::Shoot,
        Cue::Coin,
        Cue::PowerUp,
        Cue::PowerUpAppears,
        Cue::Stomp,
        Cue::Damage,
        Cue::BlockBreak,
        Cue::BlockBump,
        Cue::LevelClear,
        Cue::Win,
    ];

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: HashMap<Cue, Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output: {e}");
                    return None;
                }
            };
            let buffers = ALL_CUES
                .iter()
                .map(|&cue| (cue, Arc::new(make_wav(&synth(cue)))))
                .collect();
            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, cue: Cue) {
            let Some(buf) = self.buffers.get(&cue) else { return };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    #[derive(Clone, Copy)]
    enum Wave {
        Sine,
        Square,
        Saw,
        Triangle,
    }

    impl Wave {
        /// Sample at `phase` cycles.
        fn at(self, phase: f32) -> f32 {
            let frac = phase.fract();
            match self {
                Wave::Sine => (phase * TAU).sin(),
                Wave::Square => if frac < 0.5 { 1.0 } else { -1.0 },
                Wave::Saw => frac * 2.0 - 1.0,
                Wave::Triangle => 1.0 - 4.0 * (frac - 0.5).abs(),
            }
        }
    }

    fn len(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Linear pitch glide from `from` to `to` with a linear fade out.
    fn sweep(wave: Wave, from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = len(duration);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                phase += (from + (to - from) * t) / SAMPLE_RATE as f32;
                wave.at(phase) * (1.0 - t) * volume
            })
            .collect()
    }

    /// Notes started every `gap` seconds, each decaying over `note_len`.
    fn arpeggio(wave: Wave, freqs: &[f32], note_len: f32, gap: f32, volume: f32) -> Vec<f32> {
        let total = len(gap * (freqs.len().saturating_sub(1)) as f32 + note_len);
        let mut out = vec![0.0; total];
        for (k, &freq) in freqs.iter().enumerate() {
            let start = len(gap * k as f32);
            let n = len(note_len);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - i as f32 / n as f32).powi(2);
                if let Some(s) = out.get_mut(start + i) {
                    *s += wave.at(t * freq) * env * volume;
                }
            }
        }
        out
    }

    fn mix(a: Vec<f32>, b: Vec<f32>) -> Vec<f32> {
        let (mut long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
        for (l, s) in long.iter_mut().zip(short) {
            *l += s;
        }
        long
    }

    fn synth(cue: Cue) -> Vec<f32> {
        match cue {
            Cue::Jump => sweep(Wave::Square, 150.0, 300.0, 0.1, 0.15),
            Cue::Shoot => sweep(Wave::Saw, 1200.0, 400.0, 0.15, 0.12),
            Cue::Coin => arpeggio(Wave::Square, &[987.0, 1318.0], 0.25, 0.1, 0.12),
            Cue::PowerUp => arpeggio(Wave::Sine, &[440.0, 554.0, 659.0, 880.0, 1108.0, 1318.0], 0.1, 0.1, 0.25),
            Cue::PowerUpAppears => sweep(Wave::Triangle, 300.0, 600.0, 0.3, 0.25),
            Cue::Stomp => sweep(Wave::Sine, 180.0, 40.0, 0.1, 0.5),
            Cue::Damage => mix(
                sweep(Wave::Saw, 150.0, 50.0, 0.4, 0.25),
                sweep(Wave::Square, 110.0, 30.0, 0.4, 0.2),
            ),
            Cue::BlockBreak => arpeggio(Wave::Saw, &[100.0, 50.0], 0.1, 0.05, 0.25),
            Cue::BlockBump => sweep(Wave::Square, 100.0, 50.0, 0.05, 0.2),
            Cue::LevelClear => arpeggio(
                Wave::Square,
                &[523.25, 659.25, 783.99, 1046.5, 1318.51, 1567.98, 2093.0],
                0.1,
                0.08,
                0.15,
            ),
            Cue::Win => arpeggio(Wave::Triangle, &[523.25, 659.25, 783.99, 1046.5, 783.99, 1046.5], 0.2, 0.15, 0.35),
        }
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn every_cue_has_audible_samples() {
            for cue in ALL_CUES {
                let samples = synth(cue);
                assert!(!samples.is_empty(), "{:?}", cue);
                assert!(samples.iter().any(|s| s.abs() > 0.01), "{:?} is silent", cue);
                assert!(samples.iter().all(|s| s.abs() <= 1.0), "{:?} clips", cue);
            }
        }

        #[test]
        fn wav_header_matches_payload() {
            let wav = make_wav(&[0.0, 0.5, -0.5]);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + 6);
            assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 6);
        }

        #[test]
        fn arpeggio_spans_all_notes() {
            let samples = arpeggio(Wave::Sine, &[440.0, 880.0, 660.0], 0.1, 0.05, 0.2);
            assert_eq!(samples.len(), len(0.2));
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _cue: pipeland::sim::event::Cue) {}
}
