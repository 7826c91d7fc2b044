// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
// Per-voice playback state and the blend loops for each sample layout.
use tracing::debug;

use crate::mixer::buffer::SamplePair;
use crate::mixer::queue::PendingSound;
use crate::mixer::scale::ScaleTable;
use crate::sample::{Pcm, SampleBank, SampleData, SampleId};

/// Per-side gains are 8.8 fixed point, so this value is exact unity: a
/// 16-bit sample mixed at unity gain and full volume reproduces bit for
/// bit.
pub const GAIN_UNITY: u16 = 256;

const GAIN_SHIFT: u32 = 8;

/// One mixer voice.
///
/// A channel is idle until a sample is bound to it, plays by advancing a
/// cursor through the resource's frames, and either loops or falls idle
/// when the cursor reaches its end time. All state is plain data; the mix
/// pass is the only thing that advances it.
#[derive(Debug, Clone, Default)]
pub struct Channel {
    sample: Option<SampleId>,
    pos: usize,
    end: u64,
    left_gain: u16,
    right_gain: u16,
    master_gain: f32,
    autoloop: bool,
}

impl Channel {
    pub fn new() -> Channel {
        Channel::default()
    }

    /// Whether a sample is currently bound to this channel.
    pub fn is_active(&self) -> bool {
        self.sample.is_some()
    }

    /// The bound sample, if any.
    pub fn sample(&self) -> Option<SampleId> {
        self.sample
    }

    /// The cursor position, in frames into the resource.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The absolute clock value at which the channel next needs service
    /// (loop or stop).
    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn left_gain(&self) -> u16 {
        self.left_gain
    }

    pub fn right_gain(&self) -> u16 {
        self.right_gain
    }

    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    pub fn autoloop(&self) -> bool {
        self.autoloop
    }

    /// Sets the per-side gains, clamped to unity.
    pub fn set_gains(&mut self, left: u16, right: u16) {
        self.left_gain = left.min(GAIN_UNITY);
        self.right_gain = right.min(GAIN_UNITY);
    }

    /// Sets the overall gain used by the stereo sample paths, clamped to
    /// [0, 1].
    pub fn set_master_gain(&mut self, gain: f32) {
        self.master_gain = gain.clamp(0.0, 1.0);
    }

    pub fn set_autoloop(&mut self, autoloop: bool) {
        self.autoloop = autoloop;
    }

    /// Unbinds the sample, leaving the channel idle.
    pub fn stop(&mut self) {
        self.sample = None;
    }

    /// Binds a sound to this channel, starting at the given clock value.
    pub(crate) fn start(&mut self, sound: &PendingSound, frames: usize, clock: u64) {
        self.sample = Some(sound.sample);
        self.pos = 0;
        self.end = clock + frames as u64;
        self.left_gain = sound.left_gain.min(GAIN_UNITY);
        self.right_gain = sound.right_gain.min(GAIN_UNITY);
        self.master_gain = sound.master_gain.clamp(0.0, 1.0);
        self.autoloop = sound.autoloop;
    }

    /// Accumulates this channel's contribution for the span starting at the
    /// given clock value, one output frame per element of `out`.
    pub(crate) fn mix_into(
        &mut self,
        bank: &dyn SampleBank,
        scale: &ScaleTable,
        out: &mut [SamplePair],
        start: u64,
    ) {
        let end = start + out.len() as u64;
        let Some(id) = self.sample else {
            return;
        };
        // A fully attenuated channel is skipped outright: its cursor holds
        // position and its end time stays put until it is audible again.
        if self.left_gain == 0 && self.right_gain == 0 {
            return;
        }
        let Some(data) = bank.resolve(id) else {
            debug!(sample = %id, "Sample no longer in bank, stopping channel");
            self.stop();
            return;
        };

        // An id can be re-bound to different data between passes; never
        // carry cursor state across a resolve unchecked.
        let frames = data.frames();
        if self.pos >= frames {
            self.stop();
            return;
        }
        self.end = self.end.min(start + (frames - self.pos) as u64);

        let mut ltime = start;
        while ltime < end {
            // Paint to the end of the span or to the channel's own end,
            // whichever comes first.
            let count = self.end.min(end).saturating_sub(ltime) as usize;
            if count > 0 {
                let offset = (ltime - start) as usize;
                self.blend(&data, scale, &mut out[offset..offset + count]);
                self.pos += count;
                ltime += count as u64;
            }

            if ltime >= self.end {
                if self.autoloop {
                    // Looping channels always restart from the top.
                    self.pos = 0;
                    self.end = ltime + frames as u64;
                } else if let Some(loop_start) = data.loop_start() {
                    self.pos = loop_start;
                    self.end = ltime + (frames - loop_start) as u64;
                } else {
                    debug!(sample = %id, "Sample finished, channel idle");
                    self.stop();
                    break;
                }
            }
        }
    }

    fn blend(&self, data: &SampleData, scale: &ScaleTable, out: &mut [SamplePair]) {
        match data.pcm() {
            Pcm::Mono8(samples) => self.blend_mono8(samples, scale, out),
            Pcm::Stereo8(samples) => self.blend_stereo8(samples, scale, out),
            Pcm::Mono16(samples) => self.blend_mono16(samples, scale, out),
            Pcm::Stereo16(samples) => self.blend_stereo16(samples, scale, out),
        }
    }

    fn blend_mono8(&self, samples: &[u8], scale: &ScaleTable, out: &mut [SamplePair]) {
        let left = scale.level(self.left_gain);
        let right = scale.level(self.right_gain);
        let sfx = &samples[self.pos..self.pos + out.len()];
        for (pair, &mag) in out.iter_mut().zip(sfx) {
            pair.left += left[usize::from(mag)];
            pair.right += right[usize::from(mag)];
        }
    }

    // 8-bit stereo attenuates both sides through one row picked by the
    // overall gain; the per-side gains only gate audibility.
    fn blend_stereo8(&self, samples: &[u8], scale: &ScaleTable, out: &mut [SamplePair]) {
        let level = scale.level((self.master_gain * 255.0) as u16);
        let sfx = &samples[self.pos * 2..(self.pos + out.len()) * 2];
        for (pair, frame) in out.iter_mut().zip(sfx.chunks_exact(2)) {
            pair.left += level[usize::from(frame[0])];
            pair.right += level[usize::from(frame[1])];
        }
    }

    fn blend_mono16(&self, samples: &[i16], scale: &ScaleTable, out: &mut [SamplePair]) {
        let left_vol = i32::from(self.left_gain) * scale.vol();
        let right_vol = i32::from(self.right_gain) * scale.vol();
        let sfx = &samples[self.pos..self.pos + out.len()];
        for (pair, &sample) in out.iter_mut().zip(sfx) {
            pair.left += (i32::from(sample) * left_vol) >> GAIN_SHIFT;
            pair.right += (i32::from(sample) * right_vol) >> GAIN_SHIFT;
        }
    }

    fn blend_stereo16(&self, samples: &[i16], scale: &ScaleTable, out: &mut [SamplePair]) {
        let vol = (self.master_gain * 255.0) as i32 * scale.vol();
        let sfx = &samples[self.pos * 2..(self.pos + out.len()) * 2];
        for (pair, frame) in out.iter_mut().zip(sfx.chunks_exact(2)) {
            pair.left += (i32::from(frame[0]) * vol) >> GAIN_SHIFT;
            pair.right += (i32::from(frame[1]) * vol) >> GAIN_SHIFT;
        }
    }
}
