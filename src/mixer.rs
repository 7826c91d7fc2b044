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

//! The mixer core.
//!
//! A [`Mixer`] owns a set of voices, a queue of scheduled sounds, and the
//! sample clock. Each call to [`Mixer::mix_to`] advances the clock to a
//! requested value: active channels accumulate into a high-headroom scratch
//! buffer, scheduled sounds activate on their exact frame, and the result is
//! quantized into the caller's circular device buffer.

pub(crate) mod buffer;
pub mod channel;
pub mod queue;
pub(crate) mod scale;
mod transfer;


pub use buffer::MIX_BUFFER_FRAMES;
pub use channel::{Channel, GAIN_UNITY};
pub use queue::{PendingSound, PlayQueue};

use tracing::{debug, warn};

use crate::device::DeviceBuffer;
use crate::sample::SampleBank;
use buffer::MixBuffer;
use scale::ScaleTable;

/// A software mixer with a sample-accurate clock.
///
/// Mixers are plain values: create as many as needed, each with its own
/// channels, queue, and clock. Nothing here is shared or synchronized; one
/// owner drives the whole thing once per update tick.
pub struct Mixer {
    channels: Vec<Channel>,
    pending: PlayQueue,
    clock: u64,
    volume: f32,
    volume_dirty: bool,
    scale: ScaleTable,
    scratch: MixBuffer,
    test_tone: bool,
}

impl Mixer {
    /// Creates a mixer with the given number of channel slots, at full
    /// volume.
    pub fn new(voices: usize) -> Mixer {
        Mixer {
            channels: vec![Channel::new(); voices.max(1)],
            pending: PlayQueue::new(),
            clock: 0,
            volume: 1.0,
            volume_dirty: false,
            scale: ScaleTable::new(1.0),
            scratch: MixBuffer::new(),
            test_tone: false,
        }
    }

    /// Creates a mixer from a configuration.
    pub fn from_config(config: &crate::config::Mixer) -> Mixer {
        let mut mixer = Mixer::new(config.voices());
        mixer.set_master_volume(config.master_volume());
        mixer.set_test_tone(config.test_tone());
        mixer
    }

    /// The absolute sample clock: how far output has been mixed. Advances
    /// only inside [`Mixer::mix_to`].
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Returns the number of channel slots.
    pub fn voices(&self) -> usize {
        self.channels.len()
    }

    /// Returns the channel in the given slot.
    pub fn channel(&self, slot: usize) -> Option<&Channel> {
        self.channels.get(slot)
    }

    /// Returns the channel in the given slot for adjustment (gains,
    /// looping, stopping). Playback state itself only moves during a mix.
    pub fn channel_mut(&mut self, slot: usize) -> Option<&mut Channel> {
        self.channels.get_mut(slot)
    }

    /// Returns the number of sounds waiting to start.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn master_volume(&self) -> f32 {
        self.volume
    }

    /// Sets the master volume. Values outside [0, 1] are clamped when the
    /// attenuation table is rebuilt at the start of the next mix.
    pub fn set_master_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.volume_dirty = true;
    }

    pub fn test_tone(&self) -> bool {
        self.test_tone
    }

    /// Replaces all mixed output with a fixed sine sweep, for checking the
    /// transfer path and device wiring by ear.
    pub fn set_test_tone(&mut self, enabled: bool) {
        self.test_tone = enabled;
    }

    /// Queues a sound to start at `sound.begin` on the sample clock. A
    /// begin at or before the current clock starts on the next mix pass.
    pub fn schedule(&mut self, sound: PendingSound) {
        debug!(
            sample = %sound.sample,
            slot = sound.slot,
            begin = sound.begin,
            "Sound scheduled"
        );
        self.pending.push(sound);
    }

    /// Stops every channel and drops every pending sound.
    pub fn stop_all(&mut self) {
        self.pending.clear();
        for channel in &mut self.channels {
            channel.stop();
        }
    }

    /// Mixes forward to the given clock value, writing quantized output
    /// into the device ring. Requests at or before the current clock are
    /// no-ops.
    pub fn mix_to(&mut self, bank: &dyn SampleBank, out: &mut DeviceBuffer, end: u64) {
        if self.volume_dirty {
            self.scale.rebuild(self.volume);
            self.volume_dirty = false;
        }

        while self.clock < end {
            // At most one scratch buffer of frames per pass.
            let mut span_end = end.min(self.clock + MIX_BUFFER_FRAMES as u64);

            // Start any sounds that are due. A sound starting inside the
            // span shortens it so activation lands on the exact frame.
            while let Some(begin) = self.pending.next_begin() {
                if begin <= self.clock {
                    if let Some(sound) = self.pending.pop() {
                        self.activate(bank, &sound);
                    }
                    continue;
                }
                if begin < span_end {
                    span_end = begin;
                }
                break;
            }

            let frames = (span_end - self.clock) as usize;
            self.scratch.reset(frames);

            for channel in &mut self.channels {
                channel.mix_into(bank, &self.scale, self.scratch.pairs_mut(), self.clock);
            }

            transfer::transfer(&mut self.scratch, out, self.clock, span_end, self.test_tone);
            self.clock = span_end;
        }
    }

    /// Binds a due sound to its channel slot. Sounds whose sample or slot
    /// cannot be resolved are dropped.
    fn activate(&mut self, bank: &dyn SampleBank, sound: &PendingSound) {
        let Some(data) = bank.resolve(sound.sample) else {
            debug!(sample = %sound.sample, "Dropping pending sound, sample not in bank");
            return;
        };

        let voices = self.channels.len();
        let Some(channel) = self.channels.get_mut(sound.slot) else {
            warn!(
                slot = sound.slot,
                voices, "Dropping pending sound, no such channel slot"
            );
            return;
        };

        channel.start(sound, data.frames(), self.clock);
        debug!(
            sample = %sound.sample,
            slot = sound.slot,
            clock = self.clock,
            frames = data.frames(),
            "Sound started"
        );
    }
}
