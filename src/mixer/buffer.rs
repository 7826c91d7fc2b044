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

/// The most frames a single mix pass accumulates before quantizing. Longer
/// requests are mixed as several passes.
pub const MIX_BUFFER_FRAMES: usize = 2048;

/// One accumulated frame. Contributions are summed at well above 16-bit
/// scale, so headroom is checked only once, at quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamplePair {
    pub left: i32,
    pub right: i32,
}

/// The accumulation scratch for a mix pass, allocated once and reused.
pub struct MixBuffer {
    pairs: Vec<SamplePair>,
    active: usize,
}

impl MixBuffer {
    pub fn new() -> MixBuffer {
        MixBuffer {
            pairs: vec![SamplePair::default(); MIX_BUFFER_FRAMES],
            active: 0,
        }
    }

    /// Begins a new pass of the given length, zeroing exactly that range.
    pub fn reset(&mut self, frames: usize) {
        self.active = frames.min(MIX_BUFFER_FRAMES);
        for pair in &mut self.pairs[..self.active] {
            *pair = SamplePair::default();
        }
    }

    /// The frames of the pass in progress.
    pub fn pairs(&self) -> &[SamplePair] {
        &self.pairs[..self.active]
    }

    /// Mutable view of the frames of the pass in progress.
    pub fn pairs_mut(&mut self) -> &mut [SamplePair] {
        &mut self.pairs[..self.active]
    }
}

impl Default for MixBuffer {
    fn default() -> MixBuffer {
        MixBuffer::new()
    }
}
