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

/// Number of gain steps the 8-bit paths distinguish.
pub const SCALE_LEVELS: usize = 32;

/// Precomputed contributions for 8-bit samples: one row per gain level, one
/// entry per sample magnitude, with the master volume folded in. Entries are
/// already shifted up into the accumulator's range, so blending an 8-bit
/// sample is a single table lookup and add.
pub struct ScaleTable {
    levels: Vec<[i32; 256]>,
    vol: i32,
}

impl ScaleTable {
    pub fn new(volume: f32) -> ScaleTable {
        let mut table = ScaleTable {
            levels: vec![[0; 256]; SCALE_LEVELS],
            vol: 0,
        };
        table.rebuild(volume);
        table
    }

    /// Rebuilds the table for a new master volume, clamped to [0, 1].
    pub fn rebuild(&mut self, volume: f32) {
        self.vol = (volume.clamp(0.0, 1.0) * 256.0) as i32;
        for (level, row) in self.levels.iter_mut().enumerate() {
            let scale = level as i32 * 8 * self.vol;
            for (mag, entry) in row.iter_mut().enumerate() {
                *entry = (mag as i32 - 128) * scale;
            }
        }
    }

    /// The master volume as an 8.8 fixed-point multiplier, for the 16-bit
    /// paths.
    pub fn vol(&self) -> i32 {
        self.vol
    }

    /// Returns the row for a gain value, quantized to SCALE_LEVELS steps.
    pub fn level(&self, gain: u16) -> &[i32; 256] {
        &self.levels[usize::from(gain.min(255)) >> 3]
    }
}
