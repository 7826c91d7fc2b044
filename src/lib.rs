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

//! A sample-accurate software audio mixer core.
//!
//! Sounds are scheduled onto channels at absolute sample clock positions,
//! accumulated into a high-precision intermediate buffer, and written out to
//! a circular device buffer in the device's own format. The crate mixes and
//! quantizes; it does not talk to audio hardware or decode audio files.

pub mod config;
pub mod device;
pub mod mixer;
pub mod sample;
mod testutil;

pub use device::{BitDepth, DeviceBuffer, DeviceFormat};
pub use mixer::{Channel, Mixer, PendingSound, GAIN_UNITY, MIX_BUFFER_FRAMES};
pub use sample::{MemoryBank, Pcm, SampleBank, SampleData, SampleId, SampleLayout};
