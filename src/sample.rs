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

//! Immutable PCM sample resources and the banks that hold them.
//!
//! Decoding and caching happen upstream of this crate; the mixer only ever
//! sees fully decoded resources, shared by reference and addressed through
//! opaque ids.

use std::{fmt, time::Duration};

pub mod bank;

pub use bank::{MemoryBank, SampleBank};

/// Error types for sample resource construction.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("Sample data contains no frames")]
    Empty,

    #[error("Stereo sample data has an odd number of values: {0}")]
    OddStereoLength(usize),

    #[error("Loop start {0} is out of range for a sample of {1} frames")]
    LoopStartOutOfRange(usize, usize),
}

/// Storage layout of a PCM resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleLayout {
    /// One channel, unsigned 8-bit samples centered on 128.
    Mono8,
    /// Two interleaved channels, unsigned 8-bit samples centered on 128.
    Stereo8,
    /// One channel, signed 16-bit samples.
    Mono16,
    /// Two interleaved channels, signed 16-bit samples.
    Stereo16,
}

impl SampleLayout {
    /// Returns the number of channels in this layout.
    pub fn channels(self) -> u16 {
        match self {
            SampleLayout::Mono8 | SampleLayout::Mono16 => 1,
            SampleLayout::Stereo8 | SampleLayout::Stereo16 => 2,
        }
    }

    /// Returns the number of bits per sample in this layout.
    pub fn bits(self) -> u16 {
        match self {
            SampleLayout::Mono8 | SampleLayout::Stereo8 => 8,
            SampleLayout::Mono16 | SampleLayout::Stereo16 => 16,
        }
    }

    /// Convert to string representation
    pub fn as_str(self) -> &'static str {
        match self {
            SampleLayout::Mono8 => "mono8",
            SampleLayout::Stereo8 => "stereo8",
            SampleLayout::Mono16 => "mono16",
            SampleLayout::Stereo16 => "stereo16",
        }
    }
}

impl fmt::Display for SampleLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Interleaved PCM payload of a sample resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pcm {
    Mono8(Vec<u8>),
    Stereo8(Vec<u8>),
    Mono16(Vec<i16>),
    Stereo16(Vec<i16>),
}

impl Pcm {
    /// Returns the storage layout of this payload.
    pub fn layout(&self) -> SampleLayout {
        match self {
            Pcm::Mono8(_) => SampleLayout::Mono8,
            Pcm::Stereo8(_) => SampleLayout::Stereo8,
            Pcm::Mono16(_) => SampleLayout::Mono16,
            Pcm::Stereo16(_) => SampleLayout::Stereo16,
        }
    }

    /// Returns the number of frames in this payload.
    pub fn frames(&self) -> usize {
        match self {
            Pcm::Mono8(samples) => samples.len(),
            Pcm::Stereo8(samples) => samples.len() / 2,
            Pcm::Mono16(samples) => samples.len(),
            Pcm::Stereo16(samples) => samples.len() / 2,
        }
    }
}

/// An immutable, fully decoded sample resource.
///
/// A declared loop start marks the frame playback resumes from once the end
/// of the data is reached; resources without one play through and stop
/// (unless the channel itself is set to loop from the beginning).
#[derive(Debug, Clone)]
pub struct SampleData {
    pcm: Pcm,
    loop_start: Option<usize>,
}

impl SampleData {
    /// Creates a new sample resource, validating the PCM payload.
    pub fn new(pcm: Pcm, loop_start: Option<usize>) -> Result<SampleData, SampleError> {
        match &pcm {
            Pcm::Stereo8(samples) if samples.len() % 2 != 0 => {
                return Err(SampleError::OddStereoLength(samples.len()));
            }
            Pcm::Stereo16(samples) if samples.len() % 2 != 0 => {
                return Err(SampleError::OddStereoLength(samples.len()));
            }
            _ => {}
        }
        if pcm.frames() == 0 {
            return Err(SampleError::Empty);
        }
        if let Some(loop_start) = loop_start {
            if loop_start >= pcm.frames() {
                return Err(SampleError::LoopStartOutOfRange(loop_start, pcm.frames()));
            }
        }

        Ok(SampleData { pcm, loop_start })
    }

    /// Returns the PCM payload.
    pub fn pcm(&self) -> &Pcm {
        &self.pcm
    }

    /// Returns the storage layout.
    pub fn layout(&self) -> SampleLayout {
        self.pcm.layout()
    }

    /// Returns the length in frames.
    pub fn frames(&self) -> usize {
        self.pcm.frames()
    }

    /// Returns the declared loop start frame, if any.
    pub fn loop_start(&self) -> Option<usize> {
        self.loop_start
    }

    /// Returns the playing time of this resource at the given sample rate.
    pub fn duration(&self, sample_rate: u32) -> Duration {
        if sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(sample_rate))
    }
}

/// Opaque handle to a sample resource held by a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleId(u64);

impl SampleId {
    /// Creates an id from a raw value. Banks are responsible for keeping raw
    /// values unique.
    pub fn from_raw(raw: u64) -> SampleId {
        SampleId(raw)
    }

    /// Returns the raw id value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_accessors() {
        assert_eq!(SampleLayout::Mono8.channels(), 1);
        assert_eq!(SampleLayout::Mono8.bits(), 8);
        assert_eq!(SampleLayout::Stereo8.channels(), 2);
        assert_eq!(SampleLayout::Stereo8.bits(), 8);
        assert_eq!(SampleLayout::Mono16.channels(), 1);
        assert_eq!(SampleLayout::Mono16.bits(), 16);
        assert_eq!(SampleLayout::Stereo16.channels(), 2);
        assert_eq!(SampleLayout::Stereo16.bits(), 16);
        assert_eq!(SampleLayout::Stereo16.to_string(), "stereo16");
    }

    #[test]
    fn test_frames_counts_interleaved_pairs() {
        assert_eq!(Pcm::Mono8(vec![128; 10]).frames(), 10);
        assert_eq!(Pcm::Stereo8(vec![128; 10]).frames(), 5);
        assert_eq!(Pcm::Mono16(vec![0; 10]).frames(), 10);
        assert_eq!(Pcm::Stereo16(vec![0; 10]).frames(), 5);
    }

    #[test]
    fn test_rejects_empty_data() {
        assert!(matches!(
            SampleData::new(Pcm::Mono16(vec![]), None),
            Err(SampleError::Empty)
        ));
        assert!(matches!(
            SampleData::new(Pcm::Stereo8(vec![]), None),
            Err(SampleError::Empty)
        ));
    }

    #[test]
    fn test_rejects_odd_stereo_data() {
        assert!(matches!(
            SampleData::new(Pcm::Stereo16(vec![1, 2, 3]), None),
            Err(SampleError::OddStereoLength(3))
        ));
        assert!(matches!(
            SampleData::new(Pcm::Stereo8(vec![128]), None),
            Err(SampleError::OddStereoLength(1))
        ));
    }

    #[test]
    fn test_loop_start_bounds() {
        let pcm = Pcm::Mono16(vec![0; 100]);
        assert!(SampleData::new(pcm.clone(), Some(99)).is_ok());
        assert!(matches!(
            SampleData::new(pcm, Some(100)),
            Err(SampleError::LoopStartOutOfRange(100, 100))
        ));
    }

    #[test]
    fn test_duration() {
        let data = SampleData::new(Pcm::Mono16(vec![0; 44100]), None).unwrap();
        assert_eq!(data.duration(44100), Duration::from_secs(1));
        assert_eq!(data.duration(0), Duration::ZERO);
    }

    #[test]
    fn test_sample_id_round_trips() {
        let id = SampleId::from_raw(7);
        assert_eq!(id.raw(), 7);
        assert_eq!(id.to_string(), "7");
    }
}
