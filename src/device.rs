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

//! The output side of the mixer: stream formats and the circular buffer the
//! device drains.

/// Error types for device buffer construction.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Unsupported channel count: {0} (expected 1 or 2)")]
    UnsupportedChannels(u16),

    #[error("Buffer capacity must be a power of two, got {0} frames")]
    CapacityNotPowerOfTwo(usize),
}

/// Bit depth of the output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    /// Unsigned 8-bit output centered on 128.
    Eight,
    /// Signed 16-bit output.
    Sixteen,
}

impl BitDepth {
    /// Returns the number of bits per output sample.
    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
        }
    }
}

/// Stream format of the output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceFormat {
    /// Number of output channels (1 or 2).
    pub channels: u16,
    /// Bits per output sample.
    pub bit_depth: BitDepth,
}

impl DeviceFormat {
    /// Creates a new DeviceFormat.
    pub fn new(channels: u16, bit_depth: BitDepth) -> Result<DeviceFormat, DeviceError> {
        if channels != 1 && channels != 2 {
            return Err(DeviceError::UnsupportedChannels(channels));
        }

        Ok(DeviceFormat {
            channels,
            bit_depth,
        })
    }
}

/// Backing storage for the ring, matching the stream bit depth.
#[derive(Debug)]
enum Store {
    U8(Vec<u8>),
    I16(Vec<i16>),
}

/// The circular buffer consumed by the output device.
///
/// Capacity is a power of two so positions wrap with a mask: writers address
/// the ring by absolute sample clock and the low bits pick the slot. The
/// crate provides no synchronization with whatever drains the buffer; the
/// caller decides how far ahead of the device it is safe to mix.
#[derive(Debug)]
pub struct DeviceBuffer {
    format: DeviceFormat,
    frames: usize,
    store: Store,
}

impl DeviceBuffer {
    /// Creates a buffer of the given capacity in frames, filled with
    /// silence.
    pub fn new(format: DeviceFormat, frames: usize) -> Result<DeviceBuffer, DeviceError> {
        if format.channels != 1 && format.channels != 2 {
            return Err(DeviceError::UnsupportedChannels(format.channels));
        }
        if frames == 0 || !frames.is_power_of_two() {
            return Err(DeviceError::CapacityNotPowerOfTwo(frames));
        }

        let len = frames * usize::from(format.channels);
        let store = match format.bit_depth {
            BitDepth::Eight => Store::U8(vec![128; len]),
            BitDepth::Sixteen => Store::I16(vec![0; len]),
        };

        Ok(DeviceBuffer {
            format,
            frames,
            store,
        })
    }

    /// Returns the stream format.
    pub fn format(&self) -> DeviceFormat {
        self.format
    }

    /// Returns the capacity in frames.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Mask applied to a frame position to wrap it into the ring.
    pub(crate) fn frame_mask(&self) -> u64 {
        self.frames as u64 - 1
    }

    /// The interleaved 16-bit contents, when this is a 16-bit buffer.
    pub fn samples_i16(&self) -> Option<&[i16]> {
        match &self.store {
            Store::I16(samples) => Some(samples),
            Store::U8(_) => None,
        }
    }

    /// The interleaved 8-bit contents, when this is an 8-bit buffer.
    pub fn samples_u8(&self) -> Option<&[u8]> {
        match &self.store {
            Store::U8(samples) => Some(samples),
            Store::I16(_) => None,
        }
    }

    pub(crate) fn samples_i16_mut(&mut self) -> Option<&mut [i16]> {
        match &mut self.store {
            Store::I16(samples) => Some(samples),
            Store::U8(_) => None,
        }
    }

    pub(crate) fn samples_u8_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.store {
            Store::U8(samples) => Some(samples),
            Store::I16(_) => None,
        }
    }

    /// Reads back the frame written for the given absolute clock value,
    /// widened to an i32 per side. Mono buffers report the same value on
    /// both sides; 8-bit values are reported as stored (centered on 128).
    pub fn frame(&self, clock: u64) -> (i32, i32) {
        let base = ((clock & self.frame_mask()) as usize) * usize::from(self.format.channels);
        match (&self.store, self.format.channels) {
            (Store::I16(samples), 2) => (samples[base].into(), samples[base + 1].into()),
            (Store::I16(samples), _) => (samples[base].into(), samples[base].into()),
            (Store::U8(samples), 2) => (samples[base].into(), samples[base + 1].into()),
            (Store::U8(samples), _) => (samples[base].into(), samples[base].into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_validation() {
        assert!(DeviceFormat::new(1, BitDepth::Eight).is_ok());
        assert!(DeviceFormat::new(2, BitDepth::Sixteen).is_ok());
        assert!(matches!(
            DeviceFormat::new(0, BitDepth::Sixteen),
            Err(DeviceError::UnsupportedChannels(0))
        ));
        assert!(matches!(
            DeviceFormat::new(6, BitDepth::Sixteen),
            Err(DeviceError::UnsupportedChannels(6))
        ));
    }

    #[test]
    fn test_capacity_must_be_power_of_two() {
        let format = DeviceFormat::new(2, BitDepth::Sixteen).unwrap();
        assert!(DeviceBuffer::new(format, 4).is_ok());
        assert!(DeviceBuffer::new(format, 16384).is_ok());
        assert!(matches!(
            DeviceBuffer::new(format, 0),
            Err(DeviceError::CapacityNotPowerOfTwo(0))
        ));
        assert!(matches!(
            DeviceBuffer::new(format, 1000),
            Err(DeviceError::CapacityNotPowerOfTwo(1000))
        ));
    }

    #[test]
    fn test_starts_silent() {
        let format = DeviceFormat::new(2, BitDepth::Sixteen).unwrap();
        let buffer = DeviceBuffer::new(format, 8).unwrap();
        assert!(buffer.samples_i16().unwrap().iter().all(|&s| s == 0));
        assert!(buffer.samples_u8().is_none());

        let format = DeviceFormat::new(1, BitDepth::Eight).unwrap();
        let buffer = DeviceBuffer::new(format, 8).unwrap();
        assert!(buffer.samples_u8().unwrap().iter().all(|&s| s == 128));
        assert!(buffer.samples_i16().is_none());
    }

    #[test]
    fn test_frame_wraps_by_clock() {
        let format = DeviceFormat::new(2, BitDepth::Sixteen).unwrap();
        let mut buffer = DeviceBuffer::new(format, 4).unwrap();
        {
            let samples = buffer.samples_i16_mut().unwrap();
            for (i, sample) in samples.iter_mut().enumerate() {
                *sample = i as i16;
            }
        }

        // Frame 1 holds samples [2, 3], and clock values wrap modulo the
        // four-frame capacity.
        assert_eq!(buffer.frame(1), (2, 3));
        assert_eq!(buffer.frame(5), (2, 3));
        assert_eq!(buffer.frame(4), (0, 1));
    }

    #[test]
    fn test_mono_frame_duplicates_value() {
        let format = DeviceFormat::new(1, BitDepth::Sixteen).unwrap();
        let mut buffer = DeviceBuffer::new(format, 4).unwrap();
        buffer.samples_i16_mut().unwrap()[2] = -7;
        assert_eq!(buffer.frame(2), (-7, -7));
    }
}
