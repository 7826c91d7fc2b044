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
use serde::Deserialize;

use crate::device::{BitDepth, DeviceBuffer, DeviceError, DeviceFormat};

const DEFAULT_MASTER_VOLUME: f32 = 1.0;
const DEFAULT_VOICES: usize = 32;
const DEFAULT_CHANNELS: u16 = 2;
const DEFAULT_BITS_PER_SAMPLE: u16 = 16;
const DEFAULT_BUFFER_FRAMES: usize = 16384;

/// Typed error for config parse failures so callers can distinguish a bad
/// document from unsupported values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config load/parse error: {0}")]
    Parse(#[from] serde_yml::Error),

    #[error("Unsupported bits per sample: {0} (expected 8 or 16)")]
    UnsupportedBitsPerSample(u16),

    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// A YAML representation of the mixer configuration.
#[derive(Deserialize, Clone, Default)]
pub struct Mixer {
    /// Master volume in [0, 1] (default: 1.0).
    master_volume: Option<f32>,

    /// Number of channel slots (default: 32).
    voices: Option<usize>,

    /// Number of output channels, 1 or 2 (default: 2).
    channels: Option<u16>,

    /// Output bits per sample, 8 or 16 (default: 16).
    bits_per_sample: Option<u16>,

    /// Capacity of the circular device buffer in frames; must be a power of
    /// two (default: 16384).
    buffer_frames: Option<usize>,

    /// Replace all output with a fixed sine sweep (default: false).
    test_tone: Option<bool>,
}

impl Mixer {
    /// New will create a new Mixer configuration with every value
    /// defaulted.
    pub fn new() -> Mixer {
        Mixer::default()
    }

    /// Returns the master volume (default: 1.0).
    pub fn master_volume(&self) -> f32 {
        self.master_volume.unwrap_or(DEFAULT_MASTER_VOLUME)
    }

    /// Returns the number of channel slots (default: 32).
    pub fn voices(&self) -> usize {
        self.voices.unwrap_or(DEFAULT_VOICES).max(1)
    }

    /// Returns the number of output channels (default: 2).
    pub fn channels(&self) -> u16 {
        self.channels.unwrap_or(DEFAULT_CHANNELS)
    }

    /// Returns the output bits per sample (default: 16).
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample.unwrap_or(DEFAULT_BITS_PER_SAMPLE)
    }

    /// Returns the device buffer capacity in frames (default: 16384).
    pub fn buffer_frames(&self) -> usize {
        self.buffer_frames.unwrap_or(DEFAULT_BUFFER_FRAMES)
    }

    /// Returns whether the test tone is enabled (default: false).
    pub fn test_tone(&self) -> bool {
        self.test_tone.unwrap_or(false)
    }

    /// Returns the configured bit depth.
    pub fn bit_depth(&self) -> Result<BitDepth, ConfigError> {
        match self.bits_per_sample() {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            other => Err(ConfigError::UnsupportedBitsPerSample(other)),
        }
    }

    /// Returns the configured device stream format.
    pub fn device_format(&self) -> Result<DeviceFormat, ConfigError> {
        Ok(DeviceFormat::new(self.channels(), self.bit_depth()?)?)
    }

    /// Builds the device buffer described by this configuration.
    pub fn device_buffer(&self) -> Result<DeviceBuffer, ConfigError> {
        Ok(DeviceBuffer::new(
            self.device_format()?,
            self.buffer_frames(),
        )?)
    }
}

/// Parses a mixer configuration from YAML contents.
pub fn from_yaml(contents: &str) -> Result<Mixer, ConfigError> {
    Ok(serde_yml::from_str(contents)?)
}
