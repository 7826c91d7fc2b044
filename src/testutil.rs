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

#[cfg(test)]
use std::{error::Error, path::Path};

#[cfg(test)]
use crate::device::{BitDepth, DeviceBuffer};

/// Initializes test logging from RUST_LOG; safe to call more than once.
#[cfg(test)]
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// Writes the ring contents to a WAV file so a failing mix can be listened
/// to.
#[cfg(test)]
pub fn write_wav(path: &Path, buffer: &DeviceBuffer, sample_rate: u32) -> Result<(), Box<dyn Error>> {
    let format = buffer.format();
    let spec = hound::WavSpec {
        channels: format.channels,
        sample_rate,
        bits_per_sample: format.bit_depth.bits(),
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    match format.bit_depth {
        BitDepth::Sixteen => {
            for &sample in buffer.samples_i16().unwrap_or(&[]) {
                writer.write_sample(sample)?;
            }
        }
        BitDepth::Eight => {
            // The ring stores 8-bit audio unsigned; hound wants it signed.
            for &sample in buffer.samples_u8().unwrap_or(&[]) {
                writer.write_sample((i16::from(sample) - 128) as i8)?;
            }
        }
    }
    writer.finalize()?;

    Ok(())
}

/// Root mean square of 16-bit samples as a fraction of full scale.
#[cfg(test)]
pub fn rms(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum: f64 = samples
        .iter()
        .map(|&sample| {
            let x = f64::from(sample) / 32768.0;
            x * x
        })
        .sum();
    (sum / samples.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(rms(&[0, 0, 0]), 0.0);

        // A full-scale square wave has an RMS of 1.
        let square = vec![i16::MIN; 64];
        assert!((rms(&square) - 1.0).abs() < 1e-6);
    }
}
