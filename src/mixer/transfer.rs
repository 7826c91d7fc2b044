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
// Quantization of accumulated frames into the device ring.
use crate::device::{BitDepth, DeviceBuffer};
use crate::mixer::buffer::MixBuffer;

const OUTPUT_SHIFT: u32 = 8;

/// Quantizes the pass's accumulated frames into the ring for the clock range
/// [start, end), optionally replacing them with the test tone first.
pub fn transfer(
    buf: &mut MixBuffer,
    out: &mut DeviceBuffer,
    start: u64,
    end: u64,
    test_tone: bool,
) {
    if test_tone {
        write_test_tone(buf, start);
    }

    let format = out.format();
    if format.channels == 2 && format.bit_depth == BitDepth::Sixteen {
        transfer_stereo16(buf, out, start, end);
    } else {
        transfer_general(buf, out, start, end);
    }
}

// A fixed sine sweep replaces whatever was mixed; phase follows the absolute
// clock so the tone is continuous across passes.
fn write_test_tone(buf: &mut MixBuffer, start: u64) {
    for (i, pair) in buf.pairs_mut().iter_mut().enumerate() {
        let value = (((start + i as u64) as f64 * 0.1).sin() * 20000.0 * 256.0) as i32;
        pair.left = value;
        pair.right = value;
    }
}

// Interleaved 16-bit stereo matches the accumulator's own shape, so frames
// go out in linear runs between ring wraps.
fn transfer_stereo16(buf: &MixBuffer, out: &mut DeviceBuffer, start: u64, end: u64) {
    let frames = out.frames();
    let mask = out.frame_mask();
    let pairs = buf.pairs();
    let Some(store) = out.samples_i16_mut() else {
        return;
    };

    let mut ltime = start;
    while ltime < end {
        let pos = (ltime & mask) as usize;
        let run = (frames - pos).min((end - ltime) as usize);
        let offset = (ltime - start) as usize;

        let dst = &mut store[pos * 2..(pos + run) * 2];
        for (frame, pair) in dst.chunks_exact_mut(2).zip(&pairs[offset..offset + run]) {
            frame[0] = clamp16(pair.left >> OUTPUT_SHIFT);
            frame[1] = clamp16(pair.right >> OUTPUT_SHIFT);
        }

        ltime += run as u64;
    }
}

// The general path walks sample by sample: mono output carries the left
// accumulator, and 8-bit output re-centers on 128.
fn transfer_general(buf: &MixBuffer, out: &mut DeviceBuffer, start: u64, end: u64) {
    let format = out.format();
    let channels = u64::from(format.channels);
    let stereo = format.channels == 2;
    let sample_mask = (out.frames() as u64 * channels - 1) as usize;
    let mut idx = ((start * channels) as usize) & sample_mask;
    let pairs = &buf.pairs()[..(end - start) as usize];

    match format.bit_depth {
        BitDepth::Sixteen => {
            let Some(store) = out.samples_i16_mut() else {
                return;
            };
            for pair in pairs {
                store[idx] = clamp16(pair.left >> OUTPUT_SHIFT);
                idx = (idx + 1) & sample_mask;
                if stereo {
                    store[idx] = clamp16(pair.right >> OUTPUT_SHIFT);
                    idx = (idx + 1) & sample_mask;
                }
            }
        }
        BitDepth::Eight => {
            let Some(store) = out.samples_u8_mut() else {
                return;
            };
            for pair in pairs {
                store[idx] = recenter8(pair.left);
                idx = (idx + 1) & sample_mask;
                if stereo {
                    store[idx] = recenter8(pair.right);
                    idx = (idx + 1) & sample_mask;
                }
            }
        }
    }
}

fn clamp16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

// Clamp at 16-bit range first, then keep the top byte, centered on 128.
fn recenter8(accumulated: i32) -> u8 {
    ((i32::from(clamp16(accumulated >> OUTPUT_SHIFT)) >> 8) + 128) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceFormat;
    use crate::mixer::buffer::MIX_BUFFER_FRAMES;

    fn filled(values: &[(i32, i32)]) -> MixBuffer {
        let mut buf = MixBuffer::new();
        buf.reset(values.len());
        for (pair, &(left, right)) in buf.pairs_mut().iter_mut().zip(values) {
            pair.left = left;
            pair.right = right;
        }
        buf
    }

    #[test]
    fn test_clamp16() {
        assert_eq!(clamp16(1234), 1234);
        assert_eq!(clamp16(40000), i16::MAX);
        assert_eq!(clamp16(-40000), i16::MIN);
    }

    #[test]
    fn test_recenter8() {
        assert_eq!(recenter8(0), 128);
        assert_eq!(recenter8(i32::MAX), 255);
        assert_eq!(recenter8(i32::MIN), 0);
        // One full-scale 8-bit step in the accumulator is 1 << 16.
        assert_eq!(recenter8(10 << 16), 138);
    }

    #[test]
    fn test_stereo16_wraps_around_the_ring() {
        let format = DeviceFormat::new(2, BitDepth::Sixteen).unwrap();
        let mut out = DeviceBuffer::new(format, 4).unwrap();
        let mut buf = filled(&[
            (1 << 8, 2 << 8),
            (3 << 8, 4 << 8),
            (5 << 8, 6 << 8),
            (7 << 8, 8 << 8),
        ]);

        transfer(&mut buf, &mut out, 2, 6, false);
        assert_eq!(out.frame(2), (1, 2));
        assert_eq!(out.frame(3), (3, 4));
        assert_eq!(out.frame(4), (5, 6));
        assert_eq!(out.frame(5), (7, 8));
        // Ring slots: frames 4 and 5 landed on slots 0 and 1.
        assert_eq!(out.samples_i16().unwrap(), &[5, 6, 7, 8, 1, 2, 3, 4]);
    }

    #[test]
    fn test_mono_output_carries_the_left_accumulator() {
        let format = DeviceFormat::new(1, BitDepth::Sixteen).unwrap();
        let mut out = DeviceBuffer::new(format, 8).unwrap();
        let mut buf = filled(&[(100 << 8, -1), (200 << 8, -1), (300 << 8, -1)]);

        transfer(&mut buf, &mut out, 0, 3, false);
        assert_eq!(&out.samples_i16().unwrap()[..3], &[100, 200, 300]);
    }

    #[test]
    fn test_eight_bit_output_recenters() {
        let format = DeviceFormat::new(2, BitDepth::Eight).unwrap();
        let mut out = DeviceBuffer::new(format, 8).unwrap();
        let mut buf = filled(&[(0, 10 << 16), (-(10 << 16), i32::MAX)]);

        transfer(&mut buf, &mut out, 0, 2, false);
        assert_eq!(&out.samples_u8().unwrap()[..4], &[128, 138, 118, 255]);
    }

    #[test]
    fn test_tone_phase_follows_the_absolute_clock() {
        let mut whole = MixBuffer::new();
        whole.reset(8);
        write_test_tone(&mut whole, 0);

        let mut tail = MixBuffer::new();
        tail.reset(4);
        write_test_tone(&mut tail, 4);

        assert_eq!(&whole.pairs()[4..], tail.pairs());
        // And the range stays clamp-free: the tone peaks near 20000 << 8.
        assert!(whole
            .pairs()
            .iter()
            .all(|pair| pair.left.abs() <= 20000 << 8));
    }

    #[test]
    fn test_tone_replaces_mixed_content() {
        let format = DeviceFormat::new(2, BitDepth::Sixteen).unwrap();
        let mut out = DeviceBuffer::new(format, MIX_BUFFER_FRAMES).unwrap();
        let mut buf = filled(&[(i32::MAX, i32::MIN); 4]);

        transfer(&mut buf, &mut out, 0, 4, true);
        let expected = ((1.0f64 * 0.1).sin() * 20000.0 * 256.0) as i32 >> 8;
        assert_eq!(out.frame(1), (expected, expected));
    }
}
