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
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::sample::SampleId;

/// A request to start a sample at an exact point on the sample clock.
///
/// Sounds are issued ahead of time and sit in the play queue until the mix
/// loop reaches their start; a begin already in the past just starts on the
/// next pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSound {
    /// The sample resource to play.
    pub sample: SampleId,
    /// The channel slot the sound will occupy, chosen by the caller.
    pub slot: usize,
    /// Absolute clock value of the first audible frame.
    pub begin: u64,
    /// Left gain, 0..=[`GAIN_UNITY`](crate::mixer::GAIN_UNITY).
    pub left_gain: u16,
    /// Right gain, 0..=[`GAIN_UNITY`](crate::mixer::GAIN_UNITY).
    pub right_gain: u16,
    /// Overall gain in [0, 1], used by the stereo sample paths.
    pub master_gain: f32,
    /// Restart from frame zero whenever the end of the data is reached.
    pub autoloop: bool,
}

/// Queue entry; the sequence number keeps equal start times in issue order.
struct Queued {
    seq: u64,
    sound: PendingSound,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Queued) -> bool {
        self.sound.begin == other.sound.begin && self.seq == other.seq
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Queued) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    // Reversed so the binary heap surfaces the earliest entry first.
    fn cmp(&self, other: &Queued) -> Ordering {
        other
            .sound
            .begin
            .cmp(&self.sound.begin)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Pending sounds, ordered by start time then issue order.
pub struct PlayQueue {
    heap: BinaryHeap<Queued>,
    next_seq: u64,
}

impl PlayQueue {
    pub fn new() -> PlayQueue {
        PlayQueue {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Adds a sound to the queue.
    pub fn push(&mut self, sound: PendingSound) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Queued { seq, sound });
    }

    /// The start time of the earliest pending sound.
    pub fn next_begin(&self) -> Option<u64> {
        self.heap.peek().map(|queued| queued.sound.begin)
    }

    /// Removes and returns the earliest pending sound.
    pub fn pop(&mut self) -> Option<PendingSound> {
        self.heap.pop().map(|queued| queued.sound)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drops every pending sound.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl Default for PlayQueue {
    fn default() -> PlayQueue {
        PlayQueue::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sound(begin: u64, slot: usize) -> PendingSound {
        PendingSound {
            sample: SampleId::from_raw(0),
            slot,
            begin,
            left_gain: 256,
            right_gain: 256,
            master_gain: 1.0,
            autoloop: false,
        }
    }

    #[test]
    fn test_pops_in_start_time_order() {
        let mut queue = PlayQueue::new();
        queue.push(sound(30, 0));
        queue.push(sound(10, 1));
        queue.push(sound(20, 2));

        assert_eq!(queue.next_begin(), Some(10));
        assert_eq!(queue.pop().map(|s| s.begin), Some(10));
        assert_eq!(queue.pop().map(|s| s.begin), Some(20));
        assert_eq!(queue.pop().map(|s| s.begin), Some(30));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_equal_start_times_keep_issue_order() {
        let mut queue = PlayQueue::new();
        for slot in 0..8 {
            queue.push(sound(100, slot));
        }

        for slot in 0..8 {
            assert_eq!(queue.pop().map(|s| s.slot), Some(slot));
        }
    }

    #[test]
    fn test_next_begin_does_not_remove() {
        let mut queue = PlayQueue::new();
        queue.push(sound(5, 0));

        assert_eq!(queue.next_begin(), Some(5));
        assert_eq!(queue.len(), 1);
        assert!(!queue.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut queue = PlayQueue::new();
        queue.push(sound(1, 0));
        queue.push(sound(2, 1));

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.next_begin(), None);
    }
}
