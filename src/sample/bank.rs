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
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::sample::{SampleData, SampleId};

/// Source of sample resources for the mixer.
///
/// The mixer resolves ids when a pending sound activates and again on each
/// mix pass, so a bank is free to evict entries between ticks; channels
/// whose resource has gone away simply fall silent.
pub trait SampleBank {
    /// Resolves a sample id to its resource. Returns None when the id is
    /// unknown or the resource has been evicted.
    fn resolve(&self, id: SampleId) -> Option<Arc<SampleData>>;
}

/// An in-memory sample bank.
pub struct MemoryBank {
    samples: HashMap<SampleId, Arc<SampleData>>,
    next_id: u64,
}

impl MemoryBank {
    /// Creates a new, empty bank.
    pub fn new() -> MemoryBank {
        MemoryBank {
            samples: HashMap::new(),
            next_id: 0,
        }
    }

    /// Adds a resource to the bank, returning its id.
    pub fn add(&mut self, data: SampleData) -> SampleId {
        let id = SampleId::from_raw(self.next_id);
        self.next_id += 1;

        debug!(
            id = %id,
            layout = %data.layout(),
            frames = data.frames(),
            "Sample added"
        );
        self.samples.insert(id, Arc::new(data));
        id
    }

    /// Removes a resource from the bank.
    pub fn remove(&mut self, id: SampleId) -> Option<Arc<SampleData>> {
        let removed = self.samples.remove(&id);
        if removed.is_some() {
            debug!(id = %id, "Sample removed");
        }
        removed
    }

    /// Returns the number of resources in the bank.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the bank holds no resources.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the total memory held by PCM payloads, in bytes.
    pub fn memory_usage(&self) -> usize {
        self.samples
            .values()
            .map(|data| {
                let layout = data.layout();
                data.frames() * usize::from(layout.channels() * layout.bits() / 8)
            })
            .sum()
    }
}

impl Default for MemoryBank {
    fn default() -> MemoryBank {
        MemoryBank::new()
    }
}

impl SampleBank for MemoryBank {
    fn resolve(&self, id: SampleId) -> Option<Arc<SampleData>> {
        self.samples.get(&id).cloned()
    }
}
