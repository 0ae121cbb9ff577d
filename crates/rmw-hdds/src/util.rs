// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use hdds_c::{HddsDataReader, HddsError};
use std::collections::{HashMap, HashSet};

/// Map triggered reader pointers back to their subscription indexes.
pub(crate) fn map_ready_indices(
    subscriptions: &[*mut HddsDataReader],
    readers: &[*mut HddsDataReader],
) -> Result<Vec<usize>, HddsError> {
    let mut index_map = HashMap::with_capacity(subscriptions.len());
    for (idx, &ptr) in subscriptions.iter().enumerate() {
        index_map.insert(ptr, idx);
    }

    let mut ready = Vec::with_capacity(readers.len());
    let mut seen = HashSet::with_capacity(readers.len());

    for &reader in readers {
        let Some(&index) = index_map.get(&reader) else {
            return Err(HddsError::HddsInvalidArgument);
        };
        if seen.insert(index) {
            ready.push(index);
        }
    }

    Ok(ready)
}
