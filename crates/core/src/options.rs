// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution option resolution
//!
//! Options reach a tree node from three layers with descending
//! precedence: action-local, job-level, and the store's system config
//! table. Two placeholder conventions pull system values in explicitly:
//!
//! - a value of exactly `"?"` is replaced by the same-named system
//!   option (the entry is dropped when no such option exists)
//! - a key prefixed `@` is stripped of the prefix and, if the target
//!   key is still unset, filled from the system option of that name
//!
//! Resolution is a single pass against the system map; a system value
//! that itself looks like a placeholder is treated as an opaque string.

use std::collections::HashMap;

/// Merge the three option layers and resolve placeholders
pub fn resolve_options(
    action: &HashMap<String, String>,
    job: &HashMap<String, String>,
    system: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = HashMap::new();
    // Lowest precedence first; later layers overwrite.
    for layer in [system, job, action] {
        for (key, value) in layer {
            merged.insert(key.clone(), value.clone());
        }
    }

    // `@key` indirection: fill the bare key from system if unset.
    let indirect: Vec<String> = merged
        .keys()
        .filter(|k| k.starts_with('@'))
        .cloned()
        .collect();
    for key in indirect {
        merged.remove(&key);
        let target = key.trim_start_matches('@').to_string();
        if !merged.contains_key(&target) {
            if let Some(value) = system.get(&target) {
                merged.insert(target, value.clone());
            }
        }
    }

    // `"?"` values: substitute the same-named system option.
    let asked: Vec<String> = merged
        .iter()
        .filter(|(_, v)| v.as_str() == "?")
        .map(|(k, _)| k.clone())
        .collect();
    for key in asked {
        match system.get(&key) {
            Some(value) => {
                merged.insert(key, value.clone());
            }
            None => {
                merged.remove(&key);
            }
        }
    }

    merged
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
