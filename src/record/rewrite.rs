//! The four rewrite stages, always applied in this order:
//! 1) drop empty values
//! 2) drop excluded fields
//! 3) apply prefixes
//! 4) apply renames
//!
//! Reordering changes output (a rename must carry the prefixed value), so
//! every stage works on the same record in place.

use crate::record::{CandidateRecord, Entry, FieldMap};

pub fn rewrite(mut record: CandidateRecord<'_>) -> FieldMap {
    drop_empty(&mut record);
    drop_excluded(&mut record);
    apply_prefixes(&mut record);
    apply_renames(&mut record);
    record
        .entries
        .into_iter()
        .map(|e| (e.key, e.value))
        .collect()
}

pub fn drop_empty(record: &mut CandidateRecord<'_>) {
    record.entries.retain(|e| !e.value.trim().is_empty());
}

pub fn drop_excluded(record: &mut CandidateRecord<'_>) {
    record.entries.retain(|e| e.rule.is_included());
}

/// Prepend the rule's prefix unless the value already contains it anywhere.
///
/// Containment, not a leading match: "xHIP 1" with prefix "HIP " is left alone.
pub fn apply_prefixes(record: &mut CandidateRecord<'_>) {
    for entry in &mut record.entries {
        if let Some(prefix) = &entry.rule.prefix {
            if !entry.value.contains(prefix.as_str()) {
                entry.value.insert_str(0, prefix);
            }
        }
    }
}

/// Copy values to their rename target, dropping the source key unless the
/// rule keeps it.
///
/// Without keep, the target takes the source's position. With keep, the
/// target is placed right after the source. A target that already exists is
/// overwritten where it stands.
pub fn apply_renames(record: &mut CandidateRecord<'_>) {
    let mut idx = 0;
    while idx < record.entries.len() {
        let entry = &record.entries[idx];
        let Some(target) = entry.rule.rename_target() else {
            idx += 1;
            continue;
        };
        if target == entry.key {
            idx += 1;
            continue;
        }

        let target = target.to_string();
        let keep = entry.rule.keep_after_copy;

        match record.position(&target) {
            Some(existing) => {
                let value = record.entries[idx].value.clone();
                record.entries[existing].value = value;
                if keep {
                    idx += 1;
                } else {
                    record.entries.remove(idx);
                }
            }
            None if keep => {
                let copy = Entry {
                    key: target,
                    ..record.entries[idx].clone()
                };
                record.entries.insert(idx + 1, copy);
                idx += 2;
            }
            None => {
                record.entries[idx].key = target;
                idx += 1;
            }
        }
    }
}
