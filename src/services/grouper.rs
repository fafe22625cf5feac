//! Chronological ordering and decision grouping.
//!
//! Records with the same date and exactly the same case-number set are the
//! same decision (for example one award filed under several names). They share
//! a group key, a group index and therefore a color slot. The color slot comes
//! from the running group index, not from the key, so neighbouring groups
//! cycle through the palette instead of colliding on a hash.

use std::collections::HashMap;

use crate::models::DecisionRecord;

/// `YYYY-MM-DD|<canonical cases joined by " & ">`, or a per-row key for
/// records without case numbers so they never merge.
pub fn group_key(record: &DecisionRecord) -> String {
    if !record.is_parsed() {
        return format!("unparsed#{}", record.source_index);
    }
    format!("{}|{}", record.decision_date.format("%Y-%m-%d"), record.cases_label())
}

/// Sort by date (ties keep input order) and assign group key, index and
/// color slot. `palette_size` must be non-zero.
pub fn group_records(mut records: Vec<DecisionRecord>, palette_size: usize) -> Vec<DecisionRecord> {
    let palette_size = palette_size.max(1);
    records.sort_by_key(|r| (r.decision_date, r.source_index));

    let mut indices: HashMap<String, usize> = HashMap::new();
    for record in &mut records {
        let key = group_key(record);
        let next = indices.len();
        let index = *indices.entry(key.clone()).or_insert(next);
        record.group_key = key;
        record.group_index = index;
        record.color_slot = index % palette_size;
    }
    tracing::debug!(
        records = records.len(),
        groups = indices.len(),
        "grouped decisions"
    );
    records
}
