use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::planner::{
    window::{BucketKey, Layout},
    CalendarRecord, Placement,
};

pub type BucketMap<'a> = BTreeMap<BucketKey, Vec<&'a CalendarRecord>>;

/// Places every schedulable record into the buckets of `layout`.
///
/// Every bucket of the layout gets an entry, even when it ends up empty.
/// Point records land in the single bucket containing them; interval records
/// land in every bucket they overlap. Records without a usable time, and point
/// records outside the window, are left out.
pub fn assign<'a>(records: &[&'a CalendarRecord], layout: &Layout) -> BucketMap<'a> {
    let mut map: BucketMap<'a> = layout
        .buckets
        .iter()
        .map(|bucket| (bucket.key, Vec::new()))
        .collect();
    let mut unschedulable = 0;
    let mut outside = 0;

    for &record in records {
        match record.placement() {
            Some(Placement::Point(time)) => {
                match layout.buckets.iter().find(|bucket| bucket.contains(time)) {
                    Some(bucket) => {
                        trace!(id = %record.id, bucket = %bucket.key, "placed point record");
                        push(&mut map, bucket.key, record);
                    }
                    None => outside += 1,
                }
            }
            Some(Placement::Span(start, end)) => {
                let mut placed = false;
                for bucket in layout
                    .buckets
                    .iter()
                    .filter(|bucket| bucket.overlaps(start, end))
                {
                    push(&mut map, bucket.key, record);
                    placed = true;
                }
                if placed {
                    trace!(id = %record.id, "placed interval record");
                } else {
                    outside += 1;
                }
            }
            None => unschedulable += 1,
        }
    }

    for bucket in map.values_mut() {
        bucket.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }
    debug!(
        records = records.len(),
        unschedulable, outside, "assigned records to buckets"
    );
    map
}

fn push<'a>(map: &mut BucketMap<'a>, key: BucketKey, record: &'a CalendarRecord) {
    map.entry(key).or_default().push(record);
}
