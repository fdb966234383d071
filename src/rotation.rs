//! Rotation policy checks.
//!
//! Both binaries enforce the same policy: an AMI older than
//! [`ROTATION_POLICY_DAYS`] should be rebuilt and rotated out.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::types::ImageMetadata;

/// Default rotation policy threshold shared by both binaries.
pub const ROTATION_POLICY_DAYS: i64 = 90;

/// Whole days elapsed between `created` and `now`.
pub fn age_in_days(created: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created).num_days()
}

/// Image ids whose age strictly exceeds `threshold_days`, sorted ascending.
///
/// Pure selection over the metadata map; ids missing from the map are
/// simply not considered.
pub fn expired_image_ids(
    images: &HashMap<String, ImageMetadata>,
    threshold_days: i64,
) -> Vec<String> {
    let mut expired: Vec<String> = images
        .values()
        .filter(|info| info.age_days > threshold_days)
        .map(|info| info.image_id.clone())
        .collect();
    expired.sort();
    expired
}
