//! Record types shaped from EC2 API responses.

use chrono::{DateTime, Utc};

/// A non-terminated EC2 instance.
#[derive(Debug, Clone)]
pub struct Instance {
    pub instance_id: String,
    pub instance_type: String,
    pub image_id: String,
    pub launch_time: Option<DateTime<Utc>>,
    pub state: String,
}

/// Metadata for an AMI referenced by at least one instance.
#[derive(Debug, Clone)]
pub struct ImageMetadata {
    pub image_id: String,
    pub name: String,
    pub creation_date: DateTime<Utc>,
    /// Whole days between creation and wall-clock UTC at fetch time.
    pub age_days: i64,
}

/// Full detail record for a single AMI (latest-ami lookup).
#[derive(Debug, Clone)]
pub struct ImageDetail {
    pub image_id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub architecture: String,
    pub root_device_type: String,
    pub virtualization_type: String,
    pub state: String,
    pub creation_date: DateTime<Utc>,
    /// Key/value pairs in the order the API returned them.
    pub tags: Vec<(String, String)>,
    pub block_device_mappings: Vec<BlockDeviceMapping>,
}

/// One block device mapping with its EBS settings flattened.
#[derive(Debug, Clone)]
pub struct BlockDeviceMapping {
    pub device_name: String,
    pub volume_size: Option<i32>,
    pub volume_type: Option<String>,
    pub encrypted: Option<bool>,
}

/// Select the image with the maximum creation date.
///
/// Strict greater-than fold: among equal timestamps the first-seen image
/// wins, preserving the API's returned order as the tiebreaker.
pub fn latest_image(images: Vec<ImageDetail>) -> Option<ImageDetail> {
    images.into_iter().fold(None, |best, candidate| match best {
        None => Some(candidate),
        Some(current) if candidate.creation_date > current.creation_date => Some(candidate),
        Some(current) => Some(current),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn detail(image_id: &str, created: DateTime<Utc>) -> ImageDetail {
        ImageDetail {
            image_id: image_id.to_string(),
            name: format!("{}-name", image_id),
            description: None,
            owner_id: "123456789012".to_string(),
            architecture: "x86_64".to_string(),
            root_device_type: "ebs".to_string(),
            virtualization_type: "hvm".to_string(),
            state: "available".to_string(),
            creation_date: created,
            tags: Vec::new(),
            block_device_mappings: Vec::new(),
        }
    }

    #[test]
    fn test_latest_image_picks_newest() {
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let selected = latest_image(vec![detail("ami-old", t1), detail("ami-new", t2)]).unwrap();
        assert_eq!(selected.image_id, "ami-new");
        assert_eq!(selected.creation_date, t2);
    }

    #[test]
    fn test_latest_image_order_independent() {
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let selected = latest_image(vec![detail("ami-new", t2), detail("ami-old", t1)]).unwrap();
        assert_eq!(selected.image_id, "ami-new");
    }

    #[test]
    fn test_latest_image_tie_first_seen_wins() {
        let t = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();

        let selected = latest_image(vec![detail("ami-a", t), detail("ami-b", t)]).unwrap();
        assert_eq!(selected.image_id, "ami-a");
    }

    #[test]
    fn test_latest_image_empty_returns_none() {
        assert!(latest_image(Vec::new()).is_none());
    }
}
