//! Human-readable report rendering.
//!
//! Renderers return `String` so output stays deterministic and testable;
//! the binaries print the result. Presentation only: inputs are never
//! mutated or filtered here.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::rotation;
use crate::types::{ImageDetail, ImageMetadata, Instance};

/// AMI names longer than this are cut in the fixed-width table.
const AMI_NAME_MAX: usize = 29;

/// Render the full fleet/AMI audit report for `check-ami`.
///
/// Image ids referenced by instances but missing from the metadata map
/// render as `Unknown` in every metadata column.
pub fn render_audit_report(
    instances: &[Instance],
    images: &HashMap<String, ImageMetadata>,
    expired: &[String],
    threshold_days: i64,
) -> String {
    let unique_ids: BTreeSet<&str> = instances
        .iter()
        .map(|instance| instance.image_id.as_str())
        .collect();

    let mut out = String::new();

    out.push_str("\nSUMMARY:\n");
    out.push_str(&format!("Total EC2 instances: {}\n", instances.len()));
    out.push_str(&format!("Unique AMIs in use: {}\n", unique_ids.len()));

    out.push_str("\nEC2 INSTANCES:\n");
    out.push_str(&format!("{}\n", "-".repeat(80)));
    out.push_str(&format!(
        "{:<20} {:<15} {:<15} {:<20}\n",
        "Instance ID", "Instance Type", "AMI ID", "Launch Time"
    ));
    out.push_str(&format!("{}\n", "-".repeat(80)));

    for instance in instances {
        let launch_time = instance
            .launch_time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        out.push_str(&format!(
            "{:<20} {:<15} {:<15} {:<20}\n",
            instance.instance_id, instance.instance_type, instance.image_id, launch_time
        ));
    }

    out.push_str("\nAMI INFORMATION:\n");
    out.push_str(&format!("{}\n", "-".repeat(80)));
    out.push_str(&format!(
        "{:<15} {:<30} {:<20} {:<10}\n",
        "AMI ID", "AMI Name", "Created", "Age (days)"
    ));
    out.push_str(&format!("{}\n", "-".repeat(80)));

    for image_id in &unique_ids {
        match images.get(*image_id) {
            Some(info) => {
                let name: String = info.name.chars().take(AMI_NAME_MAX).collect();
                let created = info.creation_date.format("%Y-%m-%d %H:%M:%S UTC").to_string();
                out.push_str(&format!(
                    "{:<15} {:<30} {:<20} {:<10}\n",
                    image_id, name, created, info.age_days
                ));
            }
            None => {
                out.push_str(&format!(
                    "{:<15} {:<30} {:<20} {:<10}\n",
                    image_id, "Unknown", "Unknown", "Unknown"
                ));
            }
        }
    }

    out.push_str(&render_rotation_section(images, expired, threshold_days));

    out
}

fn render_rotation_section(
    images: &HashMap<String, ImageMetadata>,
    expired: &[String],
    threshold_days: i64,
) -> String {
    if expired.is_empty() {
        return format!(
            "\n✅ All AMIs are within the {}-day rotation policy.\n",
            threshold_days
        );
    }

    let mut out = String::new();
    out.push_str("\n⚠️  AMI ROTATION WARNING:\n");
    out.push_str(&format!(
        "The following AMIs are older than {} days and should be rotated:\n",
        threshold_days
    ));

    for image_id in expired {
        if let Some(info) = images.get(image_id) {
            out.push_str(&format!(
                "  - {}: {} ({} days old)\n",
                image_id, info.name, info.age_days
            ));
        }
    }

    out
}

/// Render the full detail block for `latest-ami`, including the rotation
/// verdict. Age is recomputed here against `now`, independently of the
/// fleet audit.
pub fn render_image_detail(
    image: &ImageDetail,
    now: DateTime<Utc>,
    threshold_days: i64,
) -> String {
    let age_days = rotation::age_in_days(image.creation_date, now);

    let mut out = String::new();

    out.push_str("Latest AMI Found:\n");
    out.push_str("==================\n");
    out.push_str(&format!("AMI ID:          {}\n", image.image_id));
    out.push_str(&format!("Name:            {}\n", image.name));
    out.push_str(&format!(
        "Description:     {}\n",
        image.description.as_deref().unwrap_or("N/A")
    ));
    out.push_str(&format!("Owner ID:        {}\n", image.owner_id));
    out.push_str(&format!("Architecture:    {}\n", image.architecture));
    out.push_str(&format!("Root Device:     {}\n", image.root_device_type));
    out.push_str(&format!("Virtualization:  {}\n", image.virtualization_type));
    out.push_str(&format!("State:           {}\n", image.state));
    out.push_str(&format!(
        "Created:         {}\n",
        image.creation_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Age:             {} days\n", age_days));

    if !image.tags.is_empty() {
        out.push_str("Tags:\n");
        for (key, value) in &image.tags {
            out.push_str(&format!("  {}: {}\n", key, value));
        }
    }

    out.push_str("\nBlock Device Mappings:\n");
    for mapping in &image.block_device_mappings {
        let size = mapping
            .volume_size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let volume_type = mapping.volume_type.as_deref().unwrap_or("N/A");
        let encryption = if mapping.encrypted.unwrap_or(false) {
            "Encrypted"
        } else {
            "Not Encrypted"
        };

        out.push_str(&format!(
            "  {}: {}GB ({}) {}\n",
            mapping.device_name, size, volume_type, encryption
        ));
    }

    if age_days > threshold_days {
        out.push_str(&format!(
            "\n⚠️  WARNING: This AMI is {} days old (>{} days)\n",
            age_days, threshold_days
        ));
        out.push_str("Consider updating to a newer AMI for security compliance.\n");
    } else {
        out.push_str(&format!(
            "\n✅ AMI is within {}-day rotation policy ({} days old)\n",
            threshold_days, age_days
        ));
    }

    out
}

/// Message printed when no AMI matches the lookup filters.
pub fn render_no_image_found() -> String {
    let mut out = String::new();
    out.push_str("No AMI found matching the specified criteria.\n");
    out.push_str("\nPossible reasons:\n");
    out.push_str("- No AMIs with the specified name pattern exist\n");
    out.push_str("- AMIs might be owned by a different account\n");
    out.push_str("- AMIs might be in a different region\n");
    out.push_str("- AMIs might be in 'pending' or 'failed' state\n");
    out
}
