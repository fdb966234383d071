//! AWS EC2 SDK client wrapper.

use std::collections::HashMap;

use aws_config::BehaviorVersion;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::types::Filter;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::AuditError;
use crate::rotation;
use crate::types::{BlockDeviceMapping, ImageDetail, ImageMetadata, Instance, latest_image};

/// EC2 client wrapper scoped to a single region.
#[derive(Clone)]
pub struct Ec2Client {
    client: Client,
    region: String,
}

impl Ec2Client {
    /// Create a new EC2 client for the given region.
    pub async fn new(region: &str) -> Self {
        debug!(region = %region, "Initializing AWS SDK configuration");

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        let client = Client::new(&config);

        info!(region = %region, "AWS EC2 client initialized");

        Self {
            client,
            region: region.to_string(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// List all instances in the region, excluding terminated ones.
    pub async fn list_instances(&self) -> Result<Vec<Instance>, AuditError> {
        debug!(region = %self.region, "Sending DescribeInstances API request");

        let response = self
            .client
            .describe_instances()
            .send()
            .await
            .map_err(|e| AuditError::api("DescribeInstances", e))?;

        let instances: Vec<Instance> = response
            .reservations()
            .iter()
            .flat_map(|reservation| reservation.instances())
            .filter_map(convert_instance)
            .filter(|instance| instance.state != "terminated")
            .collect();

        info!(
            instance_count = instances.len(),
            region = %self.region,
            "Fetched non-terminated EC2 instances"
        );

        Ok(instances)
    }

    /// Describe the given AMI ids and map each resolvable id to its metadata.
    ///
    /// Ids the API does not return (e.g. deregistered images) are absent
    /// from the result map. An empty id set short-circuits without an API
    /// call.
    pub async fn image_metadata(
        &self,
        image_ids: &[String],
    ) -> Result<HashMap<String, ImageMetadata>, AuditError> {
        if image_ids.is_empty() {
            debug!("No AMI ids to describe, skipping DescribeImages call");
            return Ok(HashMap::new());
        }

        debug!(
            image_count = image_ids.len(),
            "Sending DescribeImages API request for AMI metadata"
        );

        let response = self
            .client
            .describe_images()
            .set_image_ids(Some(image_ids.to_vec()))
            .send()
            .await
            .map_err(|e| AuditError::api("DescribeImages", e))?;

        let now = Utc::now();
        let mut metadata = HashMap::new();

        for image in response.images() {
            if let Some(info) = convert_image_metadata(image, now)? {
                metadata.insert(info.image_id.clone(), info);
            }
        }

        info!(
            requested = image_ids.len(),
            resolved = metadata.len(),
            "Fetched AMI metadata"
        );

        Ok(metadata)
    }

    /// Find the newest available AMI matching `name_pattern` for `owner`.
    ///
    /// The pattern is passed through to the EC2 `name` filter, so glob
    /// semantics are the provider's. Returns `Ok(None)` when nothing
    /// matches.
    pub async fn find_latest_image(
        &self,
        name_pattern: &str,
        owner: &str,
    ) -> Result<Option<ImageDetail>, AuditError> {
        debug!(
            name_pattern = %name_pattern,
            owner = %owner,
            "Sending DescribeImages API request for latest AMI lookup"
        );

        let response = self
            .client
            .describe_images()
            .owners(owner)
            .filters(Filter::builder().name("name").values(name_pattern).build())
            .filters(Filter::builder().name("state").values("available").build())
            .send()
            .await
            .map_err(|e| AuditError::api("DescribeImages", e))?;

        let mut candidates = Vec::new();
        for image in response.images() {
            if let Some(detail) = convert_image_detail(image)? {
                candidates.push(detail);
            }
        }

        info!(
            match_count = candidates.len(),
            name_pattern = %name_pattern,
            owner = %owner,
            "Fetched AMI candidates"
        );

        Ok(latest_image(candidates))
    }
}

fn convert_instance(instance: &aws_sdk_ec2::types::Instance) -> Option<Instance> {
    let instance_id = instance.instance_id()?.to_string();
    let image_id = instance.image_id()?.to_string();

    let instance_type = instance
        .instance_type()
        .map(|t| t.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let state = instance
        .state()
        .and_then(|s| s.name())
        .map(|n| n.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let launch_time = instance
        .launch_time()
        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()));

    Some(Instance {
        instance_id,
        instance_type,
        image_id,
        launch_time,
        state,
    })
}

fn convert_image_metadata(
    image: &aws_sdk_ec2::types::Image,
    now: DateTime<Utc>,
) -> Result<Option<ImageMetadata>, AuditError> {
    let (Some(image_id), Some(raw_date)) = (image.image_id(), image.creation_date()) else {
        return Ok(None);
    };

    let creation_date = parse_creation_date(raw_date)?;

    Ok(Some(ImageMetadata {
        image_id: image_id.to_string(),
        name: image.name().unwrap_or("Unknown").to_string(),
        creation_date,
        age_days: rotation::age_in_days(creation_date, now),
    }))
}

fn convert_image_detail(
    image: &aws_sdk_ec2::types::Image,
) -> Result<Option<ImageDetail>, AuditError> {
    let (Some(image_id), Some(raw_date)) = (image.image_id(), image.creation_date()) else {
        return Ok(None);
    };

    let creation_date = parse_creation_date(raw_date)?;

    let tags: Vec<(String, String)> = image
        .tags()
        .iter()
        .filter_map(|tag| match (tag.key(), tag.value()) {
            (Some(key), Some(value)) => Some((key.to_string(), value.to_string())),
            _ => None,
        })
        .collect();

    let block_device_mappings: Vec<BlockDeviceMapping> = image
        .block_device_mappings()
        .iter()
        .filter_map(|mapping| {
            mapping.device_name().map(|device_name| BlockDeviceMapping {
                device_name: device_name.to_string(),
                volume_size: mapping.ebs().and_then(|ebs| ebs.volume_size()),
                volume_type: mapping
                    .ebs()
                    .and_then(|ebs| ebs.volume_type())
                    .map(|t| t.as_str().to_string()),
                encrypted: mapping.ebs().and_then(|ebs| ebs.encrypted()),
            })
        })
        .collect();

    Ok(Some(ImageDetail {
        image_id: image_id.to_string(),
        name: image.name().unwrap_or("Unknown").to_string(),
        description: image.description().map(|d| d.to_string()),
        owner_id: image.owner_id().unwrap_or("unknown").to_string(),
        architecture: image
            .architecture()
            .map(|a| a.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        root_device_type: image
            .root_device_type()
            .map(|r| r.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        virtualization_type: image
            .virtualization_type()
            .map(|v| v.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        state: image
            .state()
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        creation_date,
        tags,
        block_device_mappings,
    }))
}

/// Parse an ISO-8601 creation date as returned by the EC2 API.
///
/// The API uses a `Z` suffix, which RFC 3339 parsing accepts directly.
fn parse_creation_date(raw: &str) -> Result<DateTime<Utc>, AuditError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AuditError::InvalidTimestamp {
            raw: raw.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ec2::types::{
        BlockDeviceMapping as SdkBlockDeviceMapping, EbsBlockDevice, Image, InstanceState,
        InstanceStateName, InstanceType, Tag, VolumeType,
    };
    use chrono::TimeZone;

    #[test]
    fn test_parse_creation_date_z_suffix() {
        let parsed = parse_creation_date("2024-03-15T10:30:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_creation_date_explicit_offset() {
        let parsed = parse_creation_date("2024-03-15T10:30:00+00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_creation_date_invalid() {
        let err = parse_creation_date("yesterday").unwrap_err();
        assert!(matches!(err, AuditError::InvalidTimestamp { .. }));
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn test_convert_instance_maps_fields() {
        let sdk_instance = aws_sdk_ec2::types::Instance::builder()
            .instance_id("i-0123456789abcdef0")
            .image_id("ami-12345678")
            .instance_type(InstanceType::T3Micro)
            .state(
                InstanceState::builder()
                    .name(InstanceStateName::Running)
                    .build(),
            )
            .launch_time(aws_smithy_types::DateTime::from_secs(1_700_000_000))
            .build();

        let instance = convert_instance(&sdk_instance).unwrap();
        assert_eq!(instance.instance_id, "i-0123456789abcdef0");
        assert_eq!(instance.image_id, "ami-12345678");
        assert_eq!(instance.instance_type, "t3.micro");
        assert_eq!(instance.state, "running");
        assert_eq!(
            instance.launch_time.unwrap().timestamp(),
            1_700_000_000
        );
    }

    #[test]
    fn test_convert_instance_requires_ids() {
        let without_image = aws_sdk_ec2::types::Instance::builder()
            .instance_id("i-1")
            .build();
        assert!(convert_instance(&without_image).is_none());

        let without_id = aws_sdk_ec2::types::Instance::builder()
            .image_id("ami-1")
            .build();
        assert!(convert_instance(&without_id).is_none());
    }

    #[test]
    fn test_convert_image_metadata_defaults_name() {
        let image = Image::builder()
            .image_id("ami-1")
            .creation_date("2024-01-01T00:00:00Z")
            .build();

        let now = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap();
        let info = convert_image_metadata(&image, now).unwrap().unwrap();
        assert_eq!(info.name, "Unknown");
        assert_eq!(info.age_days, 10);
    }

    #[test]
    fn test_convert_image_metadata_skips_incomplete_records() {
        let now = Utc::now();

        let no_date = Image::builder().image_id("ami-1").build();
        assert!(convert_image_metadata(&no_date, now).unwrap().is_none());

        let no_id = Image::builder()
            .creation_date("2024-01-01T00:00:00Z")
            .build();
        assert!(convert_image_metadata(&no_id, now).unwrap().is_none());
    }

    #[test]
    fn test_convert_image_metadata_rejects_bad_timestamp() {
        let image = Image::builder()
            .image_id("ami-1")
            .creation_date("not-a-timestamp")
            .build();

        assert!(convert_image_metadata(&image, Utc::now()).is_err());
    }

    #[test]
    fn test_convert_image_detail_maps_tags_and_devices() {
        let image = Image::builder()
            .image_id("ami-1")
            .name("company-abc-base-2024")
            .description("Base image")
            .owner_id("123456789012")
            .creation_date("2024-05-01T12:00:00Z")
            .tags(Tag::builder().key("Team").value("platform").build())
            .tags(Tag::builder().key("Env").value("prod").build())
            .block_device_mappings(
                SdkBlockDeviceMapping::builder()
                    .device_name("/dev/xvda")
                    .ebs(
                        EbsBlockDevice::builder()
                            .volume_size(8)
                            .volume_type(VolumeType::Gp3)
                            .encrypted(true)
                            .build(),
                    )
                    .build(),
            )
            .block_device_mappings(
                SdkBlockDeviceMapping::builder()
                    .device_name("/dev/xvdb")
                    .build(),
            )
            .build();

        let detail = convert_image_detail(&image).unwrap().unwrap();
        assert_eq!(detail.image_id, "ami-1");
        assert_eq!(detail.description.as_deref(), Some("Base image"));
        assert_eq!(
            detail.tags,
            vec![
                ("Team".to_string(), "platform".to_string()),
                ("Env".to_string(), "prod".to_string()),
            ]
        );
        assert_eq!(detail.block_device_mappings.len(), 2);
        assert_eq!(detail.block_device_mappings[0].volume_size, Some(8));
        assert_eq!(
            detail.block_device_mappings[0].volume_type.as_deref(),
            Some("gp3")
        );
        assert_eq!(detail.block_device_mappings[0].encrypted, Some(true));
        assert_eq!(detail.block_device_mappings[1].device_name, "/dev/xvdb");
        assert_eq!(detail.block_device_mappings[1].volume_size, None);
        assert_eq!(detail.block_device_mappings[1].encrypted, None);
    }
}
