//! check-ami - list EC2 instances with their AMIs and flag AMIs that
//! violate the rotation policy.

use std::collections::BTreeSet;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use ami_audit::ec2::Ec2Client;
use ami_audit::logging;
use ami_audit::report;
use ami_audit::rotation::{self, ROTATION_POLICY_DAYS};

/// Check EC2 instances and AMI rotation compliance
#[derive(Parser, Debug)]
#[command(name = "check-ami", version, about, long_about = None)]
struct Args {
    /// AWS region to check
    #[arg(long, env = "AWS_REGION")]
    region: String,

    /// Rotation policy threshold in days
    #[arg(long, default_value_t = ROTATION_POLICY_DAYS)]
    rotation_days: i64,

    /// Log format: json or pretty
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log_format, &args.log_level);

    println!("Checking EC2 instances in region: {}", args.region);
    println!("{}", "=".repeat(50));

    let client = Ec2Client::new(&args.region).await;
    let instances = client.list_instances().await?;

    if instances.is_empty() {
        println!("No EC2 instances found.");
        return Ok(());
    }

    // Each unique AMI id is described once, however many instances use it.
    let image_ids: Vec<String> = instances
        .iter()
        .map(|instance| instance.image_id.clone())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();

    let images = client.image_metadata(&image_ids).await?;
    let expired = rotation::expired_image_ids(&images, args.rotation_days);

    info!(
        instance_count = instances.len(),
        unique_amis = image_ids.len(),
        expired_amis = expired.len(),
        rotation_days = args.rotation_days,
        "Audit data collected"
    );

    print!(
        "{}",
        report::render_audit_report(&instances, &images, &expired, args.rotation_days)
    );

    Ok(())
}
