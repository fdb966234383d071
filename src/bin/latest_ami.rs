//! latest-ami - find the newest AMI matching a name pattern and owner.

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::info;

use ami_audit::ec2::Ec2Client;
use ami_audit::logging;
use ami_audit::report;
use ami_audit::rotation::ROTATION_POLICY_DAYS;

/// Find the latest AMI with name and owner filters
#[derive(Parser, Debug)]
#[command(name = "latest-ami", version, about, long_about = None)]
struct Args {
    /// AWS region to search
    #[arg(long, env = "AWS_REGION")]
    region: String,

    /// AMI name pattern to filter (EC2 glob semantics)
    #[arg(long, default_value = "*company-abc*")]
    name_pattern: String,

    /// AMI owner filter ("self" for the caller's own account)
    #[arg(long, default_value = "self")]
    owner: String,

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

    println!("Searching for latest AMI in region: {}", args.region);
    println!("Name pattern: {}", args.name_pattern);
    println!("Owner: {}", args.owner);
    println!("{}", "=".repeat(50));

    let client = Ec2Client::new(&args.region).await;

    match client
        .find_latest_image(&args.name_pattern, &args.owner)
        .await?
    {
        Some(image) => {
            info!(
                image_id = %image.image_id,
                name = %image.name,
                created = %image.creation_date,
                "Latest AMI selected"
            );
            print!(
                "{}",
                report::render_image_detail(&image, Utc::now(), args.rotation_days)
            );
        }
        None => {
            info!(
                name_pattern = %args.name_pattern,
                owner = %args.owner,
                "No AMI matched the lookup filters"
            );
            print!("{}", report::render_no_image_found());
        }
    }

    Ok(())
}
