//! ami-audit - EC2 instance and AMI rotation audit library.
//!
//! Shared by two binaries:
//! - `check-ami`: lists EC2 instances with their AMIs and flags AMIs
//!   older than the rotation policy threshold
//! - `latest-ami`: finds the newest AMI matching a name pattern and owner

pub mod ec2;
pub mod error;
pub mod logging;
pub mod report;
pub mod rotation;
pub mod types;
