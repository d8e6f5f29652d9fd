//! Destination registry credential vending through the aws CLI

use crate::runner::Invocation;

pub const AWS: &str = "aws";

/// Username ECR expects alongside a vended token
pub const ECR_USERNAME: &str = "AWS";

/// `aws ecr get-login-password --region REGION`
///
/// Prints a token valid for 12 hours on stdout.
pub fn get_login_password(region: &str) -> Invocation {
    Invocation::new(AWS).args(["ecr", "get-login-password", "--region", region])
}
