//! Mint a signed access token for local testing and operations.
//!
//! Login lives in a separate service; this signs with the same `JWT_SECRET`
//! the API verifies against, so a token can be handed to the client CLI.

use chrono::Duration;
use clap::Parser;
use fashion_finder_api::{auth::TokenVerifier, models::UserId, ApiError};

#[derive(Debug, Parser)]
#[command(name = "issue-token", about = "Sign an access token for the search API")]
struct Args {
    /// User id to embed in the token
    user_id: String,

    /// Optional email claim
    #[arg(long)]
    email: Option<String>,

    /// Token lifetime in hours
    #[arg(long, default_value_t = 1)]
    hours: i64,

    /// Signing secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    secret: String,
}

fn main() -> Result<(), ApiError> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    if args.secret.trim().is_empty() {
        return Err(ApiError::Config("JWT_SECRET must not be empty".to_string()));
    }

    let ttl = Duration::try_hours(args.hours)
        .ok_or_else(|| ApiError::Config(format!("--hours {} is out of range", args.hours)))?;

    let verifier = TokenVerifier::new(&args.secret);
    let token = verifier.issue(&UserId::new(args.user_id), args.email.as_deref(), ttl)?;

    println!("{}", token);
    Ok(())
}
