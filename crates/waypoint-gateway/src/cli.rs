use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use waypoint_core::constants::{MAX_CODE_LENGTH, MIN_CODE_LENGTH};
use waypoint_telemetry::LogFormat;

pub const LISTEN_ADDR_ENV: &str = "WAYPOINT_LISTEN_ADDR";
pub const DID_ENV: &str = "ATPROTO_DID";
pub const RESOLVER_ENDPOINT_ENV: &str = "WAYPOINT_RESOLVER_ENDPOINT";
pub const PUBLIC_API_ENV: &str = "WAYPOINT_PUBLIC_API";
pub const CACHE_TTL_ENV: &str = "WAYPOINT_CACHE_TTL_SECS";
pub const CODE_LENGTH_ENV: &str = "WAYPOINT_CODE_LENGTH";
pub const LOG_FORMAT_ENV: &str = "WAYPOINT_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, Parser)]
#[command(name = "waypoint", about = "Short links for an AT Protocol link board")]
pub struct CLI {
    #[command(flatten)]
    pub account: AccountArgs,

    #[arg(long, env = LOG_FORMAT_ENV, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct AccountArgs {
    /// Account whose link board is served.
    #[arg(long, env = DID_ENV, global = true)]
    pub did: Option<String>,

    #[arg(
        long,
        env = RESOLVER_ENDPOINT_ENV,
        default_value = waypoint_core::constants::RESOLVER_ENDPOINT,
        global = true
    )]
    pub resolver_endpoint: String,

    #[arg(
        long,
        env = PUBLIC_API_ENV,
        default_value = waypoint_core::constants::PUBLIC_API_ENDPOINT,
        global = true
    )]
    pub public_api: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP gateway.
    Serve(ServeArgs),
    /// Verify the configured account and print a preview of its links.
    Check,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Seconds a fetched link board is reused.
    #[arg(long, env = CACHE_TTL_ENV, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,

    #[arg(
        long,
        env = CODE_LENGTH_ENV,
        default_value_t = waypoint_core::constants::DEFAULT_CODE_LENGTH,
        value_parser = parse_code_length
    )]
    pub code_length: usize,
}

fn parse_code_length(value: &str) -> Result<usize, String> {
    let length: usize = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
        Ok(length)
    } else {
        Err(format!(
            "code length must be between {} and {}",
            MIN_CODE_LENGTH, MAX_CODE_LENGTH
        ))
    }
}
