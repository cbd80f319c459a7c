//! # Content Store Subcommands
//!
//! `probe` and `locate`. Neither writes anything.

use anyhow::Result;
use clap::Args;

use docchain_pinning::{ContentStore, PinningClient};

/// Arguments for `docchain probe`.
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Print the service's authentication response, or the failure detail.
    #[arg(long)]
    pub details: bool,
}

/// Arguments for `docchain locate`.
#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Content id returned by a previous upload.
    #[arg(value_name = "CID")]
    pub cid: String,
}

/// Execute `docchain probe`.
pub async fn run_probe(args: &ProbeArgs, client: &PinningClient) -> Result<u8> {
    if args.details {
        return match client.check_authentication().await {
            Ok(body) => {
                println!("OK: content store reachable");
                println!("{}", serde_json::to_string_pretty(&body)?);
                Ok(crate::EXIT_OK)
            }
            Err(e) => {
                println!("FAIL: {e}");
                Ok(crate::EXIT_FAILURE)
            }
        };
    }

    if client.probe().await {
        println!("OK: content store reachable");
        Ok(crate::EXIT_OK)
    } else {
        println!("FAIL: content store unreachable or credential rejected");
        Ok(crate::EXIT_FAILURE)
    }
}

/// Execute `docchain locate`.
pub fn run_locate(args: &LocateArgs, client: &PinningClient) -> Result<u8> {
    println!("{}", client.locate(args.cid.trim()));
    Ok(crate::EXIT_OK)
}
