// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command line utility for interacting with the Ledger Algorand app

use std::{fmt::Debug, time::Duration};

use clap::Parser;
use log::{debug, error, info, LevelFilter};
use serde::Serialize;

use ledger_algorand::{
    apdu::{path::DerivationPath, response::CommandResult},
    Config, HidHandle, LedgerProvider, DEFAULT_REQUEST_TIMEOUT,
};

mod helpers;
use helpers::*;

/// Ledger command line utility
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Device index (where more than one device is available)
    #[clap(long, default_value = "0")]
    device_index: usize,

    /// Maximum payload per signing chunk
    #[clap(long, default_value = "250")]
    chunk_size: usize,

    /// Timeout for each device request in seconds
    #[clap(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    timeout_s: u64,

    /// Write command results to the provided file (`.json`)
    #[clap(long)]
    output: Option<String>,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Enable verbose logging
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Clone, PartialEq, Debug, Parser)]
#[non_exhaustive]
enum Actions {
    /// List available devices
    List,

    /// Fetch Algorand app version
    Version,

    /// Fetch application info
    AppInfo,

    /// Fetch device info (dashboard only)
    DeviceInfo,

    /// Fetch the public key for an account
    PublicKey {
        /// Account id for derivation (`m/44'/283'/ACCOUNT'/0/0`)
        #[clap(long, default_value = "0")]
        account: u32,

        /// Confirm on device
        #[clap(long)]
        confirm: bool,
    },

    /// Fetch the public key and address for an account
    Address {
        /// Account id for derivation (`m/44'/283'/ACCOUNT'/0/0`)
        #[clap(long, default_value = "0")]
        account: u32,

        /// Display the address on device for confirmation
        #[clap(long)]
        confirm: bool,
    },

    /// Sign a msgpack encoded transaction (or text)
    Sign {
        /// Account id for derivation (`m/44'/283'/ACCOUNT'/0/0`)
        #[clap(long, default_value = "0")]
        account: u32,

        /// File containing the payload to be signed
        #[clap(long)]
        input: Option<String>,

        /// Hex-encoded payload to be signed
        #[clap(long)]
        data: Option<HexData>,

        /// Text payload to be signed
        #[clap(long)]
        text: Option<String>,
    },

    /// Serialize a derivation path (no device required)
    Path {
        /// Derivation path (`m/44'/283'/0'/0/0`)
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default())?;

    // Handle path command (offline)
    if let Actions::Path { path } = &args.cmd {
        let path = DerivationPath::parse(path)
            .map_err(|e| anyhow::anyhow!("Invalid path format: {}", e))?;

        info!("path: {}", path);
        info!("encoded: {}", hex::encode(path.to_bytes()));
        return Ok(());
    }

    // List available devices
    let p = LedgerProvider::new()?;

    let devices = p.list_devices();
    if devices.is_empty() {
        return Err(anyhow::anyhow!("No devices found"));
    }

    // Handle list command
    if args.cmd == Actions::List {
        info!("Devices:");
        for (i, d) in devices.iter().enumerate() {
            info!("  {}: {}", i, d);
        }

        return Ok(());
    }

    // Select device by index
    let d = match devices.get(args.device_index) {
        Some(d) => d,
        None => {
            return Err(anyhow::anyhow!(
                "Invalid device index: {} (max: {})",
                args.device_index,
                devices.len() - 1
            ))
        }
    };

    debug!("Using device {}: {}", args.device_index, d);

    // Connect to device
    let cfg = Config::default()
        .with_chunk_size(args.chunk_size)
        .with_request_timeout(Duration::from_secs(args.timeout_s));

    let t = match p.connect(d, cfg) {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to connect to device: {}", d);
            return Err(e.into());
        }
    };

    // Execute command
    execute(t, args.cmd, args.output.as_deref()).await
}

/// Execute a command with the provided device handle
async fn execute(t: HidHandle, cmd: Actions, output: Option<&str>) -> anyhow::Result<()> {
    debug!("Executing command: {:?}", cmd);

    match cmd {
        Actions::Version => {
            let r = t.version().await;
            report("version", &r, output).await
        }
        Actions::AppInfo => {
            let r = t.app_info().await;
            report("app info", &r, output).await
        }
        Actions::DeviceInfo => {
            let r = t.device_info().await;
            report("device info", &r, output).await
        }
        Actions::PublicKey { account, confirm } => {
            info!("requesting public key for account: {}", account);

            let r = t.public_key(account, confirm).await;
            report("public key", &r, output).await
        }
        Actions::Address { account, confirm } => {
            info!("requesting address for account: {}", account);

            let r = t.address(account, confirm).await;
            report("address", &r, output).await
        }
        Actions::Sign {
            account,
            input,
            data,
            text,
        } => {
            let payload = match (input, data, text) {
                (Some(f), _, _) => read_input(&f).await?,
                (_, Some(d), _) => d.0,
                (_, _, Some(s)) => s.into_bytes(),
                _ => return Err(anyhow::anyhow!("one of --input, --data or --text required")),
            };

            info!(
                "signing {} byte payload with account: {}",
                payload.len(),
                account
            );

            let r = t
                .sign(account, &payload)
                .await
                .map(|s| s.signature.map(hex::encode));
            report("signature", &r, output).await
        }
        _ => unreachable!(),
    }
}

/// Log a command result, writing it to the output file if provided
async fn report<T: Serialize + Debug>(
    name: &str,
    r: &CommandResult<T>,
    output: Option<&str>,
) -> anyhow::Result<()> {
    if let Some(o) = output {
        write_output(o, r).await?;
    }

    match r {
        CommandResult::Success { value, .. } => {
            info!("{}: {:#?}", name, value);
            Ok(())
        }
        CommandResult::Failure(e) => {
            error!("{} failed: {}", name, e);
            Err(anyhow::anyhow!("{} failed: {}", name, e))
        }
    }
}
