// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    chunk::{Chunk, ChunkFramer, ChunkPosition},
    path::{DerivationPath, PathInput},
    response::{
        AddressInfo, AddressReq, AppFlags, AppInfo, AppInfoReq, CommandResult, DeviceInfo,
        DeviceInfoReq, Response, SignResp, StatusError, VersionInfo, VersionReq,
    },
    status::{Outcome, StatusCode, SW_OK, SW_UNRECOGNIZED},
    ApduError, ApduStatic, Instruction, PathError,
};
