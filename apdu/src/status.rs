// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Status code registry
//!
//! Maps the 2-byte status word trailing every response to a description and an
//! [`Outcome`] category. Lookup is total, codes outside the registry are described
//! as unknown rather than rejected.

use alloc::{borrow::Cow, format};

use num_enum::TryFromPrimitive;
use strum::EnumIter;

/// Status word for successful operations
pub const SW_OK: u16 = 0x9000;

/// Reserved status for failures below the protocol layer (transport, framing)
pub const SW_UNRECOGNIZED: u16 = 0xffff;

/// Known device and transport status codes
#[derive(Copy, Clone, PartialEq, Eq, Debug, TryFromPrimitive, EnumIter)]
#[repr(u16)]
pub enum StatusCode {
    U2FUnknown = 1,
    U2FBadRequest = 2,
    U2FConfigurationUnsupported = 3,
    U2FDeviceIneligible = 4,
    U2FTimeout = 5,
    Timeout = 14,
    NoErrors = 0x9000,
    DeviceIsBusy = 0x9001,
    ErrorDerivingKeys = 0x6802,
    ExecutionError = 0x6400,
    WrongLength = 0x6700,
    EmptyBuffer = 0x6982,
    OutputBufferTooSmall = 0x6983,
    DataIsInvalid = 0x6984,
    ConditionsNotSatisfied = 0x6985,
    TransactionRejected = 0x6986,
    BadKeyHandle = 0x6a80,
    InvalidP1P2 = 0x6b00,
    InstructionNotSupported = 0x6d00,
    AppDoesNotSeemToBeOpen = 0x6e00,
    UnknownError = 0x6f00,
    SignVerifyError = 0x6f01,
}

/// Outcome category for a status code
#[derive(Copy, Clone, PartialEq, Eq, Debug, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Outcome {
    Success,
    Busy,
    Rejected,
    Malformed,
    Unsupported,
    Unknown,
}

impl StatusCode {
    /// Human readable description
    pub const fn description(&self) -> &'static str {
        use StatusCode::*;

        match self {
            U2FUnknown => "U2F: Unknown",
            U2FBadRequest => "U2F: Bad request",
            U2FConfigurationUnsupported => "U2F: Configuration unsupported",
            U2FDeviceIneligible => "U2F: Device Ineligible",
            U2FTimeout => "U2F: Timeout",
            Timeout => "Timeout",
            NoErrors => "No errors",
            DeviceIsBusy => "Device is busy",
            ErrorDerivingKeys => "Error deriving keys",
            ExecutionError => "Execution Error",
            WrongLength => "Wrong Length",
            EmptyBuffer => "Empty Buffer",
            OutputBufferTooSmall => "Output buffer too small",
            DataIsInvalid => "Data is invalid",
            ConditionsNotSatisfied => "Conditions not satisfied",
            TransactionRejected => "Transaction rejected",
            BadKeyHandle => "Bad key handle",
            InvalidP1P2 => "Invalid P1/P2",
            InstructionNotSupported => "Instruction not supported",
            AppDoesNotSeemToBeOpen => "App does not seem to be open",
            UnknownError => "Unknown error",
            SignVerifyError => "Sign/verify error",
        }
    }

    /// Outcome category
    pub const fn outcome(&self) -> Outcome {
        use StatusCode::*;

        match self {
            NoErrors => Outcome::Success,
            DeviceIsBusy | Timeout | U2FTimeout => Outcome::Busy,
            ConditionsNotSatisfied | TransactionRejected => Outcome::Rejected,
            WrongLength | EmptyBuffer | OutputBufferTooSmall | DataIsInvalid | BadKeyHandle
            | InvalidP1P2 | U2FBadRequest => Outcome::Malformed,
            InstructionNotSupported
            | AppDoesNotSeemToBeOpen
            | U2FConfigurationUnsupported
            | U2FDeviceIneligible => Outcome::Unsupported,
            U2FUnknown | ExecutionError | ErrorDerivingKeys | UnknownError | SignVerifyError => {
                Outcome::Unknown
            }
        }
    }
}

/// Describe a status code, never fails
pub fn describe(code: u16) -> Cow<'static, str> {
    match StatusCode::try_from(code) {
        Ok(c) => Cow::Borrowed(c.description()),
        Err(_) => Cow::Owned(format!("Unknown Status Code: {code}")),
    }
}

/// Categorise a status code, unregistered codes are [`Outcome::Unknown`]
pub fn outcome(code: u16) -> Outcome {
    StatusCode::try_from(code)
        .map(|c| c.outcome())
        .unwrap_or(Outcome::Unknown)
}
