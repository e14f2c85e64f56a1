// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Signing sequence state machine
//!
//! Signing payloads are framed into chunks and sent in strict order, the first
//! non-success response halts the sequence. Only the response to the final chunk
//! carries the signature.

use log::{debug, warn};

use ledger_algorand_apdu::{
    chunk::{Chunk, ChunkFramer},
    response::{CommandResult, SignResp, StatusError, SIGN_ACCEPTABLE_CODES},
    ApduStatic,
};

use crate::{
    config::Config,
    handle::{exchange, Request},
    transport::Transport,
};

/// Signing sequence state
#[derive(Clone, Debug, PartialEq, strum::Display)]
pub enum SignState {
    /// No chunks sent
    NotStarted,
    /// Sending the chunk at the provided (zero-based) index
    Sending(usize),
    /// Final chunk accepted
    Succeeded(SignResp),
    /// A chunk failed, no further chunks are sent
    Failed(StatusError),
}

impl SignState {
    /// Check whether the sequence has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, SignState::Succeeded(_) | SignState::Failed(_))
    }
}

/// Signing sequence over a framed payload
#[derive(Clone, Debug)]
pub struct SignSequence {
    chunks: Vec<Chunk>,
    state: SignState,
}

impl SignSequence {
    /// Frame a payload for signing with the provided configuration
    pub fn new(cfg: &Config, account_id: u32, payload: &[u8]) -> Self {
        let chunks = ChunkFramer::new(cfg.chunk_size).frame(account_id, payload);

        debug!(
            "Framed {} byte payload (account: {}) into {} chunks",
            payload.len(),
            account_id,
            chunks.len()
        );

        Self {
            chunks,
            state: SignState::NotStarted,
        }
    }

    /// Fetch framed chunks
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Fetch the current state
    pub fn state(&self) -> &SignState {
        &self.state
    }

    /// Advance the sequence, sending at most one chunk
    pub async fn step<T: Transport + ?Sized>(&mut self, t: &T, cfg: &Config) {
        let next = match &self.state {
            SignState::NotStarted => SignState::Sending(0),
            SignState::Sending(i) => self.send_chunk(t, cfg, *i).await,
            SignState::Succeeded(_) | SignState::Failed(_) => return,
        };

        self.state = next;
    }

    /// Run the sequence to completion
    pub async fn run<T: Transport + ?Sized>(
        mut self,
        t: &T,
        cfg: &Config,
    ) -> CommandResult<SignResp> {
        loop {
            match self.state {
                SignState::Succeeded(v) => return CommandResult::success(v),
                SignState::Failed(e) => return e.into(),
                _ => self.step(t, cfg).await,
            }
        }
    }

    async fn send_chunk<T: Transport + ?Sized>(
        &self,
        t: &T,
        cfg: &Config,
        index: usize,
    ) -> SignState {
        let c = match self.chunks.get(index) {
            Some(c) => c,
            None => {
                return SignState::Failed(StatusError::unrecognized("chunk index out of range"))
            }
        };

        debug!(
            "Sending chunk {}/{} ({}, p1: 0x{:02x}, p2: 0x{:02x}, {} bytes)",
            c.index,
            c.count,
            c.position(),
            c.p1(),
            c.p2(),
            c.data.len()
        );

        let req = Request {
            cla: cfg.cla,
            ins: Chunk::INS,
            p1: c.p1(),
            p2: c.p2(),
            data: &c.data,
            acceptable: SIGN_ACCEPTABLE_CODES,
        };
        let r = exchange::<SignResp, _>(t, cfg.request_timeout, req).await;

        match r {
            CommandResult::Success { value, .. } if c.is_last() => SignState::Succeeded(value),
            CommandResult::Success { .. } => SignState::Sending(index + 1),
            CommandResult::Failure(e) => {
                warn!(
                    "Chunk {}/{} failed, halting signing sequence: {}",
                    c.index, c.count, e
                );
                SignState::Failed(e)
            }
        }
    }
}
