// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Chunk framing for signing requests
//!
//! Messages for signing may exceed the maximum APDU payload, so are split into a sequence
//! of [`Chunk`]s sent in strict order. When a non-zero account id is provided, it is
//! prepended to the message as a 4-byte big-endian value before splitting.
//!
//! The position of each chunk in the sequence is signalled via P1 / P2:
//!
//! | Position | P1                                   | P2     |
//! |----------|--------------------------------------|--------|
//! | first    | `0x00`, or `0x01` with an account id | `0x80` |
//! | middle   | `0x80`                               | `0x80` |
//! | last     | `0x80`                               | `0x00` |
//! | single   | `0x00`, or `0x01` with an account id | `0x00` |

use alloc::vec::Vec;

use byteorder::{BigEndian, ByteOrder};
use encdec::Encode;

use crate::{p1, p2, ApduError, ApduStatic, Instruction, ACCOUNT_ID_LEN, ALGO_APDU_CLA, CHUNK_SIZE};

/// Position of a chunk within a signing sequence
#[derive(Copy, Clone, PartialEq, Eq, Debug, strum::Display)]
pub enum ChunkPosition {
    /// First of several chunks
    Init,
    /// Neither first nor last
    Add,
    /// Final chunk of several
    Last,
    /// Only chunk, both first and last
    Single,
}

/// A single signing request chunk
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Chunk {
    /// Sequence index, starting from 1
    pub index: usize,
    /// Total number of chunks in the sequence
    pub count: usize,
    /// Account id carried (as a prefix) by the first chunk, when non-zero
    pub account_id: Option<u32>,
    /// Chunk data
    pub data: Vec<u8>,
}

impl Chunk {
    /// Check whether this is the first chunk in the sequence
    pub fn is_first(&self) -> bool {
        self.index == 1
    }

    /// Check whether this is the final chunk in the sequence
    pub fn is_last(&self) -> bool {
        self.index == self.count
    }

    /// Fetch the sequence position for this chunk
    pub fn position(&self) -> ChunkPosition {
        match (self.is_first(), self.is_last()) {
            (true, true) => ChunkPosition::Single,
            (true, false) => ChunkPosition::Init,
            (false, false) => ChunkPosition::Add,
            (false, true) => ChunkPosition::Last,
        }
    }
}

impl ApduStatic for Chunk {
    const CLA: u8 = ALGO_APDU_CLA;
    const INS: u8 = Instruction::SignMsgpack as u8;

    fn p1(&self) -> u8 {
        match (self.is_first(), self.account_id) {
            (true, Some(_)) => p1::MSGPACK_FIRST_ACCOUNT_ID,
            (true, None) => p1::MSGPACK_FIRST,
            (false, _) => p1::MSGPACK_ADD,
        }
    }

    fn p2(&self) -> u8 {
        match self.is_last() {
            true => p2::MSGPACK_LAST,
            false => p2::MSGPACK_ADD,
        }
    }
}

impl Encode for Chunk {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(self.data.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < self.data.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[..self.data.len()].copy_from_slice(&self.data);

        Ok(self.data.len())
    }
}

/// Splits signing payloads into [`Chunk`] sequences
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ChunkFramer {
    chunk_size: usize,
}

impl Default for ChunkFramer {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
        }
    }
}

impl ChunkFramer {
    /// Create a framer with the provided chunk size (limited to [`CHUNK_SIZE`])
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.clamp(1, CHUNK_SIZE),
        }
    }

    /// Maximum data length per chunk
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Compute the number of chunks required for a payload
    pub fn chunk_count(&self, account_id: u32, payload_len: usize) -> usize {
        let n = match account_id {
            0 => payload_len,
            _ => payload_len + ACCOUNT_ID_LEN,
        };

        n.div_ceil(self.chunk_size).max(1)
    }

    /// Split a payload into an ordered chunk sequence, prefixing non-zero account ids
    pub fn frame(&self, account_id: u32, payload: &[u8]) -> Vec<Chunk> {
        let mut buff = Vec::with_capacity(payload.len() + ACCOUNT_ID_LEN);

        if account_id != 0 {
            let mut a = [0u8; ACCOUNT_ID_LEN];
            BigEndian::write_u32(&mut a, account_id);
            buff.extend_from_slice(&a);
        }
        buff.extend_from_slice(payload);

        let count = self.chunk_count(account_id, payload.len());

        // Empty payloads still produce a single (empty) chunk
        if buff.is_empty() {
            return alloc::vec![Chunk {
                index: 1,
                count,
                account_id: None,
                data: Vec::new(),
            }];
        }

        buff.chunks(self.chunk_size)
            .enumerate()
            .map(|(i, d)| Chunk {
                index: i + 1,
                count,
                account_id: match (i, account_id) {
                    (0, a) if a != 0 => Some(a),
                    _ => None,
                },
                data: d.to_vec(),
            })
            .collect()
    }
}

/// Split a payload into chunks using the default chunk size
pub fn frame(account_id: u32, payload: &[u8]) -> Vec<Chunk> {
    ChunkFramer::default().frame(account_id, payload)
}

#[cfg(test)]
mod test {
    use rand::{random, Rng};

    use super::*;

    #[test]
    fn chunk_count_and_reconstruction() {
        let mut rng = rand::thread_rng();

        for _ in 0..128 {
            let len = rng.gen_range(0..2048usize);
            let account_id: u32 = match rng.gen_bool(0.5) {
                true => random(),
                false => 0,
            };

            let payload: Vec<u8> = (0..len).map(|_| random()).collect();
            let chunks = frame(account_id, &payload);

            let prefix = if account_id != 0 { ACCOUNT_ID_LEN } else { 0 };
            let expected = (len + prefix).div_ceil(CHUNK_SIZE).max(1);
            assert_eq!(chunks.len(), expected, "len: {len} account: {account_id}");

            // Concatenated chunks rebuild the prefixed payload
            let joined: Vec<u8> = chunks.iter().flat_map(|c| c.data.iter().copied()).collect();
            let mut original = Vec::new();
            if account_id != 0 {
                original.extend_from_slice(&account_id.to_be_bytes());
            }
            original.extend_from_slice(&payload);
            assert_eq!(joined, original);

            // Indices strictly increasing, exactly one first and one last
            for (i, c) in chunks.iter().enumerate() {
                assert_eq!(c.index, i + 1);
                assert_eq!(c.count, expected);
                assert!(c.data.len() <= CHUNK_SIZE);
            }
            assert_eq!(chunks.iter().filter(|c| c.is_first()).count(), 1);
            assert_eq!(chunks.iter().filter(|c| c.is_last()).count(), 1);
        }
    }

    #[test]
    fn empty_payload_single_chunk() {
        let chunks = frame(0, &[]);

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].data.is_empty());
        assert_eq!(chunks[0].position(), ChunkPosition::Single);
        assert_eq!(chunks[0].p1(), p1::MSGPACK_FIRST);
        assert_eq!(chunks[0].p2(), p2::MSGPACK_LAST);
    }

    #[test]
    fn single_chunk_markers() {
        let chunks = frame(0, &[0xaa; CHUNK_SIZE]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].p1(), p1::MSGPACK_FIRST);
        assert_eq!(chunks[0].p2(), p2::MSGPACK_LAST);

        let chunks = frame(7, &[0xaa; 10]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].account_id, Some(7));
        assert_eq!(&chunks[0].data[..4], &[0, 0, 0, 7]);
        assert_eq!(chunks[0].p1(), p1::MSGPACK_FIRST_ACCOUNT_ID);
        assert_eq!(chunks[0].p2(), p2::MSGPACK_LAST);
    }

    #[test]
    fn account_prefix_spills_into_second_chunk() {
        let chunks = frame(1, &[0x55; CHUNK_SIZE]);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].data.len(), CHUNK_SIZE);
        assert_eq!(chunks[1].data.len(), ACCOUNT_ID_LEN);
        assert_eq!(chunks[1].account_id, None);
    }

    #[test]
    fn multi_chunk_markers() {
        let chunks = frame(0, &[0x11; CHUNK_SIZE * 2 + 1]);
        assert_eq!(chunks.len(), 3);

        let markers: Vec<_> = chunks
            .iter()
            .map(|c| (c.position(), c.p1(), c.p2()))
            .collect();

        assert_eq!(
            markers,
            alloc::vec![
                (ChunkPosition::Init, p1::MSGPACK_FIRST, p2::MSGPACK_ADD),
                (ChunkPosition::Add, p1::MSGPACK_ADD, p2::MSGPACK_ADD),
                (ChunkPosition::Last, p1::MSGPACK_ADD, p2::MSGPACK_LAST),
            ]
        );
        assert_eq!(chunks[2].data.len(), 1);
    }

    #[test]
    fn custom_chunk_size() {
        let f = ChunkFramer::new(16);
        let chunks = f.frame(0, &[0u8; 40]);
        assert_eq!(chunks.len(), 3);
        assert_eq!(f.chunk_count(0, 40), 3);

        // Oversized chunk sizes are limited to the APDU maximum
        assert_eq!(ChunkFramer::new(4096).chunk_size(), CHUNK_SIZE);
        assert_eq!(ChunkFramer::new(0).chunk_size(), 1);
    }

    #[test]
    fn chunk_encode() {
        let chunks = frame(0, &[1, 2, 3]);

        let mut buff = [0u8; 8];
        let n = chunks[0].encode(&mut buff).unwrap();
        assert_eq!(&buff[..n], &[1, 2, 3]);
        assert_eq!(
            chunks[0].encode(&mut buff[..2]),
            Err(ApduError::InvalidLength)
        );
    }
}
