// Copyright (c) 2026 Covenant
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! Typed-value list hashing (blake2b-256).
//!
//! Every item is framed as `tag(1) || len(4, big-endian) || payload` before
//! being absorbed, so `[a, b]` and `[a ++ b]` never collide and an absent
//! item is distinguishable from an empty buffer:
//!
//! ```text
//! tag 0  absent        (len 0, no payload)
//! tag 1  raw bytes
//! tag 2  UTF-8 text
//! tag 3  unsigned int  (payload 8 bytes, big-endian)
//! ```

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

/// 32-byte digest.
pub type Hash32 = [u8; 32];

type Blake2b256 = Blake2b<U32>;

const TAG_ABSENT: u8 = 0;
const TAG_BYTES: u8 = 1;
const TAG_TEXT: u8 = 2;
const TAG_UINT: u8 = 3;

/// One typed input to [`hash_items`].
#[derive(Clone, Copy, Debug)]
pub enum HashItem<'a> {
    /// Explicit "no value" marker, distinct from any buffer.
    Absent,
    /// Raw bytes.
    Bytes(&'a [u8]),
    /// UTF-8 text.
    Text(&'a str),
    /// Unsigned integer, absorbed as 8 bytes big-endian.
    UInt(u64),
}

fn absorb(h: &mut Blake2b256, tag: u8, payload: &[u8]) {
    h.update([tag]);
    h.update((payload.len() as u32).to_be_bytes());
    h.update(payload);
}

/// Hash a list of typed values.
pub fn hash_items(items: &[HashItem<'_>]) -> Hash32 {
    let mut h = Blake2b256::new();
    for item in items {
        match item {
            HashItem::Absent => absorb(&mut h, TAG_ABSENT, &[]),
            HashItem::Bytes(b) => absorb(&mut h, TAG_BYTES, b),
            HashItem::Text(s) => absorb(&mut h, TAG_TEXT, s.as_bytes()),
            HashItem::UInt(v) => absorb(&mut h, TAG_UINT, &v.to_be_bytes()),
        }
    }
    h.finalize().into()
}

/// Hash a single buffer (shorthand for a one-item list).
pub fn hash_buf(buf: &[u8]) -> Hash32 {
    hash_items(&[HashItem::Bytes(buf)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_differs_from_empty_bytes() {
        assert_ne!(hash_items(&[HashItem::Absent]), hash_items(&[HashItem::Bytes(b"")]));
    }

    #[test]
    fn framing_prevents_concatenation_collisions() {
        let split = hash_items(&[HashItem::Bytes(b"ab"), HashItem::Bytes(b"c")]);
        let joined = hash_items(&[HashItem::Bytes(b"abc")]);
        assert_ne!(split, joined);
    }

    #[test]
    fn text_and_bytes_tags_differ() {
        assert_ne!(
            hash_items(&[HashItem::Text("abc")]),
            hash_items(&[HashItem::Bytes(b"abc")])
        );
    }
}
