//! Minimal Solidity ABI codec for the `bytes` / `bytes[]` shapes the blog
//! contract speaks.
//!
//! Offsets inside a tuple are relative to the start of that tuple; offsets
//! inside a `bytes[]` are relative to the first word after its length.

use crate::{Error, Result};
use sha3::{Digest, Keccak256};

/// ABI word size in bytes
pub const WORD: usize = 32;

/// `Error(string)` selector
const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// First four bytes of the Keccak-256 hash of a canonical function signature.
#[must_use]
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

/// Calldata for a function whose arguments are all dynamic `bytes`.
#[must_use]
pub fn encode_call(selector: [u8; 4], args: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + args.len() * 3 * WORD);
    out.extend_from_slice(&selector);
    out.extend(encode_dynamic_tuple(args));
    out
}

/// Return data for a single `bytes` value.
#[must_use]
pub fn encode_bytes(value: &[u8]) -> Vec<u8> {
    encode_dynamic_tuple(&[value])
}

/// Return data for a tuple of `bytes[]` columns.
#[must_use]
pub fn encode_bytes_columns(columns: &[Vec<Vec<u8>>]) -> Vec<u8> {
    let encoded: Vec<Vec<u8>> = columns.iter().map(|c| encode_bytes_array(c)).collect();
    let mut head = Vec::with_capacity(columns.len() * WORD);
    let mut tail = Vec::new();
    for column in &encoded {
        head.extend_from_slice(&encode_usize(columns.len() * WORD + tail.len()));
        tail.extend_from_slice(column);
    }
    head.extend(tail);
    head
}

fn encode_bytes_array(items: &[Vec<u8>]) -> Vec<u8> {
    let slices: Vec<&[u8]> = items.iter().map(Vec::as_slice).collect();
    let mut out = encode_usize(items.len()).to_vec();
    out.extend(encode_dynamic_tuple(&slices));
    out
}

fn encode_dynamic_tuple(values: &[&[u8]]) -> Vec<u8> {
    let head_len = values.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for value in values {
        head.extend_from_slice(&encode_usize(head_len + tail.len()));
        tail.extend_from_slice(&encode_usize(value.len()));
        tail.extend_from_slice(value);
        tail.resize(tail.len() + padding(value.len()), 0);
    }
    head.extend(tail);
    head
}

const fn padding(len: usize) -> usize {
    (WORD - len % WORD) % WORD
}

fn encode_usize(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

/// Bounds-checked view over ABI return data
struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| {
                Error::contract_mismatch(
                    format!("{len} bytes at offset {offset}"),
                    format!("{} bytes of return data", self.data.len()),
                )
            })
    }

    /// Read a word that must hold an offset or length.
    fn read_usize(&self, offset: usize) -> Result<usize> {
        let word = self.slice(offset, WORD)?;
        let (high, low) = word.split_at(WORD - 8);
        if high.iter().any(|b| *b != 0) {
            return Err(Error::contract_mismatch(
                format!("offset or length word at {offset}"),
                format!("0x{}", hex::encode(word)),
            ));
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(low);
        usize::try_from(u64::from_be_bytes(buf)).map_err(|_| {
            Error::contract_mismatch("offset that fits in memory", format!("0x{}", hex::encode(word)))
        })
    }

    fn read_bytes(&self, offset: usize) -> Result<&'a [u8]> {
        let len = self.read_usize(offset)?;
        self.slice(offset + WORD, len)
    }

    fn read_bytes_array(&self, offset: usize) -> Result<Vec<&'a [u8]>> {
        let len = self.read_usize(offset)?;
        let base = offset + WORD;
        // Every element needs at least its head word; reject absurd lengths early.
        self.slice(base, len.saturating_mul(WORD))?;
        (0..len)
            .map(|i| {
                let relative = self.read_usize(base + i * WORD)?;
                let start = base.checked_add(relative).ok_or_else(|| {
                    Error::contract_mismatch("element offset in range", relative.to_string())
                })?;
                self.read_bytes(start)
            })
            .collect()
    }
}

/// Decode a single returned `bytes` value.
pub fn decode_bytes(data: &[u8]) -> Result<&[u8]> {
    if data.len() < 2 * WORD {
        return Err(Error::contract_mismatch(
            "a single ABI bytes value",
            format!("{} bytes of return data", data.len()),
        ));
    }
    let reader = Reader::new(data);
    let offset = reader.read_usize(0)?;
    reader.read_bytes(offset)
}

/// Decode a tuple of `arity` `bytes[]` columns.
///
/// The arity the contract actually returned is recovered from the first head
/// offset, which standard encoders place directly after the head.
pub fn decode_bytes_columns(data: &[u8], arity: usize) -> Result<Vec<Vec<&[u8]>>> {
    if data.is_empty() {
        return Err(Error::contract_mismatch(
            format!("{arity} bytes[] columns"),
            "empty return data",
        ));
    }
    let reader = Reader::new(data);
    let first = reader.read_usize(0)?;
    if first % WORD != 0 || first / WORD != arity {
        return Err(Error::contract_mismatch(
            format!("{arity} bytes[] columns"),
            format!("a tuple head of {first} bytes ({} columns)", first / WORD),
        ));
    }

    (0..arity)
        .map(|column| {
            let offset = reader.read_usize(column * WORD)?;
            reader.read_bytes_array(offset)
        })
        .collect()
}

/// Extract the message from an `Error(string)` revert payload.
#[must_use]
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    let payload = data.strip_prefix(&ERROR_STRING_SELECTOR)?;
    let reason = decode_bytes(payload).ok()?;
    String::from_utf8(reason.to_vec()).ok()
}

/// Parse `0x`-prefixed hex as returned by JSON-RPC nodes.
pub fn decode_hex(s: &str) -> std::result::Result<Vec<u8>, hex::FromHexError> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s))
}

#[must_use]
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
