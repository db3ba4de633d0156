//! Bech32 and Bech32m text codec.
//!
//! Implements BIP-173 and BIP-350: checksummed base-32 strings made of a
//! human-readable part (HRP), the separator `1`, and a data part of 5-bit
//! symbols. Nostr uses it for `npub`/`nsec`/`note` identifiers.
//!
//! Decoding validates case, character range, separator position, HRP
//! length and the checksum. Regrouping between 5-bit and 8-bit symbols
//! (`int5_to_8` / `int8_to_5`) enforces the padding rules that tell a
//! well-formed payload from a corrupted one.

use std::fmt;

/// The 32-symbol data alphabet, indexed by 5-bit value.
pub const ALPHABET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Separator between the HRP and the data part.
pub const SEPARATOR: char = '1';

/// Maximum HRP length in characters.
pub const MAX_HRP_LEN: usize = 83;

/// Number of trailing checksum symbols.
pub const CHECKSUM_LEN: usize = 6;

const GENERATOR: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];

/// A 5-bit value (0..=31), the unit of a bech32 data part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Int5(u8);

impl Int5 {
    pub const MAX: u8 = 31;

    /// Returns `None` if `value` does not fit in 5 bits.
    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Look up a (lowercase) data character in the alphabet.
    pub fn from_char(c: char) -> Option<Self> {
        if !c.is_ascii() {
            return None;
        }
        ALPHABET
            .iter()
            .position(|&symbol| symbol == c as u8)
            .map(|index| Self(index as u8))
    }

    pub fn to_char(self) -> char {
        ALPHABET[usize::from(self.0)] as char
    }
}

impl TryFrom<u8> for Int5 {
    type Error = Bech32Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(Bech32Error::InvalidInt5 { value })
    }
}

impl From<Int5> for u8 {
    fn from(value: Int5) -> Self {
        value.0
    }
}

/// Checksum variant of a bech32 string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// BIP-173, checksum constant 1.
    Bech32,
    /// BIP-350, checksum constant 0x2bc830a3.
    Bech32m,
    /// No checksum present; validation skipped.
    NoChecksum,
}

impl Encoding {
    /// The value the checksum polymod must produce for this variant.
    pub const fn constant(self) -> u32 {
        match self {
            Self::Bech32 => 1,
            Self::Bech32m => 0x2bc830a3,
            Self::NoChecksum => 0,
        }
    }

    fn from_polymod(residue: u32) -> Option<Self> {
        [Self::Bech32, Self::Bech32m]
            .into_iter()
            .find(|encoding| encoding.constant() == residue)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bech32 => write!(f, "bech32"),
            Self::Bech32m => write!(f, "bech32m"),
            Self::NoChecksum => write!(f, "bech32 (no checksum)"),
        }
    }
}

/// Bech32 decode/encode failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Bech32Error {
    #[error("mixed case strings are not valid bech32")]
    MixedCase,

    #[error("invalid character {character:?} at position {position}")]
    InvalidCharacter { position: usize, character: char },

    #[error("missing separator '1'")]
    MissingSeparator,

    #[error("hrp must contain 1 to 83 characters, got {len}")]
    InvalidHrpLength { len: usize },

    #[error("data part of {len} symbols is shorter than the checksum")]
    DataTooShort { len: usize },

    #[error("invalid checksum")]
    InvalidChecksum,

    #[error("zero-padding of more than 4 bits ({bits} bits left)")]
    ExcessPadding { bits: u32 },

    #[error("non-zero padding in 5-to-8 conversion")]
    NonZeroPadding,

    #[error("value {value} does not fit in 5 bits")]
    InvalidInt5 { value: u8 },
}

impl Bech32Error {
    /// Whether this is a regrouping padding failure rather than a format one.
    pub fn is_padding_error(&self) -> bool {
        matches!(self, Self::ExcessPadding { .. } | Self::NonZeroPadding)
    }
}

/// Result of [`decode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    /// Lowercase human-readable part.
    pub hrp: String,
    /// Data symbols, checksum stripped unless decoded with `no_checksum`.
    pub data: Vec<Int5>,
    pub encoding: Encoding,
}

/// Result of [`decode_bytes`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedBytes {
    pub hrp: String,
    pub bytes: Vec<u8>,
    pub encoding: Encoding,
}

/// Decode a bech32 or bech32m string.
///
/// With `no_checksum` the whole data part is returned untouched and the
/// encoding is [`Encoding::NoChecksum`]. Otherwise the checksum must match
/// one of the two known constants and the trailing six symbols are stripped.
pub fn decode(input: &str, no_checksum: bool) -> Result<Decoded, Bech32Error> {
    let has_lower = input.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = input.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(Bech32Error::MixedCase);
    }

    if let Some((position, character)) = input
        .char_indices()
        .find(|&(_, c)| !(33..=126).contains(&u32::from(c)))
    {
        return Err(Bech32Error::InvalidCharacter {
            position,
            character,
        });
    }

    let lower = input.to_ascii_lowercase();
    let pos = lower.rfind(SEPARATOR).ok_or(Bech32Error::MissingSeparator)?;
    let hrp = &lower[..pos];
    if hrp.is_empty() || hrp.len() > MAX_HRP_LEN {
        return Err(Bech32Error::InvalidHrpLength { len: hrp.len() });
    }

    let data_start = pos + SEPARATOR.len_utf8();
    let mut data = lower[data_start..]
        .char_indices()
        .map(|(i, c)| {
            Int5::from_char(c).ok_or(Bech32Error::InvalidCharacter {
                position: data_start + i,
                character: c,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if no_checksum {
        return Ok(Decoded {
            hrp: hrp.to_string(),
            data,
            encoding: Encoding::NoChecksum,
        });
    }

    if data.len() < CHECKSUM_LEN {
        return Err(Bech32Error::DataTooShort { len: data.len() });
    }

    let residue = polymod(expand_hrp(hrp).into_iter().chain(data.iter().map(|d| d.0)));
    let encoding = Encoding::from_polymod(residue).ok_or(Bech32Error::InvalidChecksum)?;

    data.truncate(data.len() - CHECKSUM_LEN);
    Ok(Decoded {
        hrp: hrp.to_string(),
        data,
        encoding,
    })
}

/// Decode a bech32 string and regroup its data part into bytes.
pub fn decode_bytes(input: &str, no_checksum: bool) -> Result<DecodedBytes, Bech32Error> {
    let decoded = decode(input, no_checksum)?;
    let bytes = int5_to_8(&decoded.data, 0)?;
    Ok(DecodedBytes {
        hrp: decoded.hrp,
        bytes,
        encoding: decoded.encoding,
    })
}

/// Regroup 5-bit symbols (from `offset` onward) into 8-bit bytes, MSB first.
///
/// At most 4 bits may be left over and they must all be zero.
pub fn int5_to_8(input: &[Int5], offset: usize) -> Result<Vec<u8>, Bech32Error> {
    let mut buffer: u32 = 0;
    let mut count: u32 = 0;
    let mut output = Vec::with_capacity(input.len().saturating_sub(offset) * 5 / 8);

    for symbol in input.iter().skip(offset) {
        // never more than 7 pending bits plus the new 5
        buffer = ((buffer << 5) | u32::from(symbol.0)) & 0xfff;
        count += 5;
        while count >= 8 {
            output.push(((buffer >> (count - 8)) & 0xff) as u8);
            count -= 8;
        }
    }

    if count > 4 {
        return Err(Bech32Error::ExcessPadding { bits: count });
    }
    if buffer & ((1 << count) - 1) != 0 {
        return Err(Bech32Error::NonZeroPadding);
    }
    Ok(output)
}

/// Regroup bytes into 5-bit symbols, zero-padding the final group.
pub fn int8_to_5(input: &[u8]) -> Vec<Int5> {
    let mut buffer: u32 = 0;
    let mut count: u32 = 0;
    let mut output = Vec::with_capacity((input.len() * 8).div_ceil(5));

    for &byte in input {
        buffer = ((buffer << 8) | u32::from(byte)) & 0xfff;
        count += 8;
        while count >= 5 {
            output.push(Int5(((buffer >> (count - 5)) & 31) as u8));
            count -= 5;
        }
    }

    if count > 0 {
        output.push(Int5(((buffer << (5 - count)) & 31) as u8));
    }
    output
}

/// Encode an HRP and data symbols, appending the checksum for `encoding`.
///
/// The output is always lowercase.
pub fn encode(hrp: &str, data: &[Int5], encoding: Encoding) -> Result<String, Bech32Error> {
    if hrp.is_empty() || hrp.len() > MAX_HRP_LEN {
        return Err(Bech32Error::InvalidHrpLength { len: hrp.len() });
    }
    if let Some((position, character)) = hrp
        .char_indices()
        .find(|&(_, c)| !(33..=126).contains(&u32::from(c)))
    {
        return Err(Bech32Error::InvalidCharacter {
            position,
            character,
        });
    }
    if hrp.chars().any(|c| c.is_ascii_lowercase()) && hrp.chars().any(|c| c.is_ascii_uppercase())
    {
        return Err(Bech32Error::MixedCase);
    }

    let hrp = hrp.to_ascii_lowercase();
    let mut output = String::with_capacity(hrp.len() + 1 + data.len() + CHECKSUM_LEN);
    output.push_str(&hrp);
    output.push(SEPARATOR);
    output.extend(data.iter().map(|d| d.to_char()));

    if encoding != Encoding::NoChecksum {
        let residue = polymod(
            expand_hrp(&hrp)
                .into_iter()
                .chain(data.iter().map(|d| d.0))
                .chain([0u8; CHECKSUM_LEN]),
        ) ^ encoding.constant();
        for i in 0..CHECKSUM_LEN {
            let symbol = (residue >> (5 * (CHECKSUM_LEN - 1 - i))) & 31;
            output.push(Int5(symbol as u8).to_char());
        }
    }

    Ok(output)
}

/// Encode raw bytes under `hrp`.
pub fn encode_bytes(hrp: &str, bytes: &[u8], encoding: Encoding) -> Result<String, Bech32Error> {
    encode(hrp, &int8_to_5(bytes), encoding)
}

/// HRP expansion: high 3 bits of each byte, a zero, then the low 5 bits.
fn expand_hrp(hrp: &str) -> Vec<u8> {
    let bytes = hrp.as_bytes();
    let mut expanded = Vec::with_capacity(bytes.len() * 2 + 1);
    expanded.extend(bytes.iter().map(|b| b >> 5));
    expanded.push(0);
    expanded.extend(bytes.iter().map(|b| b & 31));
    expanded
}

fn polymod(values: impl IntoIterator<Item = u8>) -> u32 {
    let mut chk: u32 = 1;
    for value in values {
        let top = chk >> 25;
        chk = ((chk & 0x1ff_ffff) << 5) ^ u32::from(value);
        for (i, generator) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= generator;
            }
        }
    }
    chk
}
