// lzw.rs
//
// Copyright (c) 2025  Douglas Lau
//
//! Lempel-Ziv-Welch compression for GIF
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Maximum code width, in bits
const MAX_WIDTH: u8 = 12;

/// Dictionary capacity
const DICT_SZ: usize = 1 << MAX_WIDTH;

/// Code type
type Code = u16;

/// Check a minimum code size (must be 2 to 8 for GIF)
fn check_min_code_bits(min_code_bits: u8) -> Result<u8> {
    if (2..=8).contains(&min_code_bits) {
        Ok(min_code_bits)
    } else {
        Err(Error::InvalidCodeSize(min_code_bits))
    }
}

/// Writer packing variable-width codes, least significant bit first
#[derive(Debug, Default)]
struct BitWriter {
    /// Accumulated bits, not yet full bytes
    acc: u32,
    /// Number of bits accumulated
    len: u8,
}

impl BitWriter {
    /// Write one code
    fn write(&mut self, code: Code, width: u8, buffer: &mut Vec<u8>) {
        self.acc |= u32::from(code) << self.len;
        self.len += width;
        while self.len >= 8 {
            buffer.push(self.acc as u8);
            self.acc >>= 8;
            self.len -= 8;
        }
    }

    /// Flush a partial byte
    fn flush(&mut self, buffer: &mut Vec<u8>) {
        if self.len > 0 {
            buffer.push(self.acc as u8);
            self.acc = 0;
            self.len = 0;
        }
    }
}

/// Reader unpacking variable-width codes, least significant bit first
struct BitReader<'a> {
    /// Remaining input bytes
    bytes: &'a [u8],
    /// Accumulated bits
    acc: u32,
    /// Number of bits accumulated
    len: u8,
}

impl<'a> BitReader<'a> {
    /// Create a new bit reader
    fn new(bytes: &'a [u8]) -> Self {
        BitReader {
            bytes,
            acc: 0,
            len: 0,
        }
    }

    /// Read one code, or `None` when the input is exhausted
    fn read(&mut self, width: u8) -> Option<Code> {
        while self.len < width {
            let (byte, rest) = self.bytes.split_first()?;
            self.acc |= u32::from(*byte) << self.len;
            self.len += 8;
            self.bytes = rest;
        }
        let code = (self.acc & ((1 << u32::from(width)) - 1)) as Code;
        self.acc >>= width;
        self.len -= width;
        Some(code)
    }
}

/// LZW Data Compressor
pub struct Compressor {
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code width
    width: u8,
    /// Clear code
    clear: Code,
    /// End code
    end: Code,
    /// Dictionary: (prefix code, suffix byte) to code
    dict: HashMap<(Code, u8), Code>,
    /// Next code to be assigned
    next_code: Code,
    /// Output bit packer
    bits: BitWriter,
}

impl Compressor {
    /// Create a new compressor
    pub fn new(min_code_bits: u8) -> Result<Self> {
        let min_code_bits = check_min_code_bits(min_code_bits)?;
        let clear = 1 << min_code_bits;
        Ok(Compressor {
            min_code_bits,
            width: min_code_bits + 1,
            clear,
            end: clear + 1,
            dict: HashMap::with_capacity(DICT_SZ),
            next_code: clear + 2,
            bits: BitWriter::default(),
        })
    }

    /// Write one code to a buffer
    fn write(&mut self, code: Code, buffer: &mut Vec<u8>) {
        self.bits.write(code, self.width, buffer);
    }

    /// Reset the dictionary after a clear code
    fn reset(&mut self) {
        self.dict.clear();
        self.next_code = self.clear + 2;
        self.width = self.min_code_bits + 1;
    }

    /// Compress a byte buffer.
    ///
    /// A clear code is written first; when the dictionary fills up, another
    /// clear code resets it.  The end code and any partial byte are written
    /// last.
    pub fn compress(&mut self, bytes: &[u8], buffer: &mut Vec<u8>) {
        self.write(self.clear, buffer);
        let mut prefix: Option<Code> = None;
        for byte in bytes {
            prefix = Some(match prefix {
                None => Code::from(*byte),
                Some(p) => match self.dict.get(&(p, *byte)).copied() {
                    Some(code) => code,
                    None => {
                        self.write(p, buffer);
                        self.add_entry(p, *byte, buffer);
                        Code::from(*byte)
                    }
                },
            });
        }
        if let Some(p) = prefix {
            self.write(p, buffer);
        }
        self.write(self.end, buffer);
        self.bits.flush(buffer);
    }

    /// Add a dictionary entry, clearing when full
    fn add_entry(&mut self, prefix: Code, suffix: u8, buffer: &mut Vec<u8>) {
        if usize::from(self.next_code) < DICT_SZ {
            self.dict.insert((prefix, suffix), self.next_code);
            // widen once codes reach the current range
            if self.next_code == 1 << self.width && self.width < MAX_WIDTH {
                self.width += 1;
            }
            self.next_code += 1;
        } else {
            self.write(self.clear, buffer);
            self.reset();
        }
    }
}

/// LZW Data Decompressor
///
/// The dictionary is three flat arrays indexed by code: the prefix code,
/// the suffix byte, and the first byte of the full string.
#[derive(Debug)]
pub struct Decompressor {
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code width
    width: u8,
    /// Clear code
    clear: Code,
    /// End code
    end: Code,
    /// Prefix code of each entry (unused for roots)
    prefix: Vec<Code>,
    /// Suffix byte of each entry
    suffix: Vec<u8>,
    /// First byte of each entry's string
    head: Vec<u8>,
    /// Previous code
    prev: Option<Code>,
    /// Has the end code been reached?
    ended: bool,
}

impl Decompressor {
    /// Create a new decompressor
    pub fn new(min_code_bits: u8) -> Result<Self> {
        let min_code_bits = check_min_code_bits(min_code_bits)?;
        let clear = 1 << min_code_bits;
        let mut dec = Decompressor {
            min_code_bits,
            width: min_code_bits + 1,
            clear,
            end: clear + 1,
            prefix: Vec::with_capacity(DICT_SZ),
            suffix: Vec::with_capacity(DICT_SZ),
            head: Vec::with_capacity(DICT_SZ),
            prev: None,
            ended: false,
        };
        dec.reset();
        Ok(dec)
    }

    /// Has the end code been reached?
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Reset the dictionary after a clear code
    fn reset(&mut self) {
        self.prefix.clear();
        self.suffix.clear();
        self.head.clear();
        for b in 0..self.clear {
            self.prefix.push(0);
            self.suffix.push(b as u8);
            self.head.push(b as u8);
        }
        // slots for the clear and end codes hold no data
        for _ in 0..2 {
            self.prefix.push(0);
            self.suffix.push(0);
            self.head.push(0);
        }
        self.width = self.min_code_bits + 1;
        self.prev = None;
    }

    /// Get the number of dictionary entries
    fn entries(&self) -> Code {
        self.prefix.len() as Code
    }

    /// Add a dictionary entry, unless the dictionary is full
    fn add_entry(&mut self, prefix: Code, suffix: u8) {
        if self.prefix.len() < DICT_SZ {
            let head = self.head[usize::from(prefix)];
            self.prefix.push(prefix);
            self.suffix.push(suffix);
            self.head.push(head);
            // widen once codes reach the current range
            if self.prefix.len() == 1 << self.width && self.width < MAX_WIDTH
            {
                self.width += 1;
            }
        }
    }

    /// Write the string for a code to a buffer.
    ///
    /// Suffix bytes are pushed while walking the prefix chain, then the
    /// string is reversed in place.
    fn emit(&self, code: Code, buffer: &mut Vec<u8>) {
        let start = buffer.len();
        let mut c = usize::from(code);
        while c > usize::from(self.end) {
            buffer.push(self.suffix[c]);
            c = usize::from(self.prefix[c]);
        }
        buffer.push(self.suffix[c]);
        buffer[start..].reverse();
    }

    /// Decompress a byte buffer.
    ///
    /// Decoding stops once `sz` bytes have been produced or the end code is
    /// reached; remaining input is ignored.
    pub fn decompress(
        &mut self,
        bytes: &[u8],
        buffer: &mut Vec<u8>,
        sz: usize,
    ) -> Result<()> {
        let mut bits = BitReader::new(bytes);
        while !self.ended && buffer.len() < sz {
            match bits.read(self.width) {
                Some(code) => self.decompress_code(code, buffer)?,
                None => break,
            }
        }
        Ok(())
    }

    /// Decompress one code
    fn decompress_code(
        &mut self,
        code: Code,
        buffer: &mut Vec<u8>,
    ) -> Result<()> {
        if code == self.clear {
            self.reset();
            return Ok(());
        }
        if code == self.end {
            self.ended = true;
            return Ok(());
        }
        match self.prev {
            None => {
                // only a root may follow a clear code
                if code >= self.clear {
                    return Err(Error::InvalidLzwData(
                        "first code is not a root",
                    ));
                }
                buffer.push(code as u8);
            }
            Some(prev) => {
                if code < self.entries() {
                    let head = self.head[usize::from(code)];
                    self.add_entry(prev, head);
                    self.emit(code, buffer);
                } else if code == self.entries() {
                    // the code being defined by this step
                    let head = self.head[usize::from(prev)];
                    self.add_entry(prev, head);
                    self.emit(code, buffer);
                } else {
                    return Err(Error::InvalidLzwData(
                        "code exceeds dictionary",
                    ));
                }
            }
        }
        self.prev = Some(code);
        Ok(())
    }
}
