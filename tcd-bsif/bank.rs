use std::collections::HashMap;
use std::path::Path;

use crate::error::{BsifError, BsifResult};

/// Kernel sizes the bank may hold; even effective sizes are served by
/// decimating the image and filtering at half size instead.
pub const KERNEL_SIZES: [usize; 8] = [3, 5, 7, 9, 11, 13, 15, 17];

pub const MIN_BIT_DEPTH: usize = 5;
pub const MAX_BIT_DEPTH: usize = 12;

const PACK_MAGIC: [u8; 4] = *b"BSFB";

/// One set of learned ICA kernels for a (kernel size, bit depth) pair.
///
/// Coefficients are stored flattened row-major as `[row][col][bit]` with the
/// bit index varying fastest, matching the layout of the learned filter
/// exports. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct FilterBankEntry {
    kernel_size: usize,
    bit_depth: usize,
    data: Vec<f64>,
}

impl FilterBankEntry {
    pub fn new(kernel_size: usize, bit_depth: usize, data: Vec<f64>) -> BsifResult<Self> {
        if !KERNEL_SIZES.contains(&kernel_size)
            || bit_depth < MIN_BIT_DEPTH
            || bit_depth > MAX_BIT_DEPTH
        {
            return Err(BsifError::UnknownFilterConfiguration { kernel_size, bit_depth });
        }
        let expected = kernel_size * kernel_size * bit_depth;
        if data.len() != expected {
            return Err(BsifError::MalformedFilterPack {
                reason: format!(
                    "entry {}x{}x{} holds {} coefficients, expected {}",
                    kernel_size,
                    kernel_size,
                    bit_depth,
                    data.len(),
                    expected
                ),
            });
        }
        Ok(Self { kernel_size, bit_depth, data })
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    pub fn bit_depth(&self) -> usize {
        self.bit_depth
    }

    #[inline]
    fn index(&self, row: usize, col: usize, bit: usize) -> usize {
        bit + self.bit_depth * (col + self.kernel_size * row)
    }

    pub fn coefficient(&self, row: usize, col: usize, bit: usize) -> f64 {
        self.data[self.index(row, col, bit)]
    }

    /// Extract the row-major 2-D kernel for one bit plane.
    pub fn kernel(&self, bit: usize) -> Vec<f64> {
        let s = self.kernel_size;
        let mut out = Vec::with_capacity(s * s);
        for row in 0..s {
            for col in 0..s {
                out.push(self.data[self.index(row, col, bit)]);
            }
        }
        out
    }
}

/// Immutable lookup table of filter bank entries keyed by (size, depth).
///
/// Loaded once at startup and shared read-only afterwards; lookups for a
/// combination outside the enumerated set fail with
/// [`BsifError::UnknownFilterConfiguration`].
#[derive(Debug, Default)]
pub struct FilterBank {
    entries: HashMap<(usize, usize), FilterBankEntry>,
}

impl FilterBank {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Add an entry, replacing any previous entry with the same key.
    pub fn insert(&mut self, entry: FilterBankEntry) {
        self.entries.insert((entry.kernel_size, entry.bit_depth), entry);
    }

    pub fn entry(&self, kernel_size: usize, bit_depth: usize) -> BsifResult<&FilterBankEntry> {
        self.entries
            .get(&(kernel_size, bit_depth))
            .ok_or(BsifError::UnknownFilterConfiguration { kernel_size, bit_depth })
    }

    pub fn contains(&self, kernel_size: usize, bit_depth: usize) -> bool {
        self.entries.contains_key(&(kernel_size, bit_depth))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a filter pack.
    ///
    /// Layout, all integers little-endian:
    /// magic `BSFB`, `u32` entry count, then per entry a `u32` kernel size,
    /// a `u32` bit depth and `size*size*depth` `f64` coefficients in
    /// `[row][col][bit]` order.
    pub fn from_bytes(bytes: &[u8]) -> BsifResult<Self> {
        let mut cursor = Cursor { bytes, pos: 0 };
        let magic = cursor.take(4)?;
        if magic != PACK_MAGIC {
            return Err(BsifError::MalformedFilterPack {
                reason: "bad magic, not a BSIF filter pack".to_string(),
            });
        }
        let count = cursor.read_u32()? as usize;
        let mut bank = FilterBank::new();
        for _ in 0..count {
            let kernel_size = cursor.read_u32()? as usize;
            let bit_depth = cursor.read_u32()? as usize;
            let len = kernel_size
                .checked_mul(kernel_size)
                .and_then(|n| n.checked_mul(bit_depth))
                .ok_or_else(|| BsifError::MalformedFilterPack {
                    reason: "entry dimensions overflow".to_string(),
                })?;
            let mut data = Vec::with_capacity(len);
            for _ in 0..len {
                data.push(cursor.read_f64()?);
            }
            bank.insert(FilterBankEntry::new(kernel_size, bit_depth, data)?);
        }
        if cursor.pos != bytes.len() {
            return Err(BsifError::MalformedFilterPack {
                reason: format!("{} trailing bytes after last entry", bytes.len() - cursor.pos),
            });
        }
        Ok(bank)
    }

    /// Serialize to the pack layout accepted by [`FilterBank::from_bytes`].
    /// Entries are emitted in ascending (size, depth) order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut keys: Vec<&(usize, usize)> = self.entries.keys().collect();
        keys.sort();
        let mut out = Vec::new();
        out.extend_from_slice(&PACK_MAGIC);
        out.extend_from_slice(&(keys.len() as u32).to_le_bytes());
        for key in keys {
            let entry = &self.entries[key];
            out.extend_from_slice(&(entry.kernel_size as u32).to_le_bytes());
            out.extend_from_slice(&(entry.bit_depth as u32).to_le_bytes());
            for &v in &entry.data {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        out
    }

    pub fn load<P: AsRef<Path>>(path: P) -> BsifResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> BsifResult<()> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> BsifResult<&'a [u8]> {
        if self.pos + n > self.bytes.len() {
            return Err(BsifError::MalformedFilterPack {
                reason: "unexpected end of filter pack".to_string(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u32(&mut self) -> BsifResult<u32> {
        let raw = self.take(4)?;
        Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn read_f64(&mut self) -> BsifResult<f64> {
        let raw = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(raw);
        Ok(f64::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_entry(size: usize, bits: usize) -> FilterBankEntry {
        let data: Vec<f64> = (0..size * size * bits).map(|i| i as f64 * 0.5).collect();
        FilterBankEntry::new(size, bits, data).unwrap()
    }

    #[test]
    fn entry_rejects_bad_dimensions() {
        // even kernel size
        let result = FilterBankEntry::new(4, 5, vec![0.0; 4 * 4 * 5]);
        assert!(matches!(result, Err(BsifError::UnknownFilterConfiguration { .. })));

        // bit depth out of range
        let result = FilterBankEntry::new(3, 4, vec![0.0; 3 * 3 * 4]);
        assert!(matches!(result, Err(BsifError::UnknownFilterConfiguration { .. })));

        // wrong coefficient count
        let result = FilterBankEntry::new(3, 5, vec![0.0; 10]);
        assert!(matches!(result, Err(BsifError::MalformedFilterPack { .. })));
    }

    #[test]
    fn kernel_extraction_follows_bit_fastest_layout() {
        let entry = ramp_entry(3, 5);
        let kernel = entry.kernel(2);
        assert_eq!(kernel.len(), 9);
        // coefficient at (row 1, col 2, bit 2) sits at 2 + 5*(2 + 3*1)
        assert_eq!(kernel[1 * 3 + 2], (2 + 5 * (2 + 3 * 1)) as f64 * 0.5);
        assert_eq!(entry.coefficient(1, 2, 2), kernel[1 * 3 + 2]);
    }

    #[test]
    fn lookup_misses_report_unknown_configuration() {
        let mut bank = FilterBank::new();
        bank.insert(ramp_entry(3, 5));
        assert!(bank.entry(3, 5).is_ok());
        let err = bank.entry(9, 8).unwrap_err();
        assert!(matches!(
            err,
            BsifError::UnknownFilterConfiguration { kernel_size: 9, bit_depth: 8 }
        ));
    }

    #[test]
    fn pack_round_trip() {
        let mut bank = FilterBank::new();
        bank.insert(ramp_entry(3, 5));
        bank.insert(ramp_entry(5, 7));

        let bytes = bank.to_bytes();
        let loaded = FilterBank::from_bytes(&bytes).unwrap();
        assert_eq!(loaded.len(), 2);
        let entry = loaded.entry(5, 7).unwrap();
        assert_eq!(entry.kernel(6), bank.entry(5, 7).unwrap().kernel(6));
    }

    #[test]
    fn pack_rejects_bad_magic_and_truncation() {
        let result = FilterBank::from_bytes(b"NOPE\x00\x00\x00\x00");
        assert!(matches!(result, Err(BsifError::MalformedFilterPack { .. })));

        let mut bank = FilterBank::new();
        bank.insert(ramp_entry(3, 5));
        let bytes = bank.to_bytes();
        let result = FilterBank::from_bytes(&bytes[..bytes.len() - 3]);
        assert!(matches!(result, Err(BsifError::MalformedFilterPack { .. })));

        let mut padded = bytes.clone();
        padded.extend_from_slice(&[0u8; 2]);
        let result = FilterBank::from_bytes(&padded);
        assert!(matches!(result, Err(BsifError::MalformedFilterPack { .. })));
    }
}
