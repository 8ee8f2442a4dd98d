//! WOFF 1.0 wrapping of a finished sfnt.

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::sfnt::SfntTable;
use super::ContainerError;

const WOFF_SIGNATURE: u32 = 0x774F_4646; // 'wOFF'
const SFNT_VERSION: u32 = 0x0001_0000;
const HEADER_SIZE: usize = 44;
const ENTRY_SIZE: usize = 20;

/// Wrap the tables of a built sfnt as WOFF.
///
/// Each table is stored zlib-compressed only when that makes it smaller.
pub(super) fn encode(
    tables: &[SfntTable],
    sfnt_size: usize,
    major: u16,
    minor: u16,
) -> Result<Vec<u8>, ContainerError> {
    let mut stored = Vec::with_capacity(tables.len());
    for table in tables {
        let compressed = compress(&table.data)?;
        if compressed.len() < table.data.len() {
            stored.push(compressed);
        } else {
            stored.push(table.data.clone());
        }
    }

    let data_size: usize = stored.iter().map(|d| padded_len(d.len())).sum();
    let total = HEADER_SIZE + ENTRY_SIZE * tables.len() + data_size;

    let mut out = Vec::with_capacity(total);
    out.write_u32::<BigEndian>(WOFF_SIGNATURE)?;
    out.write_u32::<BigEndian>(SFNT_VERSION)?;
    out.write_u32::<BigEndian>(total as u32)?;
    out.write_u16::<BigEndian>(tables.len() as u16)?;
    out.write_u16::<BigEndian>(0)?; // reserved
    out.write_u32::<BigEndian>(sfnt_size as u32)?;
    out.write_u16::<BigEndian>(major)?;
    out.write_u16::<BigEndian>(minor)?;
    for _ in 0..5 {
        out.write_u32::<BigEndian>(0)?; // metadata and private blocks
    }

    let mut offset = HEADER_SIZE + ENTRY_SIZE * tables.len();
    for (table, data) in tables.iter().zip(&stored) {
        out.extend_from_slice(&table.tag);
        out.write_u32::<BigEndian>(offset as u32)?;
        out.write_u32::<BigEndian>(data.len() as u32)?;
        out.write_u32::<BigEndian>(table.data.len() as u32)?;
        out.write_u32::<BigEndian>(table.checksum)?;
        offset += padded_len(data.len());
    }
    for data in &stored {
        out.extend_from_slice(data);
        out.resize(padded_len(out.len()), 0);
    }

    Ok(out)
}

fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

pub(super) fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use byteorder::ByteOrder;
    use flate2::read::ZlibDecoder;

    use super::super::sfnt::read_tables;
    use super::super::sfnt::tests::{find_table, sample_tables};
    use super::*;
    use crate::container::{Flavor, FontContainer, SfntContainer};

    #[test]
    fn test_header() {
        let tables = sample_tables(true);
        let ttf = SfntContainer.encode(&tables, Flavor::Ttf).unwrap();
        let woff = SfntContainer.encode(&tables, Flavor::Woff).unwrap();

        assert_eq!(&woff[0..4], b"wOFF");
        assert_eq!(BigEndian::read_u32(&woff[8..12]) as usize, woff.len());
        assert_eq!(BigEndian::read_u16(&woff[12..14]), 12);
        assert_eq!(BigEndian::read_u32(&woff[16..20]) as usize, ttf.len());
    }

    #[test]
    fn test_tables_round_trip_to_sfnt_data() {
        let tables = sample_tables(true);
        let ttf = SfntContainer.encode(&tables, Flavor::Ttf).unwrap();
        let woff = SfntContainer.encode(&tables, Flavor::Woff).unwrap();
        let directory = read_tables(&ttf).unwrap();

        let count = BigEndian::read_u16(&woff[12..14]) as usize;
        for i in 0..count {
            let entry = &woff[HEADER_SIZE + i * ENTRY_SIZE..HEADER_SIZE + (i + 1) * ENTRY_SIZE];
            let tag: [u8; 4] = entry[0..4].try_into().unwrap();
            let offset = BigEndian::read_u32(&entry[4..8]) as usize;
            let comp_len = BigEndian::read_u32(&entry[8..12]) as usize;
            let orig_len = BigEndian::read_u32(&entry[12..16]) as usize;

            let stored = &woff[offset..offset + comp_len];
            let data = if comp_len < orig_len {
                let mut out = Vec::new();
                ZlibDecoder::new(stored).read_to_end(&mut out).unwrap();
                out
            } else {
                stored.to_vec()
            };

            assert_eq!(data.as_slice(), find_table(&ttf, &tag).unwrap());
            let record = directory.iter().find(|t| t.tag == tag).unwrap();
            assert_eq!(BigEndian::read_u32(&entry[16..20]), record.checksum);
        }
    }

    #[test]
    fn test_incompressible_table_stored_raw() {
        let table = SfntTable {
            tag: *b"test",
            checksum: 0x0102_0304,
            data: vec![1, 2, 3, 4],
        };
        let woff = encode(&[table], 16, 1, 0).unwrap();
        let entry = &woff[HEADER_SIZE..HEADER_SIZE + ENTRY_SIZE];
        assert_eq!(BigEndian::read_u32(&entry[8..12]), 4);
        assert_eq!(BigEndian::read_u32(&entry[16..20]), 0x0102_0304);
        assert_eq!(&woff[HEADER_SIZE + ENTRY_SIZE..], &[1, 2, 3, 4]);
    }
}
