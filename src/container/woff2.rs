//! WOFF 2.0 wrapping of a finished sfnt.
//!
//! Tables go into a single brotli stream. `glyf` and `loca` are stored with
//! the null transform, so decoders get them back byte for byte.

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use super::sfnt::SfntTable;
use super::woff::padded_len;
use super::ContainerError;

const WOFF2_SIGNATURE: u32 = 0x774F_4632; // 'wOF2'
const SFNT_VERSION: u32 = 0x0001_0000;
const HEADER_SIZE: usize = 48;

const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: u32 = 11;
const BROTLI_WINDOW: u32 = 22;

/// Transform version 3 is the null transform for `glyf` and `loca`.
const NULL_TRANSFORM: u8 = 3 << 6;
/// Flag value announcing an explicit tag after the flags byte.
const ARBITRARY_TAG: u8 = 0x3F;

/// Tags with a one-byte code in the table directory, by code.
const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm",
    b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern",
    b"LTSH", b"PCLT", b"VDMX", b"vhea", b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC",
    b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar", b"gvar", b"hsty",
    b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];

/// Wrap the tables of a built sfnt as WOFF2.
pub(super) fn encode(
    tables: &[SfntTable],
    sfnt_size: usize,
    major: u16,
    minor: u16,
) -> Result<Vec<u8>, ContainerError> {
    let mut directory = Vec::new();
    for table in tables {
        write_entry(&mut directory, table)?;
    }

    let mut stream = Vec::with_capacity(tables.iter().map(|t| t.data.len()).sum());
    for table in tables {
        stream.extend_from_slice(&table.data);
    }
    let compressed = compress(&stream)?;

    let unpadded = HEADER_SIZE + directory.len() + compressed.len();
    let total = padded_len(unpadded);

    let mut out = Vec::with_capacity(total);
    out.write_u32::<BigEndian>(WOFF2_SIGNATURE)?;
    out.write_u32::<BigEndian>(SFNT_VERSION)?;
    out.write_u32::<BigEndian>(total as u32)?;
    out.write_u16::<BigEndian>(tables.len() as u16)?;
    out.write_u16::<BigEndian>(0)?; // reserved
    out.write_u32::<BigEndian>(sfnt_size as u32)?;
    out.write_u32::<BigEndian>(compressed.len() as u32)?;
    out.write_u16::<BigEndian>(major)?;
    out.write_u16::<BigEndian>(minor)?;
    for _ in 0..5 {
        out.write_u32::<BigEndian>(0)?; // metadata and private blocks
    }
    out.extend_from_slice(&directory);
    out.extend_from_slice(&compressed);
    out.resize(total, 0);

    Ok(out)
}

fn write_entry(out: &mut Vec<u8>, table: &SfntTable) -> Result<(), ContainerError> {
    let known = KNOWN_TAGS.iter().position(|tag| **tag == table.tag);
    let mut flags = known.map_or(ARBITRARY_TAG, |index| index as u8);
    if &table.tag == b"glyf" || &table.tag == b"loca" {
        flags |= NULL_TRANSFORM;
    }

    out.write_u8(flags)?;
    if known.is_none() {
        out.extend_from_slice(&table.tag);
    }
    let length = u32::try_from(table.data.len())
        .map_err(|_| ContainerError::TableTooLarge("woff2 directory"))?;
    write_base128(out, length);
    Ok(())
}

/// UIntBase128: big-endian groups of seven bits, high bit set on all but
/// the last byte.
fn write_base128(out: &mut Vec<u8>, value: u32) {
    let groups = (1..5).take_while(|i| value >> (7 * i) != 0).count() + 1;
    for i in (0..groups).rev() {
        let mut byte = ((value >> (7 * i)) & 0x7F) as u8;
        if i != 0 {
            byte |= 0x80;
        }
        out.push(byte);
    }
}

fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut writer =
        brotli::CompressorWriter::new(Vec::new(), BROTLI_BUFFER, BROTLI_QUALITY, BROTLI_WINDOW);
    writer.write_all(data)?;
    writer.flush()?;
    Ok(writer.into_inner())
}
