use std::io::{BufReader, Cursor, Read};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use quartz_nbt::io::{Flavor, NbtIoError};
use quartz_nbt::NbtCompound;
use thiserror::Error;
use tracing::debug;

use crate::document::{Document, REGIONS};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("NBT error: {0}")]
    Nbt(#[from] NbtIoError),
    #[error("not a litematic: missing '{0}'")]
    MissingField(&'static str),
}

pub type Result<T> = std::result::Result<T, FormatError>;

fn read_root(data: &[u8]) -> Result<(NbtCompound, String)> {
    // Litematica writes gzip; uncompressed trees are accepted as well.
    let mut reader: Box<dyn Read + '_> = if data.starts_with(&GZIP_MAGIC) {
        Box::new(GzDecoder::new(BufReader::new(data)))
    } else {
        Box::new(Cursor::new(data))
    };
    Ok(quartz_nbt::io::read_nbt(&mut reader, Flavor::Uncompressed)?)
}

pub fn is_litematic(data: &[u8]) -> bool {
    let (root, _) = match read_root(data) {
        Ok(result) => result,
        Err(_) => return false,
    };

    root.get::<_, i32>("Version").is_ok()
        && root.get::<_, &NbtCompound>("Metadata").is_ok()
        && root.get::<_, &NbtCompound>(REGIONS).is_ok()
}

pub fn from_litematic(data: &[u8]) -> Result<Document> {
    let (root, root_name) = read_root(data)?;
    let regions = root
        .get::<_, &NbtCompound>(REGIONS)
        .map_err(|_| FormatError::MissingField(REGIONS))?
        .inner()
        .len();

    debug!(bytes = data.len(), regions, "decoded litematic");
    Ok(Document::with_root_name(root_name, root))
}

pub fn to_litematic(document: &Document) -> Result<Vec<u8>> {
    to_litematic_with_compression(document, Compression::default())
}

pub fn to_litematic_with_compression(document: &Document, compression: Compression) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), compression);
    quartz_nbt::io::write_nbt(&mut encoder, Some(document.root_name()), document.root(), Flavor::Uncompressed)?;
    Ok(encoder.finish()?)
}
