//! Reading and writing corpus files
//!
//! Whole files are buffered and handed to [`conllu2trees`]. Files ending in
//! `.gz` are decompressed on the fly when the `gzip` feature is on.

use crate::conllu::conllu2trees;
use crate::error::ReadError;
use crate::tree::Tree;
use log::debug;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

#[cfg(feature = "gzip")]
use flate2::read::MultiGzDecoder;

pub fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

#[cfg(feature = "gzip")]
fn decoder(path: &Path, file: File) -> Box<dyn Read> {
    if is_gzip(path) {
        Box::new(MultiGzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    }
}

#[cfg(not(feature = "gzip"))]
fn decoder(_path: &Path, file: File) -> Box<dyn Read> {
    Box::new(BufReader::new(file))
}

/// Read a whole corpus file into memory
pub fn read_to_string(path: impl AsRef<Path>) -> Result<String, ReadError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut text = String::new();
    decoder(path, file).read_to_string(&mut text)?;
    debug!(
        "read {} bytes from {:?} (gzip: {})",
        text.len(),
        path,
        cfg!(feature = "gzip") && is_gzip(path)
    );
    Ok(text)
}

/// Read and parse a corpus file
pub fn read_trees(path: impl AsRef<Path>) -> Result<Vec<Tree>, ReadError> {
    let text = read_to_string(path)?;
    Ok(conllu2trees(&text)?)
}

/// Write trees as CoNLL-U, each followed by a blank line
pub fn write_trees<'a, W: Write>(
    mut writer: W,
    trees: impl IntoIterator<Item = &'a Tree>,
) -> io::Result<()> {
    for tree in trees {
        writer.write_all(tree.to_conllu().as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}
