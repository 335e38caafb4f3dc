use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use sha2::{Digest, Sha256};

use crate::error::ShardError;
use crate::header::Header;
use crate::result::Result;

/// the minimum number of fragments a file is split into
pub const MIN_FRAGMENTS: usize = 3;
/// file name of the sidecar holding the hex digest of the original content
pub const DIGEST_SIDECAR: &str = "sha256_original.txt";
const FRAGMENT_PREFIX: &str = "part_";
const FRAGMENT_EXTENSION: &str = "bin";

/// One numbered chunk of a larger file.
///
/// `index` is 1-based and never exceeds `total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub index: u32,
    pub total: u32,
    pub payload: Vec<u8>,
}

impl Fragment {
    pub fn new(index: u32, total: u32, payload: Vec<u8>) -> Self {
        Self {
            index,
            total,
            payload,
        }
    }

    pub fn len(&self) -> u64 {
        self.payload.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn header(&self) -> Header {
        Header::new(self.index, self.total, self.len())
    }

    /// header followed by the payload, as it is hidden in a carrier
    pub fn to_wire(&self) -> Result<Vec<u8>> {
        let mut buf = self.header().encode()?;
        buf.extend_from_slice(&self.payload);
        Ok(buf)
    }

    /// Numbers the chunks of one split, starting at 1.
    pub fn from_chunks(chunks: Vec<Vec<u8>>) -> Vec<Fragment> {
        let total = chunks.len() as u32;
        chunks
            .into_iter()
            .enumerate()
            .map(|(i, payload)| Fragment::new(i as u32 + 1, total, payload))
            .collect()
    }
}

/// Splits `data` into `n` contiguous chunks of `ceil(len / n)` bytes, the last ones may be shorter or empty.
pub fn split(data: &[u8], n: usize) -> Result<Vec<Vec<u8>>> {
    if n < MIN_FRAGMENTS {
        return Err(ShardError::InvalidFragmentCount(n));
    }
    if data.is_empty() {
        return Ok(vec![Vec::new(); n]);
    }

    let chunk_size = data.len().div_ceil(n);
    Ok((0..n)
        .map(|i| {
            let start = (i * chunk_size).min(data.len());
            let end = ((i + 1) * chunk_size).min(data.len());
            data[start..end].to_vec()
        })
        .collect())
}

/// hex encoded SHA-256 of `data`
pub fn digest(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[derive(Debug, PartialEq, Eq)]
pub struct SplitReport {
    pub files: Vec<PathBuf>,
    pub chunk_sizes: Vec<usize>,
    pub digest: String,
}

/// Reads `source`, splits it into `n` fragment files below `out_dir` and stores the digest sidecar next to them.
pub fn split_file(source: &Path, out_dir: &Path, n: usize) -> Result<SplitReport> {
    if n < MIN_FRAGMENTS {
        return Err(ShardError::InvalidFragmentCount(n));
    }
    if !source.is_file() {
        return Err(ShardError::SourceNotFound(source.to_path_buf()));
    }

    let data = fs::read(source).map_err(|source| ShardError::ReadError { source })?;
    let digest = digest(&data);
    let chunks = split(&data, n)?;

    if chunks.concat() != data {
        return Err(ShardError::SplitVerificationFailed);
    }
    debug!("split self-test passed for {} bytes", data.len());

    let files = write_fragments(out_dir, &chunks, &digest)?;
    info!(
        "split {:?} into {} fragments in {:?}, sha256 {}",
        source,
        n,
        out_dir,
        digest
    );

    Ok(SplitReport {
        files,
        chunk_sizes: chunks.iter().map(Vec::len).collect(),
        digest,
    })
}

/// Writes `part_<i>.bin` for every chunk plus the digest sidecar.
pub fn write_fragments(dir: &Path, chunks: &[Vec<u8>], digest: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| ShardError::WriteError { source })?;

    let mut files = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let path = dir.join(fragment_file_name(i + 1));
        fs::write(&path, chunk).map_err(|source| ShardError::WriteError { source })?;
        debug!("wrote {:?} ({} bytes)", path, chunk.len());
        files.push(path);
    }

    fs::write(dir.join(DIGEST_SIDECAR), format!("{digest}\n"))
        .map_err(|source| ShardError::WriteError { source })?;

    Ok(files)
}

pub fn fragment_file_name(index: usize) -> String {
    format!("{FRAGMENT_PREFIX}{index}.{FRAGMENT_EXTENSION}")
}

/// Lists the fragment files of `dir` in natural order, so `part_2` comes before `part_10`.
pub fn list_fragment_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ShardError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_fragment_file(p))
        .collect();
    files.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));

    Ok(files)
}

/// the digest stored next to the fragments, if there is one
pub fn read_digest_sidecar(dir: &Path) -> Result<Option<String>> {
    read_digest_file(&dir.join(DIGEST_SIDECAR))
}

pub fn read_digest_file(file: &Path) -> Result<Option<String>> {
    if !file.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(file).map_err(|source| ShardError::ReadError { source })?;
    Ok(Some(content.trim().to_string()))
}

fn is_fragment_file(path: &Path) -> bool {
    let extension_matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(FRAGMENT_EXTENSION));

    extension_matches && file_name(path).starts_with(FRAGMENT_PREFIX)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum NaturalPart {
    Text(String),
    Number(u128),
}

fn natural_key(name: &str) -> Vec<NaturalPart> {
    let mut parts = Vec::new();
    let mut rest = name;
    while let Some(c) = rest.chars().next() {
        let is_digit = c.is_ascii_digit();
        let end = rest
            .find(|ch: char| ch.is_ascii_digit() != is_digit)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        parts.push(match run.parse() {
            Ok(n) if is_digit => NaturalPart::Number(n),
            _ => NaturalPart::Text(run.to_string()),
        });
        rest = tail;
    }
    parts
}

/// compares file names treating digit runs as numbers
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b))
}
