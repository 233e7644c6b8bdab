// pgm.rs - Binary PGM (P5) images on disk

use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::io::{Image, ImageStore};

/// Reads `<input>/<name>.pgm` and writes `<output>/<name>.pgm`.
#[derive(Debug, Clone)]
pub struct PgmDir {
    input: PathBuf,
    output: PathBuf,
}

impl PgmDir {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

impl ImageStore for PgmDir {
    fn load(&mut self, filename: &str) -> Result<Image> {
        let bytes = fs::read(self.input.join(format!("{filename}.pgm")))?;
        let (width, height, pixels) = decode(&bytes)?;
        Ok(Image { width, height, pixels })
    }

    fn save(&mut self, filename: &str, width: usize, height: usize, pixels: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.output)?;
        fs::write(
            self.output.join(format!("{filename}.pgm")),
            encode(width, height, pixels),
        )?;
        Ok(())
    }
}

pub fn encode(width: usize, height: usize, pixels: &[u8]) -> Vec<u8> {
    let mut out = format!("P5\n{width} {height}\n255\n").into_bytes();
    out.extend_from_slice(pixels);
    out
}

/// Parses a P5 image with a max value of 255, returning `(width, height, pixels)`.
pub fn decode(bytes: &[u8]) -> Result<(usize, usize, Vec<u8>)> {
    let mut pos = 0;
    let mut fields = [0usize; 3];

    if next_token(bytes, &mut pos)? != b"P5" {
        return Err(Error::Pgm("missing P5 magic number".into()));
    }
    for field in fields.iter_mut() {
        let token = next_token(bytes, &mut pos)?;
        *field = std::str::from_utf8(token)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::Pgm(format!("bad header field {:?}", String::from_utf8_lossy(token))))?;
    }
    let [width, height, max] = fields;
    if max != 255 {
        return Err(Error::Pgm(format!("unsupported max value {max}")));
    }

    // Exactly one whitespace byte separates the header from the raster.
    let start = pos + 1;
    let end = width
        .checked_mul(height)
        .and_then(|n| n.checked_add(start))
        .ok_or_else(|| Error::Pgm(format!("image size {width}x{height} is too large")))?;
    if end > bytes.len() {
        return Err(Error::Pgm(format!(
            "expected {} pixels, found {}",
            end - start,
            bytes.len().saturating_sub(start)
        )));
    }
    Ok((width, height, bytes[start..end].to_vec()))
}

/// Returns the next whitespace-delimited header token, skipping `#` comments.
fn next_token<'a>(bytes: &'a [u8], pos: &mut usize) -> Result<&'a [u8]> {
    loop {
        while *pos < bytes.len() && bytes[*pos].is_ascii_whitespace() {
            *pos += 1;
        }
        if *pos < bytes.len() && bytes[*pos] == b'#' {
            while *pos < bytes.len() && bytes[*pos] != b'\n' {
                *pos += 1;
            }
            continue;
        }
        break;
    }
    let start = *pos;
    while *pos < bytes.len() && !bytes[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    if start == *pos {
        return Err(Error::Pgm("truncated header".into()));
    }
    Ok(&bytes[start..*pos])
}
