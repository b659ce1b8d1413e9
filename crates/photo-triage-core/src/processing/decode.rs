use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;

use crate::error::DecodeError;

/// Load an image from disk with its EXIF orientation applied.
///
/// The format is sniffed from the file contents, so a PNG saved with a
/// `.jpg` extension still decodes.
pub fn decode_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage, DecodeError> {
    let path = path.as_ref();

    let bytes = std::fs::read(path).map_err(|source| DecodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let img = image::load_from_memory(&bytes).map_err(|source| DecodeError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(apply_orientation(img, read_orientation(&bytes)))
}

/// EXIF orientation tag from raw file bytes; 1 (upright) when absent.
pub fn read_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(_) => return 1,
    };

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(1)
}

/// Rotate/flip so the image displays upright.
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}
