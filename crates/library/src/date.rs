//! Capture dates.
//!
//! Photos carry the moment they were taken in their EXIF `DateTimeOriginal`
//! tag. Videos (and photos without usable EXIF data) fall back to the file's
//! last-modified time, which cameras set when recording.

use crate::scan::FileType;
use exif::{In, Reader, Tag, Value};
use mediaport_storage::error::Result;
use mediaport_storage::{FileInfo, StorageBackend};
use std::io::BufReader;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{PrimitiveDateTime, UtcOffset};
use tracing::instrument;

const EXIF_DATETIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]:[month]:[day] [hour]:[minute]:[second]");

/// Where a [`CaptureDate`] was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateSource {
    Exif,
    Modified,
}

/// When a media file was captured, in camera-local time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureDate {
    pub taken: PrimitiveDateTime,
    pub source: DateSource,
}

/// Determine when `file` was captured.
///
/// Images are opened to look for EXIF data. Anything unusable in there (no
/// EXIF block, no `DateTimeOriginal`, a malformed value) silently falls back to
/// the modification time. Only failing to open the file is an error.
#[instrument(level = "debug", skip_all, fields(path = %file.path.display(), filetype = %filetype))]
pub fn capture_date(backend: &dyn StorageBackend, file: &FileInfo, filetype: FileType) -> Result<CaptureDate> {
    if filetype == FileType::Image {
        let mut reader = BufReader::new(backend.reader(&file.path)?);
        match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => match date_time_original(&exif) {
                Some(taken) => return Ok(CaptureDate { taken, source: DateSource::Exif }),
                None => tracing::debug!("No usable DateTimeOriginal, using modification time"),
            },
            Err(e) => tracing::debug!(error = %e, "No EXIF data, using modification time"),
        }
    }
    Ok(CaptureDate { taken: modified(file), source: DateSource::Modified })
}

fn date_time_original(exif: &exif::Exif) -> Option<PrimitiveDateTime> {
    let field = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY)?;
    let Value::Ascii(ref values) = field.value else {
        return None;
    };
    let text = std::str::from_utf8(values.first()?).ok()?;
    PrimitiveDateTime::parse(text.trim_end_matches('\0').trim(), EXIF_DATETIME).ok()
}

/// Modification time converted to the local offset, or UTC when the local
/// offset cannot be determined.
fn modified(file: &FileInfo) -> PrimitiveDateTime {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let local = file.modified.to_offset(offset);
    PrimitiveDateTime::new(local.date(), local.time())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use mediaport_storage::backend::MockBackend;
    use std::path::Path;
    use time::OffsetDateTime;
    use time::macros::datetime;

    /// A minimal JPEG holding nothing but an EXIF block with `DateTimeOriginal`.
    pub(crate) fn jpeg_with_exif(date: &str) -> Vec<u8> {
        assert_eq!(date.len(), 19);
        let mut tiff = Vec::new();
        // Big-endian TIFF header, IFD0 at offset 8.
        tiff.extend_from_slice(b"MM\x00\x2A\x00\x00\x00\x08");
        // IFD0: one entry pointing at the EXIF IFD (offset 26).
        tiff.extend_from_slice(&1u16.to_be_bytes());
        tiff.extend_from_slice(&[0x87, 0x69, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01]);
        tiff.extend_from_slice(&26u32.to_be_bytes());
        tiff.extend_from_slice(&0u32.to_be_bytes());
        // EXIF IFD: DateTimeOriginal, ASCII, 20 bytes at offset 44.
        tiff.extend_from_slice(&1u16.to_be_bytes());
        tiff.extend_from_slice(&[0x90, 0x03, 0x00, 0x02, 0x00, 0x00, 0x00, 0x14]);
        tiff.extend_from_slice(&44u32.to_be_bytes());
        tiff.extend_from_slice(&0u32.to_be_bytes());
        tiff.extend_from_slice(date.as_bytes());
        tiff.push(0);

        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
        jpeg.extend_from_slice(&(2 + 6 + tiff.len() as u16).to_be_bytes());
        jpeg.extend_from_slice(b"Exif\x00\x00");
        jpeg.extend_from_slice(&tiff);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    fn mock(path: &str, data: Vec<u8>, modified: OffsetDateTime) -> (MockBackend, FileInfo) {
        let backend = MockBackend::with_files([(path, data)]);
        backend.set_modified(Path::new(path), modified);
        let file = backend.stat(Path::new(path)).unwrap();
        (backend, file)
    }

    #[test]
    fn test_exif_wins_over_modification_time() {
        let (backend, file) = mock(
            "/card/IMG_0001.JPG",
            jpeg_with_exif("2023:05:15 12:30:45"),
            datetime!(2024-01-01 00:00 UTC),
        );
        let date = capture_date(&backend, &file, FileType::Image).unwrap();
        assert_eq!(date, CaptureDate { taken: datetime!(2023-05-15 12:30:45), source: DateSource::Exif });
    }

    #[test]
    fn test_image_without_exif_uses_modification_time() {
        let modified = datetime!(2022-12-31 10:00 UTC);
        let (backend, file) = mock("/card/IMG_0001.JPG", b"not a jpeg".to_vec(), modified);
        let date = capture_date(&backend, &file, FileType::Image).unwrap();
        assert_eq!(date.source, DateSource::Modified);
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        let local = modified.to_offset(offset);
        assert_eq!(date.taken, PrimitiveDateTime::new(local.date(), local.time()));
    }

    #[test]
    fn test_malformed_exif_date_uses_modification_time() {
        let (backend, file) =
            mock("/card/IMG_0001.JPG", jpeg_with_exif("0000:00:00 00:00:00"), datetime!(2022-12-31 10:00 UTC));
        let date = capture_date(&backend, &file, FileType::Image).unwrap();
        assert_eq!(date.source, DateSource::Modified);
    }

    #[test]
    fn test_videos_are_never_opened() {
        let (backend, file) =
            mock("/card/GX010001.MP4", jpeg_with_exif("2023:05:15 12:30:45"), datetime!(2022-12-31 10:00 UTC));
        let date = capture_date(&backend, &file, FileType::Video).unwrap();
        assert_eq!(date.source, DateSource::Modified);
        assert_eq!(backend.opened(), 0);
    }

    #[test]
    fn test_unreadable_image_is_an_error() {
        let backend = MockBackend::with_files([("/card/IMG_0001.JPG", b"x".as_slice())])
            .with_unreadable("/card/IMG_0001.JPG");
        let file = backend.stat(Path::new("/card/IMG_0001.JPG")).unwrap();
        assert!(capture_date(&backend, &file, FileType::Image).is_err());
    }
}
