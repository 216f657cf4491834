//! Capture timestamps for uploaded assets.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use exif::{In, Reader, Tag, Value};
use photorelay_core::{Classification, IncomingFile, MediaKind};

/// Read `DateTimeOriginal` (falling back to `DateTime`) from the EXIF block of
/// an image. Any parse failure yields `None`.
pub fn exif_capture_time(path: &Path) -> Option<DateTime<Utc>> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = Reader::new().read_from_container(&mut reader).ok()?;

    [Tag::DateTimeOriginal, Tag::DateTime]
        .into_iter()
        .find_map(|tag| {
            let field = exif.get_field(tag, In::PRIMARY)?;
            match field.value {
                Value::Ascii(ref values) => values.first().and_then(|raw| parse_exif_datetime(raw)),
                _ => None,
            }
        })
}

fn parse_exif_datetime(raw: &[u8]) -> Option<DateTime<Utc>> {
    let dt = exif::DateTime::from_ascii(raw).ok()?;
    let naive = NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())?
        .and_hms_opt(dt.hour.into(), dt.minute.into(), dt.second.into())?;
    // EXIF local time without an offset is taken as UTC.
    Some(naive.and_utc())
}

/// `fileCreatedAt` for an upload: EXIF for images that kept their metadata,
/// then the message date, then `now`.
pub fn capture_time(
    path: &Path,
    classification: &Classification,
    file: &IncomingFile,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let from_exif = if classification.metadata_preserved && classification.kind == MediaKind::Image
    {
        exif_capture_time(path)
    } else {
        None
    };

    from_exif.or(file.sent_at).unwrap_or(now)
}
