/*!
 * Tests for caption normalization and SRT export
 */

use ytsubs::captions::{RawCaptionItem, RetrievalResult, normalize};
use ytsubs::srt::{export_filename, serialize, write_srt_file};

use crate::common;

#[test]
fn test_normalize_shouldPreserveCountAndOrder() {
    let items = vec![
        RawCaptionItem::new("b", 10.2, 1.0),
        RawCaptionItem::new("a", 3.9, 1.0),
        RawCaptionItem::new("", 7.0, 0.5),
    ];

    let segments = normalize(items);

    let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["b", "a", ""]);
    let starts: Vec<u64> = segments.iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![10, 3, 7]);
}

#[test]
fn test_normalize_longVideo_shouldCountMinutesPastAnHour() {
    let segments = normalize(vec![RawCaptionItem::new("late", 3725.0, 2.0)]);
    assert_eq!(segments[0].timestamp_label, "62:05");
}

#[test]
fn test_serialize_normalizedResult_shouldUseFlooredStart() {
    let result = common::sample_result("T");

    assert_eq!(
        serialize(&result),
        "1\n00:01:05,000 --> 00:01:07,000\nhi\n\n2\n00:01:08,000 --> 00:01:09,500\nthere\n\n"
    );
}

#[test]
fn test_serialize_pastOneHour_shouldCarryHours() {
    let result = RetrievalResult::new("T", normalize(vec![RawCaptionItem::new("x", 3661.0, 0.25)]));
    assert_eq!(serialize(&result), "1\n01:01:01,000 --> 01:01:01,250\nx\n\n");
}

#[test]
fn test_exportFilename_shouldDeriveFromTitle() {
    assert_eq!(export_filename("T"), "T.srt");
    assert_eq!(export_filename("AC/DC: Live?"), "AC_DC_ Live_.srt");
    assert_eq!(export_filename("   "), "subtitles.srt");
}

#[test]
fn test_writeSrtFile_intoMissingDirectory_shouldCreateIt() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("nested").join("out.srt");
    let result = common::sample_result("T");

    write_srt_file(&result, &path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), serialize(&result));
}
