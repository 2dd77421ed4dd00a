//! bin文件名描述符测试
//!
//! 从文件名层面验证解码、编码与错误分类。

use mtdaw_inspect::audio::{BinMetadata, BinVersion, SampleRateCode};
use mtdaw_inspect::error::{ErrorCategory, InspectError};

const KICK_HEX: &str = "0100070000000010000000000000006400000000";

fn kick_file_name() -> String {
    format!("{KICK_HEX}6b69636b.wav")
}

#[test]
fn test_kick_v1_blob_from_file_name() {
    let meta = BinMetadata::from_file_name(&kick_file_name())
        .expect("应识别为bin")
        .expect("应解码成功");

    assert_eq!(meta.version, BinVersion::V1);
    assert_eq!(meta.bin_id, 7);
    assert_eq!(meta.channels, 0);
    assert_eq!(meta.sample_count, 16);
    assert_eq!(meta.content_hash, 100);
    assert_eq!(meta.data_offset, 0);
    assert_eq!(meta.bits_per_sample(), 16);
    assert_eq!(meta.sample_rate(), 44100);
    assert_eq!(meta.name, b"kick");
    // 0声道 → 空负载
    assert_eq!(meta.payload_len(), 0);

    println!("  ✓ kick v1 描述符解码正确");
}

#[test]
fn test_extension_is_case_insensitive() {
    let upper = format!("{}.WAV", KICK_HEX.to_uppercase());
    let meta = BinMetadata::from_file_name(&upper).unwrap().unwrap();
    assert_eq!(meta.bin_id, 7);
    assert!(meta.name.is_empty());

    assert!(BinMetadata::from_file_name("0100070000000010.aif").is_none());
    assert!(BinMetadata::from_file_name("wav").is_none());
    assert!(BinMetadata::from_file_name(".DS_Store").is_none());
}

#[test]
fn test_encode_matches_decoded_file_name() {
    let meta = BinMetadata::v1(7, 0, 16, 100, 0, b"kick".to_vec());
    assert_eq!(meta.file_name().unwrap(), kick_file_name());

    let v2 = BinMetadata::v2(
        0xbeef,
        2,
        123_456,
        3,
        SampleRateCode::from_hz(96000).unwrap(),
        0x0123_4567_89ab_cdef,
        44,
        "Overheads L/R".as_bytes().to_vec(),
    );
    let name = v2.file_name().unwrap();
    assert!(name.ends_with(".wav"));
    assert_eq!(name, name.to_lowercase(), "编码结果应为小写十六进制");
    assert_eq!(BinMetadata::from_file_name(&name).unwrap().unwrap(), v2);
    assert_eq!(v2.payload_len(), 123_456 * 6);
    assert_eq!(v2.bits_per_sample(), 24);
}

#[test]
fn test_v1_cannot_carry_non_default_format() {
    let mut meta = BinMetadata::v1(1, 2, 10, 0, 44, Vec::new());
    meta.bytes_per_channel = 3;
    assert!(matches!(
        meta.encode_bytes(),
        Err(InspectError::InvalidInput(_))
    ));
}

#[test]
fn test_version_byte_checked_first() {
    // 版本3，后续内容长度不足也应报告版本错误
    let err = BinMetadata::decode_hex("03ff").unwrap_err();
    assert!(matches!(err, InspectError::UnsupportedFormatVersion(3)));
    assert_eq!(ErrorCategory::from_inspect_error(&err), ErrorCategory::Format);

    let err = BinMetadata::decode_hex("00").unwrap_err();
    assert!(matches!(err, InspectError::UnsupportedFormatVersion(0)));
}

#[test]
fn test_unknown_bitrate_code() {
    let hex = "02000102000000100209000000000000000000000000";
    let err = BinMetadata::decode_hex(hex).unwrap_err();
    assert!(
        matches!(err, InspectError::UnknownBitrateFormat(9)),
        "{err}"
    );
}

#[test]
fn test_malformed_names() {
    for stem in ["", "0", "01000", "zz", "0100070000000010000000000000006400"] {
        let err = BinMetadata::decode_hex(stem).unwrap_err();
        assert!(
            matches!(err, InspectError::MalformedBinFilename(_)),
            "{stem:?}: {err}"
        );
    }
}

#[test]
fn test_negative_sample_count_is_empty_payload() {
    let meta = BinMetadata::v2(
        1,
        2,
        -5,
        2,
        SampleRateCode::from_hz(48000).unwrap(),
        0,
        0,
        Vec::new(),
    );
    assert_eq!(meta.payload_len(), 0);
    assert_eq!(meta.duration_seconds(), 0.0);
}

#[test]
fn test_round_trip_across_rate_codes_and_boundaries() {
    let names: [&[u8]; 3] = [b"", b"take 1", &[0xff, 0x00, 0xc3, 0x28]];
    let mut records = Vec::new();

    for code in 0..=8u8 {
        let rate = SampleRateCode::from_code(code).unwrap();
        for name in names {
            records.push(BinMetadata::v2(
                u16::MAX,
                u8::MAX,
                i32::MAX,
                4,
                rate,
                u64::MAX,
                u32::MAX,
                name.to_vec(),
            ));
            records.push(BinMetadata::v2(0, 1, i32::MIN, 1, rate, 0, 0, name.to_vec()));
        }
    }
    for name in names {
        records.push(BinMetadata::v1(u16::MAX, 2, i32::MIN, u64::MAX, u32::MAX, name.to_vec()));
        records.push(BinMetadata::v1(0, 0, i32::MAX, 0, 0, name.to_vec()));
    }

    for meta in &records {
        let file_name = meta.file_name().unwrap();
        let decoded = BinMetadata::from_file_name(&file_name)
            .expect("编码结果应识别为bin")
            .unwrap_or_else(|e| panic!("{file_name}: {e}"));
        assert_eq!(&decoded, meta, "{file_name}");
    }
    assert_eq!(records.len(), 9 * 3 * 2 + 3 * 2);
}
