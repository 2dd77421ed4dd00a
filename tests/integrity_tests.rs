//! bin内容完整性校验测试
//!
//! 使用固件生成器写出的真实WAV bin验证 CRC-64 校验流程。


use mtdaw_inspect::audio::{
    BinMetadata, BinVerdict, Crc64, compute_payload_digest, verify_bin, verify_bin_with_chunk_size,
};
use mtdaw_inspect::error::InspectError;
use fs2::FileExt;
use project_fixtures::{BinSpec, fixtures_dir, log, write_bin};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = fixtures_dir().join("integrity").join(name);
    if dir.exists() {
        fs::remove_dir_all(&dir).expect("无法清理目录");
    }
    fs::create_dir_all(&dir).expect("无法创建目录");
    dir
}

#[test]
fn test_generated_bin_verifies() {
    let dir = scratch_dir("verified");
    let (path, meta) = write_bin(&dir, &BinSpec::new(1, "kick"));

    // 文件名本身就是描述符
    let decoded = BinMetadata::from_path(&path).unwrap().unwrap();
    assert_eq!(decoded, meta);

    let verdict = verify_bin(&path, &decoded).expect("校验不应出错");
    assert_eq!(
        verdict,
        BinVerdict::Verified {
            digest: meta.content_hash
        }
    );
    assert_eq!(verdict.into_result(meta.bin_id).unwrap(), meta.content_hash);
    log("  ✓ 生成的bin校验通过", "  Generated bin verified");
}

#[test]
fn test_mismatch_is_a_verdict_not_an_error() {
    let dir = scratch_dir("mismatch");
    let (bad_path, bad_meta) = write_bin(
        &dir,
        &BinSpec {
            corrupt_hash: true,
            ..BinSpec::new(2, "snare")
        },
    );
    let (good_path, good_meta) = write_bin(&dir, &BinSpec::new(3, "hat"));

    let verdicts: Vec<BinVerdict> = [(&bad_path, &bad_meta), (&good_path, &good_meta)]
        .into_iter()
        .map(|(path, meta)| verify_bin(path, meta).expect("不匹配不应是错误"))
        .collect();

    match verdicts[0] {
        BinVerdict::Mismatch {
            expected,
            computed,
            bytes_read,
        } => {
            assert_eq!(expected, bad_meta.content_hash);
            assert_eq!(computed, bad_meta.content_hash ^ 0xdead_beef);
            assert_eq!(bytes_read, bad_meta.payload_len());
        }
        other => panic!("应为不匹配: {other:?}"),
    }
    // 后续bin不受影响
    assert!(verdicts[1].is_verified());

    let err = verdicts[0].into_result(bad_meta.bin_id).unwrap_err();
    assert!(matches!(
        err,
        InspectError::IntegrityMismatch { bin_id: 2, .. }
    ));
}

#[test]
fn test_chunk_size_does_not_change_digest() {
    let dir = scratch_dir("chunks");
    let (path, meta) = write_bin(
        &dir,
        &BinSpec {
            bytes_per_channel: 3,
            sample_rate: 96000,
            frames: 3001,
            ..BinSpec::new(4, "odd frames")
        },
    );

    for chunk in [1, 7, 4096, 1 << 20, usize::MAX] {
        let (digest, read) = compute_payload_digest(&path, &meta, chunk).unwrap();
        assert_eq!(digest, meta.content_hash, "chunk={chunk}");
        assert_eq!(read, meta.payload_len());
        assert!(
            verify_bin_with_chunk_size(&path, &meta, chunk)
                .unwrap()
                .is_verified()
        );
    }
}

#[test]
fn test_truncated_file_hashes_available_bytes() {
    let dir = scratch_dir("truncated");
    let (path, meta) = write_bin(&dir, &BinSpec::new(5, "cut"));

    let bytes = fs::read(&path).unwrap();
    let keep = bytes.len() - 100;
    fs::write(&path, &bytes[..keep]).unwrap();

    let verdict = verify_bin(&path, &meta).unwrap();
    let start = meta.data_offset as usize;
    match verdict {
        BinVerdict::Mismatch {
            computed,
            bytes_read,
            ..
        } => {
            assert_eq!(bytes_read, (keep - start) as u64);
            assert_eq!(computed, Crc64::checksum(&bytes[start..keep]));
        }
        other => panic!("截断文件应为不匹配: {other:?}"),
    }
}

#[test]
fn test_exclusively_locked_bin_fails_fast() {
    let dir = scratch_dir("locked");
    let (path, meta) = write_bin(&dir, &BinSpec::new(7, "held"));

    // 独立的文件描述，持有独占锁直到测试结束
    let holder = fs::File::open(&path).unwrap();
    holder.lock_exclusive().unwrap();

    let (tx, rx) = mpsc::channel();
    let worker_path = path.clone();
    let worker_meta = meta.clone();
    std::thread::spawn(move || {
        let _ = tx.send(verify_bin(&worker_path, &worker_meta));
    });

    let result = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("被锁定的bin不应阻塞校验");
    match result {
        Err(InspectError::IoFailure(e)) => assert_eq!(e.kind(), ErrorKind::WouldBlock),
        other => panic!("应为I/O失败: {other:?}"),
    }

    // 释放后恢复正常
    holder.unlock().unwrap();
    assert!(verify_bin(&path, &meta).unwrap().is_verified());
}

#[test]
fn test_missing_file_is_io_failure() {
    let dir = scratch_dir("missing");
    let meta = BinMetadata::v1(6, 1, 10, 0, 44, Vec::new());
    let err = verify_bin(&dir.join(meta.file_name().unwrap()), &meta).unwrap_err();
    assert!(matches!(err, InspectError::IoFailure(_)));
}
