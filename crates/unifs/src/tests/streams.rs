//! Stream contract: positions, seeking, truncation, snapshot reads.

use crate::memory::new_fs;
use crate::options::OpenOptions;
use crate::stream::{BytesReadStream, ReadStream, pump};
use std::io::SeekFrom;
use tokio_test::assert_ok;

#[tokio::test]
async fn test_manual_write_then_read() {
    let fs = new_fs();
    let mut w = fs.open_write("/f").await.expect("open write");
    assert_eq!(w.position(), 0);
    assert_eq!(w.write(b"hello ").await.expect("write"), 6);
    assert_eq!(w.write(b"world").await.expect("write"), 5);
    assert_eq!(w.position(), 11);
    w.close().await.expect("close");

    assert_eq!(fs.read("/f").await.expect("read"), b"hello world");
}

#[tokio::test]
async fn test_content_published_on_close() {
    let fs = new_fs();
    fs.write("/f", b"old").await.expect("write");

    let mut w = fs.open_write("/f").await.expect("open write");
    w.write(b"new content").await.expect("write");
    // Still the old content until the stream closes.
    assert_eq!(fs.read("/f").await.expect("read"), b"old");
    w.close().await.expect("close");
    assert_eq!(fs.read("/f").await.expect("read"), b"new content");
}

#[tokio::test]
async fn test_read_seek() {
    let fs = new_fs();
    fs.write("/f", b"0123456789").await.expect("write");

    let mut r = fs.open_read("/f").await.expect("open read");
    assert_eq!(r.seek(SeekFrom::Start(4)).await.expect("seek"), 4);
    let chunk = r.read(Some(3)).await.expect("read").expect("chunk");
    assert_eq!(&chunk[..], b"456");

    assert_eq!(r.seek(SeekFrom::End(-2)).await.expect("seek"), 8);
    let tail = r.read(None).await.expect("read").expect("chunk");
    assert_eq!(&tail[..], b"89");

    // Out-of-range targets clamp instead of failing.
    assert_eq!(r.seek(SeekFrom::Start(1000)).await.expect("seek"), 10);
    assert_eq!(r.read(None).await.expect("read"), None);
    assert_eq!(r.seek(SeekFrom::Current(-1000)).await.expect("seek"), 0);
    r.close().await.expect("close");
}

#[tokio::test]
async fn test_read_chunking_respects_hint() {
    let fs = new_fs();
    fs.write("/f", &[7u8; 1000]).await.expect("write");

    let options = OpenOptions {
        buffer_size: 256,
        ignore_hook: false,
    };
    let mut r = fs.open_read_with("/f", &options).await.expect("open");
    let mut total = 0usize;
    let mut chunks = 0usize;
    while let Some(chunk) = r.read(Some(256)).await.expect("read") {
        assert!(chunk.len() <= 256);
        total += chunk.len();
        chunks += 1;
    }
    assert_eq!(total, 1000);
    assert!(chunks >= 4);
    r.close().await.expect("close");
}

#[tokio::test]
async fn test_truncate() {
    let fs = new_fs();
    fs.write("/f", b"0123456789").await.expect("write");

    let mut w = fs.open_write("/f").await.expect("open write");
    w.write(b"ab").await.expect("write");
    w.truncate(2).await.expect("truncate");
    assert_eq!(w.position(), 2);
    w.close().await.expect("close");
    assert_eq!(fs.read("/f").await.expect("read"), b"ab");
}

#[tokio::test]
async fn test_truncate_grows_with_zeros() {
    let fs = new_fs();
    fs.write("/f", b"ab").await.expect("write");
    let mut w = fs.open_write("/f").await.expect("open write");
    w.truncate(4).await.expect("truncate");
    w.close().await.expect("close");
    assert_eq!(fs.read("/f").await.expect("read"), b"ab\0\0");
}

#[tokio::test]
async fn test_snapshot_isolation() {
    let fs = new_fs();
    fs.write("/f", b"original").await.expect("write");

    let mut r = fs.open_read("/f").await.expect("open read");
    fs.write("/f", b"replaced").await.expect("rewrite");

    // The open reader keeps seeing the content it was opened on.
    let mut seen = Vec::new();
    while let Some(chunk) = r.read(Some(3)).await.expect("read") {
        seen.extend_from_slice(&chunk);
    }
    assert_eq!(seen, b"original");
    r.close().await.expect("close");

    assert_eq!(fs.read("/f").await.expect("read"), b"replaced");
}

#[tokio::test]
async fn test_create_visible_at_open() {
    let fs = new_fs();
    let mut w = fs.open_write("/f").await.expect("open write");
    // The entry exists (empty) as soon as the stream is open.
    let stats = fs.stat("/f").await.expect("stat");
    assert_eq!(stats.size, Some(0));
    w.close().await.expect("close");
    assert_eq!(fs.read("/f").await.expect("read"), b"");
}

#[tokio::test]
async fn test_pump_drives_everything_across() {
    let fs = new_fs();
    let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();

    let mut reader = BytesReadStream::new(payload.clone());
    let mut writer = fs.open_write("/f").await.expect("open write");
    let moved = pump(&mut reader, writer.as_mut(), 512).await.expect("pump");
    assert_eq!(moved, 10_000);
    writer.close().await.expect("close");
    reader.close().await.expect("close");

    assert_eq!(fs.read("/f").await.expect("read"), payload);
}

#[tokio::test]
async fn test_write_close_idempotent() {
    let fs = new_fs();
    let mut w = fs.open_write("/f").await.expect("open write");
    w.write(b"x").await.expect("write");
    tokio_test::assert_ok!(w.close().await);
    tokio_test::assert_ok!(w.close().await);
    assert_eq!(fs.read("/f").await.expect("read"), b"x");
}
