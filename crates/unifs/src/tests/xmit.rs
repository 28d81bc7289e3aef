//! Copy/move engine: recursion, policies, partial failure.

use crate::backend::{Backend, BackendResult, WriteMode};
use crate::error::{BackendError, Error};
use crate::fs::FileSystem;
use crate::memory::{MemoryBackend, new_fs};
use crate::options::{CopyOptions, OnExists, OnNoParent, OpenOptions, WriteOptions};
use crate::stats::{Props, Stats};
use crate::stream::{ReadStream, WriteStream};
use async_trait::async_trait;
use std::sync::Arc;

async fn seed_tree(fs: &FileSystem) {
    fs.mkdir("/src").await.expect("mkdir");
    fs.mkdir("/src/sub").await.expect("mkdir");
    fs.write("/src/a.txt", b"alpha").await.expect("write");
    fs.write("/src/b.txt", b"beta").await.expect("write");
    fs.write("/src/sub/c.txt", b"gamma").await.expect("write");
    fs.mkdir("/dst").await.expect("mkdir");
}

fn recursive() -> CopyOptions {
    CopyOptions {
        recursive: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_copy_file() {
    let fs = new_fs();
    fs.write("/a", b"payload").await.expect("write");
    let errors = fs.copy("/a", "/b").await.expect("copy");
    assert!(errors.is_empty());
    assert_eq!(fs.read("/a").await.expect("read"), b"payload");
    assert_eq!(fs.read("/b").await.expect("read"), b"payload");
    assert_eq!(
        fs.hash("/a").await.expect("hash"),
        fs.hash("/b").await.expect("hash")
    );
}

#[tokio::test]
async fn test_copy_missing_source_rejects() {
    let fs = new_fs();
    assert_eq!(
        fs.copy("/nope", "/b").await,
        Err(Error::not_found("/nope"))
    );
}

#[tokio::test]
async fn test_copy_onto_existing_default_errors() {
    let fs = new_fs();
    fs.write("/a", b"new").await.expect("write");
    fs.write("/b", b"old").await.expect("write");

    let errors = fs.copy("/a", "/b").await.expect("copy");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].from, "/a");
    assert_eq!(errors[0].to, "/b");
    assert_eq!(errors[0].error, Error::path_exists("/b"));
    assert_eq!(fs.read("/b").await.expect("read"), b"old");
}

#[tokio::test]
async fn test_copy_skip_and_overwrite() {
    let fs = new_fs();
    fs.write("/a", b"new").await.expect("write");
    fs.write("/b", b"longer original").await.expect("write");

    let skip = CopyOptions {
        on_exists: OnExists::Skip,
        ..Default::default()
    };
    assert!(fs.copy_with("/a", "/b", &skip).await.expect("copy").is_empty());
    assert_eq!(fs.read("/b").await.expect("read"), b"longer original");

    let overwrite = CopyOptions {
        on_exists: OnExists::Overwrite,
        ..Default::default()
    };
    assert!(
        fs.copy_with("/a", "/b", &overwrite)
            .await
            .expect("copy")
            .is_empty()
    );
    // Fully replaced, no tail of the longer original.
    assert_eq!(fs.read("/b").await.expect("read"), b"new");
}

#[tokio::test]
async fn test_copy_dir_recursive() {
    let fs = new_fs();
    seed_tree(&fs).await;

    let errors = fs
        .copy_with("/src", "/dst/copy", &recursive())
        .await
        .expect("copy");
    assert!(errors.is_empty());
    assert_eq!(fs.read("/dst/copy/a.txt").await.expect("read"), b"alpha");
    assert_eq!(fs.read("/dst/copy/sub/c.txt").await.expect("read"), b"gamma");
    // Source untouched.
    assert_eq!(fs.read("/src/a.txt").await.expect("read"), b"alpha");
}

#[tokio::test]
async fn test_copy_dir_non_recursive_creates_only_the_node() {
    let fs = new_fs();
    seed_tree(&fs).await;

    let errors = fs.copy("/src", "/dst/copy").await.expect("copy");
    assert!(errors.is_empty());
    assert!(fs.stat("/dst/copy").await.expect("stat").is_dir());
    assert_eq!(
        fs.list("/dst/copy").await.expect("list"),
        Vec::<String>::new()
    );
}

#[tokio::test]
async fn test_copy_parent_policies() {
    let fs = new_fs();
    fs.write("/a", b"x").await.expect("write");

    assert_eq!(
        fs.copy("/a", "/deep/down/b").await,
        Err(Error::not_found("/deep/down"))
    );

    let make = CopyOptions {
        on_no_parent: OnNoParent::MakeParents,
        ..Default::default()
    };
    assert!(
        fs.copy_with("/a", "/deep/down/b", &make)
            .await
            .expect("copy")
            .is_empty()
    );
    assert_eq!(fs.read("/deep/down/b").await.expect("read"), b"x");
}

#[tokio::test]
async fn test_copy_into_own_subtree_rejects() {
    let fs = new_fs();
    fs.mkdir("/d").await.expect("mkdir");
    assert!(matches!(
        fs.copy_with("/d", "/d/inner", &recursive()).await,
        Err(Error::InvalidModification { .. })
    ));
    assert!(matches!(
        fs.copy("/d", "/d").await,
        Err(Error::InvalidModification { .. })
    ));
}

#[tokio::test]
async fn test_move_file() {
    let fs = new_fs();
    fs.write("/a", b"payload").await.expect("write");
    let errors = fs.mv("/a", "/b").await.expect("move");
    assert!(errors.is_empty());
    assert!(!fs.exists("/a").await);
    assert_eq!(fs.read("/b").await.expect("read"), b"payload");
}

#[tokio::test]
async fn test_move_dir_recursive() {
    let fs = new_fs();
    seed_tree(&fs).await;

    let errors = fs
        .mv_with("/src", "/dst/moved", &recursive())
        .await
        .expect("move");
    assert!(errors.is_empty());
    assert!(!fs.exists("/src").await);
    assert_eq!(fs.read("/dst/moved/sub/c.txt").await.expect("read"), b"gamma");
}

#[tokio::test]
async fn test_cross_filesystem_copy() {
    let src = new_fs();
    let dst = new_fs();
    seed_tree(&src).await;

    let errors = src
        .copy_into("/src", &dst, "/imported", &recursive())
        .await
        .expect("copy");
    assert!(errors.is_empty());
    assert_eq!(dst.read("/imported/b.txt").await.expect("read"), b"beta");
    // Same paths on distinct roots are fine.
    assert!(
        src.copy_into("/src/a.txt", &dst, "/src-a", &CopyOptions::default())
            .await
            .expect("copy")
            .is_empty()
    );
}

/// Delegates everything to a shared memory backend but fails reads of
/// one chosen path.
struct FlakyBackend {
    inner: Arc<MemoryBackend>,
    fail_read: String,
}

#[async_trait]
impl Backend for FlakyBackend {
    fn repository(&self) -> &str {
        self.inner.repository()
    }

    async fn head(&self, path: &str) -> BackendResult<Stats> {
        self.inner.head(path).await
    }

    async fn list(&self, path: &str) -> BackendResult<Vec<String>> {
        self.inner.list(path).await
    }

    async fn mkcol(&self, path: &str) -> BackendResult<()> {
        self.inner.mkcol(path).await
    }

    async fn delete(&self, path: &str) -> BackendResult<()> {
        self.inner.delete(path).await
    }

    async fn patch(&self, path: &str, props: &Props) -> BackendResult<()> {
        self.inner.patch(path, props).await
    }

    async fn open_read(
        &self,
        path: &str,
        options: &OpenOptions,
    ) -> BackendResult<Box<dyn ReadStream>> {
        if path == self.fail_read {
            let err: BackendError = Box::new(std::io::Error::other("simulated read failure"));
            return Err(err);
        }
        self.inner.open_read(path, options).await
    }

    async fn open_write(
        &self,
        path: &str,
        mode: WriteMode,
        options: &WriteOptions,
    ) -> BackendResult<Box<dyn WriteStream>> {
        self.inner.open_write(path, mode, options).await
    }
}

#[tokio::test]
async fn test_partial_failure_does_not_stop_siblings() {
    let inner = Arc::new(MemoryBackend::new("memory"));
    let plain = FileSystem::new(inner.clone());
    seed_tree(&plain).await;

    let flaky = FileSystem::new(Arc::new(FlakyBackend {
        inner,
        fail_read: "/src/a.txt".to_string(),
    }));

    let errors = flaky
        .copy_with("/src", "/dst/copy", &recursive())
        .await
        .expect("copy");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].from, "/src/a.txt");
    assert!(matches!(errors[0].error, Error::NotReadable { .. }));

    // Siblings made it across despite the failure.
    assert_eq!(plain.read("/dst/copy/b.txt").await.expect("read"), b"beta");
    assert_eq!(
        plain.read("/dst/copy/sub/c.txt").await.expect("read"),
        b"gamma"
    );
    assert!(!plain.exists("/dst/copy/a.txt").await);
}

#[tokio::test]
async fn test_partial_move_keeps_failed_source() {
    let inner = Arc::new(MemoryBackend::new("memory"));
    let plain = FileSystem::new(inner.clone());
    seed_tree(&plain).await;

    let flaky = FileSystem::new(Arc::new(FlakyBackend {
        inner,
        fail_read: "/src/a.txt".to_string(),
    }));

    let errors = flaky
        .mv_with("/src", "/dst/moved", &recursive())
        .await
        .expect("move");
    // The unreadable file and the consequently non-empty source dir.
    assert!(errors.iter().any(|e| e.from == "/src/a.txt"));
    assert!(errors.iter().any(|e| e.from == "/src"));

    // Moved children are gone from the source; the failed one stays,
    // along with the ancestors needed to reach it.
    assert!(plain.exists("/src/a.txt").await);
    assert!(!plain.exists("/src/b.txt").await);
    assert!(!plain.exists("/src/sub").await);
    assert_eq!(plain.read("/dst/moved/b.txt").await.expect("read"), b"beta");
}
