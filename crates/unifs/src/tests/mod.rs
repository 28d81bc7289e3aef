//! Integration-style tests over the in-memory backend.

mod streams;
mod xmit;

use crate::error::Result;
use crate::hook::Hook;
use crate::options::{DeleteOptions, HeadOptions, ListOptions, MkcolOptions};
use crate::stats::{Props, Stats};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

/// Hook that records every invocation as `"method path"` without
/// altering any outcome. After-hooks run detached, so assertions go
/// through [`RecordingHook::wait_for`].
pub(crate) struct RecordingHook {
    events: Mutex<Vec<String>>,
}

impl RecordingHook {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingHook {
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("events lock").clone()
    }

    fn record(&self, event: String) {
        self.events.lock().expect("events lock").push(event);
    }

    pub fn has(&self, event: &str) -> bool {
        self.events().iter().any(|e| e == event)
    }

    /// Polls until the event shows up or a generous deadline passes.
    pub async fn wait_for(&self, event: &str) -> bool {
        for _ in 0..200 {
            if self.has(event) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }
}

#[async_trait]
impl Hook for RecordingHook {
    async fn before_head(&self, path: &str, _options: &HeadOptions) -> Result<Option<Stats>> {
        self.record(format!("before_head {path}"));
        Ok(None)
    }

    async fn before_list(
        &self,
        path: &str,
        _options: &ListOptions,
    ) -> Result<Option<Vec<String>>> {
        self.record(format!("before_list {path}"));
        Ok(None)
    }

    async fn before_mkcol(&self, path: &str, _options: &MkcolOptions) -> Result<bool> {
        self.record(format!("before_mkcol {path}"));
        Ok(false)
    }

    async fn before_delete(&self, path: &str, _options: &DeleteOptions) -> Result<bool> {
        self.record(format!("before_delete {path}"));
        Ok(false)
    }

    async fn after_head(&self, path: &str, _stats: &Stats) -> Result<()> {
        self.record(format!("after_head {path}"));
        Ok(())
    }

    async fn after_list(&self, path: &str, _children: &[String]) -> Result<()> {
        self.record(format!("after_list {path}"));
        Ok(())
    }

    async fn after_mkcol(&self, path: &str) -> Result<()> {
        self.record(format!("after_mkcol {path}"));
        Ok(())
    }

    async fn after_delete(&self, path: &str) -> Result<()> {
        self.record(format!("after_delete {path}"));
        Ok(())
    }

    async fn after_patch(&self, path: &str, _props: &Props) -> Result<()> {
        self.record(format!("after_patch {path}"));
        Ok(())
    }

    async fn after_open_read(&self, path: &str) -> Result<()> {
        self.record(format!("after_open_read {path}"));
        Ok(())
    }

    async fn after_create(&self, path: &str) -> Result<()> {
        self.record(format!("after_create {path}"));
        Ok(())
    }

    async fn after_update(&self, path: &str) -> Result<()> {
        self.record(format!("after_update {path}"));
        Ok(())
    }
}
