//! Test doubles shared by the unit tests of several modules.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::database::models::{DailySummary, NewService, NewStatusCheck, Service, StatusCheck};
use crate::database::{
    MemoryStore, ServiceRepository, StatusCheckRepository, SummaryRepository,
};
use crate::monitoring::checker::{Checker, ProbeError};
use crate::notify::{NotificationSink, StatusEvent};

pub fn test_service(name: &str, url: &str) -> Service {
    Service {
        id: Uuid::new_v4(),
        name: name.to_string(),
        url: url.to_string(),
        description: None,
        created_at: Utc::now(),
    }
}

/// Sink that keeps every event it receives, or fails every delivery
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<StatusEvent>>,
    fail: bool,
    delay: Duration,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    /// Keeps events, but each delivery takes `delay`
    pub fn slow(delay: Duration) -> Self {
        Self { delay, ..Self::default() }
    }

    pub async fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn deliver(&self, event: &StatusEvent) -> Result<()> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(anyhow!("sink unavailable"));
        }
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

/// Checker answering from a per-url script; unknown urls are refused
#[derive(Default)]
pub struct ScriptedChecker {
    script: Mutex<Vec<(String, VecDeque<Result<u16, String>>)>>,
    pub probed: Mutex<Vec<String>>,
}

impl ScriptedChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for `url`; `Err` becomes a transport failure
    pub async fn script(&self, url: &str, outcomes: Vec<Result<u16, &str>>) {
        let outcomes = outcomes.into_iter().map(|o| o.map_err(str::to_string)).collect();
        self.script.lock().await.push((url.to_string(), outcomes));
    }
}

#[async_trait]
impl Checker for ScriptedChecker {
    async fn probe(&self, target: &str) -> Result<u16, ProbeError> {
        self.probed.lock().await.push(target.to_string());

        let mut script = self.script.lock().await;
        let next = script
            .iter_mut()
            .find(|(url, _)| url == target)
            .and_then(|(_, outcomes)| outcomes.pop_front());

        match next {
            Some(Ok(code)) => Ok(code),
            Some(Err(message)) => Err(ProbeError::Transport(message)),
            None => Err(ProbeError::Transport("connection refused".to_string())),
        }
    }
}

/// Memory store whose check writes can be switched off, per service
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
    reject_checks_for: Mutex<Vec<Uuid>>,
    reject_all_checks: AtomicBool,
    reject_summaries: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reject_checks_for(&self, service_id: Uuid) {
        self.reject_checks_for.lock().await.push(service_id);
    }

    pub fn reject_all_checks(&self) {
        self.reject_all_checks.store(true, Ordering::SeqCst);
    }

    pub fn reject_summaries(&self) {
        self.reject_summaries.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ServiceRepository for FailingStore {
    async fn list_services(&self) -> Result<Vec<Service>> {
        self.inner.list_services().await
    }

    async fn get_service(&self, id: Uuid) -> Result<Option<Service>> {
        self.inner.get_service(id).await
    }

    async fn create_service(&self, service: &NewService) -> Result<Service> {
        self.inner.create_service(service).await
    }

    async fn update_service(&self, service: &Service) -> Result<bool> {
        self.inner.update_service(service).await
    }

    async fn delete_service(&self, id: Uuid) -> Result<bool> {
        self.inner.delete_service(id).await
    }
}

#[async_trait]
impl StatusCheckRepository for FailingStore {
    async fn create_status_check(&self, check: &NewStatusCheck) -> Result<StatusCheck> {
        if self.reject_all_checks.load(Ordering::SeqCst)
            || self.reject_checks_for.lock().await.contains(&check.service_id)
        {
            return Err(anyhow!("database is locked"));
        }
        self.inner.create_status_check(check).await
    }

    async fn query_checks(
        &self,
        service_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StatusCheck>> {
        self.inner.query_checks(service_id, from, to).await
    }

    async fn latest_check(&self, service_id: Uuid) -> Result<Option<StatusCheck>> {
        self.inner.latest_check(service_id).await
    }

    async fn delete_checks_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        self.inner.delete_checks_older_than(cutoff).await
    }
}

#[async_trait]
impl SummaryRepository for FailingStore {
    async fn get_daily_summary(
        &self,
        service_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>> {
        self.inner.get_daily_summary(service_id, date).await
    }

    async fn upsert_daily_summary(&self, summary: &DailySummary) -> Result<()> {
        if self.reject_summaries.load(Ordering::SeqCst) {
            return Err(anyhow!("daily_summaries is read-only"));
        }
        self.inner.upsert_daily_summary(summary).await
    }

    async fn summaries_in_range(
        &self,
        service_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailySummary>> {
        self.inner.summaries_in_range(service_id, from, to).await
    }

    async fn delete_summaries_older_than(&self, cutoff: NaiveDate) -> Result<u64> {
        self.inner.delete_summaries_older_than(cutoff).await
    }
}

/// Accept one HTTP request, answer with `status`, and hand back its body
pub async fn capture_request(status: u16) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/hook", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];

        let body_start = loop {
            let read = socket.read(&mut buf).await.unwrap();
            assert!(read > 0, "connection closed before headers");
            raw.extend_from_slice(&buf[..read]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let headers = String::from_utf8_lossy(&raw[..body_start]).to_ascii_lowercase();
        let content_length: usize = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map(|value| value.trim().parse().unwrap())
            .unwrap_or(0);

        while raw.len() < body_start + content_length {
            let read = socket.read(&mut buf).await.unwrap();
            if read == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..read]);
        }

        let response =
            format!("HTTP/1.1 {} Test\r\ncontent-length: 0\r\nconnection: close\r\n\r\n", status);
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&raw[body_start..]).to_string()
    });

    (url, handle)
}
