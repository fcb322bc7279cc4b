//! In-process store backed by plain collections.
//!
//! Rows live only as long as the value; the API tests and the monitoring
//! tests use it where an on-disk database adds nothing.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{DailySummary, NewService, NewStatusCheck, Service, StatusCheck};
use super::repository::{ServiceRepository, StatusCheckRepository, SummaryRepository};

#[derive(Default)]
pub struct MemoryStore {
    services: RwLock<Vec<Service>>,
    checks: RwLock<Vec<StatusCheck>>,
    summaries: RwLock<BTreeMap<(Uuid, NaiveDate), DailySummary>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service with a caller-chosen id
    pub async fn insert_service(&self, service: Service) {
        self.services.write().await.push(service);
    }
}

#[async_trait]
impl ServiceRepository for MemoryStore {
    async fn list_services(&self) -> Result<Vec<Service>> {
        Ok(self.services.read().await.clone())
    }

    async fn get_service(&self, id: Uuid) -> Result<Option<Service>> {
        Ok(self.services.read().await.iter().find(|s| s.id == id).cloned())
    }

    async fn create_service(&self, service: &NewService) -> Result<Service> {
        let created = Service {
            id: Uuid::new_v4(),
            name: service.name.clone(),
            url: service.url.clone(),
            description: service.description.clone(),
            created_at: Utc::now().trunc_subsecs(3),
        };
        self.services.write().await.push(created.clone());
        Ok(created)
    }

    async fn update_service(&self, service: &Service) -> Result<bool> {
        let mut services = self.services.write().await;
        match services.iter_mut().find(|s| s.id == service.id) {
            Some(existing) => {
                existing.name = service.name.clone();
                existing.url = service.url.clone();
                existing.description = service.description.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_service(&self, id: Uuid) -> Result<bool> {
        self.checks.write().await.retain(|c| c.service_id != id);
        self.summaries.write().await.retain(|(service_id, _), _| *service_id != id);

        let mut services = self.services.write().await;
        let before = services.len();
        services.retain(|s| s.id != id);
        Ok(services.len() != before)
    }
}

#[async_trait]
impl StatusCheckRepository for MemoryStore {
    async fn create_status_check(&self, check: &NewStatusCheck) -> Result<StatusCheck> {
        let mut checks = self.checks.write().await;
        let id = checks.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let stored = check.clone().into_check(id);
        checks.push(stored.clone());
        Ok(stored)
    }

    async fn query_checks(
        &self,
        service_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StatusCheck>> {
        // Newest first, so callers that forget to sort are caught by tests.
        let mut found: Vec<StatusCheck> = self
            .checks
            .read()
            .await
            .iter()
            .filter(|c| c.service_id == service_id && c.timestamp >= from && c.timestamp <= to)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn latest_check(&self, service_id: Uuid) -> Result<Option<StatusCheck>> {
        Ok(self
            .checks
            .read()
            .await
            .iter()
            .filter(|c| c.service_id == service_id)
            .max_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn delete_checks_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut checks = self.checks.write().await;
        let before = checks.len();
        checks.retain(|c| c.timestamp >= cutoff);
        Ok((before - checks.len()) as u64)
    }
}

#[async_trait]
impl SummaryRepository for MemoryStore {
    async fn get_daily_summary(
        &self,
        service_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>> {
        Ok(self.summaries.read().await.get(&(service_id, date)).cloned())
    }

    async fn upsert_daily_summary(&self, summary: &DailySummary) -> Result<()> {
        self.summaries
            .write()
            .await
            .insert((summary.service_id, summary.date), summary.clone());
        Ok(())
    }

    async fn summaries_in_range(
        &self,
        service_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailySummary>> {
        Ok(self
            .summaries
            .read()
            .await
            .range((service_id, from)..=(service_id, to))
            .map(|(_, summary)| summary.clone())
            .collect())
    }

    async fn delete_summaries_older_than(&self, cutoff: NaiveDate) -> Result<u64> {
        let mut summaries = self.summaries.write().await;
        let before = summaries.len();
        summaries.retain(|(_, date), _| *date >= cutoff);
        Ok((before - summaries.len()) as u64)
    }
}
