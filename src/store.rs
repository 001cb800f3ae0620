//! In-memory store of finished kickoff jobs.
//!
//! Bounded by entry count and by age: inserting into a full store evicts the
//! oldest job, and jobs older than the TTL are dropped on insert or read.
//! Inserts are serialized on the insertion-order queue, so `max_entries` holds
//! even under concurrent kickoffs; reads only touch the map.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use image::ImageFormat;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::summary::Summary;

#[derive(Debug, Clone,)]
pub struct JobRecord {
    pub kickoff_id:   String,
    pub xml_url:      String,
    /// `None` when the screenshot was accepted without validation.
    pub image_format: Option<ImageFormat,>,
    pub summary:      Arc<Summary,>,
    pub created_at:   Instant,
}

impl JobRecord {
    /// Creates a record under a fresh random (v4) kickoff id.
    pub fn new(
        xml_url: impl Into<String,>,
        image_format: Option<ImageFormat,>,
        summary: Summary,
    ) -> Self {
        Self {
            kickoff_id: Uuid::new_v4().to_string(),
            xml_url: xml_url.into(),
            image_format,
            summary: Arc::new(summary,),
            created_at: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub struct StorePolicy {
    /// Zero disables the bound.
    pub max_entries: usize,
    /// `None` keeps jobs until evicted by capacity.
    pub ttl:         Option<Duration,>,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl:         Some(Duration::from_secs(3600,),),
        }
    }
}

#[derive(Debug, Default,)]
pub struct JobStore {
    jobs:   DashMap<String, JobRecord,>,
    /// Kickoff ids, oldest insert first. Ids already dropped by an expiring
    /// read stay here until they reach the front.
    order:  Mutex<VecDeque<String,>,>,
    policy: StorePolicy,
}

impl JobStore {
    pub fn new(policy: StorePolicy,) -> Self {
        Self {
            jobs: DashMap::new(),
            order: Mutex::new(VecDeque::new(),),
            policy,
        }
    }

    pub fn policy(&self,) -> StorePolicy {
        self.policy
    }

    fn is_expired(&self, record: &JobRecord, now: Instant,) -> bool {
        self.policy
            .ttl
            .is_some_and(|ttl| now.saturating_duration_since(record.created_at,) >= ttl,)
    }

    pub fn insert(&self, record: JobRecord,) {
        let mut order = self.order.lock();
        self.purge_front(&mut order, Instant::now(),);

        if self.policy.max_entries > 0 {
            while self.jobs.len() >= self.policy.max_entries {
                let Some(oldest,) = order.pop_front() else {
                    break;
                };
                if self.jobs.remove(&oldest,).is_some() {
                    debug!(kickoff_id = %oldest, "evicting oldest job");
                }
            }
        }

        order.push_back(record.kickoff_id.clone(),);
        self.jobs.insert(record.kickoff_id.clone(), record,);
    }

    /// Returns the job unless it is unknown or has outlived the TTL.
    pub fn get(&self, kickoff_id: &str,) -> Option<JobRecord,> {
        // The map guard must be released before `remove` touches the same shard.
        let record = self.jobs.get(kickoff_id,)?.value().clone();
        if self.is_expired(&record, Instant::now(),) {
            self.jobs.remove(kickoff_id,);
            return None;
        }
        Some(record,)
    }

    /// Drops expired jobs from the old end of the store and returns how many
    /// were removed.
    pub fn purge_expired(&self,) -> usize {
        let mut order = self.order.lock();
        self.purge_front(&mut order, Instant::now(),)
    }

    // Stops at the first live job; anything younger was inserted later.
    fn purge_front(&self, order: &mut VecDeque<String,>, now: Instant,) -> usize {
        if self.policy.ttl.is_none() {
            return 0;
        }
        let mut purged = 0;
        while let Some(front,) = order.front() {
            let expired = self
                .jobs
                .get(front,)
                .map(|entry| self.is_expired(entry.value(), now,),);
            match expired {
                Some(false,) => break,
                Some(true,) => {
                    self.jobs.remove(front,);
                    purged += 1;
                },
                None => {},
            }
            order.pop_front();
        }
        if purged > 0 {
            debug!(purged, "purged expired jobs");
        }
        purged
    }

    pub fn len(&self,) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self,) -> bool {
        self.jobs.is_empty()
    }
}
