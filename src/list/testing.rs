//! In-memory listings endpoint for controller tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use secrecy::SecretString;
use tokio::sync::oneshot;

use crate::error::{DeskError, Result};
use crate::remote::{CollectionEndpoint, ListQuery, Page, Transition};
use crate::resources::ModerationStatus;
use crate::resources::listings::{Listing, ListingDraft, ListingPatch, Listings};

pub(crate) fn listing(id: &str, name: &str) -> Listing {
    Listing {
        id: id.to_string(),
        name: name.to_string(),
        category: None,
        city: None,
        status: ModerationStatus::Pending,
        is_active: true,
        rejection_reason: None,
        created_at: None,
    }
}

#[derive(Default)]
pub(crate) struct MockEndpoint {
    rows: Mutex<Vec<Listing>>,
    list_calls: Mutex<Vec<ListQuery>>,
    mutation_calls: Mutex<Vec<String>>,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    fail_next: Mutex<Option<DeskError>>,
    count_override: Mutex<Option<u64>>,
    next_id: Mutex<u32>,
}

impl MockEndpoint {
    pub fn with_names(names: &[&str]) -> Self {
        let rows = names
            .iter()
            .enumerate()
            .map(|(i, name)| listing(&format!("p{}", i + 1), name))
            .collect();
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn with_rows(rows: Vec<Listing>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    /// Hold the next list call until the returned sender fires.
    pub fn gate_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().push_back(rx);
        tx
    }

    pub fn fail_next(&self, err: DeskError) {
        *self.fail_next.lock() = Some(err);
    }

    /// Report this total regardless of the rows held
    pub fn set_count(&self, count: u64) {
        *self.count_override.lock() = Some(count);
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.lock().len()
    }

    pub fn list_calls(&self) -> Vec<ListQuery> {
        self.list_calls.lock().clone()
    }

    pub fn last_list_call(&self) -> Option<ListQuery> {
        self.list_calls.lock().last().cloned()
    }

    pub fn mutation_calls(&self) -> Vec<String> {
        self.mutation_calls.lock().clone()
    }

    fn take_failure(&self) -> Result<()> {
        match self.fail_next.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn record(&self, call: String) {
        self.mutation_calls.lock().push(call);
    }
}

#[async_trait]
impl CollectionEndpoint<Listings> for MockEndpoint {
    async fn list(&self, _token: &SecretString, query: &ListQuery) -> Result<Page<Listing>> {
        self.list_calls.lock().push(query.clone());
        let gate = self.gates.lock().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.take_failure()?;

        let rows = self.rows.lock();
        let matching: Vec<Listing> = rows
            .iter()
            .filter(|row| match &query.search {
                Some(search) => row.name.to_lowercase().contains(&search.to_lowercase()),
                None => true,
            })
            .cloned()
            .collect();
        let count = self
            .count_override
            .lock()
            .unwrap_or(matching.len() as u64);
        let start = ((query.page - 1) * query.page_size) as usize;
        let items = matching
            .into_iter()
            .skip(start)
            .take(query.page_size as usize)
            .collect();
        Ok(Page::new(items, count))
    }

    async fn create(&self, _token: &SecretString, draft: &ListingDraft) -> Result<Listing> {
        self.record(format!("create {}", draft.name));
        self.take_failure()?;
        let next = {
            let mut next_id = self.next_id.lock();
            *next_id += 1;
            *next_id
        };
        let item = listing(&format!("new-{next}"), &draft.name);
        self.rows.lock().insert(0, item.clone());
        Ok(item)
    }

    async fn update(
        &self,
        _token: &SecretString,
        id: &str,
        patch: &ListingPatch,
    ) -> Result<Listing> {
        self.record(format!("update {id}"));
        self.take_failure()?;
        let mut rows = self.rows.lock();
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| DeskError::NotFound(id.to_string()))?;
        if let Some(name) = &patch.name {
            row.name = name.clone();
        }
        if let Some(city) = &patch.city {
            row.city = Some(city.clone());
        }
        Ok(row.clone())
    }

    async fn delete(&self, _token: &SecretString, id: &str) -> Result<()> {
        self.record(format!("delete {id}"));
        self.take_failure()?;
        self.rows.lock().retain(|row| row.id != id);
        Ok(())
    }

    async fn transition(
        &self,
        _token: &SecretString,
        id: &str,
        transition: &Transition,
    ) -> Result<Listing> {
        self.record(format!(
            "{} {id} {}",
            transition.action(),
            transition.reason().unwrap_or("")
        ));
        self.take_failure()?;
        let mut rows = self.rows.lock();
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| DeskError::NotFound(id.to_string()))?;
        match transition {
            Transition::Approve => row.status = ModerationStatus::Approved,
            Transition::Reject { reason } => {
                row.status = ModerationStatus::Rejected;
                row.rejection_reason = Some(reason.clone());
            }
            Transition::Activate => row.is_active = true,
            Transition::Deactivate => row.is_active = false,
        }
        Ok(row.clone())
    }
}
