// Generic in-memory collection with artificial latency, standing in for a real
// network/database backend. All mutation happens under a single lock, so the
// read-modify-write in `update` cannot interleave with another writer.

use std::sync::Arc;

use log::debug;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use uuid::Uuid;

use super::StoreError;

/// A record the mock store can hold: identified by a string id that the store
/// assigns on create.
pub trait Entity: Clone + Send + 'static {
    /// Human-readable name used in error messages ("user", "message", ...).
    const KIND: &'static str;
    /// Prefix for store-assigned ids ("user", "conv", "msg").
    const ID_PREFIX: &'static str;

    fn id(&self) -> &str;
    fn assign_id(&mut self, id: String);

    /// Fields the store overrides when a record is created (defaults such as
    /// `unread_count = 0`). By default nothing is touched.
    fn apply_create_defaults(&mut self) {}
}

const GET_BY_ID_MS: u64 = 200;
const CREATE_MS: u64 = 400;
const UPDATE_MS: u64 = 300;
const DELETE_MS: u64 = 250;
const FIND_MS: u64 = 300;
const UPDATE_WHERE_MS: u64 = 200;

/// One mock collection. Clones share the same underlying records.
#[derive(Debug, Clone)]
pub struct Collection<T: Entity> {
    records: Arc<Mutex<Vec<T>>>,
    list_latency: Duration,
}

impl<T: Entity> Collection<T> {
    pub fn new(list_latency_ms: u64) -> Self {
        Self::from_records(Vec::new(), list_latency_ms)
    }

    pub fn from_records(records: Vec<T>, list_latency_ms: u64) -> Self {
        Collection {
            records: Arc::new(Mutex::new(records)),
            list_latency: Duration::from_millis(list_latency_ms),
        }
    }

    /// All records, cloned.
    pub async fn get_all(&self) -> Result<Vec<T>, StoreError> {
        sleep(self.list_latency).await;
        Ok(self.records.lock().await.clone())
    }

    /// A single record by id, or `None` if the id is unknown.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        sleep(Duration::from_millis(GET_BY_ID_MS)).await;
        let records = self.records.lock().await;
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }

    /// Insert a record, assigning it a fresh unique id and applying the
    /// collection's create-time defaults. Returns the stored record.
    pub async fn create(&self, mut record: T) -> Result<T, StoreError> {
        sleep(Duration::from_millis(CREATE_MS)).await;
        record.assign_id(format!("{}_{}", T::ID_PREFIX, Uuid::new_v4().simple()));
        record.apply_create_defaults();
        debug!("store: created {} {}", T::KIND, record.id());
        let mut records = self.records.lock().await;
        records.push(record.clone());
        Ok(record)
    }

    /// Apply `apply` to the record with the given id and return the merged
    /// record. Fails with `NotFound` (and changes nothing) if the id is absent.
    pub async fn update<F>(&self, id: &str, apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut T),
    {
        sleep(Duration::from_millis(UPDATE_MS)).await;
        let mut records = self.records.lock().await;
        match records.iter_mut().find(|r| r.id() == id) {
            Some(record) => {
                apply(record);
                Ok(record.clone())
            }
            None => Err(StoreError::not_found(T::KIND, id)),
        }
    }

    /// Remove the record with the given id and return it.
    pub async fn delete(&self, id: &str) -> Result<T, StoreError> {
        sleep(Duration::from_millis(DELETE_MS)).await;
        let mut records = self.records.lock().await;
        match records.iter().position(|r| r.id() == id) {
            Some(index) => Ok(records.remove(index)),
            None => Err(StoreError::not_found(T::KIND, id)),
        }
    }

    /// Clones of all records matching `pred`, in insertion order.
    pub async fn find_where<P>(&self, pred: P) -> Result<Vec<T>, StoreError>
    where
        P: Fn(&T) -> bool,
    {
        sleep(Duration::from_millis(FIND_MS)).await;
        let records = self.records.lock().await;
        Ok(records.iter().filter(|r| pred(r)).cloned().collect())
    }

    /// Apply `apply` to every record matching `pred`; returns the updated
    /// clones. Matching nothing is not an error.
    pub async fn update_where<P, F>(&self, pred: P, apply: F) -> Result<Vec<T>, StoreError>
    where
        P: Fn(&T) -> bool,
        F: Fn(&mut T),
    {
        sleep(Duration::from_millis(UPDATE_WHERE_MS)).await;
        let mut records = self.records.lock().await;
        let mut updated = Vec::new();
        for record in records.iter_mut() {
            if pred(record) {
                apply(record);
                updated.push(record.clone());
            }
        }
        Ok(updated)
    }
}
