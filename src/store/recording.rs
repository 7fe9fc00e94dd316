use std::sync::Mutex;

use serde_json::Value;

use super::sqlite::SqliteStore;
use super::{Filter, Order, Record, RecordStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
    SelectOne,
    Insert,
    Update,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreCall {
    pub operation: Operation,
    pub collection: String,
    pub payload: Vec<Record>,
}

/// In-memory store that records every call and fails on demand.
pub struct RecordingStore {
    inner: SqliteStore,
    calls: Mutex<Vec<StoreCall>>,
    failures: Mutex<Vec<(Operation, String)>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().expect("in-memory store should open"),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
        }
    }

    pub fn seed(&self, collection: &str, rows: Vec<Value>) {
        let records = rows
            .into_iter()
            .map(|row| match row {
                Value::Object(record) => record,
                _ => panic!("seed rows must be objects"),
            })
            .collect();
        self.inner
            .insert(collection, records)
            .expect("seeding should succeed");
    }

    pub fn fail_on(&self, operation: Operation, collection: &str) {
        self.failures
            .lock()
            .expect("failures lock")
            .push((operation, collection.to_string()));
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn writes(&self) -> Vec<(Operation, String)> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call.operation, Operation::Insert | Operation::Update))
            .map(|call| (call.operation, call.collection))
            .collect()
    }

    pub fn rows(&self, collection: &str) -> Vec<Record> {
        self.inner
            .select(collection, &[], None)
            .expect("inner select should succeed")
    }

    fn record(
        &self,
        operation: Operation,
        collection: &str,
        payload: Vec<Record>,
    ) -> Result<(), StoreError> {
        self.calls.lock().expect("calls lock").push(StoreCall {
            operation,
            collection: collection.to_string(),
            payload,
        });
        let should_fail = self
            .failures
            .lock()
            .expect("failures lock")
            .iter()
            .any(|(failing_op, failing_collection)| {
                *failing_op == operation && failing_collection == collection
            });
        if should_fail {
            return Err(StoreError::Http {
                status: Some(503),
                message: format!("injected {operation:?} failure on '{collection}'"),
            });
        }
        Ok(())
    }
}

impl RecordStore for RecordingStore {
    fn select(
        &self,
        collection: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Record>, StoreError> {
        self.record(Operation::Select, collection, Vec::new())?;
        self.inner.select(collection, filters, order)
    }

    fn select_one(&self, collection: &str, filters: &[Filter]) -> Result<Record, StoreError> {
        self.record(Operation::SelectOne, collection, Vec::new())?;
        self.inner.select_one(collection, filters)
    }

    fn insert(&self, collection: &str, records: Vec<Record>) -> Result<Vec<Record>, StoreError> {
        self.record(Operation::Insert, collection, records.clone())?;
        self.inner.insert(collection, records)
    }

    fn update(
        &self,
        collection: &str,
        patch: Record,
        filters: &[Filter],
    ) -> Result<Vec<Record>, StoreError> {
        self.record(Operation::Update, collection, vec![patch.clone()])?;
        self.inner.update(collection, patch, filters)
    }
}
