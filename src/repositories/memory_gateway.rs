// src/repositories/memory_gateway.rs
//! In-process stand-in for the hosted backend, used by the test suite.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::repositories::gateway::{
    DataGateway, Filter, GatewayError, Select, FOREIGN_KEY_VIOLATION,
};

#[derive(Debug, Clone, PartialEq)]
pub enum StorageCall {
    Upload(String),
    Remove(Vec<String>),
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Value>>,
    objects: HashMap<String, Vec<u8>>,
    storage_calls: Vec<StorageCall>,
    next_id: i64,
    clock: u32,
    failing_selects: HashSet<String>,
    failing_updates: HashSet<String>,
    fail_uploads: bool,
    fail_removes: bool,
    enforce_foreign_keys: bool,
    profile_delete_attempts: usize,
}

#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a row directly, bypassing the failure switches.
    pub fn seed(&self, table: &str, row: Value) -> Value {
        let mut state = self.lock();
        let row = state.stamp(row);
        state.tables.entry(table.to_string()).or_default().push(row.clone());
        row
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    pub fn storage_calls(&self) -> Vec<StorageCall> {
        self.lock().storage_calls.clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.storage_calls()
            .into_iter()
            .filter_map(|c| match c {
                StorageCall::Upload(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn removals(&self) -> Vec<String> {
        self.storage_calls()
            .into_iter()
            .filter_map(|c| match c {
                StorageCall::Remove(p) => Some(p),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn put_object(&self, bucket: &str, path: &str) {
        self.lock().objects.insert(format!("{}/{}", bucket, path), vec![0u8]);
    }

    pub fn has_object(&self, bucket: &str, path: &str) -> bool {
        self.lock().objects.contains_key(&format!("{}/{}", bucket, path))
    }

    pub fn fail_selects_on(&self, table: &str) {
        self.lock().failing_selects.insert(table.to_string());
    }

    pub fn fail_updates_on(&self, table: &str) {
        self.lock().failing_updates.insert(table.to_string());
    }

    pub fn fail_uploads(&self) {
        self.lock().fail_uploads = true;
    }

    pub fn fail_removes(&self) {
        self.lock().fail_removes = true;
    }

    /// Reject deleting a profile still referenced by `keluhan.user_id`.
    pub fn enforce_foreign_keys(&self) {
        self.lock().enforce_foreign_keys = true;
    }

    pub fn profile_delete_attempts(&self) -> usize {
        self.lock().profile_delete_attempts
    }
}

impl MemoryState {
    fn stamp(&mut self, row: Value) -> Value {
        let mut obj = match row {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if !obj.contains_key("id") {
            self.next_id += 1;
            obj.insert("id".to_string(), json!(self.next_id));
        } else if let Some(id) = obj.get("id").and_then(Value::as_i64) {
            self.next_id = self.next_id.max(id);
        }
        if obj.get("created_at").map(Value::is_null).unwrap_or(true) {
            self.clock += 1;
            obj.insert(
                "created_at".to_string(),
                json!(format!("2024-01-01T00:00:00.{:06}+00:00", self.clock)),
            );
        }
        Value::Object(obj)
    }

    fn table(&mut self, table: &str) -> &mut Vec<Value> {
        self.tables.entry(table.to_string()).or_default()
    }
}

fn matches_all(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|f| f.matches(row))
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn project(row: &Value, columns: &Option<String>) -> Value {
    let Some(columns) = columns else { return row.clone() };
    if columns.trim() == "*" {
        return row.clone();
    }
    let mut out = Map::new();
    for col in columns.split(',').map(str::trim) {
        if let Some(v) = row.get(col) {
            out.insert(col.to_string(), v.clone());
        }
    }
    Value::Object(out)
}

fn backend_error(status: u16, code: Option<&str>, message: &str) -> GatewayError {
    GatewayError::Supabase {
        status,
        code: code.map(str::to_string),
        message: message.to_string(),
    }
}

#[async_trait]
impl DataGateway for MemoryGateway {
    async fn select(&self, table: &str, query: &Select) -> Result<Vec<Value>, GatewayError> {
        let mut state = self.lock();
        if state.failing_selects.contains(table) {
            return Err(backend_error(500, None, &format!("select on {} failed", table)));
        }
        let mut rows: Vec<Value> = state
            .table(table)
            .iter()
            .filter(|r| matches_all(r, &query.filters))
            .cloned()
            .collect();
        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(&order.column), b.get(&order.column));
                if order.ascending { ord } else { ord.reverse() }
            });
        }
        Ok(rows.iter().map(|r| project(r, &query.columns)).collect())
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, GatewayError> {
        let mut state = self.lock();
        let row = state.stamp(row);
        state.table(table).push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, GatewayError> {
        let mut state = self.lock();
        if state.failing_updates.contains(table) {
            return Err(backend_error(500, None, &format!("update on {} failed", table)));
        }
        let Value::Object(patch) = patch else {
            return Err(backend_error(400, None, "patch must be an object"));
        };
        let mut updated = Vec::new();
        for row in state.table(table).iter_mut() {
            if !matches_all(row, filters) {
                continue;
            }
            if let Value::Object(obj) = row {
                for (k, v) in &patch {
                    obj.insert(k.clone(), v.clone());
                }
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, GatewayError> {
        let mut state = self.lock();
        if table == "profiles" {
            state.profile_delete_attempts += 1;
            if state.enforce_foreign_keys {
                let doomed: Vec<Value> = state
                    .table("profiles")
                    .iter()
                    .filter(|r| matches_all(r, filters))
                    .filter_map(|r| r.get("id").cloned())
                    .collect();
                let referenced = state
                    .table("keluhan")
                    .iter()
                    .any(|k| k.get("user_id").map(|u| doomed.contains(u)).unwrap_or(false));
                if referenced {
                    return Err(backend_error(
                        409,
                        Some(FOREIGN_KEY_VIOLATION),
                        "update or delete on table \"profiles\" violates foreign key constraint \"keluhan_user_id_fkey\"",
                    ));
                }
            }
        }
        let rows = state.table(table);
        let (removed, kept): (Vec<Value>, Vec<Value>) =
            rows.drain(..).partition(|r| matches_all(r, filters));
        *rows = kept;
        Ok(removed)
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), GatewayError> {
        let mut state = self.lock();
        state.storage_calls.push(StorageCall::Upload(path.to_string()));
        if state.fail_uploads {
            return Err(backend_error(500, Some("internal"), "upload rejected"));
        }
        state.objects.insert(format!("{}/{}", bucket, path), bytes);
        Ok(())
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), GatewayError> {
        let mut state = self.lock();
        state.storage_calls.push(StorageCall::Remove(paths.to_vec()));
        if state.fail_removes {
            return Err(backend_error(500, Some("internal"), "remove rejected"));
        }
        for p in paths {
            state.objects.remove(&format!("{}/{}", bucket, p));
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("https://memory.test/storage/v1/object/public/{}/{}", bucket, path)
    }
}
