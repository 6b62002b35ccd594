use crate::calc::CalcError;
use crate::ipc::error::err;
use crate::ipc::types::AppState;
use crate::store::Store;

/// Handler-level failure mapped onto the error envelope.
pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::new("bad_params", message)
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<CalcError> for HandlerErr {
    fn from(e: CalcError) -> Self {
        // CalcError codes are already wire codes (e.g. not_found).
        let code: &'static str = match e.code.as_str() {
            "not_found" => "not_found",
            "conflict" => "conflict",
            "invalid_reference" => "invalid_reference",
            "invalid_state" => "invalid_state",
            _ => "calc_failed",
        };
        Self::new(code, e.message)
    }
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_required_i64(params: &serde_json::Value, key: &str) -> Result<i64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_required_f64(params: &serde_json::Value, key: &str) -> Result<f64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn require_store(state: &AppState) -> Result<&Store, HandlerErr> {
    state
        .store
        .as_ref()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

pub fn require_store_mut(state: &mut AppState) -> Result<&mut Store, HandlerErr> {
    state
        .store
        .as_mut()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

/// Mutations write the whole snapshot after the in-memory update; a failed
/// write is reported instead of silently keeping divergent state.
pub fn persist(store: &Store) -> Result<(), HandlerErr> {
    store
        .persist()
        .map_err(|e| HandlerErr::new("persist_failed", format!("{e:#}")))
}

pub fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, HandlerErr> {
    serde_json::to_value(value)
        .map_err(|e| HandlerErr::new("serialize_failed", e.to_string()))
}
