//! Request handler registry
//!
//! The transport layer is not part of this crate. It hands a method name
//! and the JSON parameter array to [`RpcRegistry::call`] and serializes
//! whatever comes back.
//!
//! ```ignore
//! let registry = RpcRegistry::new();
//! let result = registry.call(&service, "search_code", &json!(["plot"]))?;
//! ```

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::service::CodeSearchService;
use crate::symbol::SearchError;

/// Failures reported back to the request layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// Missing or malformed parameters
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unknown method: {0}")]
    MethodNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SearchError> for RpcError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidQuery(msg) => RpcError::InvalidQuery(msg),
        }
    }
}

/// A request handler: positional JSON params in, JSON result out
pub type RpcHandler = fn(&CodeSearchService, &[Value]) -> Result<Value, RpcError>;

/// Method table built once at construction
pub struct RpcRegistry {
    methods: BTreeMap<&'static str, RpcHandler>,
}

impl Default for RpcRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcRegistry {
    pub fn new() -> Self {
        let mut methods: BTreeMap<&'static str, RpcHandler> = BTreeMap::new();
        methods.insert("search_code", search_code);
        Self { methods }
    }

    /// Registered method names, sorted
    pub fn methods(&self) -> Vec<&'static str> {
        self.methods.keys().copied().collect()
    }

    pub fn contains(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Dispatch `method` with `params` (a JSON array; `null` means no params)
    pub fn call(
        &self,
        service: &CodeSearchService,
        method: &str,
        params: &Value,
    ) -> Result<Value, RpcError> {
        let handler = self
            .methods
            .get(method)
            .ok_or_else(|| RpcError::MethodNotFound(method.to_string()))?;

        let params: &[Value] = match params {
            Value::Array(values) => values,
            Value::Null => &[],
            other => {
                return Err(RpcError::InvalidQuery(format!(
                    "params must be an array, got {}",
                    other
                )))
            }
        };

        debug!("Dispatching {} with {} params", method, params.len());
        handler(service, params)
    }
}

/// `search_code(term, prefixOnly?)` -> `[{name, context, line, column}]`
fn search_code(service: &CodeSearchService, params: &[Value]) -> Result<Value, RpcError> {
    let term = match params.first() {
        Some(Value::String(term)) => term,
        Some(other) => {
            return Err(RpcError::InvalidQuery(format!(
                "term must be a string, got {}",
                other
            )))
        }
        None => return Err(RpcError::InvalidQuery("missing term".to_string())),
    };

    let prefix_only = match params.get(1) {
        None | Some(Value::Null) => None,
        Some(Value::Bool(flag)) => Some(*flag),
        Some(other) => {
            return Err(RpcError::InvalidQuery(format!(
                "prefixOnly must be a boolean, got {}",
                other
            )))
        }
    };

    let records = service.search_code(term, prefix_only)?;
    serde_json::to_value(records).map_err(|e| RpcError::Internal(e.to_string()))
}
