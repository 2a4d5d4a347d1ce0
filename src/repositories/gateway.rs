// src/repositories/gateway.rs
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Postgres SQLSTATE for `foreign_key_violation`, surfaced by PostgREST in
/// the `code` field of its error body.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("supabase error ({status}): {message}")]
    Supabase {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("other: {0}")]
    Other(String),
}

impl GatewayError {
    /// Build an error from a non-2xx backend response. Both the PostgREST
    /// shape (`code`/`message`/`details`) and the storage API shape
    /// (`statusCode`/`error`/`message`) are understood.
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            code: Option<Value>,
            error: Option<String>,
            message: Option<String>,
            details: Option<String>,
        }

        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => {
                let code = match parsed.code {
                    Some(Value::String(s)) => Some(s),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    _ => parsed.error.clone(),
                };
                let mut message = parsed
                    .message
                    .or(parsed.error)
                    .unwrap_or_else(|| body.to_string());
                if let Some(details) = parsed.details.filter(|d| !d.is_empty()) {
                    message = format!("{} ({})", message, details);
                }
                GatewayError::Supabase { status, code, message }
            }
            Err(_) => GatewayError::Supabase {
                status,
                code: None,
                message: if body.is_empty() {
                    format!("request failed with status {}", status)
                } else {
                    body.to_string()
                },
            },
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            GatewayError::Supabase { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            GatewayError::Supabase { message, .. } => {
                self.code() == Some(FOREIGN_KEY_VIOLATION)
                    || message.to_ascii_lowercase().contains("foreign key")
            }
            _ => false,
        }
    }
}

/// Row filter, rendered as a PostgREST operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    In(String, Vec<Value>),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(column.to_string(), value.into())
    }

    pub fn in_list<V: Into<Value>>(column: &str, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In(column.to_string(), values.into_iter().map(Into::into).collect())
    }

    /// `(column, "eq.5")` / `(column, "in.(1,2)")`
    pub fn to_query_pair(&self) -> (String, String) {
        match self {
            Filter::Eq(col, v) => (col.clone(), format!("eq.{}", scalar(v, false))),
            Filter::In(col, vs) => {
                let items: Vec<String> = vs.iter().map(|v| scalar(v, true)).collect();
                (col.clone(), format!("in.({})", items.join(",")))
            }
        }
    }

    /// Evaluate the filter against a JSON row. Used by the in-memory gateway.
    #[cfg(test)]
    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Filter::Eq(col, v) => row.get(col).map(|field| field == v).unwrap_or(false),
            Filter::In(col, vs) => row
                .get(col)
                .map(|field| vs.iter().any(|v| v == field))
                .unwrap_or(false),
        }
    }
}

fn scalar(v: &Value, quote_strings: bool) -> String {
    match v {
        Value::String(s) if quote_strings => format!("\"{}\"", s.replace('"', "\\\"")),
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Read query against one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub columns: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Select {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(Order { column: column.to_string(), ascending: false });
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some(Order { column: column.to_string(), ascending: true });
        self
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![(
            "select".to_string(),
            self.columns.clone().unwrap_or_else(|| "*".to_string()),
        )];
        pairs.extend(self.filters.iter().map(Filter::to_query_pair));
        if let Some(order) = &self.order {
            let dir = if order.ascending { "asc" } else { "desc" };
            pairs.push(("order".to_string(), format!("{}.{}", order.column, dir)));
        }
        pairs
    }
}

/// The single handle every workflow uses to reach the hosted backend:
/// table reads and writes plus object storage for complaint photos.
#[async_trait]
pub trait DataGateway: Send + Sync {
    async fn select(&self, table: &str, query: &Select) -> Result<Vec<Value>, GatewayError>;

    /// Insert one row and return it as stored.
    async fn insert(&self, table: &str, row: Value) -> Result<Value, GatewayError>;

    /// Merge `patch` into every matching row; returns the updated rows.
    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, GatewayError>;

    /// Returns the deleted rows. Deleting nothing is not an error.
    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, GatewayError>;

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), GatewayError>;

    /// Remove objects. Paths that do not exist are ignored.
    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), GatewayError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}
