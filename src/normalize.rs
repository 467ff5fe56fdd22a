//! The single place where backend failures are logged and unified.
//!
//! Every operation funnels its round trips through [`handle`] (directly or via
//! [`fetch_rows`], [`fetch_one`], [`call_procedure`]), so each failure is
//! logged exactly once, where it is detected, and then propagated with `?`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::future::Future;
use tracing::error;

use crate::backend::{Backend, Query, Request};
use crate::error::{DataError, DataResult};

/// Await a backend call; on failure log it against `operation` and hand the
/// error back unchanged.
pub async fn handle<T, F>(operation: &'static str, call: F) -> DataResult<T>
where
    F: Future<Output = DataResult<T>>,
{
    match call.await {
        Ok(data) => Ok(data),
        Err(err) => {
            error!(operation, kind = ?err.kind(), error = %err, "backend call failed");
            Err(err)
        }
    }
}

/// Decode a response into typed rows. Shape mismatches are logged and turned
/// into [`DataError::Decode`].
pub fn decode<R: DeserializeOwned>(operation: &'static str, value: Value) -> DataResult<R> {
    serde_json::from_value(value).map_err(|err| {
        error!(operation, error = %err, "unexpected response shape");
        DataError::Decode {
            operation,
            message: err.to_string(),
        }
    })
}

/// Run a request expected to return a list of rows. An empty body counts as
/// an empty list.
pub async fn fetch_rows<R: DeserializeOwned>(
    backend: &dyn Backend,
    operation: &'static str,
    request: Request,
) -> DataResult<Vec<R>> {
    let value = handle(operation, backend.execute(&request)).await?;
    if value.is_null() {
        return Ok(Vec::new());
    }
    decode(operation, value)
}

/// Run a request expected to return exactly one row.
pub async fn fetch_one<R: DeserializeOwned>(
    backend: &dyn Backend,
    operation: &'static str,
    request: Request,
) -> DataResult<R> {
    let value = handle(operation, backend.execute(&request)).await?;
    decode(operation, value)
}

/// Run a request whose response body is irrelevant (deletes, bulk updates).
pub async fn execute(
    backend: &dyn Backend,
    operation: &'static str,
    request: Request,
) -> DataResult<()> {
    handle(operation, backend.execute(&request)).await.map(|_| ())
}

/// Number of rows matching `query`, counted server-side.
pub async fn fetch_count(
    backend: &dyn Backend,
    operation: &'static str,
    query: Query,
) -> DataResult<u64> {
    let value = handle(operation, backend.execute(&Request::Count(query))).await?;
    decode(operation, value)
}

#[derive(Deserialize)]
struct ProcedureEnvelope {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

/// Check the `{success, error?, ...payload}` envelope returned by the `_safe`
/// procedures and decode the payload fields into `P`.
pub fn unwrap_procedure<P: DeserializeOwned>(
    operation: &'static str,
    value: Value,
    default_message: &str,
) -> DataResult<P> {
    let envelope: ProcedureEnvelope = decode(operation, value)?;
    if !envelope.success {
        let message = envelope
            .error
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_message.to_string());
        error!(operation, %message, "procedure reported failure");
        return Err(DataError::Procedure(message));
    }
    decode(operation, Value::Object(envelope.payload))
}

/// Invoke a stored procedure and unwrap its envelope. A transport or backend
/// error returns before the payload is looked at.
pub async fn call_procedure<P: DeserializeOwned>(
    backend: &dyn Backend,
    operation: &'static str,
    name: &str,
    args: Value,
    default_message: &str,
) -> DataResult<P> {
    let value = handle(operation, backend.execute(&Request::rpc(name, args))).await?;
    unwrap_procedure(operation, value, default_message)
}
