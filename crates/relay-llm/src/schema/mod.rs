//! Output schemas for structured responses
//!
//! The driver only needs two things from a schema: a JSON Schema document
//! to send upstream and a way to validate the returned text. Anything that
//! implements [`OutputSchema`] can be attached; [`TypedSchema`] covers Rust
//! types deriving `serde` and `schemars::JsonSchema`.

mod agent;

use std::fmt;
use std::marker::PhantomData;

use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use agent::{AgentAction, ElementId, Reward};

/// Error returned when model output does not satisfy a schema
#[derive(Debug, Error)]
#[error("output does not match schema `{schema}`: {reason}")]
pub struct SchemaError {
    /// Name of the schema that rejected the output
    pub schema: String,
    /// Parser message
    pub reason: String,
}

/// Schema used to constrain and validate model output
pub trait OutputSchema: Send + Sync {
    /// Schema name sent as `json_schema.name`
    fn name(&self) -> &str;

    /// JSON Schema document sent as `json_schema.schema`
    fn json_schema(&self) -> serde_json::Value;

    /// Validate raw model output and return the parsed object
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the text is not JSON or does not match the schema
    fn parse(&self, raw: &str) -> Result<serde_json::Value, SchemaError>;
}

/// [`OutputSchema`] backed by a Rust type
pub struct TypedSchema<T> {
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T> {
    /// Create a schema with the given `json_schema.name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedSchema")
            .field("name", &self.name)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> OutputSchema for TypedSchema<T>
where
    T: JsonSchema + DeserializeOwned + Serialize,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn json_schema(&self) -> serde_json::Value {
        schemars::schema_for!(T).to_value()
    }

    fn parse(&self, raw: &str) -> Result<serde_json::Value, SchemaError> {
        let reject = |reason: String| SchemaError {
            schema: self.name.clone(),
            reason,
        };

        let typed: T = serde_json::from_str(raw.trim()).map_err(|e| reject(e.to_string()))?;
        serde_json::to_value(typed).map_err(|e| reject(e.to_string()))
    }
}
