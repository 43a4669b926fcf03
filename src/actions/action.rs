//! # Action: type discriminator plus opaque payload.
//!
//! An [`Action`] is what producers (UI events, network responses, ...) hand to
//! [`Dispatcher::dispatch`](crate::Dispatcher::dispatch). The dispatcher never
//! looks inside the payload; it only requires a non-blank `type`.
//!
//! ## Wire shape
//! ```text
//! { "type": "cart/add", "payload": { "sku": "A-1" } }
//! ```
//! `payload` may be omitted and defaults to `null`.
//!
//! ## Example
//! ```rust
//! use serde_json::json;
//! use storevisor::Action;
//!
//! let action = Action::try_from(json!({ "type": "cart/add", "payload": { "sku": "A-1" } })).unwrap();
//! assert_eq!(action.kind(), "cart/add");
//! assert_eq!(action.payload()["sku"], "A-1");
//!
//! assert!(Action::try_from(json!({ "payload": 1 })).is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DispatchError;

/// Immutable event delivered to all stores in one pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

impl Action {
    /// Creates an action from a type discriminator and a payload.
    ///
    /// The type is validated when the action is dispatched.
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Creates an action with a `null` payload.
    pub fn signal(kind: impl Into<String>) -> Self {
        Self::new(kind, Value::Null)
    }

    /// Returns the type discriminator.
    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the payload.
    #[inline]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Checks that the action carries a usable type.
    pub(crate) fn validate(&self) -> Result<(), DispatchError> {
        if self.kind.trim().is_empty() {
            return Err(DispatchError::InvalidAction {
                reason: "type is blank".to_string(),
            });
        }
        Ok(())
    }
}

impl TryFrom<Value> for Action {
    type Error = DispatchError;

    /// Parses `{ "type": <string>, "payload": <any> }`.
    ///
    /// Fails with [`DispatchError::InvalidAction`] when the value is not an
    /// object, or its `type` is missing, not a string, or blank.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut fields) = value else {
            return Err(DispatchError::InvalidAction {
                reason: "action must be an object".to_string(),
            });
        };

        let kind = match fields.remove("type") {
            Some(Value::String(kind)) => kind,
            Some(other) => {
                return Err(DispatchError::InvalidAction {
                    reason: format!("type must be a string, got {other}"),
                })
            }
            None => {
                return Err(DispatchError::InvalidAction {
                    reason: "type is missing".to_string(),
                })
            }
        };

        let action = Action::new(kind, fields.remove("payload").unwrap_or(Value::Null));
        action.validate()?;
        Ok(action)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)
    }
}
