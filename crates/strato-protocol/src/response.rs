use serde_json::{Map, Value};
use strato_codec::{json_kind, CodecError, TransportCodec};
use strato_model::Entity;

use crate::error::{ProtocolError, ProtocolResult};
use crate::status::{self, OperationKind, Outcome};

/// Per-key outcome recorded in a batch response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Created,
    Updated,
    /// The key is absent from the success map (or carries no disposition
    /// string); error detail, if any, lives in the errors map.
    Missing,
}

impl Disposition {
    fn from_literal(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            _ => None,
        }
    }
}

/// One decoded entry of the success map.
#[derive(Debug)]
pub enum SuccessEntry {
    /// The server echoed a full object body.
    Object(Entity),
    /// The server recorded a bulk-operation disposition.
    Disposition(Disposition),
}

/// A parsed batch response.
///
/// Batch operations can partially succeed: some keys created, some updated,
/// some rejected, all in one HTTP exchange. Parsing is best-effort per key —
/// one malformed entry never corrupts interpretation of the rest — and the
/// result exposes three independent query axes: success/error membership,
/// per-key disposition, and decoded entities.
#[derive(Debug)]
pub struct BatchResponse {
    operation: OperationKind,
    status_code: u16,
    entries: Vec<(String, SuccessEntry)>,
    decode_failures: Vec<(String, CodecError)>,
    errors: Map<String, Value>,
}

impl BatchResponse {
    /// Parse a raw response body.
    ///
    /// The body is a JSON object with optional `success` and `errors` maps;
    /// absence of either is valid. A success entry that fails to decode, or
    /// whose value is neither an object nor a recognized disposition string,
    /// is recorded as a per-key decode failure while its siblings continue
    /// to parse.
    pub fn parse(
        codec: &TransportCodec<'_>,
        raw_body: &str,
        status_code: u16,
        operation: OperationKind,
    ) -> ProtocolResult<Self> {
        let body: Value = if raw_body.trim().is_empty() {
            Value::Object(Map::new())
        } else {
            serde_json::from_str(raw_body)?
        };
        let body = body
            .as_object()
            .ok_or_else(|| ProtocolError::MalformedBody("top level is not an object".into()))?;

        let mut entries = Vec::new();
        let mut decode_failures = Vec::new();

        if let Some(success) = body.get("success") {
            let success = success.as_object().ok_or_else(|| {
                ProtocolError::MalformedBody("`success` is not an object".into())
            })?;
            for (key, value) in success {
                match value {
                    Value::Object(_) => match codec.decode(value, None) {
                        Ok(entity) => entries.push((key.clone(), SuccessEntry::Object(entity))),
                        Err(e) => {
                            tracing::warn!(key = %key, error = %e, "success entry failed to decode");
                            decode_failures.push((key.clone(), e));
                        }
                    },
                    Value::String(s) => match Disposition::from_literal(s) {
                        Some(d) => entries.push((key.clone(), SuccessEntry::Disposition(d))),
                        None => {
                            let e = CodecError::ShapeMismatch {
                                field: key.clone(),
                                expected: "entity object or disposition literal",
                                found: format!("string {s:?}"),
                            };
                            tracing::warn!(key = %key, error = %e, "unrecognized disposition literal");
                            decode_failures.push((key.clone(), e));
                        }
                    },
                    other => {
                        let e = CodecError::ShapeMismatch {
                            field: key.clone(),
                            expected: "entity object or disposition literal",
                            found: json_kind(other).to_owned(),
                        };
                        tracing::warn!(key = %key, error = %e, "unsupported success entry shape");
                        decode_failures.push((key.clone(), e));
                    }
                }
            }
        }

        let errors = match body.get("errors") {
            None => Map::new(),
            Some(errors) => errors
                .as_object()
                .ok_or_else(|| ProtocolError::MalformedBody("`errors` is not an object".into()))?
                .clone(),
        };

        Ok(Self {
            operation,
            status_code,
            entries,
            decode_failures,
            errors,
        })
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Status classification for this response's operation kind.
    pub fn outcome(&self) -> Outcome {
        status::classify(self.operation, self.status_code)
    }

    /// All successfully decoded entities, in the success map's insertion
    /// order. Disposition-string entries are excluded. The iterator borrows,
    /// so the sequence is finite and re-iterable.
    pub fn success_objects(&self) -> impl Iterator<Item = &Entity> {
        self.entries.iter().filter_map(|(_, entry)| match entry {
            SuccessEntry::Object(entity) => Some(entity),
            SuccessEntry::Disposition(_) => None,
        })
    }

    /// Keys of the success map, in insertion order (decode failures
    /// excluded; they surface through [`Self::decode_failure`]).
    pub fn success_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// The decoded entity recorded under `key`, when that entry carried an
    /// object body rather than a disposition string.
    pub fn success_object(&self, key: &str) -> Option<&Entity> {
        self.entries.iter().find_map(|(k, entry)| match entry {
            SuccessEntry::Object(entity) if k == key => Some(entity),
            _ => None,
        })
    }

    pub fn has_success_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn has_error_key(&self, key: &str) -> bool {
        self.errors.contains_key(key)
    }

    /// Raw error detail recorded by the server for a key.
    pub fn error_node(&self, key: &str) -> Option<&Value> {
        self.errors.get(key)
    }

    /// The decode failure recorded for a key during best-effort parsing.
    pub fn decode_failure(&self, key: &str) -> Option<&CodecError> {
        self.decode_failures
            .iter()
            .find_map(|(k, e)| (k == key).then_some(e))
    }

    /// Created/Updated from the disposition string recorded under `key`;
    /// Missing when the key carries no disposition (absent, entity-valued,
    /// or failed to decode). Callers needing error detail use the errors
    /// accessors separately.
    pub fn key_disposition(&self, key: &str) -> Disposition {
        self.entries
            .iter()
            .find_map(|(k, entry)| match entry {
                SuccessEntry::Disposition(d) if k == key => Some(*d),
                _ => None,
            })
            .unwrap_or(Disposition::Missing)
    }

    /// `true` when the errors map is non-empty, any per-key decode failure
    /// was recorded, or the status code classifies as non-success for this
    /// operation kind.
    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
            || !self.decode_failures.is_empty()
            || !status::is_success(self.operation, self.status_code)
    }
}
