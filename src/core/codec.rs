//! Document codec: wire documents ⇄ typed records
//!
//! A [`RecordCodec`] is built once per resource. At construction it
//! serializes the record prototype (`T::default()`) to enumerate the declared
//! fields and precomputes the field ⇄ wire-key table, so that encoding and
//! decoding are exact inverses for every declared field.
//!
//! # Document shapes
//!
//! Encoding always wraps records in a `data` member:
//!
//! ```json
//! {"data": {"id": "1", "title": "hi", "viewCount": 0}}
//! {"data": [{"id": "1", ...}, {"id": "2", ...}]}
//! ```
//!
//! Decoding accepts that envelope, an envelope keyed by the resource name
//! (`{"posts": [...]}`), or a bare object describing a single record
//! (`{"title": "hi"}`).
//!
//! # Partial merge
//!
//! Decoding assigns only the keys present in the document. The target record
//! is serialized, the present keys are overwritten, and the result is
//! deserialized back; every other field keeps the target's value.

use crate::core::error::{ApiError, ApiResult, DecodeError, HttpError, RegistrationError};
use crate::core::naming::NamingStrategy;
use crate::core::record::{Payload, Record};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Member name of the document envelope produced by [`RecordCodec::encode`]
pub const DATA_KEY: &str = "data";

/// Declared field holding a record's identity
pub const ID_FIELD: &str = "id";

/// Codec specialized to one record type
pub struct RecordCodec<T> {
    resource_name: String,
    naming: Arc<dyn NamingStrategy>,
    /// declared field name -> wire key
    wire_keys: HashMap<String, String>,
    /// wire key -> declared field name
    fields: HashMap<String, String>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> RecordCodec<T> {
    /// Build the codec for `T`, inspecting its prototype
    pub fn new(
        resource_name: impl Into<String>,
        naming: Arc<dyn NamingStrategy>,
    ) -> Result<Self, RegistrationError> {
        let type_name = T::type_name();
        let prototype =
            serde_json::to_value(T::default()).map_err(|e| RegistrationError::Prototype {
                type_name,
                message: e.to_string(),
            })?;

        let Value::Object(declared) = prototype else {
            return Err(RegistrationError::NotAStruct {
                type_name,
                found: json_kind(&prototype),
            });
        };

        let mut wire_keys = HashMap::new();
        let mut fields: HashMap<String, String> = HashMap::new();
        for field in declared.keys() {
            let wire_key = naming.wire_key(field);
            if let Some(existing) = fields.get(&wire_key) {
                return Err(RegistrationError::AmbiguousField {
                    type_name,
                    first: existing.clone(),
                    second: field.clone(),
                    wire_key,
                });
            }
            fields.insert(wire_key.clone(), field.clone());
            wire_keys.insert(field.clone(), wire_key);
        }

        Ok(Self {
            resource_name: resource_name.into(),
            naming,
            wire_keys,
            fields,
            _record: PhantomData,
        })
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// Wire keys of all declared fields
    pub fn wire_keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    fn wire_key_for(&self, field: &str) -> String {
        self.wire_keys
            .get(field)
            .cloned()
            .unwrap_or_else(|| self.naming.wire_key(field))
    }

    fn field_for(&self, key: &str) -> String {
        if let Some(field) = self.fields.get(key) {
            return field.clone();
        }
        if self.wire_keys.contains_key(key) {
            return key.to_string();
        }
        self.naming.field_name(key)
    }

    fn is_field_key(&self, key: &str) -> bool {
        self.fields.contains_key(key) || self.wire_keys.contains_key(key)
    }

    // -------------------------------------------------------------------------
    // Decoding
    // -------------------------------------------------------------------------

    /// Split a document into the record objects it describes
    fn objects<'a>(&self, document: &'a Value) -> Result<Vec<&'a Map<String, Value>>, DecodeError> {
        let Value::Object(root) = document else {
            return Err(DecodeError::InvalidDocument {
                message: format!("expected a JSON object, got {}", json_kind(document)),
            });
        };

        let envelope = match root.iter().next() {
            Some((key, inner))
                if root.len() == 1
                    && (key == DATA_KEY || *key == self.resource_name)
                    && !self.is_field_key(key) =>
            {
                Some(inner)
            }
            _ => None,
        };

        let Some(inner) = envelope else {
            return Ok(vec![root]);
        };

        match inner {
            Value::Null => Ok(Vec::new()),
            Value::Object(obj) => Ok(vec![obj]),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Object(obj) => Ok(obj),
                    other => Err(DecodeError::InvalidDocument {
                        message: format!("element {} is {}, expected an object", i, json_kind(other)),
                    }),
                })
                .collect(),
            other => Err(DecodeError::InvalidDocument {
                message: format!("expected an object or a list of objects, got {}", json_kind(other)),
            }),
        }
    }

    /// Decode every record described by `document`
    ///
    /// The i-th object in the document is merged onto `targets[i]` when
    /// present, or onto `T::default()` otherwise. Targets beyond the number
    /// of objects are dropped.
    pub fn decode(&self, document: &Value, targets: Vec<T>) -> Result<Vec<T>, DecodeError> {
        let objects = self.objects(document)?;
        let mut targets = targets.into_iter();

        objects
            .into_iter()
            .map(|obj| {
                let base = targets.next().unwrap_or_default();
                self.merge(base, obj)
            })
            .collect()
    }

    /// Decode a document that must describe exactly one record
    pub fn decode_one(&self, document: &Value, base: T) -> ApiResult<T> {
        let mut records = self.decode(document, vec![base])?;
        if records.len() != 1 {
            return Err(HttpError::bad_request(format!(
                "expected exactly one object, got {}",
                records.len()
            ))
            .into());
        }
        records
            .pop()
            .ok_or_else(|| ApiError::internal("decoded record vanished"))
    }

    /// The `id` a document assigns, if any
    ///
    /// Looks at every object the document describes and returns the first
    /// string or numeric value under the `id` field's wire key (or its
    /// declared name). Records without an `id` field never carry one.
    pub fn document_id(&self, document: &Value) -> Result<Option<String>, DecodeError> {
        let Some(wire_key) = self.wire_keys.get(ID_FIELD) else {
            return Ok(None);
        };

        let id = self.objects(document)?.into_iter().find_map(|obj| {
            match obj.get(wire_key.as_str()).or_else(|| obj.get(ID_FIELD))? {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }
        });
        Ok(id)
    }

    /// Assign the present keys of `incoming` onto `base`
    fn merge(&self, base: T, incoming: &Map<String, Value>) -> Result<T, DecodeError> {
        let base = match serde_json::to_value(&base) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(DecodeError::Record {
                    message: format!("record serialized to {}", json_kind(&other)),
                });
            }
            Err(e) => return Err(DecodeError::Record { message: e.to_string() }),
        };

        let assignments: Vec<(&str, String)> = incoming
            .keys()
            .map(|key| (key.as_str(), self.field_for(key)))
            .collect();

        let mut merged = base.clone();
        for (key, field) in &assignments {
            merged.insert(field.clone(), incoming[*key].clone());
        }

        match serde_json::from_value::<T>(Value::Object(merged)) {
            Ok(record) => Ok(record),
            Err(e) => Err(self.locate_failure(&base, incoming, &assignments, e)),
        }
    }

    /// Find which assigned key made the merged record invalid
    fn locate_failure(
        &self,
        base: &Map<String, Value>,
        incoming: &Map<String, Value>,
        assignments: &[(&str, String)],
        error: serde_json::Error,
    ) -> DecodeError {
        for (key, field) in assignments {
            let mut single = base.clone();
            single.insert(field.clone(), incoming[*key].clone());
            if let Err(e) = serde_json::from_value::<T>(Value::Object(single)) {
                return DecodeError::FieldType {
                    field: (*key).to_string(),
                    message: e.to_string(),
                };
            }
        }

        DecodeError::Record {
            message: error.to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // Encoding
    // -------------------------------------------------------------------------

    fn encode_record(&self, record: &T) -> ApiResult<Value> {
        match serde_json::to_value(record).map_err(|e| ApiError::Internal(e.into()))? {
            Value::Object(map) => Ok(Value::Object(
                map.into_iter()
                    .map(|(field, value)| (self.wire_key_for(&field), value))
                    .collect(),
            )),
            other => Err(ApiError::internal(format!(
                "record `{}` serialized to {}",
                T::type_name(),
                json_kind(&other)
            ))),
        }
    }

    /// Encode records as a document value, keeping the payload's shape
    pub fn encode_value(&self, payload: &Payload<T>) -> ApiResult<Value> {
        let data = match payload {
            Payload::One(record) => self.encode_record(record)?,
            Payload::Many(records) => Value::Array(
                records
                    .iter()
                    .map(|r| self.encode_record(r))
                    .collect::<ApiResult<_>>()?,
            ),
        };

        let mut document = Map::new();
        document.insert(DATA_KEY.to_string(), data);
        Ok(Value::Object(document))
    }

    /// Encode records to response bytes
    pub fn encode(&self, payload: &Payload<T>) -> ApiResult<Vec<u8>> {
        let document = self.encode_value(payload)?;
        serde_json::to_vec(&document).map_err(|e| ApiError::Internal(e.into()))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
