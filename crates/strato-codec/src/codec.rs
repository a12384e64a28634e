use serde_json::{Map, Number, Value};
use strato_model::{Entity, FieldValue, Persistable};
use strato_registry::{ClassRegistry, Resolution};
use strato_types::{keys, GeoPoint, ObjectId, Timestamp};

use crate::error::{CodecError, CodecResult};

/// Nesting limit for entity graphs. Owned entity trees cannot alias, so a
/// graph deeper than this is treated as cyclic and rejected.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Converts between entity graphs and the JSON transport form.
///
/// Encoding embeds the reserved `__class__` / `__id__` / `__services__` keys
/// alongside application fields; decoding resolves the class tag through a
/// [`ClassRegistry`] and recognizes the geo-point and date special forms
/// before falling back to generic entity decoding.
pub struct TransportCodec<'a> {
    registry: &'a ClassRegistry,
}

impl<'a> TransportCodec<'a> {
    pub fn new(registry: &'a ClassRegistry) -> Self {
        Self { registry }
    }

    /// Codec over the process-wide registry.
    pub fn global() -> TransportCodec<'static> {
        TransportCodec {
            registry: ClassRegistry::global(),
        }
    }

    pub fn registry(&self) -> &ClassRegistry {
        self.registry
    }

    // ---- Encoding ----

    /// Encode an entity graph to a JSON object node.
    ///
    /// A nested entity whose (class tag, id) pair already appears on the
    /// encoding path is flattened to a by-id reference node rather than
    /// recursed into; graphs nested past [`MAX_NESTING_DEPTH`] fail with
    /// [`CodecError::CyclicGraph`].
    pub fn encode(&self, entity: &Entity) -> CodecResult<Value> {
        let mut path = Vec::new();
        self.encode_entity(entity, &mut path)
    }

    fn encode_entity(
        &self,
        entity: &Entity,
        path: &mut Vec<(String, String)>,
    ) -> CodecResult<Value> {
        if path.len() >= MAX_NESTING_DEPTH {
            return Err(CodecError::CyclicGraph {
                limit: MAX_NESTING_DEPTH,
            });
        }

        let visit = entity
            .object_id()
            .map(|id| (entity.class_tag().to_owned(), id.as_str().to_owned()));
        if let Some(pair) = &visit {
            if path.contains(pair) {
                tracing::debug!(class = %pair.0, id = %pair.1, "flattening repeated node to by-id reference");
                return Ok(reference_node(&pair.0, &pair.1));
            }
            path.push(pair.clone());
        } else {
            // Transient nodes have no identity to reference, so only the
            // depth guard protects against a pathological graph.
            path.push((entity.class_tag().to_owned(), String::new()));
        }

        let mut map = Map::new();
        map.insert(
            keys::CLASS_KEY.to_owned(),
            Value::String(entity.class_tag().to_owned()),
        );
        if let Some(id) = entity.object_id() {
            map.insert(keys::ID_KEY.to_owned(), Value::String(id.as_str().to_owned()));
        }
        if !entity.services().is_empty() {
            map.insert(
                keys::SERVICES_KEY.to_owned(),
                Value::Array(
                    entity
                        .services()
                        .iter()
                        .map(|s| Value::String(s.clone()))
                        .collect(),
                ),
            );
        }
        for (name, value) in entity.fields() {
            map.insert(name.to_owned(), self.encode_value(value, path)?);
        }

        path.pop();
        Ok(Value::Object(map))
    }

    fn encode_value(
        &self,
        value: &FieldValue,
        path: &mut Vec<(String, String)>,
    ) -> CodecResult<Value> {
        match value {
            FieldValue::Null => Ok(Value::Null),
            FieldValue::Bool(b) => Ok(Value::Bool(*b)),
            FieldValue::Int(i) => Ok(Value::Number((*i).into())),
            FieldValue::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .ok_or(CodecError::NonFiniteNumber(*f)),
            FieldValue::Str(s) => Ok(Value::String(s.clone())),
            FieldValue::Date(ts) => Ok(Value::String(ts.to_rfc3339())),
            FieldValue::Geo(geo) => {
                let mut map = Map::new();
                map.insert(
                    keys::CLASS_KEY.to_owned(),
                    Value::String(GeoPoint::CLASS_TAG.to_owned()),
                );
                map.insert("latitude".to_owned(), json_f64(geo.latitude)?);
                map.insert("longitude".to_owned(), json_f64(geo.longitude)?);
                Ok(Value::Object(map))
            }
            FieldValue::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.encode_value(item, path)?);
                }
                Ok(Value::Array(out))
            }
            FieldValue::Entity(nested) => self.encode_entity(nested, path),
            FieldValue::Reference {
                class_tag,
                object_id,
            } => Ok(reference_node(class_tag, object_id.as_str())),
        }
    }

    // ---- Decoding ----

    /// Decode a JSON object node into an entity.
    ///
    /// The class tag comes from the reserved `__class__` key, falling back to
    /// `expected_tag`; tag resolution goes through the registry, and an
    /// unresolvable tag without a supplied fallback fails with
    /// [`CodecError::UnknownClass`].
    pub fn decode(&self, node: &Value, expected_tag: Option<&str>) -> CodecResult<Entity> {
        self.decode_entity(node, expected_tag, 0)
    }

    fn decode_entity(
        &self,
        node: &Value,
        expected_tag: Option<&str>,
        depth: usize,
    ) -> CodecResult<Entity> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(CodecError::CyclicGraph {
                limit: MAX_NESTING_DEPTH,
            });
        }
        let obj = node.as_object().ok_or_else(|| CodecError::ShapeMismatch {
            field: keys::CLASS_KEY.to_owned(),
            expected: "object",
            found: json_kind(node).to_owned(),
        })?;

        let wire_tag = match obj.get(keys::CLASS_KEY) {
            None => None,
            Some(Value::String(s)) => Some(s.as_str()),
            Some(other) => {
                return Err(CodecError::ShapeMismatch {
                    field: keys::CLASS_KEY.to_owned(),
                    expected: "string",
                    found: json_kind(other).to_owned(),
                })
            }
        };
        let tag = self.resolve_tag(wire_tag, expected_tag)?;

        let mut entity = match obj.get(keys::ID_KEY) {
            None => Entity::new(tag),
            Some(Value::String(s)) => {
                let id = ObjectId::new(s.as_str()).map_err(|_| CodecError::ShapeMismatch {
                    field: keys::ID_KEY.to_owned(),
                    expected: "non-empty string",
                    found: "empty string".to_owned(),
                })?;
                Entity::with_id(tag, id)
            }
            Some(other) => {
                return Err(CodecError::ShapeMismatch {
                    field: keys::ID_KEY.to_owned(),
                    expected: "string",
                    found: json_kind(other).to_owned(),
                })
            }
        };

        if let Some(services) = obj.get(keys::SERVICES_KEY) {
            entity = entity.with_services(decode_services(services)?);
        }

        for (name, value) in obj {
            if keys::is_reserved(name) {
                continue;
            }
            let field = self.decode_value(name, value, depth)?;
            entity
                .set(name.clone(), field)
                .map_err(|e| CodecError::Serde(e.to_string()))?;
        }

        // A freshly decoded server copy has no unsaved local changes.
        entity.mark_clean();
        Ok(entity)
    }

    fn resolve_tag(
        &self,
        wire_tag: Option<&str>,
        expected_tag: Option<&str>,
    ) -> CodecResult<String> {
        let source = wire_tag
            .or(expected_tag)
            .ok_or(CodecError::MissingClassTag)?;
        match self.registry.resolve(source) {
            Resolution::Registered(descriptor) => Ok(descriptor.tag),
            Resolution::Native(name) => Ok(name),
            Resolution::Unknown => match expected_tag {
                Some(expected) => Ok(self
                    .registry
                    .resolve(expected)
                    .tag()
                    .unwrap_or(expected)
                    .to_owned()),
                None => Err(CodecError::UnknownClass(source.to_owned())),
            },
        }
    }

    fn decode_value(&self, field: &str, value: &Value, depth: usize) -> CodecResult<FieldValue> {
        match value {
            Value::Null => Ok(FieldValue::Null),
            Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            Value::Number(n) => Ok(decode_number(n)),
            Value::String(s) => Ok(match Timestamp::parse_rfc3339(s) {
                Ok(ts) => FieldValue::Date(ts),
                Err(_) => FieldValue::Str(s.clone()),
            }),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.decode_value(field, item, depth)?);
                }
                Ok(FieldValue::List(out))
            }
            Value::Object(obj) => {
                if obj.get(keys::REF_KEY).and_then(Value::as_bool) == Some(true) {
                    return decode_reference(field, obj);
                }
                if obj.get(keys::CLASS_KEY).and_then(Value::as_str) == Some(GeoPoint::CLASS_TAG) {
                    return decode_geo(field, obj);
                }
                let nested = self.decode_entity(value, None, depth + 1)?;
                Ok(FieldValue::Entity(Box::new(nested)))
            }
        }
    }

    // ---- Typed serde bridge ----

    /// The dynamic entity form of a typed value.
    pub fn entity_of<T: Persistable + 'static>(&self, value: &T) -> CodecResult<Entity> {
        let node = serde_json::to_value(value).map_err(|e| CodecError::Serde(e.to_string()))?;
        let tag = self.registry.tag_for::<T>();
        self.decode(&node, Some(&tag))
    }

    /// Encode a typed value straight to its JSON transport node.
    pub fn encode_typed<T: Persistable + 'static>(&self, value: &T) -> CodecResult<Value> {
        let entity = self.entity_of(value)?;
        self.encode(&entity)
    }

    /// Rebuild a typed value from its dynamic entity form.
    pub fn from_entity<T: Persistable>(&self, entity: &Entity) -> CodecResult<T> {
        let node = self.encode(entity)?;
        serde_json::from_value(node).map_err(|e| CodecError::Serde(e.to_string()))
    }

    /// Decode a JSON object node into a typed value.
    pub fn decode_typed<T: Persistable + 'static>(&self, node: &Value) -> CodecResult<T> {
        let tag = self.registry.tag_for::<T>();
        let entity = self.decode(node, Some(&tag))?;
        self.from_entity(&entity)
    }
}

/// Integral JSON numbers decode to `Int`, everything else to `Float`.
fn decode_number(n: &Number) -> FieldValue {
    if let Some(i) = n.as_i64() {
        FieldValue::Int(i)
    } else if let Some(u) = n.as_u64() {
        // Larger than i64::MAX: representable only as a float.
        FieldValue::Float(u as f64)
    } else {
        FieldValue::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn decode_reference(field: &str, obj: &Map<String, Value>) -> CodecResult<FieldValue> {
    let class_tag = obj
        .get(keys::CLASS_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| CodecError::ShapeMismatch {
            field: format!("{field}.{}", keys::CLASS_KEY),
            expected: "string",
            found: "missing".to_owned(),
        })?;
    let id = obj
        .get(keys::ID_KEY)
        .and_then(Value::as_str)
        .and_then(|s| ObjectId::new(s).ok())
        .ok_or_else(|| CodecError::ShapeMismatch {
            field: format!("{field}.{}", keys::ID_KEY),
            expected: "non-empty string",
            found: "missing".to_owned(),
        })?;
    Ok(FieldValue::Reference {
        class_tag: class_tag.to_owned(),
        object_id: id,
    })
}

fn decode_geo(field: &str, obj: &Map<String, Value>) -> CodecResult<FieldValue> {
    let coord = |name: &str| -> CodecResult<f64> {
        obj.get(name)
            .and_then(Value::as_f64)
            .ok_or_else(|| CodecError::ShapeMismatch {
                field: format!("{field}.{name}"),
                expected: "number",
                found: obj.get(name).map(json_kind).unwrap_or("missing").to_owned(),
            })
    };
    let geo = GeoPoint::new(coord("latitude")?, coord("longitude")?).map_err(|e| {
        CodecError::ShapeMismatch {
            field: field.to_owned(),
            expected: "geo coordinates in range",
            found: e.to_string(),
        }
    })?;
    Ok(FieldValue::Geo(geo))
}

fn decode_services(value: &Value) -> CodecResult<Vec<String>> {
    let items = value.as_array().ok_or_else(|| CodecError::ShapeMismatch {
        field: keys::SERVICES_KEY.to_owned(),
        expected: "array of strings",
        found: json_kind(value).to_owned(),
    })?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_owned)
                .ok_or_else(|| CodecError::ShapeMismatch {
                    field: keys::SERVICES_KEY.to_owned(),
                    expected: "string",
                    found: json_kind(item).to_owned(),
                })
        })
        .collect()
}

fn reference_node(class_tag: &str, id: &str) -> Value {
    let mut map = Map::new();
    map.insert(
        keys::CLASS_KEY.to_owned(),
        Value::String(class_tag.to_owned()),
    );
    map.insert(keys::ID_KEY.to_owned(), Value::String(id.to_owned()));
    map.insert(keys::REF_KEY.to_owned(), Value::Bool(true));
    Value::Object(map)
}

fn json_f64(f: f64) -> CodecResult<Value> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or(CodecError::NonFiniteNumber(f))
}

/// Short shape name of a JSON value, used in error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
