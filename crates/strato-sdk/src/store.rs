use std::sync::Arc;

use serde_json::{Map, Value};
use strato_codec::TransportCodec;
use strato_model::Entity;
use strato_protocol::{BatchResponse, OperationKind};
use strato_registry::ClassRegistry;
use strato_types::ObjectId;

use crate::error::{SdkError, SdkResult};
use crate::transport::{endpoints, Transport, TransportReply};

/// Outcome of a batch save: the parsed response plus the request key each
/// submitted entity was keyed under, in submission order. Transient entities
/// get a generated key, so the mapping is the only way to correlate them
/// back to response entries.
pub struct BatchSaveResult {
    pub response: BatchResponse,
    pub keys: Vec<String>,
}

/// High-level data store API.
///
/// Sequences the core pipeline: encode the entity graph, hand the request
/// body to the transport collaborator, and reconcile the batched response
/// back into per-object outcomes.
pub struct DataStore {
    registry: &'static ClassRegistry,
    transport: Arc<dyn Transport>,
}

impl DataStore {
    /// A store over the process-wide class registry.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            registry: ClassRegistry::global(),
            transport,
        }
    }

    pub fn registry(&self) -> &ClassRegistry {
        self.registry
    }

    fn codec(&self) -> TransportCodec<'static> {
        TransportCodec::new(self.registry)
    }

    // ---- Object operations ----

    /// Persist a batch of entities in one exchange. The returned response
    /// reports per-key dispositions; partial success is normal.
    ///
    /// Each entity is keyed by its object id, or by a generated request key
    /// while it is still transient; `keys` records the key used for each
    /// submitted entity.
    pub fn save_batch(&self, entities: &[Entity]) -> SdkResult<BatchSaveResult> {
        let codec = self.codec();
        let mut objects = Map::new();
        let mut keys = Vec::with_capacity(entities.len());
        for entity in entities {
            let key = match entity.object_id() {
                Some(id) => id.as_str().to_owned(),
                None => uuid::Uuid::new_v4().to_string(),
            };
            objects.insert(key.clone(), codec.encode(entity)?);
            keys.push(key);
        }
        let body = Value::Object(objects);

        tracing::debug!(count = entities.len(), "submitting batch save");
        let TransportReply { body, status } =
            self.transport.execute(endpoints::BATCH, &body)?;
        let response =
            BatchResponse::parse(&codec, &body, status, OperationKind::Create)?;
        if response.has_error() {
            tracing::debug!(status, "batch save reported errors");
        }
        Ok(BatchSaveResult { response, keys })
    }

    /// Persist one entity and reconcile the server copy back into it:
    /// adopts the server-assigned identity and clears the dirty flag.
    pub fn save(&self, entity: &mut Entity) -> SdkResult<()> {
        let BatchSaveResult { response, keys } =
            self.save_batch(std::slice::from_ref(entity))?;
        let server_copy = keys
            .first()
            .and_then(|key| response.success_object(key))
            .or_else(|| response.success_objects().next());
        match server_copy {
            Some(server_copy) => {
                let server_copy = server_copy.clone();
                entity.apply_update(&server_copy)?;
                Ok(())
            }
            None => {
                let outcome = response.outcome();
                Err(SdkError::UnexpectedStatus {
                    status: response.status_code(),
                    outcome,
                })
            }
        }
    }

    /// Load one entity by class tag and identity.
    pub fn load(&self, class_tag: &str, id: &ObjectId) -> SdkResult<Entity> {
        let request = serde_json::json!({ "class": class_tag, "id": id.as_str() });
        let TransportReply { body, status } =
            self.transport.execute(endpoints::OBJECT, &request)?;
        let outcome = strato_protocol::classify(OperationKind::Load, status);
        if !outcome.is_success() {
            if outcome == strato_protocol::Outcome::NotFound {
                return Err(SdkError::ObjectNotFound(id.as_str().to_owned()));
            }
            return Err(SdkError::UnexpectedStatus { status, outcome });
        }
        let node: Value = serde_json::from_str(&body)
            .map_err(strato_protocol::ProtocolError::Json)?;
        Ok(self.codec().decode(&node, Some(class_tag))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CannedTransport {
        replies: Mutex<Vec<TransportReply>>,
    }

    impl CannedTransport {
        fn replying(body: &str, status: u16) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(vec![TransportReply {
                    body: body.to_owned(),
                    status,
                }]),
            })
        }
    }

    impl Transport for CannedTransport {
        fn execute(&self, _endpoint: &str, _body: &Value) -> SdkResult<TransportReply> {
            self.replies
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| SdkError::Transport("no canned reply".into()))
        }
    }

    fn store(body: &str, status: u16) -> DataStore {
        ClassRegistry::global().register_named("Player", "game::records::Player");
        DataStore::new(CannedTransport::replying(body, status))
    }

    #[test]
    fn save_adopts_server_identity() {
        let body = r#"{
            "success": {
                "k1": { "__class__": "Player", "__id__": "srv-1", "name": "ada" }
            }
        }"#;
        let store = store(body, 200);
        let mut entity = Entity::new("Player");
        entity.set("name", "ada").unwrap();
        store.save(&mut entity).unwrap();
        assert_eq!(entity.object_id().unwrap().as_str(), "srv-1");
        assert!(!entity.is_dirty());
    }

    #[test]
    fn save_batch_surfaces_partial_failure() {
        let body = r#"{
            "success": { "a": "created" },
            "errors": { "b": { "message": "validation failed" } }
        }"#;
        let store = store(body, 200);
        let a = Entity::with_id("Player", ObjectId::new("a").unwrap());
        let b = Entity::with_id("Player", ObjectId::new("b").unwrap());
        let BatchSaveResult { response, keys } = store.save_batch(&[a, b]).unwrap();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(
            response.key_disposition("a"),
            strato_protocol::Disposition::Created
        );
        assert!(response.has_error_key("b"));
        assert!(response.has_error());
    }

    #[test]
    fn save_batch_keys_correlate_transient_entities() {
        let store = store(r#"{}"#, 200);
        let mut transient = Entity::new("Player");
        transient.set("name", "ada").unwrap();
        let identified = Entity::with_id("Player", ObjectId::new("p1").unwrap());

        let BatchSaveResult { response, keys } =
            store.save_batch(&[transient, identified]).unwrap();
        // One generated key per submitted entity, in submission order.
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1], "p1");
        assert!(!keys[0].is_empty());
        assert_ne!(keys[0], keys[1]);
        // The caller can query the response by the returned keys.
        assert_eq!(
            response.key_disposition(&keys[0]),
            strato_protocol::Disposition::Missing
        );
    }

    #[test]
    fn load_decodes_object_body() {
        let body = r#"{ "__class__": "Player", "__id__": "p1", "score": 10 }"#;
        let store = store(body, 200);
        let entity = store
            .load("Player", &ObjectId::new("p1").unwrap())
            .unwrap();
        assert_eq!(entity.object_id().unwrap().as_str(), "p1");
    }

    #[test]
    fn load_maps_404_to_not_found() {
        let store = store("", 404);
        let err = store
            .load("Player", &ObjectId::new("p1").unwrap())
            .unwrap_err();
        assert!(matches!(err, SdkError::ObjectNotFound(_)));
    }

    #[test]
    fn load_rejects_unclassified_status() {
        let store = store("", 418);
        let err = store
            .load("Player", &ObjectId::new("p1").unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            SdkError::UnexpectedStatus {
                outcome: strato_protocol::Outcome::Unknown,
                ..
            }
        ));
    }
}
