//! Generic CRUD service over one REST collection.

use std::sync::Arc;

use mockable::Clock;
use serde_json::Value;
use tracing::debug;

use super::cache::EntitySlot;
use super::error::{FindError, RemoveError, SaveError, UpdateError};
use crate::domain::entity::{SearchCriteria, SyncEntity, last_path_segment};
use crate::domain::ports::{CredentialStore, RestRequest, RestResponse, RestTransport};

/// Successful removal of the entity with `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed {
    /// Id of the removed entity.
    pub id: String,
}

/// Sync service for entities of type `E`.
pub struct EntitySyncService<E: SyncEntity> {
    transport: Arc<dyn RestTransport>,
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    slot: EntitySlot<E>,
}

impl<E: SyncEntity> EntitySyncService<E> {
    /// Create a service over a transport, the credential store supplying the
    /// `Authorization` header, a clock and the entity's cache slot.
    pub fn new(
        transport: Arc<dyn RestTransport>,
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
        slot: EntitySlot<E>,
    ) -> Self {
        debug!(collection = E::COLLECTION, "sync service ready");
        Self {
            transport,
            store,
            clock,
            slot,
        }
    }

    /// Place `entity` in the cache slot.
    pub fn cache(&self, entity: E) {
        debug!(entity = E::LABEL, id = ?entity.id(), "caching entity");
        self.slot.put(entity);
    }

    /// Search the collection.
    ///
    /// Accepts a HAL envelope (`_embedded.<key>`), an envelope without
    /// `_embedded` (no hits) or a bare JSON array.
    pub async fn find(&self, criteria: Option<&E::Criteria>) -> Result<Vec<E>, FindError> {
        let query = criteria.map(SearchCriteria::to_query).unwrap_or_default();
        debug!(collection = E::COLLECTION, ?query, "find");
        let request = RestRequest::get(E::COLLECTION).with_query(query);
        let response = self.send(request).await.map_err(|err| match err {
            Failure::Transport(err) => FindError::transport(&err),
            Failure::Status(response) => FindError::response(response),
        })?;
        decode_collection::<E>(&response.body).map_err(FindError::client)
    }

    /// Look up one entity by id, serving a versioned cache hit without a
    /// request.
    pub async fn find_by_id(&self, id: Option<&str>) -> Result<E, FindError> {
        let Some(id) = id else {
            debug!(entity = E::LABEL, "find_by_id without id");
            return Err(FindError::new(super::NETWORK_FAILURE, None));
        };
        if let Some(cached) = self.slot.versioned(id) {
            debug!(entity = E::LABEL, id, version = ?cached.version(), "cache hit");
            return Ok(cached);
        }

        let path = resource_path::<E>(id).ok_or_else(|| FindError::client(invalid_id(id)))?;
        let request = RestRequest::get(path);
        let response = self.send(request).await.map_err(|err| match err {
            Failure::Transport(err) => FindError::transport(&err),
            Failure::Status(response) => FindError::response(response),
        })?;
        if response.body.trim().is_empty() {
            return Err(FindError::new(super::NETWORK_FAILURE, None));
        }
        let wire: E::Wire =
            serde_json::from_str(&response.body).map_err(|err| FindError::client(err.to_string()))?;
        let entity = E::from_server(wire, response.header("ETag"));
        self.slot.put(entity.clone());
        Ok(entity)
    }

    /// Create `entity`, returning the id from the `Location` header.
    ///
    /// The entity is stamped with today's date first; on success it receives
    /// the new id and replaces the cache slot.
    pub async fn save(&self, entity: &mut E) -> Result<String, SaveError> {
        entity.stamp(self.clock.local().date_naive());
        let body = serde_json::to_value(entity.to_wire())
            .map_err(|err| SaveError::client(err.to_string()))?;
        let request = RestRequest::post(E::COLLECTION)
            .with_header("Accept", "text/plain")
            .with_json(body);
        let response = self.send(request).await.map_err(|err| match err {
            Failure::Transport(err) => SaveError::transport(&err),
            Failure::Status(response) => SaveError::response(response),
        })?;

        let id = response
            .header("Location")
            .and_then(last_path_segment)
            .ok_or_else(|| SaveError::client("Keine Id"))?;
        debug!(entity = E::LABEL, %id, "created");
        entity.set_id(id.clone());
        self.slot.put(entity.clone());
        Ok(id)
    }

    /// Replace `entity` on the server using its version for `If-Match`.
    ///
    /// The new version from the `ETag` (or the previous one plus one when the
    /// header is missing) is written back into `entity`.
    pub async fn update(&self, entity: &mut E) -> Result<E, UpdateError> {
        let Some(id) = entity.id().map(str::to_owned) else {
            return Err(UpdateError::client("Keine Id"));
        };
        let Some(version) = entity.version() else {
            let message = format!("Keine Versionsnummer fuer {} {id}", E::LABEL);
            debug!("{message}");
            return Err(UpdateError::client(message));
        };

        let body = serde_json::to_value(entity.to_wire())
            .map_err(|err| UpdateError::client(err.to_string()))?;
        let path =
            resource_path::<E>(&id).ok_or_else(|| UpdateError::client(invalid_id(&id)))?;
        let request = RestRequest::put(path)
            .with_header("Accept", "text/plain")
            .with_header("If-Match", format!("\"{version}\""))
            .with_json(body);
        let response = self.send(request).await.map_err(|err| match err {
            Failure::Transport(err) => UpdateError::transport(&err),
            Failure::Status(response) => UpdateError::response(response),
        })?;

        let new_version = response
            .header("ETag")
            .and_then(crate::domain::entity::parse_etag_version)
            .unwrap_or_else(|| version.saturating_add(1));
        debug!(entity = E::LABEL, %id, new_version, "updated");
        entity.set_version(new_version);
        self.slot.refresh(entity);
        Ok(entity.clone())
    }

    /// Delete `entity`. Any 2xx status, including 204, counts as success.
    pub async fn remove(&self, entity: &E) -> Result<Removed, RemoveError> {
        let Some(id) = entity.id().map(str::to_owned) else {
            return Err(RemoveError::client("Keine Id"));
        };
        let path =
            resource_path::<E>(&id).ok_or_else(|| RemoveError::client(invalid_id(&id)))?;
        let request = RestRequest::delete(path);
        self.send(request).await.map_err(|err| match err {
            Failure::Transport(err) => RemoveError::transport(&err),
            Failure::Status(response) => RemoveError::response(response),
        })?;
        debug!(entity = E::LABEL, %id, "removed");
        self.slot.evict(&id);
        Ok(Removed { id })
    }

    async fn send(&self, request: RestRequest) -> Result<RestResponse, Failure> {
        let request = match self.store.authorization() {
            Some(authorization) => request.with_header("Authorization", authorization),
            None => request,
        };
        debug!(method = request.method.as_str(), path = %request.path, "request");
        let response = self
            .transport
            .send(request)
            .await
            .map_err(Failure::Transport)?;
        if response.is_success() {
            Ok(response)
        } else {
            debug!(status = response.status, "request failed");
            Err(Failure::Status(response))
        }
    }
}

enum Failure {
    Transport(crate::domain::ports::RestTransportError),
    Status(RestResponse),
}

/// Path of one resource, with `id` percent-encoded as a single segment.
///
/// Empty, `.` and `..` ids have no encoding that keeps them inside the
/// collection and yield `None`.
fn resource_path<E: SyncEntity>(id: &str) -> Option<String> {
    if matches!(id, "" | "." | "..") {
        return None;
    }
    Some(format!("{}/{}", E::COLLECTION, urlencoding::encode(id)))
}

fn invalid_id(id: &str) -> String {
    format!("Ungueltige Id: {id:?}")
}

fn decode_collection<E: SyncEntity>(body: &str) -> Result<Vec<E>, String> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let document: Value = serde_json::from_str(body).map_err(|err| err.to_string())?;
    let items = match document {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("_embedded") {
            Some(Value::Object(mut embedded)) => match embedded.remove(E::EMBEDDED_KEY) {
                Some(Value::Array(items)) => items,
                Some(_) => return Err(format!("_embedded.{} is not an array", E::EMBEDDED_KEY)),
                None => Vec::new(),
            },
            Some(_) => return Err("_embedded is not an object".to_owned()),
            None => Vec::new(),
        },
        _ => return Err("response is neither an array nor an object".to_owned()),
    };
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<E::Wire>(item)
                .map(|wire| E::from_server(wire, None))
                .map_err(|err| err.to_string())
        })
        .collect()
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
