//! MongoStore - GatewayStore over a MongoDB collection

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};

use gwm_core::validation;
use gwm_core::{Device, Gateway, GatewayChanges, GatewayError, GatewayResult, GatewayStore};

use crate::document::{DeviceDocument, GatewayDocument};

/// MongoDB duplicate key error code
const DUPLICATE_KEY: i32 = 11000;

/// Attempts for a conditional push that lost a race with another writer
const PUSH_ATTEMPTS: usize = 3;

/// Connection settings for [`MongoStore`]
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Connection string, e.g. `mongodb://localhost:27017`
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub server_selection_timeout: Duration,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "gateway_manager".to_string(),
            collection: "gateways".to_string(),
            server_selection_timeout: Duration::from_secs(5),
        }
    }
}

/// Gateway store backed by a MongoDB collection
#[derive(Debug, Clone)]
pub struct MongoStore {
    database: Database,
    collection: Collection<GatewayDocument>,
}

impl MongoStore {
    /// Connect and make sure the unique serial number index exists
    pub async fn connect(config: &MongoConfig) -> GatewayResult<Self> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(storage_error)?;
        options.app_name = Some("gwmd".to_string());
        options.server_selection_timeout = Some(config.server_selection_timeout);

        let client = Client::with_options(options).map_err(storage_error)?;
        let database = client.database(&config.database);
        let store = Self::new(database, &config.collection);
        store.ensure_indexes().await?;

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "Connected to MongoDB"
        );
        Ok(store)
    }

    /// Use an existing database handle without touching indexes
    pub fn new(database: Database, collection: &str) -> Self {
        let collection = database.collection::<GatewayDocument>(collection);
        Self {
            database,
            collection,
        }
    }

    pub async fn ensure_indexes(&self) -> GatewayResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "serialNumber": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection
            .create_index(index)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    /// Drop every gateway. Used by integration tests.
    pub async fn clear(&self) -> GatewayResult<()> {
        self.collection
            .delete_many(doc! {})
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    /// Work out why a conditional push matched nothing
    async fn push_rejection(
        &self,
        serial: &str,
        uid: i64,
        limit: usize,
    ) -> GatewayResult<Option<GatewayError>> {
        let Some(current) = self.get(serial).await? else {
            return Ok(Some(GatewayError::GatewayNotFound(serial.to_string())));
        };
        if current.device(uid).is_some() {
            return Ok(Some(validation::duplicate_uid(uid).into()));
        }
        if current.devices.len() >= limit {
            return Ok(Some(validation::device_limit_exceeded().into()));
        }
        Ok(None)
    }
}

#[async_trait]
impl GatewayStore for MongoStore {
    fn kind(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> GatewayResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn list(&self) -> GatewayResult<Vec<Gateway>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await
            .map_err(storage_error)?;
        let documents: Vec<GatewayDocument> = cursor.try_collect().await.map_err(storage_error)?;

        Ok(documents.into_iter().map(Gateway::from).collect())
    }

    async fn get(&self, serial: &str) -> GatewayResult<Option<Gateway>> {
        let document = self
            .collection
            .find_one(doc! { "serialNumber": serial })
            .await
            .map_err(storage_error)?;
        Ok(document.map(Gateway::from))
    }

    async fn insert(&self, gateway: Gateway) -> GatewayResult<Gateway> {
        let document = GatewayDocument::from(gateway.clone());
        match self.collection.insert_one(&document).await {
            Ok(_) => Ok(gateway),
            Err(e) if is_duplicate_key(&e) => {
                Err(validation::duplicate_serial(&gateway.serial_number).into())
            }
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn update(
        &self,
        serial: &str,
        changes: GatewayChanges,
    ) -> GatewayResult<Option<Gateway>> {
        let new_serial = changes.serial_number.clone();
        let set = set_document(changes)?;
        if set.is_empty() {
            return self.get(serial).await;
        }

        let result = self
            .collection
            .find_one_and_update(doc! { "serialNumber": serial }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await;

        match result {
            Ok(document) => Ok(document.map(Gateway::from)),
            Err(e) if is_duplicate_key(&e) => {
                let taken = new_serial.as_deref().unwrap_or(serial);
                Err(validation::duplicate_serial(taken).into())
            }
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn delete(&self, serial: &str) -> GatewayResult<Option<Gateway>> {
        let document = self
            .collection
            .find_one_and_delete(doc! { "serialNumber": serial })
            .await
            .map_err(storage_error)?;
        Ok(document.map(Gateway::from))
    }

    async fn push_device(
        &self,
        serial: &str,
        device: Device,
        limit: usize,
    ) -> GatewayResult<Device> {
        if limit == 0 {
            return Err(validation::device_limit_exceeded().into());
        }

        let entry = bson::to_bson(&DeviceDocument::from(device.clone()))
            .map_err(|e| GatewayError::Storage(e.to_string()))?;
        let filter = push_filter(serial, device.uid, limit);
        let update = doc! { "$push": { "devices": entry } };

        for attempt in 1..=PUSH_ATTEMPTS {
            let result = self
                .collection
                .update_one(filter.clone(), update.clone())
                .await
                .map_err(storage_error)?;
            if result.modified_count == 1 {
                return Ok(device);
            }

            if let Some(rejection) = self.push_rejection(serial, device.uid, limit).await? {
                return Err(rejection);
            }
            tracing::debug!(serial = %serial, uid = device.uid, attempt, "Device push raced, retrying");
        }

        Err(GatewayError::Storage(format!(
            "gateway {} kept changing while adding device {}",
            serial, device.uid
        )))
    }

    async fn pull_device(&self, serial: &str, uid: i64) -> GatewayResult<Device> {
        let before = self
            .collection
            .find_one_and_update(
                doc! { "serialNumber": serial, "devices.uid": uid },
                doc! { "$pull": { "devices": { "uid": uid } } },
            )
            .return_document(ReturnDocument::Before)
            .await
            .map_err(storage_error)?;

        if let Some(device) = before
            .and_then(|doc| doc.devices.into_iter().find(|d| d.uid == uid))
        {
            return Ok(device.into());
        }

        match self.get(serial).await? {
            Some(_) => Err(GatewayError::DeviceNotFound {
                serial: serial.to_string(),
                uid,
            }),
            None => Err(GatewayError::GatewayNotFound(serial.to_string())),
        }
    }
}

/// Matches the gateway only while it has room and no device with `uid`.
/// `devices.<limit-1>` exists exactly when the array already holds `limit`
/// entries.
fn push_filter(serial: &str, uid: i64, limit: usize) -> Document {
    let mut filter = doc! {
        "serialNumber": serial,
        "devices.uid": { "$ne": uid },
    };
    filter.insert(
        format!("devices.{}", limit - 1),
        doc! { "$exists": false },
    );
    filter
}

fn set_document(changes: GatewayChanges) -> GatewayResult<Document> {
    let mut set = Document::new();
    if let Some(serial_number) = changes.serial_number {
        set.insert("serialNumber", serial_number);
    }
    if let Some(name) = changes.name {
        set.insert("name", name);
    }
    if let Some(ip_address) = changes.ip_address {
        set.insert("ipAddress", ip_address);
    }
    if let Some(devices) = changes.devices {
        let devices: Vec<DeviceDocument> = devices.into_iter().map(Into::into).collect();
        let devices = bson::to_bson(&devices).map_err(|e| GatewayError::Storage(e.to_string()))?;
        set.insert("devices", devices);
    }
    Ok(set)
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn storage_error(err: mongodb::error::Error) -> GatewayError {
    tracing::error!(error = %err, "MongoDB operation failed");
    GatewayError::Storage(err.to_string())
}
