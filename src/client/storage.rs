use crate::client::store::{CartLine, LocalOrder};
use crate::client::ClientError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const CART_KEY: &str = "cart";
const ORDERS_KEY: &str = "orders";

/// Cart snapshot persisted for anonymous sessions. No schema version tag;
/// unreadable snapshots are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<CartLine>,
    pub total_items: i32,
    pub total_amount: Decimal,
}

/// JSON file store under a caller-supplied directory, one file per fixed key.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn read<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>, ClientError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .map_err(|e| ClientError::Storage(format!("read {}: {}", path.display(), e)))?;
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                debug!("Discarding unreadable snapshot {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ClientError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| ClientError::Storage(format!("create {}: {}", self.dir.display(), e)))?;
        let raw = serde_json::to_string(value)
            .map_err(|e| ClientError::Storage(format!("serialize {}: {}", key, e)))?;
        let path = self.path(key);
        fs::write(&path, raw)
            .map_err(|e| ClientError::Storage(format!("write {}: {}", path.display(), e)))
    }

    pub fn load_cart(&self) -> Result<Option<CartSnapshot>, ClientError> {
        self.read(CART_KEY)
    }

    pub fn save_cart(&self, snapshot: &CartSnapshot) -> Result<(), ClientError> {
        self.write(CART_KEY, snapshot)
    }

    pub fn delete_cart(&self) -> Result<(), ClientError> {
        let path = self.path(CART_KEY);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| ClientError::Storage(format!("remove {}: {}", path.display(), e)))?;
        }
        Ok(())
    }

    pub fn load_orders(&self) -> Result<Vec<LocalOrder>, ClientError> {
        Ok(self.read(ORDERS_KEY)?.unwrap_or_default())
    }

    pub fn append_order(&self, order: &LocalOrder) -> Result<(), ClientError> {
        let mut orders = self.load_orders()?;
        orders.push(order.clone());
        self.write(ORDERS_KEY, &orders)
    }
}
