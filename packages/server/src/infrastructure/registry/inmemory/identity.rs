//! InMemory Identity Registry 実装
//!
//! `connection_id ↔ username` の双方向マップを 1 つの Mutex で保持し、
//! claim-if-free をアトミックに実行します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, IdentityError, IdentityRegistry, Username};

#[derive(Debug, Default)]
struct IdentityTable {
    by_connection: HashMap<ConnectionId, Username>,
    by_username: HashMap<Username, ConnectionId>,
}

/// インメモリ Identity Registry 実装
///
/// 双方向マップにより「1 接続につき 1 ユーザー名」「1 ユーザー名に
/// つき 1 接続」の両不変条件を O(1) で検査できます。
pub struct InMemoryIdentityRegistry {
    table: Mutex<IdentityTable>,
}

impl InMemoryIdentityRegistry {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(IdentityTable::default()),
        }
    }
}

impl Default for InMemoryIdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityRegistry for InMemoryIdentityRegistry {
    async fn try_claim(
        &self,
        connection_id: ConnectionId,
        username: Username,
    ) -> Result<(), IdentityError> {
        let mut table = self.table.lock().await;

        if let Some(held) = table.by_connection.get(&connection_id) {
            return Err(IdentityError::AlreadyNamed(held.as_str().to_string()));
        }
        if table.by_username.contains_key(&username) {
            return Err(IdentityError::NameTaken(username.as_str().to_string()));
        }

        table
            .by_username
            .insert(username.clone(), connection_id.clone());
        table.by_connection.insert(connection_id, username);
        Ok(())
    }

    async fn lookup(&self, connection_id: &ConnectionId) -> Option<Username> {
        let table = self.table.lock().await;
        table.by_connection.get(connection_id).cloned()
    }

    async fn release(&self, connection_id: &ConnectionId) -> Option<Username> {
        let mut table = self.table.lock().await;
        let username = table.by_connection.remove(connection_id)?;
        let removed = table.by_username.remove(&username);
        debug_assert!(
            removed.as_ref() == Some(connection_id),
            "identity maps out of sync"
        );
        Some(username)
    }
}
