//! UseCase: 表示名の設定
//!
//! 接続に表示名を関連付ける。ユーザー名は全接続を通じて一意であり、
//! 1 接続につき 1 回しか設定できない（名前変更は非対応）。

use std::sync::Arc;

use crate::domain::{ConnectionId, IdentityRegistry, Username};

use super::error::SetNameError;

/// 表示名設定のユースケース
pub struct SetNameUseCase {
    /// Identity Registry（接続↔ユーザー名の対応表）
    identity: Arc<dyn IdentityRegistry>,
}

impl SetNameUseCase {
    pub fn new(identity: Arc<dyn IdentityRegistry>) -> Self {
        Self { identity }
    }

    /// 表示名の claim を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Username)` - claim 成功（確定した表示名を返す）
    /// * `Err(SetNameError)` - 名前が使用中、または既に名前を持つ接続
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        username: Username,
    ) -> Result<Username, SetNameError> {
        self.identity
            .try_claim(connection_id.clone(), username.clone())
            .await?;
        Ok(username)
    }
}
