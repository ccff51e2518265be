//! インメモリ Registry 実装
//!
//! 各レジストリは単一の tokio `Mutex` で全状態を包み、read-then-write
//! 操作を 1 つのクリティカルセクションとして実行します。

mod identity;
mod room;

pub use identity::InMemoryIdentityRegistry;
pub use room::InMemoryRoomRegistry;
