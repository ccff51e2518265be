//! Registry 実装
//!
//! ドメイン層が定義する `IdentityRegistry` / `RoomRegistry` trait の
//! 具体的な実装を提供します。
//!
//! - `inmemory`: tokio `Mutex` + HashMap/BTreeMap によるインメモリ実装

pub mod inmemory;

pub use inmemory::{InMemoryIdentityRegistry, InMemoryRoomRegistry};
