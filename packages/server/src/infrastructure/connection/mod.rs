//! 接続とトピック所属の管理
//!
//! - `registry`: クライアント ID ↔ 接続
//! - `membership`: トピック ↔ クライアント ID

pub mod membership;
pub mod registry;

pub use membership::MembershipIndex;
pub use registry::{ConnectionHandle, ConnectionRegistry, RegistryError};
