//! # subsync-gateway
//!
//! Quota-aware, cache-backed access to the remote video platform.
//!
//! The [`Gateway`] is the only component that talks to the platform. Reads
//! (video listing, caption-track listing) go through the file-backed
//! [`ResponseCache`]; writes are always live and invalidate the affected
//! listing. Every live call is charged to the injected [`QuotaLedger`];
//! cache hits are free.

pub mod auth;
pub mod cache;
pub mod error;
pub mod gateway;
pub mod quota;
pub mod remote;

pub use auth::{BearerToken, Credential, CredentialProvider};
pub use cache::ResponseCache;
pub use error::GatewayError;
pub use gateway::Gateway;
pub use quota::{OperationKind, QuotaLedger, QuotaSummary, DAILY_QUOTA_BUDGET};
pub use remote::{HttpRemote, RemoteApi};
