//! Complaint-management backend library.
//!
//! Users submit complaints with attachments and track their status;
//! administrators triage and resolve them through status updates recorded
//! in an append-only ledger. Modules follow a hexagonal layout: `domain`
//! holds the entities, services, and ports; `inbound::http` the REST
//! adapter; `outbound` the Diesel, crypto, and storage adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use middleware::Trace;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
