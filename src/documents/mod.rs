//! HTTP surface for filling and assembling dealership documents.

pub mod handlers;
pub mod models;
pub mod service;

pub use service::{DocumentService, ServiceError, StoredDocument, StoredPacket, TemplateStatus};
