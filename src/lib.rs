//! Dossier: a concurrency-safe lifecycle core for markdown task records.
//!
//! Each record is a markdown file with YAML front-matter kept in a shared
//! collection directory. Humans and agents edit the same files, so every
//! mutation goes through an advisory lock, an optimistic version check, and
//! the workflow gates before anything reaches disk.
//!
//! # Architecture
//!
//! Dossier follows hexagonal architecture principles:
//!
//! - **Domain**: records, documents, versions, workflow configuration
//! - **Codec**: the front-matter and markdown document format
//! - **Policy**: transition, dependency, and authorization gates
//! - **Ports**: store, configuration, identity, and audit contracts
//! - **Adapters**: filesystem and in-memory implementations of the ports
//! - **Services**: the lifecycle service orchestrating guarded mutations
//!
//! # Modules
//!
//! - [`task`]: task records and their lifecycle

pub mod task;
