//! Persistence drivers

pub mod repository;

pub use repository::KvStateRepository;
