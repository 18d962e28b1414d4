pub mod address_service;
pub mod credential_store;
pub mod error;
pub mod in_memory;
