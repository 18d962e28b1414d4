pub mod challenge_request;
pub mod consent;
pub mod credential;
pub mod did_info;
pub mod error;
pub mod message;
pub mod presentation;
pub mod proof;
