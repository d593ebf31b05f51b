//! Watches a published-announcement feed and reports newly published items.

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod notifiers;
pub mod services;
pub mod sources;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
