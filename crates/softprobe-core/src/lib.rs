pub mod config;
pub mod logging;

pub mod classify;
pub mod dispatch;
pub mod extensions;
pub mod pages;
pub mod probe;
pub mod resolver;
pub mod signature;
pub mod storage;
pub mod url_model;

#[cfg(test)]
pub(crate) mod test_helpers;
