//! Document directory: upload, listing, download, deletion. Secure
//! documents gate the download path behind a step-up token.

pub(crate) mod delete;
pub(crate) mod download;
pub(crate) mod list;
pub(crate) mod storage;
pub(crate) mod types;
pub(crate) mod upload;
