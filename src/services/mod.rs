pub mod hub;
pub mod notifier;
pub mod storage;
pub mod uploader;
