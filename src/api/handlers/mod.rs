pub mod health;
pub mod notifications;
pub mod page;
pub mod upload;
