//! Outbound integrations.

pub mod mailer;

pub use mailer::Mailer;
