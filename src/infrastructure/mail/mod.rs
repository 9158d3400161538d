//! Outbound mail transports

pub mod smtp;

pub use smtp::{LogMailer, SmtpConfig, SmtpMailer};
