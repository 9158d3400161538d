//! Outbound ports
//!
//! Contracts for the external collaborators the storefront calls:
//! the payment processor and the mail transport.

pub mod mail;
pub mod payment;

pub use mail::{MailMessage, Mailer};
pub use payment::{Charge, ChargeRequest, PaymentGateway};
