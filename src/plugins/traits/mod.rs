pub mod notifier;
pub mod verifier;

pub use notifier::{NotificationEvent, NotificationResult, NotifierPlugin};
pub use verifier::CredentialVerifier;
