pub mod manager;
pub mod notifiers;
pub mod traits;
pub mod verifiers;

pub use manager::PluginManager;
pub use traits::{CredentialVerifier, NotificationEvent, NotifierPlugin};
