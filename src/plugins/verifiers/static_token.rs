use crate::plugins::traits::CredentialVerifier;

/// Accepts exactly one configured token.
#[derive(Debug, Clone)]
pub struct StaticTokenVerifier {
    token: String,
}

impl StaticTokenVerifier {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl CredentialVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> bool {
        !token.is_empty() && token == self.token
    }
}
