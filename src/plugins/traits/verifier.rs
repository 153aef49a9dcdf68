/// Decides whether a presented bearer credential may start a scrape.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str) -> bool;
}
