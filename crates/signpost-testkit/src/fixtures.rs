//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use rand::RngCore;

use signpost_core::{
    roles, Principal, SubjectId, Token, TokenCodec, TokenConfig,
};

/// A shared secret and the codec keyed by it.
///
/// Registries under test are built from [`secret`](Self::secret) so that
/// principals minted here verify against them.
pub struct TestFixture {
    secret: Vec<u8>,
    pub codec: TokenCodec,
}

impl TestFixture {
    /// Create a fixture with a random secret.
    pub fn new() -> Self {
        let mut secret = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::with_secret(&secret)
    }

    /// Create with a fixed secret.
    pub fn with_secret(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
            codec: TokenCodec::new(secret, TokenConfig::default()),
        }
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Issue a token for `subject` holding `held` roles.
    pub fn token(&self, subject: &str, held: &[&str]) -> Token {
        self.codec
            .issue_with_roles(subject_id(subject), roles(held.iter().copied()))
            .expect("claims encode")
    }

    /// A verified principal for `subject` holding `held` roles.
    pub fn principal(&self, subject: &str, held: &[&str]) -> Principal {
        let token = self.token(subject, held);
        self.codec.verify(token.as_str()).expect("fresh token verifies")
    }

    /// `corp\root` with `{admin, user}`.
    pub fn admin(&self) -> Principal {
        self.principal("corp\\root", &["admin", "user"])
    }

    /// `corp\<name>` with `{user}`.
    pub fn user(&self, name: &str) -> Principal {
        self.principal(&format!("corp\\{name}"), &["user"])
    }

    /// `corp\<name>` with no roles.
    pub fn nobody(&self, name: &str) -> Principal {
        self.principal(&format!("corp\\{name}"), &[])
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a subject id, panicking on malformed test input.
pub fn subject_id(s: &str) -> SubjectId {
    SubjectId::parse(s).expect("valid subject id")
}

/// Distinct `{user}` principals for multi-party tests.
pub fn multi_party_principals(fixture: &TestFixture, count: usize) -> Vec<Principal> {
    (0..count)
        .map(|i| fixture.user(&format!("party{i}")))
        .collect()
}
