//! Ed25519 keypairs for local signers (e.g. a freshly generated mint account).

use ed25519_dalek::{Signer, SigningKey};
use rand_core::OsRng;
use zeroize::Zeroize;

use crate::address::Address;

/// An Ed25519 signing keypair. The secret half is zeroized on drop by
/// `ed25519-dalek`.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a keypair from the operating system RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a keypair from a 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let mut copy = *seed;
        let signing_key = SigningKey::from_bytes(&copy);
        copy.zeroize();
        Self { signing_key }
    }

    pub fn pubkey(&self) -> Address {
        Address::new(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}
