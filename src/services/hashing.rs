use crate::services::collaborators::HashGenerator;
use chrono::Utc;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};

/// sha256 over the namespace, the current time and random salt, hex encoded
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomHashGenerator;

impl HashGenerator for RandomHashGenerator {
    fn generate_hash(&self, namespace: &str, length: usize) -> String {
        let mut hash = String::with_capacity(length + 64);
        while hash.len() < length {
            let salt: [u8; 16] = thread_rng().gen();
            let mut hasher = Sha256::new();
            hasher.update(namespace.as_bytes());
            hasher.update(Utc::now().timestamp_micros().to_le_bytes());
            hasher.update(salt);
            hash.push_str(&hex::encode(hasher.finalize()));
        }
        hash.truncate(length);
        hash
    }
}
