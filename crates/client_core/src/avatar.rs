//! Identifying image capability for a token id. Drawing happens elsewhere; this
//! module only produces the stable seed and display alias a renderer needs.

use alloy_primitives::hex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::domain::TokenId;

const ADJECTIVES: [&str; 16] = [
    "amber", "brisk", "cobalt", "dusky", "ember", "frosty", "gilded", "hazel", "ivory", "jade",
    "lunar", "misty", "noble", "onyx", "rustic", "solar",
];

const NOUNS: [&str; 16] = [
    "anvil", "beacon", "comet", "dynamo", "falcon", "glacier", "harbor", "island", "lantern",
    "meteor", "nebula", "orchid", "prism", "quartz", "river", "turbine",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarDescriptor {
    pub seed: String,
    pub digest_hex: String,
    pub alias: String,
    pub size: u32,
}

pub trait AvatarProvider: Send + Sync {
    /// `None` means no token id yet; callers show a placeholder.
    fn avatar(&self, token_id: &TokenId, size: u32) -> Option<AvatarDescriptor>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SeededAvatar;

impl AvatarProvider for SeededAvatar {
    fn avatar(&self, token_id: &TokenId, size: u32) -> Option<AvatarDescriptor> {
        if token_id.is_empty() {
            return None;
        }

        let digest = Sha256::digest(token_id.as_str().as_bytes());
        let adjective = ADJECTIVES[usize::from(digest[0]) % ADJECTIVES.len()];
        let noun = NOUNS[usize::from(digest[1]) % NOUNS.len()];

        Some(AvatarDescriptor {
            seed: token_id.to_string(),
            digest_hex: hex::encode(digest),
            alias: capitalize_words(&format!("{adjective}-{noun}")),
            size,
        })
    }
}

/// "amber-falcon" -> "Amber Falcon"
pub fn capitalize_words(text: &str) -> String {
    text.split(|c: char| c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
