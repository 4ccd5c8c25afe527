//! Keccak-256 hashing

use slotvm_primitives::{to_bytes32, Selector, Word, H256, WORD_BYTES};
use sha3::{Digest, Keccak256};

/// Compute Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    H256::from_bytes(result.into())
}

/// Hash of the big-endian 32-byte concatenation of `words`
pub fn hash_words(words: &[Word]) -> Word {
    let mut hasher = Keccak256::new();
    for word in words {
        hasher.update(to_bytes32(word));
    }
    let digest: [u8; WORD_BYTES] = hasher.finalize().into();
    H256::from_bytes(digest).to_word()
}

/// Selector of a canonical function signature such as `transfer(address,uint256)`
pub fn selector(signature: &str) -> Selector {
    let hash = keccak256(signature.as_bytes());
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&hash.as_bytes()[..4]);
    Selector::from_bytes(bytes)
}

/// First topic of an event with the given canonical signature
pub fn event_topic(signature: &str) -> Word {
    keccak256(signature.as_bytes()).to_word()
}
