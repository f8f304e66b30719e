//! Raw-log codec for the contract's mint-completion event.
//!
//! The transport delivers logs undecoded; this module recognizes and
//! unpacks `CharacterNFTMinted(address indexed, uint256 indexed, uint256)`.
//! Malformed or foreign logs decode to `None` and are skipped by
//! consumers rather than treated as errors.

use alloy_primitives::{Address, B256, U256, keccak256};

/// Solidity signature of the mint-completion event.
pub const MINTED_EVENT_SIGNATURE: &str = "CharacterNFTMinted(address,uint256,uint256)";

/// A contract log as delivered by the transport, topics and data untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawLog {
    pub topics: Vec<B256>,
    pub data: Vec<u8>,
}

/// Decoded mint-completion event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharacterMinted {
    /// Account the character was minted for.
    pub sender: Address,
    /// Token identifier assigned on-chain.
    pub token_id: U256,
    /// Index of the archetype that was minted.
    pub character_index: u64,
}

/// Signature topic identifying the mint-completion event.
pub fn minted_topic() -> B256 {
    keccak256(MINTED_EVENT_SIGNATURE.as_bytes())
}

/// Decode a raw log into a mint-completion event.
///
/// Topic layout: `[signature, sender, tokenId]`; the data section holds
/// the character index as a single word.
pub fn decode_minted(log: &RawLog) -> Option<CharacterMinted> {
    if log.topics.len() != 3 || log.data.len() != 32 {
        return None;
    }
    if log.topics[0] != minted_topic() {
        return None;
    }

    let sender = Address::from_word(log.topics[1]);
    let token_id = U256::from_be_slice(log.topics[2].as_slice());
    let character_index = u64::try_from(U256::from_be_slice(&log.data)).ok()?;

    Some(CharacterMinted {
        sender,
        token_id,
        character_index,
    })
}

/// Encode a mint-completion event back into its raw log form.
///
/// Used by transports that synthesize logs (and by tests); the inverse of
/// [`decode_minted`].
pub fn encode_minted(event: &CharacterMinted) -> RawLog {
    RawLog {
        topics: vec![
            minted_topic(),
            event.sender.into_word(),
            B256::new(event.token_id.to_be_bytes::<32>()),
        ],
        data: U256::from(event.character_index).to_be_bytes::<32>().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CharacterMinted {
        CharacterMinted {
            sender: Address::repeat_byte(0xab),
            token_id: U256::from(7u64),
            character_index: 2,
        }
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let event = sample();
        let decoded = decode_minted(&encode_minted(&event)).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn foreign_signature_topics_are_skipped() {
        let mut log = encode_minted(&sample());
        log.topics[0] = keccak256(b"Transfer(address,address,uint256)");
        assert_eq!(decode_minted(&log), None);
    }

    #[test]
    fn malformed_shapes_are_skipped() {
        let event = sample();

        let mut missing_topic = encode_minted(&event);
        missing_topic.topics.pop();
        assert_eq!(decode_minted(&missing_topic), None);

        let mut short_data = encode_minted(&event);
        short_data.data.truncate(16);
        assert_eq!(decode_minted(&short_data), None);
    }

    #[test]
    fn oversized_character_index_is_skipped() {
        let mut log = encode_minted(&sample());
        log.data = U256::MAX.to_be_bytes::<32>().to_vec();
        assert_eq!(decode_minted(&log), None);
    }
}
