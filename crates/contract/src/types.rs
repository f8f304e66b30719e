//! Character data as the contract encodes it and as the client uses it.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::ContractError;

/// Character tuple exactly as the contract returns it, before narrowing.
///
/// An all-default record doubles as the contract's "no character" answer:
/// absence is signalled by an empty name field and nothing else.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterRecord {
    pub character_index: U256,
    pub name: String,
    pub image_uri: String,
    pub hp: U256,
    pub max_hp: U256,
    pub attack_damage: U256,
}

impl CharacterRecord {
    pub fn new(
        character_index: u64,
        name: impl Into<String>,
        image_uri: impl Into<String>,
        hp: u64,
        max_hp: u64,
        attack_damage: u64,
    ) -> Self {
        Self {
            character_index: U256::from(character_index),
            name: name.into(),
            image_uri: image_uri.into(),
            hp: U256::from(hp),
            max_hp: U256::from(max_hp),
            attack_damage: U256::from(attack_damage),
        }
    }

    /// The record the contract returns when the wallet holds nothing.
    pub fn vacant() -> Self {
        Self::default()
    }

    /// Whether this record is the contract's "no character" answer.
    ///
    /// The empty name is the only absence signal the contract provides;
    /// do not read anything else into zeroed stats.
    pub fn is_vacant(&self) -> bool {
        self.name.is_empty()
    }
}

/// A mintable character archetype defined by the contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterTemplate {
    pub character_index: u64,
    pub name: String,
    pub image_uri: String,
    pub hp: u64,
    pub max_hp: u64,
    pub attack_damage: u64,
}

/// The character instance minted for the session account.
///
/// Same shape as [`CharacterTemplate`]; ownership is implied by which
/// wallet the lookup was made for. The contract guarantees at most one
/// per wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterNft {
    pub character_index: u64,
    pub name: String,
    pub image_uri: String,
    pub hp: u64,
    pub max_hp: u64,
    pub attack_damage: u64,
}

fn narrow(field: &'static str, value: U256) -> Result<u64, ContractError> {
    u64::try_from(value).map_err(|_| ContractError::NumericOverflow { field, value })
}

impl TryFrom<CharacterRecord> for CharacterTemplate {
    type Error = ContractError;

    fn try_from(record: CharacterRecord) -> Result<Self, Self::Error> {
        let template = Self {
            character_index: narrow("characterIndex", record.character_index)?,
            hp: narrow("hp", record.hp)?,
            max_hp: narrow("maxHp", record.max_hp)?,
            attack_damage: narrow("attackDamage", record.attack_damage)?,
            name: record.name,
            image_uri: record.image_uri,
        };

        if template.hp > template.max_hp {
            return Err(ContractError::MalformedRecord(format!(
                "{}: hp {} exceeds maxHp {}",
                template.name, template.hp, template.max_hp
            )));
        }

        Ok(template)
    }
}

impl TryFrom<CharacterRecord> for CharacterNft {
    type Error = ContractError;

    fn try_from(record: CharacterRecord) -> Result<Self, Self::Error> {
        let template = CharacterTemplate::try_from(record)?;
        Ok(Self {
            character_index: template.character_index,
            name: template.name,
            image_uri: template.image_uri,
            hp: template.hp,
            max_hp: template.max_hp,
            attack_damage: template.attack_damage,
        })
    }
}
