//! Hero reference data: display names and role codes keyed by hero identifier.
//!
//! [`HeroTables`] is immutable once built. A compiled-in default covers the current roster;
//! a replacement can be loaded from a JSON array of [`HeroEntry`] values.

use std::path::Path;

use anyhow::{anyhow, bail};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter};
use thiserror::Error;

use crate::file::ReadJsonFile;

/// Name given to a hero that cannot be identified or is missing from the tables.
pub const UNKNOWN_HERO: &str = "unknown";

/// Gameplay archetype of a hero, carried in the output as its integer code.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumCount,
    Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Role {
    #[default]
    Unassigned,
    Vanguard,
    Duelist,
    Strategist,
}
impl Role {
    pub const ASSIGNED: [Role; 3] = [Role::Vanguard, Role::Duelist, Role::Strategist];

    pub fn code(self) -> u8 {
        match self {
            Role::Unassigned => 0,
            Role::Vanguard => 1,
            Role::Duelist => 2,
            Role::Strategist => 3,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid role code {0}")]
pub struct InvalidRoleCode(pub u8);

impl TryFrom<u8> for Role {
    type Error = InvalidRoleCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Role::Unassigned),
            1 => Ok(Role::Vanguard),
            2 => Ok(Role::Duelist),
            3 => Ok(Role::Strategist),
            other => Err(InvalidRoleCode(other)),
        }
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        role.code()
    }
}

/// One entry of a hero table file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroEntry {
    pub id: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hero {
    pub name: String,
    pub role: Role,
}

/// The name and role a hero identifier resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub name: &'a str,
    pub role: Role,
}
impl Resolution<'_> {
    pub const UNKNOWN: Resolution<'static> = Resolution {
        name: UNKNOWN_HERO,
        role: Role::Unassigned,
    };
}

#[derive(Debug, Clone)]
pub struct HeroTables {
    heroes: FxHashMap<String, Hero>,
}
impl HeroTables {
    pub fn from_entries(entries: Vec<HeroEntry>) -> Result<Self, anyhow::Error> {
        let mut heroes = FxHashMap::with_capacity_and_hasher(entries.len(), Default::default());
        for entry in entries {
            if entry.id.is_empty() || !entry.id.bytes().all(|b| b.is_ascii_digit()) {
                bail!("hero identifier '{}' must be a non-empty string of digits", entry.id);
            }
            if entry.role == Role::Unassigned {
                bail!("hero {} ({}) must be assigned a role", entry.id, entry.name);
            }
            let hero = Hero {
                name: entry.name,
                role: entry.role,
            };
            if let Some(existing) = heroes.insert(entry.id.clone(), hero) {
                bail!("duplicate hero identifier {} (previously {})", entry.id, existing.name);
            }
        }
        Ok(Self { heroes })
    }

    pub fn read_json_file(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let entries = Vec::<HeroEntry>::read_json_file(path)
            .map_err(|err| anyhow!("cannot read hero table {}: {err}", path.display()))?;
        Self::from_entries(entries)
    }

    pub fn get(&self, hero_id: &str) -> Option<&Hero> {
        self.heroes.get(hero_id)
    }

    /// Resolves an optional hero identifier, falling back to [`Resolution::UNKNOWN`] when the
    /// identifier is absent or not in the tables.
    pub fn resolve(&self, hero_id: Option<&str>) -> Resolution<'_> {
        hero_id
            .and_then(|hero_id| self.get(hero_id))
            .map(|hero| Resolution {
                name: &hero.name,
                role: hero.role,
            })
            .unwrap_or(Resolution::UNKNOWN)
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }
}

impl Default for HeroTables {
    fn default() -> Self {
        let heroes = DEFAULT_HEROES
            .iter()
            .map(|&(id, name, role)| {
                (
                    id.to_string(),
                    Hero {
                        name: name.to_string(),
                        role,
                    },
                )
            })
            .collect();
        Self { heroes }
    }
}

const DEFAULT_HEROES: [(&str, &str, Role); 38] = [
    ("1011001", "Hulk", Role::Vanguard),
    ("1014001", "The Punisher", Role::Duelist),
    ("1015001", "Storm", Role::Duelist),
    ("1016001", "Loki", Role::Strategist),
    ("1017001", "Human Torch", Role::Duelist),
    ("1018001", "Doctor Strange", Role::Vanguard),
    ("1020001", "Mantis", Role::Strategist),
    ("1021001", "Hawkeye", Role::Duelist),
    ("1022001", "Captain America", Role::Vanguard),
    ("1023001", "Rocket Raccoon", Role::Strategist),
    ("1024001", "Hela", Role::Duelist),
    ("1025001", "Cloak & Dagger", Role::Strategist),
    ("1026001", "Black Panther", Role::Duelist),
    ("1027001", "Groot", Role::Vanguard),
    ("1029001", "Magik", Role::Duelist),
    ("1030001", "Moon Knight", Role::Duelist),
    ("1031001", "Luna Snow", Role::Strategist),
    ("1032001", "Squirrel Girl", Role::Duelist),
    ("1033001", "Black Widow", Role::Duelist),
    ("1034001", "Iron Man", Role::Duelist),
    ("1035001", "Venom", Role::Vanguard),
    ("1036001", "Spider Man", Role::Duelist),
    ("1037001", "Magneto", Role::Vanguard),
    ("1038001", "Scarlet Witch", Role::Duelist),
    ("1039001", "Thor", Role::Vanguard),
    ("1040001", "Mister Fantastic", Role::Duelist),
    ("1041001", "Winter Soldier", Role::Duelist),
    ("1042001", "Peni Parker", Role::Vanguard),
    ("1043001", "Star Lord", Role::Duelist),
    ("1045001", "Namor", Role::Duelist),
    ("1046001", "Adam Warlock", Role::Strategist),
    ("1047001", "Jeff The Land Shark", Role::Strategist),
    ("1048001", "Psylocke", Role::Duelist),
    ("1049001", "Wolverine", Role::Duelist),
    ("1050001", "Invisible Woman", Role::Strategist),
    ("1051001", "The Thing", Role::Vanguard),
    ("1052001", "Iron Fist", Role::Duelist),
    ("1053001", "Emma Frost", Role::Vanguard),
];
