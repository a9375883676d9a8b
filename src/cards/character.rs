use rand::prelude::IndexedRandom;
use serde::Deserialize;
use serde::Serialize;

/// A fixed playable identity. Each player occupies exactly one character
/// per session, unique among active players.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: u8,
    pub name: String,
}

impl Character {
    pub fn new(id: u8, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

impl std::fmt::Display for Character {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Immutable catalog of characters available to a session. Injected into
/// session creation rather than read from global state, so custom casts
/// are just a different catalog value.
#[derive(Debug, Clone)]
pub struct Catalog {
    characters: Vec<Character>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            characters: vec![
                Character::new(1, "Chico"),
                Character::new(2, "Ben Wade"),
                Character::new(3, "Sentenza"),
                Character::new(4, "Dick Bannister"),
                Character::new(5, "Henchman Boggs"),
                Character::new(6, "Calvera"),
                Character::new(7, "Vin Tanner"),
                Character::new(8, "Teresh"),
            ],
        }
    }
}

impl Catalog {
    pub fn new(characters: Vec<Character>) -> Self {
        Self { characters }
    }

    pub fn get(&self, id: u8) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Draws a random character not already taken. None when the cast is
    /// exhausted, which join treats the same as a full roster.
    pub fn draw(&self, taken: &[Character]) -> Option<Character> {
        let available = self
            .characters
            .iter()
            .filter(|c| !taken.contains(c))
            .collect::<Vec<_>>();
        available.choose(&mut rand::rng()).map(|c| (*c).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_eight_gunslingers() {
        let catalog = Catalog::default();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.get(1).map(|c| c.name.as_str()), Some("Chico"));
        assert!(catalog.get(9).is_none());
    }

    #[test]
    fn draw_skips_taken_characters() {
        let catalog = Catalog::default();
        let mut taken = Vec::new();
        for _ in 0..8 {
            let character = catalog.draw(&taken).expect("characters remain");
            assert!(!taken.contains(&character));
            taken.push(character);
        }
        assert!(catalog.draw(&taken).is_none());
    }
}
