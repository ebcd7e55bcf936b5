use serde::{Deserialize, Serialize};

/// Difficulty tier gating which new cards may be introduced.
///
/// Tiers are strictly ordered; a deck starts at [`Tier::Beginner`] and only
/// moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Tier {
    pub const COUNT: usize = 4;

    pub const ALL: [Tier; Tier::COUNT] = [
        Tier::Beginner,
        Tier::Intermediate,
        Tier::Advanced,
        Tier::Expert,
    ];

    pub fn index(self) -> usize {
        match self {
            Tier::Beginner => 0,
            Tier::Intermediate => 1,
            Tier::Advanced => 2,
            Tier::Expert => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Beginner => "beginner",
            Tier::Intermediate => "intermediate",
            Tier::Advanced => "advanced",
            Tier::Expert => "expert",
        }
    }

    /// Extra turns added on top of the deck's cooldown floor for a freshly
    /// admitted card. Easier tiers rest longer between exposures.
    pub fn cooldown_bonus(self) -> u32 {
        (Self::COUNT - self.index()) as u32
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Beginner
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
