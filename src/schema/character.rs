/// Characters — gender, archetype, and appearance traits fixed at creation.
use serde::{Deserialize, Serialize};

use super::object::Pronouns;
use crate::core::context::NarrativeContext;

/// Grammatical gender of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Feminine,
    Masculine,
    Neutral,
}

impl Gender {
    pub fn pronouns(&self) -> Pronouns {
        match self {
            Self::Feminine => Pronouns::SheHer,
            Self::Masculine => Pronouns::HeHim,
            Self::Neutral => Pronouns::TheyThem,
        }
    }
}

/// The part a character plays. Rules and lowering passes ask capability
/// questions of it instead of inspecting the variant directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// The flawless heroine every plot revolves around.
    Lead,
    Dreamboat,
    /// Never anything but happy.
    Optimist,
    Rival,
    Villain,
    Plain,
}

impl Archetype {
    pub fn is_lead(&self) -> bool {
        *self == Self::Lead
    }

    pub fn is_dreamboat(&self) -> bool {
        *self == Self::Dreamboat
    }

    pub fn is_optimist(&self) -> bool {
        *self == Self::Optimist
    }

    pub fn is_antagonist(&self) -> bool {
        *self == Self::Villain
    }
}

/// Appearance and catchphrase, rolled once per character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traits {
    pub stature: String,
    pub hair_length: String,
    pub hair_colour: String,
    pub eye_colour: String,
    pub war_cry: String,
    pub feature_adj: String,
    pub feature: String,
}

const STATURES: &[&str] = &["on the short side", "of middling height", "fairly tall"];
const LEAD_STATURES: &[&str] = &[
    "adorably petite",
    "short, but in a way everyone agreed was perfect",
    "exactly the right height for a starship ensign",
    "tall for a girl, but in a graceful way",
];
const DREAMBOAT_STATURES: &[&str] = &[
    "just tall enough to lean against doorways",
    "of a height that made other men feel short",
    "tall, but handsomely so, not awkwardly so",
];

const HAIR_LENGTHS: &[&str] = &["long", "shoulder length", "short", "cropped"];
const LEAD_HAIR_LENGTHS: &[&str] = &[
    "astonishingly long (all the way to her ankles)",
    "cascading",
    "luxuriously long",
    "bouncy shoulder length",
];

const HAIR_COLOURS: &[&str] = &["blonde", "brown", "red", "chestnut", "black"];
const LEAD_HAIR_COLOURS: &[&str] = &[
    "lilac",
    "indigo",
    "violet",
    "midnight blue",
    "silver and violet",
    "rainbow streaked",
    "iridescent",
    "shimmering opal",
];
const VILLAIN_HAIR_COLOURS: &[&str] = &["jet black", "bone white", "acid green", "platinum"];

const EYE_COLOURS: &[&str] = &["brown", "blue", "grey", "green", "hazel"];
const LEAD_EYE_COLOURS: &[&str] = &[
    "violet",
    "amethyst",
    "glacier blue",
    "kaleidoscopic",
    "shimmering rainbow",
    "starlit silver",
];

const WAR_CRY_THINGS: &[&str] = &["MOONS", "RINGS", "COMETS", "NEBULAE", "VOLCANOES"];
const WAR_CRY_PLACES: &[&str] = &["SATURN", "MERCURY", "URANUS", "PLUTO", "ANDROMEDA"];

const MASCULINE_FEATURE_ADJS: &[&str] = &["strong", "square", "broad", "heavy"];
const FEMININE_FEATURE_ADJS: &[&str] = &["small", "upturned", "delicate", "wide"];
const LEAD_FEATURE_ADJS: &[&str] = &["flawless", "adorable", "radiant", "bewitching"];
const DREAMBOAT_FEATURE_ADJS: &[&str] = &["chiselled", "noble", "magnificent", "dashing"];
const VILLAIN_FEATURE_ADJS: &[&str] = &["crooked", "jutting", "sneering", "scarred"];

const MASCULINE_FEATURES: &[&str] = &["nose", "jaw", "brow", "chin"];
const FEMININE_FEATURES: &[&str] = &["nose", "mouth", "forehead", "chin"];

impl Traits {
    /// Rolls a full set of traits from the tables for `archetype` and `gender`.
    pub fn roll(archetype: Archetype, gender: Gender, ctx: &mut NarrativeContext) -> Traits {
        let stature = match archetype {
            Archetype::Lead => LEAD_STATURES,
            Archetype::Dreamboat => DREAMBOAT_STATURES,
            _ => STATURES,
        };
        let hair_length = match archetype {
            Archetype::Lead => LEAD_HAIR_LENGTHS,
            _ => HAIR_LENGTHS,
        };
        let hair_colour = match archetype {
            Archetype::Lead => LEAD_HAIR_COLOURS,
            Archetype::Villain => VILLAIN_HAIR_COLOURS,
            _ => HAIR_COLOURS,
        };
        let eye_colour = match archetype {
            Archetype::Lead => LEAD_EYE_COLOURS,
            _ => EYE_COLOURS,
        };
        let feature_adj = match (archetype, gender) {
            (Archetype::Lead, _) => LEAD_FEATURE_ADJS,
            (Archetype::Dreamboat, _) => DREAMBOAT_FEATURE_ADJS,
            (Archetype::Villain, _) => VILLAIN_FEATURE_ADJS,
            (_, Gender::Masculine) => MASCULINE_FEATURE_ADJS,
            _ => FEMININE_FEATURE_ADJS,
        };
        let feature = match gender {
            Gender::Masculine => MASCULINE_FEATURES,
            _ => FEMININE_FEATURES,
        };

        Traits {
            stature: ctx.choose_str(stature).to_string(),
            hair_length: ctx.choose_str(hair_length).to_string(),
            hair_colour: ctx.choose_str(hair_colour).to_string(),
            eye_colour: ctx.choose_str(eye_colour).to_string(),
            war_cry: format!(
                "BY THE {} OF {}",
                ctx.choose_str(WAR_CRY_THINGS),
                ctx.choose_str(WAR_CRY_PLACES)
            ),
            feature_adj: ctx.choose_str(feature_adj).to_string(),
            feature: ctx.choose_str(feature).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub gender: Gender,
    pub archetype: Archetype,
    pub traits: Traits,
}

impl Character {
    pub fn new(gender: Gender, archetype: Archetype, traits: Traits) -> Self {
        Self {
            gender,
            archetype,
            traits,
        }
    }

    /// A character with freshly rolled traits.
    pub fn rolled(gender: Gender, archetype: Archetype, ctx: &mut NarrativeContext) -> Self {
        let traits = Traits::roll(archetype, gender, ctx);
        Self::new(gender, archetype, traits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archetype_capabilities() {
        assert!(Archetype::Lead.is_lead());
        assert!(!Archetype::Lead.is_optimist());
        assert!(Archetype::Optimist.is_optimist());
        assert!(Archetype::Villain.is_antagonist());
        assert!(Archetype::Dreamboat.is_dreamboat());
        assert!(!Archetype::Plain.is_lead());
    }

    #[test]
    fn lead_traits_come_from_lead_tables() {
        let mut ctx = NarrativeContext::new(3);
        let traits = Traits::roll(Archetype::Lead, Gender::Feminine, &mut ctx);
        assert!(LEAD_STATURES.contains(&traits.stature.as_str()));
        assert!(LEAD_EYE_COLOURS.contains(&traits.eye_colour.as_str()));
        assert!(traits.war_cry.starts_with("BY THE "));
    }

    #[test]
    fn rolled_traits_are_reproducible() {
        let a = Traits::roll(Archetype::Plain, Gender::Masculine, &mut NarrativeContext::new(9));
        let b = Traits::roll(Archetype::Plain, Gender::Masculine, &mut NarrativeContext::new(9));
        assert_eq!(a, b);
        assert!(MASCULINE_FEATURES.contains(&a.feature.as_str()));
    }
}
