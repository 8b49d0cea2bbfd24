/// Voice — diction tables that colour generated prose.
///
/// Mood-keyed speech verbs and adverbs for character states, plus a
/// per-archetype wardrobe bundle driving costume and colour choices.
use crate::schema::character::Archetype;
use crate::schema::event::Mood;

pub fn adverbs(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Happy => &[
            "bravely",
            "brightly",
            "cheerfully",
            "blissfully",
            "nobly",
            "gleefully",
            "breezily",
            "serenely",
            "warmly",
            "mysteriously",
            "confidently",
        ],
        Mood::Sad => &[
            "wearily",
            "heavily",
            "glumly",
            "dolefully",
            "slowly",
            "bleakly",
            "morosely",
            "miserably",
            "listlessly",
            "mysteriously",
        ],
        Mood::Angry => &[
            "savagely",
            "menacingly",
            "coldly",
            "harshly",
            "bitterly",
            "sharply",
            "impatiently",
            "icily",
            "furiously",
            "sternly",
            "mysteriously",
        ],
        Mood::Embarrassed => &[
            "awkwardly",
            "clumsily",
            "shyly",
            "sheepishly",
            "haltingly",
            "meekly",
            "mysteriously",
        ],
    }
}

pub fn saids(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Happy => &["said", "chirped", "beamed", "sang", "purred", "laughed", "declared"],
        Mood::Sad => &["said", "sighed", "moaned", "murmured", "sniffed", "mumbled", "croaked"],
        Mood::Angry => &["said", "growled", "snapped", "spat", "barked", "hissed", "roared"],
        Mood::Embarrassed => &["said", "stammered", "mumbled", "squeaked", "whispered", "gulped"],
    }
}

pub fn shouteds(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Happy => &["exclaimed", "whooped", "cheered", "shouted", "cried"],
        Mood::Sad => &["wailed", "howled", "cried", "shouted", "sobbed"],
        Mood::Angry => &["bellowed", "thundered", "screamed", "shouted", "roared"],
        Mood::Embarrassed => &["yelped", "squealed", "blurted", "shouted", "cried"],
    }
}

pub fn emoteds(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Happy => &["smiled", "grinned", "beamed", "winked", "hummed a little tune"],
        Mood::Sad => &["frowned", "sighed", "pouted", "stared at the floor"],
        Mood::Angry => &["scowled", "glowered", "clenched a fist"],
        Mood::Embarrassed => &["blushed", "looked away", "fiddled with a sleeve"],
    }
}

/// Duty every character falls back on when carrying no other.
pub const STANDING_DUTY: &str = "uphold the sacred oath of the Star Patrol";

const DEFAULT_COLOURS: &[&str] = &[
    "red",
    "yellow",
    "blue",
    "green",
    "orange",
    "teal",
    "mauve",
    "brown",
    "black",
    "white",
    "maroon",
    "pink",
    "navy blue",
    "olive",
    "silver",
    "checked",
    "tartan",
    "paisley",
];

const LEAD_COLOURS: &[&str] = &[
    "lilac",
    "lavender",
    "violet",
    "deep violet",
    "indigo",
    "amethyst",
    "purple and silver",
    "violet and gold",
    "midnight blue",
    "pearl white",
    "rainbow",
    "iridescent",
    "shimmering opal",
    "starlight silver",
    "rose gold",
    "glittering purple",
];

const VILLAIN_COLOURS: &[&str] = &[
    "black",
    "jet black",
    "obsidian",
    "blood red",
    "crimson",
    "deep crimson",
    "charcoal",
];

const MATERIALS: &[&str] = &[
    "silk",
    "leather",
    "velvet",
    "cotton",
    "nylon",
    "denim",
    "spandex",
    "satin",
    "shiny vinyl",
];

const DEFAULT_WEARING: &[&str] = &[
    "wearing",
    "dressed in",
    "looking sharp in",
    "looking splendid in",
    "decked out in",
];
const OPTIMIST_WEARING: &[&str] = &[
    "wearing",
    "sporting",
    "looking thrilled to be in",
    "resplendent in",
    "bouncing around in",
];
const RIVAL_WEARING: &[&str] = &[
    "wearing",
    "looking dowdy in",
    "looking unfortunate in",
    "crammed into",
    "lumbering about in",
];
const VILLAIN_WEARING: &[&str] = &[
    "wearing",
    "looking sinister in",
    "looking wicked in",
    "swathed in",
    "looking dreadful in",
];

const DEFAULT_ADJECTIVES: &[&str] = &["smart", "crisp", "dashing"];
const LEAD_ADJECTIVES: &[&str] = &["", "gorgeous", "elegant", "sumptuous", "dazzling", "divine"];
const RIVAL_ADJECTIVES: &[&str] = &["", "baggy", "cheap", "frumpy", "garish", "drab", "dated"];

const DEFAULT_DECORATIONS: &[&str] = &[
    " with {colour} piping",
    " with {colour} {material} cuffs",
];
const LEAD_DECORATIONS: &[&str] = &[
    " trimmed with {colour} lace",
    " with {colour} ruffles",
    " with {colour} comet patterns",
    " with {colour} star patterns",
    " spangled with {gems}",
    " with {colour} {material} trim",
];
const RIVAL_DECORATIONS: &[&str] = &[
    " with clashing {colour} spots",
    " with a lurid {colour} check",
];
const GEMS: &[&str] = &["diamonds", "sequins", "rubies", "opals", "sapphires"];

/// Clothing taste of an archetype.
#[derive(Debug, Clone, Copy)]
pub struct Wardrobe {
    pub colours: &'static [&'static str],
    pub wearing: &'static [&'static str],
    pub adjectives: &'static [&'static str],
    /// Percent chance an outfit gets an adjective at all.
    pub adjective_chance: u32,
    /// Percent chance an outfit gets the gushing superlative instead.
    pub superlative_chance: u32,
    pub decorations: &'static [&'static str],
    /// Percent chance an outfit is decorated.
    pub decoration_chance: u32,
}

impl Wardrobe {
    pub fn for_archetype(archetype: Archetype) -> Wardrobe {
        let base = Wardrobe {
            colours: DEFAULT_COLOURS,
            wearing: DEFAULT_WEARING,
            adjectives: DEFAULT_ADJECTIVES,
            adjective_chance: 40,
            superlative_chance: 0,
            decorations: DEFAULT_DECORATIONS,
            decoration_chance: 25,
        };
        match archetype {
            Archetype::Lead => Wardrobe {
                colours: LEAD_COLOURS,
                adjectives: LEAD_ADJECTIVES,
                adjective_chance: 100,
                superlative_chance: 4,
                decorations: LEAD_DECORATIONS,
                decoration_chance: 100,
                ..base
            },
            Archetype::Optimist => Wardrobe {
                wearing: OPTIMIST_WEARING,
                ..base
            },
            Archetype::Rival => Wardrobe {
                wearing: RIVAL_WEARING,
                adjectives: RIVAL_ADJECTIVES,
                decorations: RIVAL_DECORATIONS,
                ..base
            },
            Archetype::Villain => Wardrobe {
                colours: VILLAIN_COLOURS,
                wearing: VILLAIN_WEARING,
                ..base
            },
            Archetype::Dreamboat | Archetype::Plain => base,
        }
    }

    /// Palette for anything that is not a character.
    pub fn default_colours() -> &'static [&'static str] {
        DEFAULT_COLOURS
    }

    pub fn materials() -> &'static [&'static str] {
        MATERIALS
    }

    pub fn gems() -> &'static [&'static str] {
        GEMS
    }
}

pub const SMOOTH_WORDS: &[&str] = &["fluid", "graceful", "silken", "supple", "feline", "elegant"];
pub const STRONG_WORDS: &[&str] = &["powerful", "decisive", "firm", "commanding", "bold", "mighty"];

pub const SIMILE_CREATURES: &[&str] = &[
    "a panther",
    "a walrus",
    "a ninja",
    "a steam train",
    "a flamingo",
    "a thunderstorm",
    "a gladiator",
    "a startled moose",
    "a wrestler",
    "an orangutan",
];

pub const SIMILE_PLACES: &[&str] = &[
    "in a blizzard",
    "in a car wash",
    "at a county fair",
    "in a bowling alley",
    "in a hardware store",
    "at a disco",
    "in a laundromat",
    "on a roller coaster",
    "at a bake sale",
    "in a library",
];

#[cfg(test)]
mod tests {
    use super::*;

    const MOODS: [Mood; 4] = [Mood::Happy, Mood::Sad, Mood::Angry, Mood::Embarrassed];

    #[test]
    fn every_mood_has_diction() {
        for mood in MOODS {
            assert!(!adverbs(mood).is_empty(), "{:?} adverbs", mood);
            assert!(!saids(mood).is_empty(), "{:?} saids", mood);
            assert!(!shouteds(mood).is_empty(), "{:?} shouteds", mood);
            assert!(!emoteds(mood).is_empty(), "{:?} emoteds", mood);
        }
    }

    #[test]
    fn lead_is_always_decorated() {
        let w = Wardrobe::for_archetype(Archetype::Lead);
        assert_eq!(w.decoration_chance, 100);
        assert!(w.decorations.iter().all(|d| d.starts_with(' ')));
    }

    #[test]
    fn villains_dress_dark() {
        let w = Wardrobe::for_archetype(Archetype::Villain);
        assert!(w.colours.contains(&"blood red"));
        assert_eq!(w.wearing, VILLAIN_WEARING);
    }
}
