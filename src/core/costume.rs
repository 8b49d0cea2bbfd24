/// Costumes — per-scene outfits assembled from a character's wardrobe.
use super::context::NarrativeContext;
use super::voice::Wardrobe;
use crate::schema::character::{Character, Gender};
use crate::schema::object::{Object, ObjectRef};

/// A garment name and whether it takes plural agreement ("boots were").
type Item = (&'static str, bool);

const TORSO: &[Item] = &[
    ("jacket", false),
    ("shirt", false),
    ("jerkin", false),
    ("top", false),
    ("jersey", false),
    ("tunic", false),
    ("sweater", false),
    ("hoodie", false),
    ("flight jacket", false),
];
const TORSO_FEMININE: &[Item] = &[("blouse", false), ("halter top", false), ("bodice", false)];
const TORSO_MASCULINE: &[Item] = &[("muscle shirt", false)];

const LEGS: &[Item] = &[
    ("trousers", true),
    ("leggings", true),
    ("slacks", true),
    ("culottes", true),
];
const LEGS_FEMININE: &[Item] = &[("skirt", false)];

const ONE_PIECE: &[Item] = &[
    ("jumpsuit", false),
    ("flight suit", false),
    ("robe", false),
    ("smock", false),
    ("long coat", false),
    ("trench coat", false),
    ("coveralls", true),
];
const ONE_PIECE_FEMININE: &[Item] = &[("dress", false), ("gown", false), ("leotard", false)];

const FEET: &[Item] = &[
    ("boots", true),
    ("shoes", true),
    ("sandals", true),
    ("sneakers", true),
    ("moon boots", true),
    ("slippers", true),
];
const FEET_FEMININE: &[Item] = &[("pixie boots", true), ("pumps", true)];

/// Which garment a costume piece covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Torso,
    Legs,
    OnePiece,
    Feet,
}

impl Slot {
    fn items(&self, gender: Gender) -> Vec<Item> {
        let (common, feminine, masculine): (&[Item], &[Item], &[Item]) = match self {
            Slot::Torso => (TORSO, TORSO_FEMININE, TORSO_MASCULINE),
            Slot::Legs => (LEGS, LEGS_FEMININE, &[]),
            Slot::OnePiece => (ONE_PIECE, ONE_PIECE_FEMININE, &[]),
            Slot::Feet => (FEET, FEET_FEMININE, &[]),
        };
        let mut items = common.to_vec();
        match gender {
            Gender::Feminine => items.extend_from_slice(feminine),
            Gender::Masculine => items.extend_from_slice(masculine),
            Gender::Neutral => {}
        }
        items
    }
}

/// Everything a character wears in one scene.
#[derive(Debug, Clone)]
pub struct Outfit {
    pub torso: ObjectRef,
    pub legs: Option<ObjectRef>,
    pub feet: ObjectRef,
}

impl Outfit {
    /// Footwear always; two pieces 66% of the time, otherwise one piece in the torso slot.
    pub fn roll(character: &Character, ctx: &mut NarrativeContext) -> Outfit {
        let feet = make_costume(character, Slot::Feet, ctx);
        if ctx.chance(66) {
            Outfit {
                torso: make_costume(character, Slot::Torso, ctx),
                legs: Some(make_costume(character, Slot::Legs, ctx)),
                feet,
            }
        } else {
            Outfit {
                torso: make_costume(character, Slot::OnePiece, ctx),
                legs: None,
                feet,
            }
        }
    }
}

fn adjective(wardrobe: &Wardrobe, ctx: &mut NarrativeContext) -> String {
    if ctx.chance(wardrobe.superlative_chance) {
        return "TOTALLY STELLAR ".to_string();
    }
    if !ctx.chance(wardrobe.adjective_chance) {
        return String::new();
    }
    match ctx.choose_str(wardrobe.adjectives) {
        "" => String::new(),
        adj => format!("{} ", adj),
    }
}

fn decoration(wardrobe: &Wardrobe, ctx: &mut NarrativeContext) -> String {
    if !ctx.chance(wardrobe.decoration_chance) {
        return String::new();
    }
    let pattern = ctx.choose_str(wardrobe.decorations);
    pattern
        .replace("{colour}", ctx.choose_str(wardrobe.colours))
        .replace("{material}", ctx.choose_str(Wardrobe::materials()))
        .replace("{gems}", ctx.choose_str(Wardrobe::gems()))
}

/// Builds one garment: `[adjective ]<colour> <material> <item>[ decoration]`,
/// with the bare item as its short name.
pub fn make_costume(character: &Character, slot: Slot, ctx: &mut NarrativeContext) -> ObjectRef {
    let wardrobe = Wardrobe::for_archetype(character.archetype);
    let adjective = adjective(&wardrobe, ctx);
    let colour = ctx.choose_str(wardrobe.colours);
    let material = ctx.choose_str(Wardrobe::materials());
    let items = slot.items(character.gender);
    let (item, plural) = ctx.choose(&items).copied().unwrap_or(("outfit", false));
    let decoration = decoration(&wardrobe, ctx);

    let full = format!("{}{} {} {}{}", adjective, colour, material, item, decoration);
    let garment = Object::thing([full, item.to_string()]);
    if plural {
        garment.plural().into_ref()
    } else {
        garment.into_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::character::Archetype;

    fn make_character(gender: Gender, archetype: Archetype) -> Character {
        let mut ctx = NarrativeContext::new(3);
        Character::rolled(gender, archetype, &mut ctx)
    }

    #[test]
    fn short_name_is_the_item() {
        let mut ctx = NarrativeContext::new(9);
        let c = make_character(Gender::Masculine, Archetype::Plain);
        for _ in 0..30 {
            let feet = make_costume(&c, Slot::Feet, &mut ctx);
            assert_eq!(feet.names().len(), 2);
            assert!(feet.name().ends_with(feet.names()[1].as_str()) || feet.name().contains(" with "));
            assert!(feet.is_plural());
        }
    }

    #[test]
    fn lead_outfits_are_always_decorated() {
        let mut ctx = NarrativeContext::new(11);
        let c = make_character(Gender::Feminine, Archetype::Lead);
        for _ in 0..30 {
            let torso = make_costume(&c, Slot::Torso, &mut ctx);
            let item = &torso.names()[1];
            assert!(!torso.name().ends_with(item.as_str()), "{}", torso.name());
        }
    }

    #[test]
    fn one_piece_outfits_have_no_legs() {
        let mut ctx = NarrativeContext::new(5);
        let c = make_character(Gender::Neutral, Archetype::Optimist);
        let mut saw_one_piece = false;
        let mut saw_two_piece = false;
        for _ in 0..100 {
            let outfit = Outfit::roll(&c, &mut ctx);
            match outfit.legs {
                Some(_) => saw_two_piece = true,
                None => {
                    saw_one_piece = true;
                    let item = outfit.torso.names()[1].as_str();
                    assert!(ONE_PIECE.iter().any(|(name, _)| *name == item), "{}", item);
                }
            }
        }
        assert!(saw_one_piece && saw_two_piece);
    }

    #[test]
    fn masculine_torso_never_gets_a_blouse() {
        let mut ctx = NarrativeContext::new(2);
        let c = make_character(Gender::Masculine, Archetype::Dreamboat);
        for _ in 0..60 {
            let torso = make_costume(&c, Slot::Torso, &mut ctx);
            assert_ne!(torso.names()[1], "blouse");
        }
    }
}
