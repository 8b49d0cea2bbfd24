/// World objects — shared identities, grammatical classes, and participant groups.
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use thiserror::Error;

use super::character::{Archetype, Character};
use super::setting::Setting;

/// Shared handle to a world object. Objects are read-only once built.
pub type ObjectRef = Rc<Object>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    #[error("a group needs at least one member")]
    EmptyGroup,
}

/// Pronoun set used for referent-aware template slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pronouns {
    /// she/her/her
    SheHer,
    /// he/him/his
    HeHim,
    /// they/them/their
    TheyThem,
    /// it/it/its
    ItIts,
}

impl Default for Pronouns {
    fn default() -> Self {
        Self::ItIts
    }
}

impl Pronouns {
    /// Nominative form: "she", "he", "they", "it".
    pub fn subject(&self) -> &'static str {
        match self {
            Self::SheHer => "she",
            Self::HeHim => "he",
            Self::TheyThem => "they",
            Self::ItIts => "it",
        }
    }

    /// Accusative form: "her", "him", "them", "it".
    pub fn object(&self) -> &'static str {
        match self {
            Self::SheHer => "her",
            Self::HeHim => "him",
            Self::TheyThem => "them",
            Self::ItIts => "it",
        }
    }

    /// Possessive determiner: "her", "his", "their", "its".
    pub fn possessive(&self) -> &'static str {
        match self {
            Self::SheHer => "her",
            Self::HeHim => "his",
            Self::TheyThem => "their",
            Self::ItIts => "its",
        }
    }
}

/// Article behaviour of a noun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Noun {
    /// "a bridge" / "the bridge"
    #[default]
    Common,
    /// "some boots" / "the boots"
    Plural,
    /// "Serenity" in both positions
    Proper,
}

/// Officer ranks, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Ensign,
    Lieutenant,
    LieutenantCommander,
    Commander,
    Captain,
    Commodore,
    Admiral,
    SuperAdmiral,
}

impl Rank {
    pub const LADDER: [Rank; 8] = [
        Rank::Ensign,
        Rank::Lieutenant,
        Rank::LieutenantCommander,
        Rank::Commander,
        Rank::Captain,
        Rank::Commodore,
        Rank::Admiral,
        Rank::SuperAdmiral,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Ensign => "Ensign",
            Self::Lieutenant => "Lieutenant",
            Self::LieutenantCommander => "Lieutenant Commander",
            Self::Commander => "Commander",
            Self::Captain => "Captain",
            Self::Commodore => "Commodore",
            Self::Admiral => "Admiral",
            Self::SuperAdmiral => "Super Admiral",
        }
    }

    /// The rung above this one, if any.
    pub fn next(&self) -> Option<Rank> {
        let pos = Self::LADDER.iter().position(|r| r == self)?;
        Self::LADDER.get(pos + 1).copied()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// What an object is, beyond its name.
#[derive(Debug, Clone)]
pub enum ObjectKind {
    Thing,
    Character(Character),
    Setting(Setting),
    /// An obligation a character carries between acquiring and relieving it.
    Duty,
}

/// An immutable world identity. Equality, ordering and hashing use the name list only.
pub struct Object {
    names: Vec<String>,
    noun: Noun,
    pronouns: Pronouns,
    takeable: bool,
    home: Option<ObjectRef>,
    rank: Option<Rank>,
    weapon: Option<ObjectRef>,
    kind: ObjectKind,
}

fn collect_names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Vec<String> {
    names.into_iter().map(Into::into).collect()
}

impl Object {
    pub fn thing<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: collect_names(names),
            noun: Noun::Common,
            pronouns: Pronouns::ItIts,
            takeable: false,
            home: None,
            rank: None,
            weapon: None,
            kind: ObjectKind::Thing,
        }
    }

    pub fn character<S: Into<String>>(
        names: impl IntoIterator<Item = S>,
        character: Character,
    ) -> Self {
        Self {
            noun: Noun::Proper,
            pronouns: character.gender.pronouns(),
            kind: ObjectKind::Character(character),
            ..Self::thing(names)
        }
    }

    pub fn setting<S: Into<String>>(names: impl IntoIterator<Item = S>, setting: Setting) -> Self {
        Self {
            kind: ObjectKind::Setting(setting),
            ..Self::thing(names)
        }
    }

    /// The duty to rescue `target`.
    pub fn rescue_duty(target: &Object) -> Self {
        Self {
            kind: ObjectKind::Duty,
            ..Self::thing([format!("rescue {}", target.name())])
        }
    }

    /// The oath every character carries when nothing else is open.
    pub fn standing_duty(name: &str) -> Self {
        Self {
            kind: ObjectKind::Duty,
            ..Self::thing([name]).proper()
        }
    }

    /// The duty to get `item` back.
    pub fn retrieve_duty(item: &Object) -> Self {
        Self {
            kind: ObjectKind::Duty,
            ..Self::thing([format!("retrieve {}", item.definite())])
        }
    }

    pub fn takeable(mut self, takeable: bool) -> Self {
        self.takeable = takeable;
        self
    }

    pub fn plural(mut self) -> Self {
        self.noun = Noun::Plural;
        self.pronouns = Pronouns::TheyThem;
        self
    }

    pub fn proper(mut self) -> Self {
        self.noun = Noun::Proper;
        self
    }

    pub fn with_home(mut self, home: ObjectRef) -> Self {
        self.home = Some(home);
        self
    }

    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn with_weapon(mut self, weapon: ObjectRef) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn into_ref(self) -> ObjectRef {
        Rc::new(self)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn noun(&self) -> Noun {
        self.noun
    }

    pub fn pronouns(&self) -> Pronouns {
        self.pronouns
    }

    pub fn is_takeable(&self) -> bool {
        self.takeable
    }

    pub fn home(&self) -> Option<&ObjectRef> {
        self.home.as_ref()
    }

    pub fn rank(&self) -> Option<Rank> {
        self.rank
    }

    pub fn weapon(&self) -> Option<&ObjectRef> {
        self.weapon.as_ref()
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn as_character(&self) -> Option<&Character> {
        match &self.kind {
            ObjectKind::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_setting(&self) -> Option<&Setting> {
        match &self.kind {
            ObjectKind::Setting(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_character(&self) -> bool {
        self.as_character().is_some()
    }

    pub fn is_duty(&self) -> bool {
        matches!(self.kind, ObjectKind::Duty)
    }

    pub fn archetype(&self) -> Option<Archetype> {
        self.as_character().map(|c| c.archetype)
    }

    pub fn is_lead(&self) -> bool {
        self.archetype().is_some_and(|a| a.is_lead())
    }

    pub fn is_optimist(&self) -> bool {
        self.archetype().is_some_and(|a| a.is_optimist())
    }

    pub fn is_dreamboat(&self) -> bool {
        self.archetype().is_some_and(|a| a.is_dreamboat())
    }

    /// Name variant `index` with `{rank}` filled in.
    pub fn name_variant(&self, index: usize) -> String {
        let raw = self.names.get(index).map(String::as_str).unwrap_or_default();
        match self.rank {
            Some(rank) => raw.replace("{rank}", rank.title()),
            None => raw.replace("{rank}", ""),
        }
    }

    /// The primary name.
    pub fn name(&self) -> String {
        self.name_variant(0)
    }

    pub fn is_plural(&self) -> bool {
        self.noun == Noun::Plural || self.pronouns == Pronouns::TheyThem
    }

    pub fn definite_article(&self) -> &'static str {
        match self.noun {
            Noun::Common | Noun::Plural => "the ",
            Noun::Proper => "",
        }
    }

    pub fn indefinite_article(&self, name: &str) -> &'static str {
        match self.noun {
            Noun::Common => {
                let vowel = name
                    .chars()
                    .next()
                    .is_some_and(|c| "aeiou".contains(c.to_ascii_lowercase()));
                if vowel {
                    "an "
                } else {
                    "a "
                }
            }
            Noun::Plural => "some ",
            Noun::Proper => "",
        }
    }

    /// `name` with this object's definite article.
    pub fn definite_of(&self, name: &str) -> String {
        format!("{}{}", self.definite_article(), name)
    }

    /// `name` with this object's indefinite article.
    pub fn indefinite_of(&self, name: &str) -> String {
        format!("{}{}", self.indefinite_article(name), name)
    }

    pub fn definite(&self) -> String {
        self.definite_of(&self.name())
    }

    pub fn indefinite(&self) -> String {
        self.indefinite_of(&self.name())
    }

    pub fn possessive(&self) -> String {
        format!("{}'s", self.definite())
    }

    pub fn was(&self) -> &'static str {
        if self.is_plural() {
            "were"
        } else {
            "was"
        }
    }

    pub fn distal(&self) -> String {
        let det = if self.is_plural() { "those" } else { "that" };
        format!("{} {}", det, self.name())
    }

    pub fn proximal(&self) -> String {
        let det = if self.is_plural() { "these" } else { "this" };
        format!("{} {}", det, self.name())
    }

    /// The name with one trailing plural "s" removed.
    pub fn singular(&self) -> String {
        let name = self.name();
        match name.strip_suffix('s') {
            Some(stem) if self.is_plural() => stem.to_string(),
            _ => name,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({:?})", self.names)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl Eq for Object {}

impl Hash for Object {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.names.hash(state);
    }
}

impl PartialOrd for Object {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Object {
    fn cmp(&self, other: &Self) -> Ordering {
        self.names.cmp(&other.names)
    }
}

/// An ordered, non-empty set of participants acting as one plural subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Group {
    members: Vec<ObjectRef>,
}

impl Group {
    pub fn new(members: Vec<ObjectRef>) -> Result<Self, ObjectError> {
        if members.is_empty() {
            return Err(ObjectError::EmptyGroup);
        }
        Ok(Self { members })
    }

    pub fn members(&self) -> &[ObjectRef] {
        &self.members
    }

    /// "a", "a and b", or "a, b, and c".
    pub fn definite(&self) -> String {
        let names: Vec<String> = self.members.iter().map(|m| m.definite()).collect();
        match names.as_slice() {
            [] => String::new(),
            [only] => only.clone(),
            [first, second] => format!("{} and {}", first, second),
            [init @ .., last] => format!("{}, and {}", init.join(", "), last),
        }
    }

    pub fn possessive(&self) -> String {
        format!("{}'s", self.definite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boots() -> Object {
        Object::thing(["boots"]).plural()
    }

    #[test]
    fn common_articles() {
        let crystal = Object::thing(["hyper crystal"]);
        assert_eq!(crystal.definite(), "the hyper crystal");
        assert_eq!(crystal.indefinite(), "a hyper crystal");
        let arch = Object::thing(["arch"]);
        assert_eq!(arch.indefinite(), "an arch");
        assert_eq!(arch.was(), "was");
    }

    #[test]
    fn plural_articles_and_forms() {
        let b = boots();
        assert_eq!(b.indefinite(), "some boots");
        assert_eq!(b.definite(), "the boots");
        assert_eq!(b.was(), "were");
        assert_eq!(b.singular(), "boot");
        assert_eq!(b.distal(), "those boots");
        assert_eq!(b.pronouns().possessive(), "their");
    }

    #[test]
    fn proper_nouns_have_no_article() {
        let p = Object::thing(["Nebulon"]).proper();
        assert_eq!(p.definite(), "Nebulon");
        assert_eq!(p.indefinite(), "Nebulon");
        assert_eq!(p.possessive(), "Nebulon's");
    }

    #[test]
    fn rank_is_substituted_into_names() {
        let o = Object::thing(["{rank} Joe"]).proper().with_rank(Rank::Commander);
        assert_eq!(o.name(), "Commander Joe");
        assert_eq!(Rank::Commander.next(), Some(Rank::Captain));
        assert_eq!(Rank::SuperAdmiral.next(), None);
    }

    #[test]
    fn identity_is_by_names() {
        let a = Object::thing(["rock"]).takeable(true);
        let b = Object::thing(["rock"]);
        assert_eq!(a, b);
        assert_ne!(a, Object::thing(["stone"]));
    }

    #[test]
    fn group_definite_lists() {
        let a = Object::thing(["Ann"]).proper().into_ref();
        let b = Object::thing(["Bo"]).proper().into_ref();
        let c = Object::thing(["Cy"]).proper().into_ref();
        assert_eq!(Group::new(vec![a.clone()]).unwrap().definite(), "Ann");
        assert_eq!(
            Group::new(vec![a.clone(), b.clone()]).unwrap().definite(),
            "Ann and Bo"
        );
        assert_eq!(
            Group::new(vec![a, b, c]).unwrap().definite(),
            "Ann, Bo, and Cy"
        );
    }

    #[test]
    fn empty_group_is_rejected() {
        assert_eq!(Group::new(Vec::new()), Err(ObjectError::EmptyGroup));
    }

    #[test]
    fn duty_names() {
        let victim = Object::thing(["Dwight"]).proper();
        assert_eq!(Object::rescue_duty(&victim).name(), "rescue Dwight");
        let gem = Object::thing(["hyper crystal"]);
        assert_eq!(Object::retrieve_duty(&gem).name(), "retrieve the hyper crystal");
        assert!(Object::rescue_duty(&victim).is_duty());
        assert!(Object::standing_duty("keep watch").is_duty());
        assert!(!gem.is_duty());
    }
}
