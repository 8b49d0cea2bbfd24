/// Template language — parsing and rendering of `<a|b|c>` alternations and
/// `{role.attr.attr}` slots against a node's attributes.
use rand::Rng;
use thiserror::Error;

use super::context::NarrativeContext;
use super::tree::{Node, NodeKind, Role, TreeError, Value};
use super::voice::{self, Wardrobe};
use crate::schema::character::Character;
use crate::schema::object::{Group, ObjectRef};
use crate::schema::setting::Setting;
use crate::schema::state::StateRef;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("template parse error in '{template}': {reason}")]
    TemplateParse { template: String, reason: String },
    #[error("cannot render '{template}' on {node}: {source}")]
    Render {
        template: String,
        node: String,
        #[source]
        source: SlotError,
    },
    #[error("{0} has no templates to render")]
    NotRenderable(String),
}

/// Why a single slot failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("role '{0}' is not set")]
    UnsetRole(Role),
    #[error("'{attr}' is not available on {on}")]
    NoSuchAttribute { attr: &'static str, on: String },
    #[error("'{attr}' of {on} is empty")]
    Missing { attr: &'static str, on: String },
    #[error("mood not assigned to {0}")]
    MoodUnassigned(String),
    #[error("slot ends on {0} rather than text")]
    NotText(String),
}

/// Closed set of attribute names a slot path may use after its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    Name,
    Definite,
    Indefinite,
    Possessive,
    PossessivePronoun,
    Accusative,
    AccusativePronoun,
    Pronoun,
    Was,
    Distal,
    Proximal,
    Singular,
    Colour,
    Gibberish,
    Rank,
    NextRank,
    Home,
    Weapon,
    Stature,
    HairLength,
    HairColour,
    EyeColour,
    FeatureAdj,
    Feature,
    WarCry,
    Wearing,
    Yet,
    Motion,
    Simile,
    WithVoice,
    Adverb,
    Said,
    Shouted,
    Emoted,
    PickDuty,
    Location,
    TorsoCostume,
    LegsCostume,
    FeetCostume,
    Light,
    Preposition,
    Nearby,
    NearbyScenery,
    NearbyTakeable,
    Roof,
}

impl Attr {
    pub const ALL: &'static [Attr] = &[
        Attr::Name,
        Attr::Definite,
        Attr::Indefinite,
        Attr::Possessive,
        Attr::PossessivePronoun,
        Attr::Accusative,
        Attr::AccusativePronoun,
        Attr::Pronoun,
        Attr::Was,
        Attr::Distal,
        Attr::Proximal,
        Attr::Singular,
        Attr::Colour,
        Attr::Gibberish,
        Attr::Rank,
        Attr::NextRank,
        Attr::Home,
        Attr::Weapon,
        Attr::Stature,
        Attr::HairLength,
        Attr::HairColour,
        Attr::EyeColour,
        Attr::FeatureAdj,
        Attr::Feature,
        Attr::WarCry,
        Attr::Wearing,
        Attr::Yet,
        Attr::Motion,
        Attr::Simile,
        Attr::WithVoice,
        Attr::Adverb,
        Attr::Said,
        Attr::Shouted,
        Attr::Emoted,
        Attr::PickDuty,
        Attr::Location,
        Attr::TorsoCostume,
        Attr::LegsCostume,
        Attr::FeetCostume,
        Attr::Light,
        Attr::Preposition,
        Attr::Nearby,
        Attr::NearbyScenery,
        Attr::NearbyTakeable,
        Attr::Roof,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Definite => "definite",
            Self::Indefinite => "indefinite",
            Self::Possessive => "possessive",
            Self::PossessivePronoun => "possessive_pronoun",
            Self::Accusative => "accusative",
            Self::AccusativePronoun => "accusative_pronoun",
            Self::Pronoun => "pronoun",
            Self::Was => "was",
            Self::Distal => "distal",
            Self::Proximal => "proximal",
            Self::Singular => "singular",
            Self::Colour => "colour",
            Self::Gibberish => "gibberish",
            Self::Rank => "rank",
            Self::NextRank => "next_rank",
            Self::Home => "home",
            Self::Weapon => "weapon",
            Self::Stature => "stature",
            Self::HairLength => "hair_length",
            Self::HairColour => "hair_colour",
            Self::EyeColour => "eye_colour",
            Self::FeatureAdj => "feature_adj",
            Self::Feature => "feature",
            Self::WarCry => "war_cry",
            Self::Wearing => "wearing",
            Self::Yet => "yet",
            Self::Motion => "motion",
            Self::Simile => "simile",
            Self::WithVoice => "withvoice",
            Self::Adverb => "adverb",
            Self::Said => "said",
            Self::Shouted => "shouted",
            Self::Emoted => "emoted",
            Self::PickDuty => "pick_duty",
            Self::Location => "location",
            Self::TorsoCostume => "torso_costume",
            Self::LegsCostume => "legs_costume",
            Self::FeetCostume => "feet_costume",
            Self::Light => "light",
            Self::Preposition => "preposition",
            Self::Nearby => "nearby",
            Self::NearbyScenery => "nearby_scenery",
            Self::NearbyTakeable => "nearby_takeable",
            Self::Roof => "roof",
        }
    }

    /// Parses an attribute name, expanding the short aliases
    /// (`def`, `indef`, `his`, `her`, `he`, `she`).
    pub fn parse(name: &str) -> Option<Attr> {
        let name = match name {
            "indef" => "indefinite",
            "def" => "definite",
            "his" | "her" => "possessive_pronoun",
            "he" | "she" => "pronoun",
            other => other,
        };
        Self::ALL.iter().copied().find(|a| a.name() == name)
    }
}

/// A parsed piece of a template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSegment {
    Literal(String),
    /// One alternative is picked uniformly at random.
    Choice(Vec<Template>),
    Slot { role: Role, path: Vec<Attr> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

fn parse_error(template: &str, reason: impl Into<String>) -> GrammarError {
    GrammarError::TemplateParse {
        template: template.to_string(),
        reason: reason.into(),
    }
}

impl Template {
    /// Parses a template string. `{{` and `}}` are literal braces.
    pub fn parse(input: &str) -> Result<Template, GrammarError> {
        let chars: Vec<char> = input.chars().collect();
        Self::parse_chars(input, &chars, true)
    }

    fn parse_chars(source: &str, chars: &[char], allow_choice: bool) -> Result<Template, GrammarError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            match chars[i] {
                '{' if chars.get(i + 1) == Some(&'{') => {
                    literal_buf.push('{');
                    i += 2;
                }
                '}' if chars.get(i + 1) == Some(&'}') => {
                    literal_buf.push('}');
                    i += 2;
                }
                '{' => {
                    let end = (i + 1..len)
                        .find(|&j| chars[j] == '}')
                        .ok_or_else(|| parse_error(source, "unclosed brace"))?;
                    let content: String = chars[i + 1..end].iter().collect();
                    if content.contains('{') {
                        return Err(parse_error(source, "nested braces are not allowed"));
                    }
                    if !literal_buf.is_empty() {
                        segments.push(TemplateSegment::Literal(std::mem::take(&mut literal_buf)));
                    }
                    segments.push(Self::parse_slot(source, &content)?);
                    i = end + 1;
                }
                '}' => return Err(parse_error(source, "unmatched closing brace")),
                '<' => {
                    if !allow_choice {
                        return Err(parse_error(source, "nested alternation"));
                    }
                    let end = (i + 1..len)
                        .find(|&j| chars[j] == '>')
                        .ok_or_else(|| parse_error(source, "unclosed alternation"))?;
                    if !literal_buf.is_empty() {
                        segments.push(TemplateSegment::Literal(std::mem::take(&mut literal_buf)));
                    }
                    let mut options = Vec::new();
                    for option in chars[i + 1..end].split(|c| *c == '|') {
                        options.push(Self::parse_chars(source, option, false)?);
                    }
                    segments.push(TemplateSegment::Choice(options));
                    i = end + 1;
                }
                '>' => return Err(parse_error(source, "unmatched '>'")),
                c => {
                    literal_buf.push(c);
                    i += 1;
                }
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TemplateSegment::Literal(literal_buf));
        }
        Ok(Template { segments })
    }

    fn parse_slot(source: &str, content: &str) -> Result<TemplateSegment, GrammarError> {
        let mut parts = content.split('.');
        let head = parts.next().unwrap_or_default();
        if head.is_empty() {
            return Err(parse_error(source, "empty slot"));
        }
        let role = Role::parse(head)
            .ok_or_else(|| parse_error(source, format!("unknown role '{}'", head)))?;
        let mut path = Vec::new();
        for part in parts {
            let attr = Attr::parse(part)
                .ok_or_else(|| parse_error(source, format!("unknown attribute '{}'", part)))?;
            path.push(attr);
        }
        if path.is_empty() {
            return Err(parse_error(source, format!("slot '{}' names no attribute", content)));
        }
        Ok(TemplateSegment::Slot { role, path })
    }

    /// Every role a slot refers to, including inside alternations.
    pub fn roles(&self) -> Vec<Role> {
        let mut roles = Vec::new();
        for segment in &self.segments {
            match segment {
                TemplateSegment::Slot { role, .. } => roles.push(*role),
                TemplateSegment::Choice(options) => {
                    for option in options {
                        roles.extend(option.roles());
                    }
                }
                TemplateSegment::Literal(_) => {}
            }
        }
        roles
    }

    /// Checks that every slot role is declared by `kind`.
    pub fn check_roles<K: NodeKind>(&self, kind: &K) -> Result<(), TreeError> {
        for role in self.roles() {
            if !kind.roles().contains(&role) {
                return Err(TreeError::UnknownRole {
                    node: kind.label(),
                    role,
                });
            }
        }
        Ok(())
    }

    pub fn render<K: NodeKind>(
        &self,
        node: &Node<K>,
        ctx: &mut NarrativeContext,
    ) -> Result<String, SlotError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Choice(options) => {
                    if options.is_empty() {
                        continue;
                    }
                    let pick = ctx.rng().gen_range(0..options.len());
                    out.push_str(&options[pick].render(node, ctx)?);
                }
                TemplateSegment::Slot { role, path } => {
                    let value = node.attribute(*role)?.ok_or(SlotError::UnsetRole(*role))?;
                    let mut term = Term::from(value);
                    for attr in path {
                        term = term.attr(*attr, ctx)?;
                    }
                    out.push_str(&term.into_text()?);
                }
            }
        }
        Ok(out)
    }
}

/// Parses `source` and renders it against `node`, attaching the template and
/// node to any failure.
pub fn render_template<K: NodeKind>(
    source: &str,
    node: &Node<K>,
    ctx: &mut NarrativeContext,
) -> Result<String, GrammarError> {
    let template = Template::parse(source)?;
    template
        .render(node, ctx)
        .map_err(|source_err| GrammarError::Render {
            template: source.to_string(),
            node: node.summary(),
            source: source_err,
        })
}

/// Uppercases the first alphabetic character.
pub fn capitalize(text: &str) -> String {
    match text.char_indices().find(|(_, c)| c.is_alphabetic()) {
        Some((at, c)) => {
            let mut out = String::with_capacity(text.len());
            out.push_str(&text[..at]);
            out.extend(c.to_uppercase());
            out.push_str(&text[at + c.len_utf8()..]);
            out
        }
        None => text.to_string(),
    }
}

/// Intermediate value while walking a slot path.
#[derive(Debug, Clone)]
pub enum Term {
    Object(ObjectRef),
    State(StateRef),
    Group(Group),
    Text(String),
}

impl From<&Value> for Term {
    fn from(value: &Value) -> Self {
        match value {
            Value::Object(o) => Term::Object(o.clone()),
            Value::State(s) => Term::State(s.clone()),
            Value::Group(g) => Term::Group(g.clone()),
        }
    }
}

fn text(s: impl Into<String>) -> Result<Term, SlotError> {
    Ok(Term::Text(s.into()))
}

fn linked(attr: Attr, on: &ObjectRef, link: Option<&ObjectRef>) -> Result<Term, SlotError> {
    link.cloned().map(Term::Object).ok_or_else(|| SlotError::Missing {
        attr: attr.name(),
        on: on.name(),
    })
}

fn yet(ctx: &mut NarrativeContext) -> String {
    format!(
        "{} yet {}",
        ctx.choose_str(voice::SMOOTH_WORDS),
        ctx.choose_str(voice::STRONG_WORDS)
    )
}

fn simile(ctx: &mut NarrativeContext) -> String {
    format!(
        "like {} {}",
        ctx.choose_str(voice::SIMILE_CREATURES),
        ctx.choose_str(voice::SIMILE_PLACES)
    )
}

impl Term {
    fn describe(&self) -> String {
        match self {
            Term::Object(o) => format!("{:?}", o),
            Term::State(s) => format!("State({:?})", s.object),
            Term::Group(g) => format!("Group({})", g.definite()),
            Term::Text(t) => format!("text '{}'", t),
        }
    }

    fn into_text(self) -> Result<String, SlotError> {
        match self {
            Term::Text(t) => Ok(t),
            other => Err(SlotError::NotText(other.describe())),
        }
    }

    /// Looks up one attribute on this term.
    pub fn attr(&self, attr: Attr, ctx: &mut NarrativeContext) -> Result<Term, SlotError> {
        match self {
            Term::Object(o) => object_attr(o, attr, ctx),
            Term::State(s) => state_attr(s, attr, ctx),
            Term::Group(g) => group_attr(g, attr),
            Term::Text(_) => Err(SlotError::NoSuchAttribute {
                attr: attr.name(),
                on: self.describe(),
            }),
        }
    }
}

fn group_attr(group: &Group, attr: Attr) -> Result<Term, SlotError> {
    match attr {
        Attr::Name | Attr::Definite | Attr::Indefinite | Attr::Pronoun | Attr::Accusative => {
            text(group.definite())
        }
        Attr::Possessive => text(group.possessive()),
        Attr::PossessivePronoun => text("their"),
        Attr::AccusativePronoun => text("them"),
        Attr::Was => text("were"),
        _ => Err(SlotError::NoSuchAttribute {
            attr: attr.name(),
            on: format!("Group({})", group.definite()),
        }),
    }
}

fn state_attr(state: &StateRef, attr: Attr, ctx: &mut NarrativeContext) -> Result<Term, SlotError> {
    let unmooded = || SlotError::MoodUnassigned(state.object.name());
    match attr {
        Attr::Definite => text(state.definite(ctx)),
        Attr::Indefinite => text(state.indefinite(ctx)),
        Attr::Pronoun => text(state.pronoun(ctx)),
        Attr::Accusative => text(state.accusative(ctx)),
        Attr::Possessive => text(state.possessive(ctx)),
        Attr::Adverb => text(state.adverb(ctx).ok_or_else(unmooded)?),
        Attr::Said => text(state.said(ctx).ok_or_else(unmooded)?),
        Attr::Shouted => text(state.shouted(ctx).ok_or_else(unmooded)?),
        Attr::Emoted => text(state.emoted(ctx).ok_or_else(unmooded)?),
        Attr::PickDuty => Ok(Term::Object(state.pick_duty(ctx))),
        Attr::Location => linked(attr, &state.object, state.location.as_ref()),
        Attr::TorsoCostume => linked(attr, &state.object, state.torso_costume.as_ref()),
        Attr::LegsCostume => linked(attr, &state.object, state.legs_costume.as_ref()),
        Attr::FeetCostume => linked(attr, &state.object, state.feet_costume.as_ref()),
        _ => object_attr(&state.object, attr, ctx),
    }
}

fn character_of(object: &ObjectRef, attr: Attr) -> Result<&Character, SlotError> {
    object.as_character().ok_or_else(|| SlotError::NoSuchAttribute {
        attr: attr.name(),
        on: object.name(),
    })
}

fn setting_of(object: &ObjectRef, attr: Attr) -> Result<&Setting, SlotError> {
    object.as_setting().ok_or_else(|| SlotError::NoSuchAttribute {
        attr: attr.name(),
        on: object.name(),
    })
}

fn object_attr(object: &ObjectRef, attr: Attr, ctx: &mut NarrativeContext) -> Result<Term, SlotError> {
    let pronouns = object.pronouns();
    let missing = || SlotError::Missing {
        attr: attr.name(),
        on: object.name(),
    };
    match attr {
        Attr::Name => text(object.name()),
        Attr::Definite => text(object.definite()),
        Attr::Indefinite => text(object.indefinite()),
        Attr::Possessive => text(object.possessive()),
        Attr::PossessivePronoun => text(pronouns.possessive()),
        Attr::Accusative | Attr::AccusativePronoun => text(pronouns.object()),
        Attr::Pronoun => text(pronouns.subject()),
        Attr::Was => text(object.was()),
        Attr::Distal => text(object.distal()),
        Attr::Proximal => text(object.proximal()),
        Attr::Singular => text(object.singular()),
        Attr::Colour => {
            let palette = match object.as_character() {
                Some(c) => Wardrobe::for_archetype(c.archetype).colours,
                None => Wardrobe::default_colours(),
            };
            text(ctx.choose_str(palette))
        }
        Attr::Gibberish => text(ctx.gibberish()),
        Attr::Rank => text(object.rank().ok_or_else(missing)?.title()),
        Attr::NextRank => text(object.rank().and_then(|r| r.next()).ok_or_else(missing)?.title()),
        Attr::Home => linked(attr, object, object.home()),
        Attr::Weapon => linked(attr, object, object.weapon()),

        Attr::Stature => text(character_of(object, attr)?.traits.stature.clone()),
        Attr::HairLength => text(character_of(object, attr)?.traits.hair_length.clone()),
        Attr::HairColour => text(character_of(object, attr)?.traits.hair_colour.clone()),
        Attr::EyeColour => text(character_of(object, attr)?.traits.eye_colour.clone()),
        Attr::FeatureAdj => text(character_of(object, attr)?.traits.feature_adj.clone()),
        Attr::Feature => text(character_of(object, attr)?.traits.feature.clone()),
        Attr::WarCry => text(character_of(object, attr)?.traits.war_cry.clone()),
        Attr::Wearing => {
            let wardrobe = Wardrobe::for_archetype(character_of(object, attr)?.archetype);
            text(ctx.choose_str(wardrobe.wearing))
        }
        Attr::Yet => {
            character_of(object, attr)?;
            text(yet(ctx))
        }
        Attr::Motion => {
            character_of(object, attr)?;
            if ctx.chance(80) {
                text("")
            } else {
                text(format!("with a {} motion, ", yet(ctx)))
            }
        }
        Attr::Simile => {
            character_of(object, attr)?;
            text(simile(ctx))
        }
        Attr::WithVoice => {
            character_of(object, attr)?;
            text(format!("with a voice {}", simile(ctx)))
        }

        Attr::Light => text(setting_of(object, attr)?.light.clone()),
        Attr::Preposition => text(setting_of(object, attr)?.preposition.clone()),
        Attr::Nearby => setting_of(object, attr)?
            .nearby(ctx)
            .map(Term::Object)
            .ok_or_else(missing),
        Attr::NearbyScenery => setting_of(object, attr)?
            .nearby_scenery(ctx)
            .map(Term::Object)
            .ok_or_else(missing),
        Attr::NearbyTakeable => setting_of(object, attr)?
            .nearby_takeable(ctx)
            .map(Term::Object)
            .ok_or_else(missing),
        Attr::Roof => Ok(Term::Object(setting_of(object, attr)?.roof.clone())),

        Attr::Adverb
        | Attr::Said
        | Attr::Shouted
        | Attr::Emoted
        | Attr::PickDuty
        | Attr::Location
        | Attr::TorsoCostume
        | Attr::LegsCostume
        | Attr::FeetCostume => Err(SlotError::NoSuchAttribute {
            attr: attr.name(),
            on: format!("bare {:?}", object),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::event::{event, EventKind, Mood, StoryKind};
    use crate::schema::object::Object;
    use crate::schema::state::State;

    fn make_ctx() -> NarrativeContext {
        NarrativeContext::new(17)
    }

    fn rock_event() -> Node<StoryKind> {
        let rock = Object::thing(["rock"]).into_ref();
        event(EventKind::PickUp).with(Role::Subject, rock).unwrap()
    }

    #[test]
    fn parse_literal_only() {
        let t = Template::parse("hello there").unwrap();
        assert_eq!(t.segments, vec![TemplateSegment::Literal("hello there".into())]);
    }

    #[test]
    fn parse_slot_with_aliases() {
        let t = Template::parse("{subj.his}").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Slot {
                role: Role::Subject,
                path: vec![Attr::PossessivePronoun]
            }]
        );
        let t = Template::parse("{obj.def}").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Slot {
                role: Role::Object,
                path: vec![Attr::Definite]
            }]
        );
    }

    #[test]
    fn parse_choice_with_slots() {
        let t = Template::parse("a <b|{subj.he}|> c").unwrap();
        match &t.segments[1] {
            TemplateSegment::Choice(options) => assert_eq!(options.len(), 3),
            other => panic!("expected choice, got {:?}", other),
        }
        assert_eq!(t.roles(), vec![Role::Subject]);
    }

    #[test]
    fn parse_errors() {
        assert!(Template::parse("{}").is_err());
        assert!(Template::parse("{subj").is_err());
        assert!(Template::parse("oops}").is_err());
        assert!(Template::parse("{subj.shoe_size}").is_err());
        assert!(Template::parse("{villain.name}").is_err());
        assert!(Template::parse("{subj}").is_err());
        assert!(Template::parse("<a|<b>>").is_err());
        assert!(Template::parse("<a|b").is_err());
    }

    #[test]
    fn escaped_braces() {
        let t = Template::parse("{{literal}}").unwrap();
        assert_eq!(t.segments, vec![TemplateSegment::Literal("{literal}".into())]);
    }

    #[test]
    fn renders_slots_against_node() {
        let node = rock_event();
        let mut ctx = make_ctx();
        let out = render_template("{subj.pronoun} lay there, {subj.def}", &node, &mut ctx).unwrap();
        assert_eq!(out, "it lay there, the rock");
    }

    #[test]
    fn choice_picks_one_alternative() {
        let node = rock_event();
        let mut ctx = make_ctx();
        for _ in 0..20 {
            let out = render_template("<x|y|z>", &node, &mut ctx).unwrap();
            assert!(["x", "y", "z"].contains(&out.as_str()));
        }
    }

    #[test]
    fn unset_role_is_reported_with_template() {
        let node = rock_event();
        let err = render_template("{obj.definite}", &node, &mut make_ctx()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("{obj.definite}"), "message was {}", msg);
        assert!(matches!(
            err,
            GrammarError::Render {
                source: SlotError::UnsetRole(Role::Object),
                ..
            }
        ));
    }

    #[test]
    fn state_diction_needs_mood() {
        let rock = State::new(Object::thing(["rock"]).into_ref()).into_ref();
        let node = event(EventKind::Emote).with(Role::Subject, rock.clone()).unwrap();
        let err = render_template("{subj.said}", &node, &mut make_ctx()).unwrap_err();
        assert!(matches!(
            err,
            GrammarError::Render {
                source: SlotError::MoodUnassigned(_),
                ..
            }
        ));

        let happy = rock.with_mood(Mood::Happy).into_ref();
        let node = event(EventKind::Emote).with(Role::Subject, happy).unwrap();
        assert!(render_template("{subj.said}", &node, &mut make_ctx()).is_ok());
    }

    #[test]
    fn chained_lookup_through_links() {
        let sword = Object::thing(["laser sword"]).into_ref();
        let hero = Object::thing(["Zed"]).proper().with_weapon(sword).into_ref();
        let node = event(EventKind::Unsheathe).with(Role::Subject, hero).unwrap();
        let out = render_template("{subj.weapon.definite}", &node, &mut make_ctx()).unwrap();
        assert_eq!(out, "the laser sword");
        let err = render_template("{subj.weapon}", &node, &mut make_ctx()).unwrap_err();
        assert!(matches!(err, GrammarError::Render { source: SlotError::NotText(_), .. }));
    }

    #[test]
    fn group_slots() {
        let a = Object::thing(["Ann"]).proper().into_ref();
        let b = Object::thing(["Bo"]).proper().into_ref();
        let group = Group::new(vec![a, b]).unwrap();
        let node = event(EventKind::TurnCorner).with(Role::Subject, group).unwrap();
        let out = render_template("{subj.pronoun} turned {subj.his} heads", &node, &mut make_ctx()).unwrap();
        assert_eq!(out, "Ann and Bo turned their heads");
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("\"oh no!\" she said"), "\"Oh no!\" she said");
        assert_eq!(capitalize("the end"), "The end");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("..."), "...");
    }

    #[test]
    fn every_event_template_compiles() {
        for kind in EventKind::ALL {
            let node_kind = StoryKind::Event(*kind);
            let one_piece = kind.one_piece_templates().unwrap_or_default();
            for source in kind.templates().iter().chain(one_piece) {
                let template = Template::parse(source)
                    .unwrap_or_else(|e| panic!("{:?}: {}", kind, e));
                template
                    .check_roles(&node_kind)
                    .unwrap_or_else(|e| panic!("{:?} '{}': {}", kind, source, e));
            }
        }
    }
}
