/// Per-object, per-moment snapshots threaded through the lowering passes.
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use super::event::Mood;
use super::object::{Object, ObjectRef};
use crate::core::context::NarrativeContext;
use crate::core::voice;

pub type StateRef = Rc<State>;

/// Snapshot of one object at one point in the story. States are never
/// mutated; every pass clones with the fields it changes.
#[derive(Clone, PartialEq)]
pub struct State {
    pub object: ObjectRef,
    /// Was this object the subject of the previous event?
    pub is_referent: bool,
    /// Is this the first time the object is mentioned?
    pub first_occurrence: bool,
    pub torso_costume: Option<ObjectRef>,
    pub legs_costume: Option<ObjectRef>,
    pub feet_costume: Option<ObjectRef>,
    pub duties: BTreeSet<ObjectRef>,
    pub mood: Option<Mood>,
    pub location: Option<ObjectRef>,
}

impl State {
    pub fn new(object: ObjectRef) -> Self {
        Self {
            object,
            is_referent: false,
            first_occurrence: false,
            torso_costume: None,
            legs_costume: None,
            feet_costume: None,
            duties: BTreeSet::new(),
            mood: None,
            location: None,
        }
    }

    pub fn into_ref(self) -> StateRef {
        Rc::new(self)
    }

    pub fn with_location(&self, location: ObjectRef) -> State {
        State {
            location: Some(location),
            ..self.clone()
        }
    }

    pub fn with_mood(&self, mood: Mood) -> State {
        State {
            mood: Some(mood),
            ..self.clone()
        }
    }

    pub fn with_duties(&self, duties: BTreeSet<ObjectRef>) -> State {
        State {
            duties,
            ..self.clone()
        }
    }

    pub fn with_costume(
        &self,
        torso: ObjectRef,
        legs: Option<ObjectRef>,
        feet: ObjectRef,
    ) -> State {
        State {
            torso_costume: Some(torso),
            legs_costume: legs,
            feet_costume: Some(feet),
            ..self.clone()
        }
    }

    pub fn with_first_occurrence(&self, first: bool) -> State {
        State {
            first_occurrence: first,
            ..self.clone()
        }
    }

    pub fn with_referent(&self, referent: bool) -> State {
        State {
            is_referent: referent,
            ..self.clone()
        }
    }

    pub fn is_character(&self) -> bool {
        self.object.is_character()
    }

    /// Primary name on first mention, otherwise any alternate name.
    pub fn mention_name(&self, ctx: &mut NarrativeContext) -> String {
        let variants = self.object.names().len();
        if self.first_occurrence || variants < 2 {
            return self.object.name();
        }
        let index = ctx.range(1, variants - 1);
        self.object.name_variant(index)
    }

    pub fn definite(&self, ctx: &mut NarrativeContext) -> String {
        let name = self.mention_name(ctx);
        self.object.definite_of(&name)
    }

    pub fn indefinite(&self, ctx: &mut NarrativeContext) -> String {
        let name = self.mention_name(ctx);
        self.object.indefinite_of(&name)
    }

    /// Pronoun when this is the running referent, otherwise a definite mention.
    pub fn pronoun(&self, ctx: &mut NarrativeContext) -> String {
        if self.is_referent {
            self.object.pronouns().subject().to_string()
        } else {
            self.definite(ctx)
        }
    }

    pub fn accusative(&self, ctx: &mut NarrativeContext) -> String {
        if self.is_referent {
            self.object.pronouns().object().to_string()
        } else {
            self.definite(ctx)
        }
    }

    pub fn possessive(&self, ctx: &mut NarrativeContext) -> String {
        if self.is_referent {
            self.object.pronouns().possessive().to_string()
        } else {
            format!("{}'s", self.definite(ctx))
        }
    }

    pub fn adverb(&self, ctx: &mut NarrativeContext) -> Option<&'static str> {
        self.mood.map(|m| ctx.choose_str(voice::adverbs(m)))
    }

    pub fn said(&self, ctx: &mut NarrativeContext) -> Option<&'static str> {
        self.mood.map(|m| ctx.choose_str(voice::saids(m)))
    }

    pub fn shouted(&self, ctx: &mut NarrativeContext) -> Option<&'static str> {
        self.mood.map(|m| ctx.choose_str(voice::shouteds(m)))
    }

    pub fn emoted(&self, ctx: &mut NarrativeContext) -> Option<&'static str> {
        self.mood.map(|m| ctx.choose_str(voice::emoteds(m)))
    }

    /// One of the open duties, or the standing oath when there are none.
    pub fn pick_duty(&self, ctx: &mut NarrativeContext) -> ObjectRef {
        let open: Vec<&ObjectRef> = self.duties.iter().filter(|d| d.is_duty()).collect();
        match ctx.choose(&open) {
            Some(duty) => (*duty).clone(),
            None => Object::standing_duty(voice::STANDING_DUTY).into_ref(),
        }
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("State");
        d.field("object", &self.object);
        if self.is_referent {
            d.field("is_referent", &true);
        }
        if self.first_occurrence {
            d.field("first_occurrence", &true);
        }
        if let Some(mood) = self.mood {
            d.field("mood", &mood);
        }
        if let Some(location) = &self.location {
            d.field("location", location);
        }
        if !self.duties.is_empty() {
            d.field("duties", &self.duties);
        }
        if let Some(torso) = &self.torso_costume {
            d.field("torso", torso);
        }
        if let Some(legs) = &self.legs_costume {
            d.field("legs", legs);
        }
        if let Some(feet) = &self.feet_costume {
            d.field("feet", feet);
        }
        d.finish()
    }
}
