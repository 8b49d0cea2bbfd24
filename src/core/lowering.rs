/// Story lowering — the ordered passes that turn a plot's raw beats into
/// an annotated, paragraph-structured story ready for rendering.
///
/// Every pass is a tree-to-tree rewrite. Context that must carry across
/// the traversal (moods, duties, who has been described) is threaded
/// through explicitly; the only state that outlives a story is the set
/// of characters already introduced, which the [`Editor`] keeps between
/// chapters.
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::warn;

use super::context::NarrativeContext;
use super::costume::Outfit;
use super::tree::{Node, Role, TreeError, Value};
use crate::schema::event::{event, sequence, EventKind, Mood, StoryKind, StoryNode};
use crate::schema::object::ObjectRef;
use crate::schema::state::{State, StateRef};

#[derive(Debug, Error)]
pub enum LoweringError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("setting '{0}' has no scenery to describe")]
    NoScenery(String),
    #[error("scene is not a single sequence of events: {0}")]
    MalformedScene(String),
}

/// Runs the lowering passes, remembering who has been introduced.
#[derive(Debug, Clone)]
pub struct Editor {
    conjoin_chance: u32,
    introduced: FxHashSet<ObjectRef>,
}

impl Editor {
    pub fn new(conjoin_chance: u32) -> Self {
        Self {
            conjoin_chance,
            introduced: FxHashSet::default(),
        }
    }

    /// Characters described so far, across every story edited.
    pub fn introduced(&self) -> &FxHashSet<ObjectRef> {
        &self.introduced
    }

    pub fn edit(&mut self, story: &StoryNode, ctx: &mut NarrativeContext) -> Result<StoryNode, LoweringError> {
        let story = merge_adjacent_scenes(story);
        let story = resolve_scenery(&story, None, ctx)?;
        let story = assign_empty_states(&story);
        let story = assign_locations(&story, None);
        let story = assign_costumes(&story, &mut FxHashMap::default(), ctx);

        let story = assign_moods(&story, &mut FxHashMap::default());
        let story = remove_mood_modifiers(&story, ctx)?;
        let story = assign_duties(&story, &mut FxHashMap::default());
        let story = remove_duty_events(&story);

        let story = describe_scenes(&story, ctx)?;
        let mut newly = FxHashSet::default();
        let mut remaining = count_subject_appearances(&story);
        let story = describe_characters(&story, &mut self.introduced, &mut newly, &mut remaining, ctx)?;
        let story = remind_characters(&story, &mut newly, ctx)?;
        let story = describe_costumes(&story, &mut FxHashSet::default(), ctx)?;
        let story = assign_first_occurrence(&story, &mut FxHashSet::default());

        let story = story.flatten();
        let story = split_into_paragraphs(&story)?;
        let story = assign_referents(&story, &mut None);
        Ok(conjoin(&story, self.conjoin_chance, ctx))
    }
}

fn is_scene(node: &StoryNode) -> bool {
    *node.kind() == StoryKind::Scene
}

/// The subject state of an event, when it is a character.
fn character_subject(node: &StoryNode) -> Option<&StateRef> {
    node.kind().event()?;
    node.get(Role::Subject)
        .and_then(Value::state)
        .filter(|s| s.is_character())
}

fn rebuild(node: &StoryNode, children: Vec<StoryNode>) -> StoryNode {
    node.with_children(children)
}

pub fn merge_adjacent_scenes(story: &StoryNode) -> StoryNode {
    let mut children: Vec<StoryNode> = Vec::with_capacity(story.children().len());
    for child in story.children() {
        if let Some(last) = children.last_mut() {
            if is_scene(last) && is_scene(child) && last.get(Role::Setting) == child.get(Role::Setting) {
                let mut merged = last.children().to_vec();
                merged.extend(child.children().iter().cloned());
                *last = last.with_children(merged);
                continue;
            }
        }
        children.push(child.clone());
    }
    rebuild(story, children)
}

/// Poses point at a random fixed piece of the scene's scenery.
pub fn resolve_scenery(
    node: &StoryNode,
    setting: Option<&ObjectRef>,
    ctx: &mut NarrativeContext,
) -> Result<StoryNode, TreeError> {
    let setting = if is_scene(node) {
        node.object_in(Role::Setting)
    } else {
        setting
    };
    let mut resolved = node.clone();
    if node.kind().event() == Some(EventKind::PoseDescription) {
        let scenery = setting
            .and_then(|s| s.as_setting())
            .and_then(|s| s.nearby_scenery(ctx));
        if let Some(scenery) = scenery {
            resolved = resolved.with(Role::Object, scenery)?;
        }
    }
    let children = node
        .children()
        .iter()
        .map(|c| resolve_scenery(c, setting, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rebuild(&resolved, children))
}

/// Swaps every bare object for one shared empty state per object.
pub fn assign_empty_states(story: &StoryNode) -> StoryNode {
    let mut states: FxHashMap<ObjectRef, StateRef> = FxHashMap::default();
    for node in story.descendants() {
        for (_, value) in node.attributes() {
            if let Value::Object(o) = value {
                states
                    .entry(o.clone())
                    .or_insert_with(|| State::new(o.clone()).into_ref());
            }
        }
    }
    replace_objects(story, &states)
}

fn replace_objects(node: &StoryNode, states: &FxHashMap<ObjectRef, StateRef>) -> StoryNode {
    let children = node.children().iter().map(|c| replace_objects(c, states)).collect();
    let replaced = node.map_values(|_, v| match v {
        Value::Object(o) => states.get(o).cloned().map(Value::State).unwrap_or_else(|| v.clone()),
        other => other.clone(),
    });
    rebuild(&replaced, children)
}

/// Characters are wherever their scene is.
pub fn assign_locations(node: &StoryNode, location: Option<&ObjectRef>) -> StoryNode {
    let location = if is_scene(node) {
        node.object_in(Role::Setting)
    } else {
        location
    };
    let placed = match location {
        Some(loc) => node.map_values(|_, v| match v {
            Value::State(s) if s.is_character() => Value::State(s.with_location(loc.clone()).into_ref()),
            other => other.clone(),
        }),
        None => node.clone(),
    };
    let children = node
        .children()
        .iter()
        .map(|c| assign_locations(c, location))
        .collect();
    rebuild(&placed, children)
}

/// One outfit per character per scene.
pub fn assign_costumes(
    node: &StoryNode,
    outfits: &mut FxHashMap<ObjectRef, Outfit>,
    ctx: &mut NarrativeContext,
) -> StoryNode {
    let mut scene_outfits = FxHashMap::default();
    let outfits = if is_scene(node) { &mut scene_outfits } else { outfits };

    let dressed = node.map_values(|_, v| {
        let Value::State(s) = v else {
            return v.clone();
        };
        let Some(character) = s.object.as_character() else {
            return v.clone();
        };
        let outfit = outfits
            .entry(s.object.clone())
            .or_insert_with(|| Outfit::roll(character, ctx));
        Value::State(
            s.with_costume(outfit.torso.clone(), outfit.legs.clone(), outfit.feet.clone())
                .into_ref(),
        )
    });
    let children = node
        .children()
        .iter()
        .map(|c| assign_costumes(c, outfits, ctx))
        .collect();
    rebuild(&dressed, children)
}

/// Mood modifiers set their subject's mood from that point on.
pub fn assign_moods(node: &StoryNode, moods: &mut FxHashMap<ObjectRef, Mood>) -> StoryNode {
    if let Some(mood) = node.kind().event().and_then(|e| e.mood_change()) {
        if let Some(subject) = node.object_in(Role::Subject) {
            moods.insert(subject.clone(), mood);
        }
    }
    let moody = node.map_values(|_, v| match v {
        Value::State(s) if s.is_character() => {
            let character = &s.object;
            let mut mood = *moods.entry(character.clone()).or_insert_with(|| {
                warn!(character = %character.name(), "appears before any mood is assigned, assuming happy");
                Mood::Happy
            });
            if character.is_optimist() {
                mood = Mood::Happy;
                moods.insert(character.clone(), mood);
            }
            Value::State(s.with_mood(mood).into_ref())
        }
        other => other.clone(),
    });
    let children = node.children().iter().map(|c| assign_moods(c, moods)).collect();
    rebuild(&moody, children)
}

/// Drops mood modifiers. An optimist occasionally gets a beat noting the
/// mood they refused.
pub fn remove_mood_modifiers(node: &StoryNode, ctx: &mut NarrativeContext) -> Result<StoryNode, TreeError> {
    let mut children = Vec::with_capacity(node.children().len());
    for child in node.children() {
        let Some(mood) = child.kind().event().and_then(|e| e.mood_change()) else {
            children.push(remove_mood_modifiers(child, ctx)?);
            continue;
        };
        let subject = child.get(Role::Subject);
        let optimist = subject
            .and_then(Value::object)
            .is_some_and(|o| o.is_optimist());
        if ctx.chance(10) && optimist && mood != Mood::Happy {
            if let Some(subject) = subject {
                children.push(event(EventKind::CharacterStaysHappy).with(Role::Subject, subject.clone())?);
            }
        }
    }
    Ok(rebuild(node, children))
}

/// Acquired duties stay open until relieved.
pub fn assign_duties(node: &StoryNode, duties: &mut FxHashMap<ObjectRef, BTreeSet<ObjectRef>>) -> StoryNode {
    let change = node.kind().event().filter(|e| matches!(e, EventKind::AcquireDuty | EventKind::RelieveDuty));
    if let (Some(kind), Some(who), Some(duty)) = (
        change,
        node.object_in(Role::Subject),
        node.object_in(Role::Object),
    ) {
        let open = duties.entry(who.clone()).or_default();
        if !duty.is_duty() {
            warn!(
                character = %who.name(),
                object = %duty.name(),
                "duty change names something that is not a duty"
            );
        } else if kind == EventKind::AcquireDuty {
            open.insert(duty.clone());
        } else if !open.remove(duty) {
            warn!(
                character = %who.name(),
                duty = %duty.name(),
                "relieved of a duty that was never acquired"
            );
        }
    }
    let dutiful = node.map_values(|_, v| match v {
        Value::State(s) if s.is_character() => {
            let open = duties.entry(s.object.clone()).or_default().clone();
            Value::State(s.with_duties(open).into_ref())
        }
        other => other.clone(),
    });
    let children = node.children().iter().map(|c| assign_duties(c, duties)).collect();
    rebuild(&dutiful, children)
}

pub fn remove_duty_events(node: &StoryNode) -> StoryNode {
    let children = node
        .children()
        .iter()
        .filter(|c| {
            !matches!(
                c.kind().event(),
                Some(EventKind::AcquireDuty | EventKind::RelieveDuty)
            )
        })
        .map(remove_duty_events)
        .collect();
    rebuild(node, children)
}

/// Opens each scene with a look at the setting and its scenery.
pub fn describe_scenes(node: &StoryNode, ctx: &mut NarrativeContext) -> Result<StoryNode, LoweringError> {
    if !is_scene(node) {
        let children = node
            .children()
            .iter()
            .map(|c| describe_scenes(c, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(rebuild(node, children));
    }

    let setting = node
        .get(Role::Setting)
        .cloned()
        .ok_or_else(|| LoweringError::MalformedScene(node.summary()))?;
    let place = setting
        .object()
        .cloned()
        .ok_or_else(|| LoweringError::MalformedScene(node.summary()))?;
    let scenery = place
        .as_setting()
        .and_then(|s| s.nearby_scenery(ctx))
        .ok_or_else(|| LoweringError::NoScenery(place.name()))?;
    let scenery = State::new(scenery).with_location(place).into_ref();

    let opening = sequence(vec![
        event(EventKind::SettingDescription).with(Role::Subject, setting.clone())?,
        event(EventKind::NearbyDescription)
            .with(Role::Subject, setting.clone())?
            .with(Role::Object, scenery)?,
        event(EventKind::GenericSettingDescription).with(Role::Subject, setting)?,
        sequence(node.children().to_vec()),
    ]);
    Ok(rebuild(node, vec![opening]))
}

/// How many events each character is the subject of.
pub fn count_subject_appearances(story: &StoryNode) -> FxHashMap<ObjectRef, usize> {
    let mut counts = FxHashMap::default();
    for node in story.descendants() {
        if let Some(s) = character_subject(node) {
            *counts.entry(s.object.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Describes each character the first time they act. Leads always get
/// described straight away; anyone else by chance, or at their last
/// appearance at the latest.
pub fn describe_characters(
    node: &StoryNode,
    introduced: &mut FxHashSet<ObjectRef>,
    newly: &mut FxHashSet<ObjectRef>,
    remaining: &mut FxHashMap<ObjectRef, usize>,
    ctx: &mut NarrativeContext,
) -> Result<StoryNode, TreeError> {
    if let Some(subject) = character_subject(node) {
        let who = subject.object.clone();
        let left = remaining.entry(who.clone()).or_insert(1);
        *left = left.saturating_sub(1);
        let last = *left == 0;
        if !introduced.contains(&who) && (who.is_lead() || last || ctx.chance(50)) {
            introduced.insert(who.clone());
            newly.insert(who);
            let value = Value::State(subject.clone());
            return Ok(sequence(vec![
                node.clone(),
                event(EventKind::CharacterDescription).with(Role::Subject, value.clone())?,
                event(EventKind::CharacterFeaturesDescription).with(Role::Subject, value)?,
            ]));
        }
        return Ok(node.clone());
    }
    let children = node
        .children()
        .iter()
        .map(|c| describe_characters(c, introduced, newly, remaining, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rebuild(node, children))
}

/// Now and then reminds the reader what someone looks like, once per
/// character. Characters in `reminded` are skipped.
pub fn remind_characters(
    node: &StoryNode,
    reminded: &mut FxHashSet<ObjectRef>,
    ctx: &mut NarrativeContext,
) -> Result<StoryNode, TreeError> {
    if let Some(subject) = character_subject(node) {
        if !reminded.contains(&subject.object) && ctx.chance(20) {
            reminded.insert(subject.object.clone());
            return Ok(sequence(vec![
                node.clone(),
                event(EventKind::CharacterReminder).with(Role::Subject, subject.clone())?,
            ]));
        }
        return Ok(node.clone());
    }
    let children = node
        .children()
        .iter()
        .map(|c| remind_characters(c, reminded, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rebuild(node, children))
}

fn is_appearance_beat(kind: EventKind) -> bool {
    matches!(
        kind,
        EventKind::CharacterDescription | EventKind::CharacterFeaturesDescription | EventKind::CharacterReminder
    )
}

fn describes(node: &StoryNode, who: &ObjectRef) -> bool {
    node.kind().event().is_some_and(is_appearance_beat) && character_subject(node).is_some_and(|s| s.object == *who)
}

/// Describes what a character is wearing at their first appearance in
/// each scene, after any description of the character themselves.
pub fn describe_costumes(
    node: &StoryNode,
    described: &mut FxHashSet<ObjectRef>,
    ctx: &mut NarrativeContext,
) -> Result<StoryNode, TreeError> {
    let mut scene_described = FxHashSet::default();
    let described = if is_scene(node) { &mut scene_described } else { described };

    let mut children = Vec::with_capacity(node.children().len());
    let mut pending: Option<(ObjectRef, Vec<StoryNode>)> = None;
    for child in node.children() {
        let flush = pending.as_ref().is_some_and(|(who, _)| !describes(child, who));
        if flush {
            if let Some((_, beats)) = pending.take() {
                children.extend(beats);
            }
        }
        let Some(kind) = child.kind().event() else {
            children.push(describe_costumes(child, described, ctx)?);
            continue;
        };
        children.push(child.clone());

        let Some(subject) = character_subject(child) else {
            continue;
        };
        if is_appearance_beat(kind) || described.contains(&subject.object) {
            continue;
        }
        if subject.object.is_lead() || ctx.chance(50) {
            described.insert(subject.object.clone());
            let torso = if ctx.chance(10) {
                EventKind::TorsoCostumeReminder
            } else {
                EventKind::TorsoCostumeDescription
            };
            let feet = if ctx.chance(10) {
                EventKind::FeetCostumeReminder
            } else {
                EventKind::FeetCostumeDescription
            };
            let value = Value::State(subject.clone());
            pending = Some((
                subject.object.clone(),
                vec![
                    event(torso).with(Role::Subject, value.clone())?,
                    event(feet).with(Role::Subject, value)?,
                ],
            ));
        }
    }
    if let Some((_, beats)) = pending {
        children.extend(beats);
    }
    Ok(rebuild(node, children))
}

/// Marks the first mention of every object. Only event subjects and
/// objects count as mentions.
pub fn assign_first_occurrence(node: &StoryNode, occurred: &mut FxHashSet<ObjectRef>) -> StoryNode {
    let marked = if node.kind().event().is_some() {
        node.map_values(|role, v| match v {
            Value::State(s) if matches!(role, Role::Subject | Role::Object) && !occurred.contains(&s.object) => {
                occurred.insert(s.object.clone());
                Value::State(s.with_first_occurrence(true).into_ref())
            }
            other => other.clone(),
        })
    } else {
        node.clone()
    };
    let children = node
        .children()
        .iter()
        .map(|c| assign_first_occurrence(c, occurred))
        .collect();
    rebuild(&marked, children)
}

/// Breaks each scene's events into paragraphs by subject.
pub fn split_into_paragraphs(node: &StoryNode) -> Result<StoryNode, LoweringError> {
    if !is_scene(node) {
        let children = node
            .children()
            .iter()
            .map(split_into_paragraphs)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(rebuild(node, children));
    }

    let [events] = node.children() else {
        return Err(LoweringError::MalformedScene(node.summary()));
    };
    if *events.kind() != StoryKind::EventSequence {
        return Err(LoweringError::MalformedScene(node.summary()));
    }

    let mut paragraphs: Vec<Vec<StoryNode>> = Vec::new();
    let mut current: Vec<StoryNode> = Vec::new();
    let mut subject: Option<ObjectRef> = None;
    for child in events.children() {
        let Some(kind) = child.kind().event() else {
            return Err(LoweringError::MalformedScene(child.summary()));
        };
        let child_subject = child.get(Role::Subject).and_then(Value::state).map(|s| s.object.clone());
        let changed = child_subject.is_some() && child_subject != subject;
        if kind.starts_paragraph() || changed || child_subject.is_none() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
            subject = child_subject;
        }
        current.push(child.clone());
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    let paragraphs = paragraphs
        .into_iter()
        .map(|p| Node::parent(StoryKind::Paragraph, p))
        .collect();
    Ok(rebuild(node, vec![sequence(paragraphs)]))
}

/// Flags every state whose object was the previous event's subject.
pub fn assign_referents(node: &StoryNode, referent: &mut Option<ObjectRef>) -> StoryNode {
    let previous = referent.clone();
    let flagged = node.map_values(|_, v| match v {
        Value::State(s) => Value::State(s.with_referent(previous.as_ref() == Some(&s.object)).into_ref()),
        other => other.clone(),
    });
    if let Some(s) = flagged.get(Role::Subject).and_then(Value::state) {
        *referent = Some(s.object.clone());
    }
    let children = node
        .children()
        .iter()
        .map(|c| assign_referents(c, referent))
        .collect();
    rebuild(&flagged, children)
}

fn conjoinable(node: &StoryNode) -> bool {
    node.kind().event().is_some_and(|e| e.is_conjoinable())
}

/// Joins some adjacent simple beats within a paragraph with "and".
pub fn conjoin(node: &StoryNode, chance: u32, ctx: &mut NarrativeContext) -> StoryNode {
    if *node.kind() != StoryKind::Paragraph {
        let children = node.children().iter().map(|c| conjoin(c, chance, ctx)).collect();
        return rebuild(node, children);
    }
    let mut children: Vec<StoryNode> = Vec::with_capacity(node.children().len());
    for child in node.children() {
        if let Some(last) = children.last_mut() {
            if conjoinable(last) && conjoinable(child) && ctx.chance(chance) {
                *last = Node::parent(StoryKind::Conjoined, vec![last.clone(), child.clone()]);
                continue;
            }
        }
        children.push(child.clone());
    }
    rebuild(node, children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::character::{Archetype, Character, Gender};
    use crate::schema::object::Object;
    use crate::schema::setting::Setting;

    struct Stage {
        bridge: ObjectRef,
        cave: ObjectRef,
        lead: ObjectRef,
        optimist: ObjectRef,
    }

    fn make_stage() -> Stage {
        let mut ctx = NarrativeContext::new(1);
        let scenery = |n: &str| Object::thing([n]).into_ref();
        let bridge = Object::setting(["bridge"], Setting::new(scenery("ceiling"), vec![scenery("console")])).into_ref();
        let cave = Object::setting(["cave"], Setting::new(scenery("roof"), vec![scenery("stalagmite")])).into_ref();
        Stage {
            lead: Object::character(["Zara"], Character::rolled(Gender::Feminine, Archetype::Lead, &mut ctx)).into_ref(),
            optimist: Object::character(["Kip"], Character::rolled(Gender::Masculine, Archetype::Optimist, &mut ctx))
                .into_ref(),
            bridge,
            cave,
        }
    }

    fn scene(setting: &ObjectRef, events: Vec<StoryNode>) -> StoryNode {
        Node::parent(StoryKind::Scene, vec![sequence(events)])
            .with(Role::Setting, setting)
            .unwrap()
    }

    fn story(scenes: Vec<StoryNode>) -> StoryNode {
        Node::parent(StoryKind::Story, scenes)
    }

    fn by(kind: EventKind, who: &ObjectRef) -> StoryNode {
        event(kind).with(Role::Subject, who).unwrap()
    }

    fn subject_states(story: &StoryNode, who: &ObjectRef) -> Vec<StateRef> {
        story
            .descendants()
            .into_iter()
            .filter_map(character_subject)
            .filter(|s| s.object == *who)
            .cloned()
            .collect()
    }

    #[test]
    fn adjacent_scenes_in_one_place_merge() {
        let stage = make_stage();
        let s = story(vec![
            scene(&stage.bridge, vec![by(EventKind::Drone, &stage.lead)]),
            scene(&stage.bridge, vec![by(EventKind::Emote, &stage.lead)]),
            scene(&stage.cave, vec![by(EventKind::Emote, &stage.lead)]),
        ]);
        let merged = merge_adjacent_scenes(&s);
        assert_eq!(merged.children().len(), 2);
        assert_eq!(merged.children()[0].children().len(), 2);
    }

    #[test]
    fn one_state_per_object() {
        let stage = make_stage();
        let s = story(vec![scene(
            &stage.bridge,
            vec![by(EventKind::Drone, &stage.lead), by(EventKind::Emote, &stage.lead)],
        )]);
        let s = assign_empty_states(&s);
        let states = subject_states(&s, &stage.lead);
        assert_eq!(states.len(), 2);
        assert!(std::rc::Rc::ptr_eq(&states[0], &states[1]));
    }

    #[test]
    fn optimists_stay_happy() {
        let stage = make_stage();
        let s = story(vec![scene(
            &stage.bridge,
            vec![
                by(EventKind::BecomeSad, &stage.optimist),
                by(EventKind::Emote, &stage.optimist),
                by(EventKind::BecomeAngry, &stage.lead),
                by(EventKind::Emote, &stage.lead),
            ],
        )]);
        let s = assign_moods(&assign_empty_states(&s), &mut FxHashMap::default());
        assert!(subject_states(&s, &stage.optimist)
            .iter()
            .all(|st| st.mood == Some(Mood::Happy)));
        assert_eq!(subject_states(&s, &stage.lead).last().unwrap().mood, Some(Mood::Angry));
    }

    #[test]
    fn mood_modifiers_are_stripped() {
        let stage = make_stage();
        let mut ctx = NarrativeContext::new(3);
        let s = story(vec![scene(
            &stage.bridge,
            vec![by(EventKind::BecomeSad, &stage.lead), by(EventKind::Emote, &stage.lead)],
        )]);
        let s = remove_mood_modifiers(&assign_empty_states(&s), &mut ctx).unwrap();
        let kinds: Vec<_> = s.descendants().iter().filter_map(|n| n.kind().event()).collect();
        assert_eq!(kinds, vec![EventKind::Emote]);
    }

    #[test]
    fn duties_open_and_close() {
        let stage = make_stage();
        let duty = Object::rescue_duty(&stage.optimist).into_ref();
        let on = |kind, who: &ObjectRef| event(kind).with(Role::Subject, who).unwrap().with(Role::Object, &duty).unwrap();
        let s = story(vec![scene(
            &stage.bridge,
            vec![
                on(EventKind::AcquireDuty, &stage.lead),
                by(EventKind::StateDuty, &stage.lead),
                on(EventKind::RelieveDuty, &stage.lead),
                by(EventKind::Emote, &stage.lead),
                // Never acquired: warns and carries on.
                on(EventKind::RelieveDuty, &stage.optimist),
            ],
        )]);
        let s = assign_duties(&assign_empty_states(&s), &mut FxHashMap::default());
        let s = remove_duty_events(&s);
        let states = subject_states(&s, &stage.lead);
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].duties.len(), 1);
        assert!(states[1].duties.is_empty());
    }

    #[test]
    fn only_duties_are_acquired() {
        let stage = make_stage();
        let rock = Object::thing(["rock"]).into_ref();
        let s = story(vec![scene(
            &stage.bridge,
            vec![
                event(EventKind::AcquireDuty)
                    .with(Role::Subject, &stage.lead)
                    .unwrap()
                    .with(Role::Object, &rock)
                    .unwrap(),
                by(EventKind::StateDuty, &stage.lead),
            ],
        )]);
        let s = remove_duty_events(&assign_duties(&assign_empty_states(&s), &mut FxHashMap::default()));
        let states = subject_states(&s, &stage.lead);
        assert_eq!(states.len(), 1);
        assert!(states[0].duties.is_empty());
    }

    #[test]
    fn costumes_are_fixed_within_a_scene() {
        let stage = make_stage();
        let mut ctx = NarrativeContext::new(8);
        let s = story(vec![
            scene(
                &stage.bridge,
                vec![by(EventKind::Drone, &stage.lead), by(EventKind::Emote, &stage.lead)],
            ),
            scene(&stage.cave, vec![by(EventKind::Emote, &stage.lead)]),
        ]);
        let s = assign_costumes(&assign_empty_states(&s), &mut FxHashMap::default(), &mut ctx);
        let first = subject_states(&s.children()[0], &stage.lead);
        assert_eq!(first[0].torso_costume, first[1].torso_costume);
        assert_eq!(first[0].legs_costume, first[1].legs_costume);
        assert_eq!(first[0].feet_costume, first[1].feet_costume);
        assert!(first[0].feet_costume.is_some());
    }

    #[test]
    fn paragraphs_break_on_subject_change() {
        let stage = make_stage();
        let s = story(vec![scene(
            &stage.bridge,
            vec![
                by(EventKind::Drone, &stage.lead),
                by(EventKind::Emote, &stage.lead),
                by(EventKind::Emote, &stage.optimist),
                event(EventKind::RumblingSound),
                by(EventKind::Emote, &stage.optimist),
            ],
        )]);
        let s = split_into_paragraphs(&assign_empty_states(&s).flatten()).unwrap();
        let paragraphs = s.children()[0].children()[0].children();
        let sizes: Vec<usize> = paragraphs.iter().map(|p| p.children().len()).collect();
        assert_eq!(sizes, vec![2, 1, 1, 1]);
        assert!(paragraphs.iter().all(|p| *p.kind() == StoryKind::Paragraph));
    }

    #[test]
    fn scenes_must_hold_one_sequence() {
        let stage = make_stage();
        let bad = Node::parent(
            StoryKind::Scene,
            vec![sequence(vec![]), sequence(vec![])],
        )
        .with(Role::Setting, &stage.bridge)
        .unwrap();
        let s = story(vec![bad]);
        assert!(matches!(split_into_paragraphs(&s), Err(LoweringError::MalformedScene(_))));
    }

    #[test]
    fn referent_is_previous_subject() {
        let stage = make_stage();
        let s = story(vec![scene(
            &stage.bridge,
            vec![
                by(EventKind::Emote, &stage.lead),
                event(EventKind::LookAt)
                    .with(Role::Subject, &stage.optimist)
                    .unwrap()
                    .with(Role::Object, &stage.lead)
                    .unwrap(),
                by(EventKind::Emote, &stage.optimist),
            ],
        )]);
        let s = assign_referents(&assign_empty_states(&s), &mut None);
        let events: Vec<&StoryNode> = s.descendants().into_iter().filter(|n| n.kind().event().is_some()).collect();
        let state = |n: &StoryNode, role| n.get(role).and_then(Value::state).unwrap().is_referent;
        assert!(!state(events[0], Role::Subject));
        assert!(!state(events[1], Role::Subject));
        assert!(state(events[1], Role::Object));
        assert!(state(events[2], Role::Subject));
    }

    #[test]
    fn full_edit_introduces_everyone_who_acts() {
        let stage = make_stage();
        let mut ctx = NarrativeContext::new(21);
        let s = story(vec![scene(
            &stage.bridge,
            vec![
                by(EventKind::BecomeHappy, &stage.lead),
                by(EventKind::BecomeHappy, &stage.optimist),
                by(EventKind::Emote, &stage.optimist),
                by(EventKind::Drone, &stage.lead),
            ],
        )]);
        let mut editor = Editor::new(15);
        let edited = editor.edit(&s, &mut ctx).unwrap();
        assert!(editor.introduced().contains(&stage.lead));
        assert!(editor.introduced().contains(&stage.optimist));
        let descriptions = edited
            .descendants()
            .into_iter()
            .filter(|n| n.kind().event() == Some(EventKind::CharacterDescription))
            .count();
        assert_eq!(descriptions, 2);
        // Scene -> EventSequence -> Paragraphs.
        let scene = &edited.children()[0];
        assert_eq!(scene.children().len(), 1);
        assert!(scene.children()[0]
            .children()
            .iter()
            .all(|p| *p.kind() == StoryKind::Paragraph));
    }
}
