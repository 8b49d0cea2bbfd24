/// Prose rendering of lowered stories and plain-text synopses of plots.
use super::context::NarrativeContext;
use super::grammar::{capitalize, render_template, GrammarError};
use super::tree::Role;
use super::voice;
use crate::schema::event::{EventKind, Mood, StoryKind, StoryNode};
use crate::schema::plot::PlotNode;

/// Separator printed between scenes.
pub const SCENE_BREAK: &str = "\n\n- - - -\n\n";

/// Tokens that are layout, not words.
const NOT_WORDS: &[&str] = &["-", "#", "##", "###"];

/// Renders a lowered story to prose.
pub fn render_story(node: &StoryNode, ctx: &mut NarrativeContext) -> Result<String, GrammarError> {
    match node.kind() {
        StoryKind::Story => Ok(render_children(node, ctx)?.join(SCENE_BREAK)),
        StoryKind::Scene | StoryKind::EventSequence => {
            let parts = render_children(node, ctx)?;
            Ok(parts.iter().map(|p| capitalize(p)).collect::<Vec<_>>().join("\n\n"))
        }
        StoryKind::Paragraph => {
            let mut out = String::new();
            for child in node.children() {
                out.push_str(&capitalize(&render_story(child, ctx)?));
                out.push_str(if is_exciting(child) { "!  " } else { ".  " });
            }
            Ok(out.trim_end().to_string())
        }
        StoryKind::Conjoined => Ok(render_children(node, ctx)?.join(", and ")),
        StoryKind::Event(kind) => render_event(*kind, node, ctx),
    }
}

fn render_children(node: &StoryNode, ctx: &mut NarrativeContext) -> Result<Vec<String>, GrammarError> {
    node.children().iter().map(|c| render_story(c, ctx)).collect()
}

/// Exciting beats end with an exclamation mark; a conjoined pair takes
/// its punctuation from the second half.
fn is_exciting(node: &StoryNode) -> bool {
    match node.kind() {
        StoryKind::Event(kind) => kind.is_exciting(),
        StoryKind::Conjoined => node.children().last().is_some_and(is_exciting),
        _ => false,
    }
}

/// Renders one event with a varied pick from its template family.
pub fn render_event(kind: EventKind, node: &StoryNode, ctx: &mut NarrativeContext) -> Result<String, GrammarError> {
    let mut templates = kind.templates();
    if let Some(one_piece) = kind.one_piece_templates() {
        let has_legs = node
            .get(Role::Subject)
            .and_then(|v| v.state())
            .is_some_and(|s| s.legs_costume.is_some());
        if !has_legs {
            templates = one_piece;
        }
    }
    let template = ctx
        .pick_varied(templates)
        .ok_or_else(|| GrammarError::NotRenderable(node.summary()))?;
    render_template(template, node, ctx)
}

/// One numbered line per development: where it happens and what happens.
pub fn render_synopsis(plot: &PlotNode, ctx: &mut NarrativeContext) -> Result<String, GrammarError> {
    let mut out = String::new();
    for (n, point) in plot.developments().into_iter().enumerate() {
        let Some(development) = point.development() else {
            continue;
        };
        let template = ctx
            .pick_varied(development.synopsis())
            .ok_or_else(|| GrammarError::NotRenderable(point.summary()))?;
        let line = render_template(template, point, ctx)?;
        let (preposition, place) = match point.setting() {
            Some(setting) => (
                setting
                    .as_setting()
                    .map(|s| s.preposition.clone())
                    .unwrap_or_default(),
                setting.definite(),
            ),
            None => (String::new(), String::from("nowhere")),
        };
        out.push_str(&format!("{}. {} {},\n   {}.\n", n + 1, preposition, place, line));
    }
    Ok(out)
}

/// Text-only touch-ups: straight apostrophes, and "said he" turned into
/// "he said".
pub fn proofread(text: &str) -> String {
    let mut text = text.replace('`', "'");
    let moods = [Mood::Happy, Mood::Sad, Mood::Angry, Mood::Embarrassed];
    for mood in moods {
        for verb in voice::saids(mood).iter().chain(voice::shouteds(mood)) {
            for pronoun in ["he", "she", "they"] {
                text = front_pronoun(&text, verb, pronoun);
            }
        }
    }
    text
}

/// Rewrites whole-word occurrences of "`verb` `pronoun`".
fn front_pronoun(text: &str, verb: &str, pronoun: &str) -> String {
    let needle = format!("{verb} {pronoun}");
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find(&needle) {
        let end = at + needle.len();
        let starts_word = rest[..at].chars().next_back().map_or(true, |c| !c.is_alphanumeric());
        let ends_word = rest[end..].chars().next().map_or(true, |c| !c.is_alphanumeric());
        out.push_str(&rest[..at]);
        if starts_word && ends_word {
            out.push_str(pronoun);
            out.push(' ');
            out.push_str(verb);
        } else {
            out.push_str(&needle);
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

/// Whitespace-separated tokens, ignoring layout markers.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().filter(|w| !NOT_WORDS.contains(w)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::Node;
    use crate::schema::character::{Archetype, Character, Gender};
    use crate::schema::event::{event, sequence};
    use crate::schema::object::Object;
    use crate::schema::state::State;

    fn paragraph(events: Vec<StoryNode>) -> StoryNode {
        Node::parent(StoryKind::Paragraph, events)
    }

    #[test]
    fn paragraphs_punctuate_each_beat() {
        let mut ctx = NarrativeContext::new(2);
        let text = render_story(
            &paragraph(vec![event(EventKind::RumblingSound), event(EventKind::GenericBattle)]),
            &mut ctx,
        )
        .unwrap();
        assert!(text.ends_with('!'), "{text}");
        assert!(text.contains(".  "), "{text}");
        assert!(text.chars().next().unwrap().is_uppercase());
    }

    #[test]
    fn scenes_are_separated() {
        let mut ctx = NarrativeContext::new(2);
        let scene = |events| Node::parent(StoryKind::Scene, vec![sequence(vec![paragraph(events)])]);
        let story = Node::parent(
            StoryKind::Story,
            vec![scene(vec![event(EventKind::RumblingSound)]), scene(vec![event(EventKind::RumblingSound)])],
        );
        let text = render_story(&story, &mut ctx).unwrap();
        assert_eq!(text.matches(SCENE_BREAK).count(), 1);
    }

    #[test]
    fn missing_slot_names_the_template() {
        let mut ctx = NarrativeContext::new(2);
        let err = render_story(&event(EventKind::Emote), &mut ctx).unwrap_err();
        assert!(matches!(err, GrammarError::Render { .. }));
        assert!(err.to_string().contains("Emote"));
    }

    #[test]
    fn torso_without_legs_uses_one_piece_wording() {
        let mut ctx = NarrativeContext::new(5);
        let lead = Character::rolled(Gender::Feminine, Archetype::Lead, &mut ctx);
        let who = Object::character(["Zara"], lead).into_ref();
        let dress = Object::thing(["silver jumpsuit", "jumpsuit"]).into_ref();
        let boots = Object::thing(["moon boots", "boots"]).plural().into_ref();
        let state = State::new(who).with_costume(dress, None, boots).into_ref();
        let node = event(EventKind::TorsoCostumeDescription)
            .with(Role::Subject, state)
            .unwrap();
        let text = render_story(&node, &mut ctx).unwrap();
        assert!(text.contains("jumpsuit"), "{text}");
    }

    #[test]
    fn proofreading_fronts_pronouns() {
        assert_eq!(proofread("\"Hi,\" said she. `Tis"), "\"Hi,\" she said. 'Tis");
        assert_eq!(proofread("she sang her song"), "she sang her song");
    }

    #[test]
    fn word_count_skips_markers() {
        assert_eq!(word_count("## Chapter One\n\n- - - -\n\nShe ran."), 4);
        assert_eq!(word_count(""), 0);
    }
}
