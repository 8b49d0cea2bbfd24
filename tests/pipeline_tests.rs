/// Pipeline integration tests — end-to-end plot-to-prose generation.

use saga_engine::core::context::NarrativeContext;
use saga_engine::core::develop::plot_to_story;
use saga_engine::core::lowering::Editor;
use saga_engine::core::plotter::Plotter;
use saga_engine::core::render::{render_story, word_count};
use saga_engine::core::tree::{Role, Value};
use saga_engine::schema::event::{EventKind, Mood, StoryKind, StoryNode};
use saga_engine::schema::object::ObjectRef;
use saga_engine::schema::world::World;
use saga_engine::{NarrativeEngine, OutputMode};
use std::collections::BTreeSet;
use std::path::Path;

const WORLD: &str = "tests/fixtures/scenario_world.ron";

fn lower(seed: u64) -> (World, StoryNode, NarrativeContext) {
    let mut ctx = NarrativeContext::new(seed);
    let world = World::load_from_ron(Path::new(WORLD), &mut ctx).unwrap();
    let plot = Plotter::new(&world).write_plot(3, &mut ctx).unwrap();
    assert_eq!(plot.hole_count(), 0);
    let story = plot_to_story(&plot, &mut ctx).unwrap();
    let story = Editor::new(15).edit(&story, &mut ctx).unwrap();
    (world, story, ctx)
}

fn events(story: &StoryNode) -> Vec<(EventKind, &StoryNode)> {
    story
        .descendants()
        .into_iter()
        .filter_map(|n| n.kind().event().map(|k| (k, n)))
        .collect()
}

fn subject(node: &StoryNode) -> Option<&ObjectRef> {
    node.get(Role::Subject).and_then(Value::state).map(|s| &s.object)
}

#[test]
fn scenario_renders_every_scene() {
    for seed in 0..10 {
        let (world, story, mut ctx) = lower(seed);

        // (a) every scene has prose.
        let mut text = String::new();
        for scene in story.children() {
            let rendered = render_story(scene, &mut ctx).unwrap();
            assert!(!rendered.trim().is_empty(), "seed {seed}: empty scene\n{}", scene.dump());
            text.push_str(&rendered);
        }

        // (c) every protagonist who acts is introduced.
        let all = events(&story);
        let introduced: BTreeSet<&ObjectRef> = all
            .iter()
            .filter(|(k, _)| *k == EventKind::CharacterDescription)
            .filter_map(|(_, n)| subject(n))
            .collect();
        for (_, node) in &all {
            if let Some(who) = subject(node) {
                if world.protagonists.contains(who) {
                    assert!(introduced.contains(who), "seed {seed}: {} never described", who.name());
                }
            }
        }

        // (d) words were written.
        assert!(word_count(&text) > 0);
    }
}

#[test]
fn lowered_scenes_hold_paragraphs_of_events() {
    let (_, story, _) = lower(8);
    assert_eq!(*story.kind(), StoryKind::Story);
    for scene in story.children() {
        assert_eq!(*scene.kind(), StoryKind::Scene);
        let [sequence] = scene.children() else {
            panic!("scene should hold one sequence:\n{}", scene.dump());
        };
        for paragraph in sequence.children() {
            assert_eq!(*paragraph.kind(), StoryKind::Paragraph);
            for beat in paragraph.children() {
                assert!(matches!(beat.kind(), StoryKind::Event(_) | StoryKind::Conjoined));
            }
        }
    }
}

#[test]
fn transient_beats_never_reach_rendering() {
    for seed in 0..10 {
        let (_, story, _) = lower(seed);
        assert!(events(&story).iter().all(|(k, _)| !k.is_transient()), "seed {seed}");
    }
}

#[test]
fn optimists_are_always_happy() {
    for seed in 0..10 {
        let (_, story, _) = lower(seed);
        for node in story.descendants() {
            for (_, value) in node.attributes() {
                if let Some(state) = value.state() {
                    if state.object.is_optimist() {
                        assert_eq!(state.mood, Some(Mood::Happy), "seed {seed}");
                    }
                }
            }
        }
    }
}

#[test]
fn characters_keep_their_outfit_within_a_scene() {
    let (_, story, _) = lower(21);
    for scene in story.children() {
        let mut seen: Vec<(ObjectRef, Option<ObjectRef>, Option<ObjectRef>, Option<ObjectRef>)> = Vec::new();
        for node in scene.descendants() {
            for (_, value) in node.attributes() {
                let Some(state) = value.state().filter(|s| s.is_character()) else {
                    continue;
                };
                let outfit = (
                    state.torso_costume.clone(),
                    state.legs_costume.clone(),
                    state.feet_costume.clone(),
                );
                match seen.iter().find(|(who, ..)| *who == state.object) {
                    Some((_, torso, legs, feet)) => {
                        assert_eq!((torso, legs, feet), (&outfit.0, &outfit.1, &outfit.2));
                    }
                    None => seen.push((state.object.clone(), outfit.0, outfit.1, outfit.2)),
                }
            }
        }
    }
}

#[test]
fn characters_are_located_in_their_scene() {
    let (_, story, _) = lower(5);
    for scene in story.children() {
        let place = scene.object_in(Role::Setting).unwrap();
        for node in scene.descendants() {
            for (_, value) in node.attributes() {
                if let Some(state) = value.state().filter(|s| s.is_character()) {
                    assert_eq!(state.location.as_ref(), Some(place));
                }
            }
        }
    }
}

#[test]
fn engine_writes_a_run_of_chapters() {
    let mut engine = NarrativeEngine::builder()
        .world_file(WORLD)
        .seed(2024)
        .depth(3)
        .max_attempts(100)
        .build()
        .unwrap();
    let chapters = engine.write_chapters(3).unwrap();
    assert_eq!(chapters.len(), 3);
    for chapter in &chapters {
        assert!(chapter.word_count > 0);
        assert!(!chapter.title.is_empty());
        assert_eq!(chapter.scenes.len(), chapter.story.as_ref().unwrap().children().len());
    }
    // Characters are only described the first time they show up in a run.
    assert!(!engine.introduced().is_empty());
}

#[test]
fn synopsis_mode_from_file() {
    let mut engine = NarrativeEngine::builder()
        .world_file(WORLD)
        .seed(9)
        .output(OutputMode::Synopsis)
        .build()
        .unwrap();
    let chapter = engine.write_chapter().unwrap();
    assert!(chapter.story.is_none());
    assert!(chapter.text.contains("1. on the bridge of the Stellar Dawn,"), "{}", chapter.text);
}
