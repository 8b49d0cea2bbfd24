/// Plot integration tests — expansion and normalization over a RON world.

use saga_engine::core::context::NarrativeContext;
use saga_engine::core::plotter::{check_balance, PlotConstraints, PlotError, Plotter};
use saga_engine::schema::development::Development;
use saga_engine::schema::plot::{PlotKind, RuleKind};
use saga_engine::schema::world::World;
use std::path::Path;

fn load_world(ctx: &mut NarrativeContext) -> World {
    World::load_from_ron(Path::new("tests/fixtures/scenario_world.ron"), ctx).unwrap()
}

#[test]
fn written_plots_have_no_holes() {
    for seed in 0..25 {
        let mut ctx = NarrativeContext::new(seed);
        let world = load_world(&mut ctx);
        let plot = Plotter::new(&world).write_plot(3, &mut ctx).unwrap();
        assert_eq!(plot.hole_count(), 0, "seed {seed}:\n{}", plot.dump());
        assert!(
            plot.children().iter().all(|c| c.development().is_some()),
            "seed {seed} is not flat:\n{}",
            plot.dump()
        );
    }
}

#[test]
fn everyone_taken_away_comes_back() {
    for seed in 0..25 {
        let mut ctx = NarrativeContext::new(seed);
        let world = load_world(&mut ctx);
        let plot = Plotter::new(&world).write_plot(4, &mut ctx).unwrap();
        check_balance(&plot).unwrap_or_else(|e| panic!("seed {seed}: {e}\n{}", plot.dump()));
    }
}

#[test]
fn plots_open_and_close_at_home() {
    let mut ctx = NarrativeContext::new(12);
    let world = load_world(&mut ctx);
    let plot = Plotter::new(&world).write_plot(3, &mut ctx).unwrap();
    let developments = plot.developments();
    let first = developments.first().unwrap();
    let last = developments.last().unwrap();
    assert_eq!(first.development(), Some(Development::Introduction));
    assert_eq!(last.development(), Some(Development::AllLaugh));
    assert_eq!(first.setting(), Some(world.home().unwrap()));
    assert_eq!(last.setting(), Some(world.home().unwrap()));
}

#[test]
fn setting_changes_go_through_journeys() {
    for seed in 0..25 {
        let mut ctx = NarrativeContext::new(seed);
        let world = load_world(&mut ctx);
        let plot = Plotter::new(&world).write_plot(4, &mut ctx).unwrap();
        for pair in plot.children().windows(2) {
            if pair[0].setting() != pair[1].setting() {
                assert_eq!(
                    pair[0].development(),
                    Some(Development::Journey),
                    "seed {seed}:\n{}",
                    plot.dump()
                );
            }
        }
    }
}

#[test]
fn max_zero_kidnappings_is_honoured() {
    let constraints = PlotConstraints::default().at_most(Development::Kidnapping, 0);
    for seed in 0..10 {
        let mut ctx = NarrativeContext::new(seed);
        let world = load_world(&mut ctx);
        let plot = Plotter::new(&world)
            .generate_acceptable_plot(&constraints, 4, None, &mut ctx)
            .unwrap();
        assert_eq!(plot.count(Development::Kidnapping), 0);
    }
}

#[test]
fn minimum_counts_are_met() {
    let constraints = PlotConstraints::default().at_least(Development::Kidnapping, 1);
    let mut ctx = NarrativeContext::new(4);
    let world = load_world(&mut ctx);
    let plot = Plotter::new(&world)
        .generate_acceptable_plot(&constraints, 4, Some(500), &mut ctx)
        .unwrap();
    assert!(plot.count(Development::Kidnapping) >= 1);
    assert!(plot.count(Development::Rescue) >= 1);
}

#[test]
fn disabled_rules_never_fire() {
    for seed in 0..15 {
        let mut ctx = NarrativeContext::new(seed);
        let world = load_world(&mut ctx);
        let plotter = Plotter::new(&world).with_disabled([RuleKind::Kidnapping, RuleKind::LostItem]);
        let plot = plotter.write_plot(4, &mut ctx).unwrap();
        assert_eq!(plot.count(Development::Kidnapping), 0);
        assert_eq!(plot.count(Development::LoseItem), 0);
    }
}

#[test]
fn attempts_can_be_capped() {
    let constraints = PlotConstraints::default().at_least(Development::Vanquished, 99);
    let mut ctx = NarrativeContext::new(1);
    let world = load_world(&mut ctx);
    let err = Plotter::new(&world)
        .generate_acceptable_plot(&constraints, 2, Some(4), &mut ctx)
        .unwrap_err();
    assert!(matches!(err, PlotError::NoAcceptablePlot(4)));
}

#[test]
fn depth_zero_leaves_only_the_seed() {
    let mut ctx = NarrativeContext::new(3);
    let world = load_world(&mut ctx);
    let plotter = Plotter::new(&world);
    let expanded = plotter.expand(0, &mut ctx).unwrap();
    assert_eq!(expanded.hole_count(), 1);
    assert!(matches!(expanded.children()[1].kind(), PlotKind::Hole(_)));

    let plot = plotter.write_plot(0, &mut ctx).unwrap();
    let kinds: Vec<_> = plot.developments().iter().filter_map(|d| d.development()).collect();
    assert_eq!(
        kinds,
        vec![Development::Introduction, Development::Convalescence, Development::AllLaugh]
    );
}
