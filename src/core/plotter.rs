/// Production rule engine — expands plot holes into subplots.
///
/// Each hole lists the rules eligible to fill it. A rule first tries to
/// assign participants from the currently available pool; rules that
/// cannot are dropped, one of the rest is picked at random and generates
/// a replacement subtree, which may contain new holes of its own.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

use super::context::NarrativeContext;
use super::normalize;
use super::tree::{Role, TreeError};
use crate::schema::development::Development;
use crate::schema::object::{Group, ObjectError, ObjectRef};
use crate::schema::plot::{development, hole, plot_sequence, PlotKind, PlotNode, RuleKind};
use crate::schema::world::{World, WorldError};

#[derive(Debug, Error)]
pub enum PlotError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("invalid group: {0}")]
    Group(#[from] ObjectError),
    #[error(transparent)]
    World(#[from] WorldError),
    #[error("plot hole survived pruning: {0}")]
    HoleSurvived(String),
    #[error("{0} was requalified without being disqualified")]
    NotDisqualified(String),
    #[error("availability is unbalanced, still unavailable: {0:?}")]
    Unbalanced(Vec<String>),
    #[error("{development:?} has no {role}")]
    MissingRole { development: Development, role: Role },
    #[error("no acceptable plot after {0} attempts")]
    NoAcceptablePlot(u32),
}

const SEED_RULES: &[RuleKind] = &[
    RuleKind::ContemplateItem,
    RuleKind::LostItem,
    RuleKind::AwkwardTension,
    RuleKind::Kidnapping,
    RuleKind::Drone,
];
const SEARCH_RULES: &[RuleKind] = &[RuleKind::FindAbductee, RuleKind::ContemplateItem];
const LAIR_RULES: &[RuleKind] = &[
    RuleKind::Kidnapping,
    RuleKind::FindAnotherWay,
    RuleKind::LostItem,
    RuleKind::CaveIn,
    RuleKind::GoonSkirmish,
    RuleKind::AwkwardTension,
    RuleKind::RomanticTension,
    RuleKind::RomanticResolution,
    RuleKind::ContemplateItem,
];
const AFTER_LOCATE_RULES: &[RuleKind] = &[RuleKind::ContemplateItem];
const DETOUR_RULES: &[RuleKind] = &[
    RuleKind::Kidnapping,
    RuleKind::LostItem,
    RuleKind::CaveIn,
    RuleKind::GoonSkirmish,
    RuleKind::AwkwardTension,
    RuleKind::RomanticTension,
    RuleKind::ContemplateItem,
];
const WHILE_LOST_RULES: &[RuleKind] = &[
    RuleKind::Kidnapping,
    RuleKind::CaveIn,
    RuleKind::GoonSkirmish,
    RuleKind::AwkwardTension,
    RuleKind::RomanticTension,
    RuleKind::ContemplateItem,
    RuleKind::Drone,
];
const WHILE_TRAPPED_RULES: &[RuleKind] = &[RuleKind::Kidnapping, RuleKind::GoonSkirmish];
const AFTER_RUBBLE_RULES: &[RuleKind] = &[
    RuleKind::GoonSkirmish,
    RuleKind::AwkwardTension,
    RuleKind::RomanticTension,
    RuleKind::ContemplateItem,
];
const COMBAT_RULES: &[RuleKind] = &[RuleKind::ProtagonistAttack, RuleKind::AwkwardCombat];
const AFTER_AWKWARD_RULES: &[RuleKind] = &[
    RuleKind::Kidnapping,
    RuleKind::LostItem,
    RuleKind::CaveIn,
    RuleKind::GoonSkirmish,
    RuleKind::ContemplateItem,
    RuleKind::Drone,
];
// Try to interrupt the romance with something exciting.
const AFTER_ROMANCE_RULES: &[RuleKind] = &[
    RuleKind::Kidnapping,
    RuleKind::LostItem,
    RuleKind::CaveIn,
    RuleKind::GoonSkirmish,
];
const AFTER_CONTEMPLATION_RULES: &[RuleKind] = &[
    RuleKind::Kidnapping,
    RuleKind::LostItem,
    RuleKind::CaveIn,
    RuleKind::GoonSkirmish,
    RuleKind::AwkwardTension,
    RuleKind::RomanticTension,
    RuleKind::Drone,
];
const AFTER_DRONE_RULES: &[RuleKind] = &[
    RuleKind::Kidnapping,
    RuleKind::LostItem,
    RuleKind::AwkwardTension,
    RuleKind::RomanticTension,
];

/// Minimum and maximum occurrence counts a finished plot must respect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotConstraints {
    #[serde(default)]
    pub min: Vec<(Development, u32)>,
    #[serde(default)]
    pub max: Vec<(Development, u32)>,
}

impl PlotConstraints {
    pub fn at_least(mut self, kind: Development, count: u32) -> Self {
        self.min.push((kind, count));
        self
    }

    pub fn at_most(mut self, kind: Development, count: u32) -> Self {
        self.max.push((kind, count));
        self
    }

    /// The first violated constraint, if any.
    pub fn violation(&self, plot: &PlotNode) -> Option<String> {
        for (kind, min) in &self.min {
            let found = plot.count(*kind);
            if found < *min as usize {
                return Some(format!("{:?}: {} < {}", kind, found, min));
            }
        }
        for (kind, max) in &self.max {
            let found = plot.count(*kind);
            if found > *max as usize {
                return Some(format!("{:?}: {} > {}", kind, found, max));
            }
        }
        None
    }

    pub fn accepts(&self, plot: &PlotNode) -> bool {
        self.violation(plot).is_none()
    }
}

/// Participants a rule has committed to, ready for generation.
#[derive(Debug, Clone)]
pub enum Assignment {
    Kidnapping {
        villain: ObjectRef,
        abductee: ObjectRef,
        others: Vec<ObjectRef>,
        lair: ObjectRef,
    },
    FindAbductee {
        protagonists: Vec<ObjectRef>,
        abductee: ObjectRef,
        location: ObjectRef,
    },
    FindAnotherWay {
        protagonists: Vec<ObjectRef>,
        outside: ObjectRef,
    },
    LostItem {
        loser: ObjectRef,
        protagonists: Vec<ObjectRef>,
        item: ObjectRef,
    },
    CaveIn {
        trapped: ObjectRef,
        others: Vec<ObjectRef>,
    },
    GoonSkirmish {
        protagonists: Vec<ObjectRef>,
        goons: ObjectRef,
    },
    ProtagonistAttack {
        protagonists: Vec<ObjectRef>,
        goons: ObjectRef,
    },
    AwkwardCombat {
        lead: ObjectRef,
        dreamboat: ObjectRef,
        goons: ObjectRef,
    },
    AwkwardTension {
        lead: ObjectRef,
        dreamboat: ObjectRef,
    },
    RomanticTension {
        lead: ObjectRef,
        dreamboat: ObjectRef,
    },
    RomanticResolution {
        lead: ObjectRef,
        dreamboat: ObjectRef,
    },
    ContemplateItem {
        contemplator: ObjectRef,
        item: ObjectRef,
    },
    Drone {
        startled: ObjectRef,
    },
}

/// Outcome of trying a rule against a hole.
#[derive(Debug, Clone)]
pub enum Applicability {
    Applicable(Assignment),
    Inapplicable,
}

impl<T> From<Option<T>> for Applicability
where
    T: Into<Assignment>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(a) => Applicability::Applicable(a.into()),
            None => Applicability::Inapplicable,
        }
    }
}

/// The protagonists a single rule may draw on.
struct Pool<'a> {
    world: &'a World,
    protagonists: Vec<ObjectRef>,
    unavailable: &'a BTreeSet<ObjectRef>,
}

impl<'a> Pool<'a> {
    fn new(world: &'a World, unavailable: &'a BTreeSet<ObjectRef>) -> Self {
        let protagonists = world
            .protagonists
            .iter()
            .filter(|p| !unavailable.contains(*p))
            .cloned()
            .collect();
        Self {
            world,
            protagonists,
            unavailable,
        }
    }

    fn everyone(&self) -> Option<Vec<ObjectRef>> {
        (!self.protagonists.is_empty()).then(|| self.protagonists.clone())
    }

    /// One eligible protagonist plus everyone else; needs at least one other.
    fn protagonist_and_others(
        &self,
        ctx: &mut NarrativeContext,
        filter: impl Fn(&ObjectRef) -> bool,
    ) -> Option<(ObjectRef, Vec<ObjectRef>)> {
        let eligible: Vec<&ObjectRef> = self.protagonists.iter().filter(|p| filter(p)).collect();
        let chosen = (*ctx.choose(&eligible)?).clone();
        let others: Vec<ObjectRef> = self
            .protagonists
            .iter()
            .filter(|p| **p != chosen)
            .cloned()
            .collect();
        (!others.is_empty()).then_some((chosen, others))
    }

    fn lead_and_dreamboat(&self, ctx: &mut NarrativeContext) -> Option<(ObjectRef, ObjectRef)> {
        let leads: Vec<&ObjectRef> = self.protagonists.iter().filter(|p| p.is_lead()).collect();
        let dreamboats: Vec<&ObjectRef> = self.protagonists.iter().filter(|p| p.is_dreamboat()).collect();
        if leads.is_empty() || dreamboats.is_empty() {
            return None;
        }
        let lead = (*ctx.choose(&leads)?).clone();
        let dreamboat = (*ctx.choose(&dreamboats)?).clone();
        Some((lead, dreamboat))
    }

    fn macguffin(&self, ctx: &mut NarrativeContext) -> Option<ObjectRef> {
        let eligible: Vec<&ObjectRef> = self
            .world
            .macguffins
            .iter()
            .filter(|m| !self.unavailable.contains(*m))
            .collect();
        ctx.choose(&eligible).map(|m| (*m).clone())
    }
}

fn group(members: &[ObjectRef]) -> Result<Group, ObjectError> {
    Group::new(members.to_vec())
}

fn without(members: &[ObjectRef], excluded: &ObjectRef) -> Vec<ObjectRef> {
    members.iter().filter(|m| *m != excluded).cloned().collect()
}

/// Expands plots for one world.
pub struct Plotter<'w> {
    world: &'w World,
    disabled: Vec<RuleKind>,
}

impl<'w> Plotter<'w> {
    pub fn new(world: &'w World) -> Self {
        Self {
            world,
            disabled: Vec::new(),
        }
    }

    /// Rules that are never tried, whatever a hole lists.
    pub fn with_disabled(mut self, rules: impl IntoIterator<Item = RuleKind>) -> Self {
        self.disabled.extend(rules);
        self
    }

    pub fn world(&self) -> &World {
        self.world
    }

    /// Introduction, one hole, convalescence and a shared laugh, all at home.
    pub fn seed_plot(&self) -> Result<PlotNode, PlotError> {
        let home = self.world.home()?;
        let cast = group(&self.world.protagonists)?;
        Ok(plot_sequence(vec![
            development(Development::Introduction, home)?.with(Role::Subject, cast.clone())?,
            hole(home, SEED_RULES)?,
            development(Development::Convalescence, home)?.with(Role::Subject, cast.clone())?,
            development(Development::AllLaugh, home)?.with(Role::Subject, cast)?,
        ]))
    }

    /// Tries `rule` against `plot_hole` with the given participants unavailable.
    pub fn assign(
        &self,
        rule: RuleKind,
        plot_hole: &PlotNode,
        unavailable: &BTreeSet<ObjectRef>,
        ctx: &mut NarrativeContext,
    ) -> Applicability {
        let Some(setting) = plot_hole.setting() else {
            return Applicability::Inapplicable;
        };
        let at_home = self.world.home().is_ok_and(|home| home == setting);
        let pool = Pool::new(self.world, unavailable);
        let goons = plot_hole.object_in(Role::Goons).cloned();

        let assignment = match rule {
            RuleKind::Kidnapping => (|| {
                let (abductee, others) = pool.protagonist_and_others(ctx, |p| !p.is_lead())?;
                let villain = ctx.choose(&self.world.antagonists)?.clone();
                let lair = villain.home().unwrap_or(setting).clone();
                Some(Assignment::Kidnapping {
                    villain,
                    abductee,
                    others,
                    lair,
                })
            })(),
            RuleKind::FindAbductee => (|| {
                Some(Assignment::FindAbductee {
                    protagonists: pool.everyone()?,
                    abductee: plot_hole.object_in(Role::Abductee)?.clone(),
                    location: plot_hole.object_in(Role::AbducteeLocation)?.clone(),
                })
            })(),
            RuleKind::FindAnotherWay => (|| {
                let outside = setting.as_setting()?.outside.clone()?;
                Some(Assignment::FindAnotherWay {
                    protagonists: pool.everyone()?,
                    outside,
                })
            })(),
            RuleKind::LostItem => (|| {
                let (loser, _) = pool.protagonist_and_others(ctx, |_| true)?;
                let item = pool.macguffin(ctx)?;
                Some(Assignment::LostItem {
                    loser,
                    protagonists: pool.protagonists.clone(),
                    item,
                })
            })(),
            RuleKind::CaveIn => (|| {
                if at_home {
                    return None;
                }
                let (trapped, others) = pool.protagonist_and_others(ctx, |p| !p.is_lead())?;
                Some(Assignment::CaveIn { trapped, others })
            })(),
            RuleKind::GoonSkirmish => (|| {
                if at_home || self.world.antagonists.is_empty() {
                    return None;
                }
                let protagonists = pool.everyone()?;
                let goons = ctx.choose(&self.world.goons)?.clone();
                Some(Assignment::GoonSkirmish { protagonists, goons })
            })(),
            RuleKind::ProtagonistAttack => (|| {
                Some(Assignment::ProtagonistAttack {
                    protagonists: pool.everyone()?,
                    goons: goons.clone()?,
                })
            })(),
            RuleKind::AwkwardCombat => (|| {
                let goons = goons.clone()?;
                let (lead, dreamboat) = pool.lead_and_dreamboat(ctx)?;
                Some(Assignment::AwkwardCombat {
                    lead,
                    dreamboat,
                    goons,
                })
            })(),
            RuleKind::AwkwardTension => pool
                .lead_and_dreamboat(ctx)
                .map(|(lead, dreamboat)| Assignment::AwkwardTension { lead, dreamboat }),
            RuleKind::RomanticTension => pool
                .lead_and_dreamboat(ctx)
                .map(|(lead, dreamboat)| Assignment::RomanticTension { lead, dreamboat }),
            RuleKind::RomanticResolution => pool
                .lead_and_dreamboat(ctx)
                .map(|(lead, dreamboat)| Assignment::RomanticResolution { lead, dreamboat }),
            RuleKind::ContemplateItem => (|| {
                // Needs company, so nobody contemplates alone.
                let (contemplator, _) = pool.protagonist_and_others(ctx, |_| true)?;
                let item = setting.as_setting()?.nearby_takeable(ctx)?;
                Some(Assignment::ContemplateItem { contemplator, item })
            })(),
            RuleKind::Drone => (|| {
                if !setting.as_setting()?.has_drones {
                    return None;
                }
                let (startled, _) = pool.protagonist_and_others(ctx, |_| true)?;
                Some(Assignment::Drone { startled })
            })(),
        };
        assignment.into()
    }

    /// Builds the subplot for an applicable rule.
    pub fn generate(
        &self,
        assignment: Assignment,
        plot_hole: &PlotNode,
        ctx: &mut NarrativeContext,
    ) -> Result<PlotNode, PlotError> {
        let setting = plot_hole
            .setting()
            .cloned()
            .ok_or_else(|| PlotError::HoleSurvived(plot_hole.summary()))?;
        let here = &setting;

        let children = match assignment {
            Assignment::Kidnapping {
                villain,
                abductee,
                others,
                lair,
            } => {
                let bystanders = group(&others)?;
                let mut everyone = others.clone();
                everyone.push(abductee.clone());
                vec![
                    development(Development::Kidnapping, here)?
                        .with(Role::Subject, villain)?
                        .with(Role::Object, abductee.clone())?
                        .with(Role::Bystanders, bystanders.clone())?
                        .with(Role::Disqualified, abductee.clone())?
                        .with(Role::Exeunt, bystanders.clone())?,
                    hole(here, SEARCH_RULES)?
                        .with(Role::Abductee, abductee.clone())?
                        .with(Role::AbducteeLocation, lair.clone())?,
                    hole(&lair, LAIR_RULES)?,
                    development(Development::Rescue, &lair)?
                        .with(Role::Subject, bystanders)?
                        .with(Role::Object, abductee.clone())?
                        .with(Role::Requalified, abductee)?
                        .with(Role::Exeunt, group(&everyone)?)?,
                ]
            }
            Assignment::FindAbductee {
                protagonists,
                abductee,
                location,
            } => vec![
                development(Development::LocateAbductee, here)?
                    .with(Role::Subject, group(&protagonists)?)?
                    .with(Role::Object, abductee)?
                    .with(Role::Object2, location)?,
                hole(here, AFTER_LOCATE_RULES)?,
            ],
            Assignment::FindAnotherWay {
                protagonists,
                outside,
            } => vec![
                development(Development::WayBlocked, here)?.with(Role::Subject, group(&protagonists)?)?,
                hole(&outside, DETOUR_RULES)?,
            ],
            Assignment::LostItem {
                loser,
                protagonists,
                item,
            } => {
                let leads: Vec<ObjectRef> = protagonists.iter().filter(|p| p.is_lead()).cloned().collect();
                let recoverer = ctx.choose(&leads).cloned().unwrap_or_else(|| loser.clone());
                vec![
                    development(Development::LoseItem, here)?
                        .with(Role::Subject, loser.clone())?
                        .with(Role::Object, item.clone())?
                        .with(Role::Bystanders, group(&without(&protagonists, &loser))?)?
                        .with(Role::Disqualified, item.clone())?,
                    hole(here, WHILE_LOST_RULES)?,
                    development(Development::RecoverItem, here)?
                        .with(Role::Subject, recoverer.clone())?
                        .with(Role::Object, item.clone())?
                        .with(Role::Bystanders, group(&without(&protagonists, &recoverer))?)?
                        .with(Role::Requalified, item)?,
                ]
            }
            Assignment::CaveIn { trapped, others } => vec![
                development(Development::TrappedInRubble, here)?
                    .with(Role::Subject, trapped.clone())?
                    .with(Role::Bystanders, group(&others)?)?
                    .with(Role::Disqualified, trapped.clone())?,
                hole(here, WHILE_TRAPPED_RULES)?,
                development(Development::ExtractedFromRubble, here)?
                    .with(Role::Subject, group(&others)?)?
                    .with(Role::Object, trapped.clone())?
                    .with(Role::Requalified, trapped)?,
                hole(here, AFTER_RUBBLE_RULES)?,
            ],
            Assignment::GoonSkirmish { protagonists, goons } => {
                let meeting = if ctx.chance(50) {
                    Development::GoonEncounter
                } else {
                    Development::GoonAmbush
                };
                let sender = ctx
                    .choose(&self.world.antagonists)
                    .cloned()
                    .ok_or(PlotError::MissingRole {
                        development: Development::Vanquished,
                        role: Role::Object2,
                    })?;
                let party = group(&protagonists)?;
                vec![
                    development(meeting, here)?
                        .with(Role::Subject, party.clone())?
                        .with(Role::Object, goons.clone())?,
                    hole(here, COMBAT_RULES)?.with(Role::Goons, goons.clone())?,
                    development(Development::Vanquished, here)?
                        .with(Role::Subject, party)?
                        .with(Role::Object, goons)?
                        .with(Role::Object2, sender)?,
                ]
            }
            Assignment::ProtagonistAttack { protagonists, goons } => vec![
                hole(here, COMBAT_RULES)?.with(Role::Goons, goons.clone())?,
                development(Development::ProtagonistAttack, here)?
                    .with(Role::Subject, group(&protagonists)?)?
                    .with(Role::Object, goons)?,
            ],
            Assignment::AwkwardCombat {
                lead,
                dreamboat,
                goons,
            } => vec![
                hole(here, COMBAT_RULES)?.with(Role::Goons, goons.clone())?,
                development(Development::AwkwardCombat, here)?
                    .with(Role::Subject, group(&[lead, dreamboat])?)?
                    .with(Role::Object, goons)?,
            ],
            Assignment::AwkwardTension { lead, dreamboat } => {
                let (a, b) = if ctx.chance(33) { (lead, dreamboat) } else { (dreamboat, lead) };
                vec![
                    development(Development::AwkwardTension, here)?
                        .with(Role::Subject, a)?
                        .with(Role::Object, b)?,
                    hole(here, AFTER_AWKWARD_RULES)?,
                ]
            }
            Assignment::RomanticTension { lead, dreamboat } => {
                let (a, b) = if ctx.chance(33) { (lead, dreamboat) } else { (dreamboat, lead) };
                vec![
                    development(Development::RomanticTension, here)?
                        .with(Role::Subject, a)?
                        .with(Role::Object, b)?,
                    hole(here, AFTER_ROMANCE_RULES)?,
                ]
            }
            Assignment::RomanticResolution { lead, dreamboat } => vec![
                development(Development::RomanticResolution, here)?
                    .with(Role::Subject, dreamboat)?
                    .with(Role::Object, lead)?,
            ],
            Assignment::ContemplateItem { contemplator, item } => vec![
                development(Development::ContemplateItem, here)?
                    .with(Role::Subject, contemplator)?
                    .with(Role::Object, item)?,
                hole(here, AFTER_CONTEMPLATION_RULES)?,
            ],
            Assignment::Drone { startled } => vec![
                development(Development::Drone, here)?.with(Role::Subject, startled)?,
                hole(here, AFTER_DRONE_RULES)?,
            ],
        };
        Ok(plot_sequence(children))
    }

    /// Replaces a hole with a subplot from one of its applicable rules, or
    /// leaves it in place when none applies.
    pub fn fill_hole(
        &self,
        plot_hole: &PlotNode,
        unavailable: &BTreeSet<ObjectRef>,
        ctx: &mut NarrativeContext,
    ) -> Result<PlotNode, PlotError> {
        let PlotKind::Hole(rules) = plot_hole.kind() else {
            return Ok(plot_hole.clone());
        };
        let mut applicable = Vec::new();
        for rule in rules.iter().filter(|r| !self.disabled.contains(r)) {
            if let Applicability::Applicable(assignment) = self.assign(*rule, plot_hole, unavailable, ctx) {
                applicable.push(assignment);
            }
        }
        if applicable.is_empty() {
            debug!(hole = %plot_hole.summary(), "no applicable rule, leaving hole unfilled");
            return Ok(plot_hole.clone());
        }
        let pick = ctx.range(0, applicable.len() - 1);
        let assignment = applicable.swap_remove(pick);
        self.generate(assignment, plot_hole, ctx)
    }

    /// One expansion round: fills every hole reachable in a preorder walk,
    /// threading the unavailable set through disqualify/requalify markers.
    pub fn complicate(
        &self,
        plot: &PlotNode,
        unavailable: &mut BTreeSet<ObjectRef>,
        ctx: &mut NarrativeContext,
    ) -> Result<PlotNode, PlotError> {
        if plot.is_hole() {
            return self.fill_hole(plot, unavailable, ctx);
        }
        track_availability(plot, unavailable)?;
        let children = plot
            .children()
            .iter()
            .map(|c| self.complicate(c, unavailable, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(plot.with_children(children))
    }

    /// Expands the seed plot for up to `depth` rounds, without normalizing.
    pub fn expand(&self, depth: u32, ctx: &mut NarrativeContext) -> Result<PlotNode, PlotError> {
        let mut plot = self.seed_plot()?;
        for round in 0..depth {
            if plot.hole_count() == 0 {
                debug!(round, "no holes left");
                break;
            }
            let mut unavailable = BTreeSet::new();
            plot = self.complicate(&plot, &mut unavailable, ctx)?.flatten();
            ensure_balanced(&unavailable)?;
        }
        Ok(plot)
    }

    /// Expands and normalizes a complete plot.
    pub fn write_plot(&self, depth: u32, ctx: &mut NarrativeContext) -> Result<PlotNode, PlotError> {
        let plot = self.expand(depth, ctx)?;
        normalize::normalize(&plot, self.world)
    }

    /// Regenerates from scratch until `constraints` accept the plot, or
    /// until `max_attempts` plots have been rejected.
    pub fn generate_acceptable_plot(
        &self,
        constraints: &PlotConstraints,
        depth: u32,
        max_attempts: Option<u32>,
        ctx: &mut NarrativeContext,
    ) -> Result<PlotNode, PlotError> {
        let mut attempts = 0u32;
        loop {
            if max_attempts.is_some_and(|max| attempts >= max) {
                return Err(PlotError::NoAcceptablePlot(attempts));
            }
            attempts += 1;
            let plot = self.write_plot(depth, ctx)?;
            match constraints.violation(&plot) {
                None => {
                    debug!(attempts, "plot accepted");
                    return Ok(plot);
                }
                Some(reason) => debug!(attempts, %reason, "plot rejected"),
            }
        }
    }
}

/// Applies a node's disqualify/requalify markers to `unavailable`.
pub fn track_availability(plot: &PlotNode, unavailable: &mut BTreeSet<ObjectRef>) -> Result<(), PlotError> {
    if let Some(gone) = plot.object_in(Role::Disqualified) {
        unavailable.insert(gone.clone());
    }
    if let Some(back) = plot.object_in(Role::Requalified) {
        if !unavailable.remove(back) {
            return Err(PlotError::NotDisqualified(back.name()));
        }
    }
    Ok(())
}

fn ensure_balanced(unavailable: &BTreeSet<ObjectRef>) -> Result<(), PlotError> {
    if unavailable.is_empty() {
        Ok(())
    } else {
        Err(PlotError::Unbalanced(unavailable.iter().map(|o| o.name()).collect()))
    }
}

/// Walks a whole plot and checks every disqualification is matched by
/// exactly one later requalification.
pub fn check_balance(plot: &PlotNode) -> Result<(), PlotError> {
    let mut unavailable = BTreeSet::new();
    for node in plot.descendants() {
        track_availability(node, &mut unavailable)?;
    }
    ensure_balanced(&unavailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::Node;
    use crate::schema::character::{Archetype, Character, Gender};
    use crate::schema::object::Object;
    use crate::schema::setting::Setting;

    fn make_world(ctx: &mut NarrativeContext) -> World {
        let scenery = |n: &str| Object::thing([n]).into_ref();
        let rock = Object::thing(["space rock", "rock"]).takeable(true).into_ref();
        let mut deck = Setting::new(scenery("ceiling"), vec![scenery("console"), rock]);
        deck.has_drones = true;
        let deck = Object::setting(["bridge"], deck).into_ref();
        let mut hall = Setting::new(scenery("roof"), vec![scenery("pillar")]);
        hall.outside = Some(deck.clone());
        let hall = Object::setting(["great hall", "hall"], hall).into_ref();

        let cast = |name: &str, archetype, ctx: &mut NarrativeContext| {
            Object::character([name], Character::rolled(Gender::Feminine, archetype, ctx))
                .with_home(deck.clone())
                .into_ref()
        };
        let protagonists = vec![
            cast("Zara", Archetype::Lead, ctx),
            cast("Kip", Archetype::Optimist, ctx),
            cast("Rho", Archetype::Dreamboat, ctx),
            cast("Sam", Archetype::Plain, ctx),
        ];
        let villain = Object::character(["Vex"], Character::rolled(Gender::Masculine, Archetype::Villain, ctx))
            .with_home(hall.clone())
            .into_ref();
        World {
            protagonists,
            antagonists: vec![villain],
            goons: vec![Object::thing(["Gloopians"]).plural().proper().into_ref()],
            macguffins: vec![Object::thing(["hyper crystal"]).takeable(true).into_ref()],
            settings: vec![deck, hall],
        }
    }

    #[test]
    fn seed_plot_has_one_hole_at_home() {
        let mut ctx = NarrativeContext::new(1);
        let world = make_world(&mut ctx);
        let plotter = Plotter::new(&world);
        let seed = plotter.seed_plot().unwrap();
        assert_eq!(seed.hole_count(), 1);
        assert_eq!(seed.children().len(), 4);
        assert!(seed.children().iter().all(|c| c.setting() == Some(world.home().unwrap())));
    }

    #[test]
    fn world_without_settings_is_an_error() {
        let mut ctx = NarrativeContext::new(1);
        let world = World {
            settings: Vec::new(),
            ..make_world(&mut ctx)
        };
        let err = Plotter::new(&world).write_plot(3, &mut ctx).unwrap_err();
        assert!(matches!(err, PlotError::World(WorldError::NoSettings)));
    }

    #[test]
    fn kidnapping_never_takes_the_lead() {
        let mut ctx = NarrativeContext::new(7);
        let world = make_world(&mut ctx);
        let plotter = Plotter::new(&world);
        let h = hole(world.home().unwrap(), &[RuleKind::Kidnapping]).unwrap();
        for _ in 0..40 {
            match plotter.assign(RuleKind::Kidnapping, &h, &BTreeSet::new(), &mut ctx) {
                Applicability::Applicable(Assignment::Kidnapping { abductee, others, .. }) => {
                    assert!(!abductee.is_lead());
                    assert_eq!(others.len(), 3);
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn cave_in_and_skirmish_never_at_home() {
        let mut ctx = NarrativeContext::new(2);
        let world = make_world(&mut ctx);
        let plotter = Plotter::new(&world);
        let home_hole = hole(world.home().unwrap(), &[]).unwrap();
        let away_hole = hole(&world.settings[1], &[]).unwrap();
        for rule in [RuleKind::CaveIn, RuleKind::GoonSkirmish] {
            let none = BTreeSet::new();
            assert!(matches!(plotter.assign(rule, &home_hole, &none, &mut ctx), Applicability::Inapplicable));
            assert!(matches!(plotter.assign(rule, &away_hole, &none, &mut ctx), Applicability::Applicable(_)));
        }
    }

    #[test]
    fn unavailable_participants_are_excluded() {
        let mut ctx = NarrativeContext::new(3);
        let world = make_world(&mut ctx);
        let plotter = Plotter::new(&world);
        let h = hole(world.home().unwrap(), &[]).unwrap();
        let taken: BTreeSet<ObjectRef> = world.macguffins.iter().cloned().collect();
        assert!(matches!(
            plotter.assign(RuleKind::LostItem, &h, &taken, &mut ctx),
            Applicability::Inapplicable
        ));
    }

    #[test]
    fn unfillable_hole_is_left_alone() {
        let mut ctx = NarrativeContext::new(4);
        let world = make_world(&mut ctx);
        let plotter = Plotter::new(&world).with_disabled(RuleKind::ALL.iter().copied());
        let h = hole(world.home().unwrap(), SEED_RULES).unwrap();
        let filled = plotter.fill_hole(&h, &BTreeSet::new(), &mut ctx).unwrap();
        assert_eq!(filled, h);
    }

    #[test]
    fn requalify_without_disqualify_is_an_error() {
        let mut ctx = NarrativeContext::new(5);
        let world = make_world(&mut ctx);
        let rescue = development(Development::Rescue, world.home().unwrap())
            .unwrap()
            .with(Role::Requalified, world.protagonists[1].clone())
            .unwrap();
        let plot = plot_sequence(vec![rescue]);
        assert!(matches!(check_balance(&plot), Err(PlotError::NotDisqualified(_))));
    }

    #[test]
    fn expansion_keeps_availability_balanced() {
        for seed in 0..40 {
            let mut ctx = NarrativeContext::new(seed);
            let world = make_world(&mut ctx);
            let plotter = Plotter::new(&world);
            let plot = plotter.expand(4, &mut ctx).unwrap();
            check_balance(&plot).unwrap();
            let plot = plotter.write_plot(4, &mut ctx).unwrap();
            assert_eq!(plot.hole_count(), 0, "seed {}", seed);
            check_balance(&plot).unwrap();
        }
    }

    #[test]
    fn max_zero_kidnappings_with_rule_disabled() {
        let mut ctx = NarrativeContext::new(9);
        let world = make_world(&mut ctx);
        let plotter = Plotter::new(&world).with_disabled([RuleKind::Kidnapping]);
        let constraints = PlotConstraints::default().at_most(Development::Kidnapping, 0);
        let plot = plotter
            .generate_acceptable_plot(&constraints, 5, Some(1), &mut ctx)
            .unwrap();
        assert_eq!(plot.count(Development::Kidnapping), 0);
    }

    #[test]
    fn impossible_constraints_give_up_after_cap() {
        let mut ctx = NarrativeContext::new(10);
        let world = make_world(&mut ctx);
        let plotter = Plotter::new(&world);
        let constraints = PlotConstraints::default().at_least(Development::Introduction, 2);
        let err = plotter
            .generate_acceptable_plot(&constraints, 2, Some(3), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, PlotError::NoAcceptablePlot(3)));
    }

    #[test]
    fn holes_are_plot_holes() {
        let mut ctx = NarrativeContext::new(11);
        let world = make_world(&mut ctx);
        let h: Node<PlotKind> = hole(world.home().unwrap(), SEED_RULES).unwrap();
        assert!(h.is_hole());
    }
}
