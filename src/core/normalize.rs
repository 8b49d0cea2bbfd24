/// Plot normalization: cleanups and insertions applied to a fully
/// expanded plot before it is turned into events.
///
/// Every pass after hole removal expects a flat plot sequence whose
/// children are all developments.
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::plotter::{track_availability, PlotError};
use super::tree::Role;
use crate::schema::development::Development;
use crate::schema::object::{Group, ObjectRef};
use crate::schema::plot::{development, PlotNode};
use crate::schema::world::World;

/// Runs every pass in order.
pub fn normalize(plot: &PlotNode, world: &World) -> Result<PlotNode, PlotError> {
    let plot = remove_holes(&plot.flatten())?.flatten();
    assert_no_holes(&plot)?;
    let plot = remove_repetition(&plot);
    let plot = commute(&plot);
    let plot = insert_journeys(&plot)?;
    let plot = encounter_new_settings(&plot, world)?;
    foreshadow_items(&plot)
}

/// Drops every hole below the root. A hole at the root is an error.
pub fn remove_holes(plot: &PlotNode) -> Result<PlotNode, PlotError> {
    if plot.is_hole() {
        return Err(PlotError::HoleSurvived(plot.summary()));
    }
    let children = plot
        .children()
        .iter()
        .filter(|c| !c.is_hole())
        .map(remove_holes)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(plot.with_children(children))
}

pub fn assert_no_holes(plot: &PlotNode) -> Result<(), PlotError> {
    match plot.descendants().into_iter().find(|n| n.is_hole()) {
        Some(h) => Err(PlotError::HoleSurvived(h.summary())),
        None => Ok(()),
    }
}

pub fn remove_repetition(plot: &PlotNode) -> PlotNode {
    let mut children: Vec<PlotNode> = Vec::with_capacity(plot.children().len());
    for child in plot.children() {
        let repeated = match (children.last().and_then(|l| l.development()), child.development()) {
            (Some(last), Some(this)) => last == this && this.collapses_when_repeated(),
            _ => false,
        };
        if !repeated {
            children.push(child.clone());
        }
    }
    plot.with_children(children)
}

/// Swaps adjacent commutable developments in the same setting when the
/// later one involves nobody the earlier one doesn't.
pub fn commute(plot: &PlotNode) -> PlotNode {
    let mut children: Vec<PlotNode> = Vec::with_capacity(plot.children().len());
    for child in plot.children() {
        let mut child = child.clone();
        if let Some(last) = children.last_mut() {
            let both_commute = [&*last, &child]
                .iter()
                .all(|n| n.development().is_some_and(|d| d.is_commutable()));
            if both_commute
                && last.setting() == child.setting()
                && child.involved_characters().is_subset(&last.involved_characters())
            {
                debug!(
                    earlier = ?last.development(),
                    later = ?child.development(),
                    "commuting developments"
                );
                std::mem::swap(last, &mut child);
            }
        }
        children.push(child);
    }
    plot.with_children(children)
}

fn travellers(node: &PlotNode) -> Vec<ObjectRef> {
    let exeunt = node.members_of(Role::Exeunt);
    if !exeunt.is_empty() {
        return exeunt;
    }
    let mut out = node.members_of(Role::Bystanders);
    for s in node.members_of(Role::Subject) {
        if !out.contains(&s) {
            out.push(s);
        }
    }
    out
}

/// Inserts a journey wherever the setting changes between neighbours.
pub fn insert_journeys(plot: &PlotNode) -> Result<PlotNode, PlotError> {
    let mut children: Vec<PlotNode> = Vec::with_capacity(plot.children().len());
    for child in plot.children() {
        if let Some(last) = children.last() {
            let arrived = last.development() == Some(Development::Journey);
            if let (false, Some(from), Some(to)) = (arrived, last.setting(), child.setting()) {
                if from != to {
                    let journey = development(Development::Journey, from)?
                        .with(Role::Subject, Group::new(travellers(last))?)?
                        .with(Role::Object, to.clone())?;
                    children.push(journey);
                }
            }
        }
        children.push(child.clone());
    }
    Ok(plot.with_children(children))
}

/// Narrates each setting the first time the available cast reaches it.
pub fn encounter_new_settings(plot: &PlotNode, world: &World) -> Result<PlotNode, PlotError> {
    let mut seen: BTreeSet<ObjectRef> = BTreeSet::from([world.home()?.clone()]);
    let mut unavailable = BTreeSet::new();
    let mut children = Vec::with_capacity(plot.children().len());

    for child in plot.children() {
        track_availability(child, &mut unavailable)?;
        if let Some(setting) = child.setting() {
            let available: Vec<ObjectRef> = world
                .protagonists
                .iter()
                .filter(|p| !unavailable.contains(*p))
                .cloned()
                .collect();
            if !available.is_empty() && !seen.contains(setting) {
                seen.insert(setting.clone());
                children.push(
                    development(Development::EncounterNewSetting, setting)?
                        .with(Role::Subject, Group::new(available)?)?,
                );
            }
        }
        children.push(child.clone());
    }
    Ok(plot.with_children(children))
}

/// Sets up each lost item right after the introduction and, once per
/// plot, recalls it after the first convalescence with someone besides
/// the holder to hear it.
pub fn foreshadow_items(plot: &PlotNode) -> Result<PlotNode, PlotError> {
    // Item to whoever lost it first.
    let mut holders: BTreeMap<ObjectRef, ObjectRef> = BTreeMap::new();
    for node in plot.developments() {
        if node.development() != Some(Development::LoseItem) {
            continue;
        }
        if let (Some(item), Some(holder)) = (node.object_in(Role::Object), node.object_in(Role::Subject)) {
            holders.entry(item.clone()).or_insert_with(|| holder.clone());
        }
    }

    let mut plot = plot.clone();
    let mut recalled = false;
    for (item, holder) in &holders {
        let mut children = Vec::with_capacity(plot.children().len() + 2);
        for child in plot.children() {
            children.push(child.clone());
            let follow_up = match child.development() {
                Some(Development::Introduction) => Development::ItemForeshadowed,
                Some(Development::Convalescence) if !recalled => Development::ItemRecalled,
                _ => continue,
            };
            let others: Vec<ObjectRef> = child
                .members_of(Role::Subject)
                .into_iter()
                .filter(|m| m != holder)
                .collect();
            let (Some(setting), false) = (child.setting(), others.is_empty()) else {
                continue;
            };
            if follow_up == Development::ItemRecalled {
                recalled = true;
            }
            children.push(
                development(follow_up, setting)?
                    .with(Role::Subject, holder.clone())?
                    .with(Role::Object, item.clone())?
                    .with(Role::Bystanders, Group::new(others)?)?,
            );
        }
        plot = plot.with_children(children);
    }
    Ok(plot)
}
