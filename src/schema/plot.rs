/// Plot trees — sequences of developments and the holes still waiting to
/// be filled by production rules.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::development::Development;
use super::object::ObjectRef;
use crate::core::tree::{Node, NodeKind, Role, TreeError};

/// Production rules that can fill a plot hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    Kidnapping,
    FindAbductee,
    FindAnotherWay,
    LostItem,
    CaveIn,
    GoonSkirmish,
    ProtagonistAttack,
    AwkwardCombat,
    AwkwardTension,
    RomanticTension,
    RomanticResolution,
    ContemplateItem,
    Drone,
}

impl RuleKind {
    pub const ALL: &'static [RuleKind] = &[
        RuleKind::Kidnapping,
        RuleKind::FindAbductee,
        RuleKind::FindAnotherWay,
        RuleKind::LostItem,
        RuleKind::CaveIn,
        RuleKind::GoonSkirmish,
        RuleKind::ProtagonistAttack,
        RuleKind::AwkwardCombat,
        RuleKind::AwkwardTension,
        RuleKind::RomanticTension,
        RuleKind::RomanticResolution,
        RuleKind::ContemplateItem,
        RuleKind::Drone,
    ];
}

const SEQUENCE_ROLES: &[Role] = &[];

const HOLE_ROLES: &[Role] = &[Role::Setting, Role::Goons, Role::Abductee, Role::AbducteeLocation];

const DEVELOPMENT_ROLES: &[Role] = &[
    Role::Subject,
    Role::Object,
    Role::Object2,
    Role::Bystanders,
    Role::Exeunt,
    Role::Disqualified,
    Role::Requalified,
    Role::Setting,
];

#[derive(Debug, Clone, PartialEq)]
pub enum PlotKind {
    Sequence,
    /// Placeholder awaiting one of its eligible rules.
    Hole(&'static [RuleKind]),
    Development(Development),
}

impl NodeKind for PlotKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Sequence => "PlotSequence",
            Self::Hole(_) => "PlotHole",
            Self::Development(_) => "PlotDevelopment",
        }
    }

    fn roles(&self) -> &'static [Role] {
        match self {
            Self::Sequence => SEQUENCE_ROLES,
            Self::Hole(_) => HOLE_ROLES,
            Self::Development(_) => DEVELOPMENT_ROLES,
        }
    }

    fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence)
    }
}

pub type PlotNode = Node<PlotKind>;

/// A development of `kind` taking place in `setting`.
pub fn development(kind: Development, setting: &ObjectRef) -> Result<PlotNode, TreeError> {
    Node::new(PlotKind::Development(kind)).with(Role::Setting, setting)
}

/// A hole in `setting` that any of `rules` may fill.
pub fn hole(setting: &ObjectRef, rules: &'static [RuleKind]) -> Result<PlotNode, TreeError> {
    Node::new(PlotKind::Hole(rules)).with(Role::Setting, setting)
}

pub fn plot_sequence(children: Vec<PlotNode>) -> PlotNode {
    Node::parent(PlotKind::Sequence, children)
}

impl Node<PlotKind> {
    pub fn development(&self) -> Option<Development> {
        match self.kind() {
            PlotKind::Development(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_hole(&self) -> bool {
        matches!(self.kind(), PlotKind::Hole(_))
    }

    pub fn setting(&self) -> Option<&ObjectRef> {
        self.object_in(Role::Setting)
    }

    /// Characters taking part in any way: subject, objects, or bystanders.
    pub fn involved_characters(&self) -> BTreeSet<ObjectRef> {
        [Role::Subject, Role::Object, Role::Object2, Role::Bystanders]
            .into_iter()
            .flat_map(|role| self.members_of(role))
            .filter(|o| o.is_character())
            .collect()
    }

    /// How many developments of `kind` the tree holds.
    pub fn count(&self, kind: Development) -> usize {
        self.descendants()
            .into_iter()
            .filter(|n| n.development() == Some(kind))
            .count()
    }

    pub fn hole_count(&self) -> usize {
        self.descendants().into_iter().filter(|n| n.is_hole()).count()
    }

    /// Every development in preorder.
    pub fn developments(&self) -> Vec<&PlotNode> {
        self.descendants()
            .into_iter()
            .filter(|n| n.development().is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::object::{Group, Object};

    fn make_setting() -> ObjectRef {
        Object::thing(["bridge"]).into_ref()
    }

    #[test]
    fn holes_reject_development_roles() {
        let bridge = make_setting();
        let h = hole(&bridge, &[RuleKind::Drone]).unwrap();
        assert!(h.clone().with(Role::Subject, bridge.clone()).is_err());
        assert!(h.with(Role::Goons, bridge).is_ok());
    }

    #[test]
    fn counting_looks_through_sequences() {
        let bridge = make_setting();
        let plot = plot_sequence(vec![
            development(Development::Drone, &bridge).unwrap(),
            plot_sequence(vec![
                development(Development::Drone, &bridge).unwrap(),
                hole(&bridge, &[RuleKind::Drone]).unwrap(),
            ]),
        ]);
        assert_eq!(plot.count(Development::Drone), 2);
        assert_eq!(plot.count(Development::Rescue), 0);
        assert_eq!(plot.hole_count(), 1);
        assert_eq!(plot.flatten().children().len(), 3);
    }

    #[test]
    fn involved_characters_skip_things() {
        use crate::core::context::NarrativeContext;
        use crate::schema::character::{Archetype, Character, Gender};

        let mut ctx = NarrativeContext::new(1);
        let ann = Object::character(["Ann"], Character::rolled(Gender::Feminine, Archetype::Lead, &mut ctx)).into_ref();
        let bo = Object::character(["Bo"], Character::rolled(Gender::Masculine, Archetype::Plain, &mut ctx)).into_ref();
        let rock = Object::thing(["rock"]).into_ref();
        let bridge = make_setting();
        let node = development(Development::ContemplateItem, &bridge)
            .unwrap()
            .with(Role::Subject, ann.clone())
            .unwrap()
            .with(Role::Object, rock)
            .unwrap()
            .with(Role::Bystanders, Group::new(vec![bo.clone()]).unwrap())
            .unwrap();
        let involved = node.involved_characters();
        assert_eq!(involved.len(), 2);
        assert!(involved.contains(&ann) && involved.contains(&bo));
    }
}
