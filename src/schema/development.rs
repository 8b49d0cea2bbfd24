/// Plot developments — the story beats a plot is built from, with their
/// synopses and title hooks.
use serde::{Deserialize, Serialize};

use crate::core::tree::Role;

/// The plot development taxonomy.
///
/// A development is one unit of story action. It separates WHAT happens
/// in the plot (a kidnapping, a rescue) from the narrative beats it is
/// eventually told through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Development {
    Introduction,
    /// A protagonist shows off the item they will later lose.
    ItemForeshadowed,
    /// The lost item is fondly remembered once the adventure is over.
    ItemRecalled,
    Convalescence,
    AllLaugh,
    Kidnapping,
    LocateAbductee,
    WayBlocked,
    Rescue,
    LoseItem,
    RecoverItem,
    TrappedInRubble,
    ExtractedFromRubble,
    GoonAmbush,
    GoonEncounter,
    ProtagonistAttack,
    AwkwardCombat,
    Vanquished,
    AwkwardTension,
    RomanticTension,
    RomanticResolution,
    Drone,
    ContemplateItem,
    Journey,
    EncounterNewSetting,
}

impl Development {
    pub const ALL: &'static [Development] = &[
        Development::Introduction,
        Development::ItemForeshadowed,
        Development::ItemRecalled,
        Development::Convalescence,
        Development::AllLaugh,
        Development::Kidnapping,
        Development::LocateAbductee,
        Development::WayBlocked,
        Development::Rescue,
        Development::LoseItem,
        Development::RecoverItem,
        Development::TrappedInRubble,
        Development::ExtractedFromRubble,
        Development::GoonAmbush,
        Development::GoonEncounter,
        Development::ProtagonistAttack,
        Development::AwkwardCombat,
        Development::Vanquished,
        Development::AwkwardTension,
        Development::RomanticTension,
        Development::RomanticResolution,
        Development::Drone,
        Development::ContemplateItem,
        Development::Journey,
        Development::EncounterNewSetting,
    ];

    /// One-line synopsis templates, rendered against the plot node.
    pub fn synopsis(&self) -> &'static [&'static str] {
        match self {
            Self::Introduction => &["we are introduced to {subject.definite}"],
            Self::ItemForeshadowed => &[
                "{object.definite} is foreshadowed by {subject.definite}, witnessed by {bystanders.definite}",
            ],
            Self::ItemRecalled => &[
                "{subject.definite} is reminded of their mishaps with {object.definite}, witnessed by {bystanders.definite}",
            ],
            Self::Convalescence => &["{subject.definite} convalesce after their adventures"],
            Self::AllLaugh => &["{subject.definite} all laugh"],
            Self::Kidnapping => &[
                "{subject.definite} kidnaps {obj.definite}, witnessed by {bystanders.definite}",
            ],
            Self::LocateAbductee => &["{subject.definite} must locate where {object.definite} is being held"],
            Self::WayBlocked => &["{subject.definite} find {subject.his} way is blocked"],
            Self::Rescue => &["{subject.definite} rescue {obj.definite}"],
            Self::LoseItem => &[
                "{subject.definite} loses {obj.definite}, witnessed by {bystanders.definite}",
            ],
            Self::RecoverItem => &[
                "{subject.definite} recovers {obj.definite}, witnessed by {bystanders.definite}",
            ],
            Self::TrappedInRubble => &[
                "{subject.definite} is trapped under rubble, witnessed by {bystanders.definite}",
            ],
            Self::ExtractedFromRubble => &["{subject.definite} dig {obj.definite} out of the rubble"],
            Self::GoonAmbush => &["{subject.definite} are ambushed by {obj.definite}"],
            Self::GoonEncounter => &["{subject.definite} encounter a band of {obj.definite}"],
            Self::ProtagonistAttack => &["{subject.definite} attack {obj.definite}"],
            Self::AwkwardCombat => &[
                "{subject.definite} get in an awkward situation during combat with {obj.definite}",
            ],
            Self::Vanquished => &[
                "{subject.definite} vanquish {obj.definite} (they were sent by {object2.definite})",
            ],
            Self::AwkwardTension => &[
                "there is an awkward moment between {subject.definite} and {obj.definite}",
            ],
            Self::RomanticTension => &["{subject.definite} and {obj.definite} do mushy stuff (almost)"],
            Self::RomanticResolution => &["{subject.definite} and {obj.definite} do mushy stuff"],
            Self::Drone => &["{subject.definite} is startled by a drone"],
            Self::ContemplateItem => &["{subject.definite} contemplates {obj.indefinite}"],
            Self::Journey => &["{subject.definite} travel to {obj.definite}"],
            Self::EncounterNewSetting => &["{subject.definite} encounter a new setting"],
        }
    }

    /// Two of these in a row collapse to one.
    pub fn collapses_when_repeated(&self) -> bool {
        matches!(self, Self::AwkwardTension)
    }

    /// May swap with an adjacent commutable development in the same setting.
    pub fn is_commutable(&self) -> bool {
        matches!(self, Self::Rescue | Self::RecoverItem)
    }

    /// Developments whose participants make good chapter titles, and the
    /// role the title comes from.
    pub fn title_role(&self) -> Option<Role> {
        match self {
            Self::Kidnapping => Some(Role::Subject),
            Self::LoseItem | Self::Vanquished => Some(Role::Object),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn every_development_has_a_synopsis() {
        let unique: FxHashSet<_> = Development::ALL.iter().collect();
        assert_eq!(unique.len(), Development::ALL.len());
        for d in Development::ALL {
            assert!(!d.synopsis().is_empty(), "{:?}", d);
        }
    }

    #[test]
    fn only_rescue_and_recovery_commute() {
        let commutable: Vec<_> = Development::ALL.iter().filter(|d| d.is_commutable()).collect();
        assert_eq!(commutable, vec![&Development::Rescue, &Development::RecoverItem]);
    }
}
