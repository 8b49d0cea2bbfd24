/// Story nodes — narrative beats, their templates, and the containers
/// (stories, scenes, sequences, paragraphs) that hold them.
use serde::{Deserialize, Serialize};

use crate::core::tree::{Node, NodeKind, Role};

/// How a character feels at a point in the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Embarrassed,
}

impl Mood {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Embarrassed => "embarrassed",
        }
    }
}

/// Every kind of narrative beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    // Propagation-only beats, stripped before rendering.
    BecomeHappy,
    BecomeSad,
    BecomeAngry,
    BecomeEmbarrassed,
    AcquireDuty,
    RelieveDuty,

    // Scene and character description.
    SettingDescription,
    NearbyDescription,
    GenericSettingDescription,
    CharacterDescription,
    CharacterFeaturesDescription,
    CharacterReminder,
    TorsoCostumeDescription,
    TorsoCostumeReminder,
    FeetCostumeDescription,
    FeetCostumeReminder,
    PoseDescription,

    // Everyday business.
    PickUp,
    Hold,
    Contemplate,
    GestureAt,
    LookAt,
    LookAround,
    Emote,
    StateDuty,
    Greet,
    CharacterStaysHappy,
    OutOfEggs,
    HyperCrystalUsage,
    IntroduceItem,
    AskAboutItem,
    ReplyAboutItem,
    RememberItem,

    // Cave-ins.
    RumblingSound,
    WhatWasThatNoise,
    CaveIn,
    Stunned,
    BuriedUnderRubble,
    WasteNoTime,
    DigOut,

    // Villainy.
    Appear,
    Disappear,
    NoticeAntagonist,
    Cackle,
    AntagonistBanter,
    Abduct,
    Panic,
    WeMustFindThem,
    LocationHunch,
    SetCourse,
    WeMustGoTo,
    KeepMoving,
    TurnCorner,
    BehindBars,
    Rescue,
    Thank,

    // Detours.
    BumpIntoForceField,
    WhatWasThat,
    MustRetraceSteps,

    // Lost items.
    Trip,
    Drop,
    Lose,
    Oops,
    Hunch,
    LookBehind,
    Find,
    Relief,

    // Fighting.
    Attack,
    Encounter,
    GoonBanter,
    GoonParley,
    GenericBattle,
    WarCry,
    Unsheathe,
    LiftWeapon,
    BringDownWeapon,
    WeaponContact,
    FlyAcross,
    TryToGetBehind,
    BumpIntoAwkwardly,
    Blush,
    RushIntoFray,
    AfterBattle,
    AfterBattleBanter,
    ObserveAfterBattle,
    RemindReport,
    IfWeGetHome,

    // Romance.
    PullAside,
    WantToTalkToYou,
    WhatIsIt,
    RecallPastEvent,
    SayNoMore,
    PreludeToKiss,
    Fidget,
    FacesCloseTogether,
    MushyStuff,
    Kiss,
    AndTheyKissed,

    // Interruptions and travel.
    Drone,
    TravelTo,
    CommentOnPlace,
    TakeReadings,
    ReadingsBanter,

    // Endings.
    ComplimentAction,
    OfferPromotion,
    OhYou,
    RefusePromotion,
    Convalesce,
    AllLaugh,
}

impl EventKind {
    pub const ALL: &'static [EventKind] = &[
        Self::BecomeHappy,
        Self::BecomeSad,
        Self::BecomeAngry,
        Self::BecomeEmbarrassed,
        Self::AcquireDuty,
        Self::RelieveDuty,
        Self::SettingDescription,
        Self::NearbyDescription,
        Self::GenericSettingDescription,
        Self::CharacterDescription,
        Self::CharacterFeaturesDescription,
        Self::CharacterReminder,
        Self::TorsoCostumeDescription,
        Self::TorsoCostumeReminder,
        Self::FeetCostumeDescription,
        Self::FeetCostumeReminder,
        Self::PoseDescription,
        Self::PickUp,
        Self::Hold,
        Self::Contemplate,
        Self::GestureAt,
        Self::LookAt,
        Self::LookAround,
        Self::Emote,
        Self::StateDuty,
        Self::Greet,
        Self::CharacterStaysHappy,
        Self::OutOfEggs,
        Self::HyperCrystalUsage,
        Self::IntroduceItem,
        Self::AskAboutItem,
        Self::ReplyAboutItem,
        Self::RememberItem,
        Self::RumblingSound,
        Self::WhatWasThatNoise,
        Self::CaveIn,
        Self::Stunned,
        Self::BuriedUnderRubble,
        Self::WasteNoTime,
        Self::DigOut,
        Self::Appear,
        Self::Disappear,
        Self::NoticeAntagonist,
        Self::Cackle,
        Self::AntagonistBanter,
        Self::Abduct,
        Self::Panic,
        Self::WeMustFindThem,
        Self::LocationHunch,
        Self::SetCourse,
        Self::WeMustGoTo,
        Self::KeepMoving,
        Self::TurnCorner,
        Self::BehindBars,
        Self::Rescue,
        Self::Thank,
        Self::BumpIntoForceField,
        Self::WhatWasThat,
        Self::MustRetraceSteps,
        Self::Trip,
        Self::Drop,
        Self::Lose,
        Self::Oops,
        Self::Hunch,
        Self::LookBehind,
        Self::Find,
        Self::Relief,
        Self::Attack,
        Self::Encounter,
        Self::GoonBanter,
        Self::GoonParley,
        Self::GenericBattle,
        Self::WarCry,
        Self::Unsheathe,
        Self::LiftWeapon,
        Self::BringDownWeapon,
        Self::WeaponContact,
        Self::FlyAcross,
        Self::TryToGetBehind,
        Self::BumpIntoAwkwardly,
        Self::Blush,
        Self::RushIntoFray,
        Self::AfterBattle,
        Self::AfterBattleBanter,
        Self::ObserveAfterBattle,
        Self::RemindReport,
        Self::IfWeGetHome,
        Self::PullAside,
        Self::WantToTalkToYou,
        Self::WhatIsIt,
        Self::RecallPastEvent,
        Self::SayNoMore,
        Self::PreludeToKiss,
        Self::Fidget,
        Self::FacesCloseTogether,
        Self::MushyStuff,
        Self::Kiss,
        Self::AndTheyKissed,
        Self::Drone,
        Self::TravelTo,
        Self::CommentOnPlace,
        Self::TakeReadings,
        Self::ReadingsBanter,
        Self::ComplimentAction,
        Self::OfferPromotion,
        Self::OhYou,
        Self::RefusePromotion,
        Self::Convalesce,
        Self::AllLaugh,
    ];

    /// The mood a modifier beat puts its subject in.
    pub fn mood_change(&self) -> Option<Mood> {
        match self {
            Self::BecomeHappy => Some(Mood::Happy),
            Self::BecomeSad => Some(Mood::Sad),
            Self::BecomeAngry => Some(Mood::Angry),
            Self::BecomeEmbarrassed => Some(Mood::Embarrassed),
            _ => None,
        }
    }

    /// Beats that only drive attribute propagation and never render.
    pub fn is_transient(&self) -> bool {
        self.mood_change().is_some() || matches!(self, Self::AcquireDuty | Self::RelieveDuty)
    }

    /// Rendered with an exclamation mark.
    pub fn is_exciting(&self) -> bool {
        matches!(
            self,
            Self::CaveIn | Self::Appear | Self::Kiss | Self::AndTheyKissed | Self::BehindBars | Self::GenericBattle
        )
    }

    /// Always opens a fresh paragraph.
    pub fn starts_paragraph(&self) -> bool {
        matches!(
            self,
            Self::FacesCloseTogether | Self::Kiss | Self::BehindBars | Self::GenericBattle
        )
    }

    /// Can be joined to a neighbour with "and". Dialogue never is.
    pub fn is_conjoinable(&self) -> bool {
        if self.is_transient()
            || self.is_exciting()
            || self.starts_paragraph()
            || *self == Self::CharacterDescription
        {
            return false;
        }
        let templates = self.templates();
        !templates.is_empty() && !templates.iter().any(|t| t.starts_with('"'))
    }

    /// Torso descriptions pick from these when there is no separate legs costume.
    pub fn one_piece_templates(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::TorsoCostumeDescription => Some(&[
                "{subj.pronoun} {subj.was} {subj.wearing} {subj.torso_costume.indefinite}",
                "{subj.pronoun} had on {subj.torso_costume.indefinite}",
            ]),
            Self::TorsoCostumeReminder => Some(&[
                "{subj.possessive} {subj.torso_costume.name} <rustled|shimmered|swished> as {subj.he} moved",
                "{subj.pronoun} smoothed down {subj.his} {subj.torso_costume.name}",
            ]),
            _ => None,
        }
    }

    pub fn templates(&self) -> &'static [&'static str] {
        match self {
            Self::BecomeHappy
            | Self::BecomeSad
            | Self::BecomeAngry
            | Self::BecomeEmbarrassed
            | Self::AcquireDuty
            | Self::RelieveDuty => &[],

            Self::SettingDescription => &[
                "it was <a bright|an ordinary|a quiet|a hectic> day {subj.preposition} {subj.definite}",
                "{subj.definite} <hummed with activity|was peaceful for once|looked the same as ever>",
            ],
            Self::NearbyDescription => &[
                "nearby, there was {obj.indefinite}",
                "{obj.indefinite} stood <close by|off to one side|in the corner>",
            ],
            Self::GenericSettingDescription => &[
                "the {subj.light} glinted off every surface",
                "everything was bathed in {subj.light}",
                "somewhere, something <beeped|hissed|dripped>",
            ],
            Self::CharacterDescription => &[
                "{subj.definite} was {subj.stature}, with {subj.hair_length} {subj.hair_colour} hair and {subj.eye_colour} eyes",
                "{subj.definite}, {subj.stature}, tossed {subj.his} {subj.hair_length} {subj.hair_colour} hair and blinked {subj.his} {subj.eye_colour} eyes",
            ],
            Self::CharacterFeaturesDescription => &[
                "{subj.he} was known for {subj.his} {subj.feature_adj} {subj.feature}",
                "{subj.his} {subj.feature} was {subj.feature_adj}",
            ],
            Self::CharacterReminder => &[
                "the {subj.location.light} caught {subj.possessive} {subj.feature_adj} {subj.feature}",
                "{subj.pronoun} leaned against {subj.location.nearby_scenery.definite}, {subj.his} {subj.feature_adj} {subj.feature} catching the {subj.location.light}",
            ],
            Self::TorsoCostumeDescription => &[
                "{subj.pronoun} {subj.was} {subj.wearing} {subj.torso_costume.indefinite} and {subj.legs_costume.indefinite}",
                "{subj.pronoun} had on {subj.torso_costume.indefinite} over {subj.legs_costume.indefinite}",
            ],
            Self::TorsoCostumeReminder => &[
                "{subj.possessive} {subj.torso_costume.name} and {subj.legs_costume.name} <rustled|shimmered|swished> as {subj.he} moved",
                "{subj.pronoun} tugged at {subj.his} {subj.legs_costume.name}",
            ],
            Self::FeetCostumeDescription => &[
                "on {subj.his} feet {subj.pronoun} wore {subj.feet_costume.indefinite}",
                "{subj.pronoun} had {subj.feet_costume.indefinite} on {subj.his} feet",
            ],
            Self::FeetCostumeReminder => &[
                "{subj.possessive} {subj.feet_costume.name} <squeaked|clicked|clomped> on the floor",
            ],
            Self::PoseDescription => &[
                "{subj.pronoun} {subj.was} <leaning against|sitting on|standing beside> {obj.definite}",
                "{subj.pronoun} {subj.was} <lounging|posing dramatically> by {obj.definite}",
            ],

            Self::PickUp => &[
                "{subj.pronoun} picked up {obj.indefinite}",
                "{subj.pronoun} <grabbed|scooped up> {obj.indefinite}",
            ],
            Self::Hold => &[
                "{subj.pronoun} held {obj.definite} <up to the light|at arm's length|in {subj.his} hand>",
            ],
            Self::Contemplate => &[
                "{subj.pronoun} <gazed at|studied|contemplated> {obj.definite} <thoughtfully|for a long moment|with a faraway look>",
                "{subj.pronoun} turned {obj.definite} over in {subj.his} hands {subj.adverb}",
            ],
            Self::GestureAt => &[
                "{subj.pronoun} <pointed at|waved at|gestured towards> {obj.accusative}",
            ],
            Self::LookAt => &[
                "{subj.pronoun} <looked at|glanced at|peered at|stared at> {obj.accusative} {subj.adverb}",
            ],
            Self::LookAround => &[
                "{subj.pronoun} looked around {subj.adverb}",
                "{subj.pronoun} <surveyed|scanned> the area {subj.adverb}",
            ],
            Self::Emote => &["{subj.pronoun} {subj.emoted}"],
            Self::StateDuty => &[
                "\"We have to {subj.pick_duty.name}!\" {subj.pronoun} {subj.shouted}",
                "\"Don't forget, we must {subj.pick_duty.name},\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::Greet => &[
                "\"Hello, {obj.name}!\" {subj.pronoun} {subj.said}",
                "\"Morning, {obj.name},\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::CharacterStaysHappy => &[
                "{subj.pronoun} refused to let anything spoil {subj.his} good mood",
                "{subj.pronoun} kept smiling<| anyway| regardless>",
            ],
            Self::OutOfEggs => &[
                "\"We're out of space eggs again,\" {subj.pronoun} {subj.said}",
                "\"Who finished the space eggs?\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::HyperCrystalUsage => &[
                "\"The hyper crystals are running <low|hot|strangely>,\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::IntroduceItem => &[
                "{subj.pronoun} was <carrying|holding|fiddling with> {obj.indefinite}",
                "{subj.pronoun} <showed off|held up> {obj.indefinite}",
            ],
            Self::AskAboutItem => &[
                "\"What's that you've got there?\" {subj.pronoun} {subj.said}",
                "\"Is that {obj.indefinite}?\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::ReplyAboutItem => &[
                "\"Just a little something I picked up,\" {subj.pronoun} {subj.said} to {obj.accusative}",
                "\"Oh, this? It's nothing,\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::RememberItem => &[
                "\"Good thing you had {object2.definite}, {obj.name},\" {subj.pronoun} {subj.said}",
                "\"Remember when you showed us {object2.definite}, {obj.name}?\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],

            Self::RumblingSound => &[
                "there was a <low|deep|terrible> rumbling sound",
                "a <faint|menacing> rumble <shook|filled> the air",
            ],
            Self::WhatWasThatNoise => &[
                "\"What was that noise?\" {subj.pronoun} {subj.said}",
                "\"Did anyone else hear that?\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::CaveIn => &[
                "suddenly, {subj.definite} <caved in|collapsed|came crashing down>",
            ],
            Self::Stunned => &[
                "{subj.pronoun} {subj.was} stunned",
                "{subj.pronoun} <reeled|staggered>, dazed",
            ],
            Self::BuriedUnderRubble => &[
                "{subj.pronoun} {subj.was} buried under <the rubble|a pile of debris|tons of rock>",
            ],
            Self::WasteNoTime => &[
                "{subj.pronoun} <wasted no time|sprang into action>",
            ],
            Self::DigOut => &[
                "{subj.pronoun} dug {obj.accusative} out of the rubble",
                "{subj.pronoun} <heaved|hauled> rocks aside to free {obj.accusative}",
            ],

            Self::Appear => &[
                "suddenly, {subj.indefinite} appeared<| in a puff of smoke| out of nowhere>",
            ],
            Self::Disappear => &[
                "{subj.pronoun} <vanished|disappeared|teleported away> with {obj.accusative}",
            ],
            Self::NoticeAntagonist => &[
                "\"It's {obj.definite}!\" {subj.pronoun} {subj.shouted}",
                "\"Look out, it's {obj.definite}!\" {subj.pronoun} {subj.shouted}",
            ],
            Self::Cackle => &[
                "{subj.pronoun} <cackled|laughed a horrible laugh|sniggered> {subj.adverb}",
            ],
            Self::AntagonistBanter => &[
                "\"At last, the Star Patrol is in my grasp!\" {subj.pronoun} {subj.said} {subj.adverb}",
                "\"You fools will never stop me!\" {subj.pronoun} {subj.shouted}",
                "\"Did you really think you could escape me?\" {subj.pronoun} {subj.said}",
            ],
            Self::Abduct => &[
                "{subj.pronoun} <grabbed|seized|snatched> {obj.accusative}",
                "{subj.pronoun} threw a net over {obj.accusative}",
            ],
            Self::Panic => &[
                "\"<Oh no|Help|What do we do>?\" {subj.pronoun} {subj.shouted}",
                "{subj.pronoun} panicked",
            ],
            Self::WeMustFindThem => &[
                "\"We have to find {obj.accusative}!\" {subj.pronoun} {subj.shouted}",
                "\"We must rescue {obj.name}!\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::LocationHunch => &[
                "\"I bet {obj.pronoun} {obj.was} taken to {object2.definite},\" {subj.pronoun} {subj.said}",
                "\"My instincts tell me {obj.name} is in {object2.definite},\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::SetCourse => &[
                "\"Set a course for {obj.definite}!\" {subj.pronoun} {subj.shouted}",
                "{subj.pronoun} set a course for {obj.definite}",
            ],
            Self::WeMustGoTo => &[
                "\"We must go to {obj.definite}!\" {subj.pronoun} {subj.shouted}",
                "\"To {obj.definite}!\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::KeepMoving => &[
                "\"Keep moving,\" {subj.pronoun} {subj.said}",
                "\"This way!\" {subj.pronoun} {subj.shouted}",
            ],
            Self::TurnCorner => &[
                "{subj.pronoun} turned a corner",
                "{subj.pronoun} <crept|hurried> down a long corridor",
            ],
            Self::BehindBars => &[
                "there, behind <a force field|glowing bars>, was {subj.definite}",
            ],
            Self::Rescue => &[
                "{subj.pronoun} <broke open|smashed> the cage and freed {obj.accusative}",
                "together, {subj.pronoun} freed {obj.accusative}",
            ],
            Self::Thank => &[
                "\"Thanks, {obj.name}!\" {subj.pronoun} {subj.said}",
                "\"I owe you one, {obj.name},\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],

            Self::BumpIntoForceField => &[
                "{subj.pronoun} walked straight into an invisible force field",
                "{subj.pronoun} bumped into a <shimmering|crackling> force field",
            ],
            Self::WhatWasThat => &[
                "\"What was that?\" {subj.pronoun} {subj.shouted}",
            ],
            Self::MustRetraceSteps => &[
                "\"We'll have to <find another way|go back the way we came>,\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],

            Self::Trip => &[
                "{subj.pronoun} tripped <over {subj.his} own feet|on a loose panel>",
                "{subj.pronoun} stumbled",
            ],
            Self::Drop => &[
                "{subj.pronoun} dropped {obj.definite}",
                "{obj.definite} slipped out of {subj.possessive} hands",
            ],
            Self::Lose => &[
                "{subj.definite} <rolled away|bounced into a crevice|skittered out of sight>",
                "{subj.definite} {subj.was} nowhere to be seen",
            ],
            Self::Oops => &[
                "\"Oops!\" {subj.pronoun} {subj.said}",
                "\"Oh no, I've lost it!\" {subj.pronoun} {subj.shouted}",
            ],
            Self::Hunch => &[
                "\"I have a hunch,\" {subj.pronoun} {subj.said} {subj.adverb}",
                "{subj.pronoun} had a sudden hunch",
            ],
            Self::LookBehind => &[
                "{subj.pronoun} looked behind {obj.definite}",
                "{subj.pronoun} peeked under {obj.definite}",
            ],
            Self::Find => &[
                "{subj.pronoun} found {obj.definite}",
                "{subj.pronoun} spotted {obj.definite} and snatched it up",
            ],
            Self::Relief => &[
                "\"<Phew|Thank goodness>!\" {subj.pronoun} {subj.said}",
            ],

            Self::Attack => &[
                "{subj.indefinite} <attacked|ambushed|leapt out at> {obj.accusative}",
            ],
            Self::Encounter => &[
                "{obj.pronoun} <came face to face with|ran into|stumbled upon> {subj.indefinite}",
            ],
            Self::GoonBanter => &[
                "\"{obj.definite} again!\" {subj.pronoun} {subj.shouted}",
                "\"Oh no, it's {obj.indefinite}!\" {subj.pronoun} {subj.said}",
            ],
            Self::GoonParley => &[
                "\"{subj.gibberish}!\" <jabbered|squawked> one of {subj.definite}",
                "{subj.definite} chattered something that sounded like \"{subj.gibberish}\"",
            ],
            Self::GenericBattle => &[
                "a <fierce|furious|ridiculous> battle <ensued|broke out>",
                "fists and ray guns flew in every direction",
            ],
            Self::WarCry => &[
                "\"{subj.war_cry}!\" {subj.pronoun} {subj.shouted}",
            ],
            Self::Unsheathe => &[
                "{subj.pronoun} <drew|unsheathed|whipped out> {subj.his} {obj.name}",
            ],
            Self::LiftWeapon => &[
                "{subj.pronoun} raised {obj.definite} high above {subj.his} head",
            ],
            Self::BringDownWeapon => &[
                "{subj.motion}{subj.pronoun} swung {obj.definite} <in a wide arc|with all {subj.his} might>",
            ],
            Self::WeaponContact => &[
                "{subj.definite} <smashed into|connected with|walloped> {obj.definite}",
            ],
            Self::FlyAcross => &[
                "{subj.definite} went flying across the room",
                "{subj.definite} <sailed|tumbled> through the air",
            ],
            Self::TryToGetBehind => &[
                "{subj.pronoun} tried to <sneak|creep> up behind {obj.definite}",
            ],
            Self::BumpIntoAwkwardly => &[
                "{subj.pronoun} bumped into {obj.accusative} awkwardly",
                "{subj.pronoun} <collided with|stumbled into> {obj.accusative}",
            ],
            Self::Blush => &[
                "{subj.pronoun} blushed <furiously|a deep crimson|prettily>",
            ],
            Self::RushIntoFray => &[
                "{subj.pronoun} rushed into the fray",
                "{subj.pronoun} charged {subj.simile}",
            ],
            Self::AfterBattle => &[
                "{subj.definite} <fled|retreated|scattered> in <disarray|terror|confusion>",
            ],
            Self::AfterBattleBanter => &[
                "\"That'll teach them!\" {subj.pronoun} {subj.said}",
                "\"Well, that was fun,\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::ObserveAfterBattle => &[
                "\"Those {obj.name} must have been sent by {object2.definite},\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::RemindReport => &[
                "\"We should report this to <Star Command|the Admiral>,\" {subj.pronoun} {subj.said}",
            ],
            Self::IfWeGetHome => &[
                "\"If we ever get home...\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],

            Self::PullAside => &[
                "{subj.pronoun} pulled {obj.accusative} aside",
                "{subj.pronoun} took {obj.accusative} by the arm",
            ],
            Self::WantToTalkToYou => &[
                "\"{obj.name}, can I talk to you about something?\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::WhatIsIt => &[
                "\"What is it?\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::RecallPastEvent => &[
                "\"About what happened back there...\" {subj.pronoun} {subj.said}",
            ],
            Self::SayNoMore => &[
                "\"Say no more,\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::PreludeToKiss => &[
                "{subj.pronoun} gazed deep into {obj.possessive} {obj.eye_colour} eyes",
            ],
            Self::Fidget => &[
                "{subj.pronoun} fidgeted {subj.adverb}",
            ],
            Self::FacesCloseTogether => &[
                "{subj.possessive} face was very close to {obj.possessive}",
            ],
            Self::MushyStuff => &[
                "\"I've never felt this way before,\" {subj.pronoun} {subj.said}",
                "\"Your {obj.feature} is so {obj.feature_adj},\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::Kiss => &[
                "{subj.pronoun} kissed {obj.accusative}",
                "{subj.pronoun} pulled {obj.accusative} close and kissed {obj.accusative}",
            ],
            Self::AndTheyKissed => &[
                "and they kissed",
                "and then they kissed<| passionately| for a very long time>",
            ],

            Self::Drone => &[
                "a <buzzing|whirring> drone flew past {subj.possessive} head",
                "suddenly a maintenance drone <whizzed|zoomed> past {subj.accusative}",
            ],
            Self::TravelTo => &[
                "{subj.pronoun} <travelled|made their way|headed> to {obj.definite}",
            ],
            Self::CommentOnPlace => &[
                "\"What a dump,\" {subj.pronoun} {subj.said}",
                "\"I don't like the look of this place,\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::TakeReadings => &[
                "{subj.pronoun} took some readings with {subj.his} tricorder",
                "{subj.pronoun} <scanned|analysed> the surroundings",
            ],
            Self::ReadingsBanter => &[
                "\"Well? What do the readings say?\" {subj.pronoun} {subj.said}",
            ],

            Self::ComplimentAction => &[
                "\"Well done, {obj.name}!\" {subj.pronoun} {subj.said}",
                "\"{obj.name}, you saved us all,\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::OfferPromotion => &[
                "\"I'm promoting you to {obj.next_rank}!\" {subj.pronoun} {subj.said}",
            ],
            Self::OhYou => &[
                "\"Oh, you!\" {subj.pronoun} {subj.said} {subj.adverb}",
            ],
            Self::RefusePromotion => &[
                "\"I couldn't possibly accept, I'm happy just being {subj.rank},\" {subj.pronoun} {subj.said}",
            ],
            Self::Convalesce => &[
                "{subj.pronoun} <rested|put {subj.his} feet up|took a long hot bath>",
            ],
            Self::AllLaugh => &[
                "everyone laughed",
                "everyone <laughed|chuckled> <heartily|for a long time>",
            ],
        }
    }
}

/// Node kinds of a story tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryKind {
    Story,
    Scene,
    EventSequence,
    Paragraph,
    /// Two events rendered as one sentence joined by "and".
    Conjoined,
    Event(EventKind),
}

pub type StoryNode = Node<StoryKind>;

impl NodeKind for StoryKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Story => "Story",
            Self::Scene => "Scene",
            Self::EventSequence => "EventSequence",
            Self::Paragraph => "Paragraph",
            Self::Conjoined => "Conjoined",
            Self::Event(_) => "Event",
        }
    }

    fn roles(&self) -> &'static [Role] {
        match self {
            Self::Scene => &[Role::Setting],
            Self::Event(_) => &[Role::Subject, Role::Object, Role::Object2],
            _ => &[],
        }
    }

    fn is_sequence(&self) -> bool {
        matches!(self, Self::EventSequence | Self::Paragraph)
    }
}

impl StoryKind {
    pub fn event(&self) -> Option<EventKind> {
        match self {
            Self::Event(e) => Some(*e),
            _ => None,
        }
    }
}

/// A bare event node of `kind`.
pub fn event(kind: EventKind) -> StoryNode {
    Node::new(StoryKind::Event(kind))
}

/// Wraps beats in an event sequence.
pub fn sequence(children: Vec<StoryNode>) -> StoryNode {
    Node::parent(StoryKind::EventSequence, children)
}
