/// Materializes plot developments into the narrative beats that tell them.
///
/// Participants stay bare objects here; the lowering passes later swap
/// them for per-moment states.
use super::context::NarrativeContext;
use super::plotter::PlotError;
use super::tree::{Node, Role, TreeError, Value};
use crate::schema::development::Development;
use crate::schema::event::{event, sequence, EventKind, StoryKind, StoryNode};
use crate::schema::object::{Object, ObjectRef};
use crate::schema::plot::PlotNode;

use crate::schema::event::EventKind as E;

fn by(kind: EventKind, subject: impl Into<Value>) -> Result<StoryNode, TreeError> {
    event(kind).with(Role::Subject, subject)
}

fn on(kind: EventKind, subject: impl Into<Value>, object: impl Into<Value>) -> Result<StoryNode, TreeError> {
    by(kind, subject)?.with(Role::Object, object)
}

/// Reads the roles of one development, reporting what is missing.
struct Cast<'a> {
    plot: &'a PlotNode,
    kind: Development,
}

impl<'a> Cast<'a> {
    fn missing(&self, role: Role) -> PlotError {
        PlotError::MissingRole {
            development: self.kind,
            role,
        }
    }

    fn one(&self, role: Role) -> Result<ObjectRef, PlotError> {
        self.plot.object_in(role).cloned().ok_or_else(|| self.missing(role))
    }

    /// The raw value, so groups stay groups.
    fn value(&self, role: Role) -> Result<Value, PlotError> {
        self.plot.get(role).cloned().ok_or_else(|| self.missing(role))
    }

    fn members(&self, role: Role) -> Vec<ObjectRef> {
        self.plot.members_of(role)
    }

    fn setting(&self) -> Result<ObjectRef, PlotError> {
        self.one(Role::Setting)
    }

    fn any(&self, role: Role, ctx: &mut NarrativeContext) -> Result<ObjectRef, PlotError> {
        ctx.choose(&self.members(role))
            .cloned()
            .ok_or_else(|| self.missing(role))
    }
}

/// The beats for one development, in telling order.
pub fn create_events(plot: &PlotNode, ctx: &mut NarrativeContext) -> Result<Vec<StoryNode>, PlotError> {
    let Some(kind) = plot.development() else {
        return Ok(Vec::new());
    };
    let cast = Cast { plot, kind };
    let subjects = cast.members(Role::Subject);

    let events = match kind {
        Development::Introduction => {
            let mut e = subjects
                .iter()
                .map(|s| by(E::BecomeHappy, s))
                .collect::<Result<Vec<_>, _>>()?;
            let mut seen: Vec<ObjectRef> = Vec::new();
            for s in &subjects {
                if seen.is_empty() || ctx.chance(66) {
                    let pose = if ctx.chance(85) {
                        E::PoseDescription
                    } else if ctx.chance(50) {
                        E::OutOfEggs
                    } else {
                        E::HyperCrystalUsage
                    };
                    e.push(by(pose, s)?);
                }
                if !seen.is_empty() && ctx.chance(66) {
                    if let Some(other) = ctx.choose(&seen).cloned() {
                        e.push(on(E::Greet, s, other)?);
                    }
                }
                seen.push(s.clone());
            }
            e
        }
        Development::ItemForeshadowed => {
            let holder = cast.one(Role::Subject)?;
            let item = cast.one(Role::Object)?;
            let asker = cast.any(Role::Bystanders, ctx)?;
            vec![sequence(vec![
                on(E::IntroduceItem, &holder, &item)?,
                on(E::AskAboutItem, &asker, &item)?,
                on(E::ReplyAboutItem, &holder, &asker)?,
            ])]
        }
        Development::ItemRecalled => {
            let holder = cast.one(Role::Subject)?;
            let item = cast.one(Role::Object)?;
            let asker = cast.any(Role::Bystanders, ctx)?;
            vec![sequence(vec![
                on(E::RememberItem, asker, holder)?.with(Role::Object2, item)?
            ])]
        }
        Development::Convalescence => {
            let mut e = Vec::new();
            let mut prots = subjects.clone();
            let lead = ctx.extract(&mut prots, |p| p.is_lead());
            let optimist = ctx.extract(&mut prots, |p| p.is_optimist());
            if let (Some(lead), Some(optimist)) = (lead, optimist) {
                e.push(on(E::ComplimentAction, &optimist, &lead)?);
                if lead.rank().and_then(|r| r.next()).is_some() {
                    e.push(on(E::OfferPromotion, &optimist, &lead)?);
                    e.push(on(E::OhYou, &lead, &optimist)?);
                    e.push(on(E::RefusePromotion, &lead, &optimist)?);
                }
            }
            for s in &subjects {
                e.push(sequence(vec![by(E::BecomeHappy, s)?, by(E::Convalesce, s)?]));
            }
            e
        }
        Development::AllLaugh => vec![event(E::AllLaugh)],
        Development::Kidnapping => {
            let perp = cast.one(Role::Subject)?;
            let abductee = cast.one(Role::Object)?;
            let bystanders = cast.members(Role::Bystanders);
            let duty = Object::rescue_duty(&abductee).into_ref();

            let mut e = vec![by(E::BecomeHappy, &perp)?, by(E::Appear, &perp)?];
            for b in bystanders.iter().chain(std::iter::once(&abductee)) {
                e.push(by(E::BecomeAngry, b)?);
            }
            let noticer = cast.any(Role::Bystanders, ctx)?;
            e.extend([
                on(E::NoticeAntagonist, noticer, &perp)?,
                by(E::Cackle, &perp)?,
                by(E::AntagonistBanter, &perp)?,
                on(E::Abduct, &perp, &abductee)?,
                on(E::Disappear, &perp, &abductee)?,
            ]);
            for b in &bystanders {
                e.push(sequence(vec![
                    by(E::BecomeAngry, b)?,
                    by(E::Panic, b)?,
                    on(E::AcquireDuty, b, &duty)?,
                ]));
            }
            e
        }
        Development::LocateAbductee => {
            let abductee = cast.one(Role::Object)?;
            let location = cast.one(Role::Object2)?;
            let mut searchers = subjects.clone();
            let b = match ctx.extract(&mut searchers, |p| p.is_lead()) {
                Some(lead) => lead,
                None => ctx
                    .extract(&mut searchers, |_| true)
                    .ok_or_else(|| cast.missing(Role::Subject))?,
            };
            let a = ctx.extract(&mut searchers, |_| true).unwrap_or_else(|| b.clone());
            let at_home = a.home() == Some(&cast.setting()?);
            vec![
                on(E::WeMustFindThem, &a, &abductee)?,
                on(E::LocationHunch, &b, &abductee)?.with(Role::Object2, &location)?,
                on(if at_home { E::SetCourse } else { E::WeMustGoTo }, &a, &location)?,
            ]
        }
        Development::WayBlocked => {
            let mut party = subjects.clone();
            let a = ctx
                .extract(&mut party, |_| true)
                .ok_or_else(|| cast.missing(Role::Subject))?;
            let mut e = vec![by(E::BumpIntoForceField, &a)?, by(E::BecomeSad, &a)?];
            if let Some(b) = ctx.extract(&mut party, |_| true) {
                e.push(sequence(vec![
                    by(E::WhatWasThat, &b)?,
                    by(E::BumpIntoForceField, &b)?,
                    by(E::BecomeSad, &b)?,
                ]));
            }
            e.push(by(E::MustRetraceSteps, &a)?);
            e.push(by(E::StateDuty, &a)?);
            e
        }
        Development::Rescue => {
            let rescuers = cast.value(Role::Subject)?;
            let abductee = cast.one(Role::Object)?;
            let duty = Object::rescue_duty(&abductee).into_ref();
            let mut e = vec![
                by(E::KeepMoving, cast.any(Role::Subject, ctx)?)?,
                by(E::TurnCorner, rescuers.clone())?,
                by(E::BehindBars, &abductee)?,
                on(E::Rescue, rescuers, &abductee)?,
                by(E::BecomeHappy, &abductee)?,
            ];
            for s in &subjects {
                e.push(on(E::RelieveDuty, s, &duty)?);
            }
            for s in &subjects {
                e.push(sequence(vec![on(E::Thank, &abductee, s)?, by(E::BecomeHappy, s)?]));
            }
            e
        }
        Development::LoseItem => {
            let s = cast.one(Role::Subject)?;
            let item = cast.one(Role::Object)?;
            let duty = Object::retrieve_duty(&item).into_ref();
            let mut e = vec![
                by(E::LookAround, &s)?,
                on(E::Hold, &s, &item)?,
                by(E::Trip, &s)?,
                on(E::Drop, &s, &item)?,
                by(E::Lose, &item)?,
                by(E::BecomeEmbarrassed, &s)?,
                by(E::Oops, &s)?,
                on(E::AcquireDuty, &s, &duty)?,
            ];
            for b in cast.members(Role::Bystanders) {
                let react = if ctx.chance(50) { E::LookAt } else { E::GestureAt };
                e.push(by(E::BecomeSad, &b)?);
                e.push(on(E::AcquireDuty, &b, &duty)?);
                e.push(on(react, &b, &s)?);
            }
            e
        }
        Development::RecoverItem => {
            let s = cast.one(Role::Subject)?;
            let item = cast.one(Role::Object)?;
            let duty = Object::retrieve_duty(&item).into_ref();
            let setting = cast.setting()?;
            let mut e = vec![by(E::LookAround, &s)?, by(E::Hunch, &s)?];
            if let Some(scenery) = setting.as_setting().and_then(|st| st.nearby_scenery(ctx)) {
                e.push(on(E::LookBehind, &s, scenery)?);
            }
            e.extend([
                on(E::Find, &s, &item)?,
                on(E::RelieveDuty, &s, &duty)?,
                by(E::BecomeHappy, &s)?,
            ]);
            let bystanders = cast.members(Role::Bystanders);
            for b in &bystanders {
                e.push(sequence(vec![on(E::RelieveDuty, b, &duty)?, by(E::BecomeHappy, b)?]));
            }
            if let Some(b) = ctx.choose(&bystanders) {
                e.push(by(E::Relief, b)?);
            }
            e
        }
        Development::TrappedInRubble => {
            let s = cast.one(Role::Subject)?;
            let roof = cast
                .setting()?
                .as_setting()
                .map(|st| st.roof.clone())
                .ok_or_else(|| cast.missing(Role::Setting))?;
            let duty = Object::rescue_duty(&s).into_ref();
            let mut e = vec![
                event(E::RumblingSound),
                by(E::WhatWasThatNoise, cast.any(Role::Bystanders, ctx)?)?,
                by(E::CaveIn, roof)?,
                by(E::Stunned, &s)?,
                by(E::BuriedUnderRubble, &s)?,
                by(E::BecomeSad, &s)?,
            ];
            for b in cast.members(Role::Bystanders) {
                e.push(sequence(vec![
                    by(E::BecomeSad, &b)?,
                    by(E::Panic, &b)?,
                    on(E::AcquireDuty, &b, &duty)?,
                ]));
            }
            e
        }
        Development::ExtractedFromRubble => {
            let trapped = cast.one(Role::Object)?;
            let duty = Object::rescue_duty(&trapped).into_ref();
            let mut e = Vec::new();
            for s in &subjects {
                e.push(sequence(vec![by(E::WasteNoTime, s)?, on(E::DigOut, s, &trapped)?]));
            }
            e.push(by(E::BecomeHappy, &trapped)?);
            for s in &subjects {
                e.push(sequence(vec![
                    on(E::Thank, &trapped, s)?,
                    by(E::BecomeHappy, s)?,
                    on(E::RelieveDuty, s, &duty)?,
                ]));
            }
            e
        }
        Development::GoonAmbush | Development::GoonEncounter => {
            let party = cast.value(Role::Subject)?;
            let goons = cast.one(Role::Object)?;
            let mut e = if kind == Development::GoonAmbush {
                vec![on(E::Attack, &goons, party)?]
            } else {
                vec![
                    on(E::Encounter, &goons, party)?,
                    on(E::GoonBanter, cast.any(Role::Subject, ctx)?, &goons)?,
                    by(E::GoonParley, &goons)?,
                ]
            };
            let angry = subjects
                .iter()
                .map(|s| by(E::BecomeAngry, s))
                .collect::<Result<Vec<_>, _>>()?;
            e.push(sequence(angry));
            e.push(sequence(vec![event(E::GenericBattle)]));
            e
        }
        Development::ProtagonistAttack => {
            let goons = cast.one(Role::Object)?;
            let armed: Vec<ObjectRef> = subjects.iter().filter(|s| s.weapon().is_some()).cloned().collect();
            match ctx.choose(&armed).cloned() {
                Some(s) => {
                    let weapon = s.weapon().cloned().ok_or_else(|| cast.missing(Role::Subject))?;
                    vec![sequence(vec![
                        by(E::WarCry, &s)?,
                        on(E::Unsheathe, &s, &weapon)?,
                        on(E::LiftWeapon, &s, &weapon)?,
                        on(E::BringDownWeapon, &s, &weapon)?,
                        on(E::WeaponContact, &weapon, &goons)?,
                        by(E::FlyAcross, &goons)?,
                    ])]
                }
                None => {
                    let s = cast.any(Role::Subject, ctx)?;
                    vec![sequence(vec![by(E::WarCry, &s)?, by(E::RushIntoFray, &s)?])]
                }
            }
        }
        Development::AwkwardCombat => {
            let goons = cast.one(Role::Object)?;
            let mut pair = subjects.clone();
            let lead = ctx
                .extract(&mut pair, |p| p.is_lead())
                .ok_or_else(|| cast.missing(Role::Subject))?;
            let dreamboat = ctx
                .extract(&mut pair, |p| p.is_dreamboat())
                .ok_or_else(|| cast.missing(Role::Subject))?;
            vec![sequence(vec![
                on(E::TryToGetBehind, &lead, &goons)?,
                on(E::BumpIntoAwkwardly, &lead, &dreamboat)?,
                on(E::LookAt, &dreamboat, &lead)?,
                by(E::Blush, &lead)?,
                by(E::BecomeEmbarrassed, &lead)?,
                by(E::RushIntoFray, &dreamboat)?,
            ])]
        }
        Development::Vanquished => {
            let goons = cast.one(Role::Object)?;
            let villain = cast.one(Role::Object2)?;
            let mut e = vec![
                by(E::AfterBattle, &goons)?,
                sequence(vec![by(E::AfterBattleBanter, cast.any(Role::Subject, ctx)?)?]),
            ];
            for s in &subjects {
                e.push(by(E::BecomeHappy, s)?);
            }
            let mut party = subjects.clone();
            let a = ctx
                .extract(&mut party, |_| true)
                .ok_or_else(|| cast.missing(Role::Subject))?;
            let b = ctx.extract(&mut party, |p| !p.is_optimist());
            e.push(sequence(vec![
                by(E::BecomeAngry, &villain)?,
                on(E::ObserveAfterBattle, &a, &goons)?.with(Role::Object2, &villain)?,
                by(E::RemindReport, &a)?,
            ]));
            if let Some(b) = b {
                e.push(sequence(vec![by(E::BecomeSad, &b)?, by(E::IfWeGetHome, &b)?]));
            }
            e
        }
        Development::AwkwardTension => {
            let a = cast.one(Role::Subject)?;
            let b = cast.one(Role::Object)?;
            vec![
                by(E::BecomeEmbarrassed, &a)?,
                on(E::PullAside, &a, &b)?,
                on(E::WantToTalkToYou, &a, &b)?,
                on(E::WhatIsIt, &b, &a)?,
                on(E::RecallPastEvent, &a, &b)?,
                by(E::BecomeEmbarrassed, &b)?,
                by(E::Blush, &b)?,
                on(E::SayNoMore, &b, &a)?,
                by(E::BecomeSad, &a)?,
                by(E::BecomeHappy, &b)?,
            ]
        }
        Development::RomanticTension => {
            let a = cast.one(Role::Subject)?;
            let b = cast.one(Role::Object)?;
            let mut e = vec![
                by(E::BecomeEmbarrassed, &a)?,
                on(E::PullAside, &a, &b)?,
                on(E::WantToTalkToYou, &a, &b)?,
                on(E::WhatIsIt, &b, &a)?,
            ];
            loop {
                e.push(sequence(vec![
                    on(E::Fidget, &a, &b)?,
                    by(E::BecomeEmbarrassed, &b)?,
                    on(E::WhatIsIt, &b, &a)?,
                    on(E::FacesCloseTogether, &b, &a)?,
                ]));
                if ctx.chance(33) {
                    break;
                }
            }
            e.push(on(E::PreludeToKiss, &a, &b)?);
            e
        }
        Development::RomanticResolution => {
            let a = cast.one(Role::Subject)?;
            let b = cast.one(Role::Object)?;
            vec![
                by(E::BecomeHappy, &a)?,
                by(E::BecomeHappy, &b)?,
                on(E::PullAside, &a, &b)?,
                on(E::WhatIsIt, &b, &a)?,
                on(E::MushyStuff, &a, &b)?,
                on(E::OhYou, &b, &a)?,
                on(E::Kiss, &b, &a)?,
                on(E::AndTheyKissed, &b, &a)?,
                on(E::OhYou, &b, &a)?,
            ]
        }
        Development::Drone => {
            let s = cast.one(Role::Subject)?;
            vec![
                by(E::Drone, &s)?,
                by(E::BecomeAngry, &s)?,
                by(E::WhatWasThat, &s)?,
                by(E::Emote, &s)?,
            ]
        }
        Development::ContemplateItem => {
            let s = cast.one(Role::Subject)?;
            let item = cast.one(Role::Object)?;
            vec![
                on(E::PickUp, &s, &item)?,
                on(E::Hold, &s, &item)?,
                on(E::Contemplate, &s, &item)?,
                by(E::BecomeSad, &s)?,
            ]
        }
        Development::Journey => vec![on(E::TravelTo, cast.value(Role::Subject)?, cast.one(Role::Object)?)?],
        Development::EncounterNewSetting => {
            let mut party = subjects.clone();
            let snarker = ctx.extract(&mut party, |p| !p.is_optimist());
            let reader = ctx.extract(&mut party, |_| true);
            match (snarker, reader) {
                (Some(snarker), reader) => {
                    let mut e = vec![sequence(vec![
                        by(E::BecomeSad, &snarker)?,
                        by(E::CommentOnPlace, &snarker)?,
                    ])];
                    if let Some(reader) = reader {
                        e.push(sequence(vec![
                            by(E::TakeReadings, &reader)?,
                            by(E::ReadingsBanter, &snarker)?,
                        ]));
                    }
                    e
                }
                (None, Some(reader)) => vec![by(E::TakeReadings, &reader)?],
                (None, None) => Vec::new(),
            }
        }
    };
    Ok(events)
}

/// One scene per development, in plot order, each holding that
/// development's beats.
pub fn plot_to_story(plot: &PlotNode, ctx: &mut NarrativeContext) -> Result<StoryNode, PlotError> {
    let flat = plot.flatten();
    let mut scenes = Vec::new();
    for point in flat.developments() {
        let setting = point.setting().ok_or(PlotError::MissingRole {
            development: point.development().unwrap_or(Development::Introduction),
            role: Role::Setting,
        })?;
        let events = create_events(point, ctx)?;
        scenes.push(Node::parent(StoryKind::Scene, vec![sequence(events)]).with(Role::Setting, setting)?);
    }
    Ok(Node::parent(StoryKind::Story, scenes))
}
