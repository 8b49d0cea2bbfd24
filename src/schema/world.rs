/// World catalogs — the cast, settings, goons and macguffins a plot draws
/// on, plus the RON description they are built from.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::character::{Archetype, Character, Gender, Traits};
use super::object::{Object, ObjectRef, Rank};
use super::setting::Setting;
use crate::core::context::NarrativeContext;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("world has no settings")]
    NoSettings,
    #[error("world has no protagonists")]
    NoProtagonists,
    #[error("setting '{0}' is declared twice")]
    DuplicateSetting(String),
    #[error("'{by}' refers to unknown setting '{key}'")]
    UnknownSetting { key: String, by: String },
    #[error("setting '{0}' has no fixed scenery")]
    NoScenery(String),
    #[error("{0} has an empty name")]
    EmptyName(&'static str),
}

/// Read-only catalog consumed by the plotter and the lowering passes.
#[derive(Debug, Clone)]
pub struct World {
    pub protagonists: Vec<ObjectRef>,
    pub antagonists: Vec<ObjectRef>,
    pub goons: Vec<ObjectRef>,
    pub macguffins: Vec<ObjectRef>,
    /// The first setting is home.
    pub settings: Vec<ObjectRef>,
}

impl World {
    /// The first setting. Hand-assembled worlds may have none.
    pub fn home(&self) -> Result<&ObjectRef, WorldError> {
        self.settings.first().ok_or(WorldError::NoSettings)
    }

    /// Loads and builds a world from a RON file.
    pub fn load_from_ron(path: &Path, ctx: &mut NarrativeContext) -> Result<World, WorldError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents, ctx)
    }

    pub fn from_ron_str(source: &str, ctx: &mut NarrativeContext) -> Result<World, WorldError> {
        let spec: WorldSpec = ron::from_str(source)?;
        spec.build(ctx)
    }
}

/// A plain object as written in a world file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThingSpec {
    pub names: Vec<String>,
    #[serde(default)]
    pub takeable: bool,
    #[serde(default)]
    pub plural: bool,
    #[serde(default)]
    pub proper: bool,
}

impl ThingSpec {
    fn build(&self, what: &'static str) -> Result<ObjectRef, WorldError> {
        check_names(&self.names, what)?;
        let mut object = Object::thing(self.names.iter().cloned()).takeable(self.takeable);
        if self.plural {
            object = object.plural();
        }
        if self.proper {
            object = object.proper();
        }
        Ok(object.into_ref())
    }
}

fn default_indoors() -> bool {
    true
}

fn default_preposition() -> String {
    "on".to_string()
}

fn default_light() -> String {
    "light".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingSpec {
    /// Identifier other entries use to refer to this setting.
    pub key: String,
    pub names: Vec<String>,
    pub roof: ThingSpec,
    pub nearby: Vec<ThingSpec>,
    #[serde(default = "default_indoors")]
    pub indoors: bool,
    /// Key of an earlier setting this one opens out onto.
    #[serde(default)]
    pub outside: Option<String>,
    #[serde(default = "default_preposition")]
    pub preposition: String,
    #[serde(default)]
    pub has_drones: bool,
    #[serde(default = "default_light")]
    pub light: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterSpec {
    pub names: Vec<String>,
    pub gender: Gender,
    pub archetype: Archetype,
    #[serde(default)]
    pub rank: Option<Rank>,
    /// Key of the character's home setting.
    pub home: String,
    #[serde(default)]
    pub weapon: Option<ThingSpec>,
    /// Fixed traits; rolled from the archetype tables when absent.
    #[serde(default)]
    pub traits: Option<Traits>,
}

/// The serialized form of a [`World`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSpec {
    pub settings: Vec<SettingSpec>,
    pub protagonists: Vec<CharacterSpec>,
    #[serde(default)]
    pub antagonists: Vec<CharacterSpec>,
    #[serde(default)]
    pub goons: Vec<ThingSpec>,
    #[serde(default)]
    pub macguffins: Vec<ThingSpec>,
}

fn check_names(names: &[String], what: &'static str) -> Result<(), WorldError> {
    if names.is_empty() || names.iter().any(|n| n.trim().is_empty()) {
        return Err(WorldError::EmptyName(what));
    }
    Ok(())
}

impl WorldSpec {
    /// Resolves setting keys, rolls missing traits, and validates the result.
    pub fn build(&self, ctx: &mut NarrativeContext) -> Result<World, WorldError> {
        if self.settings.is_empty() {
            return Err(WorldError::NoSettings);
        }
        if self.protagonists.is_empty() {
            return Err(WorldError::NoProtagonists);
        }

        let mut keyed: Vec<(&str, ObjectRef)> = Vec::with_capacity(self.settings.len());
        for spec in &self.settings {
            if keyed.iter().any(|(k, _)| *k == spec.key) {
                return Err(WorldError::DuplicateSetting(spec.key.clone()));
            }
            check_names(&spec.names, "setting")?;

            let nearby = spec
                .nearby
                .iter()
                .map(|t| t.build("nearby object"))
                .collect::<Result<Vec<_>, _>>()?;
            let mut setting = Setting::new(spec.roof.build("roof")?, nearby);
            if !setting.has_scenery() {
                return Err(WorldError::NoScenery(spec.key.clone()));
            }
            setting.indoors = spec.indoors;
            setting.preposition = spec.preposition.clone();
            setting.has_drones = spec.has_drones;
            setting.light = spec.light.clone();
            if let Some(outside) = &spec.outside {
                let found = lookup(&keyed, outside, &spec.key)?;
                setting.outside = Some(found);
            }

            let object = Object::setting(spec.names.iter().cloned(), setting).into_ref();
            keyed.push((spec.key.as_str(), object));
        }

        let mut build_cast = |specs: &[CharacterSpec]| -> Result<Vec<ObjectRef>, WorldError> {
            specs
                .iter()
                .map(|spec| build_character(spec, &keyed, ctx))
                .collect()
        };
        let protagonists = build_cast(&self.protagonists)?;
        let antagonists = build_cast(&self.antagonists)?;

        let goons = self
            .goons
            .iter()
            .map(|t| t.build("goons"))
            .collect::<Result<Vec<_>, _>>()?;
        let macguffins = self
            .macguffins
            .iter()
            .map(|t| t.build("macguffin"))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(World {
            protagonists,
            antagonists,
            goons,
            macguffins,
            settings: keyed.into_iter().map(|(_, o)| o).collect(),
        })
    }
}

fn lookup(keyed: &[(&str, ObjectRef)], key: &str, by: &str) -> Result<ObjectRef, WorldError> {
    keyed
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, o)| o.clone())
        .ok_or_else(|| WorldError::UnknownSetting {
            key: key.to_string(),
            by: by.to_string(),
        })
}

fn build_character(
    spec: &CharacterSpec,
    keyed: &[(&str, ObjectRef)],
    ctx: &mut NarrativeContext,
) -> Result<ObjectRef, WorldError> {
    check_names(&spec.names, "character")?;
    let character = match &spec.traits {
        Some(traits) => Character::new(spec.gender, spec.archetype, traits.clone()),
        None => Character::rolled(spec.gender, spec.archetype, ctx),
    };
    let home = lookup(keyed, &spec.home, &spec.names[0])?;
    let mut object = Object::character(spec.names.iter().cloned(), character).with_home(home);
    if let Some(rank) = spec.rank {
        object = object.with_rank(rank);
    }
    if let Some(weapon) = &spec.weapon {
        object = object.with_weapon(weapon.build("weapon")?);
    }
    Ok(object.into_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"(
        settings: [
            (
                key: "bridge",
                names: ["bridge of the Stellar Dawn", "bridge"],
                roof: (names: ["ceiling"]),
                nearby: [
                    (names: ["captain's chair", "chair"]),
                    (names: ["space rock", "rock"], takeable: true),
                ],
                preposition: "on",
                has_drones: true,
            ),
            (
                key: "tunnel",
                names: ["service tunnel", "tunnel"],
                roof: (names: ["tunnel roof", "roof"]),
                nearby: [(names: ["pipe"])],
                outside: Some("bridge"),
                preposition: "in",
                light: "flickering glow",
            ),
        ],
        protagonists: [
            (names: ["Zara"], gender: Feminine, archetype: Lead, rank: Some(Ensign), home: "bridge"),
            (names: ["Kip"], gender: Masculine, archetype: Optimist, home: "bridge"),
        ],
        antagonists: [
            (names: ["Lord Vex"], gender: Masculine, archetype: Villain, home: "tunnel"),
        ],
        goons: [(names: ["Gloopians"], plural: true, proper: true)],
        macguffins: [(names: ["hyper crystal", "crystal"], takeable: true)],
    )"#;

    #[test]
    fn builds_and_links_settings() {
        let mut ctx = NarrativeContext::new(1);
        let world = World::from_ron_str(SMALL, &mut ctx).unwrap();
        assert_eq!(world.home().unwrap().name(), "bridge of the Stellar Dawn");
        let tunnel = world.settings[1].as_setting().unwrap();
        assert_eq!(tunnel.outside.as_ref().unwrap(), world.home().unwrap());
        assert_eq!(tunnel.light, "flickering glow");
        assert_eq!(world.antagonists[0].home().unwrap(), &world.settings[1]);
        assert_eq!(world.protagonists[0].rank(), Some(Rank::Ensign));
        assert!(world.protagonists[0].is_lead());
        assert!(world.goons[0].is_plural());
    }

    #[test]
    fn outside_must_be_declared_earlier() {
        let src = SMALL.replace("outside: Some(\"bridge\")", "outside: Some(\"brig\")");
        let err = World::from_ron_str(&src, &mut NarrativeContext::new(1)).unwrap_err();
        assert!(matches!(err, WorldError::UnknownSetting { ref key, .. } if key == "brig"));
    }

    #[test]
    fn settings_need_scenery() {
        let src = SMALL.replace(r#"nearby: [(names: ["pipe"])]"#, r#"nearby: [(names: ["wrench"], takeable: true)]"#);
        let err = World::from_ron_str(&src, &mut NarrativeContext::new(1)).unwrap_err();
        assert!(matches!(err, WorldError::NoScenery(ref key) if key == "tunnel"));
    }

    #[test]
    fn unknown_home_is_rejected() {
        let src = SMALL.replace(r#"home: "tunnel""#, r#"home: "moon""#);
        assert!(World::from_ron_str(&src, &mut NarrativeContext::new(1)).is_err());
    }

    #[test]
    fn malformed_ron_is_reported() {
        let err = World::from_ron_str("(settings: [", &mut NarrativeContext::new(1)).unwrap_err();
        assert!(matches!(err, WorldError::Ron(_)));
    }
}
