/// The chapter pipeline: plot → story → prose orchestration.
///
/// Wires together plot expansion and normalization, development
/// materialization, the lowering passes and rendering, and keeps the
/// per-run memory (introduced characters, used titles) between chapters.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::core::context::NarrativeContext;
use crate::core::develop::plot_to_story;
use crate::core::grammar::{capitalize, GrammarError};
use crate::core::lowering::{Editor, LoweringError};
use crate::core::plotter::{PlotConstraints, PlotError, Plotter};
use crate::core::render::{self, SCENE_BREAK};
use crate::schema::development::Development;
use crate::schema::event::StoryNode;
use crate::schema::object::ObjectRef;
use crate::schema::plot::{PlotNode, RuleKind};
use crate::schema::world::{World, WorldError};
use rustc_hash::FxHashSet;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("plot error: {0}")]
    Plot(#[from] PlotError),
    #[error("lowering error: {0}")]
    Lowering(#[from] LoweringError),
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),
    #[error("world error: {0}")]
    World(#[from] WorldError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("no world was given to the engine")]
    MissingWorld,
}

/// What a chapter run produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputMode {
    #[default]
    Prose,
    /// Stop after plotting and print one line per development.
    Synopsis,
    /// Stop after lowering and print the story tree.
    Dump,
}

fn default_depth() -> u32 {
    5
}

fn default_conjoin_chance() -> u32 {
    15
}

fn default_variety() -> bool {
    true
}

/// Tunable knobs, loadable from RON. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Expansion rounds.
    #[serde(default = "default_depth")]
    pub depth: u32,
    #[serde(default)]
    pub constraints: PlotConstraints,
    /// Rules that are never instantiated.
    #[serde(default)]
    pub disabled_rules: Vec<RuleKind>,
    /// Cap on regeneration; unbounded when absent.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub output: OutputMode,
    /// Percent chance that two conjoinable neighbours are joined.
    #[serde(default = "default_conjoin_chance")]
    pub conjoin_chance: u32,
    #[serde(default = "default_variety")]
    pub variety: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            constraints: PlotConstraints::default(),
            disabled_rules: Vec::new(),
            max_attempts: None,
            output: OutputMode::default(),
            conjoin_chance: default_conjoin_chance(),
            variety: default_variety(),
        }
    }
}

impl EngineConfig {
    pub fn load_from_ron(path: &Path) -> Result<Self, PipelineError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    pub fn from_ron_str(source: &str) -> Result<Self, PipelineError> {
        Ok(ron::from_str(source)?)
    }
}

/// One generated chapter.
#[derive(Debug, Clone)]
pub struct Chapter {
    pub title: String,
    pub plot: PlotNode,
    /// The lowered story; absent in synopsis mode.
    pub story: Option<StoryNode>,
    /// Prose, synopsis or tree dump depending on the output mode.
    pub text: String,
    /// Rendered prose per scene; empty unless writing prose.
    pub scenes: Vec<String>,
    pub word_count: usize,
}

const SEQUEL_PREFIXES: &[&str] = &[
    "The Return of ",
    "The Revenge of ",
    "The Scourge of ",
    "The Menace of ",
    "The Secret of ",
    "The Time of ",
    "The Mystery of ",
    "The Phantom of ",
];

const FALLBACK_TITLE: &str = "The Destiny of Fate";

/// The top-level narrative engine. Built via `NarrativeEngine::builder()`.
pub struct NarrativeEngine {
    world: World,
    config: EngineConfig,
    context: NarrativeContext,
    editor: Editor,
    used_titles: FxHashSet<String>,
}

/// Builder for constructing a `NarrativeEngine`.
#[derive(Default)]
pub struct NarrativeEngineBuilder {
    world: Option<World>,
    world_path: Option<PathBuf>,
    config: EngineConfig,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
}

impl NarrativeEngine {
    pub fn builder() -> NarrativeEngineBuilder {
        NarrativeEngineBuilder::default()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The seed that reproduces this run.
    pub fn seed(&self) -> u64 {
        self.context.seed()
    }

    /// Characters already described to the reader in this run.
    pub fn introduced(&self) -> &FxHashSet<ObjectRef> {
        self.editor.introduced()
    }

    /// Plots, lowers and renders one chapter.
    pub fn write_chapter(&mut self) -> Result<Chapter, PipelineError> {
        let plotter = Plotter::new(&self.world).with_disabled(self.config.disabled_rules.iter().copied());
        let plot = plotter.generate_acceptable_plot(
            &self.config.constraints,
            self.config.depth,
            self.config.max_attempts,
            &mut self.context,
        )?;

        if self.config.output == OutputMode::Synopsis {
            let text = render::render_synopsis(&plot, &mut self.context)?;
            let title = self.pick_title(&plot);
            return Ok(Chapter {
                title,
                word_count: render::word_count(&text),
                plot,
                story: None,
                text,
                scenes: Vec::new(),
            });
        }

        let story = plot_to_story(&plot, &mut self.context)?;
        let story = self.editor.edit(&story, &mut self.context)?;
        let title = self.pick_title(&plot);

        if self.config.output == OutputMode::Dump {
            let text = story.dump();
            return Ok(Chapter {
                title,
                word_count: render::word_count(&text),
                plot,
                story: Some(story),
                text,
                scenes: Vec::new(),
            });
        }

        let scenes = story
            .children()
            .iter()
            .map(|scene| Ok(render::proofread(&render::render_story(scene, &mut self.context)?)))
            .collect::<Result<Vec<_>, GrammarError>>()?;
        let text = scenes.join(SCENE_BREAK);
        let word_count = render::word_count(&text);
        info!(title = %title, scenes = scenes.len(), word_count, "chapter written");

        Ok(Chapter {
            title,
            plot,
            story: Some(story),
            text,
            scenes,
            word_count,
        })
    }

    /// Writes `count` chapters, stopping at the first failure.
    pub fn write_chapters(&mut self, count: usize) -> Result<Vec<Chapter>, PipelineError> {
        (0..count).map(|_| self.write_chapter()).collect()
    }

    /// Names the chapter after a kidnapper, a lost item or a vanquished
    /// foe, never reusing a title within the run.
    pub fn pick_title(&mut self, plot: &PlotNode) -> String {
        let candidates: BTreeSet<ObjectRef> = plot
            .descendants()
            .into_iter()
            .filter_map(|node| {
                let role = node.development().and_then(|d: Development| d.title_role())?;
                node.object_in(role).cloned()
            })
            .collect();
        let candidates: Vec<String> = candidates.iter().map(|o| o.definite()).collect();
        let base = self
            .context
            .choose(&candidates)
            .map(|t| capitalize(t))
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());

        let mut prefixes: VecDeque<String> = SEQUEL_PREFIXES.iter().map(|p| p.to_string()).collect();
        for a in SEQUEL_PREFIXES {
            for b in SEQUEL_PREFIXES {
                prefixes.push_back(format!("{a}{b}"));
            }
        }

        let mut title = base.clone();
        let mut sequel = 1;
        while self.used_titles.contains(&title) {
            title = match prefixes.pop_front() {
                Some(prefix) => format!("{prefix}{base}"),
                None => {
                    sequel += 1;
                    format!("{base} {sequel}")
                }
            };
        }
        self.used_titles.insert(title.clone());
        title
    }
}

impl NarrativeEngineBuilder {
    pub fn world(mut self, world: World) -> Self {
        self.world = Some(world);
        self
    }

    /// Loads the world from a RON file at build time.
    pub fn world_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.world_path = Some(path.into());
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads the configuration from a RON file at build time, replacing
    /// any knobs set so far.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.config.depth = depth;
        self
    }

    pub fn constraints(mut self, constraints: PlotConstraints) -> Self {
        self.config.constraints = constraints;
        self
    }

    pub fn disable_rule(mut self, rule: RuleKind) -> Self {
        self.config.disabled_rules.push(rule);
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = Some(attempts);
        self
    }

    pub fn output(mut self, output: OutputMode) -> Self {
        self.config.output = output;
        self
    }

    pub fn conjoin_chance(mut self, percent: u32) -> Self {
        self.config.conjoin_chance = percent;
        self
    }

    pub fn variety(mut self, enabled: bool) -> Self {
        self.config.variety = enabled;
        self
    }

    pub fn build(self) -> Result<NarrativeEngine, PipelineError> {
        let config = match &self.config_path {
            Some(path) => EngineConfig::load_from_ron(path)?,
            None => self.config,
        };

        let mut context = match self.seed {
            Some(seed) => NarrativeContext::new(seed),
            None => NarrativeContext::from_entropy(),
        };
        info!(seed = context.seed(), "narrative engine seeded");
        context.variety_mut().set_enabled(config.variety);

        let world = match (self.world, &self.world_path) {
            (Some(world), _) => world,
            (None, Some(path)) => World::load_from_ron(path, &mut context)?,
            (None, None) => return Err(PipelineError::MissingWorld),
        };

        Ok(NarrativeEngine {
            world,
            editor: Editor::new(config.conjoin_chance),
            config,
            context,
            used_titles: FxHashSet::default(),
        })
    }
}
