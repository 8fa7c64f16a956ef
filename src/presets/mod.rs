//! A handful of ready made L-systems from "The Algorithmic Beauty of Plants"
//! (ABOP), with the generation counts and turtle settings that make them look
//! right. Handy for demos, and for checking that nothing has drifted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::TurtleError;
use crate::l_system::{LSystem, Production};
use crate::random::{Seed, UnitSource, XorShift128};
use crate::turtle::{degrees, TurtleDescriptor, TurtleDrawing};

/// Stroke weight for the drawing.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineThickness {
    #[default]
    Thin,
    Thick,
}

impl LineThickness {
    pub fn pen_width(&self) -> f64 {
        match self {
            LineThickness::Thin => 1.0,
            LineThickness::Thick => 2.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Preset {
    /// ABOP Fig. 1.24a
    PlantA,
    /// ABOP Fig. 1.24b
    PlantB,
    /// ABOP Fig. 1.24c
    PlantC,
    /// ABOP Fig. 1.24d
    PlantD,
    /// ABOP Fig. 1.24e
    PlantE,
    /// ABOP Fig. 1.24f
    PlantF,
    /// ABOP Fig. 1.27, the only stochastic one here.
    #[default]
    Branching,
    /// ABOP Fig. 1.11a
    HexGosper,
}

impl Preset {
    pub const ALL: [Preset; 8] = [
        Preset::PlantA,
        Preset::PlantB,
        Preset::PlantC,
        Preset::PlantD,
        Preset::PlantE,
        Preset::PlantF,
        Preset::Branching,
        Preset::HexGosper,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Preset::PlantA => "Plant-like (Fig. 1.24a)",
            Preset::PlantB => "Plant-like (Fig. 1.24b)",
            Preset::PlantC => "Plant-like (Fig. 1.24c)",
            Preset::PlantD => "Plant-like (Fig. 1.24d)",
            Preset::PlantE => "Plant-like (Fig. 1.24e)",
            Preset::PlantF => "Plant-like (Fig. 1.24f)",
            Preset::Branching => "Stochastic branching (Fig. 1.27)",
            Preset::HexGosper => "Hexagonal Gosper curve (Fig. 1.11a)",
        }
    }

    pub fn root(&self) -> &'static str {
        match self {
            Preset::PlantA | Preset::PlantB | Preset::PlantC | Preset::Branching => "F",
            Preset::PlantD | Preset::PlantE | Preset::PlantF => "X",
            Preset::HexGosper => "L",
        }
    }

    /// Productions in the order they should be added.
    pub fn productions(&self) -> Vec<Production> {
        match self {
            Preset::PlantA => vec![Production::new('F', "F[+F]F[-F]F")],
            Preset::PlantB => vec![Production::new('F', "F[+F]F[-F][F]")],
            Preset::PlantC => vec![Production::new('F', "FF-[-F+F+F]+[+F-F-F]")],
            Preset::PlantD => vec![
                Production::new('X', "F[+X]F[-X]+X"),
                Production::new('F', "FF"),
            ],
            Preset::PlantE => vec![
                Production::new('X', "F[+X][-X]FX"),
                Production::new('F', "FF"),
            ],
            Preset::PlantF => vec![
                Production::new('X', "F-[[X]+X]+F[+FX]-X"),
                Production::new('F', "FF"),
            ],
            Preset::Branching => vec![
                Production::stochastic('F', "F[+F]F[-F]F", 0.33),
                Production::stochastic('F', "F[+F]F", 0.33),
                Production::stochastic('F', "F[-F]F", 0.34),
            ],
            Preset::HexGosper => vec![
                Production::new('L', "L+R++R-L--LL-R+"),
                Production::new('R', "-L+RR++R+L--L-R"),
            ],
        }
    }

    pub fn generations(&self) -> u32 {
        match self {
            Preset::PlantD | Preset::PlantE => 7,
            Preset::Branching => 6,
            _ => 5,
        }
    }

    /// Turn angle (radians) and step length.
    pub fn descriptor(&self, thickness: LineThickness) -> TurtleDescriptor {
        let (angle, length) = match self {
            Preset::PlantA => (degrees(22.7), 8.0),
            Preset::PlantB => (degrees(20.0), 20.0),
            Preset::PlantC => (degrees(22.5), 12.0),
            Preset::PlantD => (degrees(20.0), 5.0),
            Preset::PlantE => (degrees(25.7), 5.0),
            Preset::PlantF => (degrees(22.5), 16.0),
            Preset::Branching => (0.37, 8.0),
            Preset::HexGosper => (degrees(60.0), 12.0),
        };
        TurtleDescriptor::new(angle, length).with_pen_width(thickness.pen_width())
    }

    /// Replace whatever `system` held with this preset's root and rules.
    pub fn configure<R: UnitSource>(&self, system: &mut LSystem<R>) {
        system.clear();
        system.set_root(self.root());
        for production in self.productions() {
            system.add_production(production);
        }
    }

    pub fn build(&self, seed: impl Into<Seed>) -> LSystem {
        let mut system = LSystem::with_rng(XorShift128::new(seed));
        self.configure(&mut system);
        system
    }
}

/// Everything needed to turn a preset into a drawing. Serde friendly, so a
/// demo can take one from the command line as RON.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
#[serde(default)]
pub struct RenderConfig {
    pub preset: Preset,
    pub thickness: LineThickness,
    pub seed: Seed,
    /// Overrides the preset's own generation count.
    pub generations: Option<u32>,
}

impl RenderConfig {
    pub fn new(preset: Preset) -> RenderConfig {
        RenderConfig {
            preset,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: impl Into<Seed>) -> Self {
        self.seed = seed.into();
        self
    }

    pub fn with_thickness(mut self, thickness: LineThickness) -> Self {
        self.thickness = thickness;
        self
    }

    pub fn with_generations(mut self, generations: u32) -> Self {
        self.generations = Some(generations);
        self
    }

    pub fn generations(&self) -> u32 {
        self.generations.unwrap_or_else(|| self.preset.generations())
    }

    /// Build, generate and interpret. Hands back the system too, so callers
    /// can show its rule string.
    pub fn render(&self) -> Result<(LSystem, TurtleDrawing), TurtleError> {
        let mut system = self.preset.build(self.seed);
        system.generate(self.generations());
        let drawing = system.interpret(&self.preset.descriptor(self.thickness))?;
        debug!(preset = self.preset.label(), segments = drawing.segments().len(), "rendered preset");
        Ok((system, drawing))
    }
}
