//! The l_system module provides a stochastic Lindenmayer fractal generator for
//! use with plotted line-art. Take a look at the [`crate::l_system::LSystem`]
//! struct for more details, and examples.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::errors::TurtleError;
use crate::random::{UnitSource, XorShift128};
use crate::turtle::{interpret, TurtleDescriptor, TurtleDrawing};

/// A single rewrite rule, `lhs → rhs`, applied with `probability`.
/// Deterministic rules have a probability of 1.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Production {
    lhs: char,
    rhs: String,
    probability: f64,
}

impl Production {
    pub fn new(lhs: char, rhs: impl Into<String>) -> Production {
        Production::stochastic(lhs, rhs, 1.0)
    }

    /// Probabilities for one `lhs` should add up to 1. Nothing checks this;
    /// any uncovered mass just leaves the symbol alone.
    pub fn stochastic(lhs: char, rhs: impl Into<String>, probability: f64) -> Production {
        Production {
            lhs,
            rhs: rhs.into(),
            probability,
        }
    }

    pub fn lhs(&self) -> char {
        self.lhs
    }

    pub fn rhs(&self) -> &str {
        &self.rhs
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

/// # LSystem
///
/// What it says on the box; a stochastic bracketed L-system for use with
/// plotter based fractal art. Productions for the same symbol are tried in
/// the order they were added, and the random source is owned by the system
/// so a fixed seed gives a fixed drawing.
///
/// # Example
///
/// ```rust
/// use aoer_lsystem::l_system::{LSystem, Production};
/// use aoer_lsystem::random::{Seed, XorShift128};
/// use aoer_lsystem::turtle::{degrees, TurtleDescriptor};
///
/// let mut gosper = LSystem::with_rng(XorShift128::new(Seed::Fixed(1)));
/// gosper.set_root("L");
/// gosper.add_production(Production::new('L', "L+R++R-L--LL-R+"));
/// gosper.add_production(Production::new('R', "-L+RR++R+L--L-R"));
/// gosper.generate(3);
///
/// let drawing = gosper
///     .interpret(&TurtleDescriptor::new(degrees(60.0), 12.0))
///     .expect("Gosper curves have no brackets to unbalance");
/// assert_eq!(drawing.to_multiline().0.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct LSystem<R = XorShift128> {
    rng: R,
    root: String,
    productions: Vec<Production>,
    rules: HashMap<char, Vec<usize>>,
    buffers: [String; 2],
    result: usize,
    generations: u32,
    stochastic: bool,
}

impl LSystem<XorShift128> {
    /// A clock-seeded system. Use [`LSystem::with_rng`] for reproducible runs.
    pub fn new() -> Self {
        LSystem::with_rng(XorShift128::default())
    }
}

impl Default for LSystem<XorShift128> {
    fn default() -> Self {
        LSystem::new()
    }
}

fn select<'a, R: UnitSource>(
    candidates: &[usize],
    productions: &'a [Production],
    rng: &mut R,
) -> Option<&'a Production> {
    let draw = rng.next_unit();
    let mut cumulative = 0.0;
    candidates
        .iter()
        .map(move |&i| &productions[i])
        .find(|production| {
            cumulative += production.probability;
            draw <= cumulative
        })
}

impl<R: UnitSource> LSystem<R> {
    pub fn with_rng(rng: R) -> Self {
        LSystem {
            rng,
            root: String::new(),
            productions: vec![],
            rules: HashMap::new(),
            buffers: [String::new(), String::new()],
            result: 0,
            generations: 0,
            stochastic: false,
        }
    }

    /// Access the owned random source, eg. to reseed between generations.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn set_root(&mut self, root: impl Into<String>) {
        self.root = root.into();
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn add_production(&mut self, production: Production) {
        if production.probability < 1.0 {
            self.stochastic = true;
        }
        self.rules
            .entry(production.lhs)
            .or_default()
            .push(self.productions.len());
        self.productions.push(production);
    }

    /// Builder flavoured [`LSystem::add_production`].
    pub fn with_production(mut self, production: Production) -> Self {
        self.add_production(production);
        self
    }

    /// All productions, in the order they were added.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// Productions for one symbol, in the order they are tried.
    pub fn productions_for(&self, lhs: char) -> impl Iterator<Item = &Production> + '_ {
        self.rules
            .get(&lhs)
            .into_iter()
            .flatten()
            .map(move |&i| &self.productions[i])
    }

    /// Forget the rules, root, generated strings and the stochastic flag.
    pub fn clear(&mut self) {
        self.root.clear();
        self.productions.clear();
        self.rules.clear();
        self.buffers.iter_mut().for_each(String::clear);
        self.result = 0;
        self.generations = 0;
        self.stochastic = false;
    }

    /// #generate
    ///
    /// Rewrites the root `n` times in parallel and returns generation `n`.
    /// Always restarts from the root. Every symbol that has productions draws
    /// exactly one sample from the random source, left to right, so the same
    /// seed gives the same string. If the drawn sample lands past the summed
    /// probabilities the symbol is copied unchanged.
    pub fn generate(&mut self, n: u32) -> &str {
        self.generations = n;
        let LSystem {
            rng,
            root,
            productions,
            rules,
            buffers,
            ..
        } = self;

        let productions: &[Production] = productions;
        let (front, back) = buffers.split_at_mut(1);
        let mut src = &mut front[0];
        let mut dest = &mut back[0];
        let mut current = 0;

        src.clear();
        src.push_str(root.as_str());

        for generation in 1..=n {
            dest.clear();
            for symbol in src.chars() {
                let applied = match rules.get(&symbol) {
                    Some(candidates) => select(candidates, productions, &mut *rng),
                    None => None,
                };
                match applied {
                    Some(production) => dest.push_str(&production.rhs),
                    None => dest.push(symbol),
                }
            }
            std::mem::swap(&mut src, &mut dest);
            current ^= 1;
            trace!(generation, symbols = src.len(), "rewrote generation");
        }

        self.result = current;
        debug!(
            generations = n,
            symbols = self.buffers[current].len(),
            stochastic = self.stochastic,
            "generated l-system string"
        );
        &self.buffers[current]
    }

    /// The string from the last [`LSystem::generate`] call.
    pub fn string(&self) -> &str {
        &self.buffers[self.result]
    }

    pub fn generations(&self) -> u32 {
        self.generations
    }

    pub fn is_stochastic(&self) -> bool {
        self.stochastic
    }

    /// Human readable listing of the root and the productions, one per line.
    /// Stochastic systems get a two decimal probability suffix.
    pub fn rule_string(&self) -> String {
        let mut out = format!("Root is {}\n", self.root);
        for production in &self.productions {
            out.push_str(&format!("{} \u{2192} {}", production.lhs, production.rhs));
            if self.stochastic {
                out.push_str(&format!(" ({:.2})", production.probability));
            }
            out.push('\n');
        }
        out
    }

    /// Walk the current string with a turtle. See [`crate::turtle::interpret`].
    pub fn interpret(&self, descriptor: &TurtleDescriptor) -> Result<TurtleDrawing, TurtleError> {
        interpret(self.string(), descriptor)
    }
}

impl<R: UnitSource> fmt::Display for LSystem<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} generations", self.rule_string(), self.generations)
    }
}
