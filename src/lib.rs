//! Stochastic L-systems and turtle graphics for plotter line-art
//!
//! Grow a symbol string from a root with parallel, optionally stochastic
//! rewriting, then walk it with a turtle to get line segments and the exact
//! canvas they need. Rasterising, encoding and displaying the result is left
//! to you; the drawing comes out as plain [`geo_types`] geometry.
//!
//! ```rust
//! use aoer_lsystem::prelude::*;
//!
//! let (system, drawing) = RenderConfig::new(Preset::HexGosper)
//!     .with_generations(2)
//!     .render()
//!     .expect("Gosper curves are bracket free");
//! println!("{}", system);
//! assert!(drawing.width() > 0.0);
//! ```

/// Error types.
pub mod errors;

/// xorshift128 PRNG and the [`random::UnitSource`] seam the rewriter draws from.
pub mod random;

/// L-system implementation, with stochastic parallel rewriting
pub mod l_system;

/// Turtle graphics implementation, including the two pass interpreter
pub mod turtle;

/// Ready made systems from ABOP, plus a small render config.
pub mod presets;

/// Make your life easy! Just import prelude::* and go.
pub mod prelude {
    pub use crate::errors::TurtleError;
    pub use crate::l_system::{LSystem, Production};
    pub use crate::presets::{LineThickness, Preset, RenderConfig};
    pub use crate::random::{Seed, UnitSource, XorShift128};
    pub use crate::turtle::{degrees, interpret, measure, SymbolKind, Turtle, TurtleDescriptor, TurtleDrawing};
}
