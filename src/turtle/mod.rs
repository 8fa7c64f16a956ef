//! # Turtle Module
//!
//! This provides logo-style turtle features for walking L-system strings.
//! The canvas is y-down, and a heading of 0 points up the page.

use geo::BoundingRect;
use geo_types::{coord, Coord, Line, LineString, MultiLineString, Rect};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::TurtleError;

/// Helper function to convert degrees to radians
pub fn degrees(deg: f64) -> f64 {
    std::f64::consts::PI * (deg / 180.0)
}

/// What a single symbol means to the turtle. Anything that isn't drawing,
/// turning or branching is [`SymbolKind::Inert`], so grammar-only helper
/// symbols (like the `X` in plant systems) pass straight through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Forward,
    TurnLeft,
    TurnRight,
    Push,
    Pop,
    Inert,
}

impl From<char> for SymbolKind {
    fn from(symbol: char) -> Self {
        match symbol {
            'F' | 'L' | 'R' => SymbolKind::Forward,
            '+' => SymbolKind::TurnLeft,
            '-' => SymbolKind::TurnRight,
            '[' => SymbolKind::Push,
            ']' => SymbolKind::Pop,
            _ => SymbolKind::Inert,
        }
    }
}

/// Start state and step sizes for one drawing.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TurtleDescriptor {
    /// Where the turtle starts, before the drawing is moved onto its canvas.
    pub start: Coord<f64>,
    /// Turn per `+`/`-`, in radians.
    pub angle_delta: f64,
    /// Initial step length.
    pub length: f64,
    /// Applied to the step length on every `[`.
    pub length_multiplier: f64,
    pub pen_width: f64,
}

impl Default for TurtleDescriptor {
    fn default() -> Self {
        TurtleDescriptor {
            start: coord! {x: 0.0, y: 0.0},
            angle_delta: 0.0,
            length: 8.0,
            length_multiplier: 1.0,
            pen_width: 1.0,
        }
    }
}

impl TurtleDescriptor {
    /// `angle_delta` is in radians; see [`degrees`].
    pub fn new(angle_delta: f64, length: f64) -> TurtleDescriptor {
        TurtleDescriptor {
            angle_delta,
            length,
            ..Default::default()
        }
    }

    pub fn with_start(mut self, start: Coord<f64>) -> Self {
        self.start = start;
        self
    }

    pub fn with_length_multiplier(mut self, length_multiplier: f64) -> Self {
        self.length_multiplier = length_multiplier;
        self
    }

    pub fn with_pen_width(mut self, pen_width: f64) -> Self {
        self.pen_width = pen_width;
        self
    }
}

/// Saved on `[`, restored on `]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackFrame {
    pub position: Coord<f64>,
    pub heading: f64,
    pub length: f64,
}

/// The turtle state machine: position, heading, step length and a stack of
/// saved frames for branches.
#[derive(Clone, Debug)]
pub struct Turtle {
    stack: Vec<StackFrame>,
    position: Coord<f64>,
    heading: f64,
    length: f64,
}

impl Turtle {
    pub fn new(start: Coord<f64>, length: f64) -> Turtle {
        Turtle {
            stack: vec![],
            position: start,
            heading: 0.0,
            length,
        }
    }

    /// Step forward by the current length, returning the line walked.
    pub fn fwd(&mut self) -> Line<f64> {
        let from = self.position;
        self.position = from
            + coord! {
                x: self.length * self.heading.sin(),
                y: -self.length * self.heading.cos(),
            };
        Line::new(from, self.position)
    }

    pub fn left(&mut self, angle: f64) {
        self.heading -= angle;
    }

    pub fn right(&mut self, angle: f64) {
        self.heading += angle;
    }

    /// Save the current frame, then scale the step length for the branch.
    pub fn push(&mut self, length_multiplier: f64) {
        self.stack.push(StackFrame {
            position: self.position,
            heading: self.heading,
            length: self.length,
        });
        self.length *= length_multiplier;
    }

    /// Restore the last saved frame. `None` means the stack was already empty
    /// and nothing changed.
    pub fn pop(&mut self) -> Option<StackFrame> {
        let frame = self.stack.pop()?;
        self.position = frame.position;
        self.heading = frame.heading;
        self.length = frame.length;
        Some(frame)
    }

    pub fn position(&self) -> Coord<f64> {
        self.position
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Walk a whole symbol sequence, handing every drawn line to `emit`.
    /// Returns the number of branches still open at the end.
    pub fn walk<F>(
        &mut self,
        symbols: &[SymbolKind],
        descriptor: &TurtleDescriptor,
        mut emit: F,
    ) -> Result<usize, TurtleError>
    where
        F: FnMut(Line<f64>),
    {
        for (index, symbol) in symbols.iter().enumerate() {
            match symbol {
                SymbolKind::Forward => emit(self.fwd()),
                SymbolKind::TurnLeft => self.left(descriptor.angle_delta),
                SymbolKind::TurnRight => self.right(descriptor.angle_delta),
                SymbolKind::Push => self.push(descriptor.length_multiplier),
                SymbolKind::Pop => {
                    self.pop().ok_or(TurtleError::PoppedEmptyStack { index })?;
                }
                SymbolKind::Inert => {}
            }
        }
        Ok(self.depth())
    }
}

fn resolve(lpath: &str) -> Vec<SymbolKind> {
    lpath.chars().map(SymbolKind::from).collect()
}

/// Running min/max of every point the turtle visits.
#[derive(Clone, Copy, Debug)]
struct Extent {
    min: Coord<f64>,
    max: Coord<f64>,
}

impl Extent {
    fn at(point: Coord<f64>) -> Extent {
        Extent {
            min: point,
            max: point,
        }
    }

    fn include(&mut self, point: Coord<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Snap outwards to whole pixels and pad the right and bottom edges by
    /// half the pen width so strokes on the edge aren't clipped.
    fn canvas(&self, pen_width: f64) -> Rect<f64> {
        let pad = (pen_width.max(0.0) / 2.0).ceil();
        Rect::new(
            coord! {x: self.min.x.floor(), y: self.min.y.floor()},
            coord! {x: self.max.x.ceil() + pad, y: self.max.y.ceil() + pad},
        )
    }
}

fn measure_symbols(
    symbols: &[SymbolKind],
    descriptor: &TurtleDescriptor,
) -> Result<Rect<f64>, TurtleError> {
    let mut extent = Extent::at(descriptor.start);
    Turtle::new(descriptor.start, descriptor.length).walk(symbols, descriptor, |line| {
        extent.include(line.end)
    })?;
    Ok(extent.canvas(descriptor.pen_width))
}

/// First pass only: the canvas rectangle, in the descriptor's own coordinates,
/// that [`interpret`] would draw into.
pub fn measure(lpath: &str, descriptor: &TurtleDescriptor) -> Result<Rect<f64>, TurtleError> {
    measure_symbols(&resolve(lpath), descriptor)
}

/// # interpret
///
/// Walks `lpath` twice with identical turtle logic. The first pass measures
/// the canvas, the second draws with the start translated so the canvas'
/// top-left corner lands on the origin. The result is the minimal canvas no
/// matter how far the shape strays from its start.
///
/// A `]` without a matching `[` fails with [`TurtleError::PoppedEmptyStack`].
///
/// # Example
///
/// ```rust
/// use aoer_lsystem::turtle::{interpret, degrees, TurtleDescriptor};
///
/// let drawing = interpret("F[+F]F[-F]F", &TurtleDescriptor::new(degrees(25.0), 10.0))
///     .expect("Balanced brackets");
/// assert_eq!(drawing.segments().len(), 5);
/// assert_eq!(drawing.bounds().min().x, 0.0);
/// assert!(interpret("F]", &TurtleDescriptor::default()).is_err());
/// ```
pub fn interpret(lpath: &str, descriptor: &TurtleDescriptor) -> Result<TurtleDrawing, TurtleError> {
    let symbols = resolve(lpath);
    let canvas = measure_symbols(&symbols, descriptor)?;

    let shift = canvas.min();
    let forward = symbols.iter().filter(|s| **s == SymbolKind::Forward).count();
    let mut segments = Vec::with_capacity(forward);
    let open_branches = Turtle::new(descriptor.start, descriptor.length).walk(
        &symbols,
        descriptor,
        |line| segments.push(Line::new(line.start - shift, line.end - shift)),
    )?;

    if open_branches > 0 {
        warn!(open_branches, "turtle finished with unclosed branches");
    }
    debug!(
        symbols = symbols.len(),
        segments = segments.len(),
        width = canvas.width(),
        height = canvas.height(),
        "interpreted turtle path"
    );

    Ok(TurtleDrawing {
        segments,
        bounds: Rect::new(
            coord! {x: 0.0, y: 0.0},
            coord! {x: canvas.width(), y: canvas.height()},
        ),
        origin: descriptor.start - shift,
        open_branches,
    })
}

/// Output of [`interpret`]: line segments in drawing order, in canvas
/// coordinates, and the canvas they fit in.
#[derive(Clone, Debug, PartialEq)]
pub struct TurtleDrawing {
    segments: Vec<Line<f64>>,
    bounds: Rect<f64>,
    origin: Coord<f64>,
    open_branches: usize,
}

impl TurtleDrawing {
    pub fn segments(&self) -> &[Line<f64>] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<Line<f64>> {
        self.segments
    }

    /// The canvas, always anchored at (0, 0), including the pen padding.
    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    pub fn height(&self) -> f64 {
        self.bounds.height()
    }

    /// Where the turtle's start point ended up on the canvas.
    pub fn origin(&self) -> Coord<f64> {
        self.origin
    }

    /// Number of `[` never closed by a `]`. Zero for a well formed string.
    pub fn open_branches(&self) -> usize {
        self.open_branches
    }

    /// Bounds of the strokes themselves, without pixel snapping or pen padding.
    pub fn tight_bounds(&self) -> Option<Rect<f64>> {
        self.to_multiline().bounding_rect()
    }

    /// Chain consecutive connected segments into polylines. Each branch
    /// restore starts a new line.
    pub fn to_multiline(&self) -> MultiLineString<f64> {
        let mut lines: Vec<Vec<Coord<f64>>> = vec![];
        for segment in &self.segments {
            match lines.last_mut() {
                Some(line) if line.last() == Some(&segment.start) => line.push(segment.end),
                _ => lines.push(vec![segment.start, segment.end]),
            }
        }
        lines.into_iter().map(LineString::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::l_system::{LSystem, Production};
    use crate::random::{Seed, XorShift128};

    const EPSILON: f64 = 0.0001;

    fn close(a: Coord<f64>, b: Coord<f64>) -> bool {
        (a.x - b.x).abs() <= EPSILON && (a.y - b.y).abs() <= EPSILON
    }

    #[test]
    fn test_symbol_kinds() {
        let kinds = resolve("FLR+-[]X");
        assert_eq!(
            kinds,
            vec![
                SymbolKind::Forward,
                SymbolKind::Forward,
                SymbolKind::Forward,
                SymbolKind::TurnLeft,
                SymbolKind::TurnRight,
                SymbolKind::Push,
                SymbolKind::Pop,
                SymbolKind::Inert,
            ]
        );
    }

    #[test]
    fn test_stack() {
        let mut t = Turtle::new(coord! {x: 0.0, y: 0.0}, 100.0);
        t.push(0.5);
        assert_eq!(t.length(), 50.0);
        t.fwd();
        t.right(degrees(90.0));
        t.fwd();
        assert!(t.pop().is_some());
        assert_eq!(t.position(), coord! {x: 0.0, y: 0.0});
        assert_eq!(t.heading(), 0.0);
        assert_eq!(t.length(), 100.0);
        assert_eq!(t.depth(), 0);
        assert!(t.pop().is_none());
    }

    #[test]
    fn test_forward_and_turns() {
        let mut t = Turtle::new(coord! {x: 0.0, y: 0.0}, 10.0);
        let line = t.fwd();
        assert!(close(line.end, coord! {x: 0.0, y: -10.0}));

        // `+` turns left on the page, `-` turns right.
        let desc = TurtleDescriptor::new(degrees(90.0), 10.0);
        let mut t = Turtle::new(coord! {x: 0.0, y: 0.0}, 10.0);
        t.walk(&resolve("+F"), &desc, |_| {}).unwrap();
        assert!(close(t.position(), coord! {x: -10.0, y: 0.0}));
        let mut t = Turtle::new(coord! {x: 0.0, y: 0.0}, 10.0);
        t.walk(&resolve("-F"), &desc, |_| {}).unwrap();
        assert!(close(t.position(), coord! {x: 10.0, y: 0.0}));
    }

    #[test]
    fn test_simple_box() {
        let desc = TurtleDescriptor::new(degrees(90.0), 100.0);
        let drawing = interpret("F-F-F-F", &desc).unwrap();
        let lines = drawing.to_multiline();
        assert_eq!(lines.0.len(), 1);
        let points: Vec<Coord<f64>> = lines.0[0].coords().cloned().collect();
        assert_eq!(points.len(), 5);
        assert!(close(points[0], points[4]));
        assert!(close(drawing.origin(), coord! {x: 0.0, y: 100.0}));
        assert!(close(points[2], coord! {x: 100.0, y: 0.0}));
    }

    #[test]
    fn test_unbalanced_pop_is_an_error() {
        let desc = TurtleDescriptor::new(degrees(30.0), 5.0);
        assert_eq!(
            interpret("F]F", &desc),
            Err(TurtleError::PoppedEmptyStack { index: 1 })
        );
        assert_eq!(
            measure("[F]]", &desc),
            Err(TurtleError::PoppedEmptyStack { index: 3 })
        );
    }

    #[test]
    fn test_balanced_strings_end_with_empty_stack() {
        let desc = TurtleDescriptor::new(degrees(22.5), 4.0);
        for path in ["", "F", "[F]", "F[+F]F[-F]F", "FF-[-F+F+F]+[+F-F-F]", "[[[F]F]F]"] {
            let mut t = Turtle::new(desc.start, desc.length);
            assert_eq!(t.walk(&resolve(path), &desc, |_| {}), Ok(0), "{}", path);
            assert_eq!(interpret(path, &desc).unwrap().open_branches(), 0);
        }
        assert_eq!(interpret("[[F]", &desc).unwrap().open_branches(), 1);
    }

    #[test]
    fn test_length_multiplier() {
        let desc = TurtleDescriptor::new(degrees(90.0), 10.0).with_length_multiplier(0.5);
        let drawing = interpret("[F]F", &desc).unwrap();
        let segments = drawing.segments();
        assert_eq!(segments.len(), 2);
        let len = |l: &Line<f64>| (l.dx() * l.dx() + l.dy() * l.dy()).sqrt();
        assert!((len(&segments[0]) - 5.0).abs() <= EPSILON);
        assert!((len(&segments[1]) - 10.0).abs() <= EPSILON);
        assert_eq!(segments[0].start, segments[1].start);
        assert_eq!(drawing.to_multiline().0.len(), 2);
    }

    #[test]
    fn test_inert_symbols_do_nothing() {
        let desc = TurtleDescriptor::new(degrees(45.0), 3.0);
        assert_eq!(
            interpret("FXF+YF", &desc).unwrap(),
            interpret("FF+F", &desc).unwrap()
        );
    }

    #[test]
    fn test_pen_width_padding() {
        let thin = interpret("F", &TurtleDescriptor::new(0.0, 10.0)).unwrap();
        assert_eq!(thin.width(), 1.0);
        assert_eq!(thin.height(), 11.0);
        assert_eq!(thin.origin(), coord! {x: 0.0, y: 10.0});

        let thick = interpret("F", &TurtleDescriptor::new(0.0, 10.0).with_pen_width(3.0)).unwrap();
        assert_eq!(thick.width(), 2.0);
        assert_eq!(thick.height(), 12.0);
    }

    #[test]
    fn test_start_position_does_not_change_drawing() {
        let desc = TurtleDescriptor::new(degrees(20.0), 7.0);
        let path = "F[+F[-F]]F[-F]F";
        let here = interpret(path, &desc).unwrap();
        let there = interpret(path, &desc.with_start(coord! {x: 1500.0, y: 2936.0})).unwrap();
        assert_eq!(here.width(), there.width());
        assert_eq!(here.height(), there.height());
        for (a, b) in here.segments().iter().zip(there.segments()) {
            assert!(close(a.start, b.start) && close(a.end, b.end));
        }
    }

    #[test]
    fn test_passes_agree_and_bounds_contain_segments() {
        let mut system = LSystem::with_rng(XorShift128::new(Seed::Fixed(5)))
            .with_production(Production::stochastic('F', "F[+F]F[-F]F", 0.33))
            .with_production(Production::stochastic('F', "F[+F]F", 0.33))
            .with_production(Production::stochastic('F', "F[-F]F", 0.34));
        system.set_root("F");
        let path = system.generate(4).to_string();
        let desc = TurtleDescriptor::new(0.37, 8.0)
            .with_start(coord! {x: 1500.0, y: 2936.0})
            .with_pen_width(2.0);

        let canvas = measure(&path, &desc).unwrap();
        let drawing = interpret(&path, &desc).unwrap();
        assert_eq!(drawing.width(), canvas.width());
        assert_eq!(drawing.height(), canvas.height());

        let mut world = vec![];
        Turtle::new(desc.start, desc.length)
            .walk(&resolve(&path), &desc, |line| world.push(line))
            .unwrap();
        assert_eq!(world.len(), drawing.segments().len());

        let bounds = drawing.bounds();
        for (w, s) in world.iter().zip(drawing.segments()) {
            assert_eq!(w.start - canvas.min(), s.start);
            assert_eq!(w.end - canvas.min(), s.end);
            for p in [s.start, s.end] {
                assert!(p.x >= bounds.min().x && p.x <= bounds.max().x);
                assert!(p.y >= bounds.min().y && p.y <= bounds.max().y);
            }
        }

        let tight = drawing.tight_bounds().unwrap();
        assert!(tight.min().x >= 0.0 && tight.min().y >= 0.0);
        assert!(tight.max().x <= bounds.max().x - 1.0);
        assert!(tight.max().y <= bounds.max().y - 1.0);
    }

    #[test]
    fn test_gosper_one_generation() {
        let rhs = "L+R++R-L--LL-R+";
        let mut system = LSystem::with_rng(XorShift128::new(Seed::Fixed(0)))
            .with_production(Production::new('L', rhs))
            .with_production(Production::new('R', "-L+RR++R+L--L-R"));
        system.set_root("L");
        assert_eq!(system.generate(1), rhs);
        assert_eq!(system.string().chars().count(), rhs.chars().count());

        let drawing = system
            .interpret(&TurtleDescriptor::new(degrees(60.0), 12.0))
            .unwrap();
        assert_eq!(drawing.segments().len(), 7);
        assert_eq!(drawing.open_branches(), 0);
        let lines = drawing.to_multiline();
        assert_eq!(lines.0.len(), 1);
        assert_eq!(lines.0[0].0.len(), 8);
    }
}
