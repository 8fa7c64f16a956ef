use aoer_lsystem::prelude::*;

use svg::node::element::path::Data;
use svg::node::element::Path;
use svg::Document;
use tracing_subscriber::EnvFilter;

/// Usage: gosper_svg [RON render config] [output.svg]
///
/// eg. `cargo run --example gosper_svg -- "(preset: Branching, seed: Fixed(7))" tree.svg`
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let config: RenderConfig = match args.next() {
        Some(text) => ron::from_str(&text)?,
        None => RenderConfig::new(Preset::HexGosper),
    };
    let output = args.next().unwrap_or_else(|| "lsystem.svg".to_string());

    let (system, drawing) = config.render()?;
    println!("{}\n{}", config.preset.label(), system);

    // One path per connected polyline, so branches don't get joined up.
    let mut svg_data = Data::new();
    for line in drawing.to_multiline() {
        for point in line.points().take(1) {
            svg_data = svg_data.move_to((point.x(), point.y()));
        }
        for point in line.points().skip(1) {
            svg_data = svg_data.line_to((point.x(), point.y()));
        }
    }
    let path = Path::new()
        .set("fill", "none")
        .set("stroke", "black")
        .set("stroke-width", config.thickness.pen_width())
        .set("stroke-linecap", "round")
        .set("d", svg_data);

    let document = Document::new()
        .set("width", drawing.width())
        .set("height", drawing.height())
        .set("viewBox", (0.0, 0.0, drawing.width(), drawing.height()))
        .add(path);

    svg::save(&output, &document)?;
    println!("Saved {} segments to {}", drawing.segments().len(), output);
    Ok(())
}
