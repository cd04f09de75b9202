pub mod classify;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod diagram;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod merge;
pub mod render;
pub mod theme;
pub mod yuml;

#[cfg(feature = "cli")]
pub use cli::{Args, run};
pub use config::Config;
pub use diagram::{Diagram, build_diagram};
pub use error::{Diagnostic, RenderError};
pub use ir::{ClassModel, ClassRecord, RelationshipKind, RelationshipRecord};
pub use layout::{LayoutEngine, LayoutGeometry};
pub use render::{RenderReport, render_svg, render_svg_string};

use std::io::Write;

/// Builds the diagram for `model` and lays it out with the configured engine.
pub fn layout_class_diagram(model: &ClassModel, config: &Config) -> (Diagram, LayoutGeometry) {
    let diagram = build_diagram(model, &config.layout, &config.theme);
    let engine = layout::layout_engine(&config.layout);
    let geometry = layout::compute_layout(&diagram, &config.layout, engine.as_ref());
    (diagram, geometry)
}

/// Runs the whole pipeline and writes one SVG document to `out`.
///
/// The returned report carries the diagnostics of every stage, assembly
/// first.
pub fn render_class_diagram<W: Write + ?Sized>(
    model: &ClassModel,
    config: &Config,
    out: &mut W,
) -> Result<RenderReport, RenderError> {
    let (diagram, geometry) = layout_class_diagram(model, config);
    render_laid_out(&diagram, &geometry, config, out)
}

/// Renders an already laid out diagram, folding its assembly diagnostics
/// into the report.
pub fn render_laid_out<W: Write + ?Sized>(
    diagram: &Diagram,
    geometry: &LayoutGeometry,
    config: &Config,
    out: &mut W,
) -> Result<RenderReport, RenderError> {
    let mut report = render_svg(diagram, geometry, &config.theme, &config.render, out)?;
    let mut diagnostics = diagram.diagnostics.clone();
    diagnostics.append(&mut report.diagnostics);
    report.diagnostics = diagnostics;
    Ok(report)
}
