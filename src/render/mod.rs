mod clip;
mod curve;

pub use curve::CurveMode;

use std::io::Write;
use std::path::Path;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::RenderConfig;
use crate::diagram::{ArrowFill, Diagram, DrawEdge, DrawNode, StrokeStyle};
use crate::error::{Diagnostic, RenderError};
use crate::layout::{LayoutGeometry, NodeGeometry, Point, Rect};
use crate::theme::Theme;

static ID_UNSAFE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]+").unwrap());

const LINE_START_EM: f32 = 0.83;
const LINE_STEP_EM: f32 = 1.1;
/// Rules sit between the baseline of their line and the next line.
const DIVIDER_DROP_EM: f32 = 0.34;
const TEXT_INSET_EM: f32 = 0.17;
const GLYPH_WIDTH_EM: f32 = 0.67;

/// Outcome of a successful render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    pub nodes_drawn: usize,
    pub edges_drawn: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Writes one SVG document for `diagram` laid out as `geometry`.
///
/// Edges that cannot be drawn are reported in [`RenderReport::diagnostics`]
/// and skipped; only a failing writer aborts the render.
pub fn render_svg<W: Write + ?Sized>(
    diagram: &Diagram,
    geometry: &LayoutGeometry,
    theme: &Theme,
    config: &RenderConfig,
    out: &mut W,
) -> Result<RenderReport, RenderError> {
    let mut report = RenderReport::default();
    let mode = CurveMode::from_config(config);

    write_header(geometry, config, out)?;

    for (idx, (node, placed)) in diagram.nodes.iter().zip(&geometry.nodes).enumerate() {
        write_node(idx, node, placed, theme, config, out)?;
        report.nodes_drawn += 1;
    }

    for (idx, edge) in diagram.edges.iter().enumerate() {
        let bends = geometry.edges.get(idx).map(Vec::as_slice).unwrap_or(&[]);
        match edge_route(edge, bends, geometry, config) {
            Ok(route) => {
                write_edge(edge, &route, mode, theme, config, out)?;
                report.edges_drawn += 1;
            }
            Err(skip) => {
                let source = node_name(diagram, edge.source);
                let target = node_name(diagram, edge.target);
                let diagnostic = match skip {
                    EdgeSkip::SelfLoop => Diagnostic::SelfLoop { class: source },
                    EdgeSkip::Unplaced => Diagnostic::UnplacedEndpoint { source, target },
                    EdgeSkip::Overlapping => Diagnostic::DegenerateEdge { source, target },
                };
                warn!("{diagnostic}");
                report.diagnostics.push(diagnostic);
            }
        }
    }

    writeln!(out, "</svg>")?;
    debug!(
        "rendered {} nodes and {} edges",
        report.nodes_drawn, report.edges_drawn
    );
    Ok(report)
}

pub fn render_svg_string(
    diagram: &Diagram,
    geometry: &LayoutGeometry,
    theme: &Theme,
    config: &RenderConfig,
) -> Result<(String, RenderReport), RenderError> {
    let mut buffer = Vec::new();
    let report = render_svg(diagram, geometry, theme, config, &mut buffer)?;
    Ok((String::from_utf8_lossy(&buffer).into_owned(), report))
}

fn write_header<W: Write + ?Sized>(
    geometry: &LayoutGeometry,
    config: &RenderConfig,
    out: &mut W,
) -> Result<(), RenderError> {
    let (min, max) = geometry
        .bounds()
        .unwrap_or((Point::default(), Point::default()));
    let margin = config.margin;

    write!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" xmlns:ev=\"http://www.w3.org/2001/xml-events\" version=\"1.1\" baseProfile=\"full\""
    )?;
    if let Some(width) = config.width.as_deref().filter(|v| !v.is_empty()) {
        write!(out, " width=\"{}\"", escape_xml(width))?;
    }
    if let Some(height) = config.height.as_deref().filter(|v| !v.is_empty()) {
        write!(out, " height=\"{}\"", escape_xml(height))?;
    }
    writeln!(
        out,
        " viewBox=\"{:.2} {:.2} {:.2} {:.2}\">",
        min.x - margin,
        min.y - margin,
        max.x - min.x + 2.0 * margin,
        max.y - min.y + 2.0 * margin
    )?;
    writeln!(
        out,
        "<style type=\"text/css\">.font_style {{font: {}px {};}}</style>",
        config.font_size,
        escape_xml(&config.font_family)
    )?;
    Ok(())
}

fn write_node<W: Write + ?Sized>(
    idx: usize,
    node: &DrawNode,
    placed: &NodeGeometry,
    theme: &Theme,
    config: &RenderConfig,
    out: &mut W,
) -> Result<(), RenderError> {
    let rect = placed.rect();
    writeln!(
        out,
        "<g class=\"node font_style\" id=\"{}\" transform=\"translate({:.2} {:.2})\">",
        node_id(idx, &node.id),
        rect.left(),
        rect.top()
    )?;
    writeln!(
        out,
        "<rect x=\"0\" y=\"0\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}px\"/>",
        placed.width,
        placed.height,
        escape_xml(&node.fill),
        escape_xml(&theme.class_border),
        theme.class_border_width
    )?;

    for (line_idx, line) in node.label.lines.iter().enumerate() {
        let offset = LINE_START_EM + line_idx as f32 * LINE_STEP_EM;
        write!(
            out,
            "<text dx=\"{TEXT_INSET_EM}em\" dy=\"{offset:.2}em\" text-anchor=\"start\" fill=\"{}\"",
            escape_xml(&config.font_color)
        )?;
        let chars = line.text.chars().count();
        if chars > 0 {
            write!(
                out,
                " textLength=\"{:.2}em\" lengthAdjust=\"spacingAndGlyphs\"",
                chars as f32 * GLYPH_WIDTH_EM
            )?;
        }
        writeln!(out, ">{}</text>", escape_xml(&line.text))?;

        if line.divider_after {
            let y = offset + DIVIDER_DROP_EM;
            writeln!(
                out,
                "<line x1=\"0\" y1=\"{y:.2}em\" x2=\"{:.2}\" y2=\"{y:.2}em\" stroke=\"{}\" stroke-width=\"{}px\"/>",
                placed.width,
                escape_xml(&theme.divider_color),
                theme.divider_width
            )?;
        }
    }

    writeln!(out, "</g>")?;
    Ok(())
}

/// Trimmed polyline of an edge, the boxes it connects and the arrow size
/// used at its ends.
struct EdgeRoute {
    points: Vec<Point>,
    source: Rect,
    target: Rect,
    clearance: f32,
}

enum EdgeSkip {
    SelfLoop,
    Unplaced,
    Overlapping,
}

fn edge_route(
    edge: &DrawEdge,
    bends: &[Point],
    geometry: &LayoutGeometry,
    config: &RenderConfig,
) -> Result<EdgeRoute, EdgeSkip> {
    if edge.source == edge.target {
        return Err(EdgeSkip::SelfLoop);
    }
    let (Some(source), Some(target)) = (
        geometry.nodes.get(edge.source),
        geometry.nodes.get(edge.target),
    ) else {
        return Err(EdgeSkip::Unplaced);
    };

    let clearance = edge_clearance(source, target, config.stroke_width);
    let mut raw = Vec::with_capacity(bends.len() + 2);
    raw.push(source.center);
    raw.extend(bends.iter().copied().filter(|p| p.is_finite()));
    raw.push(target.center);

    let points = clip::trim_polyline(
        &raw,
        &source.rect().expanded(clearance),
        &target.rect().expanded(clearance),
    );
    if points.len() < 2 {
        return Err(EdgeSkip::Overlapping);
    }
    Ok(EdgeRoute {
        points,
        source: source.rect(),
        target: target.rect(),
        clearance,
    })
}

pub fn edge_clearance(source: &NodeGeometry, target: &NodeGeometry, stroke_width: f32) -> f32 {
    let span = source.width + source.height + target.width + target.height;
    (stroke_width * 3.0).max(span / 16.0)
}

fn write_edge<W: Write + ?Sized>(
    edge: &DrawEdge,
    route: &EdgeRoute,
    mode: CurveMode,
    theme: &Theme,
    config: &RenderConfig,
    out: &mut W,
) -> Result<(), RenderError> {
    let points = &route.points;
    let stroke = escape_xml(&theme.line_color);
    let width = config.stroke_width;
    let dash = match edge.stroke {
        StrokeStyle::Dashed => format!(" stroke-dasharray=\"{},{}\"", 4.0 * width, 2.0 * width),
        StrokeStyle::Solid => String::new(),
    };

    writeln!(out, "<g class=\"edge\" data-kind=\"{}\">", kind_name(edge))?;

    if let Some(label) = edge.label.as_deref().filter(|l| !l.is_empty()) {
        let mid = points[0].midpoint(points[1]);
        writeln!(
            out,
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            mid.x,
            mid.y,
            escape_xml(&config.font_family),
            config.font_size,
            escape_xml(&config.font_color),
            escape_xml(label)
        )?;
    }

    writeln!(
        out,
        "<path d=\"{}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"{width}\"{dash}/>",
        curve::path_data(points, mode)
    )?;

    let last = points.len() - 1;
    let ends = [
        (edge.arrows.source, points[1], points[0], &route.source),
        (edge.arrows.target, points[last - 1], points[last], &route.target),
    ];
    for (fill, from, end, node) in ends {
        let Some(fill) = fill else {
            continue;
        };
        let tip = clip::arrow_tip(from, end, node, route.clearance);
        let [a, b, c] = clip::arrow_head(end, tip, route.clearance);
        let fill = match fill {
            ArrowFill::Filled => stroke.clone(),
            ArrowFill::Hollow => escape_xml(&theme.hollow_fill),
        };
        writeln!(
            out,
            "<polygon points=\"{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{width}\"/>",
            a.x, a.y, b.x, b.y, c.x, c.y
        )?;
    }

    writeln!(out, "</g>")?;
    Ok(())
}

fn kind_name(edge: &DrawEdge) -> String {
    format!("{:?}", edge.kind).to_lowercase()
}

fn node_name(diagram: &Diagram, idx: usize) -> String {
    diagram
        .nodes
        .get(idx)
        .map(|node| node.id.clone())
        .unwrap_or_else(|| format!("#{idx}"))
}

fn node_id(idx: usize, name: &str) -> String {
    let safe = ID_UNSAFE_RE.replace_all(name, "_");
    format!("class-{idx}-{safe}")
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, config: &RenderConfig, scale: f32) -> anyhow::Result<()> {
    if !scale.is_finite() || scale <= 0.0 {
        anyhow::bail!("invalid PNG scale {scale}");
    }
    let mut opt = usvg::Options::default();
    opt.font_family = config.font_family.clone();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ClassLabel, LabelLine};
    use crate::diagram::ArrowEnds;
    use crate::ir::{RelationshipKind, Stereotype};
    use std::io;

    fn draw_node(name: &str, width: f32, height: f32) -> DrawNode {
        DrawNode {
            id: name.to_string(),
            stereotype: Stereotype::None,
            label: ClassLabel {
                lines: vec![
                    LabelLine {
                        text: name.to_string(),
                        divider_after: true,
                    },
                    LabelLine {
                        text: "+ run()".to_string(),
                        divider_after: false,
                    },
                ],
            },
            width,
            height,
            fill: "#FAEBD7".to_string(),
        }
    }

    fn draw_edge(kind: RelationshipKind) -> DrawEdge {
        DrawEdge {
            source: 0,
            target: 1,
            kind,
            stroke: StrokeStyle::for_kind(kind),
            arrows: ArrowEnds::for_kind(kind),
            label: None,
        }
    }

    fn placed(x: f32, y: f32, width: f32, height: f32) -> NodeGeometry {
        NodeGeometry {
            center: Point::new(x, y),
            width,
            height,
        }
    }

    fn pair(kind: RelationshipKind, second: Point, bends: Vec<Point>) -> (Diagram, LayoutGeometry) {
        let diagram = Diagram {
            nodes: vec![draw_node("A", 60.0, 26.0), draw_node("B", 60.0, 26.0)],
            edges: vec![draw_edge(kind)],
            diagnostics: Vec::new(),
        };
        let geometry = LayoutGeometry {
            nodes: vec![
                placed(0.0, 0.0, 60.0, 26.0),
                placed(second.x, second.y, 60.0, 26.0),
            ],
            edges: vec![bends],
        };
        (diagram, geometry)
    }

    fn path_endpoints(svg: &str) -> Vec<Point> {
        let start = svg.find("<path d=\"").unwrap() + "<path d=\"".len();
        let end = start + svg[start..].find('"').unwrap();
        let numbers: Vec<f32> = svg[start..end]
            .split_whitespace()
            .filter_map(|token| token.parse().ok())
            .collect();
        let n = numbers.len();
        vec![
            Point::new(numbers[0], numbers[1]),
            Point::new(numbers[n - 2], numbers[n - 1]),
        ]
    }

    #[test]
    fn straight_edge_stays_clear_of_both_boxes() {
        let (diagram, geometry) =
            pair(RelationshipKind::Association, Point::new(200.0, 150.0), Vec::new());
        let config = RenderConfig::default();
        let (svg, report) =
            render_svg_string(&diagram, &geometry, &Theme::classic(), &config).unwrap();
        assert_eq!(report.edges_drawn, 1);

        let clearance = edge_clearance(&geometry.nodes[0], &geometry.nodes[1], config.stroke_width);
        for point in path_endpoints(&svg) {
            for node in &geometry.nodes {
                let inner = node.rect().expanded(clearance - 0.01);
                assert!(!inner.contains(point), "{point:?} is within clearance of {node:?}");
            }
        }
    }

    #[test]
    fn overlapping_centers_draw_no_stroke() {
        let (diagram, geometry) =
            pair(RelationshipKind::Composition, Point::new(0.0, 0.0), Vec::new());
        let (svg, report) =
            render_svg_string(&diagram, &geometry, &Theme::classic(), &RenderConfig::default())
                .unwrap();
        assert_eq!(report.edges_drawn, 0);
        assert_eq!(report.nodes_drawn, 2);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::DegenerateEdge {
                source: "A".to_string(),
                target: "B".to_string()
            }]
        );
        assert!(!svg.contains("<path"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn dashed_kinds_carry_dasharray() {
        let (diagram, geometry) =
            pair(RelationshipKind::Realization, Point::new(0.0, 200.0), Vec::new());
        let (svg, _) =
            render_svg_string(&diagram, &geometry, &Theme::classic(), &RenderConfig::default())
                .unwrap();
        assert!(svg.contains("stroke-dasharray=\"8,4\""));
        assert!(svg.contains("fill=\"#FFFFFF\""));
        assert_eq!(svg.matches("<polygon").count(), 1);
    }

    #[test]
    fn curve_modes_select_path_commands() {
        let bends = vec![Point::new(0.0, 100.0), Point::new(200.0, 100.0)];
        let (diagram, geometry) = pair(RelationshipKind::Bidirectional, Point::new(200.0, 200.0), bends);

        let mut config = RenderConfig {
            curviness: 0.5,
            ..RenderConfig::default()
        };
        let (rounded, _) =
            render_svg_string(&diagram, &geometry, &Theme::classic(), &config).unwrap();
        assert!(rounded.contains(" A "));
        assert!(!rounded.contains("<polygon"));

        config.bezier_interpolation = true;
        let (bezier, _) =
            render_svg_string(&diagram, &geometry, &Theme::classic(), &config).unwrap();
        assert!(bezier.contains(" C "));
        assert!(!bezier.contains(" A "));
    }

    #[test]
    fn header_and_nodes() {
        let (diagram, geometry) =
            pair(RelationshipKind::Aggregation, Point::new(0.0, 200.0), Vec::new());
        let config = RenderConfig {
            width: Some("640".to_string()),
            ..RenderConfig::default()
        };
        let (svg, _) = render_svg_string(&diagram, &geometry, &Theme::classic(), &config).unwrap();
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("baseProfile=\"full\""));
        assert!(svg.contains("width=\"640\""));
        assert!(svg.contains("viewBox=\"-31.00 -14.00 62.00 228.00\""));
        assert!(svg.contains(".font_style {font: 10px monospace;}"));
        assert!(svg.contains("translate(-30.00 -13.00)"));
        assert!(svg.contains("dy=\"1.93em\""));
        assert!(svg.contains("y1=\"1.17em\""));
        assert_eq!(svg.matches("class=\"node font_style\"").count(), 2);
    }

    #[test]
    fn labels_and_ids_are_escaped() {
        let (mut diagram, geometry) =
            pair(RelationshipKind::Dependency, Point::new(0.0, 200.0), Vec::new());
        diagram.nodes[0].id = "Map<K, V>".to_string();
        diagram.nodes[0].label.lines[0].text = "Map<K, V>".to_string();
        diagram.edges[0].label = Some("uses & owns".to_string());
        let (svg, _) =
            render_svg_string(&diagram, &geometry, &Theme::classic(), &RenderConfig::default())
                .unwrap();
        assert!(svg.contains("id=\"class-0-Map_K_V_\""));
        assert!(svg.contains(">Map&lt;K, V&gt;</text>"));
        assert!(svg.contains(">uses &amp; owns</text>"));
    }

    fn polygon_points(svg: &str) -> Vec<Point> {
        let start = svg.find("<polygon points=\"").unwrap() + "<polygon points=\"".len();
        let end = start + svg[start..].find('"').unwrap();
        svg[start..end]
            .split_whitespace()
            .map(|pair| {
                let (x, y) = pair.split_once(',').unwrap();
                Point::new(x.parse().unwrap(), y.parse().unwrap())
            })
            .collect()
    }

    #[test]
    fn arrow_tip_touches_the_target_box() {
        let (diagram, geometry) =
            pair(RelationshipKind::Association, Point::new(0.0, 200.0), Vec::new());
        let (svg, _) =
            render_svg_string(&diagram, &geometry, &Theme::classic(), &RenderConfig::default())
                .unwrap();
        let head = polygon_points(&svg);
        assert_eq!(head.len(), 3);
        assert_eq!(head[0], Point::new(0.0, 187.0));

        // The base closes the gap up to the trimmed stroke end.
        let stroke_end = path_endpoints(&svg)[1];
        assert!((head[1].y - stroke_end.y).abs() < 0.01);
        assert!((head[2].y - stroke_end.y).abs() < 0.01);
        assert!(stroke_end.y < 187.0);
    }

    #[test]
    fn oblique_arrow_tip_lies_on_the_target_side() {
        let (diagram, geometry) =
            pair(RelationshipKind::Association, Point::new(200.0, 150.0), Vec::new());
        let (svg, _) =
            render_svg_string(&diagram, &geometry, &Theme::classic(), &RenderConfig::default())
                .unwrap();
        let tip = polygon_points(&svg)[0];
        let target = geometry.nodes[1].rect();
        let on_side = (tip.x - target.left()).abs() < 0.01 || (tip.y - target.top()).abs() < 0.01;
        assert!(on_side, "{tip:?} is not on {target:?}");
        assert!(target.contains_within(tip, 0.01));
    }

    #[test]
    fn self_loop_and_unplaced_edges_are_named_apart() {
        let (mut diagram, geometry) =
            pair(RelationshipKind::Association, Point::new(0.0, 200.0), Vec::new());
        diagram.edges[0].target = 0;
        let mut unplaced = draw_edge(RelationshipKind::Association);
        unplaced.target = 5;
        diagram.edges.push(unplaced);
        let (_, report) =
            render_svg_string(&diagram, &geometry, &Theme::classic(), &RenderConfig::default())
                .unwrap();
        assert_eq!(report.edges_drawn, 0);
        assert_eq!(
            report.diagnostics,
            vec![
                Diagnostic::SelfLoop {
                    class: "A".to_string()
                },
                Diagnostic::UnplacedEndpoint {
                    source: "A".to_string(),
                    target: "#5".to_string()
                },
            ]
        );
        assert!(report.diagnostics[0].to_string().contains("itself"));
        assert!(!report.diagnostics[1].to_string().contains("overlapping"));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writer_failure_is_an_io_error() {
        let (diagram, geometry) =
            pair(RelationshipKind::Association, Point::new(0.0, 200.0), Vec::new());
        let err = render_svg(
            &diagram,
            &geometry,
            &Theme::classic(),
            &RenderConfig::default(),
            &mut FailingWriter,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
