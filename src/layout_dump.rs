use crate::diagram::Diagram;
use crate::ir::Direction;
use crate::layout::LayoutGeometry;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub direction: String,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub diagnostics: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub stereotype: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label_lines: Vec<String>,
    pub dividers: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub kind: String,
    pub dashed: bool,
    pub label: Option<String>,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(diagram: &Diagram, geometry: &LayoutGeometry, direction: Direction) -> Self {
        let nodes = diagram
            .nodes
            .iter()
            .zip(&geometry.nodes)
            .map(|(node, placed)| NodeDump {
                id: node.id.clone(),
                stereotype: format!("{:?}", node.stereotype),
                x: placed.center.x,
                y: placed.center.y,
                width: placed.width,
                height: placed.height,
                label_lines: node.label.lines.iter().map(|line| line.text.clone()).collect(),
                dividers: node
                    .label
                    .lines
                    .iter()
                    .enumerate()
                    .filter(|(_, line)| line.divider_after)
                    .map(|(idx, _)| idx)
                    .collect(),
            })
            .collect();

        let name = |idx: usize| {
            diagram
                .nodes
                .get(idx)
                .map(|node| node.id.clone())
                .unwrap_or_default()
        };
        let edges = diagram
            .edges
            .iter()
            .enumerate()
            .map(|(idx, edge)| EdgeDump {
                from: name(edge.source),
                to: name(edge.target),
                kind: format!("{:?}", edge.kind),
                dashed: edge.stroke == crate::diagram::StrokeStyle::Dashed,
                label: edge.label.clone(),
                points: geometry
                    .edges
                    .get(idx)
                    .map(|bends| bends.iter().map(|p| [p.x, p.y]).collect())
                    .unwrap_or_default(),
            })
            .collect();

        let (width, height) = geometry
            .bounds()
            .map(|(min, max)| (max.x - min.x, max.y - min.y))
            .unwrap_or((0.0, 0.0));

        LayoutDump {
            direction: format!("{:?}", direction),
            width,
            height,
            nodes,
            edges,
            diagnostics: diagram.diagnostics.iter().map(ToString::to_string).collect(),
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    diagram: &Diagram,
    geometry: &LayoutGeometry,
    direction: Direction,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(diagram, geometry, direction);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
