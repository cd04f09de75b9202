use crate::ir::Direction;
use crate::theme::Theme;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutEngineKind {
    #[default]
    Dagre,
    Layered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Base length unit for box sizing.
    pub unit: f32,
    pub width_factor: f32,
    pub height_factor: f32,
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub direction: Direction,
    pub engine: LayoutEngineKind,
    pub order_passes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            unit: 10.0,
            width_factor: 0.75,
            height_factor: 1.3,
            node_spacing: 50.0,
            rank_spacing: 50.0,
            direction: Direction::TopDown,
            engine: LayoutEngineKind::Dagre,
            order_passes: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub margin: f32,
    /// Edge smoothness in `[0, 1]`; zero draws straight segments.
    pub curviness: f32,
    pub bezier_interpolation: bool,
    pub font_size: f32,
    pub font_color: String,
    pub font_family: String,
    pub stroke_width: f32,
    pub width: Option<String>,
    pub height: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            margin: 1.0,
            curviness: 0.0,
            bezier_interpolation: false,
            font_size: 10.0,
            font_color: "#000000".to_string(),
            font_family: "monospace".to_string(),
            stroke_width: 2.0,
            width: None,
            height: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutFile>,
    svg: Option<SvgFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    class_fill: Option<String>,
    class_border: Option<String>,
    class_border_width: Option<NumberOrString>,
    divider_color: Option<String>,
    divider_width: Option<NumberOrString>,
    line_color: Option<String>,
    hollow_fill: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutFile {
    unit: Option<f32>,
    width_factor: Option<f32>,
    height_factor: Option<f32>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    direction: Option<String>,
    engine: Option<LayoutEngineKind>,
    order_passes: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SvgFile {
    margin: Option<f32>,
    curviness: Option<f32>,
    bezier_interpolation: Option<bool>,
    font_size: Option<NumberOrString>,
    font_color: Option<String>,
    font_family: Option<String>,
    stroke_width: Option<NumberOrString>,
    width: Option<NumberOrString>,
    height: Option<NumberOrString>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().trim_end_matches("px").parse::<f32>().ok(),
        }
    }

    fn as_string(&self) -> String {
        match self {
            NumberOrString::Number(val) => format!("{}", val),
            NumberOrString::String(val) => val.clone(),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    debug!("loading config from {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::by_name(theme_name) {
            Some(theme) => config.theme = theme,
            None => warn!("unknown theme `{theme_name}`, keeping the classic theme"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.class_fill {
            config.theme.class_fill = v;
        }
        if let Some(v) = vars.class_border {
            config.theme.class_border = v;
        }
        if let Some(v) = vars.class_border_width.and_then(|v| v.as_f32()) {
            config.theme.class_border_width = v;
        }
        if let Some(v) = vars.divider_color {
            config.theme.divider_color = v;
        }
        if let Some(v) = vars.divider_width.and_then(|v| v.as_f32()) {
            config.theme.divider_width = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.hollow_fill {
            config.theme.hollow_fill = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.unit {
            config.layout.unit = v;
        }
        if let Some(v) = layout.width_factor {
            config.layout.width_factor = v;
        }
        if let Some(v) = layout.height_factor {
            config.layout.height_factor = v;
        }
        if let Some(v) = layout.node_spacing {
            config.layout.node_spacing = v;
        }
        if let Some(v) = layout.rank_spacing {
            config.layout.rank_spacing = v;
        }
        if let Some(token) = layout.direction.as_deref() {
            match Direction::from_token(token) {
                Some(direction) => config.layout.direction = direction,
                None => warn!("unknown direction `{token}`, keeping top-down"),
            }
        }
        if let Some(v) = layout.engine {
            config.layout.engine = v;
        }
        if let Some(v) = layout.order_passes {
            config.layout.order_passes = v;
        }
    }

    if let Some(svg) = parsed.svg {
        if let Some(v) = svg.margin {
            config.render.margin = v;
        }
        if let Some(v) = svg.curviness {
            config.render.curviness = clamp_curviness(v);
        }
        if let Some(v) = svg.bezier_interpolation {
            config.render.bezier_interpolation = v;
        }
        if let Some(v) = svg.font_size.and_then(|v| v.as_f32()) {
            config.render.font_size = v;
        }
        if let Some(v) = svg.font_color {
            config.render.font_color = v;
        }
        if let Some(v) = svg.font_family {
            config.render.font_family = v;
        }
        if let Some(v) = svg.stroke_width.and_then(|v| v.as_f32()) {
            config.render.stroke_width = v;
        }
        if let Some(v) = svg.width {
            config.render.width = Some(v.as_string());
        }
        if let Some(v) = svg.height {
            config.render.height = Some(v.as_string());
        }
    }

    Ok(config)
}

pub fn clamp_curviness(value: f32) -> f32 {
    if !(0.0..=1.0).contains(&value) {
        warn!("curviness {value} is outside [0, 1], clamping");
    }
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
