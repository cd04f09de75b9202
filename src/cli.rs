use crate::config::{Config, LayoutEngineKind, clamp_curviness, load_config};
use crate::ir::{ClassModel, Direction};
use crate::layout_dump::write_layout_dump;
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::write_output_svg;
use crate::yuml::model_to_yuml;
use crate::{Diagnostic, layout_class_diagram, render_laid_out};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{info, warn};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "ucr", version, about = "Render class models as UML class diagrams")]
pub struct Args {
    /// Input class model (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and yUML if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, layout and svg settings)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Edge smoothness in [0, 1]
    #[arg(long = "curviness")]
    pub curviness: Option<f32>,

    /// Smooth bends with cubic curves instead of arcs
    #[arg(long = "bezier")]
    pub bezier: bool,

    /// Layout engine
    #[arg(long = "engine", value_enum)]
    pub engine: Option<EngineArg>,

    /// Ranking direction
    #[arg(short = 'd', long = "direction", value_enum)]
    pub direction: Option<DirectionArg>,

    /// Width attribute of the SVG root
    #[arg(short = 'w', long = "width")]
    pub width: Option<String>,

    /// Height attribute of the SVG root
    #[arg(short = 'H', long = "height")]
    pub height: Option<String>,

    /// PNG scale factor
    #[arg(short = 's', long = "scale", default_value_t = 1.0)]
    pub scale: f32,

    /// Write the computed geometry as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long = "logLevel", default_value = "warn")]
    pub log_level: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Yuml,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineArg {
    Dagre,
    Layered,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionArg {
    #[value(alias = "td")]
    Tb,
    Lr,
}

pub fn run(args: &Args) -> Result<()> {
    let config = apply_overrides(load_config(args.config.as_deref())?, args);

    let input = read_input(args.input.as_deref())?;
    let models = parse_models(&input)?;
    if models.is_empty() {
        return Err(anyhow::anyhow!("No class models found in input"));
    }

    if models.len() == 1 {
        return render_one(&models[0], &config, args, args.output.as_deref());
    }

    let outputs = resolve_multi_outputs(args.output.as_deref(), args.output_format, models.len())?;
    for (model, output) in models.iter().zip(&outputs) {
        render_one(model, &config, args, Some(output))?;
    }
    Ok(())
}

fn apply_overrides(mut config: Config, args: &Args) -> Config {
    if let Some(curviness) = args.curviness {
        config.render.curviness = clamp_curviness(curviness);
    }
    if args.bezier {
        config.render.bezier_interpolation = true;
    }
    if let Some(engine) = args.engine {
        config.layout.engine = match engine {
            EngineArg::Dagre => LayoutEngineKind::Dagre,
            EngineArg::Layered => LayoutEngineKind::Layered,
        };
    }
    if let Some(direction) = args.direction {
        config.layout.direction = match direction {
            DirectionArg::Tb => Direction::TopDown,
            DirectionArg::Lr => Direction::LeftRight,
        };
    }
    if args.width.is_some() {
        config.render.width = args.width.clone();
    }
    if args.height.is_some() {
        config.render.height = args.height.clone();
    }
    config
}

fn render_one(model: &ClassModel, config: &Config, args: &Args, output: Option<&Path>) -> Result<()> {
    if args.output_format == OutputFormat::Yuml {
        let text = model_to_yuml(model);
        return write_output_svg(&text, output);
    }

    let (diagram, geometry) = layout_class_diagram(model, config);
    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &diagram, &geometry, config.layout.direction)?;
    }

    let mut buffer = Vec::new();
    let report = render_laid_out(&diagram, &geometry, config, &mut buffer)?;
    report_diagnostics(&report.diagnostics);
    info!(
        "drew {} classes and {} relationships",
        report.nodes_drawn, report.edges_drawn
    );
    let svg = String::from_utf8(buffer)?;

    match args.output_format {
        OutputFormat::Svg | OutputFormat::Yuml => write_output_svg(&svg, output),
        OutputFormat::Png => write_png(&svg, output, config, args.scale),
    }
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: Option<&Path>, config: &Config, scale: f32) -> Result<()> {
    let output = ensure_output(output, "png")?;
    write_output_png(svg, output, &config.render, scale)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: Option<&Path>, _config: &Config, _scale: f32) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        warn!("{diagnostic}");
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// A document is either one model object or an array of them.
fn parse_models(input: &str) -> Result<Vec<ClassModel>> {
    if input.trim_start().starts_with('[') {
        let models = match serde_json::from_str::<Vec<ClassModel>>(input) {
            Ok(models) => models,
            Err(strict) => json5::from_str::<Vec<ClassModel>>(input).map_err(|lenient| {
                anyhow::anyhow!("invalid class model: {strict} (as json5: {lenient})")
            })?,
        };
        return Ok(models);
    }
    Ok(vec![ClassModel::from_json(input)?])
}

#[cfg(feature = "png")]
fn ensure_output<'a>(output: Option<&'a Path>, ext: &str) -> Result<&'a Path> {
    output.ok_or_else(|| anyhow::anyhow!("Output path required for {} output", ext))
}

fn resolve_multi_outputs(
    output: Option<&Path>,
    format: OutputFormat,
    count: usize,
) -> Result<Vec<PathBuf>> {
    let ext = match format {
        OutputFormat::Svg => "svg",
        OutputFormat::Png => "png",
        OutputFormat::Yuml => "yuml",
    };
    let base = output.ok_or_else(|| anyhow::anyhow!("Output path required for multiple models"))?;
    if base.is_dir() {
        let mut outputs = Vec::new();
        for idx in 0..count {
            outputs.push(base.join(format!("diagram-{}.{}", idx + 1, ext)));
        }
        return Ok(outputs);
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("diagram");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    let mut outputs = Vec::new();
    for idx in 0..count {
        outputs.push(parent.join(format!("{}-{}.{}", stem, idx + 1, ext)));
    }
    Ok(outputs)
}
