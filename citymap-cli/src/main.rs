use citymap_core::{
    ColorScheme, DEFAULT_CIRCLE, DEFAULT_DILATE, DEFAULT_DPI, DEFAULT_LOCATION, DEFAULT_RADIUS,
    ExportOptions, FileType, FormValues, PreviewRenderer, SessionState, StyleOverrides, get_layers,
    resolve_styles,
};

use std::{
    fmt::Display,
    fs::{create_dir_all as create_generated_dir, write as write_file},
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{Level, event};

const GENERATED_DIR: &str = "generated";

#[derive(Parser, Debug)]
#[command(version, about = "Generate a stylized city map", long_about = None)]
struct Args {
    /// Place name to center the map on
    #[arg(short, long, default_value = DEFAULT_LOCATION)]
    location: String,

    /// Radius around the location, in metres (100 to 5000)
    #[arg(short, long, default_value_t = DEFAULT_RADIUS)]
    radius: u32,

    /// Clip the map to a circle rather than a square
    #[arg(long, default_value_t = DEFAULT_CIRCLE, action = ArgAction::Set)]
    circle: bool,

    /// Outward boundary expansion, in metres (0 to 500)
    #[arg(short, long, default_value_t = DEFAULT_DILATE)]
    dilate: u32,

    #[arg(short = 's', long, default_value_t, value_enum)]
    color_scheme: ColorScheme,

    /// Override a layer's edge color, as LAYER=COLOR
    #[arg(long = "edge-color", value_parser = parse_key_value::<String>)]
    edge_colors: Vec<(String, String)>,

    /// Override a layer's line width, as LAYER=WIDTH
    #[arg(long = "line-width", value_parser = parse_key_value::<f64>)]
    line_widths: Vec<(String, f64)>,

    /// Named style preset handed to the rendering backend
    #[arg(long)]
    preset: Option<String>,

    #[arg(short, long, default_value_t, value_enum)]
    format: FileType,

    /// Resolution of PNG output (1 to 1200)
    #[arg(long, default_value_t = DEFAULT_DPI)]
    dpi: u32,

    /// Output file. Defaults to generated/map_output.<format>
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the resolved style sheet as JSON instead of rendering
    #[arg(long)]
    print_style: bool,

    /// Print the layer catalog as JSON instead of rendering
    #[arg(long)]
    print_layers: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn parse_key_value<T>(raw: &str) -> Result<(String, T), String>
where
    T: FromStr,
    T::Err: Display,
{
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LAYER=VALUE, got `{raw}`"))?;

    let value = value
        .parse()
        .map_err(|err| format!("invalid value for `{key}`: {err}"))?;

    Ok((key.to_string(), value))
}

impl Args {
    fn overrides(&self) -> StyleOverrides {
        StyleOverrides {
            edge_colors: self.edge_colors.iter().cloned().collect(),
            line_widths: self.line_widths.iter().cloned().collect(),
        }
    }

    fn form_values(&self) -> FormValues {
        FormValues {
            location: self.location.clone(),
            radius: self.radius,
            circle: self.circle,
            dilate: self.dilate,
            color_scheme: self.color_scheme,
            overrides: self.overrides(),
            preset: self.preset.clone(),
        }
    }

    fn output_path(&self) -> Result<PathBuf> {
        if let Some(ref output) = self.output {
            return Ok(output.clone());
        }

        if !Path::new(GENERATED_DIR).try_exists()? {
            create_generated_dir(GENERATED_DIR)
                .with_context(|| format!("Failed to create '{GENERATED_DIR}' directory"))?;
            event!(Level::INFO, "Directory '{}' created.", GENERATED_DIR);
        }

        Ok(Path::new(GENERATED_DIR).join(self.format.file_name()))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    if args.print_layers {
        println!("{}", serde_json::to_string_pretty(get_layers())?);
        return Ok(());
    }

    if args.print_style {
        let style = resolve_styles(args.color_scheme, get_layers(), &args.overrides())?;
        println!("{}", serde_json::to_string_pretty(&style)?);
        return Ok(());
    }

    let options = ExportOptions::new(args.format).with_dpi(args.dpi);
    options.validate()?;

    let mut session = SessionState::new();
    session.generate(&PreviewRenderer, args.form_values())?;

    let bytes = session.download(&options)?;

    let path = args.output_path()?;
    event!(Level::INFO, "Saving map to: {}", path.display());

    write_file(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}
