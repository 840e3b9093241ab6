use clap::Parser;
use hotspot::assess::{crop_region, Assessment, CropRect};
use hotspot::io::{load_rgba_image, save_rgba_png};
use hotspot::{
    DecodeConfig, DensityConfig, Detection, Detector, HotspotConfig, RawTensor, RenderConfig,
    RenderOptions, WeightModel,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Hotspot CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DecodeConfigJson {
    confidence_threshold: f32,
    model_input_size: f32,
    min_box_size: f32,
}

impl Default for DecodeConfigJson {
    fn default() -> Self {
        let cfg = DecodeConfig::default();
        Self {
            confidence_threshold: cfg.confidence_threshold,
            model_input_size: cfg.model_input_size,
            min_box_size: cfg.min_box_size,
        }
    }
}

impl From<DecodeConfigJson> for DecodeConfig {
    fn from(value: DecodeConfigJson) -> Self {
        Self {
            confidence_threshold: value.confidence_threshold,
            model_input_size: value.model_input_size,
            min_box_size: value.min_box_size,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DensityConfigJson {
    min_bandwidth: f32,
    blur_kernel_size: usize,
    parallel: bool,
}

impl Default for DensityConfigJson {
    fn default() -> Self {
        let cfg = DensityConfig::default();
        Self {
            min_bandwidth: cfg.min_bandwidth,
            blur_kernel_size: cfg.blur_kernel_size,
            parallel: cfg.parallel,
        }
    }
}

impl From<DensityConfigJson> for DensityConfig {
    fn from(value: DensityConfigJson) -> Self {
        Self {
            min_bandwidth: value.min_bandwidth,
            blur_kernel_size: value.blur_kernel_size,
            weights: WeightModel::default(),
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RenderConfigJson {
    background: [u8; 3],
    global_alpha: f32,
    outline_thickness: usize,
}

impl Default for RenderConfigJson {
    fn default() -> Self {
        let cfg = RenderConfig::default();
        Self {
            background: cfg.background,
            global_alpha: cfg.global_alpha,
            outline_thickness: cfg.outline_thickness,
        }
    }
}

impl From<RenderConfigJson> for RenderConfig {
    fn from(value: RenderConfigJson) -> Self {
        Self {
            background: value.background,
            global_alpha: value.global_alpha,
            outline_thickness: value.outline_thickness,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    tensor_path: String,
    label: String,
    image_path: Option<String>,
    image_width: usize,
    image_height: usize,
    detections_path: Option<String>,
    heatmap_path: Option<String>,
    annotated_path: Option<String>,
    show_heatmap: bool,
    show_boxes: bool,
    crop_padding: usize,
    decode: DecodeConfigJson,
    iou_threshold: f32,
    density: DensityConfigJson,
    render: RenderConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        let options = RenderOptions::default();
        Self {
            tensor_path: String::new(),
            label: "pothole".to_string(),
            image_path: None,
            image_width: 0,
            image_height: 0,
            detections_path: None,
            heatmap_path: None,
            annotated_path: None,
            show_heatmap: options.show_heatmap,
            show_boxes: options.show_boxes,
            crop_padding: hotspot::assess::DEFAULT_CROP_PADDING,
            decode: DecodeConfigJson::default(),
            iou_threshold: HotspotConfig::default().iou_threshold,
            density: DensityConfigJson::default(),
            render: RenderConfigJson::default(),
        }
    }
}

/// Raw detector output stored as JSON.
#[derive(Debug, Deserialize)]
struct TensorFile {
    shape: Vec<usize>,
    data: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct AssessmentRecord {
    confidence: &'static str,
    size: &'static str,
    shape: &'static str,
    placement: &'static str,
    area_percent: f32,
    crowded: bool,
    summary: String,
}

impl From<Assessment> for AssessmentRecord {
    fn from(value: Assessment) -> Self {
        Self {
            confidence: value.confidence.as_str(),
            size: value.size.as_str(),
            shape: value.shape.as_str(),
            placement: value.placement.as_str(),
            area_percent: value.area_percent,
            crowded: value.crowded,
            summary: value.summary(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CropRecord {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl From<CropRect> for CropRecord {
    fn from(value: CropRect) -> Self {
        Self {
            x: value.x,
            y: value.y,
            width: value.width,
            height: value.height,
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    confidence: f32,
    label: String,
    assessment: AssessmentRecord,
    crop: CropRecord,
}

#[derive(Debug, Serialize)]
struct Output {
    image_width: usize,
    image_height: usize,
    count: usize,
    detections: Vec<DetectionRecord>,
}

fn record(
    det: &Detection,
    assessment: Assessment,
    width: usize,
    height: usize,
    padding: usize,
) -> Result<DetectionRecord, hotspot::HotspotError> {
    Ok(DetectionRecord {
        x: det.x(),
        y: det.y(),
        width: det.width(),
        height: det.height(),
        confidence: det.confidence(),
        label: det.label().to_string(),
        assessment: assessment.into(),
        crop: crop_region(det, width, height, padding)?.into(),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("hotspot=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.tensor_path.is_empty() {
        return Err("tensor_path must be set in the config".into());
    }

    let base = match &config.image_path {
        Some(path) => Some(load_rgba_image(path)?),
        None => None,
    };
    let (width, height) = match &base {
        Some(img) => (img.width(), img.height()),
        None => (config.image_width, config.image_height),
    };
    if width == 0 || height == 0 {
        return Err("image_path or image_width/image_height must be set in the config".into());
    }

    let tensor_text = fs::read_to_string(&config.tensor_path)?;
    let tensor: TensorFile = serde_json::from_str(&tensor_text)?;

    let hotspot_cfg = HotspotConfig {
        decode: config.decode.into(),
        iou_threshold: config.iou_threshold,
        density: config.density.into(),
        render: config.render.into(),
    };
    let detector = Detector::new(hotspot_cfg, config.label.as_str())?;

    let detections = detector.detect(&RawTensor::new(&tensor.data, &tensor.shape), width, height)?;
    let assessments = detector.assess(&detections, width, height);

    if let Some(path) = &config.heatmap_path {
        let layer = detector.heatmap(&detections, width, height)?;
        save_rgba_png(path, layer.as_bytes(), width, height)?;
    }

    if let Some(path) = &config.annotated_path {
        let base_rgba = match base {
            Some(img) => img.into_vec(),
            None => {
                let [r, g, b] = hotspot_cfg.render.background;
                [r, g, b, 255].repeat(width * height)
            }
        };
        let options = RenderOptions {
            show_heatmap: config.show_heatmap,
            show_boxes: config.show_boxes,
        };
        let annotated = detector.render(&base_rgba, width, height, &detections, options)?;
        save_rgba_png(path, &annotated, width, height)?;
    }

    let records = detections
        .iter()
        .zip(assessments)
        .map(|(det, assessment)| record(det, assessment, width, height, config.crop_padding))
        .collect::<Result<Vec<_>, _>>()?;
    let output = Output {
        image_width: width,
        image_height: height,
        count: records.len(),
        detections: records,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.detections_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
