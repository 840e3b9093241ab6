//! Python bindings for the hotspot detection heatmap library.
//!
//! This module exposes decoding, density synthesis and heatmap rendering to
//! Python via PyO3. Images are exchanged as `(height, width, 4)` uint8 arrays.

use numpy::ndarray::{Array2, Array3};
use numpy::{
    IntoPyArray, PyArray2, PyArray3, PyReadonlyArray3, PyUntypedArrayMethods,
};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use hotspot::{
    BBox, DecodeConfig as RustDecodeConfig, DensityConfig as RustDensityConfig,
    Detection as RustDetection, Detector, HotspotConfig as RustHotspotConfig, HotspotError,
    Label, RawTensor, RenderConfig as RustRenderConfig, RenderOptions,
};

const DEFAULT_LABEL: &str = "pothole";

/// Convert a HotspotError to a Python exception.
fn to_py_err(err: HotspotError) -> PyErr {
    match err {
        HotspotError::InvalidInput(_)
        | HotspotError::InvalidBox { .. }
        | HotspotError::InvalidDimensions { .. }
        | HotspotError::MalformedTensor { .. }
        | HotspotError::UnsupportedBatch { .. }
        | HotspotError::BufferTooSmall { .. } => PyValueError::new_err(err.to_string()),
        HotspotError::ImageIo { .. } => PyRuntimeError::new_err(err.to_string()),
    }
}

/// Detected object in image pixel coordinates.
#[pyclass]
#[derive(Clone)]
pub struct Detection {
    inner: RustDetection,
}

#[pymethods]
impl Detection {
    /// Create a detection from a top-left box.
    ///
    /// Raises ValueError for non-positive sizes; confidence is clamped to
    /// [0, 1].
    #[new]
    #[pyo3(signature = (x, y, width, height, confidence, label = "pothole"))]
    fn new(x: f32, y: f32, width: f32, height: f32, confidence: f32, label: &str) -> PyResult<Self> {
        let inner = RustDetection::new(BBox::new(x, y, width, height), confidence, Label::new(label))
            .map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Left edge in pixels.
    #[getter]
    fn x(&self) -> f32 {
        self.inner.x()
    }

    /// Top edge in pixels.
    #[getter]
    fn y(&self) -> f32 {
        self.inner.y()
    }

    /// Box width in pixels.
    #[getter]
    fn width(&self) -> f32 {
        self.inner.width()
    }

    /// Box height in pixels.
    #[getter]
    fn height(&self) -> f32 {
        self.inner.height()
    }

    /// Confidence in [0, 1].
    #[getter]
    fn confidence(&self) -> f32 {
        self.inner.confidence()
    }

    /// Class label.
    #[getter]
    fn label(&self) -> String {
        self.inner.label().to_string()
    }

    fn __repr__(&self) -> String {
        format!(
            "Detection(x={:.1}, y={:.1}, width={:.1}, height={:.1}, confidence={:.3}, label='{}')",
            self.inner.x(),
            self.inner.y(),
            self.inner.width(),
            self.inner.height(),
            self.inner.confidence(),
            self.inner.label()
        )
    }
}

/// Pipeline configuration.
#[pyclass]
#[derive(Clone)]
pub struct Config {
    inner: RustHotspotConfig,
}

#[pymethods]
impl Config {
    /// Create a new Config.
    ///
    /// Args:
    ///     confidence_threshold: Minimum candidate confidence (default: 0.5)
    ///     iou_threshold: Suppression overlap threshold (default: 0.4)
    ///     model_input_size: Side of the square model input (default: 640.0)
    ///     min_box_size: Minimum decoded box side in pixels (default: 5.0)
    ///     min_bandwidth: Minimum kernel bandwidth in pixels (default: 30.0)
    ///     blur_kernel_size: Smoothing kernel size (default: 9)
    ///     global_alpha: Heatmap blend strength (default: 0.8)
    ///     parallel: Run blur passes in parallel (default: False)
    #[new]
    #[pyo3(signature = (
        confidence_threshold = 0.5,
        iou_threshold = 0.4,
        model_input_size = 640.0,
        min_box_size = 5.0,
        min_bandwidth = 30.0,
        blur_kernel_size = 9,
        global_alpha = 0.8,
        parallel = false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        confidence_threshold: f32,
        iou_threshold: f32,
        model_input_size: f32,
        min_box_size: f32,
        min_bandwidth: f32,
        blur_kernel_size: usize,
        global_alpha: f32,
        parallel: bool,
    ) -> PyResult<Self> {
        let inner = RustHotspotConfig {
            decode: RustDecodeConfig {
                confidence_threshold,
                model_input_size,
                min_box_size,
            },
            iou_threshold,
            density: RustDensityConfig {
                min_bandwidth,
                blur_kernel_size,
                parallel,
                ..RustDensityConfig::default()
            },
            render: RustRenderConfig {
                global_alpha,
                ..RustRenderConfig::default()
            },
        };
        inner.validate().map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Validate the configuration.
    fn validate(&self) -> PyResult<()> {
        self.inner.validate().map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!(
            "Config(confidence_threshold={}, iou_threshold={}, model_input_size={}, min_box_size={}, min_bandwidth={}, blur_kernel_size={}, global_alpha={}, parallel={})",
            self.inner.decode.confidence_threshold,
            self.inner.iou_threshold,
            self.inner.decode.model_input_size,
            self.inner.decode.min_box_size,
            self.inner.density.min_bandwidth,
            self.inner.density.blur_kernel_size,
            self.inner.render.global_alpha,
            self.inner.density.parallel
        )
    }
}

fn detector(config: Option<Config>, label: &str) -> PyResult<Detector> {
    let cfg = config.map(|c| c.inner).unwrap_or_default();
    Detector::new(cfg, label).map_err(to_py_err)
}

fn unwrap_detections(detections: Vec<Detection>) -> Vec<RustDetection> {
    detections.into_iter().map(|d| d.inner).collect()
}

fn rgba_array<'py>(
    py: Python<'py>,
    data: Vec<u8>,
    width: usize,
    height: usize,
) -> PyResult<Bound<'py, PyArray3<u8>>> {
    let arr = Array3::from_shape_vec((height, width, 4), data)
        .map_err(|err| PyRuntimeError::new_err(err.to_string()))?;
    Ok(arr.into_pyarray(py))
}

/// Decode a raw detector output tensor and suppress overlapping boxes.
///
/// Args:
///     tensor: float32 array of shape (1, channels, candidates)
///     width: Original image width in pixels
///     height: Original image height in pixels
///     config: Config (default: Config())
///     label: Label assigned to every detection (default: "pothole")
///
/// Returns:
///     List of Detection objects, highest confidence first
#[pyfunction]
#[pyo3(signature = (tensor, width, height, config = None, label = "pothole"))]
fn decode(
    tensor: PyReadonlyArray3<'_, f32>,
    width: usize,
    height: usize,
    config: Option<Config>,
    label: &str,
) -> PyResult<Vec<Detection>> {
    let shape = tensor.shape().to_vec();
    let data = tensor.as_slice()?;
    let detector = detector(config, label)?;
    let dets = detector
        .detect(&RawTensor::new(data, &shape), width, height)
        .map_err(to_py_err)?;
    Ok(dets.into_iter().map(|inner| Detection { inner }).collect())
}

/// Build the normalized density grid for a list of detections.
///
/// Returns:
///     float32 array of shape (height, width) with values in [0, 1]
#[pyfunction]
#[pyo3(signature = (detections, width, height, config = None))]
fn density<'py>(
    py: Python<'py>,
    detections: Vec<Detection>,
    width: usize,
    height: usize,
    config: Option<Config>,
) -> PyResult<Bound<'py, PyArray2<f32>>> {
    let detector = detector(config, DEFAULT_LABEL)?;
    let grid = detector
        .density(&unwrap_detections(detections), width, height)
        .map_err(to_py_err)?;
    let arr = Array2::from_shape_vec((height, width), grid.into_vec())
        .map_err(|err| PyRuntimeError::new_err(err.to_string()))?;
    Ok(arr.into_pyarray(py))
}

/// Render the opaque heatmap layer for a list of detections.
///
/// Returns:
///     uint8 array of shape (height, width, 4)
#[pyfunction]
#[pyo3(signature = (detections, width, height, config = None))]
fn heatmap<'py>(
    py: Python<'py>,
    detections: Vec<Detection>,
    width: usize,
    height: usize,
    config: Option<Config>,
) -> PyResult<Bound<'py, PyArray3<u8>>> {
    let detector = detector(config, DEFAULT_LABEL)?;
    let layer = detector
        .heatmap(&unwrap_detections(detections), width, height)
        .map_err(to_py_err)?;
    rgba_array(py, layer.into_vec(), width, height)
}

/// Blend the heatmap and/or box outlines over an RGBA image.
///
/// Args:
///     image: uint8 array of shape (height, width, 4)
///     detections: List of Detection objects
///     config: Config (default: Config())
///     show_heatmap: Screen-blend the density heatmap (default: True)
///     show_boxes: Draw box outlines (default: False)
#[pyfunction]
#[pyo3(signature = (image, detections, config = None, show_heatmap = true, show_boxes = false))]
fn render<'py>(
    py: Python<'py>,
    image: PyReadonlyArray3<'_, u8>,
    detections: Vec<Detection>,
    config: Option<Config>,
    show_heatmap: bool,
    show_boxes: bool,
) -> PyResult<Bound<'py, PyArray3<u8>>> {
    let shape = image.shape();
    let (height, width) = (shape[0], shape[1]);
    if shape[2] != 4 {
        return Err(PyValueError::new_err("image must have 4 channels (RGBA)"));
    }
    let data = image.as_slice()?;
    let detector = detector(config, DEFAULT_LABEL)?;
    let out = detector
        .render(
            data,
            width,
            height,
            &unwrap_detections(detections),
            RenderOptions {
                show_heatmap,
                show_boxes,
            },
        )
        .map_err(to_py_err)?;
    rgba_array(py, out, width, height)
}

/// Intersection over union of two detections.
#[pyfunction]
fn iou(a: &Detection, b: &Detection) -> f32 {
    hotspot::iou(a.inner.bbox(), b.inner.bbox())
}

/// Python module for hotspot.
#[pymodule]
fn _hotspot(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Detection>()?;
    m.add_class::<Config>()?;
    m.add_function(wrap_pyfunction!(decode, m)?)?;
    m.add_function(wrap_pyfunction!(density, m)?)?;
    m.add_function(wrap_pyfunction!(heatmap, m)?)?;
    m.add_function(wrap_pyfunction!(render, m)?)?;
    m.add_function(wrap_pyfunction!(iou, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
