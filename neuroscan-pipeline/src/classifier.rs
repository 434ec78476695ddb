//! Image classifier adapter
//!
//! Turns an MRI image on disk into a [`Classification`]. The production
//! implementation preprocesses the image locally and asks a REST model server
//! for the tumor probability.

use async_trait::async_trait;
use image::ImageReader;
use image::imageops::FilterType;
use std::path::Path;
use tracing::{info, warn};

use neuroscan_client::ModelServerClient;
use neuroscan_core::ClassifierError;
use neuroscan_core::domain::classification::Classification;

/// Input edge length the classifier was trained on
pub const INPUT_SIZE: u32 = 224;

/// One preprocessed image: rows of RGB pixels scaled to [0, 1]
pub type ImageTensor = Vec<Vec<[f32; 3]>>;

/// Binary tumor classifier over MRI images
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Whether the backing model was loaded when the process started
    fn is_available(&self) -> bool;

    /// Classifies the image at `image_path`
    async fn classify(&self, image_path: &Path) -> Result<Classification, ClassifierError>;
}

/// Decodes an image and reshapes it into the classifier's input tensor
///
/// Converts to RGB, resizes to `INPUT_SIZE` x `INPUT_SIZE` and scales each
/// channel to [0, 1].
pub fn preprocess(image_path: &Path) -> Result<ImageTensor, ClassifierError> {
    if !image_path.is_file() {
        return Err(ClassifierError::ImageNotFound(image_path.to_path_buf()));
    }

    let img = ImageReader::open(image_path)
        .map_err(|e| ClassifierError::PredictionError(format!("Failed to read image: {}", e)))?
        .with_guessed_format()
        .map_err(|e| ClassifierError::PredictionError(format!("Failed to read image: {}", e)))?
        .decode()
        .map_err(|e| ClassifierError::PredictionError(format!("Failed to decode image: {}", e)))?;

    let rgb = img
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom)
        .to_rgb8();

    Ok(rgb
        .rows()
        .map(|row| {
            row.map(|px| {
                [
                    px[0] as f32 / 255.0,
                    px[1] as f32 / 255.0,
                    px[2] as f32 / 255.0,
                ]
            })
            .collect()
        })
        .collect())
}

/// Classifier backed by a TensorFlow-Serving-style model server
pub struct ModelServerClassifier {
    client: ModelServerClient,
    available: bool,
}

impl ModelServerClassifier {
    /// Probes the model server once and remembers whether the model is loaded
    pub async fn connect(client: ModelServerClient) -> Self {
        let available = match client.model_status().await {
            Ok(status) if status.is_available() => {
                info!("Classifier model '{}' loaded", client.model());
                true
            }
            Ok(_) => {
                warn!("Classifier model '{}' has no available version", client.model());
                false
            }
            Err(e) => {
                warn!("Classifier model '{}' unreachable: {}", client.model(), e);
                false
            }
        };

        Self { client, available }
    }
}

#[async_trait]
impl Classifier for ModelServerClassifier {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn classify(&self, image_path: &Path) -> Result<Classification, ClassifierError> {
        if !image_path.is_file() {
            return Err(ClassifierError::ImageNotFound(image_path.to_path_buf()));
        }

        if !self.available {
            return Err(ClassifierError::ModelUnavailable(format!(
                "model '{}' is not loaded on {}",
                self.client.model(),
                self.client.base_url()
            )));
        }

        let tensor = preprocess(image_path)?;
        let predictions = self
            .client
            .predict(std::slice::from_ref(&tensor))
            .await
            .map_err(|e| ClassifierError::PredictionError(e.to_string()))?;

        let probability = predictions
            .first()
            .and_then(|row| row.first())
            .copied()
            .ok_or_else(|| ClassifierError::PredictionError("empty prediction".to_string()))?;

        Classification::from_probability(probability)
    }
}
