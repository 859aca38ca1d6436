// Batch generation - issues independent requests concurrently and keeps whatever succeeds

use crate::error::Result;
use crate::gemini::{ImageBackend, ImageRequest};
use crate::prompt::build_prompt;
use crate::types::{GenerationConfig, ImageData};
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;

/// Run `config.image_count` generations concurrently.
///
/// Every request settles before this returns. A failed or empty request
/// drops out of the result, it never aborts its siblings. Results are in
/// completion order.
pub async fn generate_batch(
    backend: &dyn ImageBackend,
    config: &GenerationConfig,
) -> Result<Vec<ImageData>> {
    config.validate()?;

    let request = ImageRequest {
        prompt: build_prompt(config),
        reference: config.reference_image.clone(),
        model: config.model.model_id().to_string(),
        aspect_ratio: config.aspect_ratio,
    };

    tracing::info!(
        count = config.image_count,
        model = %request.model,
        remix = config.is_remix(),
        "issuing generation batch"
    );
    tracing::debug!("generating with prompt:\n{}", request.prompt);

    let mut pending: FuturesUnordered<_> = (0..config.image_count)
        .map(|slot| {
            let request = &request;
            async move { (slot, backend.generate(request).await) }
        })
        .collect();

    let mut images = Vec::with_capacity(usize::from(config.image_count));
    while let Some((slot, outcome)) = pending.next().await {
        match outcome {
            Ok(Some(image)) => {
                tracing::debug!(slot, bytes = image.bytes.len(), "request returned an image");
                images.push(image);
            }
            Ok(None) => {
                tracing::warn!(slot, "request returned no image data");
            }
            Err(e) => {
                tracing::error!(slot, "generation failed: {}", e);
            }
        }
    }

    tracing::info!(
        requested = config.image_count,
        received = images.len(),
        "generation batch settled"
    );
    Ok(images)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scripted backend: each call pops the next outcome
    pub(crate) struct ScriptedBackend {
        outcomes: Mutex<Vec<Outcome>>,
        pub(crate) calls: AtomicUsize,
        pub(crate) last_request: Mutex<Option<ImageRequest>>,
    }

    #[derive(Clone)]
    pub(crate) enum Outcome {
        Image(u8, u64),
        Empty,
        Fail,
    }

    impl ScriptedBackend {
        pub(crate) fn new(outcomes: Vec<Outcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ImageBackend for ScriptedBackend {
        async fn generate(&self, request: &ImageRequest) -> Result<Option<ImageData>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            let outcome = self.outcomes.lock().unwrap().remove(0);
            match outcome {
                Outcome::Image(tag, delay_ms) => {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    Ok(Some(ImageData::new("image/png", vec![tag])))
                }
                Outcome::Empty => Ok(None),
                Outcome::Fail => Err(Error::Upstream("503 Service Unavailable".into())),
            }
        }
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_successes() {
        let backend = ScriptedBackend::new(vec![
            Outcome::Image(1, 0),
            Outcome::Fail,
            Outcome::Image(2, 0),
            Outcome::Empty,
        ]);
        let config = GenerationConfig::new("orb").with_image_count(4);

        let images = generate_batch(&backend, &config).await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_all_fail_yields_empty() {
        let backend = ScriptedBackend::new(vec![Outcome::Fail, Outcome::Fail]);
        let config = GenerationConfig::new("orb").with_image_count(2);
        assert!(generate_batch(&backend, &config).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_results_in_completion_order() {
        let backend = ScriptedBackend::new(vec![
            Outcome::Image(1, 60),
            Outcome::Image(2, 0),
            Outcome::Image(3, 30),
        ]);
        let config = GenerationConfig::new("orb").with_image_count(3);

        let images = generate_batch(&backend, &config).await.unwrap();
        let tags: Vec<u8> = images.iter().map(|i| i.bytes[0]).collect();
        assert_eq!(tags, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_validation_skips_backend() {
        let backend = ScriptedBackend::new(vec![]);
        let err = generate_batch(&backend, &GenerationConfig::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_request_carries_model_and_reference() {
        let backend = ScriptedBackend::new(vec![Outcome::Image(1, 0)]);
        let mut config = GenerationConfig::new("orb");
        config.model = crate::types::ModelTier::Pro;
        config.reference_image = Some(crate::types::ReferenceImage::from_bytes("image/png", &[9]));

        generate_batch(&backend, &config).await.unwrap();
        let request = backend.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.model, "gemini-3-pro-image-preview");
        assert!(request.reference.is_some());
        assert!(request.prompt.contains("Create a 3D illustration of: orb"));
    }
}
