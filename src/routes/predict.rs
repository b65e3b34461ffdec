use actix_multipart::Multipart;
use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use futures_util::StreamExt;
use std::sync::Arc;
use validator::Validate;
use crate::core::{build_feature_vector, measurement_from_metrics, PredictionService};
use crate::models::{
    ErrorResponse, Handedness, HealthResponse, PredictRequest, PredictResponse, ScreenshotForm,
    ScreenshotPredictResponse,
};
use crate::services::{MetricsExtractor, ModelError, OcrError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: PredictionService,
    pub extractor: Arc<MetricsExtractor>,
    pub max_upload_bytes: usize,
}

/// Configure prediction routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/predict", web::post().to(predict))
        .route("/upload_screenshot", web::post().to(upload_screenshot));
}

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

fn model_error_response(e: &ModelError) -> HttpResponse {
    tracing::error!("Model inference failed: {}", e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Model inference failed", e.to_string())
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_trees: state.service.model_trees(),
        timestamp: chrono::Utc::now(),
    })
}

/// Score a pitch from structured readings
///
/// POST /predict
///
/// Request body:
/// ```json
/// {
///   "pitchType": "FF", "release_speed": 95, "handedness": "R",
///   "pfx_x": 12, "pfx_z": 18, "release_extension": 6.5,
///   "release_spin_rate": 2300, "spin_axis": 180,
///   "release_pos_x": -1.8, "release_pos_z": 5.9,
///   "fb_velo": 95, "fb_ivb": 18, "fb_hmov": 12
/// }
/// ```
async fn predict(
    state: web::Data<AppState>,
    req: web::Json<PredictRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for predict request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let features = build_feature_vector(&req.measurement(), &req.fastball());
    tracing::debug!("Feature vector: {:?}", features);

    match state.service.predict(&features) {
        Ok(result) => {
            tracing::info!(
                "Scored {} ({}): stuff+={:.1} percentile={:.1}",
                req.pitch_type,
                req.handedness,
                result.stuff_plus,
                result.percentile
            );
            HttpResponse::Ok().json(PredictResponse::from(result))
        }
        Err(e) => model_error_response(&e),
    }
}

/// Score a pitch from a device screenshot
///
/// POST /upload_screenshot (multipart/form-data)
///
/// Fields: `file` (image), `pitchType`, `handedness`, and optional
/// `fb_velo`, `fb_ivb`, `fb_hmov`. Missing fastball values fall back to the
/// pitch's own readings.
async fn upload_screenshot(
    state: web::Data<AppState>,
    payload: Multipart,
) -> impl Responder {
    let mut form = match read_form(payload, state.max_upload_bytes).await {
        Ok(form) => form,
        Err(FormError::TooLarge) => {
            return error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Upload too large",
                format!("Uploads are limited to {} bytes", state.max_upload_bytes),
            );
        }
        Err(FormError::Multipart(e)) => {
            tracing::info!("Malformed multipart upload: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Invalid form", e);
        }
    };

    let Some(image) = form.image.take() else {
        return error_response(StatusCode::BAD_REQUEST, "Missing file", "file field is required");
    };

    let pitch_type = match form.pitch_type.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => {
            return error_response(StatusCode::BAD_REQUEST, "Missing pitchType", "pitchType field is required");
        }
    };

    let handedness = match form.handedness.as_deref().unwrap_or("").parse::<Handedness>() {
        Ok(h) => h,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, "Invalid handedness", e),
    };

    // OCR shells out and blocks; keep it off the async workers
    let extractor = state.extractor.clone();
    let metrics = match web::block(move || extractor.extract(&image)).await {
        Ok(Ok(metrics)) => metrics,
        Ok(Err(OcrError::ImageDecode(e))) => {
            tracing::info!("Rejected undecodable screenshot: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Invalid image", e.to_string());
        }
        Ok(Err(e)) => {
            tracing::error!("Screenshot OCR failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "OCR failed", e.to_string());
        }
        Err(e) => {
            tracing::error!("OCR task failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "OCR failed", e.to_string());
        }
    };

    tracing::debug!("Parsed metrics: {:?}", metrics);

    let fastball = form.resolve_fastball(&metrics);
    let measurement = measurement_from_metrics(&metrics, &pitch_type, handedness);
    let features = build_feature_vector(&measurement, &fastball);
    tracing::debug!("Feature vector: {:?}", features);

    match state.service.predict(&features) {
        Ok(result) => {
            tracing::info!(
                "Scored screenshot {} ({}): stuff+={:.1} percentile={:.1}",
                pitch_type,
                handedness,
                result.stuff_plus,
                result.percentile
            );
            HttpResponse::Ok().json(ScreenshotPredictResponse {
                stuff_plus: result.stuff_plus,
                percentile: result.percentile,
                parsed_metrics: metrics,
                pitch_type,
                handedness,
                fb_reference: fastball,
            })
        }
        Err(e) => model_error_response(&e),
    }
}

enum FormError {
    TooLarge,
    Multipart(String),
}

/// Collect the upload form fields, enforcing the size limit across all parts
async fn read_form(mut payload: Multipart, limit: usize) -> Result<ScreenshotForm, FormError> {
    let mut form = ScreenshotForm::default();
    let mut total = 0usize;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| FormError::Multipart(e.to_string()))?;
        let name = field.name().unwrap_or_default().to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| FormError::Multipart(e.to_string()))?;
            total += chunk.len();
            if total > limit {
                return Err(FormError::TooLarge);
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "file" => form.image = Some(data),
            "pitchType" => form.pitch_type = Some(text(data)),
            "handedness" => form.handedness = Some(text(data)),
            "fb_velo" => form.fb_velo = Some(text(data)),
            "fb_ivb" => form.fb_ivb = Some(text(data)),
            "fb_hmov" => form.fb_hmov = Some(text(data)),
            other => tracing::debug!("Ignoring unknown form field {:?}", other),
        }
    }

    Ok(form)
}

fn text(data: Vec<u8>) -> String {
    String::from_utf8_lossy(&data).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_status() {
        let resp = error_response(StatusCode::PAYLOAD_TOO_LARGE, "Upload too large", "limit");
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_form_text_trimmed() {
        assert_eq!(text(b" FF \r\n".to_vec()), "FF");
    }
}
