use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use stuff_plus::config::Settings;
use stuff_plus::routes::{self, AppState};
use stuff_plus::services::{MetricsExtractor, TesseractEngine, TreeEnsembleModel};
use stuff_plus::PredictionService;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Configuration comes first so it can drive logging
    let settings = Settings::load()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    // Initialize logging; LOG_LEVEL / LOG_FORMAT override the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting Stuff+ service...");
    info!("Configuration loaded successfully");

    // The model is loaded once and shared read-only; a bad artifact stops startup
    let model = TreeEnsembleModel::load(&settings.model.path).map_err(|e| {
        error!("Failed to load model from {}: {}", settings.model.path, e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e)
    })?;

    info!("Model loaded from {}", settings.model.path);

    let service = PredictionService::new(Arc::new(model));

    let engine = TesseractEngine::new(
        &settings.ocr.tesseract_path,
        settings.ocr.language.clone(),
        settings.ocr.page_segmentation_mode,
    );
    let extractor = MetricsExtractor::new(Box::new(engine)).map_err(|e| {
        error!("Failed to compile OCR patterns: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    info!(
        "OCR engine: {} (lang={}, psm={})",
        settings.ocr.tesseract_path, settings.ocr.language, settings.ocr.page_segmentation_mode
    );

    let app_state = AppState {
        service,
        extractor: Arc::new(extractor),
        max_upload_bytes: settings.ocr.max_upload_bytes,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
