use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;

use crate::models::Sample;
use crate::scorer::ScreenService;

#[derive(Debug, Deserialize)]
pub struct ModelQuery {
    pub model: Option<String>,
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/samples")
            .route(web::get().to(describe))
            .route(web::post().to(screen_sample)),
    )
    .service(
        web::resource("/samples/{sampleCurve}/{controlCurve}")
            .route(web::get().to(screen_curve_pair)),
    );
}

/// GET /samples — metadata probe. Resolves the model name and returns an
/// otherwise empty sample; nothing touches the filesystem or the scorer.
pub async fn describe(
    service: web::Data<ScreenService>,
    query: web::Query<ModelQuery>,
) -> Result<HttpResponse, actix_web::Error> {
    let model = service.resolve_model(query.model.as_deref())?;
    Ok(HttpResponse::Ok().json(Sample::for_model(&model)))
}

/// GET /samples/{sampleCurve}/{controlCurve} — convenience path carrying the
/// two hex curves as path segments.
pub async fn screen_curve_pair(
    service: web::Data<ScreenService>,
    path: web::Path<(String, String)>,
    query: web::Query<ModelQuery>,
) -> Result<HttpResponse, actix_web::Error> {
    let model = service.resolve_model(query.model.as_deref())?;
    let (serum_hex, control_hex) = path.into_inner();
    run_pipeline(service, Sample::from_curve_pair(serum_hex, control_hex), model).await
}

/// POST /samples — full submission. Extra fields on the inbound sample are
/// accepted and ignored by the pipeline; the curves are never validated here,
/// the scoring script is the authority on what it can read.
pub async fn screen_sample(
    service: web::Data<ScreenService>,
    body: web::Json<Sample>,
    query: web::Query<ModelQuery>,
) -> Result<HttpResponse, actix_web::Error> {
    let model = service.resolve_model(query.model.as_deref())?;
    run_pipeline(service, body.into_inner(), model).await
}

/// Encode, invoke, decode. The scorer invocation blocks on the child process,
/// so it runs on the blocking thread pool.
async fn run_pipeline(
    service: web::Data<ScreenService>,
    sample: Sample,
    model: String,
) -> Result<HttpResponse, actix_web::Error> {
    let scored = web::block(move || service.screen(&sample, &model)).await??;
    info!("screened sample, prediction={:?}", scored.prediction);
    Ok(HttpResponse::Ok().json(scored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScorerConfig;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;

    fn service_with_script(dir: &TempDir, body: &str) -> web::Data<ScreenService> {
        fs::write(dir.path().join("fake_screen.sh"), format!("#!/bin/sh\n{body}\n")).unwrap();
        web::Data::new(ScreenService::new(ScorerConfig {
            work_dir: dir.path().to_path_buf(),
            interpreter: "sh".to_string(),
            script: "fake_screen.sh".to_string(),
            supported_model: "euh-immunology-v1.0".to_string(),
        }))
    }

    macro_rules! test_app {
        ($data:expr) => {
            test::init_service(App::new().app_data($data.clone()).configure(routes)).await
        };
    }

    #[actix_web::test]
    async fn metadata_probe_returns_model_stamped_empty_sample() {
        let dir = TempDir::new().unwrap();
        let data = service_with_script(&dir, "touch invoked_marker");
        let app = test_app!(data);

        let req = test::TestRequest::get().uri("/samples").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["scikitLearnModelName"], "euh-immunology-v1.0");
        assert!(body["prediction"].is_null());
        assert!(!dir.path().join("invoked_marker").exists());
    }

    #[actix_web::test]
    async fn post_scores_a_sample_end_to_end() {
        let dir = TempDir::new().unwrap();
        let data = service_with_script(
            &dir,
            "cat \"$1\" > seen_csv.txt\necho '[{\"sebiaSerumCurve\":\"0A0B\",\"sebiaSerumGelControlCurve\":\"0C0D\",\"prediction\":1}]'",
        );
        let app = test_app!(data);

        let req = test::TestRequest::post()
            .uri("/samples")
            .set_json(json!({"sebiaSerumCurve": "0A0B", "sebiaSerumGelControlCurve": "0C0D"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["prediction"], 1);
        assert_eq!(body["scikitLearnModelName"], "euh-immunology-v1.0");
        let seen_csv = fs::read_to_string(dir.path().join("seen_csv.txt")).unwrap();
        assert_eq!(
            seen_csv,
            "sebiaSerumCurve,sebiaSerumGelControlCurve\n0A0B,0C0D\n"
        );
    }

    #[actix_web::test]
    async fn curve_pair_path_feeds_the_same_pipeline() {
        let dir = TempDir::new().unwrap();
        let data = service_with_script(
            &dir,
            "cat \"$1\" > seen_csv.txt\necho '[{\"prediction\":0}]'",
        );
        let app = test_app!(data);

        let req = test::TestRequest::get()
            .uri("/samples/AB12/CD34")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["prediction"], 0);
        let seen_csv = fs::read_to_string(dir.path().join("seen_csv.txt")).unwrap();
        assert_eq!(seen_csv, "sebiaSerumCurve,sebiaSerumGelControlCurve\nAB12,CD34\n");
    }

    #[actix_web::test]
    async fn unknown_model_is_rejected_before_any_scorer_activity() {
        let dir = TempDir::new().unwrap();
        let data = service_with_script(&dir, "touch invoked_marker\necho '[{\"prediction\":1}]'");
        let app = test_app!(data);

        for uri in [
            "/samples?model=euh-immunology-v2.0",
            "/samples/AB/CD?model=euh-immunology-v2.0",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }

        let req = test::TestRequest::post()
            .uri("/samples?model=euh-immunology-v2.0")
            .set_json(json!({"sebiaSerumCurve": "AB"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        assert!(!dir.path().join("invoked_marker").exists());
    }

    #[actix_web::test]
    async fn empty_model_parameter_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let data = service_with_script(&dir, "echo '[{\"prediction\":1}]'");
        let app = test_app!(data);

        let req = test::TestRequest::get().uri("/samples?model=").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["scikitLearnModelName"], "euh-immunology-v1.0");
    }

    #[actix_web::test]
    async fn scoring_failure_maps_to_bad_request() {
        let dir = TempDir::new().unwrap();
        let data = service_with_script(&dir, "exit 1");
        let app = test_app!(data);

        let req = test::TestRequest::post()
            .uri("/samples")
            .set_json(json!({"sebiaSerumCurve": "AB", "sebiaSerumGelControlCurve": "CD"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn undecodable_output_maps_to_server_error() {
        let dir = TempDir::new().unwrap();
        let data = service_with_script(&dir, "echo 'not json at all'");
        let app = test_app!(data);

        let req = test::TestRequest::post()
            .uri("/samples")
            .set_json(json!({"sebiaSerumCurve": "AB", "sebiaSerumGelControlCurve": "CD"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
