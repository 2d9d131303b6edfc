pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::artifacts::handlers as resume;
use crate::content::{about, contacts, experiences, projects, skills, social_links};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Content API
        .route(
            "/projects/",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/:id",
            put(projects::update_project).delete(projects::delete_project),
        )
        .route(
            "/experiences/",
            get(experiences::list_experiences).post(experiences::create_experience),
        )
        .route("/experiences/:id", delete(experiences::delete_experience))
        .route(
            "/skills/",
            get(skills::list_skills).post(skills::create_skill),
        )
        .route("/skills/:id", delete(skills::delete_skill))
        .route(
            "/skills/categories",
            get(skills::list_categories).post(skills::create_category),
        )
        .route("/skills/categories/:id", delete(skills::delete_category))
        .route(
            "/contacts/",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route("/contacts/:id", delete(contacts::delete_contact))
        .route("/about/content", get(about::list_content))
        .route("/about/stats", get(about::list_stats))
        .route("/social-links/", get(social_links::list_links))
        // Resume artifact API
        .route("/resume/", post(resume::handle_upload))
        .route("/resume/latest", get(resume::handle_latest))
        .route("/resume/:id/file", get(resume::handle_download))
        .route("/resume/:id", delete(resume::handle_delete))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::registry::ArtifactRegistry;
    use crate::artifacts::store::DiskStore;
    use crate::db::{create_pool, init_schema};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn test_app(dir: &TempDir) -> Router {
        let db_path = dir.path().join("test.db");
        let pool = create_pool(&format!("sqlite:{}?mode=rwc", db_path.display()))
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        let store = Arc::new(DiskStore::new(dir.path().join("uploads")));
        let state = AppState {
            artifacts: Arc::new(ArtifactRegistry::new(pool.clone(), store)),
            db: pool,
        };
        build_router(state)
    }

    fn multipart_upload(filename: &str, bytes: &[u8]) -> Request<Body> {
        let boundary = "router-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/resume/")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint_responds_ok() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir).await;

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_resume_upload_latest_download_flow() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir).await;

        let response = app
            .clone()
            .oneshot(multipart_upload("cv.pdf", b"%PDF-1.4 router test"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/resume/latest")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let latest: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(latest["original_filename"], "cv.pdf");
        let file_url = latest["file_url"].as_str().unwrap().to_string();

        let response = app
            .oneshot(Request::builder().uri(file_url).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let downloaded = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&downloaded[..], b"%PDF-1.4 router test");
    }

    #[tokio::test]
    async fn test_latest_is_json_null_when_empty() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/resume/latest")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"null");
    }

    #[tokio::test]
    async fn test_unknown_resume_download_is_404() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/resume/999/file")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_txt_upload_is_rejected_as_unsupported() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir).await;

        let response = app
            .oneshot(multipart_upload("resume.txt", b"plain text"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_upload_without_file_field_is_400() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir).await;

        let boundary = "router-test-boundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nhi\r\n--{boundary}--\r\n"
        );
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/resume/")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
