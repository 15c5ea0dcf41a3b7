#[cfg(test)]
mod tests {
    use crate::helpers::app::{TestApp, TestOptions, make_test_app, make_test_app_with};
    use crate::helpers::fixtures::{
        multipart_body, multipart_without_file, notebook_zip, reference_notebook, student_notebook,
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use chrono::Duration;
    use serde_json::Value;
    use std::sync::atomic::Ordering;
    use util::test_helpers::zip_bytes;

    async fn upload(app: &TestApp, filename: &str, content: &[u8]) -> (StatusCode, Value) {
        let (body, content_type) = multipart_body(filename, content);
        let req = Request::builder()
            .method("POST")
            .uri("/api/submissions")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        app.send(req).await
    }

    fn assert_nothing_written(app: &TestApp) {
        assert!(app.history().load().unwrap().is_empty());
        assert!(app.commits().is_empty());
        assert!(!app.repo_path("solutions").exists());
    }

    #[tokio::test]
    async fn original_submission_is_graded_and_recorded() {
        let app = make_test_app().await;
        let (status, json) = upload(&app, "cap2-Alice.zip", &notebook_zip(&student_notebook())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["success"], true);
        let data = &json["data"];
        assert_eq!(data["submitter"], "alice");
        assert_eq!(data["assignment"], "Chapter 2");
        assert_eq!(data["notebook"], "solution/solution.ipynb");
        assert_eq!(data["originality"]["label"], "Original");
        assert_eq!(data["evaluation"]["total"], 7.5);
        assert_eq!(data["evaluation"]["source"], "model");
        assert_eq!(data["synced"], true);
        assert_eq!(app.grader.calls.load(Ordering::SeqCst), 1);

        assert!(app.repo_path("uploads/chapter_2/cap2-Alice.zip").is_file());
        let solutions: Vec<_> = std::fs::read_dir(app.repo_path("solutions/chapter_2"))
            .unwrap()
            .collect();
        assert_eq!(solutions.len(), 1);

        let history = app.history().load().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].submitter, "alice");
        assert_eq!(history[0].total, 7.5);

        let registry = app.registry().load().unwrap();
        assert_eq!(registry.cell("alice", "Chapter 2"), Some("✅"));
        assert_eq!(registry.cell("bob", "Chapter 2"), Some(""));

        assert_eq!(app.commits(), vec!["Chapter 2 - alice - Score: 7.5/10".to_string()]);
    }

    #[tokio::test]
    async fn resubmission_appends_a_second_history_row() {
        let app = make_test_app().await;
        let archive = notebook_zip(&student_notebook());
        upload(&app, "cap2-bob.zip", &archive).await;
        let (status, _) = upload(&app, "cap2-bob.zip", &archive).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(app.history().for_assignment("Chapter 2").unwrap().len(), 2);
        assert_eq!(app.commits().len(), 2);
    }

    #[tokio::test]
    async fn direct_copy_gets_zero_without_grading() {
        let app = make_test_app().await;
        let (status, json) = upload(&app, "cap2-carol.zip", &notebook_zip(&reference_notebook())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["data"]["originality"]["label"], "DirectCopy");
        assert_eq!(json["data"]["evaluation"]["total"], 0.0);
        assert_eq!(json["data"]["evaluation"]["source"], "direct_copy");
        assert_eq!(app.grader.calls.load(Ordering::SeqCst), 0);

        let history = app.history().load().unwrap();
        assert_eq!(history[0].total, 0.0);
    }

    #[tokio::test]
    async fn invalid_filename_is_rejected() {
        let app = make_test_app().await;
        let (status, json) = upload(&app, "alice_solution.zip", &notebook_zip(&student_notebook())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["message"].as_str().unwrap().contains("invalid filename"));
        assert_nothing_written(&app);
        assert!(!app.repo_path("uploads/chapter_2").exists());
    }

    #[tokio::test]
    async fn unknown_submitter_is_rejected() {
        let app = make_test_app().await;
        let (status, json) = upload(&app, "cap2-mallory.zip", &notebook_zip(&student_notebook())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"].as_str().unwrap().contains("mallory"));
        assert_nothing_written(&app);
        assert_eq!(app.grader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn archive_without_notebook_is_rejected() {
        let app = make_test_app().await;
        let archive = zip_bytes(&[("readme.md", b"no notebook here".as_slice())]);
        let (status, json) = upload(&app, "cap2-alice.zip", &archive).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"].as_str().unwrap().contains(".ipynb"));
        assert_nothing_written(&app);
    }

    #[tokio::test]
    async fn malformed_notebook_is_rejected() {
        let app = make_test_app().await;
        let archive = zip_bytes(&[("work.ipynb", b"{ not json".as_slice())]);
        let (status, _) = upload(&app, "cap2-alice.zip", &archive).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_nothing_written(&app);
    }

    #[tokio::test]
    async fn missing_file_field_is_rejected() {
        let app = make_test_app().await;
        let (body, content_type) = multipart_without_file();
        let req = Request::builder()
            .method("POST")
            .uri("/api/submissions")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        let (status, json) = app.send(req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "missing 'file' field");
    }

    #[tokio::test]
    async fn submissions_after_deadline_are_forbidden() {
        let app = make_test_app_with(TestOptions {
            deadline_in: Duration::hours(-1),
            ..TestOptions::default()
        })
        .await;
        let (status, json) = upload(&app, "cap2-alice.zip", &notebook_zip(&student_notebook())).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["success"], false);
        assert_nothing_written(&app);
        assert_eq!(app.sync.pulls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unavailable_reference_is_a_bad_gateway() {
        let app = make_test_app_with(TestOptions {
            reference_available: false,
            ..TestOptions::default()
        })
        .await;
        let (status, json) = upload(&app, "cap2-alice.zip", &notebook_zip(&student_notebook())).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["message"].as_str().unwrap().starts_with("reference unavailable"));
        assert_nothing_written(&app);

        let registry = app.registry().load().unwrap();
        assert_eq!(registry.cell("alice", "Chapter 2"), Some(""));
    }

    #[tokio::test]
    async fn corrupt_history_leaves_no_files_behind() {
        let app = make_test_app().await;
        let history_path = app.history().path().to_path_buf();
        std::fs::create_dir_all(history_path.parent().unwrap()).unwrap();
        std::fs::write(&history_path, "not,a,history\nx,y,z\n").unwrap();
        let registry_before = std::fs::read(app.registry().path()).unwrap();

        let (status, json) = upload(&app, "cap2-alice.zip", &notebook_zip(&student_notebook())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert!(!app.repo_path("uploads/chapter_2").exists());
        assert!(!app.repo_path("solutions").exists());
        assert_eq!(std::fs::read_to_string(&history_path).unwrap(), "not,a,history\nx,y,z\n");
        assert_eq!(std::fs::read(app.registry().path()).unwrap(), registry_before);
        assert!(app.commits().is_empty());
    }

    #[tokio::test]
    async fn failed_write_reverts_earlier_writes() {
        let app = make_test_app().await;
        // A plain file where the solutions directory should go.
        std::fs::write(app.repo_path("solutions"), "blocked").unwrap();
        let registry_before = std::fs::read(app.registry().path()).unwrap();

        let (status, _) = upload(&app, "cap2-alice.zip", &notebook_zip(&student_notebook())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!app.repo_path("uploads/chapter_2").exists());
        assert_eq!(std::fs::read_to_string(app.repo_path("solutions")).unwrap(), "blocked");
        assert!(app.history().load().unwrap().is_empty());
        assert!(!app.history().path().exists());
        assert_eq!(std::fs::read(app.registry().path()).unwrap(), registry_before);
        assert!(app.commits().is_empty());
    }

    #[tokio::test]
    async fn failed_push_keeps_local_state() {
        let app = make_test_app_with(TestOptions {
            fail_push: true,
            ..TestOptions::default()
        })
        .await;
        let (status, json) = upload(&app, "cap2-alice.zip", &notebook_zip(&student_notebook())).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["synced"], false);
        assert_eq!(app.history().load().unwrap().len(), 1);
        assert_eq!(
            app.registry().load().unwrap().cell("alice", "Chapter 2"),
            Some("✅")
        );
        assert_eq!(app.commits().len(), 1);
    }
}
