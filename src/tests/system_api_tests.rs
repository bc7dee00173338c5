#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};
    use std::fs;

    use crate::config::AppConfig;
    use crate::tests::support::{skill_md, TestApp};

    fn app_with_running(pids: Vec<u32>) -> TestApp {
        TestApp::with_config(AppConfig::default(), pids)
    }

    // ---- IDE connections ----

    #[tokio::test]
    async fn test_ide_connections_without_directory() {
        let t = TestApp::new();

        let (status, body) = t.get("/api/system/ide-connections").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["connections"], json!([]));

        let (status, _) = t.send(Method::POST, "/api/system/cleanup", Some(json!({ "pid": 1 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ide_connections_report_liveness() {
        let t = app_with_running(vec![100]);
        t.write(
            "ide/a.lock",
            r#"{"pid": 100, "ideName": "VS Code", "workspaceFolders": ["/work"], "transport": "ws"}"#,
        );
        t.write("ide/b.lock", r#"{"pid": 200}"#);
        t.write("ide/c.lock", "not json");
        t.write("ide/d.lock.removed", r#"{"pid": 300}"#);

        let (status, body) = t.get("/api/system/ide-connections").await;
        assert_eq!(status, StatusCode::OK);
        let conns = body["connections"].as_array().unwrap();
        assert_eq!(conns.len(), 2);

        assert_eq!(conns[0]["id"], "a");
        assert_eq!(conns[0]["name"], "VS Code");
        assert_eq!(conns[0]["status"], "active");
        assert_eq!(conns[0]["lockFile"], "a.lock");
        assert_eq!(conns[0]["workspaceFolders"], json!(["/work"]));
        assert_eq!(conns[0]["transport"], "ws");

        assert_eq!(conns[1]["id"], "b");
        assert_eq!(conns[1]["name"], "Unknown IDE");
        assert_eq!(conns[1]["status"], "inactive");
        assert_eq!(conns[1]["transport"], "unknown");
        assert_eq!(conns[1]["workspaceFolders"], json!([]));
    }

    #[tokio::test]
    async fn test_lock_files_with_odd_pids_are_listed() {
        let t = app_with_running(vec![100]);
        t.write("ide/a.lock", r#"{"pid": "100", "ideName": "Zed"}"#);
        t.write("ide/b.lock", r#"{"pid": "not-a-pid"}"#);
        t.write("ide/c.lock", r#"{"pid": -5}"#);
        t.write("ide/d.lock", r#"{"ideName": "No Pid"}"#);

        let (status, body) = t.get("/api/system/ide-connections").await;
        assert_eq!(status, StatusCode::OK);
        let conns = body["connections"].as_array().unwrap();
        assert_eq!(conns.len(), 4);

        assert_eq!(conns[0]["status"], "active");
        assert_eq!(conns[0]["pid"], "100");
        assert_eq!(conns[1]["status"], "inactive");
        assert_eq!(conns[1]["pid"], "not-a-pid");
        assert_eq!(conns[2]["status"], "inactive");
        assert_eq!(conns[2]["pid"], -5);
        assert_eq!(conns[3]["status"], "inactive");
        assert_eq!(conns[3]["name"], "No Pid");

        // A string pid in the lock file still matches a numeric cleanup request.
        let (status, body) = t.send(Method::POST, "/api/system/cleanup", Some(json!({ "pid": 100 }))).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["removed"]["originalFile"], "a.lock");
    }

    #[tokio::test]
    async fn test_cleanup_renames_lock_file() {
        let t = app_with_running(vec![]);
        t.write("ide/a.lock", r#"{"pid": 100, "ideName": "VS Code"}"#);
        t.write("ide/b.lock", r#"{"pid": 200, "ideName": "Zed"}"#);

        let (status, body) = t.send(Method::POST, "/api/system/cleanup", Some(json!({ "pid": "200" }))).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["removed"]["originalFile"], "b.lock");
        assert_eq!(body["removed"]["removedFile"], "b.lock.removed");
        assert_eq!(body["removed"]["pid"], 200);
        assert_eq!(body["removed"]["ideName"], "Zed");
        assert!(!t.root().join("ide/b.lock").exists());
        assert!(t.root().join("ide/b.lock.removed").exists());

        let (_, body) = t.get("/api/system/ide-connections").await;
        assert_eq!(body["connections"].as_array().unwrap().len(), 1);

        let (status, _) = t.send(Method::POST, "/api/system/cleanup", Some(json!({ "pid": 999 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = t.send(Method::POST, "/api/system/cleanup", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "pid");
    }

    // ---- stats ----

    #[tokio::test]
    async fn test_stats_merges_cache_with_counts() {
        let t = TestApp::new();
        t.write("stats-cache.json", r#"{"totalSessions": 5, "dailyActivity": []}"#);
        fs::create_dir_all(t.root().join("projects/app-one")).unwrap();
        fs::create_dir_all(t.root().join("projects/.hidden")).unwrap();
        t.write("projects/loose-file.json", "{}");
        t.write("agents/a.md", "---\nname: A\n---\n");
        t.write("agents/b.txt", "");
        t.write("skills/x/SKILL.md", &skill_md("X", "x"));
        t.write("plugins/marketplaces/r/y/SKILL.md", &skill_md("Y", "y"));

        let (status, body) = t.get("/api/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let data = &body["data"];
        assert_eq!(data["totalSessions"], 5);
        assert_eq!(data["dailyActivity"], json!([]));
        assert_eq!(data["totalProjects"], 1);
        assert_eq!(data["totalAgents"], 1);
        assert_eq!(data["totalSkills"], 2);
    }

    #[tokio::test]
    async fn test_stats_missing_or_invalid_cache() {
        let t = TestApp::new();

        let (status, body) = t.get("/api/stats").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        t.write("stats-cache.json", "{ not json");
        let (status, _) = t.get("/api/stats").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    // ---- settings ----

    #[tokio::test]
    async fn test_sdk_config_defaults_to_empty() {
        let t = TestApp::new();

        let (status, body) = t.get("/api/settings/sdk-config").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cliExecutablePath"], "");

        t.write("sdk-config.json", "garbage");
        let (status, body) = t.get("/api/settings/sdk-config").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cliExecutablePath"], "");
    }

    #[tokio::test]
    async fn test_sdk_config_put_preserves_other_keys() {
        let t = TestApp::new();
        t.write("sdk-config.json", r#"{"theme": "dark"}"#);

        let (status, body) = t
            .send(
                Method::PUT,
                "/api/settings/sdk-config",
                Some(json!({ "cliExecutablePath": "/usr/local/bin/claude" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cliExecutablePath"], "/usr/local/bin/claude");

        let saved: Value = serde_json::from_str(&fs::read_to_string(t.root().join("sdk-config.json")).unwrap()).unwrap();
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved["cliExecutablePath"], "/usr/local/bin/claude");

        let (_, body) = t.get("/api/settings/sdk-config").await;
        assert_eq!(body["cliExecutablePath"], "/usr/local/bin/claude");
    }
}
