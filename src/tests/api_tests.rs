#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use std::fs;
    use tower::ServiceExt;

    use crate::tests::support::{skill_md, TestApp};

    // ---- agents ----

    #[tokio::test]
    async fn test_agent_crud_round_trip() {
        let t = TestApp::new();

        let (status, body) = t
            .send(
                Method::POST,
                "/api/agents-manager",
                Some(json!({
                    "name": "Code Reviewer",
                    "description": "Reviews code",
                    "tools": ["Read", "Grep"],
                    "content": "You review code."
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["success"], true);
        assert_eq!(body["agent"]["id"], "code-reviewer");
        assert_eq!(body["agent"]["filename"], "code-reviewer.md");
        assert_eq!(body["agent"]["model"], "inherit");
        assert_eq!(body["agent"]["color"], "blue");

        let on_disk = fs::read_to_string(t.root().join("agents/code-reviewer.md")).unwrap();
        assert!(on_disk.starts_with("---\n"));
        assert!(on_disk.contains("tools: Read, Grep"));
        assert!(on_disk.ends_with("---\n\nYou review code."));

        let (status, body) = t.get("/api/agents-manager/code-reviewer").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["agent"]["metadata"]["name"], "Code Reviewer");
        assert_eq!(body["agent"]["metadata"]["tools"], json!(["Read", "Grep"]));
        assert_eq!(body["agent"]["content"], "You review code.");
        assert!(body["agent"]["rawContent"].as_str().unwrap().contains("description: Reviews code"));

        let (status, body) = t.get("/api/agents-manager").await;
        assert_eq!(status, StatusCode::OK);
        let agents = body["agents"].as_array().unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0]["name"], "Code Reviewer");
        assert_eq!(agents[0]["tools"], json!(["Read", "Grep"]));

        let (status, body) = t
            .send(Method::PUT, "/api/agents-manager/code-reviewer", Some(json!({ "description": "Updated" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["agent"]["name"], "code-reviewer");
        let (_, body) = t.get("/api/agents-manager/code-reviewer").await;
        assert_eq!(body["agent"]["metadata"]["description"], "Updated");
        assert_eq!(body["agent"]["metadata"]["tools"], json!([]));
        assert_eq!(body["agent"]["content"], "");

        // An agent created without tools reads back with an empty list.
        let (status, _) = t.send(Method::POST, "/api/agents-manager", Some(json!({ "name": "Bare" }))).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = t.get("/api/agents-manager/bare").await;
        assert_eq!(body["agent"]["metadata"]["tools"], json!([]));
        assert!(body["agent"]["rawContent"].as_str().unwrap().contains("tools: []"));

        let (status, body) = t.send(Method::DELETE, "/api/agents-manager/code-reviewer", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(!t.root().join("agents/code-reviewer.md").exists());

        let (_, body) = t.get("/api/agents-manager").await;
        let ids: Vec<&str> = body["agents"].as_array().unwrap().iter().map(|a| a["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["bare"]);

        let (status, body) = t.send(Method::DELETE, "/api/agents-manager/code-reviewer", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_agent_create_validation_and_conflict() {
        let t = TestApp::new();

        let (status, body) = t.send(Method::POST, "/api/agents-manager", Some(json!({ "description": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = t.send(Method::POST, "/api/agents-manager", Some(json!({ "name": "!!!" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = t.send(Method::POST, "/api/agents-manager", Some(json!({ "name": "Helper" }))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = t.send(Method::POST, "/api/agents-manager", Some(json!({ "name": "helper" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_agent_list_skips_malformed_files() {
        let t = TestApp::new();
        t.write("agents/good.md", "---\nname: Good\ncolor: green\n---\nbody");
        t.write("agents/broken.md", "---\nname: Broken\nno closing delimiter");
        t.write("agents/notes.txt", "ignored");

        let (status, body) = t.get("/api/agents-manager").await;
        assert_eq!(status, StatusCode::OK);
        let agents = body["agents"].as_array().unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0]["id"], "good");
        assert_eq!(agents[0]["color"], "green");
        assert_eq!(agents[0]["model"], "inherit");

        let (status, body) = t.get("/api/agents-manager/broken").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "PARSE_ERROR");
    }

    #[tokio::test]
    async fn test_agent_missing_and_invalid_ids() {
        let t = TestApp::new();

        let (status, _) = t.get("/api/agents-manager/nobody").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = t.send(Method::PUT, "/api/agents-manager/nobody", Some(json!({ "name": "x" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = t.get("/api/agents-manager/a%5Cb").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "id");
    }

    #[tokio::test]
    async fn test_write_without_csrf_header_is_rejected() {
        let t = TestApp::new();

        let response = t
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/agents-manager")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "name": "x" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!t.root().join("agents/x.md").exists());
    }

    // ---- skills ----

    #[tokio::test]
    async fn test_skill_list_builds_tree() {
        let t = TestApp::new();
        t.write("skills/reviewer/SKILL.md", &skill_md("Reviewer", "Reviews"));
        t.write("plugins/marketplaces/acme/tools/formatter/SKILL.md", &skill_md("Formatter", "Formats"));
        t.write("skills/broken/SKILL.md", "---\nname: [unclosed\n---\n");

        let (status, body) = t.get("/api/skills-manager").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["total"], 2);

        let local = body["tree"]["skills"].as_array().unwrap();
        assert_eq!(local.len(), 1);
        assert_eq!(local[0]["name"], "Reviewer");
        assert_eq!(local[0]["id"], "skills/reviewer");
        assert_eq!(local[0]["path"], "reviewer");
        assert_eq!(local[0]["pathParts"], json!(["reviewer"]));
        assert_eq!(local[0]["category"], "general");

        let plugins = body["tree"]["plugins"].as_object().unwrap();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins["acme"].as_array().unwrap().len(), 1);
        assert_eq!(plugins["acme"][0]["name"], "Formatter");
        assert_eq!(plugins["acme"][0]["id"], "plugins/marketplaces/acme/tools/formatter");
        assert_eq!(plugins["acme"][0]["pathParts"], json!(["plugins", "marketplaces", "acme", "tools", "formatter"]));
        assert_eq!(body["skills"].as_array().unwrap().len(), 2);

        assert_eq!(t.state.metrics.get_snapshot().parse_failures, 1);
    }

    #[tokio::test]
    async fn test_skill_list_creates_missing_roots() {
        let t = TestApp::new();

        let (status, body) = t.get("/api/skills-manager").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
        assert!(t.root().join("skills").is_dir());
        assert!(t.root().join("plugins/marketplaces").is_dir());
    }

    #[tokio::test]
    async fn test_skill_detail_lists_sorted_resources() {
        let t = TestApp::new();
        t.write("skills/reviewer/SKILL.md", &skill_md("Reviewer", "Reviews"));
        t.write("skills/reviewer/README.md", "readme");
        t.write("skills/reviewer/notes.txt", "notes");
        t.write("skills/reviewer/scripts/run.sh", "#!/bin/sh\n");

        let (status, body) = t.get("/api/skills-manager/skills/reviewer").await;
        assert_eq!(status, StatusCode::OK);
        let skill = &body["skill"];
        assert_eq!(skill["id"], "skills/reviewer");
        assert_eq!(skill["metadata"]["name"], "Reviewer");
        assert_eq!(skill["content"], "# Reviewer");

        let names: Vec<&str> =
            skill["resourceFiles"].as_array().unwrap().iter().map(|f| f["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["scripts", "notes.txt", "README.md"]);
        assert_eq!(skill["resourceFiles"][0]["isDirectory"], true);
        assert_eq!(skill["resourceFiles"][0]["path"], "skills/reviewer/scripts");

        let (status, _) = t.get("/api/skills-manager/skills/nothing-here").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_skill_files_and_directories() {
        let t = TestApp::new();
        t.write("skills/reviewer/SKILL.md", &skill_md("Reviewer", "Reviews"));
        t.write("skills/reviewer/README.md", "hello");
        t.write("skills/reviewer/scripts/run.sh", "#!/bin/sh\n");
        t.write("skills/reviewer/scripts/lib/util.sh", "");

        let (status, body) = t.get("/api/skills-manager/skills/reviewer/files/README.md").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isDirectory"], false);
        assert_eq!(body["file"]["name"], "README.md");
        assert_eq!(body["file"]["content"], "hello");
        assert_eq!(body["file"]["size"], 5);

        let (status, body) = t.get("/api/skills-manager/skills/reviewer/files/scripts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isDirectory"], true);
        let names: Vec<&str> = body["items"].as_array().unwrap().iter().map(|f| f["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["lib", "run.sh"]);

        let (status, _) = t.get("/api/skills-manager/skills/reviewer/files/missing.md").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_skill_id_with_files_segment() {
        let t = TestApp::new();
        t.write("plugins/marketplaces/acme/files/pdf/SKILL.md", &skill_md("Pdf", "Reads PDFs"));
        t.write("plugins/marketplaces/acme/files/pdf/files/guide.md", "guide");

        let (_, body) = t.get("/api/skills-manager").await;
        assert_eq!(body["skills"][0]["id"], "plugins/marketplaces/acme/files/pdf");

        let (status, body) = t.get("/api/skills-manager/plugins/marketplaces/acme/files/pdf").await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["skill"]["id"], "plugins/marketplaces/acme/files/pdf");
        assert_eq!(body["skill"]["metadata"]["name"], "Pdf");

        // A resource directory that is itself named `files`
        let (status, body) = t.get("/api/skills-manager/plugins/marketplaces/acme/files/pdf/files/files").await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["isDirectory"], true);
        assert_eq!(body["items"][0]["name"], "guide.md");

        let (status, body) =
            t.get("/api/skills-manager/plugins/marketplaces/acme/files/pdf/files/files/guide.md").await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["file"]["content"], "guide");
    }

    #[tokio::test]
    async fn test_dot_prefixed_names_are_not_traversal() {
        let t = TestApp::new();
        t.write("skills/..notes/SKILL.md", &skill_md("Notes", "Dotted"));
        t.write("skills/..notes/..draft.md", "draft");

        let (status, body) = t.get("/api/skills-manager/skills/..notes").await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["skill"]["metadata"]["name"], "Notes");

        let (status, body) = t.get("/api/skills-manager/skills/..notes/files/..draft.md").await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["file"]["content"], "draft");
    }

    #[tokio::test]
    async fn test_skill_file_traversal_is_denied() {
        let t = TestApp::new();
        t.write("skills/reviewer/SKILL.md", &skill_md("Reviewer", "Reviews"));
        t.write("secret.txt", "top secret");

        let (status, body) = t.get("/api/skills-manager/skills/reviewer/files/../../secret.txt").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "ACCESS_DENIED");

        let (status, _) = t.get("/api/skills-manager/skills/reviewer/files/%2e%2e/%2e%2e/secret.txt").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_skill_file_symlink_escape_is_denied() {
        let t = TestApp::new();
        let outside = tempfile::TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), "s").unwrap();
        t.write("skills/reviewer/SKILL.md", &skill_md("Reviewer", "Reviews"));
        std::os::unix::fs::symlink(outside.path(), t.root().join("skills/reviewer/link")).unwrap();

        let (status, _) = t.get("/api/skills-manager/skills/reviewer/files/link/secret.txt").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_skill_create_update_delete() {
        let t = TestApp::new();

        let (status, body) = t
            .send(
                Method::POST,
                "/api/skills-manager",
                Some(json!({
                    "name": "My Skill",
                    "description": "Does things",
                    "tags": ["a", "b"],
                    "content": "Steps"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["skill"]["id"], "skills/my-skill");
        assert_eq!(body["skill"]["metadata"]["category"], "general");
        assert_eq!(body["skill"]["metadata"]["tags"], json!(["a", "b"]));
        assert!(t.root().join("skills/my-skill/SKILL.md").is_file());

        let (status, _) = t.send(Method::POST, "/api/skills-manager", Some(json!({ "name": "my skill" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = t.send(Method::POST, "/api/skills-manager", Some(json!({ "content": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Keys the dashboard does not know about survive an update.
        t.write("skills/my-skill/SKILL.md", "---\nname: My Skill\ncustom: keep\n---\nold body");
        let (status, body) = t
            .send(Method::PUT, "/api/skills-manager/skills/my-skill", Some(json!({ "description": "New" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skill"]["metadata"]["custom"], "keep");
        assert_eq!(body["skill"]["metadata"]["description"], "New");
        assert_eq!(body["skill"]["metadata"]["name"], "My Skill");
        assert_eq!(body["skill"]["content"], "old body");

        let (status, _) =
            t.send(Method::PUT, "/api/skills-manager/skills/ghost", Some(json!({ "description": "x" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        t.write("skills/other/SKILL.md", &skill_md("Other", "Stays"));
        let (_, body) = t.get("/api/skills-manager").await;
        assert_eq!(body["total"], 2);

        let (status, _) = t.send(Method::DELETE, "/api/skills-manager/skills/my-skill", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!t.root().join("skills/my-skill").exists());

        let (_, body) = t.get("/api/skills-manager").await;
        assert_eq!(body["total"], 1);
        let ids: Vec<&str> = body["skills"].as_array().unwrap().iter().map(|s| s["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["skills/other"]);

        let (status, _) = t.send(Method::DELETE, "/api/skills-manager/skills/my-skill", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_marketplace_skills_cannot_be_deleted() {
        let t = TestApp::new();
        t.write("plugins/marketplaces/acme/formatter/SKILL.md", &skill_md("Formatter", "Formats"));

        let (status, _) =
            t.send(Method::DELETE, "/api/skills-manager/plugins/marketplaces/acme/formatter", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(t.root().join("plugins/marketplaces/acme/formatter/SKILL.md").exists());

        let (status, _) = t.send(Method::DELETE, "/api/skills-manager/skills", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_json_responses_are_not_cached() {
        let t = TestApp::new();

        let response = t
            .app
            .clone()
            .oneshot(Request::builder().uri("/api/agents-manager").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["cache-control"], "no-store");
        assert!(response.headers().contains_key("x-content-type-options"));
    }
}
