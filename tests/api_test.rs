/// Integration tests for the taskdeck API
///
/// These tests drive the real router over an in-memory SQLite database and
/// verify the end-to-end behavior: registration and login, same-team task
/// visibility, ownership checks on mutation, master privileges and the
/// administrative self-protection rules.

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;
use taskdeck::models::task::Task;

#[tokio::test]
async fn test_register_login_create_and_list() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.register("Ada", "ada@example.com", "lovelace").await;
    assert_eq!(status, StatusCode::OK);
    // Role defaults to common; the hash never leaves the server
    assert_eq!(body["role"], "common");
    assert!(body.get("password_hash").is_none());

    let token = ctx.login("ada@example.com", "lovelace").await;
    let task_id = ctx.create_task(&token, "buy milk").await;

    let tasks = ctx.list_tasks(&token).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"].as_i64(), Some(task_id));
    assert_eq!(tasks[0]["title"], "buy milk");
    assert_eq!(tasks[0]["completed"], false);
    assert_eq!(tasks[0]["priority"], 1);
}

#[tokio::test]
async fn test_register_requires_all_fields() {
    let ctx = TestContext::new().await.unwrap();

    for body in [
        json!({ "email": "x@example.com", "password": "pw" }),
        json!({ "name": "X", "password": "pw" }),
        json!({ "name": "X", "email": "x@example.com" }),
        json!({ "name": "", "email": "x@example.com", "password": "pw" }),
    ] {
        let (status, resp) = ctx.request("POST", "/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", resp);
    }

    // Nothing was created
    let (_, body) = ctx.register("X", "x@example.com", "pw").await;
    assert_eq!(body["id"].as_i64(), Some(1));
}

#[tokio::test]
async fn test_duplicate_email_conflict_first_account_intact() {
    let ctx = TestContext::new().await.unwrap();

    let (status, first) = ctx.register("Ada", "ada@example.com", "one").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx.register("Imposter", "ada@example.com", "two").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    // First account still works with its original password
    let token = ctx.login("ada@example.com", "one").await;
    let (status, me) = ctx.request("GET", "/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(me.as_array().unwrap().is_empty());
    assert_eq!(first["name"], "Ada");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new().await.unwrap();
    ctx.register("Ada", "ada@example.com", "correct").await;

    let wrong_password = ctx
        .request(
            "POST",
            "/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "wrong" })),
        )
        .await;

    let unknown_email = ctx
        .request(
            "POST",
            "/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "whatever" })),
        )
        .await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    // Identical status and identical body, so accounts cannot be enumerated
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn test_same_role_users_share_visibility() {
    let ctx = TestContext::new().await.unwrap();

    let a = ctx.register_and_login("A", "a@example.com", "pw-a").await;
    let b = ctx.register_and_login("B", "b@example.com", "pw-b").await;

    ctx.create_task(&a, "buy milk").await;

    // B never created anything but shares A's role
    let seen_by_b = ctx.list_tasks(&b).await;
    assert_eq!(seen_by_b.len(), 1);
    assert_eq!(seen_by_b[0]["title"], "buy milk");
}

#[tokio::test]
async fn test_other_team_tasks_invisible() {
    let ctx = TestContext::new().await.unwrap();

    let a = ctx.register_and_login("A", "a@example.com", "pw-a").await;
    ctx.register("B", "b@example.com", "pw-b").await;
    let master = ctx.make_master("m@example.com", "pw-m").await;

    // Move B to another team
    let (status, _) = ctx
        .request(
            "POST",
            "/update_user/2",
            Some(&master),
            Some(json!({ "role": "sales" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    ctx.create_task(&a, "common work").await;

    // B's team changed, so A's task is out of sight
    let b = ctx.login("b@example.com", "pw-b").await;
    assert!(ctx.list_tasks(&b).await.is_empty());

    // The master still sees it
    let all = ctx.list_tasks(&master).await;
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_non_owner_same_role_cannot_mutate() {
    let ctx = TestContext::new().await.unwrap();

    let a = ctx.register_and_login("A", "a@example.com", "pw-a").await;
    let b = ctx.register_and_login("B", "b@example.com", "pw-b").await;

    let task_id = ctx.create_task(&a, "buy milk").await;

    // B can see the task but not delete it
    let (status, body) = ctx
        .request("POST", &format!("/delete_task/{}", task_id), Some(&b), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    // Nor update it
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/update_task/{}", task_id),
            Some(&b),
            Some(json!({ "title": "hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The task survived untouched
    let task = Task::find_by_id(&ctx.db, task_id).await.unwrap().unwrap();
    assert_eq!(task.title, "buy milk");
}

#[tokio::test]
async fn test_master_can_mutate_any_task() {
    let ctx = TestContext::new().await.unwrap();

    let a = ctx.register_and_login("A", "a@example.com", "pw-a").await;
    let master = ctx.make_master("m@example.com", "pw-m").await;

    let task_id = ctx.create_task(&a, "buy milk").await;

    let (status, _) = ctx
        .request(
            "POST",
            &format!("/delete_task/{}", task_id),
            Some(&master),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    assert!(Task::find_by_id(&ctx.db, task_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_priority_rejected_nothing_created() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.register_and_login("A", "a@example.com", "pw").await;

    let (status, body) = ctx
        .request(
            "POST",
            "/create_task",
            Some(&token),
            Some(json!({ "title": "urgent", "priority": "high" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "priority");

    assert!(ctx.list_tasks(&token).await.is_empty());
}

#[tokio::test]
async fn test_invalid_due_date_rejected_nothing_created() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.register_and_login("A", "a@example.com", "pw").await;

    // An impossible calendar date
    let (status, body) = ctx
        .request(
            "POST",
            "/create_task",
            Some(&token),
            Some(json!({ "title": "urgent", "due_date": "2024-02-30" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "due_date");

    assert!(ctx.list_tasks(&token).await.is_empty());
}

#[tokio::test]
async fn test_missing_title_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.register_and_login("A", "a@example.com", "pw").await;

    let (status, _) = ctx
        .request(
            "POST",
            "/create_task",
            Some(&token),
            Some(json!({ "description": "no title here" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(ctx.list_tasks(&token).await.is_empty());
}

#[tokio::test]
async fn test_delete_nonexistent_task_is_not_found() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.register_and_login("A", "a@example.com", "pw").await;

    let (status, body) = ctx
        .request("POST", "/delete_task/999", Some(&token), None)
        .await;

    // Not-found, not an authorization or validation error
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_unauthenticated_requests_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx.request("GET", "/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .request(
            "POST",
            "/create_task",
            None,
            Some(json!({ "title": "anonymous" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .request("GET", "/", Some("task_bogus_token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.register_and_login("A", "a@example.com", "pw").await;

    let (status, _) = ctx.request("GET", "/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.request("GET", "/", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_requires_master() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.register_and_login("A", "a@example.com", "pw").await;

    let (status, _) = ctx.request("GET", "/admin", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .request(
            "POST",
            "/update_user/1",
            Some(&token),
            Some(json!({ "role": "master" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_master_lists_and_updates_users() {
    let ctx = TestContext::new().await.unwrap();
    ctx.register("A", "a@example.com", "pw").await;
    let master = ctx.make_master("m@example.com", "pw-m").await;

    let (status, users) = ctx.request("GET", "/admin", Some(&master), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);

    // The edit form data is readable for another account
    let (status, target) = ctx
        .request("GET", "/update_user/1", Some(&master), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(target["email"], "a@example.com");

    let (status, updated) = ctx
        .request(
            "POST",
            "/update_user/1",
            Some(&master),
            Some(json!({ "role": "sales", "name": "Alice" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"], "sales");
    assert_eq!(updated["name"], "Alice");
    assert_eq!(updated["email"], "a@example.com");

    let (status, _) = ctx
        .request("POST", "/update_user/999", Some(&master), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_master_self_protection_on_both_methods() {
    let ctx = TestContext::new().await.unwrap();
    let master = ctx.make_master("m@example.com", "pw-m").await;

    // The master is user 1 here; GET and POST are gated the same way
    let (status, _) = ctx
        .request("GET", "/update_user/1", Some(&master), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .request(
            "POST",
            "/update_user/1",
            Some(&master),
            Some(json!({ "role": "common" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .request("POST", "/delete_user/1", Some(&master), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The account is untouched and still elevated
    let (status, users) = ctx.request("GET", "/admin", Some(&master), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users[0]["role"], "master");
}

#[tokio::test]
async fn test_deleting_user_orphans_their_tasks() {
    let ctx = TestContext::new().await.unwrap();

    let a = ctx.register_and_login("A", "a@example.com", "pw-a").await;
    ctx.register("B", "b@example.com", "pw-b").await;
    let master = ctx.make_master("m@example.com", "pw-m").await;

    let task_id = ctx.create_task(&a, "left behind").await;

    let (status, _) = ctx
        .request("POST", "/delete_user/1", Some(&master), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // The task survives ownerless: gone from the team's view, still visible
    // to the master
    let b = ctx.login("b@example.com", "pw-b").await;
    assert!(ctx.list_tasks(&b).await.is_empty());

    let all = ctx.list_tasks(&master).await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["id"].as_i64(), Some(task_id));
    assert_eq!(all[0]["user_id"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_list_filters() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.register_and_login("A", "a@example.com", "pw").await;

    ctx.create_task(&token, "plain").await;
    let (status, urgent) = ctx
        .request(
            "POST",
            "/create_task",
            Some(&token),
            Some(json!({ "title": "urgent", "priority": "3" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let urgent_id = urgent["id"].as_i64().unwrap();

    // Mark the urgent one done
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/update_task/{}", urgent_id),
            Some(&token),
            Some(json!({ "title": "urgent", "priority": "3", "completed": "true" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Priority equality
    let (status, body) = ctx.request("GET", "/?priority=3", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Completed equality
    let (status, body) = ctx
        .request("GET", "/?completed=false", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "plain");

    // Unrecognized completed token applies no filter
    let (status, body) = ctx
        .request("GET", "/?completed=banana", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Non-numeric priority filter rejects the request
    let (status, body) = ctx
        .request("GET", "/?priority=high", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    // Same for the owner filter
    let (status, _) = ctx.request("GET", "/?owner=bob", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_task_rejects_bad_completed_token() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.register_and_login("A", "a@example.com", "pw").await;
    let task_id = ctx.create_task(&token, "buy milk").await;

    let (status, body) = ctx
        .request(
            "POST",
            &format!("/update_task/{}", task_id),
            Some(&token),
            Some(json!({ "title": "buy milk", "completed": "done" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "completed");

    // Untouched
    let task = Task::find_by_id(&ctx.db, task_id).await.unwrap().unwrap();
    assert!(!task.completed);
}

#[tokio::test]
async fn test_task_detail() {
    let ctx = TestContext::new().await.unwrap();
    let token = ctx.register_and_login("A", "a@example.com", "pw").await;
    let task_id = ctx.create_task(&token, "buy milk").await;

    let (status, body) = ctx
        .request("GET", &format!("/task_detail/{}", task_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "buy milk");

    let (status, _) = ctx
        .request("GET", "/task_detail/999", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// End-to-end scenario: two common users share a list, neither can delete
/// the other's task, a master can.
#[tokio::test]
async fn test_end_to_end_lifecycle() {
    let ctx = TestContext::new().await.unwrap();

    let a = ctx.register_and_login("A", "a@example.com", "pw-a").await;
    let task_id = ctx.create_task(&a, "buy milk").await;
    assert_eq!(ctx.list_tasks(&a).await.len(), 1);

    let b = ctx.register_and_login("B", "b@example.com", "pw-b").await;
    let seen_by_b = ctx.list_tasks(&b).await;
    assert_eq!(seen_by_b.len(), 1);
    assert_eq!(seen_by_b[0]["title"], "buy milk");

    let (status, _) = ctx
        .request("POST", &format!("/delete_task/{}", task_id), Some(&b), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(Task::find_by_id(&ctx.db, task_id).await.unwrap().is_some());

    let master = ctx.make_master("m@example.com", "pw-m").await;
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/delete_task/{}", task_id),
            Some(&master),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(Task::find_by_id(&ctx.db, task_id).await.unwrap().is_none());
}
