use dayplan_allocation::{AllocationConfig, AllocationEngine, Strategy};
use dayplan_scheduler::{api, state::AppState, store::ScheduleStore};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

struct ApiFixture {
    base_url: String,
    client: reqwest::Client,
}

impl ApiFixture {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn schedule(&self) -> Vec<Value> {
        let response = self.client.get(self.url("/scheduler")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response.json().await.unwrap()
    }

    async fn create(&self, name: &str, hours: i64, days: i64) -> reqwest::Response {
        self.client
            .post(self.url("/scheduler"))
            .json(&json!({ "name": name, "totalHours": hours, "availableDays": days }))
            .send()
            .await
            .unwrap()
    }

    async fn create_ok(&self, name: &str, hours: i64, days: i64) -> String {
        let response = self.create(name, hours, days).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }
}

async fn start_api_with(strategy: Strategy) -> ApiFixture {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let engine = AllocationEngine::new(AllocationConfig::default().with_strategy(strategy));
    let strategy_name = engine.distributor_name();
    let state = AppState::new(ScheduleStore::new(engine), strategy_name);
    let app = api::create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ApiFixture {
        base_url,
        client: reqwest::Client::new(),
    }
}

async fn start_api() -> ApiFixture {
    start_api_with(Strategy::WindowSearch).await
}

fn task_minutes(days: &[Value], task_id: &str) -> u64 {
    days.iter()
        .flat_map(|d| d["assignments"].as_array().unwrap())
        .filter(|a| a["taskId"] == task_id)
        .map(|a| a["minutes"].as_u64().unwrap())
        .sum()
}

#[tokio::test]
async fn test_empty_schedule_has_one_day() {
    let api = start_api().await;
    let days = api.schedule().await;

    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["dayNumber"], 1);
    assert_eq!(days[0]["effectiveLoad"], 0);
    assert_eq!(days[0]["remainingMinutes"], 600);
    assert_eq!(days[0]["assignments"], json!([]));
}

#[tokio::test]
async fn test_create_returns_task() {
    let api = start_api().await;
    let response = api.create("Report", 5, 1).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.unwrap();
    assert!(body["id"].as_str().unwrap().starts_with("task_"));
    assert_eq!(body["name"], "Report");
    assert_eq!(body["totalMinutes"], 300);
    assert_eq!(body["isDivisible"], false);

    let days = api.schedule().await;
    assert_eq!(days[0]["totalMinutes"], 300);
    let row = &days[0]["assignments"][0];
    assert_eq!(row["taskName"], "Report");
    assert!(row.get("taskStartDay").is_none());
}

#[tokio::test]
async fn test_indivisible_tasks_that_cannot_share_a_day() {
    let api = start_api().await;
    // 500 and 200 minutes, rounded to whole hours: 480 + 240 + 15 > 600.
    let a = api.create_ok("A", 8, 1).await;
    let b = api.create_ok("B", 4, 1).await;

    let days = api.schedule().await;
    assert_eq!(days.len(), 2);
    for day in &days {
        assert_eq!(day["assignments"].as_array().unwrap().len(), 1);
    }
    assert_eq!(task_minutes(&days, &a), 480);
    assert_eq!(task_minutes(&days, &b), 240);
}

#[tokio::test]
async fn test_divisible_task_spreads_over_window() {
    let api = start_api().await;
    let c = api.create_ok("C", 15, 3).await;

    let days = api.schedule().await;
    assert_eq!(days.len(), 3);
    for day in &days {
        assert_eq!(day["effectiveLoad"], 300);
        let row = &day["assignments"][0];
        assert_eq!(row["isDivisible"], true);
        assert_eq!(row["taskStartDay"], 1);
        assert_eq!(row["taskAvailableDays"], 3);
    }
    assert_eq!(task_minutes(&days, &c), 900);
}

#[tokio::test]
async fn test_oversized_task_is_rejected_without_change() {
    let api = start_api().await;
    api.create_ok("A", 2, 1).await;
    let before = api.schedule().await;

    let response = api.create("Huge", 12, 1).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()["content-type"],
        "application/problem+json"
    );
    let problem: Value = response.json().await.unwrap();
    assert_eq!(problem["code"], "task_too_long");
    assert_eq!(
        problem["detail"],
        "The task is too long, with a maximum of 10 hours allowed per day."
    );

    let response = api.create("Wide", 31, 3).await;
    let problem: Value = response.json().await.unwrap();
    assert_eq!(problem["code"], "task_does_not_fit");

    assert_eq!(api.schedule().await, before);
}

#[tokio::test]
async fn test_update_task() {
    let api = start_api().await;
    let id = api.create_ok("A", 2, 1).await;

    let response = api
        .client
        .put(api.url(&format!("/scheduler/{id}")))
        .json(&json!({ "id": id, "name": "A2", "totalHours": 6, "availableDays": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "A2");
    assert_eq!(body["isDivisible"], true);

    let days = api.schedule().await;
    assert_eq!(task_minutes(&days, &id), 360);
}

#[tokio::test]
async fn test_update_rejects_id_mismatch() {
    let api = start_api().await;
    let a = api.create_ok("A", 2, 1).await;
    let b = api.create_ok("B", 2, 1).await;

    let response = api
        .client
        .put(api.url(&format!("/scheduler/{a}")))
        .json(&json!({ "id": b, "name": "A", "totalHours": 3, "availableDays": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let problem: Value = response.json().await.unwrap();
    assert_eq!(problem["code"], "id_mismatch");
}

#[tokio::test]
async fn test_update_unknown_task_is_not_found() {
    let api = start_api().await;
    let id = dayplan_id::TaskId::new().to_string();

    let response = api
        .client
        .put(api.url(&format!("/scheduler/{id}")))
        .json(&json!({ "id": id, "name": "missing", "totalHours": 1, "availableDays": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_task() {
    let api = start_api().await;
    let a = api.create_ok("A", 8, 1).await;
    let c = api.create_ok("C", 15, 3).await;

    let url = api.url(&format!("/scheduler/{c}"));
    let response = api.client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let days = api.schedule().await;
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["dayNumber"], 1);
    assert_eq!(task_minutes(&days, &a), 480);
    assert_eq!(task_minutes(&days, &c), 0);

    let response = api.client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_tasks() {
    let api = start_api().await;
    api.create_ok("A", 2, 1).await;
    api.create_ok("B", 3, 2).await;

    let response = api
        .client
        .get(api.url("/scheduler/tasks"))
        .send()
        .await
        .unwrap();
    let tasks: Vec<Value> = response.json().await.unwrap();
    let names: Vec<&str> = tasks.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[tokio::test]
async fn test_readyz_reports_counts() {
    let api = start_api_with(Strategy::GreedySplit).await;
    api.create_ok("A", 8, 1).await;
    api.create_ok("B", 4, 1).await;

    let response = api.client.get(api.url("/readyz")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["schedule"]["tasks"], 2);
    assert_eq!(body["schedule"]["days"], 2);
    assert_eq!(body["schedule"]["strategy"], "greedy");
}

#[tokio::test]
async fn test_unreadable_body_is_problem_details() {
    let api = start_api().await;

    let response = api
        .client
        .post(api.url("/scheduler"))
        .header("content-type", "application/json")
        .body("{ \"name\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()["content-type"],
        "application/problem+json"
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "invalid_body");
    assert!(body["request_id"].as_str().unwrap().starts_with("req_"));

    let response = api
        .client
        .post(api.url("/scheduler"))
        .json(&json!({ "name": "A" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "invalid_body");

    assert_eq!(api.schedule().await[0]["assignments"], json!([]));
}
