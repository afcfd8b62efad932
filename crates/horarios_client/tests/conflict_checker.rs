use async_trait::async_trait;
use horarios_client::http_client::ReqwestScheduleClient;
use horarios_client::retry::RetryPolicy;
use horarios_client::{
    ConflictCandidate, ConflictChecker, ConflictKind, HorariosError, ScheduleSource,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::Barrier;
use tokio::time::timeout;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("horarios_client=debug"))
        .with_test_writer()
        .try_init();
}

fn candidate(day: &str, start: &str, end: &str) -> ConflictCandidate {
    ConflictCandidate {
        subject_id: Some(7),
        room_id: Some(3),
        teacher_id: Some(1),
        day: day.into(),
        start: start.into(),
        end: end.into(),
    }
}

async fn mount(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn checker_for(server: &MockServer) -> ConflictChecker {
    let client = ReqwestScheduleClient::new(&server.uri(), None)
        .expect("client")
        .with_retry(RetryPolicy::none());
    ConflictChecker::new(Arc::new(client))
}

#[tokio::test]
async fn teacher_double_booking_is_reported() {
    init_tracing();
    let server = MockServer::start().await;
    mount(
        &server,
        "/horarios/docente/1",
        serde_json::json!({"clases": [{"id": 2, "dia": "Lunes", "hora_inicio": "08:00", "hora_fin": "09:00"}]}),
    )
    .await;
    mount(&server, "/horarios/aula/3", serde_json::json!({"clases": []})).await;

    let conflict = checker_for(&server)
        .check(&candidate("Lunes", "08:30", "09:30"), None)
        .await
        .expect("conflict");
    assert_eq!(conflict.kind, ConflictKind::Teacher);
    assert!(conflict.message.contains("Lunes"));
    assert!(conflict.message.contains("08:00"));
    assert!(conflict.message.contains("09:00"));
}

#[tokio::test]
async fn duplicate_subject_in_room_from_id_keyed_payload() {
    init_tracing();
    let server = MockServer::start().await;
    mount(&server, "/horarios/docente/1", serde_json::json!([])).await;
    mount(
        &server,
        "/horarios/aula/3",
        serde_json::json!({
            "21": {
                "id": 21,
                "dia": "martes",
                "hora_inicio": "10:00:00",
                "hora_fin": "11:00:00",
                "asignacion": {"materia": {"id": 7}, "docente": {"id": 99}},
                "aula": {"id": 3}
            }
        }),
    )
    .await;

    let conflict = checker_for(&server)
        .check(&candidate("Martes", "10:30", "11:30"), None)
        .await
        .expect("conflict");
    assert_eq!(conflict.kind, ConflictKind::DuplicateSubject);
}

#[tokio::test]
async fn editing_a_block_does_not_clash_with_itself() {
    let server = MockServer::start().await;
    let stored = serde_json::json!({"clases": [{"id": 5, "dia": "Lunes", "hora_inicio": "08:00", "hora_fin": "09:00", "aula": {"id": 3}}]});
    mount(&server, "/horarios/docente/1", stored.clone()).await;
    mount(&server, "/horarios/aula/3", stored).await;

    let checker = checker_for(&server);
    let c = candidate("Lunes", "08:00", "09:30");
    assert_eq!(checker.check(&c, Some(5)).await, None);
    assert!(checker.check(&c, None).await.is_some());
}

#[tokio::test]
async fn backend_failure_degrades_to_no_conflict() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/horarios/docente/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount(
        &server,
        "/horarios/aula/3",
        serde_json::json!({"clases": [{"id": 2, "dia": "Lunes", "hora_inicio": "08:00", "hora_fin": "09:00"}]}),
    )
    .await;

    let result = checker_for(&server)
        .check(&candidate("Lunes", "08:30", "09:30"), None)
        .await;
    assert_eq!(result, None);
}

#[tokio::test]
async fn unreachable_backend_degrades_to_no_conflict() {
    let client = ReqwestScheduleClient::new("http://127.0.0.1:9", None)
        .expect("client")
        .with_retry(RetryPolicy::none());
    let checker = ConflictChecker::new(Arc::new(client));
    assert_eq!(checker.check(&candidate("Lunes", "08:00", "09:00"), None).await, None);
}

#[tokio::test]
async fn malformed_record_does_not_hide_real_clash() {
    init_tracing();
    let server = MockServer::start().await;
    mount(&server, "/horarios/docente/1", serde_json::json!([])).await;
    mount(
        &server,
        "/horarios/aula/3",
        serde_json::json!({"clases": [
            {"id": 30, "dia": "Lunes", "hora_inicio": "１０:00", "hora_fin": "१२:00"},
            {"id": 31, "dia": "Lunes", "hora_inicio": "10:00", "hora_fin": "１１:00"},
            {"id": 32, "dia": "Lunes", "hora_inicio": "08:00", "hora_fin": "09:00"}
        ]}),
    )
    .await;

    let checker = checker_for(&server);
    let conflict = checker
        .check(&candidate("Lunes", "08:30", "09:30"), None)
        .await
        .expect("conflict");
    assert_eq!(conflict.kind, ConflictKind::Room);
    assert_eq!(conflict.message, "El aula está ocupada el Lunes de 08:00 a 09:00");

    assert_eq!(
        checker.check(&candidate("Lunes", "10:00", "11:00"), None).await,
        None
    );
    assert_eq!(
        checker.check(&candidate("Lunes", "１０:00", "１１:00"), None).await,
        None
    );
}

/// Each endpoint waits until the other one has been called too.
struct RendezvousSource {
    both_in_flight: Barrier,
}

#[async_trait]
impl ScheduleSource for RendezvousSource {
    async fn get_schedule_by_teacher(&self, _: i64) -> Result<serde_json::Value, HorariosError> {
        self.both_in_flight.wait().await;
        Ok(serde_json::json!([]))
    }

    async fn get_schedule_by_room(&self, _: i64) -> Result<serde_json::Value, HorariosError> {
        self.both_in_flight.wait().await;
        Ok(serde_json::json!({"clases": [
            {"id": 9, "dia": "Lunes", "hora_inicio": "08:00", "hora_fin": "09:00"}
        ]}))
    }
}

#[tokio::test]
async fn schedules_are_fetched_concurrently() {
    let checker = ConflictChecker::new(Arc::new(RendezvousSource {
        both_in_flight: Barrier::new(2),
    }));
    let conflict = timeout(
        Duration::from_secs(10),
        checker.check(&candidate("Lunes", "08:00", "09:00"), None),
    )
    .await
    .expect("teacher and room schedules were not requested together");
    assert_eq!(conflict.map(|c| c.kind), Some(ConflictKind::Room));
}

struct CountingSource {
    calls: AtomicU32,
}

#[async_trait]
impl ScheduleSource for CountingSource {
    async fn get_schedule_by_teacher(&self, _: i64) -> Result<serde_json::Value, HorariosError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::json!({"clases": [
            {"id": 1, "dia": "Lunes", "hora_inicio": "08:00", "hora_fin": "09:00"}
        ]}))
    }

    async fn get_schedule_by_room(&self, _: i64) -> Result<serde_json::Value, HorariosError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::json!([]))
    }
}

#[tokio::test]
async fn multi_block_submission_checks_each_row() {
    let source = Arc::new(CountingSource {
        calls: AtomicU32::new(0),
    });
    let checker = ConflictChecker::new(source.clone());
    let mut incomplete = candidate("Martes", "08:00", "09:00");
    incomplete.teacher_id = None;

    let results = checker
        .check_blocks(
            &[
                candidate("Lunes", "08:30", "09:30"),
                candidate("Lunes", "09:00", "10:00"),
                incomplete,
            ],
            None,
        )
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().map(|c| c.kind), Some(ConflictKind::Teacher));
    assert_eq!(results[1], None);
    assert_eq!(results[2], None);
    // incomplete rows never reach the backend
    assert_eq!(source.calls.load(Ordering::SeqCst), 4);
}
