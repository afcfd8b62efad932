use horarios_client::config::Config;
use horarios_client::grid::SlotState;
use horarios_client::http_client::ReqwestScheduleClient;
use horarios_client::{GridOptions, ScheduleSource, Weekday, build_grid, valid_blocks};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_env = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_env))
        .init();

    // Example: reads HORARIOS_API_BASE_URL / HORARIOS_API_TOKEN from env
    let teacher_id: i64 = std::env::args()
        .nth(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(1);
    let cfg = Config::from_env()?;
    let client = ReqwestScheduleClient::from_config(&cfg)?;

    let payload = client.get_schedule_by_teacher(teacher_id).await?;
    let grid = build_grid(&valid_blocks(&payload), &GridOptions::default());

    for slot in grid.time_slots() {
        let row: Vec<String> = Weekday::ALL
            .iter()
            .map(|day| match grid.get(day.as_str(), &slot.time_key) {
                SlotState::Free => "-".to_string(),
                SlotState::Covered => "|".to_string(),
                SlotState::Start(cell) => cell
                    .block
                    .subject_name
                    .clone()
                    .unwrap_or_else(|| "Sin materia".to_string()),
            })
            .collect();
        println!("{} {}", slot.label, row.join("\t"));
    }
    for overlap in grid.overlaps() {
        eprintln!(
            "{:?} on {} at {}: kept {:?}, rejected {:?}",
            overlap.kind, overlap.day, overlap.time_key, overlap.kept_id, overlap.rejected_id
        );
    }
    Ok(())
}
