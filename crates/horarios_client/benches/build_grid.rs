use criterion::{Criterion, criterion_group, criterion_main};
use horarios_client::{GridOptions, build_grid, valid_blocks};
use std::hint::black_box;

fn semester_payload() -> serde_json::Value {
    let days = ["1", "martes", "Miércoles", "4", "viernes", "Sábado"];
    let mut by_id = serde_json::Map::new();
    let mut id = 0;
    for day in days {
        for hour in (7..21).step_by(2) {
            id += 1;
            by_id.insert(
                id.to_string(),
                serde_json::json!({
                    "id": id,
                    "dia": day,
                    "hora_inicio": format!("{hour}:0"),
                    "hora_fin": format!("{}:30", hour + 1),
                    "asignacion": {"materia": {"id": id, "nombre": "Materia"}, "docente": {"id": 1}},
                    "aula": {"id": 1, "nombre": "Aula 101"}
                }),
            );
        }
    }
    serde_json::json!({"data": {"horarios": [serde_json::Value::Object(by_id)]}})
}

fn bench_build_grid(c: &mut Criterion) {
    let payload = semester_payload();
    let options = GridOptions::default();
    c.bench_function("extract_and_build_grid", |b| {
        b.iter(|| {
            let blocks = valid_blocks(black_box(&payload));
            build_grid(&blocks, &options)
        })
    });
}

criterion_group!(benches, bench_build_grid);
criterion_main!(benches);
