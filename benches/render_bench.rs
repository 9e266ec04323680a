//! 진행 렌더러 벤치마크
//!
//! 패치 생성은 모든 진행 이벤트마다 실행되므로 할당 비용을 추적합니다.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use nutriscan_lib::analysis_engine::stages::AnalysisStage;
use nutriscan_lib::analysis_engine::tracker::{render_patches, render_stage_patches};

fn bench_render(c: &mut Criterion) {
    c.bench_function("render_stage_patches_mid_pipeline", |b| {
        b.iter(|| {
            render_stage_patches(
                black_box(AnalysisStage::Ocr),
                black_box(42.0),
                black_box("이미지 2/3 분석 중..."),
            )
        });
    });

    c.bench_function("render_patches_unknown_step", |b| {
        b.iter(|| render_patches(black_box("mystery"), black_box(50.0), black_box("진행 중")));
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
