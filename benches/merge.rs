use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;
use utterflow::{
    AccumulatorConfig, Alternate, AudioSegment, MockClock, RecognitionResult, Timestamp,
    TimestampReconciler, UtteranceAccumulator, VoiceActivity,
};

const RATE: u32 = 16000;

/// Builds a run of final fragments spaced 300ms apart with 200ms of audio
/// each, so every merge crosses a padded gap.
fn make_fragments(count: usize, alternates_each: usize) -> Vec<RecognitionResult> {
    (0..count)
        .map(|i| {
            let end_ms = 1000 + (i as i64) * 300;
            let samples = 200 * RATE as usize / 1000;
            let mut fragment = RecognitionResult::new_final(
                format!("word{}", i),
                0.9,
                AudioSegment::new(vec![100i16; samples], RATE),
                Some(Duration::from_millis(200)),
                Timestamp::from_millis(end_ms),
            );
            if alternates_each > 0 {
                fragment = fragment.with_alternates(
                    (0..alternates_each)
                        .map(|a| Alternate::new(format!("word{}-{}", i, a), Some(0.5)))
                        .collect(),
                );
            }
            fragment
        })
        .collect()
}

/// Feeds the fragments through an accumulator and flushes them as one
/// utterance, returning the merged result.
fn merge_fragments(
    config: &AccumulatorConfig,
    fragments: &[RecognitionResult],
) -> RecognitionResult {
    let clock = MockClock::new(Timestamp::from_millis(0));
    let mut accumulator = UtteranceAccumulator::with_clock(config.clone(), clock.clone());

    let mut last_end = Timestamp::from_millis(0);
    for fragment in fragments {
        accumulator
            .receive_voice_activity(VoiceActivity::new(true, fragment.originating_time))
            .expect("voiced activity should not fail");
        last_end = fragment.originating_time;
        accumulator.receive_final(fragment.clone());
    }

    clock.set(last_end.plus(Duration::from_secs(1)));
    accumulator
        .receive_voice_activity(VoiceActivity::new(
            false,
            last_end.plus(Duration::from_millis(100)),
        ))
        .expect("flush should not fail")
        .expect("flush should produce an utterance")
}

/// Benchmark merging runs of plain fragments of varying length.
fn bench_merge_flush(c: &mut Criterion) {
    let config = AccumulatorConfig::default();
    let mut group = c.benchmark_group("merge_flush");

    for fragment_count in [2usize, 8, 32] {
        let fragments = make_fragments(fragment_count, 0);
        group.bench_with_input(
            BenchmarkId::from_parameter(fragment_count),
            &fragments,
            |b, fragments| {
                b.iter(|| merge_fragments(black_box(&config), black_box(fragments)));
            },
        );
    }

    group.finish();
}

/// Benchmark the alternate cross-product with three alternates per fragment.
fn bench_merge_alternates(c: &mut Criterion) {
    let config = AccumulatorConfig {
        max_alternates: 64,
        ..AccumulatorConfig::default()
    };
    let mut group = c.benchmark_group("merge_alternates");

    for fragment_count in [2usize, 4, 8] {
        let fragments = make_fragments(fragment_count, 3);
        group.bench_with_input(
            BenchmarkId::from_parameter(fragment_count),
            &fragments,
            |b, fragments| {
                b.iter(|| merge_fragments(black_box(&config), black_box(fragments)));
            },
        );
    }

    group.finish();
}

/// Benchmark the reconciler's per-post adjustment.
fn bench_reconciler_adjust(c: &mut Criterion) {
    c.bench_function("reconciler_adjust", |b| {
        let mut reconciler = TimestampReconciler::builder()
            .assign("utterances", "recognition-results")
            .expect("registration should succeed")
            .assign("partial-hypotheses", "recognition-results")
            .expect("registration should succeed")
            .build();

        let mut nanos = 0i64;
        b.iter(|| {
            nanos += 1;
            reconciler
                .adjust("partial-hypotheses", black_box(Timestamp::from_nanos(nanos)))
                .expect("adjust should succeed")
        });
    });
}

criterion_group!(
    benches,
    bench_merge_flush,
    bench_merge_alternates,
    bench_reconciler_adjust
);
criterion_main!(benches);
