//! # Post Graph Benchmarks
//!
//! | Scenario | What is measured |
//! |----------|------------------|
//! | attached replies | merge cost when every parent is already known |
//! | late parents | merge cost when every thread cascades on its root |
//! | deep chain | one cascade promoting a long reply chain |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sf_03_post_graph::{PostGraphApi, PostGraphStore};
use shared_types::{ChainParams, Post, PostCandidate, ScanDirection};

fn candidate(id: usize, reply_to: Option<usize>, ts: u64) -> PostCandidate {
    PostCandidate {
        post: Post {
            post_id: id.to_string(),
            poster: "0x00000000000000000000000000000000000000aa".to_string(),
            message: format!("post {id}"),
            timestamp: ts,
            tx_hash: format!("0x{id:x}"),
            block_height: None,
            reply_to_post_id: reply_to.map(|p| p.to_string()).unwrap_or_default(),
            channel_id: String::new(),
            orphaned: false,
        },
        new_poster: None,
        discussion: None,
    }
}

/// `threads` roots with `replies` replies each, roots first or last.
fn threads(threads: usize, replies: usize, roots_first: bool) -> Vec<PostCandidate> {
    let mut roots = Vec::with_capacity(threads);
    let mut children = Vec::with_capacity(threads * replies);
    for t in 0..threads {
        let root = t * (replies + 1);
        roots.push(candidate(root, None, 1_000));
        for r in 1..=replies {
            children.push(candidate(root + r, Some(root), 1_000 + r as u64));
        }
    }
    if roots_first {
        roots.extend(children);
        roots
    } else {
        children.extend(roots);
        children
    }
}

fn merge_all(candidates: &[PostCandidate], direction: ScanDirection) -> usize {
    let store = PostGraphStore::new(&ChainParams::for_testing());
    let mut cursor = store.begin_batch(direction);
    for c in candidates {
        store.submit(&mut cursor, c);
    }
    store.post_count()
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("sf-03-post-graph");

    for size in [10, 100, 500] {
        let attached = threads(size, 5, true);
        let late = threads(size, 5, false);
        group.throughput(Throughput::Elements(attached.len() as u64));

        group.bench_with_input(BenchmarkId::new("attached_replies", size), &attached, |b, cs| {
            b.iter(|| black_box(merge_all(cs, ScanDirection::Backward)))
        });
        group.bench_with_input(BenchmarkId::new("late_parents", size), &late, |b, cs| {
            b.iter(|| black_box(merge_all(cs, ScanDirection::Forward)))
        });
    }

    for depth in [100, 1_000] {
        // Newest first: every reply arrives before its parent.
        let chain: Vec<_> = (0..depth)
            .rev()
            .map(|i| candidate(i, i.checked_sub(1), 1_000 + i as u64))
            .collect();
        group.bench_with_input(BenchmarkId::new("deep_chain", depth), &chain, |b, cs| {
            b.iter(|| black_box(merge_all(cs, ScanDirection::Forward)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
