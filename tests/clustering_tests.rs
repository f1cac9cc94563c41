use std::collections::HashSet;

use gapfinder::clustering::GapClusterer;
use gapfinder::embedding::HashingEmbedder;
use gapfinder::text::{Origin, Segment};
use gapfinder::AnalysisError;

const CUT: [&str; 8] = [
    "Smugglers in the harbor tavern traded stolen maps by candlelight.",
    "The tavern keeper hid the smugglers' maps beneath the floorboards.",
    "A blind monk recounted the ancient history of the northern tower.",
    "The northern tower was built by monks fleeing the southern war.",
    "Wolves circled the frozen lake while the sisters prayed for spring.",
    "The sisters lit fires on the frozen lake to keep the wolves away.",
    "Rain flooded the lower city and the bakers lost their ovens.",
    "A traveling bard sang about the drowned prince of the marshes.",
];

fn segments(lines: &[&str]) -> Vec<Segment> {
    lines
        .iter()
        .enumerate()
        .map(|(i, text)| Segment::new(*text, Origin::Source, i))
        .collect()
}

fn embed(segments: &[Segment]) -> Vec<Vec<f32>> {
    let embedder = HashingEmbedder::new(256).unwrap();
    segments.iter().map(|s| embedder.embed_one(s.text())).collect()
}

#[test]
fn test_every_segment_assigned_once() {
    let owned = segments(&CUT);
    let refs: Vec<&Segment> = owned.iter().collect();
    let clusterer = GapClusterer::new(5, 42);

    let clusters = clusterer.cluster(&refs, &embed(&owned)).unwrap();

    // 1. Exactly min(5, n) cluster ids, numbered from zero
    assert_eq!(clusters.len(), 5);
    assert_eq!(clusters.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);

    // 2. Partition of the input
    let assigned: Vec<usize> = clusters.values().flatten().map(|s| s.position()).collect();
    assert_eq!(assigned.len(), CUT.len());
    let unique: HashSet<usize> = assigned.iter().copied().collect();
    assert_eq!(unique.len(), CUT.len());

    // 3. Members stay in source order
    for members in clusters.values() {
        let positions: Vec<usize> = members.iter().map(|s| s.position()).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }
}

#[test]
fn test_same_seed_same_partition() {
    let owned = segments(&CUT);
    let refs: Vec<&Segment> = owned.iter().collect();
    let embeddings = embed(&owned);

    let first = GapClusterer::new(4, 7).cluster(&refs, &embeddings).unwrap();
    let second = GapClusterer::new(4, 7).cluster(&refs, &embeddings).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_fewer_segments_than_clusters() {
    let owned = segments(&CUT[..3]);
    let refs: Vec<&Segment> = owned.iter().collect();

    let clusters = GapClusterer::new(5, 42).cluster(&refs, &embed(&owned)).unwrap();

    assert_eq!(clusters.len(), 3);
    assert_eq!(clusters.values().map(Vec::len).sum::<usize>(), 3);
}

#[test]
fn test_single_segment_single_cluster() {
    let owned = segments(&CUT[..1]);
    let refs: Vec<&Segment> = owned.iter().collect();

    let clusters = GapClusterer::new(5, 42).cluster(&refs, &embed(&owned)).unwrap();

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[&0].len(), 1);
    assert_eq!(clusters[&0][0].text(), CUT[0]);
}

#[test]
fn test_duplicate_points_leave_empty_clusters() {
    let owned = segments(&[CUT[0], CUT[0], CUT[0], CUT[2]]);
    let refs: Vec<&Segment> = owned.iter().collect();

    let clusters = GapClusterer::new(5, 42).cluster(&refs, &embed(&owned)).unwrap();

    // Four ids, only two distinct points to separate
    assert_eq!(clusters.len(), 4);
    assert_eq!(clusters.values().filter(|m| !m.is_empty()).count(), 2);
    assert_eq!(clusters.values().map(Vec::len).sum::<usize>(), 4);

    let with_monk = clusters.values().find(|m| m.iter().any(|s| s.position() == 3)).unwrap();
    assert_eq!(with_monk.len(), 1, "The distinct point sits alone");
}

#[test]
fn test_length_mismatch_is_rejected() {
    let owned = segments(&CUT[..3]);
    let refs: Vec<&Segment> = owned.iter().collect();
    let embeddings = embed(&owned[..2]);

    let err = GapClusterer::new(5, 42).cluster(&refs, &embeddings).unwrap_err();
    assert!(matches!(err, AnalysisError::Dependency(_)));
}
