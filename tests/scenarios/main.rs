//! End-to-end scenarios against the public facade.
//!
//! Each test drives a fresh registry over a temp directory through the
//! complete flow a caller would use: plain storage, indexed lookups,
//! unitemporal version timelines, bitemporal milestoning, and joins.

use serde_json::json;
use tempfile::TempDir;
use varve::{Database, VarveError, INFINITY_TIME};

fn setup() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path());
    (dir, db)
}

/// S1: plain partition without indices.
#[test]
fn plain_set_get_delete_lifecycle() {
    let (_dir, db) = setup();
    let partition = db.get_partition("plain", &[], None).unwrap();

    assert!(partition.set("k1", json!("v1")));
    assert!(partition.set("k2", json!("v2")));
    assert!(partition.set("k3", json!("v3")));
    assert!(partition.delete("k3"));

    let mut keys = partition.keys();
    keys.sort();
    assert_eq!(keys, ["k1", "k2"]);
    assert_eq!(partition.get("k3"), None);

    let data = partition.data();
    assert_eq!(data.len(), 2);
    assert_eq!(data["k1"], json!("v1"));
    assert_eq!(data["k2"], json!("v2"));
}

/// S2: indexed partition, alias follows the latest value.
#[test]
fn indexed_aliases_follow_rewrites() {
    let (_dir, db) = setup();
    let partition = db.get_partition("songs", &["artist"], None).unwrap();

    let first = json!({"song": "Gravity", "artist": "John Mayer", "album": "Continuum"});
    partition.set("gravity", first.clone());
    assert_eq!(partition.get("John Mayer"), Some(first));

    let second = json!({"song": "Gravity", "artist": "John Mayerz", "album": "Continuum"});
    partition.set("gravity", second.clone());
    assert_eq!(partition.get("John Mayer"), None);
    assert_eq!(partition.get("John Mayerz"), Some(second));
}

/// S3: unitemporal version accounting across keys.
#[test]
fn unitemporal_versions_accumulate_per_key() {
    let (_dir, db) = setup();
    let partition = db.get_versioned_partition("songs", &[], None).unwrap();

    partition.set("gravity", json!({"take": 1}));
    partition.set("gravity", json!({"take": 2}));
    partition.set("delicate", json!({"take": 1}));

    assert_eq!(partition.get_all_versions("gravity").unwrap().len(), 2);
    assert_eq!(partition.get_version("gravity", 1), Some(json!({"take": 1})));
    assert_eq!(partition.get_version("gravity", 46), None);
    assert_eq!(partition.get("gravity"), Some(json!({"take": 2})));
}

/// S4: unitemporal delete drops the whole timeline.
#[test]
fn unitemporal_delete_is_total_and_idempotent() {
    let (_dir, db) = setup();
    let partition = db.get_versioned_partition("songs", &[], None).unwrap();

    partition.set("gravity", json!("v1"));
    partition.set("gravity", json!("v2"));

    assert!(partition.delete("gravity"));
    assert_eq!(partition.get_all_versions("gravity"), None);
    assert_eq!(partition.get_version("gravity", 1), None);
    assert!(!partition.delete("gravity"));
}

/// S5: bitemporal closed interval and interval validation.
#[test]
fn bitemporal_closed_interval_point_reads() {
    let (_dir, db) = setup();
    let partition = db.get_bitemporal_partition("depths", &[], None).unwrap();

    partition
        .set("ocean", json!({"depth": 3000}), Some(1), Some(500), None)
        .unwrap();

    assert_eq!(partition.get_as_of("ocean", 250), Some(json!({"depth": 3000})));
    assert_eq!(partition.get_as_of("ocean", 0), None);
    assert_eq!(partition.get_as_of("ocean", 2000), None);

    let err = partition
        .set("ocean", json!({"depth": 1}), Some(50), Some(25), None)
        .unwrap_err();
    assert!(matches!(err, VarveError::InvalidInterval { .. }));
}

/// S6: consecutive remilestoned intervals stay non-overlapping.
#[test]
fn bitemporal_remilestoning_keeps_the_timeline_disjoint() {
    let (_dir, db) = setup();
    let partition = db.get_bitemporal_partition("depths", &[], None).unwrap();

    partition.set("ocean", json!("X"), Some(1), Some(500), None).unwrap();
    partition.set("ocean", json!("Y"), Some(500), Some(7895), None).unwrap();
    partition.set("ocean", json!("Z"), Some(7895), None, None).unwrap();

    let slices = partition.get_all_versions("ocean").unwrap();
    let mut live: Vec<_> = slices
        .iter()
        .filter(|s| s.is_live())
        .map(|s| (s.valid_from, s.valid_to, s.data.clone()))
        .collect();
    live.sort_by_key(|(from, _, _)| *from);

    assert_eq!(live.len(), 3);
    assert_eq!(live[0], (1, 500, json!("X")));
    assert_eq!(live[1], (500, 7895, json!("Y")));
    assert_eq!(live[2], (7895, INFINITY_TIME, json!("Z")));

    // Pairwise non-overlap of the half-open live intervals.
    for pair in live.windows(2) {
        assert!(pair[0].1 <= pair[1].0 && pair[0].1 != INFINITY_TIME);
    }

    assert_eq!(partition.get_as_of("ocean", 7895), Some(json!("Z")));
    assert_eq!(partition.get("ocean"), Some(json!("Z")));
}

/// Invariant 8: cache stays consistent with disk after writes/deletes.
#[test]
fn cache_coherence_across_set_and_delete() {
    let (dir, db) = setup();
    let partition = db.get_partition("songs", &[], None).unwrap();

    partition.set("k", json!("v1"));
    assert_eq!(partition.get("k"), Some(json!("v1")));

    partition.set("k", json!("v2"));
    assert_eq!(partition.get("k"), Some(json!("v2")));
    let on_disk: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("songs/k.json")).unwrap()).unwrap();
    assert_eq!(on_disk, json!("v2"));

    partition.delete("k");
    assert_eq!(partition.get("k"), None);
    assert!(!dir.path().join("songs/k.json").exists());
}

/// Joined view through the registry, end to end.
#[test]
fn joined_reads_across_partitions() {
    let (_dir, db) = setup();

    let artists = db.get_partition("artists", &[], None).unwrap();
    artists.set("mayer", json!({"name": "John Mayer"}));

    let songs = db.get_partition("songs", &[], None).unwrap();
    songs.set("gravity", json!({"song": "Gravity", "artistId": "mayer"}));
    songs.create_join("artists", "artist", "artistId", None).unwrap();

    let joined = songs.get_with_joins("gravity").unwrap().unwrap();
    assert_eq!(joined["artist"]["name"], json!("John Mayer"));
    assert_eq!(joined["song"], json!("Gravity"));

    // Misconfigured joins are rejected up front.
    let err = songs.create_join("", "x", "y", None).unwrap_err();
    assert!(matches!(err, VarveError::InvalidArgument { .. }));
}

/// Backup produces a timestamped gzipped tar next to the data.
#[test]
fn backup_round_trip_produces_an_archive() {
    let (_dir, db) = setup();
    let out = TempDir::new().unwrap();

    let partition = db.get_partition("songs", &[], None).unwrap();
    partition.set("k", json!("v"));

    let archive = db.backup(out.path()).unwrap();
    let name = archive.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("backup-") && name.ends_with(".tar.gz"));
    assert!(archive.metadata().unwrap().len() > 0);
}
