#![forbid(unsafe_code)]

use cmdq_core::CommandRecord;
use cmdq_storage::{CatalogConfig, CatalogStore};
use std::time::Duration;

fn records(prefix: &str, count: usize) -> Vec<CommandRecord> {
    (0..count)
        .map(|i| {
            CommandRecord::try_new(format!("{prefix}-{i:05}"), format!("{prefix} command {i}"))
                .expect("valid record")
        })
        .collect()
}

#[test]
fn two_handles_building_one_path_never_commit_a_mixed_catalog() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("catalog.db");
    let config = CatalogConfig::at(&path).with_batch_size(5);
    let a = CatalogStore::open(config.clone()).expect("open handle a");
    let b = CatalogStore::open(config).expect("open handle b");

    let seed = records("seed", 10);
    let alpha = records("alpha", 400);
    let beta = records("beta", 400);
    a.build(&seed).expect("seed build");

    for round in 0..30u64 {
        let (res_a, res_b) = std::thread::scope(|scope| {
            let ta = scope.spawn(|| a.build(&alpha));
            let tb = scope.spawn(|| {
                std::thread::sleep(Duration::from_millis(round % 7));
                b.build(&beta)
            });
            (
                ta.join().expect("builder a panicked"),
                tb.join().expect("builder b panicked"),
            )
        });

        let all = a.resolve("").expect("resolve all");
        let prefix = all
            .names
            .first()
            .and_then(|name| name.split('-').next())
            .expect("catalog is never empty")
            .to_string();
        assert!(
            all.names.iter().all(|name| name.starts_with(&format!("{prefix}-"))),
            "round {round}: mixed catalog"
        );
        let expected = match prefix.as_str() {
            "alpha" => 400,
            "beta" => 400,
            "seed" => 10,
            other => panic!("round {round}: unexpected prefix {other}"),
        };
        assert_eq!(all.len(), expected, "round {round}: partial catalog");

        let stats = a.stats().expect("stats").expect("built");
        assert_eq!(stats.record_count, expected as i64, "round {round}: meta count");
        assert!(
            res_a.is_ok() || res_b.is_ok(),
            "round {round}: both builds failed: {res_a:?} {res_b:?}"
        );
    }
}
