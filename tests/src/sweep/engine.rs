use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pingsweep_common::network::subnet::Subnet;
use pingsweep_core::engine::{self, FixedRate, Unthrottled};

use crate::support::{self, MockProber, Reply};

fn subnet(s: &str) -> Subnet {
    s.parse().unwrap()
}

fn all_hosts(s: &str) -> BTreeSet<Ipv4Addr> {
    subnet(s).hosts().unwrap().collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn always_reachable_returns_every_host_for_any_pool_size() {
    let net = subnet("10.1.0.0/26");

    for workers in [1, 2, 8] {
        let prober = Arc::new(MockProber::new(Reply::All));
        let result = support::service(workers, prober.clone())
            .scan_hosts(&net)
            .await
            .unwrap();

        assert_eq!(result.len(), 62, "workers = {workers}");
        assert_eq!(result.clone().into_set(), all_hosts("10.1.0.0/26"));
        assert_eq!(prober.calls(), 62);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn never_reachable_terminates_with_empty_result() {
    let net = subnet("10.2.0.0/26");
    let delay = Duration::from_millis(5);
    let prober = Arc::new(MockProber::new(Reply::Nothing).with_delay(delay));

    let start = Instant::now();
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        support::service(4, prober.clone()).scan_hosts(&net),
    )
    .await
    .expect("scan did not terminate")
    .unwrap();

    assert!(result.is_empty());
    assert!(result.failures.is_empty());
    assert_eq!(result.dispatched, 62);
    assert_eq!(prober.calls(), 62);
    // 62 hosts / 4 workers * 5 ms is ~80 ms; leave room for slow CI.
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn marks_exactly_the_reachable_subset() {
    // 10.3.0.0/29 gives hosts .1 to .6
    let a = Ipv4Addr::new(10, 3, 0, 1);
    let c = Ipv4Addr::new(10, 3, 0, 3);
    let expected: BTreeSet<Ipv4Addr> = [a, c].into_iter().collect();

    for workers in [2, 3, 4, 16] {
        for _ in 0..10 {
            let prober = Arc::new(MockProber::only(&[a, c]));
            let result = support::service(workers, prober)
                .scan_hosts(&subnet("10.3.0.0/29"))
                .await
                .unwrap();
            assert_eq!(result.into_set(), expected, "workers = {workers}");
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn repeated_scans_yield_the_same_set() {
    let reachable: Vec<Ipv4Addr> = all_hosts("10.4.0.0/27")
        .into_iter()
        .filter(|ip| ip.octets()[3] % 3 == 0)
        .collect();
    let prober = Arc::new(MockProber::only(&reachable));
    let svc = support::service(6, prober);

    let first = svc.scan_hosts(&subnet("10.4.0.0/27")).await.unwrap();
    let second = svc.scan_hosts(&subnet("10.4.0.0/27")).await.unwrap();

    assert_eq!(first.clone().into_set(), second.into_set());
    assert_eq!(first.len(), reachable.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn many_results_with_tiny_queues_do_not_deadlock() {
    // Queue capacity equals the worker count, far below the 254 results.
    let prober = Arc::new(MockProber::new(Reply::All));
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        support::service(1, prober).scan_hosts(&subnet("10.5.0.0/24")),
    )
    .await
    .expect("scan deadlocked")
    .unwrap();

    assert_eq!(result.len(), 254);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pool_size_bounds_concurrent_probes() {
    let prober = Arc::new(MockProber::new(Reply::Nothing).with_delay(Duration::from_millis(10)));

    support::service(3, prober.clone())
        .scan_hosts(&subnet("10.6.0.0/27"))
        .await
        .unwrap();

    assert!(prober.peak_in_flight() <= 3, "peak = {}", prober.peak_in_flight());
    assert!(prober.peak_in_flight() >= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn probe_failures_are_isolated() {
    let good = Ipv4Addr::new(10, 7, 0, 1);
    let bad = Ipv4Addr::new(10, 7, 0, 2);
    let prober = Arc::new(MockProber::new(Reply::All).failing(&[bad]));

    let result = support::service(2, prober)
        .scan_hosts(&subnet("10.7.0.0/29"))
        .await
        .unwrap();

    assert_eq!(result.len(), 5);
    assert!(result.contains(good));
    assert!(!result.contains(bad));
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].addr, bad);
}

#[tokio::test]
async fn fixed_rate_throttle_paces_dispatch() {
    let hosts = subnet("10.8.0.0/29").hosts().unwrap();
    let start = Instant::now();

    let result = engine::run_scan(
        hosts,
        support::test_config(4),
        Arc::new(MockProber::new(Reply::All)),
        Arc::new(FixedRate::new(Duration::from_millis(10))),
    )
    .await
    .unwrap();

    assert_eq!(result.dispatched, 6);
    assert!(start.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn run_scan_accepts_unthrottled_policy() {
    let hosts = subnet("10.9.0.0/30").hosts().unwrap();

    let result = engine::run_scan(
        hosts,
        support::test_config(1),
        Arc::new(MockProber::new(Reply::Nothing)),
        Arc::new(Unthrottled),
    )
    .await
    .unwrap();

    assert!(result.is_empty());
    assert_eq!(result.dispatched, 2);
}
