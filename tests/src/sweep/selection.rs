use std::net::Ipv4Addr;
use std::sync::Arc;

use pingsweep_common::SweepError;
use pingsweep_common::network::subnet::Subnet;
use pingsweep_core::sweep::SweepService;

use crate::support::{self, MockProber, Reply, StaticInterfaces};

fn subnet(s: &str) -> Subnet {
    s.parse().unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn selects_matching_address_and_sweeps_the_subnet() {
    let prober = Arc::new(MockProber::new(Reply::All));

    let sweep = support::service(8, prober.clone())
        .scan_subnet(&subnet("10.0.0.0/24"), "eth0")
        .await
        .unwrap();

    assert_eq!(sweep.source.interface, "eth0");
    assert_eq!(sweep.source.address.ip(), Ipv4Addr::new(10, 0, 0, 5));

    let hosts = sweep.result.sorted();
    assert_eq!(hosts.len(), 254);
    assert_eq!(hosts.first(), Some(&Ipv4Addr::new(10, 0, 0, 1)));
    assert_eq!(hosts.last(), Some(&Ipv4Addr::new(10, 0, 0, 254)));
    assert!(!sweep.result.contains(Ipv4Addr::new(10, 0, 0, 0)));
    assert!(!sweep.result.contains(Ipv4Addr::new(10, 0, 0, 255)));
    assert_eq!(prober.calls(), 254);
}

#[tokio::test]
async fn second_address_matches_second_subnet() {
    let sweep = support::service(2, Arc::new(MockProber::new(Reply::Nothing)))
        .scan_subnet(&subnet("192.168.1.0/30"), "eth0")
        .await
        .unwrap();

    assert_eq!(sweep.source.address.ip(), Ipv4Addr::new(192, 168, 1, 2));
    assert!(sweep.result.is_empty());
}

#[tokio::test]
async fn slash_31_and_32_fail_before_probing() {
    let prober = Arc::new(MockProber::new(Reply::All));
    let svc = support::service(2, prober.clone());

    for s in ["10.0.0.4/31", "10.0.0.5/32"] {
        let err = svc.scan_subnet(&subnet(s), "eth0").await.unwrap_err();
        assert!(matches!(err, SweepError::InvalidSubnet { .. }), "{s}: {err}");
    }
    assert_eq!(prober.calls(), 0);
}

#[tokio::test]
async fn unknown_interface_is_a_lookup_error() {
    let prober = Arc::new(MockProber::new(Reply::All));
    let err = support::service(2, prober.clone())
        .scan_subnet(&subnet("10.0.0.0/24"), "eth7")
        .await
        .unwrap_err();

    assert!(matches!(err, SweepError::InterfaceLookup { .. }));
    assert_eq!(prober.calls(), 0);
}

#[tokio::test]
async fn interface_without_address_in_subnet() {
    let prober = Arc::new(MockProber::new(Reply::All));
    let err = support::service(2, prober.clone())
        .scan_subnet(&subnet("172.16.0.0/24"), "eth0")
        .await
        .unwrap_err();

    assert!(matches!(err, SweepError::NoAddressInSubnet { .. }));
    assert_eq!(prober.calls(), 0);
}

#[tokio::test]
async fn empty_result_is_not_an_error() {
    let svc = SweepService::new(
        support::test_config(2),
        Box::new(StaticInterfaces(Vec::new())),
        Arc::new(MockProber::new(Reply::Nothing)),
    );

    // No interfaces at all: fatal.
    assert!(svc.scan_subnet(&subnet("10.0.0.0/30"), "eth0").await.is_err());

    // Interface-less sweep of the same subnet: a successful, empty answer.
    let result = svc.scan_hosts(&subnet("10.0.0.0/30")).await.unwrap();
    assert!(result.is_empty());
    assert_eq!(result.dispatched, 2);
}
