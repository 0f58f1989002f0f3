use crate::connectivity::ping_all;
use crate::net::Topology;
use crate::registry::HostRegistry;
use crate::test::fake::{FakeNetwork, ping_output};
use crate::topo::build_single;

#[test]
fn ping_all_counts_every_ordered_pair() {
    let mut topo = Topology::new("Single Topology");
    build_single(&mut topo, 4);
    // h4 is unreachable from everyone, and cannot reach anyone
    let net = FakeNetwork::new(topo, |host, cmd| {
        if host == "h4" || cmd.ends_with("10.0.0.4") {
            Ok("1 packets transmitted, 0 received, 100% packet loss, time 0ms\n".into())
        } else {
            Ok(ping_output("10.0.0.1", 1, 0.05, 0.05))
        }
    });
    let registry = HostRegistry::resolve(&net).unwrap();

    let report = ping_all(&registry, "ping");
    assert_eq!(report.sent, 12);
    assert_eq!(report.received, 6);
    assert_eq!(report.dropped(), 6);
    assert_eq!(report.dropped_pct(), 50.0);
}

#[test]
fn ping_all_treats_tool_errors_as_drops() {
    let mut topo = Topology::new("Single Topology");
    build_single(&mut topo, 2);
    let net = FakeNetwork::new(topo, |host, cmd| {
        Err(crate::error::BenchError::ToolInvocation {
            host: host.into(),
            command: cmd.into(),
            reason: "no such binary".into(),
        })
    });
    let registry = HostRegistry::resolve(&net).unwrap();

    let report = ping_all(&registry, "ping");
    assert_eq!((report.sent, report.received), (2, 0));
    assert_eq!(report.dropped_pct(), 100.0);
}
