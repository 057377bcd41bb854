use std::net::Ipv4Addr;

use bgpfib_core::helpers::{
    addr_to_int, canonical_netmask, cidr_repr, int_to_addr, masked_prefix, parse_addr,
    prefix_length,
};
use bgpfib_core::{Error, ForwardingTable, Origin, Route, RouteRecord};
use rand::Rng;

/// Build a record from the JSON an update message carries.
fn record(json: &str) -> RouteRecord {
    serde_json::from_str(json).expect("valid test JSON")
}

const ANNOUNCE_A: &str = r#"{
    "network": "192.168.0.0", "netmask": "255.255.255.0", "peer": "172.16.0.2",
    "localpref": 100, "ASPath": [1, 2], "origin": "EGP", "selfOrigin": false
}"#;

const ANNOUNCE_B: &str = r#"{
    "network": "192.168.1.0", "netmask": "255.255.255.0", "peer": "172.16.0.2",
    "localpref": 100, "ASPath": [1, 2], "origin": "EGP", "selfOrigin": false
}"#;

#[test]
fn address_helpers_roundtrip_edges() {
    assert_eq!(addr_to_int(Ipv4Addr::new(10, 0, 0, 1)), 0x0A00_0001);
    assert_eq!(int_to_addr(0xC0A8_0101), Ipv4Addr::new(192, 168, 1, 1));
    assert_eq!(canonical_netmask(0), Ipv4Addr::new(0, 0, 0, 0));
    assert_eq!(canonical_netmask(23), Ipv4Addr::new(255, 255, 254, 0));
    assert_eq!(canonical_netmask(32), Ipv4Addr::new(255, 255, 255, 255));
    assert_eq!(masked_prefix(Ipv4Addr::new(10, 0, 1, 77), 23), 0x0A00_0000);
    assert_eq!(masked_prefix(Ipv4Addr::new(10, 0, 1, 77), 0), 0);
    assert_eq!(cidr_repr(Ipv4Addr::new(10, 0, 0, 0), canonical_netmask(8)), "10.0.0.0/8");
}

#[test]
fn prefix_length_validates_contiguity() {
    assert_eq!(prefix_length(Ipv4Addr::new(255, 255, 255, 0)), Ok(24));
    assert_eq!(prefix_length(Ipv4Addr::new(0, 0, 0, 0)), Ok(0));
    assert_eq!(prefix_length(Ipv4Addr::new(255, 255, 255, 255)), Ok(32));
    let bad = Ipv4Addr::new(255, 0, 255, 0);
    assert_eq!(prefix_length(bad), Err(Error::InvalidNetmask(bad)));
    assert!(prefix_length(Ipv4Addr::new(0, 0, 0, 1)).is_err());
}

#[test]
fn random_masks_match_their_length() {
    let mut rng = rand::rng();
    for _ in 0..256 {
        let len: u8 = rng.random_range(0..=32);
        assert_eq!(prefix_length(canonical_netmask(len)), Ok(len));
    }
}

#[test]
fn parse_addr_rejects_garbage() {
    assert_eq!(parse_addr(" 10.1.2.3 "), Ok(Ipv4Addr::new(10, 1, 2, 3)));
    assert!(matches!(parse_addr("10.1.2"), Err(Error::MalformedAddress(_))));
    assert!(matches!(parse_addr("300.0.0.1"), Err(Error::MalformedAddress(_))));
}

#[test]
fn record_validates_into_route() {
    let route = Route::try_from(record(ANNOUNCE_A)).unwrap();
    assert_eq!(route.network, Ipv4Addr::new(192, 168, 0, 0));
    assert_eq!(route.prefix_len(), Ok(24));
    assert_eq!(route.peer, "172.16.0.2");
    assert_eq!(route.as_path, vec![1, 2]);
    assert_eq!(route.local_pref, 100);
    assert_eq!(route.origin, Origin::Egp);
    assert!(!route.self_origin);
}

#[test]
fn record_missing_attribute_is_named() {
    let rec = record(r#"{"network": "10.0.0.0", "netmask": "255.0.0.0", "peer": "1.1.1.1",
                         "ASPath": [], "origin": "IGP", "selfOrigin": true}"#);
    assert_eq!(Route::try_from(rec), Err(Error::MissingAttribute("localpref")));

    let rec = RouteRecord {
        network: Some("10.0.0.0".into()),
        ..Default::default()
    };
    assert_eq!(Route::try_from(rec), Err(Error::MissingAttribute("netmask")));
}

#[test]
fn record_rejects_bad_values() {
    let mut rec = record(ANNOUNCE_A);
    rec.netmask = Some("255.255.0.255".into());
    assert!(matches!(Route::try_from(rec), Err(Error::InvalidNetmask(_))));

    let mut rec = record(ANNOUNCE_A);
    rec.origin = Some("BGP".into());
    assert_eq!(Route::try_from(rec), Err(Error::UnknownOrigin("BGP".into())));

    let mut rec = record(ANNOUNCE_A);
    rec.network = Some("192.168.0".into());
    assert!(matches!(Route::try_from(rec), Err(Error::MalformedAddress(_))));
}

#[test]
fn announce_then_search() {
    let mut table = ForwardingTable::new();
    table.announce(record(ANNOUNCE_A)).unwrap();
    table.announce(record(ANNOUNCE_B)).unwrap();

    let hit = table.search_str("192.168.1.20").unwrap().unwrap();
    assert_eq!(cidr_repr(hit.network, hit.netmask), "192.168.0.0/23");
    assert!(table.search_str("192.168.2.1").unwrap().is_none());
    assert!(table.search_str("not-an-ip").is_err());
}

#[test]
fn rejected_insert_leaves_table_untouched() {
    let mut table = ForwardingTable::new();
    table.announce(record(ANNOUNCE_A)).unwrap();
    let nodes = table.node_count();

    let bad = Route {
        network: Ipv4Addr::new(10, 0, 0, 0),
        netmask: Ipv4Addr::new(255, 0, 255, 0),
        peer: "1.1.1.1".into(),
        as_path: vec![],
        local_pref: 100,
        self_origin: false,
        origin: Origin::Igp,
    };
    assert!(matches!(table.insert(bad), Err(Error::InvalidNetmask(_))));

    let mut incomplete = record(ANNOUNCE_B);
    incomplete.peer = None;
    assert_eq!(
        table.announce(incomplete),
        Err(Error::MissingAttribute("peer"))
    );

    assert_eq!(table.node_count(), nodes);
    assert_eq!(table.len(), 1);
}

#[test]
fn dumped_routes_serialize_with_wire_keys() {
    let mut table = ForwardingTable::new();
    table.announce(record(ANNOUNCE_A)).unwrap();
    let json = serde_json::to_value(table.dump()).unwrap();
    let entry = &json[0];
    assert_eq!(entry["network"], "192.168.0.0");
    assert_eq!(entry["netmask"], "255.255.255.0");
    assert_eq!(entry["ASPath"], serde_json::json!([1, 2]));
    assert_eq!(entry["localpref"], 100);
    assert_eq!(entry["selfOrigin"], false);
    assert_eq!(entry["origin"], "EGP");
}

#[test]
fn origin_ranks_are_ordered() {
    assert!(Origin::Igp.rank() > Origin::Egp.rank());
    assert!(Origin::Egp.rank() > Origin::Unk.rank());
    assert_eq!("UNK".parse::<Origin>(), Ok(Origin::Unk));
    assert_eq!(Origin::Igp.to_string(), "IGP");
}

#[test]
fn error_labels() {
    assert_eq!(Error::MissingAttribute("peer").as_str(), "Missing attribute");
    assert_eq!(
        Error::MissingAttribute("peer").to_string(),
        "route record is missing required attribute `peer`"
    );
}
