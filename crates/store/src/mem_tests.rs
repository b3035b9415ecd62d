// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeDelta;

fn t(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(secs)
}

fn alert_draft(server: &Server, service: Option<&Service>) -> NewAlert {
    NewAlert {
        server_id: Some(server.id),
        service_id: service.map(|s| s.id),
        service_state_id: None,
        ctime: t(0),
        channel: "api".to_owned(),
        event: "alert".to_owned(),
        message: "boom".to_owned(),
    }
}

#[test]
fn server_create_and_lookup() {
    let mut store = MemStore::in_memory();
    let server = store.create_server("web1", "k1");
    assert_eq!(server.id, ServerId(1));
    assert_eq!(server.title, "web1");
    assert_eq!(store.server_by_name("web1").unwrap().id, server.id);
    assert!(store.server_by_name("web2").is_none());
    assert_eq!(store.create_server("web2", "k2").id, ServerId(2));
}

#[test]
fn service_create_requires_server() {
    let mut store = MemStore::in_memory();
    assert!(matches!(
        store.create_service(ServerId(9), "app"),
        Err(StoreError::Missing { entity: "server", id: 9 })
    ));
    let server = store.create_server("web1", "k");
    let service = store.create_service(server.id, "app").unwrap();
    assert_eq!(service.period, None);
    assert!(!service.timed_out);
    assert_eq!(store.service_by_name(server.id, "app").unwrap().id, service.id);
    assert!(store.service_by_name(server.id, "cpu").is_none());
}

#[test]
fn append_state_advances_latest_pointer() {
    let mut store = MemStore::in_memory();
    let server = store.create_server("web1", "k");
    let service = store.create_service(server.id, "app").unwrap();
    assert!(store.latest_state(service.id).is_none());

    let first = store.append_state(service.id, CheckState::Ok, "up", t(1)).unwrap();
    let second = store.append_state(service.id, CheckState::Warn, "meh", t(2)).unwrap();
    assert!(second.id > first.id);
    let latest = store.latest_state(service.id).unwrap();
    assert_eq!(latest.id, second.id);
    assert_eq!(latest.state, CheckState::Warn);
    assert_eq!(store.service(service.id).unwrap().latest_state_id, Some(second.id));
}

#[test]
fn state_ids_are_monotonic_across_services() {
    let mut store = MemStore::in_memory();
    let server = store.create_server("web1", "k");
    let a = store.create_service(server.id, "a").unwrap();
    let b = store.create_service(server.id, "b").unwrap();
    let s1 = store.append_state(a.id, CheckState::Ok, "", t(1)).unwrap();
    let s2 = store.append_state(b.id, CheckState::Ok, "", t(1)).unwrap();
    let s3 = store.append_state(a.id, CheckState::Ok, "", t(2)).unwrap();
    assert_eq!((s1.id.0, s2.id.0, s3.id.0), (1, 2, 3));
}

#[test]
fn unchecked_scan_pairs_each_state_with_its_predecessor() {
    let mut store = MemStore::in_memory();
    let server = store.create_server("web1", "k");
    let a = store.create_service(server.id, "a").unwrap();
    let b = store.create_service(server.id, "b").unwrap();
    let a1 = store.append_state(a.id, CheckState::Ok, "", t(1)).unwrap();
    let b1 = store.append_state(b.id, CheckState::Ok, "", t(1)).unwrap();
    let a2 = store.append_state(a.id, CheckState::Fail, "", t(2)).unwrap();

    let scan = store.unchecked_states();
    assert_eq!(scan.len(), 3);
    // Ascending id order
    assert_eq!(scan[0].0.id, a1.id);
    assert_eq!(scan[1].0.id, b1.id);
    assert_eq!(scan[2].0.id, a2.id);
    // Predecessors are per-service
    assert!(scan[0].1.is_none());
    assert!(scan[1].1.is_none());
    assert_eq!(scan[2].1.as_ref().map(|s| s.id), Some(a1.id));

    store.mark_state_checked(a1.id).unwrap();
    let scan = store.unchecked_states();
    assert_eq!(scan.len(), 2);
    // The predecessor relation ignores the checked flag
    assert_eq!(scan[1].1.as_ref().map(|s| s.id), Some(a1.id));
}

#[test]
fn checked_and_reported_flags_stick() {
    let mut store = MemStore::in_memory();
    let server = store.create_server("web1", "k");
    let service = store.create_service(server.id, "a").unwrap();
    let state = store.append_state(service.id, CheckState::Ok, "", t(1)).unwrap();
    store.mark_state_checked(state.id).unwrap();
    assert!(store.state(state.id).unwrap().checked);

    let alert = store.append_alert(alert_draft(&server, Some(&service))).unwrap();
    assert!(!alert.reported);
    store.mark_alert_reported(alert.id).unwrap();
    assert!(store.pending_alerts().is_empty());
}

#[test]
fn services_with_period_and_state_needs_both() {
    let mut store = MemStore::in_memory();
    let server = store.create_server("web1", "k");
    let no_period = store.create_service(server.id, "a").unwrap();
    store.append_state(no_period.id, CheckState::Ok, "", t(1)).unwrap();
    let no_state = store.create_service(server.id, "b").unwrap();
    store.set_service_period(no_state.id, 60).unwrap();
    let both = store.create_service(server.id, "c").unwrap();
    store.set_service_period(both.id, 60).unwrap();
    store.append_state(both.id, CheckState::Ok, "", t(1)).unwrap();

    let eligible = store.services_with_period_and_state();
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].id, both.id);
}

#[test]
fn pending_alerts_ascending() {
    let mut store = MemStore::in_memory();
    let server = store.create_server("web1", "k");
    let first = store.append_alert(alert_draft(&server, None)).unwrap();
    let second = store.append_alert(alert_draft(&server, None)).unwrap();
    let pending = store.pending_alerts();
    assert_eq!(
        pending.iter().map(|a| a.id).collect::<Vec<_>>(),
        vec![first.id, second.id]
    );
}

#[test]
fn delete_service_cascades_states_and_alerts() {
    let mut store = MemStore::in_memory();
    let server = store.create_server("web1", "k");
    let doomed = store.create_service(server.id, "a").unwrap();
    let kept = store.create_service(server.id, "b").unwrap();
    store.append_state(doomed.id, CheckState::Ok, "", t(1)).unwrap();
    store.append_state(kept.id, CheckState::Ok, "", t(1)).unwrap();
    store.append_alert(alert_draft(&server, Some(&doomed))).unwrap();
    store.append_alert(alert_draft(&server, Some(&kept))).unwrap();

    store.delete_service(doomed.id).unwrap();
    assert!(store.service(doomed.id).is_none());
    assert!(store.latest_state(kept.id).is_some());
    assert_eq!(store.unchecked_states().len(), 1);
    assert_eq!(store.pending_alerts().len(), 1);
}

#[test]
fn delete_server_cascades_everything() {
    let mut store = MemStore::in_memory();
    let server = store.create_server("web1", "k");
    let other = store.create_server("web2", "k");
    let service = store.create_service(server.id, "a").unwrap();
    store.append_state(service.id, CheckState::Ok, "", t(1)).unwrap();
    store.append_alert(alert_draft(&server, Some(&service))).unwrap();
    let surviving = store.create_service(other.id, "b").unwrap();
    store.append_alert(alert_draft(&other, None)).unwrap();

    store.delete_server(server.id).unwrap();
    assert!(store.server(server.id).is_none());
    assert!(store.service(service.id).is_none());
    assert_eq!(store.unchecked_states().len(), 0);
    assert_eq!(store.pending_alerts().len(), 1);
    assert!(store.service(surviving.id).is_some());

    // Ids are never reused after a cascade
    assert_eq!(store.create_server("web3", "k").id, ServerId(3));
}

#[test]
fn alerts_since_scoping() {
    let mut store = MemStore::in_memory();
    let server = store.create_server("web1", "k");
    let service = store.create_service(server.id, "a").unwrap();
    let mut old = alert_draft(&server, Some(&service));
    old.ctime = t(100);
    store.append_alert(old).unwrap();
    let mut fresh = alert_draft(&server, None);
    fresh.ctime = t(200);
    store.append_alert(fresh).unwrap();

    assert_eq!(store.alerts_since(t(0), None, None).len(), 2);
    assert_eq!(store.alerts_since(t(150), None, None).len(), 1);
    assert_eq!(store.alerts_since(t(0), Some(server.id), None).len(), 2);
    assert_eq!(store.alerts_since(t(0), None, Some(service.id)).len(), 1);
    assert_eq!(store.alerts_since(t(0), Some(ServerId(9)), None).len(), 0);
}

#[test]
fn states_since_newest_first() {
    let mut store = MemStore::in_memory();
    let server = store.create_server("web1", "k");
    let service = store.create_service(server.id, "a").unwrap();
    store.append_state(service.id, CheckState::Ok, "1", t(10)).unwrap();
    store.append_state(service.id, CheckState::Warn, "2", t(20)).unwrap();
    store.append_state(service.id, CheckState::Ok, "3", t(30)).unwrap();

    let states = store.states_since(service.id, t(15));
    assert_eq!(
        states.iter().map(|s| s.info.as_str()).collect::<Vec<_>>(),
        vec!["3", "2"]
    );
}

#[test]
fn stats_counts() {
    let mut store = MemStore::in_memory();
    let server = store.create_server("web1", "k");
    let service = store.create_service(server.id, "a").unwrap();
    let alert = store.append_alert(alert_draft(&server, Some(&service))).unwrap();
    store.append_alert(alert_draft(&server, None)).unwrap();
    store.mark_alert_reported(alert.id).unwrap();

    assert_eq!(
        store.stats(),
        StoreStats { servers: 1, services: 1, alerts_pending: 1 }
    );
}

#[test]
fn commit_and_reopen_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut store = MemStore::open(&path).unwrap();
    let server = store.create_server("web1", "secret");
    let service = store.create_service(server.id, "app").unwrap();
    store.set_service_period(service.id, 60).unwrap();
    store.append_state(service.id, CheckState::Warn, "meh", t(5)).unwrap();
    store.commit().unwrap();

    let reopened = MemStore::open(&path).unwrap();
    let server = reopened.server_by_name("web1").unwrap();
    assert_eq!(server.key, "secret");
    let service = reopened.service_by_name(server.id, "app").unwrap();
    assert_eq!(service.period, Some(60));
    let latest = reopened.latest_state(service.id).unwrap();
    assert_eq!(latest.state, CheckState::Warn);
    assert_eq!(latest.rtime, t(5));
}

#[test]
fn in_memory_commit_is_a_noop() {
    let mut store = MemStore::in_memory();
    store.create_server("web1", "k");
    store.commit().unwrap();
}
