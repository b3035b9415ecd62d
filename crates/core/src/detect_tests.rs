// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::model::{ServiceId, StateId};
use chrono::DateTime;

fn state(id: i64, check: CheckState) -> ServiceState {
    ServiceState {
        id: StateId(id),
        service_id: ServiceId(1),
        rtime: DateTime::<Utc>::UNIX_EPOCH,
        state: check,
        info: String::new(),
        checked: false,
    }
}

fn service(period: Option<i64>, timed_out: bool) -> Service {
    Service {
        id: ServiceId(1),
        server_id: crate::model::ServerId(1),
        name: "app".to_owned(),
        title: "app".to_owned(),
        period,
        timed_out,
        latest_state_id: Some(StateId(1)),
    }
}

#[test]
fn first_ok_report_is_silent() {
    assert_eq!(detect_state_change(None, &state(1, CheckState::Ok)), None);
}

#[test]
fn first_bad_report_alerts_with_question_mark_label() {
    let draft = detect_state_change(None, &state(1, CheckState::Unk)).unwrap();
    assert_eq!(draft.channel, "service:state");
    assert_eq!(draft.event, "UNK");
    assert_eq!(draft.message, "State changed: \"(?)\" -> \"UNK\"");
    assert_eq!(draft.service_state_id, Some(StateId(1)));
}

#[yare::parameterized(
    ok_to_warn   = { CheckState::Ok,   CheckState::Warn, "WARN", "State changed: \"OK\" -> \"WARN\"" },
    warn_to_ok   = { CheckState::Warn, CheckState::Ok,   "OK",   "State changed: \"WARN\" -> \"OK\"" },
    fail_to_unk  = { CheckState::Fail, CheckState::Unk,  "UNK",  "State changed: \"FAIL\" -> \"UNK\"" },
)]
fn change_emits_one_alert(prev: CheckState, curr: CheckState, event: &str, message: &str) {
    let draft = detect_state_change(Some(&state(1, prev)), &state(2, curr)).unwrap();
    assert_eq!(draft.event, event);
    assert_eq!(draft.message, message);
    assert_eq!(draft.service_state_id, Some(StateId(2)));
}

#[yare::parameterized(
    ok   = { CheckState::Ok },
    warn = { CheckState::Warn },
    unk  = { CheckState::Unk },
)]
fn identical_states_are_silent(check: CheckState) {
    assert_eq!(
        detect_state_change(Some(&state(1, check)), &state(2, check)),
        None
    );
}

#[test]
fn timeout_requires_a_period() {
    let now = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(100);
    assert_eq!(
        detect_timeout(&service(None, false), DateTime::<Utc>::UNIX_EPOCH, now),
        None
    );
}

#[test]
fn timeout_flip_to_offline() {
    let latest = DateTime::<Utc>::UNIX_EPOCH;
    let now = latest + TimeDelta::seconds(61);
    let tr = detect_timeout(&service(Some(60), false), latest, now).unwrap();
    assert!(tr.timed_out);
    assert_eq!(tr.draft.channel, "plugin");
    assert_eq!(tr.draft.event, "offline");
    assert_eq!(tr.draft.message, "Monitoring plugin offline");
    assert_eq!(tr.draft.service_state_id, None);
}

#[test]
fn timeout_flip_back_online() {
    let latest = DateTime::<Utc>::UNIX_EPOCH;
    let now = latest + TimeDelta::seconds(30);
    let tr = detect_timeout(&service(Some(60), true), latest, now).unwrap();
    assert!(!tr.timed_out);
    assert_eq!(tr.draft.event, "online");
    assert_eq!(tr.draft.message, "Monitoring plugin back online");
}

#[test]
fn stable_flag_is_silent_in_both_directions() {
    let latest = DateTime::<Utc>::UNIX_EPOCH;
    // Not timed out, still within period
    let now = latest + TimeDelta::seconds(30);
    assert_eq!(detect_timeout(&service(Some(60), false), latest, now), None);
    // Timed out, still overdue
    let now = latest + TimeDelta::seconds(120);
    assert_eq!(detect_timeout(&service(Some(60), true), latest, now), None);
}

#[test]
fn boundary_is_strictly_greater_than_period() {
    let latest = DateTime::<Utc>::UNIX_EPOCH;
    let now = latest + TimeDelta::seconds(60);
    // Exactly the period is not yet a timeout
    assert_eq!(detect_timeout(&service(Some(60), false), latest, now), None);
}
