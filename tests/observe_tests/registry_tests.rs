//! Observation Registry Tests
//!
//! Tests for observation bookkeeping, notification routing and teardown.

#[path = "../common/mod.rs"]
mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use lwm2m_bridge::coap::{CoapResponse, ResponseCode, Token};
use lwm2m_bridge::node::{LwM2mNode, LwM2mPath, Resource, Value};
use lwm2m_bridge::observe::{ChannelListener, ObservationEvent, ObservationListener, ObservationRegistry};
use lwm2m_bridge::BridgeError;

fn notification(payload: &'static str) -> CoapResponse {
    CoapResponse::new(ResponseCode::Content)
        .with_content_format(0)
        .with_observe(2)
        .with_payload(payload)
}

fn listen(registry: &Arc<dyn ObservationRegistry>) -> (Arc<dyn ObservationListener>, crossbeam::channel::Receiver<ObservationEvent>) {
    let (listener, events) = ChannelListener::new();
    let listener: Arc<dyn ObservationListener> = Arc::new(listener);
    registry.add_listener(Arc::clone(&listener));
    (listener, events)
}

// =============================================================================
// Notification Tests
// =============================================================================

#[test]
fn test_notification_reaches_listener() {
    let (translator, registry) = common::translator();
    let (_listener, events) = listen(&common::as_registry(&registry));
    let client = common::client();
    let (exchange, observation) = common::observe(&translator, &client, common::battery_path());

    exchange.deliver(&notification("42"));

    assert_eq!(
        events.try_recv().unwrap(),
        ObservationEvent::Value {
            token: observation.token(),
            endpoint: "urn:dev:test-001".to_string(),
            path: common::battery_path(),
            value: LwM2mNode::Resource(Resource::single(9, Value::Integer(42))),
        }
    );
    assert!(events.try_recv().is_err());
}

#[test]
fn test_notify_unknown_token_is_ignored() {
    let (_translator, registry) = common::translator();
    let (_listener, events) = listen(&common::as_registry(&registry));

    registry.notify(Token::new(u64::MAX), &notification("1"));

    assert!(events.try_recv().is_err());
}

#[test]
fn test_undecodable_notification_is_dropped() {
    let (translator, registry) = common::translator();
    let (_listener, events) = listen(&common::as_registry(&registry));
    let (exchange, observation) = common::observe(&translator, &common::client(), common::battery_path());

    exchange.deliver(&notification("ninety"));

    assert!(events.try_recv().is_err());
    assert!(registry.get(observation.token()).is_some());
    assert!(observation.is_active());
}

#[test]
fn test_error_notification_ends_observation() {
    let (translator, registry) = common::translator();
    let (_listener, events) = listen(&common::as_registry(&registry));
    let (exchange, observation) = common::observe(&translator, &common::client(), common::battery_path());

    exchange.deliver(&CoapResponse::new(ResponseCode::NotFound));

    assert!(matches!(events.try_recv().unwrap(), ObservationEvent::Cancelled { .. }));
    assert!(registry.is_empty());
    assert!(exchange.is_cancelled());
    assert!(!observation.is_active());
}

#[test]
fn test_removed_listener_gets_nothing() {
    let (translator, registry) = common::translator();
    let shared = common::as_registry(&registry);
    let (listener, events) = listen(&shared);
    let (exchange, _observation) = common::observe(&translator, &common::client(), common::battery_path());

    shared.remove_listener(&listener);
    exchange.deliver(&notification("42"));

    assert!(events.try_recv().is_err());
}

// =============================================================================
// Cancellation Tests
// =============================================================================

#[test]
fn test_cancel_observation_cancels_exchange() {
    let (translator, registry) = common::translator();
    let (_listener, events) = listen(&common::as_registry(&registry));
    let (exchange, observation) = common::observe(&translator, &common::client(), common::battery_path());

    let removed = registry.cancel_observation(observation.token()).unwrap();

    assert!(Arc::ptr_eq(&removed, &observation));
    assert!(exchange.is_cancelled());
    assert_eq!(exchange.observer_count(), 0);
    assert!(registry.is_empty());
    assert_eq!(
        events.try_recv().unwrap(),
        ObservationEvent::Cancelled {
            token: observation.token(),
            endpoint: "urn:dev:test-001".to_string(),
            path: common::battery_path(),
        }
    );
    assert!(events.try_recv().is_err());

    assert!(registry.cancel_observation(observation.token()).is_none());
}

#[test]
fn test_exchange_cancel_removes_observation() {
    let (translator, registry) = common::translator();
    let (_listener, events) = listen(&common::as_registry(&registry));
    let (exchange, observation) = common::observe(&translator, &common::client(), common::battery_path());

    exchange.cancel();
    exchange.cancel();

    assert!(registry.get(observation.token()).is_none());
    assert!(matches!(events.try_recv().unwrap(), ObservationEvent::Cancelled { .. }));
    assert!(events.try_recv().is_err());
}

#[test]
fn test_notifications_after_cancel_are_dropped() {
    let (translator, registry) = common::translator();
    let (_listener, events) = listen(&common::as_registry(&registry));
    let (exchange, _observation) = common::observe(&translator, &common::client(), common::battery_path());

    exchange.cancel();
    let _ = events.try_recv();
    exchange.deliver(&notification("42"));

    assert!(events.try_recv().is_err());
}

#[test]
fn test_cancel_observations_per_endpoint() {
    let (translator, registry) = common::translator();
    let client = common::client();
    let other = common::other_client();

    let (first, _) = common::observe(&translator, &client, common::battery_path());
    let (second, _) = common::observe(&translator, &client, LwM2mPath::resource(3, 0, 7));
    let (third, _) = common::observe(&translator, &other, common::battery_path());

    assert_eq!(registry.observations(&client.endpoint).len(), 2);
    assert_eq!(registry.cancel_observations(&client.endpoint), 2);

    assert!(first.is_cancelled());
    assert!(second.is_cancelled());
    assert!(!third.is_cancelled());
    assert!(registry.observations(&client.endpoint).is_empty());
    assert_eq!(registry.observations(&other.endpoint).len(), 1);
}

#[test]
fn test_cancel_path_only_touches_that_resource() {
    let (translator, registry) = common::translator();
    let client = common::client();

    let (battery, _) = common::observe(&translator, &client, common::battery_path());
    let (voltage, _) = common::observe(&translator, &client, LwM2mPath::resource(3, 0, 7));

    assert_eq!(registry.cancel_path(&client.endpoint, &common::battery_path()), 1);
    assert_eq!(registry.cancel_path(&client.endpoint, &common::battery_path()), 0);

    assert!(battery.is_cancelled());
    assert!(!voltage.is_cancelled());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_close_cancels_everything_and_refuses_more() {
    let (translator, registry) = common::translator();
    let client = common::client();
    let (exchange, _) = common::observe(&translator, &client, common::battery_path());

    registry.close();

    assert!(registry.is_closed());
    assert!(registry.is_empty());
    assert!(exchange.is_cancelled());

    let request = lwm2m_bridge::DownlinkRequest::observe(common::battery_path());
    let late = common::exchange_for(&request, &client);
    let err = translator
        .register_observation(&late, &client, &common::battery_path())
        .unwrap_err();
    assert!(matches!(err, BridgeError::Registration(_)));
}

// =============================================================================
// Registration Tests
// =============================================================================

#[test]
fn test_new_observation_replaces_same_resource() {
    let (translator, registry) = common::translator();
    let (_listener, events) = listen(&common::as_registry(&registry));
    let client = common::client();

    let (old_exchange, old) = common::observe(&translator, &client, common::battery_path());
    let (new_exchange, new) = common::observe(&translator, &client, common::battery_path());

    assert_eq!(registry.len(), 1);
    assert!(registry.get(old.token()).is_none());
    assert!(registry.get(new.token()).is_some());
    assert!(old_exchange.is_cancelled());
    assert!(!new_exchange.is_cancelled());
    assert!(matches!(
        events.try_recv().unwrap(),
        ObservationEvent::Cancelled { token, .. } if token == old.token()
    ));
}

#[test]
fn test_same_resource_on_other_endpoint_is_kept() {
    let (translator, registry) = common::translator();

    common::observe(&translator, &common::client(), common::battery_path());
    common::observe(&translator, &common::other_client(), common::battery_path());

    assert_eq!(registry.len(), 2);
}

#[test]
fn test_capacity_limit() {
    let (translator, registry) = common::bounded_translator(2);
    let client = common::client();

    common::observe(&translator, &client, LwM2mPath::resource(3, 0, 7));
    common::observe(&translator, &client, LwM2mPath::resource(3, 0, 8));

    let request = lwm2m_bridge::DownlinkRequest::observe(common::battery_path());
    let exchange = common::exchange_for(&request, &client);
    let err = translator
        .register_observation(&exchange, &client, &common::battery_path())
        .unwrap_err();
    assert!(err.to_string().contains("observation limit reached (2)"));
    assert_eq!(exchange.observer_count(), 0);

    // Replacing a live observation does not count against the limit
    common::observe(&translator, &client, LwM2mPath::resource(3, 0, 7));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_concurrent_registrations() {
    let (translator, registry) = common::translator();
    let translator = Arc::new(translator);

    let handles: Vec<_> = (0..8u16)
        .map(|t| {
            let translator = Arc::clone(&translator);
            thread::spawn(move || {
                let client = lwm2m_bridge::Client::new(format!("urn:dev:thread-{}", t), "reg");
                let mut exchanges = Vec::new();
                for i in 0..25u16 {
                    let (exchange, _) = common::observe(&translator, &client, LwM2mPath::resource(3303, i, 5700));
                    exchanges.push(exchange);
                }
                exchanges
            })
        })
        .collect();

    let exchanges: Vec<_> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();

    assert_eq!(registry.len(), 200);
    assert!(exchanges.iter().all(|e| e.observer_count() == 1));
    assert_eq!(registry.observations("urn:dev:thread-3").len(), 25);
}

#[test]
fn test_close_racing_registrations_leaves_nothing_live() {
    for _ in 0..20 {
        let (translator, registry) = common::translator();
        let translator = Arc::new(translator);
        let start = Arc::new(Barrier::new(5));

        let handles: Vec<_> = (0..4u16)
            .map(|t| {
                let translator = Arc::clone(&translator);
                let start = Arc::clone(&start);
                thread::spawn(move || {
                    let client = lwm2m_bridge::Client::new(format!("urn:dev:race-{}", t), "reg");
                    start.wait();
                    (0..50u16)
                        .filter_map(|i| {
                            let path = LwM2mPath::resource(3303, i, 5700);
                            let request = lwm2m_bridge::DownlinkRequest::observe(path);
                            let exchange = common::exchange_for(&request, &client);
                            translator
                                .register_observation(&exchange, &client, &path)
                                .ok()
                                .map(|_| exchange)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        start.wait();
        registry.close();

        let registered: Vec<_> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();

        assert!(registry.is_empty());
        assert!(registered.iter().all(|exchange| exchange.is_cancelled()));
    }
}
