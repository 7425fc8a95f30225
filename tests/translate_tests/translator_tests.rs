//! Response Translator Tests
//!
//! Tests for turning CoAP responses into typed LwM2M responses.

#[path = "../common/mod.rs"]
mod common;

use std::error::Error;

use lwm2m_bridge::coap::{CoapResponse, ContentFormat, ResponseCode};
use lwm2m_bridge::link::LinkAttribute;
use lwm2m_bridge::node::{LwM2mNode, LwM2mPath, Resource, Value};
use lwm2m_bridge::observe::ObservationRegistry;
use lwm2m_bridge::request::RequestKind;
use lwm2m_bridge::response::{map_status, LwM2mResponse};
use lwm2m_bridge::{BridgeError, DownlinkRequest, ResultCode, Translation};

#[derive(Debug, PartialEq)]
enum Outcome {
    Success,
    Failure,
    Suppressed,
    Unexpected,
    Unsupported,
}

/// Success code and recognized failure codes of each request kind
fn allowed(kind: RequestKind) -> (ResponseCode, &'static [ResponseCode]) {
    use ResponseCode::*;
    match kind {
        RequestKind::Read | RequestKind::Discover => (Content, &[Unauthorized, NotFound, MethodNotAllowed]),
        RequestKind::Write | RequestKind::WriteAttributes | RequestKind::Execute => {
            (Changed, &[BadRequest, Unauthorized, NotFound, MethodNotAllowed])
        }
        RequestKind::Create => (Created, &[BadRequest, Unauthorized, NotFound, MethodNotAllowed]),
        RequestKind::Delete => (Deleted, &[Unauthorized, NotFound, MethodNotAllowed]),
        RequestKind::Observe => (Content, &[NotFound, MethodNotAllowed]),
    }
}

fn expected(kind: RequestKind, code: ResponseCode) -> Outcome {
    let (success, failures) = allowed(kind);
    if kind == RequestKind::Observe && code == ResponseCode::Changed {
        Outcome::Suppressed
    } else if code == success {
        Outcome::Success
    } else if failures.contains(&code) {
        Outcome::Failure
    } else if map_status(code.value()).is_ok() {
        Outcome::Unexpected
    } else {
        Outcome::Unsupported
    }
}

/// A response with a payload each kind can decode on success
fn response_for(kind: RequestKind, code: ResponseCode) -> CoapResponse {
    match kind {
        RequestKind::Discover => CoapResponse::new(code)
            .with_content_format(ContentFormat::LINK_FORMAT_CODE)
            .with_payload("</3/0>,</3/0/9>"),
        _ => CoapResponse::new(code)
            .with_content_format(ContentFormat::Text.code())
            .with_payload("87"),
    }
}

fn classify(result: lwm2m_bridge::Result<Translation>) -> Outcome {
    match result {
        Ok(Translation::Suppressed) => Outcome::Suppressed,
        Ok(translation) => match translation.response() {
            Some(response) if response.is_success() => Outcome::Success,
            Some(_) => Outcome::Failure,
            None => unreachable!(),
        },
        Err(BridgeError::UnexpectedResponseCode { .. }) => Outcome::Unexpected,
        Err(BridgeError::UnsupportedStatusCode(_)) => Outcome::Unsupported,
        Err(other) => panic!("unexpected error: {}", other),
    }
}

fn translate(
    request: &DownlinkRequest,
    response: &CoapResponse,
) -> lwm2m_bridge::Result<Translation> {
    let (translator, _registry) = common::translator();
    let client = common::client();
    let exchange = common::exchange_for(request, &client);
    translator.translate(&client, request, &exchange, response)
}

// =============================================================================
// Status Table
// =============================================================================

#[test]
fn test_every_kind_against_every_code() {
    for kind in RequestKind::all() {
        for code in ResponseCode::all() {
            let request = common::request_of(*kind);
            let outcome = classify(translate(&request, &response_for(*kind, *code)));
            assert_eq!(outcome, expected(*kind, *code), "{:?} answered with {}", kind, code);
        }
    }
}

#[test]
fn test_failures_keep_the_mapped_code() {
    for kind in RequestKind::all() {
        let (_, failures) = allowed(*kind);
        for code in failures {
            let request = common::request_of(*kind);
            let translation = translate(&request, &CoapResponse::new(*code)).unwrap();
            let response = translation.response().unwrap();
            assert_eq!(response.code(), map_status(code.value()).unwrap());
            assert!(response.node().is_none());
            assert!(response.links().is_none());
            assert!(response.location().is_none());
        }
    }
}

#[test]
fn test_response_shape_per_kind() {
    let shape = |kind| {
        let request = common::request_of(kind);
        let (success, _) = allowed(kind);
        translate(&request, &response_for(kind, success))
            .unwrap()
            .response()
            .cloned()
            .unwrap()
    };

    assert!(matches!(shape(RequestKind::Read), LwM2mResponse::Value { .. }));
    assert!(matches!(shape(RequestKind::Observe), LwM2mResponse::Value { .. }));
    assert!(matches!(shape(RequestKind::Discover), LwM2mResponse::Discover { .. }));
    assert!(matches!(shape(RequestKind::Create), LwM2mResponse::Create { .. }));
    for kind in [
        RequestKind::Write,
        RequestKind::WriteAttributes,
        RequestKind::Execute,
        RequestKind::Delete,
    ] {
        assert!(matches!(shape(kind), LwM2mResponse::Generic { .. }), "{:?}", kind);
    }
}

// =============================================================================
// Read / Discover / Create
// =============================================================================

#[test]
fn test_read_content_is_decoded() {
    let request = DownlinkRequest::read(common::battery_path());
    let response = CoapResponse::new(ResponseCode::Content)
        .with_content_format(0)
        .with_payload("87");

    let translation = translate(&request, &response).unwrap();
    let response = translation.response().unwrap();

    assert_eq!(response.code(), ResultCode::Content);
    assert_eq!(
        response.node(),
        Some(&LwM2mNode::Resource(Resource::single(9, Value::Integer(87))))
    );
}

#[test]
fn test_read_without_content_format_defaults_to_text() {
    let request = DownlinkRequest::read(LwM2mPath::resource(3, 0, 0));
    let response = CoapResponse::new(ResponseCode::Content).with_payload("Acme");

    let translation = translate(&request, &response).unwrap();
    let resource = translation.response().unwrap().node().unwrap().as_resource().unwrap();
    assert_eq!(resource.value(), Some(&Value::String("Acme".to_string())));
}

#[test]
fn test_read_not_found() {
    let request = DownlinkRequest::read(common::battery_path());
    let translation = translate(&request, &CoapResponse::new(ResponseCode::NotFound)).unwrap();

    assert_eq!(
        translation.response(),
        Some(&LwM2mResponse::value_failure(ResultCode::NotFound))
    );
}

#[test]
fn test_discover_parses_links() {
    let request = common::request_of(RequestKind::Discover);
    let response = CoapResponse::new(ResponseCode::Content)
        .with_content_format(40)
        .with_payload("</3/0>,</3/0/9>;pmin=10");

    let translation = translate(&request, &response).unwrap();
    let links = translation.response().unwrap().links().unwrap();

    assert_eq!(links.len(), 2);
    assert_eq!(links[0].url, "/3/0");
    assert_eq!(links[1].attribute("pmin"), Some(&LinkAttribute::Integer(10)));
}

#[test]
fn test_discover_with_other_format_yields_no_links() {
    let request = common::request_of(RequestKind::Discover);
    for format in [None, Some(ContentFormat::Tlv.code())] {
        let mut response = CoapResponse::new(ResponseCode::Content).with_payload("</3/0>");
        response.options.content_format = format;

        let translation = translate(&request, &response).unwrap();
        let response = translation.response().unwrap();
        assert_eq!(response.code(), ResultCode::Content);
        assert_eq!(response.links(), Some(&[][..]));
    }
}

#[test]
fn test_discover_malformed_links_are_invalid_content() {
    let request = common::request_of(RequestKind::Discover);
    let response = CoapResponse::new(ResponseCode::Content)
        .with_content_format(40)
        .with_payload("/3/0>");

    match translate(&request, &response) {
        Err(BridgeError::InvalidContent { code, path, .. }) => {
            assert_eq!(code, ResultCode::Content);
            assert_eq!(path, "/3/0");
        }
        other => panic!("expected invalid content, got {:?}", other),
    }
}

#[test]
fn test_create_reports_location() {
    let request = common::request_of(RequestKind::Create);
    let response = CoapResponse::new(ResponseCode::Created).with_location_path("/1/12345");

    let translation = translate(&request, &response).unwrap();
    assert_eq!(
        translation.response(),
        Some(&LwM2mResponse::created(Some("1/12345".to_string())))
    );
}

#[test]
fn test_create_without_location() {
    let request = common::request_of(RequestKind::Create);
    let translation = translate(&request, &CoapResponse::new(ResponseCode::Created)).unwrap();

    let response = translation.response().unwrap();
    assert_eq!(response.code(), ResultCode::Created);
    assert_eq!(response.location(), None);
}

// =============================================================================
// Observe
// =============================================================================

#[test]
fn test_observe_changed_is_suppressed_without_registering() {
    let (translator, registry) = common::translator();
    let client = common::client();
    let request = DownlinkRequest::observe(common::battery_path());
    let exchange = common::exchange_for(&request, &client);
    let response = CoapResponse::new(ResponseCode::Changed)
        .with_observe(3)
        .with_payload("88");

    let translation = translator.translate(&client, &request, &exchange, &response).unwrap();

    assert!(translation.is_suppressed());
    assert!(translation.response().is_none());
    assert!(registry.is_empty());
    assert_eq!(exchange.observer_count(), 0);
}

#[test]
fn test_observe_content_registers_observation() {
    let (translator, registry) = common::translator();
    let client = common::client();
    let request = DownlinkRequest::observe(common::battery_path());
    let exchange = common::exchange_for(&request, &client);
    let response = CoapResponse::new(ResponseCode::Content)
        .with_content_format(0)
        .with_observe(1)
        .with_payload("87");

    let translation = translator.translate(&client, &request, &exchange, &response).unwrap();

    match translation {
        Translation::Observed { response, registration } => {
            assert_eq!(response.code(), ResultCode::Content);
            let observation = registration.unwrap();
            assert_eq!(observation.token(), exchange.token());
            assert_eq!(observation.endpoint(), client.endpoint);
            assert_eq!(observation.registration_id(), client.registration_id);
            assert_eq!(observation.path(), &common::battery_path());
            assert!(observation.is_active());
        }
        other => panic!("expected an observed translation, got {:?}", other),
    }

    assert_eq!(registry.len(), 1);
    assert!(registry.get(exchange.token()).is_some());
    assert_eq!(exchange.observer_count(), 1);
}

#[test]
fn test_observe_content_without_observe_option_is_plain_read() {
    let (translator, registry) = common::translator();
    let client = common::client();
    let request = DownlinkRequest::observe(common::battery_path());
    let exchange = common::exchange_for(&request, &client);
    let response = CoapResponse::new(ResponseCode::Content)
        .with_content_format(0)
        .with_payload("87");

    let translation = translator.translate(&client, &request, &exchange, &response).unwrap();

    assert!(matches!(translation, Translation::Response(_)));
    assert!(registry.is_empty());
    assert_eq!(exchange.observer_count(), 0);
}

#[test]
fn test_observe_registration_failure_keeps_response() {
    let (translator, registry) = common::translator();
    registry.close();

    let client = common::client();
    let request = DownlinkRequest::observe(common::battery_path());
    let exchange = common::exchange_for(&request, &client);
    let response = CoapResponse::new(ResponseCode::Content)
        .with_content_format(0)
        .with_observe(1)
        .with_payload("87");

    match translator.translate(&client, &request, &exchange, &response).unwrap() {
        Translation::Observed { response, registration } => {
            assert!(response.is_success());
            assert!(matches!(registration, Err(BridgeError::Registration(_))));
        }
        other => panic!("expected an observed translation, got {:?}", other),
    }
    assert_eq!(exchange.observer_count(), 0);
}

#[test]
fn test_observe_registration_respects_capacity() {
    let (translator, registry) = common::bounded_translator(1);
    let client = common::client();

    common::observe(&translator, &client, common::battery_path());

    let request = DownlinkRequest::observe(LwM2mPath::resource(3, 0, 7));
    let exchange = common::exchange_for(&request, &client);
    let response = CoapResponse::new(ResponseCode::Content)
        .with_content_format(0)
        .with_observe(1)
        .with_payload("3800");

    match translator.translate(&client, &request, &exchange, &response).unwrap() {
        Translation::Observed { registration, .. } => assert!(registration.is_err()),
        other => panic!("expected an observed translation, got {:?}", other),
    }
    assert_eq!(registry.len(), 1);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unexpected_code_names_endpoint_and_uri() {
    let request = DownlinkRequest::read(common::battery_path());
    let err = translate(&request, &CoapResponse::new(ResponseCode::Forbidden)).unwrap_err();

    match &err {
        BridgeError::UnexpectedResponseCode {
            endpoint,
            request_uri,
            code,
        } => {
            assert_eq!(endpoint, "urn:dev:test-001");
            assert_eq!(request_uri, "coap://192.0.2.10:5683/3/0/9");
            assert_eq!(*code, ResultCode::Forbidden);
        }
        other => panic!("expected unexpected response code, got {:?}", other),
    }
    assert_eq!(err.result_code(), Some(ResultCode::Forbidden));
    assert_eq!(
        err.to_string(),
        "Client [urn:dev:test-001] returned unexpected response code [FORBIDDEN] for [coap://192.0.2.10:5683/3/0/9]"
    );
}

#[test]
fn test_unmappable_code_is_unsupported() {
    let request = common::request_of(RequestKind::Write);
    let err = translate(&request, &CoapResponse::new(ResponseCode::Valid)).unwrap_err();

    assert!(matches!(err, BridgeError::UnsupportedStatusCode(0x43)));
    assert_eq!(err.result_code(), None);
}

#[test]
fn test_decode_failure_is_invalid_content() {
    let request = DownlinkRequest::read(common::battery_path());
    let response = CoapResponse::new(ResponseCode::Content)
        .with_content_format(0)
        .with_payload("not-a-number");

    let err = translate(&request, &response).unwrap_err();
    match &err {
        BridgeError::InvalidContent { code, path, reason, source } => {
            assert_eq!(*code, ResultCode::Content);
            assert_eq!(path, "/3/0/9");
            assert!(reason.ends_with("(/3/0/9)"), "{}", reason);
            assert_eq!(source.path, common::battery_path());
        }
        other => panic!("expected invalid content, got {:?}", other),
    }
    assert!(err.source().is_some());
    assert_eq!(err.result_code(), Some(ResultCode::Content));
}

#[test]
fn test_unknown_content_format_is_invalid_content() {
    let request = DownlinkRequest::read(common::battery_path());
    let response = CoapResponse::new(ResponseCode::Content)
        .with_content_format(9999)
        .with_payload("87");

    match translate(&request, &response) {
        Err(BridgeError::InvalidContent { source, .. }) => {
            assert_eq!(source.message, "Unsupported content format 9999");
        }
        other => panic!("expected invalid content, got {:?}", other),
    }
}

#[test]
fn test_oversized_payload_is_invalid_content() {
    let (translator, _registry) = common::translator();
    let translator = translator.with_max_payload_size(4);
    let client = common::client();
    let request = DownlinkRequest::read(common::battery_path());
    let exchange = common::exchange_for(&request, &client);
    let response = CoapResponse::new(ResponseCode::Content)
        .with_content_format(0)
        .with_payload("123456");

    let err = translator.translate(&client, &request, &exchange, &response).unwrap_err();
    assert!(matches!(err, BridgeError::InvalidContent { .. }));
    assert!(err.to_string().contains("exceeds the 4 byte limit"));
}

#[test]
fn test_failure_codes_skip_payload_decoding() {
    let request = DownlinkRequest::read(common::battery_path());
    let response = CoapResponse::new(ResponseCode::NotFound)
        .with_content_format(9999)
        .with_payload("garbage");

    let translation = translate(&request, &response).unwrap();
    assert_eq!(translation.response().unwrap().code(), ResultCode::NotFound);
}

#[test]
fn test_nested_tlv_containers_are_invalid_content() {
    let request = DownlinkRequest::read(LwM2mPath::object_instance(3, 0));
    let mut payload = Vec::new();
    for level in 0..1_000usize {
        let len = (999 - level) * 5;
        payload.extend_from_slice(&[0x18, 0x00, (len >> 16) as u8, (len >> 8) as u8, len as u8]);
    }
    let response = CoapResponse::new(ResponseCode::Content)
        .with_content_format(ContentFormat::Tlv.code())
        .with_payload(payload);

    match translate(&request, &response) {
        Err(BridgeError::InvalidContent { code, path, .. }) => {
            assert_eq!(code, ResultCode::Content);
            assert_eq!(path, "/3/0");
        }
        other => panic!("expected invalid content, got {:?}", other),
    }
}
