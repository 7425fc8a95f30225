//! CoAP request builder
//!
//! Maps each downlink request onto method, options and payload.
//!
//! | Request          | Method      | Extras                         |
//! |------------------|-------------|--------------------------------|
//! | Read             | GET         |                                |
//! | Discover         | GET         | Accept: link-format            |
//! | Write (replace)  | PUT         | Content-Format + payload       |
//! | Write (update)   | POST        | Content-Format + payload       |
//! | Write-Attributes | PUT         | Uri-Query                      |
//! | Execute          | POST        | text arguments                 |
//! | Create           | POST        | Content-Format + payload       |
//! | Delete           | DELETE      |                                |
//! | Observe          | GET         | Observe: 0                     |

use bytes::Bytes;

use crate::client::Client;
use crate::coap::{CoapRequest, ContentFormat, Method};

use super::{DownlinkRequest, WriteMode};

/// Build the CoAP request carrying `request` to `client`
pub fn build_request(request: &DownlinkRequest, client: &Client) -> CoapRequest {
    let method = match request {
        DownlinkRequest::Read { .. } | DownlinkRequest::Discover { .. } | DownlinkRequest::Observe { .. } => {
            Method::Get
        }
        DownlinkRequest::Write { mode: WriteMode::Replace, .. } | DownlinkRequest::WriteAttributes { .. } => {
            Method::Put
        }
        DownlinkRequest::Write { mode: WriteMode::Update, .. }
        | DownlinkRequest::Execute { .. }
        | DownlinkRequest::Create { .. } => Method::Post,
        DownlinkRequest::Delete { .. } => Method::Delete,
    };

    let mut coap = CoapRequest::new(method);
    coap.destination = client.address;
    coap.uri_path = request.path().segments().iter().map(u16::to_string).collect();

    match request {
        DownlinkRequest::Discover { .. } => {
            coap.accept = Some(ContentFormat::LINK_FORMAT_CODE);
        }
        DownlinkRequest::Observe { .. } => {
            coap.observe = Some(0);
        }
        DownlinkRequest::Write { payload, .. } | DownlinkRequest::Create { payload, .. } => {
            coap.content_format = Some(payload.format.code());
            coap.payload = payload.bytes.clone();
        }
        DownlinkRequest::WriteAttributes { attributes, .. } => {
            coap.uri_query = attributes.to_query();
        }
        DownlinkRequest::Execute { arguments: Some(arguments), .. } => {
            coap.content_format = Some(ContentFormat::Text.code());
            coap.payload = Bytes::from(arguments.clone());
        }
        DownlinkRequest::Execute { arguments: None, .. }
        | DownlinkRequest::Read { .. }
        | DownlinkRequest::Delete { .. } => {}
    }

    coap
}
