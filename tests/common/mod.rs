//! Common test utilities
//!
//! Page fixtures shared by the integration tests.

#![allow(dead_code)]

use oxide_tagger::cdp::{CdpClientImpl, MockCdpConnection};
use oxide_tagger::session::{CdpSession, MockDom, MockSession, NodeId};
use oxide_tagger::{Tagger, TaggerOptions};
use serde_json::json;
use std::sync::Arc;

pub const SHOP_URL: &str = "https://shop.example/";

/// Tag of the `body` element of every fixture page
pub const BODY: &str = "html:nth-of-type(1) > body:nth-of-type(1)";

/// Nodes of interest on the shop fixture page
pub struct ShopPage {
    pub dom: MockDom,
    pub search_form: NodeId,
    pub search_box: NodeId,
    pub login_form: NodeId,
    pub remember_me: NodeId,
    pub hidden_form: NodeId,
    pub partner_link: NodeId,
    pub copyright: NodeId,
}

/// A small storefront
///
/// ```text
/// body
///   nav: a[/], a[/cart], a[partner.example], a[mailto:]
///   form (search): input[text], input[submit]
///   main > table: two rows with one link each
///   form (login): input[text], input[password], input[checkbox],
///                 select, input[date], button
///   form (hidden): input[text]
///   button (disabled, hidden)
///   footer > p > "(c) Shop"
/// ```
pub fn shop_page() -> ShopPage {
    let mut dom = MockDom::new();
    dom.set_url(SHOP_URL);
    let body = dom.body();

    let nav = dom.append_element(body, "nav");
    dom.append_element_with(nav, "a", &[("href", "/")]);
    dom.append_element_with(nav, "a", &[("href", "/cart")]);
    let partner_link = dom.append_element_with(nav, "a", &[("href", "https://partner.example/deal")]);
    dom.append_element_with(nav, "a", &[("href", "mailto:shop@example.com")]);

    let search_form = dom.append_element_with(body, "form", &[("action", "/search")]);
    let search_box = dom.append_element_with(search_form, "input", &[("type", "text"), ("name", "q")]);
    dom.append_element_with(search_form, "input", &[("type", "submit")]);

    let main = dom.append_element(body, "main");
    let table = dom.append_element(main, "table");
    for item in ["/item/1", "/item/2"] {
        let row = dom.append_element(table, "tr");
        let cell = dom.append_element(row, "td");
        dom.append_element_with(cell, "a", &[("href", item)]);
    }

    let login_form = dom.append_element_with(body, "form", &[("action", "/login")]);
    dom.append_element_with(login_form, "input", &[("type", "text"), ("name", "user")]);
    dom.append_element_with(login_form, "input", &[("type", "password"), ("name", "pass")]);
    let remember_me = dom.append_element_with(login_form, "input", &[("type", "checkbox")]);
    dom.append_element(login_form, "select");
    dom.append_element_with(login_form, "input", &[("type", "date")]);
    dom.append_element(login_form, "button");

    let hidden_form = dom.append_element(body, "form");
    dom.append_element_with(hidden_form, "input", &[("type", "text")]);
    dom.set_hidden(hidden_form, true);

    let dead_button = dom.append_element_with(body, "button", &[("disabled", "disabled")]);
    dom.set_hidden(dead_button, true);

    let footer = dom.append_element(body, "footer");
    let p = dom.append_element(footer, "p");
    let copyright = dom.append_text(p, "(c) Shop");

    ShopPage {
        dom,
        search_form,
        search_box,
        login_form,
        remember_me,
        hidden_form,
        partner_link,
        copyright,
    }
}

/// Tagger over a mock session, judging links against [`SHOP_URL`]
pub fn shop_tagger(dom: MockDom, leave_host: bool) -> (Tagger, Arc<MockSession>) {
    let session = Arc::new(MockSession::new(dom));
    let options = TaggerOptions {
        current_url: Some(SHOP_URL.to_string()),
        leave_host,
    };
    (Tagger::new(session.clone(), options), session)
}

/// Tagger over a CDP session whose wire traffic is scripted
pub fn scripted_tagger() -> (Tagger, Arc<MockCdpConnection>) {
    let connection = Arc::new(MockCdpConnection::new());
    let client = Arc::new(CdpClientImpl::new(connection.clone()));
    let session = Arc::new(CdpSession::new(client));
    (Tagger::new(session, TaggerOptions::default()), connection)
}

/// Queue a node-array query result holding `object_ids`, in order
pub async fn push_node_array(connection: &MockCdpConnection, method: &str, object_ids: &[&str]) {
    connection
        .push_response(
            method,
            json!({ "result": { "type": "object", "subtype": "array", "objectId": "result-array" } }),
        )
        .await;

    let mut properties: Vec<serde_json::Value> = object_ids
        .iter()
        .enumerate()
        .map(|(index, id)| {
            json!({
                "name": index.to_string(),
                "value": { "type": "object", "subtype": "node", "objectId": id, "description": "node" }
            })
        })
        .collect();
    properties.push(json!({ "name": "length", "value": { "type": "number", "value": object_ids.len() } }));

    connection
        .push_response("Runtime.getProperties", json!({ "result": properties }))
        .await;
}

/// Queue a by-value script result
pub async fn push_value(connection: &MockCdpConnection, value: serde_json::Value) {
    let kind = match &value {
        serde_json::Value::String(_) => "string",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        _ => "object",
    };
    let mut result = json!({ "type": kind, "value": value });
    if value.is_null() {
        result["subtype"] = json!("null");
    }
    connection
        .push_response("Runtime.callFunctionOn", json!({ "result": result }))
        .await;
}
