//! Tagger tests against the in-memory session

use super::*;
use crate::session::{BrowserSession, MockDom, MockSession, NodeId};
use crate::Error;

const BODY: &str = "html:nth-of-type(1) > body:nth-of-type(1)";

fn tagger_over(dom: MockDom) -> (Tagger, Arc<MockSession>) {
    tagger_with(dom, TaggerOptions::default())
}

fn tagger_with(dom: MockDom, options: TaggerOptions) -> (Tagger, Arc<MockSession>) {
    let session = Arc::new(MockSession::new(dom));
    (Tagger::new(session.clone(), options), session)
}

#[tokio::test]
async fn test_kth_sibling_div() {
    let mut dom = MockDom::new();
    let body = dom.body();
    let divs: Vec<NodeId> = (0..4).map(|_| dom.append_element(body, "div")).collect();
    let (tagger, session) = tagger_over(dom);

    for (k, div) in divs.iter().enumerate() {
        let handle = session.handle(*div).await;
        let tag = tagger.tag_from_element(&handle).await.unwrap().unwrap();
        assert!(tag.ends_with(&format!("div:nth-of-type({})", k + 1)), "{}", tag);
        assert_eq!(tag, format!("{} > div:nth-of-type({})", BODY, k + 1));
    }
}

#[tokio::test]
async fn test_ordinal_counts_same_name_only() {
    let mut dom = MockDom::new();
    let body = dom.body();
    dom.append_element(body, "p");
    dom.append_element(body, "div");
    dom.append_element(body, "p");
    let span = dom.append_element(body, "span");
    let last = dom.append_element(body, "p");
    let (tagger, session) = tagger_over(dom);

    let tag = tagger.tag_from_element(&session.handle(last).await).await.unwrap();
    assert_eq!(tag.unwrap(), format!("{} > p:nth-of-type(3)", BODY));

    let tag = tagger.tag_from_element(&session.handle(span).await).await.unwrap();
    assert_eq!(tag.unwrap(), format!("{} > span:nth-of-type(1)", BODY));
}

#[tokio::test]
async fn test_name_case_preserved() {
    let mut dom = MockDom::new();
    let body = dom.body();
    let svg = dom.append_element(body, "svg");
    let foreign = dom.append_element(svg, "foreignObject");
    let (tagger, session) = tagger_over(dom);

    let tag = tagger.tag_from_element(&session.handle(foreign).await).await.unwrap();
    assert_eq!(
        tag.unwrap(),
        format!("{} > svg:nth-of-type(1) > foreignObject:nth-of-type(1)", BODY)
    );
}

#[tokio::test]
async fn test_text_node_has_no_tag() {
    let mut dom = MockDom::new();
    let body = dom.body();
    let p = dom.append_element(body, "p");
    let text = dom.append_text(p, "hello");
    let (tagger, session) = tagger_over(dom);

    let tag = tagger.tag_from_element(&session.handle(text).await).await.unwrap();
    assert_eq!(tag, None);
}

#[tokio::test]
async fn test_tag_is_idempotent() {
    let mut dom = MockDom::new();
    let body = dom.body();
    let section = dom.append_element(body, "section");
    dom.append_element(section, "ul");
    let list = dom.append_element(section, "ul");
    let item = dom.append_element(list, "li");
    let (tagger, session) = tagger_over(dom);

    let handle = session.handle(item).await;
    let first = tagger.tag_from_element(&handle).await.unwrap();
    let second = tagger.tag_from_element(&handle).await.unwrap();
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_checkbox_inputs() {
    let mut dom = MockDom::new();
    let body = dom.body();
    let text_inputs: Vec<NodeId> = (0..2)
        .map(|_| dom.append_element_with(body, "input", &[("type", "text")]))
        .collect();
    for _ in 0..3 {
        dom.append_element_with(body, "input", &[("type", "checkbox")]);
    }
    let (tagger, session) = tagger_over(dom);

    let checkboxes = tagger.get_inputs(None, Some("checkbox")).await.unwrap();
    assert_eq!(checkboxes.len(), 3);

    for text in text_inputs {
        let text_tag = tagger
            .tag_from_element(&session.handle(text).await)
            .await
            .unwrap()
            .unwrap();
        assert!(!checkboxes.contains(&text_tag));
    }
}

#[tokio::test]
async fn test_inputs_without_type_match_all_inputs() {
    let mut dom = MockDom::new();
    let body = dom.body();
    dom.append_element_with(body, "input", &[("type", "text")]);
    dom.append_element(body, "input");
    dom.append_element(body, "select");
    let (tagger, _) = tagger_over(dom);

    let all = tagger.get_inputs(None, None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(tagger.get_inputs(None, Some("")).await.unwrap(), all);

    let selects = tagger.get_inputs(None, Some("select")).await.unwrap();
    assert_eq!(selects, vec![format!("{} > select:nth-of-type(1)", BODY)]);
}

#[tokio::test]
async fn test_form_scoped_inputs() {
    let mut dom = MockDom::new();
    let body = dom.body();
    dom.append_element_with(body, "input", &[("type", "text")]);
    let form = dom.append_element(body, "form");
    let fieldset = dom.append_element(form, "fieldset");
    dom.append_element_with(fieldset, "input", &[("type", "text")]);
    let (tagger, session) = tagger_over(dom);

    let form = session.handle(form).await;
    let inside = tagger.get_inputs(Some(&form), Some("text")).await.unwrap();
    assert_eq!(
        inside,
        vec![format!(
            "{} > form:nth-of-type(1) > fieldset:nth-of-type(1) > input:nth-of-type(1)",
            BODY
        )]
    );

    let everywhere = tagger.get_inputs(None, Some("text")).await.unwrap();
    assert_eq!(everywhere.len(), 2);
}

#[tokio::test]
async fn test_forms_skip_hidden() {
    let mut dom = MockDom::new();
    let body = dom.body();
    let hidden = dom.append_element(body, "form");
    dom.append_element_with(hidden, "input", &[("type", "text")]);
    dom.set_hidden(hidden, true);
    let visible = dom.append_element(body, "form");
    dom.append_element_with(visible, "input", &[("type", "text")]);
    dom.append_element_with(visible, "input", &[("type", "date")]);
    dom.append_element(visible, "select");
    dom.append_element_with(visible, "input", &[("type", "checkbox")]);
    let (tagger, _) = tagger_over(dom);

    let forms = tagger.get_forms().await.unwrap();
    assert_eq!(forms.len(), 1);

    let key = format!("{} > form:nth-of-type(2)", BODY);
    let inputs = &forms[&key];
    assert_eq!(inputs.text, vec![format!("{} > input:nth-of-type(1)", key)]);
    assert_eq!(inputs.date, vec![format!("{} > input:nth-of-type(2)", key)]);
    assert_eq!(inputs.select, vec![format!("{} > select:nth-of-type(1)", key)]);
    assert_eq!(inputs.checkbox, vec![format!("{} > input:nth-of-type(3)", key)]);
}

#[tokio::test]
async fn test_disabled_attribute_on_form_is_ignored() {
    let mut dom = MockDom::new();
    let body = dom.body();
    dom.append_element_with(body, "form", &[("disabled", "")]);
    let (tagger, _) = tagger_over(dom);

    let forms = tagger.get_forms().await.unwrap();
    assert!(forms.contains_key(&format!("{} > form:nth-of-type(1)", BODY)));
}

#[tokio::test]
async fn test_forms_in_document_order() {
    let mut dom = MockDom::new();
    let body = dom.body();
    for _ in 0..12 {
        dom.append_element(body, "form");
    }
    let (tagger, _) = tagger_over(dom);

    let forms = tagger.get_forms().await.unwrap();
    let keys: Vec<String> = forms.keys().cloned().collect();
    let expected: Vec<String> = (1..=12)
        .map(|k| format!("{} > form:nth-of-type({})", BODY, k))
        .collect();
    assert_eq!(keys, expected);

    let json = serde_json::to_string(&forms).unwrap();
    let second = json.find("form:nth-of-type(2)").unwrap();
    let tenth = json.find("form:nth-of-type(10)").unwrap();
    assert!(second < tenth);
}

#[tokio::test]
async fn test_disabled_fieldset_disables_controls() {
    let mut dom = MockDom::new();
    let body = dom.body();
    let form = dom.append_element(body, "form");
    let fieldset = dom.append_element_with(form, "fieldset", &[("disabled", "")]);
    let legend = dom.append_element(fieldset, "legend");
    let in_legend = dom.append_element(legend, "button");
    let locked = dom.append_element(fieldset, "button");
    let link = dom.append_element_with(fieldset, "a", &[("href", "/help")]);
    let free = dom.append_element(form, "button");
    let (tagger, session) = tagger_over(dom);

    assert!(!session.is_enabled(&session.handle(locked).await).await.unwrap());
    assert!(session.is_enabled(&session.handle(in_legend).await).await.unwrap());
    assert!(session.is_enabled(&session.handle(link).await).await.unwrap());
    assert!(session.is_enabled(&session.handle(free).await).await.unwrap());

    let fieldset_tag = format!("{} > form:nth-of-type(1) > fieldset:nth-of-type(1)", BODY);
    let buttons = tagger.get_buttons().await.unwrap();
    assert_eq!(
        buttons,
        vec![
            format!("{} > legend:nth-of-type(1) > button:nth-of-type(1)", fieldset_tag),
            format!("{} > a:nth-of-type(1)", fieldset_tag),
            format!("{} > form:nth-of-type(1) > button:nth-of-type(1)", BODY),
        ]
    );
}

#[tokio::test]
async fn test_buttons_in_document_order() {
    let mut dom = MockDom::new();
    let body = dom.body();
    let table = dom.append_element(body, "table");
    dom.append_element_with(table, "a", &[("href", "/row")]);
    let form = dom.append_element(body, "form");
    dom.append_element_with(form, "input", &[("type", "submit")]);
    dom.append_element(form, "a");
    let dead = dom.append_element_with(body, "button", &[("disabled", "")]);
    dom.set_hidden(dead, true);
    dom.append_element(body, "button");
    // outside forms and tables
    dom.append_element_with(body, "a", &[("href", "/plain")]);
    let (tagger, _) = tagger_over(dom);

    let buttons = tagger.get_buttons().await.unwrap();
    assert_eq!(
        buttons,
        vec![
            format!("{} > table:nth-of-type(1) > a:nth-of-type(1)", BODY),
            format!("{} > form:nth-of-type(1) > input:nth-of-type(1)", BODY),
            format!("{} > form:nth-of-type(1) > a:nth-of-type(1)", BODY),
            format!("{} > button:nth-of-type(2)", BODY),
        ]
    );
}

#[tokio::test]
async fn test_clickable_hidden_but_enabled_is_kept() {
    let mut dom = MockDom::new();
    let body = dom.body();
    let animated = dom.append_element(body, "button");
    dom.set_hidden(animated, true);
    let dead = dom.append_element_with(body, "button", &[("disabled", "")]);
    dom.set_hidden(dead, true);
    dom.append_element_with(body, "input", &[("type", "button")]);
    dom.append_element_with(body, "input", &[("type", "text")]);
    let (tagger, session) = tagger_over(dom);

    assert!(tagger.clickable_sanity_check(&session.handle(animated).await).await.unwrap());
    assert!(!tagger.clickable_sanity_check(&session.handle(dead).await).await.unwrap());

    let clickable = tagger.get_clickable().await.unwrap();
    assert_eq!(
        clickable,
        vec![
            format!("{} > button:nth-of-type(1)", BODY),
            format!("{} > input:nth-of-type(1)", BODY),
        ]
    );
}

#[tokio::test]
async fn test_base_check_link_targets() {
    let mut dom = MockDom::new();
    let body = dom.body();
    let local = dom.append_element_with(body, "a", &[("href", "/docs")]);
    let remote = dom.append_element_with(body, "a", &[("href", "https://other.example/x")]);
    let mail = dom.append_element_with(body, "a", &[("href", "mailto:me@example.com")]);
    let phone = dom.append_element_with(body, "a", &[("href", "TEL:+100")]);
    let options = TaggerOptions {
        current_url: Some("https://site.example/index.html".to_string()),
        leave_host: false,
    };
    let (mut tagger, session) = tagger_with(dom, options);

    let local = session.handle(local).await;
    let remote = session.handle(remote).await;
    assert!(tagger.base_clickable_check(&local).await.unwrap());
    assert!(!tagger.base_clickable_check(&remote).await.unwrap());
    assert!(!tagger.base_clickable_check(&session.handle(mail).await).await.unwrap());
    assert!(!tagger.base_clickable_check(&session.handle(phone).await).await.unwrap());
    assert_eq!(tagger.get_clickable().await.unwrap().len(), 1);

    tagger.set_current_url("https://other.example/");
    assert!(tagger.base_clickable_check(&remote).await.unwrap());
    // relative links follow the current host
    assert!(tagger.base_clickable_check(&local).await.unwrap());
    assert_eq!(tagger.options().current_url.as_deref(), Some("https://other.example/"));
}

#[tokio::test]
async fn test_base_check_leave_host() {
    let mut dom = MockDom::new();
    let body = dom.body();
    let remote = dom.append_element_with(body, "a", &[("href", "https://other.example/x")]);
    let options = TaggerOptions {
        current_url: Some("https://site.example/".to_string()),
        leave_host: true,
    };
    let (tagger, session) = tagger_with(dom, options);

    assert!(tagger.base_clickable_check(&session.handle(remote).await).await.unwrap());
}

#[tokio::test]
async fn test_element_by_tag_round_trip() {
    let mut dom = MockDom::new();
    let body = dom.body();
    dom.append_element(body, "div");
    let target = dom.append_element(body, "div");
    let (tagger, session) = tagger_over(dom);

    let handle = session.handle(target).await;
    let tag = tagger.tag_from_element(&handle).await.unwrap().unwrap();
    assert_eq!(tagger.element_by_tag(&tag).await.unwrap(), Some(handle));

    let missing = format!("{} > div:nth-of-type(5)", BODY);
    assert_eq!(tagger.element_by_tag(&missing).await.unwrap(), None);
}

#[tokio::test]
async fn test_tag_after_mutation_may_move() {
    let mut dom = MockDom::new();
    let body = dom.body();
    dom.append_element(body, "div");
    let second = dom.append_element(body, "div");
    let (tagger, session) = tagger_over(dom);

    let handle = session.handle(second).await;
    let tag = tagger.tag_from_element(&handle).await.unwrap().unwrap();

    session.mutate(|dom| dom.insert_element(body, 0, "div", &[])).await;

    let resolved = tagger.element_by_tag(&tag).await.unwrap();
    assert_ne!(resolved, Some(handle));
}

#[tokio::test]
async fn test_stale_handle_propagates() {
    let mut dom = MockDom::new();
    let body = dom.body();
    let link = dom.append_element(body, "a");
    let (tagger, session) = tagger_over(dom);

    let handle = session.handle(link).await;
    session.mutate(|dom| dom.remove(link)).await;

    let err = tagger.tag_from_element(&handle).await.unwrap_err();
    assert!(matches!(err, Error::StaleElement(_)));
    assert!(tagger.clickable_sanity_check(&handle).await.is_err());
}

#[tokio::test]
async fn test_snapshot() {
    let mut dom = MockDom::new();
    dom.set_url("https://site.example/");
    let body = dom.body();
    let form = dom.append_element(body, "form");
    dom.append_element_with(form, "input", &[("type", "text")]);
    dom.append_element_with(form, "input", &[("type", "submit")]);
    let (tagger, _) = tagger_over(dom);

    let snapshot = tagger.snapshot().await.unwrap();
    assert_eq!(snapshot.url, "https://site.example/");
    assert_eq!(snapshot.inputs.len(), 2);
    assert_eq!(snapshot.clickable.len(), 1);
    assert_eq!(snapshot.clickable, snapshot.buttons);
    assert_eq!(snapshot.forms.len(), 1);
    assert_eq!(snapshot.tag_count(), 3);
}
