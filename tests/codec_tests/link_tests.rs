//! Link Format Tests
//!
//! Tests for CoRE link-format parsing.

use lwm2m_bridge::link::{parse, LinkAttribute, LinkObject};

#[test]
fn test_parse_multiple_links_in_order() {
    let links = parse(b"</3/0>;ct=11542,</3/0/9>;pmin=10;pmax=60,</5>").unwrap();

    assert_eq!(links.len(), 3);
    assert_eq!(links[0].url, "/3/0");
    assert_eq!(links[0].attribute("ct"), Some(&LinkAttribute::Integer(11542)));
    assert_eq!(links[1].url, "/3/0/9");
    assert_eq!(links[1].attribute("pmin"), Some(&LinkAttribute::Integer(10)));
    assert_eq!(links[1].attribute("pmax"), Some(&LinkAttribute::Integer(60)));
    assert_eq!(links[2].url, "/5");
    assert!(links[2].attributes.is_empty());
}

#[test]
fn test_parse_quoted_values_and_flags() {
    let links = parse(br#"</5/0>;title="FW, v2";obs;rt=oma.lwm2m"#).unwrap();

    assert_eq!(links.len(), 1);
    let link = &links[0];
    assert_eq!(link.attribute("title"), Some(&LinkAttribute::Text("FW, v2".to_string())));
    assert_eq!(link.attribute("obs"), Some(&LinkAttribute::Flag));
    assert_eq!(link.attribute("rt"), Some(&LinkAttribute::Text("oma.lwm2m".to_string())));
}

#[test]
fn test_parse_tolerates_whitespace_and_empty_items() {
    let links = parse(b" </1/0> ,\n</3/0>, ").unwrap();
    let urls: Vec<_> = links.iter().map(|l| l.url.as_str()).collect();
    assert_eq!(urls, vec!["/1/0", "/3/0"]);
}

#[test]
fn test_parse_empty_payload() {
    assert!(parse(b"").unwrap().is_empty());
}

#[test]
fn test_parse_rejects_malformed_links() {
    assert!(parse(b"/3/0;ct=0").is_err());
    assert!(parse(b"</3/0;ct=0").is_err());
    assert!(parse(b"</3/0>;=5").is_err());
    assert!(parse(&[0x3C, 0xFF, 0x3E]).is_err());
}

#[test]
fn test_display_renders_link_format() {
    let link = LinkObject::new("/3/0/9")
        .with_attribute("pmin", LinkAttribute::Integer(10))
        .with_attribute("obs", LinkAttribute::Flag);
    assert_eq!(link.to_string(), "</3/0/9>;obs;pmin=10");

    let reparsed = parse(link.to_string().as_bytes()).unwrap();
    assert_eq!(reparsed, vec![link]);
}
