use crate::{export_xml, ExportOptions};
use framecraft_engine::{Node, FRAME_ID_ATTR, FRAME_TAG};

#[test]
fn test_export_simple_component() {
    let nodes = vec![Node::text("Click me").with_style("padding", "10px")];

    let xml = export_xml(&nodes, &ExportOptions::default());
    println!("Generated XML:\n{}", xml);

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<component type=\"text\">"));
    assert!(xml.contains("<content><![CDATA[Click me]]></content>"));
    assert!(xml.contains("<padding>10px</padding>"));
    assert!(xml.ends_with("</components>"));
}

#[test]
fn test_export_nested_frame() {
    let nodes = vec![Node::new(FRAME_TAG)
        .with_attr(FRAME_ID_ATTR, "frame-1")
        .with_style("min-height", "200px")
        .with_child(Node::text("inside"))];

    let xml = export_xml(&nodes, &ExportOptions::default());

    assert!(xml.contains("<component type=\"frame\">"));
    assert!(xml.contains("<data-frame-id>frame-1</data-frame-id>"));
    assert!(xml.contains("<children>"));
    assert!(xml.contains("<component type=\"text\">"));
    // the child sits inside the frame's children block
    let frame_at = xml.find("type=\"frame\"").unwrap();
    let children_at = xml.find("<children>").unwrap();
    let text_at = xml.find("type=\"text\"").unwrap();
    assert!(frame_at < children_at && children_at < text_at);
}

#[test]
fn test_content_is_escaped_inside_cdata() {
    let nodes = vec![Node::text("a < b & \"c\"")];
    let xml = export_xml(&nodes, &ExportOptions::default());

    assert!(xml.contains("<![CDATA[a &lt; b &amp; &quot;c&quot;]]>"));
}

#[test]
fn test_declaration_can_be_suppressed() {
    let options = ExportOptions {
        declaration: false,
        ..Default::default()
    };
    let xml = export_xml(&[], &options);
    assert_eq!(xml, "<components>\n</components>");
}

#[test]
fn test_sorted_keys_make_output_deterministic() {
    let node = Node::new("container")
        .with_style("width", "10px")
        .with_style("background-color", "#fff")
        .with_attr("title", "t")
        .with_attr("class", "c");

    let first = export_xml(std::slice::from_ref(&node), &ExportOptions::default());
    let second = export_xml(std::slice::from_ref(&node), &ExportOptions::default());
    assert_eq!(first, second);

    let bg = first.find("<background-color>").unwrap();
    let width = first.find("<width>").unwrap();
    assert!(bg < width);
}
