use framecraft_engine::Node;
use std::fmt::Write as _;

/// Options for XML export
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Indentation string per nesting level
    pub indent: String,
    /// Emit the `<?xml ...?>` declaration
    pub declaration: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            declaration: true,
        }
    }
}

/// Export a component forest as an XML document.
///
/// Attribute and style keys are emitted in sorted order so the artifact is
/// deterministic across runs.
pub fn export_xml(nodes: &[Node], options: &ExportOptions) -> String {
    let mut xml = String::new();
    if options.declaration {
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    }
    xml.push_str("<components>\n");
    for node in nodes {
        write_component(node, options, 1, &mut xml);
    }
    xml.push_str("</components>");
    xml
}

fn write_component(node: &Node, options: &ExportOptions, depth: usize, xml: &mut String) {
    let pad = options.indent.repeat(depth);
    let _ = writeln!(xml, "{}<component type=\"{}\">", pad, escape(&node.tag));

    if !node.attributes.is_empty() {
        let _ = writeln!(xml, "{}{}<attributes>", pad, options.indent);
        let mut keys: Vec<&String> = node.attributes.keys().collect();
        keys.sort();
        for key in keys {
            let _ = writeln!(
                xml,
                "{}{}{}<{}>{}</{}>",
                pad,
                options.indent,
                options.indent,
                key,
                escape(&node.attributes[key]),
                key
            );
        }
        let _ = writeln!(xml, "{}{}</attributes>", pad, options.indent);
    }

    if !node.style.is_empty() {
        let _ = writeln!(xml, "{}{}<style>", pad, options.indent);
        let mut props: Vec<&String> = node.style.keys().collect();
        props.sort();
        for prop in props {
            let _ = writeln!(
                xml,
                "{}{}{}<{}>{}</{}>",
                pad,
                options.indent,
                options.indent,
                prop,
                escape(&node.style[prop]),
                prop
            );
        }
        let _ = writeln!(xml, "{}{}</style>", pad, options.indent);
    }

    if let Some(content) = &node.content {
        let _ = writeln!(
            xml,
            "{}{}<content><![CDATA[{}]]></content>",
            pad,
            options.indent,
            escape(content)
        );
    }

    if !node.children.is_empty() {
        let _ = writeln!(xml, "{}{}<children>", pad, options.indent);
        for child in &node.children {
            write_component(child, options, depth + 2, xml);
        }
        let _ = writeln!(xml, "{}{}</children>", pad, options.indent);
    }

    let _ = writeln!(xml, "{}</component>", pad);
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
