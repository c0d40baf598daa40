//! Output artifacts: raw XML plus an indented, human-readable summary.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::node::MetadataNode;
use crate::Result;

/// Fixed header at the top of every summary file.
const SUMMARY_HEADER: &str = "BTF Metadata Summary\n===================\n\n";

/// The two sibling files written for one successfully processed container.
#[derive(Debug, Clone)]
pub struct OutputPair {
    /// Raw XML, written verbatim.
    pub xml_path: PathBuf,
    /// Indented summary of the converted structure.
    pub txt_path: PathBuf,
}

/// Write `<base>.xml` and `<base>.txt`.
///
/// Write failures propagate; the caller treats them as fatal for the file
/// being processed.
pub fn emit(xml: &str, structure: &MetadataNode, base: &Path) -> Result<OutputPair> {
    let xml_path = path_with_suffix(base, ".xml");
    fs::write(&xml_path, xml)?;

    let mut summary = String::from(SUMMARY_HEADER);
    render_into(&mut summary, structure, 0);

    let txt_path = path_with_suffix(base, ".txt");
    fs::write(&txt_path, summary)?;

    Ok(OutputPair { xml_path, txt_path })
}

/// Render the structure dump without the summary header.
pub fn render(structure: &MetadataNode) -> String {
    let mut out = String::new();
    render_into(&mut out, structure, 0);
    out
}

/// Append the suffix to the full file name, not the final extension, so
/// stems containing dots keep them.
fn path_with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn render_into(out: &mut String, node: &MetadataNode, indent: usize) {
    match node {
        MetadataNode::Text(text) => {
            push_line(out, indent, text);
        }
        MetadataNode::Map(map) => {
            for (key, value) in map.iter() {
                match value {
                    MetadataNode::Text(text) => {
                        push_line(out, indent, &format!("{key}: {text}"));
                    }
                    MetadataNode::Map(_) => {
                        push_line(out, indent, &format!("{key}:"));
                        render_into(out, value, indent + 1);
                    }
                    MetadataNode::List(items) => {
                        push_line(out, indent, &format!("{key}: [list with {} items]", items.len()));
                        render_list(out, items, indent + 1);
                    }
                }
            }
        }
        MetadataNode::List(items) => {
            render_list(out, items, indent);
        }
    }
}

/// One `Item i:` block per entry, 1-indexed, contents indented one level
/// deeper. Non-map items render as bare value lines.
fn render_list(out: &mut String, items: &[MetadataNode], indent: usize) {
    for (i, item) in items.iter().enumerate() {
        push_line(out, indent, &format!("Item {}:", i + 1));
        render_into(out, item, indent + 1);
    }
}

fn push_line(out: &mut String, indent: usize, line: &str) {
    for _ in 0..indent {
        out.push_str("  ");
    }
    out.push_str(line);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::to_structure;

    #[test]
    fn test_render_scalars_and_maps() {
        let node = to_structure(r#"<cfg version="2"><net><host>example</host></net></cfg>"#);
        let expected = "@version: 2\nnet:\n  host: example\n";
        assert_eq!(render(&node), expected);
    }

    #[test]
    fn test_render_list_items() {
        let node = to_structure("<a><b>1</b><b>2</b></a>");
        let expected = "b: [list with 2 items]\n  Item 1:\n    1\n  Item 2:\n    2\n";
        assert_eq!(render(&node), expected);
    }

    #[test]
    fn test_render_list_of_maps() {
        let node = to_structure(r#"<a><b x="1"/><b x="2"/></a>"#);
        let expected =
            "b: [list with 2 items]\n  Item 1:\n    @x: 1\n  Item 2:\n    @x: 2\n";
        assert_eq!(render(&node), expected);
    }

    #[test]
    fn test_render_top_level_scalar() {
        let node = to_structure("<a>only text</a>");
        assert_eq!(render(&node), "only text\n");
    }

    #[test]
    fn test_render_no_escaping() {
        let node = to_structure("<a><k>a: b [c]</k></a>");
        assert_eq!(render(&node), "k: a: b [c]\n");
    }

    #[test]
    fn test_summary_header_shape() {
        assert!(SUMMARY_HEADER.starts_with("BTF Metadata Summary\n"));
        assert!(SUMMARY_HEADER.ends_with("\n\n"));
        assert_eq!(SUMMARY_HEADER.matches('=').count(), 19);
    }

    #[test]
    fn test_path_with_suffix_keeps_dotted_stems() {
        let base = Path::new("/tmp/capture.v2");
        assert_eq!(path_with_suffix(base, ".xml"), Path::new("/tmp/capture.v2.xml"));
    }
}
