//! Property-based tests for the dump parser and serializer
//!
//! These tests use proptest to verify:
//! 1. Sanitizing is stable: quoted text comes back verbatim, plain words are untouched
//! 2. A record may never be nested more than one level below the open element
//! 3. The serializer picks self-closing, inline-text or block form from the node shape

use proptest::prelude::*;
use xmltree2xml::{Value, XmlTree, parse, sanitize};

fn tag_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,10}"
}

proptest! {
    #[test]
    fn quoted_strings_are_returned_verbatim(s in ".*") {
        let quoted = format!("\"{s}\"");
        prop_assert_eq!(sanitize(&quoted), Value::String(s.clone()));
    }

    #[test]
    fn plain_words_sanitize_to_themselves(s in "[a-zA-Z@/_:][a-zA-Z0-9@/_:]{0,15}") {
        prop_assume!(s != "true" && s != "false");
        prop_assert_eq!(sanitize(&s), Value::String(s.clone()));
    }

    #[test]
    fn sanitized_strings_stabilize(s in "[^\"]{0,20}") {
        let once = sanitize(&format!("\"{s}\""));
        let text = once.to_string();
        let twice = sanitize(&format!("\"{text}\""));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn over_indented_records_fail(levels in 2usize..6, offset in prop::sample::select(vec![0usize, 2]), kind in 0usize..4) {
        let pad = " ".repeat(levels * 4 + offset);
        let record = match kind {
            0 => format!("{pad}E: child (line=2)"),
            1 => format!("{pad}A: key=value"),
            2 => format!("{pad}T: text"),
            _ => format!("{pad}N: ns=uri (line=2)"),
        };
        let dump = format!("E: root (line=1)\n{record}");
        prop_assert!(parse(&dump, None).is_err());
    }

    #[test]
    fn element_shape_decides_rendering(tag in tag_name(), text in proptest::option::of("[a-z]{1,10}"), indent in 0usize..8) {
        let mut tree = XmlTree::new();
        let id = tree.create_element(&tag);
        match &text {
            Some(text) => {
                tree.set_text(id, text).unwrap();
                let out = tree.render(id, 1, indent);
                prop_assert_eq!(out.clone(), format!("{}<{tag}>{text}</{tag}>", " ".repeat(indent)));
                prop_assert!(!out.contains('\n'));
                prop_assert!(!out.contains("/>"));
            }
            None => {
                prop_assert_eq!(tree.render(id, 0, indent), format!("<{tag} />"));
            }
        }
    }

    #[test]
    fn text_and_children_are_exclusive(tag in tag_name(), text_first in any::<bool>()) {
        let mut tree = XmlTree::new();
        let parent = tree.create_element(&tag);
        let child = tree.create_element("child");
        if text_first {
            tree.set_text(parent, "text").unwrap();
            prop_assert!(tree.append_child(parent, child).is_err());
        } else {
            tree.append_child(parent, child).unwrap();
            prop_assert!(tree.set_text(parent, "text").is_err());
        }
    }
}
