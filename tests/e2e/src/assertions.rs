//! Test assertions
//!
//! Provides assertion utilities for E2E scenarios. Assertions return
//! [`AssertResult`] so scenarios can chain them with `?`.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;

use proto_react_core::{ReactError, Renderer};
use proto_react_dom::{Document, MutationRecord, NodeId};

/// Assertion result
pub type AssertResult = Result<(), String>;

/// Prefix of messages produced by [`check`] for unexpected renderer errors.
pub const UNEXPECTED: &str = "unexpected error: ";

/// Turn a renderer error the scenario did not expect into a failure message.
pub fn check<T>(result: proto_react_core::Result<T>) -> Result<T, String> {
    result.map_err(|e| format!("{}{}", UNEXPECTED, e))
}

/// Assert that a condition is true
pub fn assert_true(condition: bool, message: &str) -> AssertResult {
    if condition {
        Ok(())
    } else {
        Err(String::from(message))
    }
}

/// Assert equality
pub fn assert_eq<T: PartialEq + Debug>(left: T, right: T) -> AssertResult {
    if left == right {
        Ok(())
    } else {
        Err(format!("Expected {:?} to equal {:?}", left, right))
    }
}

/// Assert inequality
pub fn assert_ne<T: PartialEq + Debug>(left: T, right: T) -> AssertResult {
    if left != right {
        Ok(())
    } else {
        Err(format!("Expected {:?} to not equal {:?}", left, right))
    }
}

/// Assert string contains substring
pub fn assert_contains(haystack: &str, needle: &str) -> AssertResult {
    if haystack.contains(needle) {
        Ok(())
    } else {
        Err(format!("Expected '{}' to contain '{}'", haystack, needle))
    }
}

/// Assert the serialized subtree under `node`.
pub fn assert_html(doc: &Document, node: NodeId, expected: &str) -> AssertResult {
    let html = doc.to_html(node);
    if html == expected {
        Ok(())
    } else {
        Err(format!("Expected html {} but found {}", expected, html))
    }
}

/// Drain the mutation journal and assert it is empty.
pub fn assert_no_mutations(renderer: &mut Renderer) -> AssertResult {
    let records = renderer.document_mut().take_mutations();
    if records.is_empty() {
        Ok(())
    } else {
        Err(format!("Expected no host mutations, found {:?}", records))
    }
}

/// Count journal records matching `pred`.
pub fn count_mutations<F>(records: &[MutationRecord], pred: F) -> usize
where
    F: Fn(&MutationRecord) -> bool,
{
    records.iter().filter(|m| pred(m)).count()
}

/// Assert that an operation failed with the named error variant.
pub fn assert_error<T: Debug>(
    result: &proto_react_core::Result<T>,
    name: &str,
) -> AssertResult {
    match result {
        Err(err) if err.name() == name => Ok(()),
        Err(err) => Err(format!("Expected {} but got {}", name, err)),
        Ok(v) => Err(format!("Expected {} but got Ok({:?})", name, v)),
    }
}

/// Assert that an error carries the given text in its message.
pub fn assert_error_mentions(err: &ReactError, needle: &str) -> AssertResult {
    let message = format!("{}", err);
    assert_contains(&message, needle)
}

/// Node IDs of every element with `tag` under the document root.
pub fn nodes_by_tag(doc: &Document, tag: &str) -> Vec<NodeId> {
    doc.get_elements_by_tag_name(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_assertions() {
        assert!(assert_true(true, "ok").is_ok());
        assert_eq!(assert_true(false, "nope"), Err(String::from("nope")));
        assert!(assert_eq(1, 1).is_ok());
        assert!(assert_ne(1, 2).is_ok());
        assert!(assert_contains("hello world", "lo w").is_ok());
        assert!(assert_contains("hello", "xyz").is_err());
    }

    #[test]
    fn test_error_assertions() {
        let err: proto_react_core::Result<()> = Err(ReactError::shape("empty tag name"));
        assert!(assert_error(&err, "InvalidElementShape").is_ok());
        assert!(assert_error(&err, "ContainerNotFound").is_err());
        assert!(assert_error(&Ok::<u8, ReactError>(1), "ContainerNotFound").is_err());

        let msg = check(err).unwrap_err();
        assert!(msg.starts_with(UNEXPECTED));
    }

    #[test]
    fn test_html_assertion() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        assert!(assert_html(&doc, p, "<p></p>").is_ok());
        assert!(assert_html(&doc, p, "<div></div>").is_err());
    }
}
