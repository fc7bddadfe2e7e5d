// Integration tests for test identifier translation

use junit_insight::{to_report_key, ReportKey};

#[test]
fn test_one_separator_yields_module_group() {
    let cases = [
        ("tests/test_foo.py::test_bar", "tests.test_foo", "test_bar"),
        ("test_top.py::test_x", "test_top", "test_x"),
        ("a/b/c/test_deep.py::test_y[1-2]", "a.b.c.test_deep", "test_y[1-2]"),
        ("tests/integration_test.rs::handles_empty", "tests.integration_test", "handles_empty"),
    ];
    for (id, group, name) in cases {
        assert_eq!(to_report_key(id), ReportKey::new(group, name), "identifier {}", id);
    }
}

#[test]
fn test_two_separators_append_group() {
    let cases = [
        ("tests/test_foo.py::TestClass::test_bar", "tests.test_foo.TestClass", "test_bar"),
        ("t.py::Suite::test_p[a-b]", "t.Suite", "test_p[a-b]"),
    ];
    for (id, group, name) in cases {
        assert_eq!(to_report_key(id), ReportKey::new(group, name), "identifier {}", id);
    }
}

#[test]
fn test_other_segment_counts_fall_back_unchanged() {
    for id in ["", "plain", "a.py::B::C::test_d", "a.py::B::C::D::e"] {
        assert_eq!(to_report_key(id), ReportKey::new("", id), "identifier {:?}", id);
    }
}

#[test]
fn test_translation_is_deterministic() {
    let id = "tests/test_foo.py::TestClass::test_bar[x]";
    assert_eq!(to_report_key(id), to_report_key(id));
}
