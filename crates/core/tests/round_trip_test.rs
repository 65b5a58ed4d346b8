//! Integration tests for exact rendering of parsed declaration files

use autodeps_core::lang::parse_source;

const RICH: &str = r#"# Top of file heading
# spanning two lines

subinclude("//build_defs:ts", "//build_defs:docker")

package(default_visibility = ["PUBLIC"])

SRCS = glob(
    ["**/*.ts"],
    exclude = ["**/*.test.ts"],  # tests live elsewhere
)

ts_library(
    name = "app",  # the main library
    srcs = SRCS,
    deps = [
        # internal
        ":types",

        "//common/util",
        "//third_party:lodash",  # pinned
    ],
    visibility = ["//apps/..."],
)

ts_test(name="app_test", srcs=["app.test.ts"], deps=[":app"])

filegroup(
    name = "assets",
    srcs = [],
    # nothing yet
)

config = {
    "mode": "dev",
    "ports": [8080, 0x1F90],
}
flags = ("-O2",) + EXTRA_FLAGS
enabled = not DISABLED and len(SRCS) > 0
"#;

#[test]
fn test_rich_file_round_trips() {
    let output = parse_source(RICH);
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    assert_eq!(output.root.to_source(), RICH);
}

#[test]
fn test_render_is_idempotent() {
    let once = parse_source(RICH).root.to_source();
    let twice = parse_source(&once).root.to_source();
    assert_eq!(once, twice);
}

#[test]
fn test_trailing_blank_lines_are_kept() {
    for source in ["x = 1", "x = 1\n", "x = 1\n\n\n", "# only a comment\n", ""] {
        assert_eq!(parse_source(source).root.to_source(), source, "{source:?}");
    }
}

#[test]
fn test_string_flavors_round_trip() {
    let source = "a = r\"C:\\path\"\nb = '''multi\nline'''\nc = b'bytes'\nd = \"esc\\\"aped\"\n";
    let output = parse_source(source);
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    assert_eq!(output.root.to_source(), source);
}

#[test]
fn test_recovers_after_unsupported_statement() {
    let source = "def helper():\n    return 1\n\nts_library(name = \"a\", srcs = [\"a.ts\"])\n";
    let output = parse_source(source);
    assert!(output.has_errors());
    assert_eq!(output.errors[0].line, 1);
    assert!(output.root.find_call("ts_library").is_some());
}

#[test]
fn test_hand_formatted_layouts_round_trip() {
    let sources = [
        "ts_library(name = \"a\",\n           srcs = [\"a.ts\",\n                   \"b.ts\"])\n",
        "x = [1,2]\ny = {\"a\":1}\n",
        "deps = [\n    \":a\", \":b\",\n    \":c\",\n]\n",
        "ts_library(\n  name = \"a\",\n  deps = [ \":b\" ],\n  )\n",
        "f(a = 1 ,b = 2)\n",
    ];
    for source in sources {
        let output = parse_source(source);
        assert!(output.errors.is_empty(), "{:?}", output.errors);
        assert_eq!(output.root.to_source(), source, "{source:?}");
    }
}

#[test]
fn test_comment_whitespace_round_trips() {
    let sources = [
        "# trailing space \nx = 1\n",
        "x = [\n    # note\n\n    \"a\",\n]\n",
        "x = [\n    \"a\",\n    # first\n\n    # second\n]\n",
        "x = [\n    \"a\",\n    # closing\n\n]\n",
        "x = 1\n   \n\ny = 2\n",
    ];
    for source in sources {
        let output = parse_source(source);
        assert!(output.errors.is_empty(), "{:?}", output.errors);
        assert_eq!(output.root.to_source(), source, "{source:?}");
    }
}

#[test]
fn test_crlf_line_endings_round_trip() {
    let source = "# heading\r\n\r\nts_library(\r\n    name = \"a\",\r\n    srcs = [\"a.ts\"],  # main\r\n)\r\n";
    let output = parse_source(source);
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    assert_eq!(output.root.to_source(), source);
}

#[test]
fn test_edited_statement_keeps_crlf() {
    let source = "a = 1\r\nts_library(name = \"a\")\r\n";
    let mut root = parse_source(source).root;
    let call = root.statements[1].as_call_mut().unwrap();
    call.arguments.layout = autodeps_core::lang::ListLayout::multiline();
    assert_eq!(
        root.to_source(),
        "a = 1\r\nts_library(\r\n    name = \"a\",\r\n)\r\n"
    );
}
