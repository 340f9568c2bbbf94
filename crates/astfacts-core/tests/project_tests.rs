use std::collections::HashSet;
use std::fs;
use std::path::Path;

use astfacts_core::config::SyntaxErrorPolicy;
use astfacts_core::parser::{PhpFrontEnd, TypeScriptFrontEnd};
use astfacts_core::{parse_project, Config, Fact, FactError, FrontEnd, JsonLinesEmitter};
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, content) in files {
        let path = dir.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn run(front_end: &dyn FrontEnd, base: &Path, files: &[&str], config: &Config) -> Vec<Fact> {
    let files: Vec<String> = files.iter().map(|f| f.to_string()).collect();
    let mut facts: Vec<Fact> = Vec::new();
    parse_project(front_end, "5", base, &files, config, &mut facts).unwrap();
    facts
}

fn framing<'a>(facts: &'a [Fact], kind: &str) -> Vec<&'a Fact> {
    facts.iter().filter(|f| f.kind.kind == kind).collect()
}

#[test]
fn test_single_declaration() {
    let dir = project(&[("a.ts", "const x = 1;")]);
    let facts = run(&TypeScriptFrontEnd::new(), dir.path(), &[], &Config::default());

    let summary: Vec<(&str, &str, &str)> = facts
        .iter()
        .map(|f| (f.key.as_str(), f.parent_key.as_str(), f.kind.kind.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("5", "", "project"),
            ("5_1", "5", "dir"),
            ("5_2", "5_1", "file"),
            ("5_3", "5_2", "variable"),
            ("5_4", "5_3", "decls"),
            ("5_5", "5_4", "var"),
            ("5_6", "5_5", "ident"),
            ("5_7", "5_5", "numeric"),
        ]
    );

    assert_eq!(facts[1].prop("filename"), Some("."));
    assert_eq!(facts[2].prop("filename"), Some("./a.ts"));
    assert_eq!(facts[3].prop("kind"), Some("const"));
    assert_eq!(facts[3].common_kind, "decl");
    assert_eq!(facts[5].prop("definite"), Some("false"));
    assert_eq!(facts[5].properties["definite"].type_name, "boolean");
    assert_eq!(facts[6].prop("name"), Some("x"));
    assert_eq!(facts[7].prop("value"), Some("1"));
    assert_eq!(facts[7].properties["value"].type_name, "number");
    assert_eq!(facts[7].older_siblings, vec!["5_6".to_string()]);

    // Members of a container are orderable, a lone statement is not.
    assert!(facts[4].kind.orderable);
    assert!(facts[5].kind.orderable);
    assert!(!facts[3].kind.orderable);
    assert!(facts.iter().all(|f| f.kind.namespace == "ts"));
}

#[test]
fn test_file_selector() {
    let source = "<?php\necho 1;\n";
    let dir = project(&[("a.php", source), ("b.php", source)]);
    let facts = run(&PhpFrontEnd::new(), dir.path(), &["b.php"], &Config::default());

    let files: Vec<_> = framing(&facts, "file")
        .iter()
        .map(|f| f.prop("filename").unwrap())
        .collect();
    assert_eq!(files, vec!["./b.php"]);
    assert_eq!(framing(&facts, "dir").len(), 1);

    let files_again = run(&PhpFrontEnd::new(), dir.path(), &["./b.php"], &Config::default());
    assert_eq!(facts, files_again);
}

#[test]
fn test_invalid_trunk_key_emits_nothing() {
    let dir = project(&[("a.ts", "let y = 2;")]);
    let mut facts: Vec<Fact> = Vec::new();
    let result = parse_project(
        &TypeScriptFrontEnd::new(),
        "abc",
        dir.path(),
        &[],
        &Config::default(),
        &mut facts,
    );

    assert!(matches!(result, Err(FactError::InvalidTrunkFormat(_))));
    assert!(facts.is_empty());
}

#[test]
fn test_missing_base_dir_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut facts: Vec<Fact> = Vec::new();
    let result = parse_project(
        &TypeScriptFrontEnd::new(),
        "1",
        &dir.path().join("nope"),
        &[],
        &Config::default(),
        &mut facts,
    );
    assert!(matches!(result, Err(FactError::Io { .. })));
    assert!(facts.is_empty());
}

#[test]
fn test_syntax_error_skips_only_that_file() {
    let dir = project(&[("bad.ts", "const = ;\nfunction {"), ("good.ts", "let y = 2;")]);
    let mut facts: Vec<Fact> = Vec::new();
    let stats = parse_project(
        &TypeScriptFrontEnd::new(),
        "5",
        dir.path(),
        &[],
        &Config::default(),
        &mut facts,
    )
    .unwrap();

    assert_eq!(stats.files_parsed, 1);
    assert_eq!(stats.files_skipped, 1);
    assert!(facts.iter().all(|f| f.prop("filename") != Some("./bad.ts")));
    assert!(facts.iter().any(|f| f.prop("filename") == Some("./good.ts") && f.kind.kind == "variable"));
}

#[test]
fn test_tolerate_policy_walks_recovered_tree() {
    let dir = project(&[("bad.ts", "let a = 1;\nconst = ;")]);
    let mut config = Config::default();
    config.parse.syntax_errors = SyntaxErrorPolicy::Tolerate;

    let facts = run(&TypeScriptFrontEnd::new(), dir.path(), &[], &config);
    assert_eq!(framing(&facts, "file").len(), 1);
    assert!(facts.iter().any(|f| f.kind.kind == "ident" && f.prop("name") == Some("a")));
}

#[test]
fn test_keys_unique_and_parents_precede_children() {
    let dir = project(&[
        ("src/a.ts", "function f(a, b) { return g(a) + b; }"),
        ("src/util/b.ts", "export const k = [1, 2, 3];"),
        ("c.js", "if (x) { y(); } else { z(); }"),
    ]);
    let facts = run(&TypeScriptFrontEnd::new(), dir.path(), &[], &Config::default());

    let mut seen = HashSet::new();
    for fact in &facts {
        if fact.kind.kind != "project" {
            assert!(seen.contains(&fact.parent_key), "{} emitted before its parent", fact.key);
        }
        for older in &fact.older_siblings {
            assert!(seen.contains(older));
        }
        assert!(seen.insert(fact.key.clone()), "duplicate key {}", fact.key);
    }
}

#[test]
fn test_directory_order_and_pruning() {
    let dir = project(&[
        ("docs/readme.md", "# nothing to parse"),
        ("lib/bad.ts", "const = ;"),
        ("src/a.ts", "let a = 1;"),
        ("z.ts", "let z = 1;"),
    ]);
    let facts = run(&TypeScriptFrontEnd::new(), dir.path(), &[], &Config::default());

    let frames: Vec<(&str, &str, &str)> = facts
        .iter()
        .filter(|f| matches!(f.kind.kind.as_str(), "project" | "dir" | "file"))
        .map(|f| (f.key.as_str(), f.parent_key.as_str(), f.prop("filename").unwrap()))
        .collect();

    // docs and lib are entered (keys 5_2, 5_3) but never emitted.
    assert_eq!(frames[0], ("5", "", "."));
    assert_eq!(frames[1], ("5_1", "5", "."));
    assert_eq!(frames[2], ("5_4", "5_1", "./src"));
    assert_eq!(frames[3], ("5_5", "5_4", "./src/a.ts"));
    assert_eq!(frames[4].2, "./z.ts");
    assert_eq!(frames[4].1, "5_1");
    assert_eq!(frames.len(), 5);

    let z_file = facts.iter().find(|f| f.prop("filename") == Some("./z.ts") && f.kind.kind == "file");
    assert_eq!(z_file.unwrap().older_siblings, vec!["5_4".to_string()]);
}

#[test]
fn test_framing_spans_are_zero() {
    let dir = project(&[("sub/a.ts", "let a = 1;")]);
    let facts = run(&TypeScriptFrontEnd::new(), dir.path(), &[], &Config::default());

    let spans = [
        "start_line",
        "start_column",
        "start_offset",
        "end_line",
        "end_column",
        "end_offset",
    ];
    for fact in facts
        .iter()
        .filter(|f| matches!(f.kind.kind.as_str(), "project" | "dir" | "file"))
    {
        for span in spans {
            assert_eq!(fact.prop(span), Some("0"), "{} {}", fact.kind.kind, span);
        }
    }
    assert!(framing(&facts, "file")[0].kind.orderable);
    assert!(!framing(&facts, "dir")[0].kind.orderable);
    assert!(!framing(&facts, "project")[0].kind.orderable);

    let ident = facts.iter().find(|f| f.kind.kind == "ident").unwrap();
    assert_eq!(ident.prop("start_column"), Some("4"));
    assert_eq!(ident.prop("end_offset"), Some("5"));
}

#[test]
fn test_output_is_deterministic() {
    let dir = project(&[
        ("a.ts", "class A extends B { m() { return this.x?.y ?? 1; } }"),
        ("b/c.tsx", "const el = <div id=\"x\">{items.map(i => <span>{i}</span>)}</div>;"),
    ]);
    let config = Config::default();
    let first = run(&TypeScriptFrontEnd::new(), dir.path(), &[], &config);
    let second = run(&TypeScriptFrontEnd::new(), dir.path(), &[], &config);
    assert_eq!(first, second);
}

#[test]
fn test_trunk_with_suffix() {
    let dir = project(&[("a.ts", "1;")]);
    let mut facts: Vec<Fact> = Vec::new();
    parse_project(
        &TypeScriptFrontEnd::new(),
        "7_100",
        dir.path(),
        &[],
        &Config::default(),
        &mut facts,
    )
    .unwrap();

    assert_eq!(facts[0].key, "7_100");
    assert_eq!(facts[1].key, "7_101");
    assert_eq!(facts[1].parent_key, "7_100");
}

#[test]
fn test_max_file_size() {
    let dir = project(&[("big.ts", "let aaaaaaaaaaaaaaaaaaaa = 1;"), ("small.ts", "1;")]);
    let mut config = Config::default();
    config.walk.max_file_size = Some(8);

    let facts = run(&TypeScriptFrontEnd::new(), dir.path(), &[], &config);
    let files: Vec<_> = framing(&facts, "file")
        .iter()
        .map(|f| f.prop("filename").unwrap())
        .collect();
    assert_eq!(files, vec!["./small.ts"]);
}

#[test]
fn test_non_utf8_file_is_skipped() {
    let dir = project(&[("ok.ts", "1;")]);
    fs::write(dir.path().join("latin1.ts"), [0x6c, 0x65, 0x74, 0x20, 0xe9, 0x3b]).unwrap();

    let facts = run(&TypeScriptFrontEnd::new(), dir.path(), &[], &Config::default());
    assert_eq!(framing(&facts, "file").len(), 1);
}

#[test]
fn test_max_depth_keeps_partial_file() {
    let dir = project(&[("deep.ts", "f(g(h(i(j(k(1))))));"), ("flat.ts", "let a = 1;")]);
    let mut config = Config::default();
    config.parse.max_depth = 4;

    let mut facts: Vec<Fact> = Vec::new();
    let stats = parse_project(
        &TypeScriptFrontEnd::new(),
        "5",
        dir.path(),
        &[],
        &config,
        &mut facts,
    )
    .unwrap();

    assert_eq!(stats.files_incomplete, 1);
    assert_eq!(stats.files_parsed, 2);
    assert_eq!(stats.facts, facts.len());
    assert!(facts.iter().any(|f| f.prop("filename") == Some("./deep.ts") && f.kind.kind == "call_expr"));
    assert!(facts.iter().any(|f| f.prop("filename") == Some("./flat.ts") && f.kind.kind == "numeric"));
}

#[test]
fn test_extension_override() {
    let dir = project(&[("a.mjs", "let a = 1;"), ("b.ts", "let b = 1;")]);
    let mut config = Config::default();
    config.languages.insert("ts".to_string(), vec!["mjs".to_string()]);

    let facts = run(&TypeScriptFrontEnd::new(), dir.path(), &[], &config);
    let files: Vec<_> = framing(&facts, "file")
        .iter()
        .map(|f| f.prop("filename").unwrap())
        .collect();
    assert_eq!(files, vec!["./a.mjs"]);
}

#[test]
fn test_excluded_dirs_are_not_walked() {
    let dir = project(&[("node_modules/m/index.js", "1;"), ("index.js", "2;")]);
    let mut config = Config::default();
    config.walk.exclude_dirs = vec!["node_modules".to_string()];

    let facts = run(&TypeScriptFrontEnd::new(), dir.path(), &[], &config);
    assert_eq!(framing(&facts, "dir").len(), 1);
    assert_eq!(framing(&facts, "file").len(), 1);
}

#[test]
fn test_json_lines_output() {
    let dir = project(&[("a.ts", "x;")]);
    let mut emitter = JsonLinesEmitter::new(Vec::<u8>::new());
    parse_project(
        &TypeScriptFrontEnd::new(),
        "3",
        dir.path(),
        &[],
        &Config::default(),
        &mut emitter,
    )
    .unwrap();

    let written = emitter.emitted();
    let output = String::from_utf8(emitter.into_inner()).unwrap();
    assert!(output.ends_with('\n'));

    let lines: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), written);
    assert_eq!(lines[0]["key"], "3");
    assert_eq!(lines[0]["parentKey"], "");
    assert_eq!(lines[0]["commonKind"], "project");
    assert_eq!(lines[2]["kind"]["kind"], "file");
    assert_eq!(lines[2]["properties"]["filename"]["type"], "string");
}
