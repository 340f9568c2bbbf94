//! TypeScript and JavaScript front end.
//!
//! Kinds are emitted under the short names of the Babel-based lexicon
//! (`func`, `call_expr`, `ident`, ...), and node attributes that Babel exposes
//! as booleans or strings (`async`, `computed`, `operator`, ...) become
//! properties.

use std::borrow::Cow;

use tree_sitter::{Language, Node};

use super::literal::{strip_quotes, unescape, Escapes};
use super::shape::{EmitInstructions, Shape};
use super::traits::FrontEnd;
use super::treesitter::{
    children_of_kind, field, fields, first_of_kind, has_token, named_children, operator, text,
};
use crate::facts::{CommonKind, KindNormalizer, PropValue, TypeNaming};

const EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

const RENAMES: &[(&str, &str)] = &[
    ("lexical_declaration", "variable"),
    ("variable_declaration", "variable"),
    ("variable_declarator", "var"),
    ("identifier", "ident"),
    ("property_identifier", "ident"),
    ("shorthand_property_identifier", "ident"),
    ("shorthand_property_identifier_pattern", "ident"),
    ("private_property_identifier", "private_name"),
    ("type_identifier", "ident"),
    ("statement_identifier", "ident"),
    ("undefined", "ident"),
    ("number", "numeric"),
    ("string", "string"),
    ("template_string", "templ_lit"),
    ("regex", "regexp"),
    ("true", "bool"),
    ("false", "bool"),
    ("call_expression", "call_expr"),
    ("new_expression", "new"),
    ("member_expression", "member_expr"),
    ("subscript_expression", "member_expr"),
    ("assignment_expression", "assign_expr"),
    ("augmented_assignment_expression", "assign_expr"),
    ("binary_expression", "binary_expr"),
    ("unary_expression", "unary_expr"),
    ("update_expression", "update_expr"),
    ("ternary_expression", "cond_expr"),
    ("parenthesized_expression", "paren_expr"),
    ("sequence_expression", "seq"),
    ("await_expression", "await_expr"),
    ("yield_expression", "yield_expr"),
    ("spread_element", "spread_elem"),
    ("arrow_function", "arrow_func_expr"),
    ("function_expression", "func_expr"),
    ("function", "func_expr"),
    ("generator_function", "func_expr"),
    ("function_declaration", "func"),
    ("generator_function_declaration", "func"),
    ("function_signature", "decl_func"),
    ("class_declaration", "class"),
    ("abstract_class_declaration", "class"),
    ("class", "class_expr"),
    ("class_body", "class_body"),
    ("method_definition", "class_meth"),
    ("method_signature", "method_sig"),
    ("abstract_method_signature", "method_sig"),
    ("field_definition", "class_prop"),
    ("public_field_definition", "class_prop"),
    ("class_static_block", "static_block"),
    ("object", "obj_expr"),
    ("pair", "obj_prop"),
    ("pair_pattern", "obj_prop"),
    ("array", "array_expr"),
    ("object_pattern", "obj_pattern"),
    ("array_pattern", "array_pattern"),
    ("assignment_pattern", "assign_pattern"),
    ("object_assignment_pattern", "assign_pattern"),
    ("rest_pattern", "rest"),
    ("statement_block", "block"),
    ("expression_statement", "expression"),
    ("if_statement", "if"),
    ("for_statement", "for"),
    ("for_in_statement", "for_in"),
    ("while_statement", "while"),
    ("do_statement", "do_while"),
    ("return_statement", "return"),
    ("throw_statement", "throw"),
    ("break_statement", "break"),
    ("continue_statement", "continue"),
    ("labeled_statement", "label"),
    ("switch_statement", "switch"),
    ("switch_case", "case"),
    ("switch_default", "case"),
    ("try_statement", "try"),
    ("catch_clause", "catch"),
    ("empty_statement", "empty"),
    ("debugger_statement", "debugger"),
    ("import_statement", "import"),
    ("import_specifier", "import_std"),
    ("namespace_import", "import_ns"),
    ("export_specifier", "export_spec"),
    ("namespace_export", "export_ns"),
    ("jsx_element", "jsx_elem"),
    ("jsx_self_closing_element", "jsx_elem"),
    ("jsx_opening_element", "jsx_open"),
    ("jsx_closing_element", "jsx_close"),
    ("jsx_attribute", "jsx_attr"),
    ("jsx_expression", "jsx_expr_cont"),
    ("jsx_namespace_name", "jsx_ns_name"),
    ("type_annotation", "type"),
    ("generic_type", "type_ref"),
    ("nested_type_identifier", "qual_name"),
    ("type_arguments", "type_args"),
    ("type_parameters", "type_param"),
    ("type_parameter", "type_param_def"),
    ("intersection_type", "isection_type"),
    ("array_type", "array"),
    ("literal_type", "lit_type"),
    ("parenthesized_type", "paren_type"),
    ("object_type", "type_lit"),
    ("lookup_type", "idx_access"),
    ("conditional_type", "cond_type"),
    ("index_type_query", "type_op"),
    ("interface_declaration", "iface"),
    ("interface_body", "iface_body"),
    ("extends_type_clause", "iface_ext"),
    ("property_signature", "prop_sig"),
    ("call_signature", "call_sig"),
    ("construct_signature", "constructor_sig"),
    ("index_signature", "idx_sig"),
    ("type_alias_declaration", "type_alias"),
    ("enum_declaration", "enum"),
    ("enum_assignment", "enum_memb"),
    ("as_expression", "as"),
    ("satisfies_expression", "satisfies"),
    ("non_null_expression", "non_null_expr"),
    ("internal_module", "mod"),
    ("module", "mod"),
    ("required_parameter", "param"),
    ("optional_parameter", "param"),
    ("meta_property", "meta"),
    ("with_statement", "with"),
    ("import_alias", "import_eq"),
    ("import_require_clause", "ext_mod_ref"),
    ("nested_identifier", "qual_name"),
    ("type_assertion", "type_assert"),
    ("type_predicate", "type_pred"),
    ("asserts", "type_pred"),
    ("asserts_annotation", "type"),
    ("type_predicate_annotation", "type"),
    ("opting_type_annotation", "type"),
    ("omitting_type_annotation", "type"),
    ("adding_type_annotation", "type"),
    ("mapped_type_clause", "type_param_def"),
    ("this_type", "this"),
    ("optional_type", "opt_type"),
    ("readonly_type", "type_op"),
    ("template_literal_type", "templ_lit_type"),
    ("constructor_type", "constructor"),
];

const COMMON_KINDS: &[(&str, CommonKind)] = &[
    ("func", CommonKind::Func),
    ("func_expr", CommonKind::Func),
    ("arrow_func_expr", CommonKind::Func),
    ("class_meth", CommonKind::Func),
    ("obj_meth", CommonKind::Func),
    ("decl_func", CommonKind::Func),
    ("call_expr", CommonKind::Call),
    ("new", CommonKind::Call),
    ("tag_templ", CommonKind::Call),
    ("var", CommonKind::Var),
    ("param", CommonKind::Arg),
    ("import", CommonKind::Import),
    ("block", CommonKind::Block),
    ("variable", CommonKind::Decl),
    ("class", CommonKind::Class),
    ("class_expr", CommonKind::Class),
    ("if", CommonKind::Stmt),
    ("for", CommonKind::Stmt),
    ("for_in", CommonKind::Stmt),
    ("for_of", CommonKind::Stmt),
    ("while", CommonKind::Stmt),
    ("do_while", CommonKind::Stmt),
    ("return", CommonKind::Stmt),
    ("throw", CommonKind::Stmt),
    ("break", CommonKind::Stmt),
    ("continue", CommonKind::Stmt),
    ("label", CommonKind::Stmt),
    ("switch", CommonKind::Stmt),
    ("try", CommonKind::Stmt),
    ("expression", CommonKind::Stmt),
    ("empty", CommonKind::Stmt),
    ("debugger", CommonKind::Stmt),
    ("with", CommonKind::Stmt),
    ("import_eq", CommonKind::Import),
];

/// TypeScript/JavaScript front end over the tree-sitter grammars.
pub struct TypeScriptFrontEnd {
    typescript: Language,
    tsx: Language,
    javascript: Language,
}

impl TypeScriptFrontEnd {
    pub fn new() -> Self {
        Self {
            typescript: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            tsx: tree_sitter_typescript::LANGUAGE_TSX.into(),
            javascript: tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

impl Default for TypeScriptFrontEnd {
    fn default() -> Self {
        Self::new()
    }
}

impl FrontEnd for TypeScriptFrontEnd {
    fn namespace(&self) -> &'static str {
        "ts"
    }

    fn language_name(&self) -> &'static str {
        "TypeScript/JavaScript"
    }

    fn aliases(&self) -> &[&'static str] {
        &["typescript", "js", "javascript"]
    }

    fn supported_extensions(&self) -> &[&'static str] {
        EXTENSIONS
    }

    fn grammar_for(&self, extension: &str) -> Language {
        match extension.to_ascii_lowercase().as_str() {
            "ts" | "mts" | "cts" => self.typescript.clone(),
            "tsx" => self.tsx.clone(),
            _ => self.javascript.clone(),
        }
    }

    fn shape<'t>(&self, node: Node<'t>, source: &str) -> Shape<'t> {
        shape_node(node, source)
    }

    fn rename(&self, native_kind: &str) -> Cow<'static, str> {
        RENAMES
            .iter()
            .find(|(from, _)| *from == native_kind)
            .map(|(_, to)| Cow::Borrowed(*to))
            .unwrap_or_else(|| Cow::Owned(native_kind.to_string()))
    }

    fn normalizer(&self) -> KindNormalizer {
        KindNormalizer::new(COMMON_KINDS)
    }

    fn type_naming(&self) -> TypeNaming {
        TypeNaming::JavaScript
    }
}

fn shape_node<'t>(n: Node<'t>, src: &str) -> Shape<'t> {
    let e = EmitInstructions::new;
    let named = || named_children(&n);

    match n.kind() {
        "program" => EmitInstructions::skip().children(named()).emit(),
        "hash_bang_line" | "accessibility_modifier" | "override_modifier" => Shape::Elide,

        // Declarations
        "lexical_declaration" | "variable_declaration" => {
            let kind = field(&n, "kind").map(|k| text(&k, src)).unwrap_or("var");
            e().prop("kind", kind)
                .prop("declare", is_ambient(&n))
                .group("decls", children_of_kind(&n, &["variable_declarator"]))
                .emit()
        }
        "variable_declarator" => e()
            .prop("definite", has_token(&n, "!"))
            .child(field(&n, "name"))
            .child(field(&n, "type"))
            .child(field(&n, "value"))
            .positional()
            .emit(),
        "function_declaration" | "generator_function_declaration" => e()
            .prop("async", has_token(&n, "async"))
            .prop("generator", is_generator(&n))
            .prop("declare", is_ambient(&n))
            .child(field(&n, "name"))
            .group("params", params(&n))
            .child(field(&n, "body"))
            .child(field(&n, "return_type"))
            .child(field(&n, "type_parameters"))
            .emit(),
        "function_signature" => e()
            .prop("async", has_token(&n, "async"))
            .child(field(&n, "name"))
            .group("params", params(&n))
            .child(field(&n, "return_type"))
            .child(field(&n, "type_parameters"))
            .emit(),
        "class_declaration" | "abstract_class_declaration" | "class" => {
            let heritage = first_of_kind(&n, "class_heritage");
            let (supers, impls) = heritage.map(|h| split_heritage(&h)).unwrap_or_default();
            e().prop("abstract", n.kind() == "abstract_class_declaration")
                .prop("declare", is_ambient(&n))
                .child(field(&n, "name"))
                .group("super", supers)
                .child(field(&n, "body"))
                .group("impl", impls)
                .child(field(&n, "type_parameters"))
                .group("decors", fields(&n, "decorator"))
                .emit()
        }
        "class_body" | "interface_body" | "object_type" | "enum_body" => {
            e().children(named()).emit()
        }
        "method_definition" | "method_signature" | "abstract_method_signature" => {
            let name = field(&n, "name");
            let in_object = n.parent().is_some_and(|p| p.kind() == "object");
            let instructions = if in_object && n.kind() == "method_definition" {
                e().kind("obj_meth")
            } else {
                e()
            };
            instructions
                .prop("kind", method_kind(&n, name, src))
                .prop("static", has_token(&n, "static"))
                .prop("async", has_token(&n, "async"))
                .prop("generator", has_token(&n, "*"))
                .prop("computed", is_computed(name))
                .prop("accessibility", accessibility(&n, src))
                .child(name)
                .group_kept("params", params(&n))
                .child(field(&n, "body"))
                .child(field(&n, "return_type"))
                .emit()
        }
        "field_definition" | "public_field_definition" => {
            let name = field(&n, "property").or(field(&n, "name"));
            e().prop("static", has_token(&n, "static"))
                .prop("computed", is_computed(name))
                .prop("optional", has_token(&n, "?"))
                .prop("readonly", has_token(&n, "readonly"))
                .prop("declare", has_token(&n, "declare"))
                .prop("accessibility", accessibility(&n, src))
                .child(name)
                .child(field(&n, "type"))
                .child(field(&n, "value"))
                .group("decors", fields(&n, "decorator"))
                .emit()
        }
        "class_static_block" => e().child(field(&n, "body")).emit(),
        "computed_property_name" | "class_heritage" | "else_clause" | "finally_clause"
        | "import_clause" | "named_imports" | "export_clause" | "ambient_declaration"
        | "template_substitution" | "switch_body" => EmitInstructions::skip().children(named()).emit(),
        "decorator" => e().children(named()).emit(),

        // Statements
        "expression_statement" | "return_statement" | "throw_statement" => {
            e().children(named()).positional().emit()
        }
        "statement_block" => e().children(named()).emit(),
        "if_statement" => e()
            .child(field(&n, "condition").map(unparen))
            .child(field(&n, "consequence"))
            .child(field(&n, "alternative"))
            .positional()
            .emit(),
        "for_statement" => e()
            .child(field(&n, "initializer"))
            .child(field(&n, "condition"))
            .child(field(&n, "increment"))
            .child(field(&n, "body"))
            .positional()
            .emit(),
        "for_in_statement" => {
            let of = field(&n, "operator").is_some_and(|op| text(&op, src) == "of");
            let instructions = if of { e().kind("for_of") } else { e() };
            instructions
                .prop("await", has_token(&n, "await"))
                .prop("kind", field(&n, "kind").map(|k| text(&k, src)))
                .child(field(&n, "left"))
                .child(field(&n, "right"))
                .child(field(&n, "body"))
                .positional()
                .emit()
        }
        "while_statement" => e()
            .child(field(&n, "condition").map(unparen))
            .child(field(&n, "body"))
            .positional()
            .emit(),
        "do_statement" => e()
            .child(field(&n, "body"))
            .child(field(&n, "condition").map(unparen))
            .positional()
            .emit(),
        "break_statement" | "continue_statement" => e().child(field(&n, "label")).emit(),
        "with_statement" => e()
            .child(field(&n, "object").map(unparen))
            .child(field(&n, "body"))
            .positional()
            .emit(),
        "labeled_statement" => e()
            .child(field(&n, "label"))
            .child(field(&n, "body"))
            .positional()
            .emit(),
        "switch_statement" => {
            let cases = field(&n, "body").map(|b| named_children(&b)).unwrap_or_default();
            e().child(field(&n, "value").map(unparen))
                .group_kept("cases", cases)
                .emit()
        }
        "switch_case" | "switch_default" => e()
            .child(field(&n, "value"))
            .group_kept("conseq", fields(&n, "body"))
            .emit(),
        "try_statement" => e()
            .child(field(&n, "body"))
            .child(field(&n, "handler"))
            .child(field(&n, "finalizer"))
            .positional()
            .emit(),
        "catch_clause" => e()
            .child(field(&n, "parameter"))
            .child(field(&n, "type"))
            .child(field(&n, "body"))
            .positional()
            .emit(),
        "empty_statement" | "debugger_statement" | "this" | "super" | "null" | "import" => {
            e().emit()
        }

        // Modules
        "import_statement" => {
            if let Some(clause) = first_of_kind(&n, "import_require_clause") {
                return e()
                    .kind("import_eq")
                    .prop("isExport", false)
                    .child(first_of_kind(&clause, "identifier"))
                    .child(Some(clause))
                    .emit();
            }
            let specs = first_of_kind(&n, "import_clause")
                .map(|clause| import_specifiers(&clause))
                .unwrap_or_default();
            let kind = if has_token(&n, "type") { "type" } else { "value" };
            e().prop("importKind", kind)
                .group("specs", specs)
                .group("source", field(&n, "source"))
                .emit()
        }
        "import_specifier" | "export_specifier" => {
            let name = field(&n, "name");
            let alias = field(&n, "alias");
            e().child(name).child(alias).emit()
        }
        "namespace_import" | "namespace_export" => e().children(named()).emit(),
        "import_require_clause" => e().child(field(&n, "source")).emit(),
        "import_alias" => e().prop("isExport", false).children(named()).emit(),
        "export_statement" => {
            let kind = if has_token(&n, "default") {
                "export_def"
            } else if has_token(&n, "*") {
                "export_all"
            } else {
                "export_named"
            };
            let specs = first_of_kind(&n, "export_clause")
                .map(|clause| named_children(&clause))
                .unwrap_or_default();
            e().kind(kind)
                .child(field(&n, "declaration"))
                .child(field(&n, "value"))
                .group("specs", specs)
                .group("source", field(&n, "source"))
                .emit()
        }

        // Expressions
        "identifier"
        | "property_identifier"
        | "shorthand_property_identifier"
        | "shorthand_property_identifier_pattern"
        | "private_property_identifier"
        | "type_identifier"
        | "statement_identifier"
        | "undefined" => e().prop("name", text(&n, src)).emit(),
        "number" => e().prop("value", js_number(text(&n, src))).emit(),
        "string" => e().prop("value", string_value(n, src)).emit(),
        "template_string" => {
            let exprs: Vec<Node<'t>> = children_of_kind(&n, &["template_substitution"])
                .iter()
                .flat_map(named_children)
                .collect();
            e().group("exprs", exprs).emit()
        }
        "regex" => e()
            .prop("pattern", field(&n, "pattern").map(|p| text(&p, src)))
            .prop("flags", field(&n, "flags").map(|f| text(&f, src)).unwrap_or(""))
            .emit(),
        "meta_property" => {
            let (meta, property) = text(&n, src).split_once('.').unwrap_or(("", ""));
            e().prop("meta", meta.trim())
                .prop("property", property.trim())
                .emit()
        }
        "true" => e().prop("value", true).emit(),
        "false" => e().prop("value", false).emit(),
        "call_expression" => {
            let args = field(&n, "arguments");
            match args {
                Some(template) if template.kind() == "template_string" => e()
                    .kind("tag_templ")
                    .child(field(&n, "function"))
                    .child(Some(template))
                    .emit(),
                _ => e()
                    .prop("optional", field(&n, "optional_chain").is_some())
                    .child(field(&n, "function"))
                    .group_kept("args", args.map(|a| named_children(&a)).unwrap_or_default())
                    .child(field(&n, "type_arguments"))
                    .emit(),
            }
        }
        "new_expression" => e()
            .child(field(&n, "constructor"))
            .group_kept(
                "args",
                field(&n, "arguments").map(|a| named_children(&a)).unwrap_or_default(),
            )
            .child(field(&n, "type_arguments"))
            .emit(),
        "member_expression" => e()
            .prop("optional", field(&n, "optional_chain").is_some())
            .prop("computed", false)
            .child(field(&n, "object"))
            .child(field(&n, "property"))
            .emit(),
        "subscript_expression" => e()
            .prop("optional", field(&n, "optional_chain").is_some())
            .prop("computed", true)
            .child(field(&n, "object"))
            .child(field(&n, "index"))
            .emit(),
        "assignment_expression" | "augmented_assignment_expression" => e()
            .prop("operator", operator(&n, src).unwrap_or("="))
            .group("left", field(&n, "left"))
            .group("right", field(&n, "right"))
            .emit(),
        "binary_expression" => {
            let op = operator(&n, src).unwrap_or("");
            let instructions = if matches!(op, "&&" | "||" | "??") {
                e().kind("logic_expr")
            } else {
                e()
            };
            instructions
                .prop("operator", op)
                .group("left", field(&n, "left"))
                .group("right", field(&n, "right"))
                .emit()
        }
        "unary_expression" => e()
            .prop("operator", operator(&n, src))
            .prop("prefix", true)
            .child(field(&n, "argument"))
            .emit(),
        "update_expression" => e()
            .prop("operator", operator(&n, src))
            .prop("prefix", n.child(0).is_some_and(|first| !first.is_named()))
            .child(field(&n, "argument"))
            .emit(),
        "ternary_expression" => e()
            .child(field(&n, "condition"))
            .child(field(&n, "consequence"))
            .child(field(&n, "alternative"))
            .positional()
            .emit(),
        "parenthesized_expression" | "await_expression" | "spread_element" | "rest_pattern"
        | "jsx_expression" | "jsx_attribute" | "jsx_namespace_name" | "type_annotation"
        | "as_expression" | "satisfies_expression" | "non_null_expression" | "union_type"
        | "intersection_type" | "array_type" | "tuple_type" | "literal_type"
        | "parenthesized_type" | "type_query" | "lookup_type" | "conditional_type"
        | "nested_type_identifier" | "type_arguments" | "type_parameters" | "type_parameter"
        | "extends_type_clause" | "generic_type" | "type_assertion" | "asserts_annotation"
        | "type_predicate_annotation" | "opting_type_annotation" | "omitting_type_annotation"
        | "adding_type_annotation" | "mapped_type_clause" | "infer_type" | "optional_type"
        | "rest_type" | "nested_identifier" | "instantiation_expression" => {
            e().children(named()).emit()
        }
        "constraint" | "default_type" | "template_type" => {
            EmitInstructions::skip().children(named()).emit()
        }
        "this_type" | "existential_type" => e().emit(),
        "readonly_type" => e().prop("operator", "readonly").children(named()).emit(),
        "type_predicate" => e()
            .prop("asserts", false)
            .child(field(&n, "name"))
            .child(field(&n, "type"))
            .positional()
            .emit(),
        "asserts" => {
            let (name, ty) = match first_of_kind(&n, "type_predicate") {
                Some(predicate) => (field(&predicate, "name"), field(&predicate, "type")),
                None => (named().into_iter().next(), None),
            };
            e().prop("asserts", true).child(name).child(ty).positional().emit()
        }
        "template_literal_type" => {
            let types: Vec<Node<'t>> = children_of_kind(&n, &["template_type"])
                .iter()
                .flat_map(named_children)
                .collect();
            e().group("types", types).emit()
        }
        "index_type_query" => e().prop("operator", "keyof").children(named()).emit(),
        "sequence_expression" => e().group("exprs", named()).emit(),
        "yield_expression" => e()
            .prop("delegate", has_token(&n, "*"))
            .children(named())
            .emit(),
        "arrow_function" => {
            let body = field(&n, "body");
            let params = match field(&n, "parameter") {
                Some(single) => vec![single],
                None => params(&n),
            };
            e().prop("async", has_token(&n, "async"))
                .prop("expression", body.is_some_and(|b| b.kind() != "statement_block"))
                .prop("generator", false)
                .group_kept("params", params)
                .child(body)
                .child(field(&n, "return_type"))
                .child(field(&n, "type_parameters"))
                .emit()
        }
        "function_expression" | "function" | "generator_function" => e()
            .prop("async", has_token(&n, "async"))
            .prop("generator", is_generator(&n))
            .child(field(&n, "name"))
            .group_kept("params", params(&n))
            .child(field(&n, "body"))
            .child(field(&n, "return_type"))
            .child(field(&n, "type_parameters"))
            .emit(),
        "object" | "object_pattern" => e().group("props", named()).emit(),
        "array" | "array_pattern" => e().group("elems", named()).emit(),
        "pair" | "pair_pattern" => {
            let key = field(&n, "key");
            e().prop("computed", is_computed(key))
                .prop("shorthand", false)
                .child(key)
                .child(field(&n, "value"))
                .positional()
                .emit()
        }
        "assignment_pattern" | "object_assignment_pattern" => e()
            .group("left", field(&n, "left"))
            .group("right", field(&n, "right"))
            .emit(),

        // JSX
        "jsx_element" => {
            let open = field(&n, "open_tag");
            let close = field(&n, "close_tag");
            let body: Vec<Node<'t>> = named()
                .into_iter()
                .filter(|c| Some(*c) != open && Some(*c) != close)
                .collect();
            e().child(open).group("children", body).child(close).emit()
        }
        "jsx_self_closing_element" => e()
            .prop("selfClosing", true)
            .child(field(&n, "name"))
            .group("attrs", fields(&n, "attribute"))
            .emit(),
        "jsx_opening_element" => e()
            .prop("selfClosing", false)
            .child(field(&n, "name"))
            .group("attrs", fields(&n, "attribute"))
            .emit(),
        "jsx_closing_element" => e().child(field(&n, "name")).emit(),
        "jsx_text" => e().prop("value", text(&n, src)).emit(),
        "html_character_reference" => Shape::Elide,

        // TypeScript types and declarations
        "predefined_type" => e().kind(predefined_type(text(&n, src))).emit(),
        "interface_declaration" => e()
            .prop("declare", is_ambient(&n))
            .child(field(&n, "name"))
            .child(field(&n, "type_parameters"))
            .child(first_of_kind(&n, "extends_type_clause"))
            .child(field(&n, "body"))
            .emit(),
        "property_signature" => e()
            .prop("optional", has_token(&n, "?"))
            .prop("readonly", has_token(&n, "readonly"))
            .child(field(&n, "name"))
            .child(field(&n, "type"))
            .emit(),
        "call_signature" | "construct_signature" => e()
            .group_kept("params", params(&n))
            .child(field(&n, "return_type"))
            .emit(),
        "index_signature" => e().children(named()).emit(),
        "function_type" => e()
            .group_kept("params", params(&n))
            .child(field(&n, "return_type"))
            .emit(),
        "constructor_type" => e()
            .prop("abstract", has_token(&n, "abstract"))
            .group_kept("params", params(&n))
            .child(field(&n, "type").or(field(&n, "return_type")))
            .child(field(&n, "type_parameters"))
            .emit(),
        "type_alias_declaration" => e()
            .prop("declare", is_ambient(&n))
            .child(field(&n, "name"))
            .child(field(&n, "type_parameters"))
            .child(field(&n, "value"))
            .emit(),
        "enum_declaration" => {
            let members = field(&n, "body").map(|b| named_children(&b)).unwrap_or_default();
            e().prop("const", has_token(&n, "const"))
                .prop("declare", is_ambient(&n))
                .child(field(&n, "name"))
                .group_kept("members", members)
                .emit()
        }
        "enum_assignment" => e()
            .child(field(&n, "name"))
            .child(field(&n, "value"))
            .positional()
            .emit(),
        "internal_module" | "module" => e()
            .prop("declare", is_ambient(&n))
            .child(field(&n, "name"))
            .child(field(&n, "body"))
            .emit(),
        "required_parameter" | "optional_parameter" => e()
            .prop("optional", n.kind() == "optional_parameter")
            .prop("readonly", has_token(&n, "readonly"))
            .prop("accessibility", accessibility(&n, src))
            .child(field(&n, "pattern"))
            .child(field(&n, "type"))
            .child(field(&n, "value"))
            .group("decors", fields(&n, "decorator"))
            .emit(),

        _ => Shape::Unhandled,
    }
}

/// Formal parameters of a function-like node.
fn params<'t>(n: &Node<'t>) -> Vec<Node<'t>> {
    field(n, "parameters")
        .map(|p| named_children(&p))
        .unwrap_or_default()
}

fn is_ambient(n: &Node) -> bool {
    n.parent().is_some_and(|p| p.kind() == "ambient_declaration")
}

fn is_generator(n: &Node) -> bool {
    n.kind().starts_with("generator_") || has_token(n, "*")
}

fn is_computed(name: Option<Node>) -> bool {
    name.is_some_and(|n| n.kind() == "computed_property_name")
}

fn accessibility(n: &Node, src: &str) -> PropValue {
    first_of_kind(n, "accessibility_modifier")
        .map(|m| text(&m, src))
        .into()
}

fn method_kind(n: &Node, name: Option<Node>, src: &str) -> &'static str {
    if has_token(n, "get") {
        "get"
    } else if has_token(n, "set") {
        "set"
    } else if name.is_some_and(|name| text(&name, src) == "constructor") {
        "constructor"
    } else {
        "method"
    }
}

/// Superclass expressions and implemented interfaces of a class heritage.
fn split_heritage<'t>(heritage: &Node<'t>) -> (Vec<Node<'t>>, Vec<Node<'t>>) {
    let mut supers = Vec::new();
    let mut impls = Vec::new();
    for child in named_children(heritage) {
        match child.kind() {
            "extends_clause" => supers.extend(named_children(&child)),
            "implements_clause" => impls.extend(named_children(&child)),
            _ => supers.push(child),
        }
    }
    (supers, impls)
}

fn import_specifiers<'t>(clause: &Node<'t>) -> Vec<Node<'t>> {
    named_children(clause)
        .into_iter()
        .flat_map(|child| match child.kind() {
            "named_imports" => named_children(&child),
            _ => vec![child],
        })
        .collect()
}

fn unparen(node: Node<'_>) -> Node<'_> {
    if node.kind() == "parenthesized_expression" {
        named_children(&node).into_iter().next().unwrap_or(node)
    } else {
        node
    }
}

/// JSX attribute strings keep their escapes; every other string is cooked.
fn string_value(n: Node<'_>, src: &str) -> String {
    let raw = text(&n, src);
    let body = strip_quotes(raw).unwrap_or(raw);
    match n.parent() {
        Some(parent) if parent.kind() == "jsx_attribute" => body.to_string(),
        _ => unescape(body, Escapes::JavaScript),
    }
}

fn predefined_type(keyword: &str) -> &'static str {
    match keyword {
        "string" => "string",
        "number" => "number",
        "boolean" => "boolean",
        "bigint" => "int",
        "symbol" => "symbol",
        "object" => "object",
        "never" => "never",
        "unknown" => "unknown",
        "undefined" => "undefined",
        "null" => "null",
        "void" => "void",
        _ => "any",
    }
}

/// A numeric literal as JavaScript would evaluate it.
fn js_number(raw: &str) -> PropValue {
    let digits = raw.replace('_', "");
    if digits.ends_with('n') {
        return PropValue::Str(digits);
    }

    let radix = match digits.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return i64::from_str_radix(&digits[2..], radix)
            .map(PropValue::Int)
            .unwrap_or(PropValue::Str(digits));
    }

    match digits.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value.abs() < 9.0e15 => PropValue::Int(value as i64),
        Ok(value) => PropValue::Float(value),
        Err(_) => PropValue::Str(digits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions() {
        let front_end = TypeScriptFrontEnd::new();
        assert!(front_end.can_parse("ts"));
        assert!(front_end.can_parse("TSX"));
        assert!(front_end.can_parse("jsx"));
        assert!(!front_end.can_parse("cs"));
    }

    #[test]
    fn test_renames() {
        let front_end = TypeScriptFrontEnd::new();
        assert_eq!(front_end.rename("lexical_declaration"), "variable");
        assert_eq!(front_end.rename("call_expression"), "call_expr");
        assert_eq!(front_end.rename("jsx_text"), "jsx_text");
    }

    #[test]
    fn test_common_kinds() {
        let normalizer = TypeScriptFrontEnd::new().normalizer();
        assert_eq!(normalizer.common_kind("func"), CommonKind::Func);
        assert_eq!(normalizer.common_kind("call_expr"), CommonKind::Call);
        assert_eq!(normalizer.common_kind("if"), CommonKind::Stmt);
        assert_eq!(normalizer.common_kind("ident"), CommonKind::Unknown);
    }

    #[test]
    fn test_js_number() {
        assert_eq!(js_number("1"), PropValue::Int(1));
        assert_eq!(js_number("1.0"), PropValue::Int(1));
        assert_eq!(js_number("1.5"), PropValue::Float(1.5));
        assert_eq!(js_number("0x1F"), PropValue::Int(31));
        assert_eq!(js_number("1_000"), PropValue::Int(1000));
        assert_eq!(js_number("10n"), PropValue::Str("10n".to_string()));
    }

}
