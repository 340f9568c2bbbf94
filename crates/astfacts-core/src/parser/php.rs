//! PHP front end.
//!
//! Kinds follow nikic/PHP-Parser's lowercased node types (`stmt_function`,
//! `expr_funccall`, `scalar_lnumber`, ...) so the `stmt` prefix rule of the
//! common-kind table applies to every statement. Every value is written as
//! a PHP string, booleans included (`"1"` and `""`).

use std::borrow::Cow;

use tree_sitter::{Language, Node};

use super::literal::{strip_quotes, unescape, Escapes};
use super::shape::{EmitInstructions, Shape};
use super::traits::FrontEnd;
use super::treesitter::{field, has_token, named_children, operator, text};
use crate::facts::{CommonKind, KindNormalizer, TypeNaming};

const RENAMES: &[(&str, &str)] = &[
    ("echo_statement", "stmt_echo"),
    ("expression_statement", "stmt_expression"),
    ("function_definition", "stmt_function"),
    ("return_statement", "stmt_return"),
    ("if_statement", "stmt_if"),
    ("else_if_clause", "stmt_elseif"),
    ("else_clause", "stmt_else"),
    ("while_statement", "stmt_while"),
    ("do_statement", "stmt_do"),
    ("for_statement", "stmt_for"),
    ("foreach_statement", "stmt_foreach"),
    ("switch_statement", "stmt_switch"),
    ("case_statement", "stmt_case"),
    ("default_statement", "stmt_case"),
    ("break_statement", "stmt_break"),
    ("continue_statement", "stmt_continue"),
    ("try_statement", "stmt_trycatch"),
    ("catch_clause", "stmt_catch"),
    ("finally_clause", "stmt_finally"),
    ("unset_statement", "stmt_unset"),
    ("global_declaration", "stmt_global"),
    ("function_static_declaration", "stmt_static"),
    ("static_variable_declaration", "stmt_staticvar"),
    ("const_declaration", "stmt_const"),
    ("const_element", "const"),
    ("namespace_definition", "stmt_namespace"),
    ("namespace_use_declaration", "stmt_use"),
    ("namespace_use_clause", "stmt_useuse"),
    ("namespace_use_group", "stmt_groupuse"),
    ("class_declaration", "stmt_class"),
    ("interface_declaration", "stmt_interface"),
    ("trait_declaration", "stmt_trait"),
    ("enum_declaration", "stmt_enum"),
    ("enum_case", "stmt_enumcase"),
    ("method_declaration", "stmt_classmethod"),
    ("property_declaration", "stmt_property"),
    ("property_element", "stmt_propertyproperty"),
    ("class_constant_declaration", "stmt_classconst"),
    ("use_declaration", "stmt_traituse"),
    ("declare_statement", "stmt_declare"),
    ("goto_statement", "stmt_goto"),
    ("named_label_statement", "stmt_label"),
    ("text", "stmt_inlinehtml"),
    ("simple_parameter", "param"),
    ("variadic_parameter", "param"),
    ("property_promotion_parameter", "param"),
    ("argument", "arg"),
    ("assignment_expression", "expr_assign"),
    ("reference_assignment_expression", "expr_assignref"),
    ("conditional_expression", "expr_ternary"),
    ("function_call_expression", "expr_funccall"),
    ("member_call_expression", "expr_methodcall"),
    ("nullsafe_member_call_expression", "expr_nullsafemethodcall"),
    ("scoped_call_expression", "expr_staticcall"),
    ("object_creation_expression", "expr_new"),
    ("member_access_expression", "expr_propertyfetch"),
    ("nullsafe_member_access_expression", "expr_nullsafepropertyfetch"),
    ("scoped_property_access_expression", "expr_staticpropertyfetch"),
    ("class_constant_access_expression", "expr_classconstfetch"),
    ("subscript_expression", "expr_arraydimfetch"),
    ("variable_name", "expr_variable"),
    ("dynamic_variable_name", "expr_variable"),
    ("name", "name"),
    ("qualified_name", "name"),
    ("namespace_name", "name"),
    ("named_type", "name"),
    ("primitive_type", "identifier"),
    ("optional_type", "nullabletype"),
    ("union_type", "uniontype"),
    ("intersection_type", "intersectiontype"),
    ("integer", "scalar_lnumber"),
    ("float", "scalar_dnumber"),
    ("string", "scalar_string"),
    ("encapsed_string", "scalar_string"),
    ("string_content", "scalar_encapsedstringpart"),
    ("string_value", "scalar_encapsedstringpart"),
    ("escape_sequence", "scalar_encapsedstringpart"),
    ("boolean", "expr_constfetch"),
    ("null", "expr_constfetch"),
    ("array_creation_expression", "expr_array"),
    ("array_element_initializer", "expr_arrayitem"),
    ("anonymous_function", "expr_closure"),
    ("anonymous_function_creation_expression", "expr_closure"),
    ("arrow_function", "expr_arrowfunction"),
    ("include_expression", "expr_include"),
    ("include_once_expression", "expr_include"),
    ("require_expression", "expr_include"),
    ("require_once_expression", "expr_include"),
    ("print_intrinsic", "expr_print"),
    ("clone_expression", "expr_clone"),
    ("yield_expression", "expr_yield"),
    ("match_expression", "expr_match"),
    ("match_conditional_expression", "matcharm"),
    ("match_default_expression", "matcharm"),
    ("list_literal", "expr_list"),
    ("shell_command_expression", "expr_shellexec"),
    ("throw_expression", "expr_throw"),
    ("exit_statement", "expr_exit"),
    ("error_suppression_expression", "expr_errorsuppress"),
];

/// The common-kind table of the PHP lexicon, applied after the `stmt` prefix rule.
const COMMON_KINDS: &[(&str, CommonKind)] = &[
    ("stmt_function", CommonKind::Func),
    ("expr_funccall", CommonKind::Call),
    ("expr_variable", CommonKind::Var),
    ("arg", CommonKind::Arg),
    ("expr_include", CommonKind::Import),
    ("block", CommonKind::Block),
    ("stmt_declare", CommonKind::Decl),
    ("stmt", CommonKind::Stmt),
];

/// Nodes that only group their children.
const PASS_THROUGH: &[&str] = &[
    "program",
    "compound_statement",
    "declaration_list",
    "enum_declaration_list",
    "switch_block",
    "formal_parameters",
    "arguments",
    "parenthesized_expression",
    "text_interpolation",
    "base_clause",
    "class_interface_clause",
    "anonymous_function_use_clause",
    "match_block",
    "match_condition_list",
    "sequence_expression",
    "type_list",
    "colon_block",
];

/// Nodes with no facts of their own.
const ELIDED: &[&str] = &[
    "php_tag",
    "empty_statement",
    "visibility_modifier",
    "static_modifier",
    "abstract_modifier",
    "final_modifier",
    "readonly_modifier",
    "var_modifier",
    "reference_modifier",
    "attribute_list",
    "cast_type",
];

const MODIFIER_PUBLIC: u32 = 1;
const MODIFIER_PROTECTED: u32 = 2;
const MODIFIER_PRIVATE: u32 = 4;
const MODIFIER_STATIC: u32 = 8;
const MODIFIER_ABSTRACT: u32 = 16;
const MODIFIER_FINAL: u32 = 32;
const MODIFIER_READONLY: u32 = 64;

/// PHP front end over the tree-sitter grammar.
pub struct PhpFrontEnd {
    language: Language,
}

impl PhpFrontEnd {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_php::LANGUAGE_PHP.into(),
        }
    }
}

impl Default for PhpFrontEnd {
    fn default() -> Self {
        Self::new()
    }
}

impl FrontEnd for PhpFrontEnd {
    fn namespace(&self) -> &'static str {
        "php"
    }

    fn language_name(&self) -> &'static str {
        "PHP"
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["php"]
    }

    fn grammar_for(&self, _extension: &str) -> Language {
        self.language.clone()
    }

    fn shape<'t>(&self, node: Node<'t>, source: &str) -> Shape<'t> {
        let kind = node.kind();
        if ELIDED.contains(&kind) {
            return Shape::Elide;
        }
        if PASS_THROUGH.contains(&kind) {
            return EmitInstructions::skip().children(children(&node)).emit();
        }
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
        KindNormalizer::new(COMMON_KINDS).with_statement_prefix("stmt")
    }

    fn type_naming(&self) -> TypeNaming {
        TypeNaming::Php
    }
}

fn shape_node<'t>(n: Node<'t>, src: &str) -> Shape<'t> {
    let e = || EmitInstructions::new().positional();

    let instructions = match n.kind() {
        "function_definition" => e().prop("byRef", php_bool(by_ref(&n))),
        "method_declaration" => e()
            .prop("flags", dump_flags(modifier_flags(&n, src)))
            .prop("byRef", php_bool(by_ref(&n))),
        "class_declaration" | "property_declaration" | "class_constant_declaration" => {
            e().prop("flags", dump_flags(modifier_flags(&n, src)))
        }
        "simple_parameter" | "variadic_parameter" | "property_promotion_parameter" => e()
            .prop("byRef", php_bool(by_ref(&n)))
            .prop("variadic", php_bool(n.kind() == "variadic_parameter"))
            .prop("flags", dump_flags(modifier_flags(&n, src))),
        "argument" | "array_element_initializer" => e()
            .prop("byRef", php_bool(by_ref(&n)))
            .prop("unpack", php_bool(has_token(&n, "..."))),
        "anonymous_function" | "anonymous_function_creation_expression" | "arrow_function" => e()
            .prop("static", php_bool(has_named(&n, "static_modifier") || has_token(&n, "static")))
            .prop("byRef", php_bool(by_ref(&n))),
        "variable_name" => {
            let name = text(&n, src).trim_start_matches('$');
            return e().prop("name", name).emit();
        }
        "name" | "qualified_name" | "namespace_name" | "named_type" | "primitive_type" => {
            let kind = if is_identifier_position(&n) || n.kind() == "primitive_type" {
                "identifier"
            } else {
                "name"
            };
            return e().kind(kind).prop("name", text(&n, src)).emit();
        }
        "integer" => {
            let (value, kind) = integer_value(text(&n, src));
            return e().prop("value", value).prop("kind", kind).emit();
        }
        "float" => {
            let raw = text(&n, src).replace('_', "");
            let value = raw.parse::<f64>().map(|f| f.to_string()).unwrap_or(raw);
            return e().prop("value", value).emit();
        }
        "string" => {
            return e()
                .prop("value", string_value(text(&n, src)))
                .prop("kind", "1")
                .emit();
        }
        "encapsed_string" => {
            let parts = children(&n);
            let interpolated = parts
                .iter()
                .any(|p| !matches!(p.kind(), "string_content" | "string_value" | "escape_sequence"));
            if interpolated {
                return e().kind("scalar_encapsed").children(parts).emit();
            }
            return e()
                .prop("value", string_value(text(&n, src)))
                .prop("kind", "2")
                .emit();
        }
        "escape_sequence" => {
            return e()
                .prop("value", unescape(text(&n, src), Escapes::PhpDouble))
                .emit();
        }
        "string_content" | "string_value" | "text" => {
            return e().prop("value", text(&n, src)).emit();
        }
        "boolean" | "null" => return e().prop("name", text(&n, src)).emit(),
        "array_creation_expression" => {
            let kind = if has_token(&n, "[") { "2" } else { "1" };
            e().prop("kind", kind)
        }
        "include_expression" => e().prop("type", "TYPE_INCLUDE (1)"),
        "include_once_expression" => e().prop("type", "TYPE_INCLUDE_ONCE (2)"),
        "require_expression" => e().prop("type", "TYPE_REQUIRE (3)"),
        "require_once_expression" => e().prop("type", "TYPE_REQUIRE_ONCE (4)"),
        "namespace_use_declaration" => {
            let kind = if has_token(&n, "function") {
                "TYPE_FUNCTION (2)"
            } else if has_token(&n, "const") {
                "TYPE_CONSTANT (3)"
            } else {
                "TYPE_NORMAL (1)"
            };
            e().prop("type", kind)
        }
        "namespace_use_clause" => e().prop("type", "TYPE_UNKNOWN (0)"),
        "binary_expression" => {
            let op = operator(&n, src).unwrap_or("").to_ascii_lowercase();
            match binary_kind(&op) {
                Some(kind) => e().kind(kind),
                None => return Shape::Unhandled,
            }
        }
        "augmented_assignment_expression" => {
            let op = operator(&n, src).unwrap_or("");
            match assign_op_kind(op) {
                Some(kind) => e().kind(kind),
                None => return Shape::Unhandled,
            }
        }
        "unary_op_expression" => {
            let op = first_token(&n, src).unwrap_or("");
            match unary_kind(op) {
                Some(kind) => e().kind(kind),
                None => return Shape::Unhandled,
            }
        }
        "update_expression" => {
            let prefix = n.child(0).is_some_and(|first| !first.is_named());
            let increment = has_token(&n, "++");
            let kind = match (prefix, increment) {
                (true, true) => "expr_preinc",
                (true, false) => "expr_predec",
                (false, true) => "expr_postinc",
                (false, false) => "expr_postdec",
            };
            e().kind(kind)
        }
        "cast_expression" => {
            let cast = field(&n, "type")
                .map(|t| text(&t, src).trim().to_ascii_lowercase())
                .unwrap_or_default();
            match cast_kind(&cast) {
                Some(kind) => e().kind(kind),
                None => return Shape::Unhandled,
            }
        }
        kind if RENAMES.iter().any(|(from, _)| *from == kind) => e(),
        _ => return Shape::Unhandled,
    };

    instructions.children(children(&n)).emit()
}

/// Named children minus modifiers, which are folded into `flags`.
fn children<'t>(n: &Node<'t>) -> Vec<Node<'t>> {
    named_children(n)
        .into_iter()
        .filter(|c| !ELIDED.contains(&c.kind()))
        .collect()
}

fn php_bool(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        ""
    }
}

fn has_named(n: &Node, kind: &str) -> bool {
    named_children(n).iter().any(|c| c.kind() == kind)
}

fn by_ref(n: &Node) -> bool {
    has_token(n, "&") || has_named(n, "reference_modifier")
}

fn first_token<'s>(n: &Node, src: &'s str) -> Option<&'s str> {
    let mut cursor = n.walk();
    let token = n.children(&mut cursor).find(|c| !c.is_named());
    token.map(|t| text(&t, src))
}

/// Names that PHP-Parser models as `Identifier` rather than `Name`.
fn is_identifier_position(n: &Node) -> bool {
    let Some(parent) = n.parent() else {
        return false;
    };
    let declares = matches!(
        parent.kind(),
        "function_definition"
            | "method_declaration"
            | "class_declaration"
            | "interface_declaration"
            | "trait_declaration"
            | "enum_declaration"
            | "enum_case"
            | "member_call_expression"
            | "nullsafe_member_call_expression"
            | "member_access_expression"
            | "nullsafe_member_access_expression"
            | "scoped_call_expression"
    );
    declares && parent.child_by_field_name("name") == Some(*n)
}

fn modifier_flags(n: &Node, src: &str) -> u32 {
    named_children(n)
        .iter()
        .map(|c| match c.kind() {
            "visibility_modifier" => match text(c, src).to_ascii_lowercase().as_str() {
                "public" => MODIFIER_PUBLIC,
                "protected" => MODIFIER_PROTECTED,
                "private" => MODIFIER_PRIVATE,
                _ => 0,
            },
            "static_modifier" => MODIFIER_STATIC,
            "abstract_modifier" => MODIFIER_ABSTRACT,
            "final_modifier" => MODIFIER_FINAL,
            "readonly_modifier" => MODIFIER_READONLY,
            _ => 0,
        })
        .fold(0, |flags, bit| flags | bit)
}

/// `"MODIFIER_PUBLIC | MODIFIER_STATIC (9)"`, or the bare number when no bit is set.
fn dump_flags(flags: u32) -> String {
    let names: Vec<&str> = [
        (MODIFIER_PUBLIC, "MODIFIER_PUBLIC"),
        (MODIFIER_PROTECTED, "MODIFIER_PROTECTED"),
        (MODIFIER_PRIVATE, "MODIFIER_PRIVATE"),
        (MODIFIER_ABSTRACT, "MODIFIER_ABSTRACT"),
        (MODIFIER_STATIC, "MODIFIER_STATIC"),
        (MODIFIER_FINAL, "MODIFIER_FINAL"),
        (MODIFIER_READONLY, "MODIFIER_READONLY"),
    ]
    .iter()
    .filter(|(bit, _)| flags & bit != 0)
    .map(|(_, name)| *name)
    .collect();

    if names.is_empty() {
        flags.to_string()
    } else {
        format!("{} ({})", names.join(" | "), flags)
    }
}

/// Decimal value and PHP-Parser `kind` attribute of an integer literal.
fn integer_value(raw: &str) -> (String, &'static str) {
    let digits = raw.replace('_', "").to_ascii_lowercase();
    let (body, radix, kind) = if let Some(hex) = digits.strip_prefix("0x") {
        (hex, 16, "16")
    } else if let Some(bin) = digits.strip_prefix("0b") {
        (bin, 2, "2")
    } else if let Some(oct) = digits.strip_prefix("0o") {
        (oct, 8, "8")
    } else if digits.len() > 1 && digits.starts_with('0') {
        (&digits[1..], 8, "8")
    } else {
        (digits.as_str(), 10, "10")
    };

    match i64::from_str_radix(body, radix) {
        Ok(value) => (value.to_string(), kind),
        Err(_) => (digits.clone(), kind),
    }
}

/// Value of a quoted string with its escapes resolved. Single quotes only
/// escape `\\` and `\'`.
fn string_value(raw: &str) -> String {
    let body = raw.trim_start_matches(['b', 'B']);
    match strip_quotes(body) {
        Some(inner) if body.starts_with('\'') => unescape(inner, Escapes::PhpSingle),
        Some(inner) => unescape(inner, Escapes::PhpDouble),
        None => body.to_string(),
    }
}

fn binary_kind(op: &str) -> Option<&'static str> {
    Some(match op {
        "+" => "expr_binaryop_plus",
        "-" => "expr_binaryop_minus",
        "*" => "expr_binaryop_mul",
        "/" => "expr_binaryop_div",
        "%" => "expr_binaryop_mod",
        "**" => "expr_binaryop_pow",
        "." => "expr_binaryop_concat",
        "&&" | "and" => "expr_binaryop_booleanand",
        "||" | "or" => "expr_binaryop_booleanor",
        "xor" => "expr_binaryop_logicalxor",
        "&" => "expr_binaryop_bitwiseand",
        "|" => "expr_binaryop_bitwiseor",
        "^" => "expr_binaryop_bitwisexor",
        "<<" => "expr_binaryop_shiftleft",
        ">>" => "expr_binaryop_shiftright",
        "==" => "expr_binaryop_equal",
        "!=" | "<>" => "expr_binaryop_notequal",
        "===" => "expr_binaryop_identical",
        "!==" => "expr_binaryop_notidentical",
        "<" => "expr_binaryop_smaller",
        "<=" => "expr_binaryop_smallerorequal",
        ">" => "expr_binaryop_greater",
        ">=" => "expr_binaryop_greaterorequal",
        "<=>" => "expr_binaryop_spaceship",
        "??" => "expr_binaryop_coalesce",
        "instanceof" => "expr_instanceof",
        _ => return None,
    })
}

fn assign_op_kind(op: &str) -> Option<&'static str> {
    Some(match op {
        "+=" => "expr_assignop_plus",
        "-=" => "expr_assignop_minus",
        "*=" => "expr_assignop_mul",
        "/=" => "expr_assignop_div",
        "%=" => "expr_assignop_mod",
        "**=" => "expr_assignop_pow",
        ".=" => "expr_assignop_concat",
        "&=" => "expr_assignop_bitwiseand",
        "|=" => "expr_assignop_bitwiseor",
        "^=" => "expr_assignop_bitwisexor",
        "<<=" => "expr_assignop_shiftleft",
        ">>=" => "expr_assignop_shiftright",
        "??=" => "expr_assignop_coalesce",
        _ => return None,
    })
}

fn unary_kind(op: &str) -> Option<&'static str> {
    Some(match op {
        "!" => "expr_booleannot",
        "-" => "expr_unaryminus",
        "+" => "expr_unaryplus",
        "~" => "expr_bitwisenot",
        "@" => "expr_errorsuppress",
        _ => return None,
    })
}

fn cast_kind(cast: &str) -> Option<&'static str> {
    Some(match cast {
        "int" | "integer" => "expr_cast_int",
        "bool" | "boolean" => "expr_cast_bool",
        "float" | "double" | "real" => "expr_cast_double",
        "string" | "binary" => "expr_cast_string",
        "array" => "expr_cast_array",
        "object" => "expr_cast_object",
        "unset" => "expr_cast_unset",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_flags() {
        assert_eq!(dump_flags(0), "0");
        assert_eq!(dump_flags(MODIFIER_PUBLIC), "MODIFIER_PUBLIC (1)");
        assert_eq!(
            dump_flags(MODIFIER_PUBLIC | MODIFIER_STATIC),
            "MODIFIER_PUBLIC | MODIFIER_STATIC (9)"
        );
        assert_eq!(
            dump_flags(MODIFIER_PRIVATE | MODIFIER_ABSTRACT | MODIFIER_FINAL),
            "MODIFIER_PRIVATE | MODIFIER_ABSTRACT | MODIFIER_FINAL (52)"
        );
    }

    #[test]
    fn test_statement_prefix_wins() {
        let normalizer = PhpFrontEnd::new().normalizer();
        assert_eq!(normalizer.common_kind("stmt_function"), CommonKind::Stmt);
        assert_eq!(normalizer.common_kind("stmt_echo"), CommonKind::Stmt);
        assert_eq!(normalizer.common_kind("expr_funccall"), CommonKind::Call);
        assert_eq!(normalizer.common_kind("expr_variable"), CommonKind::Var);
        assert_eq!(normalizer.common_kind("expr_include"), CommonKind::Import);
        assert_eq!(normalizer.common_kind("arg"), CommonKind::Arg);
        assert_eq!(normalizer.common_kind("scalar_lnumber"), CommonKind::Unknown);
    }

    #[test]
    fn test_integer_value() {
        assert_eq!(integer_value("42"), ("42".to_string(), "10"));
        assert_eq!(integer_value("0x1A"), ("26".to_string(), "16"));
        assert_eq!(integer_value("0b101"), ("5".to_string(), "2"));
        assert_eq!(integer_value("017"), ("15".to_string(), "8"));
        assert_eq!(integer_value("0"), ("0".to_string(), "10"));
    }

    #[test]
    fn test_string_value() {
        assert_eq!(string_value("'abc'"), "abc");
        assert_eq!(string_value("\"a $b\""), "a $b");
        assert_eq!(string_value("b'x'"), "x");
        assert_eq!(string_value(r"'it\'s'"), "it's");
        assert_eq!(string_value(r#""say \"hi\"""#), "say \"hi\"");
        assert_eq!(string_value(r"'a\nb'"), r"a\nb");
    }

    #[test]
    fn test_operator_kinds() {
        assert_eq!(binary_kind("."), Some("expr_binaryop_concat"));
        assert_eq!(binary_kind("and"), Some("expr_binaryop_booleanand"));
        assert_eq!(assign_op_kind(".="), Some("expr_assignop_concat"));
        assert_eq!(cast_kind("int"), Some("expr_cast_int"));
        assert_eq!(unary_kind("?"), None);
    }
}
