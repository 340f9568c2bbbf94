//! C# front end.
//!
//! Facts carry Roslyn `SyntaxKind` names and, like a `CSharpSyntaxWalker`
//! reporting `ChildTokens()`, each node's own tokens become properties
//! named after the token kind (`IdentifierToken`, `PublicKeyword`,
//! `SemicolonToken`, ...).

use std::borrow::Cow;

use tree_sitter::{Language, Node};

use super::literal::{strip_quotes, unescape, Escapes};
use super::shape::{EmitInstructions, Shape};
use super::traits::FrontEnd;
use super::treesitter::{field, named_children, text};
use crate::facts::{CommonKind, KindNormalizer, PropValue, TypeNaming};

/// Kinds whose Roslyn node owns its name as an `IdentifierToken` rather
/// than as a child name node.
const DECLARES_IDENTIFIER: &[&str] = &[
    "class_declaration",
    "constructor_declaration",
    "delegate_declaration",
    "destructor_declaration",
    "enum_declaration",
    "enum_member_declaration",
    "event_declaration",
    "interface_declaration",
    "local_function_statement",
    "method_declaration",
    "parameter",
    "property_declaration",
    "record_declaration",
    "struct_declaration",
    "type_parameter",
    "variable_declarator",
    "catch_declaration",
];

const RENAMES: &[(&str, &str)] = &[
    ("identifier", "IdentifierName"),
    ("implicit_type", "IdentifierName"),
    ("integer_literal", "NumericLiteralExpression"),
    ("real_literal", "NumericLiteralExpression"),
    ("string_literal", "StringLiteralExpression"),
    ("verbatim_string_literal", "StringLiteralExpression"),
    ("raw_string_literal", "StringLiteralExpression"),
    ("character_literal", "CharacterLiteralExpression"),
    ("null_literal", "NullLiteralExpression"),
    ("this", "ThisExpression"),
    ("member_access_expression", "SimpleMemberAccessExpression"),
    ("foreach_statement", "ForEachStatement"),
    ("arrow_expression_clause", "ArrowExpressionClause"),
    ("declaration_list", "DeclarationList"),
    ("switch_body", "SwitchBody"),
    ("implicit_parameter", "Parameter"),
    ("type_parameter_constraints_clause", "TypeParameterConstraintClause"),
];

const COMMON_KINDS: &[(&str, CommonKind)] = &[
    ("MethodDeclaration", CommonKind::Func),
    ("ConstructorDeclaration", CommonKind::Func),
    ("DestructorDeclaration", CommonKind::Func),
    ("OperatorDeclaration", CommonKind::Func),
    ("ConversionOperatorDeclaration", CommonKind::Func),
    ("LocalFunctionStatement", CommonKind::Func),
    ("ParenthesizedLambdaExpression", CommonKind::Func),
    ("SimpleLambdaExpression", CommonKind::Func),
    ("AccessorDeclaration", CommonKind::Func),
    ("InvocationExpression", CommonKind::Call),
    ("ObjectCreationExpression", CommonKind::Call),
    ("ImplicitObjectCreationExpression", CommonKind::Call),
    ("VariableDeclarator", CommonKind::Var),
    ("Parameter", CommonKind::Arg),
    ("Argument", CommonKind::Arg),
    ("UsingDirective", CommonKind::Import),
    ("Block", CommonKind::Block),
    ("VariableDeclaration", CommonKind::Decl),
    ("LocalDeclarationStatement", CommonKind::Decl),
    ("FieldDeclaration", CommonKind::Decl),
    ("PropertyDeclaration", CommonKind::Decl),
    ("EventFieldDeclaration", CommonKind::Decl),
    ("ClassDeclaration", CommonKind::Class),
    ("StructDeclaration", CommonKind::Class),
    ("InterfaceDeclaration", CommonKind::Class),
    ("RecordDeclaration", CommonKind::Class),
    ("EnumDeclaration", CommonKind::Class),
    ("ExpressionStatement", CommonKind::Stmt),
    ("ReturnStatement", CommonKind::Stmt),
    ("IfStatement", CommonKind::Stmt),
    ("ForStatement", CommonKind::Stmt),
    ("ForEachStatement", CommonKind::Stmt),
    ("WhileStatement", CommonKind::Stmt),
    ("DoStatement", CommonKind::Stmt),
    ("SwitchStatement", CommonKind::Stmt),
    ("TryStatement", CommonKind::Stmt),
    ("ThrowStatement", CommonKind::Stmt),
    ("BreakStatement", CommonKind::Stmt),
    ("ContinueStatement", CommonKind::Stmt),
    ("YieldReturnStatement", CommonKind::Stmt),
    ("UsingStatement", CommonKind::Stmt),
    ("LockStatement", CommonKind::Stmt),
    ("EmptyStatement", CommonKind::Stmt),
];

const PUNCTUATION: &[(&str, &str)] = &[
    (";", "SemicolonToken"),
    (",", "CommaToken"),
    (".", "DotToken"),
    (":", "ColonToken"),
    ("::", "ColonColonToken"),
    ("(", "OpenParenToken"),
    (")", "CloseParenToken"),
    ("{", "OpenBraceToken"),
    ("}", "CloseBraceToken"),
    ("[", "OpenBracketToken"),
    ("]", "CloseBracketToken"),
    ("<", "LessThanToken"),
    (">", "GreaterThanToken"),
    ("<=", "LessThanEqualsToken"),
    (">=", "GreaterThanEqualsToken"),
    ("=", "EqualsToken"),
    ("==", "EqualsEqualsToken"),
    ("!=", "ExclamationEqualsToken"),
    ("=>", "EqualsGreaterThanToken"),
    ("!", "ExclamationToken"),
    ("?", "QuestionToken"),
    ("??", "QuestionQuestionToken"),
    ("?.", "QuestionDotToken"),
    ("+", "PlusToken"),
    ("-", "MinusToken"),
    ("*", "AsteriskToken"),
    ("/", "SlashToken"),
    ("%", "PercentToken"),
    ("&", "AmpersandToken"),
    ("|", "BarToken"),
    ("^", "CaretToken"),
    ("~", "TildeToken"),
    ("&&", "AmpersandAmpersandToken"),
    ("||", "BarBarToken"),
    ("<<", "LessThanLessThanToken"),
    (">>", "GreaterThanGreaterThanToken"),
    ("++", "PlusPlusToken"),
    ("--", "MinusMinusToken"),
    ("+=", "PlusEqualsToken"),
    ("-=", "MinusEqualsToken"),
    ("*=", "AsteriskEqualsToken"),
    ("/=", "SlashEqualsToken"),
    ("%=", "PercentEqualsToken"),
    ("&=", "AmpersandEqualsToken"),
    ("|=", "BarEqualsToken"),
    ("^=", "CaretEqualsToken"),
    ("<<=", "LessThanLessThanEqualsToken"),
    (">>=", "GreaterThanGreaterThanEqualsToken"),
    ("??=", "QuestionQuestionEqualsToken"),
    ("$\"", "InterpolatedStringStartToken"),
    ("\"", "InterpolatedStringEndToken"),
];

const BINARY: &[(&str, &str)] = &[
    ("+", "AddExpression"),
    ("-", "SubtractExpression"),
    ("*", "MultiplyExpression"),
    ("/", "DivideExpression"),
    ("%", "ModuloExpression"),
    ("<<", "LeftShiftExpression"),
    (">>", "RightShiftExpression"),
    ("&&", "LogicalAndExpression"),
    ("||", "LogicalOrExpression"),
    ("&", "BitwiseAndExpression"),
    ("|", "BitwiseOrExpression"),
    ("^", "ExclusiveOrExpression"),
    ("==", "EqualsExpression"),
    ("!=", "NotEqualsExpression"),
    ("<", "LessThanExpression"),
    ("<=", "LessThanOrEqualExpression"),
    (">", "GreaterThanExpression"),
    (">=", "GreaterThanOrEqualExpression"),
    ("??", "CoalesceExpression"),
];

const ASSIGNMENT: &[(&str, &str)] = &[
    ("=", "SimpleAssignmentExpression"),
    ("+=", "AddAssignmentExpression"),
    ("-=", "SubtractAssignmentExpression"),
    ("*=", "MultiplyAssignmentExpression"),
    ("/=", "DivideAssignmentExpression"),
    ("%=", "ModuloAssignmentExpression"),
    ("&=", "AndAssignmentExpression"),
    ("|=", "OrAssignmentExpression"),
    ("^=", "ExclusiveOrAssignmentExpression"),
    ("<<=", "LeftShiftAssignmentExpression"),
    (">>=", "RightShiftAssignmentExpression"),
    ("??=", "CoalesceAssignmentExpression"),
];

const PREFIX_UNARY: &[(&str, &str)] = &[
    ("+", "UnaryPlusExpression"),
    ("-", "UnaryMinusExpression"),
    ("!", "LogicalNotExpression"),
    ("~", "BitwiseNotExpression"),
    ("++", "PreIncrementExpression"),
    ("--", "PreDecrementExpression"),
    ("&", "AddressOfExpression"),
    ("*", "PointerIndirectionExpression"),
    ("^", "IndexExpression"),
];

const POSTFIX_UNARY: &[(&str, &str)] = &[
    ("++", "PostIncrementExpression"),
    ("--", "PostDecrementExpression"),
    ("!", "SuppressNullableWarningExpression"),
];

/// C# front end over the tree-sitter grammar.
pub struct CSharpFrontEnd {
    language: Language,
}

impl CSharpFrontEnd {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_c_sharp::LANGUAGE.into(),
        }
    }
}

impl Default for CSharpFrontEnd {
    fn default() -> Self {
        Self::new()
    }
}

impl FrontEnd for CSharpFrontEnd {
    fn namespace(&self) -> &'static str {
        "csharp"
    }

    fn language_name(&self) -> &'static str {
        "C#"
    }

    fn aliases(&self) -> &[&'static str] {
        &["cs", "c#"]
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["cs"]
    }

    fn grammar_for(&self, _extension: &str) -> Language {
        self.language.clone()
    }

    fn shape<'t>(&self, node: Node<'t>, source: &str) -> Shape<'t> {
        match node.kind() {
            "compilation_unit" | "literal" | "global_statement" => {
                EmitInstructions::skip().children(named_children(&node)).emit()
            }
            // Token-level content; its text already lives in the parent's properties.
            "modifier"
            | "string_content"
            | "string_literal_content"
            | "raw_string_start"
            | "raw_string_content"
            | "raw_string_end"
            | "character_literal_content"
            | "escape_sequence"
            | "interpolation_start"
            | "interpolation_quote"
            | "interpolation_brace"
            | "interpolation_alignment_clause"
            | "interpolation_format_clause" => Shape::Elide,
            _ => shape_node(node, source).emit(),
        }
    }

    fn rename(&self, native_kind: &str) -> Cow<'static, str> {
        RENAMES
            .iter()
            .find(|(from, _)| *from == native_kind)
            .map(|(_, to)| Cow::Borrowed(*to))
            .unwrap_or_else(|| Cow::Owned(pascal_case(native_kind)))
    }

    fn normalizer(&self) -> KindNormalizer {
        KindNormalizer::new(COMMON_KINDS)
    }

    fn type_naming(&self) -> TypeNaming {
        TypeNaming::Clr
    }
}

fn shape_node<'t>(n: Node<'t>, src: &str) -> EmitInstructions<'t> {
    let mut instructions = EmitInstructions::new().positional();
    let name = DECLARES_IDENTIFIER
        .contains(&n.kind())
        .then(|| field(&n, "name"))
        .flatten()
        .filter(|name| name.kind() == "identifier");

    // Token properties, as ChildTokens() reports them.
    let mut cursor = n.walk();
    for token in n.children(&mut cursor) {
        if token.is_extra() || token.is_missing() {
            continue;
        }
        if token.kind() == "modifier" {
            let keyword = text(&token, src);
            instructions = instructions.prop(keyword_kind(keyword), keyword);
        } else if !token.is_named() {
            if let Some(kind) = token_kind(token.kind()) {
                instructions = instructions.prop(kind, text(&token, src));
            }
        }
    }
    if let Some(name) = name {
        instructions = instructions.prop("IdentifierToken", text(&name, src));
    }

    instructions = match n.kind() {
        "identifier" => instructions.prop("IdentifierToken", text(&n, src)),
        "implicit_type" => instructions.prop("IdentifierToken", "var"),
        "predefined_type" => {
            let keyword = text(&n, src);
            instructions.prop(keyword_kind(keyword), keyword)
        }
        "integer_literal" | "real_literal" => {
            instructions.prop("NumericLiteralToken", numeric_value(text(&n, src)))
        }
        "string_literal" | "verbatim_string_literal" | "raw_string_literal" => {
            instructions.prop("StringLiteralToken", literal_value(text(&n, src)))
        }
        "character_literal" => {
            instructions.prop("CharacterLiteralToken", literal_value(text(&n, src)))
        }
        "null_literal" => instructions.prop("NullKeyword", PropValue::Null),
        "boolean_literal" => {
            if text(&n, src) == "true" {
                instructions.kind("TrueLiteralExpression").prop("TrueKeyword", true)
            } else {
                instructions.kind("FalseLiteralExpression").prop("FalseKeyword", false)
            }
        }
        "binary_expression" => match lookup(BINARY, operator_token(&n, src)) {
            Some(kind) => instructions.kind(kind),
            None => instructions,
        },
        "assignment_expression" => match lookup(ASSIGNMENT, operator_token(&n, src)) {
            Some(kind) => instructions.kind(kind),
            None => instructions,
        },
        "prefix_unary_expression" => match lookup(PREFIX_UNARY, operator_token(&n, src)) {
            Some(kind) => instructions.kind(kind),
            None => instructions,
        },
        "postfix_unary_expression" => match lookup(POSTFIX_UNARY, operator_token(&n, src)) {
            Some(kind) => instructions.kind(kind),
            None => instructions,
        },
        "lambda_expression" => {
            if field(&n, "parameters").is_some_and(|p| p.kind() == "parameter_list") {
                instructions.kind("ParenthesizedLambdaExpression")
            } else {
                instructions.kind("SimpleLambdaExpression")
            }
        }
        "yield_statement" => {
            let kind = if has_keyword(&n, "break") {
                "YieldBreakStatement"
            } else {
                "YieldReturnStatement"
            };
            instructions.kind(kind)
        }
        _ => instructions,
    };

    let children = named_children(&n)
        .into_iter()
        .filter(|child| child.kind() != "modifier" && Some(*child) != name);
    instructions.children(children)
}

fn lookup(table: &[(&str, &'static str)], key: Option<&str>) -> Option<&'static str> {
    let key = key?;
    table.iter().find(|(from, _)| *from == key).map(|(_, to)| *to)
}

/// Operator of an expression: the `operator` field or its first anonymous token.
fn operator_token<'s>(n: &Node, src: &'s str) -> Option<&'s str> {
    if let Some(op) = field(n, "operator") {
        return Some(text(&op, src));
    }
    let mut cursor = n.walk();
    let token = n.children(&mut cursor).find(|c| !c.is_named());
    token.map(|t| text(&t, src))
}

fn has_keyword(n: &Node, keyword: &str) -> bool {
    let mut cursor = n.walk();
    let found = n
        .children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == keyword);
    found
}

/// Roslyn token kind for an anonymous token.
fn token_kind(token: &str) -> Option<Cow<'static, str>> {
    if let Some((_, kind)) = PUNCTUATION.iter().find(|(t, _)| *t == token) {
        return Some(Cow::Borrowed(*kind));
    }
    if !token.is_empty() && token.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(keyword_kind(token));
    }
    None
}

/// `public` -> `PublicKeyword`.
fn keyword_kind(keyword: &str) -> Cow<'static, str> {
    Cow::Owned(format!("{}Keyword", pascal_case(keyword)))
}

/// `class_declaration` -> `ClassDeclaration`.
fn pascal_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Value of a numeric literal token: integral literals as integers.
fn numeric_value(raw: &str) -> PropValue {
    let digits: String = raw.chars().filter(|c| *c != '_').collect();
    let lower = digits.to_ascii_lowercase();

    if let Some(hex) = lower.strip_prefix("0x") {
        let hex = hex.trim_end_matches(['u', 'l']);
        return i64::from_str_radix(hex, 16)
            .map(PropValue::Int)
            .unwrap_or(PropValue::Str(digits));
    }
    if let Some(bin) = lower.strip_prefix("0b") {
        let bin = bin.trim_end_matches(['u', 'l']);
        return i64::from_str_radix(bin, 2)
            .map(PropValue::Int)
            .unwrap_or(PropValue::Str(digits));
    }

    let real = lower.contains(['.', 'e']) || lower.ends_with(['f', 'd', 'm']);
    let number = lower.trim_end_matches(['u', 'l', 'f', 'd', 'm']);
    if real {
        number
            .parse::<f64>()
            .map(PropValue::Float)
            .unwrap_or(PropValue::Str(digits))
    } else {
        number
            .parse::<i64>()
            .map(PropValue::Int)
            .unwrap_or(PropValue::Str(digits))
    }
}

/// Value of a string or character literal, as Roslyn's `SyntaxToken.Value` reports it.
fn literal_value(raw: &str) -> String {
    let raw = raw
        .strip_suffix("u8")
        .filter(|r| r.ends_with('"'))
        .unwrap_or(raw);

    if raw.starts_with("\"\"\"") {
        let quotes = raw.len() - raw.trim_start_matches('"').len();
        let body = raw.get(quotes..raw.len().saturating_sub(quotes)).unwrap_or("");
        return raw_string_body(body);
    }
    if let Some(body) = raw.strip_prefix("@\"").and_then(|r| r.strip_suffix('"')) {
        return unescape(body, Escapes::CSharpVerbatim);
    }
    unescape(strip_quotes(raw).unwrap_or(raw), Escapes::CSharp)
}

/// Multi-line raw strings drop the opening line break, the closing line and
/// the closing line's indentation from every content line.
fn raw_string_body(body: &str) -> String {
    let Some(inner) = body.strip_prefix('\n').or_else(|| body.strip_prefix("\r\n")) else {
        return body.to_string();
    };
    let (content, indent) = match inner.rfind('\n') {
        Some(at) => (inner[..at].trim_end_matches('\r'), &inner[at + 1..]),
        None => (inner, ""),
    };
    content
        .lines()
        .map(|line| line.strip_prefix(indent).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}
