// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! tree-sitter-python node kinds the lowering pass dispatches on.

// === Extras ===

/// Line comment: `# comment`
pub const COMMENT: &str = "comment";

/// Backslash line continuation.
pub const LINE_CONTINUATION: &str = "line_continuation";

// === Definitions ===

pub const BLOCK: &str = "block";

/// `@decorator` lines plus the definition they wrap.
pub const DECORATED_DEFINITION: &str = "decorated_definition";
pub const DECORATOR: &str = "decorator";
pub const FUNCTION_DEFINITION: &str = "function_definition";
pub const CLASS_DEFINITION: &str = "class_definition";

// === Parameters ===

pub const TYPED_PARAMETER: &str = "typed_parameter";
pub const DEFAULT_PARAMETER: &str = "default_parameter";
pub const TYPED_DEFAULT_PARAMETER: &str = "typed_default_parameter";
pub const LIST_SPLAT_PATTERN: &str = "list_splat_pattern";
pub const DICTIONARY_SPLAT_PATTERN: &str = "dictionary_splat_pattern";

// === Statements ===

pub const EXPRESSION_STATEMENT: &str = "expression_statement";
/// Plain and annotated assignment: `x = 1`, `x: int = 1`
pub const ASSIGNMENT: &str = "assignment";
pub const AUGMENTED_ASSIGNMENT: &str = "augmented_assignment";
pub const IMPORT_STATEMENT: &str = "import_statement";
pub const IMPORT_FROM_STATEMENT: &str = "import_from_statement";
pub const FUTURE_IMPORT_STATEMENT: &str = "future_import_statement";

/// Statement kinds without a more specific lowering.
pub const STATEMENTS: &[&str] = &[
    "return_statement",
    "pass_statement",
    "break_statement",
    "continue_statement",
    "raise_statement",
    "delete_statement",
    "global_statement",
    "nonlocal_statement",
    "assert_statement",
    "print_statement",
    "exec_statement",
    "type_alias_statement",
    "if_statement",
    "for_statement",
    "while_statement",
    "try_statement",
    "with_statement",
    "match_statement",
];

/// Clause wrappers whose children belong to the enclosing statement.
pub const CLAUSES: &[&str] = &[
    BLOCK,
    "elif_clause",
    "else_clause",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "with_clause",
    "with_item",
    "case_clause",
];

// === Expressions ===

pub const IDENTIFIER: &str = "identifier";
pub const ATTRIBUTE: &str = "attribute";
pub const CALL: &str = "call";
pub const ARGUMENT_LIST: &str = "argument_list";
pub const KEYWORD_ARGUMENT: &str = "keyword_argument";
pub const LIST_SPLAT: &str = "list_splat";
pub const DICTIONARY_SPLAT: &str = "dictionary_splat";
pub const DICTIONARY: &str = "dictionary";
pub const PAIR: &str = "pair";
pub const YIELD: &str = "yield";
pub const PARENTHESIZED_EXPRESSION: &str = "parenthesized_expression";
pub const LAMBDA_PARAMETERS: &str = "lambda_parameters";
/// Annotation wrapper around a type expression.
pub const TYPE: &str = "type";

// === Literals ===

pub const STRING: &str = "string";
pub const CONCATENATED_STRING: &str = "concatenated_string";
pub const INTEGER: &str = "integer";
pub const FLOAT: &str = "float";
pub const TRUE: &str = "true";
pub const FALSE: &str = "false";
pub const NONE: &str = "none";
pub const ELLIPSIS: &str = "ellipsis";
