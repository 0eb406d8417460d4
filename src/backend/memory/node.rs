//! AST node model of the in-memory backend

use crate::backend::BackendError;
use crate::handle::{AstNode, Context};
use crate::wire_enum;
use std::fmt;

wire_enum! {
    /// Operator token of a binary expression
    pub struct TokenType {
        const PUNCTUATOR_PLUS = 1;
        const PUNCTUATOR_MINUS = 2;
        const PUNCTUATOR_MULTIPLY = 3;
        const PUNCTUATOR_DIVIDE = 4;
        const PUNCTUATOR_MOD = 5;
        const PUNCTUATOR_EQUAL = 6;
        const PUNCTUATOR_NOT_EQUAL = 7;
        const PUNCTUATOR_LESS_THAN = 8;
        const PUNCTUATOR_GREATER_THAN = 9;
        const PUNCTUATOR_LOGICAL_AND = 10;
        const PUNCTUATOR_LOGICAL_OR = 11;
    }
}

impl TokenType {
    pub fn symbol(self) -> Option<&'static str> {
        Some(match self {
            Self::PUNCTUATOR_PLUS => "+",
            Self::PUNCTUATOR_MINUS => "-",
            Self::PUNCTUATOR_MULTIPLY => "*",
            Self::PUNCTUATOR_DIVIDE => "/",
            Self::PUNCTUATOR_MOD => "%",
            Self::PUNCTUATOR_EQUAL => "==",
            Self::PUNCTUATOR_NOT_EQUAL => "!=",
            Self::PUNCTUATOR_LESS_THAN => "<",
            Self::PUNCTUATOR_GREATER_THAN => ">",
            Self::PUNCTUATOR_LOGICAL_AND => "&&",
            Self::PUNCTUATOR_LOGICAL_OR => "||",
            _ => return None,
        })
    }
}

wire_enum! {
    pub struct PrimitiveType {
        const BYTE = 0;
        const INT = 1;
        const LONG = 2;
        const SHORT = 3;
        const FLOAT = 4;
        const DOUBLE = 5;
        const BOOLEAN = 6;
        const CHAR = 7;
        const VOID = 8;
    }
}

impl PrimitiveType {
    pub fn keyword(self) -> Option<&'static str> {
        Some(match self {
            Self::BYTE => "byte",
            Self::INT => "int",
            Self::LONG => "long",
            Self::SHORT => "short",
            Self::FLOAT => "float",
            Self::DOUBLE => "double",
            Self::BOOLEAN => "boolean",
            Self::CHAR => "char",
            Self::VOID => "void",
            _ => return None,
        })
    }
}

wire_enum! {
    /// Declaration modifiers, combined as bit flags
    pub struct ModifierFlags {
        const NONE = 0;
        const STATIC = 1 << 0;
        const ASYNC = 1 << 1;
        const PUBLIC = 1 << 2;
        const PROTECTED = 1 << 3;
        const PRIVATE = 1 << 4;
        const DECLARE = 1 << 5;
        const READONLY = 1 << 6;
        const ABSTRACT = 1 << 7;
        const EXPORT = 1 << 8;
    }
}

wire_enum! {
    /// Script function flags, combined as bit flags
    pub struct ScriptFunctionFlags {
        const NONE = 0;
        const GENERATOR = 1 << 0;
        const ASYNC = 1 << 1;
        const ARROW = 1 << 2;
        const EXPRESSION = 1 << 3;
        const METHOD = 1 << 4;
        const CONSTRUCTOR = 1 << 5;
    }
}

macro_rules! flag_ops {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                #[inline]
                pub const fn contains(self, other: Self) -> bool {
                    self.0 & other.0 == other.0
                }
            }

            impl std::ops::BitOr for $ty {
                type Output = Self;

                fn bitor(self, rhs: Self) -> Self {
                    Self(self.0 | rhs.0)
                }
            }
        )*
    };
}

flag_ops!(ModifierFlags, ScriptFunctionFlags);

/// Numeric literal payload, keeping the width it was created with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Identifier {
        name: String,
        type_annotation: Option<AstNode>,
    },
    NumberLiteral(Number),
    StringLiteral(String),
    BooleanLiteral(bool),
    BinaryExpression {
        left: AstNode,
        right: AstNode,
        operator: TokenType,
    },
    ArrayExpression {
        elements: Vec<AstNode>,
    },
    CallExpression {
        callee: AstNode,
        arguments: Vec<AstNode>,
        type_params: Option<AstNode>,
        optional: bool,
        trailing_comma: bool,
    },
    ExpressionStatement {
        expression: AstNode,
    },
    BlockStatement {
        statements: Vec<AstNode>,
    },
    ReturnStatement {
        argument: Option<AstNode>,
    },
    ScriptFunction {
        body: Option<AstNode>,
        type_params: Option<AstNode>,
        params: Vec<AstNode>,
        return_type: Option<AstNode>,
        has_receiver: bool,
        flags: ScriptFunctionFlags,
        modifiers: ModifierFlags,
    },
    ETSPrimitiveType(PrimitiveType),
}

impl Node {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Identifier { .. } => "Identifier",
            Self::NumberLiteral(_) => "NumberLiteral",
            Self::StringLiteral(_) => "StringLiteral",
            Self::BooleanLiteral(_) => "BooleanLiteral",
            Self::BinaryExpression { .. } => "BinaryExpression",
            Self::ArrayExpression { .. } => "ArrayExpression",
            Self::CallExpression { .. } => "CallExpression",
            Self::ExpressionStatement { .. } => "ExpressionStatement",
            Self::BlockStatement { .. } => "BlockStatement",
            Self::ReturnStatement { .. } => "ReturnStatement",
            Self::ScriptFunction { .. } => "ScriptFunction",
            Self::ETSPrimitiveType(_) => "ETSPrimitiveType",
        }
    }

    /// Error for an accessor that expected another node kind
    pub fn mismatch(&self, expected: &'static str) -> BackendError {
        BackendError::NodeKindMismatch { expected, found: self.kind_name() }
    }

    /// Direct children in declaration order
    pub fn children(&self) -> Vec<AstNode> {
        let mut out = Vec::new();
        match self {
            Self::Identifier { type_annotation, .. } => out.extend(*type_annotation),
            Self::NumberLiteral(_)
            | Self::StringLiteral(_)
            | Self::BooleanLiteral(_)
            | Self::ETSPrimitiveType(_) => {}
            Self::BinaryExpression { left, right, .. } => out.extend([*left, *right]),
            Self::ArrayExpression { elements } => out.extend_from_slice(elements),
            Self::CallExpression { callee, arguments, type_params, .. } => {
                out.push(*callee);
                out.extend_from_slice(arguments);
                out.extend(*type_params);
            }
            Self::ExpressionStatement { expression } => out.push(*expression),
            Self::BlockStatement { statements } => out.extend_from_slice(statements),
            Self::ReturnStatement { argument } => out.extend(*argument),
            Self::ScriptFunction { body, type_params, params, return_type, .. } => {
                out.extend(*type_params);
                out.extend_from_slice(params);
                out.extend(*return_type);
                out.extend(*body);
            }
        }
        out
    }
}

/// Arena record around a node
#[derive(Debug, Clone)]
pub struct NodeData {
    pub context: Context,
    pub node: Node,
    pub parent: Option<AstNode>,
    pub original: Option<AstNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignatureData {
    pub context: Context,
    pub type_params: Option<AstNode>,
    pub params: Vec<AstNode>,
    pub return_type: Option<AstNode>,
    pub has_receiver: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSourceData {
    pub context: Context,
    pub source: AstNode,
    pub resolved_source: AstNode,
    pub has_decl: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DumperData {
    pub context: Context,
    pub node: AstNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationData {
    pub context: Context,
    pub message: String,
    pub line: i32,
    pub column: i32,
}

#[derive(Debug, Clone)]
pub struct ContextData {
    pub file: String,
    pub source: String,
}
