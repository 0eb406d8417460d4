//! Source rendering for `AstNodeDumpEtsSrcConst` and source dumpers

use super::node::{ModifierFlags, Node, ScriptFunctionFlags};
use super::Arena;
use crate::handle::AstNode;

const INDENT: &str = "    ";

pub(super) fn render(arena: &Arena, root: AstNode) -> String {
    let mut printer = Printer { arena, out: String::new(), depth: 0 };
    printer.node(root);
    printer.out
}

struct Printer<'a> {
    arena: &'a Arena,
    out: String,
    depth: usize,
}

impl Printer<'_> {
    fn node(&mut self, handle: AstNode) {
        let Some(node) = self.arena.get_node(handle) else {
            self.out.push_str("<?>");
            return;
        };

        match node {
            Node::Identifier { name, type_annotation } => {
                self.out.push_str(name);
                if let Some(ty) = type_annotation {
                    self.out.push_str(": ");
                    self.node(*ty);
                }
            }
            Node::NumberLiteral(number) => self.out.push_str(&number.to_string()),
            Node::StringLiteral(value) => self.string(value),
            Node::BooleanLiteral(value) => self.out.push_str(if *value { "true" } else { "false" }),
            Node::BinaryExpression { left, right, operator } => {
                self.operand(*left);
                self.out.push(' ');
                self.out.push_str(operator.symbol().unwrap_or("?"));
                self.out.push(' ');
                self.operand(*right);
            }
            Node::ArrayExpression { elements } => {
                self.out.push('[');
                self.list(elements);
                self.out.push(']');
            }
            Node::CallExpression { callee, arguments, type_params, optional, .. } => {
                self.node(*callee);
                if let Some(params) = type_params {
                    self.out.push('<');
                    self.node(*params);
                    self.out.push('>');
                }
                if *optional {
                    self.out.push_str("?.");
                }
                self.out.push('(');
                self.list(arguments);
                self.out.push(')');
            }
            Node::ExpressionStatement { expression } => {
                self.node(*expression);
                self.out.push(';');
            }
            Node::BlockStatement { statements } => self.block(statements),
            Node::ReturnStatement { argument } => {
                self.out.push_str("return");
                if let Some(argument) = argument {
                    self.out.push(' ');
                    self.node(*argument);
                }
                self.out.push(';');
            }
            Node::ScriptFunction { body, params, return_type, flags, modifiers, .. } => {
                self.modifiers(*modifiers, *flags);
                self.out.push_str("function");
                if flags.contains(ScriptFunctionFlags::GENERATOR) {
                    self.out.push('*');
                }
                self.out.push('(');
                self.list(params);
                self.out.push(')');
                if let Some(ret) = return_type {
                    self.out.push_str(": ");
                    self.node(*ret);
                }
                match body {
                    Some(body) => {
                        self.out.push(' ');
                        self.node(*body);
                    }
                    None => self.out.push(';'),
                }
            }
            Node::ETSPrimitiveType(kind) => match kind.keyword() {
                Some(keyword) => self.out.push_str(keyword),
                None => self.out.push_str(&format!("<primitive {}>", kind.0)),
            },
        }
    }

    /// Nested binary expressions are parenthesized so precedence survives.
    fn operand(&mut self, handle: AstNode) {
        let nested = matches!(self.arena.get_node(handle), Some(Node::BinaryExpression { .. }));
        if nested {
            self.out.push('(');
        }
        self.node(handle);
        if nested {
            self.out.push(')');
        }
    }

    fn list(&mut self, items: &[AstNode]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.node(*item);
        }
    }

    fn block(&mut self, statements: &[AstNode]) {
        if statements.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push_str("{\n");
        self.depth += 1;
        for statement in statements {
            self.indent();
            self.node(*statement);
            self.out.push('\n');
        }
        self.depth -= 1;
        self.indent();
        self.out.push('}');
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    fn string(&mut self, value: &str) {
        self.out.push('"');
        for c in value.chars() {
            match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\t' => self.out.push_str("\\t"),
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }

    fn modifiers(&mut self, modifiers: ModifierFlags, flags: ScriptFunctionFlags) {
        const WORDS: [(ModifierFlags, &str); 8] = [
            (ModifierFlags::EXPORT, "export"),
            (ModifierFlags::DECLARE, "declare"),
            (ModifierFlags::PUBLIC, "public"),
            (ModifierFlags::PROTECTED, "protected"),
            (ModifierFlags::PRIVATE, "private"),
            (ModifierFlags::STATIC, "static"),
            (ModifierFlags::ABSTRACT, "abstract"),
            (ModifierFlags::READONLY, "readonly"),
        ];
        for (flag, word) in WORDS {
            if modifiers.contains(flag) {
                self.out.push_str(word);
                self.out.push(' ');
            }
        }
        if modifiers.contains(ModifierFlags::ASYNC) || flags.contains(ScriptFunctionFlags::ASYNC) {
            self.out.push_str("async ");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{MemoryBackend, Node, Number, PrimitiveType, TokenType};
    use super::*;

    #[test]
    fn test_render_function() {
        let backend = MemoryBackend::new();
        let ctx = backend.create_context("a.ets", "");
        let int = backend.alloc_node(ctx, Node::ETSPrimitiveType(PrimitiveType::INT)).unwrap();
        let param = backend
            .alloc_node(ctx, Node::Identifier { name: "x".into(), type_annotation: Some(int) })
            .unwrap();
        let x = backend
            .alloc_node(ctx, Node::Identifier { name: "x".into(), type_annotation: None })
            .unwrap();
        let one = backend.alloc_node(ctx, Node::NumberLiteral(Number::Int(1))).unwrap();
        let sum = backend
            .alloc_node(
                ctx,
                Node::BinaryExpression { left: x, right: one, operator: TokenType::PUNCTUATOR_PLUS },
            )
            .unwrap();
        let ret = backend.alloc_node(ctx, Node::ReturnStatement { argument: Some(sum) }).unwrap();
        let body = backend.alloc_node(ctx, Node::BlockStatement { statements: vec![ret] }).unwrap();
        let ret_type = backend.alloc_node(ctx, Node::ETSPrimitiveType(PrimitiveType::INT)).unwrap();
        let func = backend
            .alloc_node(
                ctx,
                Node::ScriptFunction {
                    body: Some(body),
                    type_params: None,
                    params: vec![param],
                    return_type: Some(ret_type),
                    has_receiver: false,
                    flags: ScriptFunctionFlags::NONE,
                    modifiers: ModifierFlags::STATIC,
                },
            )
            .unwrap();

        assert_eq!(
            backend.dump(ctx, func).unwrap(),
            "static function(x: int): int {\n    return x + 1;\n}"
        );
    }

    #[test]
    fn test_render_nested_binary_and_strings() {
        let backend = MemoryBackend::new();
        let ctx = backend.create_context("a.ets", "");
        let a = backend.alloc_node(ctx, Node::StringLiteral("say \"hi\"".into())).unwrap();
        let b = backend.alloc_node(ctx, Node::BooleanLiteral(false)).unwrap();
        let c = backend.alloc_node(ctx, Node::NumberLiteral(Number::Double(0.5))).unwrap();
        let inner = backend
            .alloc_node(
                ctx,
                Node::BinaryExpression { left: b, right: c, operator: TokenType::PUNCTUATOR_LOGICAL_OR },
            )
            .unwrap();
        let outer = backend
            .alloc_node(
                ctx,
                Node::BinaryExpression { left: a, right: inner, operator: TokenType::PUNCTUATOR_EQUAL },
            )
            .unwrap();

        assert_eq!(backend.dump(ctx, outer).unwrap(), r#""say \"hi\"" == (false || 0.5)"#);
    }
}
