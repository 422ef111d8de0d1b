//! Uniform node views and child iteration for tree traversal.
//!
//! `NodeRef` is a cheap `Copy` view over every node kind. The indexer
//! walks the tree through `for_each_child`, keeping a stack of `NodeRef`
//! ancestors; structural questions ("is this node the `init` child of
//! its parent?") are answered by comparing node ids through `child`.

use crate::node::*;
use crate::syntax_kind::SyntaxKind;
use jstags_core::text::TextRange;

/// A structural edge from a parent node to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildField {
    /// `VariableDeclarator.initializer`
    Init,
    /// `Property.value`
    Value,
    /// `MemberAccess.property`
    Property,
    /// `Property.key`
    Key,
    /// declarator / function name
    Name,
}

/// A borrowed, `Copy` view of any AST node.
#[derive(Clone, Copy)]
pub enum NodeRef<'a> {
    SourceFile(&'a SourceFile<'a>),
    VariableStatement(&'a VariableStatement<'a>),
    VariableDeclarator(&'a VariableDeclarator<'a>),
    FunctionDeclaration(&'a FunctionDeclaration<'a>),
    FunctionExpression(&'a FunctionExpression<'a>),
    Block(&'a Block<'a>),
    EmptyStatement(&'a NodeData),
    ExpressionStatement(&'a ExpressionStatement<'a>),
    IfStatement(&'a IfStatement<'a>),
    DoStatement(&'a DoStatement<'a>),
    WhileStatement(&'a WhileStatement<'a>),
    ForStatement(&'a ForStatement<'a>),
    ForInStatement(&'a ForInStatement<'a>),
    ContinueStatement(&'a NodeData),
    BreakStatement(&'a NodeData),
    ReturnStatement(&'a ReturnStatement<'a>),
    ThrowStatement(&'a ThrowStatement<'a>),
    Identifier(&'a Identifier),
    Literal(&'a Literal),
    ThisExpression(&'a NodeData),
    ArrayLiteral(&'a ArrayLiteralExpression<'a>),
    ObjectLiteral(&'a ObjectLiteralExpression<'a>),
    Property(&'a Property<'a>),
    MemberAccess(&'a MemberAccessExpression<'a>),
    Call(&'a CallExpression<'a>),
    New(&'a NewExpression<'a>),
    Parenthesized(&'a ParenthesizedExpression<'a>),
    PrefixUnary(&'a PrefixUnaryExpression<'a>),
    PostfixUnary(&'a PostfixUnaryExpression<'a>),
    Binary(&'a BinaryExpression<'a>),
    Assignment(&'a AssignmentExpression<'a>),
    Conditional(&'a ConditionalExpression<'a>),
}

impl<'a> NodeRef<'a> {
    pub fn from_statement(stmt: &'a Statement<'a>) -> NodeRef<'a> {
        match stmt {
            Statement::VariableStatement(n) => NodeRef::VariableStatement(n),
            Statement::FunctionDeclaration(n) => NodeRef::FunctionDeclaration(n),
            Statement::Block(n) => NodeRef::Block(n),
            Statement::EmptyStatement(data) => NodeRef::EmptyStatement(data),
            Statement::ExpressionStatement(n) => NodeRef::ExpressionStatement(n),
            Statement::IfStatement(n) => NodeRef::IfStatement(n),
            Statement::DoStatement(n) => NodeRef::DoStatement(n),
            Statement::WhileStatement(n) => NodeRef::WhileStatement(n),
            Statement::ForStatement(n) => NodeRef::ForStatement(n),
            Statement::ForInStatement(n) => NodeRef::ForInStatement(n),
            Statement::ContinueStatement(data) => NodeRef::ContinueStatement(data),
            Statement::BreakStatement(data) => NodeRef::BreakStatement(data),
            Statement::ReturnStatement(n) => NodeRef::ReturnStatement(n),
            Statement::ThrowStatement(n) => NodeRef::ThrowStatement(n),
        }
    }

    pub fn from_expression(expr: &'a Expression<'a>) -> NodeRef<'a> {
        match expr {
            Expression::Identifier(n) => NodeRef::Identifier(n),
            Expression::Literal(n) => NodeRef::Literal(n),
            Expression::ThisExpression(data) => NodeRef::ThisExpression(data),
            Expression::ArrayLiteral(n) => NodeRef::ArrayLiteral(n),
            Expression::ObjectLiteral(n) => NodeRef::ObjectLiteral(n),
            Expression::MemberAccess(n) => NodeRef::MemberAccess(n),
            Expression::Call(n) => NodeRef::Call(n),
            Expression::New(n) => NodeRef::New(n),
            Expression::Parenthesized(n) => NodeRef::Parenthesized(n),
            Expression::FunctionExpression(n) => NodeRef::FunctionExpression(n),
            Expression::PrefixUnary(n) => NodeRef::PrefixUnary(n),
            Expression::PostfixUnary(n) => NodeRef::PostfixUnary(n),
            Expression::Binary(n) => NodeRef::Binary(n),
            Expression::Assignment(n) => NodeRef::Assignment(n),
            Expression::Conditional(n) => NodeRef::Conditional(n),
        }
    }

    fn from_property_key(key: &'a PropertyKey) -> NodeRef<'a> {
        match key {
            PropertyKey::Identifier(n) => NodeRef::Identifier(n),
            PropertyKey::Literal(n) => NodeRef::Literal(n),
        }
    }

    /// The common node data.
    pub fn data(self) -> &'a NodeData {
        match self {
            NodeRef::SourceFile(n) => &n.data,
            NodeRef::VariableStatement(n) => &n.data,
            NodeRef::VariableDeclarator(n) => &n.data,
            NodeRef::FunctionDeclaration(n) => &n.data,
            NodeRef::FunctionExpression(n) => &n.data,
            NodeRef::Block(n) => &n.data,
            NodeRef::EmptyStatement(data) => data,
            NodeRef::ExpressionStatement(n) => &n.data,
            NodeRef::IfStatement(n) => &n.data,
            NodeRef::DoStatement(n) => &n.data,
            NodeRef::WhileStatement(n) => &n.data,
            NodeRef::ForStatement(n) => &n.data,
            NodeRef::ForInStatement(n) => &n.data,
            NodeRef::ContinueStatement(data) => data,
            NodeRef::BreakStatement(data) => data,
            NodeRef::ReturnStatement(n) => &n.data,
            NodeRef::ThrowStatement(n) => &n.data,
            NodeRef::Identifier(n) => &n.data,
            NodeRef::Literal(n) => &n.data,
            NodeRef::ThisExpression(data) => data,
            NodeRef::ArrayLiteral(n) => &n.data,
            NodeRef::ObjectLiteral(n) => &n.data,
            NodeRef::Property(n) => &n.data,
            NodeRef::MemberAccess(n) => &n.data,
            NodeRef::Call(n) => &n.data,
            NodeRef::New(n) => &n.data,
            NodeRef::Parenthesized(n) => &n.data,
            NodeRef::PrefixUnary(n) => &n.data,
            NodeRef::PostfixUnary(n) => &n.data,
            NodeRef::Binary(n) => &n.data,
            NodeRef::Assignment(n) => &n.data,
            NodeRef::Conditional(n) => &n.data,
        }
    }

    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.data().kind
    }

    #[inline]
    pub fn id(self) -> NodeId {
        self.data().id
    }

    #[inline]
    pub fn range(self) -> TextRange {
        self.data().range
    }

    /// The id of the child stored under `field`, if this node has one.
    pub fn child(self, field: ChildField) -> Option<NodeId> {
        match (self, field) {
            (NodeRef::VariableDeclarator(n), ChildField::Init) => {
                n.initializer.map(|init| init.data().id)
            }
            (NodeRef::VariableDeclarator(n), ChildField::Name) => Some(n.name.data.id),
            (NodeRef::FunctionDeclaration(n), ChildField::Name) => Some(n.name.data.id),
            (NodeRef::FunctionExpression(n), ChildField::Name) => {
                n.name.as_ref().map(|name| name.data.id)
            }
            (NodeRef::Property(n), ChildField::Key) => Some(n.key.data().id),
            (NodeRef::Property(n), ChildField::Value) => Some(n.value.data().id),
            (NodeRef::MemberAccess(n), ChildField::Property) => Some(n.property.data().id),
            _ => None,
        }
    }

    /// Invoke `f` once for every structural child, in document order.
    pub fn for_each_child<F: FnMut(NodeRef<'a>)>(self, f: &mut F) {
        match self {
            NodeRef::SourceFile(n) => {
                for stmt in n.statements.iter() {
                    f(NodeRef::from_statement(stmt));
                }
            }
            NodeRef::VariableStatement(n) => {
                for decl in n.declarations.iter() {
                    f(NodeRef::VariableDeclarator(decl));
                }
            }
            NodeRef::VariableDeclarator(n) => {
                f(NodeRef::Identifier(&n.name));
                if let Some(init) = n.initializer {
                    f(NodeRef::from_expression(init));
                }
            }
            NodeRef::FunctionDeclaration(n) => {
                f(NodeRef::Identifier(&n.name));
                for param in n.parameters.iter() {
                    f(NodeRef::Identifier(param));
                }
                f(NodeRef::Block(&n.body));
            }
            NodeRef::FunctionExpression(n) => {
                if let Some(ref name) = n.name {
                    f(NodeRef::Identifier(name));
                }
                for param in n.parameters.iter() {
                    f(NodeRef::Identifier(param));
                }
                f(NodeRef::Block(&n.body));
            }
            NodeRef::Block(n) => {
                for stmt in n.statements.iter() {
                    f(NodeRef::from_statement(stmt));
                }
            }
            NodeRef::EmptyStatement(_)
            | NodeRef::ContinueStatement(_)
            | NodeRef::BreakStatement(_)
            | NodeRef::Identifier(_)
            | NodeRef::Literal(_)
            | NodeRef::ThisExpression(_) => {}
            NodeRef::ExpressionStatement(n) => {
                f(NodeRef::from_expression(n.expression));
            }
            NodeRef::IfStatement(n) => {
                f(NodeRef::from_expression(n.condition));
                f(NodeRef::from_statement(n.then_statement));
                if let Some(else_stmt) = n.else_statement {
                    f(NodeRef::from_statement(else_stmt));
                }
            }
            NodeRef::DoStatement(n) => {
                f(NodeRef::from_statement(n.statement));
                f(NodeRef::from_expression(n.condition));
            }
            NodeRef::WhileStatement(n) => {
                f(NodeRef::from_expression(n.condition));
                f(NodeRef::from_statement(n.statement));
            }
            NodeRef::ForStatement(n) => {
                match n.initializer {
                    Some(ForInit::VariableDeclarations(ref var)) => {
                        f(NodeRef::VariableStatement(var));
                    }
                    Some(ForInit::Expression(expr)) => f(NodeRef::from_expression(expr)),
                    None => {}
                }
                if let Some(cond) = n.condition {
                    f(NodeRef::from_expression(cond));
                }
                if let Some(update) = n.update {
                    f(NodeRef::from_expression(update));
                }
                f(NodeRef::from_statement(n.statement));
            }
            NodeRef::ForInStatement(n) => {
                match n.left {
                    ForInit::VariableDeclarations(ref var) => {
                        f(NodeRef::VariableStatement(var));
                    }
                    ForInit::Expression(expr) => f(NodeRef::from_expression(expr)),
                }
                f(NodeRef::from_expression(n.right));
                f(NodeRef::from_statement(n.statement));
            }
            NodeRef::ReturnStatement(n) => {
                if let Some(expr) = n.expression {
                    f(NodeRef::from_expression(expr));
                }
            }
            NodeRef::ThrowStatement(n) => {
                f(NodeRef::from_expression(n.expression));
            }
            NodeRef::ArrayLiteral(n) => {
                for &elem in n.elements.iter() {
                    f(NodeRef::from_expression(elem));
                }
            }
            NodeRef::ObjectLiteral(n) => {
                for prop in n.properties.iter() {
                    f(NodeRef::Property(prop));
                }
            }
            NodeRef::Property(n) => {
                f(NodeRef::from_property_key(&n.key));
                f(NodeRef::from_expression(n.value));
            }
            NodeRef::MemberAccess(n) => {
                f(NodeRef::from_expression(n.object));
                f(NodeRef::from_expression(n.property));
            }
            NodeRef::Call(n) => {
                f(NodeRef::from_expression(n.callee));
                for &arg in n.arguments.iter() {
                    f(NodeRef::from_expression(arg));
                }
            }
            NodeRef::New(n) => {
                f(NodeRef::from_expression(n.callee));
                for &arg in n.arguments.iter() {
                    f(NodeRef::from_expression(arg));
                }
            }
            NodeRef::Parenthesized(n) => {
                f(NodeRef::from_expression(n.expression));
            }
            NodeRef::PrefixUnary(n) => {
                f(NodeRef::from_expression(n.operand));
            }
            NodeRef::PostfixUnary(n) => {
                f(NodeRef::from_expression(n.operand));
            }
            NodeRef::Binary(n) => {
                f(NodeRef::from_expression(n.left));
                f(NodeRef::from_expression(n.right));
            }
            NodeRef::Assignment(n) => {
                f(NodeRef::from_expression(n.left));
                f(NodeRef::from_expression(n.right));
            }
            NodeRef::Conditional(n) => {
                f(NodeRef::from_expression(n.condition));
                f(NodeRef::from_expression(n.when_true));
                f(NodeRef::from_expression(n.when_false));
            }
        }
    }
}

impl<'a> std::fmt::Debug for NodeRef<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.range())
    }
}
