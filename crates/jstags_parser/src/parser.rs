//! The JavaScript parser implementation.
//!
//! A recursive descent parser over the scanner's token stream, building
//! an arena-allocated AST. Every node gets a byte-accurate range and a
//! parse-order id; identifier text is interned as it is parsed.

use bumpalo::Bump;
use jstags_ast::node::*;
use jstags_ast::syntax_kind::SyntaxKind;
use jstags_core::intern::StringInterner;
use jstags_diagnostics::{messages, Diagnostic, DiagnosticCollection};
use jstags_scanner::Scanner;

use crate::precedence::get_binary_operator_precedence;

/// Maximum recursion depth to prevent stack overflow on deeply nested input.
const MAX_RECURSION_DEPTH: u32 = 200;

/// The parser produces a SourceFile AST from JavaScript source text.
pub struct Parser<'a> {
    arena: &'a Bump,
    interner: StringInterner,
    scanner: Scanner,
    file_name: String,
    source_text: String,
    diagnostics: DiagnosticCollection,
    next_node_id: u32,
    /// End offset of the most recently consumed token.
    last_token_end: usize,
    /// Set while parsing a `for` head, where `in` is not a binary operator.
    disallow_in: bool,
    /// Tracks recursion depth to prevent stack overflow on deeply nested input.
    recursion_depth: u32,
}

impl<'a> Parser<'a> {
    pub fn new(
        arena: &'a Bump,
        interner: &StringInterner,
        file_name: &str,
        source_text: &str,
    ) -> Self {
        let scanner = Scanner::new(source_text);
        Self {
            arena,
            interner: interner.clone(),
            scanner,
            file_name: file_name.to_string(),
            source_text: source_text.to_string(),
            diagnostics: DiagnosticCollection::new(),
            next_node_id: 0,
            last_token_end: 0,
            disallow_in: false,
            recursion_depth: 0,
        }
    }

    pub fn parse_source_file(&mut self) -> SourceFile<'a> {
        self.scanner.skip_shebang();
        self.next_token();

        let statements = self.parse_statements_until(SyntaxKind::EndOfFileToken);
        let end = self.source_text.len() as u32;

        SourceFile {
            data: self.node_data_at(SyntaxKind::SourceFile, 0, end),
            statements,
            file_name: self.file_name.clone(),
            text: self.source_text.clone(),
        }
    }

    /// Take all diagnostics collected by the scanner and parser.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        let mut diags = self.scanner.take_diagnostics();
        diags.extend(std::mem::take(&mut self.diagnostics));
        diags.sort();
        diags
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn current_token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    fn next_token(&mut self) -> SyntaxKind {
        self.last_token_end = self.scanner.token_end();
        self.scanner.scan()
    }

    #[inline]
    fn token_pos(&self) -> u32 {
        self.scanner.token_start() as u32
    }

    #[inline]
    fn token_end(&self) -> u32 {
        self.scanner.token_end() as u32
    }

    #[inline]
    fn token_value(&self) -> &str {
        self.scanner.token_value()
    }

    fn expect_token(&mut self, kind: SyntaxKind) {
        if self.current_token() == kind {
            self.next_token();
        } else {
            let text = kind
                .punctuation_text()
                .or_else(|| kind.keyword_text())
                .unwrap_or("token");
            self.error(&messages::_0_EXPECTED, &[text]);
        }
    }

    fn optional_token(&mut self, kind: SyntaxKind) -> bool {
        if self.current_token() == kind {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume a `;`, or accept its absence at a line break, `}`, or EOF.
    fn parse_expected_semicolon(&mut self) {
        if self.current_token() == SyntaxKind::SemicolonToken {
            self.next_token();
        } else if self.current_token() != SyntaxKind::CloseBraceToken
            && self.current_token() != SyntaxKind::EndOfFileToken
            && !self.scanner.has_preceding_line_break()
        {
            self.error(&messages::_0_EXPECTED, &[";"]);
        }
    }

    fn error(&mut self, msg: &jstags_diagnostics::DiagnosticMessage, args: &[&str]) {
        let range = jstags_core::text::TextRange::new(self.token_pos(), self.token_end());
        self.diagnostics
            .add(Diagnostic::with_location(self.file_name.clone(), range, msg, args));
    }

    // ========================================================================
    // Node construction
    // ========================================================================

    fn next_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Node data ending at the last consumed token.
    fn finish_node(&mut self, kind: SyntaxKind, pos: u32) -> NodeData {
        let end = self.last_token_end as u32;
        self.node_data_at(kind, pos, end.max(pos))
    }

    fn node_data_at(&mut self, kind: SyntaxKind, pos: u32, end: u32) -> NodeData {
        NodeData::new(kind, self.next_id(), pos, end)
    }

    fn alloc_expr(&self, expr: Expression<'a>) -> &'a Expression<'a> {
        self.arena.alloc(expr)
    }

    fn alloc_stmt(&self, stmt: Statement<'a>) -> &'a Statement<'a> {
        self.arena.alloc(stmt)
    }

    fn alloc_vec<T>(&self, vec: Vec<T>) -> &'a [T] {
        if vec.is_empty() {
            &[]
        } else {
            self.arena.alloc_slice_fill_iter(vec)
        }
    }

    // ========================================================================
    // Statement parsing
    // ========================================================================

    fn parse_statements_until(&mut self, terminator: SyntaxKind) -> &'a [Statement<'a>] {
        let mut statements = Vec::new();
        while self.current_token() != terminator
            && self.current_token() != SyntaxKind::EndOfFileToken
        {
            let saved_pos = self.scanner.token_start();
            let stmt = self.parse_statement();
            statements.push(stmt);

            // Error recovery: if the parser hasn't advanced, skip forward to
            // the next statement-starting token to avoid infinite loops.
            if self.scanner.token_start() == saved_pos {
                self.skip_to_next_statement();
            }
        }
        self.alloc_vec(statements)
    }

    fn skip_to_next_statement(&mut self) {
        while self.current_token() != SyntaxKind::EndOfFileToken {
            match self.current_token() {
                SyntaxKind::SemicolonToken => {
                    self.next_token();
                    return;
                }
                SyntaxKind::VarKeyword
                | SyntaxKind::FunctionKeyword
                | SyntaxKind::IfKeyword
                | SyntaxKind::DoKeyword
                | SyntaxKind::WhileKeyword
                | SyntaxKind::ForKeyword
                | SyntaxKind::ReturnKeyword
                | SyntaxKind::BreakKeyword
                | SyntaxKind::ContinueKeyword
                | SyntaxKind::ThrowKeyword
                | SyntaxKind::OpenBraceToken
                | SyntaxKind::CloseBraceToken => return,
                _ => {
                    self.next_token();
                }
            }
        }
    }

    fn parse_statement(&mut self) -> Statement<'a> {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            self.error(&messages::UNEXPECTED_TOKEN, &[]);
            let pos = self.token_pos();
            if self.current_token() != SyntaxKind::EndOfFileToken {
                self.next_token();
            }
            return Statement::EmptyStatement(self.finish_node(SyntaxKind::EmptyStatement, pos));
        }
        self.recursion_depth += 1;
        let stmt = self.parse_statement_worker();
        self.recursion_depth -= 1;
        stmt
    }

    fn parse_statement_worker(&mut self) -> Statement<'a> {
        match self.current_token() {
            SyntaxKind::VarKeyword => self.parse_variable_statement(),
            SyntaxKind::FunctionKeyword => self.parse_function_declaration(),
            SyntaxKind::OpenBraceToken => Statement::Block(self.parse_block()),
            SyntaxKind::SemicolonToken => {
                let pos = self.token_pos();
                self.next_token();
                Statement::EmptyStatement(self.finish_node(SyntaxKind::EmptyStatement, pos))
            }
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::DoKeyword => self.parse_do_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::ContinueKeyword => {
                let pos = self.token_pos();
                self.next_token();
                self.parse_expected_semicolon();
                Statement::ContinueStatement(self.finish_node(SyntaxKind::ContinueStatement, pos))
            }
            SyntaxKind::BreakKeyword => {
                let pos = self.token_pos();
                self.next_token();
                self.parse_expected_semicolon();
                Statement::BreakStatement(self.finish_node(SyntaxKind::BreakStatement, pos))
            }
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            SyntaxKind::ThrowKeyword => self.parse_throw_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_variable_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::VarKeyword);
        let declarations = self.parse_variable_declarations();
        self.parse_expected_semicolon();
        Statement::VariableStatement(VariableStatement {
            data: self.finish_node(SyntaxKind::VariableStatement, pos),
            declarations,
        })
    }

    fn parse_variable_declarations(&mut self) -> &'a [VariableDeclarator<'a>] {
        let mut declarations = Vec::new();
        loop {
            declarations.push(self.parse_variable_declarator());
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.alloc_vec(declarations)
    }

    fn parse_variable_declarator(&mut self) -> VariableDeclarator<'a> {
        let pos = self.token_pos();
        let name = self.parse_identifier();
        let initializer = if self.optional_token(SyntaxKind::EqualsToken) {
            Some(self.parse_assignment_expression())
        } else {
            None
        };
        VariableDeclarator {
            data: self.finish_node(SyntaxKind::VariableDeclarator, pos),
            name,
            initializer,
        }
    }

    fn parse_function_declaration(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::FunctionKeyword);
        let name = self.parse_identifier();
        let parameters = self.parse_parameters();
        let body = self.parse_block();
        Statement::FunctionDeclaration(FunctionDeclaration {
            data: self.finish_node(SyntaxKind::FunctionDeclaration, pos),
            name,
            parameters,
            body,
        })
    }

    fn parse_parameters(&mut self) -> &'a [Identifier] {
        self.expect_token(SyntaxKind::OpenParenToken);
        let mut parameters = Vec::new();
        while self.current_token() != SyntaxKind::CloseParenToken
            && self.current_token() != SyntaxKind::EndOfFileToken
        {
            parameters.push(self.parse_identifier());
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseParenToken);
        self.alloc_vec(parameters)
    }

    fn parse_block(&mut self) -> Block<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken);
        let statements = self.parse_statements_until(SyntaxKind::CloseBraceToken);
        self.expect_token(SyntaxKind::CloseBraceToken);
        Block {
            data: self.finish_node(SyntaxKind::Block, pos),
            statements,
        }
    }

    fn parse_if_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::IfKeyword);
        self.expect_token(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression();
        self.expect_token(SyntaxKind::CloseParenToken);
        let then_statement = {
            let stmt = self.parse_statement();
            self.alloc_stmt(stmt)
        };
        let else_statement = if self.optional_token(SyntaxKind::ElseKeyword) {
            let stmt = self.parse_statement();
            Some(self.alloc_stmt(stmt))
        } else {
            None
        };
        Statement::IfStatement(IfStatement {
            data: self.finish_node(SyntaxKind::IfStatement, pos),
            condition,
            then_statement,
            else_statement,
        })
    }

    fn parse_do_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::DoKeyword);
        let statement = {
            let stmt = self.parse_statement();
            self.alloc_stmt(stmt)
        };
        self.expect_token(SyntaxKind::WhileKeyword);
        self.expect_token(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression();
        self.expect_token(SyntaxKind::CloseParenToken);
        self.optional_token(SyntaxKind::SemicolonToken);
        Statement::DoStatement(DoStatement {
            data: self.finish_node(SyntaxKind::DoStatement, pos),
            statement,
            condition,
        })
    }

    fn parse_while_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::WhileKeyword);
        self.expect_token(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression();
        self.expect_token(SyntaxKind::CloseParenToken);
        let statement = {
            let stmt = self.parse_statement();
            self.alloc_stmt(stmt)
        };
        Statement::WhileStatement(WhileStatement {
            data: self.finish_node(SyntaxKind::WhileStatement, pos),
            condition,
            statement,
        })
    }

    fn parse_for_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::ForKeyword);
        self.expect_token(SyntaxKind::OpenParenToken);

        let mut for_in_left = None;
        let mut initializer = None;

        if self.current_token() == SyntaxKind::VarKeyword {
            let var_pos = self.token_pos();
            self.next_token();
            self.disallow_in = true;
            let declarations = self.parse_variable_declarations();
            self.disallow_in = false;
            let clause = VariableStatement {
                data: self.finish_node(SyntaxKind::VariableStatement, var_pos),
                declarations,
            };
            if self.current_token() == SyntaxKind::InKeyword {
                for_in_left = Some(ForInit::VariableDeclarations(clause));
            } else {
                initializer = Some(ForInit::VariableDeclarations(clause));
            }
        } else if self.current_token() != SyntaxKind::SemicolonToken {
            self.disallow_in = true;
            let expr = self.parse_expression();
            self.disallow_in = false;
            if self.current_token() == SyntaxKind::InKeyword {
                for_in_left = Some(ForInit::Expression(expr));
            } else {
                initializer = Some(ForInit::Expression(expr));
            }
        }

        if let Some(left) = for_in_left {
            self.expect_token(SyntaxKind::InKeyword);
            let right = self.parse_expression();
            self.expect_token(SyntaxKind::CloseParenToken);
            let statement = {
                let stmt = self.parse_statement();
                self.alloc_stmt(stmt)
            };
            return Statement::ForInStatement(ForInStatement {
                data: self.finish_node(SyntaxKind::ForInStatement, pos),
                left,
                right,
                statement,
            });
        }

        self.expect_token(SyntaxKind::SemicolonToken);
        let condition = if self.current_token() != SyntaxKind::SemicolonToken {
            Some(self.parse_expression())
        } else {
            None
        };
        self.expect_token(SyntaxKind::SemicolonToken);
        let update = if self.current_token() != SyntaxKind::CloseParenToken {
            Some(self.parse_expression())
        } else {
            None
        };
        self.expect_token(SyntaxKind::CloseParenToken);
        let statement = {
            let stmt = self.parse_statement();
            self.alloc_stmt(stmt)
        };
        Statement::ForStatement(ForStatement {
            data: self.finish_node(SyntaxKind::ForStatement, pos),
            initializer,
            condition,
            update,
            statement,
        })
    }

    fn parse_return_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::ReturnKeyword);
        let expression = if self.current_token() != SyntaxKind::SemicolonToken
            && self.current_token() != SyntaxKind::CloseBraceToken
            && self.current_token() != SyntaxKind::EndOfFileToken
            && !self.scanner.has_preceding_line_break()
        {
            Some(self.parse_expression())
        } else {
            None
        };
        self.parse_expected_semicolon();
        Statement::ReturnStatement(ReturnStatement {
            data: self.finish_node(SyntaxKind::ReturnStatement, pos),
            expression,
        })
    }

    fn parse_throw_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::ThrowKeyword);
        let expression = self.parse_expression();
        self.parse_expected_semicolon();
        Statement::ThrowStatement(ThrowStatement {
            data: self.finish_node(SyntaxKind::ThrowStatement, pos),
            expression,
        })
    }

    fn parse_expression_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        let expression = self.parse_expression();
        self.parse_expected_semicolon();
        Statement::ExpressionStatement(ExpressionStatement {
            data: self.finish_node(SyntaxKind::ExpressionStatement, pos),
            expression,
        })
    }

    // ========================================================================
    // Expression parsing
    // ========================================================================

    fn parse_expression(&mut self) -> &'a Expression<'a> {
        self.parse_assignment_expression()
    }

    fn parse_assignment_expression(&mut self) -> &'a Expression<'a> {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            self.error(&messages::EXPRESSION_EXPECTED, &[]);
            let pos = self.token_pos();
            if self.current_token() != SyntaxKind::EndOfFileToken {
                self.next_token();
            }
            return self.make_missing_identifier(pos);
        }
        self.recursion_depth += 1;

        let pos = self.token_pos();
        let expr = self.parse_conditional_expression();
        let result = if self.current_token().is_assignment_operator() {
            let operator = self.current_token();
            self.next_token();
            let right = self.parse_assignment_expression();
            let data = self.finish_node(SyntaxKind::AssignmentExpression, pos);
            self.alloc_expr(Expression::Assignment(AssignmentExpression {
                data,
                left: expr,
                operator,
                right,
            }))
        } else {
            expr
        };

        self.recursion_depth -= 1;
        result
    }

    fn parse_conditional_expression(&mut self) -> &'a Expression<'a> {
        let pos = self.token_pos();
        let condition = self.parse_binary_expression(0);
        if !self.optional_token(SyntaxKind::QuestionToken) {
            return condition;
        }
        let saved_disallow_in = self.disallow_in;
        self.disallow_in = false;
        let when_true = self.parse_assignment_expression();
        self.disallow_in = saved_disallow_in;
        self.expect_token(SyntaxKind::ColonToken);
        let when_false = self.parse_assignment_expression();
        let data = self.finish_node(SyntaxKind::ConditionalExpression, pos);
        self.alloc_expr(Expression::Conditional(ConditionalExpression {
            data,
            condition,
            when_true,
            when_false,
        }))
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> &'a Expression<'a> {
        let pos = self.token_pos();
        let left = self.parse_unary_expression();
        self.parse_binary_expression_rest(min_precedence, left, pos)
    }

    fn parse_binary_expression_rest(
        &mut self,
        min_precedence: u8,
        mut left: &'a Expression<'a>,
        pos: u32,
    ) -> &'a Expression<'a> {
        loop {
            let precedence =
                match get_binary_operator_precedence(self.current_token(), self.disallow_in) {
                    Some(p) if p > min_precedence => p,
                    _ => break,
                };
            let operator = self.current_token();
            self.next_token();
            let right = self.parse_binary_expression(precedence);
            let data = self.finish_node(SyntaxKind::BinaryExpression, pos);
            left = self.alloc_expr(Expression::Binary(BinaryExpression {
                data,
                left,
                operator,
                right,
            }));
        }
        left
    }

    fn parse_unary_expression(&mut self) -> &'a Expression<'a> {
        match self.current_token() {
            SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::TildeToken
            | SyntaxKind::TypeOfKeyword
            | SyntaxKind::VoidKeyword
            | SyntaxKind::DeleteKeyword
            | SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken => {
                let pos = self.token_pos();
                let operator = self.current_token();
                self.next_token();
                let operand = self.parse_unary_expression();
                let data = self.finish_node(SyntaxKind::PrefixUnaryExpression, pos);
                self.alloc_expr(Expression::PrefixUnary(PrefixUnaryExpression {
                    data,
                    operator,
                    operand,
                }))
            }
            _ => self.parse_postfix_expression(),
        }
    }

    fn parse_postfix_expression(&mut self) -> &'a Expression<'a> {
        let pos = self.token_pos();
        let expr = self.parse_left_hand_side_expression();
        if matches!(
            self.current_token(),
            SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken
        ) && !self.scanner.has_preceding_line_break()
        {
            let operator = self.current_token();
            self.next_token();
            let data = self.finish_node(SyntaxKind::PostfixUnaryExpression, pos);
            return self.alloc_expr(Expression::PostfixUnary(PostfixUnaryExpression {
                data,
                operator,
                operand: expr,
            }));
        }
        expr
    }

    fn parse_left_hand_side_expression(&mut self) -> &'a Expression<'a> {
        let pos = self.token_pos();
        let expr = if self.current_token() == SyntaxKind::NewKeyword {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };
        self.parse_call_and_member_rest(pos, expr, true)
    }

    fn parse_new_expression(&mut self) -> &'a Expression<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::NewKeyword);
        let callee = if self.current_token() == SyntaxKind::NewKeyword {
            self.parse_new_expression()
        } else {
            let callee_pos = self.token_pos();
            let primary = self.parse_primary_expression();
            // member accesses bind to the constructor name; calls do not
            self.parse_call_and_member_rest(callee_pos, primary, false)
        };
        let arguments = if self.current_token() == SyntaxKind::OpenParenToken {
            self.parse_arguments()
        } else {
            &[]
        };
        let data = self.finish_node(SyntaxKind::NewExpression, pos);
        self.alloc_expr(Expression::New(NewExpression {
            data,
            callee,
            arguments,
        }))
    }

    fn parse_call_and_member_rest(
        &mut self,
        pos: u32,
        mut expr: &'a Expression<'a>,
        allow_call: bool,
    ) -> &'a Expression<'a> {
        loop {
            match self.current_token() {
                SyntaxKind::DotToken => {
                    self.next_token();
                    let name = self.parse_identifier_name();
                    let property = self.alloc_expr(Expression::Identifier(name));
                    let data = self.finish_node(SyntaxKind::MemberAccess, pos);
                    expr = self.alloc_expr(Expression::MemberAccess(MemberAccessExpression {
                        data,
                        object: expr,
                        property,
                        computed: false,
                    }));
                }
                SyntaxKind::OpenBracketToken => {
                    self.next_token();
                    let property = if self.current_token() == SyntaxKind::CloseBracketToken {
                        self.error(
                            &messages::AN_ELEMENT_ACCESS_EXPRESSION_SHOULD_TAKE_AN_ARGUMENT,
                            &[],
                        );
                        let missing_pos = self.token_pos();
                        self.make_missing_identifier(missing_pos)
                    } else {
                        let saved_disallow_in = self.disallow_in;
                        self.disallow_in = false;
                        let property = self.parse_expression();
                        self.disallow_in = saved_disallow_in;
                        property
                    };
                    self.expect_token(SyntaxKind::CloseBracketToken);
                    let data = self.finish_node(SyntaxKind::MemberAccess, pos);
                    expr = self.alloc_expr(Expression::MemberAccess(MemberAccessExpression {
                        data,
                        object: expr,
                        property,
                        computed: true,
                    }));
                }
                SyntaxKind::OpenParenToken if allow_call => {
                    let arguments = self.parse_arguments();
                    let data = self.finish_node(SyntaxKind::CallExpression, pos);
                    expr = self.alloc_expr(Expression::Call(CallExpression {
                        data,
                        callee: expr,
                        arguments,
                    }));
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_arguments(&mut self) -> &'a [&'a Expression<'a>] {
        self.expect_token(SyntaxKind::OpenParenToken);
        let mut arguments = Vec::new();
        while self.current_token() != SyntaxKind::CloseParenToken
            && self.current_token() != SyntaxKind::EndOfFileToken
        {
            arguments.push(self.parse_assignment_expression());
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseParenToken);
        self.alloc_vec(arguments)
    }

    fn parse_primary_expression(&mut self) -> &'a Expression<'a> {
        match self.current_token() {
            SyntaxKind::Identifier => {
                let ident = self.parse_identifier();
                self.alloc_expr(Expression::Identifier(ident))
            }
            SyntaxKind::NumericLiteral => {
                let lit = self.parse_numeric_literal();
                self.alloc_expr(Expression::Literal(lit))
            }
            SyntaxKind::StringLiteral => {
                let lit = self.parse_string_literal();
                self.alloc_expr(Expression::Literal(lit))
            }
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                let pos = self.token_pos();
                let end = self.token_end();
                let value = self.current_token() == SyntaxKind::TrueKeyword;
                self.next_token();
                let data = self.node_data_at(SyntaxKind::Literal, pos, end);
                self.alloc_expr(Expression::Literal(Literal {
                    data,
                    value: LiteralValue::Boolean(value),
                    text: if value { "true".into() } else { "false".into() },
                }))
            }
            SyntaxKind::NullKeyword => {
                let pos = self.token_pos();
                let end = self.token_end();
                self.next_token();
                let data = self.node_data_at(SyntaxKind::Literal, pos, end);
                self.alloc_expr(Expression::Literal(Literal {
                    data,
                    value: LiteralValue::Null,
                    text: "null".into(),
                }))
            }
            SyntaxKind::ThisKeyword => {
                let pos = self.token_pos();
                let end = self.token_end();
                self.next_token();
                let data = self.node_data_at(SyntaxKind::ThisExpression, pos, end);
                self.alloc_expr(Expression::ThisExpression(data))
            }
            SyntaxKind::OpenBraceToken => self.parse_object_literal(),
            SyntaxKind::OpenBracketToken => self.parse_array_literal(),
            SyntaxKind::OpenParenToken => {
                let pos = self.token_pos();
                self.next_token();
                let saved_disallow_in = self.disallow_in;
                self.disallow_in = false;
                let expression = self.parse_expression();
                self.disallow_in = saved_disallow_in;
                self.expect_token(SyntaxKind::CloseParenToken);
                let data = self.finish_node(SyntaxKind::ParenthesizedExpression, pos);
                self.alloc_expr(Expression::Parenthesized(ParenthesizedExpression {
                    data,
                    expression,
                }))
            }
            SyntaxKind::FunctionKeyword => self.parse_function_expression(),
            _ => {
                self.error(&messages::EXPRESSION_EXPECTED, &[]);
                let pos = self.token_pos();
                // Always advance to prevent infinite loops in callers.
                if self.current_token() != SyntaxKind::EndOfFileToken {
                    self.next_token();
                }
                self.make_missing_identifier(pos)
            }
        }
    }

    fn parse_object_literal(&mut self) -> &'a Expression<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut properties = Vec::new();
        while self.current_token() != SyntaxKind::CloseBraceToken
            && self.current_token() != SyntaxKind::EndOfFileToken
        {
            properties.push(self.parse_property());
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken);
        let properties = self.alloc_vec(properties);
        let data = self.finish_node(SyntaxKind::ObjectLiteral, pos);
        self.alloc_expr(Expression::ObjectLiteral(ObjectLiteralExpression {
            data,
            properties,
        }))
    }

    fn parse_property(&mut self) -> Property<'a> {
        let pos = self.token_pos();
        let key = match self.current_token() {
            SyntaxKind::Identifier => PropertyKey::Identifier(self.parse_identifier()),
            kind if kind.is_keyword() => PropertyKey::Identifier(self.parse_identifier_name()),
            SyntaxKind::StringLiteral => PropertyKey::Literal(self.parse_string_literal()),
            SyntaxKind::NumericLiteral => PropertyKey::Literal(self.parse_numeric_literal()),
            _ => {
                self.error(&messages::PROPERTY_NAME_EXPECTED, &[]);
                let missing_pos = self.token_pos();
                if self.current_token() != SyntaxKind::EndOfFileToken
                    && self.current_token() != SyntaxKind::CloseBraceToken
                {
                    self.next_token();
                }
                PropertyKey::Identifier(self.make_missing_identifier_value(missing_pos))
            }
        };
        self.expect_token(SyntaxKind::ColonToken);
        let value = self.parse_assignment_expression();
        Property {
            data: self.finish_node(SyntaxKind::Property, pos),
            key,
            value,
        }
    }

    fn parse_array_literal(&mut self) -> &'a Expression<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBracketToken);
        let mut elements = Vec::new();
        while self.current_token() != SyntaxKind::CloseBracketToken
            && self.current_token() != SyntaxKind::EndOfFileToken
        {
            if self.optional_token(SyntaxKind::CommaToken) {
                // elision
                continue;
            }
            elements.push(self.parse_assignment_expression());
            if self.current_token() != SyntaxKind::CloseBracketToken {
                self.expect_token(SyntaxKind::CommaToken);
            }
        }
        self.expect_token(SyntaxKind::CloseBracketToken);
        let elements = self.alloc_vec(elements);
        let data = self.finish_node(SyntaxKind::ArrayLiteral, pos);
        self.alloc_expr(Expression::ArrayLiteral(ArrayLiteralExpression {
            data,
            elements,
        }))
    }

    fn parse_function_expression(&mut self) -> &'a Expression<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::FunctionKeyword);
        let name = if self.current_token() == SyntaxKind::Identifier {
            Some(self.parse_identifier())
        } else {
            None
        };
        let parameters = self.parse_parameters();
        let body = self.parse_block();
        let data = self.finish_node(SyntaxKind::FunctionExpression, pos);
        self.alloc_expr(Expression::FunctionExpression(FunctionExpression {
            data,
            name,
            parameters,
            body,
        }))
    }

    // ========================================================================
    // Identifiers and literals
    // ========================================================================

    fn parse_identifier(&mut self) -> Identifier {
        let pos = self.token_pos();
        let end = self.token_end();
        if self.current_token() == SyntaxKind::Identifier {
            let text_name = self.token_value().to_string();
            let text = self.interner.intern(&text_name);
            self.next_token();
            Identifier {
                data: self.node_data_at(SyntaxKind::Identifier, pos, end),
                text,
                text_name,
            }
        } else {
            self.error(&messages::IDENTIFIER_EXPECTED, &[]);
            // Always advance to prevent infinite loops in callers.
            if self.current_token() != SyntaxKind::EndOfFileToken {
                self.next_token();
            }
            self.make_missing_identifier_value(pos)
        }
    }

    /// Like `parse_identifier`, but reserved words are accepted as names
    /// (property positions: `o.delete`, `{ in: 1 }`).
    fn parse_identifier_name(&mut self) -> Identifier {
        if self.current_token() == SyntaxKind::Identifier {
            return self.parse_identifier();
        }
        let pos = self.token_pos();
        let end = self.token_end();
        if let Some(text_name) = self.current_token().keyword_text() {
            let text = self.interner.intern_static(text_name);
            self.next_token();
            Identifier {
                data: self.node_data_at(SyntaxKind::Identifier, pos, end),
                text,
                text_name: text_name.to_string(),
            }
        } else {
            self.error(&messages::IDENTIFIER_EXPECTED, &[]);
            if self.current_token() != SyntaxKind::EndOfFileToken {
                self.next_token();
            }
            self.make_missing_identifier_value(pos)
        }
    }

    fn parse_numeric_literal(&mut self) -> Literal {
        let pos = self.token_pos();
        let end = self.token_end();
        let value = self.scanner.token_numeric_value();
        self.next_token();
        Literal {
            data: self.node_data_at(SyntaxKind::Literal, pos, end),
            value: LiteralValue::Number(value),
            text: number_to_text(value),
        }
    }

    fn parse_string_literal(&mut self) -> Literal {
        let pos = self.token_pos();
        let end = self.token_end();
        let value = self.token_value().to_string();
        self.next_token();
        Literal {
            data: self.node_data_at(SyntaxKind::Literal, pos, end),
            value: LiteralValue::String(value.clone()),
            text: value,
        }
    }

    fn make_missing_identifier_value(&mut self, pos: u32) -> Identifier {
        Identifier {
            data: self.node_data_at(SyntaxKind::Identifier, pos, pos),
            text: self.interner.intern(""),
            text_name: String::new(),
        }
    }

    fn make_missing_identifier(&mut self, pos: u32) -> &'a Expression<'a> {
        let ident = self.make_missing_identifier_value(pos);
        self.alloc_expr(Expression::Identifier(ident))
    }
}

/// Render a numeric literal value the way it participates in a path:
/// integral values print without a fraction, everything else uses the
/// shortest float rendering.
fn number_to_text(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 9.007_199_254_740_992e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
