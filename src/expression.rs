//! Path and key expression evaluation
//!
//! Supports the location-path subset of XPath 1.0 that identity keys and
//! verification queries need:
//!
//! - absolute and relative paths: `/doc/item`, `item/name`, `.`
//! - `//` (descendant-or-self), `*`, `@name`, `@*`, `text()`, `node()`
//! - predicates: `[2]`, `[last()]`, `[@id]`, `[@id='7']`, `[name!='x']`
//! - functions: `concat(..)`, `normalize-space(..)`, `string(..)`
//!
//! Node-sets are returned in document order without duplicates. The parent
//! axis (`..`) and arithmetic are not supported and are rejected at parse
//! time.

use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};

use crate::error::{EvaluationError, EvaluationResult};
use crate::node::{Element, NodeRef};

/// The result shape a caller asks a query for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    /// String-value of the first selected node, or the expression's string
    String,
    /// At most one node; more than one is a cardinality error
    Node,
    /// All selected nodes in document order
    NodeSet,
    /// Whether the expression selects anything (or yields a non-empty string)
    Boolean,
}

#[derive(Debug, Clone)]
pub enum QueryResult<'a> {
    String(String),
    Node(Option<NodeRef<'a>>),
    NodeSet(Vec<NodeRef<'a>>),
    Boolean(bool),
}

impl<'a> QueryResult<'a> {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryResult::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<NodeRef<'a>> {
        match self {
            QueryResult::Node(node) => *node,
            _ => None,
        }
    }

    pub fn as_node_set(&self) -> Option<&[NodeRef<'a>]> {
        match self {
            QueryResult::NodeSet(nodes) => Some(nodes),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            QueryResult::Boolean(value) => Some(*value),
            _ => None,
        }
    }
}

/// Parses and evaluates `expression` against `document`
pub fn query<'a>(
    document: &'a Element,
    expression: &str,
    shape: QueryShape,
) -> EvaluationResult<QueryResult<'a>> {
    Expression::parse(expression)?.evaluate(document, shape)
}

/// Trims and collapses internal whitespace runs to single spaces
///
/// Only XML whitespace counts: space, tab, carriage return and line feed.
pub fn normalize_space(value: &str) -> String {
    value
        .split([' ', '\t', '\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A parsed path or key expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Expr,
}

impl Expression {
    pub fn parse(source: &str) -> EvaluationResult<Self> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            source,
            tokens,
            position: 0,
            depth: 0,
        };
        if parser.tokens.is_empty() {
            return Err(parser.error("expression is empty"));
        }
        let root = parser.parse_expr()?;
        if parser.peek().is_some() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Evaluates against a document, relative paths starting at its root element
    pub fn evaluate<'a>(
        &self,
        document: &'a Element,
        shape: QueryShape,
    ) -> EvaluationResult<QueryResult<'a>> {
        let evaluator = Evaluator::new(document);
        let value = evaluator.eval(&self.root, Item::Node(NodeRef::Element(document)));

        match shape {
            QueryShape::String => Ok(QueryResult::String(evaluator.string_of(&value))),
            QueryShape::Boolean => Ok(QueryResult::Boolean(value.truthy())),
            QueryShape::NodeSet => {
                let nodes = self.node_set(value)?;
                Ok(QueryResult::NodeSet(nodes))
            }
            QueryShape::Node => {
                let nodes = self.node_set(value)?;
                if nodes.len() > 1 {
                    return Err(EvaluationError::Cardinality {
                        expression: self.source.clone(),
                        count: nodes.len(),
                    });
                }
                Ok(QueryResult::Node(nodes.into_iter().next()))
            }
        }
    }

    /// String-value of the first node selected from `element`, which lives
    /// in the tree `root`; string expressions yield their value
    ///
    /// Fails with [`EvaluationError::NoMatch`] when a path selects nothing,
    /// so that an instance without a key is never mistaken for one whose key
    /// is the empty string.
    pub fn evaluate_first<'a>(&self, scope: &DocumentScope<'a>, element: &'a Element) -> EvaluationResult<String> {
        let evaluator = &scope.evaluator;
        match evaluator.eval(&self.root, Item::Node(NodeRef::Element(element))) {
            Value::Nodes(nodes) => match nodes.first() {
                Some(first) => Ok(evaluator.item_string(*first)),
                None => Err(EvaluationError::NoMatch {
                    expression: self.source.clone(),
                }),
            },
            Value::Text(text) => Ok(text),
        }
    }

    fn node_set<'a>(&self, value: Value<'a>) -> EvaluationResult<Vec<NodeRef<'a>>> {
        match value {
            Value::Nodes(items) => Ok(items.into_iter().map(Item::into_node_ref).collect()),
            Value::Text(_) => Err(EvaluationError::TypeMismatch {
                expression: self.source.clone(),
                requested: "node-set",
                found: "string",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Path(PathExpr),
    Literal(String),
    Call(Function, Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Function {
    Concat,
    NormalizeSpace,
    String,
}

#[derive(Debug, Clone, PartialEq)]
struct PathExpr {
    absolute: bool,
    steps: Vec<PathStep>,
}

#[derive(Debug, Clone, PartialEq)]
struct PathStep {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

impl PathStep {
    fn descendant_or_self() -> Self {
        Self {
            axis: Axis::DescendantOrSelf,
            test: NodeTest::AnyNode,
            predicates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Attribute,
    DescendantOrSelf,
    SelfNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeTest {
    Name(String),
    AnyName,
    Text,
    AnyNode,
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Position(usize),
    Last,
    Test(Expr),
    Compare {
        left: Expr,
        negated: bool,
        right: Expr,
    },
}

/// A context item: the virtual document node or a node of the tree
#[derive(Debug, Clone, Copy)]
enum Item<'a> {
    Document(&'a Element),
    Node(NodeRef<'a>),
}

impl<'a> Item<'a> {
    fn address(&self) -> usize {
        match self {
            Item::Document(_) => 0,
            Item::Node(node) => node.address(),
        }
    }

    fn into_node_ref(self) -> NodeRef<'a> {
        match self {
            Item::Document(root) => NodeRef::Element(root),
            Item::Node(node) => node,
        }
    }
}

/// The document a series of evaluations runs against
///
/// Document order is indexed lazily, once per scope, so evaluating the same
/// key expression for many siblings reuses it.
pub struct DocumentScope<'a> {
    evaluator: Evaluator<'a>,
}

impl<'a> DocumentScope<'a> {
    pub fn new(root: &'a Element) -> Self {
        Self {
            evaluator: Evaluator::new(root),
        }
    }

    pub fn root(&self) -> &'a Element {
        self.evaluator.root
    }
}

enum Value<'a> {
    Nodes(Vec<Item<'a>>),
    Text(String),
}

impl Value<'_> {
    fn truthy(&self) -> bool {
        match self {
            Value::Nodes(nodes) => !nodes.is_empty(),
            Value::Text(text) => !text.is_empty(),
        }
    }
}

struct Evaluator<'a> {
    root: &'a Element,
    order: OnceCell<HashMap<usize, usize>>,
}

impl<'a> Evaluator<'a> {
    fn new(root: &'a Element) -> Self {
        Self {
            root,
            order: OnceCell::new(),
        }
    }

    fn eval(&self, expr: &Expr, context: Item<'a>) -> Value<'a> {
        match expr {
            Expr::Path(path) => Value::Nodes(self.eval_path(path, context)),
            Expr::Literal(text) => Value::Text(text.clone()),
            Expr::Call(function, args) => Value::Text(self.call(*function, args, context)),
        }
    }

    fn call(&self, function: Function, args: &[Expr], context: Item<'a>) -> String {
        let argument = |index: usize| match args.get(index) {
            Some(arg) => self.string_of(&self.eval(arg, context)),
            None => self.item_string(context),
        };
        match function {
            Function::Concat => args
                .iter()
                .map(|arg| self.string_of(&self.eval(arg, context)))
                .collect(),
            Function::NormalizeSpace => normalize_space(&argument(0)),
            Function::String => argument(0),
        }
    }

    fn eval_path(&self, path: &PathExpr, context: Item<'a>) -> Vec<Item<'a>> {
        let mut current = if path.absolute {
            vec![Item::Document(self.root)]
        } else {
            vec![context]
        };

        for step in &path.steps {
            let mut seen = HashSet::new();
            let mut next = Vec::new();
            for item in &current {
                let selected = self.filter(&step.predicates, self.axis(step, *item));
                for candidate in selected {
                    if seen.insert(candidate.address()) {
                        next.push(candidate);
                    }
                }
            }
            if current.len() > 1 {
                self.sort_in_document_order(&mut next);
            }
            current = next;
        }
        current
    }

    fn axis(&self, step: &PathStep, item: Item<'a>) -> Vec<Item<'a>> {
        match step.axis {
            Axis::Child => children(item)
                .into_iter()
                .filter(|node| matches_test(&step.test, *node))
                .map(Item::Node)
                .collect(),
            Axis::Attribute => match element_of(item) {
                Some(element) => element
                    .attributes
                    .iter()
                    .filter(|attribute| match &step.test {
                        NodeTest::Name(name) => attribute.name == *name,
                        NodeTest::AnyName | NodeTest::AnyNode => true,
                        NodeTest::Text => false,
                    })
                    .map(|attribute| Item::Node(NodeRef::Attribute(attribute)))
                    .collect(),
                None => Vec::new(),
            },
            Axis::DescendantOrSelf => {
                let mut items = vec![item];
                let mut stack: Vec<&Element> = match item {
                    Item::Document(root) => vec![root],
                    Item::Node(NodeRef::Element(element)) => {
                        let mut children: Vec<&Element> = element.child_elements().collect();
                        children.reverse();
                        children
                    }
                    Item::Node(_) => Vec::new(),
                };
                while let Some(element) = stack.pop() {
                    items.push(Item::Node(NodeRef::Element(element)));
                    let children: Vec<&Element> = element.child_elements().collect();
                    stack.extend(children.into_iter().rev());
                }
                items
            }
            Axis::SelfNode => match (&step.test, item) {
                (NodeTest::AnyNode, _) => vec![item],
                (test, Item::Node(node)) if matches_test(test, node) => vec![item],
                _ => Vec::new(),
            },
        }
    }

    fn filter(&self, predicates: &[Predicate], mut items: Vec<Item<'a>>) -> Vec<Item<'a>> {
        for predicate in predicates {
            let size = items.len();
            items = items
                .into_iter()
                .enumerate()
                .filter(|(index, item)| self.holds(predicate, *item, index + 1, size))
                .map(|(_, item)| item)
                .collect();
        }
        items
    }

    fn holds(&self, predicate: &Predicate, item: Item<'a>, position: usize, size: usize) -> bool {
        match predicate {
            Predicate::Position(expected) => position == *expected,
            Predicate::Last => position == size,
            Predicate::Test(expr) => self.eval(expr, item).truthy(),
            Predicate::Compare {
                left,
                negated,
                right,
            } => {
                let left = self.strings_of(self.eval(left, item));
                let right = self.strings_of(self.eval(right, item));
                left.iter()
                    .any(|l| right.iter().any(|r| (l == r) != *negated))
            }
        }
    }

    fn strings_of(&self, value: Value<'a>) -> Vec<String> {
        match value {
            Value::Nodes(items) => items.into_iter().map(|item| self.item_string(item)).collect(),
            Value::Text(text) => vec![text],
        }
    }

    fn string_of(&self, value: &Value<'a>) -> String {
        match value {
            Value::Nodes(items) => items
                .first()
                .map(|item| self.item_string(*item))
                .unwrap_or_default(),
            Value::Text(text) => text.clone(),
        }
    }

    fn item_string(&self, item: Item<'a>) -> String {
        match item {
            Item::Document(root) => root.string_value(),
            Item::Node(node) => node.string_value(),
        }
    }

    fn sort_in_document_order(&self, items: &mut [Item<'a>]) {
        let order = self.order.get_or_init(|| document_order(self.root));
        items.sort_by_key(|item| order.get(&item.address()).copied().unwrap_or(usize::MAX));
    }
}

fn element_of(item: Item<'_>) -> Option<&Element> {
    match item {
        Item::Document(_) => None,
        Item::Node(node) => node.as_element(),
    }
}

fn children(item: Item<'_>) -> Vec<NodeRef<'_>> {
    match item {
        Item::Document(root) => vec![NodeRef::Element(root)],
        Item::Node(NodeRef::Element(element)) => {
            element.children.iter().map(NodeRef::from_node).collect()
        }
        Item::Node(_) => Vec::new(),
    }
}

fn matches_test(test: &NodeTest, node: NodeRef<'_>) -> bool {
    match (test, node) {
        (NodeTest::AnyNode, _) => true,
        (NodeTest::Text, NodeRef::Text(_) | NodeRef::CData(_)) => true,
        (NodeTest::AnyName, NodeRef::Element(_)) => true,
        (NodeTest::Name(name), NodeRef::Element(element)) => element.name == *name,
        _ => false,
    }
}

/// Preorder position of every node address; 0 is the document node
fn document_order(root: &Element) -> HashMap<usize, usize> {
    let mut order = HashMap::new();
    let mut next = 1;
    let mut stack = vec![NodeRef::Element(root)];
    while let Some(node) = stack.pop() {
        order.insert(node.address(), next);
        next += 1;
        if let NodeRef::Element(element) = node {
            for attribute in &element.attributes {
                order.insert(NodeRef::Attribute(attribute).address(), next);
                next += 1;
            }
            stack.extend(element.children.iter().rev().map(NodeRef::from_node));
        }
    }
    order
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Slash,
    DoubleSlash,
    At,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Eq,
    NotEq,
    Dot,
    Star,
    Name(String),
    Literal(String),
    Number(usize),
}

fn tokenize(source: &str) -> EvaluationResult<Vec<(Token, usize)>> {
    let syntax = |offset: usize, reason: &str| EvaluationError::Syntax {
        expression: source.to_string(),
        offset,
        reason: reason.to_string(),
    };

    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    while let Some(&(offset, c)) = chars.peek() {
        let single = match c {
            '@' => Some(Token::At),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            '=' => Some(Token::Eq),
            '*' => Some(Token::Star),
            _ => None,
        };
        if let Some(token) = single {
            chars.next();
            tokens.push((token, offset));
            continue;
        }

        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '/' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '/'))) {
                    chars.next();
                    tokens.push((Token::DoubleSlash, offset));
                } else {
                    tokens.push((Token::Slash, offset));
                }
            }
            '!' => {
                chars.next();
                match chars.next() {
                    Some((_, '=')) => tokens.push((Token::NotEq, offset)),
                    _ => return Err(syntax(offset, "expected '=' after '!'")),
                }
            }
            '.' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '.'))) {
                    return Err(syntax(offset, "the parent axis '..' is not supported"));
                }
                tokens.push((Token::Dot, offset));
            }
            '\'' | '"' => {
                chars.next();
                let mut literal = String::new();
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if next == c {
                        closed = true;
                        break;
                    }
                    literal.push(next);
                }
                if !closed {
                    return Err(syntax(offset, "unterminated string literal"));
                }
                tokens.push((Token::Literal(literal), offset));
            }
            c if c.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    chars.next();
                }
                let number = digits
                    .parse()
                    .map_err(|_| syntax(offset, "number out of range"))?;
                tokens.push((Token::Number(number), offset));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&(_, n)) = chars.peek() {
                    if !(n.is_alphanumeric() || matches!(n, '_' | '-' | '.' | ':')) {
                        break;
                    }
                    name.push(n);
                    chars.next();
                }
                tokens.push((Token::Name(name), offset));
            }
            _ => return Err(syntax(offset, &format!("unexpected character '{}'", c))),
        }
    }
    Ok(tokens)
}

/// Deepest nesting of predicates and function arguments a parser accepts
const MAX_NESTING: usize = 32;

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<(Token, usize)>,
    position: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.position + ahead).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).map(|(token, _)| token.clone());
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> EvaluationResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {}", what)))
        }
    }

    fn error(&self, reason: &str) -> EvaluationError {
        let offset = self
            .tokens
            .get(self.position)
            .map_or(self.source.len(), |(_, offset)| *offset);
        EvaluationError::Syntax {
            expression: self.source.to_string(),
            offset,
            reason: reason.to_string(),
        }
    }

    fn parse_expr(&mut self) -> EvaluationResult<Expr> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(&format!("expression nests deeper than {} levels", MAX_NESTING)));
        }
        self.depth += 1;
        let expr = self.parse_operand();
        self.depth -= 1;
        expr
    }

    fn parse_operand(&mut self) -> EvaluationResult<Expr> {
        match self.peek() {
            Some(Token::Literal(_)) => match self.advance() {
                Some(Token::Literal(text)) => Ok(Expr::Literal(text)),
                _ => Err(self.error("expected a literal")),
            },
            Some(Token::Number(_)) => match self.advance() {
                Some(Token::Number(number)) => Ok(Expr::Literal(number.to_string())),
                _ => Err(self.error("expected a number")),
            },
            Some(Token::Name(name))
                if self.peek_at(1) == Some(&Token::LParen) && name != "text" && name != "node" =>
            {
                self.parse_call()
            }
            _ => Ok(Expr::Path(self.parse_path()?)),
        }
    }

    fn parse_call(&mut self) -> EvaluationResult<Expr> {
        let function = match self.advance() {
            Some(Token::Name(name)) => match name.as_str() {
                "concat" => Function::Concat,
                "normalize-space" => Function::NormalizeSpace,
                "string" => Function::String,
                _ => {
                    self.position -= 1;
                    return Err(self.error(&format!("unsupported function '{}'", name)));
                }
            },
            _ => return Err(self.error("expected a function name")),
        };
        self.expect(&Token::LParen, "'('")?;

        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.eat(&Token::RParen) {
                    break;
                }
                self.expect(&Token::Comma, "',' or ')'")?;
            }
        }

        let arity_ok = match function {
            Function::Concat => args.len() >= 2,
            Function::NormalizeSpace | Function::String => args.len() <= 1,
        };
        if !arity_ok {
            self.position -= 1;
            return Err(self.error("wrong number of function arguments"));
        }
        Ok(Expr::Call(function, args))
    }

    fn parse_path(&mut self) -> EvaluationResult<PathExpr> {
        let mut steps = Vec::new();
        let absolute = match self.peek() {
            Some(Token::Slash) => {
                self.advance();
                if !self.at_step_start() {
                    return Ok(PathExpr {
                        absolute: true,
                        steps,
                    });
                }
                true
            }
            Some(Token::DoubleSlash) => {
                self.advance();
                steps.push(PathStep::descendant_or_self());
                true
            }
            _ => false,
        };

        steps.push(self.parse_step()?);
        loop {
            if self.eat(&Token::Slash) {
                steps.push(self.parse_step()?);
            } else if self.eat(&Token::DoubleSlash) {
                steps.push(PathStep::descendant_or_self());
                steps.push(self.parse_step()?);
            } else {
                break;
            }
        }
        Ok(PathExpr { absolute, steps })
    }

    fn at_step_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Name(_) | Token::At | Token::Star | Token::Dot)
        )
    }

    fn parse_step(&mut self) -> EvaluationResult<PathStep> {
        let start = self.position;
        let (axis, test) = match self.advance() {
            Some(Token::Dot) => (Axis::SelfNode, NodeTest::AnyNode),
            Some(Token::Star) => (Axis::Child, NodeTest::AnyName),
            Some(Token::At) => match self.advance() {
                Some(Token::Name(name)) => (Axis::Attribute, NodeTest::Name(name)),
                Some(Token::Star) => (Axis::Attribute, NodeTest::AnyName),
                _ => {
                    self.position = start + 1;
                    return Err(self.error("expected an attribute name after '@'"));
                }
            },
            Some(Token::Name(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.advance();
                    self.expect(&Token::RParen, "')'")?;
                    match name.as_str() {
                        "text" => (Axis::Child, NodeTest::Text),
                        "node" => (Axis::Child, NodeTest::AnyNode),
                        _ => return Err(self.error(&format!("unsupported node test '{}()'", name))),
                    }
                } else {
                    (Axis::Child, NodeTest::Name(name))
                }
            }
            _ => {
                self.position = start;
                return Err(self.error("expected a location step"));
            }
        };

        let mut predicates = Vec::new();
        while self.eat(&Token::LBracket) {
            predicates.push(self.parse_predicate()?);
            self.expect(&Token::RBracket, "']'")?;
        }
        Ok(PathStep {
            axis,
            test,
            predicates,
        })
    }

    fn parse_predicate(&mut self) -> EvaluationResult<Predicate> {
        if let (Some(Token::Number(number)), Some(Token::RBracket)) = (self.peek(), self.peek_at(1)) {
            let number = *number;
            if number == 0 {
                return Err(self.error("positions are 1-based"));
            }
            self.advance();
            return Ok(Predicate::Position(number));
        }
        if let (Some(Token::Name(name)), Some(Token::LParen), Some(Token::RParen)) =
            (self.peek(), self.peek_at(1), self.peek_at(2))
            && name == "last"
        {
            self.position += 3;
            return Ok(Predicate::Last);
        }

        let left = self.parse_expr()?;
        let negated = if self.eat(&Token::Eq) {
            false
        } else if self.eat(&Token::NotEq) {
            true
        } else {
            return Ok(Predicate::Test(left));
        };
        let right = self.parse_expr()?;
        Ok(Predicate::Compare {
            left,
            negated,
            right,
        })
    }
}
