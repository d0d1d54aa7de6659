use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{DarcError, DarcResult, Identity};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A boolean rule over identity strings.
///
/// An expression is a byte string in a small grammar: terms are identity
/// strings such as `"ed25519:<hex>"`, combined with `&` and `|` and grouped
/// with parentheses. `&` binds tighter than `|`:
///
/// ```text
/// ed25519:aa... & (darc:bb... | x509ec:cc...)
/// ```
///
/// Evaluation is parameterized by an oracle deciding whether a single term is
/// satisfied. A term the oracle does not recognize is simply unsatisfied; only
/// a malformed expression is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression(Vec<u8>);

/// One node of a parsed expression.
enum Node<'a> {
    Term(&'a str),
    And(Box<Node<'a>>, Box<Node<'a>>),
    Or(Box<Node<'a>>, Box<Node<'a>>),
}

/// One token of the expression grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Term(&'a str),
    And,
    Or,
    Open,
    Close,
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

//--------------------------------------------------------------------------------------------------
// Methods: Expression
//--------------------------------------------------------------------------------------------------

impl Expression {
    /// Creates an expression from raw bytes, without validating them.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Creates the disjunction of the given identities: satisfied when any
    /// one of them is. This is the default shape of evolution rules.
    pub fn or_of<'a>(ids: impl IntoIterator<Item = &'a Identity>) -> Self {
        Self::joined(ids, " | ")
    }

    /// Creates the conjunction of the given identities: satisfied only when
    /// all of them are.
    pub fn and_of<'a>(ids: impl IntoIterator<Item = &'a Identity>) -> Self {
        Self::joined(ids, " & ")
    }

    fn joined<'a>(ids: impl IntoIterator<Item = &'a Identity>, sep: &str) -> Self {
        let terms: Vec<String> = ids.into_iter().map(Identity::to_string).collect();
        Self(terms.join(sep).into_bytes())
    }

    /// Returns the raw expression bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Evaluates the expression with an oracle that decides each term.
    pub fn evaluate<F>(&self, oracle: F) -> DarcResult<bool>
    where
        F: Fn(&str) -> bool,
    {
        let source = std::str::from_utf8(&self.0)
            .map_err(|_| self.malformed("expression is not valid UTF-8"))?;

        let mut parser = Parser::new(source);
        let node = parser.parse_or().map_err(|reason| self.malformed(&reason))?;
        if let Some(token) = parser.peek() {
            return Err(self.malformed(&format!("unexpected trailing {}", describe(token))));
        }

        Ok(node.evaluate(&oracle))
    }

    /// Evaluates the expression with the set-membership oracle: a term is
    /// satisfied iff it equals one of the given identity strings.
    pub fn matches<T>(&self, ids: &[T]) -> DarcResult<bool>
    where
        T: AsRef<str>,
    {
        self.evaluate(|term| ids.iter().any(|id| id.as_ref() == term))
    }

    fn malformed(&self, reason: &str) -> DarcError {
        DarcError::ExpressionError(format!("'{}': {}", self, reason))
    }
}

//--------------------------------------------------------------------------------------------------
// Methods: Node and Parser
//--------------------------------------------------------------------------------------------------

impl Node<'_> {
    fn evaluate<F>(&self, oracle: &F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        match self {
            Node::Term(term) => oracle(term),
            Node::And(left, right) => left.evaluate(oracle) && right.evaluate(oracle),
            Node::Or(left, right) => left.evaluate(oracle) || right.evaluate(oracle),
        }
    }
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        let mut tokens = Vec::new();
        let mut rest = source.trim_start();
        while !rest.is_empty() {
            let (token, len) = match rest.as_bytes()[0] {
                b'&' => (Token::And, 1),
                b'|' => (Token::Or, 1),
                b'(' => (Token::Open, 1),
                b')' => (Token::Close, 1),
                _ => {
                    let len = rest
                        .find(|c: char| c.is_whitespace() || "&|()".contains(c))
                        .unwrap_or(rest.len());
                    (Token::Term(&rest[..len]), len)
                }
            };
            tokens.push(token);
            rest = rest[len..].trim_start();
        }
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token<'a>> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: Token<'a>) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn parse_or(&mut self) -> Result<Node<'a>, String> {
        let mut node = self.parse_and()?;
        while self.eat(Token::Or) {
            node = Node::Or(Box::new(node), Box::new(self.parse_and()?));
        }
        Ok(node)
    }

    fn parse_and(&mut self) -> Result<Node<'a>, String> {
        let mut node = self.parse_primary()?;
        while self.eat(Token::And) {
            node = Node::And(Box::new(node), Box::new(self.parse_primary()?));
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> Result<Node<'a>, String> {
        match self.advance() {
            Some(Token::Term(term)) => Ok(Node::Term(term)),
            Some(Token::Open) => {
                let node = self.parse_or()?;
                if !self.eat(Token::Close) {
                    return Err("unbalanced parenthesis".to_string());
                }
                Ok(node)
            }
            Some(token) => Err(format!("unexpected {}", describe(token))),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

fn describe(token: Token<'_>) -> String {
    match token {
        Token::Term(term) => format!("term '{}'", term),
        Token::And => "'&'".to_string(),
        Token::Or => "'|'".to_string(),
        Token::Open => "'('".to_string(),
        Token::Close => "')'".to_string(),
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl From<&str> for Expression {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<&Identity> for Expression {
    fn from(identity: &Identity) -> Self {
        Self(identity.to_string().into_bytes())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(expr: &str, ids: &[&str]) -> DarcResult<bool> {
        Expression::from(expr).matches(ids)
    }

    #[test]
    fn test_expression_single_term() -> anyhow::Result<()> {
        assert!(matches("ed25519:aa", &["ed25519:aa"])?);
        assert!(!matches("ed25519:aa", &["ed25519:bb"])?);
        assert!(!matches("ed25519:aa", &[])?);

        Ok(())
    }

    #[test]
    fn test_expression_or() -> anyhow::Result<()> {
        let expr = "ed25519:aa | ed25519:bb | darc:cc";

        assert!(matches(expr, &["ed25519:bb"])?);
        assert!(matches(expr, &["darc:cc"])?);
        assert!(!matches(expr, &["ed25519:dd"])?);

        Ok(())
    }

    #[test]
    fn test_expression_and() -> anyhow::Result<()> {
        let expr = "ed25519:aa & ed25519:bb";

        assert!(matches(expr, &["ed25519:aa", "ed25519:bb"])?);
        assert!(!matches(expr, &["ed25519:aa"])?);
        assert!(!matches(expr, &["ed25519:bb"])?);

        Ok(())
    }

    #[test]
    fn test_expression_precedence_and_parens() -> anyhow::Result<()> {
        // `&` binds tighter: a | b & c  ==  a | (b & c)
        assert!(matches("ed25519:aa | ed25519:bb & ed25519:cc", &["ed25519:aa"])?);
        assert!(!matches("(ed25519:aa | ed25519:bb) & ed25519:cc", &["ed25519:aa"])?);
        assert!(matches(
            "(ed25519:aa | ed25519:bb) & ed25519:cc",
            &["ed25519:bb", "ed25519:cc"],
        )?);

        Ok(())
    }

    #[test]
    fn test_expression_unknown_term_is_not_an_error() -> anyhow::Result<()> {
        assert!(!matches("rsa:whatever", &["ed25519:aa"])?);

        Ok(())
    }

    #[test]
    fn test_expression_malformed_input() {
        for expr in ["", "&", "ed25519:aa |", "(ed25519:aa", "ed25519:aa )", "a b"] {
            let result = matches(expr, &["ed25519:aa"]);
            assert!(
                matches!(result, Err(DarcError::ExpressionError(_))),
                "expected parse error for '{}'",
                expr,
            );
        }
    }

    #[test]
    fn test_expression_rejects_invalid_utf8() {
        let expr = Expression::new(vec![0xff, 0xfe]);
        assert!(matches!(
            expr.matches(&["ed25519:aa"]),
            Err(DarcError::ExpressionError(_))
        ));
    }

    #[test]
    fn test_expression_or_of_and_of() -> anyhow::Result<()> {
        let a = Identity::Darc(crate::DarcId::new([1; 32]));
        let b = Identity::Darc(crate::DarcId::new([2; 32]));

        let or = Expression::or_of([&a, &b]);
        assert!(or.matches(&[a.to_string()])?);
        assert!(or.matches(&[b.to_string()])?);

        let and = Expression::and_of([&a, &b]);
        assert!(!and.matches(&[a.to_string()])?);
        assert!(and.matches(&[a.to_string(), b.to_string()])?);

        Ok(())
    }
}
