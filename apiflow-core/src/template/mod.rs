//! Tokenizer for `{{scope.path}}` interpolation tokens.
//!
//! This is the single definition of the token grammar: the interpolator, the validator and
//! the dependency planner all go through [`parse_template`].

mod token;

pub use token::{Scope, Token, TokenError, RESERVED_SCOPES};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Token(Token),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    pub segments: Vec<Segment>,
}

impl Template {
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Token(t) => Some(t),
            Segment::Literal(_) => None,
        })
    }

    /// Step ids referenced by this template, in order of appearance (may repeat).
    pub fn step_references(&self) -> impl Iterator<Item = &str> {
        self.tokens().filter_map(|t| t.scope.step_id())
    }

    pub fn starts_with_token(&self) -> bool {
        matches!(self.segments.first(), Some(Segment::Token(_)))
    }
}

/// Lenient scan used at execution time: anything that is not a well-formed token
/// (including an unterminated `{{`) is kept as literal text.
pub fn parse_template(input: &str) -> Template {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = input;

    while let Some(open) = rest.find(OPEN) {
        let after_open = &rest[open + OPEN.len()..];
        let Some(close) = after_open.find(CLOSE) else {
            break;
        };

        // `{{ a {{env.x}}`: the token starts at the last opener before the closer.
        let inner_start = after_open[..close]
            .rfind(OPEN)
            .map(|i| i + OPEN.len())
            .unwrap_or(0);
        let token_start = open + OPEN.len() + inner_start - OPEN.len();
        let inner = &after_open[inner_start..close];
        let token_end = open + OPEN.len() + close + CLOSE.len();
        let raw = &rest[token_start..token_end];

        literal.push_str(&rest[..token_start]);
        match Token::parse(inner, raw) {
            Ok(token) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Token(token));
            }
            Err(_) => literal.push_str(raw),
        }
        rest = &rest[token_end..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Template { segments }
}

/// Strict check used by the validator: every `{{` must be closed and hold a valid token.
pub fn check_template(input: &str) -> Result<Template, TemplateError> {
    let mut rest = input;
    while let Some(open) = rest.find(OPEN) {
        let after_open = &rest[open + OPEN.len()..];
        let Some(close) = after_open.find(CLOSE) else {
            return Err(TemplateError::Unclosed);
        };
        let inner = &after_open[..close];
        if inner.contains(OPEN) {
            return Err(TemplateError::Nested);
        }
        let raw = &rest[open..open + OPEN.len() + close + CLOSE.len()];
        Token::parse(inner, raw)?;
        rest = &after_open[close + CLOSE.len()..];
    }
    Ok(parse_template(input))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unclosed interpolation token (missing '}}}}')")]
    Unclosed,
    #[error("nested '{{{{' inside an interpolation token")]
    Nested,
    #[error(transparent)]
    InvalidToken(#[from] TokenError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(s: &str) -> Segment {
        Segment::Literal(s.to_string())
    }

    #[test]
    fn plain_text_is_one_literal() {
        let t = parse_template("https://example.com/users?x={y}");
        assert_eq!(t.segments, vec![literal("https://example.com/users?x={y}")]);
    }

    #[test]
    fn tokens_and_literals_alternate() {
        let t = parse_template("{{env.base}}/users/{{input.id}}?v=1");
        assert_eq!(t.segments.len(), 4);
        assert!(t.starts_with_token());
        assert_eq!(t.segments[1], literal("/users/"));
        assert_eq!(t.segments[3], literal("?v=1"));
    }

    #[test]
    fn unterminated_opener_stays_literal() {
        let t = parse_template("prefix {{env.base");
        assert_eq!(t.segments, vec![literal("prefix {{env.base")]);
    }

    #[test]
    fn invalid_token_stays_literal() {
        let t = parse_template("a{{ not valid }}b");
        assert_eq!(t.segments, vec![literal("a{{ not valid }}b")]);
    }

    #[test]
    fn last_opener_before_closer_wins() {
        let t = parse_template("{{ x {{env.host}}");
        assert_eq!(t.segments.len(), 2);
        assert_eq!(t.segments[0], literal("{{ x "));
        match &t.segments[1] {
            Segment::Token(tok) => assert_eq!(tok.raw, "{{env.host}}"),
            other => panic!("expected token, got {other:?}"),
        }
    }

    #[test]
    fn step_references_are_listed() {
        let t = parse_template("{{login.body.token}}:{{env.x}}:{{cart.body.id}}");
        assert_eq!(t.step_references().collect::<Vec<_>>(), vec!["login", "cart"]);
    }

    #[test]
    fn strict_check_reports_problems() {
        assert_eq!(check_template("{{env.a"), Err(TemplateError::Unclosed));
        assert_eq!(check_template("{{ {{env.a}}"), Err(TemplateError::Nested));
        assert!(matches!(
            check_template("{{env}}"),
            Err(TemplateError::InvalidToken(TokenError::MissingPath(_)))
        ));
        assert!(check_template("{{env.a}}/{{step-1.body.items[0]}}").is_ok());
    }
}
