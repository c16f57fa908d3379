use thiserror::Error;

/// A syntax error in rule DSL text.
///
/// `line` and `column` are 1-based and point at the first character the
/// grammar could not accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    message: String,
}

impl ParseError {
    /// Locate byte `offset` of `input`.
    pub(crate) fn at(input: &str, offset: usize, message: impl Into<String>) -> Self {
        let consumed = input.get(..offset).unwrap_or(input);
        let line = consumed.matches('\n').count() + 1;
        let column = consumed
            .rsplit('\n')
            .next()
            .map_or(0, |tail| tail.chars().count())
            + 1;
        let message = message.into();
        Self {
            line,
            column,
            message: if message.is_empty() {
                "invalid rule syntax".to_owned()
            } else {
                message
            },
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_on_first_line() {
        let err = ParseError::at("rule x", 5, "expected `:`");
        assert_eq!((err.line, err.column), (1, 6));
        assert_eq!(
            err.to_string(),
            "parse error at line 1, column 6: expected `:`"
        );
    }

    #[test]
    fn position_after_newlines() {
        let input = "rule a:\n    max_level x 2\nrule b:\n    oops";
        let offset = input.find("oops").unwrap();
        let err = ParseError::at(input, offset, "");
        assert_eq!((err.line, err.column), (4, 5));
        assert_eq!(err.message(), "invalid rule syntax");
    }
}
