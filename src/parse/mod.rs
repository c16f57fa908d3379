//! Text front end for rule files.
//!
//! ```text
//! # comment
//! rule <id> [(enabled|disabled)]:
//!     conflict <kind> <kind> on <target>, ...
//!     max_level <kind> <level>
//!     surcharge <kind>, ... [add <n>] [mul <n>]
//!     restrict <kind> [allow <target>, ...] [block <target>, ...]
//!     custom <validator> [(<key> = <value>, ...)]
//! ```

mod error;
mod grammar;
mod parser;

pub use error::ParseError;
pub use parser::ParsedRuleFile;

/// Parse rule DSL text into a [`ParsedRuleFile`] without compiling it.
///
/// # Errors
///
/// Returns [`ParseError`] with the position of the first invalid token.
pub fn parse(input: &str) -> Result<ParsedRuleFile, ParseError> {
    use winnow::Parser;
    let parsed = grammar::parse_rule_file
        .parse(input)
        .map_err(|e| ParseError::at(input, e.offset(), e.inner().to_string()))?;
    log::trace!(
        "parsed {} rules ({} disabled)",
        parsed.rules.len(),
        parsed.disabled_count()
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_disabled_rules() {
        let parsed = parse(
            "rule a (disabled):\n    max_level sharpness 6\nrule b:\n    max_level smite 6",
        )
        .unwrap();
        assert_eq!(parsed.rule_ids(), vec!["a", "b"]);
        assert_eq!(parsed.disabled_count(), 1);
    }

    #[test]
    fn error_points_at_bad_line() {
        let err = parse("rule a:\n    max_level sharpness 6\nrule b:\n    teleport x").unwrap_err();
        assert_eq!(err.line, 4);
    }
}
