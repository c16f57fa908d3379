use winnow::ascii::till_line_ending;
use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat, separated};
use winnow::error::{ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use crate::{ModifierKind, Rule, RuleKind, Surcharge, TargetKind, Value};

use super::parser::ParsedRuleFile;

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Identifiers ------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == ':'
        }),
    )
        .take()
        .parse_next(input)
}

fn ident_list<'i>(input: &mut &'i str) -> ModalResult<Vec<&'i str>> {
    separated(1.., preceded(ws, ident), (ws, ',')).parse_next(input)
}

// -- Values -----------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn number_text<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        opt('-'),
        take_while(1.., |c: char| c.is_ascii_digit()),
        opt(('.', take_while(1.., |c: char| c.is_ascii_digit()))),
    )
        .take()
        .parse_next(input)
}

fn number(input: &mut &str) -> ModalResult<f64> {
    ws.parse_next(input)?;
    number_text
        .try_map(str::parse::<f64>)
        .context(StrContext::Expected(StrContextValue::Description("number")))
        .parse_next(input)
}

fn numeric_value(input: &mut &str) -> ModalResult<Value> {
    let text = number_text.parse_next(input)?;
    if text.contains('.') {
        let f: f64 = text.parse().map_err(|_| ErrMode::from_input(input).cut())?;
        Ok(Value::Float(f))
    } else {
        let i: i64 = text.parse().map_err(|_| ErrMode::from_input(input).cut())?;
        Ok(Value::Int(i))
    }
}

fn value(input: &mut &str) -> ModalResult<Value> {
    ws.parse_next(input)?;
    alt((
        string_literal.map(Value::String),
        "true".value(Value::Bool(true)),
        "false".value(Value::Bool(false)),
        numeric_value,
    ))
    .context(StrContext::Expected(StrContextValue::Description("value")))
    .parse_next(input)
}

fn level(input: &mut &str) -> ModalResult<u32> {
    ws.parse_next(input)?;
    take_while(1.., |c: char| c.is_ascii_digit())
        .try_map(str::parse::<u32>)
        .context(StrContext::Expected(StrContextValue::Description("level")))
        .parse_next(input)
}

// -- Directives -------------------------------------------------------------

fn conflict_body(input: &mut &str) -> ModalResult<RuleKind> {
    let a = preceded(ws, ident).parse_next(input)?;
    let b = preceded(ws, ident).parse_next(input)?;
    (ws, "on").parse_next(input)?;
    let targets = ident_list.parse_next(input)?;
    Ok(RuleKind::Conflict {
        kinds: (ModifierKind::from(a), ModifierKind::from(b)),
        targets: targets.into_iter().map(TargetKind::from).collect(),
    })
}

fn max_level_body(input: &mut &str) -> ModalResult<RuleKind> {
    let kind = preceded(ws, ident).parse_next(input)?;
    let level = level.parse_next(input)?;
    Ok(RuleKind::MaxLevel {
        kind: kind.into(),
        level,
    })
}

fn surcharge_body(input: &mut &str) -> ModalResult<RuleKind> {
    let kinds = ident_list.parse_next(input)?;
    let additive = opt(preceded((ws, "add"), cut_err(number))).parse_next(input)?;
    let multiplicative = opt(preceded((ws, "mul"), cut_err(number))).parse_next(input)?;
    Ok(RuleKind::Surcharge {
        kinds: kinds.into_iter().map(ModifierKind::from).collect(),
        surcharge: Surcharge::new(additive.unwrap_or(0.0), multiplicative.unwrap_or(1.0)),
    })
}

fn restrict_body(input: &mut &str) -> ModalResult<RuleKind> {
    let kind = preceded(ws, ident).parse_next(input)?;
    let allow = opt(preceded((ws, "allow"), cut_err(ident_list))).parse_next(input)?;
    let block = opt(preceded((ws, "block"), cut_err(ident_list))).parse_next(input)?;
    let to_targets =
        |list: Vec<&str>| -> Vec<TargetKind> { list.into_iter().map(TargetKind::from).collect() };
    Ok(RuleKind::Restrict {
        kind: kind.into(),
        allow: allow.map(to_targets),
        block: block.map(to_targets),
    })
}

fn param(input: &mut &str) -> ModalResult<(String, Value)> {
    let key = preceded(ws, ident).parse_next(input)?;
    (ws, cut_err('=')).parse_next(input)?;
    let value = cut_err(value).parse_next(input)?;
    Ok((key.to_owned(), value))
}

fn custom_body(input: &mut &str) -> ModalResult<RuleKind> {
    let validator = preceded(ws, ident).parse_next(input)?;
    let params: Option<Vec<(String, Value)>> = opt(delimited(
        (ws, '('),
        separated(0.., param, (ws, ',')),
        (ws, cut_err(')')),
    ))
    .parse_next(input)?;
    Ok(RuleKind::Custom {
        validator: validator.to_owned(),
        params: params.unwrap_or_default(),
    })
}

fn directive(input: &mut &str) -> ModalResult<RuleKind> {
    ws.parse_next(input)?;
    alt((
        preceded("conflict", cut_err(conflict_body)),
        preceded("max_level", cut_err(max_level_body)),
        preceded("surcharge", cut_err(surcharge_body)),
        preceded("restrict", cut_err(restrict_body)),
        preceded("custom", cut_err(custom_body)),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "conflict, max_level, surcharge, restrict or custom",
    )))
    .parse_next(input)
}

// -- Rule definitions -------------------------------------------------------

fn state_annotation(input: &mut &str) -> ModalResult<bool> {
    delimited(
        (ws, '(', ws),
        cut_err(alt(("enabled".value(true), "disabled".value(false)))),
        (ws, cut_err(')')),
    )
    .parse_next(input)
}

fn rule_def(input: &mut &str) -> ModalResult<Rule> {
    ws.parse_next(input)?;
    "rule".parse_next(input)?;
    ws.parse_next(input)?;

    let id = cut_err(ident)
        .context(StrContext::Expected(StrContextValue::Description("rule id")))
        .parse_next(input)?;

    let enabled = opt(state_annotation).parse_next(input)?;

    ws.parse_next(input)?;
    cut_err(':').parse_next(input)?;

    let kind = cut_err(directive)
        .context(StrContext::Expected(StrContextValue::Description(
            "rule body",
        )))
        .parse_next(input)?;

    Ok(Rule {
        id: id.to_owned(),
        enabled: enabled.unwrap_or(true),
        kind,
    })
}

// -- Top-level parser -------------------------------------------------------

pub fn parse_rule_file(input: &mut &str) -> ModalResult<ParsedRuleFile> {
    let rules: Vec<Rule> = repeat(0.., rule_def).parse_next(input)?;
    ws.parse_next(input)?;
    Ok(ParsedRuleFile { rules })
}
