//! Recursive-descent parser for clauses and queries.
//!
//! Grammar:
//! ```text
//! Program := Rule*
//! Rule    := Goal `.` | Goal `:-` Body
//! Body    := Goal (`,` Goal)* `.`
//! Goal    := id `(` Part (`,` Part)* `)` | `fail` | `!`
//! Part    := var | number | string | atom | id `(` Part (`,` Part)* `)`
//!          | `[` `]` | `[` Part (`,` Part)* (`|` var)? `]`
//! ```
//! List syntax desugars to `cons/2` chains ending in the empty-list atom;
//! string literals become lists of character-code numbers.

use super::lexer::{ParseError, Token, Tokeniser};
use crate::data::{Part, Rule};

/// Parses a whole program into clauses.
pub fn parse_program(source: &str) -> Result<Vec<Rule>, ParseError> {
    let mut tk = Tokeniser::new(source)?;
    let mut rules = Vec::new();
    while !matches!(tk.current(), Token::Eof) {
        rules.push(parse_rule(&mut tk)?);
    }
    Ok(rules)
}

/// Parses a query: a `.`-terminated conjunction of goals.
pub fn parse_query(source: &str) -> Result<Vec<Part>, ParseError> {
    let mut tk = Tokeniser::new(source)?;
    parse_body(&mut tk)
}

fn parse_rule(tk: &mut Tokeniser) -> Result<Rule, ParseError> {
    let head = parse_goal(tk)?;
    if accept_punc(tk, ".")? {
        return Ok(Rule::fact(head));
    }
    expect_punc(tk, ":-")?;
    let body = parse_body(tk)?;
    Ok(Rule::new(head, body))
}

fn parse_body(tk: &mut Tokeniser) -> Result<Vec<Part>, ParseError> {
    let mut goals = Vec::new();
    loop {
        goals.push(parse_goal(tk)?);
        if accept_punc(tk, ".")? {
            return Ok(goals);
        }
        expect_punc(tk, ",")?;
    }
}

fn parse_goal(tk: &mut Tokeniser) -> Result<Part, ParseError> {
    let name = match tk.current() {
        Token::Id(_) => match tk.bump()? {
            Token::Id(name) => name,
            _ => return Err(tk.unexpected()),
        },
        _ => return Err(tk.unexpected()),
    };

    // fail and ! stand alone, without parentheses
    if (name == "fail" || name == "!") && !matches!(tk.current(), Token::Punc("(")) {
        return Ok(Part::app(name, Vec::new()));
    }

    expect_punc(tk, "(")?;
    let args = parse_args(tk)?;
    Ok(Part::app(name, args))
}

fn parse_args(tk: &mut Tokeniser) -> Result<Vec<Part>, ParseError> {
    let mut args = Vec::new();
    loop {
        args.push(parse_part(tk)?);
        if accept_punc(tk, ")")? {
            return Ok(args);
        }
        expect_punc(tk, ",")?;
    }
}

fn parse_part(tk: &mut Tokeniser) -> Result<Part, ParseError> {
    match tk.current() {
        Token::Var(_) => match tk.bump()? {
            Token::Var(name) => Ok(Part::var(name)),
            _ => Err(tk.unexpected()),
        },
        Token::Num(_) => match tk.bump()? {
            Token::Num(n) => Ok(Part::number(n)),
            _ => Err(tk.unexpected()),
        },
        Token::Str(_) => match tk.bump()? {
            Token::Str(s) => Ok(string_codes(&s)),
            _ => Err(tk.unexpected()),
        },
        Token::Punc("[") => {
            tk.bump()?;
            parse_list(tk)
        }
        Token::Id(_) => {
            let name = match tk.bump()? {
                Token::Id(name) => name,
                _ => return Err(tk.unexpected()),
            };
            if accept_punc(tk, "(")? {
                let args = parse_args(tk)?;
                Ok(Part::app(name, args))
            } else {
                Ok(Part::text(name))
            }
        }
        _ => Err(tk.unexpected()),
    }
}

fn parse_list(tk: &mut Tokeniser) -> Result<Part, ParseError> {
    if accept_punc(tk, "]")? {
        return Ok(Part::nil());
    }
    let mut items = Vec::new();
    loop {
        items.push(parse_part(tk)?);
        if !accept_punc(tk, ",")? {
            break;
        }
    }
    let tail = if accept_punc(tk, "|")? {
        match tk.current() {
            Token::Var(_) => match tk.bump()? {
                Token::Var(name) => Part::var(name),
                _ => return Err(tk.unexpected()),
            },
            _ => return Err(tk.unexpected()),
        }
    } else {
        Part::nil()
    };
    expect_punc(tk, "]")?;
    Ok(Part::list(items, tail))
}

fn string_codes(text: &str) -> Part {
    let codes = text.chars().map(|c| Part::number(c as u32 as f64)).collect();
    Part::list(codes, Part::nil())
}

fn accept_punc(tk: &mut Tokeniser, which: &str) -> Result<bool, ParseError> {
    if matches!(tk.current(), Token::Punc(p) if *p == which) {
        tk.bump()?;
        Ok(true)
    } else {
        Ok(false)
    }
}

fn expect_punc(tk: &mut Tokeniser, which: &str) -> Result<(), ParseError> {
    if accept_punc(tk, which)? {
        Ok(())
    } else {
        Err(tk.unexpected())
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_program, parse_query};
    use crate::data::Part;

    #[test]
    fn parses_facts_and_rules() {
        let rules = parse_program(
            "parent(tom, bob).\n\
             grandparent(X, Z) :- parent(X, Y), parent(Y, Z).",
        )
        .expect("parses");
        assert_eq!(rules.len(), 2);
        assert!(rules[0].is_fact());
        assert_eq!(rules[0].head.to_string(), "parent(tom, bob)");
        let body = rules[1].body.as_ref().expect("has body");
        assert_eq!(body.len(), 2);
        assert_eq!(body[1].to_string(), "parent(Y, Z)");
    }

    #[test]
    fn cut_and_fail_need_no_parentheses() {
        let rules = parse_program("not(G) :- call(G), !, fail.\nnot(_).").expect("parses");
        let body = rules[0].body.as_ref().expect("has body");
        assert_eq!(body[1], Part::app("!", vec![]));
        assert_eq!(body[2], Part::app("fail", vec![]));
    }

    #[test]
    fn list_sugar_desugars_to_cons_chains() {
        let rules = parse_program("p([1, 2 | T]).\nq([]).").expect("parses");
        assert_eq!(
            rules[0].head,
            Part::app(
                "p",
                vec![Part::list(vec![Part::number(1.0), Part::number(2.0)], Part::var("T"))],
            ),
        );
        assert_eq!(rules[1].head, Part::app("q", vec![Part::nil()]));
    }

    #[test]
    fn list_tail_must_be_a_variable() {
        let err = parse_program("p([1 | 2]).").expect_err("rejects");
        assert!(err.message.contains("unexpected token"));
    }

    #[test]
    fn strings_become_code_lists() {
        let rules = parse_program("s(\"ab\").").expect("parses");
        assert_eq!(
            rules[0].head,
            Part::app(
                "s",
                vec![Part::list(vec![Part::number(97.0), Part::number(98.0)], Part::nil())],
            ),
        );
    }

    #[test]
    fn quoted_atoms_keep_their_text() {
        let rules = parse_program("likes('mary jane', X).").expect("parses");
        assert_eq!(
            rules[0].head,
            Part::app("likes", vec![Part::text("mary jane"), Part::var("X")]),
        );
    }

    #[test]
    fn operators_parse_in_prefix_position() {
        let goals = parse_query("is(X, +(1, *(2, 3))).").expect("parses");
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].to_string(), "is(X, +(1, *(2, 3)))");
    }

    #[test]
    fn queries_are_goal_conjunctions() {
        let goals = parse_query("parent(X, Y), parent(Y, Z).").expect("parses");
        assert_eq!(goals.len(), 2);
    }

    #[test]
    fn missing_terminator_reports_eof() {
        let err = parse_query("parent(X, Y)").expect_err("rejects");
        assert_eq!(err.message, "unexpected end of file");
    }

    #[test]
    fn unexpected_token_is_named() {
        let err = parse_program("p(a) q(b).").expect_err("rejects");
        assert!(err.message.contains("`q`"));
    }

    #[test]
    fn negative_numbers_and_floats() {
        let goals = parse_query("p(-3, 2.5).").expect("parses");
        assert_eq!(
            goals[0],
            Part::app("p", vec![Part::number(-3.0), Part::number(2.5)]),
        );
    }
}
