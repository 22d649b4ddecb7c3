//! Frontend: convert IR text to IR.
//!
//! The text form is line-oriented:
//!
//! ```plain
//! ; comment
//! function @name(%a, %b) {
//! entry:
//!   %x = load %a
//!   %c = icmp slt %x, 10
//!   br %c, label %then, label %else
//! then:
//!   %i = phi [%x, %entry], [0, %else]
//!   ...
//! }
//! ```
//!
//! Values may be used before the line that defines them; labels are
//! collected up front so blocks keep their textual order.

use crate::errors::FrontendError;
use crate::ir::*;
use crate::ops::Opcode;
use anyhow::{bail, Result};
use fxhash::FxHashMap;
use log::{debug, trace};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token<'a> {
    /// `%name`
    Local(&'a str),
    /// `@name`
    Global(&'a str),
    Word(&'a str),
    Int(i64),
    Comma,
    Equals,
    Colon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$'
}

fn syntax(line: usize, message: impl Into<String>) -> FrontendError {
    FrontendError::Syntax {
        line,
        message: message.into(),
    }
}

fn tokenize(line_no: usize, line: &str) -> Result<Vec<Token<'_>>, FrontendError> {
    let mut tokens = vec![];
    let mut rest = line;
    loop {
        rest = rest.trim_start();
        let c = match rest.chars().next() {
            Some(c) => c,
            None => break,
        };
        let punct = match c {
            ',' => Some(Token::Comma),
            '=' => Some(Token::Equals),
            ':' => Some(Token::Colon),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '{' => Some(Token::LBrace),
            _ => None,
        };
        if let Some(token) = punct {
            tokens.push(token);
            rest = &rest[1..];
            continue;
        }

        let (sigil, body) = match c {
            '%' | '@' => (Some(c), &rest[1..]),
            _ => (None, rest),
        };
        let is_int = sigil.is_none() && (c == '-' || c.is_ascii_digit());
        let len = body
            .char_indices()
            .find(|&(i, ch)| !(is_name_char(ch) || (is_int && i == 0 && ch == '-')))
            .map(|(i, _)| i)
            .unwrap_or(body.len());
        if len == 0 {
            return Err(syntax(line_no, format!("unexpected character '{}'", c)));
        }
        let text = &body[..len];
        rest = &body[len..];
        tokens.push(match sigil {
            Some('%') => Token::Local(text),
            Some(_) => Token::Global(text),
            None if is_int => Token::Int(
                text.parse()
                    .map_err(|_| syntax(line_no, format!("bad integer '{}'", text)))?,
            ),
            None => Token::Word(text),
        });
    }
    Ok(tokens)
}

fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Parse a whole module.
pub fn text_to_ir(text: &str) -> Result<Module> {
    let mut module = Module::empty();
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, strip_comment(line).trim()))
        .filter(|(_, line)| !line.is_empty());

    while let Some((line_no, line)) = lines.next() {
        let tokens = tokenize(line_no, line)?;
        let (name, args) = parse_header(line_no, &tokens)?;
        if module.func_by_name(name).is_some() {
            bail!(FrontendError::Redefinition {
                line: line_no,
                name: format!("@{}", name),
            });
        }

        let mut body_lines = vec![];
        loop {
            match lines.next() {
                None => bail!(syntax(
                    line_no,
                    format!("function @{} is never closed", name)
                )),
                Some((_, "}")) => break,
                Some((n, l)) => body_lines.push((n, tokenize(n, l)?)),
            }
        }

        let body = FunctionParser::new(name, line_no, &args)?.parse(&body_lines)?;
        debug!(
            "parsed @{}: {} blocks, {} values",
            body.name,
            body.blocks.len(),
            body.values.len()
        );
        module.funcs.push(body);
    }

    Ok(module)
}

/// `function @name(%a, %b) {`
fn parse_header<'a>(
    line_no: usize,
    tokens: &[Token<'a>],
) -> Result<(&'a str, Vec<&'a str>), FrontendError> {
    let (name, rest) = match tokens {
        [Token::Word("function"), Token::Global(name), Token::LParen, rest @ ..] => (*name, rest),
        _ => return Err(syntax(line_no, "expected `function @name(...) {`")),
    };
    let mut args = vec![];
    let mut rest = rest;
    loop {
        match rest {
            [Token::RParen, Token::LBrace] => break,
            [Token::Local(arg), Token::Comma, tail @ ..] => {
                args.push(*arg);
                rest = tail;
            }
            [Token::Local(arg), tail @ ..] => {
                args.push(*arg);
                rest = tail;
            }
            _ => return Err(syntax(line_no, "malformed parameter list")),
        }
    }
    Ok((name, args))
}

struct FunctionParser<'a> {
    line_no: usize,
    body: FunctionBody,
    values: FxHashMap<&'a str, Value>,
    blocks: FxHashMap<&'a str, Block>,
}

impl<'a> FunctionParser<'a> {
    fn new(name: &str, line_no: usize, args: &[&'a str]) -> Result<Self, FrontendError> {
        let mut parser = FunctionParser {
            line_no,
            body: FunctionBody::new(name),
            values: FxHashMap::default(),
            blocks: FxHashMap::default(),
        };
        for &arg in args {
            let value = parser.body.add_arg();
            parser.body.set_value_name(value, arg);
            if parser.values.insert(arg, value).is_some() {
                return Err(FrontendError::Redefinition {
                    line: line_no,
                    name: format!("%{}", arg),
                });
            }
        }
        Ok(parser)
    }

    fn parse(mut self, lines: &[(usize, Vec<Token<'a>>)]) -> Result<FunctionBody, FrontendError> {
        // Labels first, so that forward branches resolve and blocks
        // stay in textual order.
        for (line_no, tokens) in lines {
            if let [Token::Word(label), Token::Colon] = tokens.as_slice() {
                let label = *label;
                let block = if self.blocks.is_empty() {
                    self.body.entry
                } else {
                    self.body.add_block()
                };
                self.body.set_block_name(block, label);
                if self.blocks.insert(label, block).is_some() {
                    return Err(FrontendError::Redefinition {
                        line: *line_no,
                        name: format!("%{}", label),
                    });
                }
            }
        }

        let mut current = None;
        for (line_no, tokens) in lines {
            if let [Token::Word(label), Token::Colon] = tokens.as_slice() {
                current = self.blocks.get(*label).copied();
                continue;
            }
            let block = match current {
                Some(block) => block,
                None => return Err(syntax(*line_no, "instruction outside of a block")),
            };
            self.parse_inst(*line_no, block, tokens)?;
        }
        if self.blocks.is_empty() {
            return Err(syntax(
                self.line_no,
                format!("function @{} has no blocks", self.body.name),
            ));
        }

        let mut unresolved = self
            .values
            .iter()
            .filter(|&(_, &value)| matches!(self.body.values[value], ValueDef::Placeholder))
            .collect::<Vec<_>>();
        unresolved.sort_by_key(|&(_, &value)| value);
        if let Some((name, _)) = unresolved.first() {
            return Err(FrontendError::UndefinedValue {
                func: self.body.name.clone(),
                name: name.to_string(),
            });
        }

        self.body.recompute_edges();
        Ok(self.body)
    }

    fn parse_inst(
        &mut self,
        line_no: usize,
        block: Block,
        tokens: &[Token<'a>],
    ) -> Result<(), FrontendError> {
        let (result, tokens) = match tokens {
            [Token::Local(name), Token::Equals, rest @ ..] => (Some(*name), rest),
            _ => (None, tokens),
        };
        let (opcode, mut rest) = match tokens {
            [Token::Word(name), Token::Word(pred), rest @ ..] if Opcode::is_compare_mnemonic(name) => {
                let opcode = Opcode::compare(name, pred).ok_or_else(|| {
                    syntax(line_no, format!("unknown {} predicate '{}'", name, pred))
                })?;
                (opcode, rest)
            }
            [Token::Word(name), rest @ ..] => (Opcode::from_mnemonic(name), rest),
            _ => return Err(syntax(line_no, "expected an instruction")),
        };

        let mut args = vec![];
        while !rest.is_empty() {
            rest = self.parse_operand(line_no, rest, &mut args)?;
            match rest {
                [] => {}
                [Token::Comma, tail @ ..] if !tail.is_empty() => rest = tail,
                _ => return Err(syntax(line_no, "expected ',' between operands")),
            }
        }
        trace!("line {}: {} {:?}", line_no, opcode, args);

        let data = InstData::new(opcode, args, result.is_some());
        match result {
            None => {
                self.body.add_inst(block, data);
            }
            Some(name) => match self.values.get(name) {
                Some(&value) if matches!(self.body.values[value], ValueDef::Placeholder) => {
                    self.body.define_placeholder(value, data);
                    self.body.append_to_block(block, value);
                }
                Some(_) => {
                    return Err(FrontendError::Redefinition {
                        line: line_no,
                        name: format!("%{}", name),
                    })
                }
                None => {
                    let value = self.body.add_inst(block, data);
                    self.body.set_value_name(value, name);
                    self.values.insert(name, value);
                }
            },
        }
        Ok(())
    }

    fn value(&mut self, name: &'a str) -> Value {
        if let Some(&value) = self.values.get(name) {
            return value;
        }
        let value = self.body.add_placeholder();
        self.body.set_value_name(value, name);
        self.values.insert(name, value);
        value
    }

    fn block(&self, name: &str) -> Result<Block, FrontendError> {
        self.blocks
            .get(name)
            .copied()
            .ok_or_else(|| FrontendError::UndefinedBlock {
                func: self.body.name.clone(),
                name: name.to_owned(),
            })
    }

    /// Parse one operand from the front of `tokens`, returning the
    /// remaining tokens. Phi pairs push two operands.
    fn parse_operand<'t>(
        &mut self,
        line_no: usize,
        tokens: &'t [Token<'a>],
        args: &mut Vec<Operand>,
    ) -> Result<&'t [Token<'a>], FrontendError> {
        match tokens {
            [Token::LBracket, rest @ ..] => {
                let rest = self.parse_scalar(line_no, rest, args)?;
                match rest {
                    [Token::Comma, Token::Local(pred), Token::RBracket, tail @ ..] => {
                        args.push(Operand::Block(self.block(pred)?));
                        Ok(tail)
                    }
                    _ => Err(syntax(line_no, "expected `[value, %label]`")),
                }
            }
            _ => self.parse_scalar(line_no, tokens, args),
        }
    }

    /// A single operand; brackets do not nest.
    fn parse_scalar<'t>(
        &mut self,
        line_no: usize,
        tokens: &'t [Token<'a>],
        args: &mut Vec<Operand>,
    ) -> Result<&'t [Token<'a>], FrontendError> {
        match tokens {
            [Token::LBracket, ..] => Err(syntax(line_no, "nested `[` in operand")),
            [Token::Word("label"), Token::Local(name), rest @ ..] => {
                args.push(Operand::Block(self.block(name)?));
                Ok(rest)
            }
            [Token::Local(name), rest @ ..] => {
                let value = self.value(*name);
                args.push(Operand::Value(value));
                Ok(rest)
            }
            [Token::Int(i), rest @ ..] => {
                args.push(Operand::Const(Constant::Int(*i)));
                Ok(rest)
            }
            [Token::Word("null"), rest @ ..] => {
                args.push(Operand::Const(Constant::Null));
                Ok(rest)
            }
            [Token::Word("undef"), rest @ ..] => {
                args.push(Operand::Const(Constant::Undef));
                Ok(rest)
            }
            [Token::Global(name), rest @ ..] => {
                args.push(Operand::Const(Constant::Global(name.to_string())));
                Ok(rest)
            }
            _ => Err(syntax(line_no, "expected an operand")),
        }
    }
}
