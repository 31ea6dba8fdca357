use std::{fmt, mem};

#[cfg(not(test))]
use proc_macro::{Delimiter, TokenStream, TokenTree};
#[cfg(test)]
use proc_macro2::{Delimiter, TokenStream, TokenTree};

use crate::ast;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub(crate) struct Error {
    msg: String,
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.msg, f)
    }
}

macro_rules! format_err {
    ($($tt:tt)*) => {
        Error { msg: format!($($tt)*) }
    };
}

macro_rules! bail {
    ($($tt:tt)*) => {
        return Err(format_err!($($tt)*))
    };
}

pub(crate) fn record(ts: TokenStream) -> Result<ast::Record> {
    let p = &mut Parser::new(ts);
    while p.eat_punct('#') {
        p.skip_group(Delimiter::Bracket)?;
    }
    visibility(p);
    if p.at_keyword("enum") || p.at_keyword("union") {
        bail!("only structs can be records")
    }
    p.expect_keyword("struct")?;
    let name = p.expect_ident()?;
    if p.at_punct('<') {
        bail!("generic records are not supported: `{name}`")
    }

    let mut fields = Vec::new();
    if !p.eat_punct(';') {
        if p.at_delim(Delimiter::Parenthesis) {
            bail!("tuple structs can't be records: `{name}`, name the fields")
        }
        p.enter_delim(Delimiter::Brace)?;
        while !p.end() {
            fields.push(field(p)?);
        }
        p.exit_delim()?;
    }
    Ok(ast::Record { name, fields })
}

fn field(p: &mut Parser) -> Result<ast::Field> {
    let mut doc = Vec::new();
    let mut tags = Vec::new();
    while p.eat_punct('#') {
        p.enter_delim(Delimiter::Bracket)?;
        if p.eat_keyword("doc") {
            p.expect_punct('=')?;
            let line = p.expect_string()?;
            doc.push(line.strip_prefix(' ').map(str::to_string).unwrap_or(line));
        } else if p.eat_keyword("arg") {
            p.enter_delim(Delimiter::Parenthesis)?;
            while !p.end() {
                tags.push(tag(p)?);
                if !p.eat_punct(',') && !p.end() {
                    bail!("expected `,` between `arg` keys")
                }
            }
            p.exit_delim()?;
        } else {
            p.skip_rest();
        }
        p.exit_delim()?;
    }
    visibility(p);
    let ident = p.expect_ident()?;
    p.expect_punct(':')?;
    let ty = p.take_until_comma();
    p.eat_punct(',');
    if ty.is_empty() {
        bail!("expected a type for `{ident}`")
    }
    let (shape, ty) = shape(ty)?;
    let doc = if doc.is_empty() { None } else { Some(doc.join("\\n")) };
    Ok(ast::Field { ident, doc, tags, shape, ty })
}

fn tag(p: &mut Parser) -> Result<ast::Tag> {
    let key = p.expect_ident()?;
    if !p.eat_punct('=') {
        return Ok(ast::Tag { key, value: None });
    }
    let negative = p.eat_punct('-');
    let value = match p.ts.pop() {
        Some(TokenTree::Literal(lit)) => {
            let text = lit.to_string();
            if text.starts_with('"') {
                str_lit_value(text)
            } else if text.starts_with(|c: char| c.is_ascii_digit()) {
                text
            } else {
                bail!("unsupported literal for `{key}`: `{text}`")
            }
        }
        Some(TokenTree::Ident(ident)) if ident.to_string() == "true" => "true".to_string(),
        Some(TokenTree::Ident(ident)) if ident.to_string() == "false" => "false".to_string(),
        _ => bail!("expected a literal value for `{key}`"),
    };
    let value = if negative { format!("-{value}") } else { value };
    Ok(ast::Tag { key, value: Some(value) })
}

fn visibility(p: &mut Parser) {
    if p.eat_keyword("pub") && p.at_delim(Delimiter::Parenthesis) {
        p.ts.pop();
    }
}

/// Splits `Option<T>`, `Vec<T>` and `[T; N]` into a shape and element type.
/// `Vec<u8>` stays a scalar.
fn shape(ty: Vec<TokenTree>) -> Result<(ast::Shape, String)> {
    if let [TokenTree::Group(g)] = ty.as_slice() {
        if g.delimiter() == Delimiter::Bracket {
            let inner = g.stream().into_iter().collect::<Vec<_>>();
            let semi = inner.iter().position(|it| is_punct(it, ';'));
            let Some(semi) = semi else { bail!("slices can't be record fields") };
            let len = render(&inner[semi + 1..]);
            return Ok((ast::Shape::Array(len), render(&inner[..semi])));
        }
    }

    let open = ty.iter().position(|it| is_punct(it, '<'));
    if let (Some(open), Some(last)) = (open, ty.last()) {
        if open > 0 && is_punct(last, '>') {
            let wrapper = ty[open - 1].to_string();
            let inner = render(&ty[open + 1..ty.len() - 1]);
            match wrapper.as_str() {
                "Option" => return Ok((ast::Shape::Optional, inner)),
                "Vec" if inner != "u8" => return Ok((ast::Shape::Sequence, inner)),
                _ => (),
            }
        }
    }
    Ok((ast::Shape::Scalar, render(&ty)))
}

fn is_punct(tt: &TokenTree, punct: char) -> bool {
    matches!(tt, TokenTree::Punct(p) if p.as_char() == punct)
}

fn render(tts: &[TokenTree]) -> String {
    let mut buf = String::new();
    let mut prev_word = false;
    for tt in tts {
        let word = matches!(tt, TokenTree::Ident(_) | TokenTree::Literal(_));
        if word && prev_word {
            buf.push(' ');
        }
        buf.push_str(&tt.to_string());
        prev_word = word;
    }
    buf
}

struct Parser {
    stack: Vec<Vec<TokenTree>>,
    ts: Vec<TokenTree>,
}

impl Parser {
    fn new(ts: TokenStream) -> Self {
        let mut ts = ts.into_iter().collect::<Vec<_>>();
        ts.reverse();
        Self { stack: Vec::new(), ts }
    }

    fn enter_delim(&mut self, delimiter: Delimiter) -> Result<()> {
        match self.ts.pop() {
            Some(TokenTree::Group(g)) if g.delimiter() == delimiter => {
                let mut ts = g.stream().into_iter().collect::<Vec<_>>();
                ts.reverse();
                let ts = mem::replace(&mut self.ts, ts);
                self.stack.push(ts);
            }
            _ => bail!("expected {}", open_char(delimiter)),
        }
        Ok(())
    }
    fn exit_delim(&mut self) -> Result<()> {
        if !self.end() {
            let next = self.ts.pop().map(|it| it.to_string()).unwrap_or_default();
            bail!("unexpected `{next}`")
        }
        match self.stack.pop() {
            Some(ts) => self.ts = ts,
            None => bail!("unbalanced delimiters"),
        }
        Ok(())
    }
    fn at_delim(&self, delimiter: Delimiter) -> bool {
        matches!(self.ts.last(), Some(TokenTree::Group(g)) if g.delimiter() == delimiter)
    }
    fn skip_group(&mut self, delimiter: Delimiter) -> Result<()> {
        self.enter_delim(delimiter)?;
        self.skip_rest();
        self.exit_delim()
    }
    fn skip_rest(&mut self) {
        self.ts.clear();
    }
    fn end(&mut self) -> bool {
        self.ts.last().is_none()
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<()> {
        if !self.eat_keyword(kw) {
            bail!("expected `{kw}`")
        }
        Ok(())
    }
    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.ts.pop();
            true
        } else {
            false
        }
    }
    fn at_keyword(&mut self, kw: &str) -> bool {
        match self.ts.last() {
            Some(TokenTree::Ident(ident)) => ident.to_string() == kw,
            _ => false,
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.ts.pop() {
            Some(TokenTree::Ident(ident)) => Ok(ident.to_string()),
            next => {
                let next = next.map(|it| it.to_string()).unwrap_or_default();
                bail!("expected a name, got: `{next}`")
            }
        }
    }

    fn expect_punct(&mut self, punct: char) -> Result<()> {
        if !self.eat_punct(punct) {
            bail!("expected `{punct}`")
        }
        Ok(())
    }
    fn eat_punct(&mut self, punct: char) -> bool {
        if self.at_punct(punct) {
            self.ts.pop();
            true
        } else {
            false
        }
    }
    fn at_punct(&self, punct: char) -> bool {
        matches!(self.ts.last(), Some(tt) if is_punct(tt, punct))
    }

    /// Takes tokens up to the next `,` outside of angle brackets.
    fn take_until_comma(&mut self) -> Vec<TokenTree> {
        let mut res = Vec::new();
        let mut depth = 0usize;
        while let Some(tt) = self.ts.last() {
            if depth == 0 && is_punct(tt, ',') {
                break;
            }
            if is_punct(tt, '<') {
                depth += 1;
            } else if is_punct(tt, '>') {
                depth = depth.saturating_sub(1);
            }
            res.extend(self.ts.pop());
        }
        res
    }

    fn expect_string(&mut self) -> Result<String> {
        match self.ts.pop() {
            Some(TokenTree::Literal(lit)) if lit.to_string().starts_with('"') => {
                Ok(str_lit_value(lit.to_string()))
            }
            _ => bail!("expected a string"),
        }
    }
}

fn open_char(delimiter: Delimiter) -> &'static str {
    match delimiter {
        Delimiter::Parenthesis => "`(`",
        Delimiter::Brace => "`{`",
        Delimiter::Bracket => "`[`",
        Delimiter::None => "a group",
    }
}

/// Strips the quotes, leaving escapes as written: the value is only ever
/// pasted back into a string literal.
fn str_lit_value(lit: String) -> String {
    let lit = lit.strip_prefix('"').unwrap_or(&lit);
    lit.strip_suffix('"').unwrap_or(lit).to_string()
}
