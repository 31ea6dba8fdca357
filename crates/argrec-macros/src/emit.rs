use std::fmt::Write;

use crate::ast;

macro_rules! w {
    ($($tt:tt)*) => {
        drop(write!($($tt)*))
    };
}

pub(crate) fn emit(record: &ast::Record) -> String {
    let mut buf = String::new();
    w!(buf, "#[automatically_derived]\n");
    w!(buf, "impl ::argrec::Record for {} {{\n", record.name);
    emit_fields(&mut buf, record);
    emit_bind(&mut buf, record);
    emit_current(&mut buf, record);
    emit_adopt(&mut buf, record);
    w!(buf, "}}\n");
    buf
}

fn emit_fields(buf: &mut String, record: &ast::Record) {
    w!(buf, "fn fields() -> ::std::vec::Vec<::argrec::FieldDecl> {{\n");
    w!(buf, "::std::vec![\n");
    for field in &record.fields {
        let shape = match &field.shape {
            ast::Shape::Scalar => "Scalar".to_string(),
            ast::Shape::Optional => "Optional".to_string(),
            ast::Shape::Sequence => "Sequence".to_string(),
            ast::Shape::Array(len) => format!("Array({len})"),
        };
        w!(
            buf,
            "::argrec::FieldDecl::new(\"{}\", ::argrec::Shape::{shape}, {})",
            field.name(),
            bind_ty(field, "TYPE")
        );
        for tag in &field.tags {
            match &tag.value {
                Some(value) => w!(buf, ".tag(\"{}\", \"{value}\")", tag.key),
                None => w!(buf, ".marker(\"{}\")", tag.key),
            }
        }
        if let Some(doc) = &field.doc {
            w!(buf, ".doc(\"{doc}\")");
        }
        w!(buf, ",\n");
    }
    w!(buf, "]\n");
    w!(buf, "}}\n\n");
}

fn emit_bind(buf: &mut String, record: &ast::Record) {
    let uses_index = record.fields.iter().any(|it| matches!(it.shape, ast::Shape::Array(_)));
    let index = if uses_index { "index" } else { "_index" };
    let slot = if record.fields.is_empty() { "_slot" } else { "slot" };
    w!(
        buf,
        "fn bind(&mut self, {slot}: usize, {index}: usize, value: ::argrec::Value) \
         -> ::std::result::Result<(), ::argrec::Value> {{\n"
    );
    if record.fields.is_empty() {
        w!(buf, "::std::result::Result::Err(value)\n");
        w!(buf, "}}\n\n");
        return;
    }
    w!(buf, "match slot {{\n");
    for (slot, field) in record.fields.iter().enumerate() {
        let decoded = format!("{}(value)?", bind_ty(field, "from_value"));
        let ident = &field.ident;
        match field.shape {
            ast::Shape::Scalar => w!(buf, "{slot} => self.{ident} = {decoded},\n"),
            ast::Shape::Optional => {
                w!(buf, "{slot} => self.{ident} = ::std::option::Option::Some({decoded}),\n")
            }
            ast::Shape::Sequence => w!(buf, "{slot} => self.{ident}.push({decoded}),\n"),
            ast::Shape::Array(_) => w!(buf, "{slot} => self.{ident}[index] = {decoded},\n"),
        }
    }
    w!(buf, "_ => return ::std::result::Result::Err(value),\n");
    w!(buf, "}}\n");
    w!(buf, "::std::result::Result::Ok(())\n");
    w!(buf, "}}\n\n");
}

fn emit_current(buf: &mut String, record: &ast::Record) {
    w!(buf, "fn current(&self, slot: usize) -> ::std::option::Option<::argrec::Value> {{\n");
    w!(buf, "match slot {{\n");
    for (slot, field) in record.fields.iter().enumerate() {
        let to_value = bind_ty(field, "to_value");
        let ident = &field.ident;
        match field.shape {
            ast::Shape::Scalar => {
                w!(buf, "{slot} => ::std::option::Option::Some({to_value}(&self.{ident})),\n")
            }
            ast::Shape::Optional => w!(buf, "{slot} => self.{ident}.as_ref().map({to_value}),\n"),
            ast::Shape::Sequence | ast::Shape::Array(_) => (),
        }
    }
    w!(buf, "_ => ::std::option::Option::None,\n");
    w!(buf, "}}\n");
    w!(buf, "}}\n\n");
}

fn emit_adopt(buf: &mut String, record: &ast::Record) {
    let other = if record.fields.is_empty() { "_other" } else { "other" };
    w!(buf, "fn adopt(&mut self, slot: usize, {other}: &Self) {{\n");
    w!(buf, "match slot {{\n");
    for (slot, field) in record.fields.iter().enumerate() {
        let ident = &field.ident;
        w!(buf, "{slot} => self.{ident} = ::std::clone::Clone::clone(&other.{ident}),\n");
    }
    w!(buf, "_ => (),\n");
    w!(buf, "}}\n");
    w!(buf, "}}\n");
}

fn bind_ty(field: &ast::Field, item: &str) -> String {
    format!("<{} as ::argrec::Bind>::{item}", field.ty)
}
