#[derive(Debug)]
pub(crate) struct Record {
    pub(crate) name: String,
    pub(crate) fields: Vec<Field>,
}

#[derive(Debug)]
pub(crate) struct Field {
    /// As written, including a possible `r#`.
    pub(crate) ident: String,
    /// Doc lines, still in string-literal escaped form.
    pub(crate) doc: Option<String>,
    pub(crate) tags: Vec<Tag>,
    pub(crate) shape: Shape,
    /// The element type for sequences, optionals and arrays.
    pub(crate) ty: String,
}

impl Field {
    pub(crate) fn name(&self) -> &str {
        self.ident.strip_prefix("r#").unwrap_or(&self.ident)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Shape {
    Scalar,
    Optional,
    Sequence,
    Array(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tag {
    pub(crate) key: String,
    pub(crate) value: Option<String>,
}
