use crate::{Tags, TypeTag, Value};

/// How a field holds its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `T`
    Scalar,
    /// `Option<T>`
    Optional,
    /// `Vec<T>`, decoded element by element
    Sequence,
    /// `[T; N]`
    Array(usize),
}

/// One field of a record, as written in the struct declaration.
///
/// `ty` is the element type for sequences and arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: &'static str,
    pub shape: Shape,
    pub ty: TypeTag,
    pub tags: Tags,
    pub doc: Option<&'static str>,
}

impl FieldDecl {
    pub fn new(name: &'static str, shape: Shape, ty: TypeTag) -> FieldDecl {
        FieldDecl { name, shape, ty, tags: Tags::new(), doc: None }
    }

    pub fn tag(mut self, key: &'static str, literal: &'static str) -> FieldDecl {
        self.tags = self.tags.with(key, literal);
        self
    }

    pub fn marker(mut self, key: &'static str) -> FieldDecl {
        self.tags = self.tags.with_marker(key);
        self
    }

    pub fn doc(mut self, doc: &'static str) -> FieldDecl {
        self.doc = Some(doc);
        self
    }
}

/// A struct that flags or positional arguments are bound into.
///
/// Implemented by `#[derive(Record)]`. Slots are indices into [`Record::fields`].
pub trait Record: Default + 'static {
    fn fields() -> Vec<FieldDecl>;

    /// Stores `value` into the field at `slot`. Sequences append, arrays
    /// write element `index`. Gives the value back if it has the wrong type.
    fn bind(&mut self, slot: usize, index: usize, value: Value) -> Result<(), Value>;

    /// The current value of a scalar or optional field.
    fn current(&self, slot: usize) -> Option<Value>;

    /// Copies the field at `slot` from `other`.
    fn adopt(&mut self, slot: usize, other: &Self);
}

impl Record for () {
    fn fields() -> Vec<FieldDecl> {
        Vec::new()
    }

    fn bind(&mut self, _slot: usize, _index: usize, value: Value) -> Result<(), Value> {
        Err(value)
    }

    fn current(&self, _slot: usize) -> Option<Value> {
        None
    }

    fn adopt(&mut self, _slot: usize, _other: &()) {}
}
