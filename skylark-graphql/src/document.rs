//! A small GraphQL executable-document AST and its printer.
//!
//! Every builder in this crate assembles a [`Document`] out of typed nodes and then prints it.
//! Building a tree instead of concatenating strings means a builder can only ever produce
//! well-formed selections: a [`Field`] always has a legal name, an [`InlineFragment`] always has a
//! type condition, and an [`Argument`] always has a [`Value`] that knows how to print itself.
//!
//! The printer is a pure function of the tree. Two identical trees always print to byte-identical
//! strings, which is what makes documents usable as cache keys and lets the test suite assert on
//! exact output.
//!
//! ```
//! # use skylark_graphql::document::{Document, Field, OperationKind, Value, VariableDefinition};
//! let doc = Document::new(OperationKind::Query, "SL_UI_GET_EPISODE")
//!     .variable(VariableDefinition::new("uid", "String!"))
//!     .select(
//!         Field::new("getEpisode")
//!             .alias("getObject")
//!             .arg("uid", Value::var("uid"))
//!             .select(Field::new("uid")),
//!     );
//! assert_eq!(
//!     doc.to_string(),
//!     "query SL_UI_GET_EPISODE($uid: String!) {\n  getObject: getEpisode(uid: $uid) {\n    uid\n  }\n}"
//! );
//! ```

use derive_more::{Display, From};
use itertools::Itertools;
use std::fmt::{self, Display, Formatter, Write};

/// The kind of operation a [`Document`] executes.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperationKind {
    #[display(fmt = "query")]
    Query,
    #[display(fmt = "mutation")]
    Mutation,
}

/// A GraphQL document containing exactly one named operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    kind: OperationKind,
    name: String,
    variables: Vec<VariableDefinition>,
    selection_set: SelectionSet,
}

impl Document {
    /// An operation of `kind` named `name`, with no variables and an empty selection set.
    pub fn new(kind: OperationKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            variables: vec![],
            selection_set: SelectionSet::default(),
        }
    }

    /// Shorthand for a [`Query`](OperationKind::Query) document.
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(OperationKind::Query, name)
    }

    /// Shorthand for a [`Mutation`](OperationKind::Mutation) document.
    pub fn mutation(name: impl Into<String>) -> Self {
        Self::new(OperationKind::Mutation, name)
    }

    /// Declare a variable.
    pub fn variable(mut self, var: VariableDefinition) -> Self {
        self.variables.push(var);
        self
    }

    /// Declare several variables, in order.
    pub fn variables(mut self, vars: impl IntoIterator<Item = VariableDefinition>) -> Self {
        self.variables.extend(vars);
        self
    }

    /// Add a top-level selection.
    pub fn select(mut self, selection: impl Into<Selection>) -> Self {
        self.selection_set.push(selection);
        self
    }

    /// Add several top-level selections, in order.
    pub fn select_all<I>(mut self, selections: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Selection>,
    {
        self.selection_set.extend(selections);
        self
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn selection_set(&self) -> &SelectionSet {
        &self.selection_set
    }

    /// The declared variables, in declaration order.
    pub fn variable_definitions(&self) -> &[VariableDefinition] {
        &self.variables
    }

    /// The names of all the variables this document declares.
    ///
    /// This is the variables contract of the document: a caller executing it may supply any of
    /// these, and must supply the ones listed by [`required_variables`](Self::required_variables).
    pub fn variable_names(&self) -> impl '_ + Iterator<Item = &str> {
        self.variables.iter().map(|var| var.name.as_str())
    }

    /// The variables a caller must supply: those with a non-null type and no default.
    pub fn required_variables(&self) -> impl '_ + Iterator<Item = &str> {
        self.variables
            .iter()
            .filter(|var| var.is_required())
            .map(|var| var.name.as_str())
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)?;
        if !self.variables.is_empty() {
            write!(f, "({})", self.variables.iter().join(", "))?;
        }
        f.write_char(' ')?;
        self.selection_set.print(f, 0)
    }
}

/// A variable declared by an operation, like `$uid: String!` or `$limit: Int = 50`.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinition {
    name: String,
    ty: String,
    default: Option<Value>,
}

impl VariableDefinition {
    /// A variable named `name` (without the `$`) of GraphQL type `ty`.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            default: None,
        }
    }

    /// Give the variable a default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &str {
        &self.ty
    }

    /// Must a caller supply this variable?
    pub fn is_required(&self) -> bool {
        self.ty.ends_with('!') && self.default.is_none()
    }
}

impl Display for VariableDefinition {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "${}: {}", self.name, self.ty)?;
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

/// An ordered list of selections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionSet(Vec<Selection>);

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, selection: impl Into<Selection>) {
        self.0.push(selection.into());
    }

    pub fn extend<I>(&mut self, selections: I)
    where
        I: IntoIterator,
        I::Item: Into<Selection>,
    {
        self.0.extend(selections.into_iter().map(Into::into));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selection> {
        self.0.iter()
    }

    /// The response keys of the direct field children of this selection set.
    pub fn response_keys(&self) -> impl '_ + Iterator<Item = &str> {
        self.0.iter().filter_map(|selection| match selection {
            Selection::Field(field) => Some(field.response_key()),
            Selection::InlineFragment(_) => None,
        })
    }

    fn print(&self, f: &mut Formatter, depth: usize) -> fmt::Result {
        f.write_str("{\n")?;
        for selection in &self.0 {
            selection.print(f, depth + 1)?;
            f.write_char('\n')?;
        }
        indent(f, depth)?;
        f.write_char('}')
    }
}

impl<S: Into<Selection>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// One entry in a selection set.
#[derive(Clone, Debug, PartialEq, From)]
pub enum Selection {
    Field(Field),
    InlineFragment(InlineFragment),
}

impl Selection {
    fn print(&self, f: &mut Formatter, depth: usize) -> fmt::Result {
        match self {
            Self::Field(field) => field.print(f, depth),
            Self::InlineFragment(fragment) => fragment.print(f, depth),
        }
    }
}

impl From<&str> for Selection {
    fn from(name: &str) -> Self {
        Self::Field(Field::new(name))
    }
}

/// A field selection, optionally aliased, with arguments and a nested selection set.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    alias: Option<String>,
    name: String,
    arguments: Vec<Argument>,
    selection_set: SelectionSet,
}

impl Field {
    /// A leaf field with no alias and no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            alias: None,
            name: name.into(),
            arguments: vec![],
            selection_set: SelectionSet::default(),
        }
    }

    /// Rename the field in the response.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Add an argument.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.push(Argument::new(name, value));
        self
    }

    /// Add an argument only if `value` is [`Some`].
    pub fn opt_arg(self, name: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.arg(name, value),
            None => self,
        }
    }

    /// Add a nested selection.
    pub fn select(mut self, selection: impl Into<Selection>) -> Self {
        self.selection_set.push(selection);
        self
    }

    /// Add several nested selections, in order.
    pub fn select_all<I>(mut self, selections: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Selection>,
    {
        self.selection_set.extend(selections);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The key under which this field appears in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn selection_set(&self) -> &SelectionSet {
        &self.selection_set
    }

    fn print(&self, f: &mut Formatter, depth: usize) -> fmt::Result {
        indent(f, depth)?;
        if let Some(alias) = &self.alias {
            write!(f, "{alias}: ")?;
        }
        f.write_str(&self.name)?;
        if !self.arguments.is_empty() {
            write!(f, "({})", self.arguments.iter().join(", "))?;
        }
        if !self.selection_set.is_empty() {
            f.write_char(' ')?;
            self.selection_set.print(f, depth)?;
        }
        Ok(())
    }
}

/// An inline fragment, `... on Type { ... }`, used to select from polymorphic results.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineFragment {
    type_condition: String,
    selection_set: SelectionSet,
}

impl InlineFragment {
    pub fn on(type_condition: impl Into<String>) -> Self {
        Self {
            type_condition: type_condition.into(),
            selection_set: SelectionSet::default(),
        }
    }

    pub fn select(mut self, selection: impl Into<Selection>) -> Self {
        self.selection_set.push(selection);
        self
    }

    pub fn select_all<I>(mut self, selections: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Selection>,
    {
        self.selection_set.extend(selections);
        self
    }

    pub fn type_condition(&self) -> &str {
        &self.type_condition
    }

    pub fn selection_set(&self) -> &SelectionSet {
        &self.selection_set
    }

    fn print(&self, f: &mut Formatter, depth: usize) -> fmt::Result {
        indent(f, depth)?;
        write!(f, "... on {} ", self.type_condition)?;
        self.selection_set.print(f, depth)
    }
}

/// A named argument to a field.
#[derive(Clone, Debug, Display, PartialEq)]
#[display(fmt = "{}: {}", name, value)]
pub struct Argument {
    name: String,
    value: Value,
}

impl Argument {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A GraphQL input value.
#[derive(Clone, Debug, PartialEq, From)]
pub enum Value {
    /// A reference to an operation variable, printed as `$name`.
    #[from(ignore)]
    Variable(String),
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    #[from(ignore)]
    Null,
    /// An enum literal, printed bare.
    #[from(ignore)]
    Enum(String),
    List(Vec<Value>),
    /// An input object. Entries keep their insertion order.
    #[from(ignore)]
    Object(Vec<(String, Value)>),
}

impl Value {
    /// A reference to the variable `name`.
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// An enum literal.
    pub fn enum_value(name: impl Into<String>) -> Self {
        Self::Enum(name.into())
    }

    /// An input object built from ordered entries.
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// A list of string literals.
    pub fn strings<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::List(items.into_iter().map(|s| Self::String(s.into())).collect())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Int(n.into())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Variable(name) => write!(f, "${name}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "{}", escape_string(s)),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Null => f.write_str("null"),
            Self::Enum(name) => f.write_str(name),
            Self::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Self::Object(entries) => write!(
                f,
                "{{{}}}",
                entries
                    .iter()
                    .map(|(name, value)| format!("{name}: {value}"))
                    .join(", ")
            ),
        }
    }
}

/// Quote and escape a string literal.
///
/// GraphQL string escapes are a subset of JSON's, so a JSON-encoded string is a valid GraphQL
/// string literal.
fn escape_string(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

fn indent(f: &mut Formatter, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str("  ")?;
    }
    Ok(())
}

/// Is `name` a legal GraphQL name (`[_A-Za-z][_0-9A-Za-z]*`)?
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
