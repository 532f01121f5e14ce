//! Entity type declarations
//!
//! An [`EntityType`] describes one kind of record: its type name and the
//! attributes a record of that type may be created with. Reference fields
//! additionally name the entity type they point at, which is what drives
//! reverse-relation lookups at registration time.
//!
//! The names `id`, `created` and `updated` are reserved: they are assigned
//! by the store and can never be declared or supplied by callers.

/// Attribute names assigned by the store rather than by callers
pub const RESERVED_ATTRIBUTES: [&str; 3] = ["id", "created", "updated"];

/// Check whether an attribute name is reserved for the store
pub fn is_reserved_attribute(name: &str) -> bool {
    RESERVED_ATTRIBUTES.contains(&name)
}

/// A single field declaration on an entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDef {
    /// Plain attribute holding any value
    Attribute {
        /// Attribute name
        name: String,
    },
    /// Reference to a record of another entity type
    Reference {
        /// Attribute name
        name: String,
        /// Entity type the reference points at
        target: String,
    },
}

impl FieldDef {
    /// Declare a plain attribute
    pub fn attribute(name: impl Into<String>) -> Self {
        FieldDef::Attribute { name: name.into() }
    }

    /// Declare a reference to another entity type
    pub fn reference(name: impl Into<String>, target: impl Into<String>) -> Self {
        FieldDef::Reference {
            name: name.into(),
            target: target.into(),
        }
    }

    /// The declared attribute name
    pub fn name(&self) -> &str {
        match self {
            FieldDef::Attribute { name } => name,
            FieldDef::Reference { name, .. } => name,
        }
    }

    /// Whether this field is a reference
    pub fn is_reference(&self) -> bool {
        matches!(self, FieldDef::Reference { .. })
    }

    /// The referenced entity type, for reference fields
    pub fn target(&self) -> Option<&str> {
        match self {
            FieldDef::Reference { target, .. } => Some(target),
            FieldDef::Attribute { .. } => None,
        }
    }
}

/// Per-type descriptor: type name plus declared fields
///
/// Built with a small chained builder and handed to `Database::register`,
/// which validates the declarations:
///
/// ```
/// use reposit_core::EntityType;
///
/// let book = EntityType::new("Book")
///     .attribute("title")
///     .attribute("pages")
///     .reference("author", "Author");
/// assert!(book.declares("title"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    name: String,
    fields: Vec<FieldDef>,
}

impl EntityType {
    /// Start declaring an entity type with the given name
    pub fn new(name: impl Into<String>) -> Self {
        EntityType {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Declare a plain attribute
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldDef::attribute(name));
        self
    }

    /// Declare a reference to a record of another entity type
    pub fn reference(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.fields.push(FieldDef::reference(name, target));
        self
    }

    /// The entity type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All declared fields, in declaration order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Look up a declared field by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Whether the type declares an attribute with this name
    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// All reference fields, in declaration order
    pub fn references(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_reference())
    }
}
