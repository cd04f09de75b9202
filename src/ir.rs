use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB", alias = "TD")]
    TopDown,
    #[serde(rename = "LR")]
    LeftRight,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "TD" | "TB" => Some(Self::TopDown),
            "LR" => Some(Self::LeftRight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

impl Visibility {
    pub const ORDER: [Visibility; 3] = [Self::Public, Self::Private, Self::Protected];

    pub fn prefix(self) -> char {
        match self {
            Self::Public => '+',
            Self::Private => '-',
            Self::Protected => '#',
        }
    }
}

/// Members of one kind split by access level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Partitioned<T> {
    pub public: Vec<T>,
    pub private: Vec<T>,
    pub protected: Vec<T>,
}

impl<T> Default for Partitioned<T> {
    fn default() -> Self {
        Self {
            public: Vec::new(),
            private: Vec::new(),
            protected: Vec::new(),
        }
    }
}

impl<T> Partitioned<T> {
    pub fn get(&self, visibility: Visibility) -> &[T] {
        match visibility {
            Visibility::Public => &self.public,
            Visibility::Private => &self.private,
            Visibility::Protected => &self.protected,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.public.is_empty() && self.private.is_empty() && self.protected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.public.len() + self.private.len() + self.protected.len()
    }

    /// Public members first, then private, then protected.
    pub fn iter(&self) -> impl Iterator<Item = (Visibility, &T)> {
        Visibility::ORDER
            .into_iter()
            .flat_map(move |vis| self.get(vis).iter().map(move |item| (vis, item)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MethodRepr")]
pub struct Method {
    pub signature: String,
    #[serde(rename = "pureVirtual")]
    pub pure_virtual: bool,
}

impl Method {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            pure_virtual: false,
        }
    }

    pub fn pure_virtual(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            pure_virtual: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MethodRepr {
    Signature(String),
    Full {
        signature: String,
        #[serde(default, rename = "pureVirtual")]
        pure_virtual: bool,
    },
}

impl From<MethodRepr> for Method {
    fn from(repr: MethodRepr) -> Self {
        match repr {
            MethodRepr::Signature(signature) => Method::new(signature),
            MethodRepr::Full {
                signature,
                pure_virtual,
            } => Method {
                signature,
                pure_virtual,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassRecord {
    pub name: String,
    pub fields: Partitioned<String>,
    pub methods: Partitioned<Method>,
    pub constructors: Partitioned<Method>,
    pub has_destructor: bool,
}

impl ClassRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn has_field(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn has_method(&self) -> bool {
        !self.methods.is_empty()
    }

    pub fn has_constructor(&self) -> bool {
        !self.constructors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Stereotype {
    #[default]
    None,
    Interface,
    Abstract,
    Datatype,
}

impl Stereotype {
    pub fn marker(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Interface => Some("«interface»"),
            Self::Abstract => Some("«abstract»"),
            Self::Datatype => Some("«datatype»"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Dependency,
    Association,
    Bidirectional,
    Aggregation,
    Composition,
    Generalization,
    Realization,
}

impl RelationshipKind {
    pub const ALL: [RelationshipKind; 7] = [
        Self::Dependency,
        Self::Association,
        Self::Bidirectional,
        Self::Aggregation,
        Self::Composition,
        Self::Generalization,
        Self::Realization,
    ];

    /// Inheritance edges point from child to parent; ranking wants the parent first.
    pub fn ranks_target_first(self) -> bool {
        matches!(self, Self::Generalization | Self::Realization)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub source: String,
    #[serde(alias = "dest", alias = "target")]
    pub destination: String,
    pub kind: RelationshipKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl RelationshipRecord {
    pub fn new(source: impl Into<String>, destination: impl Into<String>, kind: RelationshipKind) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            kind,
            label: None,
        }
    }
}

/// Everything the upstream extractor hands over for one diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassModel {
    pub classes: Vec<ClassRecord>,
    pub relationships: Vec<RelationshipRecord>,
}

impl ClassModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict JSON first, then json5. A failure reports both parsers.
    pub fn from_json(input: &str) -> Result<Self, crate::error::RenderError> {
        match serde_json::from_str::<ClassModel>(input) {
            Ok(model) => Ok(model),
            Err(strict) => json5::from_str::<ClassModel>(input).map_err(|lenient| {
                crate::error::RenderError::Model(format!("{strict} (as json5: {lenient})"))
            }),
        }
    }
}
