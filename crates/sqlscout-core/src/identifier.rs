//! Qualified identifiers, connection defaults and identifier comparison

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::IdentifierError;

/// One position of a qualified name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamePart {
    Server,
    Database,
    Schema,
    Local,
}

impl fmt::Display for NamePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamePart::Server => write!(f, "server"),
            NamePart::Database => write!(f, "database"),
            NamePart::Schema => write!(f, "schema"),
            NamePart::Local => write!(f, "local"),
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn checked(part: NamePart, value: Option<String>) -> Result<Option<String>, IdentifierError> {
    match value {
        Some(v) if is_blank(&v) => Err(IdentifierError::BlankPart { part }),
        other => Ok(other),
    }
}

/// A possibly partial database object name: `[server.][database.][schema.]local`
///
/// The local name is always present and never blank. Any other part that is
/// present is never blank either.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawIdentifier")]
pub struct Identifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<String>,
    local_name: String,
}

#[derive(Deserialize)]
struct RawIdentifier {
    server: Option<String>,
    database: Option<String>,
    schema: Option<String>,
    local_name: String,
}

impl TryFrom<RawIdentifier> for Identifier {
    type Error = IdentifierError;

    fn try_from(raw: RawIdentifier) -> Result<Self, Self::Error> {
        Identifier::from_parts(raw.server, raw.database, raw.schema, raw.local_name)
    }
}

impl Identifier {
    /// An unqualified name
    pub fn new(local_name: impl Into<String>) -> Result<Self, IdentifierError> {
        Self::from_parts(None, None, None, local_name.into())
    }

    pub fn from_parts(
        server: Option<String>,
        database: Option<String>,
        schema: Option<String>,
        local_name: String,
    ) -> Result<Self, IdentifierError> {
        if is_blank(&local_name) {
            return Err(IdentifierError::BlankPart {
                part: NamePart::Local,
            });
        }
        Ok(Self {
            server: checked(NamePart::Server, server)?,
            database: checked(NamePart::Database, database)?,
            schema: checked(NamePart::Schema, schema)?,
            local_name,
        })
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Result<Self, IdentifierError> {
        self.server = checked(NamePart::Server, Some(server.into()))?;
        Ok(self)
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Result<Self, IdentifierError> {
        self.database = checked(NamePart::Database, Some(database.into()))?;
        Ok(self)
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Result<Self, IdentifierError> {
        self.schema = checked(NamePart::Schema, Some(schema.into()))?;
        Ok(self)
    }

    /// The same qualification with a different local name
    pub fn with_local_name(&self, local_name: impl Into<String>) -> Result<Self, IdentifierError> {
        let local_name = local_name.into();
        if is_blank(&local_name) {
            return Err(IdentifierError::BlankPart {
                part: NamePart::Local,
            });
        }
        Ok(Self {
            local_name,
            ..self.clone()
        })
    }

    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn part(&self, part: NamePart) -> Option<&str> {
        match part {
            NamePart::Server => self.server(),
            NamePart::Database => self.database(),
            NamePart::Schema => self.schema(),
            NamePart::Local => Some(self.local_name()),
        }
    }

    /// Present parts, most qualified first
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        [
            self.server.as_deref(),
            self.database.as_deref(),
            self.schema.as_deref(),
            Some(self.local_name.as_str()),
        ]
        .into_iter()
        .flatten()
    }

    /// Fill missing parts from `defaults`
    pub fn qualify(&self, defaults: &IdentifierDefaults) -> Identifier {
        qualify(self, defaults)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}

/// Default server, database and schema of a connection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema: Option<String>,
}

impl IdentifierDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Default for `part`; blank defaults count as absent
    pub fn get(&self, part: NamePart) -> Option<&str> {
        let value = match part {
            NamePart::Server => self.server.as_deref(),
            NamePart::Database => self.database.as_deref(),
            NamePart::Schema => self.schema.as_deref(),
            NamePart::Local => None,
        };
        value.filter(|v| !is_blank(v))
    }
}

/// Fill the missing server, database and schema of `identifier` from
/// `defaults`. The local name and parts already present never change.
pub fn qualify(identifier: &Identifier, defaults: &IdentifierDefaults) -> Identifier {
    let fill = |present: &Option<String>, part: NamePart| {
        present
            .clone()
            .or_else(|| defaults.get(part).map(str::to_string))
    };
    Identifier {
        server: fill(&identifier.server, NamePart::Server),
        database: fill(&identifier.database, NamePart::Database),
        schema: fill(&identifier.schema, NamePart::Schema),
        local_name: identifier.local_name.clone(),
    }
}

/// How the catalog compares name parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSensitivity {
    /// Exact, code point by code point
    #[default]
    Ordinal,
    CaseInsensitive,
}

/// Identifier equality and ordering under a dialect's rules.
///
/// With defaults attached, a missing part compares equal to the matching
/// default, so `Foo` and `dbo.Foo` are the same object when the default
/// schema is `dbo`.
#[derive(Debug, Clone, Default)]
pub struct IdentifierComparer {
    sensitivity: CaseSensitivity,
    defaults: Option<IdentifierDefaults>,
}

impl IdentifierComparer {
    pub fn new(sensitivity: CaseSensitivity) -> Self {
        Self {
            sensitivity,
            defaults: None,
        }
    }

    pub fn ordinal() -> Self {
        Self::new(CaseSensitivity::Ordinal)
    }

    pub fn case_insensitive() -> Self {
        Self::new(CaseSensitivity::CaseInsensitive)
    }

    pub fn with_defaults(mut self, defaults: IdentifierDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn sensitivity(&self) -> CaseSensitivity {
        self.sensitivity
    }

    fn fold(&self, part: &str) -> String {
        match self.sensitivity {
            CaseSensitivity::Ordinal => part.to_string(),
            CaseSensitivity::CaseInsensitive => part.to_lowercase(),
        }
    }

    /// Whether two single name parts are the same name
    pub fn eq_part(&self, a: &str, b: &str) -> bool {
        match self.sensitivity {
            CaseSensitivity::Ordinal => a == b,
            CaseSensitivity::CaseInsensitive => self.fold(a) == self.fold(b),
        }
    }

    /// Owned, folded form of `identifier`; equal keys mean equal identifiers
    pub fn key(&self, identifier: &Identifier) -> IdentifierKey {
        let effective = match &self.defaults {
            Some(defaults) => qualify(identifier, defaults),
            None => identifier.clone(),
        };
        IdentifierKey {
            server: effective.server.as_deref().map(|p| self.fold(p)),
            database: effective.database.as_deref().map(|p| self.fold(p)),
            schema: effective.schema.as_deref().map(|p| self.fold(p)),
            local_name: self.fold(&effective.local_name),
        }
    }

    pub fn eq(&self, a: &Identifier, b: &Identifier) -> bool {
        self.key(a) == self.key(b)
    }

    pub fn cmp(&self, a: &Identifier, b: &Identifier) -> Ordering {
        self.key(a).cmp(&self.key(b))
    }
}

/// Comparison key produced by [`IdentifierComparer::key`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentifierKey {
    server: Option<String>,
    database: Option<String>,
    schema: Option<String>,
    local_name: String,
}
