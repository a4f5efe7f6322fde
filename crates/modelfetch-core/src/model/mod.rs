//! Model files and model sets.

mod header;
mod set;

use std::collections::BTreeMap;

use crate::error::ModelError;

pub use set::ModelSet;

/// Prefix marking a model file name as externally sourced.
pub const EXTERNAL_NAME_PREFIX: char = '@';

/// A model file: raw definitions plus the declarations needed for resolution.
///
/// Only the `namespace` and `import` declarations are read. The rest of the
/// text is carried as-is in [`definitions`](Self::definitions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFile {
    definitions: String,
    name: Option<String>,
    namespace: String,
    imports: Vec<String>,
    external_imports: BTreeMap<String, String>,
}

impl ModelFile {
    /// Build a model file from its text and an optional file name.
    ///
    /// A name starting with `@` marks the file as downloaded from an external URI.
    pub fn new(definitions: impl Into<String>, name: Option<String>) -> Result<Self, ModelError> {
        let definitions = definitions.into();
        if definitions.trim().is_empty() {
            return Err(ModelError::EmptyDefinitions);
        }

        let header = header::scan(&definitions)?;
        let Some(namespace) = header.namespace else {
            return Err(ModelError::MissingNamespace { name });
        };

        let mut imports = Vec::with_capacity(header.imports.len());
        let mut external_imports = BTreeMap::new();
        for decl in header.imports {
            if let Some(uri) = decl.uri {
                external_imports.insert(decl.name.clone(), uri);
            }
            imports.push(decl.name);
        }

        Ok(Self {
            definitions,
            name,
            namespace,
            imports,
            external_imports,
        })
    }

    /// The raw model text.
    pub fn definitions(&self) -> &str {
        &self.definitions
    }

    /// The file name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The declared namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// All import declarations, in source order.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Map from import declaration to the URI it is fetched from.
    pub const fn external_imports(&self) -> &BTreeMap<String, String> {
        &self.external_imports
    }

    /// URI for one import declaration, or `None` if it has no `from` clause.
    pub fn import_uri(&self, import: &str) -> Option<&str> {
        self.external_imports.get(import).map(String::as_str)
    }

    /// True if this file was downloaded from an external URI.
    pub fn is_external(&self) -> bool {
        self.name
            .as_deref()
            .is_some_and(|n| n.starts_with(EXTERNAL_NAME_PREFIX))
    }
}

/// Namespace part of an import declaration.
///
/// `org.acme.Person` and `org.acme.*` both live in `org.acme`.
pub fn namespace_of(import: &str) -> &str {
    import.rsplit_once('.').map_or(import, |(ns, _)| ns)
}
