//! Model set validation port.

use crate::error::ModelError;
use crate::model::{ModelSet, namespace_of};

/// Checks a model set after downloaded models have been applied to it.
pub trait ModelValidator: Send + Sync {
    /// Validate the whole set.
    fn validate(&self, models: &ModelSet) -> Result<(), ModelError>;
}

/// Accepts every set.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ModelValidator for AcceptAll {
    fn validate(&self, _models: &ModelSet) -> Result<(), ModelError> {
        Ok(())
    }
}

/// Requires every import to name a namespace present in the set.
///
/// This checks closure completeness only, not the model definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportsResolved;

impl ModelValidator for ImportsResolved {
    fn validate(&self, models: &ModelSet) -> Result<(), ModelError> {
        for model in models.iter() {
            for import in model.imports() {
                let ns = namespace_of(import);
                if ns != model.namespace() && models.get(ns).is_none() {
                    return Err(ModelError::UnresolvedImport {
                        namespace: model.namespace().to_string(),
                        import: import.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
