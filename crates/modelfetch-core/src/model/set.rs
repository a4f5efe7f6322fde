//! Namespace-keyed collection of model files.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::ModelError;
use crate::ports::ModelValidator;

use super::ModelFile;

/// A set of model files keyed by namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelSet {
    models: BTreeMap<String, ModelFile>,
}

impl ModelSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model. Fails if its namespace is already present.
    pub fn add(&mut self, model: ModelFile) -> Result<(), ModelError> {
        if self.models.contains_key(model.namespace()) {
            return Err(ModelError::DuplicateNamespace {
                namespace: model.namespace().to_string(),
            });
        }
        self.models.insert(model.namespace().to_string(), model);
        Ok(())
    }

    /// Replace a model. Fails if its namespace is not present.
    pub fn update(&mut self, model: ModelFile) -> Result<ModelFile, ModelError> {
        match self.models.get_mut(model.namespace()) {
            Some(existing) => Ok(std::mem::replace(existing, model)),
            None => Err(ModelError::UnknownNamespace {
                namespace: model.namespace().to_string(),
            }),
        }
    }

    /// Add or replace a model, returning the replaced one.
    pub fn upsert(&mut self, model: ModelFile) -> Option<ModelFile> {
        self.models.insert(model.namespace().to_string(), model)
    }

    /// Look up a model by namespace.
    pub fn get(&self, namespace: &str) -> Option<&ModelFile> {
        self.models.get(namespace)
    }

    /// All models, in namespace order.
    pub fn model_files(&self) -> Vec<ModelFile> {
        self.models.values().cloned().collect()
    }

    /// Iterate models in namespace order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelFile> {
        self.models.values()
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True if the set holds no models.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Add or update every downloaded model, then validate the whole set.
    ///
    /// On validation failure the set is restored to its state before the
    /// call. Returns the number of distinct namespaces added or replaced.
    pub fn apply_external(
        &mut self,
        models: Vec<ModelFile>,
        validator: &dyn ModelValidator,
    ) -> Result<usize, ModelError> {
        let original = self.models.clone();
        let mut applied = BTreeSet::new();

        for model in models {
            applied.insert(model.namespace().to_string());
            if let Some(previous) = self.upsert(model) {
                tracing::debug!(
                    target: "modelfetch.model",
                    namespace = previous.namespace(),
                    "Replaced existing model with downloaded version"
                );
            }
        }

        if let Err(e) = validator.validate(self) {
            tracing::warn!(
                target: "modelfetch.model",
                error = %e,
                "Downloaded models failed validation, rolling back"
            );
            self.models = original;
            return Err(e);
        }

        Ok(applied.len())
    }
}

impl FromIterator<ModelFile> for ModelSet {
    fn from_iter<I: IntoIterator<Item = ModelFile>>(iter: I) -> Self {
        let mut set = Self::new();
        for model in iter {
            set.upsert(model);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::ports::{AcceptAll, ImportsResolved};

    mock! {
        pub Validator {}

        impl ModelValidator for Validator {
            fn validate(&self, models: &ModelSet) -> Result<(), ModelError>;
        }
    }

    fn model(text: &str, name: &str) -> ModelFile {
        ModelFile::new(text, Some(name.to_string())).unwrap()
    }

    fn acme() -> ModelFile {
        model(
            "namespace org.acme\nimport org.external.* from github://external.cto",
            "acme.cto",
        )
    }

    fn external() -> ModelFile {
        model(
            "namespace org.external\nconcept Foo { o String baz }",
            "@external.cto",
        )
    }

    #[test]
    fn test_add_rejects_duplicate_namespace() {
        let mut set = ModelSet::new();
        set.add(acme()).unwrap();
        assert_eq!(
            set.add(acme()).unwrap_err(),
            ModelError::DuplicateNamespace {
                namespace: "org.acme".to_string()
            }
        );
    }

    #[test]
    fn test_update_requires_existing_namespace() {
        let mut set = ModelSet::new();
        assert!(set.update(acme()).is_err());
        set.add(acme()).unwrap();
        let previous = set.update(acme()).unwrap();
        assert_eq!(previous.namespace(), "org.acme");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_apply_external_adds_then_updates() {
        let mut set: ModelSet = [acme()].into_iter().collect();

        assert_eq!(assert_ok!(set.apply_external(vec![external()], &ImportsResolved)), 1);
        assert!(set.get("org.external").unwrap().is_external());
        assert!(!set.get("org.acme").unwrap().is_external());

        // second apply replaces the existing external model
        assert_eq!(assert_ok!(set.apply_external(vec![external()], &ImportsResolved)), 1);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_apply_external_rolls_back_on_validation_failure() {
        let mut set: ModelSet = [acme()].into_iter().collect();
        let unrelated = model(
            "namespace org.unrelated\nimport org.missing.Thing",
            "@unrelated.cto",
        );

        let err = assert_err!(set.apply_external(vec![unrelated], &ImportsResolved));

        assert!(matches!(err, ModelError::UnresolvedImport { .. }));
        assert_eq!(set.len(), 1);
        assert!(set.get("org.unrelated").is_none());
    }

    #[test]
    fn test_accept_all_never_rolls_back() {
        let mut set = ModelSet::new();
        set.apply_external(vec![acme()], &AcceptAll).unwrap();
        assert_eq!(set.model_files().len(), 1);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_apply_external_counts_each_namespace_once() {
        let mut set: ModelSet = [acme()].into_iter().collect();
        let newer = model(
            "namespace org.external\nconcept Bar { o String qux }",
            "@mirror.external.cto",
        );

        let applied = assert_ok!(set.apply_external(vec![external(), newer], &ImportsResolved));

        assert_eq!(applied, 1);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("org.external").unwrap().name(), Some("@mirror.external.cto"));
    }

    #[test]
    fn test_validator_sees_merged_set_once() {
        let mut validator = MockValidator::new();
        validator
            .expect_validate()
            .withf(|models| models.len() == 2 && models.get("org.external").is_some())
            .times(1)
            .returning(|_| Ok(()));

        let mut set: ModelSet = [acme()].into_iter().collect();
        assert_eq!(assert_ok!(set.apply_external(vec![external()], &validator)), 1);
    }

    #[test]
    fn test_validator_rejection_restores_replaced_model() {
        let mut validator = MockValidator::new();
        validator.expect_validate().times(1).returning(|_| {
            Err(ModelError::UnknownNamespace {
                namespace: "org.rejected".to_string(),
            })
        });

        let mut set: ModelSet = [acme(), external()].into_iter().collect();
        let before = set.clone();
        let newer = model(
            "namespace org.external\nconcept Bar { o String qux }",
            "@mirror.external.cto",
        );

        let err = assert_err!(set.apply_external(vec![newer], &validator));
        assert_eq!(
            err,
            ModelError::UnknownNamespace {
                namespace: "org.rejected".to_string()
            }
        );
        assert_eq!(set, before);
    }
}
