// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Name to test mapping.

use crate::error::RegistryError;
use crate::message::MessageCatalog;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::builtin::builtin_tests;
use super::strength::StrengthTest;
use super::{Localized, Test};

/// Tests known to an evaluator, keyed by rule name.
#[derive(Clone, Default)]
pub struct TestRegistry {
    tests: HashMap<String, Arc<dyn Test>>,
}

impl TestRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in test.
    pub fn with_builtins() -> Self {
        let tests = builtin_tests()
            .into_iter()
            .map(|(name, test)| (name.to_string(), test))
            .collect();
        Self { tests }
    }

    /// Create a registry of built-in tests whose messages come from `catalog`
    /// where it defines them.
    pub fn with_catalog(catalog: &dyn MessageCatalog) -> Self {
        let mut registry = Self::with_builtins();

        let mut strength = StrengthTest::new();
        for check in StrengthTest::sub_checks() {
            if let Some(message) = catalog.sub_message("strength", check) {
                strength = strength.with_sub_message(check, message);
            }
        }
        registry
            .tests
            .insert("strength".to_string(), Arc::new(strength));

        for (name, test) in registry.tests.iter_mut() {
            if let Some(message) = catalog.message(name) {
                tracing::trace!("Localized message for test '{}'", name);
                *test = Arc::new(Localized::new(Arc::clone(test), message));
            }
        }

        registry
    }

    /// Add a test under a new name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        test: Arc<dyn Test>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.tests.contains_key(&name) {
            return Err(RegistryError::AlreadyExists { name });
        }
        self.tests.insert(name, test);
        Ok(())
    }

    /// Find the test for a rule name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Test>> {
        self.tests.get(name).cloned()
    }

    /// Check if a test is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tests.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tests.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tests.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

impl fmt::Debug for TestRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestRegistry")
            .field("tests", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{Detail, FnTest, Outcome};
    use crate::message::Messages;
    use crate::rules::{Params, Value};

    #[test]
    fn test_builtins_registered() {
        let registry = TestRegistry::with_builtins();
        for name in ["required", "email", "cc", "strength", "date", "dateBefore"] {
            assert!(registry.contains(name), "{} missing", name);
        }
        assert!(!registry.contains("always"));
        assert_eq!(registry.names().first(), Some(&"alpha"));
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = TestRegistry::new();
        let test: Arc<dyn Test> = Arc::new(FnTest::new(
            "{title} failed",
            &[],
            |_: &Value, _: &Params| true,
        ));

        registry.register("always", Arc::clone(&test)).unwrap();
        assert_eq!(
            registry.register("always", test),
            Err(RegistryError::AlreadyExists {
                name: "always".to_string()
            })
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_catalog_replaces_messages() {
        let catalog = Messages::new()
            .with_message("email", "{title} doit être une adresse e-mail valide")
            .with_sub_message("strength", "hasNumber", "{title} doit contenir un chiffre");
        let registry = TestRegistry::with_catalog(&catalog);

        let email = registry.lookup("email").unwrap();
        assert_eq!(email.message(), "{title} doit être une adresse e-mail valide");
        assert_eq!(
            registry.lookup("url").unwrap().message(),
            "{title} must be a valid web address"
        );

        let strength = registry.lookup("strength").unwrap();
        assert_eq!(strength.message(), StrengthTest::MESSAGE);
        let outcome = strength
            .validate(&Value::from("abcdefghijkLM!"), &Params::new())
            .unwrap();
        match outcome {
            Outcome::Detailed(Detail { errors, .. }) => {
                assert_eq!(errors, vec!["{title} doit contenir un chiffre"]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_debug_lists_names() {
        let mut registry = TestRegistry::new();
        registry
            .register("odd", Arc::new(FnTest::new("x", &[], |_: &Value, _: &Params| false)))
            .unwrap();
        assert_eq!(format!("{:?}", registry), "TestRegistry { tests: [\"odd\"] }");
    }
}
