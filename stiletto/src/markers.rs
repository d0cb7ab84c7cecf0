use serde::{Deserialize, Serialize};

/// Qualified names of every annotation the generator recognizes or emits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// Container-level marker requesting a module.
    pub module: String,
    /// String property of [`Markers::module`] overriding the module name.
    pub module_name_property: String,
    pub runtime: String,
    pub injection: String,
    pub new_instance: String,
    /// Type-valued property of the strategy markers holding the implementation type.
    pub implementation_property: String,
    /// Implementation type meaning "use the method's return type".
    pub unset_sentinel: String,
    /// Marker of the DI framework's component declarations.
    pub component: String,
    /// Annotation placed on the generated module class.
    pub dagger_module: String,
    /// Annotation placed on every generated provider method.
    pub provides: String,
    /// Simple names of the equivalent nullability annotations.
    pub nullable: Vec<String>,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            module: "stiletto.Stiletto.Module".into(),
            module_name_property: "moduleName".into(),
            runtime: "stiletto.ProvidedBy.Runtime".into(),
            injection: "stiletto.ProvidedBy.Injection".into(),
            new_instance: "stiletto.ProvidedBy.NewInstance".into(),
            implementation_property: "value".into(),
            unset_sentinel: "java.lang.Void".into(),
            component: "dagger.Component".into(),
            dagger_module: "dagger.Module".into(),
            provides: "dagger.Provides".into(),
            nullable: vec!["Nullable".into()],
        }
    }
}

impl Markers {
    /// The three mutually exclusive provisioning markers.
    pub fn strategies(&self) -> [&str; 3] {
        [&self.runtime, &self.injection, &self.new_instance]
    }

    pub fn is_strategy(&self, name: &str) -> bool {
        self.strategies().contains(&name)
    }

    /// Returns `true` if `name` is one of the recognized nullability annotations.
    pub fn is_nullable(&self, name: &str) -> bool {
        self.nullable.iter().any(|simple| {
            name == simple
                || name
                    .strip_suffix(simple.as_str())
                    .is_some_and(|v| v.ends_with('.'))
        })
    }

    /// Simple name of a marker, as written in source (`ProvidedBy.NewInstance`).
    pub fn display_name(name: &str) -> &str {
        let mut offset = 0;
        for segment in name.split('.') {
            if segment.starts_with(char::is_uppercase) {
                return &name[offset..];
            }
            offset += segment.len() + 1;
        }
        name
    }
}
