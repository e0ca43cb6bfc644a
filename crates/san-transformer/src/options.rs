//! Conversion options.

/// Options controlling the script side of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Constructor identifiers whose `new X({...})` argument is a component.
    pub constructors: Vec<String>,
    /// Dotted expression that replaces the constructor, e.g. `San.defineComponent`.
    pub component_factory: String,
    /// Name of the instance data store (`this.<accessor>.get(...)`).
    pub data_accessor: String,
    /// Name the `data` field is renamed to.
    pub initializer: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            constructors: vec!["Vue".to_string()],
            component_factory: "San.defineComponent".to_string(),
            data_accessor: "data".to_string(),
            initializer: "initData".to_string(),
        }
    }
}

impl ConvertOptions {
    /// Returns true if `name` is a recognized component constructor.
    pub fn is_constructor(&self, name: &str) -> bool {
        self.constructors.iter().any(|c| c == name)
    }
}
