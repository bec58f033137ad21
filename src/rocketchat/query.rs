use indexmap::IndexMap;

/// Query-string parameters for a call, kept in insertion order, plus the
/// ordered arguments that fill a path template's placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: IndexMap<String, String>,
    method_args: Vec<String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Appends the next positional argument for the path template.
    pub fn with_method_arg(mut self, arg: impl Into<String>) -> Self {
        self.method_args.push(arg.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn method_args(&self) -> &[String] {
        &self.method_args
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
