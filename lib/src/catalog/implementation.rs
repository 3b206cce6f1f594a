use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::util::Text;

/// Why an element has no implementation string for a library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImplementationError {
    NotImplemented { library: String },
    VariantNotImplemented { library: String, variant: String },
}

impl fmt::Display for ImplementationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImplementationError::NotImplemented { library } => {
                write!(f, "element is not implemented in {library}")
            }
            ImplementationError::VariantNotImplemented { library, variant } => {
                write!(f, "variant {variant} is not implemented in {library}")
            }
        }
    }
}

impl std::error::Error for ImplementationError { }

impl_error_detail_with_std_error!(ImplementationError);

/// Implementation parameters parsed from `key=value` pairs, in order.
pub type Params = IndexMap<String, String>;

/// An external library elements can be implemented in, from
/// `implementations.yml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Library {
    pub name: Text,
    pub url: Option<Text>,
    pub install: Option<Text>,
    /// How a snippet is shown: `{string}` is the implementation string and
    /// `{params}` the rendered parameters. Defaults to `{string}{params}`.
    pub template: Option<Text>,
}

impl Library {
    /// Renders an implementation string and its parameters for display.
    pub fn format(&self, string: &str, params: &Params) -> String {
        let params: String = params.iter()
            .map(|(key, value)| format!(", {key}={value}"))
            .collect();

        match &self.template {
            Some(template) => template.replace("{string}", string).replace("{params}", &params),
            None => format!("{string}{params}"),
        }
    }
}

/// Splits `key=value` parameters off an implementation string.
///
/// Each key is the word right before an `=`, and each value everything up
/// to the next key: `Q variant=legendre degree=2` is `Q` with `variant` set
/// to `legendre` and `degree` to `2`.
pub fn split_params(string: &str) -> (String, Params) {
    let mut params = Params::new();
    if !string.contains('=') {
        return (string.to_string(), params);
    }

    let pieces: Vec<&str> = string.split('=').collect();
    let all_but_last_word = |s: &str| match s.rsplit_once(' ') {
        Some((init, _)) => init.to_string(),
        None => String::new(),
    };

    let head = all_but_last_word(pieces[0]);
    for (i, pair) in pieces.windows(2).enumerate() {
        let key = pair[0].rsplit(' ').next().unwrap_or_default();
        let last = i + 2 == pieces.len();
        let value = if last { pair[1].to_string() } else { all_but_last_word(pair[1]) };

        params.insert(key.to_string(), value);
    }

    (head, params)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parameters_split() {
        let (string, params) = split_params("Q variant=legendre degree=2");
        assert_eq!(string, "Q");
        assert_eq!(params["variant"], "legendre");
        assert_eq!(params["degree"], "2");

        let (string, params) = split_params("P lagrange_variant=LagrangeVariant.gll_warped");
        assert_eq!(string, "P");
        assert_eq!(params.len(), 1);
        assert_eq!(params["lagrange_variant"], "LagrangeVariant.gll_warped");

        let (string, params) = split_params("N1curl");
        assert_eq!(string, "N1curl");
        assert!(params.is_empty());
    }

    #[test]
    fn values_may_contain_spaces() {
        let (string, params) = split_params("element family=P shape=(2, 3) discontinuous=True");
        assert_eq!(string, "element");
        assert_eq!(params["family"], "P");
        assert_eq!(params["shape"], "(2, 3)");
        assert_eq!(params["discontinuous"], "True");
    }

    #[test]
    fn library_templates() {
        let params = split_params("P degree=2").1;
        let plain = Library { name: "Basix".into(), ..Default::default() };
        assert_eq!(plain.format("P", &params), "P, degree=2");

        let templated = Library {
            template: Some("basix.create_element({string}{params})".into()),
            ..Default::default()
        };
        assert_eq!(templated.format("P", &params), "basix.create_element(P, degree=2)");
    }

    #[test]
    fn errors_say_what_is_missing() {
        let error = ImplementationError::VariantNotImplemented {
            library: "basix".into(),
            variant: "legendre".into(),
        };

        assert_eq!(error.to_string(), "variant legendre is not implemented in basix");
        let error = crate::error::Error::from(error);
        assert!(error.mentions("legendre"));
    }
}
