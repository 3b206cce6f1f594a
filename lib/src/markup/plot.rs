use std::fmt;

use crate::error::Result;

/// An element as named by a plot macro: `{{plot::<name>[ variant=<v>],<cell>,<order>}}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlotElement {
    pub name: String,
    pub variant: Option<String>,
    pub cell: String,
    pub order: usize,
}

impl PlotElement {
    /// Parses the `<name>[ variant=<v>]`, `<cell>` and `<order>` arguments.
    pub fn parse(name: &str, cell: &str, order: &str) -> Option<Self> {
        let order = order.trim().parse().ok()?;
        let (name, variant) = match name.split_once(" variant=") {
            Some((name, variant)) => (name, Some(variant.trim().to_string())),
            None => (name, None),
        };

        if name.is_empty() || cell.is_empty() {
            return None;
        }

        Some(PlotElement { name: name.to_string(), variant, cell: cell.to_string(), order })
    }
}

impl fmt::Display for PlotElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on a {} of order {}", self.name, self.cell, self.order)?;
        if let Some(variant) = &self.variant {
            write!(f, " ({variant} variant)")?;
        }

        Ok(())
    }
}

/// Renders plots and diagrams as HTML fragments.
///
/// The markup renderer treats the output as opaque; it only wraps it in a
/// centred block.
pub trait Plotter: Send + Sync {
    /// The number of basis functions `element` has.
    fn dimension(&self, element: &PlotElement) -> Result<usize>;

    /// Basis function `index` of `element`.
    fn plot_function(&self, element: &PlotElement, index: usize) -> Result<String>;

    /// A diagram of the reference cell `cell`.
    fn plot_reference(&self, cell: &str) -> Result<String>;

    /// A stand-alone image.
    fn plot_img(&self, key: &str) -> Result<String>;
}

/// A plotter for sites without plots: every request fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPlots;

impl Plotter for NoPlots {
    fn dimension(&self, element: &PlotElement) -> Result<usize> {
        err!("plotting is not available", "element" => element)
    }

    fn plot_function(&self, element: &PlotElement, index: usize) -> Result<String> {
        err!("plotting is not available", "element" => element, "function" => index)
    }

    fn plot_reference(&self, cell: &str) -> Result<String> {
        err!("plotting is not available", "reference" => cell)
    }

    fn plot_img(&self, key: &str) -> Result<String> {
        err!("plotting is not available", "image" => key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_arguments() {
        let element = PlotElement::parse("Lagrange variant=gll", "triangle", "2").unwrap();
        assert_eq!(element.name, "Lagrange");
        assert_eq!(element.variant.as_deref(), Some("gll"));
        assert_eq!(element.order, 2);

        assert!(PlotElement::parse("Lagrange", "triangle", "two").is_none());
        assert!(PlotElement::parse("", "triangle", "1").is_none());
    }
}
