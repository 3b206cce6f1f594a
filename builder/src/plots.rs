use std::path::PathBuf;

use defelement::err;
use defelement::error::Result;
use defelement::markup::{PlotElement, Plotter};

/// Serves plots rendered ahead of time into an image directory.
///
/// Basis function `i` of an element is `<slug>-<cell>-<order>-<i>.png`,
/// where the slug is the lowercased element name (and variant), with spaces
/// as dashes. Reference cells and other images are `<key>.png`.
#[derive(Debug, Clone)]
pub struct StaticPlotter {
    dir: PathBuf,
    url: String,
}

impl StaticPlotter {
    /// Images in `dir`, served under `url`.
    pub fn new(dir: impl Into<PathBuf>, url: &str) -> Self {
        StaticPlotter { dir: dir.into(), url: url.trim_end_matches('/').to_string() }
    }

    fn image(&self, stem: &str, alt: &str) -> Result<String> {
        let file = format!("{stem}.png");
        let path = self.dir.join(&file);
        if !path.is_file() {
            return err!("no pre-rendered image", "path" => path.display());
        }

        Ok(format!("<img src='{}/{file}' alt='{alt}' class='plot' />", self.url))
    }
}

fn slug(element: &PlotElement) -> String {
    let mut slug = element.name.to_lowercase().replace(' ', "-");
    if let Some(variant) = &element.variant {
        slug.push('-');
        slug.push_str(&variant.to_lowercase());
    }

    format!("{slug}-{}-{}", element.cell, element.order)
}

impl Plotter for StaticPlotter {
    fn dimension(&self, element: &PlotElement) -> Result<usize> {
        let stem = slug(element);
        let count = (0..)
            .take_while(|i: &usize| self.dir.join(format!("{stem}-{i}.png")).is_file())
            .count();

        match count {
            0 => err!("no pre-rendered basis functions", "element" => element, "directory" => self.dir.display()),
            n => Ok(n),
        }
    }

    fn plot_function(&self, element: &PlotElement, index: usize) -> Result<String> {
        self.image(&format!("{}-{index}", slug(element)), &format!("basis function {index} of {element}"))
    }

    fn plot_reference(&self, cell: &str) -> Result<String> {
        self.image(cell, &format!("the reference {cell}"))
    }

    fn plot_img(&self, key: &str) -> Result<String> {
        self.image(key, key)
    }
}
