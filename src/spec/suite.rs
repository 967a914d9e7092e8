use std::path::{Path, PathBuf};

use super::class::{Spec, SpecClass};

/// A named, ordered group of spec classes, usually one per source file.
#[derive(Debug)]
pub struct Suite {
    name: String,
    path: Option<PathBuf>,
    classes: Vec<SpecClass>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            classes: Vec::new(),
        }
    }

    /// Tag the suite with the source file it was declared in.
    pub fn at(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn spec<S: Spec + Default>(self) -> Self {
        self.class(SpecClass::of::<S>())
    }

    pub fn class(mut self, class: SpecClass) -> Self {
        self.classes.push(class);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn classes(&self) -> &[SpecClass] {
        &self.classes
    }
}
