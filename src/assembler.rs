//! Driving a conversion from a class source to a filtered [`Api`]

use std::collections::BTreeSet;
use std::io;

use crate::converter::{ClassConverter, ConversionOptions};
use crate::errors::{Error, Result};
use crate::model::Api;
use crate::raw::RawClass;
use crate::visibility::Visibility;

/// Anything that can hand over the complete set of raw class records
pub trait ClassSource {
    fn load_classes(&self) -> io::Result<Vec<RawClass>>;
}

impl ClassSource for [RawClass] {
    fn load_classes(&self) -> io::Result<Vec<RawClass>> {
        Ok(self.to_vec())
    }
}

impl ClassSource for Vec<RawClass> {
    fn load_classes(&self) -> io::Result<Vec<RawClass>> {
        Ok(self.clone())
    }
}

/// Builder for [`ApiAssembler`]
#[derive(Debug, Default)]
pub struct ApiAssemblerBuilder {
    name: Option<String>,
    options: ConversionOptions,
    packages: BTreeSet<String>,
}

impl ApiAssemblerBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn name(self, name: &str) -> Self {
        let mut s = self;
        s.name = Some(name.to_string());
        s
    }

    pub fn visibility(self, visibility: Visibility) -> Self {
        let mut s = self;
        s.options.visibility = visibility;
        s
    }

    /// Add a package (dotted, e.g. `java.util`) to the allow-list
    pub fn package(self, package: &str) -> Self {
        let mut s = self;
        s.packages.insert(package.to_string());
        s
    }

    pub fn packages<I, P>(self, packages: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let mut s = self;
        s.packages.extend(packages.into_iter().map(Into::into));
        s
    }

    pub fn build(self) -> Result<ApiAssembler> {
        let name = self.name.ok_or_else(|| {
            Error::InvariantViolation("An API name is required".to_string())
        })?;
        Ok(ApiAssembler {
            name,
            options: self.options,
            packages: self.packages,
        })
    }
}

/// Converts the whole closed input set, then keeps only the requested packages
///
/// Filtering happens after conversion: classes outside the allow-list still
/// take part in resolving supertypes, enclosing scopes and type variables.
#[derive(Debug, Clone)]
pub struct ApiAssembler {
    name: String,
    options: ConversionOptions,
    packages: BTreeSet<String>,
}

impl ApiAssembler {
    pub fn builder() -> ApiAssemblerBuilder {
        ApiAssemblerBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// The allow-list; empty means every package is kept
    pub fn packages(&self) -> &BTreeSet<String> {
        &self.packages
    }

    pub fn assemble<S>(&self, source: &S) -> Result<Api>
    where
        S: ClassSource + ?Sized,
    {
        let classes = source.load_classes()?;
        log::debug!("assembling {} from {} classes", self.name, classes.len());

        let converter = ClassConverter::new(self.options.clone());
        let mut api = converter.convert(&self.name, &classes)?;

        if !self.packages.is_empty() {
            for wanted in &self.packages {
                if api.package(wanted).is_none() {
                    log::warn!("requested package {wanted} has no visible classes");
                }
            }
            api.retain_packages(|name| self.packages.contains(name));
        }
        Ok(api)
    }
}
