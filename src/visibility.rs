//! Which classes and members belong to the requested API surface

use std::{fmt, str::FromStr};

use crate::errors::{Error, Result};
use crate::raw::{flags, markers, RawClass};

/// Inclusiveness threshold, ordered from narrowest to widest
///
/// Every level includes everything the previous one does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

impl FromStr for Visibility {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "protected" => Ok(Visibility::Protected),
            "package" => Ok(Visibility::Package),
            "private" => Ok(Visibility::Private),
            _ => Err(Error::ParseFailed(format!("Unknown visibility level '{s}'"))),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Package => "package",
            Visibility::Private => "private",
        };
        f.write_str(name)
    }
}

/// Decides visibility from raw access flags for one requested level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityPolicy {
    level: Visibility,
}

impl VisibilityPolicy {
    pub fn new(level: Visibility) -> Self {
        VisibilityPolicy { level }
    }

    pub fn level(&self) -> Visibility {
        self.level
    }

    /// Whether an element with these access flags is part of the surface
    pub fn is_visible(&self, access_flags: u32) -> bool {
        if access_flags & flags::SYNTHETIC != 0 {
            return false;
        }
        let required = if access_flags & flags::PUBLIC != 0 {
            Visibility::Public
        } else if access_flags & flags::PROTECTED != 0 {
            Visibility::Protected
        } else if access_flags & flags::PRIVATE != 0 {
            Visibility::Private
        } else {
            Visibility::Package
        };
        self.level >= required
    }

    /// Class visibility: local and anonymous classes never are, whatever
    /// their flags say
    pub fn is_class_visible(&self, class: &RawClass) -> bool {
        if class.find_annotation(markers::ENCLOSING_METHOD).is_some() {
            return false;
        }
        if is_anonymous_class_name(&class.simple_name()) {
            return false;
        }
        self.is_visible(class.access_flags)
    }
}

/// `Outer$1` names an anonymous class; `Outer$Inner` and `Outer$1Local` don't
pub fn is_anonymous_class_name(simple_name: &str) -> bool {
    match simple_name.rsplit_once('$') {
        Some((_, suffix)) => !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
