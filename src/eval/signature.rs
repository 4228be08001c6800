//! Coordinate signatures of mask and colour functions.

use std::fmt;

use crate::error::{ArlunioError, Result};

/// The coordinates a function is evaluated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signature {
    /// No coordinates; the function is constant over the image.
    NoArgs,
    X,
    Y,
    /// Distance from the origin.
    R,
    /// Angle about the origin.
    T,
    XY,
}

impl Signature {
    /// Work out the signature from a parameter name list.
    ///
    /// Names are matched regardless of order, so `["y", "x"]` is `XY`.
    pub fn from_params(names: &[&str]) -> Result<Self> {
        let unknown = names.iter().copied().find(|n| !matches!(*n, "x" | "y" | "r" | "t"));
        if let Some(bad) = unknown {
            return Err(unsupported(bad, names));
        }

        match names {
            [] => Ok(Signature::NoArgs),
            ["x"] => Ok(Signature::X),
            ["y"] => Ok(Signature::Y),
            ["r"] => Ok(Signature::R),
            ["t"] => Ok(Signature::T),
            ["x", "y"] | ["y", "x"] => Ok(Signature::XY),
            [first, rest @ ..] => {
                // Report the first name that cannot join the others
                let bad = rest
                    .iter()
                    .copied()
                    .find(|n| matches!(*n, "r" | "t") || n == first)
                    .unwrap_or(*first);
                Err(unsupported(bad, names))
            }
        }
    }

    /// The parameter names, in canonical order.
    pub fn params(&self) -> &'static [&'static str] {
        match self {
            Signature::NoArgs => &[],
            Signature::X => &["x"],
            Signature::Y => &["y"],
            Signature::R => &["r"],
            Signature::T => &["t"],
            Signature::XY => &["x", "y"],
        }
    }

    pub fn arity(&self) -> usize {
        self.params().len()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.params().join(", "))
    }
}

fn unsupported(name: &str, names: &[&str]) -> ArlunioError {
    ArlunioError::evaluation(format!(
        "Unsupported parameter '{}' in coordinate function ({})",
        name,
        names.join(", ")
    ))
    .with_help("Use no parameters, one of x, y, r or t, or both x and y")
}
