//! Built-in definitions.
//!
//! Coordinate definitions (`X`, `Y`, `R`, `T`) sample the plane centred on
//! the origin; the image height always spans `scale` units and the width is
//! widened by the aspect ratio. Shape definitions take `x: X` and `y: Y` as
//! inputs and return a mask.
//!
//! Every shape has an optional `pt` attribute. When it is set the shape is
//! drawn as an outline of relative thickness `pt` instead of being filled.

use crate::definition::{define, Definition, Inputs};
use crate::error::Result;
use crate::registry::{Registry, RegistryBuilder};
use crate::types::{AttrType, AttrValue, Domain, Grid};

const FLOAT: AttrType = AttrType::Float;

/// The built-in definitions, sharing one `X` and one `Y`.
#[derive(Debug, Clone)]
pub struct Library {
    pub x: Definition,
    pub y: Definition,
    pub r: Definition,
    pub t: Definition,
    pub circle: Definition,
    pub ellipse: Definition,
    pub super_ellipse: Definition,
    pub square: Definition,
    pub rectangle: Definition,
}

impl Library {
    pub fn new() -> Result<Self> {
        let x = coordinate("X", "The x coordinate of every pixel.", |d, w, h| d.x_grid(w, h))?;
        let y = coordinate("Y", "The y coordinate of every pixel.", |d, w, h| d.y_grid(w, h))?;
        let r = coordinate("R", "The distance of every pixel from the origin.", |d, w, h| {
            d.r_grid(w, h)
        })?;
        let t = coordinate("T", "The angle of every pixel about the origin.", |d, w, h| {
            d.t_grid(w, h)
        })?;

        Ok(Self {
            circle: circle(&x, &y)?,
            ellipse: ellipse(&x, &y)?,
            super_ellipse: super_ellipse(&x, &y)?,
            square: square(&x, &y)?,
            rectangle: rectangle(&x, &y)?,
            x,
            y,
            r,
            t,
        })
    }

    pub fn all(&self) -> Vec<Definition> {
        vec![
            self.x.clone(),
            self.y.clone(),
            self.r.clone(),
            self.t.clone(),
            self.circle.clone(),
            self.ellipse.clone(),
            self.super_ellipse.clone(),
            self.square.clone(),
            self.rectangle.clone(),
        ]
    }

    pub fn registry(&self) -> Result<Registry> {
        let mut builder = RegistryBuilder::new();
        builder.add_all(self.all());
        builder.build()
    }
}

/// A registry holding every built-in definition.
pub fn registry() -> Result<Registry> {
    Library::new()?.registry()
}

fn coordinate(
    name: &str,
    doc: &str,
    grid: fn(&Domain, usize, usize) -> Grid<f64>,
) -> Result<Definition> {
    define(name)
        .doc(doc)
        .width()
        .height()
        .typed_attr("scale", FLOAT, 2.0)
        .body(move |i| {
            let domain = Domain::centred(i.width(), i.height(), i.float("scale")?)?;
            Ok(grid(&domain, i.width(), i.height()))
        })
}

/// Whether `value` is inside `limit`, or within the band of relative
/// thickness `pt` around it.
fn within(value: f64, limit: f64, pt: Option<f64>) -> bool {
    match pt {
        None => value < limit,
        Some(pt) => (1.0 - pt) * limit < value && value < (1.0 + pt) * limit,
    }
}

fn mask_of(i: &Inputs<'_>, f: impl Fn(f64, f64) -> bool) -> Result<Grid<bool>> {
    i.grid("x")?.zip_with(i.grid("y")?, |&x, &y| f(x, y))
}

fn circle(x: &Definition, y: &Definition) -> Result<Definition> {
    define("Circle")
        .doc("Points within radius r of (xc, yc).")
        .input("x", x)
        .input("y", y)
        .typed_attr("xc", FLOAT, 0.0)
        .typed_attr("yc", FLOAT, 0.0)
        .typed_attr("r", FLOAT, 0.8)
        .typed_attr("pt", FLOAT, AttrValue::None)
        .body(|i| {
            let (xc, yc, r) = (i.float("xc")?, i.float("yc")?, i.float("r")?);
            let pt = i.opt_float("pt")?;
            mask_of(i, |x, y| within((x - xc).hypot(y - yc), r * r, pt))
        })
}

fn ellipse(x: &Definition, y: &Definition) -> Result<Definition> {
    define("Ellipse")
        .doc("Points inside the ellipse with semi-axes scaled by a and b.")
        .input("x", x)
        .input("y", y)
        .typed_attr("xc", FLOAT, 0.0)
        .typed_attr("yc", FLOAT, 0.0)
        .typed_attr("a", FLOAT, 2.0)
        .typed_attr("b", FLOAT, 1.0)
        .typed_attr("r", FLOAT, 0.8)
        .typed_attr("pt", FLOAT, AttrValue::None)
        .body(|i| {
            let (xc, yc) = (i.float("xc")?, i.float("yc")?);
            let (a, b, r) = (i.float("a")?, i.float("b")?, i.float("r")?);
            let pt = i.opt_float("pt")?;
            mask_of(i, |x, y| {
                let e = ((x - xc).powi(2) / (a * a) + (y - yc).powi(2) / (b * b)).sqrt();
                within(e, r * r, pt)
            })
        })
}

fn super_ellipse(x: &Definition, y: &Definition) -> Result<Definition> {
    define("SuperEllipse")
        .doc("Points where |x/a|^n + |y/b|^m < r. m defaults to n.")
        .input("x", x)
        .input("y", y)
        .typed_attr("xc", FLOAT, 0.0)
        .typed_attr("yc", FLOAT, 0.0)
        .typed_attr("a", FLOAT, 1.0)
        .typed_attr("b", FLOAT, 1.0)
        .typed_attr("n", FLOAT, 3.0)
        .typed_attr("r", FLOAT, 0.8)
        .typed_attr("m", FLOAT, AttrValue::None)
        .typed_attr("pt", FLOAT, AttrValue::None)
        .body(|i| {
            let (xc, yc) = (i.float("xc")?, i.float("yc")?);
            let (a, b, r) = (i.float("a")?, i.float("b")?, i.float("r")?);
            let n = i.float("n")?;
            let m = i.opt_float("m")?.unwrap_or(n);
            let pt = i.opt_float("pt")?;
            mask_of(i, |x, y| {
                let e = ((x - xc) / a).abs().powf(n) + ((y - yc) / b).abs().powf(m);
                within(e, r, pt)
            })
        })
}

/// A box of half extents `(w, h)`; with `pt`, the outline between the
/// boxes scaled by `1 - pt` and `1 + pt`.
fn in_box(dx: f64, dy: f64, w: f64, h: f64, pt: Option<f64>) -> bool {
    match pt {
        None => dx < w && dy < h,
        Some(pt) => {
            let inner = dx < (1.0 - pt) * w && dy < (1.0 - pt) * h;
            let outer = dx < (1.0 + pt) * w && dy < (1.0 + pt) * h;
            outer && !inner
        }
    }
}

fn square(x: &Definition, y: &Definition) -> Result<Definition> {
    define("Square")
        .doc("Points within size of (xc, yc) along both axes.")
        .input("x", x)
        .input("y", y)
        .typed_attr("xc", FLOAT, 0.0)
        .typed_attr("yc", FLOAT, 0.0)
        .typed_attr("size", FLOAT, 0.8)
        .typed_attr("pt", FLOAT, AttrValue::None)
        .body(|i| {
            let (xc, yc, size) = (i.float("xc")?, i.float("yc")?, i.float("size")?);
            let pt = i.opt_float("pt")?;
            mask_of(i, |x, y| in_box((x - xc).abs(), (y - yc).abs(), size, size, pt))
        })
}

fn rectangle(x: &Definition, y: &Definition) -> Result<Definition> {
    define("Rectangle")
        .doc("A rectangle of area proportional to size with the given width:height ratio.")
        .input("x", x)
        .input("y", y)
        .typed_attr("xc", FLOAT, 0.0)
        .typed_attr("yc", FLOAT, 0.0)
        .typed_attr("size", FLOAT, 0.6)
        .typed_attr("ratio", FLOAT, 1.618)
        .typed_attr("pt", FLOAT, AttrValue::None)
        .body(|i| {
            let (xc, yc) = (i.float("xc")?, i.float("yc")?);
            let height = (i.float("size")? / i.float("ratio")?).sqrt();
            let width = height * i.float("ratio")?;
            let pt = i.opt_float("pt")?;
            mask_of(i, |x, y| in_box((x - xc).abs(), (y - yc).abs(), width, height, pt))
        })
}
