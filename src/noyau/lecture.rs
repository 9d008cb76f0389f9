// src/noyau/lecture.rs
//
// Lecture d’une Expr simplifiée -> texte
// -------------------------------------
// - Rat exact          : décimal exact (format::format_rationnel)
// - sans variable      : valeur f64 (IEEE double) puis format::format_f64
// - avec variable(s)   : forme symbolique (format::format_symbolique)
//
// Les erreurs de domaine (division par zéro, racine d’un négatif, ...) sont
// détectées ici, nœud par nœud.

use num_traits::{ToPrimitive, Zero};

use super::eval::ErreurCalcul;
use super::expr::{Expr, Fonction};
use super::format::{format_f64, format_rationnel, format_symbolique};

/// Lit une expression simplifiée avec `chiffres` chiffres significatifs.
pub fn lire(expr: &Expr, chiffres: usize) -> Result<String, ErreurCalcul> {
    match expr {
        Expr::Indefini => Err(ErreurCalcul::Indefini),
        Expr::Rat(r) => Ok(format_rationnel(r, chiffres, false)),
        _ if expr.contient_var() => format_symbolique(expr, chiffres),
        _ => Ok(format_f64(valeur_f64(expr)?, chiffres, false)),
    }
}

/// Valeur numérique d’une expression sans variable.
pub fn valeur_f64(expr: &Expr) -> Result<f64, ErreurCalcul> {
    use Expr::*;

    let v = match expr {
        Indefini => return Err(ErreurCalcul::Indefini),
        Var(nom) => return Err(ErreurCalcul::VariableLibre(nom.clone())),

        Rat(r) => {
            if r.is_zero() {
                return Ok(0.0);
            }
            r.to_f64().ok_or(ErreurCalcul::Depassement)?
        }
        Pi => std::f64::consts::PI,

        Neg(x) => -valeur_f64(x)?,
        Add(a, b) => valeur_f64(a)? + valeur_f64(b)?,
        Sub(a, b) => valeur_f64(a)? - valeur_f64(b)?,
        Mul(a, b) => valeur_f64(a)? * valeur_f64(b)?,

        Div(a, b) => {
            let va = valeur_f64(a)?;
            let vb = valeur_f64(b)?;
            if vb == 0.0 {
                return Err(ErreurCalcul::DivisionParZero);
            }
            va / vb
        }

        Pow(a, b) => puissance(valeur_f64(a)?, valeur_f64(b)?)?,

        Appel(f, x) => appliquer(*f, valeur_f64(x)?)?,
    };

    if v.is_finite() {
        Ok(v)
    } else {
        tracing::debug!(expr = %expr, "valeur non finie");
        Err(ErreurCalcul::Depassement)
    }
}

fn puissance(base: f64, exp: f64) -> Result<f64, ErreurCalcul> {
    if base == 0.0 && exp < 0.0 {
        return Err(ErreurCalcul::DivisionParZero);
    }
    if base < 0.0 && exp.fract() != 0.0 {
        return Err(ErreurCalcul::NonReel);
    }
    Ok(base.powf(exp))
}

/// Applique une fonction sur un réel, en vérifiant son domaine.
pub fn appliquer(f: Fonction, x: f64) -> Result<f64, ErreurCalcul> {
    use Fonction::*;

    Ok(match f {
        Sin => x.sin(),
        Cos => x.cos(),
        Tan => x.tan(),

        Asin | Acos if x.abs() > 1.0 => return Err(ErreurCalcul::NonReel),
        Asin => x.asin(),
        Acos => x.acos(),
        Atan => x.atan(),

        Sinh => x.sinh(),
        Cosh => x.cosh(),
        Tanh => x.tanh(),

        Exp => x.exp(),
        Log if x == 0.0 => return Err(ErreurCalcul::Indefini),
        Log if x < 0.0 => return Err(ErreurCalcul::NonReel),
        Log => x.ln(),

        Sqrt if x < 0.0 => return Err(ErreurCalcul::NonReel),
        Sqrt => x.sqrt(),

        Abs => x.abs(),
    })
}
